//! Post-hoc analysis of simulated spike trains and input currents.
//!
//! Spike trains are binary sequences aligned with the time grid of the simulation, with a
//! non-zero entry at every step where the neuron fired (see
//! [`crate::neuron::aelif::AdaptiveExpLifModel::spike_array`]).
use crate::error::SNNError;
use crate::neuron::STEP_TOLERANCE;

/// Number of whole time steps of size `dt` in `duration`.
fn num_steps(duration: f64, dt: f64) -> Result<usize, SNNError> {
    if !(dt.is_finite() && dt > 0.0) {
        return Err(SNNError::InvalidParameter(format!(
            "The time step must be positive and finite, got {}",
            dt
        )));
    }
    if !(duration.is_finite() && duration >= 0.0) {
        return Err(SNNError::InvalidParameter(format!(
            "The duration must be non-negative and finite, got {}",
            duration
        )));
    }
    let steps = (duration / dt + STEP_TOLERANCE).floor();
    if steps >= usize::MAX as f64 {
        return Err(SNNError::InvalidParameter(format!(
            "The duration {} spans too many time steps of {}",
            duration, dt
        )));
    }
    Ok(steps as usize)
}

/// Downsample a sequence sampled every `old_dt` by a factor `new_dt / old_dt` (truncated).
/// The sequence is split into that many contiguous segments of equal length, which are then
/// averaged element-wise: entry `j` of the result is the mean of the `j`-th sample of every
/// segment.
/// The function returns an error if the factor is zero or if the sequence cannot be split
/// into segments of equal length.
///
/// # Examples
///
/// ```
/// use synapseflow::analysis::expand_bins;
///
/// // Segments [0, 1, 1] and [1, 0, 1]
/// let spikes: [u8; 6] = [0, 1, 1, 1, 0, 1];
/// assert_eq!(expand_bins(&spikes, 2e-3, 1e-3).unwrap(), vec![0.5, 0.5, 1.0]);
/// ```
pub fn expand_bins<T: Copy + Into<f64>>(values: &[T], new_dt: f64, old_dt: f64) -> Result<Vec<f64>, SNNError> {
    let num_segments = num_steps(new_dt, old_dt)?;
    if num_segments == 0 {
        return Err(SNNError::IncompatibleBinning(format!(
            "The new time step {} is smaller than the old one {}",
            new_dt, old_dt
        )));
    }
    if values.len() % num_segments != 0 {
        return Err(SNNError::IncompatibleBinning(format!(
            "{} samples cannot be split into {} segments of equal length",
            values.len(),
            num_segments
        )));
    }

    let segment_len = values.len() / num_segments;
    Ok((0..segment_len)
        .map(|j| {
            (0..num_segments).map(|k| values[k * segment_len + j].into()).sum::<f64>() / num_segments as f64
        })
        .collect())
}

/// Average the input current around every spike, from `t_minus` before to `t_plus` after it.
/// The entry `k` of the result is the mean current at `k * dt - t_minus` relative to the spike
/// times. Near the edges of the recording, every sample keeps its offset from the spike and
/// samples before the start or past the end are left out of the sum, so a spike close to the
/// start only contributes to the late entries of the window.
/// The function returns an error if the sequences have different lengths, if the window is
/// empty or longer than the recording on either side, or if there is no spike to average over.
pub fn spike_triggered_average(
    currents: &[f64],
    spikes: &[u8],
    dt: f64,
    t_minus: f64,
    t_plus: f64,
) -> Result<Vec<f64>, SNNError> {
    if currents.len() != spikes.len() {
        return Err(SNNError::ShapeMismatch {
            expected: spikes.len(),
            found: currents.len(),
        });
    }

    let steps_before = num_steps(t_minus, dt)?;
    let steps_after = num_steps(t_plus, dt)?;
    if steps_before > currents.len() || steps_after > currents.len() {
        return Err(SNNError::IncompatibleBinning(format!(
            "The averaging window ({} steps before, {} after) exceeds the {} samples of the recording",
            steps_before,
            steps_after,
            currents.len()
        )));
    }
    let window = steps_before + steps_after;
    if window == 0 {
        return Err(SNNError::IncompatibleBinning(
            "The averaging window holds no sample".to_string(),
        ));
    }

    let mut sta = vec![0.0; window];
    let mut num_spikes = 0;
    for (i, _) in spikes.iter().enumerate().filter(|(_, &s)| s != 0) {
        num_spikes += 1;
        // Clip the window to the recording.
        let first = i.saturating_sub(steps_before);
        let last = (i + steps_after).min(currents.len());
        let offset = first + steps_before - i;
        for (acc, current) in sta[offset..].iter_mut().zip(&currents[first..last]) {
            *acc += current;
        }
    }

    if num_spikes == 0 {
        return Err(SNNError::NoSpikes);
    }

    Ok(sta.into_iter().map(|acc| acc / num_spikes as f64).collect())
}

/// The Fano factor of the spike counts, i.e., the variance of the counts divided by their
/// mean. The spike train is split into `time_range / dt` (truncated) consecutive windows of
/// equal length, and the spikes of each window are counted.
/// The function returns an error if the spike train cannot be split into that many windows of
/// equal length, or if it contains no spike.
///
/// # Examples
///
/// ```
/// use synapseflow::analysis::fano_factor;
///
/// // Windows [1, 1], [0, 0], [1, 0] and [0, 1]
/// let spikes: [u8; 8] = [1, 1, 0, 0, 1, 0, 0, 1];
/// assert_eq!(fano_factor(4.0, &spikes, 1.0).unwrap(), 0.5);
/// ```
pub fn fano_factor(time_range: f64, spikes: &[u8], dt: f64) -> Result<f64, SNNError> {
    let num_windows = num_steps(time_range, dt)?;
    if num_windows == 0 {
        return Err(SNNError::IncompatibleBinning(format!(
            "The time range {} is shorter than the time step {}",
            time_range, dt
        )));
    }
    if spikes.len() % num_windows != 0 {
        return Err(SNNError::IncompatibleBinning(format!(
            "{} steps cannot be split into {} windows of equal length",
            spikes.len(),
            num_windows
        )));
    }
    if spikes.is_empty() {
        return Err(SNNError::NoSpikes);
    }

    let counts: Vec<f64> = spikes
        .chunks_exact(spikes.len() / num_windows)
        .map(|w| w.iter().filter(|&&s| s != 0).count() as f64)
        .collect();
    let num_windows = num_windows as f64;
    let mean = counts.iter().sum::<f64>() / num_windows;
    if mean == 0.0 {
        return Err(SNNError::NoSpikes);
    }
    let variance = counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / num_windows;

    Ok(variance / mean)
}

/// The times at which the neuron fired.
/// The function returns an error if the spike train and the time points have different lengths.
pub fn spike_times(spikes: &[u8], times: &[f64]) -> Result<Vec<f64>, SNNError> {
    if spikes.len() != times.len() {
        return Err(SNNError::ShapeMismatch {
            expected: times.len(),
            found: spikes.len(),
        });
    }

    Ok(spikes
        .iter()
        .zip(times)
        .filter(|(&s, _)| s != 0)
        .map(|(_, &t)| t)
        .collect())
}

/// Coefficient of variation (standard deviation over mean) of inter-spike intervals.
/// Non-finite entries, such as the interval before the first spike, are ignored.
/// Returns `None` if fewer than two intervals remain.
pub fn isi_cv(intervals: &[f64]) -> Option<f64> {
    let intervals: Vec<f64> = intervals.iter().copied().filter(|isi| isi.is_finite()).collect();
    if intervals.len() < 2 {
        return None;
    }

    let n = intervals.len() as f64;
    let mean = intervals.iter().sum::<f64>() / n;
    if mean <= 0.0 {
        return None;
    }
    let variance = intervals.iter().map(|isi| (isi - mean).powi(2)).sum::<f64>() / n;
    Some(variance.sqrt() / mean)
}
