//! Adaptive exponential integrate-and-fire neuron.
use std::sync::Arc;

use super::grid::TimeGrid;
use super::model::{NeuronModel, NeuronState, SpikeEvent};
use super::params::ParameterSet;
use crate::error::SNNError;

/// The adaptation constants, resolved from the optional entries of a [`ParameterSet`].
#[derive(Debug, PartialEq, Clone, Copy)]
struct Adaptation {
    tau_sra: f64,
    v_max: f64,
    delta_th: f64,
    a: f64,
    b: f64,
}

impl Adaptation {
    fn from_params(params: &ParameterSet) -> Result<Self, SNNError> {
        let tau_sra = params.tau_sra().ok_or(SNNError::MissingParameter("tau_sra"))?;
        let v_max = params.v_max().ok_or(SNNError::MissingParameter("v_max"))?;
        let delta_th = params.delta_th().ok_or(SNNError::MissingParameter("delta_th"))?;
        let a = params.a().ok_or(SNNError::MissingParameter("a"))?;
        let b = params.b().ok_or(SNNError::MissingParameter("b"))?;

        if tau_sra <= 0.0 {
            return Err(SNNError::InvalidParameter(format!(
                "The adaptation time constant must be positive, got {}",
                tau_sra
            )));
        }
        if delta_th <= 0.0 {
            return Err(SNNError::InvalidParameter(format!(
                "The spike upswing sharpness must be positive, got {}",
                delta_th
            )));
        }

        Ok(Adaptation { tau_sra, v_max, delta_th, a, b })
    }
}

/// An adaptive exponential integrate-and-fire neuron.
///
/// The membrane potential and the spike rate adaptation current follow
///
/// ```text
/// C_m dV/dt       = G_L (E_L - V + Δ_th exp((V - V_th) / Δ_th)) - I_SRA + I
/// tau_SRA dI_SRA/dt = a (V - E_L) - I_SRA
/// ```
///
/// integrated with the forward Euler scheme. Past `V_th` the exponential term makes the
/// potential run away; once it reaches `V_max`, the neuron fires, its potential is set back to
/// the reset potential and the adaptation current jumps by `b`.
#[derive(Debug)]
pub struct AdaptiveExpLifModel {
    state: NeuronState,
    adaptation: Adaptation,
    /// Spike rate adaptation current at every time step.
    sra_currents: Vec<f64>,
    /// Time of the last spike, negative infinity before the first one.
    last_spike_time: f64,
    /// Time elapsed since the previous spike, for every spike.
    isi_array: Vec<f64>,
    /// One at the steps where the neuron fired, zero elsewhere.
    spike_array: Vec<u8>,
}

impl AdaptiveExpLifModel {
    /// Create a model at rest, with no adaptation current.
    /// The function returns an error if any of `tau_sra`, `v_max`, `delta_th`, `a` and `b` is
    /// missing from the parameters, or if the input current does not cover the time grid.
    pub fn build(params: Arc<ParameterSet>, grid: TimeGrid, currents: Vec<f64>) -> Result<Self, SNNError> {
        let adaptation = Adaptation::from_params(&params)?;
        let state = NeuronState::build(params, grid, currents)?;
        let len = state.len();

        Ok(AdaptiveExpLifModel {
            state,
            adaptation,
            sra_currents: vec![0.0; len],
            last_spike_time: f64::NEG_INFINITY,
            isi_array: vec![],
            spike_array: vec![0; len],
        })
    }

    /// The instantaneous derivative of the adaptation current at the provided step.
    pub fn dsra_dt(&self, step: usize) -> f64 {
        let v = self.state.voltages[step];
        (self.adaptation.a * (v - self.state.params.e_l()) - self.sra_currents[step]) / self.adaptation.tau_sra
    }

    /// Returns the spike rate adaptation current at every time step.
    pub fn sra_currents(&self) -> &[f64] {
        &self.sra_currents[..]
    }

    /// Returns the time of the last spike, if any.
    pub fn last_spike_time(&self) -> Option<f64> {
        if self.last_spike_time.is_finite() {
            Some(self.last_spike_time)
        } else {
            None
        }
    }

    /// Returns the time elapsed since the previous spike, for every spike.
    /// There is no spike before the first one: its entry is `f64::INFINITY`.
    /// Use [`AdaptiveExpLifModel::intervals`] for the actual inter-spike intervals.
    pub fn isi_array(&self) -> &[f64] {
        &self.isi_array[..]
    }

    /// Returns the intervals between consecutive spikes.
    pub fn intervals(&self) -> &[f64] {
        match self.isi_array.split_first() {
            Some((_, intervals)) => intervals,
            None => &[],
        }
    }

    /// Returns the binary spike train, with a one at every step where the neuron fired.
    pub fn spike_array(&self) -> &[u8] {
        &self.spike_array[..]
    }
}

impl NeuronModel for AdaptiveExpLifModel {
    fn state(&self) -> &NeuronState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut NeuronState {
        &mut self.state
    }

    fn dvdt(&self, step: usize) -> f64 {
        let params = &self.state.params;
        let Adaptation { delta_th, .. } = self.adaptation;
        let v = self.state.voltages[step];
        let upswing = delta_th * ((v - params.v_th()) / delta_th).exp();

        (params.g_l() * (params.e_l() - v + upswing) - self.sra_currents[step] + self.state.currents[step])
            / params.c_m()
    }

    fn step(&mut self, i: usize) -> Option<SpikeEvent> {
        let dt = self.dt();
        self.state.voltages[i] = self.state.voltages[i - 1] + dt * self.dvdt(i - 1);
        self.sra_currents[i] = self.sra_currents[i - 1] + dt * self.dsra_dt(i - 1);

        if self.state.voltages[i] < self.adaptation.v_max {
            return None;
        }

        self.state.voltages[i] = self.state.params.v_reset();
        self.sra_currents[i] += self.adaptation.b;
        let event = self.state.fire(i);
        self.isi_array.push(event.time - self.last_spike_time);
        self.last_spike_time = event.time;
        self.spike_array[i] = 1;
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params_with_b(b: f64) -> Arc<ParameterSet> {
        Arc::new(
            ParameterSet::builder(0.1e-9, -70e-3, -80e-3, 100e6, -50e-3, -65e-3)
                .v_peak(50e-3)
                .v_th_max(200e-3)
                .tau_sra(150e-3)
                .a(2e-9)
                .b(b)
                .delta_th(2e-3)
                .v_max(200e-3)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_build_missing_parameter() {
        let params = Arc::new(
            ParameterSet::builder(0.1e-9, -70e-3, -80e-3, 100e6, -50e-3, -65e-3)
                .tau_sra(150e-3)
                .a(2e-9)
                .b(0.0)
                .delta_th(2e-3)
                .build()
                .unwrap(),
        );
        let grid = TimeGrid::arange(0.0, 0.01, 1e-4).unwrap();
        assert_eq!(
            AdaptiveExpLifModel::build(params, grid, vec![0.0; 100]).unwrap_err(),
            SNNError::MissingParameter("v_max")
        );
    }

    #[test]
    fn test_build_invalid_delta_th() {
        let params = Arc::new(
            ParameterSet::builder(0.1e-9, -70e-3, -80e-3, 100e6, -50e-3, -65e-3)
                .tau_sra(150e-3)
                .a(2e-9)
                .b(0.0)
                .delta_th(0.0)
                .v_max(200e-3)
                .build()
                .unwrap(),
        );
        let grid = TimeGrid::arange(0.0, 0.01, 1e-4).unwrap();
        assert!(matches!(
            AdaptiveExpLifModel::build(params, grid, vec![0.0; 100]),
            Err(SNNError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_build_initial_state() {
        let grid = TimeGrid::arange(0.0, 0.01, 1e-4).unwrap();
        let aelif = AdaptiveExpLifModel::build(params_with_b(0.0), grid, vec![0.0; 100]).unwrap();
        assert_eq!(aelif.voltages()[0], -70e-3);
        assert!(aelif.sra_currents().iter().all(|&i| i == 0.0));
        assert!(aelif.spike_array().iter().all(|&s| s == 0));
        assert!(aelif.isi_array().is_empty());
        assert_eq!(aelif.last_spike_time(), None);
    }

    #[test]
    fn test_derivatives_at_rest() {
        let params = params_with_b(0.0);
        let grid = TimeGrid::arange(0.0, 0.01, 1e-4).unwrap();
        let aelif = AdaptiveExpLifModel::build(params.clone(), grid, vec![0.0; 100]).unwrap();

        let upswing = 2e-3 * ((params.e_l() - params.v_th()) / 2e-3).exp();
        assert_relative_eq!(aelif.dvdt(0), params.g_l() * upswing / params.c_m());
        assert_eq!(aelif.dsra_dt(0), 0.0);
    }

    #[test]
    fn test_no_current_never_fires() {
        let grid = TimeGrid::arange(0.0, 1.0, 1e-4).unwrap();
        let currents = vec![0.0; grid.len()];
        let mut aelif = AdaptiveExpLifModel::build(params_with_b(0.0), grid, currents).unwrap();
        aelif.simulate().unwrap();

        assert_eq!(aelif.num_fire(), 0);
        assert!(aelif.isi_array().is_empty());
        assert!(aelif.intervals().is_empty());
    }

    #[test]
    fn test_suprathreshold_current_fires() {
        let params = params_with_b(0.0);
        let grid = TimeGrid::arange(0.0, 1.0, 1e-4).unwrap();
        let currents = vec![1.1 * params.i_th(); grid.len()];
        let mut aelif = AdaptiveExpLifModel::build(params, grid, currents).unwrap();
        aelif.simulate().unwrap();

        assert!(aelif.num_fire() > 0);
        assert_eq!(aelif.isi_array().len(), aelif.num_fire());
        assert_eq!(aelif.isi_array()[0], f64::INFINITY);
        assert_eq!(aelif.intervals().len(), aelif.num_fire() - 1);
        assert!(aelif.intervals().iter().all(|isi| isi.is_finite() && *isi > 0.0));
        assert_eq!(
            aelif.spike_array().iter().map(|&s| s as usize).sum::<usize>(),
            aelif.num_fire()
        );
    }

    #[test]
    fn test_reset_and_adaptation_jump() {
        let b = 20e-12;
        let params = params_with_b(b);
        let grid = TimeGrid::arange(0.0, 0.5, 1e-4).unwrap();
        let currents = vec![3.0 * params.i_th(); grid.len()];
        let mut aelif = AdaptiveExpLifModel::build(params.clone(), grid, currents).unwrap();
        aelif.simulate().unwrap();
        assert!(aelif.num_fire() > 1);

        // Replay the unclipped Euler update from the recorded traces.
        let dt = aelif.dt();
        let v_max = params.v_max().unwrap();
        for i in 1..aelif.voltages().len() {
            let v_prev = aelif.voltages()[i - 1];
            let sra_prev = aelif.sra_currents()[i - 1];
            let upswing = 2e-3 * ((v_prev - params.v_th()) / 2e-3).exp();
            let dvdt = (params.g_l() * (params.e_l() - v_prev + upswing) - sra_prev + aelif.currents()[i - 1]) / params.c_m();
            let v = v_prev + dt * dvdt;
            let sra = sra_prev + dt * (2e-9 * (v_prev - params.e_l()) - sra_prev) / 150e-3;

            if v >= v_max {
                assert_eq!(aelif.spike_array()[i], 1);
                assert_eq!(aelif.voltages()[i], params.v_reset());
                assert_relative_eq!(aelif.sra_currents()[i], sra + b);
            } else {
                assert_eq!(aelif.spike_array()[i], 0);
                assert_eq!(aelif.voltages()[i], v);
                assert_relative_eq!(aelif.sra_currents()[i], sra);
            }
        }
    }

    #[test]
    fn test_adaptation_lengthens_intervals() {
        let params = params_with_b(20e-12);
        let grid = TimeGrid::arange(0.0, 1.0, 1e-4).unwrap();
        let currents = vec![3.0 * params.i_th(); grid.len()];
        let mut aelif = AdaptiveExpLifModel::build(params, grid, currents).unwrap();
        aelif.simulate().unwrap();

        let intervals = aelif.intervals();
        assert!(intervals.len() > 2);
        assert!(intervals[intervals.len() - 1] > intervals[0]);
    }

    #[test]
    fn test_last_spike_time() {
        let params = params_with_b(0.0);
        let grid = TimeGrid::arange(0.0, 1.0, 1e-4).unwrap();
        let currents = vec![1.1 * params.i_th(); grid.len()];
        let mut aelif = AdaptiveExpLifModel::build(params, grid, currents).unwrap();
        aelif.simulate().unwrap();

        let last = aelif
            .spike_array()
            .iter()
            .rposition(|&s| s == 1)
            .map(|i| aelif.times()[i]);
        assert_eq!(aelif.last_spike_time(), last);
    }
}
