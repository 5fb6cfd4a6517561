//! Uniform time grids over which the models are integrated.
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::{GRID_TOLERANCE, STEP_TOLERANCE};
use crate::error::SNNError;

/// Largest deviation from the step `dt` accepted between consecutive points around `t`.
/// Points far from zero carry a rounding error proportional to their magnitude.
fn spacing_tolerance(dt: f64, t: f64) -> f64 {
    GRID_TOLERANCE * dt + 4.0 * f64::EPSILON * t
}

/// A strictly increasing and uniformly spaced sequence of (at least two) time points.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct TimeGrid {
    times: Vec<f64>,
    #[serde(skip)]
    dt: f64,
}

impl TimeGrid {
    /// Create a time grid from the provided time points.
    /// The function returns an error if there are fewer than two points, if any point is not
    /// finite, or if the points are not strictly increasing with a constant step.
    pub fn build(times: Vec<f64>) -> Result<Self, SNNError> {
        if times.len() < 2 {
            return Err(SNNError::InvalidTimeGrid(format!(
                "At least two time points are required, got {}",
                times.len()
            )));
        }

        if let Some(t) = times.iter().find(|t| !t.is_finite()) {
            return Err(SNNError::InvalidTimeGrid(format!(
                "Time points must be finite, got {}",
                t
            )));
        }

        let dt = times[1] - times[0];
        if dt <= 0.0 {
            return Err(SNNError::InvalidTimeGrid(
                "Time points must be strictly increasing".to_string(),
            ));
        }

        if let Some((t1, t2)) = times
            .iter()
            .tuple_windows()
            .find(|(t1, t2)| ((*t2 - *t1) - dt).abs() > spacing_tolerance(dt, t1.abs().max(t2.abs())))
        {
            return Err(SNNError::InvalidTimeGrid(format!(
                "Time points must be uniformly spaced by {}, but {} and {} are {} apart",
                dt,
                t1,
                t2,
                t2 - t1
            )));
        }

        Ok(TimeGrid { times, dt })
    }

    /// Create the time grid `start, start + dt, ...` covering the half-open interval `[start, end)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use synapseflow::neuron::grid::TimeGrid;
    ///
    /// let grid = TimeGrid::arange(0.0, 1.0, 0.25).unwrap();
    /// assert_eq!(grid.times(), &[0.0, 0.25, 0.5, 0.75]);
    /// ```
    pub fn arange(start: f64, end: f64, dt: f64) -> Result<Self, SNNError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SNNError::InvalidTimeGrid(format!(
                "The time step must be positive and finite, got {}",
                dt
            )));
        }
        if !(start.is_finite() && end.is_finite()) {
            return Err(SNNError::InvalidTimeGrid(
                "The time bounds must be finite".to_string(),
            ));
        }

        let num_steps = ((end - start) / dt - STEP_TOLERANCE).ceil().max(0.0) as usize;
        let times = (0..num_steps).map(|i| start + i as f64 * dt).collect();
        TimeGrid::build(times)
    }

    /// Returns the time points of the grid.
    pub fn times(&self) -> &[f64] {
        &self.times[..]
    }

    /// Returns the time step, i.e., the spacing of the first two points.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Returns the number of time points.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always false: a grid has at least two points.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Returns the first time point.
    pub fn start(&self) -> f64 {
        self.times[0]
    }

    /// Returns the last time point.
    pub fn end(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    /// Returns the time spanned by the grid, from the first to the last point.
    pub fn duration(&self) -> f64 {
        self.end() - self.start()
    }
}

impl<'de> Deserialize<'de> for TimeGrid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct TimeGridData {
            times: Vec<f64>,
        }

        let data = TimeGridData::deserialize(deserializer)?;
        TimeGrid::build(data.times).map_err(serde::de::Error::custom)
    }
}
