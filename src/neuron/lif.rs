//! Leaky integrate-and-fire neuron with additive current noise.
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::sync::Arc;

use super::grid::TimeGrid;
use super::model::{NeuronModel, NeuronState, SpikeEvent};
use super::params::ParameterSet;
use crate::error::SNNError;

/// A leaky integrate-and-fire neuron.
///
/// The membrane potential follows `C_m dV/dt = (E_L - V) / R_m + I`, integrated with the
/// Euler-Maruyama scheme. Whenever it rises strictly above the threshold potential, the neuron
/// fires and its potential is set back to the reset potential.
#[derive(Debug)]
pub struct LifModel {
    state: NeuronState,
    /// Standard deviation of the noise, per unit of square root of time.
    noise_sigma: f64,
    /// Voltage perturbation added at every step, drawn once when the model is built.
    noises: Vec<f64>,
    last_spike_time: Option<f64>,
}

impl LifModel {
    /// Create a noiseless model.
    /// The function returns an error if the input current does not cover the time grid.
    pub fn build(params: Arc<ParameterSet>, grid: TimeGrid, currents: Vec<f64>) -> Result<Self, SNNError> {
        let state = NeuronState::build(params, grid, currents)?;
        let noises = vec![0.0; state.len()];
        Ok(LifModel {
            state,
            noise_sigma: 0.0,
            noises,
            last_spike_time: None,
        })
    }

    /// Create a model whose potential is perturbed at every step by an independent Gaussian
    /// increment with standard deviation `noise_sigma * sqrt(dt)`, drawn from the provided
    /// random number generator.
    /// The function returns an error if the noise level is negative or not finite, or if the
    /// input current does not cover the time grid.
    ///
    /// # Examples
    ///
    /// ```
    /// use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
    /// use std::sync::Arc;
    /// use synapseflow::neuron::grid::TimeGrid;
    /// use synapseflow::neuron::lif::LifModel;
    /// use synapseflow::neuron::model::NeuronModel;
    /// use synapseflow::neuron::params::ParameterSet;
    ///
    /// let params = ParameterSet::builder(2e-9, -70e-3, -80e-3, 5e6, -50e-3, -65e-3).build().unwrap();
    /// let grid = TimeGrid::arange(0.0, 0.1, 1e-4).unwrap();
    /// let currents = vec![0.0; grid.len()];
    ///
    /// let mut rng = ChaCha8Rng::seed_from_u64(42);
    /// let mut lif = LifModel::build_with_noise(Arc::new(params), grid, currents, 1e-3, &mut rng).unwrap();
    /// lif.simulate().unwrap();
    /// assert_eq!(lif.noises().len(), lif.voltages().len());
    /// ```
    pub fn build_with_noise<R: Rng + ?Sized>(
        params: Arc<ParameterSet>,
        grid: TimeGrid,
        currents: Vec<f64>,
        noise_sigma: f64,
        rng: &mut R,
    ) -> Result<Self, SNNError> {
        if !(noise_sigma.is_finite() && noise_sigma >= 0.0) {
            return Err(SNNError::InvalidParameter(format!(
                "The noise level must be non-negative and finite, got {}",
                noise_sigma
            )));
        }

        let mut model = LifModel::build(params, grid, currents)?;
        if noise_sigma > 0.0 {
            let noise_dist = Normal::new(0.0, noise_sigma * model.dt().sqrt()).map_err(|e| {
                SNNError::InvalidParameter(format!("Invalid noise distribution: {}", e))
            })?;
            model.noises = (0..model.state.len()).map(|_| noise_dist.sample(rng)).collect();
            model.noise_sigma = noise_sigma;
        }
        Ok(model)
    }

    /// Returns the noise level of the model.
    pub fn noise_sigma(&self) -> f64 {
        self.noise_sigma
    }

    /// Returns the voltage perturbation added at every time step.
    pub fn noises(&self) -> &[f64] {
        &self.noises[..]
    }

    /// Returns the time of the last spike, if any.
    pub fn last_spike_time(&self) -> Option<f64> {
        self.last_spike_time
    }
}

impl NeuronModel for LifModel {
    fn state(&self) -> &NeuronState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut NeuronState {
        &mut self.state
    }

    fn dvdt(&self, step: usize) -> f64 {
        let params = &self.state.params;
        ((params.e_l() - self.state.voltages[step]) / params.r_m() + self.state.currents[step]) / params.c_m()
    }

    fn step(&mut self, i: usize) -> Option<SpikeEvent> {
        // The noise is taken at the new step, the derivative at the previous one.
        let mut v = self.state.voltages[i - 1] + self.dvdt(i - 1) * self.dt() + self.noises[i];

        let mut event = None;
        if v > self.state.params.v_th() {
            v = self.state.params.v_reset();
            let spike = self.state.fire(i);
            self.last_spike_time = Some(spike.time);
            event = Some(spike);
        }

        self.state.voltages[i] = v;
        event
    }
}
