//! State shared by all neuron models and the trait driving their simulation.
use derivative::Derivative;
use std::sync::Arc;

use super::grid::TimeGrid;
use super::params::ParameterSet;
use crate::error::SNNError;

/// A spike emitted by a neuron during a simulation.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct SpikeEvent {
    /// Index of the time step at which the neuron fired.
    pub step: usize,
    /// Time at which the neuron fired.
    pub time: f64,
}

/// Callback notified of every spike, for instrumentation only.
pub type SpikeObserver = Box<dyn FnMut(&SpikeEvent) + Send>;

/// The state every neuron model integrates: parameters, time grid, input current, membrane
/// potential and spike count.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct NeuronState {
    pub(crate) params: Arc<ParameterSet>,
    pub(crate) grid: TimeGrid,
    pub(crate) currents: Vec<f64>,
    pub(crate) voltages: Vec<f64>,
    pub(crate) num_fire: usize,
    simulated: bool,
    #[derivative(Debug = "ignore")]
    observer: Option<SpikeObserver>,
}

impl NeuronState {
    /// Create the state of a neuron at rest, i.e., with its potential initialized to the leak
    /// reversal potential. The function returns an error if the input current does not cover
    /// the time grid exactly.
    pub fn build(params: Arc<ParameterSet>, grid: TimeGrid, currents: Vec<f64>) -> Result<Self, SNNError> {
        if currents.len() != grid.len() {
            return Err(SNNError::ShapeMismatch {
                expected: grid.len(),
                found: currents.len(),
            });
        }

        let mut voltages = vec![0.0; grid.len()];
        voltages[0] = params.e_l();

        Ok(NeuronState {
            params,
            grid,
            currents,
            voltages,
            num_fire: 0,
            simulated: false,
            observer: None,
        })
    }

    /// Returns the number of time steps.
    pub fn len(&self) -> usize {
        self.grid.len()
    }

    /// Always false: the state covers at least two time points.
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Returns true once the model has been run to completion.
    pub fn is_simulated(&self) -> bool {
        self.simulated
    }

    /// Count a spike at the provided step and returns the corresponding event.
    pub(crate) fn fire(&mut self, step: usize) -> SpikeEvent {
        self.num_fire += 1;
        SpikeEvent {
            step,
            time: self.grid.times()[step],
        }
    }

    fn notify(&mut self, event: &SpikeEvent) {
        match self.observer.as_mut() {
            Some(observer) => observer(event),
            None => log::debug!("Neuron fired at time {}", event.time),
        }
    }
}

/// A spiking neuron model integrated over a uniform time grid.
///
/// Implementors provide the voltage derivative and the update of a single time step; the
/// simulation loop, the bookkeeping and the derived quantities are shared.
pub trait NeuronModel {
    /// A reference to the state of the model.
    fn state(&self) -> &NeuronState;

    /// A mutable reference to the state of the model.
    fn state_mut(&mut self) -> &mut NeuronState;

    /// The instantaneous derivative of the membrane potential at the provided step.
    fn dvdt(&self, step: usize) -> f64;

    /// Advance the model from step `i - 1` to step `i`, with `1 <= i < len`.
    /// Returns the spike emitted at step `i`, if any.
    fn step(&mut self, i: usize) -> Option<SpikeEvent>;

    /// Run the model over the whole time grid.
    /// The function returns an error if the model has already been simulated.
    fn simulate(&mut self) -> Result<(), SNNError> {
        if self.state().is_simulated() {
            return Err(SNNError::AlreadySimulated);
        }

        for i in 1..self.state().len() {
            if let Some(event) = self.step(i) {
                self.state_mut().notify(&event);
            }
        }
        self.state_mut().simulated = true;

        log::info!(
            "Simulation completed: {} spikes over {} s ({} Hz)",
            self.num_fire(),
            self.state().grid.duration(),
            self.fire_rate()
        );
        Ok(())
    }

    /// Install a callback notified of every spike emitted during the simulation.
    /// Without observer, spikes are logged at the debug level.
    fn set_observer(&mut self, observer: SpikeObserver) {
        self.state_mut().observer = Some(observer);
    }

    /// Returns the parameters of the neuron.
    fn params(&self) -> &ParameterSet {
        &self.state().params
    }

    /// Returns the time grid.
    fn grid(&self) -> &TimeGrid {
        &self.state().grid
    }

    /// Returns the time points of the simulation.
    fn times(&self) -> &[f64] {
        self.state().grid.times()
    }

    /// Returns the time step of the simulation.
    fn dt(&self) -> f64 {
        self.state().grid.dt()
    }

    /// Returns the input current at every time step.
    fn currents(&self) -> &[f64] {
        &self.state().currents[..]
    }

    /// Returns the membrane potential at every time step.
    fn voltages(&self) -> &[f64] {
        &self.state().voltages[..]
    }

    /// Returns the number of spikes emitted so far.
    fn num_fire(&self) -> usize {
        self.state().num_fire
    }

    /// Returns the mean firing rate over the time grid, in spikes per unit of time.
    fn fire_rate(&self) -> f64 {
        self.num_fire() as f64 / self.state().grid.duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Integrates a constant slope and fires every time the potential reaches zero.
    #[derive(Debug)]
    struct RampModel {
        state: NeuronState,
        slope: f64,
    }

    impl NeuronModel for RampModel {
        fn state(&self) -> &NeuronState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut NeuronState {
            &mut self.state
        }

        fn dvdt(&self, _step: usize) -> f64 {
            self.slope
        }

        fn step(&mut self, i: usize) -> Option<SpikeEvent> {
            let v = self.state.voltages[i - 1] + self.dvdt(i - 1) * self.dt();
            if v >= 0.0 {
                self.state.voltages[i] = self.state.params.v_reset();
                Some(self.state.fire(i))
            } else {
                self.state.voltages[i] = v;
                None
            }
        }
    }

    fn ramp_model(slope: f64) -> RampModel {
        let params = ParameterSet::builder(1.0, -4.0, -5.0, 1.0, -1.0, -4.0).build().unwrap();
        let grid = TimeGrid::arange(0.0, 10.0, 1.0).unwrap();
        let state = NeuronState::build(Arc::new(params), grid, vec![0.0; 10]).unwrap();
        RampModel { state, slope }
    }

    #[test]
    fn test_state_build() {
        let params = Arc::new(ParameterSet::builder(1.0, -4.0, -5.0, 1.0, -1.0, -4.0).build().unwrap());
        let grid = TimeGrid::arange(0.0, 10.0, 1.0).unwrap();
        let state = NeuronState::build(params.clone(), grid.clone(), vec![0.0; 10]).unwrap();
        assert_eq!(state.voltages, [-4.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(state.num_fire, 0);
        assert!(!state.is_simulated());

        assert_eq!(
            NeuronState::build(params, grid, vec![0.0; 11]).unwrap_err(),
            SNNError::ShapeMismatch { expected: 10, found: 11 }
        );
    }

    #[test]
    fn test_simulate() {
        let mut model = ramp_model(1.0);
        model.simulate().unwrap();
        assert_eq!(
            model.voltages(),
            [-4.0, -3.0, -2.0, -1.0, -4.0, -3.0, -2.0, -1.0, -4.0, -3.0]
        );
        assert_eq!(model.num_fire(), 2);
        assert_eq!(model.fire_rate(), 2.0 / 9.0);
        assert!(model.state().is_simulated());
        assert_eq!(model.simulate(), Err(SNNError::AlreadySimulated));
    }

    #[test]
    fn test_observer() {
        let events = Arc::new(Mutex::new(vec![]));
        let recorded = events.clone();

        let mut model = ramp_model(1.0);
        model.set_observer(Box::new(move |event: &SpikeEvent| recorded.lock().unwrap().push(*event)));
        model.simulate().unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            [SpikeEvent { step: 4, time: 4.0 }, SpikeEvent { step: 8, time: 8.0 }]
        );
    }

    #[test]
    fn test_no_spike() {
        let mut model = ramp_model(0.0);
        model.simulate().unwrap();
        assert_eq!(model.num_fire(), 0);
        assert_eq!(model.fire_rate(), 0.0);
        assert!(model.voltages().iter().all(|&v| v == -4.0));
    }
}
