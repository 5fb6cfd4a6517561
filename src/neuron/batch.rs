//! Running collections of independent neuron models.
use rayon::prelude::*;

use super::model::NeuronModel;
use crate::error::SNNError;

/// Minimum number of models to parallelize the simulation.
pub const MIN_MODELS_PAR: usize = 8;

/// Simulate every model to completion.
/// Models own disjoint state, so large collections are simulated in parallel.
/// The function returns the first error encountered, e.g., if a model was already simulated.
pub fn simulate_all<M: NeuronModel + Send>(models: &mut [M]) -> Result<(), SNNError> {
    if models.len() >= MIN_MODELS_PAR {
        log::debug!("Simulating {} models in parallel", models.len());
        models.par_iter_mut().try_for_each(|model| model.simulate())
    } else {
        models.iter_mut().try_for_each(|model| model.simulate())
    }
}
