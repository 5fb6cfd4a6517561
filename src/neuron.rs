//! Neuron models integrated with a fixed-step forward Euler scheme.
//!
//! This module provides the building blocks of a single-neuron simulation:
//!
//! - [`params`]: the physical constants of a neuron and their derived quantities
//! - [`grid`]: the uniform time grid over which a model is integrated
//! - [`model`]: the state shared by all models and the [`model::NeuronModel`] trait
//! - [`lif`]: the leaky integrate-and-fire model, with optional current noise
//! - [`aelif`]: the adaptive exponential integrate-and-fire model
//! - [`batch`]: running many independent models to completion
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use synapseflow::neuron::grid::TimeGrid;
//! use synapseflow::neuron::lif::LifModel;
//! use synapseflow::neuron::model::NeuronModel;
//! use synapseflow::neuron::params::ParameterSet;
//!
//! let params = ParameterSet::builder(2e-9, -70e-3, -80e-3, 5e6, -50e-3, -65e-3)
//!     .build()
//!     .unwrap();
//! let grid = TimeGrid::arange(0.0, 1.0, 1e-4).unwrap();
//!
//! // Drive the neuron slightly above its threshold current between 10 ms and 50 ms.
//! let currents = grid
//!     .times()
//!     .iter()
//!     .enumerate()
//!     .map(|(i, _)| if (100..500).contains(&i) { 1.1 * params.i_th() } else { 0.0 })
//!     .collect();
//!
//! let mut lif = LifModel::build(Arc::new(params), grid, currents).unwrap();
//! lif.simulate().unwrap();
//!
//! assert!(lif.num_fire() > 0);
//! ```
pub mod aelif;
pub mod batch;
pub mod grid;
pub mod lif;
pub mod model;
pub mod params;

/// Relative tolerance on the spacing of a time grid to be considered uniform.
pub const GRID_TOLERANCE: f64 = 1e-6;
/// Tolerance when converting a duration into a whole number of time steps.
pub const STEP_TOLERANCE: f64 = 1e-9;
