//! This crate simulates the membrane dynamics of single spiking neurons and analyzes the
//! resulting spike trains.
//!
//! # Simulating Neurons
//!
//! A simulation takes a [`neuron::params::ParameterSet`], a uniform [`neuron::grid::TimeGrid`]
//! and the input current at every time point. Models are integrated with the forward Euler
//! scheme and run to completion once.
//!
//! ```rust
//! use std::sync::Arc;
//! use synapseflow::neuron::aelif::AdaptiveExpLifModel;
//! use synapseflow::neuron::grid::TimeGrid;
//! use synapseflow::neuron::model::NeuronModel;
//! use synapseflow::neuron::params::ParameterSet;
//!
//! let params = ParameterSet::builder(0.1e-9, -70e-3, -80e-3, 100e6, -50e-3, -65e-3)
//!     .tau_sra(150e-3)
//!     .a(2e-9)
//!     .b(0.0)
//!     .delta_th(2e-3)
//!     .v_max(200e-3)
//!     .build()
//!     .unwrap();
//! let params = Arc::new(params);
//! let grid = TimeGrid::arange(0.0, 1.0, 1e-4).unwrap();
//!
//! let currents = vec![1.1 * params.i_th(); grid.len()];
//! let mut aelif = AdaptiveExpLifModel::build(params, grid, currents).unwrap();
//! aelif.simulate().unwrap();
//!
//! assert!(aelif.num_fire() > 0);
//! assert_eq!(aelif.isi_array().len(), aelif.num_fire());
//! ```
//!
//! # Analyzing Spike Trains
//!
//! ```rust
//! use synapseflow::analysis::{expand_bins, fano_factor};
//!
//! let spikes: Vec<u8> = vec![0, 1, 0, 0, 1, 1, 0, 1];
//! // Segments [0, 1, 0, 0] and [1, 1, 0, 1]
//! let rates = expand_bins(&spikes, 2e-3, 1e-3).unwrap();
//! assert_eq!(rates, vec![0.5, 1.0, 0.0, 0.5]);
//!
//! let fano = fano_factor(4e-3, &spikes, 1e-3).unwrap();
//! // Windows [0, 1], [0, 0], [1, 1] and [0, 1]
//! assert_eq!(fano, 0.5);
//! ```

pub mod analysis;
pub mod error;
pub mod neuron;
