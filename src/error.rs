//! Error module for the synapseflow library.
use std::error::Error;
use std::fmt;

/// Error types for the library.
#[derive(Debug, PartialEq, Clone)]
pub enum SNNError {
    /// Error for invalid parameters, e.g., zero membrane resistance or negative noise level.
    InvalidParameter(String),
    /// A constant required by the neuron model is absent from the parameter set.
    MissingParameter(&'static str),
    /// Error for invalid time grids, e.g., too short, not increasing or not uniform.
    InvalidTimeGrid(String),
    /// Error for sequences whose length does not match the time grid.
    ShapeMismatch { expected: usize, found: usize },
    /// The model has already been run to completion.
    AlreadySimulated,
    /// Error for binning requests that do not evenly split the input.
    IncompatibleBinning(String),
    /// The spike train contains no spike, e.g., when averaging over spikes.
    NoSpikes,
}

impl fmt::Display for SNNError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SNNError::InvalidParameter(e) => write!(f, "Invalid parameters: {}", e),
            SNNError::MissingParameter(name) => write!(f, "Missing parameter: {} is required by the model", name),
            SNNError::InvalidTimeGrid(e) => write!(f, "Invalid time grid: {}", e),
            SNNError::ShapeMismatch { expected, found } => {
                write!(f, "Shape mismatch: expected {} samples, found {}", expected, found)
            }
            SNNError::AlreadySimulated => write!(f, "The model has already been simulated"),
            SNNError::IncompatibleBinning(e) => write!(f, "Incompatible binning: {}", e),
            SNNError::NoSpikes => write!(f, "The spike train contains no spike"),
        }
    }
}

impl Error for SNNError {}
