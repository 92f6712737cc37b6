//! Persistence adapters for fitted model parameters.
pub mod model_file;

pub use model_file::{read_model, write_model};
