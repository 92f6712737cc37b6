use serde::{Deserialize, Serialize};

use crate::error::LogRegError;

/// Hyper-parameters for gradient-ascent training.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TrainConfig {
    /// Minimum log-likelihood gain per iteration; training stops once the
    /// gain falls below this (including when the objective decreases).
    pub eps: f64,
    /// Upper bound of the golden-section search range for the step size.
    pub lr_max: f64,
    /// Hard cap on the number of gradient-ascent iterations.
    pub max_iters: usize,
}

impl TrainConfig {
    pub fn new(eps: f64, lr_max: f64, max_iters: usize) -> Self {
        Self {
            eps,
            lr_max,
            max_iters,
        }
    }

    /// Reject out-of-range hyper-parameters before any numeric work begins.
    pub fn validate(&self) -> Result<(), LogRegError> {
        if !(self.eps > 0.0) {
            return Err(LogRegError::InvalidHyperparameter(format!(
                "eps must be positive, got {}",
                self.eps
            )));
        }
        if !(self.lr_max > 0.0) {
            return Err(LogRegError::InvalidHyperparameter(format!(
                "lr_max must be positive, got {}",
                self.lr_max
            )));
        }
        if self.max_iters < 1 {
            return Err(LogRegError::InvalidHyperparameter(
                "max_iters must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            eps: 0.001,
            lr_max: 1.0,
            max_iters: 1000,
        }
    }
}
