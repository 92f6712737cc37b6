//! logreg-classifiers: binary logistic regression for dense or sparse features.
//!
//! This crate provides a single classifier, [`models::LogisticRegression`],
//! trained by full-batch gradient ascent on the log-likelihood with a
//! golden-section line search for the step size, followed by ROC-distance
//! threshold calibration. Fitted parameters persist to a flat text format.
//!
//! The design favors small, testable modules: feature matrices are abstracted
//! behind the [`math::Features`] trait so dense and sparse storage share one
//! numeric contract, and multi-class problems compose N independent binary
//! instances at the caller's level.
pub mod config;
pub mod error;
pub mod io;
pub mod math;
pub mod models;
