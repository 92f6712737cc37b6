//! Small ndarray-like types used throughout the crate.
//!
//! Provides `Array2` (dense 2D), `CsrMatrix` (sparse 2D) and `Array1` (1D)
//! lightweight containers with minimal convenience methods. These types are
//! intentionally small and dependency-free to keep the crate portable and
//! easy to test.
pub mod matrix;
pub mod sparse;
pub mod vector;

pub use matrix::{Array2, ShapeError};
pub use sparse::CsrMatrix;
pub use vector::Array1;

/// Read-only view of a feature matrix as the training and inference engines
/// see it. Dense and sparse storage implement the same numeric contract;
/// sparsity is purely a storage optimization.
pub trait Features {
    /// Number of samples (rows).
    fn nrows(&self) -> usize;

    /// Number of features (columns).
    fn ncols(&self) -> usize;

    /// Dot product of one row against a dense weight vector.
    ///
    /// `weights.len()` must equal `ncols()`.
    fn row_dot(&self, row: usize, weights: &Array1<f64>) -> f64;

    /// Accumulate `scale * row` into `out`, i.e. `out += scale * x_row`.
    ///
    /// This is the primitive behind the weight gradient `Xᵗ·(y - p)`.
    fn add_scaled_row(&self, row: usize, scale: f64, out: &mut Array1<f64>);
}
