use crate::math::matrix::Array2;
use crate::math::vector::Array1;
use crate::math::Features;

/// Sparse 2D feature matrix in compressed sparse row (CSR) layout.
///
/// Stores only explicit entries; absent entries are zero. Numerically
/// interchangeable with `Array2<f64>` wherever `Features` is accepted.
#[derive(Clone, Debug, PartialEq)]
pub struct CsrMatrix {
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
    cols: usize,
}

impl CsrMatrix {
    /// Build from per-row `(column, value)` pairs.
    ///
    /// Column indices must be < `cols`; entries within a row may appear in
    /// any order and zeros may be included (they are kept as explicit
    /// entries but do not change results).
    pub fn from_rows(rows: Vec<Vec<(usize, f64)>>, cols: usize) -> Self {
        let mut row_ptr = Vec::with_capacity(rows.len() + 1);
        let mut col_idx = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);
        for row in rows {
            for (col, value) in row {
                assert!(col < cols, "column index {} out of bounds ({})", col, cols);
                col_idx.push(col);
                values.push(value);
            }
            row_ptr.push(col_idx.len());
        }
        Self {
            row_ptr,
            col_idx,
            values,
            cols,
        }
    }

    /// Build from a dense matrix, dropping exact zeros.
    pub fn from_dense(dense: &Array2<f64>) -> Self {
        let rows = (0..dense.nrows())
            .map(|row| {
                dense
                    .row_slice(row)
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| **v != 0.0)
                    .map(|(col, v)| (col, *v))
                    .collect()
            })
            .collect();
        Self::from_rows(rows, dense.ncols())
    }

    /// Number of explicitly stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    fn row_range(&self, row: usize) -> std::ops::Range<usize> {
        self.row_ptr[row]..self.row_ptr[row + 1]
    }
}

impl Features for CsrMatrix {
    fn nrows(&self) -> usize {
        self.row_ptr.len() - 1
    }

    fn ncols(&self) -> usize {
        self.cols
    }

    fn row_dot(&self, row: usize, weights: &Array1<f64>) -> f64 {
        debug_assert_eq!(weights.len(), self.cols);
        self.row_range(row)
            .map(|i| self.values[i] * weights[self.col_idx[i]])
            .sum()
    }

    fn add_scaled_row(&self, row: usize, scale: f64, out: &mut Array1<f64>) {
        debug_assert_eq!(out.len(), self.cols);
        for i in self.row_range(row) {
            out[self.col_idx[i]] += scale * self.values[i];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_dense_drops_zeros() {
        let dense =
            Array2::from_shape_vec((2, 3), vec![1.0, 0.0, 2.0, 0.0, 0.0, 3.0]).unwrap();
        let sparse = CsrMatrix::from_dense(&dense);
        assert_eq!(sparse.nnz(), 3);
        assert_eq!(sparse.nrows(), 2);
        assert_eq!(sparse.ncols(), 3);
    }

    #[test]
    fn row_dot_matches_dense() {
        let dense =
            Array2::from_shape_vec((2, 3), vec![1.0, 0.0, 2.0, 0.5, -1.0, 0.0]).unwrap();
        let sparse = CsrMatrix::from_dense(&dense);
        let w = Array1::from_vec(vec![2.0, 3.0, -1.0]);
        for row in 0..2 {
            assert_eq!(sparse.row_dot(row, &w), dense.row_dot(row, &w));
        }
    }

    #[test]
    fn add_scaled_row_matches_dense() {
        let dense =
            Array2::from_shape_vec((2, 3), vec![1.0, 0.0, 2.0, 0.5, -1.0, 4.0]).unwrap();
        let sparse = CsrMatrix::from_dense(&dense);
        let mut a = Array1::zeros(3);
        let mut b = Array1::zeros(3);
        dense.add_scaled_row(1, 2.0, &mut a);
        sparse.add_scaled_row(1, 2.0, &mut b);
        assert_eq!(a, b);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn from_rows_rejects_bad_column() {
        let _ = CsrMatrix::from_rows(vec![vec![(3, 1.0)]], 3);
    }
}
