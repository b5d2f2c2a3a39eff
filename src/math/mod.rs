//! Mathematical utilities for the spring element

pub mod p_delta;
pub mod transform;

use nalgebra::{DMatrix, DVector, Matrix3, Vector3};

use crate::error::{SpringError, SpringResult};

pub type Mat = DMatrix<f64>;
pub type Vec = DVector<f64>;
pub type Mat3 = Matrix3<f64>;
pub type Vec3 = Vector3<f64>;

pub use p_delta::{MomentRatios, PDeltaCorrector};
pub use transform::{build_geometry, Geometry, TransformationSet};

/// Build a dense matrix from row vectors, rejecting ragged input
pub fn matrix_from_rows(rows: &[std::vec::Vec<f64>], what: &str) -> SpringResult<Mat> {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, |r| r.len());
    if let Some(bad) = rows.iter().position(|r| r.len() != ncols) {
        return Err(SpringError::Configuration(format!(
            "{} row {} has {} entries, expected {}",
            what,
            bad,
            rows[bad].len(),
            ncols
        )));
    }
    Ok(Mat::from_fn(nrows, ncols, |i, j| rows[i][j]))
}

/// Convert a dense matrix back into row vectors
pub fn matrix_to_rows(m: &Mat) -> std::vec::Vec<std::vec::Vec<f64>> {
    m.row_iter()
        .map(|row| row.iter().copied().collect())
        .collect()
}

/// Mirror the upper triangle of a square matrix into a full symmetric matrix
///
/// Entries below the diagonal are ignored.
///
/// # Arguments
/// * `m` - Input matrix, only the upper triangle is read
/// * `size` - Required number of rows and columns
/// * `what` - Name used in error messages
pub fn symmetric_from_upper(m: &Mat, size: usize, what: &str) -> SpringResult<Mat> {
    if m.nrows() != size || m.ncols() != size {
        return Err(SpringError::Configuration(format!(
            "{} must be {}x{} to match the number of directions, got {}x{}",
            what,
            size,
            size,
            m.nrows(),
            m.ncols()
        )));
    }
    if m.iter().any(|v| !v.is_finite()) {
        return Err(SpringError::Configuration(format!(
            "{} contains non-finite entries",
            what
        )));
    }

    Ok(Mat::from_fn(size, size, |i, j| {
        if i <= j {
            m[(i, j)]
        } else {
            m[(j, i)]
        }
    }))
}

/// Congruence transform `tᵀ · k · t`
pub fn congruence(t: &Mat, k: &Mat) -> Mat {
    t.transpose() * k * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mirror_upper_triangle() {
        #[rustfmt::skip]
        let m = Mat::from_row_slice(3, 3, &[
            1.0, 2.0, 3.0,
            99.0, 4.0, 5.0,
            99.0, 99.0, 6.0,
        ]);
        let s = symmetric_from_upper(&m, 3, "stiffness").unwrap();

        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(s[(i, j)], s[(j, i)]);
            }
        }
        assert_relative_eq!(s[(1, 0)], 2.0);
        assert_relative_eq!(s[(2, 1)], 5.0);
    }

    #[test]
    fn test_mirror_rejects_wrong_size() {
        let m = Mat::identity(2, 2);
        assert!(matches!(
            symmetric_from_upper(&m, 3, "stiffness"),
            Err(SpringError::Configuration(_))
        ));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(matrix_from_rows(&rows, "stiffness").is_err());

        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let m = matrix_from_rows(&rows, "stiffness").unwrap();
        assert_eq!(matrix_to_rows(&m), rows);
    }
}
