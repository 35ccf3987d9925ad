//! Matrix operations.
//!
//! Small, stack-allocated linear algebra helpers built on `la-stack`. The
//! facet side test works on a D×D matrix, which is a const-generic shape and
//! therefore needs no runtime dispatch.

#![forbid(unsafe_code)]

use la_stack::{LaError, Matrix as LaMatrix};

/// Internal linear algebra matrix type used for fixed-size operations.
pub type Matrix<const D: usize> = LaMatrix<D>;

/// Default tolerance for matrix singularity checks.
pub const SINGULARITY_TOLERANCE: f64 = 1e-12;

#[inline]
pub(crate) fn matrix_get<const D: usize>(m: &Matrix<D>, r: usize, c: usize) -> f64 {
    m.get(r, c)
        .unwrap_or_else(|| unreachable!("matrix index out of bounds: ({r}, {c}) for {D}x{D}"))
}

#[inline]
pub(crate) fn matrix_set<const D: usize>(m: &mut Matrix<D>, r: usize, c: usize, value: f64) {
    let ok = m.set(r, c, value);
    assert!(ok, "matrix index out of bounds: ({r}, {c}) for {D}x{D}");
}

/// Compute an LU-based determinant, returning 0.0 for singular matrices and
/// NaN when the factorization meets non-finite entries.
///
/// ```rust
/// use dewall::geometry::matrix::{determinant, Matrix};
///
/// let m = Matrix::<2>::zero();
/// assert_eq!(determinant(&m), 0.0);
/// ```
#[inline]
#[must_use]
pub fn determinant<const D: usize>(m: &Matrix<D>) -> f64 {
    match m.det(0.0) {
        Ok(det) => det,
        Err(LaError::Singular { .. }) => 0.0,
        Err(_) => f64::NAN,
    }
}

/// Tolerance scaled by matrix magnitude: `base_tol + 1e-12 * ||A||_inf`.
///
/// ```rust
/// use dewall::geometry::matrix::{adaptive_tolerance, Matrix};
///
/// let mut m = Matrix::<2>::zero();
/// m.set(0, 0, 3.0);
/// m.set(1, 1, 1.0);
/// let tol = adaptive_tolerance(&m, 1e-12);
/// assert!(tol > 1e-12);
/// ```
#[must_use]
pub fn adaptive_tolerance<const D: usize>(matrix: &Matrix<D>, base_tol: f64) -> f64 {
    let mut max_row_sum = 0.0f64;
    for i in 0..D {
        let row_sum: f64 = (0..D).map(|j| matrix_get(matrix, i, j).abs()).sum();
        max_row_sum = max_row_sum.max(row_sum);
    }
    let rel_factor = SINGULARITY_TOLERANCE;
    rel_factor.mul_add(max_row_sum, base_tol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn determinant_of_scaled_identity() {
        let mut m = Matrix::<3>::zero();
        for i in 0..3 {
            matrix_set(&mut m, i, i, 2.0);
        }
        assert_relative_eq!(determinant(&m), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn determinant_sign_follows_row_swap() {
        let mut m = Matrix::<2>::zero();
        matrix_set(&mut m, 0, 1, 1.0);
        matrix_set(&mut m, 1, 0, 1.0);
        assert_relative_eq!(determinant(&m), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn adaptive_tolerance_uses_max_row_sum() {
        let mut m = Matrix::<2>::zero();
        matrix_set(&mut m, 0, 0, 1.0);
        matrix_set(&mut m, 0, 1, -1.0);
        matrix_set(&mut m, 1, 1, 0.5);
        let tol = adaptive_tolerance(&m, 1e-12);
        assert_relative_eq!(tol, 1e-12 + 2.0e-12, epsilon = 1e-24);
    }
}
