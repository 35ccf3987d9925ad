//! Geometric predicates for d-dimensional geometry calculations.
//!
//! The only orientation question the DeWall construction asks is which side
//! of a facet's supporting hyperplane a point lies on. With facet vertices
//! `v0..v(D-1)` that is the sign of
//!
//! ```text
//! | v1 - v0       |
//! | ...           |
//! | v(D-1) - v0   |
//! | p - v0        |
//! ```
//!
//! a D×D determinant, evaluated with `la-stack` and compared against an
//! adaptive tolerance.

use crate::geometry::matrix::{Matrix, adaptive_tolerance, determinant, matrix_set};
use crate::geometry::point::Point;
use crate::geometry::traits::coordinate::{Coordinate, CoordinateConversionError, CoordinateScalar};
use crate::geometry::util::safe_coords_to_f64;

/// Represents the orientation of a point relative to an oriented hyperplane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Negative side (determinant < 0)
    NEGATIVE,
    /// On the hyperplane (determinant ≈ 0)
    DEGENERATE,
    /// Positive side (determinant > 0)
    POSITIVE,
}

impl Orientation {
    /// The opposite side; `DEGENERATE` maps to itself.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::NEGATIVE => Self::POSITIVE,
            Self::DEGENERATE => Self::DEGENERATE,
            Self::POSITIVE => Self::NEGATIVE,
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NEGATIVE => write!(f, "NEGATIVE"),
            Self::DEGENERATE => write!(f, "DEGENERATE"),
            Self::POSITIVE => write!(f, "POSITIVE"),
        }
    }
}

/// Side of the hyperplane through `facet` on which `point` lies.
///
/// The sign depends on the vertex order of `facet`; only comparisons between
/// points tested against the same ordered facet are meaningful. Points within
/// `adaptive_tolerance(m, base_tol)` of the hyperplane, and non-finite
/// determinants, are reported as `DEGENERATE`.
///
/// # Errors
///
/// Returns a `CoordinateConversionError` if a coordinate cannot be converted
/// to `f64`.
///
/// ```
/// use dewall::geometry::point::Point;
/// use dewall::geometry::predicates::{Orientation, facet_orientation};
/// use dewall::geometry::traits::coordinate::Coordinate;
///
/// let edge = [Point::new([0.0, 0.0]), Point::new([1.0, 0.0])];
/// let above = facet_orientation(&edge, &Point::new([0.3, 1.0]), 1e-12).unwrap();
/// let below = facet_orientation(&edge, &Point::new([0.3, -1.0]), 1e-12).unwrap();
/// assert_eq!(above, below.flipped());
/// assert_eq!(
///     facet_orientation(&edge, &Point::new([5.0, 0.0]), 1e-12).unwrap(),
///     Orientation::DEGENERATE
/// );
/// ```
pub fn facet_orientation<T, const D: usize>(
    facet: &[Point<T, D>; D],
    point: &Point<T, D>,
    base_tol: f64,
) -> Result<Orientation, CoordinateConversionError>
where
    T: CoordinateScalar,
{
    let Some(first) = facet.first() else {
        return Ok(Orientation::DEGENERATE);
    };
    let origin = safe_coords_to_f64(first.to_array())?;

    let mut matrix = Matrix::<D>::zero();
    for (row, vertex) in facet[1..].iter().chain(std::iter::once(point)).enumerate() {
        let coords = safe_coords_to_f64(vertex.to_array())?;
        for (col, (&c, &o)) in coords.iter().zip(origin.iter()).enumerate() {
            matrix_set(&mut matrix, row, col, c - o);
        }
    }

    let det = determinant(&matrix);
    let tolerance = adaptive_tolerance(&matrix, base_tol);

    Ok(if !det.is_finite() || det.abs() <= tolerance {
        Orientation::DEGENERATE
    } else if det > 0.0 {
        Orientation::POSITIVE
    } else {
        Orientation::NEGATIVE
    })
}

/// Orientation of a full D-simplex given as D+1 points, or `DEGENERATE` if
/// the slice does not hold exactly D+1 points.
///
/// # Errors
///
/// Returns a `CoordinateConversionError` if a coordinate cannot be converted
/// to `f64`.
///
/// ```
/// use dewall::geometry::point::Point;
/// use dewall::geometry::predicates::{Orientation, simplex_orientation};
/// use dewall::geometry::traits::coordinate::Coordinate;
///
/// let tri = [Point::new([0.0, 0.0]), Point::new([1.0, 0.0]), Point::new([0.0, 1.0])];
/// assert_ne!(simplex_orientation(&tri, 1e-12).unwrap(), Orientation::DEGENERATE);
/// ```
pub fn simplex_orientation<T, const D: usize>(
    simplex_points: &[Point<T, D>],
    base_tol: f64,
) -> Result<Orientation, CoordinateConversionError>
where
    T: CoordinateScalar,
{
    let Some((apex, base)) = simplex_points.split_last() else {
        return Ok(Orientation::DEGENERATE);
    };
    let Ok(facet) = <&[Point<T, D>; D]>::try_from(base) else {
        return Ok(Orientation::DEGENERATE);
    };
    facet_orientation(facet, apex, base_tol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_facet_in_3d_separates_half_spaces() {
        let facet = [
            Point::new([0.0, 0.0, 0.0]),
            Point::new([1.0, 0.0, 0.0]),
            Point::new([0.0, 1.0, 0.0]),
        ];
        let up = facet_orientation(&facet, &Point::new([0.2, 0.2, 3.0]), 1e-12).unwrap();
        let down = facet_orientation(&facet, &Point::new([9.0, -4.0, -0.5]), 1e-12).unwrap();
        assert_eq!(up, Orientation::POSITIVE);
        assert_eq!(down, Orientation::NEGATIVE);
        let on = facet_orientation(&facet, &Point::new([7.0, 7.0, 0.0]), 1e-12).unwrap();
        assert_eq!(on, Orientation::DEGENERATE);
    }

    #[test]
    fn one_dimensional_facet_is_a_point() {
        let facet = [Point::new([2.0])];
        assert_eq!(
            facet_orientation(&facet, &Point::new([3.0]), 1e-12).unwrap(),
            Orientation::POSITIVE
        );
        assert_eq!(
            facet_orientation(&facet, &Point::new([1.0]), 1e-12).unwrap(),
            Orientation::NEGATIVE
        );
    }

    #[test]
    fn non_finite_coordinates_are_errors() {
        let facet = [Point::new([0.0, 0.0]), Point::new([1.0, 0.0])];
        assert!(facet_orientation(&facet, &Point::new([f64::NAN, 1.0]), 1e-12).is_err());
    }

    #[test]
    fn simplex_orientation_rejects_wrong_arity() {
        let pts = [Point::new([0.0, 0.0]), Point::new([1.0, 0.0])];
        assert_eq!(
            simplex_orientation(&pts, 1e-12).unwrap(),
            Orientation::DEGENERATE
        );
        assert_eq!(Orientation::NEGATIVE.to_string(), "NEGATIVE");
        assert_eq!(Orientation::DEGENERATE.flipped(), Orientation::DEGENERATE);
    }
}
