//! Delaunay empty-circumsphere property validation utilities.
//!
//! All checks work on the caller's point slice and a list of [`Simplex`]
//! values, so they apply to any triangulation expressed with point ids, not
//! only to the output of [`triangulate`](crate::core::triangulation::triangulate).

#![forbid(unsafe_code)]

use rayon::prelude::*;
use thiserror::Error;

use crate::core::collections::{FastHashSet, PointId, fast_hash_set_with_capacity};
use crate::core::simplex::{Simplex, SimplexError};
use crate::geometry::point::Point;
use crate::geometry::predicates::{Orientation, simplex_orientation};
use crate::geometry::traits::coordinate::{CoordinateConversionError, CoordinateScalar};
use crate::geometry::util::circumsphere;

/// Errors that can occur during Delaunay property validation.
///
/// # Examples
///
/// ```rust
/// use dewall::core::util::DelaunayValidationError;
///
/// let err = DelaunayValidationError::DelaunayViolation {
///     simplex_index: 3,
///     point_index: 7,
/// };
/// assert!(err.to_string().contains("point 7"));
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum DelaunayValidationError {
    /// A simplex has the wrong vertex count, a repeated id, or an id outside
    /// the point slice.
    #[error("Malformed simplex at index {index}: {source}")]
    MalformedSimplex {
        /// Position of the simplex in the list
        index: usize,
        /// What is wrong with it
        #[source]
        source: SimplexError,
    },
    /// A simplex has (near) zero volume.
    #[error("Simplex at index {index} is degenerate")]
    DegenerateSimplex {
        /// Position of the simplex in the list
        index: usize,
    },
    /// The same vertex set appears twice.
    #[error("Simplex at index {index} duplicates an earlier simplex")]
    DuplicateSimplex {
        /// Position of the second occurrence
        index: usize,
    },
    /// A point lies strictly inside a simplex circumsphere.
    #[error("Simplex {simplex_index} violates the Delaunay property: point {point_index} lies inside its circumsphere")]
    DelaunayViolation {
        /// Position of the offending simplex
        simplex_index: usize,
        /// The point inside its circumsphere
        point_index: PointId,
    },
    /// An input point is not a vertex of any simplex.
    #[error("Point {point_index} is not a vertex of any simplex")]
    MissingVertex {
        /// The uncovered point
        point_index: PointId,
    },
    /// Numeric predicate failure during validation.
    #[error("Numeric predicate failure while validating simplex {index}: {source}")]
    NumericPredicateError {
        /// Position of the simplex being tested
        index: usize,
        /// Underlying conversion error
        #[source]
        source: CoordinateConversionError,
    },
}

/// Check that every simplex has D+1 distinct in-range ids, positive volume,
/// and a vertex set not shared with another simplex.
///
/// # Errors
///
/// Returns the first problem found, in simplex order.
pub fn validate_well_formed<T, const D: usize>(
    points: &[Point<T, D>],
    simplices: &[Simplex],
    base_tol: f64,
) -> Result<(), DelaunayValidationError>
where
    T: CoordinateScalar,
{
    let mut seen: FastHashSet<&Simplex> = fast_hash_set_with_capacity(simplices.len());
    for (index, simplex) in simplices.iter().enumerate() {
        // Re-validate: deserialized simplices bypass `Simplex::new`.
        Simplex::new::<D>(simplex.vertices())
            .map_err(|source| DelaunayValidationError::MalformedSimplex { index, source })?;
        let vertices = simplex
            .points(points)
            .map_err(|source| DelaunayValidationError::MalformedSimplex { index, source })?;
        let orientation = simplex_orientation(&vertices, base_tol)
            .map_err(|source| DelaunayValidationError::NumericPredicateError { index, source })?;
        if orientation == Orientation::DEGENERATE {
            return Err(DelaunayValidationError::DegenerateSimplex { index });
        }
        if !seen.insert(simplex) {
            return Err(DelaunayValidationError::DuplicateSimplex { index });
        }
    }
    Ok(())
}

/// Find every `(simplex index, point id)` pair where the point lies strictly
/// inside the simplex's circumsphere, beyond a relative `tolerance`.
///
/// Simplices whose ids are out of range or whose circumsphere is degenerate
/// are skipped; [`validate_well_formed`] reports those. The scan is brute
/// force over all points and runs in parallel over simplices.
///
/// # Examples
///
/// ```
/// use dewall::core::simplex::Simplex;
/// use dewall::core::util::find_delaunay_violations;
/// use dewall::geometry::point::Point;
/// use dewall::geometry::traits::coordinate::Coordinate;
///
/// let points = [
///     Point::new([0.0, 0.0]),
///     Point::new([4.0, 0.0]),
///     Point::new([0.0, 4.0]),
///     Point::new([1.0, 1.0]),
/// ];
/// let bad = [Simplex::new::<2>(&[0, 1, 2]).unwrap()];
/// assert_eq!(find_delaunay_violations(&points, &bad, 1e-9), vec![(0, 3)]);
/// ```
#[must_use]
pub fn find_delaunay_violations<T, const D: usize>(
    points: &[Point<T, D>],
    simplices: &[Simplex],
    tolerance: T,
) -> Vec<(usize, PointId)>
where
    T: CoordinateScalar,
{
    simplices
        .par_iter()
        .enumerate()
        .flat_map_iter(|(index, simplex)| {
            let sphere = simplex
                .points(points)
                .ok()
                .map(|vertices| circumsphere(&vertices, T::epsilon()))
                .filter(|s| !s.is_degenerate());
            points.iter().enumerate().filter_map(move |(id, p)| {
                let sphere = sphere.as_ref()?;
                (!simplex.contains(id) && sphere.contains(p, tolerance)).then_some((index, id))
            })
        })
        .collect()
}

/// Check the empty-circumsphere property for every simplex.
///
/// # Errors
///
/// Returns `DelaunayViolation` for the first violating pair.
pub fn validate_empty_circumspheres<T, const D: usize>(
    points: &[Point<T, D>],
    simplices: &[Simplex],
    tolerance: T,
) -> Result<(), DelaunayValidationError>
where
    T: CoordinateScalar,
{
    let violations = find_delaunay_violations(points, simplices, tolerance);
    match violations.first() {
        None => Ok(()),
        Some(&(simplex_index, point_index)) => {
            tracing::warn!(
                violations = violations.len(),
                simplex_index,
                point_index,
                "Delaunay property violated"
            );
            Err(DelaunayValidationError::DelaunayViolation {
                simplex_index,
                point_index,
            })
        }
    }
}

/// Check that every input point is a vertex of some simplex.
///
/// Only meaningful for non-degenerate input without duplicate points.
///
/// # Errors
///
/// Returns `MissingVertex` for the lowest uncovered id.
pub fn validate_vertex_coverage<T, const D: usize>(
    points: &[Point<T, D>],
    simplices: &[Simplex],
) -> Result<(), DelaunayValidationError>
where
    T: CoordinateScalar,
{
    let mut covered = vec![false; points.len()];
    for &id in simplices.iter().flat_map(Simplex::vertices) {
        if let Some(slot) = covered.get_mut(id) {
            *slot = true;
        }
    }
    covered
        .iter()
        .position(|&c| !c)
        .map_or(Ok(()), |point_index| {
            Err(DelaunayValidationError::MissingVertex { point_index })
        })
}

/// Well-formedness followed by the empty-circumsphere check.
///
/// # Errors
///
/// See [`validate_well_formed`] and [`validate_empty_circumspheres`].
pub fn validate_delaunay<T, const D: usize>(
    points: &[Point<T, D>],
    simplices: &[Simplex],
    tolerance: T,
) -> Result<(), DelaunayValidationError>
where
    T: CoordinateScalar,
{
    let base_tol = crate::geometry::util::safe_scalar_to_f64(T::epsilon()).unwrap_or(0.0);
    validate_well_formed(points, simplices, base_tol)?;
    validate_empty_circumspheres(points, simplices, tolerance)
}
