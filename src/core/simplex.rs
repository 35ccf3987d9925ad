//! D-simplices of the output triangulation.
//!
//! A [`Simplex`] is D+1 distinct point ids stored sorted ascending, so two
//! simplices over the same vertex set compare and hash equal regardless of
//! the order in which their vertices were discovered. The dimension is not
//! part of the type; it is implied by the vertex count.
//!
//! # Examples
//!
//! ```rust
//! use dewall::core::simplex::Simplex;
//!
//! let s = Simplex::new::<2>(&[4, 0, 7]).unwrap();
//! assert_eq!(s.vertices(), &[0, 4, 7]);
//! assert_eq!(s.dimension(), 2);
//! assert!(Simplex::new::<2>(&[1, 1, 2]).is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::collections::{MAX_PRACTICAL_DIMENSION_SIZE, PointId, PointIdBuffer, SmallBuffer};
use super::facet::Facet;
use crate::geometry::point::Point;
use crate::geometry::traits::coordinate::CoordinateScalar;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised when building or resolving a simplex.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SimplexError {
    /// The vertex count does not match the dimension.
    #[error("Simplex must have exactly {expected} vertices for {dimension}D, got {actual}")]
    WrongVertexCount {
        /// D + 1
        expected: usize,
        /// Number of ids supplied
        actual: usize,
        /// The dimension D
        dimension: usize,
    },
    /// A vertex id appears more than once.
    #[error("Duplicate vertex id {id} in simplex")]
    DuplicateVertex {
        /// The repeated id
        id: PointId,
    },
    /// A vertex id does not index into the point slice.
    #[error("Vertex id {id} is out of range for {len} points")]
    PointOutOfRange {
        /// The offending id
        id: PointId,
        /// Length of the point slice
        len: usize,
    },
}

// =============================================================================
// SIMPLEX
// =============================================================================

/// A D-simplex given by D+1 sorted, distinct point ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Simplex {
    vertices: PointIdBuffer,
}

impl Simplex {
    /// Build a D-simplex from D+1 distinct ids in any order.
    ///
    /// # Errors
    ///
    /// Returns `SimplexError::WrongVertexCount` if `ids.len() != D + 1` and
    /// `SimplexError::DuplicateVertex` if an id repeats.
    pub fn new<const D: usize>(ids: &[PointId]) -> Result<Self, SimplexError> {
        if ids.len() != D + 1 {
            return Err(SimplexError::WrongVertexCount {
                expected: D + 1,
                actual: ids.len(),
                dimension: D,
            });
        }
        let mut vertices: PointIdBuffer = ids.iter().copied().collect();
        vertices.sort_unstable();
        if let Some(pair) = vertices.windows(2).find(|w| w[0] == w[1]) {
            return Err(SimplexError::DuplicateVertex { id: pair[0] });
        }
        Ok(Self { vertices })
    }

    /// Join a facet with an apex not on it.
    pub(crate) fn from_facet<const D: usize>(facet: &Facet<D>, apex: PointId) -> Self {
        debug_assert!(!facet.contains(apex), "apex {apex} lies on the facet");
        let mut vertices: PointIdBuffer = facet.vertices().iter().copied().collect();
        let at = vertices.partition_point(|&v| v < apex);
        vertices.insert(at, apex);
        Self { vertices }
    }

    /// Sorted vertex ids.
    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[PointId] {
        &self.vertices
    }

    /// Dimension of the simplex (vertex count minus one).
    #[inline]
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.vertices.len().saturating_sub(1)
    }

    /// Returns true if `id` is a vertex of this simplex.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: PointId) -> bool {
        self.vertices.binary_search(&id).is_ok()
    }

    /// The D+1 facets, each recording the vertex it omits as its opposite.
    ///
    /// Empty if this simplex is not D-dimensional.
    #[must_use]
    pub fn facets<const D: usize>(&self) -> SmallBuffer<Facet<D>, MAX_PRACTICAL_DIMENSION_SIZE> {
        if self.vertices.len() != D + 1 {
            return SmallBuffer::new();
        }
        (0..=D)
            .map(|skip| {
                let ids: [PointId; D] =
                    std::array::from_fn(|j| self.vertices[if j < skip { j } else { j + 1 }]);
                Facet::from_sorted(ids, Some(self.vertices[skip]))
            })
            .collect()
    }

    /// Resolve the vertex ids against the input points.
    ///
    /// # Errors
    ///
    /// Returns `SimplexError::PointOutOfRange` if an id does not index into
    /// `points`.
    pub fn points<T, const D: usize>(
        &self,
        points: &[Point<T, D>],
    ) -> Result<SmallBuffer<Point<T, D>, MAX_PRACTICAL_DIMENSION_SIZE>, SimplexError>
    where
        T: CoordinateScalar,
    {
        self.vertices
            .iter()
            .map(|&id| {
                points.get(id).copied().ok_or(SimplexError::PointOutOfRange {
                    id,
                    len: points.len(),
                })
            })
            .collect()
    }
}

impl fmt::Display for Simplex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Simplex{:?}", self.vertices.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::traits::coordinate::Coordinate;

    #[test]
    fn simplex_new_sorts_and_validates() {
        let s = Simplex::new::<3>(&[9, 2, 5, 0]).unwrap();
        assert_eq!(s.vertices(), &[0, 2, 5, 9]);
        assert!(s.contains(5));
        assert!(!s.contains(4));

        assert_eq!(
            Simplex::new::<3>(&[0, 1, 2]),
            Err(SimplexError::WrongVertexCount {
                expected: 4,
                actual: 3,
                dimension: 3
            })
        );
        assert_eq!(
            Simplex::new::<2>(&[3, 1, 3]),
            Err(SimplexError::DuplicateVertex { id: 3 })
        );
    }

    #[test]
    fn simplex_equality_is_set_based() {
        let a = Simplex::new::<2>(&[1, 2, 3]).unwrap();
        let b = Simplex::new::<2>(&[3, 1, 2]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "Simplex[1, 2, 3]");
    }

    #[test]
    fn simplex_facets_record_opposite_vertex() {
        let s = Simplex::new::<2>(&[4, 8, 6]).unwrap();
        let facets = s.facets::<2>();
        assert_eq!(facets.len(), 3);
        for f in &facets {
            let opposite = f.opposite().unwrap();
            assert!(s.contains(opposite));
            assert!(!f.contains(opposite));
            assert_eq!(Simplex::from_facet(f, opposite), s);
        }
        assert!(s.facets::<3>().is_empty());
    }

    #[test]
    fn simplex_points_resolve_ids() {
        let points = [
            Point::new([0.0, 0.0]),
            Point::new([1.0, 0.0]),
            Point::new([0.0, 1.0]),
        ];
        let s = Simplex::new::<2>(&[2, 0, 1]).unwrap();
        let resolved = s.points(&points).unwrap();
        assert_eq!(resolved.as_slice(), &points);

        let far = Simplex::new::<2>(&[0, 1, 7]).unwrap();
        assert_eq!(
            far.points(&points),
            Err(SimplexError::PointOutOfRange { id: 7, len: 3 })
        );
    }

    #[test]
    fn simplex_serde_roundtrip() {
        let s = Simplex::new::<3>(&[3, 2, 1, 0]).unwrap();
        let json = serde_json::to_string(&s).unwrap();
        let back: Simplex = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
