//! Facets and the Active Face List.
//!
//! A [`Facet`] is a (D-1)-simplex given by D point ids, optionally remembering
//! the vertex of the simplex it was cut from (its *opposite* vertex). Facet
//! identity is the vertex set alone: the ids are kept sorted and double as the
//! [`FacetKey`], and the opposite vertex does not take part in equality.
//!
//! The [`ActiveFacetList`] holds the facets whose second simplex has not been
//! found yet. Its insertion is a toggle: adding a facet that is already
//! present removes it, because the simplex just built on the other side
//! closes it.
//!
//! # Examples
//!
//! ```rust
//! use dewall::core::facet::{ActiveFacetList, Facet};
//!
//! let mut afl = ActiveFacetList::<2>::new();
//! let f = Facet::new([3, 1], Some(0)).unwrap();
//! assert!(afl.toggle(f));
//! assert!(afl.contains(&[1, 3]));
//! // Same edge seen from the other side closes it.
//! assert!(!afl.toggle(Facet::new([1, 3], Some(7)).unwrap()));
//! assert!(afl.is_empty());
//! ```

use std::hash::{Hash, Hasher};

use thiserror::Error;

use super::collections::{FastHashMap, PointId, fast_hash_map_with_capacity};

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Error type for facet construction.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum FacetError {
    /// A vertex id appears more than once.
    #[error("Duplicate vertex id {id} in facet")]
    DuplicateVertex {
        /// The repeated id
        id: PointId,
    },
    /// The opposite vertex is one of the facet's own vertices.
    #[error("Opposite vertex {id} lies on the facet")]
    OppositeOnFacet {
        /// The opposite vertex id
        id: PointId,
    },
}

// =============================================================================
// FACET
// =============================================================================

/// Sorted vertex ids of a facet; equal for equal vertex sets.
pub type FacetKey<const D: usize> = [PointId; D];

/// A (D-1)-face given by D point ids and an optional opposite vertex.
#[derive(Clone, Copy, Debug)]
pub struct Facet<const D: usize> {
    vertices: FacetKey<D>,
    opposite: Option<PointId>,
}

impl<const D: usize> Facet<D> {
    /// Build a facet from D distinct ids in any order.
    ///
    /// # Errors
    ///
    /// Returns `FacetError::DuplicateVertex` if an id repeats and
    /// `FacetError::OppositeOnFacet` if `opposite` is one of `vertices`.
    pub fn new(mut vertices: [PointId; D], opposite: Option<PointId>) -> Result<Self, FacetError> {
        vertices.sort_unstable();
        if let Some(pair) = vertices.windows(2).find(|w| w[0] == w[1]) {
            return Err(FacetError::DuplicateVertex { id: pair[0] });
        }
        if let Some(id) = opposite.filter(|id| vertices.binary_search(id).is_ok()) {
            return Err(FacetError::OppositeOnFacet { id });
        }
        Ok(Self { vertices, opposite })
    }

    pub(crate) const fn from_sorted(vertices: FacetKey<D>, opposite: Option<PointId>) -> Self {
        Self { vertices, opposite }
    }

    /// Sorted vertex ids.
    #[inline]
    #[must_use]
    pub const fn vertices(&self) -> &FacetKey<D> {
        &self.vertices
    }

    /// The set-identity key of this facet.
    #[inline]
    #[must_use]
    pub const fn key(&self) -> FacetKey<D> {
        self.vertices
    }

    /// Vertex of the simplex this facet was taken from, if any.
    #[inline]
    #[must_use]
    pub const fn opposite(&self) -> Option<PointId> {
        self.opposite
    }

    /// Returns true if `id` is one of the facet's vertices.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: PointId) -> bool {
        self.vertices.binary_search(&id).is_ok()
    }
}

impl<const D: usize> PartialEq for Facet<D> {
    fn eq(&self, other: &Self) -> bool {
        self.vertices == other.vertices
    }
}

impl<const D: usize> Eq for Facet<D> {}

impl<const D: usize> Hash for Facet<D> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.vertices.hash(state);
    }
}

// =============================================================================
// ACTIVE FACE LIST
// =============================================================================

/// Open facets keyed by vertex set, with toggle insertion.
///
/// Facets are handed out last-in first-out. Removal by toggle leaves a stale
/// key in the order stack; stale keys are skipped when popping.
#[derive(Clone, Debug, Default)]
pub struct ActiveFacetList<const D: usize> {
    facets: FastHashMap<FacetKey<D>, Facet<D>>,
    order: Vec<FacetKey<D>>,
}

impl<const D: usize> ActiveFacetList<D> {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            facets: FastHashMap::default(),
            order: Vec::new(),
        }
    }

    /// Creates an empty list with room for `capacity` facets.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            facets: fast_hash_map_with_capacity(capacity),
            order: Vec::with_capacity(capacity),
        }
    }

    /// Number of open facets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facets.len()
    }

    /// Returns true if no facet is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    /// Returns true if a facet with this key is open.
    #[must_use]
    pub fn contains(&self, key: &FacetKey<D>) -> bool {
        self.facets.contains_key(key)
    }

    /// Insert `facet`, or remove it if a facet with the same vertex set is
    /// already open. Returns true if the facet was inserted.
    pub fn toggle(&mut self, facet: Facet<D>) -> bool {
        let key = facet.key();
        if self.facets.remove(&key).is_some() {
            return false;
        }
        self.facets.insert(key, facet);
        self.order.push(key);
        true
    }

    /// Remove and return the most recently inserted open facet.
    pub fn pop(&mut self) -> Option<Facet<D>> {
        while let Some(key) = self.order.pop() {
            if let Some(facet) = self.facets.remove(&key) {
                return Some(facet);
            }
        }
        None
    }

    /// Consume the list, yielding open facets in insertion order.
    pub fn into_ordered(mut self) -> impl Iterator<Item = Facet<D>> {
        let order = std::mem::take(&mut self.order);
        order
            .into_iter()
            .filter_map(move |key| self.facets.remove(&key))
    }
}

impl<const D: usize> Extend<Facet<D>> for ActiveFacetList<D> {
    fn extend<I: IntoIterator<Item = Facet<D>>>(&mut self, iter: I) {
        for facet in iter {
            self.toggle(facet);
        }
    }
}

impl<const D: usize> FromIterator<Facet<D>> for ActiveFacetList<D> {
    fn from_iter<I: IntoIterator<Item = Facet<D>>>(iter: I) -> Self {
        let mut afl = Self::new();
        afl.extend(iter);
        afl
    }
}
