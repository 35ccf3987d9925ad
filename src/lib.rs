//! # dewall
//!
//! This is a library for computing the Delaunay triangulation of a set of
//! n-dimensional points with the DeWall divide-and-conquer algorithm
//! (Cignoni, Montani and Scopigno, 1998).
//!
//! # Features
//!
//! - d-dimensional Delaunay triangulations, from segments in 1D upwards
//! - Generic floating-point coordinate types (supports `f32`, `f64`, and
//!   other types implementing `CoordinateScalar`)
//! - A uniform spatial grid to speed up simplex completion
//! - Parallel recursion over independent half-spaces with [rayon](https://docs.rs/rayon)
//! - Serialization/Deserialization with [serde](https://serde.rs)
//!
//! # Basic Usage
//!
//! ```rust
//! use dewall::prelude::*;
//!
//! let points = vec![
//!     Point::new([0.0, 0.0]),
//!     Point::new([1.0, 0.0]),
//!     Point::new([0.0, 1.0]),
//!     Point::new([1.0, 1.1]),
//!     Point::new([0.4, 0.5]),
//! ];
//!
//! let simplices = triangulate(&points).unwrap();
//! assert_eq!(simplices.len(), 4);
//! for simplex in &simplices {
//!     assert_eq!(simplex.vertices().len(), 3);
//! }
//! ```
//!
//! The same input in 3D, through [`DeWallTriangulation`](core::triangulation::DeWallTriangulation)
//! and an explicit configuration:
//!
//! ```rust
//! use dewall::prelude::*;
//!
//! let points = vec![
//!     Point::new([0.0, 0.0, 0.0]),
//!     Point::new([1.0, 0.0, 0.0]),
//!     Point::new([0.0, 1.0, 0.0]),
//!     Point::new([0.0, 0.0, 1.0]),
//!     Point::new([0.3, 0.3, 0.3]),
//! ];
//! let config = DeWallConfigBuilder::default()
//!     .parallel_threshold(0)
//!     .build()
//!     .unwrap();
//!
//! let dt = DeWallTriangulation::with_config(&points, &config).unwrap();
//! assert_eq!(dt.dim(), 3);
//! assert_eq!(dt.number_of_simplices(), 4);
//! assert!(dt.validate_delaunay().is_ok());
//! assert!(dt.validate_vertex_coverage().is_ok());
//! ```
//!
//! # Algorithm
//!
//! DeWall splits the point set with an axis-aligned plane (the *alpha
//! plane*), builds the simplices that cross the plane (the *wall*), and then
//! recurses into the two halves. Each wall is grown from an active facet
//! list: a facet is popped, completed into a simplex by the point with the
//! smallest signed circumradius on its open side, and the new simplex's
//! other facets are toggled into the list that matches their position
//! relative to the plane. Facets that reach the lists of a half are handed
//! down to its recursive call.
//!
//! The two halves of a split share no simplices, so they run in parallel
//! once they are large enough (see
//! [`DeWallConfig::parallel_threshold`](core::config::DeWallConfig::parallel_threshold)).
//!
//! # Output guarantees
//!
//! For input in general position (no D+2 co-spherical points) the output is
//! the unique Delaunay triangulation of the input:
//!
//! - every simplex has D+1 distinct ids into the input slice and positive volume;
//! - no input point lies strictly inside a simplex circumsphere;
//! - every input point is a vertex of some simplex;
//! - the simplex list is sorted and free of duplicates.
//!
//! Degenerate input is not an error. Fewer than D+1 points, or points that
//! span fewer than D dimensions, give an empty triangulation. Duplicate
//! points are accepted; only one copy becomes a vertex.
//!
//! The checks above are available as standalone functions in
//! [`core::util`], and as methods on
//! [`DeWallTriangulation`](core::triangulation::DeWallTriangulation).

// Forbid unsafe code throughout the entire crate
#![forbid(unsafe_code)]

#[macro_use]
extern crate derive_builder;

/// The `core` module contains the triangulation algorithm and the
/// combinatorial types it produces.
///
/// It includes the [`Simplex`](core::simplex::Simplex) and
/// [`Facet`](core::facet::Facet) types, the DeWall recursion, and the
/// validation helpers.
pub mod core {
    /// Triangulation algorithms
    pub mod algorithms {
        /// Divide-and-conquer recursion over alpha planes
        pub mod dewall;
        /// Simplex completion and first-simplex construction
        pub mod simplex_constructor;
    }
    /// High-performance collection types optimized for computational geometry
    pub mod collections;
    /// Triangulation options
    pub mod config;
    pub mod facet;
    pub mod simplex;
    /// Entry points and the triangulation result type
    pub mod triangulation;
    pub mod util;
    // Re-export the `core` modules.
    pub use config::*;
    pub use facet::*;
    pub use simplex::*;
    pub use triangulation::*;
    pub use util::*;
    // Note: collections module not re-exported here to avoid namespace pollution
    // Import specific types via prelude or use crate::core::collections::
}

/// Contains geometric types including the `Point` struct and geometry predicates.
///
/// The geometry module provides a coordinate abstraction through the `Coordinate` trait
/// that unifies coordinate operations across different storage mechanisms. The `Point`
/// type implements this abstraction, providing generic floating-point coordinate support
/// (for `f32`, `f64`, and other types implementing `CoordinateScalar`) with proper NaN
/// handling, validation, and hashing.
pub mod geometry {
    pub mod matrix;
    pub mod point;
    pub mod predicates;
    /// Geometric utility functions for d-dimensional geometry calculations
    pub mod util;
    /// Traits module containing coordinate abstractions.
    ///
    /// This module contains the `Coordinate` trait that abstracts coordinate
    /// operations, along with supporting traits for validation (`FiniteCheck`),
    /// equality comparison (`OrderedEq`), and hashing (`HashCoordinate`) of
    /// floating-point coordinate values.
    pub mod traits {
        pub mod coordinate;
        pub use coordinate::*;
    }
    pub use matrix::*;
    pub use point::*;
    pub use predicates::*;
    pub use traits::*;
    pub use util::*;
}

/// A prelude module that re-exports commonly used types.
/// This makes it easier to import the most commonly used items from the crate.
pub mod prelude {
    // Re-export from core
    pub use crate::core::{config::*, facet::*, simplex::*, triangulation::*, util::*};

    // Re-export commonly used collection types from core::collections
    pub use crate::core::collections::{
        FastHashMap, FastHashSet, PointId, SmallBuffer, SpatialGrid, fast_hash_map_with_capacity,
        fast_hash_set_with_capacity,
    };

    // Re-export from geometry
    pub use crate::geometry::{
        matrix::*, point::*, predicates::*, traits::coordinate::*, util::*,
    };
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}

// =============================================================================
// TESTS
// =============================================================================
