//! High-performance collection types used by the triangulation.
//!
//! - **`FastHashMap` / `FastHashSet`**: `rustc-hash` maps keyed by small
//!   integer arrays (grid cells, sorted facet ids)
//! - **`SmallBuffer`**: `smallvec` storage for simplex vertex ids and grid
//!   buckets
//! - **`SpatialGrid`**: the uniform grid index and its ring-search cursor

mod aliases;
mod helpers;
mod spatial_hash_grid;

pub use aliases::*;
pub use helpers::*;
pub use spatial_hash_grid::{GridCell, RingSearch, SpatialGrid};
