//! Geometric utility functions for d-dimensional geometry calculations.
//!
//! Norms, checked scalar conversions, the circumsphere solver and point set
//! generators. The submodules are private and their public items are
//! re-exported here.

mod circumsphere;
mod conversions;
mod norms;
mod point_generation;

pub use circumsphere::*;
pub use conversions::*;
pub use norms::*;
pub use point_generation::*;

/// Errors raised by the point set generators.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum RandomPointGenerationError {
    /// The coordinate range is empty, inverted or not finite.
    #[error("Invalid coordinate range: min={min}, max={max}")]
    InvalidRange {
        /// Lower bound as requested
        min: String,
        /// Upper bound as requested
        max: String,
    },
    /// The requested point count is unusable.
    #[error("Invalid point count: {n_points}")]
    InvalidPointCount {
        /// Requested count
        n_points: usize,
    },
    /// Generation failed for a reason other than the range.
    #[error("Point generation failed for range [{min}, {max}]: {details}")]
    RandomGenerationFailed {
        /// Lower bound involved
        min: String,
        /// Upper bound involved
        max: String,
        /// Human-readable cause
        details: String,
    },
}
