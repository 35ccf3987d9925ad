//! Triangulation configuration.
//!
//! [`DeWallConfig`] is a plain value type. Build it directly, take the
//! [`Default`], or use the generated [`DeWallConfigBuilder`]:
//!
//! ```rust
//! use dewall::core::config::{DeWallConfig, DeWallConfigBuilder};
//!
//! let config: DeWallConfig<f64> = DeWallConfigBuilder::default()
//!     .epsilon(1e-12)
//!     .parallel_threshold(2_000)
//!     .build()
//!     .unwrap();
//! assert!(config.use_spatial_index);
//! assert!(config.ring_patience.is_none());
//!
//! assert!(DeWallConfigBuilder::<f64>::default().epsilon(-1.0).build().is_err());
//! ```

use std::num::NonZeroUsize;

use thiserror::Error;

use crate::geometry::traits::coordinate::CoordinateScalar;

/// Errors reported by [`DeWallConfig::validate`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// The degeneracy tolerance is negative, NaN or infinite.
    #[error("epsilon must be finite and non-negative, got {value}")]
    InvalidEpsilon {
        /// The rejected value, formatted
        value: String,
    },
}

/// Options for a triangulation run.
#[derive(Builder, Clone, Copy, Debug, PartialEq)]
#[builder(build_fn(validate = "Self::validate_fields"))]
pub struct DeWallConfig<T>
where
    T: CoordinateScalar,
{
    /// Degeneracy tolerance for the circumsphere solver and the base of the
    /// side-test tolerance.
    #[builder(default = "T::epsilon()")]
    pub epsilon: T,
    /// Subsets larger than this are split across threads with
    /// `rayon::join`; 0 keeps the recursion on the calling thread.
    #[builder(default)]
    pub parallel_threshold: usize,
    /// Search candidates through the spatial grid (true) or scan the whole
    /// subset for every facet (false). Both give the same triangulation.
    #[builder(default = "true")]
    pub use_spatial_index: bool,
    /// Stop a ring search after this many consecutive rings without a better
    /// candidate. Faster on dense inputs but may pick a non-Delaunay vertex;
    /// `None` uses only the exact distance bound.
    #[builder(setter(strip_option), default)]
    pub ring_patience: Option<NonZeroUsize>,
}

impl<T> Default for DeWallConfig<T>
where
    T: CoordinateScalar,
{
    fn default() -> Self {
        Self {
            epsilon: T::epsilon(),
            parallel_threshold: 0,
            use_spatial_index: true,
            ring_patience: None,
        }
    }
}

impl<T> DeWallConfig<T>
where
    T: CoordinateScalar,
{
    /// Check option values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEpsilon` if `epsilon` is negative or not
    /// finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_epsilon(self.epsilon)
    }
}

impl<T> DeWallConfigBuilder<T>
where
    T: CoordinateScalar,
{
    fn validate_fields(&self) -> Result<(), String> {
        self.epsilon
            .map_or(Ok(()), check_epsilon)
            .map_err(|e| e.to_string())
    }
}

fn check_epsilon<T: CoordinateScalar>(epsilon: T) -> Result<(), ConfigError> {
    if epsilon.is_finite() && epsilon >= T::zero() {
        Ok(())
    } else {
        Err(ConfigError::InvalidEpsilon {
            value: format!("{epsilon:?}"),
        })
    }
}
