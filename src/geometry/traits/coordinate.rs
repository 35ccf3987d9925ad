//! Coordinate traits for d-dimensional points.
//!
//! The engine is generic over a floating-point scalar `T` and a compile-time
//! dimension `D`. This module collects the bounds every scalar must satisfy
//! ([`CoordinateScalar`]) together with the [`Coordinate`] abstraction that
//! [`Point`](crate::geometry::point::Point) implements.
//!
//! # Overview
//!
//! - **`Coordinate<T, D>`**: coordinate storage and access
//! - **`CoordinateScalar`**: trait alias consolidating scalar requirements
//! - **`FiniteCheck`**: rejects NaN and infinities
//! - **`OrderedEq`**: NaN-aware equality so points can key hash collections
//! - **`HashCoordinate`**: consistent hashing of floating-point values
//!
//! ```rust
//! use dewall::geometry::point::Point;
//! use dewall::geometry::traits::coordinate::Coordinate;
//!
//! let p: Point<f64, 3> = Coordinate::new([1.0, 2.0, 3.0]);
//! assert_eq!(p.dim(), 3);
//! assert!(p.validate().is_ok());
//!
//! let bad: Point<f64, 2> = Coordinate::new([f64::NAN, 1.0]);
//! assert!(bad.validate().is_err());
//! ```

use num_traits::{Float, Zero};
use ordered_float::OrderedFloat;
use serde::{Serialize, de::DeserializeOwned};
use std::{
    fmt::Debug,
    hash::{Hash, Hasher},
};

/// Errors that can occur while converting coordinates between scalar types.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum CoordinateConversionError {
    /// Conversion to or from the working precision failed.
    #[error(
        "Failed to convert coordinate at index {coordinate_index} from {from_type} to {to_type}: {coordinate_value}"
    )]
    ConversionFailed {
        /// Index of the coordinate that failed to convert
        coordinate_index: usize,
        /// String representation of the problematic coordinate value
        coordinate_value: String,
        /// Source type name
        from_type: &'static str,
        /// Target type name
        to_type: &'static str,
    },
    /// Non-finite value (NaN or infinity) encountered during conversion.
    #[error(
        "Non-finite value (NaN or infinity) at coordinate index {coordinate_index}: {coordinate_value}"
    )]
    NonFiniteValue {
        /// Index of the coordinate that contains the non-finite value
        coordinate_index: usize,
        /// String representation of the non-finite coordinate value
        coordinate_value: String,
    },
}

/// Errors that can occur during coordinate validation.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum CoordinateValidationError {
    /// A coordinate value is invalid (NaN or infinite).
    #[error(
        "Invalid coordinate at index {coordinate_index} in dimension {dimension}: {coordinate_value}"
    )]
    InvalidCoordinate {
        /// Index of the invalid coordinate.
        coordinate_index: usize,
        /// Value of the invalid coordinate, as a string.
        coordinate_value: String,
        /// The dimensionality of the coordinate system.
        dimension: usize,
    },
}

/// Default tolerance for f32 floating-point comparisons.
pub const DEFAULT_TOLERANCE_F32: f32 = 1e-6;

/// Default tolerance for f64 floating-point comparisons.
pub const DEFAULT_TOLERANCE_F64: f64 = 1e-15;

// =============================================================================
// SUPPORTING TRAITS
// =============================================================================

/// Helper trait for checking finiteness of coordinates.
///
/// ```
/// use dewall::geometry::traits::coordinate::FiniteCheck;
///
/// assert!(3.25f64.is_finite_generic());
/// assert!(!f64::NAN.is_finite_generic());
/// assert!(!f32::INFINITY.is_finite_generic());
/// ```
pub trait FiniteCheck {
    /// Returns true if the value is finite (not NaN or infinite).
    fn is_finite_generic(&self) -> bool;
}

macro_rules! impl_finite_check {
    (float: $($t:ty),*) => {
        $(
            impl FiniteCheck for $t {
                #[inline(always)]
                fn is_finite_generic(&self) -> bool {
                    self.is_finite()
                }
            }
        )*
    };
}

impl_finite_check!(float: f32, f64);

/// Equality that treats NaN as equal to itself.
///
/// ```
/// use dewall::geometry::traits::coordinate::OrderedEq;
///
/// assert!(1.0f64.ordered_eq(&1.0f64));
/// assert!(f64::NAN.ordered_eq(&f64::NAN));
/// assert!(0.0f64.ordered_eq(&(-0.0f64)));
/// ```
pub trait OrderedEq {
    /// Compares two values using `OrderedFloat` semantics.
    fn ordered_eq(&self, other: &Self) -> bool;
}

macro_rules! impl_ordered_eq {
    (float: $($t:ty),*) => {
        $(
            impl OrderedEq for $t {
                #[inline(always)]
                fn ordered_eq(&self, other: &Self) -> bool {
                    OrderedFloat(*self) == OrderedFloat(*other)
                }
            }
        )*
    };
}

impl_ordered_eq!(float: f32, f64);

/// Consistent hashing for floating-point scalars.
///
/// ```
/// use dewall::geometry::traits::coordinate::HashCoordinate;
/// use std::collections::hash_map::DefaultHasher;
/// use std::hash::Hasher;
///
/// let mut h1 = DefaultHasher::new();
/// let mut h2 = DefaultHasher::new();
/// f64::NAN.hash_scalar(&mut h1);
/// f64::NAN.hash_scalar(&mut h2);
/// assert_eq!(h1.finish(), h2.finish());
/// ```
pub trait HashCoordinate {
    /// Hashes a single coordinate value using the provided hasher.
    fn hash_scalar<H: Hasher>(&self, state: &mut H);
}

macro_rules! impl_hash_coordinate {
    (float: $($t:ty),*) => {
        $(
            impl HashCoordinate for $t {
                #[inline(always)]
                fn hash_scalar<H: Hasher>(&self, state: &mut H) {
                    OrderedFloat(*self).hash(state);
                }
            }
        )*
    };
}

impl_hash_coordinate!(float: f32, f64);

/// Trait alias for the scalar type requirements of the engine.
///
/// `Send + Sync` are required because point slices are shared across
/// fork-join branches.
///
/// ```rust
/// use dewall::geometry::traits::coordinate::CoordinateScalar;
///
/// fn midpoint<T: CoordinateScalar>(a: T, b: T) -> T {
///     (a + b) / (T::one() + T::one())
/// }
/// assert_eq!(midpoint(1.0f64, 3.0), 2.0);
/// ```
pub trait CoordinateScalar:
    Float
    + OrderedEq
    + HashCoordinate
    + FiniteCheck
    + Default
    + Debug
    + Send
    + Sync
    + Serialize
    + DeserializeOwned
{
    /// Returns the default comparison tolerance for this scalar type.
    ///
    /// ```
    /// use dewall::geometry::traits::coordinate::CoordinateScalar;
    ///
    /// assert_eq!(f32::default_tolerance(), 1e-6_f32);
    /// assert_eq!(f64::default_tolerance(), 1e-15_f64);
    /// ```
    fn default_tolerance() -> Self;

    /// Number of significant binary digits, the implicit leading bit
    /// included. Integers up to `2^mantissa_digits()` are exact.
    ///
    /// ```
    /// use dewall::geometry::traits::coordinate::CoordinateScalar;
    ///
    /// assert_eq!(f32::mantissa_digits(), 24);
    /// assert_eq!(f64::mantissa_digits(), 53);
    /// ```
    fn mantissa_digits() -> u32;
}

impl CoordinateScalar for f32 {
    fn default_tolerance() -> Self {
        DEFAULT_TOLERANCE_F32
    }

    fn mantissa_digits() -> u32 {
        Self::MANTISSA_DIGITS
    }
}

impl CoordinateScalar for f64 {
    fn default_tolerance() -> Self {
        DEFAULT_TOLERANCE_F64
    }

    fn mantissa_digits() -> u32 {
        Self::MANTISSA_DIGITS
    }
}

/// Coordinate storage abstraction implemented by [`Point`](crate::geometry::point::Point).
pub trait Coordinate<T, const D: usize>
where
    T: CoordinateScalar,
    Self: Copy + Clone + Default + Debug + PartialEq + Eq + Hash + Sized,
{
    /// The number of dimensions (D).
    #[must_use]
    fn dim(&self) -> usize {
        D
    }

    /// Create a new coordinate from an array of scalar values.
    fn new(coords: [T; D]) -> Self;

    /// Convert the coordinate to an array of scalar values.
    #[must_use]
    fn to_array(&self) -> [T; D];

    /// Get the coordinate at the specified index, if in range.
    #[must_use]
    fn get(&self, index: usize) -> Option<T>;

    /// The origin of the coordinate system.
    #[must_use]
    fn origin() -> Self
    where
        T: Zero,
    {
        Self::new([T::zero(); D])
    }

    /// Validate that every coordinate is finite.
    ///
    /// # Errors
    ///
    /// Returns `CoordinateValidationError::InvalidCoordinate` for the first
    /// NaN or infinite coordinate.
    fn validate(&self) -> Result<(), CoordinateValidationError> {
        for (index, coord) in self.to_array().iter().enumerate() {
            if !coord.is_finite_generic() {
                return Err(CoordinateValidationError::InvalidCoordinate {
                    coordinate_index: index,
                    coordinate_value: format!("{coord:?}"),
                    dimension: D,
                });
            }
        }
        Ok(())
    }

    /// Hash every coordinate with NaN-consistent semantics.
    fn hash_coordinate<H: Hasher>(&self, state: &mut H) {
        for coord in &self.to_array() {
            coord.hash_scalar(state);
        }
    }

    /// NaN-aware coordinate-wise equality.
    #[must_use]
    fn ordered_equals(&self, other: &Self) -> bool {
        self.to_array()
            .iter()
            .zip(other.to_array().iter())
            .all(|(a, b)| a.ordered_eq(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point::Point;
    use approx::assert_relative_eq;
    use std::collections::hash_map::DefaultHasher;

    fn largest_exact_integer<T: CoordinateScalar>() -> u64 {
        1_u64 << T::mantissa_digits()
    }

    #[test]
    fn mantissa_digits_bound_exact_integers() {
        assert_eq!(largest_exact_integer::<f32>(), 16_777_216);
        assert_eq!(largest_exact_integer::<f64>(), 9_007_199_254_740_992);
        // One past the bound rounds back onto it.
        let past = largest_exact_integer::<f32>() + 1;
        #[allow(clippy::cast_precision_loss)]
        let rounded = past as f32;
        assert_eq!(rounded, 16_777_216.0);
    }

    #[test]
    fn coordinate_trait_basic_functionality() {
        let coord: Point<f64, 3> = Point::new([1.0, 2.0, 3.0]);
        assert_eq!(coord.dim(), 3);
        assert_relative_eq!(coord.get(0).unwrap(), 1.0);
        assert_relative_eq!(coord.get(2).unwrap(), 3.0);
        assert_eq!(coord.get(3), None);

        let coord_f32: Point<f32, 2> = Point::new([1.5f32, 2.5f32]);
        assert!(coord_f32.validate().is_ok());
    }

    #[test]
    fn coordinate_validation_reports_first_bad_index() {
        let coord: Point<f64, 3> = Point::new([1.0, f64::INFINITY, f64::NAN]);
        let err = coord.validate().unwrap_err();
        assert!(matches!(
            err,
            CoordinateValidationError::InvalidCoordinate {
                coordinate_index: 1,
                dimension: 3,
                ..
            }
        ));
    }

    #[test]
    fn coordinate_origin_and_ordered_equality() {
        let origin: Point<f64, 4> = Point::origin();
        assert_eq!(origin.to_array(), [0.0; 4]);

        let a: Point<f64, 2> = Point::new([f64::NAN, 1.0]);
        let b: Point<f64, 2> = Point::new([f64::NAN, 1.0]);
        assert!(a.ordered_equals(&b));
    }

    #[test]
    fn coordinate_hash_is_consistent_for_equal_points() {
        let a: Point<f64, 3> = Point::new([0.5, -0.0, 2.0]);
        let b: Point<f64, 3> = Point::new([0.5, 0.0, 2.0]);
        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash_coordinate(&mut ha);
        b.hash_coordinate(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }
}
