//! Data and operations on d-dimensional points.
//!
//! [`Point`] is the geometric primitives adapter of the engine: coordinate
//! access plus the handful of vector operations the DeWall kernels need
//! (`Sub`, `Add`, `Mul<T>`, dot product, squared distance). Everything heavier goes
//! through the matrix helpers in [`crate::geometry::matrix`].
//!
//! # Special Floating-Point Equality Semantics
//!
//! `NaN` coordinates compare equal to themselves so points satisfy `Eq` and
//! can be hashed. Compare the raw coordinates when IEEE 754 semantics are
//! needed.

#![forbid(unsafe_code)]

use crate::geometry::traits::coordinate::{Coordinate, CoordinateConversionError, CoordinateScalar};
use num_traits::cast;
use serde::de::{Error, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{Add, Mul, Sub};

// =============================================================================
// POINT STRUCT DEFINITION
// =============================================================================

/// A point in D-dimensional space with scalar coordinates of type `T`.
///
/// Points are immutable once created; the coordinate array is private.
///
/// ```rust
/// use dewall::geometry::point::Point;
/// use dewall::geometry::traits::coordinate::Coordinate;
///
/// let p = Point::new([1.0, 2.0]);
/// assert_eq!(p.coords(), &[1.0, 2.0]);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Point<T, const D: usize>
where
    T: CoordinateScalar,
{
    coords: [T; D],
}

// =============================================================================
// PUBLIC API
// =============================================================================

impl<T, const D: usize> Point<T, D>
where
    T: CoordinateScalar,
{
    /// Returns a reference to the point's coordinates.
    #[inline]
    #[must_use]
    pub const fn coords(&self) -> &[T; D] {
        &self.coords
    }

    /// Dot product of the two coordinate vectors.
    #[inline]
    #[must_use]
    pub fn dot(&self, other: &Self) -> T {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .fold(T::zero(), |acc, (&a, &b)| acc + a * b)
    }

    /// Squared Euclidean distance to `other`.
    ///
    /// ```rust
    /// use dewall::geometry::point::Point;
    /// use dewall::geometry::traits::coordinate::Coordinate;
    ///
    /// let a = Point::new([0.0, 0.0]);
    /// let b = Point::new([3.0, 4.0]);
    /// assert_eq!(a.squared_distance(&b), 25.0);
    /// ```
    #[inline]
    #[must_use]
    pub fn squared_distance(&self, other: &Self) -> T {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .fold(T::zero(), |acc, (&a, &b)| {
                let d = a - b;
                acc + d * d
            })
    }
}

// =============================================================================
// TRAIT IMPLEMENTATIONS
// =============================================================================

impl<T, const D: usize> Coordinate<T, D> for Point<T, D>
where
    T: CoordinateScalar,
{
    #[inline]
    fn new(coords: [T; D]) -> Self {
        Self { coords }
    }

    #[inline]
    fn to_array(&self) -> [T; D] {
        self.coords
    }

    #[inline]
    fn get(&self, index: usize) -> Option<T> {
        self.coords.get(index).copied()
    }
}

impl<T, const D: usize> Sub for Point<T, D>
where
    T: CoordinateScalar,
{
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        let mut coords = self.coords;
        for (c, r) in coords.iter_mut().zip(rhs.coords.iter()) {
            *c = *c - *r;
        }
        Self { coords }
    }
}

impl<T, const D: usize> Add for Point<T, D>
where
    T: CoordinateScalar,
{
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        let mut coords = self.coords;
        for (c, r) in coords.iter_mut().zip(rhs.coords.iter()) {
            *c = *c + *r;
        }
        Self { coords }
    }
}

impl<T, const D: usize> Mul<T> for Point<T, D>
where
    T: CoordinateScalar,
{
    type Output = Self;

    #[inline]
    fn mul(self, factor: T) -> Self {
        Self {
            coords: self.coords.map(|c| c * factor),
        }
    }
}

impl<T, const D: usize> Hash for Point<T, D>
where
    T: CoordinateScalar,
{
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash_coordinate(state);
    }
}

impl<T, const D: usize> PartialEq for Point<T, D>
where
    T: CoordinateScalar,
{
    fn eq(&self, other: &Self) -> bool {
        self.ordered_equals(other)
    }
}

impl<T, const D: usize> Eq for Point<T, D> where T: CoordinateScalar {}

impl<T, const D: usize> Default for Point<T, D>
where
    T: CoordinateScalar,
{
    fn default() -> Self {
        Self {
            coords: [T::default(); D],
        }
    }
}

// Serde's derives only cover arrays up to length 32 without const generics,
// so (de)serialization is written out as a fixed-length tuple.
impl<T, const D: usize> Serialize for Point<T, D>
where
    T: CoordinateScalar,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeTuple;
        let mut tuple = serializer.serialize_tuple(D)?;
        for coord in &self.coords {
            if coord.is_finite_generic() {
                tuple.serialize_element(coord)?;
            } else {
                // JSON has no NaN/Infinity; the engine rejects them anyway.
                tuple.serialize_element(&Option::<T>::None)?;
            }
        }
        tuple.end()
    }
}

impl<'de, T, const D: usize> Deserialize<'de> for Point<T, D>
where
    T: CoordinateScalar,
{
    fn deserialize<DE>(deserializer: DE) -> Result<Self, DE::Error>
    where
        DE: serde::Deserializer<'de>,
    {
        struct ArrayVisitor<T, const D: usize>(PhantomData<T>);

        impl<'de, T, const D: usize> Visitor<'de> for ArrayVisitor<T, D>
        where
            T: CoordinateScalar,
        {
            type Value = Point<T, D>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_fmt(format_args!("an array of {D} coordinates"))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut coords = [T::zero(); D];
                for (i, slot) in coords.iter_mut().enumerate() {
                    let element: Option<T> = seq
                        .next_element()?
                        .ok_or_else(|| Error::invalid_length(i, &self))?;
                    *slot = element.unwrap_or_else(T::nan);
                }
                Ok(Point::new(coords))
            }
        }

        deserializer.deserialize_tuple(D, ArrayVisitor(PhantomData))
    }
}

// =============================================================================
// TYPE CONVERSION IMPLEMENTATIONS
// =============================================================================

/// Fallible conversion from arrays of any numeric type (including integers).
///
/// ```rust
/// use dewall::geometry::point::Point;
///
/// let p: Point<f64, 2> = Point::try_from([1_i32, 2]).unwrap();
/// assert_eq!(p.coords(), &[1.0, 2.0]);
/// ```
impl<T, U, const D: usize> TryFrom<[T; D]> for Point<U, D>
where
    T: cast::NumCast + fmt::Debug,
    U: CoordinateScalar,
{
    type Error = CoordinateConversionError;

    #[inline]
    fn try_from(coords: [T; D]) -> Result<Self, Self::Error> {
        let mut out: [U; D] = [U::zero(); D];
        for (i, c) in coords.into_iter().enumerate() {
            let c_debug = format!("{c:?}");
            let v: U =
                cast::cast(c).ok_or_else(|| CoordinateConversionError::ConversionFailed {
                    coordinate_index: i,
                    coordinate_value: c_debug,
                    from_type: any::type_name::<T>(),
                    to_type: any::type_name::<U>(),
                })?;
            if !v.is_finite_generic() {
                return Err(CoordinateConversionError::NonFiniteValue {
                    coordinate_index: i,
                    coordinate_value: format!("{v:?}"),
                });
            }
            out[i] = v;
        }
        Ok(Self::new(out))
    }
}

impl<T, const D: usize> From<Point<T, D>> for [T; D]
where
    T: CoordinateScalar,
{
    #[inline]
    fn from(point: Point<T, D>) -> [T; D] {
        point.to_array()
    }
}

impl<T, const D: usize> From<&Point<T, D>> for [T; D]
where
    T: CoordinateScalar,
{
    #[inline]
    fn from(point: &Point<T, D>) -> [T; D] {
        point.to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn point_vector_operations() {
        let a = Point::new([1.0, 2.0, 3.0]);
        let b = Point::new([0.5, -1.0, 2.0]);

        assert_eq!((a - b).to_array(), [0.5, 3.0, 1.0]);
        assert_eq!((a + b).to_array(), [1.5, 1.0, 5.0]);
        assert_eq!((a * 2.0).to_array(), [2.0, 4.0, 6.0]);
        assert_relative_eq!(a.dot(&b), 0.5 - 2.0 + 6.0);
        assert_relative_eq!(a.squared_distance(&b), 0.25 + 9.0 + 1.0);
    }

    #[test]
    fn point_try_from_integer_array() {
        let p: Point<f32, 3> = Point::try_from([1_u8, 2, 3]).unwrap();
        assert_eq!(p.to_array(), [1.0, 2.0, 3.0]);

        let err = Point::<f64, 1>::try_from([f64::NAN]).unwrap_err();
        assert!(matches!(
            err,
            CoordinateConversionError::NonFiniteValue {
                coordinate_index: 0,
                ..
            }
        ));
    }

    #[test]
    fn point_serde_roundtrip_json() {
        let p = Point::new([0.25, -4.0, 1e3]);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "[0.25,-4.0,1000.0]");
        let back: Point<f64, 3> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn point_equality_treats_nan_as_equal() {
        let a = Point::new([f64::NAN, 1.0]);
        let b = Point::new([f64::NAN, 1.0]);
        assert_eq!(a, b);
        assert_ne!(a, Point::new([0.0, 1.0]));
    }
}
