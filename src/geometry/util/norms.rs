//! Vector norm and distance computations.

use num_traits::Float;

use crate::geometry::traits::coordinate::CoordinateScalar;

/// Sum of squares of a coordinate array, computed in `T`.
///
/// ```
/// use dewall::geometry::util::squared_norm;
///
/// assert_eq!(squared_norm(&[3.0, 4.0]), 25.0);
/// assert_eq!(squared_norm(&[1.0, 2.0, 2.0]), 9.0);
/// ```
pub fn squared_norm<T, const D: usize>(coords: &[T; D]) -> T
where
    T: CoordinateScalar,
{
    coords.iter().fold(T::zero(), |acc, &x| acc + x * x)
}

/// Euclidean norm with max-abs scaling so large coordinates do not overflow.
///
/// ```
/// use dewall::geometry::util::hypot;
///
/// assert_eq!(hypot(&[3.0, 4.0]), 5.0);
/// assert_eq!(hypot(&[1.0, 2.0, 2.0]), 3.0);
/// assert_eq!(hypot::<f64, 0>(&[]), 0.0);
/// ```
pub fn hypot<T, const D: usize>(coords: &[T; D]) -> T
where
    T: CoordinateScalar,
{
    let max_abs = coords
        .iter()
        .fold(T::zero(), |acc, &x| acc.max(Float::abs(x)));
    if max_abs == T::zero() {
        return T::zero();
    }
    let scaled = coords.iter().fold(T::zero(), |acc, &x| {
        let s = x / max_abs;
        acc + s * s
    });
    max_abs * scaled.sqrt()
}

/// Squared Euclidean distance between two coordinate arrays.
///
/// ```
/// use dewall::geometry::util::squared_distance;
///
/// assert_eq!(squared_distance(&[1.0, 1.0], &[4.0, 5.0]), 25.0);
/// ```
pub fn squared_distance<T, const D: usize>(a: &[T; D], b: &[T; D]) -> T
where
    T: CoordinateScalar,
{
    a.iter().zip(b.iter()).fold(T::zero(), |acc, (&x, &y)| {
        let d = x - y;
        acc + d * d
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn hypot_survives_large_magnitudes() {
        let big = 1e200_f64;
        assert_relative_eq!(hypot(&[big, big]), big * 2.0_f64.sqrt(), max_relative = 1e-12);
        assert!(squared_norm(&[big, big]).is_infinite());
    }

    #[test]
    fn hypot_of_f32_vector() {
        assert_relative_eq!(hypot(&[1.0f32, 1.0, 1.0, 1.0]), 2.0f32);
    }

    #[test]
    fn squared_distance_is_symmetric() {
        let a = [0.5, -1.0, 2.0];
        let b = [1.5, 1.0, -2.0];
        assert_relative_eq!(squared_distance(&a, &b), squared_distance(&b, &a));
        assert_relative_eq!(squared_distance(&a, &b), 1.0 + 4.0 + 16.0);
    }
}
