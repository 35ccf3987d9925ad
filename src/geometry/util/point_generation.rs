//! Point set generators for tests and benchmarks.
//!
//! Random sets use `rand`'s uniform sampler; the seeded variants are
//! reproducible across runs and platforms for a fixed seed.

use rand::Rng;
use rand::SeedableRng;
use rand::distr::uniform::SampleUniform;

use crate::geometry::point::Point;
use crate::geometry::traits::coordinate::{Coordinate, CoordinateScalar};

use super::RandomPointGenerationError;
use super::conversions::safe_usize_to_scalar;

fn check_range<T: CoordinateScalar>(range: (T, T)) -> Result<(), RandomPointGenerationError> {
    if range.0 >= range.1 || !range.0.is_finite_generic() || !range.1.is_finite_generic() {
        return Err(RandomPointGenerationError::InvalidRange {
            min: format!("{:?}", range.0),
            max: format!("{:?}", range.1),
        });
    }
    Ok(())
}

fn sample_points<T, R, const D: usize>(
    rng: &mut R,
    n_points: usize,
    range: (T, T),
) -> Vec<Point<T, D>>
where
    T: CoordinateScalar + SampleUniform,
    R: Rng,
{
    (0..n_points)
        .map(|_| Point::new([T::zero(); D].map(|_| rng.random_range(range.0..range.1))))
        .collect()
}

/// Symmetric bounds `(-s/2, s/2)` with `s = max(1, n_points)`.
///
/// Spreading larger point sets over a larger box keeps the typical spacing
/// independent of `n`, which keeps random inputs away from near-degenerate
/// configurations when tolerances are absolute.
///
/// # Errors
///
/// Returns `RandomPointGenerationError::RandomGenerationFailed` if `n_points`
/// is not exactly representable in `T`.
///
/// ```
/// use dewall::geometry::util::scaled_bounds_by_point_count;
///
/// assert_eq!(scaled_bounds_by_point_count::<f64>(100).unwrap(), (-50.0, 50.0));
/// ```
pub fn scaled_bounds_by_point_count<T: CoordinateScalar>(
    n_points: usize,
) -> Result<(T, T), RandomPointGenerationError> {
    let side_len = n_points.max(1);
    let side = safe_usize_to_scalar::<T>(side_len).map_err(|e| {
        RandomPointGenerationError::RandomGenerationFailed {
            min: "n/a".to_string(),
            max: "n/a".to_string(),
            details: format!("n_points={side_len} is not representable: {e}"),
        }
    })?;
    let half = side / (T::one() + T::one());
    Ok((-half, half))
}

/// Uniformly distributed random points in `[min, max)^D` from the thread RNG.
///
/// # Errors
///
/// Returns `RandomPointGenerationError::InvalidRange` if `min >= max` or a
/// bound is not finite.
///
/// ```
/// use dewall::geometry::util::generate_random_points;
///
/// let points = generate_random_points::<f64, 2>(100, (-10.0, 10.0)).unwrap();
/// assert_eq!(points.len(), 100);
/// assert!(generate_random_points::<f64, 2>(10, (1.0, -1.0)).is_err());
/// ```
pub fn generate_random_points<T: CoordinateScalar + SampleUniform, const D: usize>(
    n_points: usize,
    range: (T, T),
) -> Result<Vec<Point<T, D>>, RandomPointGenerationError> {
    check_range(range)?;
    let mut rng = rand::rng();
    Ok(sample_points(&mut rng, n_points, range))
}

/// Reproducible random points from a seeded `StdRng`.
///
/// # Errors
///
/// Returns `RandomPointGenerationError::InvalidRange` if `min >= max` or a
/// bound is not finite.
///
/// ```
/// use dewall::geometry::util::generate_random_points_seeded;
///
/// let a = generate_random_points_seeded::<f64, 3>(50, (-5.0, 5.0), 42).unwrap();
/// let b = generate_random_points_seeded::<f64, 3>(50, (-5.0, 5.0), 42).unwrap();
/// assert_eq!(a, b);
/// ```
pub fn generate_random_points_seeded<T: CoordinateScalar + SampleUniform, const D: usize>(
    n_points: usize,
    range: (T, T),
    seed: u64,
) -> Result<Vec<Point<T, D>>, RandomPointGenerationError> {
    check_range(range)?;
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    Ok(sample_points(&mut rng, n_points, range))
}

/// Points on a regular grid, `points_per_dim^D` in total.
///
/// Grid inputs are highly cospherical and exercise the tie-breaking paths of
/// the triangulation.
///
/// # Errors
///
/// Returns `RandomPointGenerationError::InvalidPointCount` if
/// `points_per_dim` is zero and `RandomPointGenerationError::RandomGenerationFailed`
/// if the total count overflows `usize`.
///
/// ```
/// use dewall::geometry::util::generate_grid_points;
///
/// let grid = generate_grid_points::<f64, 2>(4, 1.0, [0.0, 0.0]).unwrap();
/// assert_eq!(grid.len(), 16);
/// ```
pub fn generate_grid_points<T: CoordinateScalar, const D: usize>(
    points_per_dim: usize,
    spacing: T,
    offset: [T; D],
) -> Result<Vec<Point<T, D>>, RandomPointGenerationError> {
    if points_per_dim == 0 {
        return Err(RandomPointGenerationError::InvalidPointCount { n_points: 0 });
    }

    let mut total_points: usize = 1;
    for _ in 0..D {
        total_points = total_points.checked_mul(points_per_dim).ok_or_else(|| {
            RandomPointGenerationError::RandomGenerationFailed {
                min: "0".into(),
                max: format!("{}", points_per_dim - 1),
                details: format!("grid size {points_per_dim}^{D} overflows usize"),
            }
        })?;
    }

    let mut steps = Vec::with_capacity(points_per_dim);
    for i in 0..points_per_dim {
        let step = safe_usize_to_scalar::<T>(i).map_err(|e| {
            RandomPointGenerationError::RandomGenerationFailed {
                min: "0".into(),
                max: format!("{}", points_per_dim - 1),
                details: format!("grid index {i} is not representable: {e}"),
            }
        })?;
        steps.push(step * spacing);
    }

    // Mixed-radix counter over the D axes, last axis fastest.
    let mut points = Vec::with_capacity(total_points);
    let mut idx = [0usize; D];
    for _ in 0..total_points {
        let mut coords = offset;
        for (axis, c) in coords.iter_mut().enumerate() {
            *c = *c + steps[idx[axis]];
        }
        points.push(Point::new(coords));

        for axis in (0..D).rev() {
            idx[axis] += 1;
            if idx[axis] < points_per_dim {
                break;
            }
            idx[axis] = 0;
        }
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collections::FastHashSet;

    #[test]
    fn seeded_points_stay_in_range() {
        let points = generate_random_points_seeded::<f64, 4>(200, (-2.0, 3.0), 7).unwrap();
        assert_eq!(points.len(), 200);
        for p in &points {
            for &c in p.coords() {
                assert!((-2.0..3.0).contains(&c));
            }
        }
    }

    #[test]
    fn different_seeds_differ() {
        let a = generate_random_points_seeded::<f32, 2>(20, (0.0, 1.0), 1).unwrap();
        let b = generate_random_points_seeded::<f32, 2>(20, (0.0, 1.0), 2).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        assert!(matches!(
            generate_random_points_seeded::<f64, 2>(5, (1.0, 1.0), 0),
            Err(RandomPointGenerationError::InvalidRange { .. })
        ));
        assert!(generate_random_points::<f64, 2>(5, (0.0, f64::INFINITY)).is_err());
    }

    #[test]
    fn grid_points_are_distinct_and_offset() {
        let grid = generate_grid_points::<f64, 3>(3, 0.5, [1.0, 2.0, 3.0]).unwrap();
        assert_eq!(grid.len(), 27);
        assert_eq!(grid[0].coords(), &[1.0, 2.0, 3.0]);
        assert_eq!(grid[26].coords(), &[2.0, 3.0, 4.0]);
        let unique: FastHashSet<_> = grid.iter().copied().collect();
        assert_eq!(unique.len(), 27);

        assert!(matches!(
            generate_grid_points::<f64, 2>(0, 1.0, [0.0, 0.0]),
            Err(RandomPointGenerationError::InvalidPointCount { n_points: 0 })
        ));
    }
}
