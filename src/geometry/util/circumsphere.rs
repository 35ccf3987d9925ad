//! Circumsphere of 2..=D+1 points in D dimensions.
//!
//! For k points the sphere is the smallest one through all of them whose
//! center lies in their affine hull. With `p0` as origin and
//! `L = [p1 - p0, ..., p(k-1) - p0]` (D×(k-1)), the center offset `L·λ`
//! satisfies `Gλ = ½·diag(G)` where `G = LᵀL` is the Gram matrix, and the
//! squared radius is `|L·λ|²`.
//!
//! Degenerate input (coincident or affinely dependent points, wrong point
//! count, non-finite coordinates) never errors. It yields a sphere whose
//! squared radius is NaN; callers test [`Circumsphere::is_degenerate`].

use nalgebra::{DMatrix, DVector};

use crate::geometry::point::Point;
use crate::geometry::traits::coordinate::{Coordinate, CoordinateScalar};

use super::conversions::{safe_coords_from_f64, safe_coords_to_f64, safe_scalar_from_f64, safe_scalar_to_f64};

/// A hypersphere given by its center and squared radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circumsphere<T, const D: usize>
where
    T: CoordinateScalar,
{
    /// Center of the sphere. Unspecified (NaN) when degenerate.
    pub center: Point<T, D>,
    /// Squared radius, NaN when the input was degenerate.
    pub radius_squared: T,
}

impl<T, const D: usize> Circumsphere<T, D>
where
    T: CoordinateScalar,
{
    /// The "no valid sphere" sentinel.
    #[must_use]
    pub fn degenerate() -> Self {
        Self {
            center: Point::new([T::nan(); D]),
            radius_squared: T::nan(),
        }
    }

    /// Returns true if this is the NaN sentinel.
    #[inline]
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.radius_squared.is_nan()
    }

    /// Radius of the sphere (NaN when degenerate).
    #[inline]
    #[must_use]
    pub fn radius(&self) -> T {
        self.radius_squared.sqrt()
    }

    /// Returns true if `point` lies strictly inside the sphere, beyond a
    /// relative tolerance of `epsilon · r²`. Degenerate spheres contain nothing.
    ///
    /// ```
    /// use dewall::geometry::point::Point;
    /// use dewall::geometry::traits::coordinate::Coordinate;
    /// use dewall::geometry::util::circumsphere;
    ///
    /// let tri = [Point::new([0.0, 0.0]), Point::new([1.0, 0.0]), Point::new([0.0, 1.0])];
    /// let sphere = circumsphere(&tri, f64::EPSILON);
    /// assert!(sphere.contains(&Point::new([0.5, 0.5]), 1e-12));
    /// assert!(!sphere.contains(&Point::new([1.0, 1.0]), 1e-12)); // on the boundary
    /// ```
    #[must_use]
    pub fn contains(&self, point: &Point<T, D>, epsilon: T) -> bool {
        if self.is_degenerate() {
            return false;
        }
        let d2 = self.center.squared_distance(point);
        d2 < self.radius_squared - epsilon * self.radius_squared
    }
}

/// Compute the circumsphere of `points` (2 ≤ k ≤ D+1).
///
/// `epsilon` bounds the scale-free Gram determinant `det(G)/∏Gᵢᵢ`, which is 1
/// for mutually orthogonal edges and 0 for affinely dependent points. At or
/// below `epsilon` the result is the degenerate sentinel.
///
/// ```
/// use approx::assert_relative_eq;
/// use dewall::geometry::point::Point;
/// use dewall::geometry::traits::coordinate::Coordinate;
/// use dewall::geometry::util::circumsphere;
///
/// let tri = [Point::new([0.0, 0.0]), Point::new([1.0, 0.0]), Point::new([0.0, 1.0])];
/// let sphere = circumsphere(&tri, f64::EPSILON);
/// assert_relative_eq!(sphere.center.coords()[0], 0.5);
/// assert_relative_eq!(sphere.center.coords()[1], 0.5);
/// assert_relative_eq!(sphere.radius_squared, 0.5);
///
/// let collinear = [Point::new([0.0, 0.0]), Point::new([1.0, 1.0]), Point::new([2.0, 2.0])];
/// assert!(circumsphere(&collinear, f64::EPSILON).is_degenerate());
/// ```
#[must_use]
pub fn circumsphere<T, const D: usize>(points: &[Point<T, D>], epsilon: T) -> Circumsphere<T, D>
where
    T: CoordinateScalar,
{
    let k = points.len();
    if k < 2 || k > D + 1 {
        return Circumsphere::degenerate();
    }

    if k == 2 {
        let two = T::one() + T::one();
        let r2 = points[0].squared_distance(&points[1]) / (two * two);
        if !(r2 > T::zero()) || !r2.is_finite() {
            return Circumsphere::degenerate();
        }
        return Circumsphere {
            center: (points[0] + points[1]) * two.recip(),
            radius_squared: r2,
        };
    }

    gram_circumsphere(points, epsilon).unwrap_or_else(Circumsphere::degenerate)
}

fn gram_circumsphere<T, const D: usize>(
    points: &[Point<T, D>],
    epsilon: T,
) -> Option<Circumsphere<T, D>>
where
    T: CoordinateScalar,
{
    let eps = safe_scalar_to_f64(epsilon).ok()?;
    let origin = safe_coords_to_f64(points[0].to_array()).ok()?;
    let m = points.len() - 1;

    let mut edges = DMatrix::<f64>::zeros(D, m);
    for (j, p) in points[1..].iter().enumerate() {
        let coords = safe_coords_to_f64(p.to_array()).ok()?;
        for i in 0..D {
            edges[(i, j)] = coords[i] - origin[i];
        }
    }

    let gram = edges.transpose() * &edges;
    let diag_product: f64 = (0..m).map(|i| gram[(i, i)]).product();
    if !(diag_product > 0.0) || !diag_product.is_finite() {
        return None;
    }
    let volume_ratio = gram.determinant() / diag_product;
    if !volume_ratio.is_finite() || volume_ratio <= eps {
        return None;
    }

    let rhs = DVector::from_fn(m, |i, _| 0.5 * gram[(i, i)]);
    let lambda = gram.lu().solve(&rhs)?;
    let offset = &edges * lambda;
    let r2 = offset.norm_squared();

    let mut center = [0.0_f64; D];
    for (i, c) in center.iter_mut().enumerate() {
        *c = origin[i] + offset[i];
    }

    Some(Circumsphere {
        center: Point::new(safe_coords_from_f64(center).ok()?),
        radius_squared: safe_scalar_from_f64(r2).ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn two_points_give_the_midpoint_sphere() {
        let s = circumsphere(&[Point::new([0.0, 0.0, 0.0]), Point::new([2.0, 0.0, 0.0])], 1e-12);
        assert_eq!(s.center.coords(), &[1.0, 0.0, 0.0]);
        assert_relative_eq!(s.radius_squared, 1.0);
    }

    #[test]
    fn tetrahedron_circumsphere() {
        let tet = [
            Point::new([0.0, 0.0, 0.0]),
            Point::new([1.0, 0.0, 0.0]),
            Point::new([0.0, 1.0, 0.0]),
            Point::new([0.0, 0.0, 1.0]),
        ];
        let s = circumsphere(&tet, f64::EPSILON);
        assert!(!s.is_degenerate());
        for (&c, expected) in s.center.coords().iter().zip([0.5, 0.5, 0.5]) {
            assert_relative_eq!(c, expected, epsilon = 1e-12);
        }
        assert_relative_eq!(s.radius_squared, 0.75, epsilon = 1e-12);
    }

    #[test]
    fn triangle_in_three_dimensions_stays_in_its_plane() {
        let tri = [
            Point::new([0.0, 0.0, 5.0]),
            Point::new([2.0, 0.0, 5.0]),
            Point::new([0.0, 2.0, 5.0]),
        ];
        let s = circumsphere(&tri, f64::EPSILON);
        assert_relative_eq!(s.center.coords()[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(s.center.coords()[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(s.center.coords()[2], 5.0, epsilon = 1e-12);
        assert_relative_eq!(s.radius_squared, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_inputs_yield_the_nan_sentinel() {
        let p = Point::new([1.0, 1.0]);
        assert!(circumsphere(&[p], 1e-12).is_degenerate());
        assert!(circumsphere(&[p, p], 1e-12).is_degenerate());
        assert!(circumsphere(&[p, p, p, p], 1e-12).is_degenerate());
        let collinear = [Point::new([0.0, 0.0]), Point::new([1.0, 0.0]), Point::new([3.0, 0.0])];
        assert!(circumsphere(&collinear, 1e-12).is_degenerate());
        let bad = [Point::new([0.0, f64::NAN]), Point::new([1.0, 0.0]), Point::new([0.0, 1.0])];
        assert!(circumsphere(&bad, 1e-12).is_degenerate());
        assert!(!Circumsphere::<f64, 2>::degenerate().contains(&p, 0.0));
    }

    #[test]
    fn epsilon_controls_sliver_rejection() {
        let sliver = [Point::new([0.0, 0.0]), Point::new([1.0, 0.0]), Point::new([0.5, 1e-4])];
        assert!(!circumsphere(&sliver, 1e-12).is_degenerate());
        assert!(circumsphere(&sliver, 1e-3).is_degenerate());
    }

    #[test]
    fn f32_circumsphere() {
        let tri = [Point::new([0.0f32, 0.0]), Point::new([4.0, 0.0]), Point::new([0.0, 2.0])];
        let s = circumsphere(&tri, f32::EPSILON);
        assert_relative_eq!(s.center.coords()[0], 2.0f32, epsilon = 1e-5);
        assert_relative_eq!(s.center.coords()[1], 1.0f32, epsilon = 1e-5);
        assert_relative_eq!(s.radius_squared, 5.0f32, epsilon = 1e-5);
    }
}
