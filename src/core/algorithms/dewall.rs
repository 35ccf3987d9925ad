//! The DeWall divide-and-conquer recursion.
//!
//! Each call receives a subset of the input points together with the facets
//! inherited from its parent, and:
//!
//! 1. picks an [`AlphaPlane`] through the middle of the subset's widest
//!    bounding-box axis and splits the subset in two;
//! 2. sorts every open facet into the wall list (it crosses the plane) or the
//!    list of the half it lies in;
//! 3. builds the wall: repeatedly completes a crossing facet with the point
//!    of the subset whose circumsphere is smallest on the open side, and
//!    toggles the new simplex's other facets into the three lists;
//! 4. recurses into each half whose list is non-empty, on the calling thread
//!    or through `rayon::join` when a half is large.
//!
//! The top-level call starts without facets and seeds its wall with a first
//! simplex. Deeper calls inherit facets from the walls above; when none of
//! them crosses the call's plane, the call tries a first simplex of its own
//! subset and keeps it only if it is Delaunay for the whole input.

use tracing::{debug, trace, warn};

use super::simplex_constructor::SimplexConstructor;
use crate::core::collections::{FastHashSet, PointId, SpatialGrid};
use crate::core::config::DeWallConfig;
use crate::core::facet::{ActiveFacetList, Facet};
use crate::core::simplex::Simplex;
use crate::geometry::point::Point;
use crate::geometry::traits::coordinate::CoordinateScalar;

// =============================================================================
// DIVIDING PLANE
// =============================================================================

/// Axis-aligned plane `x[axis] = threshold` dividing a subset.
///
/// A point with `x[axis] < threshold` belongs to the lower half, anything
/// else (including points on the plane) to the upper half.
///
/// ```rust
/// use dewall::core::algorithms::dewall::{AlphaPlane, FacetPlacement};
/// use dewall::core::facet::Facet;
/// use dewall::geometry::point::Point;
/// use dewall::geometry::traits::coordinate::Coordinate;
///
/// let points = [
///     Point::new([0.0, 0.0]),
///     Point::new([4.0, 1.0]),
///     Point::new([1.0, 0.5]),
/// ];
/// let alpha = AlphaPlane::from_points(&points).unwrap();
/// assert_eq!(alpha.axis(), 0);
/// assert_eq!(alpha.threshold(), 2.0);
///
/// let crossing = Facet::new([0, 1], None).unwrap();
/// assert_eq!(alpha.classify(&crossing, &points), FacetPlacement::Crossing);
/// let lower = Facet::new([0, 2], None).unwrap();
/// assert_eq!(alpha.classify(&lower, &points), FacetPlacement::Lower);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlphaPlane<T> {
    axis: usize,
    threshold: T,
}

/// Which list an open facet belongs to relative to an [`AlphaPlane`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FacetPlacement {
    /// Vertices on both sides: part of the wall.
    Crossing,
    /// All vertices strictly below the threshold.
    Lower,
    /// All vertices at or above the threshold.
    Upper,
}

impl<T> AlphaPlane<T>
where
    T: CoordinateScalar,
{
    /// Plane through the midpoint of the widest axis of the box
    /// `[lower, upper]`. Ties go to the lowest axis index.
    ///
    /// Returns `None` when the box has zero extent on every axis.
    #[must_use]
    pub fn select<const D: usize>(lower: &[T; D], upper: &[T; D]) -> Option<Self> {
        let mut best: Option<(usize, T)> = None;
        for axis in 0..D {
            let extent = upper[axis] - lower[axis];
            if best.is_none_or(|(_, widest)| extent > widest) {
                best = Some((axis, extent));
            }
        }
        let (axis, extent) = best?;
        if extent.is_nan() || extent <= T::zero() {
            return None;
        }
        let two = T::one() + T::one();
        Some(Self {
            axis,
            threshold: lower[axis] + extent / two,
        })
    }

    /// [`AlphaPlane::select`] over the bounding box of `points`.
    #[must_use]
    pub fn from_points<const D: usize>(points: &[Point<T, D>]) -> Option<Self> {
        let (lower, upper) = bounding_box(points.iter())?;
        Self::select(&lower, &upper)
    }

    /// Split axis.
    #[inline]
    #[must_use]
    pub const fn axis(&self) -> usize {
        self.axis
    }

    /// Split coordinate.
    #[inline]
    #[must_use]
    pub const fn threshold(&self) -> T {
        self.threshold
    }

    /// Returns true if `point` falls in the lower half.
    #[inline]
    #[must_use]
    pub fn is_lower<const D: usize>(&self, point: &Point<T, D>) -> bool {
        point.coords()[self.axis] < self.threshold
    }

    /// Sort a facet into the wall or one of the halves.
    #[must_use]
    pub fn classify<const D: usize>(&self, facet: &Facet<D>, points: &[Point<T, D>]) -> FacetPlacement {
        let mut lower = false;
        let mut upper = false;
        for &id in facet.vertices() {
            if self.is_lower(&points[id]) {
                lower = true;
            } else {
                upper = true;
            }
        }
        match (lower, upper) {
            (true, true) => FacetPlacement::Crossing,
            (true, false) => FacetPlacement::Lower,
            _ => FacetPlacement::Upper,
        }
    }
}

fn bounding_box<'p, T, const D: usize>(
    mut points: impl Iterator<Item = &'p Point<T, D>>,
) -> Option<([T; D], [T; D])>
where
    T: CoordinateScalar + 'p,
{
    let first = points.next()?;
    let mut lower = *first.coords();
    let mut upper = lower;
    for p in points {
        for (axis, &c) in p.coords().iter().enumerate() {
            lower[axis] = lower[axis].min(c);
            upper[axis] = upper[axis].max(c);
        }
    }
    Some((lower, upper))
}

// =============================================================================
// SUBSETS
// =============================================================================

/// Point ids of one recursion call, with their bounding box.
///
/// The box lies inside the region carved out by the ancestors' planes, so a
/// point of the input belongs to the subset exactly when it lies in the box.
#[derive(Clone, Debug)]
pub(crate) struct Subset<T, const D: usize>
where
    T: CoordinateScalar,
{
    ids: Vec<PointId>,
    lower: [T; D],
    upper: [T; D],
}

impl<T, const D: usize> Subset<T, D>
where
    T: CoordinateScalar,
{
    pub(crate) fn new(ids: Vec<PointId>, points: &[Point<T, D>]) -> Self {
        let (lower, upper) = bounding_box(ids.iter().map(|&id| &points[id]))
            .unwrap_or(([T::zero(); D], [T::zero(); D]));
        Self { ids, lower, upper }
    }

    pub(crate) fn ids(&self) -> &[PointId] {
        &self.ids
    }

    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub(crate) const fn lower(&self) -> &[T; D] {
        &self.lower
    }

    pub(crate) const fn upper(&self) -> &[T; D] {
        &self.upper
    }

    /// Largest extent of the bounding box.
    pub(crate) fn scale(&self) -> T {
        (0..D).fold(T::zero(), |acc, axis| acc.max(self.upper[axis] - self.lower[axis]))
    }

    pub(crate) fn contains(&self, point: &Point<T, D>) -> bool {
        !self.is_empty()
            && point
                .coords()
                .iter()
                .enumerate()
                .all(|(axis, &c)| self.lower[axis] <= c && c <= self.upper[axis])
    }

    pub(crate) fn split(&self, alpha: &AlphaPlane<T>, points: &[Point<T, D>]) -> (Self, Self) {
        let (lower, upper): (Vec<_>, Vec<_>) =
            self.ids.iter().copied().partition(|&id| alpha.is_lower(&points[id]));
        (Self::new(lower, points), Self::new(upper, points))
    }
}

// =============================================================================
// RECURSION
// =============================================================================

/// Open facets of one call, sorted by placement.
#[derive(Debug, Default)]
struct FacetLists<const D: usize> {
    wall: ActiveFacetList<D>,
    lower: ActiveFacetList<D>,
    upper: ActiveFacetList<D>,
}

impl<const D: usize> FacetLists<D> {
    fn toggle(&mut self, facet: Facet<D>, placement: FacetPlacement) {
        match placement {
            FacetPlacement::Crossing => self.wall.toggle(facet),
            FacetPlacement::Lower => self.lower.toggle(facet),
            FacetPlacement::Upper => self.upper.toggle(facet),
        };
    }
}

/// One triangulation run over a fixed point slice.
pub(crate) struct DeWall<'a, T, const D: usize>
where
    T: CoordinateScalar,
{
    points: &'a [Point<T, D>],
    constructor: SimplexConstructor<'a, T, D>,
    parallel_threshold: usize,
}

impl<'a, T, const D: usize> DeWall<'a, T, D>
where
    T: CoordinateScalar,
{
    pub(crate) fn new(
        points: &'a [Point<T, D>],
        grid: Option<&'a SpatialGrid<T, D>>,
        config: &DeWallConfig<T>,
    ) -> Self {
        Self {
            points,
            constructor: SimplexConstructor::new(points, grid, config),
            parallel_threshold: config.parallel_threshold,
        }
    }

    /// Triangulate every point of the slice. The result is sorted and free
    /// of duplicates.
    pub(crate) fn run(&self) -> Vec<Simplex> {
        let all = Subset::new((0..self.points.len()).collect(), self.points);
        let mut simplices = self.recurse(all, ActiveFacetList::new());

        simplices.sort_unstable();
        let built = simplices.len();
        simplices.dedup();
        if simplices.len() != built {
            warn!(
                duplicates = built - simplices.len(),
                "Removed simplices built more than once"
            );
        }
        debug!(simplices = simplices.len(), "DeWall triangulation finished");
        simplices
    }

    fn recurse(&self, subset: Subset<T, D>, inherited: ActiveFacetList<D>) -> Vec<Simplex> {
        if subset.len() < D + 1 {
            trace!(
                points = subset.len(),
                open = inherited.len(),
                "Subset too small to hold a simplex"
            );
            return Vec::new();
        }
        let Some(alpha) = AlphaPlane::select(subset.lower(), subset.upper()) else {
            debug!(points = subset.len(), "All points of the subset coincide");
            return Vec::new();
        };
        let (lower, upper) = subset.split(&alpha, self.points);
        // A midpoint that rounds onto an end of the interval leaves one half
        // empty; the whole subset is then solved as a single wall.
        let split_is_proper = !lower.is_empty() && !upper.is_empty();
        let place = |facet: &Facet<D>| {
            if split_is_proper {
                alpha.classify(facet, self.points)
            } else {
                FacetPlacement::Crossing
            }
        };

        let mut lists = FacetLists::default();
        let mut simplices = Vec::new();
        // A simplex is built at most once per call, which bounds the wall loop.
        let mut built: FastHashSet<Simplex> = FastHashSet::default();

        let top_level = inherited.is_empty();
        for facet in inherited.into_ordered() {
            lists.toggle(facet, place(&facet));
        }

        // Inherited facets reach every wall except one that spans the whole
        // hull slice along `alpha`. Such a wall is seeded here, and a seed is
        // only kept when its circumsphere is empty of every input point.
        if top_level || (split_is_proper && lists.wall.is_empty()) {
            match self.constructor.first_simplex(&subset, &alpha) {
                Some(seed) if top_level || self.constructor.has_empty_circumsphere(&seed) => {
                    trace!(%seed, top_level, "Wall seeded");
                    for facet in seed.facets::<D>() {
                        lists.toggle(facet, place(&facet));
                    }
                    built.insert(seed.clone());
                    simplices.push(seed);
                }
                Some(_) => {}
                None if top_level => {
                    debug!(
                        points = subset.len(),
                        "No full-dimensional simplex found; input is degenerate"
                    );
                    return simplices;
                }
                None => {}
            }
        }

        while let Some(facet) = lists.wall.pop() {
            let Some(apex) = self.constructor.complete(&facet, &subset) else {
                trace!(facet = ?facet.vertices(), "Facet lies on the convex hull");
                continue;
            };
            let simplex = Simplex::from_facet(&facet, apex);
            if !built.insert(simplex.clone()) {
                trace!(%simplex, "Simplex already built by this wall");
                continue;
            }
            for other in simplex.facets::<D>() {
                if other != facet {
                    lists.toggle(other, place(&other));
                }
            }
            simplices.push(simplex);
        }

        if !split_is_proper {
            return simplices;
        }

        trace!(
            axis = alpha.axis(),
            wall = simplices.len(),
            lower = lower.len(),
            upper = upper.len(),
            "Wall complete"
        );

        let FacetLists {
            lower: lower_facets,
            upper: upper_facets,
            ..
        } = lists;
        let parallel =
            self.parallel_threshold > 0 && lower.len().max(upper.len()) > self.parallel_threshold;
        let (below, above) = if parallel {
            rayon::join(
                || self.descend(lower, lower_facets),
                || self.descend(upper, upper_facets),
            )
        } else {
            (
                self.descend(lower, lower_facets),
                self.descend(upper, upper_facets),
            )
        };
        simplices.extend(below);
        simplices.extend(above);
        simplices
    }

    fn descend(&self, subset: Subset<T, D>, facets: ActiveFacetList<D>) -> Vec<Simplex> {
        if facets.is_empty() {
            return Vec::new();
        }
        self.recurse(subset, facets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collections::FastHashMap;
    use crate::geometry::traits::coordinate::Coordinate;

    fn unit_square() -> Vec<Point<f64, 2>> {
        vec![
            Point::new([0.0, 0.0]),
            Point::new([1.0, 0.0]),
            Point::new([0.0, 1.0]),
            Point::new([1.0, 1.0]),
        ]
    }

    #[test]
    fn alpha_plane_picks_widest_axis_and_lowest_on_ties() {
        let alpha = AlphaPlane::select(&[0.0, -1.0, 0.0], &[2.0, 5.0, 6.0]).unwrap();
        assert_eq!(alpha.axis(), 1);
        assert_eq!(alpha.threshold(), 2.0);

        let tie = AlphaPlane::select(&[0.0, 0.0], &[4.0, 4.0]).unwrap();
        assert_eq!(tie.axis(), 0);
        assert_eq!(tie.threshold(), 2.0);

        assert!(AlphaPlane::select(&[1.0, 1.0], &[1.0, 1.0]).is_none());
        assert!(AlphaPlane::<f64>::from_points::<2>(&[]).is_none());
    }

    #[test]
    fn points_on_the_plane_go_to_the_upper_half() {
        let points = [
            Point::new([0.0, 0.0]),
            Point::new([1.0, 0.0]),
            Point::new([2.0, 0.0]),
            Point::new([1.0, 3.0]),
        ];
        let alpha = AlphaPlane {
            axis: 0,
            threshold: 1.0,
        };
        let subset = Subset::new(vec![0, 1, 2, 3], &points);
        let (lower, upper) = subset.split(&alpha, &points);
        assert_eq!(lower.ids(), &[0]);
        assert_eq!(upper.ids(), &[1, 2, 3]);

        let on_plane = Facet::new([1, 3], None).unwrap();
        assert_eq!(alpha.classify(&on_plane, &points), FacetPlacement::Upper);
    }

    #[test]
    fn subset_membership_follows_bounding_box() {
        let points = [
            Point::new([0.0, 0.0]),
            Point::new([2.0, 1.0]),
            Point::new([1.0, 0.5]),
            Point::new([3.0, 0.5]),
        ];
        let subset = Subset::new(vec![0, 1], &points);
        assert!(subset.contains(&points[2]));
        assert!(!subset.contains(&points[3]));
        assert_eq!(subset.scale(), 2.0);

        let empty = Subset::new(Vec::new(), &points);
        assert!(!empty.contains(&Point::new([0.0, 0.0])));
    }

    #[test]
    fn square_gives_two_triangles_with_and_without_grid() {
        let points = unit_square();
        let grid = SpatialGrid::build(&points);
        for grid in [Some(&grid), None] {
            let config = DeWallConfig::default();
            let simplices = DeWall::new(&points, grid, &config).run();
            assert_eq!(simplices.len(), 2);
            // The two triangles share exactly one diagonal.
            let shared: Vec<_> = simplices[0]
                .vertices()
                .iter()
                .filter(|&&v| simplices[1].contains(v))
                .collect();
            assert_eq!(shared.len(), 2);
        }
    }

    #[test]
    fn parallel_and_sequential_runs_agree() {
        let points: Vec<Point<f64, 2>> = (0..200)
            .map(|i| {
                let t = f64::from(i);
                Point::new([(t * 0.618_034).fract() * 10.0, (t * 0.414_213).fract() * 10.0])
            })
            .collect();
        let grid = SpatialGrid::build(&points);
        let sequential = DeWall::new(&points, Some(&grid), &DeWallConfig::default()).run();
        let config = DeWallConfig {
            parallel_threshold: 8,
            ..DeWallConfig::default()
        };
        let parallel = DeWall::new(&points, Some(&grid), &config).run();
        assert!(!sequential.is_empty());
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn cube_corners_are_built_once_with_one_set_of_diagonals() {
        let points: Vec<Point<f64, 3>> = (0..8_i32)
            .map(|i| Point::new([i & 1, (i >> 1) & 1, (i >> 2) & 1].map(f64::from)))
            .collect();
        let grid = SpatialGrid::build(&points);
        let config = DeWallConfig::default();
        let expected = DeWall::new(&points, None, &config).run();
        assert_eq!(DeWall::new(&points, Some(&grid), &config).run(), expected);
        assert!((5..=6).contains(&expected.len()), "{expected:?}");

        // Facets of the cube's faces are used once, inner facets twice.
        let mut uses: FastHashMap<[PointId; 3], usize> = FastHashMap::default();
        for simplex in &expected {
            for facet in simplex.facets::<3>() {
                *uses.entry(facet.key()).or_default() += 1;
            }
        }
        let on_faces = uses.values().filter(|&&n| n == 1).count();
        assert_eq!(on_faces, 12);
        assert!(uses.values().all(|&n| n <= 2));
    }

    #[test]
    fn coincident_points_yield_nothing() {
        let points = vec![Point::new([1.0, 1.0]); 5];
        let simplices = DeWall::new(&points, None, &DeWallConfig::default()).run();
        assert!(simplices.is_empty());
    }
}
