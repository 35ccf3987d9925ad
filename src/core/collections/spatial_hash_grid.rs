//! Uniform spatial grid used by the nearest-empty-circumsphere search.
//!
//! The grid covers the bounding box of the whole input with roughly one
//! point per cell and is built once per triangulation call. It is read-only
//! afterwards and shared by reference across parallel branches; every search
//! keeps its own cursor in a [`RingSearch`].
//!
//! Cells are addressed by integer coordinates `[usize; D]` and only occupied
//! cells are stored, so memory stays proportional to the point count even
//! when `cells_per_axis^D` is large.

use num_traits::cast;

use super::{FastHashMap, PointId, SmallBuffer, fast_hash_map_with_capacity};
use crate::geometry::point::Point;
use crate::geometry::traits::coordinate::CoordinateScalar;
use crate::geometry::util::safe_usize_to_scalar;

const BUCKET_INLINE_CAPACITY: usize = 8;

/// Integer coordinates of a grid cell.
pub type GridCell<const D: usize> = [usize; D];

/// Uniform grid over the input bounding box mapping cells to point ids.
///
/// ```rust
/// use dewall::core::collections::SpatialGrid;
/// use dewall::geometry::point::Point;
/// use dewall::geometry::traits::coordinate::Coordinate;
///
/// let points: Vec<Point<f64, 2>> = (0..16)
///     .map(|i| Point::new([f64::from(i % 4), f64::from(i / 4)]))
///     .collect();
/// let grid = SpatialGrid::build(&points);
/// assert_eq!(grid.cells_per_axis(), &[4, 4]);
/// assert_eq!(grid.cell_of(&[3.0, 0.0]), [3, 0]);
/// assert_eq!(grid.cell_of(&[-100.0, 100.0]), [0, 3]);
/// ```
#[derive(Clone, Debug)]
pub struct SpatialGrid<T, const D: usize>
where
    T: CoordinateScalar,
{
    origin: [T; D],
    cell_width: [T; D],
    cells_per_axis: [usize; D],
    min_cell_width: T,
    buckets: FastHashMap<GridCell<D>, SmallBuffer<PointId, BUCKET_INLINE_CAPACITY>>,
}

impl<T, const D: usize> SpatialGrid<T, D>
where
    T: CoordinateScalar,
{
    /// Build the grid over `points`; point ids are slice indices.
    ///
    /// Axes with zero extent get a single cell of width 1.
    #[must_use]
    pub fn build(points: &[Point<T, D>]) -> Self {
        let mut lower = [T::zero(); D];
        let mut upper = [T::zero(); D];
        if let Some(first) = points.first() {
            lower = *first.coords();
            upper = lower;
            for p in &points[1..] {
                for (axis, &c) in p.coords().iter().enumerate() {
                    lower[axis] = lower[axis].min(c);
                    upper[axis] = upper[axis].max(c);
                }
            }
        }

        let target = cells_per_axis_for(points.len(), D);
        let mut cells_per_axis = [1usize; D];
        let mut cell_width = [T::one(); D];
        let mut min_cell_width = T::infinity();
        if let Ok(target_t) = safe_usize_to_scalar::<T>(target) {
            for axis in 0..D {
                let width = (upper[axis] - lower[axis]) / target_t;
                if target > 1 && width > T::zero() && width.is_finite() {
                    cells_per_axis[axis] = target;
                    cell_width[axis] = width;
                    min_cell_width = min_cell_width.min(width);
                }
            }
        }
        if !min_cell_width.is_finite() {
            // Single cell per axis: ring 0 covers everything.
            min_cell_width = T::zero();
        }

        let mut grid = Self {
            origin: lower,
            cell_width,
            cells_per_axis,
            min_cell_width,
            buckets: fast_hash_map_with_capacity(points.len()),
        };
        for (id, p) in points.iter().enumerate() {
            let cell = grid.cell_of(p.coords());
            grid.buckets.entry(cell).or_default().push(id);
        }
        grid
    }

    /// Number of cells along each axis.
    #[must_use]
    pub const fn cells_per_axis(&self) -> &[usize; D] {
        &self.cells_per_axis
    }

    /// Smallest cell width over the subdivided axes (zero if none is).
    ///
    /// Any point in a cell whose index differs from the center cell by more
    /// than `k` along some axis is farther than `k * min_cell_width` away.
    #[must_use]
    pub const fn min_cell_width(&self) -> T {
        self.min_cell_width
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.buckets.len()
    }

    /// Cell containing `coords`, clamped to the grid.
    #[must_use]
    pub fn cell_of(&self, coords: &[T; D]) -> GridCell<D> {
        let mut cell = [0usize; D];
        for (axis, slot) in cell.iter_mut().enumerate() {
            let last = self.cells_per_axis[axis] - 1;
            let scaled = ((coords[axis] - self.origin[axis]) / self.cell_width[axis]).floor();
            *slot = if scaled > T::zero() {
                cast::<T, usize>(scaled).map_or(last, |i| i.min(last))
            } else {
                0
            };
        }
        cell
    }

    fn full_window(&self) -> CellWindow<D> {
        CellWindow {
            lo: [0; D],
            hi: self.cells_per_axis.map(|n| n - 1),
        }
    }

    /// Largest ring radius around `center` that still contains grid cells.
    #[must_use]
    pub fn max_ring(&self, center: &GridCell<D>) -> usize {
        self.full_window().max_ring(center)
    }

    /// Call `f` for every point in the cells at Chebyshev distance exactly
    /// `radius` from `center`, clipped to the grid. Each cell is visited once.
    ///
    /// Returns `false` if the ring lies wholly outside the grid.
    pub fn for_each_in_ring<F>(&self, center: &GridCell<D>, radius: usize, f: F) -> bool
    where
        F: FnMut(PointId),
    {
        self.for_each_in_window_ring(&self.full_window(), center, radius, f)
    }

    /// Call `f` for every point in the cells overlapping the box
    /// `[lower, upper]`.
    pub fn for_each_in_box<F>(&self, lower: &[T; D], upper: &[T; D], mut f: F)
    where
        F: FnMut(PointId),
    {
        let window = CellWindow {
            lo: self.cell_of(lower),
            hi: self.cell_of(upper),
        };
        let volume = (0..D)
            .map(|axis| window.hi[axis] - window.lo[axis] + 1)
            .try_fold(1usize, usize::checked_mul);
        if volume.is_none_or(|v| v > self.buckets.len()) {
            for (cell, bucket) in &self.buckets {
                if window.contains(cell) {
                    bucket.iter().for_each(|&id| f(id));
                }
            }
            return;
        }

        let mut cell = window.lo;
        loop {
            if let Some(bucket) = self.buckets.get(&cell) {
                bucket.iter().for_each(|&id| f(id));
            }
            let mut axis = 0;
            loop {
                if axis == D {
                    return;
                }
                if cell[axis] < window.hi[axis] {
                    cell[axis] += 1;
                    break;
                }
                cell[axis] = window.lo[axis];
                axis += 1;
            }
        }
    }

    fn for_each_in_window_ring<F>(
        &self,
        window: &CellWindow<D>,
        center: &GridCell<D>,
        radius: usize,
        mut f: F,
    ) -> bool
    where
        F: FnMut(PointId),
    {
        if radius > window.max_ring(center) {
            return false;
        }
        let mut current = *center;
        window.visit_ring_cells(0, center, radius, radius == 0, &mut current, &mut |cell| {
            if let Some(bucket) = self.buckets.get(cell) {
                for &id in bucket {
                    f(id);
                }
            }
        });
        true
    }
}

/// Inclusive box of cells a search is confined to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CellWindow<const D: usize> {
    lo: GridCell<D>,
    hi: GridCell<D>,
}

impl<const D: usize> CellWindow<D> {
    fn clamp(&self, cell: &GridCell<D>) -> GridCell<D> {
        let mut out = *cell;
        for (axis, c) in out.iter_mut().enumerate() {
            *c = (*c).clamp(self.lo[axis], self.hi[axis]);
        }
        out
    }

    fn contains(&self, cell: &GridCell<D>) -> bool {
        (0..D).all(|axis| self.lo[axis] <= cell[axis] && cell[axis] <= self.hi[axis])
    }

    fn max_ring(&self, center: &GridCell<D>) -> usize {
        (0..D)
            .map(|axis| (center[axis] - self.lo[axis]).max(self.hi[axis] - center[axis]))
            .max()
            .unwrap_or(0)
    }

    fn visit_ring_cells<F>(
        &self,
        axis: usize,
        center: &GridCell<D>,
        radius: usize,
        on_surface: bool,
        current: &mut GridCell<D>,
        visit: &mut F,
    ) where
        F: FnMut(&GridCell<D>),
    {
        if axis == D {
            if on_surface {
                visit(current);
            }
            return;
        }

        let c = center[axis];
        let (first, last) = (self.lo[axis], self.hi[axis]);

        if axis + 1 == D && !on_surface {
            // Only the two faces of the cube remain on this axis.
            if c >= first + radius {
                current[axis] = c - radius;
                self.visit_ring_cells(axis + 1, center, radius, true, current, visit);
            }
            if radius > 0 && c + radius <= last {
                current[axis] = c + radius;
                self.visit_ring_cells(axis + 1, center, radius, true, current, visit);
            }
            return;
        }

        let lo = c.saturating_sub(radius).max(first);
        let hi = (c + radius).min(last);
        for i in lo..=hi {
            current[axis] = i;
            let touches = i.abs_diff(c) == radius;
            self.visit_ring_cells(axis + 1, center, radius, on_surface || touches, current, visit);
        }
    }
}

/// `max(1, round(n^(1/D)))`, about one point per cell.
fn cells_per_axis_for(n_points: usize, dimension: usize) -> usize {
    if n_points <= 1 || dimension == 0 {
        return 1;
    }
    let Ok(n) = safe_usize_to_scalar::<f64>(n_points) else {
        return 1;
    };
    let Ok(d) = safe_usize_to_scalar::<f64>(dimension) else {
        return 1;
    };
    cast::<f64, usize>(n.powf(d.recip()).round())
        .unwrap_or(1)
        .max(1)
}

/// Cursor of one expanding-ring search over a [`SpatialGrid`].
///
/// A search may be confined to the cells overlapping a box; cells outside
/// it are never visited, so the cost of an exhaustive search is bounded by
/// the points inside the box rather than the whole grid.
#[derive(Clone, Debug)]
pub struct RingSearch<const D: usize> {
    window: CellWindow<D>,
    center: GridCell<D>,
    next_radius: usize,
    last_radius: usize,
}

impl<const D: usize> RingSearch<D> {
    /// Start a search around the cell containing `query`.
    #[must_use]
    pub fn new<T: CoordinateScalar>(grid: &SpatialGrid<T, D>, query: &[T; D]) -> Self {
        Self::start(grid.full_window(), grid.cell_of(query))
    }

    /// Start a search around `query` that only visits cells overlapping the
    /// box `[lower, upper]`. A query outside the box starts from the nearest
    /// cell of the box.
    #[must_use]
    pub fn within<T: CoordinateScalar>(
        grid: &SpatialGrid<T, D>,
        query: &[T; D],
        lower: &[T; D],
        upper: &[T; D],
    ) -> Self {
        let window = CellWindow {
            lo: grid.cell_of(lower),
            hi: grid.cell_of(upper),
        };
        Self::start(window, window.clamp(&grid.cell_of(query)))
    }

    fn start(window: CellWindow<D>, center: GridCell<D>) -> Self {
        Self {
            window,
            center,
            next_radius: 0,
            last_radius: window.max_ring(&center),
        }
    }

    /// Visit the next ring. Returns its radius, or `None` once every cell
    /// of the search box has been visited.
    pub fn advance<T, F>(&mut self, grid: &SpatialGrid<T, D>, f: F) -> Option<usize>
    where
        T: CoordinateScalar,
        F: FnMut(PointId),
    {
        if self.is_exhausted() {
            return None;
        }
        let radius = self.next_radius;
        grid.for_each_in_window_ring(&self.window, &self.center, radius, f);
        self.next_radius += 1;
        Some(radius)
    }

    /// Returns true once every cell has been visited.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.next_radius > self.last_radius
    }

    /// Lower bound on the distance from the query to any point of the box
    /// not yet visited. One ring of slack absorbs rounding in cell
    /// assignment.
    #[must_use]
    pub fn unvisited_distance_bound<T: CoordinateScalar>(&self, grid: &SpatialGrid<T, D>) -> T {
        safe_usize_to_scalar::<T>(self.next_radius.saturating_sub(2))
            .map_or_else(|_| T::zero(), |rings| rings * grid.min_cell_width())
    }
}
