//! Simplex construction: completing an open facet and finding the first
//! simplex of a wall.
//!
//! # Completing a facet
//!
//! The Delaunay simplex on the open side of a facet is the one whose
//! circumsphere contains no other point. Among the points on the open side,
//! that is the point minimizing the signed radius of the sphere through the
//! facet and the point: positive when the center lies on the open side,
//! negative when it lies behind the facet.
//!
//! Points sharing that sphere (the corners of a cube, a regular lattice)
//! are tied. Ties are broken as if each point were lifted off the sphere by
//! an infinitesimal amount that shrinks with its id, point 0 moving most.
//! Under that lifting every cospherical cell has exactly one triangulation,
//! so each facet of the cell is completed the same way from either side.
//! The lifted in-sphere test reduces to the sign of one barycentric
//! coordinate, so it needs no extra precision.
//!
//! With a [`SpatialGrid`] the search runs in rings of cells around the
//! facet's circumcenter and stops as soon as no unvisited cell can hold a
//! point inside the best sphere found so far. Without a grid the whole
//! subset is scanned. Both give the same answer.
//!
//! # First simplex
//!
//! The first simplex is grown one vertex at a time from the point nearest
//! the dividing plane. An empty sphere through the chosen vertices is pushed
//! along a direction orthogonal to their affine hull until it touches the
//! next point; the sphere stays empty at every step, so the result is a
//! Delaunay simplex. The first push heads toward the plane, so the first
//! edge crosses it. When further points lie on the final sphere, the seed is
//! replaced by the crossing simplex of that cell's lifted triangulation.

use nalgebra::{DMatrix, DVector};
use tracing::{debug, trace};

use super::dewall::{AlphaPlane, Subset};
use crate::core::collections::{
    MAX_PRACTICAL_DIMENSION_SIZE, PointId, PointIdBuffer, RingSearch, SmallBuffer, SpatialGrid,
};
use crate::core::config::DeWallConfig;
use crate::core::facet::Facet;
use crate::core::simplex::Simplex;
use crate::geometry::point::Point;
use crate::geometry::predicates::{Orientation, facet_orientation, simplex_orientation};
use crate::geometry::traits::coordinate::{Coordinate, CoordinateScalar};
use crate::geometry::util::{
    Circumsphere, circumsphere, safe_coords_to_f64, safe_scalar_to_f64, safe_usize_to_scalar,
    squared_distance, squared_norm,
};

/// Residuals shorter than this are treated as lying in the hull.
const RESIDUAL_TOLERANCE: f64 = 1e-9;

/// Simplices tried when triangulating the cospherical cell of a seed.
const CELL_COMBINATION_LIMIT: usize = 100_000;

/// Best completion found so far.
#[derive(Clone, Copy, Debug)]
struct Candidate<T, const D: usize>
where
    T: CoordinateScalar,
{
    id: PointId,
    key: T,
    sphere: Circumsphere<T, D>,
}

/// State of one facet completion: the best candidate and every other
/// candidate on the same sphere.
#[derive(Debug)]
struct Completion<T, const D: usize>
where
    T: CoordinateScalar,
{
    best: Option<Candidate<T, D>>,
    tied: Vec<PointId>,
    tolerance: T,
}

impl<T, const D: usize> Completion<T, D>
where
    T: CoordinateScalar,
{
    fn new(tolerance: T) -> Self {
        Self {
            best: None,
            tied: Vec::new(),
            tolerance,
        }
    }

    /// Returns true if `candidate` became the best.
    fn offer(&mut self, candidate: Candidate<T, D>) -> bool {
        let Some(best) = self.best.as_ref() else {
            self.best = Some(candidate);
            return true;
        };
        if same_sphere(&candidate.sphere, &best.sphere, self.tolerance) {
            self.tied.push(candidate.id);
            return false;
        }
        if candidate.key < best.key {
            self.tied.clear();
            self.best = Some(candidate);
            return true;
        }
        false
    }
}

/// Read-only state shared by every wall of one triangulation run.
pub(crate) struct SimplexConstructor<'a, T, const D: usize>
where
    T: CoordinateScalar,
{
    points: &'a [Point<T, D>],
    grid: Option<&'a SpatialGrid<T, D>>,
    epsilon: T,
    side_tolerance: f64,
    ring_patience: Option<usize>,
}

impl<'a, T, const D: usize> SimplexConstructor<'a, T, D>
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
            grid,
            epsilon: config.epsilon,
            side_tolerance: safe_scalar_to_f64(config.epsilon).unwrap_or(0.0),
            ring_patience: config.ring_patience.map(std::num::NonZeroUsize::get),
        }
    }

    // =========================================================================
    // FACET COMPLETION
    // =========================================================================

    /// Point of `subset` completing `facet` into the Delaunay simplex on its
    /// open side, or `None` if the facet lies on the convex hull.
    pub(crate) fn complete(&self, facet: &Facet<D>, subset: &Subset<T, D>) -> Option<PointId> {
        let facet_points = facet.key().map(|id| self.points[id]);
        let target = self.open_side(facet, &facet_points);

        let mut completion = Completion::new(self.epsilon.sqrt());
        match self.grid {
            Some(grid) => {
                self.search_grid(grid, facet, &facet_points, target, subset, &mut completion);
            }
            None => {
                for &id in subset.ids() {
                    self.consider(id, facet, &facet_points, target, &mut completion);
                }
            }
        }

        let Completion { best, mut tied, .. } = completion;
        let best = best?.id;
        if tied.is_empty() {
            return Some(best);
        }
        tied.push(best);
        tied.sort_unstable();
        tied.dedup();
        trace!(facet = ?facet.vertices(), ?tied, "Cospherical completion");
        Some(self.break_tie(facet, &tied).unwrap_or(best))
    }

    /// The tied apex whose simplex holds none of the other tied points
    /// under the lifting.
    fn break_tie(&self, facet: &Facet<D>, tied: &[PointId]) -> Option<PointId> {
        tied.iter().copied().find(|&apex| {
            let simplex = Simplex::from_facet(facet, apex);
            self.is_lifted_empty(&simplex, tied)
        })
    }

    /// Side of the facet away from its opposite vertex; `None` if both sides
    /// are open.
    fn open_side(&self, facet: &Facet<D>, facet_points: &[Point<T, D>; D]) -> Option<Orientation> {
        let opposite = facet.opposite()?;
        match facet_orientation(facet_points, &self.points[opposite], self.side_tolerance) {
            Ok(Orientation::DEGENERATE) | Err(_) => None,
            Ok(side) => Some(side.flipped()),
        }
    }

    /// Offer `id` as a completion. Returns true if it became the best.
    fn consider(
        &self,
        id: PointId,
        facet: &Facet<D>,
        facet_points: &[Point<T, D>; D],
        target: Option<Orientation>,
        completion: &mut Completion<T, D>,
    ) -> bool {
        if facet.contains(id) || facet.opposite() == Some(id) {
            return false;
        }
        let point = &self.points[id];
        let side = match facet_orientation(facet_points, point, self.side_tolerance) {
            Ok(Orientation::DEGENERATE) | Err(_) => return false,
            Ok(side) => side,
        };
        if let Some(open) = target
            && side != open
        {
            return false;
        }

        let mut vertices: SmallBuffer<Point<T, D>, MAX_PRACTICAL_DIMENSION_SIZE> =
            facet_points.iter().copied().collect();
        vertices.push(*point);
        let sphere = circumsphere(&vertices, self.epsilon);
        if sphere.is_degenerate() {
            return false;
        }

        let mut key = sphere.radius_squared;
        if let Some(open) = target
            && matches!(
                facet_orientation(facet_points, &sphere.center, self.side_tolerance),
                Ok(s) if s == open.flipped()
            )
        {
            key = -key;
        }

        completion.offer(Candidate { id, key, sphere })
    }

    fn search_grid(
        &self,
        grid: &SpatialGrid<T, D>,
        facet: &Facet<D>,
        facet_points: &[Point<T, D>; D],
        target: Option<Orientation>,
        subset: &Subset<T, D>,
        completion: &mut Completion<T, D>,
    ) {
        let query = self.search_center(facet_points);
        let mut search = RingSearch::within(grid, query.coords(), subset.lower(), subset.upper());
        let two = T::one() + T::one();
        let mut stale_rings = 0;

        loop {
            let mut improved = false;
            let visited = search.advance(grid, |id| {
                if subset.contains(&self.points[id])
                    && self.consider(id, facet, facet_points, target, completion)
                {
                    improved = true;
                }
            });
            if visited.is_none() {
                break;
            }
            let Some(current) = completion.best.as_ref() else {
                continue;
            };

            // Any better candidate lies inside the current best sphere. With
            // both sides open, a better sphere is no larger and its center is
            // within its radius of the facet's circumcenter.
            let reach = if target.is_some() {
                query.squared_distance(&current.sphere.center).sqrt() + current.sphere.radius()
            } else {
                current.sphere.radius() * two
            };
            if search.unvisited_distance_bound(grid) > reach {
                break;
            }

            if let Some(patience) = self.ring_patience {
                stale_rings = if improved { 0 } else { stale_rings + 1 };
                if stale_rings >= patience {
                    trace!(patience, "Ring search stopped early");
                    break;
                }
            }
        }
    }

    /// Circumcenter of the facet's vertices, or their centroid when they are
    /// degenerate or a single point.
    fn search_center(&self, facet_points: &[Point<T, D>; D]) -> Point<T, D> {
        let sphere = circumsphere(facet_points, self.epsilon);
        if !sphere.is_degenerate() {
            return sphere.center;
        }
        let Ok(count) = safe_usize_to_scalar::<T>(D) else {
            return facet_points[0];
        };
        let mut sum = [T::zero(); D];
        for p in facet_points {
            for (s, &c) in sum.iter_mut().zip(p.coords()) {
                *s = *s + c;
            }
        }
        Point::new(sum.map(|s| s / count))
    }

    // =========================================================================
    // FIRST SIMPLEX
    // =========================================================================

    /// Returns true if no input point lies strictly inside the circumsphere
    /// of `simplex`, up to a relative tolerance of `sqrt(epsilon)`, and no
    /// point on the sphere falls inside it under the lifting. Every input
    /// point is checked, not only those of one subset.
    pub(crate) fn has_empty_circumsphere(&self, simplex: &Simplex) -> bool {
        let Ok(vertices) = simplex.points(self.points) else {
            return false;
        };
        let sphere = circumsphere(&vertices, self.epsilon);
        if sphere.is_degenerate() {
            return false;
        }
        let tolerance = self.epsilon.sqrt();
        let mut empty = true;
        let mut on_sphere = Vec::new();
        let mut check = |id: PointId| {
            if !empty || simplex.contains(id) {
                return;
            }
            let point = &self.points[id];
            if sphere.contains(point, tolerance) {
                empty = false;
            } else if self.is_on_sphere(&sphere, point) {
                on_sphere.push(id);
            }
        };
        match self.grid {
            Some(grid) => {
                let (lower, upper) = self.sphere_box(&sphere);
                grid.for_each_in_box(&lower, &upper, &mut check);
            }
            None => (0..self.points.len()).for_each(&mut check),
        }
        empty && self.is_lifted_empty(simplex, &on_sphere)
    }

    /// A Delaunay simplex of `subset` with an edge crossing `alpha`, or
    /// `None` if the subset spans fewer than D dimensions. The edge only
    /// fails to cross when one side of `alpha` holds no point.
    pub(crate) fn first_simplex(&self, subset: &Subset<T, D>, alpha: &AlphaPlane<T>) -> Option<Simplex> {
        let threshold = safe_scalar_to_f64(alpha.threshold()).ok()?;
        let scale = safe_scalar_to_f64(subset.scale()).ok()?;
        let hull_tolerance = self.side_tolerance.sqrt() * scale;
        let axis = alpha.axis();

        let coords: Vec<(PointId, [f64; D])> = subset
            .ids()
            .iter()
            .filter_map(|&id| {
                safe_coords_to_f64(self.points[id].to_array())
                    .ok()
                    .map(|c| (id, c))
            })
            .collect();

        let mut nearest: Option<(f64, PointId, [f64; D])> = None;
        for &(id, c) in &coords {
            let gap = (c[axis] - threshold).abs();
            if nearest.is_none_or(|(g, i, _)| gap < g || (gap == g && id < i)) {
                nearest = Some((gap, id, c));
            }
        }
        let (_, start, origin) = nearest?;

        let mut chosen = PointIdBuffer::new();
        chosen.push(start);
        let mut center = origin;
        let mut basis: SmallBuffer<[f64; D], MAX_PRACTICAL_DIMENSION_SIZE> = SmallBuffer::new();

        for step in 0..D {
            let (directions, tolerance) = if step == 0 {
                // Away from the plane only when nothing lies toward it.
                let mut toward = [0.0; D];
                toward[axis] = if origin[axis] < threshold { 1.0 } else { -1.0 };
                ([toward, toward.map(|v| -v)].into_iter().collect(), 0.0)
            } else {
                (orthogonal_directions(&basis), hull_tolerance)
            };

            let Some((id, t, u, x)) = directions.iter().find_map(|u| {
                first_touched(&coords, &chosen, &origin, &center, u, tolerance)
                    .map(|(id, t, x)| (id, t, *u, x))
            }) else {
                debug!(step, vertices = chosen.len(), "First simplex search found no next vertex");
                return None;
            };

            for (c, &dir) in center.iter_mut().zip(&u) {
                *c += t * dir;
            }
            let mut edge: [f64; D] = std::array::from_fn(|k| x[k] - origin[k]);
            for b in &basis {
                let along = dot(b, &edge);
                for (e, &bk) in edge.iter_mut().zip(b) {
                    *e -= along * bk;
                }
            }
            let norm = squared_norm(&edge).sqrt();
            if norm <= RESIDUAL_TOLERANCE * scale {
                debug!(step, id, "First simplex vertex lies in the hull of the others");
                return None;
            }
            basis.push(edge.map(|e| e / norm));
            chosen.push(id);
        }

        let simplex = Simplex::new::<D>(&chosen).ok()?;
        let vertices = simplex.points(self.points).ok()?;
        match simplex_orientation(&vertices, self.side_tolerance) {
            Ok(Orientation::DEGENERATE) | Err(_) => {
                debug!(%simplex, "First simplex is flat");
                None
            }
            Ok(_) => Some(self.settle_cell(simplex, subset, alpha)),
        }
    }

    // =========================================================================
    // COSPHERICAL CELLS
    // =========================================================================

    fn is_on_sphere(&self, sphere: &Circumsphere<T, D>, point: &Point<T, D>) -> bool {
        let gap = (sphere.center.squared_distance(point) - sphere.radius_squared).abs();
        gap <= self.epsilon.sqrt() * sphere.radius_squared
    }

    /// Bounding box of `sphere`, widened by the on-sphere tolerance.
    fn sphere_box(&self, sphere: &Circumsphere<T, D>) -> ([T; D], [T; D]) {
        let radius = sphere.radius() * (T::one() + self.epsilon.sqrt());
        (
            sphere.center.coords().map(|c| c - radius),
            sphere.center.coords().map(|c| c + radius),
        )
    }

    /// Sorted ids of the points of `subset` lying on `sphere`.
    fn cospherical(&self, sphere: &Circumsphere<T, D>, subset: &Subset<T, D>) -> Vec<PointId> {
        let mut cell = Vec::new();
        match self.grid {
            Some(grid) => {
                let (lower, upper) = self.sphere_box(sphere);
                grid.for_each_in_box(&lower, &upper, |id| {
                    let point = &self.points[id];
                    if subset.contains(point) && self.is_on_sphere(sphere, point) {
                        cell.push(id);
                    }
                });
            }
            None => cell.extend(
                subset
                    .ids()
                    .iter()
                    .copied()
                    .filter(|&id| self.is_on_sphere(sphere, &self.points[id])),
            ),
        }
        cell.sort_unstable();
        cell.dedup();
        cell
    }

    /// Whether `d`, a point on the circumsphere of `simplex`, lies inside it
    /// once every point `i` is raised above the paraboloid of the lifting
    /// map by `εᵢ`, with `ε₀ ≫ ε₁ ≫ …`.
    ///
    /// Writing `d = Σ λₖ vₖ` in barycentric coordinates of the vertices, `d`
    /// is inside exactly when `ε_d - Σ λₖ ε_vₖ < 0`. The sign comes from the
    /// lowest id among `d` and the vertices with `λₖ ≠ 0`: `d` itself means
    /// outside, a vertex means inside when its `λₖ` is positive.
    fn lifted_inside(&self, simplex: &Simplex, d: PointId) -> bool {
        let Ok(vertices) = simplex.points(self.points) else {
            return false;
        };
        let Some(weights) = barycentric(&vertices, &self.points[d]) else {
            return false;
        };
        simplex
            .vertices()
            .iter()
            .zip(&weights)
            .filter(|(_, w)| w.abs() > RESIDUAL_TOLERANCE)
            .min_by_key(|&(&v, _)| v)
            .is_some_and(|(&v, &w)| v < d && w > 0.0)
    }

    /// No point of `cell` outside `simplex` lies inside it under the lifting.
    fn is_lifted_empty(&self, simplex: &Simplex, cell: &[PointId]) -> bool {
        cell.iter()
            .all(|&d| simplex.contains(d) || !self.lifted_inside(simplex, d))
    }

    /// The simplex of the lifted triangulation of `seed`'s cospherical cell
    /// that crosses `alpha`, or `seed` itself when its sphere holds no other
    /// point of `subset`.
    fn settle_cell(&self, seed: Simplex, subset: &Subset<T, D>, alpha: &AlphaPlane<T>) -> Simplex {
        let Ok(vertices) = seed.points(self.points) else {
            return seed;
        };
        let sphere = circumsphere(&vertices, self.epsilon);
        if sphere.is_degenerate() {
            return seed;
        }
        let cell = self.cospherical(&sphere, subset);
        if cell.len() <= D + 1 {
            return seed;
        }
        trace!(%seed, points = cell.len(), "First simplex lies on a cospherical cell");

        let crosses = |simplex: &Simplex| {
            let below = simplex
                .vertices()
                .iter()
                .filter(|&&v| alpha.is_lower(&self.points[v]))
                .count();
            below > 0 && below <= D
        };
        let mut fallback = None;
        let mut indices: Vec<usize> = (0..=D).collect();
        for _ in 0..CELL_COMBINATION_LIMIT {
            let ids: PointIdBuffer = indices.iter().map(|&i| cell[i]).collect();
            if let Ok(candidate) = Simplex::new::<D>(&ids)
                && self.is_cell_simplex(&candidate, &cell)
            {
                if crosses(&candidate) {
                    return candidate;
                }
                fallback.get_or_insert(candidate);
            }
            if !next_combination(&mut indices, cell.len()) {
                break;
            }
        }
        debug!(%seed, points = cell.len(), "No crossing simplex found in cospherical cell");
        fallback.unwrap_or(seed)
    }

    fn is_cell_simplex(&self, candidate: &Simplex, cell: &[PointId]) -> bool {
        let Ok(vertices) = candidate.points(self.points) else {
            return false;
        };
        matches!(
            simplex_orientation(&vertices, self.side_tolerance),
            Ok(o) if o != Orientation::DEGENERATE
        ) && self.is_lifted_empty(candidate, cell)
    }
}

/// Two spheres are the same when their radii and centers agree within
/// `tolerance · r²`.
fn same_sphere<T, const D: usize>(a: &Circumsphere<T, D>, b: &Circumsphere<T, D>, tolerance: T) -> bool
where
    T: CoordinateScalar,
{
    let slack = tolerance * b.radius_squared;
    (a.radius_squared - b.radius_squared).abs() <= slack
        && a.center.squared_distance(&b.center) <= slack
}

/// Barycentric coordinates of `x` with respect to the D+1 `vertices`.
fn barycentric<T, const D: usize>(
    vertices: &[Point<T, D>],
    x: &Point<T, D>,
) -> Option<SmallBuffer<f64, MAX_PRACTICAL_DIMENSION_SIZE>>
where
    T: CoordinateScalar,
{
    if vertices.len() != D + 1 {
        return None;
    }
    let origin = safe_coords_to_f64(vertices[0].to_array()).ok()?;
    let target = safe_coords_to_f64(x.to_array()).ok()?;
    let mut edges = DMatrix::<f64>::zeros(D, D);
    for (col, vertex) in vertices[1..].iter().enumerate() {
        let c = safe_coords_to_f64(vertex.to_array()).ok()?;
        for (row, (&a, &o)) in c.iter().zip(&origin).enumerate() {
            edges[(row, col)] = a - o;
        }
    }
    let rhs = DVector::from_fn(D, |row, _| target[row] - origin[row]);
    let mu = edges.lu().solve(&rhs)?;

    let mut weights = SmallBuffer::new();
    weights.push(1.0 - mu.sum());
    weights.extend(mu.iter().copied());
    Some(weights)
}

/// Advance `indices` to the next k-subset of `0..n` in lexicographic order.
/// Returns false after the last one.
fn next_combination(indices: &mut [usize], n: usize) -> bool {
    let k = indices.len();
    let Some(i) = (0..k).rev().find(|&i| indices[i] + k < n + i) else {
        return false;
    };
    indices[i] += 1;
    for j in i + 1..k {
        indices[j] = indices[j - 1] + 1;
    }
    true
}

fn dot<const D: usize>(a: &[f64; D], b: &[f64; D]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Unit directions orthogonal to the span of `basis`, both signs, from the
/// residuals of the coordinate axes.
fn orthogonal_directions<const D: usize>(
    basis: &[[f64; D]],
) -> SmallBuffer<[f64; D], { 2 * MAX_PRACTICAL_DIMENSION_SIZE }> {
    let mut directions = SmallBuffer::new();
    for axis in 0..D {
        let mut r = [0.0; D];
        r[axis] = 1.0;
        for b in basis {
            let along = b[axis];
            for (rk, &bk) in r.iter_mut().zip(b) {
                *rk -= along * bk;
            }
        }
        let norm = squared_norm(&r).sqrt();
        if norm > RESIDUAL_TOLERANCE {
            let unit = r.map(|v| v / norm);
            directions.push(unit);
            directions.push(unit.map(|v| -v));
        }
    }
    directions
}

/// The point first reached by the sphere through `origin` with center
/// `center` as the center moves along `u`: id, travel and coordinates.
/// Only points with `u·(x - origin) > tolerance` can be reached.
fn first_touched<const D: usize>(
    coords: &[(PointId, [f64; D])],
    chosen: &[PointId],
    origin: &[f64; D],
    center: &[f64; D],
    u: &[f64; D],
    tolerance: f64,
) -> Option<(PointId, f64, [f64; D])> {
    let radius_squared = squared_distance(origin, center);
    let mut best: Option<(f64, PointId, [f64; D])> = None;
    for &(id, x) in coords {
        if chosen.contains(&id) {
            continue;
        }
        let offset: [f64; D] = std::array::from_fn(|k| x[k] - origin[k]);
        let w = dot(u, &offset);
        if w <= tolerance {
            continue;
        }
        let t = ((squared_distance(&x, center) - radius_squared) / (2.0 * w)).max(0.0);
        if best.is_none_or(|(bt, bid, _)| t < bt || (t == bt && id < bid)) {
            best = Some((t, id, x));
        }
    }
    best.map(|(t, id, x)| (id, t, x))
}
