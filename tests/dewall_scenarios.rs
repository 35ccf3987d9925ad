//! Fixed point sets with known triangulations.
//!
//! Small hand-checked inputs in 1D, 2D and 3D, cospherical lattices, the
//! degenerate inputs that must give an empty result, and the inputs that
//! must be rejected.

use approx::assert_relative_eq;
use dewall::prelude::*;

fn simplices_of<const D: usize>(ids: &[&[PointId]]) -> Vec<Simplex> {
    let mut simplices: Vec<Simplex> = ids
        .iter()
        .map(|ids| Simplex::new::<D>(ids).unwrap())
        .collect();
    simplices.sort_unstable();
    simplices
}

// =============================================================================
// KNOWN CONFIGURATIONS
// =============================================================================

#[test]
fn right_triangle_is_one_simplex() {
    let points = vec![
        Point::new([0.0, 0.0]),
        Point::new([1.0, 0.0]),
        Point::new([0.0, 1.0]),
    ];
    let dt = DeWallTriangulation::new(&points).unwrap();
    assert_eq!(dt.simplices(), simplices_of::<2>(&[&[0, 1, 2]]).as_slice());

    let sphere = dt.circumsphere(&dt.simplices()[0]).unwrap();
    assert_relative_eq!(sphere.center.coords()[0], 0.5, epsilon = 1e-12);
    assert_relative_eq!(sphere.center.coords()[1], 0.5, epsilon = 1e-12);
    assert_relative_eq!(sphere.radius_squared, 0.5, epsilon = 1e-12);
}

#[test]
fn unit_square_splits_into_two_triangles() {
    let points = vec![
        Point::new([0.0, 0.0]),
        Point::new([1.0, 0.0]),
        Point::new([1.0, 1.0]),
        Point::new([0.0, 1.0]),
    ];
    for use_spatial_index in [true, false] {
        let config = DeWallConfigBuilder::default()
            .use_spatial_index(use_spatial_index)
            .build()
            .unwrap();
        let dt = DeWallTriangulation::with_config(&points, &config).unwrap();
        assert_eq!(dt.number_of_simplices(), 2, "grid: {use_spatial_index}");
        assert!(dt.validate_delaunay().is_ok());
        assert!(dt.validate_vertex_coverage().is_ok());

        // The two triangles share exactly one diagonal.
        let [a, b] = dt.simplices() else {
            unreachable!()
        };
        let shared = a.vertices().iter().filter(|&&v| b.contains(v)).count();
        assert_eq!(shared, 2);
    }
}

#[test]
fn perturbed_square_uses_the_short_diagonal() {
    // Point 2 lies outside the circle through 0, 1 and 3.
    let points = vec![
        Point::new([0.0, 0.0]),
        Point::new([1.0, 0.0]),
        Point::new([1.0, 1.2]),
        Point::new([0.0, 1.0]),
    ];
    let simplices = triangulate(&points).unwrap();
    assert_eq!(simplices, simplices_of::<2>(&[&[0, 1, 3], &[1, 2, 3]]));
}

#[test]
fn regular_tetrahedron_is_one_simplex() {
    let points = vec![
        Point::new([1.0, 1.0, 1.0]),
        Point::new([1.0, -1.0, -1.0]),
        Point::new([-1.0, 1.0, -1.0]),
        Point::new([-1.0, -1.0, 1.0]),
    ];
    let dt = DeWallTriangulation::new(&points).unwrap();
    assert_eq!(dt.simplices(), simplices_of::<3>(&[&[0, 1, 2, 3]]).as_slice());
    assert_eq!(dt.dim(), 3);

    let sphere = dt.circumsphere(&dt.simplices()[0]).unwrap();
    for c in sphere.center.coords() {
        assert_relative_eq!(*c, 0.0, epsilon = 1e-12);
    }
    assert_relative_eq!(sphere.radius_squared, 3.0, epsilon = 1e-12);
}

#[test]
fn tetrahedron_with_interior_point_has_four_simplices() {
    let points = vec![
        Point::new([0.0, 0.0, 0.0]),
        Point::new([4.0, 0.0, 0.0]),
        Point::new([0.0, 4.0, 0.0]),
        Point::new([0.0, 0.0, 4.0]),
        Point::new([1.0, 0.9, 1.1]),
    ];
    let simplices = triangulate(&points).unwrap();
    assert_eq!(
        simplices,
        simplices_of::<3>(&[&[0, 1, 2, 4], &[0, 1, 3, 4], &[0, 2, 3, 4], &[1, 2, 3, 4]])
    );
}

#[test]
fn one_dimensional_points_become_consecutive_segments() {
    let xs = [5.0, -2.0, 0.5, 9.0, 3.0];
    let points: Vec<Point<f64, 1>> = xs.iter().map(|&x| Point::new([x])).collect();
    let simplices = triangulate(&points).unwrap();
    // Sorted order: -2 (1), 0.5 (2), 3 (4), 5 (0), 9 (3).
    assert_eq!(
        simplices,
        simplices_of::<1>(&[&[1, 2], &[2, 4], &[0, 4], &[0, 3]])
    );
}

#[test]
fn f32_coordinates_are_supported() {
    let points: Vec<Point<f32, 2>> = vec![
        Point::new([0.0, 0.0]),
        Point::new([2.0, 0.0]),
        Point::new([0.0, 2.0]),
        Point::new([2.0, 2.5]),
        Point::new([0.9, 1.1]),
    ];
    let dt = DeWallTriangulation::new(&points).unwrap();
    assert_eq!(dt.number_of_simplices(), 4);
    assert!(dt.validate_delaunay().is_ok());
    assert!(dt.validate_vertex_coverage().is_ok());
}

#[test]
fn points_mode_matches_id_mode() {
    let points = vec![
        Point::new([0.0, 0.0]),
        Point::new([3.0, 0.5]),
        Point::new([1.0, 2.5]),
        Point::new([2.5, 2.0]),
    ];
    let config = DeWallConfig::default();
    let ids = triangulate_with_config(&points, &config).unwrap();
    let coords = triangulate_points(&points, &config).unwrap();
    assert_eq!(ids.len(), coords.len());
    for (simplex, vertices) in ids.iter().zip(&coords) {
        assert_eq!(simplex.points(&points).unwrap(), *vertices);
    }
}

// =============================================================================
// COSPHERICAL INPUT
// =============================================================================

fn tetrahedron_volume(points: &[Point<f64, 3>], simplex: &Simplex) -> f64 {
    let v = simplex.vertices();
    let a = *points[v[0]].coords();
    let edge = |id: PointId| {
        let p = points[id].coords();
        [p[0] - a[0], p[1] - a[1], p[2] - a[2]]
    };
    let (u, w, x) = (edge(v[1]), edge(v[2]), edge(v[3]));
    let det = u[0] * (w[1] * x[2] - w[2] * x[1]) - u[1] * (w[0] * x[2] - w[2] * x[0])
        + u[2] * (w[0] * x[1] - w[1] * x[0]);
    det.abs() / 6.0
}

/// Every configuration must give the same tetrahedra, tiling the box of
/// volume `hull_volume` with no point inside any circumsphere.
fn assert_lattice_is_tiled(points: &[Point<f64, 3>], hull_volume: f64) -> Vec<Simplex> {
    let configs = [
        DeWallConfig::default(),
        DeWallConfigBuilder::default()
            .use_spatial_index(false)
            .build()
            .unwrap(),
        DeWallConfigBuilder::default()
            .parallel_threshold(2)
            .build()
            .unwrap(),
    ];
    let simplices = triangulate_with_config(points, &configs[0]).unwrap();
    for config in &configs[1..] {
        assert_eq!(triangulate_with_config(points, config).unwrap(), simplices);
    }

    let volume: f64 = simplices.iter().map(|s| tetrahedron_volume(points, s)).sum();
    assert_relative_eq!(volume, hull_volume, epsilon = 1e-9);
    assert!(simplices.iter().all(|s| tetrahedron_volume(points, s) > 1e-12));

    let violations = find_delaunay_violations(points, &simplices, 1e-9);
    assert!(violations.is_empty(), "violations: {violations:?}");
    assert!(validate_vertex_coverage(points, &simplices).is_ok());

    let mut facet_uses: FastHashMap<[PointId; 3], usize> = FastHashMap::default();
    for simplex in &simplices {
        for facet in simplex.facets::<3>() {
            *facet_uses.entry(facet.key()).or_default() += 1;
        }
    }
    assert!(facet_uses.values().all(|&uses| uses <= 2));
    simplices
}

#[test]
fn unit_cube_corners_tile_the_cube() {
    let points = generate_grid_points::<f64, 3>(2, 1.0, [0.0, 0.0, 0.0]).unwrap();
    let simplices = assert_lattice_is_tiled(&points, 1.0);
    // A cube splits into five or six tetrahedra, depending on its diagonals.
    assert!(
        (5..=6).contains(&simplices.len()),
        "{} tetrahedra",
        simplices.len()
    );
}

#[test]
fn shifted_cube_corners_tile_the_cube() {
    let points = generate_grid_points::<f64, 3>(2, 0.5, [10.0, -3.0, 7.25]).unwrap();
    assert_lattice_is_tiled(&points, 0.125);
}

#[test]
fn three_by_three_lattice_tiles_its_box() {
    let points = generate_grid_points::<f64, 3>(3, 1.0, [0.0, 0.0, 0.0]).unwrap();
    let simplices = assert_lattice_is_tiled(&points, 8.0);
    assert!((40..=48).contains(&simplices.len()), "{} tetrahedra", simplices.len());
}

#[test]
fn square_lattice_tiles_its_square() {
    let points = generate_grid_points::<f64, 2>(16, 1.0, [0.0, 0.0]).unwrap();
    let simplices = triangulate(&points).unwrap();
    // Every unit square holds two triangles.
    assert_eq!(simplices.len(), 2 * 15 * 15);
    assert!(find_delaunay_violations(&points, &simplices, 1e-9).is_empty());
    assert!(validate_vertex_coverage(&points, &simplices).is_ok());
}

// =============================================================================
// DEGENERATE INPUT
// =============================================================================

#[test]
fn too_few_points_give_an_empty_result() {
    let points = vec![Point::new([0.0, 0.0, 0.0]), Point::new([1.0, 2.0, 3.0])];
    assert!(triangulate(&points).unwrap().is_empty());
    assert!(triangulate::<f64, 2>(&[]).unwrap().is_empty());
    assert_eq!(DeWallTriangulation::new(&points).unwrap().dim(), -1);
}

#[test]
fn collinear_points_give_an_empty_result() {
    let points: Vec<Point<f64, 2>> = (0..6)
        .map(|i| {
            let t = f64::from(i);
            Point::new([t, 0.5 * t - 1.0])
        })
        .collect();
    assert!(triangulate(&points).unwrap().is_empty());
}

#[test]
fn coplanar_points_give_an_empty_result_in_3d() {
    let points = vec![
        Point::new([0.0, 0.0, 1.0]),
        Point::new([1.0, 0.0, 1.0]),
        Point::new([0.0, 1.0, 1.0]),
        Point::new([1.0, 1.3, 1.0]),
        Point::new([0.4, 0.2, 1.0]),
    ];
    assert!(triangulate(&points).unwrap().is_empty());
}

#[test]
fn duplicate_point_is_left_out() {
    let points = vec![
        Point::new([0.0, 0.0]),
        Point::new([1.0, 0.0]),
        Point::new([0.0, 1.0]),
        Point::new([1.0, 0.0]),
    ];
    let dt = DeWallTriangulation::new(&points).unwrap();
    assert_eq!(dt.simplices(), simplices_of::<2>(&[&[0, 1, 2]]).as_slice());
    assert!(dt.validate_delaunay().is_ok());
    assert_eq!(
        dt.validate_vertex_coverage(),
        Err(DelaunayValidationError::MissingVertex { point_index: 3 })
    );
}

// =============================================================================
// REJECTED INPUT
// =============================================================================

#[test]
fn non_finite_coordinates_are_rejected() {
    let points = vec![
        Point::new([0.0, 0.0]),
        Point::new([1.0, 0.0]),
        Point::new([0.0, f64::INFINITY]),
    ];
    assert!(matches!(
        triangulate(&points),
        Err(DeWallError::InvalidPoint { index: 2, .. })
    ));
}

#[test]
fn invalid_config_is_rejected() {
    let points = vec![
        Point::new([0.0, 0.0]),
        Point::new([1.0, 0.0]),
        Point::new([0.0, 1.0]),
    ];
    let config = DeWallConfig {
        epsilon: f64::NAN,
        ..DeWallConfig::default()
    };
    assert!(matches!(
        triangulate_with_config(&points, &config),
        Err(DeWallError::InvalidConfig(_))
    ));
}
