//! Triangulation entry points and the [`DeWallTriangulation`] result type.
//!
//! [`triangulate`] and [`triangulate_with_config`] return the simplices as
//! sorted point-id lists; [`triangulate_points`] resolves them to
//! coordinates. [`DeWallTriangulation`] keeps the input borrowed next to the
//! simplices and adds queries and validation.
//!
//! Input handling:
//!
//! - fewer than D+1 points, or points that span fewer than D dimensions,
//!   give an empty triangulation rather than an error;
//! - a NaN or infinite coordinate is rejected with
//!   [`DeWallError::InvalidPoint`];
//! - duplicate points are allowed; only one copy becomes a vertex.

use thiserror::Error;
use tracing::debug;

use crate::core::algorithms::dewall::DeWall;
use crate::core::collections::{MAX_PRACTICAL_DIMENSION_SIZE, SmallBuffer, SpatialGrid};
use crate::core::config::{ConfigError, DeWallConfig};
use crate::core::simplex::{Simplex, SimplexError};
use crate::core::util::{
    DelaunayValidationError, validate_empty_circumspheres, validate_vertex_coverage,
    validate_well_formed,
};
use crate::geometry::point::Point;
use crate::geometry::traits::coordinate::{Coordinate, CoordinateScalar, CoordinateValidationError};
use crate::geometry::util::{Circumsphere, circumsphere, safe_scalar_to_f64};

/// Errors returned by the triangulation entry points.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum DeWallError {
    /// An input point has a NaN or infinite coordinate.
    #[error("Invalid point at index {index}: {source}")]
    InvalidPoint {
        /// Index of the point in the input slice
        index: usize,
        /// The coordinate problem
        #[source]
        source: CoordinateValidationError,
    },
    /// Points must have at least one coordinate.
    #[error("Unsupported dimension {dimension}: triangulation needs D >= 1")]
    UnsupportedDimension {
        /// The rejected dimension
        dimension: usize,
    },
    /// The configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    /// A simplex could not be resolved against the input points.
    #[error("Simplex error: {0}")]
    Simplex(#[from] SimplexError),
}

/// Triangulate `points` with the default configuration.
///
/// # Errors
///
/// See [`triangulate_with_config`].
///
/// # Examples
///
/// ```rust
/// use dewall::core::triangulation::triangulate;
/// use dewall::geometry::point::Point;
/// use dewall::geometry::traits::coordinate::Coordinate;
///
/// let points = vec![
///     Point::new([0.0, 0.0]),
///     Point::new([1.0, 0.0]),
///     Point::new([0.0, 1.0]),
///     Point::new([1.0, 1.0]),
/// ];
/// let simplices = triangulate(&points).unwrap();
/// assert_eq!(simplices.len(), 2);
/// ```
pub fn triangulate<T, const D: usize>(points: &[Point<T, D>]) -> Result<Vec<Simplex>, DeWallError>
where
    T: CoordinateScalar,
{
    triangulate_with_config(points, &DeWallConfig::default())
}

/// Triangulate `points` with explicit options.
///
/// The result is sorted; every simplex holds D+1 distinct ids into `points`.
///
/// # Errors
///
/// Returns `DeWallError::UnsupportedDimension` for `D == 0`,
/// `DeWallError::InvalidConfig` if `config` fails validation, and
/// `DeWallError::InvalidPoint` for the first non-finite point.
pub fn triangulate_with_config<T, const D: usize>(
    points: &[Point<T, D>],
    config: &DeWallConfig<T>,
) -> Result<Vec<Simplex>, DeWallError>
where
    T: CoordinateScalar,
{
    if D == 0 {
        return Err(DeWallError::UnsupportedDimension { dimension: D });
    }
    config.validate()?;
    for (index, point) in points.iter().enumerate() {
        point
            .validate()
            .map_err(|source| DeWallError::InvalidPoint { index, source })?;
    }
    if points.len() < D + 1 {
        debug!(points = points.len(), dimension = D, "Too few points for a simplex");
        return Ok(Vec::new());
    }

    let grid = config.use_spatial_index.then(|| SpatialGrid::build(points));
    if let Some(grid) = &grid {
        debug!(
            points = points.len(),
            dimension = D,
            occupied_cells = grid.occupied_cells(),
            "Spatial grid built"
        );
    }
    Ok(DeWall::new(points, grid.as_ref(), config).run())
}

/// Triangulate and return each simplex as its D+1 vertex coordinates.
///
/// # Errors
///
/// Same as [`triangulate_with_config`].
pub fn triangulate_points<T, const D: usize>(
    points: &[Point<T, D>],
    config: &DeWallConfig<T>,
) -> Result<Vec<SmallBuffer<Point<T, D>, MAX_PRACTICAL_DIMENSION_SIZE>>, DeWallError>
where
    T: CoordinateScalar,
{
    triangulate_with_config(points, config)?
        .iter()
        .map(|simplex| simplex.points(points).map_err(DeWallError::from))
        .collect()
}

/// A triangulation together with the points it was built from.
///
/// # Examples
///
/// ```rust
/// use dewall::core::triangulation::DeWallTriangulation;
/// use dewall::geometry::point::Point;
/// use dewall::geometry::traits::coordinate::Coordinate;
///
/// let points = vec![
///     Point::new([0.0, 0.0, 0.0]),
///     Point::new([1.0, 0.0, 0.0]),
///     Point::new([0.0, 1.0, 0.0]),
///     Point::new([0.0, 0.0, 1.0]),
///     Point::new([1.0, 1.0, 1.0]),
/// ];
/// let dt = DeWallTriangulation::new(&points).unwrap();
/// assert_eq!(dt.number_of_points(), 5);
/// assert_eq!(dt.dim(), 3);
/// assert!(dt.number_of_simplices() >= 2);
/// assert!(dt.validate_delaunay().is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct DeWallTriangulation<'a, T, const D: usize>
where
    T: CoordinateScalar,
{
    points: &'a [Point<T, D>],
    simplices: Vec<Simplex>,
    config: DeWallConfig<T>,
}

impl<'a, T, const D: usize> DeWallTriangulation<'a, T, D>
where
    T: CoordinateScalar,
{
    /// Triangulate with the default configuration.
    ///
    /// # Errors
    ///
    /// See [`triangulate_with_config`].
    pub fn new(points: &'a [Point<T, D>]) -> Result<Self, DeWallError> {
        Self::with_config(points, &DeWallConfig::default())
    }

    /// Triangulate with explicit options.
    ///
    /// # Errors
    ///
    /// See [`triangulate_with_config`].
    pub fn with_config(points: &'a [Point<T, D>], config: &DeWallConfig<T>) -> Result<Self, DeWallError> {
        Ok(Self {
            points,
            simplices: triangulate_with_config(points, config)?,
            config: *config,
        })
    }

    /// The input points.
    #[must_use]
    pub const fn points(&self) -> &'a [Point<T, D>] {
        self.points
    }

    /// The simplices in canonical (sorted) order.
    #[must_use]
    pub fn simplices(&self) -> &[Simplex] {
        &self.simplices
    }

    /// The options the triangulation was built with.
    #[must_use]
    pub const fn config(&self) -> &DeWallConfig<T> {
        &self.config
    }

    /// Number of input points, including any that are not vertices.
    #[must_use]
    pub fn number_of_points(&self) -> usize {
        self.points.len()
    }

    /// Number of D-simplices.
    #[must_use]
    pub fn number_of_simplices(&self) -> usize {
        self.simplices.len()
    }

    /// Dimension of the triangulation: `D`, or -1 if it has no simplex.
    #[must_use]
    pub fn dim(&self) -> i32 {
        if self.simplices.is_empty() {
            -1
        } else {
            i32::try_from(D).unwrap_or(i32::MAX)
        }
    }

    /// Vertex coordinates of `simplex`.
    ///
    /// # Errors
    ///
    /// Returns `SimplexError::PointOutOfRange` if `simplex` does not belong
    /// to these points.
    pub fn simplex_points(
        &self,
        simplex: &Simplex,
    ) -> Result<SmallBuffer<Point<T, D>, MAX_PRACTICAL_DIMENSION_SIZE>, SimplexError> {
        simplex.points(self.points)
    }

    /// Circumsphere of `simplex`.
    ///
    /// # Errors
    ///
    /// Same as [`DeWallTriangulation::simplex_points`].
    pub fn circumsphere(&self, simplex: &Simplex) -> Result<Circumsphere<T, D>, SimplexError> {
        Ok(circumsphere(&self.simplex_points(simplex)?, self.config.epsilon))
    }

    /// Structural checks: D+1 distinct in-range ids per simplex, positive
    /// volume, no duplicate simplices.
    ///
    /// # Errors
    ///
    /// Returns the first structural problem found.
    pub fn is_valid(&self) -> Result<(), DelaunayValidationError> {
        validate_well_formed(self.points, &self.simplices, self.side_tolerance())
    }

    /// Structural checks followed by the empty-circumsphere check.
    ///
    /// The in-sphere test uses a relative tolerance of `sqrt(epsilon)`.
    ///
    /// # Errors
    ///
    /// Returns the first structural problem or Delaunay violation found.
    pub fn validate_delaunay(&self) -> Result<(), DelaunayValidationError> {
        self.is_valid()?;
        validate_empty_circumspheres(self.points, &self.simplices, self.config.epsilon.sqrt())
    }

    /// Check that every input point is a vertex.
    ///
    /// # Errors
    ///
    /// Returns `DelaunayValidationError::MissingVertex` for the first
    /// uncovered point. Expected for duplicate points and degenerate input.
    pub fn validate_vertex_coverage(&self) -> Result<(), DelaunayValidationError> {
        validate_vertex_coverage(self.points, &self.simplices)
    }

    /// Consume the triangulation, keeping only the simplices.
    #[must_use]
    pub fn into_simplices(self) -> Vec<Simplex> {
        self.simplices
    }

    fn side_tolerance(&self) -> f64 {
        safe_scalar_to_f64(self.config.epsilon).unwrap_or(0.0)
    }
}
