//! General helper utilities for checking triangulations.

mod delaunay_validation;

pub use delaunay_validation::*;
