//! Common types and utilities shared across the mesh workspace.
//!
//! Everything here is geometry-level: the [`Boundary`] rectangle a cell
//! occupies, WKT polygon reading/writing, optional time ranges, and the
//! shared [`MeshError`] type.

pub mod boundary;
pub mod error;
pub mod geometry;
pub mod time;

pub use boundary::Boundary;
pub use error::{ErrorCategory, MeshError, MeshResult};
pub use geometry::{BoundaryShape, Shape};
pub use time::{TimeBound, TimeRange};
