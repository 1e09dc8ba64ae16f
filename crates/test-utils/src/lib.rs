//! Shared test utilities for the mesh workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Mesh configuration and neighbour graph fixtures
//! - Synthetic sample field generators
//! - Approximate float and graph symmetry assertions
//!
//! It deliberately depends on no workspace crate, so fixtures are plain
//! JSON/YAML text and tuples that each test converts into its own types.
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, fixtures};
//! ```

pub mod fixtures;
pub mod generators;
pub mod graph;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use graph::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro asserting that a serialized neighbour graph is symmetric.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_graph_symmetric;
///
/// assert_graph_symmetric!(mesh.neighbour_graph().to_json()?);
/// ```
#[macro_export]
macro_rules! assert_graph_symmetric {
    ($graph_json:expr) => {{
        let violations = $crate::graph::asymmetric_edges(&$graph_json);
        if !violations.is_empty() {
            panic!(
                "neighbour graph is not symmetric ({} edges without reverse):\n{}",
                violations.len(),
                violations.join("\n")
            );
        }
    }};
}

/// Temporary directory for file round-trip tests.
pub fn temp_dir() -> tempfile::TempDir {
    match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(e) => panic!("failed to create temporary directory: {}", e),
    }
}
