//! Mathematical structs and functions.
//!
//! The simulation is planar: a [Point2d] holds the world `x` coordinate in `x`
//! and the world `z` coordinate in `y`. Height is applied only when writing
//! transforms to vehicle visuals.

use cgmath::{Point2, Vector2};
pub use arc::Arc2d;
pub use util::*;

mod arc;
mod util;

/// A 2D point
pub type Point2d = Point2<f64>;

/// A 2D vector
pub type Vector2d = Vector2<f64>;
