use super::Vector2d;

/// Rotates a vector 90 degrees anticlockwise.
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}

/// Converts a planar heading into a yaw angle about the vertical axis.
///
/// A yaw of zero faces world `+z`; a yaw of `π/2` faces world `+x`.
pub fn yaw_of(dir: Vector2d) -> f64 {
    dir.x.atan2(dir.y)
}
