use super::{rot90, Point2d, Vector2d};

/// A circular arc in the ground plane.
///
/// Points are parameterised by angle: `centre + radius * (cos θ, sin θ)`.
/// The arc is traversed from `start` to `end`, so the sweep is positive when
/// `end > start` and negative otherwise.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Arc2d {
    /// The centre of the circle.
    pub centre: Point2d,
    /// The radius of the circle.
    pub radius: f64,
    /// The angle at which the arc begins, in radians.
    pub start: f64,
    /// The angle at which the arc ends, in radians.
    pub end: f64,
}

impl Arc2d {
    /// Creates a new arc.
    pub const fn new(centre: Point2d, radius: f64, start: f64, end: f64) -> Self {
        Self {
            centre,
            radius,
            start,
            end,
        }
    }

    /// The sign of the angular sweep, `1.0` or `-1.0`.
    pub fn sweep(&self) -> f64 {
        if self.end >= self.start {
            1.0
        } else {
            -1.0
        }
    }

    /// The arc length.
    pub fn length(&self) -> f64 {
        (self.end - self.start).abs() * self.radius
    }

    /// Samples the point at the given angle.
    pub fn point_at(&self, angle: f64) -> Point2d {
        self.centre + self.radius * Vector2d::new(angle.cos(), angle.sin())
    }

    /// The unit tangent at the given angle, pointing in the direction of travel.
    pub fn tangent_at(&self, angle: f64) -> Vector2d {
        self.sweep() * rot90(Vector2d::new(angle.cos(), angle.sin()))
    }

    /// The first point of the arc.
    pub fn start_point(&self) -> Point2d {
        self.point_at(self.start)
    }

    /// The last point of the arc.
    pub fn end_point(&self) -> Point2d {
        self.point_at(self.end)
    }

    /// Advances an angle along the arc by a linear distance, clamping at the end.
    /// Returns the new angle and whether the end was reached.
    pub fn advance(&self, angle: f64, dist: f64) -> (f64, bool) {
        let next = angle + self.sweep() * dist / self.radius;
        let remaining = (self.end - next) * self.sweep();
        if remaining <= 0.0 {
            (self.end, true)
        } else {
            (next, false)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use cgmath::InnerSpace;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn tangent_follows_negative_sweep() {
        let arc = Arc2d::new(Point2d::new(-27.0, -35.0), 31.0, PI, FRAC_PI_2);
        let start = arc.start_point();
        assert_approx_eq!(start.x, -58.0);
        assert_approx_eq!(start.y, -35.0);

        let t0 = arc.tangent_at(arc.start);
        assert_approx_eq!(t0.x, 0.0);
        assert_approx_eq!(t0.y, 1.0);

        let t1 = arc.tangent_at(arc.end);
        assert_approx_eq!(t1.x, 1.0);
        assert_approx_eq!(t1.y, 0.0);
    }

    #[test]
    fn advance_clamps_at_end() {
        let arc = Arc2d::new(Point2d::new(0.0, 0.0), 10.0, 0.0, FRAC_PI_2);
        let (angle, done) = arc.advance(0.0, 5.0);
        assert_approx_eq!(angle, 0.5);
        assert!(!done);

        let (angle, done) = arc.advance(angle, 100.0);
        assert_eq!(angle, FRAC_PI_2);
        assert!(done);
    }

    #[test]
    fn length_is_radius_times_sweep() {
        let arc = Arc2d::new(Point2d::new(3.0, 4.0), 2.0, PI, 0.0);
        assert_approx_eq!(arc.length(), 2.0 * PI);
        assert_approx_eq!((arc.point_at(1.234) - arc.centre).magnitude(), 2.0);
    }
}
