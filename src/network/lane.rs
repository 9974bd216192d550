use crate::math::{yaw_of, Point2d, Vector2d};
use crate::util::Interval;
use crate::{CurveId, LaneId};

/// The world axis along which a lane runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// The lane runs east-west; its `z` coordinate is fixed.
    X,
    /// The lane runs north-south; its `x` coordinate is fixed.
    Z,
}

/// The direction of travel along a lane's axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    /// The direction as a unit sign.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Positive => 1.0,
            Direction::Negative => -1.0,
        }
    }
}

/// A lane represents a single straight, one-way strip of road.
#[derive(Clone, Debug)]
pub struct Lane {
    /// The lane ID.
    id: LaneId,
    /// A human readable name, unique within the network.
    name: String,
    /// The axis along which the lane runs.
    axis: Axis,
    /// The coordinate held constant along the lane.
    fixed: f64,
    /// The direction of travel.
    direction: Direction,
    /// The range of the varying coordinate.
    bounds: Interval<f64>,
    /// How far past the downstream bound vehicles are removed.
    exit_margin: f64,
    /// The curve connector leaving this lane, if any.
    curve: Option<CurveId>,
}

/// The attributes of a lane.
#[derive(Clone, Copy, Debug)]
pub struct LaneAttributes<'a> {
    /// A name unique within the network.
    pub name: &'a str,
    /// The axis along which the lane runs.
    pub axis: Axis,
    /// The coordinate held constant along the lane.
    pub fixed: f64,
    /// The direction of travel.
    pub direction: Direction,
    /// The range of the varying coordinate.
    pub bounds: Interval<f64>,
    /// How far past the downstream bound vehicles are removed.
    pub exit_margin: f64,
}

impl Lane {
    /// Creates a new lane.
    pub(crate) fn new(id: LaneId, attribs: &LaneAttributes) -> Self {
        Self {
            id,
            name: attribs.name.to_owned(),
            axis: attribs.axis,
            fixed: attribs.fixed,
            direction: attribs.direction,
            bounds: attribs.bounds,
            exit_margin: attribs.exit_margin,
            curve: None,
        }
    }

    /// Gets the lane's ID.
    pub fn id(&self) -> LaneId {
        self.id
    }

    /// Gets the lane's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The axis along which the lane runs.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// The coordinate held constant along the lane.
    pub fn fixed(&self) -> f64 {
        self.fixed
    }

    /// The direction of travel.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The range of the varying coordinate.
    pub fn bounds(&self) -> Interval<f64> {
        self.bounds
    }

    /// The distance past the downstream bound at which vehicles are removed.
    pub fn exit_margin(&self) -> f64 {
        self.exit_margin
    }

    /// The curve connector leaving this lane, if any.
    pub fn curve(&self) -> Option<CurveId> {
        self.curve
    }

    pub(crate) fn set_curve(&mut self, curve: CurveId) {
        self.curve = Some(curve);
    }

    /// The length of the lane between its bounds.
    pub fn length(&self) -> f64 {
        self.bounds.length()
    }

    /// A unit vector in the direction of travel.
    pub fn heading(&self) -> Vector2d {
        let s = self.direction.sign();
        match self.axis {
            Axis::X => Vector2d::new(s, 0.0),
            Axis::Z => Vector2d::new(0.0, s),
        }
    }

    /// The yaw of a vehicle travelling along the lane.
    pub fn yaw(&self) -> f64 {
        yaw_of(self.heading())
    }

    /// The point on the lane at the given varying coordinate.
    pub fn point_at(&self, coord: f64) -> Point2d {
        match self.axis {
            Axis::X => Point2d::new(coord, self.fixed),
            Axis::Z => Point2d::new(self.fixed, coord),
        }
    }

    /// The varying coordinate of a point.
    pub fn coordinate_of(&self, point: Point2d) -> f64 {
        match self.axis {
            Axis::X => point.x,
            Axis::Z => point.y,
        }
    }

    /// The fixed-axis coordinate of a point; equal to [Lane::fixed] for points on the lane.
    pub fn cross_coordinate_of(&self, point: Point2d) -> f64 {
        match self.axis {
            Axis::X => point.y,
            Axis::Z => point.x,
        }
    }

    /// The distance travelled from the upstream bound to the given coordinate.
    pub fn progress(&self, coord: f64) -> f64 {
        match self.direction {
            Direction::Positive => coord - self.bounds.min,
            Direction::Negative => self.bounds.max - coord,
        }
    }

    /// The point `dist` further downstream of `point`, keeping to the lane.
    pub fn advance(&self, point: Point2d, dist: f64) -> Point2d {
        let coord = self.coordinate_of(point) + self.direction.sign() * dist;
        self.point_at(coord)
    }

    /// Whether a vehicle at `point` has passed the lane's exit margin.
    pub fn is_past_exit(&self, point: Point2d) -> bool {
        self.progress(self.coordinate_of(point)) > self.length() + self.exit_margin
    }
}
