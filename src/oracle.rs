//! Pedestrian right-of-way.
//!
//! The simulator asks a [YieldOracle] once per tick for every vehicle driving
//! straight. Pedestrian behaviour lives outside the simulator; the oracle only
//! reports whether a crossing ahead of the vehicle is occupied.

use crate::math::Point2d;
use crate::util::Interval;
use crate::{Axis, Lane, LaneId};

/// Reports whether a vehicle must stop for pedestrians.
pub trait YieldOracle {
    /// Whether a vehicle at `position` on `lane` must stand still this tick.
    /// Must not alter pedestrian state.
    fn should_yield(&self, position: Point2d, lane: LaneId) -> bool;
}

impl<F: Fn(Point2d, LaneId) -> bool> YieldOracle for F {
    fn should_yield(&self, position: Point2d, lane: LaneId) -> bool {
        self(position, lane)
    }
}

/// An oracle for scenes without pedestrians; never yields.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPedestrians;

impl YieldOracle for NoPedestrians {
    fn should_yield(&self, _position: Point2d, _lane: LaneId) -> bool {
        false
    }
}

/// A pedestrian crossing over a lane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Crosswalk {
    /// The lane whose vehicles yield to this crossing.
    lane: LaneId,
    /// The axis along which the lane runs.
    axis: Axis,
    /// The lane's direction sign.
    sign: f64,
    /// The extent of the crossing along the lane.
    along: Interval<f64>,
    /// The extent of the crossing across the road.
    across: Interval<f64>,
    /// How far before the crossing vehicles start yielding.
    approach: f64,
}

impl Crosswalk {
    /// Creates a crossing centred on coordinate `at` of the given lane.
    ///
    /// # Parameters
    /// * `half_width` - Half the width of the painted crossing, along the lane
    /// * `across` - The extent of the crossing perpendicular to the lane
    /// * `approach` - How far before the crossing vehicles start yielding
    pub fn on_lane(
        lane: &Lane,
        at: f64,
        half_width: f64,
        across: Interval<f64>,
        approach: f64,
    ) -> Self {
        Self {
            lane: lane.id(),
            axis: lane.axis(),
            sign: lane.direction().sign(),
            along: Interval::disc(at, half_width),
            across,
            approach,
        }
    }

    /// The lane whose vehicles yield to this crossing.
    pub fn lane(&self) -> LaneId {
        self.lane
    }

    /// Splits a point into (along-lane, across-lane) coordinates.
    fn local(&self, point: Point2d) -> (f64, f64) {
        match self.axis {
            Axis::X => (point.x, point.y),
            Axis::Z => (point.y, point.x),
        }
    }

    /// Whether a pedestrian stands on the crossing.
    pub fn is_occupied_by(&self, pedestrian: Point2d) -> bool {
        let (along, across) = self.local(pedestrian);
        self.along.contains(along) && self.across.contains(across)
    }

    /// Whether a vehicle is on the approach to the crossing, short of its near edge.
    pub fn is_approached_by(&self, vehicle: Point2d) -> bool {
        let (along, _) = self.local(vehicle);
        let near_edge = if self.sign > 0.0 {
            self.along.min
        } else {
            self.along.max
        };
        let ahead = (near_edge - along) * self.sign;
        (0.0..=self.approach).contains(&ahead)
    }
}

/// Yields vehicles approaching any crossing on which a pedestrian stands.
///
/// The host updates pedestrian positions each frame through
/// [set_pedestrians](CrosswalkOracle::set_pedestrians).
#[derive(Clone, Debug, Default)]
pub struct CrosswalkOracle {
    crosswalks: Vec<Crosswalk>,
    pedestrians: Vec<Point2d>,
}

impl CrosswalkOracle {
    /// Creates an oracle for the given crossings, with no pedestrians.
    pub fn new(crosswalks: Vec<Crosswalk>) -> Self {
        Self {
            crosswalks,
            pedestrians: vec![],
        }
    }

    /// The crossings watched by this oracle.
    pub fn crosswalks(&self) -> &[Crosswalk] {
        &self.crosswalks
    }

    /// Replaces the current pedestrian positions.
    pub fn set_pedestrians(&mut self, pedestrians: impl IntoIterator<Item = Point2d>) {
        self.pedestrians.clear();
        self.pedestrians.extend(pedestrians);
    }
}

impl YieldOracle for CrosswalkOracle {
    fn should_yield(&self, position: Point2d, lane: LaneId) -> bool {
        self.crosswalks
            .iter()
            .filter(|cw| cw.lane == lane && cw.is_approached_by(position))
            .any(|cw| self.pedestrians.iter().any(|p| cw.is_occupied_by(*p)))
    }
}
