pub use self::following::FollowingModel;
pub(crate) use self::following::leader_gaps;
use crate::factory::{VehicleBody, VehicleVisual};
use crate::math::{yaw_of, Point2d};
use crate::{Colour, CurveConnector, CurveId, Lane, LaneId, VehicleClass, VehicleId};
use cgmath::Point3;

mod following;

/// A simulated vehicle.
#[derive(Debug)]
pub struct Vehicle<V> {
    /// The vehicle's ID
    id: VehicleId,
    /// The body class.
    class: VehicleClass,
    /// The body colour.
    colour: Colour,
    /// The visual handle, released when the vehicle is dropped.
    visual: V,
    /// The world position in the ground plane.
    position: Point2d,
    /// The heading as a yaw angle.
    yaw: f64,
    /// The cruising speed of this vehicle.
    full_speed: f64,
    /// The speed resolved on the last tick.
    speed: f64,
    /// Whether the vehicle is on a lane or a curve.
    motion: Motion,
}

/// The motion model a vehicle is currently following.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Motion {
    /// Driving along a lane.
    Straight { lane: LaneId },
    /// Following a curve connector between two lanes.
    Curving(CurveProgress),
}

/// Book-keeping for a vehicle on a curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveProgress {
    /// The curve being followed.
    pub curve: CurveId,
    /// The lane the curve delivers into.
    pub target: LaneId,
    /// The curve radius.
    pub radius: f64,
    /// The current angle on the arc.
    pub angle: f64,
}

impl<V> Vehicle<V> {
    /// Creates a new vehicle driving straight at the given coordinate of a lane.
    pub(crate) fn new(
        id: VehicleId,
        body: VehicleBody<V>,
        lane: &Lane,
        coordinate: f64,
        full_speed: f64,
    ) -> Self {
        Self {
            id,
            class: body.class,
            colour: body.colour,
            visual: body.visual,
            position: lane.point_at(coordinate),
            yaw: lane.yaw(),
            full_speed,
            speed: full_speed,
            motion: Motion::Straight { lane: lane.id() },
        }
    }

    /// Gets the vehicle's ID.
    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// The body class.
    pub fn class(&self) -> VehicleClass {
        self.class
    }

    /// The body colour.
    pub fn colour(&self) -> Colour {
        self.colour
    }

    /// The visual handle.
    pub fn visual(&self) -> &V {
        &self.visual
    }

    /// The world position in the ground plane; `y` holds the world `z` coordinate.
    pub fn position(&self) -> Point2d {
        self.position
    }

    /// The heading as a yaw angle; zero faces world `+z`.
    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    /// The vehicle's cruising speed.
    pub fn full_speed(&self) -> f64 {
        self.full_speed
    }

    /// The speed resolved on the last tick.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// The motion model the vehicle is following.
    pub fn motion(&self) -> Motion {
        self.motion
    }

    /// The lane the vehicle is driving along; `None` while on a curve.
    pub fn lane(&self) -> Option<LaneId> {
        match self.motion {
            Motion::Straight { lane } => Some(lane),
            Motion::Curving(_) => None,
        }
    }

    /// Whether the vehicle is on a curve.
    pub fn is_curving(&self) -> bool {
        matches!(self.motion, Motion::Curving(_))
    }

    /// Advances the vehicle along its lane at the given speed.
    pub(crate) fn drive(&mut self, lane: &Lane, speed: f64, dt: f64) {
        self.speed = speed;
        self.position = lane.advance(self.position, speed * dt);
        self.yaw = lane.yaw();
    }

    /// Switches the vehicle onto a curve, placing it exactly at the start of the arc.
    pub(crate) fn enter_curve(&mut self, curve: &CurveConnector) {
        let arc = curve.arc();
        self.motion = Motion::Curving(CurveProgress {
            curve: curve.id(),
            target: curve.to(),
            radius: arc.radius,
            angle: arc.start,
        });
        self.position = arc.start_point();
        self.yaw = yaw_of(arc.tangent_at(arc.start));
        self.speed = self.full_speed;
    }

    /// Advances the vehicle around its curve at the given speed. Returns `true`
    /// once the vehicle is at the end of the arc, where it stands still until
    /// [leave_curve](Self::leave_curve) hands it on.
    pub(crate) fn follow_curve(&mut self, curve: &CurveConnector, speed: f64, dt: f64) -> bool {
        let Motion::Curving(mut progress) = self.motion else {
            return false;
        };
        let arc = curve.arc();
        if progress.angle == arc.end {
            self.speed = 0.0;
            return true;
        }
        self.speed = speed;
        let (angle, done) = arc.advance(progress.angle, speed * dt);
        progress.angle = angle;
        self.motion = Motion::Curving(progress);
        self.position = arc.point_at(angle);
        self.yaw = yaw_of(arc.tangent_at(angle));
        done
    }

    /// Places a vehicle waiting at the end of its curve onto the target lane.
    pub(crate) fn leave_curve(&mut self, curve: &CurveConnector, target: &Lane) {
        self.motion = Motion::Straight { lane: target.id() };
        self.position = target.point_at(curve.delivery());
        self.yaw = target.yaw();
    }
}

impl<V: VehicleVisual> Vehicle<V> {
    /// Writes the vehicle's transform into its visual.
    pub(crate) fn sync_visual(&mut self, height: f64) {
        let position = Point3::new(self.position.x, height, self.position.y);
        self.visual.set_transform(position, self.yaw);
    }
}
