use super::{Direction, Lane};
use crate::math::{Arc2d, Point2d};
use crate::{CurveId, LaneId, LaneSet, NetworkError};
use cgmath::prelude::*;

/// Endpoints must meet their lanes to within this distance.
const CONTINUITY_EPS: f64 = 1e-6;

/// Arc tangents must match lane headings to within this dot-product slack.
const HEADING_EPS: f64 = 1e-6;

/// A circular arc carrying vehicles from the end of one lane onto another.
#[derive(Clone, Debug)]
pub struct CurveConnector {
    /// The curve ID.
    id: CurveId,
    /// The lane vehicles arrive from.
    from: LaneId,
    /// The lane vehicles are delivered into.
    to: LaneId,
    /// The coordinate on the source lane at which vehicles switch onto the arc.
    trigger: f64,
    /// The arc geometry.
    arc: Arc2d,
    /// The coordinate on the target lane at which vehicles are delivered.
    delivery: f64,
}

/// The attributes of a curve connector.
#[derive(Clone, Copy, Debug)]
pub struct CurveAttributes {
    /// The lane vehicles arrive from.
    pub from: LaneId,
    /// The lane vehicles are delivered into.
    pub to: LaneId,
    /// The coordinate on the source lane at which vehicles switch onto the arc.
    pub trigger: f64,
    /// The arc geometry.
    pub arc: Arc2d,
    /// The declared direction of angular sweep.
    pub sweep: Direction,
}

impl CurveConnector {
    /// Gets the curve's ID.
    pub fn id(&self) -> CurveId {
        self.id
    }

    /// The lane vehicles arrive from.
    pub fn from(&self) -> LaneId {
        self.from
    }

    /// The lane vehicles are delivered into.
    pub fn to(&self) -> LaneId {
        self.to
    }

    /// The trigger coordinate on the source lane.
    pub fn trigger(&self) -> f64 {
        self.trigger
    }

    /// The arc geometry.
    pub fn arc(&self) -> &Arc2d {
        &self.arc
    }

    /// Checks the connector against the lanes it joins and builds it.
    pub(crate) fn new(
        id: CurveId,
        attribs: &CurveAttributes,
        lanes: &LaneSet,
    ) -> Result<Self, NetworkError> {
        let from = lanes.get(attribs.from).ok_or(NetworkError::UnknownLane)?;
        let to = lanes.get(attribs.to).ok_or(NetworkError::UnknownLane)?;
        let arc = attribs.arc;

        if !(arc.radius > 0.0 && arc.radius.is_finite()) {
            return Err(NetworkError::InvalidRadius {
                lane: from.name().to_owned(),
                radius: arc.radius,
            });
        }
        if !(arc.start.is_finite() && arc.end.is_finite())
            || arc.start == arc.end
            || arc.sweep() != attribs.sweep.sign()
        {
            return Err(NetworkError::SweepMismatch {
                lane: from.name().to_owned(),
            });
        }
        if !from.bounds().contains(attribs.trigger) {
            return Err(NetworkError::TriggerOutOfBounds {
                lane: from.name().to_owned(),
                trigger: attribs.trigger,
            });
        }

        // The arc must begin exactly where the source lane crosses its trigger
        let entry = from.point_at(attribs.trigger);
        check_meets(from, arc.start_point(), entry)?;
        check_heading(from, &arc, arc.start)?;

        // ... and end exactly on the target lane
        let end = arc.end_point();
        let delivery = to.coordinate_of(end);
        check_meets(to, end, to.point_at(delivery))?;
        check_heading(to, &arc, arc.end)?;
        if to.bounds().distance(delivery) > CONTINUITY_EPS {
            return Err(NetworkError::DeliveryOutOfBounds {
                lane: to.name().to_owned(),
                coordinate: delivery,
            });
        }

        Ok(Self {
            id,
            from: attribs.from,
            to: attribs.to,
            trigger: attribs.trigger,
            arc,
            delivery: to.bounds().clamp(delivery),
        })
    }

    /// The progress along the source lane at which the curve takes over.
    pub(crate) fn trigger_progress(&self, from: &Lane) -> f64 {
        from.progress(self.trigger)
    }

    /// The coordinate on the target lane at which vehicles are delivered.
    pub fn delivery(&self) -> f64 {
        self.delivery
    }
}

fn check_meets(lane: &Lane, point: Point2d, expected: Point2d) -> Result<(), NetworkError> {
    let distance = point.distance(expected);
    if distance > CONTINUITY_EPS {
        return Err(NetworkError::Discontinuity {
            lane: lane.name().to_owned(),
            distance,
        });
    }
    Ok(())
}

fn check_heading(lane: &Lane, arc: &Arc2d, angle: f64) -> Result<(), NetworkError> {
    if arc.tangent_at(angle).dot(lane.heading()) < 1.0 - HEADING_EPS {
        return Err(NetworkError::HeadingMismatch {
            lane: lane.name().to_owned(),
        });
    }
    Ok(())
}
