//! The static road network: lanes, the curves joining them, and the entry points
//! at which vehicles appear.

pub use curve::{CurveAttributes, CurveConnector};
pub use lane::{Axis, Direction, Lane, LaneAttributes};

use crate::math::Point2d;
use crate::{CurveId, CurveSet, LaneId, LaneSet, NetworkError};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use std::collections::HashSet;
use std::ops::Index;

mod curve;
mod lane;
mod layout;

/// A point on a lane at which new vehicles may be spawned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntryPoint {
    /// The lane vehicles are spawned onto.
    pub lane: LaneId,
    /// The varying coordinate of the spawn point.
    pub coordinate: f64,
    /// The relative likelihood of this entry being chosen.
    pub weight: u32,
}

/// The attributes of an entry point.
pub type EntryAttributes = EntryPoint;

/// A validated, immutable road network.
#[derive(Clone, Debug)]
pub struct RoadNetwork {
    lanes: LaneSet,
    curves: CurveSet,
    entries: Vec<EntryPoint>,
    entry_distr: Option<WeightedIndex<u32>>,
}

/// Collects lanes, curves and entry points, then validates them as a whole.
#[derive(Default)]
pub struct NetworkBuilder {
    lanes: LaneSet,
    curves: Vec<CurveAttributes>,
    entries: Vec<EntryAttributes>,
}

impl NetworkBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a lane to the network.
    pub fn add_lane(&mut self, attributes: &LaneAttributes) -> LaneId {
        self.lanes.insert_with_key(|id| Lane::new(id, attributes))
    }

    /// Adds a curve connector joining two lanes.
    pub fn add_curve(&mut self, attributes: &CurveAttributes) -> &mut Self {
        self.curves.push(*attributes);
        self
    }

    /// Adds an entry point.
    pub fn add_entry(&mut self, attributes: &EntryAttributes) -> &mut Self {
        self.entries.push(*attributes);
        self
    }

    /// Validates the collected tables and builds the network.
    pub fn build(self) -> Result<RoadNetwork, NetworkError> {
        let NetworkBuilder {
            mut lanes,
            curves: curve_attribs,
            entries,
        } = self;

        let mut names = HashSet::new();
        for lane in lanes.values() {
            if !names.insert(lane.name()) {
                return Err(NetworkError::DuplicateLane {
                    name: lane.name().to_owned(),
                });
            }
            if !lane.bounds().is_proper() || !lane.fixed().is_finite() {
                return Err(NetworkError::InvalidBounds {
                    lane: lane.name().to_owned(),
                });
            }
            if !(lane.exit_margin() >= 0.0 && lane.exit_margin().is_finite()) {
                return Err(NetworkError::InvalidExitMargin {
                    lane: lane.name().to_owned(),
                    margin: lane.exit_margin(),
                });
            }
        }

        let mut curves = CurveSet::with_key();
        for attribs in &curve_attribs {
            let id = curves.try_insert_with_key(|id| CurveConnector::new(id, attribs, &lanes))?;
            let from = &mut lanes[attribs.from];
            if from.curve().is_some() {
                return Err(NetworkError::DuplicateCurve {
                    lane: from.name().to_owned(),
                });
            }
            from.set_curve(id);
        }

        // A curve must not deliver vehicles past the next curve's trigger
        for curve in curves.values() {
            let to = &lanes[curve.to()];
            let delivery = curve.delivery();
            if let Some(next) = to.curve() {
                if to.progress(delivery) >= curves[next].trigger_progress(to) {
                    return Err(NetworkError::DeliveryOutOfBounds {
                        lane: to.name().to_owned(),
                        coordinate: delivery,
                    });
                }
            }
        }

        for entry in &entries {
            let lane = lanes.get(entry.lane).ok_or(NetworkError::UnknownLane)?;
            if entry.weight == 0 {
                return Err(NetworkError::ZeroWeight {
                    lane: lane.name().to_owned(),
                });
            }
            let progress = lane.progress(entry.coordinate);
            let limit = drivable_until(lane, &curves);
            if !lane.bounds().contains(entry.coordinate) || progress >= limit {
                return Err(NetworkError::OffLane {
                    lane: lane.name().to_owned(),
                    coordinate: entry.coordinate,
                });
            }
        }

        let entry_distr = WeightedIndex::new(entries.iter().map(|e| e.weight)).ok();

        log::info!(
            "built road network with {} lanes, {} curves and {} entry points",
            lanes.len(),
            curves.len(),
            entries.len()
        );

        Ok(RoadNetwork {
            lanes,
            curves,
            entries,
            entry_distr,
        })
    }
}

/// The progress along a lane beyond which straight driving ends,
/// either at its curve trigger or at the downstream bound.
fn drivable_until(lane: &Lane, curves: &CurveSet) -> f64 {
    match lane.curve() {
        Some(curve) => curves[curve].trigger_progress(lane),
        None => lane.length(),
    }
}

impl RoadNetwork {
    /// Creates a builder for a new network.
    pub fn builder() -> NetworkBuilder {
        NetworkBuilder::new()
    }

    /// Gets a reference to the lane with the given ID.
    pub fn get_lane(&self, lane_id: LaneId) -> &Lane {
        &self.lanes[lane_id]
    }

    /// Gets a reference to the curve with the given ID.
    pub fn get_curve(&self, curve_id: CurveId) -> &CurveConnector {
        &self.curves[curve_id]
    }

    /// Whether the network has a lane with the given ID.
    pub fn contains_lane(&self, lane_id: LaneId) -> bool {
        self.lanes.contains_key(lane_id)
    }

    /// Finds a lane by name.
    pub fn lane_by_name(&self, name: &str) -> Option<&Lane> {
        self.lanes.values().find(|lane| lane.name() == name)
    }

    /// Returns an iterator over all the lanes in the network.
    pub fn iter_lanes(&self) -> impl Iterator<Item = &Lane> {
        self.lanes.values()
    }

    /// Returns an iterator over all the curve connectors in the network.
    pub fn iter_curves(&self) -> impl Iterator<Item = &CurveConnector> {
        self.curves.values()
    }

    /// The entry points at which vehicles are spawned.
    pub fn entries(&self) -> &[EntryPoint] {
        &self.entries
    }

    /// The world position of an entry point.
    pub fn entry_position(&self, entry: &EntryPoint) -> Point2d {
        self.lanes[entry.lane].point_at(entry.coordinate)
    }

    /// The curve leaving the given lane, if any.
    pub fn curve_from(&self, lane_id: LaneId) -> Option<&CurveConnector> {
        self.lanes
            .get(lane_id)
            .and_then(|lane| lane.curve())
            .map(|curve| &self.curves[curve])
    }

    /// The progress along a lane beyond which straight driving ends.
    pub fn drivable_until(&self, lane_id: LaneId) -> f64 {
        drivable_until(&self.lanes[lane_id], &self.curves)
    }

    /// Whether the coordinate is on the lane and short of its curve trigger.
    pub fn is_drivable(&self, lane_id: LaneId, coordinate: f64) -> bool {
        self.lanes.get(lane_id).map_or(false, |lane| {
            coordinate.is_finite()
                && lane.bounds().contains(coordinate)
                && lane.progress(coordinate) < self.drivable_until(lane_id)
        })
    }

    /// Chooses an entry point at random, weighted by the entry weights.
    pub(crate) fn choose_entry<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&EntryPoint> {
        self.entry_distr
            .as_ref()
            .map(|distr| &self.entries[distr.sample(rng)])
    }
}

impl Index<LaneId> for RoadNetwork {
    type Output = Lane;

    fn index(&self, index: LaneId) -> &Lane {
        &self.lanes[index]
    }
}

impl Index<CurveId> for RoadNetwork {
    type Output = CurveConnector;

    fn index(&self, index: CurveId) -> &CurveConnector {
        &self.curves[index]
    }
}
