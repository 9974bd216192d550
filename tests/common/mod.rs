//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use itertools::Itertools;
use ring_traffic::cgmath::Point3;
use ring_traffic::{
    Axis, Colour, Direction, EntryPoint, Interval, LaneAttributes, RoadNetwork, Simulation,
    VehicleClass, VehicleFactory, VehicleVisual, YieldOracle,
};
use std::cell::Cell;
use std::rc::Rc;

/// A factory that counts the visuals it has built and not yet seen dropped.
#[derive(Clone, Default)]
pub struct CountingFactory {
    pub live: Rc<Cell<usize>>,
}

pub struct CountedVisual {
    live: Rc<Cell<usize>>,
    pub position: Point3<f64>,
    pub yaw: f64,
}

impl VehicleVisual for CountedVisual {
    fn set_transform(&mut self, position: Point3<f64>, yaw: f64) {
        self.position = position;
        self.yaw = yaw;
    }
}

impl Drop for CountedVisual {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

impl VehicleFactory for CountingFactory {
    type Visual = CountedVisual;

    fn build(&mut self, _class: VehicleClass, _colour: Colour) -> CountedVisual {
        self.live.set(self.live.get() + 1);
        CountedVisual {
            live: self.live.clone(),
            position: Point3::new(0.0, 0.0, 0.0),
            yaw: 0.0,
        }
    }
}

/// A single straight lane from `x = 0` to `x = 200`, driven towards `+x`,
/// with one entry point at `x = 5`.
pub fn straight_road() -> RoadNetwork {
    let mut builder = RoadNetwork::builder();
    let lane = builder.add_lane(&LaneAttributes {
        name: "road",
        axis: Axis::X,
        fixed: 0.0,
        direction: Direction::Positive,
        bounds: Interval::new(0.0, 200.0),
        exit_margin: 10.0,
    });
    builder.add_entry(&EntryPoint {
        lane,
        coordinate: 5.0,
        weight: 1,
    });
    builder.build().unwrap()
}

/// The smallest gap between consecutive vehicles driving along the same lane,
/// or infinity if no lane holds two vehicles.
pub fn min_lane_gap<F, O>(sim: &Simulation<F, O>) -> f64
where
    F: VehicleFactory,
    O: YieldOracle,
{
    let network = sim.network();
    sim.iter_vehicles()
        .filter_map(|veh| {
            let lane = &network[veh.lane()?];
            Some((lane.id(), lane.progress(lane.coordinate_of(veh.position()))))
        })
        .sorted_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)))
        .tuple_windows()
        .filter(|(follower, leader)| follower.0 == leader.0)
        .map(|(follower, leader)| leader.1 - follower.1)
        .fold(f64::INFINITY, f64::min)
}
