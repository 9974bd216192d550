//! Tests that drive vehicles around the ring road.

mod common;

use assert_approx_eq::assert_approx_eq;
use common::{min_lane_gap, straight_road, CountingFactory};
use ring_traffic::cgmath::MetricSpace;
use ring_traffic::math::Point2d;
use ring_traffic::{
    CrosswalkOracle, Headless, LaneId, Motion, NoPedestrians, RoadNetwork, Simulation,
    SimulationConfig,
};
use std::cell::Cell;
use std::rc::Rc;

fn quiet_config() -> SimulationConfig {
    SimulationConfig {
        spawn_interval: f64::INFINITY,
        seed: Some(42),
        ..Default::default()
    }
}

fn lane(network: &RoadNetwork, name: &str) -> LaneId {
    network.lane_by_name(name).unwrap().id()
}

/// A follower inside the stop distance stands still while its leader drives on.
#[test]
fn follower_stops_behind_close_leader() {
    let network = RoadNetwork::ring_road().unwrap();
    let west = lane(&network, "mainWest");
    let mut sim = Simulation::new(network, quiet_config(), Headless, NoPedestrians).unwrap();
    let leader = sim.add_vehicle(west, 100.0).unwrap();
    let follower = sim.add_vehicle(west, 105.0).unwrap();

    sim.tick(0.1);

    let leader = sim.get_vehicle(leader).unwrap();
    let follower = sim.get_vehicle(follower).unwrap();
    assert_eq!(follower.speed(), 0.0);
    assert_eq!(follower.position().x, 105.0);
    assert_eq!(leader.speed(), 9.0);
    assert_approx_eq!(leader.position().x, 99.1);
}

/// A vehicle climbing `southUp` switches onto its curve on the tick it crosses
/// the trigger, landing exactly on the lane's line.
#[test]
fn vehicle_enters_curve_at_trigger() {
    let network = RoadNetwork::ring_road().unwrap();
    let up = lane(&network, "southUp");
    let config = SimulationConfig {
        max_dt: 1.0,
        stop_distance: 8.0,
        slow_distance: 20.0,
        ..quiet_config()
    };
    let mut sim = Simulation::new(network, config, Headless, NoPedestrians).unwrap();
    let veh = sim.add_vehicle(up, -40.0).unwrap();
    assert_eq!(sim.get_vehicle(veh).unwrap().lane(), Some(up));

    sim.tick(1.0);

    let veh = sim.get_vehicle(veh).unwrap();
    let Motion::Curving(progress) = veh.motion() else {
        panic!("vehicle did not enter the curve");
    };
    assert_eq!(progress.radius, 31.0);
    assert_eq!(progress.angle, std::f64::consts::PI);
    assert_approx_eq!(veh.position().x, -58.0);
    assert_approx_eq!(veh.position().y, -35.0);
    assert_approx_eq!(veh.yaw(), 0.0);
    assert_eq!(sim.stats().curve_entries, 1);
}

/// With small steps the hand-off happens on the first tick past the trigger.
#[test]
fn curve_entry_waits_for_trigger() {
    let network = RoadNetwork::ring_road().unwrap();
    let up = lane(&network, "southUp");
    let mut sim = Simulation::new(network, quiet_config(), Headless, NoPedestrians).unwrap();
    let veh = sim.add_vehicle(up, -40.0).unwrap();

    let mut last_z = -40.0;
    for _ in 0..10 {
        sim.tick(0.1);
        let vehicle = sim.get_vehicle(veh).unwrap();
        if vehicle.is_curving() {
            assert!(last_z < -35.0);
            assert!(last_z + 0.9 >= -35.0 - 1e-9);
            return;
        }
        last_z = vehicle.position().y;
        assert!(last_z < -35.0);
    }
    panic!("vehicle never reached the trigger");
}

/// A vehicle never jumps between ticks, through both hand-offs, and ends up
/// on the connector's target lane.
#[test]
fn journey_is_continuous() {
    let network = RoadNetwork::ring_road().unwrap();
    let up = lane(&network, "southUp");
    let east = lane(&network, "mainEast");
    let east_yaw = network[east].yaw();
    let mut sim = Simulation::new(network, quiet_config(), Headless, NoPedestrians).unwrap();
    let veh = sim.add_vehicle(up, -100.0).unwrap();

    let mut last = sim.get_vehicle(veh).unwrap().position();
    let mut was_curving = false;
    let mut exits = 0;
    while let Some(vehicle) = sim.get_vehicle(veh) {
        let step = vehicle.position().distance(last);
        assert!(step <= 0.9 + 1e-9, "jumped {step}");
        if was_curving && !vehicle.is_curving() {
            exits += 1;
            assert_eq!(vehicle.lane(), Some(east));
            assert_approx_eq!(vehicle.yaw(), east_yaw);
            assert_eq!(vehicle.position().y, -4.0);
        }
        was_curving = vehicle.is_curving();
        last = vehicle.position();
        sim.tick(0.1);
        assert!(sim.frame() < 10_000);
    }
    assert_eq!(exits, 1);
    assert_eq!(sim.stats().curve_exits, 1);
    assert_eq!(sim.stats().despawned, 1);
}

/// A vehicle at the end of its curve waits there while the delivery point is
/// occupied, and joins the target lane once the way ahead is clear.
#[test]
fn curve_exit_waits_for_room() {
    let network = RoadNetwork::ring_road().unwrap();
    let up = lane(&network, "southUp");
    let east = lane(&network, "mainEast");
    let blocked = Rc::new(Cell::new(true));
    let oracle = {
        let blocked = blocked.clone();
        move |_: Point2d, lane: LaneId| blocked.get() && lane == east
    };
    let mut sim = Simulation::new(network, quiet_config(), Headless, oracle).unwrap();
    let blocker = sim.add_vehicle(east, -25.0).unwrap();
    let arriving = sim.add_vehicle(up, -40.0).unwrap();

    for _ in 0..150 {
        sim.tick(0.1);
        assert!(min_lane_gap(&sim) >= 8.0 - 1e-6);
    }
    let vehicle = sim.get_vehicle(arriving).unwrap();
    assert!(vehicle.is_curving());
    assert_eq!(vehicle.speed(), 0.0);
    assert!(vehicle.position().distance(Point2d::new(-27.0, -4.0)) < 1e-6);
    assert_eq!(sim.stats().curve_exits, 0);

    blocked.set(false);
    for _ in 0..50 {
        sim.tick(0.1);
        assert!(min_lane_gap(&sim) >= 8.0 - 1e-6);
    }
    let vehicle = sim.get_vehicle(arriving).unwrap();
    assert_eq!(vehicle.lane(), Some(east));
    assert_eq!(sim.stats().curve_exits, 1);
    let ahead = sim.get_vehicle(blocker).unwrap().position().x - vehicle.position().x;
    assert!(ahead >= 8.0, "{ahead}");
}

/// A crossing that never clears backs traffic up around the corner; vehicles
/// queue at the end of the curve instead of landing on the queue.
#[test]
fn queue_backs_up_around_corner() {
    let network = RoadNetwork::ring_road().unwrap();
    let mut oracle = CrosswalkOracle::new(network.ring_road_crosswalks());
    oracle.set_pedestrians([Point2d::new(60.0, -4.0)]);
    let config = SimulationConfig {
        spawn_interval: 0.5,
        max_vehicles: 40,
        seed: Some(3),
        ..Default::default()
    };
    let mut sim = Simulation::new(network, config, Headless, oracle).unwrap();

    let mut held = false;
    for _ in 0..4000 {
        sim.tick(0.1);
        let gap = min_lane_gap(&sim);
        assert!(gap >= 8.0 - 1e-6, "gap {gap} at frame {}", sim.frame());
        held |= sim
            .iter_vehicles()
            .any(|veh| veh.is_curving() && veh.speed() == 0.0);
    }
    assert!(held);
}

/// Vehicles with different cruising speeds never land on each other after a corner.
#[test]
fn jittered_traffic_keeps_its_distance() {
    for seed in 0..8 {
        let config = SimulationConfig {
            speed_jitter: 0.3,
            seed: Some(seed),
            ..Default::default()
        };
        let network = RoadNetwork::ring_road().unwrap();
        let mut sim = Simulation::new(network, config, Headless, NoPedestrians).unwrap();
        sim.populate(&Default::default()).unwrap();
        for _ in 0..3000 {
            sim.tick(0.1);
            let gap = min_lane_gap(&sim);
            assert!(gap >= 8.0 - 1e-6, "seed {seed}: gap {gap}");
        }
        assert!(sim.stats().curve_exits > 0);
    }
}

/// Vehicles past the exit margin are removed on the same tick, releasing their visual.
#[test]
fn despawn_releases_visual() {
    let network = RoadNetwork::ring_road().unwrap();
    let east = lane(&network, "mainEast");
    let factory = CountingFactory::default();
    let live = factory.live.clone();
    let mut sim = Simulation::new(network, quiet_config(), factory, NoPedestrians).unwrap();
    let veh = sim.add_vehicle(east, 135.0).unwrap();
    assert_eq!(live.get(), 1);

    for _ in 0..40 {
        sim.tick(0.1);
        assert_eq!(live.get(), sim.vehicle_count());
        if let Some(vehicle) = sim.get_vehicle(veh) {
            assert!(vehicle.position().x <= 150.0);
        }
    }
    assert!(sim.get_vehicle(veh).is_none());
    assert_eq!(live.get(), 0);
}

/// Visuals follow their vehicles at road height.
#[test]
fn visuals_track_vehicles() {
    let network = RoadNetwork::ring_road().unwrap();
    let west = lane(&network, "mainWest");
    let factory = CountingFactory::default();
    let mut sim = Simulation::new(network, quiet_config(), factory, NoPedestrians).unwrap();
    let veh = sim.add_vehicle(west, 100.0).unwrap();
    for _ in 0..5 {
        sim.tick(0.1);
    }
    let vehicle = sim.get_vehicle(veh).unwrap();
    assert_eq!(vehicle.visual().position.x, vehicle.position().x);
    assert_eq!(vehicle.visual().position.y, 0.05);
    assert_eq!(vehicle.visual().position.z, vehicle.position().y);
    assert_eq!(vehicle.visual().yaw, vehicle.yaw());
}

/// Spawns are turned down while an entry point is crowded.
#[test]
fn spawn_respects_clearance() {
    let network = straight_road();
    let road = lane(&network, "road");
    let mut sim = Simulation::new(network, quiet_config(), Headless, NoPedestrians).unwrap();

    let blocker = sim.add_vehicle(road, 20.0).unwrap();
    assert_eq!(sim.try_spawn(), None);
    assert_eq!(sim.stats().rejected_spawns, 1);

    sim.remove_vehicle(blocker);
    sim.add_vehicle(road, 40.0).unwrap();
    let spawned = sim.try_spawn().unwrap();
    assert_eq!(sim.get_vehicle(spawned).unwrap().position(), Point2d::new(5.0, 0.0));
    assert_eq!(sim.vehicle_count(), 2);
}

/// Nothing spawns once the population reaches its cap.
#[test]
fn spawner_respects_cap() {
    let config = SimulationConfig {
        spawn_interval: 0.1,
        max_vehicles: 3,
        ..quiet_config()
    };
    let network = RoadNetwork::ring_road().unwrap();
    let mut sim = Simulation::new(network, config, Headless, NoPedestrians).unwrap();
    for _ in 0..500 {
        sim.tick(0.1);
        assert!(sim.vehicle_count() <= 3);
    }
    assert!(sim.stats().spawned >= 3);
}

/// A vehicle waits before an occupied crosswalk and drives on once it clears.
#[test]
fn vehicle_yields_at_crosswalk() {
    let network = RoadNetwork::ring_road().unwrap();
    let west = lane(&network, "mainWest");
    let oracle = CrosswalkOracle::new(network.ring_road_crosswalks());
    let mut sim = Simulation::new(network, quiet_config(), Headless, oracle).unwrap();
    let veh = sim.add_vehicle(west, 90.0).unwrap();

    sim.oracle_mut().set_pedestrians([Point2d::new(60.0, 2.0)]);
    for _ in 0..100 {
        sim.tick(0.1);
    }
    let vehicle = sim.get_vehicle(veh).unwrap();
    assert_eq!(vehicle.speed(), 0.0);
    assert!(vehicle.position().x > 62.0 && vehicle.position().x <= 74.0);

    sim.oracle_mut().set_pedestrians([]);
    for _ in 0..30 {
        sim.tick(0.1);
    }
    assert!(sim.get_vehicle(veh).unwrap().position().x < 58.0);
}

/// The ring road keeps running with the default configuration.
#[test]
fn ring_road_runs() {
    let network = RoadNetwork::ring_road().unwrap();
    let config = SimulationConfig {
        seed: Some(7),
        ..Default::default()
    };
    let mut sim = Simulation::new(network, config, Headless, NoPedestrians).unwrap();
    sim.populate(&Default::default()).unwrap();
    for _ in 0..3000 {
        sim.tick(1.0 / 60.0);
    }
    let stats = sim.stats();
    assert!(stats.curve_entries > 0);
    assert!(stats.despawned > 0);
    assert_eq!(
        stats.spawned - stats.despawned,
        sim.vehicle_count() as u64
    );
}

#[cfg(feature = "debug")]
#[test]
fn debug_frame_lists_vehicles() {
    let network = RoadNetwork::ring_road().unwrap();
    let mut sim = Simulation::new(network, quiet_config(), Headless, NoPedestrians).unwrap();
    sim.populate(&Default::default()).unwrap();
    sim.tick(0.1);
    let frame = sim.debug_frame();
    assert_eq!(frame["frame"], 1);
    assert_eq!(frame["vehicles"].as_array().unwrap().len(), 8);
}
