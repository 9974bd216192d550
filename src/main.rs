use std::process::ExitCode;
use std::time::Instant;

use ring_traffic::math::Point2d;
use ring_traffic::{
    CrosswalkOracle, Headless, InitialPopulation, RoadNetwork, Simulation, SimulationConfig,
};

const NUM_FRAMES: u32 = 1000;
const DT: f64 = 1.0 / 60.0;

/// A pedestrian pacing back and forth over the crossing at `x = 60`.
fn pedestrian_at(time: f64) -> Point2d {
    let phase = (time / 8.0).fract();
    let z = if phase < 0.5 {
        -12.0 + 48.0 * phase
    } else {
        12.0 - 48.0 * (phase - 0.5)
    };
    Point2d::new(60.0, z)
}

fn main() -> ExitCode {
    env_logger::init();

    let network = match RoadNetwork::ring_road() {
        Ok(network) => network,
        Err(err) => {
            log::error!("invalid road network: {err}");
            return ExitCode::FAILURE;
        }
    };
    let oracle = CrosswalkOracle::new(network.ring_road_crosswalks());
    let config = SimulationConfig {
        seed: Some(0),
        ..Default::default()
    };
    let mut sim = match Simulation::new(network, config, Headless, oracle) {
        Ok(sim) => sim,
        Err(err) => {
            log::error!("invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = sim.populate(&InitialPopulation::default()) {
        log::error!("invalid initial population: {err}");
        return ExitCode::FAILURE;
    }

    println!("Simulating...");
    let mut time = 0.0;
    for _ in 0..10 {
        let start = Instant::now();
        for _ in 0..NUM_FRAMES {
            sim.oracle_mut().set_pedestrians([pedestrian_at(time)]);
            sim.tick(DT);
            time += DT;
        }
        let frame = start.elapsed() / NUM_FRAMES;
        let stats = sim.stats();
        println!(
            "Avg. frame: {:?} ({} vehs, {} spawned, {} despawned, {} rejected)",
            frame,
            sim.vehicle_count(),
            stats.spawned,
            stats.despawned,
            stats.rejected_spawns,
        );
    }
    ExitCode::SUCCESS
}
