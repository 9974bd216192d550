use crate::config::{MAX_SPEED_FACTOR, MIN_SPEED_FACTOR};
#[cfg(feature = "debug")]
use crate::debug::take_debug_frame;
use crate::debug::{debug_curve_entry, debug_curve_exit, debug_rejected_spawn};
use crate::factory::create_random_vehicle;
use crate::math::Point2d;
use crate::vehicle::{leader_gaps, FollowingModel, Motion, Vehicle};
use crate::{
    ConfigError, InitialPopulation, LaneId, NetworkError, NoPedestrians, RoadNetwork,
    SimulationConfig, VehicleFactory, VehicleId, VehicleSet, YieldOracle,
};
use cgmath::MetricSpace;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use slotmap::SlotMap;
use smallvec::SmallVec;

/// Running totals kept by a [Simulation].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationStats {
    /// Vehicles added by any means: spawner, initial population or explicit placement.
    pub spawned: u64,
    /// Vehicles removed.
    pub despawned: u64,
    /// Spawn attempts turned down because an entry point was not clear.
    pub rejected_spawns: u64,
    /// Straight to curving hand-offs.
    pub curve_entries: u64,
    /// Curving to straight hand-offs.
    pub curve_exits: u64,
}

/// A traffic simulation on a fixed road network.
///
/// The simulation owns its vehicles. Visuals are built through the factory `F`
/// and released when their vehicle is removed; pedestrian right-of-way is
/// decided by the oracle `O`.
pub struct Simulation<F: VehicleFactory, O = NoPedestrians> {
    /// The road network.
    network: RoadNetwork,
    /// The simulation parameters.
    config: SimulationConfig,
    /// Builds vehicle visuals.
    factory: F,
    /// Decides when vehicles must stop for pedestrians.
    oracle: O,
    /// The random source for spawning and vehicle bodies.
    rng: StdRng,
    /// Per-vehicle speed factor distribution; `None` when jitter is disabled.
    speed_distr: Option<Normal<f64>>,
    /// The car following model.
    following: FollowingModel,
    /// The vehicles being simulated.
    vehicles: VehicleSet<F::Visual>,
    /// The time since the last spawn attempt in s.
    spawn_timer: f64,
    /// The current frame of simulation.
    frame: usize,
    /// Running totals.
    stats: SimulationStats,
    /// Debugging information from the previously simulated frame.
    #[cfg(feature = "debug")]
    debug: serde_json::Value,
}

impl<F: VehicleFactory, O: YieldOracle> Simulation<F, O> {
    /// Creates a new simulation with no vehicles.
    pub fn new(
        network: RoadNetwork,
        config: SimulationConfig,
        factory: F,
        oracle: O,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let speed_distr = if config.speed_jitter > 0.0 {
            let distr = Normal::new(1.0, config.speed_jitter).map_err(|_| {
                ConfigError::InvalidJitter {
                    jitter: config.speed_jitter,
                }
            })?;
            Some(distr)
        } else {
            None
        };
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            network,
            following: FollowingModel::new(config.stop_distance, config.slow_distance),
            config,
            factory,
            oracle,
            rng,
            speed_distr,
            vehicles: SlotMap::with_key(),
            spawn_timer: 0.0,
            frame: 0,
            stats: SimulationStats::default(),
            #[cfg(feature = "debug")]
            debug: serde_json::Value::Null,
        })
    }

    /// Seeds the entry lanes with vehicles, starting at each entry point and working
    /// downstream. Slots too close to a curve trigger, or within the stop distance of
    /// an existing vehicle, are skipped. Returns the IDs of the vehicles placed.
    pub fn populate(
        &mut self,
        population: &InitialPopulation,
    ) -> Result<Vec<VehicleId>, ConfigError> {
        population.validate()?;
        let mut placed = vec![];
        for entry in self.network.entries().to_vec() {
            let lane = &self.network[entry.lane];
            let sign = lane.direction().sign();
            let limit = self.network.drivable_until(entry.lane) - population.trigger_clearance;
            let slots = (0..population.per_entry)
                .map(|i| entry.coordinate + sign * population.spacing * i as f64)
                .take_while(|coord| lane.progress(*coord) <= limit)
                .filter(|coord| self.network.is_drivable(entry.lane, *coord))
                .map(|coord| (coord, lane.point_at(coord)))
                .collect::<SmallVec<[(f64, Point2d); 8]>>();

            for (coord, point) in slots {
                if self.vehicles.len() >= self.config.max_vehicles {
                    log::info!(
                        "initial population stopped at the cap of {}",
                        self.config.max_vehicles
                    );
                    return Ok(placed);
                }
                if self.blocker_near(point, self.config.stop_distance).is_none() {
                    placed.push(self.insert_vehicle(entry.lane, coord));
                }
            }
        }
        log::info!("placed {} vehicles", placed.len());
        Ok(placed)
    }

    /// Places a vehicle on a lane at the given coordinate, ignoring the population cap.
    pub fn add_vehicle(
        &mut self,
        lane: LaneId,
        coordinate: f64,
    ) -> Result<VehicleId, NetworkError> {
        if !self.network.contains_lane(lane) {
            return Err(NetworkError::UnknownLane);
        }
        if !self.network.is_drivable(lane, coordinate) {
            return Err(NetworkError::OffLane {
                lane: self.network[lane].name().to_owned(),
                coordinate,
            });
        }
        Ok(self.insert_vehicle(lane, coordinate))
    }

    /// Removes a vehicle from the simulation, releasing its visual.
    pub fn remove_vehicle(&mut self, vehicle_id: VehicleId) -> bool {
        let removed = self.vehicles.remove(vehicle_id).is_some();
        if removed {
            self.stats.despawned += 1;
        }
        removed
    }

    /// Makes one spawn attempt at a randomly chosen entry point.
    ///
    /// Returns `None` if the network has no entry points, the population is at
    /// its cap, or a vehicle lies within the spawn clearance of the chosen entry.
    pub fn try_spawn(&mut self) -> Option<VehicleId> {
        if self.vehicles.len() >= self.config.max_vehicles {
            return None;
        }
        let entry = *self.network.choose_entry(&mut self.rng)?;
        let point = self.network.entry_position(&entry);
        if let Some(blocker) = self.blocker_near(point, self.config.spawn_clearance) {
            let blocker = blocker.position();
            self.stats.rejected_spawns += 1;
            log::trace!(
                "spawn on {} rejected, vehicle at ({:.1}, {:.1})",
                self.network[entry.lane].name(),
                blocker.x,
                blocker.y
            );
            debug_rejected_spawn(point, blocker);
            return None;
        }
        Some(self.insert_vehicle(entry.lane, entry.coordinate))
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// A negative or non-finite `dt` is ignored. Steps longer than
    /// [max_dt](SimulationConfig::max_dt) are clamped.
    pub fn tick(&mut self, dt: f64) {
        if !(dt >= 0.0 && dt.is_finite()) {
            log::warn!("ignoring invalid time step {dt}");
            return;
        }
        let dt = if dt > self.config.max_dt {
            log::debug!("clamping time step {dt} to {}", self.config.max_dt);
            self.config.max_dt
        } else {
            dt
        };

        let exited = self.update_vehicles(dt);
        self.remove_exited(&exited);
        self.update_spawner(dt);
        self.frame += 1;

        #[cfg(feature = "debug")]
        {
            self.debug = take_debug_frame();
        }
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Running totals since the simulation was created.
    pub fn stats(&self) -> SimulationStats {
        self.stats
    }

    /// The road network.
    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    /// The simulation parameters.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The yield oracle.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// The yield oracle, for hosts that update pedestrian state between ticks.
    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    /// Replaces the yield oracle, returning the previous one.
    pub fn set_oracle(&mut self, oracle: O) -> O {
        std::mem::replace(&mut self.oracle, oracle)
    }

    /// The vehicle factory.
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Returns an iterator over all the vehicles in the simulation.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = &Vehicle<F::Visual>> {
        self.vehicles.values()
    }

    /// Gets a reference to the vehicle with the given ID.
    pub fn get_vehicle(&self, vehicle_id: VehicleId) -> Option<&Vehicle<F::Visual>> {
        self.vehicles.get(vehicle_id)
    }

    /// The number of live vehicles.
    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    /// Gets a snapshot of the previously simulated frame as JSON.
    #[cfg(feature = "debug")]
    pub fn debug_frame(&self) -> serde_json::Value {
        use slotmap::Key;
        let vehicles = self
            .vehicles
            .values()
            .map(|veh| {
                serde_json::json!({
                    "id": veh.id().data().as_ffi(),
                    "class": veh.class(),
                    "position": [veh.position().x, veh.position().y],
                    "yaw": veh.yaw(),
                    "speed": veh.speed(),
                    "curving": veh.is_curving(),
                })
            })
            .collect::<Vec<_>>();
        serde_json::json!({
            "frame": self.frame,
            "stats": self.stats,
            "vehicles": vehicles,
            "events": self.debug.clone(),
        })
    }

    /// Finds any vehicle strictly within `radius` of `point`.
    fn blocker_near(&self, point: Point2d, radius: f64) -> Option<&Vehicle<F::Visual>> {
        self.vehicles
            .values()
            .find(|veh| veh.position().distance(point) < radius)
    }

    /// Samples a cruising speed for a new vehicle.
    fn sample_full_speed(&mut self) -> f64 {
        let factor = match &self.speed_distr {
            Some(distr) => distr
                .sample(&mut self.rng)
                .clamp(MIN_SPEED_FACTOR, MAX_SPEED_FACTOR),
            None => 1.0,
        };
        self.config.full_speed * factor
    }

    /// Builds a vehicle and places it on a lane. The coordinate must be drivable.
    fn insert_vehicle(&mut self, lane_id: LaneId, coordinate: f64) -> VehicleId {
        let body = create_random_vehicle(&mut self.factory, &mut self.rng);
        let full_speed = self.sample_full_speed();
        let lane = &self.network[lane_id];
        let height = self.config.road_height;
        let vehicle_id = self.vehicles.insert_with_key(|id| {
            let mut vehicle = Vehicle::new(id, body, lane, coordinate, full_speed);
            vehicle.sync_visual(height);
            vehicle
        });
        self.stats.spawned += 1;
        log::debug!(
            "spawned {vehicle_id:?} on {} at {coordinate:.1}, full speed {full_speed:.2}",
            lane.name()
        );
        vehicle_id
    }

    /// Moves every vehicle one step and performs hand-offs.
    /// Returns the vehicles that have driven off the network.
    fn update_vehicles(&mut self, dt: f64) -> SmallVec<[VehicleId; 4]> {
        let network = &self.network;
        let curve_speed = self.config.curve_speed();

        // Gaps are taken from positions at the start of the tick
        let mut occupancy = self
            .vehicles
            .values()
            .filter_map(|veh| {
                let lane = &network[veh.lane()?];
                let progress = lane.progress(lane.coordinate_of(veh.position()));
                Some((lane.id(), progress, veh.id()))
            })
            .collect::<Vec<_>>();
        let gaps = leader_gaps(occupancy.iter().copied());

        let mut exited = SmallVec::new();
        for (vehicle_id, vehicle) in &mut self.vehicles {
            match vehicle.motion() {
                Motion::Straight { lane: lane_id } => {
                    let lane = &network[lane_id];
                    let must_yield = self.oracle.should_yield(vehicle.position(), lane_id);
                    let gap = gaps.get(vehicle_id).copied().unwrap_or(f64::INFINITY);
                    let speed = self
                        .following
                        .resolve_speed(vehicle.full_speed(), gap, must_yield);
                    vehicle.drive(lane, speed, dt);

                    let progress = lane.progress(lane.coordinate_of(vehicle.position()));
                    match network.curve_from(lane_id) {
                        Some(curve) if progress >= curve.trigger_progress(lane) => {
                            vehicle.enter_curve(curve);
                            self.stats.curve_entries += 1;
                            log::trace!("{vehicle_id:?} entered curve from {}", lane.name());
                            debug_curve_entry(lane.name(), vehicle.position(), curve.arc());
                        }
                        _ => {
                            if lane.is_past_exit(vehicle.position()) {
                                exited.push(vehicle_id);
                            }
                        }
                    }
                }
                Motion::Curving(progress) => {
                    let curve = &network[progress.curve];
                    let target = &network[progress.target];
                    if vehicle.follow_curve(curve, curve_speed, dt) {
                        let delivery = target.progress(curve.delivery());
                        let occupants = occupancy
                            .iter()
                            .filter(|(lane, ..)| *lane == target.id())
                            .map(|(_, at, _)| *at);
                        if self.following.is_clear_to_join(occupants, delivery) {
                            vehicle.leave_curve(curve, target);
                            occupancy.push((target.id(), delivery, vehicle_id));
                            self.stats.curve_exits += 1;
                            log::trace!("{vehicle_id:?} left curve onto {}", target.name());
                            debug_curve_exit(target.name(), vehicle.position());
                        } else {
                            log::trace!("{vehicle_id:?} waiting to join {}", target.name());
                        }
                    }
                }
            }
            vehicle.sync_visual(self.config.road_height);
        }
        exited
    }

    /// Removes vehicles that have passed their lane's exit margin.
    fn remove_exited(&mut self, exited: &[VehicleId]) {
        for vehicle_id in exited {
            if let Some(vehicle) = self.vehicles.remove(*vehicle_id) {
                self.stats.despawned += 1;
                log::debug!(
                    "despawned {vehicle_id:?} at ({:.1}, {:.1})",
                    vehicle.position().x,
                    vehicle.position().y
                );
            }
        }
    }

    /// Accumulates time and makes a spawn attempt each time the interval elapses.
    fn update_spawner(&mut self, dt: f64) {
        self.spawn_timer += dt;
        if self.spawn_timer < self.config.spawn_interval {
            return;
        }
        self.spawn_timer = 0.0;
        if self.vehicles.len() < self.config.max_vehicles {
            self.try_spawn();
        }
    }
}
