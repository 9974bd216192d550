//! Simulation parameters.

use crate::ConfigError;

/// The largest per-vehicle speed factor produced by speed jitter.
pub(crate) const MAX_SPEED_FACTOR: f64 = 1.25;

/// The smallest per-vehicle speed factor produced by speed jitter.
pub(crate) const MIN_SPEED_FACTOR: f64 = 0.75;

/// The tunable parameters of a [Simulation](crate::Simulation).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationConfig {
    /// The nominal cruising speed of every vehicle, in units/s.
    pub full_speed: f64,
    /// Standard deviation of the per-vehicle speed factor. Zero gives every
    /// vehicle exactly `full_speed`.
    pub speed_jitter: f64,
    /// Gap to the vehicle ahead below which a vehicle stands still.
    pub stop_distance: f64,
    /// Gap to the vehicle ahead below which a vehicle starts slowing down.
    pub slow_distance: f64,
    /// Seconds between spawn attempts.
    pub spawn_interval: f64,
    /// The largest number of live vehicles the spawner will allow.
    pub max_vehicles: usize,
    /// A spawn is rejected if any vehicle lies within this radius of the entry point.
    pub spawn_clearance: f64,
    /// Time steps larger than this are clamped, in s.
    pub max_dt: f64,
    /// The height at which vehicle visuals are placed.
    pub road_height: f64,
    /// Seed for the random source; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            full_speed: 9.0,
            speed_jitter: 0.0,
            stop_distance: 8.0,
            slow_distance: 15.0,
            spawn_interval: 1.5,
            max_vehicles: 24,
            spawn_clearance: 25.0,
            max_dt: 0.1,
            road_height: 0.05,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Checks that the parameters describe a usable simulation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("full_speed", self.full_speed),
            ("stop_distance", self.stop_distance),
            ("slow_distance", self.slow_distance),
            ("spawn_interval", self.spawn_interval),
            ("spawn_clearance", self.spawn_clearance),
            ("max_dt", self.max_dt),
        ];
        for (field, value) in positive {
            // `spawn_interval` may be infinite to disable spawning
            let finite = value.is_finite() || (field == "spawn_interval" && value.is_infinite());
            if !(value > 0.0 && finite) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if !self.road_height.is_finite() {
            return Err(ConfigError::NotPositive {
                field: "road_height",
                value: self.road_height,
            });
        }
        if self.slow_distance <= self.stop_distance {
            return Err(ConfigError::InvertedThresholds {
                stop: self.stop_distance,
                slow: self.slow_distance,
            });
        }
        if !(0.0..1.0).contains(&self.speed_jitter) {
            return Err(ConfigError::InvalidJitter {
                jitter: self.speed_jitter,
            });
        }
        let step = self.max_full_speed() * self.max_dt;
        let ramp = self.slow_distance - self.stop_distance;
        if step > ramp {
            return Err(ConfigError::StepTooCoarse { step, ramp });
        }
        Ok(())
    }

    /// The highest full speed any vehicle can be assigned.
    pub fn max_full_speed(&self) -> f64 {
        if self.speed_jitter > 0.0 {
            self.full_speed * MAX_SPEED_FACTOR
        } else {
            self.full_speed
        }
    }

    /// The speed shared by every vehicle on a curve: the lowest full speed any
    /// vehicle can be assigned, so vehicles keep their order around the arc.
    pub fn curve_speed(&self) -> f64 {
        if self.speed_jitter > 0.0 {
            self.full_speed * MIN_SPEED_FACTOR
        } else {
            self.full_speed
        }
    }
}

/// Describes how a network is seeded with vehicles before the first tick.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InitialPopulation {
    /// The most vehicles placed on each entry lane.
    pub per_entry: usize,
    /// The distance between consecutive vehicles along a lane.
    pub spacing: f64,
    /// How far short of a curve trigger (or lane end) placement stops.
    pub trigger_clearance: f64,
}

impl InitialPopulation {
    /// Checks that the placement parameters describe a finite layout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.spacing > 0.0 && self.spacing.is_finite()) {
            return Err(ConfigError::NotPositive {
                field: "spacing",
                value: self.spacing,
            });
        }
        if !(self.trigger_clearance >= 0.0 && self.trigger_clearance.is_finite()) {
            return Err(ConfigError::Negative {
                field: "trigger_clearance",
                value: self.trigger_clearance,
            });
        }
        Ok(())
    }
}

impl Default for InitialPopulation {
    fn default() -> Self {
        Self {
            per_entry: 4,
            spacing: 25.0,
            trigger_clearance: 20.0,
        }
    }
}
