//! Error types for network construction and simulation configuration.

use std::fmt;

/// Errors arising from road network construction or vehicle placement.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// Two lanes share a name.
    DuplicateLane {
        /// The repeated name.
        name: String,
    },
    /// A lane's bounds are empty, inverted or not finite.
    InvalidBounds {
        /// The lane name.
        lane: String,
    },
    /// A lane's exit margin is negative or not finite.
    InvalidExitMargin {
        /// The lane name.
        lane: String,
        /// The offending margin.
        margin: f64,
    },
    /// A curve or entry point refers to a lane not in the network.
    UnknownLane,
    /// More than one curve connector leaves the same lane.
    DuplicateCurve {
        /// The source lane name.
        lane: String,
    },
    /// A curve's radius is not a positive finite number.
    InvalidRadius {
        /// The source lane name.
        lane: String,
        /// The offending radius.
        radius: f64,
    },
    /// A curve's declared sweep disagrees with its angular endpoints.
    SweepMismatch {
        /// The source lane name.
        lane: String,
    },
    /// A curve's trigger lies outside its source lane.
    TriggerOutOfBounds {
        /// The source lane name.
        lane: String,
        /// The trigger coordinate.
        trigger: f64,
    },
    /// A curve endpoint does not land on its declared lane at the expected point.
    Discontinuity {
        /// The lane the endpoint should lie on.
        lane: String,
        /// The distance between the arc endpoint and the lane point.
        distance: f64,
    },
    /// A curve's tangent disagrees with a lane's direction at a hand-off.
    HeadingMismatch {
        /// The lane whose direction differs.
        lane: String,
    },
    /// A curve delivers outside its target lane or at/after the target's own trigger.
    DeliveryOutOfBounds {
        /// The target lane name.
        lane: String,
        /// The delivery coordinate.
        coordinate: f64,
    },
    /// An entry point or placement does not lie on the drivable part of its lane.
    OffLane {
        /// The lane name.
        lane: String,
        /// The offending coordinate.
        coordinate: f64,
    },
    /// An entry point has a zero spawn weight.
    ZeroWeight {
        /// The lane name.
        lane: String,
    },
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateLane { name } => write!(f, "lane name {name:?} is used twice"),
            Self::InvalidBounds { lane } => write!(f, "lane {lane:?} has invalid bounds"),
            Self::InvalidExitMargin { lane, margin } => {
                write!(f, "lane {lane:?} has invalid exit margin {margin}")
            }
            Self::UnknownLane => write!(f, "reference to a lane not in the network"),
            Self::DuplicateCurve { lane } => {
                write!(f, "lane {lane:?} feeds more than one curve")
            }
            Self::InvalidRadius { lane, radius } => {
                write!(f, "curve from {lane:?} has invalid radius {radius}")
            }
            Self::SweepMismatch { lane } => {
                write!(f, "curve from {lane:?} sweeps against its declared direction")
            }
            Self::TriggerOutOfBounds { lane, trigger } => {
                write!(f, "curve trigger {trigger} lies outside lane {lane:?}")
            }
            Self::Discontinuity { lane, distance } => {
                write!(f, "curve endpoint misses lane {lane:?} by {distance}")
            }
            Self::HeadingMismatch { lane } => {
                write!(f, "curve tangent disagrees with direction of lane {lane:?}")
            }
            Self::DeliveryOutOfBounds { lane, coordinate } => {
                write!(f, "curve delivers onto lane {lane:?} at unusable coordinate {coordinate}")
            }
            Self::OffLane { lane, coordinate } => {
                write!(f, "coordinate {coordinate} is not drivable on lane {lane:?}")
            }
            Self::ZeroWeight { lane } => write!(f, "entry point on lane {lane:?} has zero weight"),
        }
    }
}

impl std::error::Error for NetworkError {}

/// Errors arising from an invalid [SimulationConfig](crate::SimulationConfig).
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A parameter must be a positive finite number.
    NotPositive {
        /// The parameter name.
        field: &'static str,
        /// The offending value.
        value: f64,
    },
    /// A parameter must be a non-negative finite number.
    Negative {
        /// The parameter name.
        field: &'static str,
        /// The offending value.
        value: f64,
    },
    /// The slow-down distance must exceed the stop distance.
    InvertedThresholds {
        /// The configured stop distance.
        stop: f64,
        /// The configured slow-down distance.
        slow: f64,
    },
    /// Speed jitter must lie in `[0, 1)`.
    InvalidJitter {
        /// The offending standard deviation.
        jitter: f64,
    },
    /// The largest step can carry a vehicle through the whole following ramp.
    StepTooCoarse {
        /// Distance travelled in one clamped step at the highest possible speed.
        step: f64,
        /// Width of the following ramp, `slow_distance - stop_distance`.
        ramp: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPositive { field, value } => {
                write!(f, "{field} must be positive and finite, got {value}")
            }
            Self::Negative { field, value } => {
                write!(f, "{field} must be non-negative and finite, got {value}")
            }
            Self::InvertedThresholds { stop, slow } => {
                write!(f, "slow distance {slow} must exceed stop distance {stop}")
            }
            Self::InvalidJitter { jitter } => {
                write!(f, "speed jitter {jitter} must lie in [0, 1)")
            }
            Self::StepTooCoarse { step, ramp } => write!(
                f,
                "a single step travels {step}, more than the following ramp of {ramp}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
