pub use cgmath;
pub use config::{InitialPopulation, SimulationConfig};
pub use error::{ConfigError, NetworkError};
pub use factory::{
    create_random_vehicle, Colour, Headless, HeadlessVisual, VehicleBody, VehicleClass,
    VehicleFactory, VehicleVisual,
};
pub use network::{
    Axis, CurveAttributes, CurveConnector, Direction, EntryAttributes, EntryPoint, Lane,
    LaneAttributes, NetworkBuilder, RoadNetwork,
};
pub use oracle::{Crosswalk, CrosswalkOracle, NoPedestrians, YieldOracle};
pub use simulation::{Simulation, SimulationStats};
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use util::Interval;
pub use vehicle::{CurveProgress, FollowingModel, Motion, Vehicle};

mod config;
mod debug;
mod error;
mod factory;
pub mod math;
mod network;
mod oracle;
mod simulation;
mod util;
mod vehicle;

new_key_type! {
    /// Unique ID of a [Lane].
    pub struct LaneId;
    /// Unique ID of a [CurveConnector].
    pub struct CurveId;
    /// Unique ID of a [Vehicle].
    pub struct VehicleId;
}

type LaneSet = SlotMap<LaneId, Lane>;
type CurveSet = SlotMap<CurveId, CurveConnector>;
type VehicleSet<V> = SlotMap<VehicleId, Vehicle<V>>;
