//! Vehicle visuals and the policy for choosing what kind of vehicle to build.
//!
//! Building the visual itself (meshes, materials) belongs to the host. The
//! simulator only decides the body class and colour, asks a [VehicleFactory]
//! for a handle, and writes transforms into it every tick.

use cgmath::Point3;
use once_cell::sync::Lazy;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;

/// A vehicle body class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VehicleClass {
    Compact,
    Suv,
    Bus,
    Truck,
    Van,
}

/// Spawn weights, in percent.
const CLASS_WEIGHTS: [(VehicleClass, u32); 5] = [
    (VehicleClass::Compact, 30),
    (VehicleClass::Suv, 30),
    (VehicleClass::Bus, 10),
    (VehicleClass::Truck, 15),
    (VehicleClass::Van, 15),
];

static CLASS_DISTR: Lazy<WeightedIndex<u32>> = Lazy::new(|| {
    WeightedIndex::new(CLASS_WEIGHTS.iter().map(|(_, w)| *w)).expect("Class weights are positive")
});

const COMPACT_PALETTE: [Colour; 5] = [
    Colour(0xc0392b),
    Colour(0x2980b9),
    Colour(0xf1c40f),
    Colour(0xecf0f1),
    Colour(0x2c3e50),
];
const SUV_PALETTE: [Colour; 4] = [
    Colour(0x1b1b1b),
    Colour(0x7f8c8d),
    Colour(0xfdfefe),
    Colour(0x154360),
];
const BUS_PALETTE: [Colour; 2] = [Colour(0xf39c12), Colour(0xd35400)];
const TRUCK_PALETTE: [Colour; 3] = [Colour(0xbdc3c7), Colour(0x922b21), Colour(0x1e8449)];
const VAN_PALETTE: [Colour; 3] = [Colour(0xfdfefe), Colour(0x5d6d7e), Colour(0x2471a3)];

/// An RGB colour, `0xRRGGBB`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Colour(pub u32);

impl Colour {
    /// The red, green and blue channels.
    pub fn rgb(self) -> [u8; 3] {
        let [_, r, g, b] = self.0.to_be_bytes();
        [r, g, b]
    }
}

impl VehicleClass {
    /// All body classes.
    pub const ALL: [VehicleClass; 5] = [
        VehicleClass::Compact,
        VehicleClass::Suv,
        VehicleClass::Bus,
        VehicleClass::Truck,
        VehicleClass::Van,
    ];

    /// The relative spawn weight of the class, in percent.
    pub fn weight(self) -> u32 {
        CLASS_WEIGHTS
            .iter()
            .find(|(class, _)| *class == self)
            .map_or(0, |(_, w)| *w)
    }

    /// The body colours available to the class.
    pub fn palette(self) -> &'static [Colour] {
        match self {
            VehicleClass::Compact => &COMPACT_PALETTE,
            VehicleClass::Suv => &SUV_PALETTE,
            VehicleClass::Bus => &BUS_PALETTE,
            VehicleClass::Truck => &TRUCK_PALETTE,
            VehicleClass::Van => &VAN_PALETTE,
        }
    }

    /// Chooses a class according to the spawn weights.
    pub fn choose<R: Rng + ?Sized>(rng: &mut R) -> Self {
        CLASS_WEIGHTS[CLASS_DISTR.sample(rng)].0
    }

    /// Chooses a colour from the class palette.
    pub fn choose_colour<R: Rng + ?Sized>(self, rng: &mut R) -> Colour {
        // Every palette is non-empty
        *self.palette().choose(rng).unwrap_or(&Colour(0xffffff))
    }
}

/// The visual representation of a vehicle, owned by the simulated vehicle.
///
/// Dropping the handle releases the visual.
pub trait VehicleVisual {
    /// Writes the world position and yaw of the vehicle.
    fn set_transform(&mut self, position: Point3<f64>, yaw: f64);
}

/// Builds vehicle visuals.
pub trait VehicleFactory {
    /// The visual handle type.
    type Visual: VehicleVisual;

    /// Builds a visual for a vehicle of the given class and colour.
    /// Must not touch simulation state.
    fn build(&mut self, class: VehicleClass, colour: Colour) -> Self::Visual;
}

/// A newly built vehicle body, not yet placed in the simulation.
pub struct VehicleBody<V> {
    pub class: VehicleClass,
    pub colour: Colour,
    pub visual: V,
}

/// Chooses a class and colour at random and builds the matching visual.
pub fn create_random_vehicle<F, R>(factory: &mut F, rng: &mut R) -> VehicleBody<F::Visual>
where
    F: VehicleFactory + ?Sized,
    R: Rng + ?Sized,
{
    let class = VehicleClass::choose(rng);
    let colour = class.choose_colour(rng);
    let visual = factory.build(class, colour);
    VehicleBody {
        class,
        colour,
        visual,
    }
}

/// A factory producing visuals that only record their last transform.
#[derive(Clone, Copy, Debug, Default)]
pub struct Headless;

/// The visual produced by [Headless].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeadlessVisual {
    pub position: Point3<f64>,
    pub yaw: f64,
}

impl VehicleVisual for HeadlessVisual {
    fn set_transform(&mut self, position: Point3<f64>, yaw: f64) {
        self.position = position;
        self.yaw = yaw;
    }
}

impl VehicleFactory for Headless {
    type Visual = HeadlessVisual;

    fn build(&mut self, _class: VehicleClass, _colour: Colour) -> HeadlessVisual {
        HeadlessVisual {
            position: Point3::new(0.0, 0.0, 0.0),
            yaw: 0.0,
        }
    }
}
