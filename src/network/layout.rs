//! The outer ring road of the diorama.
//!
//! Two entry lanes feed two corners: traffic from the east runs along
//! `mainWest` and turns south onto `southDown`; traffic from the south climbs
//! `southUp` and turns east onto `mainEast`. Both outbound lanes end beyond the
//! rendered extent, where vehicles are removed.

use super::{Axis, CurveAttributes, Direction, LaneAttributes, NetworkBuilder, RoadNetwork};
use crate::math::{Arc2d, Point2d};
use crate::oracle::Crosswalk;
use crate::util::Interval;
use crate::{EntryPoint, NetworkError};
use std::f64::consts::{FRAC_PI_2, PI};

/// Distance beyond the rendered extent at which vehicles are removed.
const EXIT_MARGIN: f64 = 10.0;

/// Half the extent of the rendered city along each axis.
const EXTENT: f64 = 140.0;

impl RoadNetwork {
    /// Builds the ring road lane and curve tables.
    pub fn ring_road() -> Result<Self, NetworkError> {
        let mut builder = NetworkBuilder::new();
        let lane = |name: &'static str, axis, fixed, direction, min, max| LaneAttributes {
            name,
            axis,
            fixed,
            direction,
            bounds: Interval::new(min, max),
            exit_margin: EXIT_MARGIN,
        };

        let main_west = builder.add_lane(&lane(
            "mainWest",
            Axis::X,
            4.0,
            Direction::Negative,
            -35.0,
            EXTENT,
        ));
        let main_east = builder.add_lane(&lane(
            "mainEast",
            Axis::X,
            -4.0,
            Direction::Positive,
            -27.0,
            EXTENT,
        ));
        let south_up = builder.add_lane(&lane(
            "southUp",
            Axis::Z,
            -58.0,
            Direction::Positive,
            -EXTENT,
            -35.0,
        ));
        let south_down = builder.add_lane(&lane(
            "southDown",
            Axis::Z,
            -50.0,
            Direction::Negative,
            -EXTENT,
            -11.0,
        ));

        builder
            .add_curve(&CurveAttributes {
                from: main_west,
                to: south_down,
                trigger: -35.0,
                arc: Arc2d::new(Point2d::new(-35.0, -11.0), 15.0, FRAC_PI_2, PI),
                sweep: Direction::Positive,
            })
            .add_curve(&CurveAttributes {
                from: south_up,
                to: main_east,
                trigger: -35.0,
                arc: Arc2d::new(Point2d::new(-27.0, -35.0), 31.0, PI, FRAC_PI_2),
                sweep: Direction::Negative,
            })
            .add_entry(&EntryPoint {
                lane: main_west,
                coordinate: EXTENT - 5.0,
                weight: 1,
            })
            .add_entry(&EntryPoint {
                lane: south_up,
                coordinate: -EXTENT + 5.0,
                weight: 1,
            });

        builder.build()
    }

    /// The crosswalks of the ring road, spanning both carriageways of the main road.
    ///
    /// Returns an empty list when the network lacks the main road lanes.
    pub fn ring_road_crosswalks(&self) -> Vec<Crosswalk> {
        const AT: f64 = 60.0;
        const HALF_WIDTH: f64 = 2.0;
        const APPROACH: f64 = 12.0;
        let span = Interval::new(-8.0, 8.0);

        ["mainWest", "mainEast"]
            .iter()
            .filter_map(|name| self.lane_by_name(name))
            .map(|lane| Crosswalk::on_lane(lane, AT, HALF_WIDTH, span, APPROACH))
            .collect()
    }
}
