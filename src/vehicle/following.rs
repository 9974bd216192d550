use crate::{LaneId, VehicleId};
use itertools::Itertools;
use slotmap::SecondaryMap;

/// The car following model: a vehicle stands still inside `stop_distance` of
/// the vehicle ahead, cruises beyond `slow_distance`, and ramps linearly in
/// between.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FollowingModel {
    stop_distance: f64,
    slow_distance: f64,
}

impl FollowingModel {
    /// Creates a new following model. `slow_distance` must exceed `stop_distance`.
    pub fn new(stop_distance: f64, slow_distance: f64) -> Self {
        Self {
            stop_distance,
            slow_distance,
        }
    }

    /// Calculates the speed of a vehicle for this tick.
    ///
    /// # Arguments
    /// * `full_speed` - The vehicle's cruising speed.
    /// * `gap` - The forward distance to the vehicle ahead, or infinity.
    /// * `must_yield` - Whether a pedestrian blocks the vehicle.
    pub fn resolve_speed(&self, full_speed: f64, gap: f64, must_yield: bool) -> f64 {
        if must_yield || gap < self.stop_distance {
            0.0
        } else if gap < self.slow_distance {
            let ramp = (gap - self.stop_distance) / (self.slow_distance - self.stop_distance);
            (full_speed * ramp).clamp(0.0, full_speed)
        } else {
            full_speed
        }
    }

    /// Whether a vehicle can join a lane at `progress` given the progress of the
    /// vehicles already on it. The nearest vehicle ahead must be at least
    /// `stop_distance` away and the nearest behind at least `slow_distance`, so a
    /// follower that has not yet seen the newcomer cannot close on it in one step.
    pub fn is_clear_to_join(
        &self,
        occupants: impl IntoIterator<Item = f64>,
        progress: f64,
    ) -> bool {
        occupants.into_iter().all(|other| {
            other >= progress + self.stop_distance || other <= progress - self.slow_distance
        })
    }
}

/// Computes the forward gap from each vehicle to the nearest vehicle ahead in the same lane.
///
/// Takes `(lane, progress, vehicle)` triples for every vehicle driving straight.
/// Vehicles with nobody ahead are absent from the result.
pub(crate) fn leader_gaps(
    entries: impl IntoIterator<Item = (LaneId, f64, VehicleId)>,
) -> SecondaryMap<VehicleId, f64> {
    let mut gaps = SecondaryMap::new();
    entries
        .into_iter()
        .sorted_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)).then(a.2.cmp(&b.2)))
        .tuple_windows()
        .filter(|(follower, leader)| follower.0 == leader.0)
        .for_each(|(follower, leader)| {
            gaps.insert(follower.2, leader.1 - follower.1);
        });
    gaps
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use slotmap::SlotMap;

    #[test]
    fn speed_ramps_between_thresholds() {
        let model = FollowingModel::new(8.0, 15.0);
        assert_eq!(model.resolve_speed(9.0, 5.0, false), 0.0);
        assert_eq!(model.resolve_speed(9.0, 8.0, false), 0.0);
        assert_approx_eq!(model.resolve_speed(9.0, 11.5, false), 4.5);
        assert_eq!(model.resolve_speed(9.0, 15.0, false), 9.0);
        assert_eq!(model.resolve_speed(9.0, f64::INFINITY, false), 9.0);
        assert_eq!(model.resolve_speed(9.0, f64::INFINITY, true), 0.0);
    }

    #[test]
    fn joining_needs_room_both_ways() {
        let model = FollowingModel::new(8.0, 15.0);
        assert!(model.is_clear_to_join(Vec::<f64>::new(), 0.0));
        assert!(model.is_clear_to_join([8.0, 30.0], 0.0));
        assert!(!model.is_clear_to_join([7.9], 0.0));
        assert!(!model.is_clear_to_join([0.0], 0.0));
        assert!(model.is_clear_to_join([25.0], 40.0));
        assert!(!model.is_clear_to_join([30.0], 40.0));
    }

    #[test]
    fn gaps_only_within_a_lane() {
        let mut lanes = SlotMap::<LaneId, ()>::with_key();
        let a = lanes.insert(());
        let b = lanes.insert(());
        let mut vehicles = SlotMap::<VehicleId, ()>::with_key();
        let [v1, v2, v3, v4] = [(); 4].map(|_| vehicles.insert(()));

        let gaps = leader_gaps([(a, 40.0, v1), (b, 3.0, v2), (a, 45.0, v3), (a, 10.0, v4)]);
        assert_eq!(gaps.get(v4), Some(&30.0));
        assert_eq!(gaps.get(v1), Some(&5.0));
        assert_eq!(gaps.get(v3), None);
        assert_eq!(gaps.get(v2), None);
    }
}
