use crate::math::{Arc2d, Point2d};
#[cfg(feature = "debug")]
use serde_json::json;

#[cfg(feature = "debug")]
thread_local!(
    static DEBUG_FRAME: std::cell::RefCell<Vec<serde_json::Value>> = Default::default();
);

/// Records a vehicle switching onto a curve.
#[allow(unused)]
pub fn debug_curve_entry(name: &str, at: Point2d, arc: &Arc2d) {
    #[cfg(feature = "debug")]
    DEBUG_FRAME.with(|frame| {
        frame.borrow_mut().push(json!({
            "type": "curve_entry",
            "name": name,
            "at": [at.x, at.y],
            "centre": [arc.centre.x, arc.centre.y],
            "radius": arc.radius,
            "angles": [arc.start, arc.end],
        }))
    })
}

/// Records a vehicle leaving a curve onto its target lane.
#[allow(unused)]
pub fn debug_curve_exit(name: &str, at: Point2d) {
    #[cfg(feature = "debug")]
    DEBUG_FRAME.with(|frame| {
        frame.borrow_mut().push(json!({
            "type": "curve_exit",
            "name": name,
            "at": [at.x, at.y],
        }))
    })
}

/// Records a rejected spawn and the vehicle that blocked it.
#[allow(unused)]
pub fn debug_rejected_spawn(entry: Point2d, blocker: Point2d) {
    #[cfg(feature = "debug")]
    DEBUG_FRAME.with(|frame| {
        frame.borrow_mut().push(json!({
            "type": "rejected_spawn",
            "entry": [entry.x, entry.y],
            "blocker": [blocker.x, blocker.y],
        }))
    })
}

#[cfg(feature = "debug")]
pub fn take_debug_frame() -> serde_json::Value {
    json!(DEBUG_FRAME.with(|frame| frame.take()))
}
