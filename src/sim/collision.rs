//! Contact detection for the lane
//!
//! Pins are treated as upright cylinders and the ball as a sphere, both
//! projected onto the lane plane (x, z). The ball moves fast relative to pin
//! size, so contacts are swept along the ball's path for the step.

use glam::{Vec2, Vec3};

use super::frame::FrameController;
use super::state::BodyTag;
use crate::hud::PresentationSink;

#[inline]
fn lane_plane(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Check whether a ball moving from `prev` to `curr` touches a pin.
///
/// Returns the horizontal push direction for the pin if it does.
pub fn ball_pin_contact(prev: Vec3, curr: Vec3, ball_radius: f32, pin_pos: Vec3, pin_radius: f32) -> Option<Vec3> {
    let a = lane_plane(prev);
    let b = lane_plane(curr);
    let p = lane_plane(pin_pos);

    // Closest point on the swept path
    let ab = b - a;
    let len_sq = ab.length_squared();
    let t = if len_sq > 0.0 {
        ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let closest = a + ab * t;

    let offset = p - closest;
    if offset.length() >= ball_radius + pin_radius {
        return None;
    }

    // Knocked away from the ball and carried along with it
    let push = offset.normalize_or_zero() + ab.normalize_or_zero();
    let push = if push.length_squared() > 0.0 {
        push.normalize()
    } else {
        Vec2::Y
    };
    Some(Vec3::new(push.x, 0.0, push.y))
}

/// Trigger plane across the lane; reports the ball leaving the pin deck
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndTrigger {
    pub z: f32,
}

impl EndTrigger {
    pub fn new(z: f32) -> Self {
        Self { z }
    }

    /// Body crossed the plane this step (edge triggered)
    pub fn crossed(&self, prev_z: f32, curr_z: f32) -> bool {
        prev_z < self.z && curr_z >= self.z
    }

    /// Tell the controller the roll is over when the ball enters the trigger.
    ///
    /// Only the ball counts; returns whether the trigger fired.
    pub fn on_body_moved<S: PresentationSink>(
        &self,
        tag: BodyTag,
        prev_z: f32,
        curr_z: f32,
        controller: &mut FrameController<S>,
    ) -> bool {
        if tag != BodyTag::Ball || !self.crossed(prev_z, curr_z) {
            return false;
        }

        controller.on_ball_stopped();
        true
    }
}
