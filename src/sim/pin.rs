//! Bowling pin
//!
//! A pin remembers the pose it was racked in and decides it has fallen once it
//! tilts far enough away from its original "up" direction.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::tilt_degrees;

/// Opaque pin handle (stable for the lifetime of the level)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PinId(pub u32);

/// A pin entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pin {
    id: PinId,
    initial_position: Vec3,
    initial_rotation: Quat,
    /// "Up" direction when the pin is standing
    initial_up: Vec3,
    /// Degrees of tilt before the pin counts as down
    fall_angle_threshold: f32,

    position: Vec3,
    rotation: Quat,
    linear_vel: Vec3,
    angular_vel: Vec3,
    /// Inactive pins are off the lane (hidden, not simulated)
    active: bool,

    is_down: bool,
    /// Already counted and cleared from the lane this frame
    removed_this_frame: bool,
}

impl Pin {
    /// Create a pin standing in its racked pose
    pub fn new(id: PinId, position: Vec3, rotation: Quat, fall_angle_threshold: f32) -> Self {
        Self {
            id,
            initial_position: position,
            initial_rotation: rotation,
            initial_up: rotation * Vec3::Y,
            fall_angle_threshold,
            position,
            rotation,
            linear_vel: Vec3::ZERO,
            angular_vel: Vec3::ZERO,
            active: true,
            is_down: false,
            removed_this_frame: false,
        }
    }

    pub fn id(&self) -> PinId {
        self.id
    }

    pub fn is_down(&self) -> bool {
        self.is_down
    }

    pub fn removed_this_frame(&self) -> bool {
        self.removed_this_frame
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Still spinning from a hit
    pub fn is_toppling(&self) -> bool {
        self.angular_vel != Vec3::ZERO
    }

    /// Current tilt away from the racked "up" (degrees)
    pub fn tilt_degrees(&self) -> f32 {
        tilt_degrees(self.initial_up, self.rotation * Vec3::Y)
    }

    /// Record the orientation reported by physics and check for a fall.
    ///
    /// Once down, the pin stays down until [`Pin::reset_pin`].
    pub fn update(&mut self, current_rotation: Quat) {
        self.rotation = current_rotation;
        if self.is_down {
            return;
        }

        if self.tilt_degrees() > self.fall_angle_threshold {
            self.is_down = true;
            log::trace!("Pin {:?} down ({:.1} deg)", self.id, self.tilt_degrees());
        }
    }

    /// Put the pin back in its racked pose, at rest and on the lane
    pub fn reset_pin(&mut self) {
        self.is_down = false;
        self.removed_this_frame = false;

        self.position = self.initial_position;
        self.rotation = self.initial_rotation;

        self.linear_vel = Vec3::ZERO;
        self.angular_vel = Vec3::ZERO;

        self.active = true;
    }

    /// Clear the pin off the lane after it has been counted.
    ///
    /// Only meaningful for pins that are down; the frame controller guards this.
    pub fn remove_from_lane(&mut self) {
        self.removed_this_frame = true;
        self.active = false;
    }

    /// Knock the pin over in the horizontal direction `push`
    pub fn apply_impulse(&mut self, push: Vec3, speed: f32) {
        let dir = Vec3::new(push.x, 0.0, push.z).normalize_or_zero();
        if dir == Vec3::ZERO {
            return;
        }
        // Rotating about (up x dir) tips the pin's top toward dir
        let axis = (self.rotation * Vec3::Y).cross(dir).normalize_or_zero();
        self.angular_vel = axis * PIN_TOPPLE_SPIN;
        self.linear_vel += dir * speed * PIN_PUSH_FACTOR;
    }

    /// Advance the toy rigid body by one step
    pub fn integrate(&mut self, dt: f32) {
        if !self.active {
            return;
        }

        self.position += self.linear_vel * dt;
        self.linear_vel *= PIN_LINEAR_DAMPING;
        if self.linear_vel.length_squared() < 1e-6 {
            self.linear_vel = Vec3::ZERO;
        }

        if self.is_toppling() {
            self.rotation = (Quat::from_scaled_axis(self.angular_vel * dt) * self.rotation).normalize();
            // Lying flat on the lane
            if self.tilt_degrees() >= 90.0 {
                self.angular_vel = Vec3::ZERO;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::FRAC_PI_2;

    fn standing_pin() -> Pin {
        Pin::new(PinId(1), Vec3::new(0.0, PIN_HEIGHT / 2.0, HEAD_PIN_Z), Quat::IDENTITY, 15.0)
    }

    #[test]
    fn test_small_tilt_stays_up() {
        let mut pin = standing_pin();
        pin.update(Quat::from_rotation_x(10f32.to_radians()));
        assert!(!pin.is_down());
    }

    #[test]
    fn test_tilt_past_threshold_goes_down() {
        let mut pin = standing_pin();
        pin.update(Quat::from_rotation_z(20f32.to_radians()));
        assert!(pin.is_down());
    }

    #[test]
    fn test_down_is_sticky() {
        let mut pin = standing_pin();
        pin.update(Quat::from_rotation_x(FRAC_PI_2));
        assert!(pin.is_down());

        // Physics stands it back up - still counted as down
        pin.update(Quat::IDENTITY);
        assert!(pin.is_down());
    }

    #[test]
    fn test_threshold_is_relative_to_racked_pose() {
        let racked = Quat::from_rotation_x(30f32.to_radians());
        let mut pin = Pin::new(PinId(7), Vec3::ZERO, racked, 15.0);

        pin.update(racked);
        assert!(!pin.is_down());
        pin.update(Quat::IDENTITY);
        assert!(pin.is_down());
    }

    #[test]
    fn test_reset_restores_pose_and_flags() {
        let mut pin = standing_pin();
        let start = pin.position();
        pin.apply_impulse(Vec3::Z, 10.0);
        for _ in 0..60 {
            pin.integrate(SIM_DT);
            pin.update(pin.rotation());
        }
        assert!(pin.is_down());
        pin.remove_from_lane();
        assert!(!pin.is_active());

        pin.reset_pin();
        assert!(!pin.is_down());
        assert!(!pin.removed_this_frame());
        assert!(pin.is_active());
        assert!(!pin.is_toppling());
        assert_eq!(pin.position(), start);
        assert_eq!(pin.rotation(), Quat::IDENTITY);
    }

    #[test]
    fn test_impulse_topples_toward_push() {
        let mut pin = standing_pin();
        pin.apply_impulse(Vec3::Z, 10.0);
        for _ in 0..120 {
            pin.integrate(SIM_DT);
        }
        assert!(!pin.is_toppling());
        assert!(pin.tilt_degrees() >= 90.0);
        // Top of the pin now points down the lane
        assert!((pin.rotation() * Vec3::Y).z > 0.9);
    }

    #[test]
    fn test_removed_pin_is_not_simulated() {
        let mut pin = standing_pin();
        pin.update(Quat::from_rotation_x(FRAC_PI_2));
        pin.apply_impulse(Vec3::X, 10.0);
        pin.remove_from_lane();
        let before = pin.position();
        pin.integrate(SIM_DT);
        assert_eq!(pin.position(), before);
        assert!(pin.removed_this_frame());
    }

    fn any_rotation() -> impl Strategy<Value = Quat> {
        (-3.2f32..3.2, -3.2f32..3.2, -3.2f32..3.2)
            .prop_map(|(x, y, z)| Quat::from_euler(glam::EulerRot::XYZ, x, y, z))
    }

    proptest! {
        #[test]
        fn prop_down_never_reverts(rotations in prop::collection::vec(any_rotation(), 1..40)) {
            let mut pin = standing_pin();
            let mut seen_down = false;
            for rotation in rotations {
                pin.update(rotation);
                if seen_down {
                    prop_assert!(pin.is_down());
                }
                seen_down |= pin.is_down();
            }
        }

        #[test]
        fn prop_reset_always_clears(rotations in prop::collection::vec(any_rotation(), 0..10), remove in any::<bool>()) {
            let mut pin = standing_pin();
            for rotation in rotations {
                pin.update(rotation);
            }
            if remove {
                pin.remove_from_lane();
            }
            pin.reset_pin();
            prop_assert!(!pin.is_down());
            prop_assert!(!pin.removed_this_frame());
        }
    }
}
