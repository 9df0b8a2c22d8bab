//! Lane state and core simulation types
//!
//! `LaneState` is the level setup: it racks the pins, owns the thrower and the
//! frame controller, and hands the controller borrowed pins on every call.

use glam::{Quat, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::EndTrigger;
use super::frame::FrameController;
use super::pin::{Pin, PinId};
use crate::consts::*;
use crate::hud::PresentationSink;
use crate::settings::LaneSettings;

/// Tag used by triggers to tell bodies apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyTag {
    Ball,
    Pin,
}

/// The bowling ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec3,
    pub vel: Vec3,
    pub radius: f32,
    pub tag: BodyTag,
}

impl Ball {
    pub fn new(id: u32, pos: Vec3) -> Self {
        Self {
            id,
            pos,
            vel: Vec3::ZERO,
            radius: BALL_RADIUS,
            tag: BodyTag::Ball,
        }
    }

    /// Roll forward one step, losing a little speed to the lane
    pub fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.vel *= (1.0 - BALL_ROLL_FRICTION * dt).max(0.0);
    }

    /// Too slow to count as rolling
    pub fn is_stalled(&self) -> bool {
        self.vel.length() < BALL_STALL_SPEED
    }
}

/// Aims and throws the ball
#[derive(Debug, Clone)]
pub struct Thrower {
    pub spawn_point: Vec3,
    /// Throw direction (down the lane)
    pub forward: Vec3,
    pub throw_force: f32,
    pub aim_with_mouse: bool,
    /// Maximum left/right offset for aiming
    pub max_horizontal_offset: f32,
    /// Ball currently on the lane
    pub current_ball: Option<Ball>,
    next_ball_id: u32,
}

impl Thrower {
    pub fn new(settings: &LaneSettings) -> Self {
        Self {
            spawn_point: Vec3::new(0.0, BALL_RADIUS, 0.0),
            forward: Vec3::Z,
            throw_force: settings.throw_force,
            aim_with_mouse: settings.aim_with_mouse,
            max_horizontal_offset: settings.max_horizontal_offset,
            current_ball: None,
            next_ball_id: 1,
        }
    }

    /// Slide the spawn point left/right from a pointer x in [0, 1].
    ///
    /// Only while the player is allowed to shoot.
    pub fn aim<S: PresentationSink>(&mut self, pointer_x: f32, controller: &FrameController<S>) {
        if !self.aim_with_mouse || !controller.can_shoot() {
            return;
        }

        let pointer_x = pointer_x.clamp(0.0, 1.0);
        self.spawn_point.x = (pointer_x - 0.5) * 2.0 * self.max_horizontal_offset;
    }

    /// Launch a new ball if the controller allows it; returns whether one was thrown
    pub fn try_shoot<S: PresentationSink>(&mut self, controller: &mut FrameController<S>) -> bool {
        if !controller.can_shoot() {
            return false;
        }

        let id = self.next_ball_id;
        self.next_ball_id += 1;

        // Replaces the previous ball if it is still around
        let mut ball = Ball::new(id, self.spawn_point);
        // Unit mass: the impulse is the launch velocity
        ball.vel = self.forward.normalize_or_zero() * self.throw_force;
        self.current_ball = Some(ball);

        controller.on_player_shot();
        log::debug!("Ball {} thrown from x={:.2}", id, self.spawn_point.x);
        true
    }

    pub fn clear_ball(&mut self) {
        self.current_ball = None;
    }
}

/// Rack positions in a triangle pointing at the bowler (1, 2, 3, 4 ... per row)
pub fn rack_positions(count: u32) -> Vec<Vec3> {
    let row_depth = PIN_SPACING * 3f32.sqrt() / 2.0;
    let mut positions = Vec::with_capacity(count as usize);
    let mut row = 0u32;
    while positions.len() < count as usize {
        for i in 0..=row {
            if positions.len() == count as usize {
                break;
            }
            let x = (i as f32 - row as f32 / 2.0) * PIN_SPACING;
            let z = HEAD_PIN_Z + row as f32 * row_depth;
            positions.push(Vec3::new(x, PIN_HEIGHT / 2.0, z));
        }
        row += 1;
    }
    positions
}

/// Complete lane state for one level (deterministic for a given seed)
#[derive(Debug, Clone)]
pub struct LaneState<S = crate::hud::Hud> {
    /// Seed for the toy physics
    pub seed: u64,
    pub settings: LaneSettings,
    /// All pins on the lane (sorted by id for determinism)
    pub pins: Vec<Pin>,
    pub thrower: Thrower,
    pub end_trigger: EndTrigger,
    pub controller: FrameController<S>,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub(crate) rng: Pcg32,
}

impl<S: PresentationSink> LaneState<S> {
    /// Rack the lane and start the first frame
    pub fn new(settings: LaneSettings, seed: u64, sink: Option<S>) -> Self {
        let settings = settings.sanitized();

        let mut pins: Vec<Pin> = rack_positions(settings.pin_count)
            .into_iter()
            .enumerate()
            .map(|(i, pos)| {
                Pin::new(
                    PinId(i as u32),
                    pos,
                    Quat::IDENTITY,
                    settings.fall_angle_threshold_deg,
                )
            })
            .collect();

        let mut controller = FrameController::new(&settings, pins.len() as u32, sink);
        controller.reset_frame(&mut pins);

        log::info!(
            "Lane racked: {} pins, {} shots per frame, seed {}",
            pins.len(),
            settings.shots_per_frame,
            seed
        );

        Self {
            seed,
            thrower: Thrower::new(&settings),
            end_trigger: EndTrigger::new(LANE_END_Z),
            settings,
            pins,
            controller,
            time_ticks: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn pin(&self, id: PinId) -> Option<&Pin> {
        self.pins.iter().find(|p| p.id() == id)
    }

    /// Pins currently standing on the lane
    pub fn standing_pins(&self) -> usize {
        self.pins.iter().filter(|p| p.is_active() && !p.is_down()).count()
    }
}
