//! Lane Bowl entry point
//!
//! Native build: no window, so the binary plays a scripted session on the
//! simulated lane and logs the HUD after every roll.
//!
//! Usage: `lane-bowl [settings.json] [seed]`

use lane_bowl::consts::*;
use lane_bowl::sim::{FramePhase, FrameResult, LaneState, TickInput, tick};
use lane_bowl::{Hud, HudAction, LaneSettings};

/// Frames to play before exiting
const DEMO_FRAMES: u32 = 3;
/// Pointer positions the scripted bowler aims at, one per roll
const DEMO_AIM: [f32; 4] = [0.5, 0.42, 0.6, 0.35];
/// Safety cap on ticks spent on a single roll
const MAX_TICKS_PER_ROLL: u32 = 10 * 60 * 120;

fn main() {
    env_logger::init();
    log::info!("Lane Bowl (native) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => LaneSettings::load_from(path),
        None => LaneSettings::default(),
    };
    let seed = match args.next().map(|s| s.parse::<u64>()) {
        Some(Ok(seed)) => seed,
        Some(Err(e)) => {
            log::warn!("Invalid seed: {} - using default", e);
            0xB0_11
        }
        None => 0xB0_11,
    };

    if settings.settle_delay_secs >= SETTLE_DELAY_SECS {
        log::info!(
            "Settle delay is {:.1}s; set settle_delay_secs for a snappier lane",
            settings.settle_delay_secs
        );
    }

    let mut lane = LaneState::new(settings, seed, Some(Hud::new()));
    log::info!("Game initialized with seed: {}", seed);
    log_hud(&lane);

    let mut frames_played = 0;
    let mut roll_index = 0;
    while frames_played < DEMO_FRAMES {
        let aim = DEMO_AIM[roll_index % DEMO_AIM.len()];
        roll_index += 1;

        let throw = TickInput {
            aim_x: Some(aim),
            throw: true,
            ..Default::default()
        };
        tick(&mut lane, &throw);

        let idle = TickInput::default();
        let mut evaluated = false;
        for _ in 0..MAX_TICKS_PER_ROLL {
            if tick(&mut lane, &idle).is_some() {
                evaluated = true;
                break;
            }
        }
        if !evaluated {
            log::error!("Roll {} never settled - giving up", roll_index);
            break;
        }
        log_hud(&lane);

        if let FramePhase::FrameFinished(result) = lane.controller.phase() {
            frames_played += 1;
            println!(
                "Frame {}: {}",
                frames_played,
                match result {
                    FrameResult::Won => "cleared",
                    FrameResult::Failed => "pins left standing",
                }
            );

            let button = match result {
                FrameResult::Won => HudAction::NextLevel,
                FrameResult::Failed => HudAction::Restart,
            };
            let action = lane.controller.sink().and_then(|hud| hud.click(button));
            tick(&mut lane, &TickInput { action, ..Default::default() });
        }
    }

    log::info!("Session over after {} ticks", lane.time_ticks);
}

fn log_hud(lane: &LaneState<Hud>) {
    if let Some(hud) = lane.controller.sink() {
        println!("{}", hud);
    }
}
