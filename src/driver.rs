//! Frame driver
//!
//! Owns the race state and turns animation-frame timestamps into one
//! simulation step each. The host calls [`FrameDriver::frame`] and then
//! renders exactly once.

use crate::controls::ControlSignal;
use crate::hud::HudSnapshot;
use crate::settings::Settings;
use crate::sim::{CollisionReport, RacePhase, RaceState, clamp_frame_dt, tick};

pub struct FrameDriver {
    state: RaceState,
    /// Timestamp (ms) of the previous frame; none before the first
    last_time: Option<f64>,
    frames: u64,
}

impl FrameDriver {
    pub fn new(state: RaceState) -> Self {
        Self {
            state,
            last_time: None,
            frames: 0,
        }
    }

    /// Build from settings, seeding from `fallback_seed` when none is configured
    pub fn from_settings(settings: &Settings, fallback_seed: u64) -> Self {
        let seed = settings.seed.unwrap_or(fallback_seed);
        log::info!("Race seed: {}", seed);
        Self::new(RaceState::new(settings.world, seed))
    }

    /// Seconds since the previous frame. The first frame gets 0.
    pub fn frame_delta(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_time {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_time = Some(now_ms);
        clamp_frame_dt(dt)
    }

    /// Run one frame with the latest control signal
    pub fn frame(&mut self, now_ms: f64, control: &ControlSignal) -> HudSnapshot {
        let dt = self.frame_delta(now_ms);
        let was_racing = self.state.stats.phase == RacePhase::Racing;

        let report = tick(&mut self.state, control, dt);
        self.frames += 1;
        log_collisions(&report, &self.state);

        if was_racing && self.state.stats.phase == RacePhase::Finished {
            log::info!(
                "Finished after {} frames with {} hits",
                self.frames,
                self.state.stats.hits
            );
        }

        HudSnapshot::from_state(&self.state)
    }

    /// Start over with a new seed, keeping the world variant
    pub fn restart(&mut self, seed: u64) {
        self.state = RaceState::new(self.state.world, seed);
        self.last_time = None;
        self.frames = 0;
    }

    pub fn state(&self) -> &RaceState {
        &self.state
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

fn log_collisions(report: &CollisionReport, state: &RaceState) {
    if report.barrier {
        log::debug!("Barrier contact at x={:.2}", state.vehicle.position.x);
    }
    for &i in &report.agents_hit {
        log::debug!(
            "Hit agent {} ({:?}), speed now {:.1}, score {}",
            i,
            state.behavior,
            state.vehicle.speed,
            state.stats.score
        );
    }
}
