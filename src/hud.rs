//! HUD text formatting
//!
//! Pure formatting of derived race state for the DOM collaborator.

use serde::Serialize;

use crate::settings::WorldMode;
use crate::sim::{RacePhase, RaceState};

/// Everything the HUD shows for one frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HudSnapshot {
    pub speed: String,
    pub gear: String,
    pub lap_time: String,
    pub lap: String,
    pub score: String,
    /// Lap and time are circuit fields; score is a gauntlet field
    pub world: WorldMode,
    pub finished: bool,
}

impl HudSnapshot {
    pub fn from_state(state: &RaceState) -> Self {
        Self {
            speed: format_speed(state.vehicle.speed),
            gear: state.vehicle.gear().symbol().to_string(),
            lap_time: format_race_time(state.stats.elapsed),
            lap: format!("{}/{}", state.stats.lap, state.stats.total_laps),
            score: state.stats.score.to_string(),
            world: state.world,
            finished: state.stats.phase == RacePhase::Finished,
        }
    }
}

/// Speed rounded half-up, then made absolute
pub fn format_speed(speed: f32) -> String {
    // Halves round toward +inf on both sides of zero: -7.5 reads 7
    let rounded = (speed + 0.5).floor().abs();
    if rounded.is_finite() {
        format!("{}", rounded as u32)
    } else {
        "0".to_string()
    }
}

/// `MM:SS.CC` from seconds
pub fn format_race_time(secs: f64) -> String {
    let secs = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
    let minutes = (secs / 60.0).floor() as u32;
    let seconds = (secs % 60.0).floor() as u32;
    let centis = ((secs % 1.0) * 100.0).floor() as u32;
    format!("{:02}:{:02}.{:02}", minutes, seconds, centis)
}
