//! Touch Racer - A touch-driven arcade driving demo
//!
//! Core modules:
//! - `controls`: Touch gestures to normalized control signals
//! - `sim`: Vehicle physics, scripted agents, collisions, race stats
//! - `hud`: Display formatting for speed, gear, time, lap and score
//! - `driver`: Per-frame sequencing of one simulation step
//! - `renderer`: WebGPU rendering pipeline
//! - `settings`: Variant selection (control scheme, world)

pub mod controls;
pub mod driver;
pub mod hud;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use driver::FrameDriver;
pub use settings::{ControlMode, Settings, WorldMode};

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Largest frame delta fed to the physics (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Nominal per-frame increment of the race clock (roughly 60 fps)
    pub const NOMINAL_FRAME_SECS: f64 = 0.016;

    /// Vehicle speed range (units/s). Negative permits limited reverse.
    pub const MIN_SPEED: f32 = -20.0;
    pub const MAX_SPEED: f32 = 220.0;
    /// Throttle acceleration, doubled when recovering from reverse
    pub const THROTTLE_ACCEL: f32 = 5.0;
    /// Brake deceleration, halved when already reversing
    pub const BRAKE_DECEL: f32 = 10.0;
    /// Rolling deceleration with no pedal input
    pub const COAST_DECEL: f32 = 2.0;
    /// Below this magnitude a coasting vehicle stops dead
    pub const STOP_SNAP_SPEED: f32 = 1.0;
    /// Gear thresholds: above is Drive, below the negative is Reverse
    pub const GEAR_THRESHOLD: f32 = 5.0;

    /// Steering angle at full lock (radians)
    pub const MAX_STEERING: f32 = 0.03;
    /// Speed at which steering reaches full authority
    pub const STEERING_REFERENCE_SPEED: f32 = 50.0;
    /// Yaw applied per radian of steering angle
    pub const HEADING_GAIN: f32 = 2.0;

    /// Chase camera offset behind and above the vehicle
    pub const CAMERA_BACK: f32 = 5.0;
    pub const CAMERA_HEIGHT: f32 = 2.0;

    /// Track layout
    pub const ROAD_HALF_WIDTH: f32 = 10.0;
    pub const BARRIER_HALF_WIDTH: f32 = 8.0;
    pub const BARRIER_SPEED_FACTOR: f32 = 0.7;
    /// Circuit loop length; also one lap of odometer distance
    pub const TRACK_LOOP_LENGTH: f32 = 200.0;
    pub const TOTAL_LAPS: u32 = 3;

    /// Opponent cars (circuit world)
    pub const OPPONENT_COUNT: usize = 3;
    pub const OPPONENT_BASE_SPEED: f32 = 60.0;
    pub const OPPONENT_SPEED_STEP: f32 = 10.0;
    pub const LANE_WIDTH: f32 = 3.0;
    pub const LANE_EASING: f32 = 0.05;
    pub const OPPONENT_HIT_DISTANCE: f32 = 3.0;
    pub const OPPONENT_SPEED_FACTOR: f32 = 0.8;
    pub const OPPONENT_BUMP_BACK: f32 = 5.0;

    /// Obstacles (gauntlet world)
    pub const OBSTACLE_COUNT: usize = 20;
    /// Obstacle displacement per frame per unit of player speed
    pub const OBSTACLE_TIME_SCALE: f32 = 0.02;
    /// Obstacles at or past this distance beyond the player are recycled
    pub const OBSTACLE_PASS_DISTANCE: f32 = 10.0;
    /// Recycled obstacles land in `[-SPAWN_NEAR - SPAWN_DEPTH, -SPAWN_NEAR]`
    pub const OBSTACLE_SPAWN_NEAR: f32 = 50.0;
    pub const OBSTACLE_SPAWN_DEPTH: f32 = 50.0;
    /// Obstacles pushed this far ahead (by reversing) are recycled unscored
    pub const OBSTACLE_FAR_LIMIT: f32 = 150.0;
    /// Lateral spread of obstacle spawns
    pub const OBSTACLE_SPREAD: f32 = 14.0;
    /// The gauntlet car is held inside the obstacle field
    pub const OBSTACLE_FIELD_HALF_WIDTH: f32 = OBSTACLE_SPREAD / 2.0;
    pub const OBSTACLE_HIT_LATERAL: f32 = 1.0;
    pub const OBSTACLE_HIT_LONGITUDINAL: f32 = 2.0;
    pub const OBSTACLE_SPEED_FACTOR: f32 = 0.5;
    pub const OBSTACLE_SCORE_PENALTY: u32 = 5;
}

/// Unit forward vector for a yaw angle about +Y (yaw 0 faces +Z)
#[inline]
pub fn forward_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}

/// Clamp that maps NaN to zero, for values arriving from the host
#[inline]
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}
