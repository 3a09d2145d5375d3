//! Race state and core simulation types
//!
//! Everything the frame driver mutates lives in [`RaceState`]; there is no
//! module-level mutable state.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::agents::spawn_agents;
use crate::consts::*;
use crate::forward_from_yaw;
use crate::settings::WorldMode;

/// Transmission readout, derived from speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gear {
    Reverse,
    Neutral,
    Drive,
}

impl Gear {
    pub fn from_speed(speed: f32) -> Self {
        if speed > GEAR_THRESHOLD {
            Gear::Drive
        } else if speed < -GEAR_THRESHOLD {
            Gear::Reverse
        } else {
            Gear::Neutral
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Gear::Reverse => 'R',
            Gear::Neutral => 'N',
            Gear::Drive => 'D',
        }
    }
}

/// The player's vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleState {
    /// Signed speed along the heading (units/s), always in [MIN_SPEED, MAX_SPEED]
    pub speed: f32,
    /// Acceleration applied on the last frame
    pub acceleration: f32,
    /// Current steering angle (radians), scaled by speed
    pub steering_angle: f32,
    /// Yaw about +Y (radians)
    pub heading: f32,
    /// Yaw of straight-ahead on this track
    pub base_yaw: f32,
    pub position: Vec3,
    /// Distance covered along the track direction
    pub odometer: f32,
}

impl VehicleState {
    pub fn new(base_yaw: f32) -> Self {
        Self {
            speed: 0.0,
            acceleration: 0.0,
            steering_angle: 0.0,
            heading: base_yaw,
            base_yaw,
            position: Vec3::ZERO,
            odometer: 0.0,
        }
    }

    pub fn gear(&self) -> Gear {
        Gear::from_speed(self.speed)
    }

    /// Multiplicative speed penalty (collisions)
    pub fn scale_speed(&mut self, factor: f32) {
        self.speed = (self.speed * factor).clamp(MIN_SPEED, MAX_SPEED);
    }

    /// Straight-ahead direction of the track
    pub fn track_forward(&self) -> Vec3 {
        forward_from_yaw(self.base_yaw)
    }
}

/// Chase camera, handed to the renderer each frame
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
}

impl Camera {
    pub fn behind(vehicle: &VehicleState) -> Self {
        let mut camera = Self {
            eye: Vec3::ZERO,
            target: Vec3::ZERO,
        };
        camera.follow(vehicle);
        camera
    }

    /// Sit behind and above the vehicle, looking at it
    pub fn follow(&mut self, vehicle: &VehicleState) {
        self.eye = vehicle.position - vehicle.track_forward() * CAMERA_BACK
            + Vec3::Y * CAMERA_HEIGHT;
        self.target = vehicle.position;
    }
}

/// How the non-player agents move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentBehavior {
    /// Opponent cars easing toward lanes and looping the circuit
    LaneFollowing,
    /// Static obstacles pushed past the player by its speed, then recycled
    Recycled,
}

impl AgentBehavior {
    pub fn for_world(world: WorldMode) -> Self {
        match world {
            WorldMode::Circuit => AgentBehavior::LaneFollowing,
            WorldMode::Gauntlet => AgentBehavior::Recycled,
        }
    }

    /// Fixed size of the agent collection
    pub fn count(&self) -> usize {
        match self {
            AgentBehavior::LaneFollowing => OPPONENT_COUNT,
            AgentBehavior::Recycled => OBSTACLE_COUNT,
        }
    }
}

/// An opponent car or obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub position: Vec3,
    /// Lane index in -1..=1 (opponents)
    pub lane: i32,
    /// Scripted forward speed (0 for obstacles)
    pub speed: f32,
    /// Scale factor; obstacles scale their hit box by it
    pub size: f32,
}

impl Agent {
    /// Lateral position this agent steers toward
    pub fn lane_target(&self) -> f32 {
        self.lane as f32 * LANE_WIDTH
    }
}

/// Race progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RacePhase {
    Racing,
    /// All laps done; the clock is stopped and input ignored
    Finished,
}

/// Timer, laps and score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceStats {
    /// Race clock in nominal seconds (fixed increment per frame)
    pub elapsed: f64,
    /// Current lap, 1-based
    pub lap: u32,
    pub total_laps: u32,
    pub score: u32,
    /// Collisions so far
    pub hits: u32,
    pub phase: RacePhase,
}

impl Default for RaceStats {
    fn default() -> Self {
        Self {
            elapsed: 0.0,
            lap: 1,
            total_laps: TOTAL_LAPS,
            score: 0,
            hits: 0,
            phase: RacePhase::Racing,
        }
    }
}

impl RaceStats {
    /// Advance the race clock by one nominal frame
    pub fn advance_clock(&mut self) {
        self.elapsed += NOMINAL_FRAME_SECS;
    }

    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Deduct points, never going below zero
    pub fn deduct_score(&mut self, points: u32) {
        self.score = self.score.saturating_sub(points);
    }
}

/// Complete simulation state, owned by the frame driver
#[derive(Debug, Clone)]
pub struct RaceState {
    pub seed: u64,
    pub world: WorldMode,
    pub behavior: AgentBehavior,
    pub vehicle: VehicleState,
    pub camera: Camera,
    /// Fixed-size; agents are repositioned, never added or removed
    pub agents: Vec<Agent>,
    pub stats: RaceStats,
    pub rng: Pcg32,
}

impl RaceState {
    pub fn new(world: WorldMode, seed: u64) -> Self {
        let behavior = AgentBehavior::for_world(world);
        let base_yaw = match world {
            WorldMode::Circuit => 0.0,
            // The gauntlet road runs toward -Z, obstacles stream toward +Z
            WorldMode::Gauntlet => std::f32::consts::PI,
        };
        let vehicle = VehicleState::new(base_yaw);
        let mut rng = Pcg32::seed_from_u64(seed);
        let agents = spawn_agents(behavior, &vehicle, &mut rng);

        Self {
            seed,
            world,
            behavior,
            camera: Camera::behind(&vehicle),
            vehicle,
            agents,
            stats: RaceStats::default(),
            rng,
        }
    }

    /// Barrier half-width, if this track has barriers
    pub fn barrier_half_width(&self) -> Option<f32> {
        match self.world {
            WorldMode::Circuit => Some(BARRIER_HALF_WIDTH),
            WorldMode::Gauntlet => None,
        }
    }

    /// Whether the world scrolls past a longitudinally fixed vehicle
    pub fn scrolling(&self) -> bool {
        self.behavior == AgentBehavior::Recycled
    }

    /// Serializable view for logging and debugging
    pub fn snapshot(&self) -> RaceSnapshot<'_> {
        RaceSnapshot {
            world: self.world,
            vehicle: &self.vehicle,
            gear: self.vehicle.gear(),
            agents: &self.agents,
            stats: &self.stats,
        }
    }
}

/// Borrowed, serializable summary of a [`RaceState`]
#[derive(Debug, Serialize)]
pub struct RaceSnapshot<'a> {
    pub world: WorldMode,
    pub vehicle: &'a VehicleState,
    pub gear: Gear,
    pub agents: &'a [Agent],
    pub stats: &'a RaceStats,
}
