//! Simulation module
//!
//! All gameplay logic lives here, free of rendering and DOM dependencies:
//! - Variable timestep from the frame driver, clamped and NaN-safe
//! - Seeded RNG only
//! - Fixed-size agent collection, recycled rather than reallocated

pub mod agents;
pub mod collision;
pub mod state;
pub mod tick;
pub mod vehicle;

pub use collision::{CollisionReport, check_collisions};
pub use state::{
    Agent, AgentBehavior, Camera, Gear, RacePhase, RaceSnapshot, RaceState, RaceStats,
    VehicleState,
};
pub use tick::{clamp_frame_dt, tick};
