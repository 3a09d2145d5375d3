//! Collision detection and response
//!
//! A plain linear scan over the fixed agent collection each frame. With at
//! most twenty agents there is no broad phase.

use glam::Vec3;

use super::agents::recycle_obstacle;
use super::state::{Agent, AgentBehavior, RaceState, VehicleState};
use crate::consts::*;

/// What the player ran into this frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionReport {
    /// Indices of agents hit, in scan order
    pub agents_hit: Vec<usize>,
    /// Vehicle scraped a barrier
    pub barrier: bool,
}

impl CollisionReport {
    pub fn is_empty(&self) -> bool {
        self.agents_hit.is_empty() && !self.barrier
    }
}

/// Opponent cars collide on straight-line distance
#[inline]
pub fn opponent_contact(vehicle_pos: Vec3, agent_pos: Vec3) -> bool {
    vehicle_pos.distance(agent_pos) < OPPONENT_HIT_DISTANCE
}

/// Obstacles collide on per-axis overlap, scaled by their size
#[inline]
pub fn obstacle_contact(vehicle_pos: Vec3, agent: &Agent) -> bool {
    (vehicle_pos.x - agent.position.x).abs() < OBSTACLE_HIT_LATERAL * agent.size
        && (vehicle_pos.z - agent.position.z).abs() < OBSTACLE_HIT_LONGITUDINAL * agent.size
}

/// Keep the vehicle between the barriers. Returns true on contact.
pub fn barrier_collision(vehicle: &mut VehicleState, half_width: f32) -> bool {
    if vehicle.position.x.abs() > half_width {
        vehicle.scale_speed(BARRIER_SPEED_FACTOR);
        vehicle.position.x = vehicle.position.x.clamp(-half_width, half_width);
        true
    } else {
        false
    }
}

/// Hold the vehicle inside the obstacle field. No penalty, not a collision.
pub fn keep_in_field(vehicle: &mut VehicleState, half_width: f32) {
    vehicle.position.x = vehicle.position.x.clamp(-half_width, half_width);
}

/// Run every collision check for this frame and apply the responses
pub fn check_collisions(state: &mut RaceState) -> CollisionReport {
    let mut report = CollisionReport::default();

    match state.barrier_half_width() {
        Some(half_width) => report.barrier = barrier_collision(&mut state.vehicle, half_width),
        None => keep_in_field(&mut state.vehicle, OBSTACLE_FIELD_HALF_WIDTH),
    }

    let player_z = state.vehicle.position.z;
    for (i, agent) in state.agents.iter_mut().enumerate() {
        match state.behavior {
            AgentBehavior::LaneFollowing => {
                if opponent_contact(state.vehicle.position, agent.position) {
                    state.vehicle.scale_speed(OPPONENT_SPEED_FACTOR);
                    // Knock the opponent back so the next frame is clear
                    agent.position.z -= OPPONENT_BUMP_BACK;
                    report.agents_hit.push(i);
                }
            }
            AgentBehavior::Recycled => {
                if obstacle_contact(state.vehicle.position, agent) {
                    state.vehicle.scale_speed(OBSTACLE_SPEED_FACTOR);
                    recycle_obstacle(agent, player_z, &mut state.rng);
                    state.stats.deduct_score(OBSTACLE_SCORE_PENALTY);
                    report.agents_hit.push(i);
                }
            }
        }
    }

    let hits = report.agents_hit.len() as u32 + u32::from(report.barrier);
    state.stats.hits = state.stats.hits.saturating_add(hits);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::WorldMode;

    fn circuit_with_opponent_at(pos: Vec3) -> RaceState {
        let mut state = RaceState::new(WorldMode::Circuit, 42);
        for agent in &mut state.agents {
            agent.position = Vec3::new(0.0, 0.0, -80.0);
        }
        state.agents[0].position = pos;
        state
    }

    fn gauntlet_with_obstacle_at(pos: Vec3) -> RaceState {
        let mut state = RaceState::new(WorldMode::Gauntlet, 42);
        for agent in &mut state.agents {
            agent.position = Vec3::new(0.0, 0.0, -80.0);
            agent.size = 1.0;
        }
        state.agents[0].position = pos;
        state
    }

    #[test]
    fn test_barrier_clamps_and_slows() {
        let mut state = circuit_with_opponent_at(Vec3::new(0.0, 0.0, -80.0));
        state.vehicle.position.x = 9.0;
        state.vehicle.speed = 100.0;

        let report = check_collisions(&mut state);
        assert!(report.barrier);
        assert_eq!(state.vehicle.position.x, 8.0);
        assert!((state.vehicle.speed - 70.0).abs() < 1e-4);
    }

    #[test]
    fn test_no_barrier_on_open_road() {
        let mut state = gauntlet_with_obstacle_at(Vec3::new(0.0, 0.0, -80.0));
        state.vehicle.position.x = 9.0;
        state.vehicle.speed = 100.0;

        let report = check_collisions(&mut state);
        assert!(report.is_empty());
        assert_eq!(state.vehicle.speed, 100.0);
        // Held at the edge of the obstacle field instead
        assert_eq!(state.vehicle.position.x, OBSTACLE_FIELD_HALF_WIDTH);
    }

    #[test]
    fn test_cannot_dodge_around_obstacle_field() {
        let mut state = gauntlet_with_obstacle_at(Vec3::new(7.0, 0.0, 0.5));
        state.vehicle.position.x = -30.0;
        check_collisions(&mut state);
        assert_eq!(state.vehicle.position.x, -OBSTACLE_FIELD_HALF_WIDTH);

        // Obstacles at the field edge stay reachable
        state.vehicle.position.x = 30.0;
        let report = check_collisions(&mut state);
        assert_eq!(report.agents_hit, vec![0]);
    }

    #[test]
    fn test_opponent_hit_slows_and_bumps_back() {
        let mut state = circuit_with_opponent_at(Vec3::new(1.0, 0.0, 2.0));
        state.vehicle.speed = 100.0;

        let report = check_collisions(&mut state);
        assert_eq!(report.agents_hit, vec![0]);
        assert!((state.vehicle.speed - 80.0).abs() < 1e-4);
        assert_eq!(state.agents[0].position.z, -3.0);
        assert_eq!(state.stats.hits, 1);

        // Bumped clear: no repeat hit next frame
        assert!(check_collisions(&mut state).is_empty());
    }

    #[test]
    fn test_opponent_at_threshold_misses() {
        assert!(!opponent_contact(Vec3::ZERO, Vec3::new(0.0, 0.0, 3.0)));
        assert!(opponent_contact(Vec3::ZERO, Vec3::new(0.0, 0.0, 2.99)));
    }

    #[test]
    fn test_obstacle_hit_penalizes_speed_and_score() {
        let mut state = gauntlet_with_obstacle_at(Vec3::new(0.5, 0.0, -1.5));
        state.vehicle.speed = 60.0;
        state.stats.score = 7;

        let report = check_collisions(&mut state);
        assert_eq!(report.agents_hit, vec![0]);
        assert!((state.vehicle.speed - 30.0).abs() < 1e-4);
        assert_eq!(state.stats.score, 2);
        assert!(state.agents[0].position.z <= -50.0);
    }

    #[test]
    fn test_score_floors_at_zero() {
        let mut state = gauntlet_with_obstacle_at(Vec3::new(0.0, 0.0, 0.0));
        state.stats.score = 3;
        state.vehicle.speed = 10.0;
        check_collisions(&mut state);
        assert_eq!(state.stats.score, 0);

        state.agents[0].position = Vec3::ZERO;
        state.agents[0].size = 1.0;
        check_collisions(&mut state);
        assert_eq!(state.stats.score, 0);
    }

    #[test]
    fn test_obstacle_size_scales_hit_box() {
        let mut agent = Agent {
            position: Vec3::new(1.1, 0.0, 0.0),
            lane: 0,
            speed: 0.0,
            size: 1.0,
        };
        assert!(!obstacle_contact(Vec3::ZERO, &agent));
        agent.size = 1.2;
        assert!(obstacle_contact(Vec3::ZERO, &agent));
    }

    #[test]
    fn test_hits_always_reduce_speed() {
        for speed in [1.0f32, 35.0, 220.0, -20.0] {
            let mut state = circuit_with_opponent_at(Vec3::ZERO);
            state.vehicle.speed = speed;
            check_collisions(&mut state);
            assert!(state.vehicle.speed.abs() < speed.abs());
        }
    }
}
