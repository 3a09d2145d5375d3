//! Scripted opponents and obstacles
//!
//! The agent collection is allocated once. Leaving the track window never
//! destroys an agent; it is moved back into play instead, which makes the
//! short track feel endless.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{Agent, AgentBehavior, VehicleState};
use crate::consts::*;

/// Create the fixed agent collection for a behavior
pub fn spawn_agents(behavior: AgentBehavior, vehicle: &VehicleState, rng: &mut Pcg32) -> Vec<Agent> {
    let count = behavior.count();
    let mut agents = Vec::with_capacity(count);
    for i in 0..count {
        let agent = match behavior {
            AgentBehavior::LaneFollowing => Agent {
                position: Vec3::new(
                    (rng.random::<f32>() - 0.5) * 4.0,
                    0.0,
                    vehicle.position.z - 20.0 - i as f32 * 15.0,
                ),
                lane: random_lane(rng),
                speed: OPPONENT_BASE_SPEED + i as f32 * OPPONENT_SPEED_STEP,
                size: 1.0,
            },
            AgentBehavior::Recycled => {
                let mut agent = Agent {
                    position: Vec3::ZERO,
                    lane: 0,
                    speed: 0.0,
                    size: 1.0,
                };
                recycle_obstacle(&mut agent, vehicle.position.z, rng);
                // Spread the opening field closer in than later respawns
                agent.position.z = vehicle.position.z - 20.0 - rng.random::<f32>() * 80.0;
                agent
            }
        };
        agents.push(agent);
    }
    agents
}

pub fn random_lane(rng: &mut Pcg32) -> i32 {
    rng.random_range(-1..=1)
}

/// Send an obstacle back up the road with a fresh lateral offset and size
pub fn recycle_obstacle(agent: &mut Agent, player_z: f32, rng: &mut Pcg32) {
    agent.position.x = (rng.random::<f32>() - 0.5) * OBSTACLE_SPREAD;
    agent.position.z = player_z - OBSTACLE_SPAWN_NEAR - rng.random::<f32>() * OBSTACLE_SPAWN_DEPTH;
    agent.size = 0.75 + rng.random::<f32>() * 0.5;
}

/// Move one opponent car: ease toward its lane, drive, loop the circuit
pub fn update_opponent(agent: &mut Agent, player_z: f32, dt: f32, rng: &mut Pcg32) {
    agent.position.x += (agent.lane_target() - agent.position.x) * LANE_EASING;
    agent.position.z += agent.speed * dt;

    let half_loop = TRACK_LOOP_LENGTH / 2.0;
    let relative = agent.position.z - player_z;
    if relative > half_loop {
        agent.position.z -= TRACK_LOOP_LENGTH;
        agent.lane = random_lane(rng);
    } else if relative < -half_loop {
        agent.position.z += TRACK_LOOP_LENGTH;
        agent.lane = random_lane(rng);
    }
}

/// Push one obstacle past the player by the player's speed.
///
/// The displacement is per frame, not per second. Returns true when the
/// obstacle was passed and recycled.
pub fn update_obstacle(agent: &mut Agent, player_z: f32, player_speed: f32, rng: &mut Pcg32) -> bool {
    agent.position.z += player_speed * OBSTACLE_TIME_SCALE;

    let relative = agent.position.z - player_z;
    if relative >= OBSTACLE_PASS_DISTANCE {
        recycle_obstacle(agent, player_z, rng);
        true
    } else {
        if relative < -OBSTACLE_FAR_LIMIT {
            recycle_obstacle(agent, player_z, rng);
        }
        false
    }
}

/// Advance every agent one frame. Returns the number of obstacles passed.
pub fn update_agents(
    behavior: AgentBehavior,
    agents: &mut [Agent],
    vehicle: &VehicleState,
    dt: f32,
    rng: &mut Pcg32,
) -> u32 {
    let player_z = vehicle.position.z;
    let mut passed = 0;
    for agent in agents.iter_mut() {
        match behavior {
            AgentBehavior::LaneFollowing => update_opponent(agent, player_z, dt, rng),
            AgentBehavior::Recycled => {
                if update_obstacle(agent, player_z, vehicle.speed, rng) {
                    passed += 1;
                }
            }
        }
    }
    passed
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(12345)
    }

    fn obstacle_at(z: f32) -> Agent {
        Agent {
            position: Vec3::new(0.0, 0.0, z),
            lane: 0,
            speed: 0.0,
            size: 1.0,
        }
    }

    #[test]
    fn test_opening_grid() {
        let mut rng = rng();
        let vehicle = VehicleState::new(0.0);
        let opponents = spawn_agents(AgentBehavior::LaneFollowing, &vehicle, &mut rng);
        for (i, agent) in opponents.iter().enumerate() {
            assert_eq!(agent.position.z, -20.0 - i as f32 * 15.0);
            assert!(agent.position.x.abs() <= 2.0);
            assert!((-1..=1).contains(&agent.lane));
            assert_eq!(agent.speed, 60.0 + i as f32 * 10.0);
        }

        let obstacles = spawn_agents(AgentBehavior::Recycled, &vehicle, &mut rng);
        assert!(obstacles.iter().all(|a| a.position.z <= -20.0 && a.position.z >= -100.0));
        assert!(obstacles.iter().all(|a| a.position.x.abs() <= OBSTACLE_SPREAD / 2.0));
    }

    #[test]
    fn test_opponent_eases_toward_lane() {
        let mut rng = rng();
        let mut agent = Agent {
            position: Vec3::new(0.0, 0.0, -20.0),
            lane: 1,
            speed: 60.0,
            size: 1.0,
        };
        update_opponent(&mut agent, 0.0, 0.5, &mut rng);
        assert!((agent.position.x - 0.15).abs() < 1e-6);
        assert!((agent.position.z - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_opponent_wraps_by_loop_length() {
        let mut rng = rng();
        let mut agent = Agent {
            position: Vec3::new(3.0, 0.0, 99.0),
            lane: 1,
            speed: 60.0,
            size: 1.0,
        };
        update_opponent(&mut agent, 0.0, 0.1, &mut rng);
        assert!((agent.position.z - (105.0 - 200.0)).abs() < 1e-4);

        // Overtaken opponents come round again ahead of the player
        agent.position.z = 300.0 - 101.0;
        agent.speed = 0.0;
        update_opponent(&mut agent, 300.0, 0.1, &mut rng);
        assert!((agent.position.z - 399.0).abs() < 1e-3);
    }

    #[test]
    fn test_obstacle_pushed_by_player_speed_and_recycled() {
        let mut rng = rng();
        let mut agent = obstacle_at(9.0);
        let passed = update_obstacle(&mut agent, 0.0, 50.0, &mut rng);
        assert!(passed);
        assert!(agent.position.z <= -50.0 && agent.position.z >= -100.0);
    }

    #[test]
    fn test_obstacle_motion_ignores_frame_time() {
        let mut rng = rng();
        let mut agent = obstacle_at(-40.0);
        assert!(!update_obstacle(&mut agent, 0.0, 100.0, &mut rng));
        assert!((agent.position.z + 38.0).abs() < 1e-5);
    }

    #[test]
    fn test_reversing_recycles_without_scoring() {
        let mut rng = rng();
        let mut agent = obstacle_at(-149.9);
        assert!(!update_obstacle(&mut agent, 0.0, -20.0, &mut rng));
        assert!(agent.position.z >= -100.0);
    }

    #[test]
    fn test_update_agents_counts_passes() {
        let mut rng = rng();
        let mut vehicle = VehicleState::new(std::f32::consts::PI);
        vehicle.speed = 50.0;
        let mut agents = vec![obstacle_at(9.0), obstacle_at(-30.0), obstacle_at(9.5)];
        let passed = update_agents(AgentBehavior::Recycled, &mut agents, &vehicle, 0.016, &mut rng);
        assert_eq!(passed, 2);
        assert_eq!(agents.len(), 3);
    }
}
