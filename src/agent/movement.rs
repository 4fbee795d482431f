//! Collision-aware movement integration.
//!
//! Horizontal motion is resolved one axis at a time so a blocked diagonal
//! slides along the wall instead of sticking. Obstacles below the step band
//! are walked onto, obstacles inside the jump band trigger a jump, anything
//! taller rejects the axis. Vertical motion is asymmetric: rising ground
//! snaps the agent up instantly, but drops hand the agent to gravity.

use crate::components::{MotionState, Speed};
use crate::resources::AiSettings;
use crate::scene::{Aabb, GroundHeight, SceneKind, SpatialIndex, horizontal_distance};
use bevy::prelude::*;

use super::Agent;

/// Normalize an angle into (-PI, PI]
pub fn wrap_angle(angle: f32) -> f32 {
    let mut a = angle % std::f32::consts::TAU;
    if a > std::f32::consts::PI {
        a -= std::f32::consts::TAU;
    } else if a <= -std::f32::consts::PI {
        a += std::f32::consts::TAU;
    }
    a
}

/// Rotate `current` toward `desired` by at most `max_step`, along the
/// shorter arc
pub fn turn_toward(current: f32, desired: f32, max_step: f32) -> f32 {
    let delta = wrap_angle(desired - current);
    wrap_angle(current + delta.clamp(-max_step, max_step))
}

fn body_aabb(position: Vec3, settings: &AiSettings) -> Aabb {
    Aabb::from_center_half_extents(
        position + Vec3::Y * (settings.agent_height / 2.0),
        Vec3::new(
            settings.agent_radius,
            settings.agent_height / 2.0,
            settings.agent_radius,
        ),
    )
}

pub fn resolve<S: SpatialIndex + GroundHeight>(
    agent: &mut Agent,
    move_target: Option<Vec3>,
    target: Vec3,
    dt: f32,
    scene: &S,
    settings: &AiSettings,
) {
    agent.jump_cooldown = (agent.jump_cooldown - dt).max(0.0);

    let mut intent = Vec3::ZERO;
    if let Some(goal) = move_target {
        if horizontal_distance(agent.position, goal) > settings.stopping_distance {
            let direction =
                Vec3::new(goal.x - agent.position.x, 0.0, goal.z - agent.position.z)
                    .normalize_or_zero();
            intent = direction * Speed::new(settings.move_speed.get()) * dt;
        }
    }
    agent.wants_move = intent != Vec3::ZERO;

    if intent.x != 0.0 {
        try_axis(agent, Vec3::new(intent.x, 0.0, 0.0), scene, settings);
    }
    if intent.z != 0.0 {
        try_axis(agent, Vec3::new(0.0, 0.0, intent.z), scene, settings);
    }

    resolve_vertical(agent, dt, scene, settings);

    // Face the target while aiming at it, otherwise face the direction of
    // travel. An idle agent holds its heading.
    let facing = if agent.aiming {
        Vec3::new(target.x - agent.position.x, 0.0, target.z - agent.position.z)
    } else {
        intent
    };
    if facing.length_squared() > 1e-6 {
        let desired = facing.x.atan2(facing.z);
        agent.yaw = turn_toward(agent.yaw, desired, settings.turn_rate.get() * dt);
    }
}

fn try_axis<S: SpatialIndex>(agent: &mut Agent, step: Vec3, scene: &S, settings: &AiSettings) {
    let candidate = agent.position + step;
    let body = body_aabb(candidate, settings);

    let nearby = scene.query_nearby(agent.position, settings.collision_probe_radius);
    // Stairs read as solid to sight but are a ramp to feet
    let hit = nearby
        .iter()
        .find(|obj| !matches!(obj.kind, SceneKind::Stairs) && obj.aabb.intersects(&body));
    let Some(hit) = hit else {
        agent.position = candidate;
        return;
    };

    let clearance = hit.aabb.max.y - agent.position.y;
    if clearance <= settings.step_height {
        // Step band: take the move if the body fits on top of the ledge.
        // Lift slightly past the ledge top; an exact lift can still read as
        // overlapping after f32 rounding.
        let lifted = body_aabb(candidate + Vec3::Y * (clearance + 0.01), settings);
        if !nearby
            .iter()
            .any(|obj| !matches!(obj.kind, SceneKind::Stairs) && obj.aabb.intersects(&lifted))
        {
            agent.position = candidate;
        }
        return;
    }

    if clearance <= settings.jump_height
        && agent.motion.is_grounded()
        && agent.jump_cooldown <= 0.0
    {
        // Jump band: launch only if the body will actually fit above the
        // obstacle, then clear it on later frames once airborne height
        // exceeds its top
        let lifted = body_aabb(candidate + Vec3::Y * (clearance + 0.01), settings);
        if !nearby
            .iter()
            .any(|obj| !matches!(obj.kind, SceneKind::Stairs) && obj.aabb.intersects(&lifted))
        {
            agent.motion = MotionState::Airborne {
                vertical_velocity: settings.jump_speed,
            };
            agent.jump_cooldown = settings.jump_cooldown;
        }
    }
    // Axis rejected; the other axis may still slide
}

fn resolve_vertical<S: GroundHeight>(agent: &mut Agent, dt: f32, scene: &S, settings: &AiSettings) {
    let ground = scene.height_at(agent.position.x, agent.position.z);

    match agent.motion {
        MotionState::Grounded => {
            if ground >= agent.position.y {
                agent.position.y = ground;
            } else {
                // Any drop falls under gravity; only rising ground snaps
                agent.motion = MotionState::Airborne {
                    vertical_velocity: 0.0,
                };
            }
        }
        MotionState::Airborne { vertical_velocity } => {
            let velocity = vertical_velocity - settings.gravity * dt;
            agent.position.y += velocity * dt;
            if velocity <= 0.0 && agent.position.y <= ground {
                agent.position.y = ground;
                agent.motion = MotionState::Grounded;
            } else {
                agent.motion = MotionState::Airborne {
                    vertical_velocity: velocity,
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{SceneObject, StaticSceneIndex};

    const DT: f32 = 1.0 / 60.0;

    fn step(agent: &mut Agent, goal: Vec3, scene: &StaticSceneIndex, settings: &AiSettings) {
        resolve(agent, Some(goal), goal, DT, scene, settings);
    }

    #[test]
    fn test_wrap_angle_range() {
        use std::f32::consts::PI;
        assert_eq!(wrap_angle(0.0), 0.0);
        assert!((wrap_angle(3.0 * PI).abs() - PI).abs() < 1e-5);
        assert!((wrap_angle(-3.0 * PI).abs() - PI).abs() < 1e-5);
        assert!((wrap_angle(2.5 * PI) - 0.5 * PI).abs() < 1e-5);
        assert!((wrap_angle(-2.5 * PI) + 0.5 * PI).abs() < 1e-5);
        assert!(wrap_angle(PI) > 0.0);
    }

    #[test]
    fn test_turn_takes_shorter_arc() {
        use std::f32::consts::PI;
        // From just below +PI to just above -PI: the short way crosses the seam
        let current = PI - 0.1;
        let desired = -PI + 0.1;
        let turned = turn_toward(current, desired, 0.05);
        assert!(turned > current || turned <= -PI + 0.2);
        assert!((wrap_angle(turned - current).abs() - 0.05).abs() < 1e-5);
    }

    #[test]
    fn test_open_floor_walk_converges() {
        let scene = StaticSceneIndex::new(Vec::new());
        let settings = AiSettings::default();
        let mut agent = Agent::new(Vec3::ZERO, 1);
        let goal = Vec3::new(10.0, 0.0, 4.0);

        for _ in 0..600 {
            step(&mut agent, goal, &scene, &settings);
        }
        assert!(horizontal_distance(agent.position, goal) <= settings.stopping_distance + 0.2);
        assert!(agent.motion.is_grounded());
        assert_eq!(agent.position.y, 0.0);
    }

    #[test]
    fn test_stops_inside_stopping_distance() {
        let scene = StaticSceneIndex::new(Vec::new());
        let settings = AiSettings::default();
        let mut agent = Agent::new(Vec3::new(9.0, 0.0, 0.0), 1);
        let goal = Vec3::new(10.0, 0.0, 0.0);

        step(&mut agent, goal, &scene, &settings);
        assert!(!agent.wants_move);
        assert_eq!(agent.position, Vec3::new(9.0, 0.0, 0.0));
    }

    #[test]
    fn test_axis_split_slides_along_wall() {
        // Wall blocking +X, open toward +Z
        let scene = StaticSceneIndex::new(vec![SceneObject::obstacle(Aabb::new(
            Vec3::new(2.0, 0.0, -20.0),
            Vec3::new(3.0, 3.0, 20.0),
        ))]);
        let settings = AiSettings::default();
        let mut agent = Agent::new(Vec3::new(1.4, 0.0, 0.0), 1);
        let goal = Vec3::new(10.0, 0.0, 10.0);

        let start_x = agent.position.x;
        for _ in 0..120 {
            step(&mut agent, goal, &scene, &settings);
        }
        assert!(agent.position.x - start_x < 0.3, "x axis must stay blocked");
        assert!(agent.position.z > 3.0, "z axis must keep sliding");
    }

    #[test]
    fn test_step_band_walks_onto_ledge() {
        let scene = StaticSceneIndex::new(vec![SceneObject::obstacle(Aabb::new(
            Vec3::new(2.0, 0.0, -5.0),
            Vec3::new(8.0, 0.4, 5.0), // Below the 0.55 step band
        ))]);
        let settings = AiSettings::default();
        let mut agent = Agent::new(Vec3::ZERO, 1);
        let goal = Vec3::new(5.0, 0.0, 0.0);

        for _ in 0..240 {
            step(&mut agent, goal, &scene, &settings);
        }
        assert!(agent.position.x > 2.0, "must walk onto the low ledge");
        assert_eq!(agent.position.y, 0.4, "ground snap lifts to the ledge top");
    }

    #[test]
    fn test_jump_band_launches_over_obstacle() {
        let scene = StaticSceneIndex::new(vec![SceneObject::obstacle(Aabb::new(
            Vec3::new(3.0, 0.0, -5.0),
            Vec3::new(4.0, 1.0, 5.0), // Above step band, inside jump band
        ))]);
        let settings = AiSettings::default();
        let mut agent = Agent::new(Vec3::ZERO, 1);
        let goal = Vec3::new(10.0, 0.0, 0.0);

        let mut went_airborne = false;
        for _ in 0..600 {
            step(&mut agent, goal, &scene, &settings);
            went_airborne |= !agent.motion.is_grounded();
        }
        assert!(went_airborne, "jump band must trigger a launch");
        assert!(
            agent.position.x > 4.5,
            "agent must end up past the obstacle, got {}",
            agent.position.x
        );
    }

    #[test]
    fn test_tall_wall_rejects_axis() {
        let scene = StaticSceneIndex::new(vec![SceneObject::obstacle(Aabb::new(
            Vec3::new(3.0, 0.0, -20.0),
            Vec3::new(4.0, 5.0, 20.0),
        ))]);
        let settings = AiSettings::default();
        let mut agent = Agent::new(Vec3::ZERO, 1);
        let goal = Vec3::new(10.0, 0.0, 0.0);

        for _ in 0..300 {
            step(&mut agent, goal, &scene, &settings);
        }
        assert!(agent.position.x < 3.0);
        assert!(agent.motion.is_grounded());
    }

    #[test]
    fn test_ledge_drop_is_gravity_limited() {
        // Start standing on a platform, goal off its edge
        let scene = StaticSceneIndex::with_base_height(
            vec![SceneObject::ground(Aabb::new(
                Vec3::new(-5.0, 0.0, -5.0),
                Vec3::new(2.0, 3.0, 5.0),
            ))],
            0.0,
        );
        let settings = AiSettings::default();
        let mut agent = Agent::new(Vec3::new(0.0, 3.0, 0.0), 1);
        let goal = Vec3::new(10.0, 0.0, 0.0);

        step(&mut agent, goal, &scene, &settings);
        // Walking off the edge takes a few frames; once off, the fall must
        // pass through the air instead of snapping straight down
        let mut saw_airborne = false;
        for _ in 0..600 {
            step(&mut agent, goal, &scene, &settings);
            if !agent.motion.is_grounded() {
                saw_airborne = true;
            }
        }
        assert!(saw_airborne);
        assert!(agent.motion.is_grounded());
        assert_eq!(agent.position.y, 0.0);
    }

    #[test]
    fn test_sub_step_drop_falls_instead_of_teleporting() {
        // A ledge low enough to step up onto still drops under gravity on
        // the way down
        let scene = StaticSceneIndex::with_base_height(
            vec![SceneObject::ground(Aabb::new(
                Vec3::new(-5.0, 0.0, -5.0),
                Vec3::new(2.0, 0.4, 5.0),
            ))],
            0.0,
        );
        let settings = AiSettings::default();
        let mut agent = Agent::new(Vec3::new(0.0, 0.4, 0.0), 1);
        let goal = Vec3::new(10.0, 0.0, 0.0);

        let mut saw_partial_descent = false;
        for _ in 0..600 {
            step(&mut agent, goal, &scene, &settings);
            if agent.position.y > 0.0 && agent.position.y < 0.4 {
                saw_partial_descent = true;
            }
        }
        assert!(saw_partial_descent, "descent must pass through the air");
        assert!(agent.motion.is_grounded());
        assert_eq!(agent.position.y, 0.0);
    }

    #[test]
    fn test_rising_ground_snaps_instantly() {
        let scene = StaticSceneIndex::new(vec![SceneObject::stairs(Aabb::new(
            Vec3::new(1.0, 0.0, -2.0),
            Vec3::new(5.0, 2.0, 2.0),
        ))]);
        let settings = AiSettings::default();
        let mut agent = Agent::new(Vec3::ZERO, 1);
        let goal = Vec3::new(3.0, 2.0, 0.0);

        for _ in 0..120 {
            step(&mut agent, goal, &scene, &settings);
        }
        // Stairs never block and their top is the ground sample, so the
        // agent rides up without ever going airborne
        assert!(agent.position.x > 1.0);
        assert_eq!(agent.position.y, 2.0);
        assert!(agent.motion.is_grounded());
    }

    #[test]
    fn test_yaw_turns_toward_travel() {
        let scene = StaticSceneIndex::new(Vec::new());
        let settings = AiSettings::default();
        let mut agent = Agent::new(Vec3::ZERO, 1);
        let goal = Vec3::new(0.0, 0.0, 10.0); // Straight down +Z

        for _ in 0..120 {
            step(&mut agent, goal, &scene, &settings);
        }
        assert!(agent.yaw.abs() < 0.05, "yaw should settle on +Z, got {}", agent.yaw);
    }
}
