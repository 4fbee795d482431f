//! Throttled line-of-sight checks.
//!
//! Vision is the most expensive per-agent query, so it runs on a jittered
//! interval instead of every frame. The jitter spreads the checks of a crowd
//! across frames; without it every agent spawned on the same tick would ray
//! test on the same frames forever.

use crate::components::Distance;
use crate::resources::AiSettings;
use crate::scene::SpatialIndex;
use bevy::prelude::*;
use rand::Rng;

use super::Agent;

pub fn update<S: SpatialIndex>(
    agent: &mut Agent,
    target: Vec3,
    dt: f32,
    scene: &S,
    settings: &AiSettings,
) {
    agent.vision_timer -= dt;
    if agent.vision_timer > 0.0 {
        return;
    }
    agent.vision_timer = settings.vision_interval * agent.rng.gen_range(0.9..1.1);

    let eye = agent.position + Vec3::Y * settings.eye_height;
    let torso = target + Vec3::Y * settings.torso_height;
    let offset = torso - eye;
    let distance = offset.length();

    if Distance::new(distance) > Distance::new(settings.engage_distance.get()) {
        agent.target_visible = false;
        return;
    }

    let direction = offset / distance.max(1e-6);
    let blocked = scene
        .query_ray_candidates(eye, direction, distance)
        .iter()
        .any(|obj| obj.aabb.intersects_segment(eye, torso));

    agent.target_visible = !blocked;
}
