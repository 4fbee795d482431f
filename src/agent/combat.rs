//! Aim ramp and trigger discipline.
//!
//! Sighting the target starts the aim immediately; the hold timer works the
//! other way, keeping the aim alive through single occluded frames so a
//! doorway flicker does not reset the ramp. Shots are still gated on the
//! ramp passing a threshold, so a fresh sighting never lands an instant hit.

use crate::components::{Damage, FireOutcome};
use crate::resources::AiSettings;
use bevy::prelude::*;
use rand::Rng;

use super::Agent;

/// Aim progress required before shots are released
const AIM_FIRE_THRESHOLD: f32 = 0.7;

pub fn update(agent: &mut Agent, target: Vec3, dt: f32, settings: &AiSettings) -> FireOutcome {
    agent.fire_timer = (agent.fire_timer - dt).max(0.0);

    if agent.target_visible {
        agent.aiming = true;
        agent.aim_hold = settings.aim_hold_time;
    } else {
        agent.aim_hold = (agent.aim_hold - dt).max(0.0);
        if agent.aim_hold <= 0.0 {
            agent.aiming = false;
        }
    }

    if !agent.aiming {
        agent.aim_progress = (agent.aim_progress - settings.aim_speed.get() * dt).max(0.0);
        return FireOutcome::idle();
    }
    agent.aim_progress = (agent.aim_progress + settings.aim_speed.get() * dt).min(1.0);

    if agent.aim_progress < AIM_FIRE_THRESHOLD || agent.fire_timer > 0.0 {
        return FireOutcome::idle();
    }

    agent.fire_timer = 1.0 / settings.fire_rate.get();

    let distance = agent.position.distance(target);
    let engage = settings.engage_distance.get();
    // Linear falloff with a floor, so point-blank shots are twice as likely
    // to land as shots at the edge of the engage range
    let distance_factor = (1.0 - 0.5 * distance / engage).max(0.5);
    let chance = settings.accuracy.get() * distance_factor;
    let hit = agent.rng.gen_range(0.0..1.0) < chance;

    FireOutcome {
        fired: true,
        hit,
        damage: if hit {
            Damage::new(settings.fire_damage)
        } else {
            Damage::ZERO
        },
    }
}
