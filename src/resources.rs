use crate::config::range_types::*;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Resource, Serialize, Deserialize, Clone, Debug, Default)]
pub struct AiConfig {
    pub settings: AiSettings,
}

/// Every tunable threshold the agent controller reads.
///
/// Defaults are the values the encounter layouts were tuned against; they can
/// be overridden from the persisted config file.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AiSettings {
    // Movement
    pub move_speed: MovementSpeed,
    pub turn_rate: TurnRate,
    pub stopping_distance: f32,
    pub agent_radius: f32,
    pub agent_height: f32,
    pub collision_probe_radius: f32,
    pub step_height: f32,
    pub jump_height: f32,
    pub jump_speed: f32,
    pub jump_cooldown: f32,
    pub gravity: f32,

    // Perception and combat
    pub engage_distance: EngageDistance,
    pub vision_interval: f32,
    pub eye_height: f32,
    pub torso_height: f32,
    pub aim_speed: AimSpeed,
    pub aim_hold_time: f32,
    pub fire_rate: FireRate,
    pub accuracy: Accuracy,
    pub fire_damage: f32,

    // Path planning
    pub replan_interval: f32,
    pub routing_distance: f32,
    pub vertical_threshold: f32,
    pub waypoint_reach_distance: f32,
    pub level_tolerance: f32,

    // Stuck detection
    pub stuck_sample_interval: f32,
    pub stuck_min_movement: f32,
    pub stuck_decay: f32,
    pub stuck_limit: f32,

    // Stair forcing
    pub stair_lock_time: f32,
    pub stair_top_tolerance: f32,
    pub stair_search_radius: f32,
    pub stair_approach_distance: f32,
    pub stair_entry_distance: f32,
    pub stair_setback: f32,
    pub stair_push_through: f32,

    // Level of detail
    pub lod_full_distance: f32,
    pub lod_detail_distance: f32,
    pub lod_silhouette_distance: f32,
    pub ai_throttle_interval: f32,
    pub ai_throttle_max_step: f32,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            move_speed: MovementSpeed::default(),
            turn_rate: TurnRate::default(),
            stopping_distance: 1.5,
            agent_radius: 0.45,
            agent_height: 1.8,
            collision_probe_radius: 3.0,
            step_height: 0.55,
            jump_height: 1.3,
            jump_speed: 7.0,
            jump_cooldown: 1.5,
            gravity: 18.0,

            engage_distance: EngageDistance::default(),
            vision_interval: 0.25,
            eye_height: 1.6,
            torso_height: 1.1,
            aim_speed: AimSpeed::default(),
            aim_hold_time: 0.4,
            fire_rate: FireRate::default(),
            accuracy: Accuracy::default(),
            fire_damage: 8.0,

            replan_interval: 0.6,
            // Deliberately inside engage range: far targets are chased on
            // sight lines, close ones are worth a grid search.
            routing_distance: 25.0,
            vertical_threshold: 1.5,
            // Paths are coarse cell centers, so the reach radius must stay
            // larger than one grid cell.
            waypoint_reach_distance: 2.6,
            level_tolerance: 1.0,

            stuck_sample_interval: 0.25,
            stuck_min_movement: 0.15,
            stuck_decay: 1.0,
            stuck_limit: 3.0,

            stair_lock_time: 2.5,
            stair_top_tolerance: 1.0,
            stair_search_radius: 30.0,
            stair_approach_distance: 6.0,
            // Both must exceed stopping_distance or the staged stair walk
            // stalls just short of its own sub-targets
            stair_entry_distance: 2.0,
            stair_setback: 2.0,
            stair_push_through: 3.0,

            lod_full_distance: 18.0,
            lod_detail_distance: 35.0,
            lod_silhouette_distance: 60.0,
            ai_throttle_interval: 0.4,
            ai_throttle_max_step: 0.5,
        }
    }
}
