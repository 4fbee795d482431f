//! Per-agent navigation and combat controller.
//!
//! One `update` call per agent per frame drives the whole pipeline:
//! LOD throttling, throttled perception, path replanning, stair handling,
//! movement resolution and the aim/fire loop. Every stochastic decision
//! draws from the agent's own seeded generator, so a simulation replayed
//! with the same seeds and timesteps produces the same world.

use crate::components::{FireOutcome, LodLevel, MotionState};
use crate::nav::NavGrid;
use crate::resources::AiSettings;
use crate::scene::{GroundHeight, SpatialIndex, horizontal_distance};
use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

pub mod combat;
pub mod lod;
pub mod movement;
pub mod perception;
pub mod stair_forcing;

pub use stair_forcing::ForcedStair;

#[derive(Component)]
pub struct Agent {
    pub position: Vec3,
    pub yaw: f32,
    pub motion: MotionState,
    pub lod: LodLevel,
    pub target_visible: bool,

    path: Vec<Vec3>,
    path_cursor: usize,
    replan_timer: f32,
    vision_timer: f32,

    aiming: bool,
    aim_progress: f32,
    aim_hold: f32,
    fire_timer: f32,

    stuck_sample_timer: f32,
    stuck_accum: f32,
    last_sample_position: Vec3,
    wants_move: bool,

    forced_stair: Option<ForcedStair>,
    jump_cooldown: f32,
    lod_accum: f32,

    rng: Pcg32,
}

impl Agent {
    pub fn new(position: Vec3, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        // Stagger the first vision check so a wave spawned on one frame
        // does not ray test in lockstep
        let vision_timer = rng.gen_range(0.0..0.25);
        Self {
            position,
            yaw: 0.0,
            motion: MotionState::Grounded,
            lod: LodLevel::Full,
            target_visible: false,
            path: Vec::new(),
            path_cursor: 0,
            replan_timer: 0.0,
            vision_timer,
            aiming: false,
            aim_progress: 0.0,
            aim_hold: 0.0,
            fire_timer: 0.0,
            stuck_sample_timer: 0.0,
            stuck_accum: 0.0,
            last_sample_position: position,
            wants_move: false,
            forced_stair: None,
            jump_cooldown: 0.0,
            lod_accum: 0.0,
            rng,
        }
    }

    /// Advance the agent by one frame against a static scene.
    ///
    /// `target` is the position the agent hunts; the returned outcome says
    /// whether a shot was fired this frame and whether it connected.
    pub fn update<S: SpatialIndex + GroundHeight>(
        &mut self,
        target: Vec3,
        dt: f32,
        scene: &S,
        nav: &mut NavGrid,
        settings: &AiSettings,
    ) -> FireOutcome {
        let Some(dt) = lod::throttled_dt(self, target, dt, settings) else {
            return FireOutcome::idle();
        };

        perception::update(self, target, dt, scene, settings);
        self.update_stuck(dt, settings);
        self.update_replan(target, dt, scene, nav, settings);
        // After replanning, so a failed search this frame can fall through
        // to the stair lock immediately
        stair_forcing::update(self, target, dt, nav.waypoint_pairs(), settings);

        let move_target = self.select_move_target(target, settings);
        movement::resolve(self, move_target, target, dt, scene, settings);

        combat::update(self, target, dt, settings)
    }

    pub fn has_path(&self) -> bool {
        self.path_cursor < self.path.len()
    }

    pub fn current_waypoint(&self) -> Option<Vec3> {
        self.path.get(self.path_cursor).copied()
    }

    pub fn is_stuck(&self, settings: &AiSettings) -> bool {
        self.stuck_accum >= settings.stuck_limit
    }

    fn reset_stuck(&mut self) {
        self.stuck_accum = 0.0;
        self.last_sample_position = self.position;
    }

    /// Sampled displacement check. Samples are jittered for the same reason
    /// vision checks are, and the accumulator decays so one bump against a
    /// corner does not linger as a permanent verdict.
    fn update_stuck(&mut self, dt: f32, settings: &AiSettings) {
        self.stuck_sample_timer -= dt;
        if self.stuck_sample_timer > 0.0 {
            return;
        }
        self.stuck_sample_timer = settings.stuck_sample_interval * self.rng.gen_range(0.85..1.15);

        let moved = self.position.distance(self.last_sample_position);
        if self.wants_move && moved < settings.stuck_min_movement {
            self.stuck_accum += 1.0;
        } else {
            self.stuck_accum = (self.stuck_accum - settings.stuck_decay).max(0.0);
        }
        self.last_sample_position = self.position;
    }

    /// Decide whether this frame spends a grid search.
    ///
    /// A visible, roughly level target is chased on the straight line and
    /// never costs a search. Otherwise searches run on a jittered interval,
    /// and only when something suggests the straight line is wrong: a level
    /// gap, a stuck verdict, or a target close enough for routing detail to
    /// matter.
    fn update_replan<S: GroundHeight>(
        &mut self,
        target: Vec3,
        dt: f32,
        scene: &S,
        nav: &mut NavGrid,
        settings: &AiSettings,
    ) {
        if self.forced_stair.is_some() {
            return;
        }
        if self.target_visible && (target.y - self.position.y).abs() <= settings.level_tolerance {
            self.path.clear();
            self.path_cursor = 0;
            return;
        }

        self.replan_timer -= dt;
        if self.replan_timer > 0.0 {
            return;
        }
        self.replan_timer = settings.replan_interval * self.rng.gen_range(0.85..1.15);

        let cross_level = (target.y - self.position.y).abs() > settings.vertical_threshold;
        let stuck = self.is_stuck(settings);
        let near = horizontal_distance(self.position, target) <= settings.routing_distance;
        if !(cross_level || stuck || near) {
            return;
        }

        let goal = Vec3::new(target.x, scene.height_at(target.x, target.z), target.z);
        let path = nav.find_path(self.position, goal);
        if path.is_empty() {
            // Keep following the stale path rather than standing still
            debug!(
                "Replan from {:?} found no path, keeping {} stale waypoints",
                self.position,
                self.path.len().saturating_sub(self.path_cursor)
            );
        } else {
            self.path = path;
            self.path_cursor = 0;
        }
        if stuck {
            self.reset_stuck();
        }
    }

    /// Pick the point movement should steer toward this frame, in priority
    /// order: stair lock stages, direct chase, path waypoints, then the raw
    /// target as a last resort.
    fn select_move_target(&mut self, target: Vec3, settings: &AiSettings) -> Option<Vec3> {
        if let Some(staged) = stair_forcing::sub_target(self, settings) {
            return Some(staged);
        }
        if self.target_visible && (target.y - self.position.y).abs() <= settings.level_tolerance {
            return Some(target);
        }

        while self.path_cursor < self.path.len()
            && horizontal_distance(self.position, self.path[self.path_cursor])
                <= settings.waypoint_reach_distance
        {
            self.path_cursor += 1;
        }
        if let Some(waypoint) = self.path.get(self.path_cursor) {
            return Some(*waypoint);
        }

        Some(target)
    }
}
