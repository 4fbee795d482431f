//! Distance-banded level of detail.
//!
//! The visual bands are consumed by the render layer; the AI only acts on
//! the outermost one. A culled agent accumulates frame time and runs its
//! update on a coarse cadence, with the accumulated step capped so an agent
//! that was culled for a long stretch cannot tunnel through geometry when
//! it finally ticks.

use crate::components::LodLevel;
use crate::resources::AiSettings;
use bevy::prelude::*;

use super::Agent;

pub fn band_for(distance: f32, settings: &AiSettings) -> LodLevel {
    if distance < settings.lod_full_distance {
        LodLevel::Full
    } else if distance < settings.lod_detail_distance {
        LodLevel::NoDetail
    } else if distance < settings.lod_silhouette_distance {
        LodLevel::Silhouette
    } else {
        LodLevel::Culled
    }
}

/// Reclassify the agent and decide whether its AI runs this frame.
///
/// Returns the timestep the update should use, or None when the culled
/// cadence swallows this frame.
pub fn throttled_dt(agent: &mut Agent, viewer: Vec3, dt: f32, settings: &AiSettings) -> Option<f32> {
    agent.lod = band_for(agent.position.distance(viewer), settings);

    if !agent.lod.is_culled() {
        agent.lod_accum = 0.0;
        return Some(dt);
    }

    agent.lod_accum += dt;
    if agent.lod_accum < settings.ai_throttle_interval {
        return None;
    }
    let step = agent.lod_accum.min(settings.ai_throttle_max_step);
    agent.lod_accum = 0.0;
    Some(step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_thresholds() {
        let settings = AiSettings::default();
        assert_eq!(band_for(0.0, &settings), LodLevel::Full);
        assert_eq!(band_for(20.0, &settings), LodLevel::NoDetail);
        assert_eq!(band_for(40.0, &settings), LodLevel::Silhouette);
        assert_eq!(band_for(500.0, &settings), LodLevel::Culled);
    }

    #[test]
    fn test_near_agent_runs_every_frame() {
        let settings = AiSettings::default();
        let mut agent = Agent::new(Vec3::ZERO, 1);

        for _ in 0..10 {
            let step = throttled_dt(&mut agent, Vec3::new(5.0, 0.0, 0.0), 1.0 / 60.0, &settings);
            assert_eq!(step, Some(1.0 / 60.0));
        }
        assert_eq!(agent.lod, LodLevel::Full);
    }

    #[test]
    fn test_culled_agent_ticks_on_cadence() {
        let settings = AiSettings::default();
        let mut agent = Agent::new(Vec3::ZERO, 1);
        let viewer = Vec3::new(200.0, 0.0, 0.0);
        let dt = 0.1;

        let mut ticks = 0;
        let mut skips = 0;
        for _ in 0..40 {
            // Four seconds of coarse frames
            match throttled_dt(&mut agent, viewer, dt, &settings) {
                Some(step) => {
                    ticks += 1;
                    // Each granted step covers the swallowed frames
                    assert!(step >= settings.ai_throttle_interval - 1e-4);
                    assert!(step <= settings.ai_throttle_max_step);
                }
                None => skips += 1,
            }
        }
        assert_eq!(agent.lod, LodLevel::Culled);
        assert_eq!(ticks, 10, "0.4s cadence over 4s");
        assert_eq!(skips, 30);
    }

    #[test]
    fn test_granted_step_is_capped() {
        let settings = AiSettings::default();
        let mut agent = Agent::new(Vec3::ZERO, 1);
        let viewer = Vec3::new(200.0, 0.0, 0.0);

        // One enormous frame while culled
        let step = throttled_dt(&mut agent, viewer, 3.0, &settings);
        assert_eq!(step, Some(settings.ai_throttle_max_step));
    }

    #[test]
    fn test_returning_into_view_resets_the_accumulator() {
        let settings = AiSettings::default();
        let mut agent = Agent::new(Vec3::ZERO, 1);

        assert!(throttled_dt(&mut agent, Vec3::new(200.0, 0.0, 0.0), 0.2, &settings).is_none());
        // Viewer closes in; the banked 0.2s must not inflate this step
        let step = throttled_dt(&mut agent, Vec3::new(5.0, 0.0, 0.0), 1.0 / 60.0, &settings);
        assert_eq!(step, Some(1.0 / 60.0));
        assert_eq!(agent.lod_accum, 0.0);
    }
}
