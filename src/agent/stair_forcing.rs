//! Forced stair traversal.
//!
//! Grid paths route an agent to a stair entry, but close-range steering can
//! still shave the corner and leave the agent grinding against the platform
//! edge below its target. When that happens the agent locks onto a stair
//! pair for a few seconds and walks a staged line through it: a setback
//! point behind the entry, a push through the entry itself, then the far
//! marker once the climb has visibly begun.

use crate::nav::WaypointPair;
use crate::resources::AiSettings;
use crate::scene::horizontal_distance;
use bevy::prelude::*;

use super::Agent;

/// A stair pair the agent is committed to until the lock expires or the far
/// level is reached. Travel direction is fixed at lock time so reaching the
/// destination reads as arrival rather than a reason to turn around.
#[derive(Debug, Clone, Copy)]
pub struct ForcedStair {
    pub pair: WaypointPair,
    pub going_up: bool,
    pub countdown: f32,
}

impl ForcedStair {
    fn destination(&self) -> Vec3 {
        if self.going_up {
            self.pair.top
        } else {
            self.pair.bottom
        }
    }
}

/// Engage, tick and expire the stair lock.
pub fn update(
    agent: &mut Agent,
    target: Vec3,
    dt: f32,
    pairs: &[WaypointPair],
    settings: &AiSettings,
) {
    if let Some(forced) = &mut agent.forced_stair {
        forced.countdown -= dt;
        let destination = forced.destination();
        let arrived = (agent.position.y - destination.y).abs() <= settings.stair_top_tolerance
            && horizontal_distance(agent.position, destination) <= settings.waypoint_reach_distance;
        if forced.countdown <= 0.0 || arrived {
            agent.forced_stair = None;
        }
        return;
    }

    let level_gap = (target.y - agent.position.y).abs();
    if level_gap <= settings.vertical_threshold {
        return;
    }
    let going_up = target.y > agent.position.y;

    // Lock on when the grid gave no route, when the agent is stuck against
    // cross-level geometry, or when it is already close enough to a stair
    // entry that committing beats replanning
    let Some(pair) = select_pair(pairs, agent.position, target, going_up, settings) else {
        return;
    };
    let near = if going_up { pair.bottom } else { pair.top };
    let near_entry = horizontal_distance(agent.position, near) <= settings.stair_approach_distance;

    if !agent.has_path() || agent.is_stuck(settings) || near_entry {
        debug!(
            "Stair lock engaged at {:?} toward {:?}",
            agent.position, near
        );
        agent.forced_stair = Some(ForcedStair {
            pair,
            going_up,
            countdown: settings.stair_lock_time,
        });
        agent.reset_stuck();
    }
}

/// The staged point the locked agent should currently walk toward
pub fn sub_target(agent: &Agent, settings: &AiSettings) -> Option<Vec3> {
    let forced = agent.forced_stair.as_ref()?;
    let pair = &forced.pair;

    let (near, far) = if forced.going_up {
        (pair.bottom, pair.top)
    } else {
        (pair.top, pair.bottom)
    };
    // Direction of travel along the run, flattened
    let axis = pair.axis();
    let dir = if forced.going_up { axis } else { -axis };

    // Past the entry level: head straight for the far marker
    let climbing = if forced.going_up {
        agent.position.y > near.y + 0.25
    } else {
        agent.position.y < near.y - 0.25
    };
    if climbing {
        return Some(far);
    }

    // At the entry: push through it so the stopping radius cannot park the
    // agent on the threshold
    if horizontal_distance(agent.position, near) <= settings.stair_entry_distance {
        return Some(near + dir * settings.stair_push_through);
    }

    // Line up behind the entry before walking in, so the approach never
    // clips the side of the stair geometry
    let approach = near - dir * settings.stair_setback;
    if horizontal_distance(agent.position, approach) <= settings.stair_entry_distance {
        return Some(near);
    }
    Some(approach)
}

/// Pick the pair whose far end matches the target's level and is
/// horizontally closest to it, among pairs whose entry the agent can reach.
fn select_pair(
    pairs: &[WaypointPair],
    position: Vec3,
    target: Vec3,
    going_up: bool,
    settings: &AiSettings,
) -> Option<WaypointPair> {
    let mut best: Option<WaypointPair> = None;
    let mut best_distance = f32::INFINITY;
    for pair in pairs {
        let (near, far) = if going_up {
            (pair.bottom, pair.top)
        } else {
            (pair.top, pair.bottom)
        };
        if (far.y - target.y).abs() > settings.stair_top_tolerance {
            continue;
        }
        if horizontal_distance(position, near) > settings.stair_search_radius {
            continue;
        }
        let distance = horizontal_distance(target, far);
        if distance < best_distance {
            best_distance = distance;
            best = Some(*pair);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> WaypointPair {
        WaypointPair {
            bottom: Vec3::new(10.0, 0.0, 0.0),
            top: Vec3::new(10.0, 4.0, 8.0),
        }
    }

    fn locked_agent(position: Vec3, going_up: bool) -> Agent {
        let mut agent = Agent::new(position, 1);
        agent.forced_stair = Some(ForcedStair {
            pair: pair(),
            going_up,
            countdown: 2.5,
        });
        agent
    }

    #[test]
    fn test_lock_engages_near_entry_when_target_above() {
        let settings = AiSettings::default();
        let mut agent = Agent::new(Vec3::new(10.0, 0.0, -4.0), 1);
        let target = Vec3::new(20.0, 4.0, 8.0);

        update(&mut agent, target, 1.0 / 60.0, &[pair()], &settings);
        assert!(agent.forced_stair.is_some());
        assert!(agent.forced_stair.as_ref().unwrap().going_up);
    }

    #[test]
    fn test_no_lock_when_levels_match() {
        let settings = AiSettings::default();
        let mut agent = Agent::new(Vec3::new(10.0, 0.0, -4.0), 1);
        let target = Vec3::new(20.0, 0.0, 8.0);

        update(&mut agent, target, 1.0 / 60.0, &[pair()], &settings);
        assert!(agent.forced_stair.is_none());
    }

    #[test]
    fn test_no_lock_when_far_and_not_stuck() {
        let settings = AiSettings::default();
        let mut agent = Agent::new(Vec3::new(-40.0, 0.0, 0.0), 1);
        let target = Vec3::new(20.0, 4.0, 8.0);

        update(&mut agent, target, 1.0 / 60.0, &[pair()], &settings);
        assert!(agent.forced_stair.is_none());
    }

    #[test]
    fn test_stuck_agent_locks_from_anywhere_in_radius() {
        let settings = AiSettings::default();
        let mut agent = Agent::new(Vec3::new(-10.0, 0.0, 0.0), 1);
        agent.stuck_accum = settings.stuck_limit;
        let target = Vec3::new(20.0, 4.0, 8.0);

        update(&mut agent, target, 1.0 / 60.0, &[pair()], &settings);
        assert!(agent.forced_stair.is_some());
        assert!(!agent.is_stuck(&settings), "lock resets the stuck state");
    }

    #[test]
    fn test_lock_expires_on_countdown() {
        let settings = AiSettings::default();
        let mut agent = locked_agent(Vec3::new(5.0, 0.0, 0.0), true);
        agent.forced_stair.as_mut().unwrap().countdown = 0.01;

        update(&mut agent, Vec3::new(20.0, 4.0, 8.0), 0.02, &[], &settings);
        assert!(agent.forced_stair.is_none());
    }

    #[test]
    fn test_lock_releases_on_arrival_at_destination() {
        let settings = AiSettings::default();
        let mut agent = locked_agent(Vec3::new(10.0, 4.0, 8.5), true);

        update(&mut agent, Vec3::new(20.0, 4.0, 8.0), 1.0 / 60.0, &[], &settings);
        assert!(agent.forced_stair.is_none());
    }

    #[test]
    fn test_lock_holds_at_the_starting_end() {
        let settings = AiSettings::default();
        // Standing at the bottom entry, going up: not arrival
        let mut agent = locked_agent(Vec3::new(10.0, 0.0, 0.3), true);

        update(&mut agent, Vec3::new(20.0, 4.0, 8.0), 1.0 / 60.0, &[], &settings);
        assert!(agent.forced_stair.is_some());
    }

    #[test]
    fn test_staging_approach_then_entry_then_overshoot() {
        let settings = AiSettings::default();
        let run_axis = Vec3::new(0.0, 0.0, 1.0);
        let approach = Vec3::new(10.0, 0.0, 0.0) - run_axis * settings.stair_setback;

        // Far out: head for the setback point behind the bottom entry
        let agent = locked_agent(Vec3::new(0.0, 0.0, -10.0), true);
        assert_eq!(sub_target(&agent, &settings), Some(approach));

        // At the setback point: head for the entry itself
        let agent = locked_agent(approach + Vec3::new(0.3, 0.0, 0.0), true);
        assert_eq!(
            sub_target(&agent, &settings),
            Some(Vec3::new(10.0, 0.0, 0.0))
        );

        // At the entry: push through it rather than stopping on the threshold
        let agent = locked_agent(Vec3::new(10.0, 0.0, 0.4), true);
        let expected = Vec3::new(10.0, 0.0, 0.0) + run_axis * settings.stair_push_through;
        assert_eq!(sub_target(&agent, &settings), Some(expected));
    }

    #[test]
    fn test_mid_climb_keeps_pushing_to_the_top() {
        let settings = AiSettings::default();
        // Part way up, horizontally far from both markers
        let agent = locked_agent(Vec3::new(10.0, 2.0, 4.0), true);
        assert_eq!(sub_target(&agent, &settings), Some(Vec3::new(10.0, 4.0, 8.0)));
    }

    #[test]
    fn test_descent_stages_mirror_ascent() {
        let settings = AiSettings::default();
        // On the platform, heading down: near end is the top marker
        let agent = locked_agent(Vec3::new(10.0, 4.0, 14.0), false);
        let approach = Vec3::new(10.0, 4.0, 8.0) + Vec3::new(0.0, 0.0, settings.stair_setback);
        assert_eq!(sub_target(&agent, &settings), Some(approach));

        // At the top entry: push down into the stairwell
        let agent = locked_agent(Vec3::new(10.0, 4.0, 8.2), false);
        let expected =
            Vec3::new(10.0, 4.0, 8.0) - Vec3::new(0.0, 0.0, settings.stair_push_through);
        assert_eq!(sub_target(&agent, &settings), Some(expected));
    }
}
