//! Stair waypoint pairing and the vertical-goal rewrite.
//!
//! The grid search is flat; elevation changes are expressed as pairs of
//! entry markers at the bottom and top of each stair run. When a query
//! spans levels the goal is rewritten to the near end of the best pair, so
//! the flat search routes the agent to the stairs and the movement layer
//! walks it up or down from there.

use crate::scene::{SceneKind, SceneObject, StairEnd, horizontal_distance};
use bevy::prelude::*;

/// How close (in Y) a goal must be to a pair's far end for the pair to
/// count as serving that goal.
const TOP_Y_TOLERANCE: f32 = 1.25;

/// Horizontal radius around the entrance marker inside which the requester
/// counts as already committed to the stairs.
const ENTRY_RADIUS: f32 = 3.0;

/// Bottom and top entry points of one stair run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaypointPair {
    pub bottom: Vec3,
    pub top: Vec3,
}

impl WaypointPair {
    /// Unit direction along the run, bottom to top, flattened to the
    /// ground plane. Zero when the markers stack vertically.
    pub fn axis(&self) -> Vec3 {
        let delta = Vec3::new(self.top.x - self.bottom.x, 0.0, self.top.z - self.bottom.z);
        delta.normalize_or_zero()
    }
}

/// Collect waypoint markers from the scene into bottom/top pairs.
///
/// Markers share a `pair_id`; a pair missing either end is skipped with a
/// warning rather than failing the bake. Output order follows the scene
/// order of the bottom markers, so repeated bakes of the same scene pair
/// identically.
pub fn pair_waypoints(objects: &[SceneObject]) -> Vec<WaypointPair> {
    let mut pairs = Vec::new();
    let mut matched = Vec::new();

    for obj in objects {
        let SceneKind::Waypoint {
            end: StairEnd::Bottom,
            pair_id,
        } = obj.kind
        else {
            continue;
        };

        let top = objects.iter().find(|other| {
            matches!(
                other.kind,
                SceneKind::Waypoint { end: StairEnd::Top, pair_id: other_id } if other_id == pair_id
            )
        });

        match top {
            Some(top) => {
                pairs.push(WaypointPair {
                    bottom: obj.position(),
                    top: top.position(),
                });
                matched.push(pair_id);
            }
            None => warn!("Stair waypoint pair {pair_id} has no top marker, skipping"),
        }
    }

    for obj in objects {
        if let SceneKind::Waypoint {
            end: StairEnd::Top,
            pair_id,
        } = obj.kind
        {
            if !matched.contains(&pair_id) {
                warn!("Stair waypoint pair {pair_id} has no bottom marker, skipping");
            }
        }
    }

    pairs
}

/// Rewrite a cross-level goal to a stair entry.
///
/// Picks the pair whose goal-side end is horizontally closest to the goal,
/// and uses it only when that end plausibly serves the goal: same level
/// within tolerance, or at least horizontally nearer the goal than the
/// opposite end is. The sub-goal is the entrance (bottom when climbing, top
/// when descending) unless the requester already stands at that entrance,
/// in which case it is the exit. The entrance test is horizontal distance
/// from the requester's current position; its Y is never consulted, because
/// the box-top height model makes a climbing requester's Y jump around.
/// Returns None when no baked pair serves the goal.
pub fn resolve_vertical_goal(
    pairs: &[WaypointPair],
    requester: Vec3,
    goal: Vec3,
) -> Option<Vec3> {
    let going_up = goal.y > requester.y;

    let mut best: Option<&WaypointPair> = None;
    let mut best_distance = f32::INFINITY;
    for pair in pairs {
        let goal_end = if going_up { pair.top } else { pair.bottom };
        let distance = horizontal_distance(goal, goal_end);
        if distance < best_distance {
            best_distance = distance;
            best = Some(pair);
        }
    }
    let pair = best?;

    let (entrance, exit, goal_end, other_end) = if going_up {
        (pair.bottom, pair.top, pair.top, pair.bottom)
    } else {
        (pair.top, pair.bottom, pair.bottom, pair.top)
    };

    let serves_goal = (goal.y - goal_end.y).abs() <= TOP_Y_TOLERANCE
        || horizontal_distance(goal, goal_end) < horizontal_distance(goal, other_end);
    if !serves_goal {
        return None;
    }

    if horizontal_distance(requester, entrance) <= ENTRY_RADIUS {
        Some(exit)
    } else {
        Some(entrance)
    }
}
