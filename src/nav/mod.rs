//! Grid-based A* pathfinding with amortized per-search state reset.
//!
//! The grid is baked once at level load from the static scene and never
//! resized. Search-scoped cell fields (costs, parent links, open/closed
//! marks) are tagged with the id of the search that wrote them, so a new
//! search lazily resets a cell in O(1) on first touch instead of clearing
//! the whole grid. With dozens of agents replanning every few hundred
//! milliseconds this is what keeps searches cheap.

use crate::errors::{HordeError, HordeResult};
use crate::scene::{Aabb, SceneKind, SceneObject};
use bevy::prelude::*;

pub mod stairs;

pub use stairs::WaypointPair;

/// Configuration for navigation grid baking
#[derive(Debug, Clone)]
pub struct NavConfig {
    /// Edge length of one grid cell. Deliberately coarse: path fidelity is
    /// traded for search speed, since hundreds of searches per second must
    /// stay cheap.
    pub cell_size: f32,
    /// Extra world-space covered beyond the play radius
    pub margin: f32,
    /// Obstacle inflation radius matching the agent's collision circle
    pub agent_radius: f32,
    /// Traversal cost multiplier applied to stair cells
    pub stair_weight: f32,
    /// Y delta above which a query goes through the stair-aware goal rewrite
    pub vertical_threshold: f32,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            cell_size: 2.0,
            margin: 8.0,
            agent_radius: 0.45,
            stair_weight: 2.5,
            vertical_threshold: 1.5,
        }
    }
}

const ORTHO_COST: f32 = 10.0;
const DIAG_COST: f32 = 14.0;

/// Ring-search bounds for snapping endpoints to walkable cells
const START_SNAP_RINGS: i32 = 6;
const GOAL_SNAP_RINGS: i32 = 8;

const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Octile distance: admissible and consistent for 8-directional movement
/// with orthogonal cost 10 and diagonal cost 14.
pub fn octile(ax: i32, az: i32, bx: i32, bz: i32) -> f32 {
    let dx = (ax - bx).abs() as f32;
    let dz = (az - bz).abs() as f32;
    DIAG_COST * dx.min(dz) + ORTHO_COST * (dx.max(dz) - dx.min(dz))
}

/// One cell of the navigation grid.
///
/// `g_cost`, `h_cost` and `parent` are only meaningful while `run_id`
/// matches the searching run; `opened_id` / `closed_id` replace open-set and
/// closed-set membership checks the same way.
#[derive(Debug, Clone, Copy)]
struct GridCell {
    walkable: bool,
    weight: f32,
    g_cost: f32,
    h_cost: f32,
    parent: Option<u32>,
    run_id: u32,
    opened_id: u32,
    closed_id: u32,
}

impl GridCell {
    fn open_ground() -> Self {
        Self {
            walkable: true,
            weight: 1.0,
            g_cost: 0.0,
            h_cost: 0.0,
            parent: None,
            run_id: 0,
            opened_id: 0,
            closed_id: 0,
        }
    }
}

/// Navigation grid covering the playable world, centered on the origin.
#[derive(Debug, Clone, Resource)]
pub struct NavGrid {
    cells: Vec<GridCell>,
    width: i32,
    cell_size: f32,
    half_extent: f32,
    /// Monotonically increasing; run 0 is reserved so freshly baked cells
    /// are stale for every real search.
    next_run_id: u32,
    waypoint_pairs: Vec<WaypointPair>,
    vertical_threshold: f32,
}

impl NavGrid {
    /// Bake walkability and traversal cost from the static scene.
    ///
    /// Non-ground, non-waypoint obstacles are expanded by the agent
    /// collision radius and rasterized into cell rectangles: stairs raise
    /// `weight` to bias routing toward flat ground without blocking them,
    /// everything else clears `walkable`. Waypoint markers are paired by id
    /// into stair waypoint pairs and excluded from rasterization.
    pub fn bake(play_radius: f32, objects: &[SceneObject], config: &NavConfig) -> HordeResult<Self> {
        if play_radius <= 0.0 || config.cell_size <= 0.0 {
            return Err(HordeError::InvalidGridDimensions {
                play_radius,
                cell_size: config.cell_size,
            });
        }

        let extent = play_radius + config.margin;
        let width = ((extent * 2.0) / config.cell_size).ceil() as i32;
        let mut grid = Self::open(width, config.cell_size);
        grid.vertical_threshold = config.vertical_threshold;

        for obj in objects {
            match obj.kind {
                SceneKind::Ground | SceneKind::Waypoint { .. } => {}
                SceneKind::Stairs => {
                    let stair_weight = config.stair_weight;
                    grid.mark_rect(&obj.aabb.expanded(config.agent_radius), |cell| {
                        cell.weight = cell.weight.max(stair_weight);
                    });
                }
                SceneKind::Obstacle => {
                    grid.mark_rect(&obj.aabb.expanded(config.agent_radius), |cell| {
                        cell.walkable = false;
                    });
                }
            }
        }

        grid.waypoint_pairs = stairs::pair_waypoints(objects);

        let blocked = grid.cells.iter().filter(|c| !c.walkable).count();
        info!(
            "Baked nav grid: {width}x{width} cells ({cell_size}m), {blocked}/{total} blocked, {pairs} stair pairs",
            cell_size = grid.cell_size,
            total = grid.cells.len(),
            pairs = grid.waypoint_pairs.len(),
        );

        Ok(grid)
    }

    /// All-walkable grid of `width` x `width` cells. Scenario tooling and
    /// tests start from this and carve obstacles in.
    pub fn open(width: i32, cell_size: f32) -> Self {
        let width = width.max(1);
        Self {
            cells: vec![GridCell::open_ground(); (width * width) as usize],
            width,
            cell_size,
            half_extent: width as f32 * cell_size / 2.0,
            next_run_id: 1,
            waypoint_pairs: Vec::new(),
            vertical_threshold: NavConfig::default().vertical_threshold,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Stair waypoint pairs, read-only after the bake
    pub fn waypoint_pairs(&self) -> &[WaypointPair] {
        &self.waypoint_pairs
    }

    pub fn set_waypoint_pairs(&mut self, pairs: Vec<WaypointPair>) {
        self.waypoint_pairs = pairs;
    }

    /// Number of searches run against this grid so far
    pub fn searches_run(&self) -> u32 {
        self.next_run_id - 1
    }

    pub fn is_walkable(&self, x: i32, z: i32) -> bool {
        self.in_bounds(x, z) && self.cells[self.index(x, z)].walkable
    }

    pub fn set_walkable(&mut self, x: i32, z: i32, walkable: bool) {
        if self.in_bounds(x, z) {
            let index = self.index(x, z);
            self.cells[index].walkable = walkable;
        }
    }

    pub fn set_weight(&mut self, x: i32, z: i32, weight: f32) {
        if self.in_bounds(x, z) {
            let index = self.index(x, z);
            self.cells[index].weight = weight.max(1.0);
        }
    }

    pub fn world_to_grid(&self, world_pos: Vec3) -> Option<(i32, i32)> {
        let x = ((world_pos.x + self.half_extent) / self.cell_size).floor() as i32;
        let z = ((world_pos.z + self.half_extent) / self.cell_size).floor() as i32;
        self.in_bounds(x, z).then_some((x, z))
    }

    /// Cell center in world space. Y is left at zero; callers resolve the
    /// actual ground height when following the path.
    pub fn grid_to_world(&self, x: i32, z: i32) -> Vec3 {
        Vec3::new(
            (x as f32 + 0.5) * self.cell_size - self.half_extent,
            0.0,
            (z as f32 + 0.5) * self.cell_size - self.half_extent,
        )
    }

    fn in_bounds(&self, x: i32, z: i32) -> bool {
        x >= 0 && z >= 0 && x < self.width && z < self.width
    }

    fn index(&self, x: i32, z: i32) -> usize {
        (z * self.width + x) as usize
    }

    fn coords(&self, index: usize) -> (i32, i32) {
        (index as i32 % self.width, index as i32 / self.width)
    }

    /// Apply `f` to every cell covered by the box's horizontal footprint
    fn mark_rect(&mut self, aabb: &Aabb, mut f: impl FnMut(&mut GridCell)) {
        let min_x = ((aabb.min.x + self.half_extent) / self.cell_size).floor() as i32;
        let min_z = ((aabb.min.z + self.half_extent) / self.cell_size).floor() as i32;
        let max_x = ((aabb.max.x + self.half_extent) / self.cell_size).floor() as i32;
        let max_z = ((aabb.max.z + self.half_extent) / self.cell_size).floor() as i32;

        if max_x < 0 || max_z < 0 || min_x >= self.width || min_z >= self.width {
            return; // Entirely outside the grid
        }

        for z in min_z.max(0)..=max_z.min(self.width - 1) {
            for x in min_x.max(0)..=max_x.min(self.width - 1) {
                let index = self.index(x, z);
                f(&mut self.cells[index]);
            }
        }
    }

    /// Expanding ring search for the nearest walkable cell: checks the four
    /// edges of the ring at radius 1, 2, ... and returns the first walkable
    /// hit, or None once the radius bound is exceeded.
    fn snap_to_walkable(&self, x: i32, z: i32, max_rings: i32) -> Option<(i32, i32)> {
        if self.is_walkable(x, z) {
            return Some((x, z));
        }
        for r in 1..=max_rings {
            // Top and bottom edges
            for dx in -r..=r {
                for dz in [-r, r] {
                    if self.is_walkable(x + dx, z + dz) {
                        return Some((x + dx, z + dz));
                    }
                }
            }
            // Left and right edges, corners already covered
            for dz in (-r + 1)..r {
                for dx in [-r, r] {
                    if self.is_walkable(x + dx, z + dz) {
                        return Some((x + dx, z + dz));
                    }
                }
            }
        }
        None
    }

    /// Point-to-point path query.
    ///
    /// Returns cell centers oldest-first, excluding the start cell, or an
    /// empty vec when no route exists or the endpoints cannot be resolved
    /// to walkable cells. An empty path is a data result, not an error.
    pub fn find_path(&mut self, start: Vec3, goal: Vec3) -> Vec<Vec3> {
        // A raw grid search is 2D and blind to elevation; large Y deltas go
        // through the stair heuristic first so the search is not routed
        // through geometry the agent cannot traverse.
        let goal = if (start.y - goal.y).abs() > self.vertical_threshold {
            stairs::resolve_vertical_goal(&self.waypoint_pairs, start, goal).unwrap_or(goal)
        } else {
            goal
        };

        let Some((sx, sz)) = self.world_to_grid(start) else {
            debug!("find_path: start {start:?} outside grid");
            return Vec::new();
        };
        let Some((gx, gz)) = self.world_to_grid(goal) else {
            debug!("find_path: goal {goal:?} outside grid");
            return Vec::new();
        };

        let Some((sx, sz)) = self.snap_to_walkable(sx, sz, START_SNAP_RINGS) else {
            warn!("find_path: no walkable cell within {START_SNAP_RINGS} rings of start ({sx},{sz})");
            return Vec::new();
        };
        let Some((gx, gz)) = self.snap_to_walkable(gx, gz, GOAL_SNAP_RINGS) else {
            warn!("find_path: no walkable cell within {GOAL_SNAP_RINGS} rings of goal ({gx},{gz})");
            return Vec::new();
        };

        self.astar((sx, sz), (gx, gz))
    }

    fn astar(&mut self, (sx, sz): (i32, i32), (gx, gz): (i32, i32)) -> Vec<Vec3> {
        let run = self.next_run_id;
        self.next_run_id += 1;

        let start_index = self.index(sx, sz);
        let goal_index = self.index(gx, gz);

        {
            let cell = &mut self.cells[start_index];
            cell.run_id = run;
            cell.g_cost = 0.0;
            cell.h_cost = octile(sx, sz, gx, gz);
            cell.parent = None;
            cell.opened_id = run;
        }

        // The grid is small and coarse; a linear min-scan over a plain Vec
        // beats a heap's bookkeeping at these open-list sizes.
        let mut open: Vec<u32> = vec![start_index as u32];

        while !open.is_empty() {
            let mut best = 0;
            for i in 1..open.len() {
                let a = &self.cells[open[i] as usize];
                let b = &self.cells[open[best] as usize];
                let fa = a.g_cost + a.h_cost;
                let fb = b.g_cost + b.h_cost;
                if fa < fb || (fa == fb && a.h_cost < b.h_cost) {
                    best = i;
                }
            }
            let current = open.swap_remove(best) as usize;
            self.cells[current].closed_id = run;

            if current == goal_index {
                return self.reconstruct(goal_index, start_index);
            }

            let (cx, cz) = self.coords(current);
            let current_g = self.cells[current].g_cost;

            for (dx, dz) in NEIGHBOR_OFFSETS {
                let (nx, nz) = (cx + dx, cz + dz);
                if !self.in_bounds(nx, nz) {
                    continue;
                }
                let neighbor_index = self.index(nx, nz);
                let neighbor = &mut self.cells[neighbor_index];
                if !neighbor.walkable || neighbor.closed_id == run {
                    continue;
                }
                // Lazy reset: first touch this run invalidates stale fields
                if neighbor.run_id != run {
                    neighbor.run_id = run;
                    neighbor.g_cost = f32::INFINITY;
                    neighbor.parent = None;
                }

                let step = if dx != 0 && dz != 0 {
                    DIAG_COST
                } else {
                    ORTHO_COST
                };
                let tentative = current_g + step * neighbor.weight;
                if tentative < neighbor.g_cost {
                    neighbor.g_cost = tentative;
                    neighbor.h_cost = octile(nx, nz, gx, gz);
                    neighbor.parent = Some(current as u32);
                    if neighbor.opened_id != run {
                        neighbor.opened_id = run;
                        open.push(neighbor_index as u32);
                    }
                }
            }
        }

        debug!("find_path: open list exhausted, ({sx},{sz}) -> ({gx},{gz}) unreachable");
        Vec::new()
    }

    fn reconstruct(&self, goal_index: usize, start_index: usize) -> Vec<Vec3> {
        let mut path = Vec::new();
        let mut index = goal_index;
        while index != start_index {
            let (x, z) = self.coords(index);
            path.push(self.grid_to_world(x, z));
            match self.cells[index].parent {
                Some(parent) => index = parent as usize,
                None => break,
            }
        }
        path.reverse();
        path
    }
}
