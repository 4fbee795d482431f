//! Static scene contract: the flat obstacle list handed to the nav bake and
//! the narrow query traits the agent controller consumes each frame.

use bevy::prelude::*;

/// Horizontal (XZ-plane) distance between two world positions
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

/// Axis-aligned world-space bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Grow the horizontal footprint by `radius` on every side. Height is
    /// untouched: inflation exists for the agent's collision circle, not its
    /// head.
    pub fn expanded(&self, radius: f32) -> Self {
        let pad = Vec3::new(radius, 0.0, radius);
        Self {
            min: self.min - pad,
            max: self.max + pad,
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn contains_xz(&self, x: f32, z: f32) -> bool {
        x >= self.min.x && x <= self.max.x && z >= self.min.z && z <= self.max.z
    }

    /// Strict overlap test; boxes that merely touch do not intersect, so an
    /// agent standing exactly on top of a box is not colliding with it.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmplt(other.max).all() && self.max.cmpgt(other.min).all()
    }

    /// Slab-method segment intersection, used for line-of-sight refinement.
    pub fn intersects_segment(&self, start: Vec3, end: Vec3) -> bool {
        let dir = end - start;
        let mut t_min = 0.0_f32;
        let mut t_max = 1.0_f32;

        for axis in 0..3 {
            let (origin, delta, lo, hi) = match axis {
                0 => (start.x, dir.x, self.min.x, self.max.x),
                1 => (start.y, dir.y, self.min.y, self.max.y),
                _ => (start.z, dir.z, self.min.z, self.max.z),
            };

            if delta.abs() < 1e-6 {
                if origin < lo || origin > hi {
                    return false;
                }
            } else {
                let inv = 1.0 / delta;
                let mut t0 = (lo - origin) * inv;
                let mut t1 = (hi - origin) * inv;
                if t0 > t1 {
                    std::mem::swap(&mut t0, &mut t1);
                }
                t_min = t_min.max(t0);
                t_max = t_max.min(t1);
                if t_min > t_max {
                    return false;
                }
            }
        }
        true
    }

    /// 2D distance from a point to this box's horizontal footprint
    pub fn distance_xz(&self, point: Vec3) -> f32 {
        let cx = point.x.clamp(self.min.x, self.max.x);
        let cz = point.z.clamp(self.min.z, self.max.z);
        Vec2::new(point.x - cx, point.z - cz).length()
    }
}

/// Which end of a staircase a waypoint marker tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StairEnd {
    Bottom,
    Top,
}

/// Role of a static scene object in navigation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneKind {
    /// Walk-on geometry, never rasterized into the grid
    Ground,
    /// Blocks cells outright
    Obstacle,
    /// Traversable but costed as difficult terrain
    Stairs,
    /// Invisible marker, paired by id into a stair waypoint pair
    Waypoint { end: StairEnd, pair_id: u32 },
}

/// One entry of the flat static-obstacle list passed once at bake time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneObject {
    pub aabb: Aabb,
    pub kind: SceneKind,
}

impl SceneObject {
    pub fn ground(aabb: Aabb) -> Self {
        Self {
            aabb,
            kind: SceneKind::Ground,
        }
    }

    pub fn obstacle(aabb: Aabb) -> Self {
        Self {
            aabb,
            kind: SceneKind::Obstacle,
        }
    }

    pub fn stairs(aabb: Aabb) -> Self {
        Self {
            aabb,
            kind: SceneKind::Stairs,
        }
    }

    pub fn waypoint(position: Vec3, end: StairEnd, pair_id: u32) -> Self {
        Self {
            aabb: Aabb::from_center_half_extents(position, Vec3::ZERO),
            kind: SceneKind::Waypoint { end, pair_id },
        }
    }

    pub fn position(&self) -> Vec3 {
        self.aabb.center()
    }

    /// Physical geometry the movement resolver and line-of-sight care about
    pub fn blocks_movement(&self) -> bool {
        matches!(self.kind, SceneKind::Obstacle | SceneKind::Stairs)
    }
}

/// Read-only spatial queries over static geometry.
///
/// Returns candidates only; the caller refines with exact intersection
/// tests. Implementations must be safe to call once per agent per frame.
pub trait SpatialIndex {
    fn query_nearby(&self, position: Vec3, radius: f32) -> Vec<&SceneObject>;

    fn query_ray_candidates(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> Vec<&SceneObject>;
}

/// Ground-height source for vertical movement and goal snapping.
///
/// The default is a flat floor at height zero, which is also the fallback
/// behavior when no real source is configured.
pub trait GroundHeight {
    fn height_at(&self, x: f32, z: f32) -> f32 {
        let _ = (x, z);
        0.0
    }
}

/// Linear-scan reference implementation of the scene queries.
///
/// The production spatial index lives elsewhere; only its query contract is
/// consumed here, so this stays a plain list walk.
#[derive(Debug, Clone, Default)]
pub struct StaticSceneIndex {
    objects: Vec<SceneObject>,
    base_height: f32,
}

impl StaticSceneIndex {
    pub fn new(objects: Vec<SceneObject>) -> Self {
        Self {
            objects,
            base_height: 0.0,
        }
    }

    pub fn with_base_height(objects: Vec<SceneObject>, base_height: f32) -> Self {
        Self {
            objects,
            base_height,
        }
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }
}

impl SpatialIndex for StaticSceneIndex {
    fn query_nearby(&self, position: Vec3, radius: f32) -> Vec<&SceneObject> {
        self.objects
            .iter()
            .filter(|obj| obj.blocks_movement() && obj.aabb.distance_xz(position) <= radius)
            .collect()
    }

    fn query_ray_candidates(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> Vec<&SceneObject> {
        let end = origin + direction * max_distance;
        // Broad phase only: segment bounding box against object boxes
        let sweep = Aabb::new(origin.min(end), origin.max(end));
        self.objects
            .iter()
            .filter(|obj| obj.blocks_movement() && obj.aabb.intersects(&sweep))
            .collect()
    }
}

impl GroundHeight for StaticSceneIndex {
    fn height_at(&self, x: f32, z: f32) -> f32 {
        let mut height = self.base_height;
        for obj in &self.objects {
            let walkable_top = match obj.kind {
                SceneKind::Ground | SceneKind::Obstacle | SceneKind::Stairs => true,
                SceneKind::Waypoint { .. } => false,
            };
            if walkable_top && obj.aabb.contains_xz(x, z) {
                height = height.max(obj.aabb.max.y);
            }
        }
        height
    }
}
