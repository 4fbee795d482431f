use bevy::prelude::*;
use derive_more::{Add, Display, From, Mul};
use std::ops::Sub;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Mul, Display, From)]
pub struct Speed(pub f32);

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Add, Mul, Display, From)]
pub struct Distance(pub f32);

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Add, Mul, Display, From)]
pub struct Damage(pub f32);

impl Speed {
    pub fn new(value: f32) -> Self {
        Self(value.max(0.0))
    }
    pub const ZERO: Speed = Speed(0.0);
}

impl Distance {
    pub fn new(value: f32) -> Self {
        Self(value.max(0.0))
    }
    pub const ZERO: Distance = Distance(0.0);
}

impl Damage {
    pub fn new(value: f32) -> Self {
        Self(value.max(0.0))
    }
    pub const ZERO: Damage = Damage(0.0);
}

// Manual implementations for operations not available in derive_more

impl Sub for Distance {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self((self.0 - rhs.0).max(0.0))
    }
}

impl Sub for Damage {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self((self.0 - rhs.0).max(0.0))
    }
}

// Custom math operations for Vec3 * Speed
impl std::ops::Mul<Speed> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: Speed) -> Self::Output {
        self * rhs.0
    }
}

/// Vertical movement mode of an agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionState {
    /// Feet track the queried ground height
    Grounded,
    /// Ballistic arc; lands when at or below ground height
    Airborne { vertical_velocity: f32 },
}

impl MotionState {
    pub fn is_grounded(self) -> bool {
        matches!(self, MotionState::Grounded)
    }
}

/// Distance-banded level of detail for a hostile agent.
///
/// The bands reduce both rendering detail (decided by the consumer from this
/// level) and, in the farthest band, AI update frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LodLevel {
    /// Full detail
    Full,
    /// Hide only fine decorative detail
    NoDetail,
    /// Hide limbs and weapon, keep the torso silhouette shootable
    Silhouette,
    /// Fully paused and culled
    Culled,
}

impl LodLevel {
    pub fn shows_fine_detail(self) -> bool {
        self == LodLevel::Full
    }

    pub fn shows_limbs(self) -> bool {
        self <= LodLevel::NoDetail
    }

    pub fn is_culled(self) -> bool {
        self == LodLevel::Culled
    }
}

/// Result of one agent tick, handed to the external combat collaborator.
///
/// Damage and score application are not this core's concern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireOutcome {
    pub fired: bool,
    pub hit: bool,
    pub damage: Damage,
}

impl FireOutcome {
    /// No shot this tick
    pub fn idle() -> Self {
        Self {
            fired: false,
            hit: false,
            damage: Damage::ZERO,
        }
    }
}
