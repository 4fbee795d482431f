use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// A movement speed value constrained to [0.1, 50.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct MovementSpeed(f32);

impl MovementSpeed {
    const MIN: f32 = 0.1;
    const MAX: f32 = 50.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for MovementSpeed {
    fn default() -> Self {
        Self::new(4.5)
    }
}

/// A turn rate in radians per second constrained to [0.1, 30.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct TurnRate(f32);

impl TurnRate {
    const MIN: f32 = 0.1;
    const MAX: f32 = 30.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for TurnRate {
    fn default() -> Self {
        Self::new(6.0)
    }
}

/// An engagement distance constrained to [1.0, 200.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct EngageDistance(f32);

impl EngageDistance {
    const MIN: f32 = 1.0;
    const MAX: f32 = 200.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for EngageDistance {
    fn default() -> Self {
        Self::new(38.0)
    }
}

/// An aim ramp speed (progress per second) constrained to [0.1, 10.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct AimSpeed(f32);

impl AimSpeed {
    const MIN: f32 = 0.1;
    const MAX: f32 = 10.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for AimSpeed {
    fn default() -> Self {
        Self::new(2.2)
    }
}

/// A fire rate in shots per second constrained to [0.1, 20.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct FireRate(f32);

impl FireRate {
    const MIN: f32 = 0.1;
    const MAX: f32 = 20.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for FireRate {
    fn default() -> Self {
        Self::new(1.5)
    }
}

/// A base hit probability constrained to [0.0, 1.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct Accuracy(f32);

impl Accuracy {
    const MIN: f32 = 0.0;
    const MAX: f32 = 1.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for Accuracy {
    fn default() -> Self {
        Self::new(0.65)
    }
}
