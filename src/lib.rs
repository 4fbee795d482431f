pub mod agent;
pub mod components;
pub mod config;
pub mod errors;
pub mod nav;
pub mod resources;
pub mod scene;

// Selective re-exports for external consumers

// The per-agent controller and the value types its outcomes carry
pub use agent::Agent;
pub use components::{Damage, FireOutcome, LodLevel, MotionState};

// Errors
pub use errors::{HordeError, HordeResult};

// Navigation - consumers bake one grid per level and share it
pub use nav::{NavConfig, NavGrid, WaypointPair};

// Configuration
pub use config::{load_config, save_config};
pub use resources::{AiConfig, AiSettings};

// Scene contract implemented by the host simulation
pub use scene::{Aabb, GroundHeight, SceneKind, SceneObject, SpatialIndex, StairEnd};
