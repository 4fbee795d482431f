use thiserror::Error;

#[derive(Error, Debug)]
pub enum HordeError {
    // Config-related errors
    #[error("Failed to get config directory")]
    ConfigDirNotFound,

    #[error("Failed to create config directory: {0}")]
    ConfigDirCreationFailed(#[from] std::io::Error),

    #[error("Failed to serialize config: {0}")]
    SerializationFailed(#[from] toml::ser::Error),

    #[error("Failed to deserialize config: {0}")]
    DeserializationFailed(#[from] toml::de::Error),

    // Navigation-related errors
    #[error("Invalid grid dimensions: play radius {play_radius}, cell size {cell_size}")]
    InvalidGridDimensions { play_radius: f32, cell_size: f32 },
}

/// Result type alias for all operations
pub type HordeResult<T> = Result<T, HordeError>;
