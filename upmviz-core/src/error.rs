use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // Configuration errors
    #[error("Config file not found at {path}. A template has been created - edit it to customize playback and restart.")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid config: {message}")]
    ConfigInvalid { message: String },

    #[error("Failed to parse config file: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    // Storyboard errors
    #[error("Storyboard must contain at least one scene")]
    EmptyStoryboard,

    #[error("Invalid scene {index}: {reason}")]
    InvalidScene { index: usize, reason: String },

    // Playback errors
    #[error("Scene index {index} is out of range (storyboard has {count} scenes)")]
    SceneOutOfRange { index: usize, count: usize },

    // IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
