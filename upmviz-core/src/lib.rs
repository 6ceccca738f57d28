pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod paths;
pub mod playback;
pub mod scene;
pub mod time;

pub use command::{Command, KeyBindings};
pub use config::{
    write_config_template, LoggingConfig, PlaybackConfig, UiConfig, UpmvizConfig, WindowConfig,
    CONFIG_TEMPLATE,
};

/// Re-export toml error type for config parsing error handling
pub use toml::de::Error as TomlParseError;
pub use controller::{PlaybackController, PlaybackEvent, TickSettings};
pub use error::CoreError;
pub use paths::{
    config_dir, config_path, log_file_path, theme_path, CONFIG_DIR_NAME, CONFIG_FILE_NAME,
    LOG_FILE_NAME, THEME_FILE_NAME,
};
pub use playback::{PlaybackState, PlaybackStatus};
pub use scene::{SceneDescriptor, Storyboard};
pub use time::{scene_wall_time, ticks_per_scene, DurationExt};
