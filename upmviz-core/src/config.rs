use crate::command::{
    KeyBindings, DEFAULT_FIRST_KEY, DEFAULT_NEXT_KEY, DEFAULT_PREVIOUS_KEY, DEFAULT_RESET_KEY,
    DEFAULT_TOGGLE_KEY,
};
use crate::controller::TickSettings;
use crate::error::{CoreError, Result};
use crate::playback::{DEFAULT_TICK_INCREMENT, DEFAULT_TICK_INTERVAL_MS};
use crate::scene::{SceneDescriptor, Storyboard};
use const_format::concatcp;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Default window title shown in the header
pub const DEFAULT_TITLE: &str = "Unextractable Protocol Models (UPMs)";

/// Default subtitle shown under the title
pub const DEFAULT_SUBTITLE: &str = "NeurIPS 2025 - Interactive Visualization";

/// `concatcp!` cannot format floats; kept equal to `DEFAULT_TICK_INCREMENT` by a test
const DEFAULT_TICK_INCREMENT_STR: &str = "2.0";
const DEFAULT_WINDOW_WIDTH: u32 = 1280;
const DEFAULT_WINDOW_HEIGHT: u32 = 800;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpmvizConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub keys: KeyBindings,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Replaces the built-in storyboard when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenes: Option<Vec<SceneDescriptor>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Milliseconds between timer ticks
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Progress percentage points added per tick
    #[serde(default = "default_tick_increment")]
    pub tick_increment: f64,
    /// Start playing as soon as the window opens
    #[serde(default)]
    pub autoplay: bool,
}

const fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

const fn default_tick_increment() -> f64 {
    DEFAULT_TICK_INCREMENT
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            tick_increment: default_tick_increment(),
            autoplay: false,
        }
    }
}

impl PlaybackConfig {
    /// Convert to validated tick settings.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigInvalid`] if the interval is zero or the
    /// increment is outside `(0, 100]`.
    pub fn tick_settings(&self) -> Result<TickSettings> {
        TickSettings::new(
            Duration::from_millis(self.tick_interval_ms),
            self.tick_increment,
        )
        .map_err(|e| match e {
            CoreError::ConfigInvalid { message } => CoreError::ConfigInvalid {
                message: format!("playback: {message}"),
            },
            other => other,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_subtitle")]
    pub subtitle: String,
    #[serde(default = "default_true")]
    pub show_legend: bool,
    #[serde(default = "default_true")]
    pub show_info_panel: bool,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_subtitle() -> String {
    DEFAULT_SUBTITLE.to_string()
}

const fn default_true() -> bool {
    true
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            subtitle: default_subtitle(),
            show_legend: true,
            show_info_panel: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_width")]
    pub width: u32,
    #[serde(default = "default_window_height")]
    pub height: u32,
    #[serde(default)]
    pub always_on_top: bool,
}

const fn default_window_width() -> u32 {
    DEFAULT_WINDOW_WIDTH
}

const fn default_window_height() -> u32 {
    DEFAULT_WINDOW_HEIGHT
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
            always_on_top: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to ~/.config/upmviz/upmviz.log
    #[serde(default)]
    pub enabled: bool,
}

impl UpmvizConfig {
    /// Get the configuration directory path (~/.config/upmviz/)
    #[must_use]
    pub fn config_dir() -> PathBuf {
        crate::paths::config_dir()
    }

    /// Get the config file path (~/.config/upmviz/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Load config from the default path, or write the template on first run.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigNotFound`] after writing a fresh template,
    /// and an error if the file cannot be read, parsed, or validated.
    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_at(&Self::config_path())
    }

    /// Load config from `path`, or write the template there if it is missing.
    ///
    /// # Errors
    ///
    /// Same as [`UpmvizConfig::load_or_create`].
    pub fn load_or_create_at(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            // Create config directory if it doesn't exist
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }

            fs::write(config_path, CONFIG_TEMPLATE)?;
            info!("Wrote config template to {}", config_path.display());

            return Err(CoreError::ConfigNotFound {
                path: config_path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(config_path)?;
        let config = Self::parse(&content)?;
        info!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigParseError`] for TOML errors and
    /// [`CoreError::ConfigInvalid`] or a storyboard error for bad values.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid tick settings, a zero window size, or an
    /// invalid `[[scenes]]` table.
    pub fn validate(&self) -> Result<()> {
        self.playback.tick_settings()?;

        if self.window.width == 0 || self.window.height == 0 {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "window: size must be non-zero, got {}x{}",
                    self.window.width, self.window.height
                ),
            });
        }

        self.storyboard()?;
        Ok(())
    }

    /// The storyboard to play: the `[[scenes]]` override or the built-in one.
    ///
    /// # Errors
    ///
    /// Returns a storyboard error if the override is empty or has an invalid scene.
    pub fn storyboard(&self) -> Result<Storyboard> {
        self.scenes
            .as_ref()
            .map_or_else(|| Ok(Storyboard::builtin()), |scenes| Storyboard::new(scenes.clone()))
    }
}

/// Reset the config file at `path` to the default template.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_config_template(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, CONFIG_TEMPLATE)?;
    Ok(())
}

/// Commented template written on first run
pub const CONFIG_TEMPLATE: &str = concatcp!(
    r#"# UPM Visualizer Configuration
# ~/.config/upmviz/config.toml

[playback]
# Milliseconds between animation ticks
tick_interval_ms = "#,
    DEFAULT_TICK_INTERVAL_MS,
    r#"
# Scene progress (percent) added per tick; a scene completes at 100
tick_increment = "#,
    DEFAULT_TICK_INCREMENT_STR,
    r#"
# Start playing as soon as the window opens
autoplay = false

[ui]
title = ""#,
    DEFAULT_TITLE,
    r#""
subtitle = ""#,
    DEFAULT_SUBTITLE,
    r#""
show_legend = true
show_info_panel = true

[window]
width = "#,
    DEFAULT_WINDOW_WIDTH,
    r#"
height = "#,
    DEFAULT_WINDOW_HEIGHT,
    r#"
always_on_top = false

[keys]
# Values are DOM KeyboardEvent.key names; matching ignores case
toggle = ""#,
    DEFAULT_TOGGLE_KEY,
    r#""
previous = ""#,
    DEFAULT_PREVIOUS_KEY,
    r#""
next = ""#,
    DEFAULT_NEXT_KEY,
    r#""
reset = ""#,
    DEFAULT_RESET_KEY,
    r#""
first = ""#,
    DEFAULT_FIRST_KEY,
    r#""

[logging]
# Write logs to ~/.config/upmviz/upmviz.log in addition to the console
enabled = false

# Optional: replace the built-in thirteen scenes. Scenes past the thirteenth
# render as a title card.
# [[scenes]]
# title = "Problem & Motivation"
# duration_secs = 25
# phases = 3
# narration = "Large models are valuable and trained across many machines."
"#
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = UpmvizConfig::parse("").unwrap();
        assert_eq!(config.playback.tick_interval_ms, 200);
        assert!((config.playback.tick_increment - 2.0).abs() < f64::EPSILON);
        assert!(!config.playback.autoplay);
        assert_eq!(config.ui.title, DEFAULT_TITLE);
        assert!(config.ui.show_legend);
        assert_eq!(config.window.width, 1280);
        assert!(!config.logging.enabled);
        assert!(config.scenes.is_none());
        assert_eq!(config.storyboard().unwrap().len(), 13);
    }

    #[test]
    fn test_template_parses_to_defaults() {
        let config = UpmvizConfig::parse(CONFIG_TEMPLATE).unwrap();
        let defaults = UpmvizConfig::default();
        assert_eq!(config.playback.tick_interval_ms, defaults.playback.tick_interval_ms);
        assert!((config.playback.tick_increment - defaults.playback.tick_increment).abs() < f64::EPSILON);
        assert_eq!(config.ui.title, defaults.ui.title);
        assert_eq!(config.ui.subtitle, defaults.ui.subtitle);
        assert_eq!(config.window.width, defaults.window.width);
        assert_eq!(config.window.height, defaults.window.height);
        assert_eq!(config.keys, defaults.keys);
        assert!(config.scenes.is_none());
    }

    #[test]
    fn test_template_matches_default_constants() {
        let increment: f64 = DEFAULT_TICK_INCREMENT_STR.parse().unwrap();
        assert!((increment - DEFAULT_TICK_INCREMENT).abs() < f64::EPSILON);

        let config = UpmvizConfig::parse(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.playback.tick_interval_ms, DEFAULT_TICK_INTERVAL_MS);
        assert!((config.playback.tick_increment - DEFAULT_TICK_INCREMENT).abs() < f64::EPSILON);
        assert_eq!(config.keys.toggle, DEFAULT_TOGGLE_KEY);
        assert_eq!(config.keys.first, DEFAULT_FIRST_KEY);
    }

    #[test]
    fn test_template_keys_resolve() {
        let config = UpmvizConfig::parse(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.keys.resolve(" "), Some(Command::Toggle));
        assert_eq!(config.keys.resolve("Home"), Some(Command::JumpTo(0)));
    }

    #[test]
    fn test_playback_overrides() {
        let config = UpmvizConfig::parse(
            r#"
[playback]
tick_interval_ms = 100
tick_increment = 5
autoplay = true
"#,
        )
        .unwrap();
        let tick = config.playback.tick_settings().unwrap();
        assert_eq!(tick.interval(), Duration::from_millis(100));
        assert!((tick.increment() - 5.0).abs() < f64::EPSILON);
        assert!(config.playback.autoplay);
    }

    #[test]
    fn test_zero_tick_interval_rejected() {
        let result = UpmvizConfig::parse("[playback]\ntick_interval_ms = 0\n");
        assert!(matches!(result, Err(CoreError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_out_of_range_increment_rejected() {
        for increment in ["0", "-2", "150"] {
            let doc = format!("[playback]\ntick_increment = {increment}\n");
            let result = UpmvizConfig::parse(&doc);
            assert!(
                matches!(result, Err(CoreError::ConfigInvalid { .. })),
                "increment {increment} should be rejected"
            );
        }
    }

    #[test]
    fn test_zero_window_rejected() {
        let result = UpmvizConfig::parse("[window]\nwidth = 0\n");
        assert!(matches!(result, Err(CoreError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_syntax_error_is_parse_error() {
        let result = UpmvizConfig::parse("[playback\n");
        assert!(matches!(result, Err(CoreError::ConfigParseError(_))));
    }

    #[test]
    fn test_custom_scenes_replace_builtin() {
        let config = UpmvizConfig::parse(
            r#"
[[scenes]]
title = "Intro"
duration_secs = 10
phases = 2

[[scenes]]
title = "Outro"
duration_secs = 5.5
phases = 1
narration = "Bye"
"#,
        )
        .unwrap();
        let storyboard = config.storyboard().unwrap();
        assert_eq!(storyboard.len(), 2);
        assert_eq!(storyboard[0].title, "Intro");
        assert_eq!(storyboard[1].narration.as_deref(), Some("Bye"));
    }

    #[test]
    fn test_empty_scene_list_rejected() {
        let result = UpmvizConfig::parse("scenes = []\n");
        assert!(matches!(result, Err(CoreError::EmptyStoryboard)));
    }

    #[test]
    fn test_invalid_custom_scene_rejected() {
        let result = UpmvizConfig::parse(
            r#"
[[scenes]]
title = "Broken"
duration_secs = 10
phases = 0
"#,
        );
        assert!(matches!(result, Err(CoreError::InvalidScene { index: 0, .. })));
    }

    #[test]
    fn test_load_or_create_writes_template() {
        let dir = std::env::temp_dir().join(format!("upmviz-config-test-{}", std::process::id()));
        let path = dir.join("nested").join("config.toml");
        let _ = fs::remove_dir_all(&dir);

        let first = UpmvizConfig::load_or_create_at(&path);
        assert!(matches!(first, Err(CoreError::ConfigNotFound { .. })));
        assert!(path.exists());

        let second = UpmvizConfig::load_or_create_at(&path).unwrap();
        assert_eq!(second.playback.tick_interval_ms, 200);

        fs::write(&path, "[playback\n").unwrap();
        assert!(matches!(
            UpmvizConfig::load_or_create_at(&path),
            Err(CoreError::ConfigParseError(_))
        ));

        write_config_template(&path).unwrap();
        assert!(UpmvizConfig::load_or_create_at(&path).is_ok());

        let _ = fs::remove_dir_all(&dir);
    }
}
