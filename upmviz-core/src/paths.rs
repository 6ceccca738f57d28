//! Path constants for configuration, theme and log files.

use std::path::PathBuf;

/// The name of the configuration directory under ~/.config/
pub const CONFIG_DIR_NAME: &str = "upmviz";

/// The name of the main configuration file
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// The name of the user-editable theme stylesheet
pub const THEME_FILE_NAME: &str = "theme.css";

/// The name of the log file written when file logging is enabled
pub const LOG_FILE_NAME: &str = "upmviz.log";

/// Get the configuration directory path (~/.config/upmviz/)
#[must_use]
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join(CONFIG_DIR_NAME)
}

/// Get the config file path (~/.config/upmviz/config.toml)
#[must_use]
pub fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// Get the theme file path (~/.config/upmviz/theme.css)
#[must_use]
pub fn theme_path() -> PathBuf {
    config_dir().join(THEME_FILE_NAME)
}

/// Get the log file path (~/.config/upmviz/upmviz.log)
#[must_use]
pub fn log_file_path() -> PathBuf {
    config_dir().join(LOG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_share_config_dir() {
        let dir = config_dir();
        assert!(dir.ends_with(CONFIG_DIR_NAME));
        assert_eq!(config_path().parent(), Some(dir.as_path()));
        assert_eq!(theme_path().parent(), Some(dir.as_path()));
        assert_eq!(log_file_path().parent(), Some(dir.as_path()));
    }

    #[test]
    fn test_file_names() {
        assert!(config_path().ends_with(CONFIG_FILE_NAME));
        assert!(theme_path().ends_with(THEME_FILE_NAME));
        assert!(log_file_path().ends_with(LOG_FILE_NAME));
    }
}
