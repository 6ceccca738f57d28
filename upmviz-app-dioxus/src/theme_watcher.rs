//! Theme file watching and hot-reload CSS injection.
//!
//! The embedded stylesheet is written to `~/.config/upmviz/theme.css` on first
//! run. Edits to that file are picked up while the slideshow is open.

use dioxus::prelude::*;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode, DebounceEventResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc as tokio_mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Errors that can occur during theme operations
#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("Failed to read theme file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to initialize file watcher: {0}")]
    WatcherError(#[from] notify::Error),
}

/// Embedded default CSS template (compiled into the binary)
pub const DEFAULT_CSS: &str = include_str!("../assets/default_theme.css");

const WATCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Read the theme at `theme_path`, writing the embedded template there first if missing.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be read or written.
pub fn initialize_theme_at(theme_path: &Path) -> Result<String, ThemeError> {
    if theme_path.exists() {
        info!("Loading theme from {}", theme_path.display());
        return Ok(fs::read_to_string(theme_path)?);
    }

    info!(
        "Theme file not found, creating from template at {}",
        theme_path.display()
    );
    if let Some(parent) = theme_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(theme_path, DEFAULT_CSS)?;

    Ok(DEFAULT_CSS.to_string())
}

/// Load CSS from `theme_path`, falling back to the embedded CSS if it cannot be read.
#[must_use]
pub fn load_theme_css_at(theme_path: &Path) -> String {
    match fs::read_to_string(theme_path) {
        Ok(css) => css,
        Err(e) => {
            warn!("Failed to read theme file, using embedded CSS: {}", e);
            DEFAULT_CSS.to_string()
        }
    }
}

fn is_theme_file(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name == upmviz_core::THEME_FILE_NAME)
}

/// Dioxus hook that provides reactive CSS content with file watching.
///
/// Returns a signal holding the current stylesheet. A debounced watcher on the
/// config directory reloads it whenever the theme file is saved, until
/// `cancel_token` fires.
#[must_use]
pub fn use_theme_watcher(cancel_token: CancellationToken) -> Signal<String> {
    let mut css_content = use_signal(|| {
        initialize_theme_at(&upmviz_core::theme_path()).unwrap_or_else(|e| {
            error!("Failed to initialize theme: {}", e);
            DEFAULT_CSS.to_string()
        })
    });

    use_effect(move || {
        let cancel_token = cancel_token.clone();

        spawn(async move {
            let theme_path = upmviz_core::theme_path();

            let (tx, mut rx) = tokio_mpsc::channel::<()>(16);

            let mut debouncer = match new_debouncer(
                WATCH_DEBOUNCE,
                move |res: DebounceEventResult| {
                    if let Ok(events) = res {
                        // The log file lives in the same directory
                        if events.iter().any(|event| is_theme_file(&event.path)) {
                            let _ = tx.blocking_send(());
                        }
                    }
                },
            ) {
                Ok(d) => d,
                Err(e) => {
                    error!("{}", ThemeError::from(e));
                    return;
                }
            };

            // Watch the parent directory; editors often replace the file on save
            let watch_path = theme_path
                .parent()
                .map_or_else(|| theme_path.clone(), PathBuf::from);

            if let Err(e) = debouncer
                .watcher()
                .watch(&watch_path, RecursiveMode::NonRecursive)
            {
                error!("Failed to watch theme directory: {}", e);
                return;
            }

            info!("Watching theme file for changes: {}", theme_path.display());

            loop {
                tokio::select! {
                    () = cancel_token.cancelled() => {
                        info!("Theme watcher shutting down");
                        break;
                    }
                    Some(()) = rx.recv() => {
                        info!("Theme file changed, reloading CSS");
                        css_content.set(load_theme_css_at(&theme_path));
                    }
                }
            }

            drop(debouncer);
        });
    });

    css_content
}
