#![cfg_attr(feature = "bundle", windows_subsystem = "windows")]
mod app;
mod bridge;
mod components;
mod state;
mod theme_watcher;

use crate::app::App;
use crate::bridge::{run_command_loop, use_playback_bridge, CommandSender};
use crate::state::SlideshowState;
use dioxus::desktop::{LogicalSize, WindowBuilder};
use dioxus::prelude::*;
use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use upmviz_core::{
    scene_wall_time, write_config_template, CoreError, DurationExt, PlaybackController,
    PlaybackEvent, TomlParseError, UiConfig, UpmvizConfig,
};

const APP_NAME: &str = "UPM Visualizer";

fn main() {
    // Check config for logging.enabled before full config load
    let file_logging_enabled = check_file_logging_enabled();
    init_tracing(file_logging_enabled);

    let config = match UpmvizConfig::load_or_create() {
        Ok(config) => config,
        Err(CoreError::ConfigNotFound { path }) => {
            // Template was just written; the defaults it describes are usable as-is
            show_new_config_dialog(&path);
            UpmvizConfig::default()
        }
        Err(CoreError::ConfigParseError(parse_error)) => {
            show_config_parse_error_dialog(&parse_error, &UpmvizConfig::config_path());
            std::process::exit(1);
        }
        Err(
            e @ (CoreError::ConfigInvalid { .. }
            | CoreError::EmptyStoryboard
            | CoreError::InvalidScene { .. }),
        ) => {
            error!("{e}");
            show_config_error_dialog(&e, &UpmvizConfig::config_path());
            std::process::exit(1);
        }
        Err(e) => {
            error!("{e}");
            show_generic_error_dialog(&e.to_string());
            std::process::exit(1);
        }
    };

    let (storyboard, tick) = match config
        .storyboard()
        .and_then(|storyboard| Ok((storyboard, config.playback.tick_settings()?)))
    {
        Ok(parts) => parts,
        Err(e) => {
            error!("{e}");
            show_config_error_dialog(&e, &UpmvizConfig::config_path());
            std::process::exit(1);
        }
    };

    info!(
        "Loaded {} scene(s); tick every {}ms, +{}% per tick ({}ms per scene)",
        storyboard.len(),
        tick.interval().as_millis_u64(),
        tick.increment(),
        scene_wall_time(tick.interval(), tick.increment()).as_millis_u64()
    );

    // Create tokio runtime for background tasks
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    let controller = PlaybackController::new(storyboard, tick);

    // Create shared cancellation token for graceful shutdown
    let cancel_token = CancellationToken::new();

    // Set up Ctrl+C handler to trigger graceful shutdown
    let ctrlc_token = cancel_token.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received Ctrl+C, shutting down gracefully...");
        ctrlc_token.cancel();
    }) {
        error!("Failed to set Ctrl+C handler: {}", e);
    }

    // UI commands are applied in order by a single task on the background runtime
    let (commands, command_rx) = CommandSender::channel();

    runtime.spawn(log_playback_events(Arc::clone(&controller)));
    runtime.spawn(run_command_loop(
        Arc::clone(&controller),
        command_rx,
        cancel_token.clone(),
    ));

    if config.playback.autoplay {
        info!("Autoplay enabled");
        runtime.block_on(controller.play());
    }

    let window = WindowBuilder::new()
        .with_title(config.ui.title.clone())
        .with_resizable(true)
        .with_always_on_top(config.window.always_on_top)
        .with_inner_size(LogicalSize::new(
            f64::from(config.window.width),
            f64::from(config.window.height),
        ));

    // CSS is injected by the theme watcher so ~/.config/upmviz/theme.css can hot-reload
    let dioxus_config = dioxus::desktop::Config::default()
        .with_window(window)
        .with_disable_context_menu(true);

    dioxus::LaunchBuilder::desktop()
        .with_cfg(dioxus_config)
        .with_context(Arc::clone(&controller))
        .with_context(commands)
        .with_context(config.ui)
        .with_context(config.keys)
        .with_context(cancel_token.clone())
        .launch(app);

    cancel_token.cancel();
    runtime.block_on(controller.shutdown());
}

/// Root component that sets up context and renders the app
fn app() -> Element {
    let slideshow = use_context_provider(SlideshowState::default);

    let controller: Arc<PlaybackController> = use_context();
    use_playback_bridge(controller, slideshow);

    let ui: UiConfig = use_context();
    let title = ui.title;

    rsx! {
        document::Title { "{title}" },
        App {}
    }
}

/// Show dialog when config is newly created
fn show_new_config_dialog(config_path: &Path) {
    let message = format!(
        "A configuration file has been created at:\n{}\n\n\
        The slideshow will start with the default settings. Edit the file to change \
        playback speed, key bindings, window size, or the scene list.",
        config_path.display()
    );

    let result = MessageDialog::new()
        .set_level(MessageLevel::Info)
        .set_title(format!("{APP_NAME} - Configuration Created"))
        .set_description(&message)
        .set_buttons(MessageButtons::OkCancelCustom(
            "Open Config".into(),
            "Continue".into(),
        ))
        .show();

    if matches!(result, MessageDialogResult::Custom(ref s) if s == "Open Config") {
        if let Err(e) = open::that(config_path) {
            error!("Failed to open config file: {e}");
        }
    }
}

/// Show a native OS dialog for invalid configuration values
fn show_config_error_dialog(error: &CoreError, config_path: &Path) {
    let message = format!(
        "Your configuration file contains an invalid value:\n\n{error}\n\n\
        Please edit the configuration file and restart the app."
    );

    let result = MessageDialog::new()
        .set_level(MessageLevel::Error)
        .set_title(format!("{APP_NAME} - Invalid Configuration"))
        .set_description(&message)
        .set_buttons(MessageButtons::OkCancelCustom(
            "Open Config".into(),
            "Exit".into(),
        ))
        .show();

    if matches!(result, MessageDialogResult::Custom(ref s) if s == "Open Config") {
        if let Err(e) = open::that(config_path) {
            error!("Failed to open config file: {e}");
        }
    }
}

/// Show dialog when config file has TOML parsing errors
fn show_config_parse_error_dialog(parse_error: &TomlParseError, config_path: &Path) {
    let message = format!(
        "Your configuration file has a syntax error and cannot be loaded.\n\n\
        Error: {parse_error}\n\n\
        You can either:\n\
        \u{2022} Open the config file and fix the syntax error\n\
        \u{2022} Reset to a fresh configuration template"
    );

    let result = MessageDialog::new()
        .set_level(MessageLevel::Error)
        .set_title(format!("{APP_NAME} - Configuration Error"))
        .set_description(&message)
        .set_buttons(MessageButtons::OkCancelCustom(
            "Open Config".into(),
            "Reset Config".into(),
        ))
        .show();

    match result {
        MessageDialogResult::Custom(button) if button == "Open Config" => {
            if let Err(e) = open::that(config_path) {
                error!("Failed to open config file: {e}");
            }
        }
        MessageDialogResult::Custom(button) if button == "Reset Config" => {
            if let Err(e) = write_config_template(config_path) {
                error!("Failed to reset config file: {e}");
                MessageDialog::new()
                    .set_level(MessageLevel::Error)
                    .set_title(format!("{APP_NAME} - Reset Failed"))
                    .set_description(format!("Failed to reset configuration:\n{e}"))
                    .set_buttons(MessageButtons::Ok)
                    .show();
            } else {
                MessageDialog::new()
                    .set_level(MessageLevel::Info)
                    .set_title(format!("{APP_NAME} - Configuration Reset"))
                    .set_description(
                        "Configuration has been reset to the default template.\n\n\
                        Restart the app to use it.",
                    )
                    .set_buttons(MessageButtons::Ok)
                    .show();
            }
        }
        _ => {
            // User closed dialog - just exit
        }
    }
}

/// Show a generic error dialog for unexpected errors
fn show_generic_error_dialog(error_message: &str) {
    let message = format!(
        "An unexpected error occurred:\n\n{error_message}\n\n\
        Please check your configuration file or report this issue."
    );

    MessageDialog::new()
        .set_level(MessageLevel::Error)
        .set_title(format!("{APP_NAME} - Error"))
        .set_description(&message)
        .set_buttons(MessageButtons::Ok)
        .show();
}

/// Log all playback events to the console
async fn log_playback_events(controller: Arc<PlaybackController>) {
    let mut rx = controller.subscribe();

    loop {
        match rx.recv().await {
            Ok(event) => match &event {
                PlaybackEvent::PlaybackStarted { scene } => {
                    info!("Playback started at scene {}", scene + 1);
                }
                PlaybackEvent::PlaybackPaused { scene, progress } => {
                    info!("Playback paused at scene {} ({:.0}%)", scene + 1, progress);
                }
                PlaybackEvent::SceneChanged { from, to } => {
                    let title = controller
                        .storyboard()
                        .get(*to)
                        .map_or("", |scene| scene.title.as_str());
                    info!("Scene {} -> {}: {}", from + 1, to + 1, title);
                }
                PlaybackEvent::PhaseChanged { scene, phase } => {
                    info!("Scene {} entered phase {}", scene + 1, phase + 1);
                }
                PlaybackEvent::Reset { scene } => {
                    info!("Scene {} reset", scene + 1);
                }
                PlaybackEvent::Finished => {
                    info!("Slideshow finished");
                }
                PlaybackEvent::StateChanged { .. } => {
                    // Every change; summarized by the events above
                }
            },
            Err(RecvError::Closed) => {
                info!("Playback event channel closed");
                break;
            }
            Err(RecvError::Lagged(n)) => {
                info!("Missed {} playback events", n);
            }
        }
    }
}

/// Check if file logging is enabled by reading the config file.
/// This is done before full config loading to set up tracing first.
/// Returns `false` if config doesn't exist or can't be parsed.
fn check_file_logging_enabled() -> bool {
    #[derive(serde::Deserialize)]
    struct PartialConfig {
        #[serde(default)]
        logging: PartialLoggingConfig,
    }
    #[derive(serde::Deserialize, Default)]
    struct PartialLoggingConfig {
        #[serde(default)]
        enabled: bool,
    }

    let config_path = UpmvizConfig::config_path();
    let Ok(content) = std::fs::read_to_string(&config_path) else {
        return false;
    };

    toml::from_str::<PartialConfig>(&content)
        .map(|c| c.logging.enabled)
        .unwrap_or(false)
}

/// Initialize tracing with console output and optional file logging
fn init_tracing(file_logging_enabled: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer();

    if file_logging_enabled {
        let log_path = upmviz_core::log_file_path();

        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        match File::create(&log_path) {
            Ok(file) => {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt_layer)
                    .with(file_layer)
                    .init();

                return;
            }
            Err(e) => {
                eprintln!("Failed to create log file at {}: {e}", log_path.display());
            }
        }
    }

    // Fallback: console only
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
