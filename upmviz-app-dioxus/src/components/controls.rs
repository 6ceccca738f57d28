use crate::bridge::CommandSender;
use crate::state::SlideshowState;
use dioxus::prelude::*;
use std::sync::Arc;
use upmviz_core::{Command, PlaybackController, PlaybackStatus};

/// Prev / play-pause / reset / next buttons with the scene progress bar
#[component]
pub fn Controls() -> Element {
    let slideshow = use_context::<SlideshowState>();
    let controller = use_context::<Arc<PlaybackController>>();
    let commands = use_context::<CommandSender>();

    let index = *slideshow.scene_index.read();
    let progress = *slideshow.progress.read();
    let status = slideshow.status();

    let storyboard = controller.storyboard();
    let at_first = index == 0;
    let at_last = index >= storyboard.last_index();
    let label = scene_label(
        index,
        storyboard.len(),
        storyboard.get(index).map(|scene| scene.title.as_str()),
    );
    let width = progress_width(progress);
    let toggle_label = play_label(status);
    let fill_class = if status == PlaybackStatus::Playing {
        "progress-fill playing"
    } else {
        "progress-fill"
    };

    let prev = commands.clone();
    let toggle = commands.clone();
    let reset = commands.clone();
    let next = commands;

    rsx! {
        div {
            class: "controls",
            div {
                class: "controls-row",
                button {
                    class: "control-button",
                    disabled: at_first,
                    onclick: move |_| prev.send(Command::StepPrev),
                    "◀ Prev"
                }
                button {
                    class: "control-button primary",
                    onclick: move |_| toggle.send(Command::Toggle),
                    "{toggle_label}"
                }
                button {
                    class: "control-button",
                    onclick: move |_| reset.send(Command::Reset),
                    "↺ Reset"
                }
                button {
                    class: "control-button",
                    disabled: at_last,
                    onclick: move |_| next.send(Command::StepNext),
                    "Next ▶"
                }
                span { class: "scene-label", "{label}" }
            }
            div {
                class: "progress-track",
                div {
                    class: "{fill_class}",
                    style: "width: {width};",
                }
            }
        }
    }
}

const fn play_label(status: PlaybackStatus) -> &'static str {
    match status {
        PlaybackStatus::Playing => "⏸ Pause",
        PlaybackStatus::Stopped => "▶ Play",
        PlaybackStatus::Finished => "↻ Replay",
    }
}

fn scene_label(index: usize, count: usize, title: Option<&str>) -> String {
    let position = format!("{} / {count}", index + 1);
    match title {
        Some(title) => format!("{position} · {title}"),
        None => position,
    }
}

/// CSS width for the progress bar, clamped to `[0%, 100%]`
fn progress_width(progress: f64) -> String {
    format!("{:.1}%", progress.clamp(0.0, 100.0))
}
