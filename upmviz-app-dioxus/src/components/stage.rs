use super::scenes::render_scene;
use crate::state::SlideshowState;
use dioxus::prelude::*;
use std::sync::Arc;
use upmviz_core::PlaybackController;

/// Main canvas showing the active scene at its current phase.
/// Only the scene index and phase are read, so progress ticks alone do not re-render it.
#[component]
pub fn Stage() -> Element {
    let slideshow = use_context::<SlideshowState>();
    let controller = use_context::<Arc<PlaybackController>>();

    let index = *slideshow.scene_index.read();
    let phase = *slideshow.phase.read();

    let Some(scene) = controller.storyboard().get(index) else {
        return rsx! {
            div { class: "stage" }
        };
    };

    rsx! {
        div {
            class: "stage",
            {render_scene(index, phase, scene)}
        }
    }
}
