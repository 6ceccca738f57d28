use crate::state::SlideshowState;
use dioxus::prelude::*;
use std::sync::Arc;
use upmviz_core::PlaybackController;

/// Title and narration for the active scene
#[component]
pub fn InfoPanel() -> Element {
    let slideshow = use_context::<SlideshowState>();
    let controller = use_context::<Arc<PlaybackController>>();

    let index = *slideshow.scene_index.read();
    let Some(scene) = controller.storyboard().get(index) else {
        return rsx! {};
    };
    let title = &scene.title;

    rsx! {
        section {
            class: "info-panel",
            h2 { "{title}" }
            if let Some(narration) = scene.narration.as_deref() {
                p { "{narration}" }
            }
        }
    }
}
