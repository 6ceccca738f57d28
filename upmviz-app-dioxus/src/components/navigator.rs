use crate::bridge::CommandSender;
use crate::state::SlideshowState;
use dioxus::prelude::*;
use std::sync::Arc;
use upmviz_core::{Command, PlaybackController, SceneDescriptor};

/// One dot per scene; clicking a dot jumps to that scene
#[component]
pub fn Navigator() -> Element {
    let slideshow = use_context::<SlideshowState>();
    let controller = use_context::<Arc<PlaybackController>>();
    let commands = use_context::<CommandSender>();

    let current = *slideshow.scene_index.read();

    let dots: Vec<_> = controller
        .storyboard()
        .iter()
        .enumerate()
        .map(|(index, scene)| {
            (
                index,
                dot_class(index, current),
                dot_tooltip(scene),
                commands.clone(),
            )
        })
        .collect();

    rsx! {
        nav {
            class: "navigator",
            for (index, class, tooltip, sender) in dots {
                button {
                    key: "{index}",
                    class: "{class}",
                    title: "{tooltip}",
                    onclick: move |_| sender.send(Command::JumpTo(index)),
                }
            }
        }
    }
}

fn dot_class(index: usize, current: usize) -> &'static str {
    match index.cmp(&current) {
        std::cmp::Ordering::Less => "nav-dot visited",
        std::cmp::Ordering::Equal => "nav-dot active",
        std::cmp::Ordering::Greater => "nav-dot",
    }
}

fn dot_tooltip(scene: &SceneDescriptor) -> String {
    format!("{} ({}s)", scene.title, scene.duration_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_class() {
        assert_eq!(dot_class(0, 2), "nav-dot visited");
        assert_eq!(dot_class(2, 2), "nav-dot active");
        assert_eq!(dot_class(5, 2), "nav-dot");
    }

    #[test]
    fn test_dot_tooltip() {
        let scene = SceneDescriptor::new("Attacks", 25.0, 2);
        assert_eq!(dot_tooltip(&scene), "Attacks (25s)");
    }
}
