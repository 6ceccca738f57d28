use crate::bridge::CommandSender;
use crate::components::{Controls, Header, InfoPanel, Legend, Navigator, Stage};
use crate::theme_watcher::use_theme_watcher;
use dioxus::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use upmviz_core::{KeyBindings, UiConfig};

/// Root application component.
/// Lays out the slideshow and routes bound key presses to the controller.
#[component]
pub fn App() -> Element {
    let cancel_token = use_context::<CancellationToken>();
    let ui = use_context::<UiConfig>();
    let keys = use_context::<KeyBindings>();
    let commands = use_context::<CommandSender>();

    let css = use_theme_watcher(cancel_token);

    let on_key_down = move |evt: KeyboardEvent| {
        let key = evt.key().to_string();
        match keys.resolve(&key) {
            Some(command) => {
                // Keeps Space and the arrows from scrolling the page
                evt.prevent_default();
                commands.send(command);
            }
            None => debug!("Unbound key: {key:?}"),
        }
    };

    // Focus the root so shortcuts work without a click first
    let on_mounted = move |evt: MountedEvent| async move {
        if let Err(e) = evt.set_focus(true).await {
            warn!("Failed to focus slideshow root, shortcuts need a click first: {e:?}");
        }
    };

    rsx! {
        style { "{css}" }
        div {
            class: "app",
            tabindex: "0",
            onkeydown: on_key_down,
            onmounted: on_mounted,

            Header { title: ui.title.clone(), subtitle: ui.subtitle.clone() }
            if ui.show_legend {
                Legend {}
            }
            Stage {}
            Navigator {}
            Controls {}
            if ui.show_info_panel {
                InfoPanel {}
            }
        }
    }
}
