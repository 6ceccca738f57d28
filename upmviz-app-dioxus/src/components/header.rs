use dioxus::prelude::*;

/// Slideshow title and subtitle
#[component]
pub fn Header(title: String, subtitle: String) -> Element {
    rsx! {
        header {
            class: "header",
            h1 { class: "title", "{title}" }
            if !subtitle.is_empty() {
                p { class: "subtitle", "{subtitle}" }
            }
        }
    }
}
