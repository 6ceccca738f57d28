use dioxus::prelude::*;

/// Swatch class and label for each colour used across the scenes
const LEGEND_ENTRIES: [(&str, &str); 4] = [
    ("honest", "Honest Node"),
    ("attacker", "Attacker"),
    ("transform", "Transform"),
    ("data", "Data/Activations"),
];

#[component]
pub fn Legend() -> Element {
    rsx! {
        div {
            class: "legend",
            for (swatch, label) in LEGEND_ENTRIES {
                div {
                    key: "{swatch}",
                    class: "legend-item",
                    span { class: "swatch {swatch}" }
                    span { "{label}" }
                }
            }
        }
    }
}
