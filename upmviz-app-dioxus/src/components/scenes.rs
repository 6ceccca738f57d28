//! Scene visuals.
//!
//! Each built-in scene is a plain function of the current phase. The stage
//! looks the renderer up by scene index; indices past the built-in set (from a
//! custom `[[scenes]]` storyboard) fall back to a title card.

use dioxus::prelude::*;
use upmviz_core::SceneDescriptor;

type SceneRenderer = fn(u32) -> Element;

/// Renderers for the built-in storyboard, in scene order
const SCENE_RENDERERS: [SceneRenderer; 13] = [
    problem_and_motivation,
    pipeline_parallelism,
    piecewise_sybil,
    core_idea,
    cross_time_incompatibility,
    valid_subfunctions,
    transformer_layers,
    rmsnorm_tweak,
    functional_equivalence,
    inference_overheads,
    attacks,
    training_feasibility,
    takeaway,
];

/// Number of scenes with a dedicated renderer
pub const BUILTIN_RENDERER_COUNT: usize = SCENE_RENDERERS.len();

/// Render scene `index` at `phase`, falling back to a title card
pub fn render_scene(index: usize, phase: u32, scene: &SceneDescriptor) -> Element {
    SCENE_RENDERERS.get(index).map_or_else(
        || title_card(&scene.title, scene.narration.as_deref()),
        |render| render(phase),
    )
}

/// Labels `f1`..`fN` for pipeline shards
fn shard_labels(count: usize) -> impl Iterator<Item = (usize, String)> {
    (0..count).map(|i| (i, format!("f{}", i + 1)))
}

/// Shard the attacker occupies at each re-join
const fn attacker_shard(phase: u32) -> Option<usize> {
    match phase {
        0 => Some(2),
        1 => Some(0),
        2 => Some(4),
        _ => None,
    }
}

/// Class for an element revealed once `phase` reaches `from`
const fn reveal(phase: u32, from: u32) -> &'static str {
    if phase >= from {
        "appear"
    } else {
        "concealed"
    }
}

fn title_card(title: &str, narration: Option<&str>) -> Element {
    rsx! {
        div {
            class: "scene title-card",
            h2 { "{title}" }
            if let Some(narration) = narration {
                p { class: "caption-sub", "{narration}" }
            }
        }
    }
}

fn problem_and_motivation(phase: u32) -> Element {
    rsx! {
        div {
            class: "scene",
            if phase == 0 {
                div {
                    class: "col appear",
                    div { class: "node large honest", "High-Value Model" }
                    p { class: "caption-sub", "Trained across many machines at great cost" }
                }
            } else {
                div {
                    class: "shard-grid",
                    for (i, label) in shard_labels(8) {
                        div { key: "{i}", class: "node honest appear", "{label}" }
                    }
                }
            }
            if phase >= 2 {
                div {
                    class: "risk-box appear",
                    strong { "Risk: Weight Materialization" }
                    span { "Anyone can reconstruct full model value" }
                }
            }
        }
    }
}

fn pipeline_parallelism(phase: u32) -> Element {
    let arrow_class = if phase >= 1 { "arrow appear" } else { "arrow concealed" };

    rsx! {
        div {
            class: "scene",
            div {
                class: "row",
                div { class: "node data formula", "X₀" }
                for (i, label) in shard_labels(5) {
                    div {
                        key: "{i}",
                        class: "row",
                        span { class: "{arrow_class}", "→" }
                        div { class: "node honest", "{label}" }
                    }
                }
                span { class: "{arrow_class}", "→" }
                div { class: "node data formula", "Y" }
            }
            p { class: "caption formula", "F(X₀) = fₛ ∘ ... ∘ f₁(X₀)" }
            p { class: "caption-sub", "Each participant holds only its local stage" }
        }
    }
}

fn piecewise_sybil(phase: u32) -> Element {
    let attacker = attacker_shard(phase);
    let active_time = usize::try_from(phase).ok();

    rsx! {
        div {
            class: "scene",
            div {
                class: "row",
                for (t, label) in ["t1", "t2", "t3"].into_iter().enumerate() {
                    span {
                        key: "{label}",
                        class: if active_time == Some(t) { "time-label active" } else { "time-label" },
                        "{label}"
                    }
                }
            }
            div {
                class: "row",
                for (i, label) in shard_labels(5) {
                    div {
                        key: "{i}",
                        class: if attacker == Some(i) { "node attacker" } else { "node honest" },
                        "{label}"
                    }
                }
            }
            p { class: "caption", "Attacker re-joins over time, collecting shards" }
        }
    }
}

fn core_idea(phase: u32) -> Element {
    rsx! {
        div {
            class: "scene",
            div {
                class: "row",
                div {
                    class: "col",
                    div {
                        class: "row",
                        div { class: "node large honest", "Stage i" }
                        if phase >= 2 {
                            div {
                                class: "col appear",
                                div { class: "transform-bar" }
                                span { class: "time-label", "T" }
                            }
                        }
                    }
                    if phase >= 3 {
                        span { class: "formula appear", "Vᵢ ← Vᵢ * T" }
                    }
                }
                if phase < 2 {
                    div { class: "node data", "I" }
                }
                if phase == 1 {
                    div {
                        class: "row appear",
                        div { class: "node transform", "T" }
                        span { "*" }
                        div { class: "node transform", "T⁻¹" }
                    }
                }
                div {
                    class: "col",
                    div {
                        class: "row",
                        if phase >= 2 {
                            div {
                                class: "col appear",
                                div { class: "transform-bar" }
                                span { class: "time-label", "T⁻¹" }
                            }
                        }
                        div { class: "node large honest", "Stage i+1" }
                    }
                    if phase >= 3 {
                        span { class: "formula appear", "Uᵢ₊₁ ← T⁻¹ * Uᵢ₊₁" }
                    }
                }
            }
            p { class: "caption", "Insert I = T * T⁻¹, then fold" }
            p { class: "caption-sub", "Function stays identical, weights become time-dependent" }
        }
    }
}

fn cross_time_incompatibility(phase: u32) -> Element {
    rsx! {
        div {
            class: "scene",
            div {
                class: "row",
                div {
                    class: "col stage-box",
                    span { class: "caption", "Time t" }
                    div { class: "node honest", "Stage i(t)" }
                    div { class: "node honest", "Stage i+1(t)" }
                }
                if phase >= 1 {
                    div {
                        class: "col appear",
                        div { class: "bridge", "T̂ = ?" }
                        span { class: "warning", "✗" }
                    }
                }
                div {
                    class: "col stage-box",
                    span { class: "caption", "Time t'" }
                    div { class: "node honest", "Stage i(t')" }
                    div { class: "node honest", "Stage i+1(t')" }
                }
            }
            p { class: "caption formula", "Need T̂ = Tᵢ(t+1) ... Tᵢ(t') - Unknown!" }
        }
    }
}

fn valid_subfunctions(phase: u32) -> Element {
    rsx! {
        div {
            class: "scene",
            div {
                class: "row",
                div {
                    class: "col",
                    div { class: "node data formula", "Uᵢ" }
                    span { class: "time-label", "entry" }
                }
                span { class: "arrow", "→" }
                div { class: "node large transform", "Φᵢ" }
                span { class: "arrow", "→" }
                div {
                    class: "col",
                    div { class: "node data formula", "Vᵢ" }
                    span { class: "time-label", "exit" }
                }
            }
            p { class: "caption formula", "gᵢ(X) = Φᵢ(X · Uᵢ) · Vᵢ" }
            if phase >= 1 {
                p {
                    class: "caption-sub appear",
                    "Valid subfunctions have clear entry and exit matrices for transform folding"
                }
            }
        }
    }
}

fn transformer_layers(phase: u32) -> Element {
    let skip_visibility = reveal(phase, 1);

    rsx! {
        div {
            class: "scene",
            div {
                class: "col stage-box",
                div {
                    class: "skip-line {skip_visibility}",
                    "skip connection"
                }
                div {
                    class: "row",
                    if phase >= 1 {
                        div { class: "node transform appear", "Tᵢₙ" }
                    }
                    div { class: "node large honest", "Transformer Block" }
                    if phase >= 1 {
                        div { class: "node transform appear", "Tₒᵤₜ" }
                    }
                }
            }
            p { class: "caption", "Skip connections tie boundary transforms" }
            p { class: "caption-sub", "Compatibility at one side depends on the other" }
        }
    }
}

fn rmsnorm_tweak(phase: u32) -> Element {
    rsx! {
        div {
            class: "scene",
            div {
                class: "row",
                div {
                    class: "col",
                    div { class: "node large honest", "RMSNorm" }
                    div { class: "node transform formula", "Q(t)" }
                }
                if phase >= 1 {
                    div {
                        class: "col appear",
                        span { class: "time-label", "Move scales →" }
                        span { class: "arrow", "→" }
                    }
                    div { class: "node large honest appear", "Next Layer" }
                }
            }
            p { class: "caption-sub formula", "Accumulate into Q(t); move scales forward" }
        }
    }
}

fn functional_equivalence(_phase: u32) -> Element {
    rsx! {
        div {
            class: "scene",
            div {
                class: "row",
                div {
                    class: "metric-card appear",
                    div { class: "metric-label", "Jensen-Shannon Distance" }
                    div { class: "metric-value", "< 4 × 10⁻⁵" }
                }
                div {
                    class: "metric-card appear",
                    div { class: "metric-label", "Perplexity Change" }
                    div { class: "metric-value", "ΔPPL < 0.01" }
                }
            }
            p { class: "caption-sub", "10,000 morphs in FP32" }
        }
    }
}

fn inference_overheads(phase: u32) -> Element {
    const OVERHEADS: [(&str, &str); 3] = [
        ("~3%", "Latency"),
        ("~0.1%", "Bandwidth"),
        ("~10%", "GPU Memory"),
    ];

    rsx! {
        div {
            class: "scene",
            div {
                class: "row",
                for (visibility, (value, label)) in (0u32..).map(|from| reveal(phase, from)).zip(OVERHEADS) {
                    div {
                        key: "{label}",
                        class: "metric-card {visibility}",
                        div { class: "metric-value", "{value}" }
                        div { class: "metric-label", "{label}" }
                    }
                }
            }
            p { class: "caption-sub", "Morph every 30 seconds" }
        }
    }
}

fn attacks(phase: u32) -> Element {
    let bar_width = if phase >= 1 { "60%" } else { "0%" };

    rsx! {
        div {
            class: "scene",
            div {
                class: "row",
                div {
                    class: "metric-card",
                    div { class: "metric-label warning", "Activation-based Recovery" }
                    div { class: "metric-value", "⚠️" }
                    div { class: "metric-label", "Impractical conditions required" }
                }
                div {
                    class: "metric-card",
                    div { class: "metric-label warning", "Learning-based Recovery" }
                    div {
                        class: "bar-track",
                        div {
                            // Re-keyed so the soak animation replays when the bar fills
                            key: "{bar_width}",
                            class: "bar-fill",
                            style: "--soak-width: {bar_width};",
                        }
                    }
                    div { class: "metric-label", "≥60% tokens vs scratch" }
                }
            }
            p { class: "caption-sub", "Token cost versus training from scratch" }
        }
    }
}

fn training_feasibility(_phase: u32) -> Element {
    const RESULTS: [(&str, &str); 3] = [
        ("Validation Loss", "Matches baseline"),
        ("Time", "+1.6%"),
        ("Memory", "<1%"),
    ];

    rsx! {
        div {
            class: "scene",
            p { class: "caption", "Training with Muon Optimizer" }
            div {
                class: "row",
                for (label, value) in RESULTS {
                    div {
                        key: "{label}",
                        class: "metric-card appear",
                        div { class: "metric-label", "{label}" }
                        div { class: "metric-value", "{value}" }
                    }
                }
            }
            p { class: "caption-sub", "Orthogonal transforms every 100 steps" }
        }
    }
}

fn takeaway(phase: u32) -> Element {
    let locked = phase >= 1;

    rsx! {
        div {
            class: "scene",
            div {
                class: "row",
                for (i, label) in shard_labels(5) {
                    div {
                        key: "{i}",
                        class: "node honest",
                        "{label}"
                        if locked {
                            span { class: "lock appear", "🔒" }
                        }
                    }
                }
            }
            div {
                class: "row",
                span { class: "arrow", "→" }
                span { class: "formula", "Inference requests" }
            }
            p { class: "caption", "Value bound to protocol, not a checkpoint" }
            p {
                class: "caption-sub",
                "Collaborative training and serving without exposing materializable weights"
            }
        }
    }
}
