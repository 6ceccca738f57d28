//! Scene table driving the slideshow.
//!
//! A [`Storyboard`] is the ordered, validated list of scenes. It is built once
//! at startup (either the built-in narrative or a `[[scenes]]` override from
//! the config file) and never mutated afterwards.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// One scene of the narrative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescriptor {
    /// Title shown in the controls bar, navigator tooltip and info panel
    pub title: String,
    /// Nominal scene length in seconds. Informational only; pacing comes from
    /// the tick cadence.
    pub duration_secs: f64,
    /// Number of visual phases, equally spaced over the 0-100 progress range
    #[serde(rename = "phases")]
    pub phase_count: u32,
    /// Explanatory text for the info panel
    #[serde(default)]
    pub narration: Option<String>,
}

impl SceneDescriptor {
    /// Create a new scene descriptor without narration
    pub fn new(title: impl Into<String>, duration_secs: f64, phase_count: u32) -> Self {
        Self {
            title: title.into(),
            duration_secs,
            phase_count,
            narration: None,
        }
    }

    /// Attach narration text
    #[must_use]
    pub fn with_narration(mut self, narration: impl Into<String>) -> Self {
        self.narration = Some(narration.into());
        self
    }

    /// Phase index for a progress percentage, clamped to `[0, phase_count - 1]`.
    ///
    /// Computed as `floor(progress * phase_count / 100)`, which equals
    /// `floor(progress / (100 / phase_count))` without the rounding error of
    /// dividing by a repeating fraction.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn phase_at(&self, progress: f64) -> u32 {
        let last = self.phase_count.saturating_sub(1);
        if !progress.is_finite() || progress <= 0.0 {
            return 0;
        }
        let raw = (progress * f64::from(self.phase_count) / 100.0).floor();
        if raw >= f64::from(last) {
            return last;
        }
        raw as u32
    }

    fn validate(&self, index: usize) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(CoreError::InvalidScene {
                index,
                reason: "title must not be empty".into(),
            });
        }
        if self.phase_count == 0 {
            return Err(CoreError::InvalidScene {
                index,
                reason: "phases must be at least 1".into(),
            });
        }
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(CoreError::InvalidScene {
                index,
                reason: format!(
                    "duration_secs must be a positive number, got {}",
                    self.duration_secs
                ),
            });
        }
        Ok(())
    }
}

/// Immutable, non-empty, validated sequence of scenes.
#[derive(Debug, Clone, PartialEq)]
pub struct Storyboard {
    scenes: Vec<SceneDescriptor>,
}

impl Storyboard {
    /// Build a storyboard, validating every scene.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyStoryboard`] for an empty list and
    /// [`CoreError::InvalidScene`] for the first scene with a blank title,
    /// zero phases, or a non-positive duration.
    pub fn new(scenes: Vec<SceneDescriptor>) -> Result<Self> {
        if scenes.is_empty() {
            return Err(CoreError::EmptyStoryboard);
        }
        for (index, scene) in scenes.iter().enumerate() {
            scene.validate(index)?;
        }
        Ok(Self { scenes })
    }

    /// The built-in thirteen-scene UPM narrative.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            scenes: builtin_scenes(),
        }
    }

    /// Number of scenes (always at least 1)
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Index of the final scene
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.scenes.len().saturating_sub(1)
    }

    /// Scene at `index`, if any
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SceneDescriptor> {
        self.scenes.get(index)
    }

    /// Iterate over scenes in order
    pub fn iter(&self) -> std::slice::Iter<'_, SceneDescriptor> {
        self.scenes.iter()
    }
}

impl Default for Storyboard {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Index<usize> for Storyboard {
    type Output = SceneDescriptor;

    fn index(&self, index: usize) -> &Self::Output {
        &self.scenes[index]
    }
}

impl<'a> IntoIterator for &'a Storyboard {
    type Item = &'a SceneDescriptor;
    type IntoIter = std::slice::Iter<'a, SceneDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.scenes.iter()
    }
}

fn builtin_scenes() -> Vec<SceneDescriptor> {
    vec![
        SceneDescriptor::new("Problem & Motivation", 25.0, 3).with_narration(
            "Large models are valuable and trained across many machines. In decentralized settings, weight materialization poses a risk to model value.",
        ),
        SceneDescriptor::new("Pipeline Parallelism Setup", 20.0, 2).with_narration(
            "We shard the network into S pipeline stages. Each participant only processes its local stage; no one holds the full model.",
        ),
        SceneDescriptor::new("Threat: Piecewise Sybil", 20.0, 3).with_narration(
            "An attacker can rejoin over many time steps, quietly collecting different stages until they stitch together a full set of weights.",
        ),
        SceneDescriptor::new("UPMs: Core Idea", 30.0, 4).with_narration(
            "UPMs periodically insert canceling transforms at every boundary - folding a random matrix into one side and its inverse into the other.",
        ),
        SceneDescriptor::new("Cross-Time Incompatibility", 25.0, 2).with_narration(
            "Across different times, adjacent shards require an unknown bridge matrix to align. Without it, stitched weights don't compose correctly.",
        ),
        SceneDescriptor::new("Valid Subfunctions", 25.0, 2).with_narration(
            "We reason on valid subfunctions with clear entry and exit matrices. Transforms preserve composed output while morphing weights.",
        ),
        SceneDescriptor::new("Transformer Layers", 15.0, 2).with_narration(
            "In Transformer layers, skip connections tie the boundary transforms - compatibility at one side depends on the other.",
        ),
        SceneDescriptor::new("RMSNorm Tweak", 15.0, 2).with_narration(
            "For RMSNorm, we accumulate transforms inside a hidden orthogonal matrix and move per-feature scales into the next layer.",
        ),
        SceneDescriptor::new("Functional Equivalence", 15.0, 1).with_narration(
            "Empirically, output drift remains negligible even after ten thousand morphs at FP32 precision.",
        ),
        SceneDescriptor::new("Inference Overheads", 20.0, 3).with_narration(
            "The amortized overheads are modest: about 3% latency, 0.1% bandwidth, and 10% extra GPU memory when morphing every 30 seconds.",
        ),
        SceneDescriptor::new("Attacks", 25.0, 2).with_narration(
            "Activation-based recovery requires impractical conditions, and learning-based recovery still consumes ~60% of training tokens.",
        ),
        SceneDescriptor::new("Training Feasibility", 15.0, 1).with_narration(
            "With a compatible optimizer, training tracks the baseline with minimal overhead when applying transforms every 100 steps.",
        ),
        SceneDescriptor::new("Takeaway", 20.0, 2).with_narration(
            "UPMs bind value to the protocol rather than a static checkpoint - enabling collaborative training without exposing materializable weights.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_storyboard_is_valid() {
        let storyboard = Storyboard::builtin();
        assert_eq!(storyboard.len(), 13);
        assert_eq!(storyboard.last_index(), 12);
        assert!(Storyboard::new(builtin_scenes()).is_ok());
    }

    #[test]
    fn test_builtin_storyboard_phase_counts() {
        let phases: Vec<u32> = Storyboard::builtin().iter().map(|s| s.phase_count).collect();
        assert_eq!(phases, vec![3, 2, 3, 4, 2, 2, 2, 2, 1, 3, 2, 1, 2]);
    }

    #[test]
    fn test_builtin_storyboard_has_narration() {
        assert!(Storyboard::builtin().iter().all(|s| s.narration.is_some()));
    }

    #[test]
    fn test_empty_storyboard_rejected() {
        let result = Storyboard::new(Vec::new());
        assert!(matches!(result, Err(CoreError::EmptyStoryboard)));
    }

    #[test]
    fn test_zero_phases_rejected() {
        let scenes = vec![
            SceneDescriptor::new("Intro", 10.0, 1),
            SceneDescriptor::new("Broken", 10.0, 0),
        ];
        let result = Storyboard::new(scenes);
        assert!(matches!(result, Err(CoreError::InvalidScene { index: 1, .. })));
    }

    #[test]
    fn test_non_positive_duration_rejected() {
        for duration in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let result = Storyboard::new(vec![SceneDescriptor::new("Intro", duration, 2)]);
            assert!(
                matches!(result, Err(CoreError::InvalidScene { index: 0, .. })),
                "duration {duration} should be rejected"
            );
        }
    }

    #[test]
    fn test_blank_title_rejected() {
        let result = Storyboard::new(vec![SceneDescriptor::new("   ", 10.0, 2)]);
        assert!(matches!(result, Err(CoreError::InvalidScene { index: 0, .. })));
    }

    #[test]
    fn test_phase_at_two_phases() {
        let scene = SceneDescriptor::new("Two", 10.0, 2);
        assert_eq!(scene.phase_at(0.0), 0);
        assert_eq!(scene.phase_at(48.0), 0);
        assert_eq!(scene.phase_at(49.999), 0);
        assert_eq!(scene.phase_at(50.0), 1);
        assert_eq!(scene.phase_at(98.0), 1);
    }

    #[test]
    fn test_phase_at_three_phases() {
        let scene = SceneDescriptor::new("Three", 10.0, 3);
        assert_eq!(scene.phase_at(32.0), 0);
        assert_eq!(scene.phase_at(34.0), 1);
        assert_eq!(scene.phase_at(66.0), 1);
        assert_eq!(scene.phase_at(68.0), 2);
    }

    #[test]
    fn test_phase_at_clamps_to_last_phase() {
        let scene = SceneDescriptor::new("Four", 10.0, 4);
        assert_eq!(scene.phase_at(100.0), 3);
        assert_eq!(scene.phase_at(250.0), 3);
    }

    #[test]
    fn test_phase_at_single_phase() {
        let scene = SceneDescriptor::new("One", 10.0, 1);
        assert_eq!(scene.phase_at(0.0), 0);
        assert_eq!(scene.phase_at(99.0), 0);
    }

    #[test]
    fn test_phase_at_negative_or_nan() {
        let scene = SceneDescriptor::new("Two", 10.0, 2);
        assert_eq!(scene.phase_at(-10.0), 0);
        assert_eq!(scene.phase_at(f64::NAN), 0);
    }

    #[test]
    fn test_phase_starts_exactly_on_each_boundary() {
        // Phase counts whose boundaries are exact in binary floating point
        for phases in [1_u32, 2, 4, 5] {
            let scene = SceneDescriptor::new("Boundaries", 10.0, phases);
            for k in 0..phases {
                let boundary = f64::from(k) * 100.0 / f64::from(phases);
                assert_eq!(scene.phase_at(boundary), k, "phases={phases} k={k}");
                if k > 0 {
                    assert_eq!(scene.phase_at(boundary - 0.01), k - 1);
                }
            }
        }
    }

    #[test]
    fn test_deserialize_scene_from_toml() {
        let scene: SceneDescriptor = toml::from_str(
            r#"
title = "Custom"
duration_secs = 12.5
phases = 3
narration = "Hello"
"#,
        )
        .unwrap();
        assert_eq!(scene.title, "Custom");
        assert_eq!(scene.phase_count, 3);
        assert_eq!(scene.narration.as_deref(), Some("Hello"));
    }
}
