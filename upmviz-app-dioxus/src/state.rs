use dioxus::prelude::*;
use upmviz_core::{PlaybackState, PlaybackStatus};

/// Slideshow display state with one signal per rendered field.
///
/// Components subscribe only to the signals they read, so a progress tick
/// re-renders the progress bar without rebuilding the scene stage unless the
/// phase also moved.
#[derive(Clone, Copy)]
pub struct SlideshowState {
    /// Index of the active scene
    pub scene_index: Signal<usize>,
    /// Active phase within the scene
    pub phase: Signal<u32>,
    /// Scene progress in percent, `[0, 100]`
    pub progress: Signal<f64>,
    /// Whether the timer is running
    pub is_playing: Signal<bool>,
    /// Whether the last scene completed
    pub finished: Signal<bool>,
}

impl SlideshowState {
    /// Create display state mirroring `state`
    #[must_use]
    pub fn new(state: PlaybackState) -> Self {
        Self {
            scene_index: Signal::new(state.scene_index),
            phase: Signal::new(state.phase),
            progress: Signal::new(state.progress),
            is_playing: Signal::new(state.is_playing),
            finished: Signal::new(state.finished),
        }
    }

    /// Copy a controller snapshot into the signals, touching only fields that differ
    pub fn apply(&mut self, state: PlaybackState) {
        if *self.scene_index.peek() != state.scene_index {
            self.scene_index.set(state.scene_index);
        }
        if *self.phase.peek() != state.phase {
            self.phase.set(state.phase);
        }
        if (*self.progress.peek() - state.progress).abs() > f64::EPSILON {
            self.progress.set(state.progress);
        }
        if *self.is_playing.peek() != state.is_playing {
            self.is_playing.set(state.is_playing);
        }
        if *self.finished.peek() != state.finished {
            self.finished.set(state.finished);
        }
    }

    /// Current status derived from the playing and finished flags
    #[must_use]
    pub fn status(&self) -> PlaybackStatus {
        PlaybackState {
            scene_index: *self.scene_index.read(),
            phase: *self.phase.read(),
            progress: *self.progress.read(),
            is_playing: *self.is_playing.read(),
            finished: *self.finished.read(),
        }
        .status()
    }
}

impl Default for SlideshowState {
    fn default() -> Self {
        Self::new(PlaybackState::initial())
    }
}
