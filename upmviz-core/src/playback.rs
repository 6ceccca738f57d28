use crate::error::{CoreError, Result};
use crate::scene::Storyboard;

/// Reference tick cadence in milliseconds
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 200;

/// Reference progress increment per tick, in percentage points
pub const DEFAULT_TICK_INCREMENT: f64 = 2.0;

/// Progress value at which a scene is complete
pub const PROGRESS_COMPLETE: f64 = 100.0;

/// Coarse playback status derived from [`PlaybackState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// Not playing; paused, reset, or freshly navigated
    Stopped,
    /// Timer is driving progress
    Playing,
    /// The last scene completed on its own
    Finished,
}

impl std::fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Stopped => "stopped",
            Self::Playing => "playing",
            Self::Finished => "finished",
        })
    }
}

/// Current slideshow position.
///
/// This is the tuple the rendering layer consumes. Every transition is a pure
/// function that takes the state by value and returns the next one, so the
/// controller can diff old and new states to decide which events to emit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    /// Index of the active scene, always in `[0, N-1]`
    pub scene_index: usize,
    /// Active phase within the scene, always in `[0, phase_count-1]`
    pub phase: u32,
    /// Percentage of the active scene elapsed, in `[0, 100]`
    pub progress: f64,
    /// Whether the timer is advancing progress
    pub is_playing: bool,
    /// Set only when the last scene completed naturally
    pub finished: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::initial()
    }
}

impl PlaybackState {
    /// State at startup: first scene, first phase, stopped.
    #[must_use]
    pub const fn initial() -> Self {
        Self {
            scene_index: 0,
            phase: 0,
            progress: 0.0,
            is_playing: false,
            finished: false,
        }
    }

    /// Coarse status of this state
    #[must_use]
    pub const fn status(&self) -> PlaybackStatus {
        if self.is_playing {
            PlaybackStatus::Playing
        } else if self.finished {
            PlaybackStatus::Finished
        } else {
            PlaybackStatus::Stopped
        }
    }

    /// Start playing. No-op if already playing.
    #[must_use]
    pub const fn apply_play(self) -> Self {
        Self {
            is_playing: true,
            finished: false,
            ..self
        }
    }

    /// Stop playing, keeping progress and phase.
    #[must_use]
    pub const fn apply_pause(self) -> Self {
        Self {
            is_playing: false,
            ..self
        }
    }

    /// Flip between playing and paused.
    #[must_use]
    pub const fn apply_toggle(self) -> Self {
        if self.is_playing {
            self.apply_pause()
        } else {
            self.apply_play()
        }
    }

    /// Rewind the current scene to its start and stop. The scene index is kept.
    #[must_use]
    pub const fn apply_reset(self) -> Self {
        Self {
            scene_index: self.scene_index,
            phase: 0,
            progress: 0.0,
            is_playing: false,
            finished: false,
        }
    }

    /// Navigator jump: select scene `index` from its start and stop playback.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SceneOutOfRange`] if `index` is not a valid scene;
    /// the caller keeps its previous state.
    pub fn apply_jump(self, storyboard: &Storyboard, index: usize) -> Result<Self> {
        if index >= storyboard.len() {
            return Err(CoreError::SceneOutOfRange {
                index,
                count: storyboard.len(),
            });
        }
        Ok(Self {
            scene_index: index,
            phase: 0,
            progress: 0.0,
            is_playing: false,
            finished: false,
        })
    }

    /// Arrow-button step by `delta` scenes, saturating at both ends.
    ///
    /// Unlike a navigator jump, stepping keeps progress and the playing flag.
    /// The phase is re-derived from the kept progress so it stays valid for
    /// the new scene's phase count. A step that saturates at either end
    /// leaves the state untouched, including the finished flag.
    #[must_use]
    pub fn apply_step(self, storyboard: &Storyboard, delta: isize) -> Self {
        let target = self
            .scene_index
            .saturating_add_signed(delta)
            .min(storyboard.last_index());
        if target == self.scene_index {
            return self;
        }
        Self {
            scene_index: target,
            phase: storyboard[target].phase_at(self.progress),
            finished: false,
            ..self
        }
    }

    /// Advance one timer tick.
    ///
    /// Adds `increment` to progress and re-derives the phase. Once progress
    /// reaches 100 the next scene starts from zero, or, on the last scene,
    /// playback stops in the finished state. Ticks on a stopped state are
    /// ignored.
    #[must_use]
    pub fn apply_tick(self, storyboard: &Storyboard, increment: f64) -> Self {
        if !self.is_playing {
            return self;
        }

        let progress = self.progress + increment.max(0.0);
        if progress < PROGRESS_COMPLETE {
            return Self {
                progress,
                phase: storyboard[self.scene_index].phase_at(progress),
                ..self
            };
        }

        if self.scene_index < storyboard.last_index() {
            Self {
                scene_index: self.scene_index + 1,
                phase: 0,
                progress: 0.0,
                is_playing: true,
                finished: false,
            }
        } else {
            Self {
                scene_index: self.scene_index,
                phase: 0,
                progress: 0.0,
                is_playing: false,
                finished: true,
            }
        }
    }

    /// Whether the scene changed between `self` and `other`
    #[must_use]
    pub const fn scene_changed(&self, other: &Self) -> bool {
        self.scene_index != other.scene_index
    }

    /// Whether playback switched between playing and stopped
    #[must_use]
    pub const fn playback_state_changed(&self, other: &Self) -> bool {
        self.is_playing != other.is_playing
    }

    /// Whether the phase changed within the same scene
    #[must_use]
    pub const fn phase_changed(&self, other: &Self) -> bool {
        self.scene_index == other.scene_index && self.phase != other.phase
    }

    /// Progress as a whole percentage for display
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn progress_percent(&self) -> u8 {
        self.progress.clamp(0.0, PROGRESS_COMPLETE).round() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneDescriptor;

    fn storyboard(phases: &[u32]) -> Storyboard {
        let scenes = phases
            .iter()
            .enumerate()
            .map(|(i, &p)| SceneDescriptor::new(format!("Scene {i}"), 10.0, p))
            .collect();
        Storyboard::new(scenes).unwrap()
    }

    fn assert_invariants(state: &PlaybackState, storyboard: &Storyboard) {
        assert!(state.scene_index < storyboard.len());
        let scene = &storyboard[state.scene_index];
        assert!(state.phase < scene.phase_count);
        assert!((0.0..=PROGRESS_COMPLETE).contains(&state.progress));
        assert_eq!(state.phase, scene.phase_at(state.progress));
    }

    #[test]
    fn test_initial_state() {
        let state = PlaybackState::initial();
        assert_eq!(state.scene_index, 0);
        assert_eq!(state.phase, 0);
        assert!(state.progress.abs() < f64::EPSILON);
        assert!(!state.is_playing);
        assert_eq!(state.status(), PlaybackStatus::Stopped);
        assert_eq!(PlaybackState::default(), state);
    }

    #[test]
    fn test_play_is_idempotent() {
        let state = PlaybackState::initial().apply_play();
        assert!(state.is_playing);
        assert_eq!(state.apply_play(), state);
    }

    #[test]
    fn test_pause_twice_equals_pause_once() {
        let board = storyboard(&[3]);
        let playing = PlaybackState::initial()
            .apply_play()
            .apply_tick(&board, 2.0)
            .apply_tick(&board, 2.0);
        let once = playing.apply_pause();
        assert_eq!(once.apply_pause(), once);
        assert!((once.progress - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_toggle_flips_playing() {
        let state = PlaybackState::initial();
        assert!(state.apply_toggle().is_playing);
        assert!(!state.apply_toggle().apply_toggle().is_playing);
    }

    #[test]
    fn test_reset_keeps_scene_index() {
        let board = storyboard(&[2, 2, 2]);
        let state = PlaybackState::initial()
            .apply_step(&board, 1)
            .apply_play()
            .apply_tick(&board, 60.0);
        let reset = state.apply_reset();
        assert_eq!(reset.scene_index, 1);
        assert_eq!(reset.phase, 0);
        assert!(reset.progress.abs() < f64::EPSILON);
        assert!(!reset.is_playing);
    }

    #[test]
    fn test_tick_ignored_when_stopped() {
        let board = storyboard(&[2]);
        let state = PlaybackState::initial();
        assert_eq!(state.apply_tick(&board, 2.0), state);
    }

    #[test]
    fn test_ticks_are_monotonic_within_scene() {
        let board = storyboard(&[4, 1]);
        let mut state = PlaybackState::initial().apply_play();
        for _ in 0..49 {
            let next = state.apply_tick(&board, 2.0);
            assert_eq!(next.scene_index, state.scene_index);
            assert!(next.progress >= state.progress);
            state = next;
        }
    }

    #[test]
    fn test_single_scene_finishes() {
        // One scene with three phases: play through to 100
        let board = storyboard(&[3]);
        let mut state = PlaybackState::initial().apply_play();
        while state.is_playing {
            state = state.apply_tick(&board, 2.0);
            assert_invariants(&state, &board);
        }
        assert_eq!(state.scene_index, 0);
        assert!(state.progress.abs() < f64::EPSILON);
        assert!(!state.is_playing);
        assert_eq!(state.status(), PlaybackStatus::Finished);
    }

    #[test]
    fn test_phase_flips_at_half_progress() {
        let board = storyboard(&[2, 2]);
        let mut state = PlaybackState::initial().apply_play();
        while state.progress < 48.0 {
            state = state.apply_tick(&board, 2.0);
            assert_eq!(state.phase, 0);
        }
        state = state.apply_tick(&board, 2.0);
        assert!((state.progress - 50.0).abs() < f64::EPSILON);
        assert_eq!(state.phase, 1);
    }

    #[test]
    fn test_scene_completion_advances_and_keeps_playing() {
        let board = storyboard(&[2, 2]);
        let mut state = PlaybackState::initial().apply_play();
        for _ in 0..50 {
            state = state.apply_tick(&board, 2.0);
        }
        assert_eq!(state.scene_index, 1);
        assert!(state.progress.abs() < f64::EPSILON);
        assert_eq!(state.phase, 0);
        assert!(state.is_playing);
        assert!(!state.finished);
    }

    #[test]
    fn test_overshooting_increment_still_advances() {
        let board = storyboard(&[2, 2]);
        let mut state = PlaybackState::initial().apply_play();
        for _ in 0..33 {
            state = state.apply_tick(&board, 3.0);
        }
        assert_eq!(state.scene_index, 0);
        assert!((state.progress - 99.0).abs() < f64::EPSILON);
        state = state.apply_tick(&board, 3.0);
        assert_eq!(state.scene_index, 1);
        assert!(state.progress.abs() < f64::EPSILON);
    }

    #[test]
    fn test_jump_resets_and_stops() {
        let board = storyboard(&[2, 3, 2]);
        let playing = PlaybackState::initial().apply_play().apply_tick(&board, 70.0);
        let jumped = playing.apply_jump(&board, 1).unwrap();
        assert_eq!(jumped.scene_index, 1);
        assert!(jumped.progress.abs() < f64::EPSILON);
        assert_eq!(jumped.phase, 0);
        assert!(!jumped.is_playing);

        let jumped_from_stopped = PlaybackState::initial().apply_jump(&board, 1).unwrap();
        assert_eq!(jumped_from_stopped, jumped);
    }

    #[test]
    fn test_jump_out_of_range_rejected() {
        let board = storyboard(&[2, 2]);
        let state = PlaybackState::initial().apply_play().apply_tick(&board, 10.0);
        let result = state.apply_jump(&board, 2);
        assert!(matches!(
            result,
            Err(CoreError::SceneOutOfRange { index: 2, count: 2 })
        ));
    }

    #[test]
    fn test_step_next_saturates_at_last_scene() {
        let board = storyboard(&[1, 1, 1]);
        let mut state = PlaybackState::initial();
        state = state.apply_step(&board, 1);
        state = state.apply_step(&board, 1);
        assert_eq!(state.scene_index, 2);
        assert_eq!(state.apply_step(&board, 1), state);
    }

    #[test]
    fn test_step_prev_saturates_at_first_scene() {
        let board = storyboard(&[1, 1]);
        let state = PlaybackState::initial();
        assert_eq!(state.apply_step(&board, -1).scene_index, 0);
        assert_eq!(state.apply_step(&board, 1).apply_step(&board, -1).scene_index, 0);
    }

    #[test]
    fn test_saturated_step_keeps_finished() {
        let board = storyboard(&[1, 1]);
        let finished = PlaybackState::initial()
            .apply_step(&board, 1)
            .apply_play()
            .apply_tick(&board, 100.0);
        assert_eq!(finished.status(), PlaybackStatus::Finished);
        assert_eq!(finished.apply_step(&board, 1), finished);

        let single = storyboard(&[2]);
        let finished = PlaybackState::initial()
            .apply_play()
            .apply_tick(&single, 100.0);
        assert_eq!(finished.apply_step(&single, -1), finished);
        assert_eq!(finished.apply_step(&single, 1), finished);
    }

    #[test]
    fn test_step_away_from_finished_clears_it() {
        let board = storyboard(&[1, 1]);
        let finished = PlaybackState::initial()
            .apply_step(&board, 1)
            .apply_play()
            .apply_tick(&board, 100.0);
        let stepped = finished.apply_step(&board, -1);
        assert_eq!(stepped.scene_index, 0);
        assert_eq!(stepped.status(), PlaybackStatus::Stopped);
    }

    #[test]
    fn test_step_keeps_progress_and_playing() {
        let board = storyboard(&[4, 2]);
        let state = PlaybackState::initial().apply_play().apply_tick(&board, 80.0);
        assert_eq!(state.phase, 3);
        let stepped = state.apply_step(&board, 1);
        assert_eq!(stepped.scene_index, 1);
        assert!((stepped.progress - 80.0).abs() < f64::EPSILON);
        assert!(stepped.is_playing);
        // Phase re-derived against the two-phase scene
        assert_eq!(stepped.phase, 1);
        assert_invariants(&stepped, &board);
    }

    #[test]
    fn test_play_after_finish_clears_finished() {
        let board = storyboard(&[1]);
        let finished = PlaybackState::initial().apply_play().apply_tick(&board, 100.0);
        assert_eq!(finished.status(), PlaybackStatus::Finished);
        let replay = finished.apply_play();
        assert_eq!(replay.status(), PlaybackStatus::Playing);
    }

    #[test]
    fn test_invariants_hold_across_mixed_operations() {
        let board = storyboard(&[3, 2, 4, 1]);
        let mut state = PlaybackState::initial().apply_play();
        for step in 0..400 {
            state = match step % 37 {
                5 => state.apply_step(&board, 1),
                11 => state.apply_step(&board, -1),
                17 => state.apply_toggle(),
                23 => state.apply_jump(&board, step % board.len()).unwrap(),
                29 => state.apply_reset().apply_play(),
                31 => state.apply_play(),
                _ => state.apply_tick(&board, 2.0),
            };
            assert_invariants(&state, &board);
        }
    }

    #[test]
    fn test_change_detection() {
        let board = storyboard(&[2, 2]);
        let a = PlaybackState::initial();
        let b = a.apply_play();
        assert!(a.playback_state_changed(&b));
        assert!(!a.scene_changed(&b));

        let c = b.apply_tick(&board, 50.0);
        assert!(b.phase_changed(&c));

        let d = c.apply_step(&board, 1);
        assert!(c.scene_changed(&d));
        assert!(!c.phase_changed(&d));
    }

    #[test]
    fn test_progress_percent() {
        let board = storyboard(&[2]);
        let state = PlaybackState::initial().apply_play().apply_tick(&board, 33.4);
        assert_eq!(state.progress_percent(), 33);
    }
}
