//! Playback controller: owns the [`PlaybackState`] and the timer that drives it.

use crate::command::Command;
use crate::error::{CoreError, Result};
use crate::playback::{PlaybackState, DEFAULT_TICK_INCREMENT, DEFAULT_TICK_INTERVAL_MS};
use crate::scene::Storyboard;
use crate::time::DurationExt;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Timer cadence and per-tick progress increment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSettings {
    interval: Duration,
    increment: f64,
}

impl TickSettings {
    /// Create tick settings.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigInvalid`] if the interval is zero or the
    /// increment is not in `(0, 100]`.
    pub fn new(interval: Duration, increment: f64) -> Result<Self> {
        if interval.is_zero() {
            return Err(CoreError::ConfigInvalid {
                message: "tick interval must be greater than zero".into(),
            });
        }
        if !increment.is_finite() || increment <= 0.0 || increment > 100.0 {
            return Err(CoreError::ConfigInvalid {
                message: format!("tick increment must be in (0, 100], got {increment}"),
            });
        }
        Ok(Self {
            interval,
            increment,
        })
    }

    /// Time between ticks
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Progress added per tick, in percentage points
    #[must_use]
    pub const fn increment(&self) -> f64 {
        self.increment
    }
}

impl Default for TickSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            increment: DEFAULT_TICK_INCREMENT,
        }
    }
}

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// Sent after every change; carries the full rendering tuple
    StateChanged { state: PlaybackState },
    /// Playback started or resumed
    PlaybackStarted { scene: usize },
    /// Playback was paused or stopped by navigation
    PlaybackPaused { scene: usize, progress: f64 },
    /// A different scene became active
    SceneChanged { from: usize, to: usize },
    /// The phase advanced within the active scene
    PhaseChanged { scene: usize, phase: u32 },
    /// The active scene was rewound
    Reset { scene: usize },
    /// The last scene completed and playback stopped
    Finished,
}

/// Handle for the currently armed timer task
struct ArmedTimer {
    generation: u64,
    cancel: CancellationToken,
}

/// Controller state guarded by a single lock so ticks and commands never interleave
struct ControllerInner {
    state: PlaybackState,
    timer: Option<ArmedTimer>,
    next_generation: u64,
}

impl ControllerInner {
    fn is_armed_with(&self, generation: u64) -> bool {
        self.timer
            .as_ref()
            .is_some_and(|timer| timer.generation == generation)
    }
}

/// Owns the playback state machine and its timer.
///
/// All commands and timer ticks go through one write lock, so each is applied
/// atomically. At most one timer is armed at a time: it is armed when playback
/// starts, re-armed whenever the scene changes while playing, and disarmed
/// whenever playback stops. Timer tasks hold only a weak reference and are
/// cancelled when the controller is dropped or shut down.
pub struct PlaybackController {
    storyboard: Arc<Storyboard>,
    tick: TickSettings,
    inner: RwLock<ControllerInner>,
    event_tx: broadcast::Sender<PlaybackEvent>,
    shutdown: CancellationToken,
    weak_self: Weak<Self>,
}

impl PlaybackController {
    /// Create a new controller in the initial state (first scene, stopped)
    #[must_use]
    pub fn new(storyboard: Storyboard, tick: TickSettings) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(64);

        Arc::new_cyclic(|weak_self| Self {
            storyboard: Arc::new(storyboard),
            tick,
            inner: RwLock::new(ControllerInner {
                state: PlaybackState::initial(),
                timer: None,
                next_generation: 0,
            }),
            event_tx,
            shutdown: CancellationToken::new(),
            weak_self: weak_self.clone(),
        })
    }

    /// Subscribe to playback events
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.event_tx.subscribe()
    }

    /// The scene table this controller plays
    #[must_use]
    pub fn storyboard(&self) -> &Storyboard {
        &self.storyboard
    }

    /// Timer cadence and increment
    #[must_use]
    pub const fn tick_settings(&self) -> TickSettings {
        self.tick
    }

    /// Get current playback state
    pub async fn state(&self) -> PlaybackState {
        self.inner.read().await.state
    }

    /// Check if a timer is currently armed
    pub async fn is_timer_armed(&self) -> bool {
        self.inner.read().await.timer.is_some()
    }

    /// Start playing; no-op if already playing
    pub async fn play(&self) {
        self.transition(no_leading_event, |state| Ok(state.apply_play()))
            .await;
    }

    /// Pause, keeping progress and phase
    pub async fn pause(&self) {
        self.transition(no_leading_event, |state| Ok(state.apply_pause()))
            .await;
    }

    /// Flip between playing and paused
    pub async fn toggle(&self) {
        self.transition(no_leading_event, |state| Ok(state.apply_toggle()))
            .await;
    }

    /// Rewind the active scene and stop
    pub async fn reset(&self) {
        self.transition(
            |old| {
                Some(PlaybackEvent::Reset {
                    scene: old.scene_index,
                })
            },
            |state| Ok(state.apply_reset()),
        )
        .await;
    }

    /// Move to the next scene without touching progress or the playing flag
    pub async fn step_next(&self) {
        self.transition(no_leading_event, |state| {
            Ok(state.apply_step(&self.storyboard, 1))
        })
        .await;
    }

    /// Move to the previous scene without touching progress or the playing flag
    pub async fn step_prev(&self) {
        self.transition(no_leading_event, |state| {
            Ok(state.apply_step(&self.storyboard, -1))
        })
        .await;
    }

    /// Jump to a scene from its start and stop playback.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SceneOutOfRange`] if `index` is not a valid scene.
    /// The state is left unchanged and no event is emitted.
    pub async fn jump_to(&self, index: usize) -> Result<()> {
        self.try_transition(no_leading_event, |state| {
            state.apply_jump(&self.storyboard, index)
        })
        .await
        .map(|_| ())
    }

    /// Apply a [`Command`].
    ///
    /// # Errors
    ///
    /// Returns an error only for [`Command::JumpTo`] with an invalid index.
    pub async fn dispatch(&self, command: Command) -> Result<()> {
        debug!("Dispatching command: {}", command);
        match command {
            Command::Play => self.play().await,
            Command::Pause => self.pause().await,
            Command::Toggle => self.toggle().await,
            Command::Reset => self.reset().await,
            Command::StepNext => self.step_next().await,
            Command::StepPrev => self.step_prev().await,
            Command::JumpTo(index) => return self.jump_to(index).await,
        }
        Ok(())
    }

    /// Stop playback and cancel every timer.
    ///
    /// The controller stays readable, but later calls to `play` will not
    /// advance progress.
    pub async fn shutdown(&self) {
        info!("Playback controller shutting down");
        self.shutdown.cancel();
        let mut inner = self.inner.write().await;
        Self::disarm(&mut inner);
        let old = inner.state;
        let new = old.apply_pause();
        inner.state = new;
        self.emit_changes(&old, &new);
    }

    /// Get a clone of the shutdown token
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    async fn transition<L, F>(&self, leading: L, f: F)
    where
        L: FnOnce(&PlaybackState) -> Option<PlaybackEvent>,
        F: FnOnce(PlaybackState) -> Result<PlaybackState>,
    {
        if let Err(e) = self.try_transition(leading, f).await {
            warn!("Transition rejected: {}", e);
        }
    }

    /// Apply `f` to the current state under the write lock.
    ///
    /// `leading` may produce an event that is sent before the change events.
    async fn try_transition<L, F>(&self, leading: L, f: F) -> Result<PlaybackState>
    where
        L: FnOnce(&PlaybackState) -> Option<PlaybackEvent>,
        F: FnOnce(PlaybackState) -> Result<PlaybackState>,
    {
        let mut inner = self.inner.write().await;
        let old = inner.state;
        let new = f(old)?;

        // Nothing can drive a playing state once the timer is gone for good
        if new.is_playing && self.shutdown.is_cancelled() {
            warn!("Ignoring transition into playing: controller is shut down");
            return Ok(old);
        }

        inner.state = new;
        self.sync_timer(&mut inner, &old, &new);

        if old != new {
            if let Some(event) = leading(&old) {
                let _ = self.event_tx.send(event);
            }
        }
        self.emit_changes(&old, &new);

        Ok(new)
    }

    /// Apply one tick from the timer with the given generation.
    ///
    /// Returns `false` once that timer is no longer the armed one, telling the
    /// task to exit.
    async fn on_tick(&self, generation: u64) -> bool {
        let mut inner = self.inner.write().await;

        if !inner.is_armed_with(generation) {
            debug!("Discarding tick from superseded timer #{}", generation);
            return false;
        }

        let old = inner.state;
        let new = old.apply_tick(&self.storyboard, self.tick.increment);
        debug!(
            "Tick: scene={} progress={:.1} phase={}",
            new.scene_index, new.progress, new.phase
        );

        inner.state = new;
        self.sync_timer(&mut inner, &old, &new);
        self.emit_changes(&old, &new);

        inner.is_armed_with(generation)
    }

    /// Arm, re-arm or disarm the timer to match a state transition
    fn sync_timer(&self, inner: &mut ControllerInner, old: &PlaybackState, new: &PlaybackState) {
        if !new.is_playing {
            Self::disarm(inner);
        } else if !old.is_playing || old.scene_changed(new) || inner.timer.is_none() {
            self.arm(inner);
        }
    }

    fn arm(&self, inner: &mut ControllerInner) {
        Self::disarm(inner);

        if self.shutdown.is_cancelled() {
            warn!("Not arming playback timer: controller is shut down");
            return;
        }

        let generation = inner.next_generation;
        inner.next_generation = inner.next_generation.wrapping_add(1);

        let cancel = self.shutdown.child_token();
        inner.timer = Some(ArmedTimer {
            generation,
            cancel: cancel.clone(),
        });

        let period = self.tick.interval;
        let controller = self.weak_self.clone();
        debug!(
            "Arming playback timer #{} (interval: {}ms)",
            generation,
            period.as_millis_u64()
        );

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = cancel.cancelled() => {
                        debug!("Playback timer #{} cancelled", generation);
                        break;
                    }
                    _ = ticker.tick() => {
                        let Some(controller) = controller.upgrade() else {
                            break;
                        };
                        if !controller.on_tick(generation).await {
                            break;
                        }
                    }
                }
            }
        });
    }

    fn disarm(inner: &mut ControllerInner) {
        if let Some(timer) = inner.timer.take() {
            debug!("Disarming playback timer #{}", timer.generation);
            timer.cancel.cancel();
        }
    }

    /// Emit events describing the difference between two states
    fn emit_changes(&self, old: &PlaybackState, new: &PlaybackState) {
        if old == new {
            return;
        }

        if old.scene_changed(new) {
            info!(
                "Scene changed: {} -> {} ({})",
                old.scene_index, new.scene_index, self.storyboard[new.scene_index].title
            );
            let _ = self.event_tx.send(PlaybackEvent::SceneChanged {
                from: old.scene_index,
                to: new.scene_index,
            });
        } else if old.phase_changed(new) {
            let _ = self.event_tx.send(PlaybackEvent::PhaseChanged {
                scene: new.scene_index,
                phase: new.phase,
            });
        }

        if old.playback_state_changed(new) {
            if new.is_playing {
                let _ = self.event_tx.send(PlaybackEvent::PlaybackStarted {
                    scene: new.scene_index,
                });
            } else if new.finished {
                let _ = self.event_tx.send(PlaybackEvent::Finished);
            } else {
                let _ = self.event_tx.send(PlaybackEvent::PlaybackPaused {
                    scene: new.scene_index,
                    progress: new.progress,
                });
            }
        }

        let _ = self.event_tx.send(PlaybackEvent::StateChanged { state: *new });
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

const fn no_leading_event(_: &PlaybackState) -> Option<PlaybackEvent> {
    None
}
