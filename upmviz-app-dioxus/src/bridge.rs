use crate::state::SlideshowState;
use dioxus::prelude::*;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use upmviz_core::{Command, PlaybackController, PlaybackEvent};

const LOG_TARGET: &str = "upmviz::bridge";
const COMMAND_LOG_TARGET: &str = "upmviz::commands";

/// Sending half of the UI command queue.
///
/// Buttons, navigator dots and key presses push commands here; a single task
/// on the background runtime applies them to the controller in arrival order.
#[derive(Clone)]
pub struct CommandSender {
    tx: mpsc::UnboundedSender<Command>,
}

impl CommandSender {
    /// Create a sender and the receiver consumed by [`run_command_loop`]
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Command>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue a command for the controller
    pub fn send(&self, command: Command) {
        debug!(target: COMMAND_LOG_TARGET, "Queueing command: {command}");
        if self.tx.send(command).is_err() {
            warn!(target: COMMAND_LOG_TARGET, "Command loop stopped, dropping {command}");
        }
    }
}

/// Apply queued UI commands to the controller until cancelled or the queue closes
pub async fn run_command_loop(
    controller: Arc<PlaybackController>,
    mut rx: mpsc::UnboundedReceiver<Command>,
    cancel_token: CancellationToken,
) {
    loop {
        tokio::select! {
            () = cancel_token.cancelled() => {
                info!(target: COMMAND_LOG_TARGET, "Command loop shutting down");
                break;
            }
            command = rx.recv() => {
                let Some(command) = command else {
                    info!(target: COMMAND_LOG_TARGET, "Command queue closed");
                    break;
                };
                if let Err(e) = controller.dispatch(command).await {
                    warn!(target: COMMAND_LOG_TARGET, "Command {command} rejected: {e}");
                }
            }
        }
    }

    controller.shutdown().await;
}

/// Bridge `PlaybackController` events to Dioxus signals.
/// This function spawns an async task that listens to controller events
/// and updates the slideshow state signals accordingly.
pub fn use_playback_bridge(controller: Arc<PlaybackController>, slideshow: SlideshowState) {
    use_future(move || {
        let controller = controller.clone();
        async move {
            let mut rx = controller.subscribe();

            // Catch up on anything that happened before the subscription (autoplay)
            let mut slideshow = slideshow;
            slideshow.apply(controller.state().await);

            loop {
                match rx.recv().await {
                    Ok(event) => {
                        handle_playback_event(event, slideshow);
                    }
                    Err(RecvError::Closed) => {
                        info!(target: LOG_TARGET, "Playback event channel closed");
                        break;
                    }
                    Err(RecvError::Lagged(n)) => {
                        info!(target: LOG_TARGET, "Missed {} playback events, resyncing", n);
                        slideshow.apply(controller.state().await);
                    }
                }
            }
        }
    });
}

fn handle_playback_event(event: PlaybackEvent, mut slideshow: SlideshowState) {
    match event {
        PlaybackEvent::StateChanged { state } => {
            slideshow.apply(state);
        }
        PlaybackEvent::SceneChanged { from, to } => {
            debug!(target: LOG_TARGET, "Scene {from} -> {to}");
        }
        PlaybackEvent::PhaseChanged { scene, phase } => {
            debug!(target: LOG_TARGET, "Scene {scene} phase {phase}");
        }
        PlaybackEvent::PlaybackStarted { .. }
        | PlaybackEvent::PlaybackPaused { .. }
        | PlaybackEvent::Reset { .. }
        | PlaybackEvent::Finished => {
            // StateChanged follows and carries the full tuple
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use upmviz_core::{SceneDescriptor, Storyboard, TickSettings};

    fn controller() -> Arc<PlaybackController> {
        let storyboard = Storyboard::new(vec![
            SceneDescriptor::new("One", 10.0, 2),
            SceneDescriptor::new("Two", 10.0, 2),
            SceneDescriptor::new("Three", 10.0, 2),
        ])
        .unwrap();
        PlaybackController::new(storyboard, TickSettings::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_command_loop_applies_in_order() {
        let controller = controller();
        let cancel_token = CancellationToken::new();
        let (sender, rx) = CommandSender::channel();

        let handle = tokio::spawn(run_command_loop(
            Arc::clone(&controller),
            rx,
            cancel_token.clone(),
        ));

        sender.send(Command::StepNext);
        sender.send(Command::StepNext);
        sender.send(Command::StepPrev);
        sender.send(Command::JumpTo(99));
        drop(sender);

        handle.await.unwrap();
        let state = controller.state().await;
        assert_eq!(state.scene_index, 1);
        assert!(!state.is_playing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_command_loop_cancel_shuts_down_controller() {
        let controller = controller();
        let cancel_token = CancellationToken::new();
        let (sender, rx) = CommandSender::channel();

        let handle = tokio::spawn(run_command_loop(
            Arc::clone(&controller),
            rx,
            cancel_token.clone(),
        ));

        sender.send(Command::Play);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(controller.is_timer_armed().await);

        cancel_token.cancel();
        handle.await.unwrap();
        assert!(!controller.is_timer_armed().await);
        assert!(!controller.state().await.is_playing);
    }

    #[test]
    fn test_send_after_loop_gone_does_not_panic() {
        let (sender, rx) = CommandSender::channel();
        drop(rx);
        sender.send(Command::Toggle);
    }
}
