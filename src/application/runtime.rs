//! Voice Loop - runs the orchestrator on its own task.
//!
//! Every producer (playback completion, session timers, the VAD, the
//! orchestrator's own pause grace timers, the host application) sends
//! [`InteractionEvent`]s into one unbounded channel. A single task owns the
//! orchestrator and dispatches them in arrival order, so no two handlers
//! ever run at the same time.
//!
//! Shutdown is a watch signal in the same `select!` loop: the task ends the
//! running session, disposes the session manager and hands the orchestrator
//! back for inspection.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::orchestrator::{InteractionEvent, InteractionOrchestrator};
use crate::domain::voice::{InteractionState, SessionEvent, VadEvent};
use crate::ports::{PlaybackEvent, VadListener};

#[derive(Debug, Error)]
pub enum VoiceLoopError {
    #[error("voice loop is not running")]
    Closed,

    #[error("voice loop task failed: {0}")]
    Join(String),
}

pub struct VoiceLoop;

impl VoiceLoop {
    /// Wires playback and session events into the loop and starts it.
    pub fn spawn(orchestrator: InteractionOrchestrator) -> VoiceLoopHandle {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(orchestrator.state());

        let orchestrator = orchestrator.with_scheduler(events_tx.clone());

        let playback_tx = events_tx.clone();
        orchestrator
            .ports()
            .player
            .set_listener(Arc::new(move |event: PlaybackEvent| {
                let _ = playback_tx.send(event.into());
            }));

        let session_tx = events_tx.clone();
        orchestrator.session().on_event(Arc::new(move |event: &SessionEvent| {
            let _ = session_tx.send(InteractionEvent::Session(*event));
        }));

        let task = tokio::spawn(run(orchestrator, events_rx, shutdown_rx, state_tx));

        VoiceLoopHandle {
            events: events_tx,
            shutdown: shutdown_tx,
            state: state_rx,
            task,
        }
    }
}

async fn run(
    mut orchestrator: InteractionOrchestrator,
    mut events: mpsc::UnboundedReceiver<InteractionEvent>,
    mut shutdown: watch::Receiver<bool>,
    state: watch::Sender<InteractionState>,
) -> InteractionOrchestrator {
    info!("Voice loop started");
    loop {
        tokio::select! {
            biased;

            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }

            event = events.recv() => {
                let Some(event) = event else { break };
                let name = event.name();
                match orchestrator.dispatch(event).await {
                    Ok(next) => debug!(event = name, state = %next, "Event handled"),
                    Err(err) => warn!(event = name, error = %err, "Event ended in error"),
                }
                state.send_replace(orchestrator.state());
            }
        }
    }

    if let Err(err) = orchestrator.dispatch(InteractionEvent::EndSession).await {
        warn!(error = %err, "Session did not close cleanly on shutdown");
    }
    orchestrator.session().dispose();
    state.send_replace(orchestrator.state());
    info!("Voice loop stopped");
    orchestrator
}

/// Sending side of a running [`VoiceLoop`].
pub struct VoiceLoopHandle {
    events: mpsc::UnboundedSender<InteractionEvent>,
    shutdown: watch::Sender<bool>,
    state: watch::Receiver<InteractionState>,
    task: JoinHandle<InteractionOrchestrator>,
}

impl VoiceLoopHandle {
    pub fn send(&self, event: InteractionEvent) -> Result<(), VoiceLoopError> {
        self.events.send(event).map_err(|_| VoiceLoopError::Closed)
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<InteractionEvent> {
        self.events.clone()
    }

    /// Listener for a live VAD engine. Telemetry events are dropped.
    pub fn vad_listener(&self) -> VadListener {
        let events = self.events.clone();
        Arc::new(move |event: &VadEvent| {
            if let Some(event) = InteractionEvent::from_vad(event) {
                let _ = events.send(event);
            }
        })
    }

    /// State after the most recently handled event.
    pub fn state(&self) -> InteractionState {
        *self.state.borrow()
    }

    /// Waits until the loop reports `target`.
    pub async fn wait_for_state(&mut self, target: InteractionState) -> Result<(), VoiceLoopError> {
        self.state
            .wait_for(|state| *state == target)
            .await
            .map(|_| ())
            .map_err(|_| VoiceLoopError::Closed)
    }

    /// Ends the session, stops the loop and returns the orchestrator.
    pub async fn shutdown(self) -> Result<InteractionOrchestrator, VoiceLoopError> {
        let _ = self.shutdown.send(true);
        self.task
            .await
            .map_err(|err| VoiceLoopError::Join(err.to_string()))
    }
}
