//! Background refresh of cook telemetry
//!
//! Runs the pipeline in a tokio task on a fixed timer and on demand, and
//! sends the results to the UI over a channel. Shutdown cancels the task,
//! including a cycle that is still waiting on the network.

use std::time::Duration;

use log::{info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::ErrorReport;
use crate::pipeline::{CookSnapshot, CycleStage, Pipeline};

/// Messages sent from the background refresh to the main app
#[derive(Debug, Clone)]
pub enum RefreshMessage {
    /// The pipeline entered a new stage
    Stage(CycleStage),
    /// A cycle completed with fresh data
    CookUpdated(Box<CookSnapshot>),
    /// A cycle failed
    RefreshError(ErrorReport),
}

/// Configuration for the refresh timer
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Time from the end of one cycle to the start of the next timed one
    pub period: Duration,
    /// Whether timed cycles run at all (on-demand refresh always works)
    pub enabled: bool,
}

/// Handle for controlling the background refresh task
pub struct RefreshHandle {
    /// Channel for receiving refresh messages
    pub receiver: mpsc::Receiver<RefreshMessage>,
    refresh_tx: mpsc::Sender<()>,
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Spawns the refresh task
    ///
    /// The first cycle runs immediately. Each timed cycle starts
    /// `config.period` after the previous cycle finished, so a slow fetch
    /// does not shorten the gap.
    pub fn spawn(config: RefreshConfig, pipeline: Pipeline) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel(32);
        let (refresh_tx, mut refresh_rx) = mpsc::channel::<()>(1);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(config.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            // The first tick completes immediately, giving the initial load
            let mut first = true;

            loop {
                tokio::select! {
                    _ = interval.tick(), if config.enabled || first => {}
                    Some(()) = refresh_rx.recv() => {
                        info!("refresh requested");
                    }
                    _ = shutdown_rx.recv() => break,
                }
                first = false;

                let stage_tx = msg_tx.clone();
                let cycle = pipeline.run_with(move |stage| {
                    let _ = stage_tx.try_send(RefreshMessage::Stage(stage));
                });

                let message = tokio::select! {
                    result = cycle => match result {
                        Ok(snapshot) => RefreshMessage::CookUpdated(Box::new(snapshot)),
                        Err(e) => {
                            warn!("refresh of cook {} failed: {}", pipeline.cook_id(), e);
                            RefreshMessage::RefreshError(e.report())
                        }
                    },
                    _ = shutdown_rx.recv() => break,
                };
                interval.reset();

                if msg_tx.send(message).await.is_err() {
                    // Receiver dropped; nobody is listening anymore
                    break;
                }
            }
        });

        Self {
            receiver: msg_rx,
            refresh_tx,
            shutdown_tx,
            task,
        }
    }

    /// Requests an immediate cycle
    ///
    /// Requests made while one is already pending are merged.
    pub fn request_refresh(&self) {
        let _ = self.refresh_tx.try_send(());
    }

    /// Shuts down the refresh task and waits for it to finish
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        let _ = self.task.await;
    }
}

/// Checks for pending refresh messages without blocking
///
/// # Returns
/// * `Some(RefreshMessage)` if a message was available
/// * `None` if no messages are pending
pub fn try_recv(handle: &mut RefreshHandle) -> Option<RefreshMessage> {
    handle.receiver.try_recv().ok()
}
