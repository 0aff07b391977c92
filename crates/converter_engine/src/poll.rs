//! Recurring status checks for one accepted job.
//!
//! A loop sleeps for the poll interval, issues one status request and
//! forwards the outcome to an [`EventSink`]. It ends by itself once a status
//! carries a conversion id, or when its [`PollHandle`] is cancelled or
//! dropped. A result that arrives after cancellation is discarded.

use std::sync::Arc;
use std::time::Duration;

use converter_core::{JobHandle, SubmissionId};
use engine_logging::{engine_debug, engine_info, engine_warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, JobClient, StopReason};

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Cancels the loop on [`PollHandle::cancel`] or on drop.
pub struct PollHandle {
    submission: SubmissionId,
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn submission(&self) -> SubmissionId {
        self.submission
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Waits until the loop has exited on its own or through cancellation.
    pub async fn wait(mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Spawns the poll loop on the current tokio runtime.
pub fn start_polling(
    client: Arc<dyn JobClient>,
    submission: SubmissionId,
    job: JobHandle,
    interval: Duration,
    sink: Arc<dyn EventSink>,
) -> PollHandle {
    let token = CancellationToken::new();
    let task = tokio::spawn(run_poll_loop(
        client,
        submission,
        job,
        interval,
        sink,
        token.clone(),
    ));
    PollHandle {
        submission,
        token,
        task: Some(task),
    }
}

async fn run_poll_loop(
    client: Arc<dyn JobClient>,
    submission: SubmissionId,
    job: JobHandle,
    interval: Duration,
    sink: Arc<dyn EventSink>,
    token: CancellationToken,
) {
    engine_info!(
        "Polling task {} every {}ms (submission {})",
        job.task_id,
        interval.as_millis(),
        submission
    );

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            result = client.poll_once(&job) => result,
        };
        if token.is_cancelled() {
            engine_debug!("Discarding poll result for cancelled task {}", job.task_id);
            break;
        }

        match result {
            Ok(status) => {
                engine_debug!(
                    "task {}: progress={} conversion_id={:?}",
                    job.task_id,
                    status.progress,
                    status.conversion_id
                );
                let finished = status.is_terminal();
                sink.emit(EngineEvent::Polled {
                    submission,
                    result: Ok(status),
                });
                if finished {
                    engine_info!("task {} finished", job.task_id);
                    sink.emit(EngineEvent::PollStopped {
                        submission,
                        reason: StopReason::Finished,
                    });
                    return;
                }
            }
            Err(err) => {
                engine_warn!("Status check for task {} failed: {}", job.task_id, err);
                sink.emit(EngineEvent::Polled {
                    submission,
                    result: Err(err),
                });
            }
        }
    }

    engine_info!("Poll loop for task {} cancelled", job.task_id);
    sink.emit(EngineEvent::PollStopped {
        submission,
        reason: StopReason::Cancelled,
    });
}
