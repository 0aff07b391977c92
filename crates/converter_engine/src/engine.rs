use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use converter_core::{JobHandle, Payload, SubmissionId};
use engine_logging::{engine_info, engine_warn};

use crate::poll::{start_polling, ChannelEventSink, EventSink, PollHandle};
use crate::{ClientError, EngineEvent, JobClient, ReqwestJobClient, ServiceSettings};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start engine: {0}")]
    Spawn(#[from] std::io::Error),
    #[error(transparent)]
    Client(#[from] ClientError),
}

enum EngineCommand {
    Submit {
        submission: SubmissionId,
        payload: Payload,
    },
    StartPolling {
        submission: SubmissionId,
        job: JobHandle,
    },
    CancelPolling {
        submission: SubmissionId,
    },
    Download {
        conversion_id: String,
        output_dir: PathBuf,
    },
}

/// Runs job IO on a background tokio runtime. Owns at most one poll loop.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ServiceSettings) -> Result<Self, EngineError> {
        let poll_interval = settings.poll_interval;
        let client = ReqwestJobClient::new(settings)?;
        Self::with_client(Arc::new(client), poll_interval)
    }

    pub fn with_client(
        client: Arc<dyn JobClient>,
        poll_interval: Duration,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        thread::Builder::new()
            .name("converter-engine".to_string())
            .spawn(move || {
                let guard = runtime.enter();
                let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx.clone()));
                let mut active_poll: Option<PollHandle> = None;

                while let Ok(command) = cmd_rx.recv() {
                    handle_command(
                        &runtime,
                        &client,
                        poll_interval,
                        &sink,
                        &event_tx,
                        &mut active_poll,
                        command,
                    );
                }

                // Dropping the handle cancels a loop that is still running.
                drop(active_poll);
                drop(guard);
                runtime.shutdown_timeout(Duration::from_secs(1));
            })?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn submit(&self, submission: SubmissionId, payload: Payload) {
        let _ = self.cmd_tx.send(EngineCommand::Submit {
            submission,
            payload,
        });
    }

    pub fn start_polling(&self, submission: SubmissionId, job: JobHandle) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::StartPolling { submission, job });
    }

    pub fn cancel_polling(&self, submission: SubmissionId) {
        let _ = self.cmd_tx.send(EngineCommand::CancelPolling { submission });
    }

    pub fn download(&self, conversion_id: impl Into<String>, output_dir: PathBuf) {
        let _ = self.cmd_tx.send(EngineCommand::Download {
            conversion_id: conversion_id.into(),
            output_dir,
        });
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

fn handle_command(
    runtime: &tokio::runtime::Runtime,
    client: &Arc<dyn JobClient>,
    poll_interval: Duration,
    sink: &Arc<dyn EventSink>,
    event_tx: &mpsc::Sender<EngineEvent>,
    active_poll: &mut Option<PollHandle>,
    command: EngineCommand,
) {
    match command {
        EngineCommand::Submit {
            submission,
            payload,
        } => {
            if let Some(previous) = active_poll.take_if(|poll| poll.submission() != submission) {
                engine_info!(
                    "Submission {} supersedes poll loop of submission {}",
                    submission,
                    previous.submission()
                );
                previous.cancel();
            }
            engine_info!(
                "Submitting {} files ({} bytes) as submission {}",
                payload.parts.len(),
                payload.total_bytes(),
                submission
            );
            let client = client.clone();
            let event_tx = event_tx.clone();
            runtime.spawn(async move {
                let result = client.submit(&payload).await;
                match &result {
                    Ok(ack) => engine_info!(
                        "Submission {} accepted as task {}",
                        submission,
                        ack.job.task_id
                    ),
                    Err(err) => engine_warn!("Submission {} failed: {}", submission, err),
                }
                let _ = event_tx.send(EngineEvent::Submitted { submission, result });
            });
        }
        EngineCommand::StartPolling { submission, job } => {
            if let Some(previous) = active_poll.take() {
                previous.cancel();
            }
            *active_poll = Some(start_polling(
                client.clone(),
                submission,
                job,
                poll_interval,
                sink.clone(),
            ));
        }
        EngineCommand::CancelPolling { submission } => {
            if let Some(poll) = active_poll.take_if(|poll| poll.submission() == submission) {
                poll.cancel();
            }
        }
        EngineCommand::Download {
            conversion_id,
            output_dir,
        } => {
            let client = client.clone();
            let event_tx = event_tx.clone();
            runtime.spawn(async move {
                let result = client.fetch_artifact(&conversion_id, &output_dir).await;
                if let Err(err) = &result {
                    engine_warn!("Download of {} failed: {}", conversion_id, err);
                }
                let _ = event_tx.send(EngineEvent::ArtifactSaved {
                    conversion_id,
                    result,
                });
            });
        }
    }
}
