use std::path::PathBuf;
use std::time::Duration;

use converter_core::{Effect, Msg, SessionError};
use converter_engine::{EngineEvent, EngineHandle, ServiceSettings, StopReason};
use engine_logging::{engine_debug, engine_info};

/// Executes core effects against the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    settings: ServiceSettings,
    output_dir: Option<PathBuf>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, settings: ServiceSettings, output_dir: Option<PathBuf>) -> Self {
        Self {
            engine,
            settings,
            output_dir,
        }
    }

    /// Runs `effects` in order. Returns messages that complete immediately.
    pub fn enqueue(&self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut follow_ups = Vec::new();
        for effect in effects {
            match effect {
                Effect::Submit {
                    submission,
                    payload,
                } => {
                    engine_debug!(
                        "Submit submission={} parts={}",
                        submission,
                        payload.parts.len()
                    );
                    self.engine.submit(submission, payload);
                }
                Effect::StartPolling { submission, job } => {
                    engine_info!("Polling task {} for submission {}", job.task_id, submission);
                    self.engine.start_polling(submission, job);
                }
                Effect::CancelPolling { submission } => {
                    engine_info!("Cancelling poll loop of submission {}", submission);
                    self.engine.cancel_polling(submission);
                }
                Effect::OpenDownload { conversion_id } => {
                    if let Some(msg) = self.open_download(conversion_id) {
                        follow_ups.push(msg);
                    }
                }
            }
        }
        follow_ups
    }

    /// Prints the artifact URL, and fetches it when an output directory is set.
    fn open_download(&self, conversion_id: String) -> Option<Msg> {
        let url = match self.settings.download_url(&conversion_id) {
            Ok(url) => url,
            Err(err) => {
                return Some(Msg::DownloadFinished {
                    conversion_id,
                    result: Err(err.into()),
                });
            }
        };
        println!("Download: {url}");

        match &self.output_dir {
            Some(dir) => {
                self.engine.download(conversion_id, dir.clone());
                None
            }
            None => Some(Msg::DownloadFinished {
                conversion_id,
                result: Ok(url.to_string()),
            }),
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.engine.recv_timeout(timeout)
    }
}

pub fn event_to_msg(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::Submitted { submission, result } => Some(match result {
            Ok(ack) => Msg::SubmitSucceeded { submission, ack },
            Err(err) => Msg::SubmitFailed {
                submission,
                error: err.into(),
            },
        }),
        EngineEvent::Polled { submission, result } => Some(match result {
            Ok(status) => Msg::PollSucceeded { submission, status },
            Err(err) => Msg::PollFailed {
                submission,
                error: err.into(),
            },
        }),
        EngineEvent::PollStopped { submission, reason } => {
            match reason {
                StopReason::Finished => {
                    engine_debug!("Poll loop of submission {} finished", submission)
                }
                StopReason::Cancelled => {
                    engine_debug!("Poll loop of submission {} cancelled", submission)
                }
            }
            None
        }
        EngineEvent::ArtifactSaved {
            conversion_id,
            result,
        } => {
            let result = result
                .map(|path| path.display().to_string())
                .map_err(SessionError::from);
            Some(Msg::DownloadFinished {
                conversion_id,
                result,
            })
        }
    }
}
