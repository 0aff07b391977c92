use std::path::PathBuf;

use converter_core::{ErrorOrigin, JobHandle, JobStatus, SessionError, SubmissionId, SubmitAck};
use serde::Deserialize;

/// Body of a successful `POST /convert`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmitResponse {
    pub task_id: String,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub conversion_id: Option<String>,
}

impl From<SubmitResponse> for SubmitAck {
    fn from(response: SubmitResponse) -> Self {
        SubmitAck {
            job: JobHandle::new(response.task_id),
            status: JobStatus {
                progress: response.progress,
                conversion_id: response.conversion_id,
            },
        }
    }
}

/// Body of `GET /status/{task_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub conversion_id: Option<String>,
}

impl From<StatusResponse> for JobStatus {
    fn from(response: StatusResponse) -> Self {
        JobStatus {
            progress: response.progress,
            conversion_id: response.conversion_id,
        }
    }
}

/// Failure body: `{ "error": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct ErrorBody {
    pub(crate) error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{origin}: {message}")]
pub struct ClientError {
    pub origin: ErrorOrigin,
    pub message: String,
    pub status: Option<u16>,
}

impl ClientError {
    pub fn new(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            origin,
            message: message.into(),
            status: None,
        }
    }

    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self {
            origin: ErrorOrigin::ServerRejected,
            message: message.into(),
            status: Some(status),
        }
    }
}

impl From<ClientError> for SessionError {
    fn from(err: ClientError) -> Self {
        SessionError::new(err.origin, err.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Submitted {
        submission: SubmissionId,
        result: Result<SubmitAck, ClientError>,
    },
    Polled {
        submission: SubmissionId,
        result: Result<JobStatus, ClientError>,
    },
    PollStopped {
        submission: SubmissionId,
        reason: StopReason,
    },
    ArtifactSaved {
        conversion_id: String,
        result: Result<PathBuf, ClientError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Finished,
    Cancelled,
}
