use std::fmt;

/// Tags one submission so late results from a superseded one can be told apart.
pub type SubmissionId = u64;

/// Service-assigned task identifier, used only for polling.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle {
    pub task_id: String,
}

impl JobHandle {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
        }
    }
}

/// One status snapshot. `progress` is a coarse counter on the
/// `directories + 1` scale; only `conversion_id` signals completion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobStatus {
    pub progress: u32,
    pub conversion_id: Option<String>,
}

impl JobStatus {
    pub fn running(progress: u32) -> Self {
        Self {
            progress,
            conversion_id: None,
        }
    }

    pub fn finished(progress: u32, conversion_id: impl Into<String>) -> Self {
        Self {
            progress,
            conversion_id: Some(conversion_id.into()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.conversion_id.is_some()
    }
}

/// What a successful submit call returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitAck {
    pub job: JobHandle,
    pub status: JobStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub conversion_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorOrigin {
    /// Non-2xx response with a body-supplied message.
    ServerRejected,
    /// Request sent, nothing came back.
    NoResponse,
    /// The request could not be built.
    RequestSetupFailure,
    Unexpected,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorOrigin::ServerRejected => write!(f, "server rejected request"),
            ErrorOrigin::NoResponse => write!(f, "no response"),
            ErrorOrigin::RequestSetupFailure => write!(f, "request setup failed"),
            ErrorOrigin::Unexpected => write!(f, "unexpected error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{origin}: {message}")]
pub struct SessionError {
    pub message: String,
    pub origin: ErrorOrigin,
}

impl SessionError {
    pub fn new(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            origin,
        }
    }
}
