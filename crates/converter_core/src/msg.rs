use crate::{JobStatus, RawFile, SessionError, SubmissionId, SubmitAck};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked files; they accumulate into the current batch.
    FilesSelected(Vec<RawFile>),
    /// User removed a whole directory group.
    DirectoryRemoved(String),
    /// User flipped the manga-mode toggle.
    MangaModeToggled(bool),
    /// User asked to convert the current batch.
    SubmitClicked,
    /// Engine: the service accepted a submission.
    SubmitSucceeded {
        submission: SubmissionId,
        ack: SubmitAck,
    },
    /// Engine: the submission could not be delivered or was refused.
    SubmitFailed {
        submission: SubmissionId,
        error: SessionError,
    },
    /// Engine: one status check came back.
    PollSucceeded {
        submission: SubmissionId,
        status: JobStatus,
    },
    /// Engine: one status check failed. Logged, never fatal.
    PollFailed {
        submission: SubmissionId,
        error: SessionError,
    },
    /// User asked for the finished artifact.
    DownloadClicked,
    /// Engine: artifact retrieval ended, with the saved location on success.
    DownloadFinished {
        conversion_id: String,
        result: Result<String, SessionError>,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
}
