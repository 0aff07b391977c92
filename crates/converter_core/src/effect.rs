use crate::{JobHandle, Payload, SubmissionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
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
    OpenDownload {
        conversion_id: String,
    },
}
