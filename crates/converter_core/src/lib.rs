//! Converter core: file grouping, payload encoding and the pure session state machine.
mod effect;
mod encode;
mod job;
mod msg;
mod selection;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use encode::{encode, EncodingError, Payload, PayloadPart, SubmissionOptions, MANGA_MODE_FIELD};
pub use job::{
    ConversionResult, ErrorOrigin, JobHandle, JobStatus, SessionError, SubmissionId, SubmitAck,
};
pub use msg::Msg;
pub use selection::{
    is_supported_image, FileBlob, FileGroupSet, RawFile, SelectedFile, SelectionError,
    SUPPORTED_EXTENSIONS,
};
pub use state::{AppState, DownloadState, Rejection, SessionPhase};
pub use update::update;
pub use view_model::{AppViewModel, DirectoryRow};
