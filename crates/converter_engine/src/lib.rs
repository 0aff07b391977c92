//! Converter engine: talks to the conversion service and runs job polling.
mod artifact;
mod client;
mod engine;
mod persist;
mod poll;
mod settings;
mod types;

pub use artifact::artifact_file_name;
pub use client::{JobClient, ReqwestJobClient};
pub use engine::{EngineError, EngineHandle};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use poll::{start_polling, ChannelEventSink, EventSink, PollHandle};
pub use settings::{
    parse_base_url, ServiceSettings, DEFAULT_BASE_URL, DEFAULT_MAX_ARTIFACT_BYTES,
    DEFAULT_POLL_INTERVAL,
};
pub use types::{ClientError, EngineEvent, StatusResponse, StopReason, SubmitResponse};
