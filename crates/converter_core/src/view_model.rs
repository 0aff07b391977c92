use crate::{DownloadState, Rejection, SessionError, SessionPhase};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRow {
    pub name: String,
    pub file_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub phase: SessionPhase,
    pub directories: Vec<DirectoryRow>,
    pub file_count: usize,
    pub unsupported_files: usize,
    /// Upload keys that more than one file would be sent under.
    pub duplicate_keys: Vec<String>,
    pub manga_mode: bool,
    pub can_submit: bool,
    pub task_id: Option<String>,
    pub progress: Option<u32>,
    pub progress_scale: Option<u32>,
    pub conversion_id: Option<String>,
    pub download: DownloadState,
    pub error: Option<SessionError>,
    pub last_poll_error: Option<SessionError>,
    pub rejection: Option<Rejection>,
    pub dirty: bool,
}

impl AppViewModel {
    pub fn directory_names(&self) -> Vec<&str> {
        self.directories.iter().map(|row| row.name.as_str()).collect()
    }
}
