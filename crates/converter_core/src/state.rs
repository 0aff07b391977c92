use crate::view_model::{AppViewModel, DirectoryRow};
use crate::{
    ConversionResult, FileGroupSet, JobHandle, JobStatus, RawFile, SelectionError, SessionError,
    SubmissionId, SubmissionOptions,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    FilesSelected,
    Submitting,
    Polling,
    Complete,
    Error,
}

impl SessionPhase {
    /// A submission or its poll loop is outstanding; the selection is frozen.
    pub fn is_busy(self) -> bool {
        matches!(self, SessionPhase::Submitting | SessionPhase::Polling)
    }
}

/// Why the last selection edit was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Busy,
    InvalidSelection(SelectionError),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DownloadState {
    #[default]
    NotRequested,
    Requested,
    Saved(String),
    Failed(SessionError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ActiveJob {
    pub(crate) submission: SubmissionId,
    pub(crate) job: Option<JobHandle>,
    pub(crate) progress_scale: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    files: FileGroupSet,
    options: SubmissionOptions,
    phase: SessionPhase,
    next_submission: SubmissionId,
    active: Option<ActiveJob>,
    status: Option<JobStatus>,
    result: Option<ConversionResult>,
    error: Option<SessionError>,
    last_poll_error: Option<SessionError>,
    rejection: Option<Rejection>,
    download: DownloadState,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn files(&self) -> &FileGroupSet {
        &self.files
    }

    pub fn options(&self) -> SubmissionOptions {
        self.options
    }

    pub fn result(&self) -> Option<&ConversionResult> {
        self.result.as_ref()
    }

    /// Submission whose results are currently accepted.
    pub fn active_submission(&self) -> Option<SubmissionId> {
        self.active.as_ref().map(|active| active.submission)
    }

    pub fn view(&self) -> AppViewModel {
        let directories = self
            .files
            .distinct_directories()
            .into_iter()
            .map(|name| DirectoryRow {
                file_count: self.files.files_in(&name).count(),
                name,
            })
            .collect();

        AppViewModel {
            phase: self.phase,
            directories,
            file_count: self.files.len(),
            unsupported_files: self.files.unsupported_files().len(),
            duplicate_keys: self.files.duplicate_keys(),
            manga_mode: self.options.manga_mode,
            can_submit: self.can_submit(),
            task_id: self
                .active
                .as_ref()
                .and_then(|active| active.job.as_ref())
                .map(|job| job.task_id.clone()),
            progress: self.status.as_ref().map(|status| status.progress),
            progress_scale: self.active.as_ref().map(|active| active.progress_scale),
            conversion_id: self
                .result
                .as_ref()
                .map(|result| result.conversion_id.clone()),
            download: self.download.clone(),
            error: self.error.clone(),
            last_poll_error: self.last_poll_error.clone(),
            rejection: self.rejection.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn can_submit(&self) -> bool {
        !self.files.is_empty()
            && matches!(
                self.phase,
                SessionPhase::FilesSelected | SessionPhase::Error | SessionPhase::Polling
            )
    }

    pub(crate) fn reject(&mut self, rejection: Rejection) {
        self.rejection = Some(rejection);
        self.mark_dirty();
    }

    /// Applies a selection. A completed batch is replaced, anything else grows.
    pub(crate) fn add_files(&mut self, raw: Vec<RawFile>) -> Result<(), SelectionError> {
        let mut next = if self.phase == SessionPhase::Complete {
            FileGroupSet::new()
        } else {
            self.files.clone()
        };
        next.add_files(raw)?;
        self.files = next;
        self.reset_to_selection();
        Ok(())
    }

    pub(crate) fn remove_directory(&mut self, dir: &str) -> bool {
        if self.files.remove_directory(dir) == 0 {
            return false;
        }
        self.reset_to_selection();
        true
    }

    pub(crate) fn set_manga_mode(&mut self, manga_mode: bool) -> bool {
        if self.options.manga_mode == manga_mode {
            return false;
        }
        self.options.manga_mode = manga_mode;
        self.mark_dirty();
        true
    }

    /// Starts a new submission and returns its id. Any previous job is forgotten.
    pub(crate) fn begin_submission(&mut self) -> SubmissionId {
        self.next_submission += 1;
        let submission = self.next_submission;
        self.active = Some(ActiveJob {
            submission,
            job: None,
            progress_scale: self.files.progress_scale(),
        });
        self.phase = SessionPhase::Submitting;
        self.status = None;
        self.result = None;
        self.error = None;
        self.last_poll_error = None;
        self.rejection = None;
        self.download = DownloadState::NotRequested;
        self.mark_dirty();
        submission
    }

    pub(crate) fn is_current(&self, submission: SubmissionId, phase: SessionPhase) -> bool {
        self.phase == phase && self.active_submission() == Some(submission)
    }

    pub(crate) fn accept_job(&mut self, job: JobHandle, status: JobStatus) {
        if let Some(active) = self.active.as_mut() {
            active.job = Some(job);
        }
        self.apply_status(status);
        if self.phase == SessionPhase::Submitting {
            self.phase = SessionPhase::Polling;
        }
    }

    /// Records a status snapshot; a conversion id moves the session to `Complete`.
    pub(crate) fn apply_status(&mut self, status: JobStatus) {
        if let Some(conversion_id) = status.conversion_id.clone() {
            self.result = Some(ConversionResult { conversion_id });
            self.phase = SessionPhase::Complete;
        }
        self.status = Some(status);
        self.mark_dirty();
    }

    pub(crate) fn fail_submission(&mut self, error: SessionError) {
        self.active = None;
        self.phase = SessionPhase::Error;
        self.error = Some(error);
        self.mark_dirty();
    }

    pub(crate) fn record_poll_failure(&mut self, error: SessionError) {
        self.last_poll_error = Some(error);
        self.mark_dirty();
    }

    pub(crate) fn request_download(&mut self) -> Option<String> {
        if self.phase != SessionPhase::Complete || self.download == DownloadState::Requested {
            return None;
        }
        let conversion_id = self.result.as_ref()?.conversion_id.clone();
        self.download = DownloadState::Requested;
        self.mark_dirty();
        Some(conversion_id)
    }

    pub(crate) fn finish_download(
        &mut self,
        conversion_id: &str,
        result: Result<String, SessionError>,
    ) {
        let matches_result = self
            .result
            .as_ref()
            .is_some_and(|current| current.conversion_id == conversion_id);
        if !matches_result || self.download != DownloadState::Requested {
            return;
        }
        self.download = match result {
            Ok(location) => DownloadState::Saved(location),
            Err(error) => DownloadState::Failed(error),
        };
        self.mark_dirty();
    }

    fn reset_to_selection(&mut self) {
        self.phase = if self.files.is_empty() {
            SessionPhase::Idle
        } else {
            SessionPhase::FilesSelected
        };
        self.active = None;
        self.status = None;
        self.result = None;
        self.error = None;
        self.last_poll_error = None;
        self.rejection = None;
        self.download = DownloadState::NotRequested;
        self.mark_dirty();
    }
}
