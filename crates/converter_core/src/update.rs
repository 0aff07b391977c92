use crate::{encode, AppState, Effect, Msg, Rejection, SessionPhase};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesSelected(raw) => {
            if raw.is_empty() {
                return (state, Vec::new());
            }
            if state.phase().is_busy() {
                state.reject(Rejection::Busy);
                return (state, Vec::new());
            }
            if let Err(err) = state.add_files(raw) {
                state.reject(Rejection::InvalidSelection(err));
            }
            Vec::new()
        }
        Msg::DirectoryRemoved(dir) => {
            if state.phase().is_busy() {
                state.reject(Rejection::Busy);
            } else {
                state.remove_directory(&dir);
            }
            Vec::new()
        }
        Msg::MangaModeToggled(manga_mode) => {
            state.set_manga_mode(manga_mode);
            Vec::new()
        }
        Msg::SubmitClicked => {
            if !state.can_submit() {
                return (state, Vec::new());
            }
            let Ok(payload) = encode(state.files(), &state.options()) else {
                return (state, Vec::new());
            };

            let mut effects = Vec::with_capacity(2);
            // A resubmission while polling supersedes the running job.
            if state.phase() == SessionPhase::Polling {
                if let Some(previous) = state.active_submission() {
                    effects.push(Effect::CancelPolling {
                        submission: previous,
                    });
                }
            }
            let submission = state.begin_submission();
            effects.push(Effect::Submit {
                submission,
                payload,
            });
            effects
        }
        Msg::SubmitSucceeded { submission, ack } => {
            if !state.is_current(submission, SessionPhase::Submitting) {
                return (state, Vec::new());
            }
            let job = ack.job.clone();
            state.accept_job(ack.job, ack.status);
            if state.phase() == SessionPhase::Polling {
                vec![Effect::StartPolling { submission, job }]
            } else {
                Vec::new()
            }
        }
        Msg::SubmitFailed { submission, error } => {
            if !state.is_current(submission, SessionPhase::Submitting) {
                return (state, Vec::new());
            }
            state.fail_submission(error);
            Vec::new()
        }
        Msg::PollSucceeded { submission, status } => {
            if !state.is_current(submission, SessionPhase::Polling) {
                return (state, Vec::new());
            }
            state.apply_status(status);
            if state.phase() == SessionPhase::Complete {
                vec![Effect::CancelPolling { submission }]
            } else {
                Vec::new()
            }
        }
        Msg::PollFailed { submission, error } => {
            if state.is_current(submission, SessionPhase::Polling) {
                state.record_poll_failure(error);
            }
            Vec::new()
        }
        Msg::DownloadClicked => match state.request_download() {
            Some(conversion_id) => vec![Effect::OpenDownload { conversion_id }],
            None => Vec::new(),
        },
        Msg::DownloadFinished {
            conversion_id,
            result,
        } => {
            state.finish_download(&conversion_id, result);
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}
