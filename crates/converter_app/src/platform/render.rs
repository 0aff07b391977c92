use converter_core::{AppViewModel, DownloadState, Rejection, SessionPhase, SUPPORTED_EXTENSIONS};

/// Terminal lines describing `view`. Pure so it can be checked without a terminal.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(rejection) = &view.rejection {
        lines.push(match rejection {
            Rejection::Busy => "Selection is locked while a conversion is running".to_string(),
            Rejection::InvalidSelection(err) => format!("Selection rejected: {err}"),
        });
    }

    match view.phase {
        SessionPhase::Idle => lines.push("No files selected".to_string()),
        SessionPhase::FilesSelected => {
            lines.push(selection_summary(view));
            if view.unsupported_files > 0 {
                lines.push(format!(
                    "Warning: {} file(s) are not {} images and will be ignored by the service",
                    view.unsupported_files,
                    SUPPORTED_EXTENSIONS.join("/")
                ));
            }
            for key in &view.duplicate_keys {
                lines.push(format!(
                    "Warning: more than one file would be uploaded as {key}; only the first would be kept"
                ));
            }
        }
        SessionPhase::Submitting => lines.push(format!(
            "Uploading {} file(s){}",
            view.file_count,
            if view.manga_mode { " in manga mode" } else { "" }
        )),
        SessionPhase::Polling => {
            lines.push(progress_line(view));
            if let Some(err) = &view.last_poll_error {
                lines.push(format!("Warning: status check failed ({err}); still waiting"));
            }
        }
        SessionPhase::Complete => {
            if let Some(id) = &view.conversion_id {
                lines.push(format!("Conversion {id} complete"));
            }
            match &view.download {
                DownloadState::NotRequested | DownloadState::Requested => {}
                DownloadState::Saved(location) => lines.push(format!("Saved to {location}")),
                DownloadState::Failed(err) => lines.push(format!("Download failed: {err}")),
            }
        }
        SessionPhase::Error => {
            if let Some(err) = &view.error {
                lines.push(format!("Conversion failed: {err}"));
            }
        }
    }

    lines
}

fn selection_summary(view: &AppViewModel) -> String {
    let groups: Vec<String> = view
        .directories
        .iter()
        .map(|row| format!("{} ({})", row.name, row.file_count))
        .collect();
    format!(
        "Selected {} file(s) in {} director{}: {}",
        view.file_count,
        groups.len(),
        if groups.len() == 1 { "y" } else { "ies" },
        groups.join(", ")
    )
}

fn progress_line(view: &AppViewModel) -> String {
    let task = view.task_id.as_deref().unwrap_or("?");
    match (view.progress, view.progress_scale) {
        (Some(progress), Some(scale)) => format!("Task {task}: {progress} / {scale}"),
        _ => format!("Task {task}: waiting for progress"),
    }
}

/// Prints rendered lines, skipping the ones already on screen from the previous render.
#[derive(Default)]
pub struct TerminalRenderer {
    last: Vec<String>,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, view: &AppViewModel) {
        for line in self.fresh_lines(view) {
            println!("{line}");
        }
    }

    fn fresh_lines(&mut self, view: &AppViewModel) -> Vec<String> {
        let lines = render(view);
        let fresh = lines
            .iter()
            .filter(|line| !self.last.contains(line))
            .cloned()
            .collect();
        self.last = lines;
        fresh
    }
}
