use std::collections::VecDeque;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use converter_core::{
    update, AppState, AppViewModel, DownloadState, JobHandle, Msg, SessionPhase,
};
use converter_engine::{EngineEvent, EngineHandle, JobClient, ReqwestJobClient, ServiceSettings};
use engine_logging::{engine_debug, engine_info};

use super::cli::{Cli, Command, ConvertArgs};
use super::effects::{event_to_msg, EffectRunner};
use super::logging::{self, LogDestination};
use super::render::TerminalRenderer;
use super::selection::collect_selection;
use super::settings::{load_settings, SettingsOverrides};

/// How long the loop waits for an engine event before ticking.
const TICK: Duration = Duration::from_millis(75);

pub fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::initialize(
        LogDestination::for_verbosity(cli.verbose),
        engine_logging::level_for(cli.verbose),
    );

    let mut overrides = SettingsOverrides {
        server: cli.server,
        interval_ms: None,
    };
    match cli.command {
        Command::Convert(args) => {
            overrides.interval_ms = args.interval_ms;
            let settings = load_settings(cli.config.as_deref(), &overrides)?;
            convert(args, settings)
        }
        Command::Status { task_id } => {
            let settings = load_settings(cli.config.as_deref(), &overrides)?;
            status(&task_id, settings)
        }
        Command::DownloadUrl { conversion_id } => {
            let settings = load_settings(cli.config.as_deref(), &overrides)?;
            println!("{}", settings.download_url(&conversion_id)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn convert(args: ConvertArgs, settings: ServiceSettings) -> anyhow::Result<ExitCode> {
    let files = collect_selection(&args.paths)?;
    let engine =
        EngineHandle::new(settings.clone()).context("failed to start the conversion engine")?;
    let mut session = Session::new(EffectRunner::new(engine, settings, args.output));

    session.dispatch(Msg::MangaModeToggled(args.manga));
    session.dispatch(Msg::FilesSelected(files));
    if session.state.view().rejection.is_some() {
        bail!("nothing was submitted");
    }
    if session.state.files().is_empty() {
        bail!("no files found under the given paths");
    }
    ensure_unique_upload_keys(&session.state.view())?;

    session.dispatch(Msg::SubmitClicked);
    if session.state.phase() != SessionPhase::Submitting {
        bail!("the selection could not be submitted");
    }

    session.run_until_settled();

    let view = session.state.view();
    Ok(match (view.phase, view.download) {
        (SessionPhase::Complete, DownloadState::Failed(_)) => ExitCode::FAILURE,
        (SessionPhase::Complete, _) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

/// Refuses a batch in which two files share an upload key, since the service
/// would silently keep only one of them.
fn ensure_unique_upload_keys(view: &AppViewModel) -> anyhow::Result<()> {
    if view.duplicate_keys.is_empty() {
        return Ok(());
    }
    bail!(
        "{} upload key(s) are used by more than one file ({}); rename the files or select their folders separately",
        view.duplicate_keys.len(),
        view.duplicate_keys.join(", ")
    )
}

fn status(task_id: &str, settings: ServiceSettings) -> anyhow::Result<ExitCode> {
    let client = ReqwestJobClient::new(settings)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    let status = runtime.block_on(client.poll_once(&JobHandle::new(task_id)))?;
    match &status.conversion_id {
        Some(conversion_id) => {
            println!("Task {task_id}: complete (progress {})", status.progress);
            println!("Conversion: {conversion_id}");
            println!("Download: {}", client.download_url(conversion_id)?);
        }
        None => println!("Task {task_id}: running (progress {})", status.progress),
    }
    Ok(ExitCode::SUCCESS)
}

/// The dispatch loop: core state, effect execution and terminal rendering.
struct Session {
    state: AppState,
    runner: EffectRunner,
    renderer: TerminalRenderer,
    inbox: VecDeque<Msg>,
}

impl Session {
    fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
            renderer: TerminalRenderer::new(),
            inbox: VecDeque::new(),
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        self.inbox.push_back(msg);
        while let Some(msg) = self.inbox.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;

            let follow_ups = self.runner.enqueue(effects);
            self.inbox.extend(follow_ups);

            let view = self.state.view();
            if self.state.consume_dirty() {
                self.renderer.render(&view);
            }
        }
    }

    /// Feeds engine events into the core until the job completes (and its
    /// download settles) or fails.
    fn run_until_settled(&mut self) {
        let mut download_requested = false;
        loop {
            match self.state.phase() {
                SessionPhase::Error => return,
                SessionPhase::Complete if !download_requested => {
                    download_requested = true;
                    self.dispatch(Msg::DownloadClicked);
                }
                SessionPhase::Complete => {
                    if !matches!(
                        self.state.view().download,
                        DownloadState::NotRequested | DownloadState::Requested
                    ) {
                        return;
                    }
                }
                _ => {}
            }

            match self.runner.recv_timeout(TICK) {
                Some(event) => self.handle_event(event),
                None => self.dispatch(Msg::Tick),
            }
        }
    }

    fn handle_event(&mut self, event: EngineEvent) {
        if let EngineEvent::Submitted { submission, .. } | EngineEvent::Polled { submission, .. } =
            &event
        {
            if self.state.active_submission() != Some(*submission) {
                engine_debug!("Discarding stale result of submission {}", submission);
                return;
            }
        }
        if let EngineEvent::Polled {
            result: Ok(status), ..
        } = &event
        {
            if let Some(id) = &status.conversion_id {
                engine_info!("Conversion {} ready", id);
            }
        }
        if let Some(msg) = event_to_msg(event) {
            self.dispatch(msg);
        }
    }
}
