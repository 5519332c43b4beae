//! AgentWatch console entry point.

use agentwatch_core::JobId;
use agentwatch_tui::api_client::{ApiClient, SubmitJobRequest};
use agentwatch_tui::config::{CliArgs, TuiConfig};
use agentwatch_tui::error::TuiError;
use agentwatch_tui::events::TuiEvent;
use agentwatch_tui::keys::{map_key, KeyAction};
use agentwatch_tui::logging::init_logging;
use agentwatch_tui::nav::View;
use agentwatch_tui::notifications::NotificationLevel;
use agentwatch_tui::persistence::{self, PersistedState};
use agentwatch_tui::realtime::{spawn_archive_listing, spawn_file_fetch};
use agentwatch_tui::state::App;
use agentwatch_tui::views::render_view;
use crossterm::{
    event::{self, Event as CrosstermEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), TuiError> {
    let args = CliArgs::from_env();
    let config = TuiConfig::load(&args)?;
    init_logging(&config)?;
    let attach_to = args.job_id()?;

    let api = ApiClient::new(&config)?;
    let mut app = App::new(config, api);

    let restored = match persistence::load(&app.config.persistence_path) {
        Ok(state) => state,
        Err(err) => {
            tracing::warn!(error = %err, "Ignoring unreadable persisted state");
            None
        }
    };
    if let Some(state) = &restored {
        state.restore(&mut app);
    }

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard {};

    let (event_tx, mut event_rx) = mpsc::channel::<TuiEvent>(256);
    spawn_input_reader(event_tx.clone());

    check_health(&mut app).await;
    let job_id = attach_to.or_else(|| restored.and_then(|s| s.last_job_id));
    match job_id {
        Some(job_id) => {
            app.attach(job_id);
            app.start_watch(event_tx.clone());
            app.notify(NotificationLevel::Info, format!("Attached to job {}", job_id));
        }
        None => submit_job(&mut app, event_tx.clone()).await,
    }

    let tick_rate = Duration::from_millis(app.config.refresh_interval_ms);
    let mut ticker = tokio::time::interval(tick_rate);

    loop {
        terminal.draw(|f| render_view(f, &app))?;

        tokio::select! {
            _ = ticker.tick() => {
                if !app.updates_paused {
                    app.flush_queued_events();
                }
                app.prune_notifications();
            }
            Some(event) = event_rx.recv() => {
                if handle_event(&mut app, event, &event_tx).await? {
                    break;
                }
            }
        }

        if app.take_archive_listing_request() {
            if let Some(job_id) = app.job_id() {
                spawn_archive_listing(app.api.rest().clone(), job_id, event_tx.clone());
            }
        }
    }

    let persisted = PersistedState::capture(&app);
    if let Err(err) = persistence::save(&app.config.persistence_path, &persisted) {
        tracing::warn!(error = %err, "Failed to persist UI state");
    }
    tracing::info!("Console exiting");

    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

fn spawn_input_reader(sender: mpsc::Sender<TuiEvent>) {
    std::thread::spawn(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(200)) {
            if let Ok(evt) = event::read() {
                let forwarded = match evt {
                    CrosstermEvent::Key(key) => sender.blocking_send(TuiEvent::Input(key)),
                    CrosstermEvent::Resize(width, height) => {
                        sender.blocking_send(TuiEvent::Resize { width, height })
                    }
                    _ => Ok(()),
                };
                if forwarded.is_err() {
                    break;
                }
            }
        }
    });
}

async fn check_health(app: &mut App) {
    match app.api.rest().health().await {
        Ok(health) if health.ok => {}
        Ok(_) => app.notify(NotificationLevel::Warning, "Backend reports unhealthy"),
        Err(err) => {
            tracing::warn!(error = %err, "Health check failed");
            app.notify(
                NotificationLevel::Error,
                format!("Backend unreachable: {}", err),
            );
        }
    }
}

/// Submit the configured job and attach to it.
async fn submit_job(app: &mut App, sender: mpsc::Sender<TuiEvent>) {
    let request = SubmitJobRequest::from(&app.config.job);
    match app.api.rest().submit_job(&request).await {
        Ok(response) => {
            tracing::info!(
                job_id = %response.job_id,
                ticker = %request.ticker,
                status = %response.status,
                "Job submitted"
            );
            attach(app, response.job_id, sender);
            app.notify(
                NotificationLevel::Success,
                format!("Submitted {} as job {}", request.ticker, response.job_id),
            );
        }
        Err(err) => {
            tracing::error!(error = %err, "Job submission failed");
            app.notify(NotificationLevel::Error, format!("Submit failed: {}", err));
        }
    }
}

fn attach(app: &mut App, job_id: JobId, sender: mpsc::Sender<TuiEvent>) {
    app.attach(job_id);
    app.start_watch(sender);
}

async fn handle_event(
    app: &mut App,
    event: TuiEvent,
    sender: &mpsc::Sender<TuiEvent>,
) -> Result<bool, TuiError> {
    match event {
        TuiEvent::Input(key) => {
            if let Some(action) = map_key(key) {
                return handle_action(app, action, sender).await;
            }
        }
        TuiEvent::Event { job_id, event } => app.enqueue_event(job_id, *event),
        TuiEvent::StreamClosed { job_id, reason } => app.enqueue_stream_closed(job_id, reason),
        TuiEvent::Summary { job_id, result } => app.apply_summary_result(job_id, result),
        TuiEvent::FileLoaded {
            job_id,
            name,
            result,
        } => app.apply_file_loaded(job_id, name, result),
        TuiEvent::ArchiveListed { job_id, result } => {
            app.apply_archive_listing(job_id, result)
        }
        TuiEvent::Resize { .. } => {}
    }
    Ok(false)
}

async fn handle_action(
    app: &mut App,
    action: KeyAction,
    sender: &mpsc::Sender<TuiEvent>,
) -> Result<bool, TuiError> {
    match action {
        KeyAction::Quit => return Ok(true),
        KeyAction::NextView => app.active_view = app.active_view.next(),
        KeyAction::PrevView => app.active_view = app.active_view.previous(),
        KeyAction::SwitchView(index) => {
            if let Some(view) = View::from_index(index) {
                app.active_view = view;
            }
        }
        KeyAction::MoveDown => app.select_next(),
        KeyAction::MoveUp => app.select_previous(),
        KeyAction::Open => {
            if let (Some(entry), Some(job_id)) = (app.open_selected(), app.job_id()) {
                spawn_file_fetch(app.api.rest().clone(), job_id, entry, sender.clone());
            }
        }
        KeyAction::Close => app.close_overlay(),
        KeyAction::Refresh => app.refresh(),
        KeyAction::PauseUpdates => app.toggle_pause(),
        KeyAction::CycleKindFilter => app.cycle_kind_filter(),
        KeyAction::CycleStageFilter => app.cycle_stage_filter(),
        KeyAction::NewJob => submit_job(app, sender.clone()).await,
        KeyAction::OpenHelp => app.open_help(),
    }
    Ok(false)
}
