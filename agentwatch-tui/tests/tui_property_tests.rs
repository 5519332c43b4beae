use agentwatch_core::{ActivityKind, AgentRole, JobId, JobStatus, NodeStatus, Stage};
use agentwatch_events::EventLog;
use agentwatch_test_utils::fixtures::*;
use agentwatch_tui::api_client::{ApiClient, ArchiveListing, RestClient, SubmitJobRequest};
use agentwatch_tui::config::{CliArgs, ConfigError, TuiConfig};
use agentwatch_tui::events::TuiEvent;
use agentwatch_tui::keys::{map_key, KeyAction};
use agentwatch_tui::nav::View;
use agentwatch_tui::notifications::NotificationLevel;
use agentwatch_tui::persistence::{self, PersistedState, STATE_VERSION};
use agentwatch_tui::realtime::{
    spawn_summary_task, FileContent, FileEntry, SseDecoder, SseFrame, SummaryRequest,
};
use agentwatch_tui::state::{config_dump, format_elapsed, App};
use agentwatch_tui::theme::{job_status_color, node_status_color, SynthBruteTheme};
use agentwatch_tui::views::render_view;
use agentwatch_tui::widgets::TimelineFilter;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use proptest::prelude::*;
use ratatui::{backend::TestBackend, Terminal};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

const BASE_CONFIG: &str = r#"
api_base_url = "http://localhost:8000"
request_timeout_ms = 5000
refresh_interval_ms = 250
summary_poll_ms = 2000
persistence_path = "tmp/agentwatch.json"
log_path = "tmp/agentwatch.log"
log_filter = "info"

[auth]
api_key = "test-key"

[theme]
name = "synthbrute"

[job]
ticker = "nvda"
analysis_date = "2026-01-02"
timeframe = "1d"
analysts = ["market", "news"]
advisors = ["buffett"]
llm_provider = "openai"
max_debate_rounds = 1
max_risk_discuss_rounds = 2
"#;

fn base_config() -> TuiConfig {
    TuiConfig::from_toml(BASE_CONFIG).unwrap()
}

fn job() -> JobId {
    "0f8fad5bd9cb469fa16570867728950e".parse().unwrap()
}

fn other_job() -> JobId {
    "7c9e6679742540de944be07fc1f90ae7".parse().unwrap()
}

fn attached_app() -> App {
    let config = base_config();
    let api = ApiClient::new(&config).unwrap();
    let mut app = App::new(config, api);
    app.attach(job());
    app
}

/// Render the active view and return the screen as one string.
fn screen_text(app: &App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
    terminal.draw(|f| render_view(f, app)).unwrap();
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

fn press(code: KeyCode) -> Option<KeyAction> {
    map_key(KeyEvent::new(code, KeyModifiers::NONE))
}

// ============================================================================
// CONFIG
// ============================================================================

#[test]
fn config_base_is_valid() {
    assert!(base_config().validate().is_ok());
}

#[test]
fn config_example_file_is_valid() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("agentwatch.example.toml");
    let config = TuiConfig::from_path(&path).unwrap();
    assert!(config.validate().is_ok());
}

#[test]
fn config_loads_from_cli_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agentwatch.toml");
    std::fs::write(&path, BASE_CONFIG).unwrap();
    let args = CliArgs::parse(["--config".to_string(), path.display().to_string()]);
    let config = TuiConfig::load(&args).unwrap();
    assert_eq!(config.summary_poll_ms, 2000);
}

#[test]
fn config_rejects_unknown_fields() {
    let contents = format!("unexpected = true\n{}", BASE_CONFIG);
    assert!(matches!(
        TuiConfig::from_toml(&contents),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn config_requires_theme_name() {
    let mut config = base_config();
    config.theme.name = "unknown".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { field: "theme.name", .. })
    ));
}

#[test]
fn config_rejects_non_http_base_url() {
    let mut config = base_config();
    config.api_base_url = "ws://localhost:8000".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn config_rejects_bad_job_fields() {
    let mut config = base_config();
    config.job.analysis_date = "01/02/2026".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { field: "job.analysis_date", .. })
    ));

    let mut config = base_config();
    config.job.start_date = Some("2026-02-01".to_string());
    config.job.end_date = Some("2026-01-01".to_string());
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { field: "job.end_date", .. })
    ));

    let mut config = base_config();
    config.job.llm_provider = "mystery".to_string();
    assert!(config.validate().is_err());

    let mut config = base_config();
    config.job.analysts.clear();
    assert!(config.validate().is_err());

    let mut config = base_config();
    config.job.ticker = "   ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn config_dump_masks_credentials() {
    let dump = config_dump(&base_config());
    assert!(!dump.contains("test-key"));
    assert!(dump.contains("<redacted>"));
}

#[test]
fn cli_args_parse_job_and_config() {
    let args = CliArgs::parse(
        ["--job", "0f8fad5bd9cb469fa16570867728950e", "--config", "a.toml"]
            .into_iter()
            .map(String::from),
    );
    assert_eq!(args.config, Some(PathBuf::from("a.toml")));
    assert_eq!(args.job_id().unwrap(), Some(job()));

    let bad = CliArgs::parse(["--job", "nope"].into_iter().map(String::from));
    assert!(bad.job_id().is_err());
    assert_eq!(CliArgs::parse(Vec::<String>::new()).job_id().unwrap(), None);
}

#[test]
fn submit_request_maps_job_config() {
    let request = SubmitJobRequest::from(&base_config().job);
    assert_eq!(request.ticker, "NVDA");
    let body = serde_json::to_value(&request).unwrap();
    assert_eq!(body["selected_masters"], serde_json::json!(["buffett"]));
    assert_eq!(body["analysts"], serde_json::json!(["market", "news"]));
    assert!(body.get("start_date").is_none());
    assert_eq!(body["max_risk_discuss_rounds"], 2);
}

// ============================================================================
// PERSISTENCE
// ============================================================================

#[test]
fn persistence_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("state.json");
    assert_eq!(persistence::load(&path).unwrap(), None);

    let mut app = attached_app();
    app.active_view = View::Timeline;
    app.toggle_pause();
    app.cycle_stage_filter();
    let state = PersistedState::capture(&app);
    assert_eq!(state.version, STATE_VERSION);
    assert_eq!(state.last_job_id, Some(job()));

    persistence::save(&path, &state).unwrap();
    assert!(!dir.path().join("nested").join("state.json.tmp").exists());
    let loaded = persistence::load(&path).unwrap().unwrap();
    assert_eq!(loaded, state);

    let config = base_config();
    let api = ApiClient::new(&config).unwrap();
    let mut fresh = App::new(config, api);
    loaded.restore(&mut fresh);
    assert_eq!(fresh.active_view, View::Timeline);
    assert!(fresh.updates_paused);
    assert_eq!(
        fresh.timeline_view.filter,
        TimelineFilter {
            kind: None,
            stage: Some(Stage::Analysts),
        }
    );
}

#[test]
fn persistence_ignores_other_versions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, r#"{"active_view": "Reports", "last_job_id": null}"#).unwrap();
    assert_eq!(persistence::load(&path).unwrap(), None);
}

#[test]
fn persistence_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "not json").unwrap();
    assert!(persistence::load(&path).is_err());
}

// ============================================================================
// APP STATE
// ============================================================================

#[test]
fn app_ingests_events_for_attached_job_only() {
    let mut app = attached_app();
    app.enqueue_event(job(), message_event(1, "market", "Fetching prices"));
    app.enqueue_event(other_job(), message_event(2, "news", "Headlines"));

    let session = app.session.as_ref().unwrap();
    assert_eq!(session.log().len(), 1);
    assert_eq!(session.snapshot().active(), Some(AgentRole::MarketAnalyst));
}

#[test]
fn app_pause_queues_until_resume() {
    let mut app = attached_app();
    app.toggle_pause();
    app.enqueue_event(job(), message_event(1, "market", "Fetching prices"));
    app.enqueue_stream_closed(job(), "stream ended".to_string());
    assert!(app.session.as_ref().unwrap().log().is_empty());
    assert_eq!(app.event_queue.len(), 2);

    app.toggle_pause();
    let session = app.session.as_ref().unwrap();
    assert_eq!(session.log().len(), 1);
    assert!(session.is_closed());
    assert!(app.event_queue.is_empty());
}

#[test]
fn app_stream_close_is_reported_once() {
    let mut app = attached_app();
    app.enqueue_stream_closed(job(), "transport error: reset".to_string());
    app.enqueue_stream_closed(job(), "stream ended".to_string());
    assert_eq!(app.notifications.len(), 1);
    assert_eq!(app.notifications[0].level, NotificationLevel::Warning);

    app.enqueue_event(job(), message_event(5, "market", "late"));
    assert!(app.session.as_ref().unwrap().log().is_empty());
}

#[test]
fn app_ignores_close_for_other_job() {
    let mut app = attached_app();
    app.enqueue_stream_closed(other_job(), "stream ended".to_string());
    assert!(!app.session.as_ref().unwrap().is_closed());
}

#[test]
fn app_keeps_polling_until_final_summary_lands() {
    let mut app = attached_app();
    app.apply_summary_result(
        job(),
        Ok(summary_with_reports(JobStatus::Succeeded, &["market_report.md"])),
    );
    assert!(!app.awaiting_final_summary());

    // Summary already terminal when the stream closes: the last pull is still owed.
    app.enqueue_stream_closed(job(), "stream ended".to_string());
    assert!(app.is_finished());
    assert!(app.awaiting_final_summary());

    let last = summary_with_reports(
        JobStatus::Succeeded,
        &["market_report.md", "final_trade_decision.md"],
    );
    app.apply_summary_result(job(), Ok(last));
    assert!(!app.awaiting_final_summary());
    assert!(app
        .session
        .as_ref()
        .unwrap()
        .summary()
        .has_report("final_trade_decision.md"));
}

#[test]
fn app_failed_final_pull_still_clears_wait() {
    let mut app = attached_app();
    app.enqueue_stream_closed(job(), "transport error: reset".to_string());
    assert!(app.awaiting_final_summary());
    app.apply_summary_result(job(), Err("HTTP 502: bad gateway".to_string()));
    assert!(!app.awaiting_final_summary());
}

/// Summary task against a port nothing listens on: every pull fails fast but
/// still produces a `Summary` event, which is what is counted here.
#[tokio::test]
async fn summary_task_serves_final_request_queued_before_shutdown() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut config = base_config();
    config.api_base_url = format!("http://{}", addr);
    config.request_timeout_ms = 1000;
    let client = RestClient::new(&config).unwrap();

    for _ in 0..25 {
        let (requests_tx, requests_rx) = mpsc::channel(16);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (events_tx, mut events_rx) = mpsc::channel(16);
        let task = spawn_summary_task(
            client.clone(),
            job(),
            Duration::from_secs(3600),
            requests_rx,
            shutdown_rx,
            events_tx,
        );

        // First tick fires immediately.
        assert!(matches!(events_rx.recv().await, Some(TuiEvent::Summary { .. })));

        requests_tx.try_send(SummaryRequest::Final).unwrap();
        shutdown_tx.send(true).unwrap();

        match events_rx.recv().await {
            Some(TuiEvent::Summary { job_id, .. }) => assert_eq!(job_id, job()),
            other => panic!("expected the final summary pull, got {:?}", other),
        }
        task.await.unwrap();
        assert!(events_rx.recv().await.is_none());
    }
}

#[test]
fn app_terminal_summary_finishes_job() {
    let mut app = attached_app();
    app.enqueue_event(job(), report_ready_event(1, "market_report"));
    app.enqueue_stream_closed(job(), "stream ended".to_string());
    assert!(!app.is_finished());

    app.apply_summary_result(
        job(),
        Ok(summary_with_reports(JobStatus::Succeeded, &["market_report.md"])),
    );
    assert!(app.is_finished());
    let last = app.notifications.last().unwrap();
    assert_eq!(last.level, NotificationLevel::Success);
    let snapshot = app.session.as_ref().unwrap().snapshot();
    assert!(snapshot.nodes().iter().all(|n| n.status == NodeStatus::Completed));
}

#[test]
fn app_summary_failure_keeps_previous() {
    let mut app = attached_app();
    app.apply_summary_result(
        job(),
        Ok(summary_with_reports(JobStatus::Running, &["market_report.md"])),
    );
    app.apply_summary_result(job(), Err("HTTP 502: bad gateway".to_string()));

    let session = app.session.as_ref().unwrap();
    assert_eq!(session.summary().status, JobStatus::Running);
    assert_eq!(session.last_summary_error(), Some("HTTP 502: bad gateway"));
    assert_eq!(
        session.snapshot().status_of(AgentRole::MarketAnalyst),
        Some(NodeStatus::Completed)
    );
    assert_eq!(
        app.notifications.last().map(|n| n.level),
        Some(NotificationLevel::Warning)
    );
}

#[test]
fn app_ignores_summary_for_other_job() {
    let mut app = attached_app();
    app.apply_summary_result(other_job(), Ok(summary_with_reports(JobStatus::Succeeded, &[])));
    assert_eq!(app.session.as_ref().unwrap().summary().status, JobStatus::Unknown);
}

#[test]
fn app_attach_resets_everything() {
    let mut app = attached_app();
    app.enqueue_event(job(), message_event(1, "market", "Fetching prices"));
    app.enqueue_stream_closed(job(), "stream ended".to_string());
    app.attach(other_job());

    let session = app.session.as_ref().unwrap();
    assert_eq!(session.job_id(), other_job());
    assert!(session.log().is_empty());
    assert!(!session.is_closed());
}

#[test]
fn app_filter_cycles_through_kinds() {
    let mut app = attached_app();
    let mut seen = Vec::new();
    for _ in 0..=ActivityKind::all().len() {
        app.cycle_kind_filter();
        seen.push(app.timeline_view.filter.kind);
    }
    assert_eq!(seen.first(), Some(&Some(ActivityKind::Message)));
    assert_eq!(seen.last(), Some(&None));
}

#[test]
fn app_filtered_timeline_respects_kind() {
    let mut app = attached_app();
    app.enqueue_event(job(), status_event(1, JobStatus::Running));
    app.enqueue_event(job(), message_event(2, "market", "Fetching prices"));
    app.enqueue_event(job(), report_ready_event(3, "market_report"));
    assert_eq!(app.filtered_timeline().len(), 3);

    app.timeline_view.filter.kind = Some(ActivityKind::Report);
    let records = app.filtered_timeline();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].seq, 3);
}

#[test]
fn app_filtered_timeline_respects_stage() {
    let mut app = attached_app();
    app.enqueue_event(job(), message_event(1, "market", "Fetching prices"));
    app.enqueue_event(job(), message_event(2, "bull", "Bull case is strong"));
    app.enqueue_event(job(), message_event(3, "trader", "The trader proposes BUY"));

    app.cycle_stage_filter();
    app.cycle_stage_filter();
    assert_eq!(app.timeline_view.filter.stage, Some(Stage::Research));
    let seqs: Vec<u64> = app.filtered_timeline().iter().map(|r| r.seq).collect();
    assert_eq!(seqs, vec![2]);

    app.timeline_view.filter.kind = Some(ActivityKind::Tool);
    assert!(app.filtered_timeline().is_empty());
}

#[test]
fn app_reports_open_and_load() {
    let mut app = attached_app();
    let mut summary = summary_with_reports(JobStatus::Running, &["market_report.md"]);
    summary.archive_files.insert("logs/run.jsonl".to_string());
    app.apply_summary_result(job(), Ok(summary));

    assert_eq!(
        app.file_entries(),
        vec![
            FileEntry::Report("market_report.md".to_string()),
            FileEntry::Archive("logs/run.jsonl".to_string()),
        ]
    );

    app.active_view = View::Reports;
    app.select_next();
    let entry = app.open_selected();
    assert_eq!(entry, Some(FileEntry::Report("market_report.md".to_string())));
    assert_eq!(app.reports_view.loading.as_deref(), Some("market_report.md"));

    app.apply_file_loaded(
        job(),
        "market_report.md".to_string(),
        Ok(FileContent::Text("# Market".to_string())),
    );
    assert!(app.reports_view.loading.is_none());
    assert_eq!(
        app.reports_view.loaded.as_ref().map(|f| &f.content),
        Some(&FileContent::Text("# Market".to_string()))
    );

    app.close_overlay();
    assert!(app.reports_view.loaded.is_none());
}

#[test]
fn app_reports_list_artifacts_and_archive_listing() {
    let mut app = attached_app();
    let mut summary = summary_with_reports(JobStatus::Succeeded, &["market_report.md"]);
    summary.artifacts.insert("price.png".to_string());
    summary.archive_files.insert("logs/run.jsonl".to_string());
    app.apply_summary_result(job(), Ok(summary));

    assert!(app.take_archive_listing_request());
    assert!(!app.take_archive_listing_request());

    app.apply_archive_listing(
        other_job(),
        Ok(ArchiveListing {
            archive_dir: Some("/elsewhere".to_string()),
            files: vec!["ignored.md".to_string()],
        }),
    );
    assert!(app.reports_view.archive.is_none());

    app.apply_archive_listing(
        job(),
        Ok(ArchiveListing {
            archive_dir: Some("/runs/NVDA".to_string()),
            files: vec!["logs/run.jsonl".to_string(), "charts/price.png".to_string()],
        }),
    );
    assert_eq!(app.archive_dir(), Some("/runs/NVDA"));
    assert_eq!(
        app.file_entries(),
        vec![
            FileEntry::Report("market_report.md".to_string()),
            FileEntry::Artifact("price.png".to_string()),
            FileEntry::Archive("charts/price.png".to_string()),
            FileEntry::Archive("logs/run.jsonl".to_string()),
        ]
    );

    app.active_view = View::Reports;
    app.select_next();
    app.select_next();
    assert_eq!(
        app.open_selected(),
        Some(FileEntry::Artifact("price.png".to_string()))
    );
    app.apply_file_loaded(
        job(),
        "price.png".to_string(),
        Ok(FileContent::Binary {
            size: 2048,
            content_type: Some("image/png".to_string()),
        }),
    );

    let screen = screen_text(&app);
    assert!(screen.contains("Binary file, not previewed."));
    assert!(screen.contains("artifact"));
}

#[test]
fn app_archive_listing_failure_is_reported() {
    let mut app = attached_app();
    app.apply_archive_listing(job(), Err("HTTP 404: Archive not available".to_string()));
    assert!(app.reports_view.archive.is_none());
    assert_eq!(
        app.notifications.last().map(|n| n.level),
        Some(NotificationLevel::Warning)
    );
    assert!(!app.take_archive_listing_request());
}

#[test]
fn pipeline_preview_shows_step_and_team() {
    let mut app = attached_app();
    app.active_view = View::Pipeline;
    app.select_next();
    let total = app.session.as_ref().unwrap().topology().len();

    let screen = screen_text(&app);
    assert!(screen.contains(&format!("Step: 1 of {} (Analyst Team)", total)));
}

#[test]
fn app_selection_is_clamped() {
    let mut app = attached_app();
    let nodes = app.session.as_ref().unwrap().snapshot().nodes().len();
    for _ in 0..nodes + 5 {
        app.select_next();
    }
    assert_eq!(app.pipeline_view.selected, Some(nodes - 1));
    for _ in 0..nodes + 5 {
        app.select_previous();
    }
    assert_eq!(app.pipeline_view.selected, Some(0));
}

#[test]
fn app_timeline_open_shows_modal() {
    let mut app = attached_app();
    app.enqueue_event(job(), message_event(1, "market", "Fetching prices"));
    app.active_view = View::Timeline;
    app.select_next();
    assert!(app.open_selected().is_none());
    let modal = app.modal.clone().unwrap();
    assert!(modal.message.contains("Fetching prices"));
    app.close_overlay();
    assert!(app.modal.is_none());
}

#[test]
fn every_view_renders() {
    let mut app = attached_app();
    app.enqueue_event(job(), message_event(1, "market", "Fetching prices"));
    app.enqueue_event(job(), report_ready_event(2, "market_report"));
    app.apply_summary_result(
        job(),
        Ok(summary_with_reports(JobStatus::Running, &["market_report.md"])),
    );
    app.open_help();

    let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
    for view in View::all() {
        app.active_view = *view;
        terminal.draw(|f| render_view(f, &app)).unwrap();
    }
}

#[test]
fn elapsed_is_formatted() {
    assert_eq!(format_elapsed(0), "00:00:00");
    assert_eq!(format_elapsed(3_725), "01:02:05");
}

// ============================================================================
// KEYS, NAV, THEME
// ============================================================================

#[test]
fn control_keys_map() {
    let ctrl = |c| map_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
    assert_eq!(ctrl('r'), Some(KeyAction::Refresh));
    assert_eq!(ctrl('c'), Some(KeyAction::Quit));
    assert_eq!(press(KeyCode::BackTab), Some(KeyAction::PrevView));
    assert_eq!(press(KeyCode::Esc), Some(KeyAction::Close));
    assert_eq!(press(KeyCode::Char('n')), Some(KeyAction::NewJob));
    assert_eq!(press(KeyCode::Char('f')), Some(KeyAction::CycleKindFilter));
    assert_eq!(press(KeyCode::Char('s')), Some(KeyAction::CycleStageFilter));
}

#[test]
fn theme_colors_follow_status() {
    let theme = SynthBruteTheme::synthbrute();
    assert_eq!(node_status_color(NodeStatus::Completed, &theme), theme.success);
    assert_eq!(node_status_color(NodeStatus::InProgress, &theme), theme.primary);
    assert_eq!(job_status_color(JobStatus::Failed, &theme), theme.error);
}

proptest! {
    #[test]
    fn keybinding_digit_switches_view(digit in 0u8..=9u8) {
        let ch = char::from(b'0' + digit);
        let action = press(KeyCode::Char(ch));
        match ch {
            '1'..='4' => {
                let expected = (digit - 1) as usize;
                prop_assert_eq!(action, Some(KeyAction::SwitchView(expected)));
                prop_assert!(View::from_index(expected).is_some());
            }
            _ => prop_assert!(action.is_none()),
        }
    }

    #[test]
    fn navigation_keys_consistent(use_vim in prop::bool::ANY) {
        let (down, up) = if use_vim {
            (KeyCode::Char('j'), KeyCode::Char('k'))
        } else {
            (KeyCode::Down, KeyCode::Up)
        };
        prop_assert_eq!(press(down), Some(KeyAction::MoveDown));
        prop_assert_eq!(press(up), Some(KeyAction::MoveUp));
    }

    #[test]
    fn all_action_keys_mapped(key_char in "[qprfsn?]") {
        let c = key_char.chars().next().unwrap();
        prop_assert!(press(KeyCode::Char(c)).is_some(), "Key '{}' should map to an action", c);
    }

    #[test]
    fn view_cycle_round_trips(start in 0usize..4, steps in 0usize..12) {
        let view = View::from_index(start).unwrap();
        let mut forward = view;
        for _ in 0..steps {
            forward = forward.next();
        }
        let mut back = forward;
        for _ in 0..steps {
            back = back.previous();
        }
        prop_assert_eq!(back, view);
        prop_assert_eq!(forward.index(), (start + steps) % View::all().len());
    }

    // Any chunking of the byte stream yields the same frames.
    #[test]
    fn sse_decoder_is_chunking_invariant(
        payloads in prop::collection::vec("[a-z0-9 {}:\"]{0,24}", 1..6),
        cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..8),
    ) {
        let mut wire = String::from(": heartbeat\n\n");
        for (i, payload) in payloads.iter().enumerate() {
            wire.push_str(&format!("id: {}\r\nevent: message\ndata: {}\n\n", i + 1, payload));
        }
        let bytes = wire.as_bytes();

        let mut points: Vec<usize> = cuts.iter().map(|c| c.index(bytes.len() + 1)).collect();
        points.sort_unstable();
        points.dedup();

        let mut decoder = SseDecoder::new();
        let mut frames: Vec<SseFrame> = Vec::new();
        let mut start = 0;
        for point in points.into_iter().chain(std::iter::once(bytes.len())) {
            frames.extend(decoder.push(&bytes[start..point]));
            start = point;
        }
        prop_assert!(decoder.finish().is_none());

        prop_assert_eq!(frames.len(), payloads.len());
        for (i, (frame, payload)) in frames.iter().zip(&payloads).enumerate() {
            let id = (i + 1).to_string();
            prop_assert_eq!(frame.id.as_deref(), Some(id.as_str()));
            prop_assert_eq!(frame.event.as_deref(), Some("message"));
            prop_assert_eq!(&frame.data, payload);
        }
    }
}
