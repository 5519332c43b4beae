//! Application state and view state definitions.

use crate::api_client::{ApiClient, ArchiveListing};
use crate::config::TuiConfig;
use crate::events::TuiEvent;
use crate::keys::HELP_TEXT;
use crate::nav::View;
use crate::notifications::{Notification, NotificationLevel};
use crate::realtime::{FileContent, FileEntry, JobWatch, SummaryRequest};
use crate::theme::SynthBruteTheme;
use crate::widgets::TimelineFilter;
use agentwatch_core::{ActivityRecord, JobId, JobSummary, RawEvent};
use agentwatch_events::{IngestError, MonitorSession};
use std::collections::{BTreeSet, VecDeque};
use std::time::Duration;
use tokio::sync::mpsc;

/// Seconds a notification stays in the footer.
const NOTIFICATION_TTL_SECS: i64 = 8;

/// Push-side update held back while updates are paused.
#[derive(Debug, Clone)]
pub enum QueuedUpdate {
    Event { job_id: JobId, event: RawEvent },
    Closed { job_id: JobId, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineViewState {
    pub selected: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct TimelineViewState {
    pub selected: Option<usize>,
    pub filter: TimelineFilter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFile {
    pub name: String,
    pub content: FileContent,
}

#[derive(Debug, Clone, Default)]
pub struct ReportsViewState {
    pub selected: Option<usize>,
    pub loading: Option<String>,
    pub loaded: Option<LoadedFile>,
    /// Last archive directory listing for the attached job.
    pub archive: Option<ArchiveListing>,
    archive_wanted: bool,
    archive_requested: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigViewState {
    pub content: String,
}

pub struct App {
    pub config: TuiConfig,
    pub theme: SynthBruteTheme,
    pub api: ApiClient,
    pub active_view: View,

    pub session: Option<MonitorSession>,
    pub watch: Option<JobWatch>,
    /// Wall-clock epoch seconds at attach, used until the summary reports `created_at`.
    pub attached_at: f64,

    pub pipeline_view: PipelineViewState,
    pub timeline_view: TimelineViewState,
    pub reports_view: ReportsViewState,
    pub config_view: ConfigViewState,

    pub notifications: Vec<Notification>,
    pub modal: Option<Modal>,

    pub updates_paused: bool,
    pub event_queue: VecDeque<QueuedUpdate>,

    /// Set when the stream closes; cleared once the next summary lands.
    final_pull_pending: bool,
}

impl App {
    pub fn new(config: TuiConfig, api: ApiClient) -> Self {
        let config_view = ConfigViewState {
            content: config_dump(&config),
        };
        Self {
            config,
            theme: SynthBruteTheme::synthbrute(),
            api,
            active_view: View::Pipeline,
            session: None,
            watch: None,
            attached_at: 0.0,
            pipeline_view: PipelineViewState::default(),
            timeline_view: TimelineViewState::default(),
            reports_view: ReportsViewState::default(),
            config_view,
            notifications: Vec::new(),
            modal: None,
            updates_paused: false,
            event_queue: VecDeque::new(),
            final_pull_pending: false,
        }
    }

    pub fn job_id(&self) -> Option<JobId> {
        self.session.as_ref().map(|s| s.job_id())
    }

    /// Point the console at `job_id`, discarding everything about the previous job.
    ///
    /// Any running watch is dropped, which aborts its tasks.
    pub fn attach(&mut self, job_id: JobId) {
        self.watch = None;
        self.event_queue.clear();
        self.final_pull_pending = false;
        let run_config = self.config.job.run_configuration();
        match self.session.as_mut() {
            Some(session) => session.reset(job_id, run_config),
            None => self.session = Some(MonitorSession::new(job_id, run_config)),
        }
        self.attached_at = now_epoch_secs();
        self.pipeline_view = PipelineViewState::default();
        self.timeline_view.selected = None;
        self.reports_view = ReportsViewState::default();
        self.modal = None;
    }

    /// Start push and pull tasks for the attached job.
    pub fn start_watch(&mut self, sender: mpsc::Sender<TuiEvent>) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let after_seq = session.last_seq().unwrap_or(0);
        self.watch = Some(JobWatch::start(
            self.api.rest().clone(),
            self.api.stream().clone(),
            session.job_id(),
            after_seq,
            Duration::from_millis(self.config.summary_poll_ms),
            sender,
        ));
    }

    pub fn enqueue_event(&mut self, job_id: JobId, event: RawEvent) {
        if self.updates_paused {
            self.event_queue.push_back(QueuedUpdate::Event { job_id, event });
        } else {
            self.apply_stream_event(job_id, event);
        }
    }

    pub fn enqueue_stream_closed(&mut self, job_id: JobId, reason: String) {
        if self.updates_paused {
            self.event_queue
                .push_back(QueuedUpdate::Closed { job_id, reason });
        } else {
            self.apply_stream_closed(job_id, reason);
        }
    }

    pub fn flush_queued_events(&mut self) {
        while let Some(update) = self.event_queue.pop_front() {
            match update {
                QueuedUpdate::Event { job_id, event } => self.apply_stream_event(job_id, event),
                QueuedUpdate::Closed { job_id, reason } => {
                    self.apply_stream_closed(job_id, reason)
                }
            }
        }
    }

    pub fn toggle_pause(&mut self) {
        self.updates_paused = !self.updates_paused;
        if !self.updates_paused {
            self.flush_queued_events();
        }
    }

    fn apply_stream_event(&mut self, job_id: JobId, event: RawEvent) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.ingest_for(job_id, event) {
            Ok(outcome) => {
                if outcome.pull_summary {
                    self.request_summary(SummaryRequest::EventTriggered);
                }
            }
            Err(IngestError::WrongJob { .. }) | Err(IngestError::SessionClosed) => {}
            Err(err) => tracing::debug!(error = %err, "Event not ingested"),
        }
    }

    fn apply_stream_closed(&mut self, job_id: JobId, reason: String) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.job_id() != job_id {
            return;
        }
        if session.close(reason.clone()) {
            self.final_pull_pending = true;
            self.request_summary(SummaryRequest::Final);
            let level = if reason == "stream ended" {
                NotificationLevel::Info
            } else {
                NotificationLevel::Warning
            };
            self.notify(level, format!("Event stream closed: {}", reason));
        }
        self.stop_polling_if_finished();
    }

    pub fn apply_summary_result(&mut self, job_id: JobId, result: Result<JobSummary, String>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.job_id() != job_id {
            tracing::debug!(expected = %session.job_id(), got = %job_id, "Dropping summary for another job");
            return;
        }
        self.final_pull_pending = false;
        match result {
            Ok(summary) => {
                let was_terminal = session.summary().status.is_terminal();
                session.apply_summary(summary);
                let status = session.summary().status;
                if !was_terminal && status.is_terminal() {
                    let level = match status {
                        agentwatch_core::JobStatus::Succeeded => NotificationLevel::Success,
                        agentwatch_core::JobStatus::Failed => NotificationLevel::Error,
                        _ => NotificationLevel::Warning,
                    };
                    let message = match session.summary().error.as_deref() {
                        Some(error) => format!("Job {}: {}", status, error),
                        None => format!("Job {}", status),
                    };
                    self.notify(level, message);
                }
            }
            Err(error) => {
                session.summary_failed(error.clone());
                self.notify(
                    NotificationLevel::Warning,
                    format!("Summary refresh failed: {}", error),
                );
            }
        }
        if self.job_is_terminal() && !self.reports_view.archive_requested {
            self.reports_view.archive_wanted = true;
        }
        self.stop_polling_if_finished();
    }

    pub fn apply_file_loaded(
        &mut self,
        job_id: JobId,
        name: String,
        result: Result<FileContent, String>,
    ) {
        if self.job_id() != Some(job_id) {
            return;
        }
        if self.reports_view.loading.as_deref() == Some(name.as_str()) {
            self.reports_view.loading = None;
        }
        match result {
            Ok(content) => self.reports_view.loaded = Some(LoadedFile { name, content }),
            Err(error) => self.notify(
                NotificationLevel::Error,
                format!("Failed to load {}: {}", name, error),
            ),
        }
    }

    pub fn apply_archive_listing(
        &mut self,
        job_id: JobId,
        result: Result<ArchiveListing, String>,
    ) {
        if self.job_id() != Some(job_id) {
            return;
        }
        match result {
            Ok(listing) => self.reports_view.archive = Some(listing),
            Err(error) => self.notify(
                NotificationLevel::Warning,
                format!("Archive listing failed: {}", error),
            ),
        }
    }

    /// True once per request for an archive listing; the caller spawns the fetch.
    ///
    /// A listing is wanted when the job first turns terminal and on refresh
    /// from the Reports view.
    pub fn take_archive_listing_request(&mut self) -> bool {
        if self.job_id().is_none() || !self.reports_view.archive_wanted {
            return false;
        }
        self.reports_view.archive_wanted = false;
        self.reports_view.archive_requested = true;
        true
    }

    fn job_is_terminal(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.summary().status.is_terminal())
    }

    /// The push side is closed and the summary is terminal; nothing left to poll for.
    pub fn is_finished(&self) -> bool {
        self.session
            .as_ref()
            .map(|s| s.is_closed() && s.summary().status.is_terminal())
            .unwrap_or(false)
    }

    /// The stream closed and its last summary pull has not come back yet.
    pub fn awaiting_final_summary(&self) -> bool {
        self.final_pull_pending
    }

    fn stop_polling_if_finished(&self) {
        if self.is_finished() && !self.final_pull_pending {
            if let Some(watch) = &self.watch {
                watch.stop_polling();
            }
        }
    }

    pub fn request_summary(&self, request: SummaryRequest) {
        if let Some(watch) = &self.watch {
            watch.request_summary(request);
        }
    }

    pub fn refresh(&mut self) {
        if self.watch.is_none() {
            self.notify(NotificationLevel::Warning, "No job attached");
            return;
        }
        self.request_summary(SummaryRequest::Manual);
        if self.active_view == View::Reports {
            self.reports_view.archive_wanted = true;
        }
        self.notify(NotificationLevel::Info, "Summary refresh requested");
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(Notification::new(level, message));
    }

    pub fn prune_notifications(&mut self) {
        let now = chrono::Utc::now();
        self.notifications
            .retain(|n| !n.is_expired(now, NOTIFICATION_TTL_SECS));
    }

    pub fn cycle_kind_filter(&mut self) {
        self.timeline_view.filter.cycle_kind();
        self.timeline_view.selected = None;
    }

    pub fn cycle_stage_filter(&mut self) {
        self.timeline_view.filter.cycle_stage();
        self.timeline_view.selected = None;
    }

    /// Timeline records passing the current filter, oldest first.
    pub fn filtered_timeline(&self) -> Vec<&ActivityRecord> {
        let Some(session) = self.session.as_ref() else {
            return Vec::new();
        };
        session
            .timeline()
            .iter()
            .filter(|r| self.timeline_view.filter.matches(r))
            .collect()
    }

    /// Reports, then artifacts, then archived files.
    ///
    /// Archived files are the union of the summary's list and the last
    /// archive listing.
    pub fn file_entries(&self) -> Vec<FileEntry> {
        let Some(session) = self.session.as_ref() else {
            return Vec::new();
        };
        let summary = session.summary();
        let mut archive: BTreeSet<&String> = summary.archive_files.iter().collect();
        if let Some(listing) = &self.reports_view.archive {
            archive.extend(listing.files.iter());
        }
        summary
            .reports
            .iter()
            .cloned()
            .map(FileEntry::Report)
            .chain(summary.artifacts.iter().cloned().map(FileEntry::Artifact))
            .chain(archive.into_iter().cloned().map(FileEntry::Archive))
            .collect()
    }

    /// Archive directory, preferring the summary over the listing.
    pub fn archive_dir(&self) -> Option<&str> {
        let from_summary = self
            .session
            .as_ref()
            .and_then(|s| s.summary().archive_dir.as_deref());
        from_summary.or_else(|| {
            self.reports_view
                .archive
                .as_ref()
                .and_then(|l| l.archive_dir.as_deref())
        })
    }

    pub fn selected_record(&self) -> Option<&ActivityRecord> {
        let index = self.timeline_view.selected?;
        self.filtered_timeline().get(index).copied()
    }

    pub fn select_next(&mut self) {
        let len = self.selection_len();
        if let Some(selected) = self.selection_mut() {
            *selected = step(*selected, len, true);
        }
    }

    pub fn select_previous(&mut self) {
        let len = self.selection_len();
        if let Some(selected) = self.selection_mut() {
            *selected = step(*selected, len, false);
        }
    }

    fn selection_len(&self) -> usize {
        match self.active_view {
            View::Pipeline => self
                .session
                .as_ref()
                .map(|s| s.snapshot().nodes().len())
                .unwrap_or(0),
            View::Timeline => self.filtered_timeline().len(),
            View::Reports => self.file_entries().len(),
            View::Config => 0,
        }
    }

    fn selection_mut(&mut self) -> Option<&mut Option<usize>> {
        match self.active_view {
            View::Pipeline => Some(&mut self.pipeline_view.selected),
            View::Timeline => Some(&mut self.timeline_view.selected),
            View::Reports => Some(&mut self.reports_view.selected),
            View::Config => None,
        }
    }

    /// Act on Enter. Returns the file to fetch when a report entry is opened.
    pub fn open_selected(&mut self) -> Option<FileEntry> {
        match self.active_view {
            View::Reports => {
                let entry = self
                    .reports_view
                    .selected
                    .and_then(|i| self.file_entries().get(i).cloned())?;
                self.reports_view.loading = Some(entry.name().to_string());
                Some(entry)
            }
            View::Timeline => {
                let modal = self.selected_record().map(|record| Modal {
                    title: format!("#{} {} {}", record.seq, record.agent, record.kind),
                    message: record.content.clone(),
                });
                if modal.is_some() {
                    self.modal = modal;
                }
                None
            }
            View::Pipeline | View::Config => None,
        }
    }

    /// Close the modal, or the loaded file when no modal is open.
    pub fn close_overlay(&mut self) {
        if self.modal.take().is_none() {
            self.reports_view.loaded = None;
        }
    }

    pub fn open_help(&mut self) {
        self.modal = Some(Modal {
            title: "Keybindings".to_string(),
            message: HELP_TEXT.to_string(),
        });
    }

    /// Seconds since the job was created, falling back to attach time.
    pub fn elapsed_secs(&self) -> Option<u64> {
        let session = self.session.as_ref()?;
        let summary = session.summary();
        let start = if summary.created_at > 0.0 {
            summary.created_at
        } else {
            self.attached_at
        };
        let end = if summary.status.is_terminal() && summary.updated_at > 0.0 {
            summary.updated_at
        } else {
            now_epoch_secs()
        };
        Some((end - start).max(0.0) as u64)
    }
}

fn step(selected: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let next = match (selected, forward) {
        (None, _) => 0,
        (Some(i), true) => (i + 1).min(len - 1),
        (Some(i), false) => i.saturating_sub(1),
    };
    Some(next)
}

fn now_epoch_secs() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Debug dump of the configuration with credentials masked.
pub fn config_dump(config: &TuiConfig) -> String {
    let mut redacted = config.clone();
    if redacted.auth.api_key.is_some() {
        redacted.auth.api_key = Some("<redacted>".to_string());
    }
    if redacted.auth.bearer_token.is_some() {
        redacted.auth.bearer_token = Some("<redacted>".to_string());
    }
    format!("{:#?}", redacted)
}

/// Format a duration in seconds as `HH:MM:SS`.
pub fn format_elapsed(secs: u64) -> String {
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
