//! Live job telemetry: the SSE push task and the summary pull task.
//!
//! Both tasks tag every message with the job id they serve. A [`JobWatch`]
//! owns the pair for one job; dropping it tears both down, so starting a new
//! watch always stops the previous one first.

use crate::api_client::{FileBody, RestClient, StreamClient};
use crate::events::TuiEvent;
use agentwatch_core::JobId;
use agentwatch_events::parse_event;
use futures_util::StreamExt;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

// ============================================================================
// SSE DECODING
// ============================================================================

/// One dispatched server-sent event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    pub id: Option<String>,
    pub event: Option<String>,
    pub data: String,
}

/// Incremental SSE decoder.
///
/// Accepts arbitrary byte chunks; a frame is dispatched on a blank line.
/// Comment lines (leading `:`, e.g. heartbeats) are ignored and multiple
/// `data:` lines are joined with `\n`.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    pending: SseFrame,
    has_data: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, returning every frame it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Flush a trailing frame left without its blank-line terminator.
    pub fn finish(&mut self) -> Option<SseFrame> {
        let rest = std::mem::take(&mut self.buffer);
        if !rest.is_empty() {
            let line = String::from_utf8_lossy(&rest).trim_end_matches('\r').to_string();
            self.process_line(&line);
        }
        self.dispatch()
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "data" => {
                if self.has_data {
                    self.pending.data.push('\n');
                }
                self.pending.data.push_str(value);
                self.has_data = true;
            }
            "event" => self.pending.event = Some(value.to_string()),
            "id" => self.pending.id = Some(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let frame = std::mem::take(&mut self.pending);
        let had_data = std::mem::replace(&mut self.has_data, false);
        had_data.then_some(frame)
    }
}

// ============================================================================
// PUSH TASK
// ============================================================================

/// Spawn the SSE task for one job.
///
/// Forwards each decoded event and ends with exactly one `StreamClosed`.
pub fn spawn_stream_task(
    client: StreamClient,
    job_id: JobId,
    after_seq: u64,
    sender: mpsc::Sender<TuiEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let reason = run_stream(&client, job_id, after_seq, &sender).await;
        let _ = sender.send(TuiEvent::StreamClosed { job_id, reason }).await;
    })
}

async fn run_stream(
    client: &StreamClient,
    job_id: JobId,
    after_seq: u64,
    sender: &mpsc::Sender<TuiEvent>,
) -> String {
    let response = match client.open(job_id, after_seq).await {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(job_id = %job_id, error = %err, "Failed to open event stream");
            return format!("connect failed: {}", err);
        }
    };
    tracing::info!(job_id = %job_id, after_seq, "Event stream opened");

    let mut decoder = SseDecoder::new();
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        match chunk {
            Ok(bytes) => {
                for frame in decoder.push(&bytes) {
                    if !forward_frame(job_id, frame, sender).await {
                        return "console shut down".to_string();
                    }
                }
            }
            Err(err) => {
                tracing::error!(job_id = %job_id, error = %err, "Event stream transport error");
                return format!("transport error: {}", err);
            }
        }
    }
    if let Some(frame) = decoder.finish() {
        forward_frame(job_id, frame, sender).await;
    }
    "stream ended".to_string()
}

/// Returns `false` once the receiving side is gone.
async fn forward_frame(job_id: JobId, frame: SseFrame, sender: &mpsc::Sender<TuiEvent>) -> bool {
    match parse_event(&frame.data) {
        Ok(event) => sender
            .send(TuiEvent::Event {
                job_id,
                event: Box::new(event),
            })
            .await
            .is_ok(),
        Err(err) => {
            tracing::debug!(
                job_id = %job_id,
                frame_id = ?frame.id,
                frame_event = ?frame.event,
                error = %err,
                "Dropping malformed stream frame"
            );
            true
        }
    }
}

// ============================================================================
// PULL TASK
// ============================================================================

/// Why a summary pull was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryRequest {
    /// The push stream announced new artifacts or a terminal state.
    EventTriggered,
    /// The user asked for a refresh.
    Manual,
    /// The push stream closed; last reconciliation.
    Final,
}

/// Spawn the summary task for one job.
///
/// Pulls on every poll tick and on every explicit request until shutdown.
/// Queued requests are served before shutdown is honoured, so a `Final`
/// request sent just ahead of `stop_polling` still gets its pull.
pub fn spawn_summary_task(
    client: RestClient,
    job_id: JobId,
    poll_every: Duration,
    mut requests: mpsc::Receiver<SummaryRequest>,
    mut shutdown_rx: watch::Receiver<bool>,
    sender: mpsc::Sender<TuiEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(poll_every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            job_id = %job_id,
            poll_ms = poll_every.as_millis() as u64,
            "Summary task started"
        );

        loop {
            let reason = tokio::select! {
                biased;
                request = requests.recv() => match request {
                    Some(request) => Some(request),
                    None => break,
                },
                changed = shutdown_rx.changed() => {
                    // A dropped sender counts as shutdown.
                    if changed.is_ok() && !*shutdown_rx.borrow() {
                        continue;
                    }
                    if let Some(request) = drain_requests(&mut requests) {
                        pull_summary(&client, job_id, Some(request), &sender).await;
                    }
                    tracing::info!(job_id = %job_id, "Summary task shutting down");
                    break;
                }
                _ = ticker.tick() => None,
            };

            if !pull_summary(&client, job_id, reason, &sender).await {
                break;
            }
        }
    })
}

/// Empty the request queue, keeping the strongest reason seen.
pub fn drain_requests(requests: &mut mpsc::Receiver<SummaryRequest>) -> Option<SummaryRequest> {
    let mut strongest: Option<SummaryRequest> = None;
    while let Ok(request) = requests.try_recv() {
        strongest = Some(match strongest {
            Some(SummaryRequest::Final) => SummaryRequest::Final,
            _ => request,
        });
    }
    strongest
}

/// Returns `false` once the receiving side is gone.
async fn pull_summary(
    client: &RestClient,
    job_id: JobId,
    reason: Option<SummaryRequest>,
    sender: &mpsc::Sender<TuiEvent>,
) -> bool {
    let result = client.fetch_summary(job_id).await.map_err(|e| e.to_string());
    tracing::debug!(
        job_id = %job_id,
        request = ?reason,
        ok = result.is_ok(),
        "Summary pull finished"
    );
    sender
        .send(TuiEvent::Summary { job_id, result })
        .await
        .is_ok()
}

// ============================================================================
// FILE FETCH
// ============================================================================

/// A file listed for the job: a report, a run artifact or an archived file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEntry {
    Report(String),
    Artifact(String),
    Archive(String),
}

impl FileEntry {
    pub fn name(&self) -> &str {
        match self {
            FileEntry::Report(name) | FileEntry::Artifact(name) | FileEntry::Archive(name) => {
                name
            }
        }
    }
}

/// Extensions never previewed as text, whatever the server claims.
const BINARY_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "pdf", "zip", "gz", "pkl"];

/// Downloaded file, decoded only when it is text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    Binary {
        size: usize,
        content_type: Option<String>,
    },
}

impl FileContent {
    pub fn from_body(name: &str, body: FileBody) -> Self {
        let FileBody {
            content_type,
            bytes,
        } = body;
        if looks_binary(name, content_type.as_deref()) {
            return FileContent::Binary {
                size: bytes.len(),
                content_type,
            };
        }
        match String::from_utf8(bytes) {
            Ok(text) => FileContent::Text(text),
            Err(err) => FileContent::Binary {
                size: err.as_bytes().len(),
                content_type,
            },
        }
    }

    pub fn size(&self) -> usize {
        match self {
            FileContent::Text(text) => text.len(),
            FileContent::Binary { size, .. } => *size,
        }
    }
}

fn looks_binary(name: &str, content_type: Option<&str>) -> bool {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if BINARY_EXTENSIONS.contains(&extension.as_str()) {
        return true;
    }
    content_type.is_some_and(|t| {
        let t = t.to_ascii_lowercase();
        t.starts_with("image/") || t.starts_with("application/octet-stream")
    })
}

/// Fetch one listed file in the background.
pub fn spawn_file_fetch(
    client: RestClient,
    job_id: JobId,
    entry: FileEntry,
    sender: mpsc::Sender<TuiEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = match &entry {
            FileEntry::Report(name) => client
                .fetch_report(job_id, name)
                .await
                .map(FileContent::Text),
            FileEntry::Artifact(name) => client
                .fetch_artifact(job_id, name)
                .await
                .map(|body| FileContent::from_body(name, body)),
            FileEntry::Archive(path) => client
                .fetch_archive_file(job_id, path)
                .await
                .map(|body| FileContent::from_body(path, body)),
        };
        if let Err(err) = &result {
            tracing::warn!(job_id = %job_id, file = entry.name(), error = %err, "File fetch failed");
        }
        let _ = sender
            .send(TuiEvent::FileLoaded {
                job_id,
                name: entry.name().to_string(),
                result: result.map_err(|e| e.to_string()),
            })
            .await;
    })
}

/// List the job's archive directory in the background.
pub fn spawn_archive_listing(
    client: RestClient,
    job_id: JobId,
    sender: mpsc::Sender<TuiEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = client.list_archive(job_id).await;
        match &result {
            Ok(listing) => {
                tracing::debug!(job_id = %job_id, files = listing.files.len(), "Archive listed")
            }
            Err(err) => tracing::warn!(job_id = %job_id, error = %err, "Archive listing failed"),
        }
        let _ = sender
            .send(TuiEvent::ArchiveListed {
                job_id,
                result: result.map_err(|e| e.to_string()),
            })
            .await;
    })
}

// ============================================================================
// JOB WATCH
// ============================================================================

/// Running push and pull tasks for one job.
pub struct JobWatch {
    job_id: JobId,
    stream: JoinHandle<()>,
    summary: JoinHandle<()>,
    requests: mpsc::Sender<SummaryRequest>,
    shutdown_tx: watch::Sender<bool>,
}

impl JobWatch {
    pub fn start(
        rest: RestClient,
        stream: StreamClient,
        job_id: JobId,
        after_seq: u64,
        poll_every: Duration,
        sender: mpsc::Sender<TuiEvent>,
    ) -> Self {
        let (requests, requests_rx) = mpsc::channel(16);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let summary = spawn_summary_task(
            rest,
            job_id,
            poll_every,
            requests_rx,
            shutdown_rx,
            sender.clone(),
        );
        let stream = spawn_stream_task(stream, job_id, after_seq, sender);
        Self {
            job_id,
            stream,
            summary,
            requests,
            shutdown_tx,
        }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Ask for a summary pull. Requests are coalesced when the queue is full.
    pub fn request_summary(&self, request: SummaryRequest) {
        if let Err(err) = self.requests.try_send(request) {
            tracing::debug!(job_id = %self.job_id, error = %err, "Summary request coalesced");
        }
    }

    /// Stop polling; the stream task is left to finish on its own.
    pub fn stop_polling(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

impl Drop for JobWatch {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
        self.stream.abort();
        self.summary.abort();
    }
}
