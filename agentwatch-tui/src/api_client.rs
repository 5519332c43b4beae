//! API client layer for the analysis backend: REST pulls and the SSE push stream.

use crate::config::{AuthConfig, JobConfig, TuiConfig};
use agentwatch_core::{AdvisorKey, AnalystKey, JobId, JobSummary};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
    #[error("Invalid file name: {0}")]
    InvalidName(String),
    #[error("Config error: {0}")]
    Config(String),
}

/// Body of `POST /api/jobs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitJobRequest {
    pub ticker: String,
    pub analysis_date: String,
    pub timeframe: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub analysts: Vec<AnalystKey>,
    pub selected_masters: Vec<AdvisorKey>,
    pub llm_provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quick_think_llm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deep_think_llm: Option<String>,
    pub max_debate_rounds: u8,
    pub max_risk_discuss_rounds: u8,
}

impl From<&JobConfig> for SubmitJobRequest {
    fn from(job: &JobConfig) -> Self {
        Self {
            ticker: job.ticker.trim().to_uppercase(),
            analysis_date: job.analysis_date.clone(),
            timeframe: job.timeframe.clone(),
            start_date: job.start_date.clone(),
            end_date: job.end_date.clone(),
            analysts: job.analysts.clone(),
            selected_masters: job.advisors.clone(),
            llm_provider: job.llm_provider.clone(),
            quick_think_llm: job.quick_think_llm.clone(),
            deep_think_llm: job.deep_think_llm.clone(),
            max_debate_rounds: job.max_debate_rounds,
            max_risk_discuss_rounds: job.max_risk_discuss_rounds,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmitJobResponse {
    pub job_id: JobId,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
}

/// Body of `GET /api/jobs/{id}/archive`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ArchiveListing {
    #[serde(default)]
    pub archive_dir: Option<String>,
    #[serde(default)]
    pub files: Vec<String>,
}

/// Undecoded body of a downloaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBody {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Error body returned by the backend on non-success statuses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    detail: serde_json::Value,
}

#[derive(Clone)]
pub struct ApiClient {
    rest: RestClient,
    stream: StreamClient,
}

impl ApiClient {
    pub fn new(config: &TuiConfig) -> Result<Self, ApiClientError> {
        let rest = RestClient::new(config)?;
        let stream = StreamClient::new(config)?;
        Ok(Self { rest, stream })
    }

    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    pub fn stream(&self) -> &StreamClient {
        &self.stream
    }
}

#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: Url,
    auth_header: HeaderMap,
}

impl RestClient {
    pub fn new(config: &TuiConfig) -> Result<Self, ApiClientError> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let auth_header = build_auth_headers(&config.auth)?;
        Ok(Self {
            client,
            base_url: parse_base_url(&config.api_base_url)?,
            auth_header,
        })
    }

    pub async fn health(&self) -> Result<HealthResponse, ApiClientError> {
        self.get_json(endpoint(&self.base_url, ["api", "health"])?)
            .await
    }

    pub async fn submit_job(
        &self,
        request: &SubmitJobRequest,
    ) -> Result<SubmitJobResponse, ApiClientError> {
        self.post_json(endpoint(&self.base_url, ["api", "jobs"])?, request)
            .await
    }

    pub async fn fetch_summary(&self, job_id: JobId) -> Result<JobSummary, ApiClientError> {
        self.get_json(job_endpoint(&self.base_url, job_id, &[])?)
            .await
    }

    /// Text of one report file such as `market_report.md`.
    pub async fn fetch_report(&self, job_id: JobId, name: &str) -> Result<String, ApiClientError> {
        validate_file_name(name)?;
        self.get_text(job_endpoint(&self.base_url, job_id, &["reports", name])?)
            .await
    }

    /// One chart or table produced by the run (`.png` / `.csv`).
    pub async fn fetch_artifact(
        &self,
        job_id: JobId,
        name: &str,
    ) -> Result<FileBody, ApiClientError> {
        validate_file_name(name)?;
        self.get_body(job_endpoint(&self.base_url, job_id, &["artifacts", name])?)
            .await
    }

    pub async fn list_archive(&self, job_id: JobId) -> Result<ArchiveListing, ApiClientError> {
        self.get_json(job_endpoint(&self.base_url, job_id, &["archive"])?)
            .await
    }

    /// One archived file, addressed by its path relative to the archive root.
    pub async fn fetch_archive_file(
        &self,
        job_id: JobId,
        path: &str,
    ) -> Result<FileBody, ApiClientError> {
        validate_archive_path(path)?;
        let mut segments = vec!["archive"];
        segments.extend(path.split('/'));
        self.get_body(job_endpoint(&self.base_url, job_id, &segments)?)
            .await
    }

    async fn send_get(&self, url: Url) -> Result<reqwest::Response, ApiClientError> {
        Ok(self
            .client
            .get(url)
            .headers(self.auth_header.clone())
            .send()
            .await?)
    }

    async fn get_json<T>(&self, url: Url) -> Result<T, ApiClientError>
    where
        T: serde::de::DeserializeOwned,
    {
        let text = self.get_text(url).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn get_text(&self, url: Url) -> Result<String, ApiClientError> {
        let response = self.send_get(url).await?;
        self.success_text(response).await
    }

    async fn get_body(&self, url: Url) -> Result<FileBody, ApiClientError> {
        let response = self.send_get(url).await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(error_from_body(status.as_u16(), &text));
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();
        Ok(FileBody {
            content_type,
            bytes,
        })
    }

    async fn post_json<T, B>(&self, url: Url, body: &B) -> Result<T, ApiClientError>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let response = self
            .client
            .post(url)
            .headers(self.auth_header.clone())
            .json(body)
            .send()
            .await?;
        let text = self.success_text(response).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn success_text(&self, response: reqwest::Response) -> Result<String, ApiClientError> {
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            return Ok(text);
        }
        Err(error_from_body(status.as_u16(), &text))
    }
}

/// Client for the long-lived SSE stream.
///
/// Only the connect phase is bounded; the stream itself stays open for the
/// lifetime of the job.
#[derive(Clone)]
pub struct StreamClient {
    client: reqwest::Client,
    base_url: Url,
    auth_header: HeaderMap,
}

impl StreamClient {
    pub fn new(config: &TuiConfig) -> Result<Self, ApiClientError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: parse_base_url(&config.api_base_url)?,
            auth_header: build_auth_headers(&config.auth)?,
        })
    }

    pub fn stream_url(&self, job_id: JobId) -> Result<Url, ApiClientError> {
        job_endpoint(&self.base_url, job_id, &["stream"])
    }

    /// Open the event stream, resuming after `after_seq`.
    pub async fn open(
        &self,
        job_id: JobId,
        after_seq: u64,
    ) -> Result<reqwest::Response, ApiClientError> {
        let response = self
            .client
            .get(self.stream_url(job_id)?)
            .headers(self.auth_header.clone())
            .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
            .query(&[("after_seq", after_seq)])
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await?;
        Err(error_from_body(status.as_u16(), &text))
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ApiClientError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ApiClientError::Config(format!("api_base_url: {}", e)))?;
    if url.cannot_be_a_base() {
        return Err(ApiClientError::Config(format!(
            "api_base_url cannot carry a path: {}",
            raw
        )));
    }
    Ok(url)
}

/// `base` extended by `segments`, each percent-encoded on its own.
pub fn endpoint<I>(base: &Url, segments: I) -> Result<Url, ApiClientError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| {
            ApiClientError::Config(format!("api_base_url cannot carry a path: {}", base))
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn job_endpoint(base: &Url, job_id: JobId, rest: &[&str]) -> Result<Url, ApiClientError> {
    let id = job_id.to_string();
    let mut segments = vec!["api", "jobs", id.as_str()];
    segments.extend_from_slice(rest);
    endpoint(base, segments)
}

fn error_from_body(status: u16, text: &str) -> ApiClientError {
    if let Ok(body) = serde_json::from_str::<ApiErrorBody>(text) {
        let detail = match body.detail {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        return ApiClientError::InvalidResponse(format!("HTTP {}: {}", status, detail));
    }
    ApiClientError::InvalidResponse(format!("HTTP {}: {}", status, text))
}

/// Report names are bare file names.
pub fn validate_file_name(name: &str) -> Result<(), ApiClientError> {
    if name.trim().is_empty() || name.contains('/') || name.contains('\\') || name == ".." {
        return Err(ApiClientError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Archive paths are relative and may not escape the archive root.
pub fn validate_archive_path(path: &str) -> Result<(), ApiClientError> {
    let escapes = path.starts_with('/')
        || path.contains('\\')
        || path.split('/').any(|segment| segment == ".." || segment.is_empty());
    if path.trim().is_empty() || escapes {
        return Err(ApiClientError::InvalidName(path.to_string()));
    }
    Ok(())
}

fn build_auth_headers(auth: &AuthConfig) -> Result<HeaderMap, ApiClientError> {
    let mut headers = HeaderMap::new();
    if let Some(api_key) = &auth.api_key {
        headers.insert(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_str(api_key).map_err(|e| ApiClientError::Config(e.to_string()))?,
        );
    }
    if let Some(token) = &auth.bearer_token {
        let value = format!("Bearer {}", token);
        headers.insert(
            HeaderName::from_static("authorization"),
            HeaderValue::from_str(&value).map_err(|e| ApiClientError::Config(e.to_string()))?,
        );
    }
    Ok(headers)
}
