//! Configuration loading for the AgentWatch console.
//!
//! All fields are required unless explicitly marked optional. No defaults.

use agentwatch_core::{AdvisorKey, AnalystKey, JobId, RunConfiguration};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TuiConfig {
    pub api_base_url: String,
    pub auth: AuthConfig,
    pub request_timeout_ms: u64,
    /// UI tick, drives elapsed-time display and queued-event flushing.
    pub refresh_interval_ms: u64,
    pub summary_poll_ms: u64,
    pub persistence_path: PathBuf,
    pub log_path: PathBuf,
    pub log_filter: String,
    pub theme: ThemeConfig,
    pub job: JobConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    pub api_key: Option<String>,
    pub bearer_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeConfig {
    pub name: String,
}

/// Job submitted when the console is not attached to an existing job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    pub ticker: String,
    pub analysis_date: String,
    pub timeframe: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub analysts: Vec<AnalystKey>,
    pub advisors: Vec<AdvisorKey>,
    pub llm_provider: String,
    pub quick_think_llm: Option<String>,
    pub deep_think_llm: Option<String>,
    pub max_debate_rounds: u8,
    pub max_risk_discuss_rounds: u8,
}

const LLM_PROVIDERS: &[&str] = &[
    "openai",
    "openai-codex",
    "anthropic",
    "google",
    "xai",
    "openrouter",
    "ollama",
];

impl JobConfig {
    pub fn run_configuration(&self) -> RunConfiguration {
        RunConfiguration {
            analysts: self.analysts.clone(),
            advisors: self.advisors.clone(),
            max_debate_rounds: self.max_debate_rounds,
            max_risk_discuss_rounds: self.max_risk_discuss_rounds,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let ticker = self.ticker.trim();
        if ticker.is_empty() || ticker.len() > 16 {
            return Err(ConfigError::InvalidValue {
                field: "job.ticker",
                reason: "must be 1 to 16 characters".to_string(),
            });
        }
        validate_date("job.analysis_date", &self.analysis_date)?;
        if let Some(start) = &self.start_date {
            validate_date("job.start_date", start)?;
        }
        if let Some(end) = &self.end_date {
            validate_date("job.end_date", end)?;
        }
        if let (Some(start), Some(end)) = (&self.start_date, &self.end_date) {
            if start > end {
                return Err(ConfigError::InvalidValue {
                    field: "job.end_date",
                    reason: "must not precede start_date".to_string(),
                });
            }
        }
        if self.timeframe.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "job.timeframe",
                reason: "must not be empty".to_string(),
            });
        }
        if !LLM_PROVIDERS.contains(&self.llm_provider.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "job.llm_provider",
                reason: format!("must be one of {}", LLM_PROVIDERS.join(", ")),
            });
        }
        self.run_configuration()
            .validate()
            .map_err(|e| ConfigError::InvalidValue {
                field: "job",
                reason: e.to_string(),
            })
    }
}

fn validate_date(field: &'static str, value: &str) -> Result<(), ConfigError> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidValue {
            field,
            reason: format!("expected YYYY-MM-DD: {}", e),
        })
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or AGENTWATCH_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Command-line arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    /// Attach to this job instead of submitting a new one.
    pub job: Option<String>,
}

impl CliArgs {
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Self {
        let mut parsed = CliArgs::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => parsed.config = args.next().map(PathBuf::from),
                "--job" => parsed.job = args.next(),
                _ => {}
            }
        }
        parsed
    }

    pub fn from_env() -> Self {
        Self::parse(std::env::args().skip(1))
    }

    pub fn job_id(&self) -> Result<Option<JobId>, ConfigError> {
        self.job
            .as_deref()
            .map(|raw| {
                raw.parse().map_err(|e: agentwatch_core::ValidationError| {
                    ConfigError::InvalidValue {
                        field: "--job",
                        reason: e.to_string(),
                    }
                })
            })
            .transpose()
    }
}

impl TuiConfig {
    pub fn load(args: &CliArgs) -> Result<Self, ConfigError> {
        let path = args.config.clone().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.api_base_url.trim();
        if base.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must start with http:// or https://".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.refresh_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "refresh_interval_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.summary_poll_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "summary_poll_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.persistence_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "persistence_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.log_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "log_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "log_filter",
                reason: "must not be empty".to_string(),
            });
        }
        if self.theme.name.to_ascii_lowercase() != "synthbrute" {
            return Err(ConfigError::InvalidValue {
                field: "theme.name",
                reason: "only 'synthbrute' is supported".to_string(),
            });
        }
        self.job.validate()
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var("AGENTWATCH_CONFIG").ok().map(PathBuf::from)
}
