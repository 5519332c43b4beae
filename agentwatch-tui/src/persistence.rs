//! Console state carried across restarts.
//!
//! Saved as versioned JSON next to the config. Writes go through a sibling
//! temp file and a rename; a file with another version is ignored on load.

use crate::nav::View;
use crate::state::App;
use crate::widgets::TimelineFilter;
use agentwatch_core::JobId;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const STATE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub version: u32,
    /// Job to re-attach to when no `--job` is given.
    pub last_job_id: Option<JobId>,
    pub active_view: View,
    #[serde(default)]
    pub updates_paused: bool,
    #[serde(default)]
    pub timeline_filter: TimelineFilter,
}

impl PersistedState {
    pub fn capture(app: &App) -> Self {
        Self {
            version: STATE_VERSION,
            last_job_id: app.job_id(),
            active_view: app.active_view,
            updates_paused: app.updates_paused,
            timeline_filter: app.timeline_view.filter,
        }
    }

    /// Apply the UI part of the state. Re-attaching is left to the caller.
    pub fn restore(&self, app: &mut App) {
        app.active_view = self.active_view;
        app.updates_paused = self.updates_paused;
        app.timeline_view.filter = self.timeline_filter;
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub fn load(path: &Path) -> Result<Option<PersistedState>, PersistenceError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let state: PersistedState = serde_json::from_str(&contents)?;
    if state.version != STATE_VERSION {
        tracing::warn!(
            path = %path.display(),
            found = state.version,
            expected = STATE_VERSION,
            "Discarding persisted state with another version"
        );
        return Ok(None);
    }
    Ok(Some(state))
}

pub fn save(path: &Path, state: &PersistedState) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let staging = staging_path(path);
    std::fs::write(&staging, serde_json::to_vec_pretty(state)?)?;
    std::fs::rename(&staging, path)?;
    tracing::debug!(path = %path.display(), "Console state saved");
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
