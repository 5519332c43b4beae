//! Summary reconciliation.
//!
//! Pulled summaries arrive out of step with the push stream and may be stale
//! or partial. Merging is monotonic so that no later summary can make a
//! completed node pending again.

use agentwatch_core::{JobStatus, JobSummary};

/// Monotonic merge for job summaries.
pub trait SummaryMerge {
    /// Fold a newer summary into this one.
    fn merge(&mut self, newer: JobSummary);

    fn merged(mut self, newer: JobSummary) -> Self
    where
        Self: Sized,
    {
        self.merge(newer);
        self
    }
}

impl SummaryMerge for JobSummary {
    fn merge(&mut self, newer: JobSummary) {
        self.status = advance_status(self.status, newer.status);

        if newer.job_id.is_some() {
            self.job_id = newer.job_id;
        }
        take_non_empty(&mut self.ticker, newer.ticker);
        take_non_empty(&mut self.analysis_date, newer.analysis_date);
        if newer.created_at > 0.0 {
            self.created_at = newer.created_at;
        }
        self.updated_at = self.updated_at.max(newer.updated_at);
        if newer.error.as_deref().is_some_and(|e| !e.is_empty()) {
            self.error = newer.error;
        }
        if newer.archive_dir.as_deref().is_some_and(|d| !d.is_empty()) {
            self.archive_dir = newer.archive_dir;
        }

        self.reports.extend(newer.reports);
        self.artifacts.extend(newer.artifacts);
        self.archive_files.extend(newer.archive_files);
        self.counters = self.counters.max(newer.counters);
    }
}

/// Status only moves to a higher rank; a terminal status is final.
pub fn advance_status(current: JobStatus, newer: JobStatus) -> JobStatus {
    if current.is_terminal() {
        return current;
    }
    if newer.rank() > current.rank() {
        newer
    } else {
        current
    }
}

fn take_non_empty(slot: &mut String, newer: String) {
    if !newer.trim().is_empty() {
        *slot = newer;
    }
}
