//! Progress derivation.
//!
//! [`derive`] recomputes every node status from scratch out of the timeline,
//! the topology and the latest authoritative summary. It has no error case:
//! missing or malformed inputs degrade a node to `Pending`.
//!
//! Passes, in order:
//!
//! 1. every node starts `Pending`
//! 2. report files listed in the summary complete their producing node
//! 3. `Report` records naming an artifact key complete their node early
//! 4. backfill of nodes implied complete by a downstream artifact
//! 5. the newest working agent in the timeline becomes the active node
//! 6. an incomplete active node is `InProgress`
//! 7. otherwise a live job gets one fallback `InProgress` node
//! 8. a succeeded job completes everything

use crate::{
    ActivityKind, ActivityRecord, AgentNode, AgentRole, JobStatus, JobSummary, NodeStatus, Team,
    Topology,
};
use serde::Serialize;

/// Nodes that produce a report artifact, with the artifact key and file name.
pub const ARTIFACTS: &[(AgentRole, &str, &str)] = &[
    (AgentRole::MarketAnalyst, "market_report", "market_report.md"),
    (AgentRole::SocialAnalyst, "sentiment_report", "sentiment_report.md"),
    (AgentRole::NewsAnalyst, "news_report", "news_report.md"),
    (AgentRole::FundamentalsAnalyst, "fundamentals_report", "fundamentals_report.md"),
    (AgentRole::QuantAnalyst, "quant_report", "quant_report.md"),
    (AgentRole::ResearchManager, "investment_plan", "investment_plan.md"),
    (AgentRole::Trader, "trader_investment_plan", "trader_investment_plan.md"),
    (AgentRole::PortfolioManager, "final_trade_decision", "final_trade_decision.md"),
];

/// Report file produced by a role, if any.
pub fn artifact_file(role: AgentRole) -> Option<&'static str> {
    ARTIFACTS
        .iter()
        .find(|(r, _, _)| *r == role)
        .map(|(_, _, file)| *file)
}

/// Most recent record of each working kind, for live preview panels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreviewPointers {
    pub latest_report: Option<ActivityRecord>,
    pub latest_message: Option<ActivityRecord>,
    pub latest_tool: Option<ActivityRecord>,
}

impl PreviewPointers {
    fn collect(timeline: &[ActivityRecord]) -> Self {
        let latest = |kind: ActivityKind| timeline.iter().rev().find(|r| r.kind == kind).cloned();
        Self {
            latest_report: latest(ActivityKind::Report),
            latest_message: latest(ActivityKind::Message),
            latest_tool: latest(ActivityKind::Tool),
        }
    }
}

/// Derived pipeline state for one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    nodes: Vec<AgentNode>,
    active: Option<AgentRole>,
    preview: PreviewPointers,
}

impl ProgressSnapshot {
    /// Snapshot with every node pending.
    pub fn pending(topology: &Topology) -> Self {
        Self {
            nodes: topology.nodes().iter().copied().map(AgentNode::pending).collect(),
            active: None,
            preview: PreviewPointers::default(),
        }
    }

    pub fn nodes(&self) -> &[AgentNode] {
        &self.nodes
    }

    pub fn active(&self) -> Option<AgentRole> {
        self.active
    }

    pub fn preview(&self) -> &PreviewPointers {
        &self.preview
    }

    pub fn status_of(&self, role: AgentRole) -> Option<NodeStatus> {
        self.node(role).map(|node| node.status)
    }

    pub fn completed_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.status.is_completed()).count()
    }

    pub fn in_progress(&self) -> Vec<AgentRole> {
        self.nodes
            .iter()
            .filter(|n| n.status == NodeStatus::InProgress)
            .map(|n| n.role)
            .collect()
    }

    /// Completed share in `0.0..=1.0`.
    pub fn fraction_complete(&self) -> f64 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        self.completed_count() as f64 / self.nodes.len() as f64
    }

    pub fn teams(&self) -> Vec<(Team, Vec<AgentNode>)> {
        let mut groups: Vec<(Team, Vec<AgentNode>)> = Vec::new();
        for node in &self.nodes {
            match groups.last_mut() {
                Some((team, members)) if *team == node.team => members.push(*node),
                _ => groups.push((node.team, vec![*node])),
            }
        }
        groups
    }

    fn node(&self, role: AgentRole) -> Option<&AgentNode> {
        self.nodes.iter().find(|n| n.role == role)
    }

    fn is_completed(&self, role: AgentRole) -> bool {
        self.status_of(role).is_some_and(|s| s.is_completed())
    }

    fn is_incomplete(&self, role: AgentRole) -> bool {
        self.status_of(role).is_some_and(|s| !s.is_completed())
    }

    /// Raise a node's status. Never lowers it; roles outside the topology are ignored.
    fn raise(&mut self, role: AgentRole, status: NodeStatus) {
        if let Some(node) = self.nodes.iter_mut().find(|n| n.role == role) {
            node.status = node.status.max(status);
        }
    }
}

/// Derive node statuses from the timeline, topology and summary.
pub fn derive(
    timeline: &[ActivityRecord],
    topology: &Topology,
    summary: &JobSummary,
) -> ProgressSnapshot {
    let mut snapshot = ProgressSnapshot::pending(topology);

    for (role, _, file) in ARTIFACTS {
        if summary.has_report(file) {
            snapshot.raise(*role, NodeStatus::Completed);
        }
    }

    for record in timeline.iter().filter(|r| r.kind == ActivityKind::Report) {
        let content = record.content.to_lowercase();
        for (role, key, _) in ARTIFACTS {
            if contains_token(&content, key) {
                snapshot.raise(*role, NodeStatus::Completed);
            }
        }
    }

    backfill(&mut snapshot, topology);

    snapshot.active = active_role(timeline, topology);
    match snapshot.active {
        Some(role) if !snapshot.is_completed(role) => {
            snapshot.raise(role, NodeStatus::InProgress);
        }
        _ => {
            if is_live(timeline, summary) {
                if let Some(role) = fallback_candidate(&snapshot, topology) {
                    snapshot.raise(role, NodeStatus::InProgress);
                }
            }
        }
    }

    if summary.status == JobStatus::Succeeded {
        for node in &mut snapshot.nodes {
            node.status = NodeStatus::Completed;
        }
    }

    snapshot.preview = PreviewPointers::collect(timeline);
    snapshot
}

fn backfill(snapshot: &mut ProgressSnapshot, topology: &Topology) {
    if snapshot.is_completed(AgentRole::ResearchManager) {
        snapshot.raise(AgentRole::BullResearcher, NodeStatus::Completed);
        snapshot.raise(AgentRole::BearResearcher, NodeStatus::Completed);
    }
    if snapshot.is_completed(AgentRole::PortfolioManager) {
        for role in topology.risk() {
            snapshot.raise(role, NodeStatus::Completed);
        }
    }
    if snapshot.is_completed(AgentRole::Trader) {
        for role in topology.advisors() {
            snapshot.raise(role, NodeStatus::Completed);
        }
        snapshot.raise(AgentRole::StyleManager, NodeStatus::Completed);
    }
}

/// Newest working record whose agent is a node of this topology.
fn active_role(timeline: &[ActivityRecord], topology: &Topology) -> Option<AgentRole> {
    timeline
        .iter()
        .rev()
        .filter(|r| r.kind.is_work())
        .filter_map(|r| r.agent.role())
        .find(|role| topology.contains(*role))
}

/// A job is live while it is not terminal and has either been reported
/// running or produced work.
pub fn is_live(timeline: &[ActivityRecord], summary: &JobSummary) -> bool {
    if summary.status.is_terminal() {
        return false;
    }
    summary.status == JobStatus::Running || timeline.iter().any(|r| r.kind.is_work())
}

fn fallback_candidate(snapshot: &ProgressSnapshot, topology: &Topology) -> Option<AgentRole> {
    if let Some(role) = topology
        .analysts()
        .into_iter()
        .find(|r| snapshot.is_incomplete(*r))
    {
        return Some(role);
    }
    if snapshot.is_incomplete(AgentRole::ResearchManager) {
        return Some(AgentRole::BullResearcher);
    }
    if let Some(role) = topology
        .advisors()
        .into_iter()
        .find(|r| snapshot.is_incomplete(*r))
    {
        return Some(role);
    }
    if snapshot.is_incomplete(AgentRole::StyleManager) {
        return Some(AgentRole::StyleManager);
    }
    if snapshot.is_incomplete(AgentRole::Trader) {
        return Some(AgentRole::Trader);
    }
    if let Some(role) = topology.risk().into_iter().find(|r| snapshot.is_incomplete(*r)) {
        return Some(role);
    }
    snapshot
        .is_incomplete(AgentRole::PortfolioManager)
        .then_some(AgentRole::PortfolioManager)
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'
}

/// Whole-token occurrence of `key` in lower-cased `text`.
fn contains_token(text: &str, key: &str) -> bool {
    text.match_indices(key).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + key.len()..].chars().next();
        !before.is_some_and(is_token_char) && !after.is_some_and(is_token_char)
    })
}
