//! Enum types for pipeline telemetry

use crate::error::ParseKeyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ACTIVITY ENUMS
// ============================================================================

/// Pipeline stage an activity record is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Analysts,
    Research,
    Trader,
    Risk,
    Final,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Analysts => "analysts",
            Stage::Research => "research",
            Stage::Trader => "trader",
            Stage::Risk => "risk",
            Stage::Final => "final",
        }
    }

    /// Stages in pipeline order.
    pub fn all() -> &'static [Stage] {
        &[
            Stage::Analysts,
            Stage::Research,
            Stage::Trader,
            Stage::Risk,
            Stage::Final,
        ]
    }
}

/// Kind of an activity record, derived from the event type and its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Message,
    Tool,
    Status,
    Report,
    Event,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Message => "message",
            ActivityKind::Tool => "tool",
            ActivityKind::Status => "status",
            ActivityKind::Report => "report",
            ActivityKind::Event => "event",
        }
    }

    /// Kinds that count as an agent doing work (used for active-node detection).
    pub fn is_work(&self) -> bool {
        matches!(
            self,
            ActivityKind::Message | ActivityKind::Tool | ActivityKind::Report
        )
    }

    pub fn all() -> &'static [ActivityKind] {
        &[
            ActivityKind::Message,
            ActivityKind::Tool,
            ActivityKind::Status,
            ActivityKind::Report,
            ActivityKind::Event,
        ]
    }
}

// ============================================================================
// PROGRESS ENUMS
// ============================================================================

/// Progress status of one agent node.
///
/// Ordered: `Pending < InProgress < Completed`. Derivation only ever raises a
/// status within a single pass.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl NodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeStatus::Pending => "pending",
            NodeStatus::InProgress => "in_progress",
            NodeStatus::Completed => "completed",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, NodeStatus::Completed)
    }
}

/// Team grouping of agent nodes in the pipeline topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Analysts,
    Research,
    Style,
    Trader,
    Risk,
    Final,
}

impl Team {
    pub fn title(&self) -> &'static str {
        match self {
            Team::Analysts => "Analyst Team",
            Team::Research => "Research Team",
            Team::Style => "Style Council",
            Team::Trader => "Trading Team",
            Team::Risk => "Risk Management",
            Team::Final => "Portfolio Management",
        }
    }
}

/// Job status as reported by the authoritative summary.
///
/// Parsing is lenient: anything unrecognized becomes `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JobStatus {
    #[default]
    Unknown,
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Unknown => "unknown",
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "queued" => JobStatus::Queued,
            "running" => JobStatus::Running,
            "succeeded" => JobStatus::Succeeded,
            "failed" => JobStatus::Failed,
            "cancelled" | "canceled" => JobStatus::Cancelled,
            _ => JobStatus::Unknown,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// Rank used by summary reconciliation; a status never moves to a lower rank.
    pub fn rank(&self) -> u8 {
        match self {
            JobStatus::Unknown => 0,
            JobStatus::Queued => 1,
            JobStatus::Running => 2,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::Cancelled => 3,
        }
    }
}

impl Serialize for JobStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|s| JobStatus::parse_lenient(&s)).unwrap_or_default())
    }
}

// ============================================================================
// RUN CONFIGURATION KEYS
// ============================================================================

/// Analyst selectable in a run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalystKey {
    Market,
    Social,
    News,
    Fundamentals,
    Quant,
}

impl AnalystKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalystKey::Market => "market",
            AnalystKey::Social => "social",
            AnalystKey::News => "news",
            AnalystKey::Fundamentals => "fundamentals",
            AnalystKey::Quant => "quant",
        }
    }

    pub fn role(&self) -> AgentRole {
        match self {
            AnalystKey::Market => AgentRole::MarketAnalyst,
            AnalystKey::Social => AgentRole::SocialAnalyst,
            AnalystKey::News => AgentRole::NewsAnalyst,
            AnalystKey::Fundamentals => AgentRole::FundamentalsAnalyst,
            AnalystKey::Quant => AgentRole::QuantAnalyst,
        }
    }

    pub fn all() -> &'static [AnalystKey] {
        &[
            AnalystKey::Market,
            AnalystKey::Social,
            AnalystKey::News,
            AnalystKey::Fundamentals,
            AnalystKey::Quant,
        ]
    }
}

impl FromStr for AnalystKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "market" => Ok(AnalystKey::Market),
            "social" => Ok(AnalystKey::Social),
            "news" => Ok(AnalystKey::News),
            "fundamentals" => Ok(AnalystKey::Fundamentals),
            "quant" => Ok(AnalystKey::Quant),
            _ => Err(ParseKeyError::UnknownAnalyst(s.to_string())),
        }
    }
}

/// Advisor persona selectable in a run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisorKey {
    Buffett,
    LarryWilliams,
    Livermore,
}

impl AdvisorKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdvisorKey::Buffett => "buffett",
            AdvisorKey::LarryWilliams => "larry_williams",
            AdvisorKey::Livermore => "livermore",
        }
    }

    pub fn role(&self) -> AgentRole {
        match self {
            AdvisorKey::Buffett => AgentRole::BuffettAdvisor,
            AdvisorKey::LarryWilliams => AgentRole::LarryWilliamsAdvisor,
            AdvisorKey::Livermore => AgentRole::LivermoreAdvisor,
        }
    }

    pub fn all() -> &'static [AdvisorKey] {
        &[
            AdvisorKey::Buffett,
            AdvisorKey::LarryWilliams,
            AdvisorKey::Livermore,
        ]
    }
}

impl FromStr for AdvisorKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buffett" => Ok(AdvisorKey::Buffett),
            "larry_williams" => Ok(AdvisorKey::LarryWilliams),
            "livermore" => Ok(AdvisorKey::Livermore),
            _ => Err(ParseKeyError::UnknownAdvisor(s.to_string())),
        }
    }
}

// ============================================================================
// AGENT IDENTITY
// ============================================================================

/// Fixed identity space of pipeline participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgentRole {
    MarketAnalyst,
    SocialAnalyst,
    NewsAnalyst,
    FundamentalsAnalyst,
    QuantAnalyst,
    BullResearcher,
    BearResearcher,
    ResearchManager,
    BuffettAdvisor,
    LarryWilliamsAdvisor,
    LivermoreAdvisor,
    StyleManager,
    Trader,
    AggressiveAnalyst,
    ConservativeAnalyst,
    NeutralAnalyst,
    PortfolioManager,
}

impl AgentRole {
    /// Canonical display name used for matching and rendering.
    pub fn display_name(&self) -> &'static str {
        match self {
            AgentRole::MarketAnalyst => "Market Analyst",
            AgentRole::SocialAnalyst => "Social Analyst",
            AgentRole::NewsAnalyst => "News Analyst",
            AgentRole::FundamentalsAnalyst => "Fundamentals Analyst",
            AgentRole::QuantAnalyst => "Quant Analyst",
            AgentRole::BullResearcher => "Bull Researcher",
            AgentRole::BearResearcher => "Bear Researcher",
            AgentRole::ResearchManager => "Research Manager",
            AgentRole::BuffettAdvisor => "Warren Buffett Advisor",
            AgentRole::LarryWilliamsAdvisor => "Larry Williams Advisor",
            AgentRole::LivermoreAdvisor => "Jesse Livermore Advisor",
            AgentRole::StyleManager => "Style Manager",
            AgentRole::Trader => "Trader",
            AgentRole::AggressiveAnalyst => "Aggressive Analyst",
            AgentRole::ConservativeAnalyst => "Conservative Analyst",
            AgentRole::NeutralAnalyst => "Neutral Analyst",
            AgentRole::PortfolioManager => "Portfolio Manager",
        }
    }

    /// Team this role belongs to when it is part of a topology.
    pub fn team(&self) -> Team {
        match self {
            AgentRole::MarketAnalyst
            | AgentRole::SocialAnalyst
            | AgentRole::NewsAnalyst
            | AgentRole::FundamentalsAnalyst
            | AgentRole::QuantAnalyst => Team::Analysts,
            AgentRole::BullResearcher | AgentRole::BearResearcher | AgentRole::ResearchManager => {
                Team::Research
            }
            AgentRole::BuffettAdvisor
            | AgentRole::LarryWilliamsAdvisor
            | AgentRole::LivermoreAdvisor
            | AgentRole::StyleManager => Team::Style,
            AgentRole::Trader => Team::Trader,
            AgentRole::AggressiveAnalyst
            | AgentRole::ConservativeAnalyst
            | AgentRole::NeutralAnalyst => Team::Risk,
            AgentRole::PortfolioManager => Team::Final,
        }
    }

    pub fn all() -> &'static [AgentRole] {
        &[
            AgentRole::MarketAnalyst,
            AgentRole::SocialAnalyst,
            AgentRole::NewsAnalyst,
            AgentRole::FundamentalsAnalyst,
            AgentRole::QuantAnalyst,
            AgentRole::BullResearcher,
            AgentRole::BearResearcher,
            AgentRole::ResearchManager,
            AgentRole::BuffettAdvisor,
            AgentRole::LarryWilliamsAdvisor,
            AgentRole::LivermoreAdvisor,
            AgentRole::StyleManager,
            AgentRole::Trader,
            AgentRole::AggressiveAnalyst,
            AgentRole::ConservativeAnalyst,
            AgentRole::NeutralAnalyst,
            AgentRole::PortfolioManager,
        ]
    }
}

/// Canonicalized agent identity attached to each activity record.
///
/// `Unrecognized` keeps the raw label when no canonicalization rule matched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentName {
    Role(AgentRole),
    System,
    Unrecognized(String),
}

impl AgentName {
    pub fn role(&self) -> Option<AgentRole> {
        match self {
            AgentName::Role(role) => Some(*role),
            AgentName::System | AgentName::Unrecognized(_) => None,
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, AgentName::System)
    }
}

impl From<AgentRole> for AgentName {
    fn from(role: AgentRole) -> Self {
        AgentName::Role(role)
    }
}

// ============================================================================
// STRING CONVERSIONS
// ============================================================================

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AnalystKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AdvisorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentName::Role(role) => f.write_str(role.display_name()),
            AgentName::System => f.write_str("System"),
            AgentName::Unrecognized(raw) => f.write_str(raw),
        }
    }
}
