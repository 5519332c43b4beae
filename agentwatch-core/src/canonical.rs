//! Agent name canonicalization.
//!
//! Free-form agent labels from the event stream ("market", "Bull Researcher",
//! "Risky Analyst", "portfolio_manager") map onto the fixed [`AgentRole`]
//! identity space through an ordered rule list. First match wins, so more
//! specific labels come before labels they contain.

use crate::{AgentName, AgentRole};

/// How a rule's pattern is compared against the normalized label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    Exact,
    Contains,
}

/// One canonicalization rule.
#[derive(Debug, Clone, Copy)]
pub struct NameRule {
    pub pattern: &'static str,
    pub matcher: Matcher,
    pub role: AgentRole,
}

impl NameRule {
    const fn exact(pattern: &'static str, role: AgentRole) -> Self {
        Self {
            pattern,
            matcher: Matcher::Exact,
            role,
        }
    }

    const fn contains(pattern: &'static str, role: AgentRole) -> Self {
        Self {
            pattern,
            matcher: Matcher::Contains,
            role,
        }
    }

    pub fn matches(&self, normalized: &str) -> bool {
        match self.matcher {
            Matcher::Exact => normalized == self.pattern,
            Matcher::Contains => normalized.contains(self.pattern),
        }
    }
}

/// Priority-ordered canonicalization rules.
pub const NAME_RULES: &[NameRule] = &[
    NameRule::exact("market", AgentRole::MarketAnalyst),
    NameRule::exact("social", AgentRole::SocialAnalyst),
    NameRule::exact("news", AgentRole::NewsAnalyst),
    NameRule::exact("fundamentals", AgentRole::FundamentalsAnalyst),
    NameRule::exact("quant", AgentRole::QuantAnalyst),
    NameRule::exact("buffett", AgentRole::BuffettAdvisor),
    NameRule::exact("larry_williams", AgentRole::LarryWilliamsAdvisor),
    NameRule::exact("livermore", AgentRole::LivermoreAdvisor),
    NameRule::exact("trader", AgentRole::Trader),
    NameRule::contains("research manager", AgentRole::ResearchManager),
    NameRule::contains("research_manager", AgentRole::ResearchManager),
    NameRule::contains("portfolio", AgentRole::PortfolioManager),
    NameRule::contains("style", AgentRole::StyleManager),
    NameRule::contains("buffett", AgentRole::BuffettAdvisor),
    NameRule::contains("williams", AgentRole::LarryWilliamsAdvisor),
    NameRule::contains("livermore", AgentRole::LivermoreAdvisor),
    NameRule::contains("bull", AgentRole::BullResearcher),
    NameRule::contains("bear", AgentRole::BearResearcher),
    NameRule::contains("aggressive", AgentRole::AggressiveAnalyst),
    NameRule::contains("risky", AgentRole::AggressiveAnalyst),
    NameRule::contains("conservative", AgentRole::ConservativeAnalyst),
    NameRule::contains("safe", AgentRole::ConservativeAnalyst),
    NameRule::contains("neutral", AgentRole::NeutralAnalyst),
    NameRule::contains("market", AgentRole::MarketAnalyst),
    NameRule::contains("social", AgentRole::SocialAnalyst),
    NameRule::contains("sentiment", AgentRole::SocialAnalyst),
    NameRule::contains("news", AgentRole::NewsAnalyst),
    NameRule::contains("fundamental", AgentRole::FundamentalsAnalyst),
    NameRule::contains("quant", AgentRole::QuantAnalyst),
    NameRule::contains("trader", AgentRole::Trader),
];

/// Map a free-form agent label to its canonical identity.
///
/// Fails open: an unmatched label comes back unchanged as
/// [`AgentName::Unrecognized`], never as a topology role.
pub fn canonicalize(raw: &str) -> AgentName {
    let normalized = raw.trim().to_lowercase();
    if normalized.is_empty() || normalized == "system" {
        return AgentName::System;
    }
    NAME_RULES
        .iter()
        .find(|rule| rule.matches(&normalized))
        .map(|rule| AgentName::Role(rule.role))
        .unwrap_or_else(|| AgentName::Unrecognized(raw.to_string()))
}
