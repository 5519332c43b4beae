//! Pipeline topology: the ordered node list a run configuration produces.

use crate::{AgentRole, NodeStatus, RunConfiguration, Team};
use serde::Serialize;

/// One pipeline node with its derived status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgentNode {
    pub role: AgentRole,
    pub team: Team,
    pub status: NodeStatus,
}

impl AgentNode {
    pub fn pending(role: AgentRole) -> Self {
        Self {
            role,
            team: role.team(),
            status: NodeStatus::Pending,
        }
    }

    pub fn name(&self) -> &'static str {
        self.role.display_name()
    }
}

const RESEARCH_TEAM: [AgentRole; 3] = [
    AgentRole::BullResearcher,
    AgentRole::BearResearcher,
    AgentRole::ResearchManager,
];

const RISK_TEAM: [AgentRole; 3] = [
    AgentRole::AggressiveAnalyst,
    AgentRole::ConservativeAnalyst,
    AgentRole::NeutralAnalyst,
];

/// Ordered pipeline roles for one job.
///
/// Built once per configuration; a configuration change rebuilds the whole
/// list rather than patching it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    roles: Vec<AgentRole>,
}

impl Topology {
    pub fn build(config: &RunConfiguration) -> Self {
        let mut roles: Vec<AgentRole> = Vec::with_capacity(AgentRole::all().len());

        for analyst in &config.analysts {
            push_unique(&mut roles, analyst.role());
        }
        roles.extend(RESEARCH_TEAM);

        let mut advisors = Vec::new();
        for advisor in &config.advisors {
            push_unique(&mut advisors, advisor.role());
        }
        if !advisors.is_empty() {
            roles.extend(advisors);
            roles.push(AgentRole::StyleManager);
        }

        roles.push(AgentRole::Trader);
        roles.extend(RISK_TEAM);
        roles.push(AgentRole::PortfolioManager);

        Self { roles }
    }

    pub fn nodes(&self) -> &[AgentRole] {
        &self.roles
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn contains(&self, role: AgentRole) -> bool {
        self.roles.contains(&role)
    }

    pub fn position(&self, role: AgentRole) -> Option<usize> {
        self.roles.iter().position(|r| *r == role)
    }

    /// Team of a role, if the role is part of this topology.
    pub fn team_of(&self, role: AgentRole) -> Option<Team> {
        self.contains(role).then(|| role.team())
    }

    /// Roles grouped by team, in pipeline order.
    pub fn teams(&self) -> Vec<(Team, Vec<AgentRole>)> {
        let mut groups: Vec<(Team, Vec<AgentRole>)> = Vec::new();
        for role in &self.roles {
            match groups.last_mut() {
                Some((team, members)) if *team == role.team() => members.push(*role),
                _ => groups.push((role.team(), vec![*role])),
            }
        }
        groups
    }

    pub fn analysts(&self) -> Vec<AgentRole> {
        self.members_of(Team::Analysts)
    }

    /// Advisor roles, excluding the Style Manager.
    pub fn advisors(&self) -> Vec<AgentRole> {
        self.members_of(Team::Style)
            .into_iter()
            .filter(|role| *role != AgentRole::StyleManager)
            .collect()
    }

    pub fn risk(&self) -> Vec<AgentRole> {
        self.members_of(Team::Risk)
    }

    fn members_of(&self, team: Team) -> Vec<AgentRole> {
        self.roles
            .iter()
            .copied()
            .filter(|role| role.team() == team)
            .collect()
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::build(&RunConfiguration::default())
    }
}

fn push_unique(roles: &mut Vec<AgentRole>, role: AgentRole) {
    if !roles.contains(&role) {
        roles.push(role);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AdvisorKey, AnalystKey};

    #[test]
    fn test_default_topology_without_advisors() {
        let topology = Topology::default();
        assert_eq!(topology.len(), 13);
        assert!(!topology.contains(AgentRole::StyleManager));
        assert_eq!(topology.nodes()[0], AgentRole::MarketAnalyst);
        assert_eq!(topology.nodes().last(), Some(&AgentRole::PortfolioManager));
    }

    #[test]
    fn test_advisors_add_style_team() {
        let config = RunConfiguration {
            analysts: vec![AnalystKey::News],
            advisors: vec![AdvisorKey::Livermore, AdvisorKey::Buffett],
            ..RunConfiguration::default()
        };
        let topology = Topology::build(&config);
        assert_eq!(
            topology.nodes(),
            &[
                AgentRole::NewsAnalyst,
                AgentRole::BullResearcher,
                AgentRole::BearResearcher,
                AgentRole::ResearchManager,
                AgentRole::LivermoreAdvisor,
                AgentRole::BuffettAdvisor,
                AgentRole::StyleManager,
                AgentRole::Trader,
                AgentRole::AggressiveAnalyst,
                AgentRole::ConservativeAnalyst,
                AgentRole::NeutralAnalyst,
                AgentRole::PortfolioManager,
            ]
        );
        assert_eq!(
            topology.advisors(),
            vec![AgentRole::LivermoreAdvisor, AgentRole::BuffettAdvisor]
        );
    }

    #[test]
    fn test_duplicate_selections_collapse() {
        let config = RunConfiguration {
            analysts: vec![AnalystKey::Quant, AnalystKey::Market, AnalystKey::Quant],
            advisors: vec![AdvisorKey::Buffett, AdvisorKey::Buffett],
            ..RunConfiguration::default()
        };
        let topology = Topology::build(&config);
        assert_eq!(topology.analysts(), vec![AgentRole::QuantAnalyst, AgentRole::MarketAnalyst]);
        assert_eq!(topology.advisors(), vec![AgentRole::BuffettAdvisor]);
    }

    #[test]
    fn test_teams_grouping_order() {
        let config = RunConfiguration {
            advisors: vec![AdvisorKey::LarryWilliams],
            ..RunConfiguration::default()
        };
        let teams: Vec<Team> = Topology::build(&config)
            .teams()
            .into_iter()
            .map(|(team, _)| team)
            .collect();
        assert_eq!(
            teams,
            vec![Team::Analysts, Team::Research, Team::Style, Team::Trader, Team::Risk, Team::Final]
        );
    }

    #[test]
    fn test_team_of_absent_role() {
        let topology = Topology::default();
        assert_eq!(topology.team_of(AgentRole::BuffettAdvisor), None);
        assert_eq!(topology.team_of(AgentRole::Trader), Some(Team::Trader));
        assert_eq!(topology.risk().len(), 3);
    }
}
