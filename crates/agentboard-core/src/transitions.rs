//! Agent status changes between consecutive synchronized lists.

use std::collections::HashMap;

use serde::Serialize;

use crate::resources::{Agent, AgentStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    Finished,
    Errored,
}

/// An agent moved into a state worth telling the user about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusTransition {
    pub agent_id: String,
    pub agent_name: String,
    pub from: AgentStatus,
    pub to: AgentStatus,
    pub kind: TransitionKind,
}

impl StatusTransition {
    pub fn headline(&self) -> &'static str {
        match self.kind {
            TransitionKind::Finished => "Agent completed",
            TransitionKind::Errored => "Agent error",
        }
    }

    pub fn body(&self) -> String {
        match self.kind {
            TransitionKind::Finished => format!("{} has finished successfully", self.agent_name),
            TransitionKind::Errored => format!("{} encountered an error", self.agent_name),
        }
    }
}

/// Remembers the last status seen per agent.
///
/// The first observation of an agent never yields a transition, so starting
/// the board does not replay old completions.
#[derive(Debug, Default)]
pub struct StatusTracker {
    previous: HashMap<String, AgentStatus>,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff `agents` against the previous observation and remember them.
    ///
    /// Agents missing from `agents` are forgotten.
    pub fn observe(&mut self, agents: &[Agent]) -> Vec<StatusTransition> {
        let mut transitions = Vec::new();
        for agent in agents {
            let Some(&from) = self.previous.get(&agent.id) else {
                continue;
            };
            if from == agent.status {
                continue;
            }
            let kind = match agent.status {
                AgentStatus::Finished => TransitionKind::Finished,
                AgentStatus::Error => TransitionKind::Errored,
                _ => continue,
            };
            transitions.push(StatusTransition {
                agent_id: agent.id.clone(),
                agent_name: agent.name.clone(),
                from,
                to: agent.status,
                kind,
            });
        }

        self.previous = agents
            .iter()
            .map(|agent| (agent.id.clone(), agent.status))
            .collect();
        transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{AgentSource, AgentTarget};

    fn agent(id: &str, status: AgentStatus) -> Agent {
        Agent {
            id: id.to_string(),
            name: format!("Agent {}", id),
            status,
            source: AgentSource {
                repository: "github.com/acme/app".to_string(),
                git_ref: None,
                issue_url: None,
            },
            target: AgentTarget {
                branch_name: "b".to_string(),
                url: "u".to_string(),
                pr_url: None,
                auto_create_pr: false,
            },
            summary: None,
            created_at: "2026-03-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_first_observation_is_silent() {
        let mut tracker = StatusTracker::new();
        assert!(tracker.observe(&[agent("a", AgentStatus::Finished)]).is_empty());
    }

    #[test]
    fn test_running_to_finished_and_error() {
        let mut tracker = StatusTracker::new();
        tracker.observe(&[agent("a", AgentStatus::Running), agent("b", AgentStatus::Running)]);

        let transitions = tracker.observe(&[agent("a", AgentStatus::Finished), agent("b", AgentStatus::Error)]);
        assert_eq!(transitions.len(), 2);
        assert_eq!(transitions[0].kind, TransitionKind::Finished);
        assert_eq!(transitions[0].body(), "Agent a has finished successfully");
        assert_eq!(transitions[1].headline(), "Agent error");
        assert_eq!(transitions[1].from, AgentStatus::Running);
    }

    #[test]
    fn test_other_changes_are_ignored() {
        let mut tracker = StatusTracker::new();
        tracker.observe(&[agent("a", AgentStatus::Creating)]);
        assert!(tracker.observe(&[agent("a", AgentStatus::Running)]).is_empty());
        assert!(tracker.observe(&[agent("a", AgentStatus::Running)]).is_empty());
        assert!(tracker.observe(&[agent("a", AgentStatus::Stopped)]).is_empty());
    }

    #[test]
    fn test_forgotten_agent_is_silent_on_return() {
        let mut tracker = StatusTracker::new();
        tracker.observe(&[agent("a", AgentStatus::Running)]);
        tracker.observe(&[]);
        assert!(tracker.observe(&[agent("a", AgentStatus::Finished)]).is_empty());
    }
}
