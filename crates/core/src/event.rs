// SPDX-License-Identifier: MIT

//! Structured progress events published by the agent.

use serde::{Deserialize, Serialize};

/// Lifecycle status tagged onto a published event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventStatus {
    Starting,
    InProgress,
    Complete,
    Failed,
}

crate::simple_display! {
    EventStatus {
        Starting => "starting",
        InProgress => "in-progress",
        Complete => "complete",
        Failed => "failed",
    }
}

/// One structured event: which state the agent was in, what happened, and
/// optional free-form details (a stderr line from the runner, for
/// instance). Events are fire-and-forget from the agent's point of view —
/// a publish failure is logged and never blocks progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEvent {
    pub state: String,
    pub status: EventStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AgentEvent {
    pub fn new(state: impl Into<String>, status: EventStatus) -> Self {
        Self {
            state: state.into(),
            status,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_matches_spec_vocabulary() {
        assert_eq!(EventStatus::Starting.to_string(), "starting");
        assert_eq!(EventStatus::InProgress.to_string(), "in-progress");
        assert_eq!(EventStatus::Complete.to_string(), "complete");
        assert_eq!(EventStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn event_serializes_without_details_when_absent() {
        let event = AgentEvent::new("running", EventStatus::Starting);
        let json = serde_json::to_string(&event).expect("serializes");
        assert!(!json.contains("details"));
    }
}
