// SPDX-License-Identifier: MIT

//! The daemon's concrete event sink: publishes every `AgentEvent` as a
//! structured `tracing` event. A real deployment might fan these out to
//! a message bus instead; this is the "in-memory/logging implementation"
//! the spec ships so the agent is runnable without an external collaborator.

use teeagent_core::{AgentEvent, EventPublisher, EventStatus};

pub struct TracingEventPublisher;

#[async_trait::async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, event: AgentEvent) {
        match event.status {
            EventStatus::Failed => {
                tracing::warn!(state = %event.state, status = %event.status, details = ?event.details, "agent event");
            }
            _ => {
                tracing::info!(state = %event.state, status = %event.status, details = ?event.details, "agent event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_does_not_panic_for_any_status() {
        let publisher = TracingEventPublisher;
        for status in [
            EventStatus::Starting,
            EventStatus::InProgress,
            EventStatus::Complete,
            EventStatus::Failed,
        ] {
            publisher.publish(AgentEvent::new("running", status)).await;
        }
    }
}
