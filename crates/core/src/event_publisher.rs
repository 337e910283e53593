// SPDX-License-Identifier: MIT

//! Contract for the fire-and-forget event sink.
//!
//! Both the runner (stderr diagnostics) and the state machine's entry
//! hooks (progress events) publish through this trait, so it lives here
//! rather than in the service crate that ties them together. A publish
//! never fails observably to its caller — an implementation that can
//! fail (a network sink, say) is expected to log and swallow the error
//! itself, matching the spec's "publish failures are logged and never
//! block progress".
use std::sync::Arc;

use crate::event::AgentEvent;

#[async_trait::async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: AgentEvent);
}

#[async_trait::async_trait]
impl<T: EventPublisher + ?Sized> EventPublisher for Arc<T> {
    async fn publish(&self, event: AgentEvent) {
        (**self).publish(event).await
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::*;
    use parking_lot::Mutex;

    /// Records every published event in order, for assertions in tests.
    #[derive(Default)]
    pub struct RecordingPublisher {
        events: Mutex<Vec<AgentEvent>>,
    }

    impl RecordingPublisher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<AgentEvent> {
            self.events.lock().clone()
        }
    }

    #[async_trait::async_trait]
    impl EventPublisher for RecordingPublisher {
        async fn publish(&self, event: AgentEvent) {
            self.events.lock().push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::RecordingPublisher;
    use super::*;
    use crate::event::EventStatus;

    #[tokio::test]
    async fn recording_publisher_keeps_publish_order() {
        let publisher = RecordingPublisher::new();
        publisher
            .publish(AgentEvent::new("running", EventStatus::Starting))
            .await;
        publisher
            .publish(AgentEvent::new("running", EventStatus::Complete))
            .await;

        let events = publisher.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].status, EventStatus::Starting);
        assert_eq!(events[1].status, EventStatus::Complete);
    }
}
