use async_trait::async_trait;
use tracing::info;
use crate::core::events::DomainEvent;
use crate::core::library::LibraryError;
use crate::gateway::events::EventPublisher;

// LogsPublisher writes domain events to the tracing log
#[derive(Debug, Default)]
pub struct LogsPublisher {
    topics: Vec<String>,
}

impl LogsPublisher {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventPublisher for LogsPublisher {
    async fn create_topic(&mut self, topic: &str) -> Result<String, LibraryError> {
        if !self.topics.iter().any(|t| t == topic) {
            self.topics.push(topic.to_string());
        }
        Ok(topic.to_string())
    }

    async fn get_topics(&mut self) -> Result<Vec<String>, LibraryError> {
        Ok(self.topics.clone())
    }

    async fn publish(&self, event: &DomainEvent) -> Result<(), LibraryError> {
        info!(event_id = event.event_id.as_str(), name = event.name.as_str(), group = event.group.as_str(),
            key = event.key.as_str(), kind = ?event.kind, data = event.json_data.as_str(), "domain event");
        Ok(())
    }
}
