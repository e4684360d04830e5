use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::events::EventNotifier;
use crate::models::{EventType, ExpenseError};

/// Publishes domain events to an HTTP topic endpoint.
pub struct WebhookNotifier {
    http: Client,
    topic_url: String
}

#[derive(Debug, Deserialize)]
struct PublishResponse {
    message_id: String
}

impl WebhookNotifier {
    pub fn new(http: Client, topic_url: impl Into<String>) -> Self {
        Self {
            http,
            topic_url: topic_url.into()
        }
    }
}

#[async_trait]
impl EventNotifier for WebhookNotifier {
    async fn publish(&self, message: &str, event_type: EventType) -> Result<String, ExpenseError> {
        let response = self
            .http
            .post(&self.topic_url)
            .json(&json!({
                "message": message,
                "attributes": {
                    "event_type": event_type.as_str()
                }
            }))
            .send()
            .await
            .map_err(|error| ExpenseError::upstream("event-topic", error))?;

        if !response.status().is_success() {
            return Err(ExpenseError::upstream(
                "event-topic",
                format!("publish acknowledged with status {}", response.status())
            ));
        }

        let parsed: PublishResponse = response
            .json()
            .await
            .map_err(|error| ExpenseError::upstream("event-topic", error))?;

        Ok(parsed.message_id)
    }
}
