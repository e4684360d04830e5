mod webhook;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::spawn;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{EventType, ExpenseError};

pub use webhook::WebhookNotifier;

/// Best-effort publication of domain events for downstream consumers.
///
/// At-least-once at most: there is no delivery guarantee and no subscriber
/// contract here.
#[async_trait]
pub trait EventNotifier: Send + Sync + 'static {
    /// Publishes one event and returns the provider message id.
    async fn publish(&self, message: &str, event_type: EventType) -> Result<String, ExpenseError>;
}

/// Fire-and-forget event dispatch.
///
/// Publication runs on its own task with an isolated error channel:
/// failures are logged and never propagated, and callers do not await
/// delivery.
pub fn dispatch<N: EventNotifier + ?Sized>(notifier: Arc<N>, message: String, event_type: EventType) {
    spawn(async move {
        match notifier.publish(&message, event_type).await {
            Ok(message_id) => {
                debug!("Published [{event_type}] event for [{message}] as [{message_id}]");
            }
            Err(error) => {
                warn!("Failed to publish [{event_type}] event for [{message}]: {error}");
            }
        }
    });
}

/// Notifier that records events in the log stream only.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl EventNotifier for LogNotifier {
    async fn publish(&self, message: &str, event_type: EventType) -> Result<String, ExpenseError> {
        info!("Event [{event_type}]: {message}");

        Ok(Uuid::new_v4().to_string())
    }
}
