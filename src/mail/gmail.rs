use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::mail::{GoogleCredentials, MailSource};
use crate::models::{CandidateMessage, ExpenseError};

const GMAIL_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me";
const TEXT_PLAIN: &str = "text/plain";

/// Label-filtered, page-capped Gmail reader.
///
/// The fetch is bounded, not paginated: at most `max_results` messages are
/// considered per sync pass.
pub struct GmailMailSource {
    http: Client,
    credentials: GoogleCredentials,
    base_url: String,
    label_id: String,
    max_results: u32
}

#[derive(Debug, Deserialize)]
struct MessageListResponse {
    #[serde(default)]
    messages: Vec<MessageRef>
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String
}

#[derive(Debug, Deserialize)]
pub(crate) struct Message {
    pub(crate) id: String,
    pub(crate) payload: Option<MessagePart>
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MessagePart {
    #[serde(default)]
    pub(crate) mime_type: String,
    pub(crate) body: Option<PartBody>,
    #[serde(default)]
    pub(crate) parts: Vec<MessagePart>
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PartBody {
    pub(crate) data: Option<String>
}

impl GmailMailSource {
    /// Builds a source for the given credentials, refreshing the access
    /// token first when it has expired.
    pub async fn connect(http: Client, credentials: GoogleCredentials, label_id: String, max_results: u32) -> Result<Self, ExpenseError> {
        let credentials = credentials.ensure_fresh(&http, Utc::now()).await?;

        Ok(Self {
            http,
            credentials,
            base_url: GMAIL_BASE_URL.to_string(),
            label_id,
            max_results
        })
    }

    async fn list_and_decode(&self) -> Result<Vec<CandidateMessage>, ExpenseError> {
        let listing = self.list_message_refs().await?;
        let mut candidates = Vec::with_capacity(listing.len());

        for reference in listing {
            let message = self.get_message(&reference.id).await?;

            let Some(payload) = message.payload else {
                continue;
            };

            match plain_text_body(&payload) {
                Some(body) => candidates.push(CandidateMessage { id: message.id, body }),
                None => debug!("Message [{}] has no plain-text part, skipping", message.id)
            }
        }

        Ok(candidates)
    }

    async fn list_message_refs(&self) -> Result<Vec<MessageRef>, ExpenseError> {
        let url = format!("{}/messages", self.base_url);
        let max_results = self.max_results.to_string();

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.credentials.token)
            .query(&[("labelIds", self.label_id.as_str()), ("maxResults", max_results.as_str())])
            .send()
            .await
            .map_err(|error| ExpenseError::upstream("mail", error))?;

        if !response.status().is_success() {
            return Err(ExpenseError::upstream(
                "mail",
                format!("message listing returned status {}", response.status())
            ));
        }

        let listing: MessageListResponse = response
            .json()
            .await
            .map_err(|error| ExpenseError::upstream("mail", error))?;

        Ok(listing.messages)
    }

    async fn get_message(&self, id: &str) -> Result<Message, ExpenseError> {
        let url = format!("{}/messages/{id}", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.credentials.token)
            .query(&[("format", "full")])
            .send()
            .await
            .map_err(|error| ExpenseError::upstream("mail", error))?;

        if !response.status().is_success() {
            return Err(ExpenseError::upstream(
                "mail",
                format!("message fetch returned status {}", response.status())
            ));
        }

        response
            .json()
            .await
            .map_err(|error| ExpenseError::upstream("mail", error))
    }
}

#[async_trait]
impl MailSource for GmailMailSource {
    async fn fetch_candidates(&self) -> Option<Vec<CandidateMessage>> {
        match self.list_and_decode().await {
            Ok(candidates) => Some(candidates),
            Err(error) => {
                warn!("Mail provider unavailable: {error}");
                None
            }
        }
    }
}

/// Walks a shallow one-level part hierarchy for the first `text/plain`
/// body. Messages without one yield `None` and are silently omitted.
pub(crate) fn plain_text_body(payload: &MessagePart) -> Option<String> {
    if payload.parts.is_empty() {
        if payload.mime_type == TEXT_PLAIN {
            return decode_part(payload);
        }

        return None;
    }

    for part in &payload.parts {
        if part.parts.is_empty() {
            if part.mime_type == TEXT_PLAIN {
                if let Some(text) = decode_part(part) {
                    return Some(text);
                }
            }
        } else {
            for nested in &part.parts {
                if nested.mime_type == TEXT_PLAIN {
                    if let Some(text) = decode_part(nested) {
                        return Some(text);
                    }
                }
            }
        }
    }

    None
}

fn decode_part(part: &MessagePart) -> Option<String> {
    let data = part.body.as_ref()?.data.as_deref()?;
    let bytes = URL_SAFE_NO_PAD.decode(data.trim_end_matches('=')).ok()?;

    String::from_utf8(bytes).ok()
}
