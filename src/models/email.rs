use serde::{Deserialize, Serialize};

use crate::types::MessageId;

/// A normalized unit from the mail source: the provider-native message id
/// (stable, used as the dedup key) and the decoded plain-text body.
///
/// Transient; exists only within one synchronization pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMessage {
    pub id: MessageId,
    pub body: String
}

impl CandidateMessage {
    pub fn new(id: impl Into<MessageId>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body: body.into()
        }
    }
}
