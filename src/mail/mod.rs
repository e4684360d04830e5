mod credentials;
mod gmail;

use async_trait::async_trait;

use crate::models::CandidateMessage;

pub use credentials::GoogleCredentials;
pub use gmail::GmailMailSource;

/// Retrieves the bounded set of candidate expense messages for a user.
#[async_trait]
pub trait MailSource: Send + Sync + 'static {
    /// Returns `None` when the provider could not be consulted at all;
    /// callers must treat that as "could not determine", not "no mail".
    async fn fetch_candidates(&self) -> Option<Vec<CandidateMessage>>;
}
