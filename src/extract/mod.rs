mod gemini;

use async_trait::async_trait;

use crate::models::{CandidateMessage, ExpenseError, TransactionDraft};
use crate::types::MessageId;

pub use gemini::GeminiExtractor;

/// One structured transaction candidate produced by the extractor, tied to
/// the mail message it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedTransaction {
    pub message_id: MessageId,
    pub draft: TransactionDraft
}

/// Turns unstructured candidate bodies into structured transaction drafts.
///
/// Output quality is best effort and the output itself is untrusted:
/// callers must re-validate it like any user-submitted payload.
#[async_trait]
pub trait Extractor: Send + Sync + 'static {
    async fn extract(&self, user_id: &str, candidates: &[CandidateMessage]) -> Result<Vec<ExtractedTransaction>, ExpenseError>;
}
