mod email;
mod errors;
mod transaction;

use std::fmt;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

pub use email::CandidateMessage;
pub use errors::ExpenseError;
pub use transaction::{MAX_DESCRIPTION_CHARS, TransactionDraft, TransactionPatch, TransactionRecord};

/// Domain event kinds published after successful ledger mutations.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ExpenseCreated,
    ExpenseDeleted
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ExpenseCreated => "expense_created",
            EventType::ExpenseDeleted => "expense_deleted"
        }
    }
}

impl Display for EventType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
