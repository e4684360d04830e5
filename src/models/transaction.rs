use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::ExpenseError;
use crate::types::{TransactionId, UserId};

/// Hard cap on the free-text description field.
pub const MAX_DESCRIPTION_CHARS: usize = 50;

/// One financial event in a user's ledger.
///
/// `(user_id, transaction_id)` is the unique key. The amount is a decimal
/// serialized as a string to avoid floating point drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub user_id: UserId,
    pub transaction_id: TransactionId,
    pub title: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: bool
}

impl TransactionRecord {
    /// Attaches identity to a draft.
    pub fn from_draft(user_id: &str, transaction_id: TransactionId, draft: TransactionDraft) -> Self {
        Self {
            user_id: user_id.to_string(),
            transaction_id,
            title: draft.title,
            date: draft.date,
            amount: draft.amount,
            description: draft.description,
            status: draft.status
        }
    }

    pub fn validate(&self) -> Result<(), ExpenseError> {
        validate_description(self.description.as_deref())
    }
}

/// Create payload: a record without its identity fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub title: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    pub status: bool
}

impl TransactionDraft {
    pub fn validate(&self) -> Result<(), ExpenseError> {
        validate_description(self.description.as_deref())
    }
}

/// Partial update payload; only non-null fields are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionPatch {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub status: Option<bool>
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.date.is_none()
            && self.amount.is_none()
            && self.description.is_none()
            && self.status.is_none()
    }

    pub fn validate(&self) -> Result<(), ExpenseError> {
        validate_description(self.description.as_deref())
    }
}

fn validate_description(description: Option<&str>) -> Result<(), ExpenseError> {
    match description {
        Some(text) if text.chars().count() > MAX_DESCRIPTION_CHARS => {
            Err(ExpenseError::validation(format!(
                "description exceeds {MAX_DESCRIPTION_CHARS} characters"
            )))
        }
        _ => Ok(())
    }
}
