use thiserror::Error;

use crate::types::{TransactionId, UserId};

#[derive(Debug, Error)]
pub enum ExpenseError {
    #[error("Transaction [{transaction_id}] was not found for user [{user_id}]")]
    NotFound {
        user_id: UserId,
        transaction_id: TransactionId
    },
    #[error("Validation failed: {reason}")]
    Validation {
        reason: String
    },
    #[error("Upstream call to [{service}] failed: {reason}")]
    Upstream {
        service: &'static str,
        reason: String
    },
    #[error("Unauthorized: {reason}")]
    Unauthorized {
        reason: String
    }
}

impl ExpenseError {
    pub fn not_found(user_id: &str, transaction_id: &str) -> Self {
        Self::NotFound {
            user_id: user_id.to_string(),
            transaction_id: transaction_id.to_string()
        }
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation { reason: reason.into() }
    }

    pub fn upstream(service: &'static str, reason: impl ToString) -> Self {
        Self::Upstream {
            service,
            reason: reason.to_string()
        }
    }

    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized { reason: reason.into() }
    }
}
