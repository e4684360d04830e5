use async_trait::async_trait;

use crate::models::{ExpenseError, TransactionRecord};
use crate::store::UpdateDirective;
use crate::types::{TransactionId, UserId};

/// Composite key of one ledger row.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct TableKey {
    pub user_id: UserId,
    pub transaction_id: TransactionId
}

impl TableKey {
    pub fn new(user_id: &str, transaction_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            transaction_id: transaction_id.to_string()
        }
    }
}

/// Provider acknowledgement for mutating calls. Status 200 is the only
/// success signal; any other code is a failure.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct TableStatus {
    pub status_code: u16
}

impl TableStatus {
    pub const OK: TableStatus = TableStatus { status_code: 200 };

    pub fn is_ok(&self) -> bool {
        self.status_code == 200
    }
}

/// Point and per-user range access to the backing transaction table.
///
/// Errors returned here are transport failures; an absent row is expressed
/// through `Option` or the acknowledgement status, never through an error.
#[async_trait]
pub trait TableClient: Send + Sync + 'static {
    async fn query_user(&self, user_id: &str) -> Result<Vec<TransactionRecord>, ExpenseError>;
    async fn get_item(&self, key: &TableKey) -> Result<Option<TransactionRecord>, ExpenseError>;
    async fn put_item(&self, record: &TransactionRecord) -> Result<TableStatus, ExpenseError>;
    async fn update_item(&self, key: &TableKey, directive: &UpdateDirective) -> Result<Option<TransactionRecord>, ExpenseError>;
    async fn delete_item(&self, key: &TableKey) -> Result<TableStatus, ExpenseError>;
}
