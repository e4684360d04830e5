mod file;
mod ledger;
mod memory;
mod table;
#[cfg(test)]
mod tests;
mod update;

use async_trait::async_trait;

use crate::models::{ExpenseError, TransactionDraft, TransactionPatch, TransactionRecord};

pub use file::FileTableClient;
pub use ledger::TableLedgerStore;
pub use memory::MemoryTableClient;
pub use table::{TableClient, TableKey, TableStatus};
pub use update::{FieldValue, UpdateDirective};

/// Durable per-user transaction storage.
///
/// `(user_id, transaction_id)` is the unique key; implementations must
/// reject or overwrite only on an exact key match and never merge rows
/// across users.
#[async_trait]
pub trait LedgerStore: Send + Sync + 'static {
    /// Returns every record owned by `user_id`; empty if none.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<TransactionRecord>, ExpenseError>;

    /// Fails with `NotFound` when the key is absent.
    async fn get(&self, user_id: &str, transaction_id: &str) -> Result<TransactionRecord, ExpenseError>;

    /// Assigns a fresh transaction id, persists, and returns the stored value.
    async fn create(&self, user_id: &str, draft: TransactionDraft) -> Result<TransactionRecord, ExpenseError>;

    /// Sequential batch write with early abort: the first per-item failure
    /// surfaces as the batch failure, and items committed before it stay
    /// committed. Callers recover by re-running the sync pass.
    async fn create_many(&self, records: Vec<TransactionRecord>) -> Result<Vec<TransactionRecord>, ExpenseError>;

    /// Applies only the non-null fields of `patch`.
    async fn update(&self, user_id: &str, transaction_id: &str, patch: TransactionPatch) -> Result<TransactionRecord, ExpenseError>;

    /// Fails with `NotFound` when the key is absent or the delete is not
    /// acknowledged.
    async fn delete(&self, user_id: &str, transaction_id: &str) -> Result<(), ExpenseError>;
}
