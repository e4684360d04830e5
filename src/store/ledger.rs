use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::events::{EventNotifier, dispatch};
use crate::models::{EventType, ExpenseError, TransactionDraft, TransactionPatch, TransactionRecord};
use crate::store::{LedgerStore, TableClient, TableKey, UpdateDirective};
use crate::types::generate_transaction_id;

/// `LedgerStore` over a provider table client.
///
/// Owns domain event emission: create and delete publish exactly one event
/// on success, update publishes none.
pub struct TableLedgerStore<C: TableClient> {
    client: Arc<C>,
    notifier: Arc<dyn EventNotifier>
}

impl<C: TableClient> TableLedgerStore<C> {
    pub fn new(client: Arc<C>, notifier: Arc<dyn EventNotifier>) -> Self {
        Self { client, notifier }
    }

    async fn put_record(&self, record: &TransactionRecord) -> Result<(), ExpenseError> {
        let status = self.client.put_item(record).await?;

        if !status.is_ok() {
            return Err(ExpenseError::upstream(
                "ledger-table",
                format!("put acknowledged with status {}", status.status_code)
            ));
        }

        debug!("Persisted transaction [{}] for user [{}]", record.transaction_id, record.user_id);

        Ok(())
    }
}

#[async_trait]
impl<C: TableClient> LedgerStore for TableLedgerStore<C> {
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<TransactionRecord>, ExpenseError> {
        self.client.query_user(user_id).await
    }

    async fn get(&self, user_id: &str, transaction_id: &str) -> Result<TransactionRecord, ExpenseError> {
        let key = TableKey::new(user_id, transaction_id);

        self.client
            .get_item(&key)
            .await?
            .ok_or_else(|| ExpenseError::not_found(user_id, transaction_id))
    }

    async fn create(&self, user_id: &str, draft: TransactionDraft) -> Result<TransactionRecord, ExpenseError> {
        draft.validate()?;

        let record = TransactionRecord::from_draft(user_id, generate_transaction_id(user_id), draft);

        self.put_record(&record).await?;

        dispatch(self.notifier.clone(), record.transaction_id.clone(), EventType::ExpenseCreated);

        Ok(record)
    }

    async fn create_many(&self, records: Vec<TransactionRecord>) -> Result<Vec<TransactionRecord>, ExpenseError> {
        let mut created = Vec::with_capacity(records.len());

        for record in records {
            record.validate()?;

            // Early abort: a failed put surfaces here and already-committed
            // records stay committed.
            self.put_record(&record).await?;

            dispatch(self.notifier.clone(), record.transaction_id.clone(), EventType::ExpenseCreated);

            created.push(record);
        }

        Ok(created)
    }

    async fn update(&self, user_id: &str, transaction_id: &str, patch: TransactionPatch) -> Result<TransactionRecord, ExpenseError> {
        patch.validate()?;

        let directive = UpdateDirective::from_patch(&patch);

        if directive.is_empty() {
            return Err(ExpenseError::validation("update carries no fields to apply"));
        }

        let key = TableKey::new(user_id, transaction_id);

        // No event is published for updates.
        self.client
            .update_item(&key, &directive)
            .await?
            .ok_or_else(|| ExpenseError::not_found(user_id, transaction_id))
    }

    async fn delete(&self, user_id: &str, transaction_id: &str) -> Result<(), ExpenseError> {
        let key = TableKey::new(user_id, transaction_id);
        let status = self.client.delete_item(&key).await?;

        if !status.is_ok() {
            return Err(ExpenseError::not_found(user_id, transaction_id));
        }

        dispatch(self.notifier.clone(), transaction_id.to_string(), EventType::ExpenseDeleted);

        Ok(())
    }
}
