use async_trait::async_trait;
use dashmap::DashMap;

use crate::models::{ExpenseError, TransactionRecord};
use crate::store::{TableClient, TableKey, TableStatus, UpdateDirective};

/// In-process table backend used by tests and the default binary wiring.
#[derive(Default)]
pub struct MemoryTableClient {
    rows: DashMap<TableKey, TransactionRecord>
}

impl MemoryTableClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl TableClient for MemoryTableClient {
    async fn query_user(&self, user_id: &str) -> Result<Vec<TransactionRecord>, ExpenseError> {
        let mut records: Vec<TransactionRecord> = self
            .rows
            .iter()
            .filter(|entry| entry.key().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();

        records.sort_by(|a, b| a.transaction_id.cmp(&b.transaction_id));

        Ok(records)
    }

    async fn get_item(&self, key: &TableKey) -> Result<Option<TransactionRecord>, ExpenseError> {
        Ok(self.rows.get(key).map(|entry| entry.value().clone()))
    }

    async fn put_item(&self, record: &TransactionRecord) -> Result<TableStatus, ExpenseError> {
        let key = TableKey::new(&record.user_id, &record.transaction_id);

        self.rows.insert(key, record.clone());

        Ok(TableStatus::OK)
    }

    async fn update_item(&self, key: &TableKey, directive: &UpdateDirective) -> Result<Option<TransactionRecord>, ExpenseError> {
        match self.rows.get_mut(key) {
            Some(mut entry) => {
                directive.apply_to(entry.value_mut());
                Ok(Some(entry.value().clone()))
            }
            None => Ok(None)
        }
    }

    async fn delete_item(&self, key: &TableKey) -> Result<TableStatus, ExpenseError> {
        if self.rows.remove(key).is_some() {
            Ok(TableStatus::OK)
        } else {
            Ok(TableStatus { status_code: 404 })
        }
    }
}
