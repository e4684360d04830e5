use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;

use crate::models::{ExpenseError, TransactionRecord};
use crate::store::{TableClient, TableKey, TableStatus, UpdateDirective};

/// JSON-file-durable table backend for the shipped binary.
///
/// The whole table is held in memory and rewritten after every mutation;
/// per-user expense ledgers stay small enough for that to be fine.
pub struct FileTableClient {
    path: PathBuf,
    rows: Mutex<Vec<TransactionRecord>>
}

impl FileTableClient {
    /// Loads the table from `path`; a missing file is an empty table.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, ExpenseError> {
        let path = path.into();

        let rows = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|error| {
                ExpenseError::upstream("ledger-file", format!("corrupt ledger file {}: {error}", path.display()))
            })?,
            Err(error) if error.kind() == ErrorKind::NotFound => Vec::new(),
            Err(error) => return Err(ExpenseError::upstream("ledger-file", error))
        };

        Ok(Self {
            path,
            rows: Mutex::new(rows)
        })
    }

    async fn persist(&self, rows: &[TransactionRecord]) -> Result<(), ExpenseError> {
        let bytes = serde_json::to_vec_pretty(rows)
            .map_err(|error| ExpenseError::upstream("ledger-file", error))?;

        fs::write(&self.path, bytes)
            .await
            .map_err(|error| ExpenseError::upstream("ledger-file", error))
    }
}

fn matches_key(record: &TransactionRecord, key: &TableKey) -> bool {
    record.user_id == key.user_id && record.transaction_id == key.transaction_id
}

#[async_trait]
impl TableClient for FileTableClient {
    async fn query_user(&self, user_id: &str) -> Result<Vec<TransactionRecord>, ExpenseError> {
        let rows = self.rows.lock().await;

        let mut records: Vec<TransactionRecord> = rows
            .iter()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect();

        records.sort_by(|a, b| a.transaction_id.cmp(&b.transaction_id));

        Ok(records)
    }

    async fn get_item(&self, key: &TableKey) -> Result<Option<TransactionRecord>, ExpenseError> {
        let rows = self.rows.lock().await;

        Ok(rows.iter().find(|record| matches_key(record, key)).cloned())
    }

    async fn put_item(&self, record: &TransactionRecord) -> Result<TableStatus, ExpenseError> {
        let mut rows = self.rows.lock().await;
        let key = TableKey::new(&record.user_id, &record.transaction_id);

        match rows.iter_mut().find(|existing| matches_key(existing, &key)) {
            Some(existing) => *existing = record.clone(),
            None => rows.push(record.clone())
        }

        self.persist(&rows).await?;

        Ok(TableStatus::OK)
    }

    async fn update_item(&self, key: &TableKey, directive: &UpdateDirective) -> Result<Option<TransactionRecord>, ExpenseError> {
        let mut rows = self.rows.lock().await;

        let Some(record) = rows.iter_mut().find(|record| matches_key(record, key)) else {
            return Ok(None);
        };

        directive.apply_to(record);

        let updated = record.clone();

        self.persist(&rows).await?;

        Ok(Some(updated))
    }

    async fn delete_item(&self, key: &TableKey) -> Result<TableStatus, ExpenseError> {
        let mut rows = self.rows.lock().await;

        let Some(position) = rows.iter().position(|record| matches_key(record, key)) else {
            return Ok(TableStatus { status_code: 404 });
        };

        rows.remove(position);
        self.persist(&rows).await?;

        Ok(TableStatus::OK)
    }
}
