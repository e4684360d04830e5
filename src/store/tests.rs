use super::{FileTableClient, LedgerStore, MemoryTableClient, TableClient, TableKey, TableLedgerStore, TableStatus, UpdateDirective};

use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::time::sleep;
use uuid::Uuid;

use crate::events::EventNotifier;
use crate::models::{EventType, ExpenseError, TransactionDraft, TransactionPatch, TransactionRecord};

#[derive(Default)]
struct CountingNotifier {
    created: AtomicUsize,
    deleted: AtomicUsize
}

#[async_trait]
impl EventNotifier for CountingNotifier {
    async fn publish(&self, message: &str, event_type: EventType) -> Result<String, ExpenseError> {
        match event_type {
            EventType::ExpenseCreated => self.created.fetch_add(1, Ordering::SeqCst),
            EventType::ExpenseDeleted => self.deleted.fetch_add(1, Ordering::SeqCst)
        };

        Ok(format!("ack-{message}"))
    }
}

/// Delegates to an in-memory table but rejects one configured put.
struct FailingTableClient {
    inner: MemoryTableClient,
    fail_on_put: usize,
    puts: AtomicUsize
}

impl FailingTableClient {
    fn new(fail_on_put: usize) -> Self {
        Self {
            inner: MemoryTableClient::new(),
            fail_on_put,
            puts: AtomicUsize::new(0)
        }
    }
}

#[async_trait]
impl TableClient for FailingTableClient {
    async fn query_user(&self, user_id: &str) -> Result<Vec<TransactionRecord>, ExpenseError> {
        self.inner.query_user(user_id).await
    }

    async fn get_item(&self, key: &TableKey) -> Result<Option<TransactionRecord>, ExpenseError> {
        self.inner.get_item(key).await
    }

    async fn put_item(&self, record: &TransactionRecord) -> Result<TableStatus, ExpenseError> {
        if self.puts.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on_put {
            return Ok(TableStatus { status_code: 500 });
        }

        self.inner.put_item(record).await
    }

    async fn update_item(&self, key: &TableKey, directive: &UpdateDirective) -> Result<Option<TransactionRecord>, ExpenseError> {
        self.inner.update_item(key, directive).await
    }

    async fn delete_item(&self, key: &TableKey) -> Result<TableStatus, ExpenseError> {
        self.inner.delete_item(key).await
    }
}

fn create_draft(title: &str, amount: &str, description: Option<&str>) -> Result<TransactionDraft> {
    Ok(TransactionDraft {
        title: title.to_string(),
        date: NaiveDate::from_ymd_opt(2024, 1, 15).expect("valid date"),
        amount: Decimal::from_str(amount)?,
        description: description.map(str::to_string),
        status: false
    })
}

fn create_record(user_id: &str, transaction_id: &str, title: &str, amount: &str) -> Result<TransactionRecord> {
    Ok(TransactionRecord::from_draft(
        user_id,
        transaction_id.to_string(),
        create_draft(title, amount, None)?
    ))
}

fn create_store<C: TableClient>(client: Arc<C>) -> (TableLedgerStore<C>, Arc<CountingNotifier>) {
    let notifier = Arc::new(CountingNotifier::default());

    (TableLedgerStore::new(client, notifier.clone()), notifier)
}

#[tokio::test]
async fn test_memory_client_scopes_queries_per_user() -> Result<()> {
    let client = MemoryTableClient::new();

    client.put_item(&create_record("user1", "txn_user1_m1", "Coffee", "4.50")?).await?;
    client.put_item(&create_record("user2", "txn_user2_m1", "Rent", "1200")?).await?;

    let records = client.query_user("user1").await?;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].user_id, "user1");

    Ok(())
}

#[test]
fn test_update_directive_skips_null_fields() {
    let patch = TransactionPatch {
        amount: Some(Decimal::from_str("9.99").expect("valid decimal")),
        status: Some(true),
        ..TransactionPatch::default()
    };

    let directive = UpdateDirective::from_patch(&patch);

    assert_eq!(directive.expression(), "SET #amount = :amount, #status = :status");
    assert_eq!(directive.attribute_names().len(), 2);
    assert_eq!(directive.attribute_names()["#amount"], "amount");
    assert!(directive.attribute_values().contains_key(":status"));
}

#[test]
fn test_update_directive_from_empty_patch_is_empty() {
    assert!(UpdateDirective::from_patch(&TransactionPatch::default()).is_empty());
}

#[test]
fn test_update_directive_application_preserves_unnamed_fields() -> Result<()> {
    let mut record = create_record("user1", "txn_user1_m1", "Coffee", "4.50")?;
    let directive = UpdateDirective::new().set_text("title", Some("Espresso".to_string()));

    directive.apply_to(&mut record);

    assert_eq!(record.title, "Espresso");
    assert_eq!(record.amount, Decimal::from_str("4.50")?);
    assert!(!record.status);

    Ok(())
}

#[tokio::test]
async fn test_create_assigns_a_fresh_prefixed_id_and_persists() -> Result<()> {
    let client = Arc::new(MemoryTableClient::new());
    let (store, _notifier) = create_store(client.clone());

    let record = store.create("user123", create_draft("Coffee", "4.50", None)?).await?;

    assert!(record.transaction_id.starts_with("txn_user123_"));
    assert!(!record.transaction_id.is_empty());

    let fetched = store.get("user123", &record.transaction_id).await?;

    assert_eq!(fetched, record);

    Ok(())
}

#[tokio::test]
async fn test_create_rejects_oversized_descriptions() -> Result<()> {
    let client = Arc::new(MemoryTableClient::new());
    let (store, _notifier) = create_store(client.clone());

    let result = store.create("user123", create_draft("Coffee", "4.50", Some(&"x".repeat(51)))?).await;

    assert!(matches!(result, Err(ExpenseError::Validation { .. })));
    assert!(client.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_update_applies_only_the_named_fields() -> Result<()> {
    let client = Arc::new(MemoryTableClient::new());
    let (store, _notifier) = create_store(client);

    let record = store.create("user123", create_draft("Coffee", "4.50", Some("morning"))?).await?;

    let patch = TransactionPatch {
        amount: Some(Decimal::from_str("5.00")?),
        ..TransactionPatch::default()
    };

    store.update("user123", &record.transaction_id, patch).await?;

    let fetched = store.get("user123", &record.transaction_id).await?;

    assert_eq!(fetched.amount, Decimal::from_str("5.00")?);
    assert_eq!(fetched.title, "Coffee");
    assert_eq!(fetched.description.as_deref(), Some("morning"));

    Ok(())
}

#[tokio::test]
async fn test_update_with_empty_patch_fails_validation() -> Result<()> {
    let client = Arc::new(MemoryTableClient::new());
    let (store, _notifier) = create_store(client);

    let record = store.create("user123", create_draft("Coffee", "4.50", None)?).await?;
    let result = store.update("user123", &record.transaction_id, TransactionPatch::default()).await;

    assert!(matches!(result, Err(ExpenseError::Validation { .. })));

    Ok(())
}

#[tokio::test]
async fn test_update_on_missing_key_fails_with_not_found() -> Result<()> {
    let client = Arc::new(MemoryTableClient::new());
    let (store, _notifier) = create_store(client);

    let patch = TransactionPatch {
        status: Some(true),
        ..TransactionPatch::default()
    };

    let result = store.update("user123", "txn_user123_missing", patch).await;

    assert!(matches!(result, Err(ExpenseError::NotFound { .. })));

    Ok(())
}

#[tokio::test]
async fn test_delete_on_missing_key_fails_with_not_found() -> Result<()> {
    let client = Arc::new(MemoryTableClient::new());
    let (store, _notifier) = create_store(client);

    let result = store.delete("user123", "txn_user123_missing").await;

    assert!(matches!(result, Err(ExpenseError::NotFound { .. })));

    Ok(())
}

#[tokio::test]
async fn test_delete_removes_the_record_for_subsequent_gets() -> Result<()> {
    let client = Arc::new(MemoryTableClient::new());
    let (store, _notifier) = create_store(client);

    let record = store.create("user123", create_draft("Coffee", "4.50", None)?).await?;

    store.delete("user123", &record.transaction_id).await?;

    let result = store.get("user123", &record.transaction_id).await;

    assert!(matches!(result, Err(ExpenseError::NotFound { .. })));

    Ok(())
}

#[tokio::test]
async fn test_batch_write_aborts_early_and_keeps_the_committed_prefix() -> Result<()> {
    let client = Arc::new(FailingTableClient::new(2));
    let (store, _notifier) = create_store(client.clone());

    let records = vec![
        create_record("user123", "txn_user123_m1", "Coffee", "4.50")?,
        create_record("user123", "txn_user123_m2", "Rent", "1200")?,
        create_record("user123", "txn_user123_m3", "Groceries", "82.10")?
    ];

    let result = store.create_many(records).await;

    assert!(matches!(result, Err(ExpenseError::Upstream { .. })));

    let committed = client.query_user("user123").await?;

    assert_eq!(committed.len(), 1);
    assert_eq!(committed[0].transaction_id, "txn_user123_m1");

    Ok(())
}

#[tokio::test]
async fn test_create_and_delete_publish_one_event_each_and_update_none() -> Result<()> {
    let client = Arc::new(MemoryTableClient::new());
    let (store, notifier) = create_store(client);

    let record = store.create("user123", create_draft("Coffee", "4.50", None)?).await?;

    let patch = TransactionPatch {
        status: Some(true),
        ..TransactionPatch::default()
    };

    store.update("user123", &record.transaction_id, patch).await?;
    store.delete("user123", &record.transaction_id).await?;

    sleep(Duration::from_millis(50)).await;

    assert_eq!(notifier.created.load(Ordering::SeqCst), 1);
    assert_eq!(notifier.deleted.load(Ordering::SeqCst), 1);

    Ok(())
}

#[tokio::test]
async fn test_file_client_persists_rows_across_reopen() -> Result<()> {
    let path = std::env::temp_dir().join(format!("expense-sync-ledger-{}.json", Uuid::new_v4()));

    {
        let client = FileTableClient::open(&path).await?;

        client.put_item(&create_record("user123", "txn_user123_m1", "Coffee", "4.50")?).await?;
    }

    let reopened = FileTableClient::open(&path).await?;
    let records = reopened.query_user("user123").await?;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].transaction_id, "txn_user123_m1");

    let missing = reopened.delete_item(&TableKey::new("user123", "txn_user123_m2")).await?;

    assert_eq!(missing.status_code, 404);

    let _ = std::fs::remove_file(&path);

    Ok(())
}
