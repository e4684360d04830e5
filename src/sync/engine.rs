use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::extract::{ExtractedTransaction, Extractor};
use crate::mail::MailSource;
use crate::models::{CandidateMessage, ExpenseError, TransactionRecord};
use crate::store::LedgerStore;
use crate::sync::{existing_id_set, novel_candidates};
use crate::types::{UserId, sync_transaction_id};

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of one sync pass.
#[derive(Debug)]
pub enum SyncOutcome {
    /// The mail provider could not be consulted; nothing to do.
    MailUnavailable,
    /// Every candidate is already recorded.
    NothingNew,
    /// The fully persisted set of new records.
    Created(Vec<TransactionRecord>)
}

/// Stateless coordinator of the fetch → diff → extract → persist pass.
///
/// Owns no persistent state; every collaborator is injected and explicitly
/// scoped to this engine.
pub struct SyncEngine<S: LedgerStore, M: MailSource, E: Extractor> {
    store: Arc<S>,
    mail: Arc<M>,
    extractor: Arc<E>,
    user_locks: DashMap<UserId, Arc<Mutex<()>>>,
    call_timeout: Duration
}

impl<S: LedgerStore, M: MailSource, E: Extractor> SyncEngine<S, M, E> {
    pub fn new(store: Arc<S>, mail: Arc<M>, extractor: Arc<E>) -> Self {
        Self {
            store,
            mail,
            extractor,
            user_locks: DashMap::new(),
            call_timeout: DEFAULT_CALL_TIMEOUT
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Runs one sync pass for `user_id`.
    ///
    /// Re-running the pass with an unchanged mailbox and an updated ledger
    /// creates nothing: novelty is decided by message-id membership in the
    /// existing-id set, and sync-created ids embed the message id.
    ///
    /// # Errors
    /// Fetch, diff, and extract failures abort the pass with no ledger
    /// mutation. A failed batch persist may leave a committed prefix;
    /// callers recover by re-running the pass.
    pub async fn sync(&self, user_id: &str) -> Result<SyncOutcome, ExpenseError> {
        // Two overlapping passes for the same user would both compute the
        // same novel set before either writes; serialize them per user.
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let Some(candidates) = self.fetch_candidates().await else {
            info!("Mail source unavailable for user [{user_id}], nothing to do");
            return Ok(SyncOutcome::MailUnavailable);
        };

        debug!("Fetched {} candidate message(s) for user [{user_id}]", candidates.len());

        let existing = timeout(self.call_timeout, self.store.list_for_user(user_id))
            .await
            .map_err(|_| ExpenseError::upstream("ledger-table", "listing existing records timed out"))??;

        let existing_ids = existing_id_set(user_id, &existing);
        let novel = novel_candidates(candidates, &existing_ids);

        if novel.is_empty() {
            info!("No new transactions for user [{user_id}]");
            return Ok(SyncOutcome::NothingNew);
        }

        info!("Found {} novel candidate(s) for user [{user_id}]", novel.len());

        // Only the unseen subset goes to the extractor; known transactions
        // are never re-submitted.
        let extracted = timeout(self.call_timeout, self.extractor.extract(user_id, &novel))
            .await
            .map_err(|_| ExpenseError::upstream("extractor", "extraction timed out"))??;

        let records = assemble_records(user_id, &novel, extracted)?;

        let created = timeout(self.call_timeout, self.store.create_many(records))
            .await
            .map_err(|_| ExpenseError::upstream("ledger-table", "batch write timed out; a committed prefix may remain"))??;

        info!("Created {} transaction(s) for user [{user_id}]", created.len());

        Ok(SyncOutcome::Created(created))
    }

    async fn fetch_candidates(&self) -> Option<Vec<CandidateMessage>> {
        match timeout(self.call_timeout, self.mail.fetch_candidates()).await {
            Ok(result) => result,
            // An elapsed deadline leaves the provider state unknown, the
            // same contract as a provider failure.
            Err(_) => None
        }
    }

    fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        self.user_locks.entry(user_id.to_string()).or_default().clone()
    }
}

/// Turns extractor output into persistable records, treating it as
/// untrusted input: rows for messages that were not requested are
/// rejected, and every draft is re-validated.
fn assemble_records(
    user_id: &str,
    novel: &[CandidateMessage],
    extracted: Vec<ExtractedTransaction>
) -> Result<Vec<TransactionRecord>, ExpenseError> {
    let requested: HashSet<&str> = novel.iter().map(|candidate| candidate.id.as_str()).collect();
    let mut records = Vec::with_capacity(extracted.len());

    for row in extracted {
        if !requested.contains(row.message_id.as_str()) {
            return Err(ExpenseError::validation(format!(
                "extractor returned unknown message id [{}]",
                row.message_id
            )));
        }

        row.draft.validate()?;

        records.push(TransactionRecord::from_draft(
            user_id,
            sync_transaction_id(user_id, &row.message_id),
            row.draft
        ));
    }

    Ok(records)
}
