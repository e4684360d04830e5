use std::collections::HashSet;

use crate::models::{CandidateMessage, TransactionRecord};
use crate::types::embedded_message_id;

/// The identifiers already represented in a user's ledger: every stored
/// transaction id plus, for ids minted by the sync path, the embedded
/// provider message id.
///
/// Computed fresh per pass. Correctness of the diff depends on an
/// up-to-date view, so this set must never be cached across passes.
pub fn existing_id_set(user_id: &str, records: &[TransactionRecord]) -> HashSet<String> {
    let mut ids = HashSet::with_capacity(records.len() * 2);

    for record in records {
        if let Some(message_id) = embedded_message_id(user_id, &record.transaction_id) {
            ids.insert(message_id.to_string());
        }

        ids.insert(record.transaction_id.clone());
    }

    ids
}

/// The candidates not yet represented by any existing identifier.
pub fn novel_candidates(candidates: Vec<CandidateMessage>, existing_ids: &HashSet<String>) -> Vec<CandidateMessage> {
    candidates
        .into_iter()
        .filter(|candidate| !existing_ids.contains(&candidate.id))
        .collect()
}
