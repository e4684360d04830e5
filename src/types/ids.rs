use chrono::Utc;
use uuid::Uuid;

use crate::types::TransactionId;

const PREFIX: &str = "txn";
const SUFFIX_LEN: usize = 6;

/// Mints the id for a directly-created record: `txn_<user>_<date>_<suffix>`.
///
/// The date stamp plus random suffix guarantees uniqueness without a
/// central counter.
pub fn generate_transaction_id(user_id: &str) -> TransactionId {
    let date = Utc::now().date_naive();
    let hex = Uuid::new_v4().simple().to_string();
    format!("{PREFIX}_{user_id}_{date}_{}", &hex[..SUFFIX_LEN])
}

/// Mints the id for a sync-created record: `txn_<user>_<message_id>`.
///
/// Embedding the provider message id is what lets a later sync pass
/// recognize the message as already recorded.
pub fn sync_transaction_id(user_id: &str, message_id: &str) -> TransactionId {
    format!("{PREFIX}_{user_id}_{message_id}")
}

/// Recovers the embedded remainder of a transaction id minted for
/// `user_id`, or `None` when the id was minted for someone else.
pub fn embedded_message_id<'a>(user_id: &str, transaction_id: &'a str) -> Option<&'a str> {
    let rest = transaction_id.strip_prefix(PREFIX)?.strip_prefix('_')?;
    let rest = rest.strip_prefix(user_id)?.strip_prefix('_')?;

    if rest.is_empty() {
        None
    } else {
        Some(rest)
    }
}
