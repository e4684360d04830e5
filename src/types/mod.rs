mod ids;

pub use ids::{embedded_message_id, generate_transaction_id, sync_transaction_id};

pub type UserId = String;
pub type TransactionId = String;
pub type MessageId = String;
