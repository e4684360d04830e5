//! Expense synchronization core: fetches a user's expense emails, diffs
//! them against the durable transaction ledger, extracts structured
//! records from the novel messages, and persists them exactly once.

pub mod config;
pub mod events;
pub mod extract;
pub mod mail;
pub mod models;
pub mod store;
pub mod sync;
pub mod types;
