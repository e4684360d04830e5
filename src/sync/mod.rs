mod dedup;
mod engine;

pub use dedup::{existing_id_set, novel_candidates};
pub use engine::{SyncEngine, SyncOutcome};
