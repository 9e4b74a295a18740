//! Local persistence for sync state.

pub mod sqlite;

pub use sqlite::{SyncRecord, SyncStore};
