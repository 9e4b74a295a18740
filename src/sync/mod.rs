//! Note synchronization: collection, classification, batch publish.
//!
//! - [`notes`] - walk the source directory into publish candidates
//! - [`status`] - classify notes against their sync records
//! - [`publish`] - the batch runner tying store + orchestrator together

pub mod notes;
pub mod publish;
pub mod status;

pub use notes::{collect_notes, slugify, LocalNote};
pub use publish::{classify_notes, publish_notes, NoteResult, PublishReport};
pub use status::{classify, content_hash, NoteStatus};
