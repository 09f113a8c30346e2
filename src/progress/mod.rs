//! Per-capsule study progress: known flashcards and best quiz score

mod models;
mod storage;

pub use models::*;
pub use storage::*;
