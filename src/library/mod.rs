//! Library module
//!
//! The library view: every capsule summary joined with its study progress.

mod models;
mod storage;

pub use models::LibraryCard;
pub use storage::Library;
