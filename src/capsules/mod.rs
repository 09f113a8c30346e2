//! Study capsules for Pocket Classroom
//!
//! This module provides:
//! - The capsule data model (meta, notes, flashcards, quiz)
//! - The capsule index, a summary list kept in step with the records
//! - Capsule CRUD plus JSON import/export

pub mod index;
pub mod models;
pub mod storage;

pub use index::IndexManager;
pub use models::*;
pub use storage::{export_capsule, validate_capsule, CapsuleError, CapsuleStorage};
