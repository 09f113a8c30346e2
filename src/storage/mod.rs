mod backend;
mod file_storage;
pub mod lenient;
mod memory;
mod records;

pub use backend::RecordBackend;
pub use file_storage::{FileBackend, StorageError};
pub use memory::MemoryBackend;
pub use records::{capsule_key, progress_key, RecordStore, INDEX_KEY};
