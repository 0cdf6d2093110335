//! Template versioning and export log persistence
//!
//! [`VersionStore`] keeps the current template and an immutable,
//! newest-first history of saved versions. [`ExportLog`] keeps an audit
//! trail of produced documents. Both sit on small persistence ports with a
//! JSON-file adapter and an in-memory adapter.

pub mod error;
pub mod exports;
pub mod persistence;
pub mod store;

pub use error::{Result, StoreError};
pub use exports::{ExportLog, DEFAULT_EXPORT_CAP};
pub use persistence::{ExportArchive, JsonFileStore, MemoryStore, Persistence, WriteLock};
pub use store::{find_active_id, VersionStore, DEFAULT_HISTORY_CAP};
