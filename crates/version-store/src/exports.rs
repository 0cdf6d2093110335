//! Append-only log of produced documents

use std::sync::{Mutex, MutexGuard};

use shared_types::{ExportRecord, ResolvedDocument};
use tracing::info;

use crate::error::{Result, StoreError};
use crate::persistence::{ExportArchive, WriteLock};

/// Number of export records kept unless configured otherwise
pub const DEFAULT_EXPORT_CAP: usize = 1000;

/// Newest-first, capped export log
#[derive(Debug)]
pub struct ExportLog<A> {
    archive: A,
    cap: usize,
    writer: Mutex<()>,
}

impl<A: ExportArchive> ExportLog<A> {
    pub fn new(archive: A) -> Self {
        Self::with_cap(archive, DEFAULT_EXPORT_CAP)
    }

    pub fn with_cap(archive: A, cap: usize) -> Self {
        Self {
            archive,
            cap: cap.max(1),
            writer: Mutex::new(()),
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// In-process writer lock, then the adapter's cross-process lock.
    ///
    /// Both are held until the returned pair is dropped.
    fn lock_writer(&self) -> Result<(MutexGuard<'_, ()>, WriteLock)> {
        let guard = self
            .writer
            .lock()
            .map_err(|_| StoreError::Lock("export log writer poisoned".to_string()))?;
        let lock = ExportArchive::write_lock(&self.archive)?;
        Ok((guard, lock))
    }

    /// Record a produced document
    pub fn record(&self, document: ResolvedDocument) -> Result<ExportRecord> {
        let _guard = self.lock_writer()?;
        let record = ExportRecord::new(document);

        let mut exports = self.archive.load_exports()?;
        exports.insert(0, record.clone());
        exports.truncate(self.cap);
        self.archive.save_exports(&exports)?;

        info!(id = %record.id, title = %record.document.title, "Recorded export");
        Ok(record)
    }

    pub fn list(&self) -> Result<Vec<ExportRecord>> {
        self.archive.load_exports()
    }

    pub fn get(&self, id: &str) -> Result<ExportRecord> {
        self.archive
            .load_exports()?
            .into_iter()
            .find(|record| record.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}
