//! Persistence ports and their adapters
//!
//! The store core never touches the filesystem directly. It talks to a
//! [`Persistence`] (template + history) and an [`ExportArchive`] (download
//! log). Two adapters are provided:
//!
//! - [`JsonFileStore`]: one pretty-printed JSON file per resource inside a
//!   data directory, written atomically; writers across processes are
//!   serialized by an exclusive lock on `.termo.lock`
//! - [`MemoryStore`]: process-local, for tests and embedding

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{ExportRecord, Template, VersionEntry};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{Result, StoreError};

pub const TEMPLATE_FILE: &str = "template.json";
pub const HISTORY_FILE: &str = "history.json";
pub const DOWNLOADS_FILE: &str = "downloads.json";
const LOCK_FILE: &str = ".termo.lock";

/// Storage for the current template and the version history
pub trait Persistence: Send + Sync {
    /// `None` when no template was ever saved
    fn load_template(&self) -> Result<Option<Template>>;
    fn save_template(&self, template: &Template) -> Result<()>;
    /// Newest first; empty when nothing was saved
    fn load_history(&self) -> Result<Vec<VersionEntry>>;
    fn save_history(&self, history: &[VersionEntry]) -> Result<()>;

    /// Lock held across a load-modify-save sequence.
    ///
    /// The default lock is a no-op for adapters that are process-local.
    fn write_lock(&self) -> Result<WriteLock> {
        Ok(WriteLock::default())
    }
}

/// Storage for the export log
pub trait ExportArchive: Send + Sync {
    /// Newest first; empty when nothing was recorded
    fn load_exports(&self) -> Result<Vec<ExportRecord>>;
    fn save_exports(&self, exports: &[ExportRecord]) -> Result<()>;

    /// See [`Persistence::write_lock`]
    fn write_lock(&self) -> Result<WriteLock> {
        Ok(WriteLock::default())
    }
}

impl<T: Persistence + ?Sized> Persistence for Arc<T> {
    fn load_template(&self) -> Result<Option<Template>> {
        (**self).load_template()
    }

    fn save_template(&self, template: &Template) -> Result<()> {
        (**self).save_template(template)
    }

    fn load_history(&self) -> Result<Vec<VersionEntry>> {
        (**self).load_history()
    }

    fn save_history(&self, history: &[VersionEntry]) -> Result<()> {
        (**self).save_history(history)
    }

    fn write_lock(&self) -> Result<WriteLock> {
        Persistence::write_lock(&**self)
    }
}

impl<T: ExportArchive + ?Sized> ExportArchive for Arc<T> {
    fn load_exports(&self) -> Result<Vec<ExportRecord>> {
        (**self).load_exports()
    }

    fn save_exports(&self, exports: &[ExportRecord]) -> Result<()> {
        (**self).save_exports(exports)
    }

    fn write_lock(&self) -> Result<WriteLock> {
        ExportArchive::write_lock(&**self)
    }
}

/// Exclusive advisory lock on a data directory, released on drop
#[derive(Debug, Default)]
pub struct WriteLock {
    file: Option<File>,
}

impl WriteLock {
    fn acquire(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| StoreError::io(path, e))?;
        file.lock_exclusive()
            .map_err(|e| StoreError::Lock(format!("{}: {}", path.display(), e)))?;
        Ok(Self { file: Some(file) })
    }

    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        if let Some(file) = &self.file {
            let _ = file.unlock();
        }
    }
}

/// JSON files in a data directory.
///
/// Missing files read as absent. Files that fail to parse are logged and
/// also read as absent, so a hand-edited or truncated file never takes the
/// service down. Every write goes to a temporary file in the same
/// directory which is then renamed over the target. Callers that load,
/// modify and save hold [`JsonFileStore::write_lock`] for the whole
/// sequence.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the data directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(dir);
        fs::create_dir_all(&store.dir).map_err(|e| StoreError::io(&store.dir, e))?;
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Block until this process holds the exclusive lock on `.termo.lock`
    pub fn write_lock(&self) -> Result<WriteLock> {
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        WriteLock::acquire(&self.path(LOCK_FILE))
    }

    fn read_json<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>> {
        let path = self.path(file);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No data file yet");
                return Ok(None);
            }
            Err(e) => return Err(StoreError::io(path, e)),
        };

        match serde_json::from_str(&content) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring malformed data file");
                Ok(None)
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        let json = serde_json::to_string_pretty(value)?;
        let target = self.path(file);

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.persist(&target)
            .map_err(|e| StoreError::io(&target, e.error))?;

        debug!(path = %target.display(), bytes = json.len(), "Wrote data file");
        Ok(())
    }
}

impl Persistence for JsonFileStore {
    fn load_template(&self) -> Result<Option<Template>> {
        self.read_json(TEMPLATE_FILE)
    }

    fn save_template(&self, template: &Template) -> Result<()> {
        self.write_json(TEMPLATE_FILE, template)
    }

    fn load_history(&self) -> Result<Vec<VersionEntry>> {
        Ok(self.read_json(HISTORY_FILE)?.unwrap_or_default())
    }

    fn save_history(&self, history: &[VersionEntry]) -> Result<()> {
        self.write_json(HISTORY_FILE, history)
    }

    fn write_lock(&self) -> Result<WriteLock> {
        JsonFileStore::write_lock(self)
    }
}

impl ExportArchive for JsonFileStore {
    fn load_exports(&self) -> Result<Vec<ExportRecord>> {
        Ok(self.read_json(DOWNLOADS_FILE)?.unwrap_or_default())
    }

    fn save_exports(&self, exports: &[ExportRecord]) -> Result<()> {
        self.write_json(DOWNLOADS_FILE, exports)
    }

    fn write_lock(&self) -> Result<WriteLock> {
        JsonFileStore::write_lock(self)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    template: Option<Template>,
    history: Vec<VersionEntry>,
    exports: Vec<ExportRecord>,
}

/// In-memory adapter
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `template` already saved as current
    pub fn with_template(template: Template) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                template: Some(template),
                ..MemoryState::default()
            }),
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Lock("memory store poisoned".to_string()))
    }
}

impl Persistence for MemoryStore {
    fn load_template(&self) -> Result<Option<Template>> {
        Ok(self.state()?.template.clone())
    }

    fn save_template(&self, template: &Template) -> Result<()> {
        self.state()?.template = Some(template.clone());
        Ok(())
    }

    fn load_history(&self) -> Result<Vec<VersionEntry>> {
        Ok(self.state()?.history.clone())
    }

    fn save_history(&self, history: &[VersionEntry]) -> Result<()> {
        self.state()?.history = history.to_vec();
        Ok(())
    }
}

impl ExportArchive for MemoryStore {
    fn load_exports(&self) -> Result<Vec<ExportRecord>> {
        Ok(self.state()?.exports.clone())
    }

    fn save_exports(&self, exports: &[ExportRecord]) -> Result<()> {
        self.state()?.exports = exports.to_vec();
        Ok(())
    }
}
