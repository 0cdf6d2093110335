//! Application state for the termo API

use std::sync::Arc;

use anyhow::Result;
use placeholder_engine::Resolver;
use termo_core::PageSetup;
use version_store::{
    ExportArchive, ExportLog, JsonFileStore, MemoryStore, Persistence, VersionStore,
    DEFAULT_EXPORT_CAP, DEFAULT_HISTORY_CAP,
};

use crate::config::Args;

pub struct AppState {
    pub versions: VersionStore<Arc<dyn Persistence>>,
    pub exports: ExportLog<Arc<dyn ExportArchive>>,
    pub resolver: Resolver,
    pub setup: PageSetup,
    pub admin_code: Option<String>,
}

impl AppState {
    /// State backed by JSON files under `args.data_dir`
    pub fn from_args(args: &Args) -> Result<Self> {
        let store = Arc::new(JsonFileStore::open(args.data_dir.clone())?);
        tracing::info!("Using data directory: {}", store.dir().display());

        if args.admin_code.is_none() {
            tracing::warn!("TERMO_ADMIN_CODE is not set, admin login is disabled");
        }

        let persistence: Arc<dyn Persistence> = store.clone();
        let archive: Arc<dyn ExportArchive> = store;
        Ok(Self {
            versions: VersionStore::with_cap(persistence, args.history_cap),
            exports: ExportLog::with_cap(archive, args.download_cap),
            resolver: Resolver::default(),
            setup: PageSetup::default(),
            admin_code: args.admin_code.clone(),
        })
    }

    /// Volatile state, used by tests
    pub fn in_memory(admin_code: Option<&str>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let persistence: Arc<dyn Persistence> = store.clone();
        let archive: Arc<dyn ExportArchive> = store;
        Self {
            versions: VersionStore::with_cap(persistence, DEFAULT_HISTORY_CAP),
            exports: ExportLog::with_cap(archive, DEFAULT_EXPORT_CAP),
            resolver: Resolver::default(),
            setup: PageSetup::default(),
            admin_code: admin_code.map(str::to_string),
        }
    }
}
