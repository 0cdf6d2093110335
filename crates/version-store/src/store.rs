//! Template version history

use std::sync::{Mutex, MutexGuard};

use shared_types::{Template, VersionEntry, VersionSummary};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::persistence::{Persistence, WriteLock};

/// Number of versions kept unless configured otherwise
pub const DEFAULT_HISTORY_CAP: usize = 200;

/// Id of the first entry (newest first) whose fields equal `template`
pub fn find_active_id(history: &[VersionEntry], template: &Template) -> Option<String> {
    history
        .iter()
        .find(|entry| entry.matches(template))
        .map(|entry| entry.id.clone())
}

/// Current template plus a capped, newest-first list of immutable versions.
///
/// Which version is "active" is never stored. It is recomputed from the
/// current template on every read, so editing the template away from every
/// saved version simply leaves nothing active.
///
/// Mutations hold an internal writer lock plus the adapter's
/// [`Persistence::write_lock`] for the whole load-modify-persist sequence,
/// so stores in different processes sharing one data directory never
/// overwrite each other's versions.
#[derive(Debug)]
pub struct VersionStore<P> {
    persistence: P,
    cap: usize,
    writer: Mutex<()>,
}

impl<P: Persistence> VersionStore<P> {
    pub fn new(persistence: P) -> Self {
        Self::with_cap(persistence, DEFAULT_HISTORY_CAP)
    }

    /// A cap of zero is raised to one so a fresh append is always kept
    pub fn with_cap(persistence: P, cap: usize) -> Self {
        Self {
            persistence,
            cap: cap.max(1),
            writer: Mutex::new(()),
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// In-process writer lock, then the adapter's cross-process lock.
    ///
    /// Both are held until the returned pair is dropped.
    fn lock_writer(&self) -> Result<(MutexGuard<'_, ()>, WriteLock)> {
        let guard = self
            .writer
            .lock()
            .map_err(|_| StoreError::Lock("version store writer poisoned".to_string()))?;
        let lock = Persistence::write_lock(&self.persistence)?;
        Ok((guard, lock))
    }

    /// The current template, or the starter template when none was saved
    pub fn current(&self) -> Result<Template> {
        Ok(self
            .persistence
            .load_template()?
            .unwrap_or_else(Template::starter))
    }

    pub fn current_with_active(&self) -> Result<(Template, Option<String>)> {
        let template = self.current()?;
        let history = self.persistence.load_history()?;
        let active = find_active_id(&history, &template);
        Ok((template, active))
    }

    /// Make `template` current and record it as a new version
    pub fn save(&self, template: Template) -> Result<VersionEntry> {
        let _guard = self.lock_writer()?;
        self.persistence.save_template(&template)?;
        self.append_locked(template)
    }

    /// Record `template` as a new version without touching the current one
    pub fn append(&self, template: Template) -> Result<VersionEntry> {
        let _guard = self.lock_writer()?;
        self.append_locked(template)
    }

    fn append_locked(&self, template: Template) -> Result<VersionEntry> {
        let entry = VersionEntry::new(template);
        let mut history = self.persistence.load_history()?;
        history.insert(0, entry.clone());

        let evicted = history.len().saturating_sub(self.cap);
        history.truncate(self.cap);
        self.persistence.save_history(&history)?;

        info!(
            id = %entry.id,
            title = %entry.template.title,
            evicted,
            "Recorded template version"
        );
        Ok(entry)
    }

    pub fn list(&self) -> Result<Vec<VersionSummary>> {
        let history = self.persistence.load_history()?;
        debug!(count = history.len(), "Listing versions");
        Ok(history.iter().map(VersionEntry::summary).collect())
    }

    pub fn history(&self) -> Result<Vec<VersionEntry>> {
        self.persistence.load_history()
    }

    pub fn get(&self, id: &str) -> Result<VersionEntry> {
        self.persistence
            .load_history()?
            .into_iter()
            .find(|entry| entry.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Remove one version. The current template is left as is, even when
    /// the removed version was the active one.
    pub fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.lock_writer()?;
        let mut history = self.persistence.load_history()?;
        let before = history.len();
        history.retain(|entry| entry.id != id);
        if history.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }

        self.persistence.save_history(&history)?;
        info!(id, remaining = history.len(), "Deleted template version");
        Ok(())
    }

    /// Which saved version `template` corresponds to, if any
    pub fn find_active_id(&self, template: &Template) -> Result<Option<String>> {
        let history = self.persistence.load_history()?;
        Ok(find_active_id(&history, template))
    }

    /// Active version of the current template
    pub fn active_id(&self) -> Result<Option<String>> {
        Ok(self.current_with_active()?.1)
    }

    /// Restore an old version.
    ///
    /// The entry's fields become current and are recorded again as a NEW
    /// version, which is returned and immediately active.
    pub fn revert(&self, id: &str) -> Result<VersionEntry> {
        let _guard = self.lock_writer()?;
        let target = self
            .persistence
            .load_history()?
            .into_iter()
            .find(|entry| entry.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        self.persistence.save_template(&target.template)?;
        info!(from = id, "Reverting template");
        self.append_locked(target.template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{JsonFileStore, MemoryStore};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn template(title: &str) -> Template {
        Template::new(title, "Eu, {{nome}}", "{{nome}}", "Síndico")
    }

    fn memory_store() -> VersionStore<MemoryStore> {
        VersionStore::new(MemoryStore::new())
    }

    #[test]
    fn test_cold_store_yields_starter() {
        let store = memory_store();
        let (current, active) = store.current_with_active().unwrap();
        assert_eq!(current, Template::starter());
        assert_eq!(active, None);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_save_makes_entry_active() {
        let store = memory_store();
        let entry = store.save(template("A")).unwrap();

        assert_eq!(store.current().unwrap(), template("A"));
        assert_eq!(store.active_id().unwrap(), Some(entry.id.clone()));
        assert_eq!(store.list().unwrap(), vec![entry.summary()]);
    }

    #[test]
    fn test_append_does_not_change_current() {
        let store = memory_store();
        store.append(template("A")).unwrap();
        assert_eq!(store.current().unwrap(), Template::starter());
        assert_eq!(store.active_id().unwrap(), None);
    }

    #[test]
    fn test_append_then_find_active() {
        let store = memory_store();
        let t = template("A");
        let entry = store.append(t.clone()).unwrap();
        assert_eq!(store.find_active_id(&t).unwrap(), Some(entry.id));
    }

    #[test]
    fn test_edited_template_is_not_active() {
        let store = memory_store();
        store.save(template("A")).unwrap();

        let mut edited = template("A");
        edited.signer2.push(' ');
        assert_eq!(store.find_active_id(&edited).unwrap(), None);
    }

    #[test]
    fn test_duplicate_save_newest_is_active() {
        let store = memory_store();
        let first = store.save(template("A")).unwrap();
        let second = store.save(template("A")).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.active_id().unwrap(), Some(second.id));
    }

    #[test]
    fn test_history_is_newest_first_and_capped() {
        let store = VersionStore::with_cap(MemoryStore::new(), 3);
        for title in ["1", "2", "3", "4", "5"] {
            store.append(template(title)).unwrap();
        }

        let titles: Vec<String> = store.list().unwrap().into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["5", "4", "3"]);
    }

    #[test]
    fn test_get_and_not_found() {
        let store = memory_store();
        let entry = store.append(template("A")).unwrap();

        assert_eq!(store.get(&entry.id).unwrap(), entry);
        assert!(store.get("missing").unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete() {
        let store = memory_store();
        let keep = store.append(template("A")).unwrap();
        let gone = store.append(template("B")).unwrap();

        store.delete(&gone.id).unwrap();
        assert_eq!(store.history().unwrap(), vec![keep]);
    }

    #[test]
    fn test_delete_unknown_leaves_history() {
        let store = memory_store();
        store.append(template("A")).unwrap();

        let err = store.delete("missing").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(ref id) if id == "missing"));
        assert_eq!(store.history().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_active_keeps_current() {
        let store = memory_store();
        let entry = store.save(template("A")).unwrap();

        store.delete(&entry.id).unwrap();
        assert_eq!(store.current().unwrap(), template("A"));
        assert_eq!(store.active_id().unwrap(), None);
    }

    #[test]
    fn test_revert_appends_new_entry() {
        let store = memory_store();
        let old = store.save(template("A")).unwrap();
        store.save(template("B")).unwrap();

        let reverted = store.revert(&old.id).unwrap();
        assert_ne!(reverted.id, old.id);
        assert_eq!(reverted.template, old.template);
        assert_eq!(store.current().unwrap(), template("A"));
        assert_eq!(store.active_id().unwrap(), Some(reverted.id.clone()));
        assert_eq!(store.history().unwrap().len(), 3);
        assert_eq!(store.history().unwrap()[0].id, reverted.id);
    }

    #[test]
    fn test_revert_unknown() {
        let store = memory_store();
        store.save(template("A")).unwrap();

        assert!(store.revert("missing").unwrap_err().is_not_found());
        assert_eq!(store.current().unwrap(), template("A"));
        assert_eq!(store.history().unwrap().len(), 1);
    }

    #[test]
    fn test_json_store_survives_restart() {
        let dir = tempdir().unwrap();
        let entry = {
            let store = VersionStore::new(JsonFileStore::open(dir.path()).unwrap());
            store.save(template("A")).unwrap()
        };

        let reopened = VersionStore::new(JsonFileStore::new(dir.path()));
        assert_eq!(reopened.current().unwrap(), template("A"));
        assert_eq!(reopened.active_id().unwrap(), Some(entry.id));
    }

    #[test]
    fn test_two_stores_on_one_directory_keep_every_append() {
        let dir = tempdir().unwrap();
        let writers: Vec<_> = (0..2)
            .map(|w| {
                let path = dir.path().to_path_buf();
                std::thread::spawn(move || {
                    let store = VersionStore::with_cap(JsonFileStore::new(path), 10_000);
                    for i in 0..50 {
                        store.append(template(&format!("{}-{}", w, i))).unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let store = VersionStore::new(JsonFileStore::new(dir.path()));
        let history = store.history().unwrap();
        assert_eq!(history.len(), 100);
        assert!(history.iter().any(|e| e.template.title == "0-49"));
        assert!(history.iter().any(|e| e.template.title == "1-49"));
    }

    #[test]
    fn test_zero_cap_is_raised() {
        let store = VersionStore::with_cap(MemoryStore::new(), 0);
        assert_eq!(store.cap(), 1);
        store.append(template("A")).unwrap();
        assert_eq!(store.history().unwrap().len(), 1);
    }
}
