//! Ticket document store.
//!
//! [`TicketStore`] is the seam to the external document database. Two
//! implementations ship with the crate: an in-memory map and a JSON file.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use fd_lock::RwLock;
use tracing::debug;

use crate::error::StoreError;
use crate::models::ticket::{TicketRecord, TicketStatus};

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persistent storage for ticket records.
pub trait TicketStore: Send + Sync {
    /// Insert a new record.
    ///
    /// Fails with [`StoreError::Duplicate`] when a record already exists for
    /// the same storage path; the check and the insert are atomic.
    fn insert(&self, record: TicketRecord) -> StoreResult<()>;

    /// Fetch a record by id.
    fn get(&self, id: &str) -> StoreResult<Option<TicketRecord>>;

    /// Replace an existing record. Fails with [`StoreError::NotFound`] if absent.
    fn update(&self, record: &TicketRecord) -> StoreResult<()>;

    /// Replace an existing record only while its stored status is still
    /// `expected`. Fails with [`StoreError::Conflict`] otherwise.
    fn update_if(&self, record: &TicketRecord, expected: TicketStatus) -> StoreResult<()>;

    /// Delete a record. Returns false if it did not exist.
    fn delete(&self, id: &str) -> StoreResult<bool>;

    /// Record created for an uploaded file, if any.
    fn find_by_storage_path(&self, path: &str) -> StoreResult<Option<TicketRecord>>;

    /// All records, oldest first.
    fn list(&self) -> StoreResult<Vec<TicketRecord>>;
}

fn check_insert<'a>(
    existing: impl IntoIterator<Item = &'a TicketRecord>,
    record: &TicketRecord,
) -> StoreResult<()> {
    for other in existing {
        if other.id == record.id {
            return Err(StoreError::Backend(format!("duplicate ticket id {}", record.id)));
        }
        if let (Some(path), Some(other_path)) = (&record.storage_path, &other.storage_path) {
            if path == other_path {
                return Err(StoreError::Duplicate {
                    path: path.clone(),
                    existing_id: other.id.clone(),
                });
            }
        }
    }
    Ok(())
}

fn check_status(existing: &TicketRecord, expected: TicketStatus) -> StoreResult<()> {
    if existing.status != expected {
        return Err(StoreError::Conflict {
            id: existing.id.clone(),
            found: existing.status,
        });
    }
    Ok(())
}

fn sorted(mut records: Vec<TicketRecord>) -> Vec<TicketRecord> {
    records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    records
}

fn lock<T>(mutex: &Mutex<T>) -> StoreResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
}

/// In-memory ticket store.
#[derive(Debug, Default)]
pub struct MemoryTicketStore {
    records: Mutex<BTreeMap<String, TicketRecord>>,
}

impl MemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TicketStore for MemoryTicketStore {
    fn insert(&self, record: TicketRecord) -> StoreResult<()> {
        let mut records = lock(&self.records)?;
        check_insert(records.values(), &record)?;
        records.insert(record.id.clone(), record);
        Ok(())
    }

    fn get(&self, id: &str) -> StoreResult<Option<TicketRecord>> {
        Ok(lock(&self.records)?.get(id).cloned())
    }

    fn update(&self, record: &TicketRecord) -> StoreResult<()> {
        let mut records = lock(&self.records)?;
        match records.get_mut(&record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(record.id.clone())),
        }
    }

    fn update_if(&self, record: &TicketRecord, expected: TicketStatus) -> StoreResult<()> {
        let mut records = lock(&self.records)?;
        let existing = records
            .get_mut(&record.id)
            .ok_or_else(|| StoreError::NotFound(record.id.clone()))?;
        check_status(existing, expected)?;
        *existing = record.clone();
        Ok(())
    }

    fn delete(&self, id: &str) -> StoreResult<bool> {
        Ok(lock(&self.records)?.remove(id).is_some())
    }

    fn find_by_storage_path(&self, path: &str) -> StoreResult<Option<TicketRecord>> {
        Ok(lock(&self.records)?
            .values()
            .find(|r| r.storage_path.as_deref() == Some(path))
            .cloned())
    }

    fn list(&self) -> StoreResult<Vec<TicketRecord>> {
        Ok(sorted(lock(&self.records)?.values().cloned().collect()))
    }
}

/// Ticket store persisted as a pretty-printed JSON array.
///
/// Every operation reads and rewrites the whole file while holding an
/// exclusive advisory lock on a sibling `.lock` file, so separate processes
/// sharing one store are serialized. Writes go to a sibling temp file that is
/// renamed into place.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "tickets.json".into());
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn ensure_parent(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Run `f` with both the in-process and the file lock held.
    fn locked<T>(&self, f: impl FnOnce() -> StoreResult<T>) -> StoreResult<T> {
        let _guard = lock(&self.guard)?;
        self.ensure_parent()?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(self.sibling(".lock"))?;
        let mut file_lock = RwLock::new(file);
        let _file_guard = file_lock.write()?;
        f()
    }

    fn load(&self) -> StoreResult<Vec<TicketRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, records: &[TicketRecord]) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(records)?;
        let tmp = self.sibling(".tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        debug!("Saved {} tickets to {}", records.len(), self.path.display());
        Ok(())
    }
}

impl TicketStore for JsonFileStore {
    fn insert(&self, record: TicketRecord) -> StoreResult<()> {
        self.locked(|| {
            let mut records = self.load()?;
            check_insert(&records, &record)?;
            records.push(record);
            self.save(&records)
        })
    }

    fn get(&self, id: &str) -> StoreResult<Option<TicketRecord>> {
        self.locked(|| Ok(self.load()?.into_iter().find(|r| r.id == id)))
    }

    fn update(&self, record: &TicketRecord) -> StoreResult<()> {
        self.locked(|| {
            let mut records = self.load()?;
            let existing = records
                .iter_mut()
                .find(|r| r.id == record.id)
                .ok_or_else(|| StoreError::NotFound(record.id.clone()))?;
            *existing = record.clone();
            self.save(&records)
        })
    }

    fn update_if(&self, record: &TicketRecord, expected: TicketStatus) -> StoreResult<()> {
        self.locked(|| {
            let mut records = self.load()?;
            let existing = records
                .iter_mut()
                .find(|r| r.id == record.id)
                .ok_or_else(|| StoreError::NotFound(record.id.clone()))?;
            check_status(existing, expected)?;
            *existing = record.clone();
            self.save(&records)
        })
    }

    fn delete(&self, id: &str) -> StoreResult<bool> {
        self.locked(|| {
            let mut records = self.load()?;
            let before = records.len();
            records.retain(|r| r.id != id);
            if records.len() == before {
                return Ok(false);
            }
            self.save(&records)?;
            Ok(true)
        })
    }

    fn find_by_storage_path(&self, path: &str) -> StoreResult<Option<TicketRecord>> {
        self.locked(|| {
            Ok(self
                .load()?
                .into_iter()
                .find(|r| r.storage_path.as_deref() == Some(path)))
        })
    }

    fn list(&self) -> StoreResult<Vec<TicketRecord>> {
        self.locked(|| Ok(sorted(self.load()?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::models::ticket::ExtractedFields;

    fn upload(path: &str, minute: u32) -> TicketRecord {
        TicketRecord::for_upload(
            path,
            "image/jpeg",
            Some("driver-1".to_string()),
            Utc.with_ymd_and_hms(2025, 4, 16, 12, minute, 0).unwrap(),
        )
    }

    fn exercise(store: &dyn TicketStore) {
        let first = upload("tickets/a.jpg", 5);
        let second = upload("tickets/b.jpg", 1);
        store.insert(first.clone()).unwrap();
        store.insert(second.clone()).unwrap();

        let err = store.insert(upload("tickets/a.jpg", 9)).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { ref existing_id, .. } if *existing_id == first.id));

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);

        let mut updated = first.clone();
        updated.status = TicketStatus::Pending;
        updated.fields.ticket_number = Some("123".to_string());
        store.update(&updated).unwrap();
        assert_eq!(store.get(&first.id).unwrap(), Some(updated));

        let mut approved = store.get(&first.id).unwrap().unwrap();
        approved.status = TicketStatus::Approved;
        let stale = approved.clone();
        store.update_if(&approved, TicketStatus::Pending).unwrap();
        let err = store.update_if(&stale, TicketStatus::Pending).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { found: TicketStatus::Approved, .. }));

        let found = store.find_by_storage_path("tickets/b.jpg").unwrap().unwrap();
        assert_eq!(found.id, second.id);
        assert!(store.find_by_storage_path("tickets/c.jpg").unwrap().is_none());

        assert!(store.delete(&second.id).unwrap());
        assert!(!store.delete(&second.id).unwrap());
        assert!(store.get(&second.id).unwrap().is_none());

        let missing = TicketRecord::manual(ExtractedFields::default(), "m".to_string(), Utc::now());
        assert!(matches!(store.update(&missing), Err(StoreError::NotFound(_))));
        assert!(matches!(
            store.update_if(&missing, TicketStatus::Draft),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTicketStore::new();
        exercise(&store);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_json_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("tickets.json");

        exercise(&JsonFileStore::open(&path));

        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.list().unwrap().len(), 1);
        assert!(!dir.path().join("data").join("tickets.json.tmp").exists());
    }

    #[test]
    fn test_json_file_store_serializes_separate_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tickets.json");

        // Each thread opens its own handle, as separate processes would
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let store = JsonFileStore::open(&path);
                    for n in 0..10 {
                        let record = upload(&format!("w{}/t{}.jpg", worker, n), 0);
                        store.insert(record).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let store = JsonFileStore::open(&path);
        assert_eq!(store.list().unwrap().len(), 40);

        let err = store.insert(upload("w0/t0.jpg", 30)).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[test]
    fn test_manual_records_never_collide() {
        let store = MemoryTicketStore::new();
        for _ in 0..3 {
            let record = TicketRecord::manual(ExtractedFields::default(), "m".to_string(), Utc::now());
            store.insert(record).unwrap();
        }
        assert_eq!(store.len(), 3);
    }
}
