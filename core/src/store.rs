use crate::document::{Document, DocumentId};
use crate::error::StoreError;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Persistence for documents.
pub trait DocumentStore: Send + Sync {
    /// Insert when `doc.id == 0` (a fresh id is assigned), otherwise overwrite.
    fn save(&self, doc: Document) -> Result<DocumentId, StoreError>;
    fn find(&self, id: DocumentId) -> Result<Option<Document>, StoreError>;
    /// All documents, most recently uploaded first.
    fn list_all(&self) -> Result<Vec<Document>, StoreError>;
    /// Returns false when no document had this id.
    fn delete(&self, id: DocumentId) -> Result<bool, StoreError>;
    /// Atomically modify the stored document. `apply` may run more than once
    /// and returns false to leave the record untouched. `None` when the
    /// document is gone or `apply` declined.
    fn update(&self, id: DocumentId, apply: &mut dyn FnMut(&mut Document) -> bool) -> Result<Option<Document>, StoreError>;
}

fn newest_first(docs: &mut [Document]) {
    docs.sort_by(|a, b| b.upload_date.cmp(&a.upload_date).then(b.id.cmp(&a.id)));
}

pub struct SledDocumentStore {
    db: sled::Db,
    docs: sled::Tree,
}

impl SledDocumentStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Self::with_db(db)
    }

    /// Share an already opened database (e.g. with the user store).
    pub fn with_db(db: sled::Db) -> Result<Self, StoreError> {
        let docs = db.open_tree("documents")?;
        Ok(Self { db, docs })
    }
}

impl DocumentStore for SledDocumentStore {
    fn save(&self, mut doc: Document) -> Result<DocumentId, StoreError> {
        if doc.id == 0 {
            // sled ids start at 0, which is reserved for "unsaved"
            doc.id = self.db.generate_id()? + 1;
        }
        let bytes = bincode::serialize(&doc)?;
        self.docs.insert(doc.id.to_be_bytes(), bytes)?;
        self.docs.flush()?;
        Ok(doc.id)
    }

    fn find(&self, id: DocumentId) -> Result<Option<Document>, StoreError> {
        match self.docs.get(id.to_be_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn list_all(&self) -> Result<Vec<Document>, StoreError> {
        let mut docs = Vec::new();
        for entry in self.docs.iter() {
            let (_, bytes) = entry?;
            docs.push(bincode::deserialize::<Document>(&bytes)?);
        }
        newest_first(&mut docs);
        Ok(docs)
    }

    fn delete(&self, id: DocumentId) -> Result<bool, StoreError> {
        let removed = self.docs.remove(id.to_be_bytes())?.is_some();
        self.docs.flush()?;
        Ok(removed)
    }

    fn update(&self, id: DocumentId, apply: &mut dyn FnMut(&mut Document) -> bool) -> Result<Option<Document>, StoreError> {
        let key = id.to_be_bytes();
        loop {
            let Some(current) = self.docs.get(key)? else {
                return Ok(None);
            };
            let mut doc: Document = bincode::deserialize(&current)?;
            if !apply(&mut doc) {
                return Ok(None);
            }
            let bytes = bincode::serialize(&doc)?;
            if self.docs.compare_and_swap(key, Some(current), Some(bytes))?.is_ok() {
                self.docs.flush()?;
                return Ok(Some(doc));
            }
            // lost a race with another writer, retry on the fresh value
        }
    }
}

/// In-process store, used by tests and throwaway CLI runs.
pub struct MemoryDocumentStore {
    docs: RwLock<BTreeMap<DocumentId, Document>>,
    next_id: AtomicU64,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self { docs: RwLock::new(BTreeMap::new()), next_id: AtomicU64::new(1) }
    }
}

impl MemoryDocumentStore {
    pub fn new() -> Self { Self::default() }
}

impl DocumentStore for MemoryDocumentStore {
    fn save(&self, mut doc: Document) -> Result<DocumentId, StoreError> {
        if doc.id == 0 {
            doc.id = self.next_id.fetch_add(1, Ordering::Relaxed);
        }
        let id = doc.id;
        self.docs.write().insert(id, doc);
        Ok(id)
    }

    fn find(&self, id: DocumentId) -> Result<Option<Document>, StoreError> {
        Ok(self.docs.read().get(&id).cloned())
    }

    fn list_all(&self) -> Result<Vec<Document>, StoreError> {
        let mut docs: Vec<Document> = self.docs.read().values().cloned().collect();
        newest_first(&mut docs);
        Ok(docs)
    }

    fn delete(&self, id: DocumentId) -> Result<bool, StoreError> {
        Ok(self.docs.write().remove(&id).is_some())
    }

    fn update(&self, id: DocumentId, apply: &mut dyn FnMut(&mut Document) -> bool) -> Result<Option<Document>, StoreError> {
        let mut docs = self.docs.write();
        let Some(stored) = docs.get_mut(&id) else {
            return Ok(None);
        };
        let mut next = stored.clone();
        if !apply(&mut next) {
            return Ok(None);
        }
        *stored = next.clone();
        Ok(Some(next))
    }
}
