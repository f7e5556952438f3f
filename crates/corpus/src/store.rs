//! Embedded document store backed by [redb].
//!
//! Redb provides ACID transactions, MVCC reads, and crash safety without an
//! external process, which keeps the corpus a single file on disk.
//!
//! # Thread Safety
//!
//! The `Arc<Database>` wrapper allows safe sharing across threads. Redb
//! handles its own internal locking, so [`DocumentStore`] is cheap to clone
//! and safe to use from concurrent request handlers.

use crate::CorpusError;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Table holding bincode-encoded documents keyed by id.
const DOCUMENTS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("documents");

/// Table holding store-level counters.
const META_TABLE: TableDefinition<&str, u64> = TableDefinition::new("meta");

/// Key under which the next unissued document id is stored.
const NEXT_ID_KEY: &str = "next_id";

/// A single corpus document.
///
/// Ids start at 1, increase monotonically, and are never reused even after
/// deletion. The build manifest refers to documents by this id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Durable document storage for the pipeline.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    db: Arc<Database>,
}

impl DocumentStore {
    /// Open or create a document store at the given path.
    ///
    /// Parent directories are created as needed, and both tables are
    /// initialized up front so later read transactions never race table
    /// creation.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(CorpusError::storage)?;
            }
        }
        let db = Database::create(path).map_err(CorpusError::storage)?;

        let write_txn = db.begin_write().map_err(CorpusError::storage)?;
        {
            // Accessing the tables creates them if they don't exist
            let _documents = write_txn
                .open_table(DOCUMENTS_TABLE)
                .map_err(CorpusError::storage)?;
            let _meta = write_txn
                .open_table(META_TABLE)
                .map_err(CorpusError::storage)?;
        }
        write_txn.commit().map_err(CorpusError::storage)?;

        tracing::debug!(path = %path.display(), "document store opened");
        Ok(Self { db: Arc::new(db) })
    }

    /// Insert a document, assigning it the next id.
    ///
    /// The id counter and the document row are committed in one transaction,
    /// so a crash can never hand out the same id twice.
    pub fn insert(&self, text: &str) -> Result<Document, CorpusError> {
        let write_txn = self.db.begin_write().map_err(CorpusError::storage)?;
        let document = {
            let mut meta = write_txn
                .open_table(META_TABLE)
                .map_err(CorpusError::storage)?;
            let next_id = meta
                .get(NEXT_ID_KEY)
                .map_err(CorpusError::storage)?
                .map(|guard| guard.value())
                .unwrap_or(1);
            meta.insert(NEXT_ID_KEY, next_id + 1)
                .map_err(CorpusError::storage)?;

            let document = Document {
                id: next_id as i64,
                text: text.to_string(),
                created_at: Utc::now(),
            };
            let encoded = encode_to_vec(&document, standard())
                .map_err(|e| CorpusError::Encode(e.to_string()))?;

            let mut documents = write_txn
                .open_table(DOCUMENTS_TABLE)
                .map_err(CorpusError::storage)?;
            documents
                .insert(next_id, encoded.as_slice())
                .map_err(CorpusError::storage)?;
            document
        };
        write_txn.commit().map_err(CorpusError::storage)?;
        Ok(document)
    }

    /// Fetch a document by id.
    pub fn get(&self, id: i64) -> Result<Option<Document>, CorpusError> {
        if id < 1 {
            return Ok(None);
        }
        let read_txn = self.db.begin_read().map_err(CorpusError::storage)?;
        let table = read_txn
            .open_table(DOCUMENTS_TABLE)
            .map_err(CorpusError::storage)?;
        match table.get(id as u64).map_err(CorpusError::storage)? {
            Some(value) => {
                let (document, _): (Document, usize) = decode_from_slice(value.value(), standard())
                    .map_err(|e| CorpusError::Decode(e.to_string()))?;
                Ok(Some(document))
            }
            None => Ok(None),
        }
    }

    /// Delete a document by id. Returns whether a document was removed.
    ///
    /// The id is retired permanently; the next insert still receives a fresh
    /// id, so an index built before the deletion can detect the gap.
    pub fn delete(&self, id: i64) -> Result<bool, CorpusError> {
        if id < 1 {
            return Ok(false);
        }
        let write_txn = self.db.begin_write().map_err(CorpusError::storage)?;
        let removed = {
            let mut table = write_txn
                .open_table(DOCUMENTS_TABLE)
                .map_err(CorpusError::storage)?;
            let removed = table
                .remove(id as u64)
                .map_err(CorpusError::storage)?
                .is_some();
            removed
        };
        write_txn.commit().map_err(CorpusError::storage)?;
        Ok(removed)
    }

    /// All documents in ascending id order.
    pub fn all_documents(&self) -> Result<Vec<Document>, CorpusError> {
        let read_txn = self.db.begin_read().map_err(CorpusError::storage)?;
        let table = read_txn
            .open_table(DOCUMENTS_TABLE)
            .map_err(CorpusError::storage)?;

        let mut documents = Vec::new();
        for item in table.iter().map_err(CorpusError::storage)? {
            let (_, value) = item.map_err(CorpusError::storage)?;
            let (document, _): (Document, usize) = decode_from_slice(value.value(), standard())
                .map_err(|e| CorpusError::Decode(e.to_string()))?;
            documents.push(document);
        }
        Ok(documents)
    }

    /// Number of stored documents.
    pub fn len(&self) -> Result<u64, CorpusError> {
        let read_txn = self.db.begin_read().map_err(CorpusError::storage)?;
        let table = read_txn
            .open_table(DOCUMENTS_TABLE)
            .map_err(CorpusError::storage)?;
        table.len().map_err(CorpusError::storage)
    }

    /// Whether the store holds no documents.
    pub fn is_empty(&self) -> Result<bool, CorpusError> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn insert_assigns_ids_from_one() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = DocumentStore::open(temp_file.path()).unwrap();

        let first = store.insert("alpha").unwrap();
        let second = store.insert("beta").unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn get_roundtrips_inserted_document() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = DocumentStore::open(temp_file.path()).unwrap();

        let inserted = store.insert("hello corpus").unwrap();
        let fetched = store.get(inserted.id).unwrap().expect("document exists");
        assert_eq!(fetched, inserted);
    }

    #[test]
    fn get_unknown_or_invalid_id_is_none() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = DocumentStore::open(temp_file.path()).unwrap();
        store.insert("only one").unwrap();

        assert_eq!(store.get(42).unwrap(), None);
        assert_eq!(store.get(0).unwrap(), None);
        assert_eq!(store.get(-7).unwrap(), None);
    }

    #[test]
    fn delete_reports_whether_document_existed() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = DocumentStore::open(temp_file.path()).unwrap();

        let doc = store.insert("to be removed").unwrap();
        assert!(store.delete(doc.id).unwrap());
        assert!(!store.delete(doc.id).unwrap());
        assert_eq!(store.get(doc.id).unwrap(), None);
    }

    #[test]
    fn ids_are_never_reused_after_delete() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = DocumentStore::open(temp_file.path()).unwrap();

        store.insert("one").unwrap();
        let second = store.insert("two").unwrap();
        store.delete(second.id).unwrap();

        let third = store.insert("three").unwrap();
        assert_eq!(third.id, 3);
    }

    #[test]
    fn all_documents_come_back_in_id_order() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = DocumentStore::open(temp_file.path()).unwrap();

        for text in ["a", "b", "c", "d"] {
            store.insert(text).unwrap();
        }
        store.delete(2).unwrap();

        let docs = store.all_documents().unwrap();
        let ids: Vec<i64> = docs.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
        assert_eq!(docs[1].text, "c");
    }

    #[test]
    fn store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.redb");

        {
            let store = DocumentStore::open(&path).unwrap();
            store.insert("persistent").unwrap();
        }

        let reopened = DocumentStore::open(&path).unwrap();
        assert_eq!(reopened.len().unwrap(), 1);
        assert_eq!(reopened.get(1).unwrap().unwrap().text, "persistent");
        assert_eq!(reopened.insert("next").unwrap().id, 2);
    }
}
