//! # Corpus storage
//!
//! Durable document storage for the retrieval pipeline, plus the build
//! manifest that records which documents an index artifact was built from.
//!
//! Documents live in an embedded [redb] database: a pure-Rust, ACID,
//! crash-safe key-value store with no external service to run. Each document
//! gets a monotonically increasing integer id that is never reused, so ids
//! stay stable across deletions and rebuilds.
//!
//! The [`CorpusManifest`] is the ordering contract between a persisted index
//! artifact and the store: entry `i` names the id of the document whose
//! vector sits at offset `i` in the artifact. Retrieval resolves offsets
//! through the manifest alone and never relies on store iteration order.

mod error;
mod manifest;
mod store;

pub use error::CorpusError;
pub use manifest::{CorpusManifest, MANIFEST_SCHEMA_VERSION};
pub use store::{Document, DocumentStore};
