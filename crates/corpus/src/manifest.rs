//! Build manifest linking index offsets to document ids.

use crate::CorpusError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Bump this value whenever the manifest layout changes.
pub const MANIFEST_SCHEMA_VERSION: u16 = 1;

/// Records which documents an index artifact was built from, in offset order.
///
/// `entries[i]` is the id of the document whose vector sits at offset `i` in
/// the artifact. The manifest is written atomically next to the artifact and
/// is the only offset-to-id mapping retrieval consults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusManifest {
    #[serde(default = "default_schema_version")]
    pub schema_version: u16,
    /// Embedding model the vectors were produced with.
    pub embedding_model: String,
    /// Dimension of every vector in the artifact.
    pub dimension: usize,
    /// When the build completed.
    pub built_at: DateTime<Utc>,
    /// Document ids in offset order.
    pub entries: Vec<i64>,
}

const fn default_schema_version() -> u16 {
    MANIFEST_SCHEMA_VERSION
}

impl CorpusManifest {
    pub fn new(embedding_model: impl Into<String>, dimension: usize, entries: Vec<i64>) -> Self {
        Self {
            schema_version: MANIFEST_SCHEMA_VERSION,
            embedding_model: embedding_model.into(),
            dimension,
            built_at: Utc::now(),
            entries,
        }
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve an index offset to a document id.
    pub fn document_id(&self, offset: i64) -> Option<i64> {
        if offset < 0 {
            return None;
        }
        self.entries.get(offset as usize).copied()
    }

    /// Write the manifest as pretty JSON.
    ///
    /// Written to a `.tmp` sibling and renamed into place, matching how the
    /// index artifact itself is published.
    pub fn save(&self, path: &Path) -> Result<(), CorpusError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| CorpusError::ManifestInvalid(e.to_string()))?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| CorpusError::ManifestIo(e.to_string()))?;
            }
        }
        let tmp = tmp_path(path);
        fs::write(&tmp, json.as_bytes()).map_err(|e| CorpusError::ManifestIo(e.to_string()))?;
        fs::rename(&tmp, path).map_err(|e| CorpusError::ManifestIo(e.to_string()))?;
        tracing::debug!(path = %path.display(), entries = self.entries.len(), "manifest written");
        Ok(())
    }

    /// Load and validate a manifest.
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CorpusError::ManifestNotFound(path.display().to_string()));
            }
            Err(e) => return Err(CorpusError::ManifestIo(format!("{}: {e}", path.display()))),
        };
        let manifest: Self =
            serde_json::from_str(&raw).map_err(|e| CorpusError::ManifestInvalid(e.to_string()))?;
        if manifest.schema_version != MANIFEST_SCHEMA_VERSION {
            return Err(CorpusError::ManifestInvalid(format!(
                "unsupported schema version {}",
                manifest.schema_version
            )));
        }
        if manifest.dimension == 0 {
            return Err(CorpusError::ManifestInvalid("zero dimension".into()));
        }
        Ok(manifest)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".tmp");
    PathBuf::from(os)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_id_respects_bounds() {
        let manifest = CorpusManifest::new("test-model", 8, vec![10, 20, 30]);

        assert_eq!(manifest.document_id(0), Some(10));
        assert_eq!(manifest.document_id(2), Some(30));
        assert_eq!(manifest.document_id(3), None);
        assert_eq!(manifest.document_id(-1), None);
        assert_eq!(manifest.len(), 3);
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index").join("manifest.json");

        let manifest = CorpusManifest::new("text-embedding-ada-002", 1536, vec![1, 2, 4, 7]);
        manifest.save(&path).expect("save succeeds");
        assert!(!tmp_path(&path).exists(), "tmp file must not be left behind");

        let loaded = CorpusManifest::load(&path).expect("load succeeds");
        assert_eq!(loaded, manifest);
    }

    #[test]
    fn load_missing_manifest_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = CorpusManifest::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, CorpusError::ManifestNotFound(_)));
    }

    #[test]
    fn load_garbage_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(&path, "{ not json").unwrap();

        let err = CorpusManifest::load(&path).unwrap_err();
        assert!(matches!(err, CorpusError::ManifestInvalid(_)));
    }

    #[test]
    fn load_rejects_unknown_schema_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");

        let mut value =
            serde_json::to_value(CorpusManifest::new("m", 4, vec![1])).expect("to value");
        value["schema_version"] = serde_json::json!(99);
        fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();

        let err = CorpusManifest::load(&path).unwrap_err();
        match err {
            CorpusError::ManifestInvalid(msg) => assert!(msg.contains("99")),
            other => panic!("expected ManifestInvalid, got {other:?}"),
        }
    }

    #[test]
    fn load_rejects_zero_dimension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");

        let mut value =
            serde_json::to_value(CorpusManifest::new("m", 4, vec![1])).expect("to value");
        value["dimension"] = serde_json::json!(0);
        fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();

        let err = CorpusManifest::load(&path).unwrap_err();
        assert!(matches!(err, CorpusError::ManifestInvalid(_)));
    }
}
