//! # Flat vector index
//!
//! This crate stores dense `f32` embeddings row-major in a single contiguous
//! buffer and persists them as one compressed artifact on disk. Search is
//! exact: every query scans all rows and ranks them by squared Euclidean
//! distance. For corpora in the thousands-of-documents range an exhaustive
//! scan is faster and simpler than maintaining an approximate structure.
//!
//! ## Core Features
//!
//! - **Bulk insertion** from an [`ndarray`] matrix with strict dimension
//!   checks. Offsets are assigned in row order and never reused.
//! - **Exact top-k search** returning positional offsets, padded with
//!   sentinel entries when fewer than `k` vectors exist.
//! - **Atomic persistence**: the artifact is written to a `.tmp` sibling and
//!   renamed into place, so a reader never observes a half-written index.
//! - **Optional Zstd compression** of the artifact via [`CompressionConfig`].
//!
//! ## Example Usage
//!
//! ```
//! use index::FlatIndex;
//! use ndarray::array;
//!
//! let mut idx = FlatIndex::new(3).unwrap();
//! idx.add(array![[0.0_f32, 0.0, 1.0], [0.0, 1.0, 0.0]].view())
//!     .unwrap();
//!
//! let hits = idx.search(&[0.0, 0.9, 0.1], 1).unwrap();
//! assert_eq!(hits[0].offset, 1);
//! ```

mod query;

pub use query::{SearchHit, SENTINEL_OFFSET};

use bincode::config::standard;
use bincode::error::{DecodeError, EncodeError};
use bincode::serde::{decode_from_slice, encode_to_vec};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use zstd::{decode_all, encode_all};

/// Bump this value whenever the on-disk artifact layout changes.
pub const INDEX_SCHEMA_VERSION: u16 = 1;

/// Compression codec options for the on-disk artifact.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CompressionCodec {
    /// No compression (useful for debugging or when storage is not a concern).
    None,
    /// Zstd compression (default, good balance of speed and ratio).
    #[default]
    Zstd,
}

/// Compression behavior configuration.
///
/// The codec is not recorded inside the artifact, so the same configuration
/// must be used to write and read a given file.
#[derive(Clone, Debug)]
pub struct CompressionConfig {
    /// The compression codec to use (None or Zstd).
    pub codec: CompressionCodec,
    /// Compression level (1-22 for Zstd, where higher = better compression but slower).
    pub level: i32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            codec: CompressionCodec::default(),
            level: 3,
        }
    }
}

impl CompressionConfig {
    pub fn new(codec: CompressionCodec, level: i32) -> Self {
        Self { codec, level }
    }

    pub fn with_codec(mut self, codec: CompressionCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, IndexError> {
        match self.codec {
            CompressionCodec::None => Ok(data.to_vec()),
            CompressionCodec::Zstd => {
                encode_all(data, self.level).map_err(|e| IndexError::Io(e.to_string()))
            }
        }
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, IndexError> {
        match self.codec {
            CompressionCodec::None => Ok(data.to_vec()),
            CompressionCodec::Zstd => {
                decode_all(data).map_err(|e| IndexError::Corrupt(format!("zstd: {e}")))
            }
        }
    }
}

/// Errors raised by index construction, search, and persistence.
#[derive(Error, Debug, Clone)]
pub enum IndexError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("invalid dimension: {0}")]
    InvalidDimension(usize),
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("index artifact not found: {0}")]
    NotFound(String),
    #[error("index artifact corrupt: {0}")]
    Corrupt(String),
    #[error("serialization encode error: {0}")]
    Encode(String),
    #[error("io error: {0}")]
    Io(String),
}

impl From<EncodeError> for IndexError {
    fn from(e: EncodeError) -> Self {
        IndexError::Encode(e.to_string())
    }
}

impl From<DecodeError> for IndexError {
    fn from(e: DecodeError) -> Self {
        IndexError::Corrupt(e.to_string())
    }
}

/// On-disk layout: a bincode-encoded header plus the row-major vector data,
/// optionally wrapped in a Zstd frame.
#[derive(Serialize, Deserialize)]
struct IndexArtifact {
    #[serde(default = "default_schema_version")]
    schema_version: u16,
    dimension: u64,
    count: u64,
    vectors: Vec<f32>,
}

const fn default_schema_version() -> u16 {
    INDEX_SCHEMA_VERSION
}

/// Flat in-memory vector index.
///
/// Vectors are addressed by their insertion offset, starting at zero. The
/// structure is append-only: content changes are published by rebuilding the
/// index from scratch and swapping the artifact.
#[derive(Debug)]
pub struct FlatIndex {
    dimension: usize,
    vectors: Vec<f32>,
}

impl FlatIndex {
    /// Create an empty index for vectors of the given dimension.
    pub fn new(dimension: usize) -> Result<Self, IndexError> {
        if dimension == 0 {
            return Err(IndexError::InvalidDimension(dimension));
        }
        Ok(Self {
            dimension,
            vectors: Vec::new(),
        })
    }

    /// Dimension every stored vector must have.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of vectors currently stored.
    pub fn size(&self) -> usize {
        self.vectors.len() / self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Append a matrix of vectors, one per row.
    ///
    /// Offsets are assigned in row order, continuing from the current size.
    pub fn add(&mut self, vectors: ArrayView2<'_, f32>) -> Result<(), IndexError> {
        if vectors.ncols() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: vectors.ncols(),
            });
        }
        self.vectors.reserve(vectors.nrows() * self.dimension);
        for row in vectors.rows() {
            self.vectors.extend(row.iter().copied());
        }
        Ok(())
    }

    /// Borrow the vector stored at `offset`, if present.
    pub fn vector(&self, offset: usize) -> Option<&[f32]> {
        let start = offset.checked_mul(self.dimension)?;
        let end = start.checked_add(self.dimension)?;
        self.vectors.get(start..end)
    }

    /// Persist the index with the default compression settings.
    pub fn save(&self, path: &Path) -> Result<(), IndexError> {
        self.save_with(path, &CompressionConfig::default())
    }

    /// Persist the index to `path`.
    ///
    /// The artifact is written to a `.tmp` sibling first and then renamed into
    /// place, so a concurrent reader sees either the old file or the new one.
    pub fn save_with(&self, path: &Path, compression: &CompressionConfig) -> Result<(), IndexError> {
        let artifact = IndexArtifact {
            schema_version: INDEX_SCHEMA_VERSION,
            dimension: self.dimension as u64,
            count: self.size() as u64,
            vectors: self.vectors.clone(),
        };
        let encoded = encode_to_vec(&artifact, standard())?;
        let payload = compression.compress(&encoded)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| io_error(parent, &e))?;
            }
        }
        let tmp = tmp_path(path);
        fs::write(&tmp, &payload).map_err(|e| io_error(&tmp, &e))?;
        fs::rename(&tmp, path).map_err(|e| io_error(path, &e))?;
        tracing::debug!(
            path = %path.display(),
            vectors = self.size(),
            bytes = payload.len(),
            "index artifact written"
        );
        Ok(())
    }

    /// Load an index persisted with the default compression settings.
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        Self::load_with(path, &CompressionConfig::default())
    }

    /// Load an index artifact from `path`, validating its header.
    pub fn load_with(path: &Path, compression: &CompressionConfig) -> Result<Self, IndexError> {
        let payload = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(IndexError::NotFound(path.display().to_string()));
            }
            Err(e) => return Err(io_error(path, &e)),
        };
        let decompressed = compression.decompress(&payload)?;
        let (artifact, _): (IndexArtifact, usize) = decode_from_slice(&decompressed, standard())?;

        if artifact.schema_version != INDEX_SCHEMA_VERSION {
            return Err(IndexError::Corrupt(format!(
                "unsupported schema version {}",
                artifact.schema_version
            )));
        }
        let dimension = artifact.dimension as usize;
        if dimension == 0 {
            return Err(IndexError::Corrupt("zero dimension in header".into()));
        }
        let expected_len = (artifact.count as usize).checked_mul(dimension);
        if expected_len != Some(artifact.vectors.len()) {
            return Err(IndexError::Corrupt(format!(
                "header declares {} vectors of dimension {}, data holds {} floats",
                artifact.count,
                dimension,
                artifact.vectors.len()
            )));
        }
        Ok(Self {
            dimension,
            vectors: artifact.vectors,
        })
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".tmp");
    PathBuf::from(os)
}

fn io_error(path: &Path, e: &io::Error) -> IndexError {
    IndexError::Io(format!("{}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn index_with(dimension: usize, rows: &[Vec<f32>]) -> FlatIndex {
        let mut idx = FlatIndex::new(dimension).expect("dimension is nonzero");
        let mut flat = Vec::new();
        for row in rows {
            flat.extend_from_slice(row);
        }
        let matrix =
            Array2::from_shape_vec((rows.len(), dimension), flat).expect("rows are rectangular");
        idx.add(matrix.view()).expect("dimensions match");
        idx
    }

    #[test]
    fn new_rejects_zero_dimension() {
        let err = FlatIndex::new(0).expect_err("zero dimension must fail");
        assert!(matches!(err, IndexError::InvalidDimension(0)));
    }

    #[test]
    fn add_rejects_mismatched_columns() {
        let mut idx = FlatIndex::new(4).expect("valid dimension");
        let matrix = Array2::<f32>::zeros((2, 3));
        let err = idx.add(matrix.view()).expect_err("wrong column count");
        assert!(matches!(
            err,
            IndexError::DimensionMismatch {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn add_assigns_sequential_offsets() {
        let idx = index_with(
            2,
            &[vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]],
        );
        assert_eq!(idx.size(), 3);
        assert_eq!(idx.vector(0), Some(&[1.0f32, 0.0][..]));
        assert_eq!(idx.vector(2), Some(&[0.5f32, 0.5][..]));
        assert_eq!(idx.vector(3), None);
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("vectors.bin");

        let idx = index_with(3, &[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        idx.save(&path).expect("save succeeds");
        assert!(!tmp_path(&path).exists(), "tmp file must not be left behind");

        let loaded = FlatIndex::load(&path).expect("load succeeds");
        assert_eq!(loaded.dimension(), 3);
        assert_eq!(loaded.size(), 2);
        assert_eq!(loaded.vector(1), Some(&[4.0f32, 5.0, 6.0][..]));
    }

    #[test]
    fn save_load_uncompressed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("vectors.bin");
        let compression = CompressionConfig::new(CompressionCodec::None, 0);

        let idx = index_with(2, &[vec![0.25, -0.25]]);
        idx.save_with(&path, &compression).expect("save succeeds");

        let loaded = FlatIndex::load_with(&path, &compression).expect("load succeeds");
        assert_eq!(loaded.vector(0), Some(&[0.25f32, -0.25][..]));
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = FlatIndex::load(&dir.path().join("absent.bin")).expect_err("missing file");
        assert!(matches!(err, IndexError::NotFound(_)));
    }

    #[test]
    fn load_garbage_is_corrupt() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("vectors.bin");
        std::fs::write(&path, b"definitely not an index artifact").expect("write garbage");

        let err = FlatIndex::load(&path).expect_err("garbage must not parse");
        assert!(matches!(err, IndexError::Corrupt(_)));
    }

    #[test]
    fn load_truncated_artifact_is_corrupt() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("vectors.bin");

        let idx = index_with(8, &[vec![0.5; 8], vec![-0.5; 8]]);
        idx.save(&path).expect("save succeeds");

        let bytes = std::fs::read(&path).expect("read artifact");
        std::fs::write(&path, &bytes[..bytes.len() / 2]).expect("truncate artifact");

        let err = FlatIndex::load(&path).expect_err("truncated artifact");
        assert!(matches!(err, IndexError::Corrupt(_)));
    }
}
