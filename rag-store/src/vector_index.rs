//! Exact (flat) nearest-neighbor index over fixed-width `f32` vectors.
//!
//! Vectors are stored contiguously; position `i` occupies
//! `data[i * dim..(i + 1) * dim]`. Positions are insertion ranks and are never
//! reused. Search is a full scan with squared Euclidean distance.
//!
//! On-disk format (little endian):
//!
//! ```text
//! magic  b"HRVI"
//! u32    version (1)
//! u32    dimension
//! u64    count
//! f32 *  count * dimension
//! ```

use std::cmp::Ordering;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::errors::RagError;
use crate::persist::{LoadOutcome, write_atomic};
use crate::record::Neighbor;

const MAGIC: &[u8; 4] = b"HRVI";
const VERSION: u32 = 1;
const HEADER_LEN: usize = 4 + 4 + 4 + 8;

/// Append-only flat L2 index.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorIndex {
    dim: usize,
    data: Vec<f32>,
}

impl VectorIndex {
    /// Empty index of the given dimension.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            data: Vec::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        if self.dim == 0 { 0 } else { self.data.len() / self.dim }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Vector stored at `position`, if any.
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dim)?;
        self.data.get(start..start + self.dim)
    }

    /// Loads the index from `path`, degrading to an empty index of `dim` when
    /// the file is absent or unreadable. Never fails.
    pub fn load(path: &Path, dim: usize) -> (Self, LoadOutcome) {
        if !path.exists() {
            debug!(path = %path.display(), "vector index file missing; starting empty");
            return (Self::new(dim), LoadOutcome::Missing);
        }
        match Self::read_from(path, dim) {
            Ok(index) => {
                let n = index.len();
                info!(path = %path.display(), count = n, dim, "vector index loaded");
                (index, LoadOutcome::Loaded(n))
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "vector index unreadable; starting empty");
                (Self::new(dim), LoadOutcome::Corrupt(e.to_string()))
            }
        }
    }

    fn read_from(path: &Path, dim: usize) -> Result<Self, RagError> {
        let bytes = fs::read(path)?;
        if bytes.len() < HEADER_LEN {
            return Err(RagError::Corrupt(format!(
                "index header truncated ({} bytes)",
                bytes.len()
            )));
        }
        if &bytes[0..4] != MAGIC {
            return Err(RagError::Corrupt("bad index magic".into()));
        }
        let version = read_u32(&bytes[4..8]);
        if version != VERSION {
            return Err(RagError::Corrupt(format!(
                "unsupported index version {version}"
            )));
        }
        let file_dim = read_u32(&bytes[8..12]) as usize;
        if file_dim != dim {
            return Err(RagError::VectorSizeMismatch {
                got: file_dim,
                want: dim,
            });
        }
        let count = read_u64(&bytes[12..20]);
        let expected = usize::try_from(count)
            .ok()
            .and_then(|c| c.checked_mul(dim))
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| RagError::Corrupt(format!("implausible count {count}")))?;
        let body = &bytes[HEADER_LEN..];
        if body.len() != expected {
            return Err(RagError::Corrupt(format!(
                "index body is {} bytes, header implies {expected}",
                body.len()
            )));
        }

        let data = body
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Ok(Self { dim, data })
    }

    /// Up to `k` nearest entries, ascending by squared Euclidean distance.
    /// Equal distances keep insertion order.
    ///
    /// # Errors
    /// Returns [`RagError::VectorSizeMismatch`] if `query` has the wrong width.
    pub fn query(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, RagError> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        self.check_dim(query)?;

        let mut all: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(position, v)| Neighbor {
                position,
                distance: squared_l2(query, v),
            })
            .collect();

        let k = k.min(all.len());
        if k < all.len() {
            all.select_nth_unstable_by(k - 1, by_distance);
            all.truncate(k);
        }
        all.sort_by(by_distance);
        Ok(all)
    }

    /// Appends one vector and returns its position (the size before the add).
    ///
    /// # Errors
    /// Returns [`RagError::VectorSizeMismatch`] without modifying the index.
    pub fn append(&mut self, vector: &[f32]) -> Result<usize, RagError> {
        self.check_dim(vector)?;
        let position = self.len();
        self.data.extend_from_slice(vector);
        Ok(position)
    }

    /// Drops every vector at or after `len`.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.data.truncate(len.saturating_mul(self.dim));
    }

    /// Rewrites the whole index file atomically.
    pub fn persist(&self, path: &Path) -> Result<(), RagError> {
        let dim = u32::try_from(self.dim)
            .map_err(|_| RagError::Config(format!("dimension {} exceeds u32", self.dim)))?;
        let count = self.len() as u64;
        write_atomic(path, |w| {
            w.write_all(MAGIC)?;
            w.write_all(&VERSION.to_le_bytes())?;
            w.write_all(&dim.to_le_bytes())?;
            w.write_all(&count.to_le_bytes())?;
            for value in &self.data {
                w.write_all(&value.to_le_bytes())?;
            }
            Ok::<(), io::Error>(())
        })?;
        debug!(path = %path.display(), count, "vector index persisted");
        Ok(())
    }

    fn check_dim(&self, v: &[f32]) -> Result<(), RagError> {
        if v.len() != self.dim {
            return Err(RagError::VectorSizeMismatch {
                got: v.len(),
                want: self.dim,
            });
        }
        Ok(())
    }
}

fn by_distance(a: &Neighbor, b: &Neighbor) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then(a.position.cmp(&b.position))
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

fn read_u32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

fn read_u64(b: &[u8]) -> u64 {
    u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
}
