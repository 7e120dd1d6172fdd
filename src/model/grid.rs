//! Result grid types and row identity
//!
//! A `Grid` is the uniform shape every backend normalizes its results into:
//! ordered columns (upper-cased titles) and ordered rows of string cells.
//! The row digest is the sole mechanism for re-locating "the same row" across
//! independent executions (re-sort, re-filter, or a new process).

use sha2::{Digest, Sha256};

/// Default column width when no configured width applies
pub const DEFAULT_COLUMN_WIDTH: u16 = 20;

/// Cell separator for row digests. Chosen as a character that does not occur
/// in rendered cell values often enough to matter; two rows with identical
/// rendered content are indistinguishable by design.
const DIGEST_SEPARATOR: &str = "|";

/// A display column: canonical (upper-cased or aliased) title plus width
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub title: String,
    pub width: u16,
}

impl Column {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            width: DEFAULT_COLUMN_WIDTH,
        }
    }
}

/// Normalized query output: ordered columns and string-rendered rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

impl Grid {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }
}

/// Compute the content digest of a row: SHA-256 over the cells joined with a
/// fixed separator, rendered as lowercase hex.
///
/// Identical cell sequences in identical order always yield identical digests,
/// independent of cursor position or result ordering.
pub fn row_digest(cells: &[String]) -> String {
    let joined = cells.join(DIGEST_SEPARATOR);
    let hash = Sha256::digest(joined.as_bytes());
    let mut out = String::with_capacity(hash.len() * 2);
    for byte in hash {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}
