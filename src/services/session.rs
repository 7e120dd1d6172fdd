//! Session store - cross-invocation filter/selection continuity
//!
//! A session instance records, per (token, query), the digest of the last
//! confirmed row and the active filter text. Presenting the token to a later
//! invocation re-enters that state. Instances are refreshed by upsert and
//! never deleted; stale tokens simply become unreachable.

use crate::error::TeqError;
use crate::services::store::Store;
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

/// Allocate a fresh session token: 128 random bits rendered as the canonical
/// 8-4-4-4-12 lowercase hex grouping.
pub fn new_token() -> String {
    let bytes: [u8; 16] = rand::random();
    Uuid::from_bytes(bytes).to_string()
}

impl Store {
    /// Upsert the session instance for (token, query), allocating a fresh
    /// token when none is supplied. Returns the effective token.
    ///
    /// Repeated calls with the same token update state in place; they never
    /// accumulate duplicate rows.
    pub fn save_instance(
        &self,
        query_id: i64,
        digest: &str,
        token: &str,
        filter_text: &str,
    ) -> Result<String, TeqError> {
        let token = if token.is_empty() {
            new_token()
        } else {
            token.to_string()
        };

        self.conn.execute(
            "INSERT OR REPLACE INTO session_instance (token, query_id, row_digest, filter_text)
             VALUES (?1, ?2, ?3, ?4)",
            params![token, query_id, digest, filter_text],
        )?;
        Ok(token)
    }

    /// The row digest last saved for (token, query)
    pub fn lookup_digest(&self, token: &str, query_id: i64) -> Result<String, TeqError> {
        self.conn
            .query_row(
                "SELECT row_digest FROM session_instance WHERE token = ?1 AND query_id = ?2",
                params![token, query_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| TeqError::NotFound(format!("session '{}' for query {}", token, query_id)))
    }

    /// The filter text last saved for (token, query); may be empty
    pub fn lookup_filter(&self, token: &str, query_id: i64) -> Result<String, TeqError> {
        self.conn
            .query_row(
                "SELECT filter_text FROM session_instance WHERE token = ?1 AND query_id = ?2",
                params![token, query_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| TeqError::NotFound(format!("session '{}' for query {}", token, query_id)))
    }

    /// Reverse lookup for session resumption: which query a digest was saved
    /// under
    pub fn lookup_query_id(&self, digest: &str) -> Result<i64, TeqError> {
        self.conn
            .query_row(
                "SELECT query_id FROM session_instance WHERE row_digest = ?1",
                [digest],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| TeqError::NotFound(format!("digest '{}'", digest)))
    }
}
