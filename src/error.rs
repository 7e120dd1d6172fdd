//! Error taxonomy for the query session subsystem
//!
//! Initialization-time errors (missing selector, unresolvable name, connection
//! failure, empty result set) are fatal and reported by main. Errors raised
//! during interactive filtering or saving are caught by the app and shown as a
//! transient message without touching displayed state.

use thiserror::Error;

/// All failure modes of the catalog/session/query pipeline
#[derive(Debug, Error)]
pub enum TeqError {
    /// A name, id, or token lookup matched nothing
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend could not be reached or the driver tag is unknown
    #[error("connection failed: {0}")]
    Connection(String),

    /// Query execution or result scanning failed
    #[error("query failed: {0}")]
    Query(String),

    /// Stored display configuration is not valid JSON
    #[error("malformed display config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// The embedded local store rejected a read or write
    #[error("store error: {0}")]
    Persistence(#[from] rusqlite::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_the_subject() {
        let err = TeqError::NotFound("query 'orders'".to_string());
        assert_eq!(err.to_string(), "not found: query 'orders'");
    }

    #[test]
    fn test_config_parse_wraps_serde_error() {
        let parse = serde_json::from_str::<serde_json::Value>("{broken").unwrap_err();
        let err = TeqError::from(parse);
        assert!(err.to_string().starts_with("malformed display config"));
    }
}
