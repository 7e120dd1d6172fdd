//! Persistence and query-pipeline services
//!
//! This module contains everything that touches the embedded local store or
//! rewrites SQL text:
//! - Store open/schema management
//! - Catalog lookups (connections, items, query definitions)
//! - Session instances (tokens, digests, filters)
//! - Filter composition and placeholder substitution

pub mod catalog;
pub mod filter;
pub mod session;
pub mod store;

pub use catalog::{ConnectionInfo, QueryDef};
pub use filter::{compose_filter, substitute_args};
pub use session::new_token;
pub use store::Store;
