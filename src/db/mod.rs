//! Database backends and the driver registry
//!
//! A backend is the capability "execute a query string, return columns and
//! rows". Backends are selected through a registry mapping a driver-kind tag
//! to a connect factory, so adding a backend means registering into the map
//! rather than branching on string equality.

pub mod postgres;
pub mod sqlite;

use crate::error::TeqError;
use crate::model::Grid;
use std::collections::HashMap;

pub use postgres::PostgresBackend;
pub use sqlite::SqliteBackend;

/// A connected database backend.
///
/// Every invocation is a fresh execution; backends hold no result state
/// between calls. Values are normalized into the uniform `Grid` shape:
/// NULL becomes an empty string, binary payloads are decoded as text, other
/// scalars use their default textual rendering, and column titles are
/// upper-cased.
pub trait Backend {
    fn execute(&mut self, sql: &str) -> Result<Grid, TeqError>;
}

impl std::fmt::Debug for dyn Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Backend")
    }
}

/// Factory producing a connected backend from a connection string
pub type ConnectFn = fn(&str) -> Result<Box<dyn Backend>, TeqError>;

/// Registry from driver-kind tag to connect factory
pub struct DriverRegistry {
    factories: HashMap<String, ConnectFn>,
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::with_builtin_drivers()
    }
}

impl DriverRegistry {
    /// Registry pre-populated with the built-in drivers
    pub fn with_builtin_drivers() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("sqlite", SqliteBackend::connect);
        registry.register("postgres", PostgresBackend::connect);
        registry
    }

    /// Register (or replace) a driver under a tag
    pub fn register(&mut self, tag: &str, connect: ConnectFn) {
        self.factories.insert(tag.to_string(), connect);
    }

    /// Connect using the driver registered under `driver`
    pub fn connect(&self, driver: &str, connect_str: &str) -> Result<Box<dyn Backend>, TeqError> {
        let factory = self
            .factories
            .get(driver)
            .ok_or_else(|| TeqError::Connection(format!("unknown driver '{}'", driver)))?;
        factory(connect_str)
    }
}
