//! Model layer - result grids and display configuration
//!
//! This module contains the data shapes the rest of the app works on:
//! - `Grid` / `Column` - the uniform row/column shape every backend produces
//! - `row_digest` - content-based row identity
//! - `DisplayConfig` - per-query widths/aliases/height overlay

pub mod display;
pub mod grid;

// Re-export commonly used types
pub use display::{apply_display, pivot_first_row, DisplayConfig};
pub use grid::{row_digest, Column, Grid, DEFAULT_COLUMN_WIDTH};
