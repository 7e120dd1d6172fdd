//! UI Components
//!
//! Each component encapsulates its own state, event handling, and rendering
//! logic. Components communicate through Actions rather than direct state
//! mutation.

pub mod filter_input;
pub mod results_table;

pub use filter_input::FilterInput;
pub use results_table::ResultsTable;
