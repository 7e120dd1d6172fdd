//! Action enum - All possible application actions
//!
//! Actions are discrete operations the application can perform. Components
//! emit Actions in response to key events, and the App processes them to
//! update state. The interaction surface is deliberately closed: two focus
//! targets, commit, and quit.

use std::fmt;

/// All possible actions in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // ─────────────────────────────────────────────────────────────────────────
    // App Lifecycle
    // ─────────────────────────────────────────────────────────────────────────
    /// Regular tick for time-based updates
    Tick,
    /// Terminal was resized
    Resize(u16, u16),
    /// Terminate the event loop
    Quit,

    // ─────────────────────────────────────────────────────────────────────────
    // Focus
    // ─────────────────────────────────────────────────────────────────────────
    /// Swap focus between the table and the filter input
    ToggleFocus,
    /// Return focus to the table
    FocusTable,

    // ─────────────────────────────────────────────────────────────────────────
    // Table Navigation
    // ─────────────────────────────────────────────────────────────────────────
    /// Select the next row
    NextRow,
    /// Select the previous row
    PrevRow,
    /// Jump to the first row
    FirstRow,
    /// Jump to the last row
    LastRow,

    // ─────────────────────────────────────────────────────────────────────────
    // Filter Input
    // ─────────────────────────────────────────────────────────────────────────
    /// Append a character to the filter text
    FilterInput(char),
    /// Remove the last character from the filter text
    FilterBackspace,
    /// Run the current filter against the base query
    CommitFilter,

    // ─────────────────────────────────────────────────────────────────────────
    // Row Confirmation
    // ─────────────────────────────────────────────────────────────────────────
    /// Save the selected row's values and record the session instance
    ConfirmRow,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Tick => write!(f, "Tick"),
            Action::Resize(w, h) => write!(f, "Resize({}, {})", w, h),
            Action::Quit => write!(f, "Quit"),
            Action::ToggleFocus => write!(f, "ToggleFocus"),
            Action::FocusTable => write!(f, "FocusTable"),
            Action::NextRow => write!(f, "NextRow"),
            Action::PrevRow => write!(f, "PrevRow"),
            Action::FirstRow => write!(f, "FirstRow"),
            Action::LastRow => write!(f, "LastRow"),
            Action::FilterInput(c) => write!(f, "FilterInput('{}')", c),
            Action::FilterBackspace => write!(f, "FilterBackspace"),
            Action::CommitFilter => write!(f, "CommitFilter"),
            Action::ConfirmRow => write!(f, "ConfirmRow"),
        }
    }
}
