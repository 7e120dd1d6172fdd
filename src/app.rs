//! Root application component - the interaction controller
//!
//! The App binds keyboard focus (table vs. filter input) and drives the
//! query pipeline on commit:
//! - commit while the filter has focus: compose → execute → overlay display
//!   config, then persist the selected row's digest with the filter text
//! - commit while the table has focus: save the selected row's cells as
//!   column config and record the session instance
//!
//! Errors during interactive filtering or saving never exit: they are shown
//! as a transient message and the displayed state is preserved.

use crate::action::Action;
use crate::component::Component;
use crate::components::{FilterInput, ResultsTable};
use crate::db::Backend;
use crate::error::TeqError;
use crate::model::{apply_display, pivot_first_row, row_digest, Grid};
use crate::services::{compose_filter, Store};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::Line,
    Frame,
};
use tracing::{info, warn};

/// Which sub-surface receives input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Table,
    Filter,
}

/// Presentation mode: regular table or a first-row field/value card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Table,
    Card,
}

/// Everything the startup pipeline resolves before the first render
pub struct SessionStart {
    pub grid: Grid,
    /// Effective initial filter (explicit flag, or the one stored under the
    /// session token)
    pub filter: String,
    /// Row digest stored under the session token, for cursor reselection
    pub resume_digest: Option<String>,
    /// Table body height in rows, defaulted and clamped
    pub height: u16,
}

/// Resolve the initial filter and grid for a (possibly resumed) session.
///
/// An explicit filter wins over the one stored under the session token;
/// otherwise the stored filter is re-applied before the first render. The
/// stored row digest, when present, is returned so the caller can move the
/// cursor back to the confirmed row. A miss on either lookup is a
/// warn-and-continue, never fatal.
pub fn prepare_session(
    store: &Store,
    backend: &mut dyn Backend,
    query_id: i64,
    sql_name: &str,
    base_query: &str,
    explicit_filter: &str,
    token: &str,
    view: ViewMode,
) -> Result<SessionStart, TeqError> {
    let mut filter = explicit_filter.to_string();
    if filter.is_empty() && !token.is_empty() {
        match store.lookup_filter(token, query_id) {
            Ok(stored) if !stored.is_empty() => {
                info!(filter = %stored, "filter restored from session");
                filter = stored;
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "no stored filter for session"),
        }
    }

    let config = store.query_display_config(sql_name)?;
    let sql = compose_filter(base_query, &filter);
    let mut grid = backend.execute(&sql)?;
    apply_display(&mut grid, &config);
    if view == ViewMode::Card {
        grid = pivot_first_row(&grid);
    }

    let mut height = config.height;
    if height == 0 {
        height = 10;
    }
    if grid.rows.len() < 10 {
        height = grid.rows.len() as u16;
    }

    let resume_digest = if token.is_empty() {
        None
    } else {
        match store.lookup_digest(token, query_id) {
            Ok(digest) => Some(digest),
            Err(e) => {
                warn!(error = %e, "no stored row for session");
                None
            }
        }
    };

    Ok(SessionStart {
        grid,
        filter,
        resume_digest,
        height,
    })
}

/// Everything resolved at startup that the controller needs per commit
pub struct SessionContext {
    pub item_name: String,
    pub sql_name: String,
    pub base_query: String,
    pub connection_id: i64,
    pub query_id: i64,
    pub view: ViewMode,
    /// Table body height in rows (already defaulted/clamped by startup)
    pub table_height: u16,
}

/// Main application state - the two-surface state machine
pub struct App {
    store: Store,
    backend: Box<dyn Backend>,
    ctx: SessionContext,

    pub table: ResultsTable,
    pub filter_input: FilterInput,
    focus: Focus,

    /// Effective session token; empty until the first instance save when no
    /// token was supplied on the command line
    token: String,

    /// Flag to indicate the app should quit
    pub should_quit: bool,
    /// Transient error message
    pub error: Option<String>,
    /// Transient status message
    pub status_message: Option<String>,
}

impl App {
    pub fn new(
        store: Store,
        backend: Box<dyn Backend>,
        ctx: SessionContext,
        initial_grid: Grid,
        initial_filter: &str,
        token: &str,
    ) -> Self {
        let mut table = ResultsTable::new(initial_grid);
        table.focused = true;
        Self {
            store,
            backend,
            ctx,
            table,
            filter_input: FilterInput::new(initial_filter),
            focus: Focus::Table,
            token: token.to_string(),
            should_quit: false,
            error: None,
            status_message: None,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Move the table cursor to the row with the given content digest
    pub fn select_row_by_digest(&mut self, digest: &str) {
        self.table.select_by_digest(digest);
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.table.focused = focus == Focus::Table;
        self.filter_input.focused = focus == Focus::Filter;
    }

    /// Compose the filter onto the base query, execute it, and overlay the
    /// stored display configuration (pivoting in card view).
    ///
    /// An empty filter executes the base query unchanged, so the result is
    /// byte-identical to omitting the filter.
    pub fn run_filter(&mut self, filter: &str) -> Result<Grid, TeqError> {
        // Re-read the config each commit so edits made by a concurrent
        // invocation are picked up; a broken config falls back to defaults
        // here because the query itself can still run.
        let config = self
            .store
            .query_display_config(&self.ctx.sql_name)
            .unwrap_or_default();

        let sql = compose_filter(&self.ctx.base_query, filter);
        let mut grid = self.backend.execute(&sql)?;
        apply_display(&mut grid, &config);

        if self.ctx.view == ViewMode::Card {
            grid = pivot_first_row(&grid);
        }
        Ok(grid)
    }

    /// Commit while the filter has focus: refresh the displayed grid and
    /// persist the session instance. On failure the prior state stays.
    fn commit_filter(&mut self) {
        let filter = self.filter_input.value().to_string();
        match self.run_filter(&filter) {
            Ok(grid) => {
                self.table.set_grid(grid);
                self.error = None;

                if let Some(row) = self.table.selected_row() {
                    let digest = row_digest(row);
                    match self
                        .store
                        .save_instance(self.ctx.query_id, &digest, &self.token, &filter)
                    {
                        Ok(token) => {
                            info!(token = %token, digest = %digest, "instance saved on filter commit");
                            self.status_message = Some(format!("session {}", token));
                            self.token = token;
                        }
                        Err(e) => {
                            warn!(error = %e, "saving instance failed");
                            self.error = Some(e.to_string());
                        }
                    }
                }
            }
            Err(e) => {
                self.error = Some(e.to_string());
            }
        }
    }

    /// Commit while the table has focus: save the selected row's cells as
    /// column config (per configured aliases) and record the instance.
    fn confirm_row(&mut self) {
        let row = match self.table.selected_row() {
            Some(row) => row.to_vec(),
            None => return,
        };

        // Allocate the token up front so the column-config rows and the
        // session instance share it.
        if self.token.is_empty() {
            self.token = crate::services::new_token();
        }

        let config = self
            .store
            .query_display_config(&self.ctx.sql_name)
            .unwrap_or_default();

        let result = self
            .store
            .save_column_config(
                &self.ctx.item_name,
                self.ctx.connection_id,
                &self.token,
                &row,
                &self.table.grid().columns,
                &config.aliases,
            )
            .and_then(|_| {
                let digest = row_digest(&row);
                self.store.save_instance(
                    self.ctx.query_id,
                    &digest,
                    &self.token,
                    self.filter_input.value(),
                )
            });

        match result {
            Ok(token) => {
                info!(token = %token, "row confirmed");
                self.status_message = Some(format!("saved · session {}", token));
                self.error = None;
                self.token = token;
            }
            Err(e) => {
                warn!(error = %e, "row confirmation failed");
                self.error = Some(e.to_string());
            }
        }
    }
}

impl Component for App {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(Some(Action::Quit));
        }

        let action = match key.code {
            KeyCode::Tab => Some(Action::ToggleFocus),
            KeyCode::Esc => Some(Action::FocusTable),
            KeyCode::Enter => match self.focus {
                Focus::Filter => Some(Action::CommitFilter),
                Focus::Table => Some(Action::ConfirmRow),
            },
            KeyCode::Char('q') if self.focus == Focus::Table => Some(Action::Quit),
            _ => match self.focus {
                Focus::Table => self.table.handle_key_event(key)?,
                Focus::Filter => self.filter_input.handle_key_event(key)?,
            },
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ToggleFocus => {
                let next = match self.focus {
                    Focus::Table => Focus::Filter,
                    Focus::Filter => Focus::Table,
                };
                self.set_focus(next);
            }
            Action::FocusTable => self.set_focus(Focus::Table),
            Action::CommitFilter => self.commit_filter(),
            Action::ConfirmRow => self.confirm_row(),
            Action::NextRow | Action::PrevRow | Action::FirstRow | Action::LastRow => {
                return self.table.update(action);
            }
            Action::FilterInput(_) | Action::FilterBackspace => {
                return self.filter_input.update(action);
            }
            Action::Tick | Action::Resize(..) => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        // Table body + header + borders, filter line, message line
        let table_area_height = self.ctx.table_height + 3;
        let [table_area, filter_area, message_area] = Layout::vertical([
            Constraint::Length(table_area_height),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(area);

        self.table.draw(frame, table_area)?;
        self.filter_input.draw(frame, filter_area)?;

        let message = if let Some(error) = &self.error {
            Line::styled(error.clone(), Style::default().fg(Color::Red))
        } else if let Some(status) = &self.status_message {
            Line::styled(status.clone(), Style::default().fg(Color::Yellow))
        } else {
            Line::styled(
                "tab: switch focus · enter: commit · q: quit",
                Style::default().fg(Color::DarkGray),
            )
        };
        frame.render_widget(message, message_area);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteBackend;

    const BASE_QUERY: &str = "SELECT id, name, status FROM users";

    /// In-memory catalog plus an in-memory sqlite data source with three
    /// users
    fn seeded_store_and_backend() -> (Store, Box<dyn Backend>) {
        let store = Store::open_in_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO connections (id, driver, name, connect)
                 VALUES (1, 'sqlite', 'local', ':memory:')",
                [],
            )
            .unwrap();
        store
            .conn
            .execute(
                "INSERT INTO queries (id, item_id, name, query_text, config_json, height)
                 VALUES (1, NULL, 'users', ?1,
                         '{\"widths\":{\"USER_NAME\":30},\"aliases\":{\"NAME\":\"USER_NAME\"}}', 10)",
                [BASE_QUERY],
            )
            .unwrap();

        let mut backend = SqliteBackend::connect(":memory:").unwrap();
        backend
            .execute("CREATE TABLE users (id INTEGER, name TEXT, status TEXT)")
            .unwrap();
        backend
            .execute(
                "INSERT INTO users VALUES
                 (1, 'alice', 'active'), (2, 'bob', 'inactive'), (3, 'carol', 'active')",
            )
            .unwrap();
        (store, backend)
    }

    /// App built through the startup pipeline, no filter and no session
    fn test_app() -> App {
        let (store, mut backend) = seeded_store_and_backend();
        let start = prepare_session(
            &store,
            backend.as_mut(),
            1,
            "users",
            BASE_QUERY,
            "",
            "",
            ViewMode::Table,
        )
        .unwrap();

        let ctx = SessionContext {
            item_name: "user_item".to_string(),
            sql_name: "users".to_string(),
            base_query: BASE_QUERY.to_string(),
            connection_id: 1,
            query_id: 1,
            view: ViewMode::Table,
            table_height: start.height,
        };
        App::new(store, backend, ctx, start.grid, &start.filter, "")
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_toggle_focus_swaps_surfaces_without_side_effects() {
        let mut app = test_app();
        assert_eq!(app.focus(), Focus::Table);
        app.update(Action::ToggleFocus).unwrap();
        assert_eq!(app.focus(), Focus::Filter);
        assert_eq!(app.table.grid().rows.len(), 3);
        app.update(Action::FocusTable).unwrap();
        assert_eq!(app.focus(), Focus::Table);
    }

    #[test]
    fn test_enter_routes_by_focus() {
        let mut app = test_app();
        let action = app.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert_eq!(action, Some(Action::ConfirmRow));
        app.update(Action::ToggleFocus).unwrap();
        let action = app.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert_eq!(action, Some(Action::CommitFilter));
    }

    #[test]
    fn test_q_quits_only_while_table_focused() {
        let mut app = test_app();
        assert_eq!(
            app.handle_key_event(key(KeyCode::Char('q'))).unwrap(),
            Some(Action::Quit)
        );
        app.update(Action::ToggleFocus).unwrap();
        assert_eq!(
            app.handle_key_event(key(KeyCode::Char('q'))).unwrap(),
            Some(Action::FilterInput('q'))
        );
    }

    #[test]
    fn test_commit_filter_replaces_rows_and_saves_instance() {
        let mut app = test_app();
        app.update(Action::ToggleFocus).unwrap();
        for c in "status = 'active'".chars() {
            app.update(Action::FilterInput(c)).unwrap();
        }
        app.update(Action::CommitFilter).unwrap();

        assert!(app.error.is_none());
        assert_eq!(app.table.grid().rows.len(), 2);
        // Configured width applied through the pipeline
        assert_eq!(app.table.grid().columns[1].title, "NAME");
        assert_eq!(app.table.grid().columns[1].width, 30);

        // A token was allocated and the filter is recorded under it
        let token = app.token().to_string();
        assert!(!token.is_empty());
        assert_eq!(
            app.store.lookup_filter(&token, 1).unwrap(),
            "status = 'active'"
        );
    }

    #[test]
    fn test_failed_filter_preserves_displayed_state() {
        let mut app = test_app();
        app.update(Action::ToggleFocus).unwrap();
        for c in "no_such_column = 1".chars() {
            app.update(Action::FilterInput(c)).unwrap();
        }
        app.update(Action::CommitFilter).unwrap();

        assert!(app.error.is_some());
        assert_eq!(app.table.grid().rows.len(), 3);
        assert!(app.token().is_empty());
    }

    #[test]
    fn test_empty_filter_commit_matches_unfiltered_grid() {
        let mut app = test_app();
        let unfiltered = app.run_filter("").unwrap();
        assert_eq!(unfiltered, app.table.grid().clone());
    }

    #[test]
    fn test_confirm_row_saves_aliased_columns_and_instance() {
        let mut app = test_app();
        app.update(Action::NextRow).unwrap(); // bob
        app.update(Action::ConfirmRow).unwrap();

        let token = app.token().to_string();
        assert!(!token.is_empty());

        // Only the aliased NAME column was saved, under its alias
        let (variable, value): (String, String) = app
            .store
            .conn
            .query_row(
                "SELECT variable, value FROM column_config WHERE token = ?1",
                [&token],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(variable, "USER_NAME");
        assert_eq!(value, "bob");

        // And the instance records the row digest
        let digest = app.store.lookup_digest(&token, 1).unwrap();
        let expected = row_digest(&[
            "2".to_string(),
            "bob".to_string(),
            "inactive".to_string(),
        ]);
        assert_eq!(digest, expected);
    }

    #[test]
    fn test_confirm_row_twice_keeps_one_instance_row() {
        let mut app = test_app();
        app.update(Action::ConfirmRow).unwrap();
        app.update(Action::NextRow).unwrap();
        app.update(Action::ConfirmRow).unwrap();

        let count: i64 = app
            .store
            .conn
            .query_row("SELECT COUNT(*) FROM session_instance", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_card_view_pivots_first_row() {
        let mut app = test_app();
        app.ctx.view = ViewMode::Card;
        let grid = app.run_filter("").unwrap();
        assert_eq!(grid.columns[0].title, "COLUMN");
        assert_eq!(grid.rows.len(), 3); // one row per original column
        assert_eq!(grid.rows[0], vec!["ID".to_string(), "1".to_string()]);
    }

    #[test]
    fn test_resumed_session_reapplies_filter_and_reselects_row() {
        let (store, mut backend) = seeded_store_and_backend();
        let carol = row_digest(&[
            "3".to_string(),
            "carol".to_string(),
            "active".to_string(),
        ]);
        let token = store
            .save_instance(1, &carol, "", "status = 'active'")
            .unwrap();

        let start = prepare_session(
            &store,
            backend.as_mut(),
            1,
            "users",
            BASE_QUERY,
            "",
            &token,
            ViewMode::Table,
        )
        .unwrap();

        // The stored filter is in effect before the first render
        assert_eq!(start.filter, "status = 'active'");
        assert_eq!(start.grid.rows.len(), 2);
        assert_eq!(start.height, 2);
        assert_eq!(start.resume_digest.as_deref(), Some(carol.as_str()));

        // And the stored digest re-locates the confirmed row
        let mut table = ResultsTable::new(start.grid);
        table.select_by_digest(&start.resume_digest.unwrap());
        assert_eq!(table.selected_row().unwrap()[1], "carol");
    }

    #[test]
    fn test_explicit_filter_wins_over_stored_filter() {
        let (store, mut backend) = seeded_store_and_backend();
        let token = store.save_instance(1, "stale", "", "id = 3").unwrap();

        let start = prepare_session(
            &store,
            backend.as_mut(),
            1,
            "users",
            BASE_QUERY,
            "id = 1",
            &token,
            ViewMode::Table,
        )
        .unwrap();

        assert_eq!(start.filter, "id = 1");
        assert_eq!(start.grid.rows.len(), 1);
        assert_eq!(start.grid.rows[0][1], "alice");
    }

    #[test]
    fn test_unknown_token_starts_unfiltered() {
        let (store, mut backend) = seeded_store_and_backend();
        let start = prepare_session(
            &store,
            backend.as_mut(),
            1,
            "users",
            BASE_QUERY,
            "",
            "no-such-token",
            ViewMode::Table,
        )
        .unwrap();

        assert_eq!(start.filter, "");
        assert_eq!(start.grid.rows.len(), 3);
        assert!(start.resume_digest.is_none());
    }

    #[test]
    fn test_select_row_by_digest_after_refilter() {
        let mut app = test_app();
        let digest = row_digest(&[
            "3".to_string(),
            "carol".to_string(),
            "active".to_string(),
        ]);
        app.select_row_by_digest(&digest);
        assert_eq!(app.table.selected_row().unwrap()[0], "3");
    }
}
