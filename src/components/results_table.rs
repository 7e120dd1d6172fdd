//! Results table component
//!
//! Displays the current grid with configured column widths and owns the row
//! selection. Rows can be re-located by content digest after the grid has
//! been replaced by a filter commit.

use crate::action::Action;
use crate::component::Component;
use crate::model::{row_digest, Grid};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Scrollable table over the normalized query results
pub struct ResultsTable {
    grid: Grid,
    state: TableState,
    /// Whether the table currently receives navigation input
    pub focused: bool,
}

impl ResultsTable {
    pub fn new(grid: Grid) -> Self {
        let mut state = TableState::default();
        if !grid.rows.is_empty() {
            state.select(Some(0));
        }
        Self {
            grid,
            state,
            focused: true,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Replace the displayed grid, clamping the selection into bounds
    pub fn set_grid(&mut self, grid: Grid) {
        let selected = self.state.selected().unwrap_or(0);
        self.grid = grid;
        if self.grid.rows.is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(selected.min(self.grid.rows.len() - 1)));
        }
    }

    /// The currently selected row's cells
    pub fn selected_row(&self) -> Option<&[String]> {
        self.state
            .selected()
            .and_then(|i| self.grid.rows.get(i))
            .map(Vec::as_slice)
    }

    /// Move the selection to the first row whose content digest matches.
    /// A digest that matches nothing leaves the selection unchanged.
    pub fn select_by_digest(&mut self, digest: &str) {
        for (i, row) in self.grid.rows.iter().enumerate() {
            if row_digest(row) == digest {
                self.state.select(Some(i));
                break;
            }
        }
    }

    fn select_next(&mut self) {
        if self.grid.rows.is_empty() {
            return;
        }
        let next = match self.state.selected() {
            Some(i) => (i + 1).min(self.grid.rows.len() - 1),
            None => 0,
        };
        self.state.select(Some(next));
    }

    fn select_prev(&mut self) {
        let prev = self.state.selected().unwrap_or(0).saturating_sub(1);
        if !self.grid.rows.is_empty() {
            self.state.select(Some(prev));
        }
    }

    /// Truncate a cell to its column width (display width, not bytes)
    fn clip(text: &str, width: u16) -> String {
        if text.width() <= width as usize {
            return text.to_string();
        }
        let mut out = String::new();
        let mut used = 0;
        for c in text.chars() {
            let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
            if used + w > width as usize {
                break;
            }
            used += w;
            out.push(c);
        }
        out
    }
}

impl Component for ResultsTable {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => Some(Action::NextRow),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::PrevRow),
            KeyCode::Char('g') | KeyCode::Home => Some(Action::FirstRow),
            KeyCode::Char('G') | KeyCode::End => Some(Action::LastRow),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::NextRow => self.select_next(),
            Action::PrevRow => self.select_prev(),
            Action::FirstRow => {
                if !self.grid.rows.is_empty() {
                    self.state.select(Some(0));
                }
            }
            Action::LastRow => {
                if !self.grid.rows.is_empty() {
                    self.state.select(Some(self.grid.rows.len() - 1));
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let header = Row::new(
            self.grid
                .columns
                .iter()
                .map(|c| {
                    Cell::from(c.title.clone()).style(
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                })
                .collect::<Vec<_>>(),
        );

        let rows: Vec<Row> = self
            .grid
            .rows
            .iter()
            .map(|cells| {
                Row::new(
                    cells
                        .iter()
                        .zip(&self.grid.columns)
                        .map(|(cell, column)| Cell::from(Self::clip(cell, column.width)))
                        .collect::<Vec<_>>(),
                )
            })
            .collect();

        let widths: Vec<Constraint> = self
            .grid
            .columns
            .iter()
            .map(|c| Constraint::Length(c.width))
            .collect();

        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Results ")
                    .border_style(border_style),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::Indexed(57))
                    .fg(Color::Indexed(229)),
            );

        frame.render_stateful_widget(table, area, &mut self.state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Column;

    fn grid(rows: &[&[&str]]) -> Grid {
        Grid {
            columns: vec![Column::new("A"), Column::new("B")],
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_first_row_selected_initially() {
        let table = ResultsTable::new(grid(&[&["1", "x"], &["2", "y"]]));
        assert_eq!(table.selected_row().unwrap()[0], "1");
    }

    #[test]
    fn test_navigation_clamps_at_bounds() {
        let mut table = ResultsTable::new(grid(&[&["1", "x"], &["2", "y"]]));
        table.update(Action::PrevRow).unwrap();
        assert_eq!(table.selected_row().unwrap()[0], "1");
        table.update(Action::NextRow).unwrap();
        table.update(Action::NextRow).unwrap();
        table.update(Action::NextRow).unwrap();
        assert_eq!(table.selected_row().unwrap()[0], "2");
    }

    #[test]
    fn test_select_by_digest_moves_cursor() {
        let mut table = ResultsTable::new(grid(&[&["1", "x"], &["2", "y"]]));
        let target = crate::model::row_digest(&["2".to_string(), "y".to_string()]);
        table.select_by_digest(&target);
        assert_eq!(table.selected_row().unwrap()[0], "2");
    }

    #[test]
    fn test_unknown_digest_leaves_selection() {
        let mut table = ResultsTable::new(grid(&[&["1", "x"]]));
        table.select_by_digest("not-a-digest");
        assert_eq!(table.selected_row().unwrap()[0], "1");
    }

    #[test]
    fn test_set_grid_clamps_selection() {
        let mut table = ResultsTable::new(grid(&[&["1", "x"], &["2", "y"], &["3", "z"]]));
        table.update(Action::LastRow).unwrap();
        table.set_grid(grid(&[&["1", "x"]]));
        assert_eq!(table.selected_row().unwrap()[0], "1");
    }

    #[test]
    fn test_clip_respects_display_width() {
        assert_eq!(ResultsTable::clip("hello", 3), "hel");
        assert_eq!(ResultsTable::clip("ok", 5), "ok");
    }
}
