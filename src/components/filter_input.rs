//! Filter input component
//!
//! Single-line editor for the filter predicate. Input characters are routed
//! here only while the input has focus; committing is handled by the App.

use crate::action::Action;
use crate::component::Component;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

const MAX_FILTER_LEN: usize = 500;

/// One-line filter text input
#[derive(Default)]
pub struct FilterInput {
    value: String,
    /// Whether the input currently receives typed characters
    pub focused: bool,
}

impl FilterInput {
    pub fn new(initial: &str) -> Self {
        Self {
            value: initial.to_string(),
            focused: false,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Display-width offset of the cursor, clamped to the inner area width
    fn cursor_offset(&self, inner_width: usize) -> u16 {
        self.value.width().min(inner_width) as u16
    }
}

impl Component for FilterInput {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char(c) => Some(Action::FilterInput(c)),
            KeyCode::Backspace => Some(Action::FilterBackspace),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::FilterInput(c) => {
                // Characters, not bytes: multibyte input counts once
                if self.value.chars().count() < MAX_FILTER_LEN {
                    self.value.push(c);
                }
            }
            Action::FilterBackspace => {
                self.value.pop();
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let paragraph = Paragraph::new(self.value.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Filter ")
                .border_style(border_style),
        );
        frame.render_widget(paragraph, area);

        if self.focused {
            // Put the terminal cursor at the end of the text
            let inner = (area.width as usize).saturating_sub(2);
            let x = area.x + 1 + self.cursor_offset(inner);
            frame.set_cursor_position((x, area.y + 1));
        }
        Ok(())
    }
}
