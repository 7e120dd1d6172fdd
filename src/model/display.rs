//! Per-query display configuration and the presentation overlay
//!
//! Query definitions optionally carry a serialized `DisplayConfig` (column
//! widths, aliases, table height). The overlay resolves each column's
//! canonical display name (alias of the upper-cased title when one exists)
//! and applies the configured width, defaulting when absent.

use crate::model::grid::{Column, Grid, DEFAULT_COLUMN_WIDTH};
use serde::Deserialize;
use std::collections::HashMap;

/// Display configuration stored per query definition
///
/// All fields are optional in the serialized form; an absent or empty
/// `config_json` yields empty maps and the query row's stored height.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisplayConfig {
    /// Column widths keyed by canonical display name
    #[serde(default)]
    pub widths: HashMap<String, u16>,
    /// Raw (upper-cased) column name to display alias
    #[serde(default)]
    pub aliases: HashMap<String, String>,
    /// Default table height in rows; 0 means "use the stored height column"
    #[serde(default)]
    pub height: u16,
}

impl DisplayConfig {
    /// Parse the serialized config, falling back to `stored_height` for the
    /// height when the JSON is absent, empty, or carries a height of 0.
    ///
    /// Malformed JSON is a hard error surfaced to the caller.
    pub fn from_json(
        config_json: Option<&str>,
        stored_height: u16,
    ) -> Result<Self, serde_json::Error> {
        let raw = match config_json {
            Some(s) if !s.is_empty() => s,
            _ => {
                return Ok(Self {
                    height: stored_height,
                    ..Self::default()
                })
            }
        };

        let mut config: DisplayConfig = serde_json::from_str(raw)?;
        if config.height == 0 {
            config.height = stored_height;
        }
        Ok(config)
    }

    /// Resolve the canonical display name of an upper-cased column title:
    /// its alias when one is configured, else the title itself.
    pub fn canonical_name<'a>(&'a self, title: &'a str) -> &'a str {
        self.aliases.get(title).map(String::as_str).unwrap_or(title)
    }
}

/// Overlay configured widths onto the grid's columns.
///
/// Width lookup goes through the canonical display name, so a width
/// configured under `"STATUS"` applies to a column physically named
/// `"status"` (titles are upper-cased by the executor).
pub fn apply_display(grid: &mut Grid, config: &DisplayConfig) {
    for column in &mut grid.columns {
        // Comparison is case-insensitive via upper-casing
        let title = column.title.to_uppercase();
        let canonical = config.canonical_name(&title);
        column.width = config
            .widths
            .get(canonical)
            .copied()
            .unwrap_or(DEFAULT_COLUMN_WIDTH);
    }
}

/// Transpose the first row into a two-column field/value view.
///
/// Only the first row is used regardless of table selection; multi-row
/// pivoting is unsupported. An empty grid is returned unchanged.
pub fn pivot_first_row(grid: &Grid) -> Grid {
    let first = match grid.rows.first() {
        Some(row) => row,
        None => return grid.clone(),
    };

    let rows = grid
        .columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let value = first.get(i).cloned().unwrap_or_default();
            vec![column.title.clone(), value]
        })
        .collect();

    Grid {
        columns: vec![
            Column {
                title: "COLUMN".to_string(),
                width: 30,
            },
            Column {
                title: "VALUE".to_string(),
                width: 50,
            },
        ],
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::grid::Column;

    fn grid(titles: &[&str], rows: &[&[&str]]) -> Grid {
        Grid {
            columns: titles.iter().map(|t| Column::new(*t)).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_absent_config_yields_empty_maps_and_stored_height() {
        let config = DisplayConfig::from_json(None, 12).unwrap();
        assert!(config.widths.is_empty());
        assert!(config.aliases.is_empty());
        assert_eq!(config.height, 12);

        let config = DisplayConfig::from_json(Some(""), 7).unwrap();
        assert_eq!(config.height, 7);
    }

    #[test]
    fn test_malformed_config_is_a_hard_error() {
        assert!(DisplayConfig::from_json(Some("{not json"), 10).is_err());
    }

    #[test]
    fn test_zero_json_height_falls_back_to_stored_height() {
        let config =
            DisplayConfig::from_json(Some(r#"{"widths":{},"aliases":{},"height":0}"#), 15)
                .unwrap();
        assert_eq!(config.height, 15);

        let config = DisplayConfig::from_json(Some(r#"{"height":4}"#), 15).unwrap();
        assert_eq!(config.height, 4);
    }

    #[test]
    fn test_widths_apply_by_canonical_name_with_default() {
        // NAME configured at 30, everything else defaults to 20
        let mut g = grid(&["ID", "NAME"], &[&["1", "alice"]]);
        let config =
            DisplayConfig::from_json(Some(r#"{"widths":{"NAME":30},"aliases":{}}"#), 10).unwrap();
        apply_display(&mut g, &config);
        assert_eq!(g.columns[0].width, 20);
        assert_eq!(g.columns[1].width, 30);
    }

    #[test]
    fn test_width_resolution_is_case_insensitive() {
        let mut g = grid(&["status"], &[&["active"]]);
        let config =
            DisplayConfig::from_json(Some(r#"{"widths":{"STATUS":25}}"#), 10).unwrap();
        apply_display(&mut g, &config);
        assert_eq!(g.columns[0].width, 25);
    }

    #[test]
    fn test_width_resolution_goes_through_alias() {
        let mut g = grid(&["STATUS"], &[&["active"]]);
        let config = DisplayConfig::from_json(
            Some(r#"{"widths":{"STATE":33},"aliases":{"STATUS":"STATE"}}"#),
            10,
        )
        .unwrap();
        apply_display(&mut g, &config);
        assert_eq!(g.columns[0].width, 33);
    }

    #[test]
    fn test_pivot_uses_first_row_only() {
        let g = grid(&["ID", "NAME"], &[&["1", "alice"], &["2", "bob"]]);
        let pivoted = pivot_first_row(&g);
        assert_eq!(pivoted.columns.len(), 2);
        assert_eq!(pivoted.columns[0].title, "COLUMN");
        assert_eq!(pivoted.columns[1].title, "VALUE");
        assert_eq!(
            pivoted.rows,
            vec![
                vec!["ID".to_string(), "1".to_string()],
                vec!["NAME".to_string(), "alice".to_string()],
            ]
        );
    }

    #[test]
    fn test_pivot_of_empty_grid_is_unchanged() {
        let g = grid(&["ID"], &[]);
        assert_eq!(pivot_first_row(&g), g);
    }
}
