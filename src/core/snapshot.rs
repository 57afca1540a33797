//! Deterministic snapshot generation
//!
//! Snapshots capture the visible terminal state in a serializable format
//! for testing and debugging. Given the same input stream, the terminal
//! must produce identical snapshots.

use serde::{Deserialize, Serialize};

use super::attrs::TextAttributes;
use super::cursor::Cursor;
use super::modes::Modes;
use super::row::Row;
use super::screen::Screen;

/// A complete snapshot of the terminal state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub columns: usize,
    pub rows: usize,
    /// Visible rows, top to bottom
    pub grid: Vec<RowSnapshot>,
    pub cursor: Cursor,
    /// Scroll region, when one is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_region: Option<(usize, usize)>,
    pub modes: Modes,
    pub title: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub alternate_screen: bool,
}

/// Snapshot of one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSnapshot {
    pub runs: Vec<RunSnapshot>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub line_overflow: bool,
}

/// Snapshot of one styled run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub text: String,
    pub width: usize,
    #[serde(default, skip_serializing_if = "TextAttributes::is_default")]
    pub attrs: TextAttributes,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl From<&Row> for RowSnapshot {
    fn from(row: &Row) -> Self {
        RowSnapshot {
            runs: row
                .runs
                .iter()
                // Empty bare runs are cursor anchors, not content
                .filter(|run| !(run.is_empty() && run.is_plain()))
                .map(|run| RunSnapshot {
                    text: run.text().to_string(),
                    width: run.width(),
                    attrs: run.attrs.clone(),
                })
                .collect(),
            line_overflow: row.line_overflow,
        }
    }
}

impl Snapshot {
    /// Grid and cursor of a screen; terminal-level fields are defaulted
    pub fn from_screen(screen: &Screen) -> Self {
        Snapshot {
            columns: screen.column_count(),
            rows: screen.row_count(),
            grid: screen.rows().iter().map(RowSnapshot::from).collect(),
            cursor: screen.cursor(),
            scroll_region: None,
            modes: Modes::default(),
            title: String::new(),
            alternate_screen: false,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Plain text of the grid, one line per row, trailing blanks trimmed
    pub fn to_text(&self) -> String {
        let mut lines: Vec<String> = self
            .grid
            .iter()
            .map(|row| {
                let line: String = row.runs.iter().map(|run| run.text.as_str()).collect();
                line.trim_end().to_string()
            })
            .collect();
        while lines.last().is_some_and(String::is_empty) {
            lines.pop();
        }
        lines.join("\n")
    }
}
