//! Rows of styled text runs
//!
//! A row is a list of runs, each holding text in a single style. The
//! run's display width is cached and must be refreshed through
//! [`TextRun::set_text`] whenever the text changes.

use serde::{Deserialize, Serialize};

use super::attrs::TextAttributes;
use super::width::WidthTable;

/// Text in a single style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    text: String,
    width: usize,
    pub attrs: TextAttributes,
}

impl TextRun {
    pub fn new(text: impl Into<String>, attrs: TextAttributes, wt: &WidthTable) -> Self {
        let text = text.into();
        let width = wt.str_width(&text);
        Self { text, width, attrs }
    }

    /// An unstyled run
    pub fn plain(text: impl Into<String>, wt: &WidthTable) -> Self {
        Self::new(text, TextAttributes::default(), wt)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Display width in columns
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Unstyled runs are the equivalent of bare text between styled spans
    pub fn is_plain(&self) -> bool {
        self.attrs.is_default()
    }

    pub fn set_text(&mut self, text: impl Into<String>, wt: &WidthTable) {
        self.text = text.into();
        self.width = wt.str_width(&self.text);
    }

    pub fn push_str(&mut self, text: &str, wt: &WidthTable) {
        self.text.push_str(text);
        self.width += wt.str_width(text);
    }

    pub fn insert_str(&mut self, byte_index: usize, text: &str, wt: &WidthTable) {
        self.text.insert_str(byte_index, text);
        self.width += wt.str_width(text);
    }
}

/// One screen row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub runs: Vec<TextRun>,
    /// Content continues on the next row because of autowrap
    pub line_overflow: bool,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total display width of the row's content
    pub fn width(&self) -> usize {
        self.runs.iter().map(TextRun::width).sum()
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(TextRun::text).collect()
    }

    /// Column at which run `index` starts
    pub fn run_start(&self, index: usize) -> usize {
        self.runs[..index.min(self.runs.len())]
            .iter()
            .map(TextRun::width)
            .sum()
    }

    /// Drop every run
    pub fn clear(&mut self) {
        self.runs.clear();
        self.line_overflow = false;
    }
}
