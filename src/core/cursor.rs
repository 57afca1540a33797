//! Cursor state
//!
//! The screen cursor carries an `overflow` flag: the cursor sits on the
//! last column but logically one past it, and the next printable
//! character wraps first. Saved state (DECSC / `CSI s`) is a deep copy of
//! the cursor, the attributes and the character-set selection.

use serde::{Deserialize, Serialize};

use super::attrs::TextAttributes;
use super::charset::CharsetState;

/// Cursor shape set by DECSCUSR or OSC 50
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorShape {
    #[default]
    Block,
    Underline,
    Beam,
}

/// Cursor position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cursor {
    /// Row (0-indexed)
    pub row: usize,
    /// Column (0-indexed)
    pub column: usize,
    /// Pending wrap: the next printable character starts a new line
    pub overflow: bool,
}

impl Cursor {
    pub fn new(row: usize, column: usize) -> Self {
        Self {
            row,
            column,
            overflow: false,
        }
    }
}

/// Payload of a cursor save
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedState {
    pub cursor: Cursor,
    pub attrs: TextAttributes,
    pub charsets: CharsetState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_new() {
        let cursor = Cursor::new(3, 7);
        assert_eq!((cursor.row, cursor.column), (3, 7));
        assert!(!cursor.overflow);
    }

    #[test]
    fn test_saved_state_is_deep_copy() {
        let mut attrs = TextAttributes::default();
        attrs.bold = true;
        let saved = SavedState {
            cursor: Cursor::new(1, 2),
            attrs: attrs.clone(),
            charsets: CharsetState::default(),
        };
        attrs.bold = false;
        assert!(saved.attrs.bold);
    }
}
