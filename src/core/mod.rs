//! Terminal Core Module
//!
//! The grid the interpreter drives. This module contains:
//! - Character widths and character-set translation
//! - Colors, the palette and text attributes
//! - Rows of styled runs and the screen buffer
//! - Cursor and mode state
//! - Serializable snapshots

mod attrs;
mod charset;
mod color;
mod cursor;
mod modes;
mod row;
mod screen;
mod snapshot;
mod width;

pub use attrs::{ResolvedColor, ResolvedStyle, TextAttributes, UnderlineStyle};
pub use charset::{character_map, CharacterMap, CharsetState, CodingSystem, Slot};
pub use color::{stock_color, ColorSource, Palette, Rgb};
pub use cursor::{Cursor, CursorShape, SavedState};
pub use modes::Modes;
pub use row::{Row, TextRun};
pub use screen::{RunPosition, Screen};
pub use snapshot::{RowSnapshot, RunSnapshot, Snapshot};
pub use width::{Segment, WidthTable};
