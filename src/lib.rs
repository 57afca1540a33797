//! Mochi VT Interpreter Library
//!
//! An xterm-compatible control-sequence interpreter driving a styled
//! screen buffer. Bytes go in through [`Terminal::interpret_bytes`] (or
//! already-decoded text through [`Terminal::interpret`]); the grid,
//! outbound replies and host events come out.
//!
//! - `core`: screen buffer, styled runs, width table, charsets, colors
//! - `parser`: parse state, dispatch tables, incremental UTF-8 decoding
//! - `terminal`: the interpreter and its sequence handlers
//! - `input`: mouse report encoding

pub mod clock;
pub mod config;
pub mod core;
pub mod error;
pub mod input;
pub mod parser;
pub mod terminal;

pub use config::VtConfig;
pub use error::{Error, Result};
pub use input::{
    MouseCoordinates, MouseEncoder, MouseEvent, MouseEventKind, MouseModifiers, MouseReport,
};
pub use terminal::{InlineImage, Notification, Terminal, TerminalEvent};
