//! Outbound events
//!
//! Side effects the interpreter cannot carry out itself are queued as
//! [`TerminalEvent`]s for the embedder, drained with
//! [`crate::Terminal::take_events`].

use serde::{Deserialize, Serialize};

use crate::core::{CursorShape, Rgb};
use crate::input::MouseReport;

/// Something the embedder should act on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalEvent {
    Bell,
    /// OSC 0/2
    SetTitle(String),
    /// OSC 4
    SetPaletteColor { index: u8, color: Rgb },
    /// OSC 104 with an index
    ResetPaletteColor(u8),
    /// OSC 104 without arguments
    ResetPalette,
    /// OSC 10/110; `None` restores the default
    SetForegroundColor(Option<Rgb>),
    /// OSC 11/111
    SetBackgroundColor(Option<Rgb>),
    /// OSC 12/112
    SetCursorColor(Option<Rgb>),
    CursorShape(CursorShape),
    CursorBlink(bool),
    CursorVisible(bool),
    ReverseVideo(bool),
    /// Entered (`true`) or left the alternate screen
    AlternateScreen(bool),
    ScrollbarVisible(bool),
    /// DECCOLM changed the width
    ColumnCount(usize),
    /// `CSI 3 J`
    ClearScrollback,
    /// OSC 52, already base64-decoded
    ClipboardWrite(String),
    Notification(Notification),
    /// OSC 1337
    DisplayImage(InlineImage),
    MouseModeChanged(MouseReport),
}

/// Desktop notification request (OSC 9, OSC 777 notify)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Inline image transfer (iTerm2 `File=` protocol)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineImage {
    pub name: String,
    /// Declared size in bytes
    pub size: u64,
    pub preserve_aspect_ratio: bool,
    /// Display in the terminal rather than download
    pub inline: bool,
    /// `auto`, `N`, `Npx` or `N%`
    pub width: String,
    pub height: String,
    pub align: String,
    pub image_type: String,
    pub data: Vec<u8>,
}

impl Default for InlineImage {
    fn default() -> Self {
        Self {
            name: String::new(),
            size: 0,
            preserve_aspect_ratio: true,
            inline: false,
            width: "auto".to_string(),
            height: "auto".to_string(),
            align: "left".to_string(),
            image_type: String::new(),
            data: Vec::new(),
        }
    }
}
