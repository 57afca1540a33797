//! Terminal mode flags
//!
//! Plain on/off modes toggled by SM/RM and DECSET/DECRST. Modes with side
//! effects beyond a flag (alternate screen, DECCOLM, mouse tracking,
//! cursor save) are handled by the terminal before these tables are
//! consulted.

use serde::{Deserialize, Serialize};

use super::cursor::CursorShape;

/// Terminal mode flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modes {
    /// IRM - characters are inserted rather than overwritten
    pub insert: bool,
    /// LNM - line feed also returns the carriage
    pub auto_carriage_return: bool,

    /// DECCKM - cursor keys send application sequences
    pub application_cursor: bool,
    /// DECKPAM/DECKPNM - keypad sends application sequences
    pub application_keypad: bool,
    /// DECSCNM - screen colors are inverted
    pub reverse_video: bool,
    /// DECOM - cursor addressing is relative to the scroll region
    pub origin: bool,
    /// DECAWM - text past the right margin wraps
    pub wraparound: bool,
    /// Backspace and CUB wrap to the previous line (DECSET 45)
    pub reverse_wraparound: bool,

    /// DECTCEM
    pub cursor_visible: bool,
    pub cursor_blink: bool,
    pub cursor_shape: CursorShape,

    /// DECSET 30
    pub scrollbar_visible: bool,
    /// DECSET 40, gates DECCOLM
    pub allow_column_width_changes: bool,
    /// DECBKM (DECSET 67) - backspace sends BS instead of DEL
    pub backspace_sends_backspace: bool,
    /// DECSET 1004
    pub focus_reporting: bool,
    /// DECSET 1007 - wheel scrolls send cursor keys on the alternate screen
    pub alternate_scroll: bool,
    /// DECSET 1010
    pub scroll_on_output: bool,
    /// DECSET 1011
    pub scroll_on_keystroke: bool,
    /// DECSET 1036
    pub meta_sends_escape: bool,
    /// DECSET 1039
    pub alt_sends_escape: bool,
    /// DECSET 2004
    pub bracketed_paste: bool,
}

impl Default for Modes {
    fn default() -> Self {
        Self {
            insert: false,
            auto_carriage_return: false,
            application_cursor: false,
            application_keypad: false,
            reverse_video: false,
            origin: false,
            wraparound: true,
            reverse_wraparound: false,
            cursor_visible: true,
            cursor_blink: false,
            cursor_shape: CursorShape::Block,
            scrollbar_visible: true,
            allow_column_width_changes: false,
            backspace_sends_backspace: false,
            focus_reporting: false,
            alternate_scroll: false,
            scroll_on_output: false,
            scroll_on_keystroke: true,
            meta_sends_escape: true,
            alt_sends_escape: false,
            bracketed_paste: false,
        }
    }
}

impl Modes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Modes start from defaults, with DECCOLM gating taken from config
    pub fn with_column_width_changes(allow: bool) -> Self {
        Self {
            allow_column_width_changes: allow,
            ..Self::default()
        }
    }

    /// Back to defaults for the options a soft reset covers. Keyboard,
    /// mouse and scrolling preferences are left alone.
    pub fn reset_options(&mut self) {
        let defaults = Self::default();
        self.wraparound = defaults.wraparound;
        self.reverse_wraparound = defaults.reverse_wraparound;
        self.origin = defaults.origin;
        self.auto_carriage_return = defaults.auto_carriage_return;
        self.cursor_visible = defaults.cursor_visible;
        self.insert = defaults.insert;
        self.reverse_video = defaults.reverse_video;
        self.bracketed_paste = defaults.bracketed_paste;
    }

    /// SM/RM. Returns false for unknown modes.
    pub fn set_ansi_mode(&mut self, mode: u32, state: bool) -> bool {
        match mode {
            4 => self.insert = state,
            20 => self.auto_carriage_return = state,
            _ => return false,
        }
        true
    }

    /// Flag-only DECSET/DECRST modes. Returns false for modes this table
    /// does not cover.
    pub fn set_dec_flag(&mut self, mode: u32, state: bool) -> bool {
        match mode {
            1 => self.application_cursor = state,
            5 => self.reverse_video = state,
            6 => self.origin = state,
            7 => self.wraparound = state,
            12 => self.cursor_blink = state,
            25 => self.cursor_visible = state,
            30 => self.scrollbar_visible = state,
            40 => self.allow_column_width_changes = state,
            45 => self.reverse_wraparound = state,
            67 => self.backspace_sends_backspace = state,
            1004 => self.focus_reporting = state,
            1007 => self.alternate_scroll = state,
            1010 => self.scroll_on_output = state,
            1011 => self.scroll_on_keystroke = state,
            1036 => self.meta_sends_escape = state,
            1039 => self.alt_sends_escape = state,
            2004 => self.bracketed_paste = state,
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modes_default() {
        let modes = Modes::new();
        assert!(modes.wraparound);
        assert!(!modes.origin);
        assert!(!modes.insert);
        assert!(modes.cursor_visible);
        assert!(!modes.bracketed_paste);
        assert_eq!(modes.cursor_shape, CursorShape::Block);
    }

    #[test]
    fn test_dec_flag_set_reset() {
        let mut modes = Modes::new();

        assert!(modes.set_dec_flag(2004, true));
        assert!(modes.bracketed_paste);

        assert!(modes.set_dec_flag(2004, false));
        assert!(!modes.bracketed_paste);

        assert!(modes.set_dec_flag(45, true));
        assert!(modes.reverse_wraparound);
    }

    #[test]
    fn test_ansi_modes() {
        let mut modes = Modes::new();

        assert!(modes.set_ansi_mode(4, true));
        assert!(modes.insert);
        assert!(modes.set_ansi_mode(20, true));
        assert!(modes.auto_carriage_return);

        modes.set_ansi_mode(4, false);
        assert!(!modes.insert);
    }

    #[test]
    fn test_unknown_mode() {
        let mut modes = Modes::new();
        assert!(!modes.set_dec_flag(9999, true));
        assert!(!modes.set_ansi_mode(12, true));
        assert_eq!(modes, Modes::new());
    }

    #[test]
    fn test_reset_options_keeps_keyboard_modes() {
        let mut modes = Modes::new();
        modes.set_dec_flag(1, true);
        modes.set_dec_flag(7, false);
        modes.set_dec_flag(12, true);
        modes.set_ansi_mode(4, true);

        modes.reset_options();
        assert!(modes.application_cursor);
        assert!(modes.cursor_blink);
        assert!(modes.wraparound);
        assert!(!modes.insert);
    }

    #[test]
    fn test_column_width_gate() {
        assert!(Modes::with_column_width_changes(true).allow_column_width_changes);
        assert!(!Modes::default().allow_column_width_changes);
    }
}
