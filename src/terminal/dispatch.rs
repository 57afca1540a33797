//! Single-character controls and escape sequences

use tracing::{debug, warn};

use super::{Terminal, TerminalEvent};
use crate::core::Slot;
use crate::parser::{Cc1Op, EscOp, Handler, ParseFn, ParseState, StringKind};

impl Terminal {
    pub(super) fn dispatch_cc1(&mut self, c: char, parse: &mut ParseState) {
        let handler = match self.tables.cc1.get(&c) {
            Some(handler) => *handler,
            None => return self.unknown("CC1", &c.to_string()),
        };
        let Some(op) = handler.op() else {
            debug!("Ignored CC1 code: {:?}", c);
            return;
        };
        if c > '\x7f' && !self.config.enable_8bit_control {
            warn!("Ignoring 8-bit control code: 0x{:02x}", c as u32);
            return;
        }
        self.cc1_op(op, parse);
    }

    fn cc1_op(&mut self, op: Cc1Op, parse: &mut ParseState) {
        match op {
            Cc1Op::Bell => self.emit(TerminalEvent::Bell),
            Cc1Op::Backspace => self.cursor_left(1),
            Cc1Op::Tab => self.forward_tab_stop(),
            Cc1Op::FormFeed => self.form_feed(),
            Cc1Op::CarriageReturn => self.set_cursor_column(0),
            Cc1Op::ShiftOut => self.charsets.gl = Slot::G1,
            Cc1Op::ShiftIn => self.charsets.gl = Slot::G0,
            Cc1Op::Cancel => {
                if self.charsets.gl == Slot::G1 {
                    self.charsets.gl = Slot::G0;
                }
                parse.reset_parse_function();
                parse.reset_arguments();
                self.print("?");
            }
            Cc1Op::Escape => parse.func = ParseFn::Escape,
            Cc1Op::Index => self.line_feed(),
            Cc1Op::NextLine => {
                self.set_cursor_column(0);
                self.line_feed();
            }
            Cc1Op::TabSet => {
                let column = self.cursor().column;
                self.set_tab_stop(column);
            }
            Cc1Op::ReverseIndex => self.reverse_line_feed(),
            Cc1Op::Dcs => start_string(parse, ParseFn::String(StringKind::Dcs)),
            Cc1Op::Pm => start_string(parse, ParseFn::String(StringKind::Pm)),
            Cc1Op::Apc => start_string(parse, ParseFn::String(StringKind::Apc)),
            Cc1Op::Osc => start_string(parse, ParseFn::Osc),
            Cc1Op::DecId => self.respond("\x1b[?1;2c"),
            Cc1Op::Csi => self.enter_csi(parse),
        }
    }

    pub(super) fn dispatch_esc(&mut self, c: char, parse: &mut ParseState) {
        let handler = match self.tables.esc.get(&c) {
            Some(handler) => *handler,
            None => return self.unknown("ESC", &c.to_string()),
        };
        match handler {
            Handler::Ignore => debug!("Ignored ESC code: {:?}", c),
            Handler::Op(op) | Handler::OpWithSubargs(op) => self.esc_op(op, parse),
        }
    }

    fn esc_op(&mut self, op: EscOp, parse: &mut ParseState) {
        match op {
            EscOp::SkipNext => parse.func = ParseFn::EscapeSpace,
            EscOp::Hash => parse.func = ParseFn::EscapeHash,
            EscOp::Docs => parse.func = ParseFn::Docs,
            EscOp::Designate(code) => parse.func = ParseFn::Designate(code),
            EscOp::SaveCursor => self.save_cursor_and_state(),
            EscOp::RestoreCursor => self.restore_cursor_and_state(),
            EscOp::KeypadApplication => self.modes.application_keypad = true,
            EscOp::KeypadNumeric => self.modes.application_keypad = false,
            EscOp::FullReset => {
                self.full_reset();
                parse.reset_arguments();
            }
            EscOp::LockingShift2 => self.charsets.gl = Slot::G2,
            EscOp::LockingShift3 => self.charsets.gl = Slot::G3,
            EscOp::LockingShift1Right => self.charsets.gr = Slot::G1,
            EscOp::LockingShift2Right => self.charsets.gr = Slot::G2,
            EscOp::LockingShift3Right => self.charsets.gr = Slot::G3,
            EscOp::C1(op) => self.cc1_op(op, parse),
        }
    }
}

fn start_string(parse: &mut ParseState, func: ParseFn) {
    parse.reset_arguments();
    parse.func = func;
}

#[cfg(test)]
mod tests {
    use crate::config::VtConfig;
    use crate::core::{Cursor, Slot};
    use crate::terminal::{Terminal, TerminalEvent};

    fn terminal() -> Terminal {
        Terminal::new(VtConfig::with_size(15, 6))
    }

    #[test]
    fn test_bell() {
        let mut term = terminal();
        term.interpret("\x07");
        assert_eq!(term.take_events(), vec![TerminalEvent::Bell]);
    }

    #[test]
    fn test_backspace_and_carriage_return() {
        let mut term = terminal();
        term.interpret("abc\x08\x08X\rY");
        assert_eq!(term.rows_text()[0], "YXc");
        assert_eq!(term.cursor(), Cursor::new(0, 1));
    }

    #[test]
    fn test_index_keeps_column_next_line_does_not() {
        let mut term = terminal();
        term.interpret("ab\x1bDc");
        assert_eq!(term.rows_text()[1], "  c");

        term.interpret("\x1bEd");
        assert_eq!(term.rows_text()[2], "d");
    }

    #[test]
    fn test_reverse_index_at_top_inserts_line() {
        let mut term = terminal();
        term.interpret("top\x1bMnew");
        assert_eq!(term.rows_text()[0], "new");
        assert_eq!(term.rows_text()[1], "top");
    }

    #[test]
    fn test_tab_set_and_tab() {
        let mut term = terminal();
        term.interpret("\x1b[3G\x1bH\r\tx");
        assert_eq!(term.rows_text()[0], "  x");
    }

    #[test]
    fn test_decid_response() {
        let mut term = terminal();
        term.interpret("\x1bZ");
        assert_eq!(term.take_responses(), vec!["\x1b[?1;2c".to_string()]);
    }

    #[test]
    fn test_save_restore_cursor_and_charsets() {
        let mut term = terminal();
        term.interpret("\x1b[2;3H\x1b[1m\x1b(0\x1b7");
        term.interpret("\x1b[H\x1b[0m\x1b(B");
        term.interpret("\x1b8");

        assert_eq!(term.cursor(), Cursor::new(1, 2));
        assert!(term.text_attributes().bold);
        assert_eq!(term.charsets().gl_map().name, "Graphic");
    }

    #[test]
    fn test_locking_shifts() {
        let mut term = terminal();
        term.interpret("\x1bn");
        assert_eq!(term.charsets().gl, Slot::G2);
        term.interpret("\x1bo");
        assert_eq!(term.charsets().gl, Slot::G3);
        term.interpret("\x1b~");
        assert_eq!(term.charsets().gr, Slot::G1);
        term.interpret("\x1b}");
        assert_eq!(term.charsets().gr, Slot::G2);
        term.interpret("\x1b|");
        assert_eq!(term.charsets().gr, Slot::G3);
    }

    #[test]
    fn test_keypad_modes() {
        let mut term = terminal();
        term.interpret("\x1b=");
        assert!(term.modes().application_keypad);
        term.interpret("\x1b>");
        assert!(!term.modes().application_keypad);
    }

    #[test]
    fn test_escape_space_swallows_one_char() {
        let mut term = terminal();
        term.interpret("\x1b FGx");
        assert_eq!(term.rows_text()[0], "Gx");
    }

    #[test]
    fn test_ignored_and_unknown_escapes() {
        let mut term = terminal();
        term.interpret("\x1b6a\x1b!b");
        assert_eq!(term.rows_text()[0], "ab");
    }

    #[test]
    fn test_full_reset() {
        let mut term = terminal();
        term.interpret("junk\x1b[1m\x1b[?6h\x1b[2;4r\x1b(0\x1b[?1049h");
        term.interpret("\x1bc");

        assert!(!term.is_alternate_screen());
        assert_eq!(term.rows_text()[0], "");
        assert_eq!(term.cursor(), Cursor::new(0, 0));
        assert!(!term.modes().origin);
        assert_eq!(term.scroll_region(), None);
        assert!(term.text_attributes().is_default());
        assert_eq!(term.charsets().gl_map().name, "United States");
    }
}
