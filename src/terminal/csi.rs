//! Control sequences and mode switching

use tracing::{debug, warn};

use super::{Terminal, TerminalEvent};
use crate::core::CursorShape;
use crate::input::{MouseCoordinates, MouseReport};
use crate::parser::{parse_int, CsiCode, CsiOp, ParseState};

impl Terminal {
    pub(super) fn dispatch_csi(&mut self, code: &CsiCode, parse: &mut ParseState) {
        let handler = match self.tables.csi.get(code) {
            Some(handler) => *handler,
            None => return self.unknown("CSI", &code.to_string()),
        };
        if parse.has_subargs() && !handler.supports_subargs() {
            debug!("Ignored CSI {} with sub-parameters", code);
            return;
        }
        match handler.op() {
            Some(op) => self.csi_op(op, parse),
            None => debug!("Ignored CSI code: {}", code),
        }
    }

    fn csi_op(&mut self, op: CsiOp, parse: &ParseState) {
        // Count-style arguments: empty and zero both mean one
        let count = |index: usize| parse.iarg(index, 1) as usize;

        match op {
            // Cursor movement
            CsiOp::CursorUp => self.cursor_up(count(0)),
            CsiOp::CursorDown => self.cursor_down(count(0)),
            CsiOp::CursorForward | CsiOp::CursorColumnRelative => self.cursor_right(count(0)),
            CsiOp::CursorBackward => self.cursor_left(count(0)),
            CsiOp::CursorNextLine => {
                // CNL
                self.cursor_down(count(0));
                self.set_cursor_column(0);
            }
            CsiOp::CursorPrecedingLine => {
                // CPL
                self.cursor_up(count(0));
                self.set_cursor_column(0);
            }
            CsiOp::CursorColumn => {
                // CHA, HPA
                self.set_cursor_column(count(0) - 1);
            }
            CsiOp::CursorPosition => {
                // CUP, HVP
                self.set_cursor_position(count(0) - 1, count(1) - 1);
            }
            CsiOp::CursorRow => {
                // VPA
                self.set_absolute_cursor_row(count(0) - 1);
            }

            // Tabs
            CsiOp::ForwardTab => {
                for _ in 0..count(0).min(self.column_count()) {
                    self.forward_tab_stop();
                }
            }
            CsiOp::BackwardTab => {
                for _ in 0..count(0).min(self.column_count()) {
                    self.backward_tab_stop();
                }
            }
            CsiOp::TabClear => match parse.iarg(0, 0) {
                0 => self.clear_tab_stop_at_cursor(),
                3 => self.clear_all_tab_stops(),
                other => debug!("Ignored TBC {}", other),
            },

            // Erasing
            CsiOp::EraseDisplay => match parse_int(parse.arg(0)).unwrap_or(0) {
                0 => self.erase_below(),
                1 => self.erase_above(),
                2 => self.clear(),
                3 => {
                    if self.config.enable_csi_j3 {
                        self.scrolled_off.clear();
                        self.emit(TerminalEvent::ClearScrollback);
                    }
                }
                other => debug!("Ignored ED {}", other),
            },
            CsiOp::EraseLine => match parse_int(parse.arg(0)).unwrap_or(0) {
                0 => self.erase_to_right(None),
                1 => self.erase_to_left(),
                2 => self.erase_line(),
                other => debug!("Ignored EL {}", other),
            },
            CsiOp::EraseChars => self.erase_to_right(Some(count(0))),

            // Insert and delete
            CsiOp::InsertBlanks => self.insert_space(count(0)),
            CsiOp::InsertLines => self.insert_lines(count(0)),
            CsiOp::DeleteLines => self.delete_lines(count(0)),
            CsiOp::DeleteChars => self.delete_chars(count(0)),
            CsiOp::ScrollUp => self.vt_scroll_up(count(0)),
            CsiOp::ScrollDown => {
                // Longer forms are mouse highlight tracking
                if parse.args.len() <= 1 {
                    self.vt_scroll_down(count(0));
                }
            }

            // Reports
            CsiOp::PrimaryAttributes => {
                if parse.iarg(0, 0) == 0 {
                    self.respond("\x1b[?1;2c");
                }
            }
            CsiOp::SecondaryAttributes => {
                if parse.iarg(0, 0) == 0 {
                    self.respond("\x1b[>0;256;0c");
                }
            }
            CsiOp::DeviceStatus => match parse.iarg(0, 0) {
                5 => self.respond("\x1b0n"),
                6 => self.report_cursor_position(),
                other => debug!("Ignored DSR {}", other),
            },
            CsiOp::DecDeviceStatus => match parse.iarg(0, 0) {
                6 => self.report_cursor_position(),
                // Printer: not ready
                15 => self.respond("\x1b[?11n"),
                // UDK: unlocked
                25 => self.respond("\x1b[?21n"),
                // Keyboard: North American
                26 => self.respond("\x1b[?12;1;0;0n"),
                // Locator: none
                53 => self.respond("\x1b[?50n"),
                other => debug!("Ignored DECDSR {}", other),
            },

            // Modes
            CsiOp::SetAnsiMode | CsiOp::ResetAnsiMode => {
                let state = op == CsiOp::SetAnsiMode;
                for arg in &parse.args {
                    match parse_int(arg) {
                        Some(mode) if self.modes.set_ansi_mode(mode, state) => {}
                        _ => self.unknown("ANSI mode", arg),
                    }
                }
            }
            CsiOp::SetDecMode | CsiOp::ResetDecMode => {
                let state = op == CsiOp::SetDecMode;
                for arg in &parse.args {
                    match parse_int(arg) {
                        Some(mode) => self.set_dec_mode(mode, state),
                        None => self.unknown("DEC mode", arg),
                    }
                }
            }

            CsiOp::Sgr => self.apply_sgr(parse),
            CsiOp::SoftReset => self.soft_reset(),
            CsiOp::CursorStyle => self.set_cursor_style(parse),
            CsiOp::ScrollRegion => self.set_scroll_region_from_args(parse),
            CsiOp::SaveCursor => self.save_cursor_and_state(),
            CsiOp::RestoreCursor => self.restore_cursor_and_state(),
            CsiOp::TileData => {
                if parse.args.is_empty() {
                    return;
                }
                match parse.iarg(0, 0) {
                    0 if parse.args.len() >= 2 => {
                        let tile = parse.arg(1).to_string();
                        self.screen_mut().text_attributes.tile = Some(tile);
                    }
                    1 => self.screen_mut().text_attributes.tile = None,
                    _ => {}
                }
            }
        }
    }

    /// CPR, 1-based
    fn report_cursor_position(&mut self) {
        let cursor = self.cursor();
        self.respond(format!("\x1b[{};{}R", cursor.row + 1, cursor.column + 1));
    }

    /// DECSCUSR
    fn set_cursor_style(&mut self, parse: &ParseState) {
        let (shape, blink) = match parse_int(parse.arg(0)).unwrap_or(0) {
            0 | 1 => (CursorShape::Block, true),
            2 => (CursorShape::Block, false),
            3 => (CursorShape::Underline, true),
            4 => (CursorShape::Underline, false),
            5 => (CursorShape::Beam, true),
            6 => (CursorShape::Beam, false),
            other => {
                warn!("Unknown cursor style: {}", other);
                return;
            }
        };
        self.modes.cursor_shape = shape;
        self.modes.cursor_blink = blink;
        self.emit(TerminalEvent::CursorShape(shape));
        self.emit(TerminalEvent::CursorBlink(blink));
    }

    /// DECSTBM. Arguments are 1-based; invalid ones are ignored.
    fn set_scroll_region_from_args(&mut self, parse: &ParseState) {
        let rows = self.row_count();
        let top = match parse.arg(0) {
            "" => 0,
            arg => match parse_int(arg) {
                Some(top) => top as usize,
                None => return,
            },
        };
        let bottom = match parse.arg(1) {
            "" => rows,
            arg => match parse_int(arg) {
                Some(0) => rows,
                Some(bottom) => bottom as usize,
                None => return,
            },
        };
        if bottom > rows || bottom <= top {
            debug!("Ignoring scroll region {}..{}", top, bottom);
            return;
        }

        self.set_scroll_region(top.saturating_sub(1), bottom - 1);
        self.set_cursor_position(0, 0);
    }

    /// DECSET / DECRST
    fn set_dec_mode(&mut self, mode: u32, state: bool) {
        match mode {
            3 => {
                // DECCOLM - 80/132 columns
                if self.modes.allow_column_width_changes {
                    let columns = if state { 132 } else { 80 };
                    let rows = self.row_count();
                    self.resize(columns, rows);
                    self.clear_home();
                    self.clear_scroll_region();
                    self.emit(TerminalEvent::ColumnCount(columns));
                }
            }
            5 => {
                // DECSCNM - Reverse Video
                self.modes.reverse_video = state;
                self.emit(TerminalEvent::ReverseVideo(state));
            }
            6 => {
                // DECOM - Origin Mode
                self.modes.origin = state;
                self.set_cursor_position(0, 0);
            }
            9 | 1000 | 1002 => {
                // X10, normal and button-event mouse tracking
                let report = match (state, mode) {
                    (false, _) => MouseReport::Disabled,
                    (true, 9) => MouseReport::Press,
                    (true, 1000) => MouseReport::Click,
                    (true, _) => MouseReport::Drag,
                };
                self.mouse.set_report(report);
                self.emit(TerminalEvent::MouseModeChanged(report));
            }
            12 => {
                // att610 - Cursor Blink
                if self.config.enable_dec12 {
                    self.modes.cursor_blink = state;
                    self.emit(TerminalEvent::CursorBlink(state));
                }
            }
            25 => {
                // DECTCEM - Cursor Visible
                self.modes.cursor_visible = state;
                self.emit(TerminalEvent::CursorVisible(state));
            }
            30 => {
                // rxvt scrollbar
                self.modes.scrollbar_visible = state;
                self.emit(TerminalEvent::ScrollbarVisible(state));
            }
            1005 => self.mouse.set_coordinates(if state {
                MouseCoordinates::Utf8
            } else {
                MouseCoordinates::X10
            }),
            1006 => self.mouse.set_coordinates(if state {
                MouseCoordinates::Sgr
            } else {
                MouseCoordinates::X10
            }),
            47 => self.set_alternate_mode(state),
            1047 => {
                // Alternate screen, cleared on the way out
                if !state && self.alternate_active {
                    self.clear();
                }
                self.set_alternate_mode(state);
            }
            1048 => {
                if state {
                    self.save_cursor_and_state();
                } else {
                    self.restore_cursor_and_state();
                }
            }
            1049 => {
                // Save cursor, switch to a cleared alternate screen
                if state {
                    self.save_cursor_and_state();
                    self.set_alternate_mode(true);
                    self.clear();
                } else {
                    self.set_alternate_mode(false);
                    self.restore_cursor_and_state();
                }
            }
            _ => {
                if !self.modes.set_dec_flag(mode, state) {
                    self.unknown("DEC mode", &mode.to_string());
                }
            }
        }
    }
}
