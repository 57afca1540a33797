//! Mouse Report Encoding
//!
//! Translates mouse events into the reports applications ask for with
//! DECSET 9/1000/1002 (which events) and 1005/1006 (how coordinates are
//! written).
//!
//! # Report modes
//!
//! - Press: button presses only, no modifiers, no releases
//! - Click: presses and releases
//! - Drag: presses, releases, and motion while a button is held
//!
//! # Coordinates
//!
//! - X10: one character per coordinate, value + 32, capped at 127 so the
//!   stream stays 7-bit
//! - UTF-8: as X10 but capped at 2047
//! - SGR: decimal numbers, `CSI < b ; x ; y M` for presses and `m` for
//!   releases

use serde::{Deserialize, Serialize};

/// Which mouse events are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MouseReport {
    #[default]
    Disabled,
    /// DECSET 9
    Press,
    /// DECSET 1000
    Click,
    /// DECSET 1002
    Drag,
}

/// How coordinates are encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MouseCoordinates {
    #[default]
    X10,
    /// DECSET 1005
    Utf8,
    /// DECSET 1006
    Sgr,
}

/// Mouse event type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    Down,
    Up,
    Move,
    Wheel,
    Click,
    DoubleClick,
}

/// Modifier keys held during a mouse event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseModifiers {
    pub shift: bool,
    pub meta: bool,
    pub alt: bool,
    pub ctrl: bool,
}

/// Bit for the left button in [`MouseEvent::buttons`]
pub const BUTTON_LEFT: u8 = 0x1;
/// Bit for the right button in [`MouseEvent::buttons`]
pub const BUTTON_RIGHT: u8 = 0x2;
/// Bit for the middle button in [`MouseEvent::buttons`]
pub const BUTTON_MIDDLE: u8 = 0x4;

/// A mouse event in terminal cell coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    /// Button that changed state: 0 left, 1 middle, 2 right
    pub button: u8,
    /// Buttons currently held, see [`BUTTON_LEFT`] and friends
    pub buttons: u8,
    /// 1-based cell row
    pub row: u32,
    /// 1-based cell column
    pub column: u32,
    pub modifiers: MouseModifiers,
    /// Wheel movement; negative scrolls up
    pub delta_y: i32,
}

impl MouseEvent {
    pub fn new(kind: MouseEventKind, row: u32, column: u32) -> Self {
        Self {
            kind,
            button: 0,
            buttons: 0,
            row,
            column,
            modifiers: MouseModifiers::default(),
            delta_y: 0,
        }
    }

    pub fn with_button(mut self, button: u8) -> Self {
        self.button = button;
        self
    }

    pub fn with_buttons(mut self, buttons: u8) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn with_modifiers(mut self, modifiers: MouseModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_delta_y(mut self, delta_y: i32) -> Self {
        self.delta_y = delta_y;
        self
    }
}

/// Mouse tracking state and report encoder
#[derive(Debug, Clone, Default)]
pub struct MouseEncoder {
    report: MouseReport,
    coordinates: MouseCoordinates,
    alt_is_meta: bool,
    last_drag: Option<String>,
}

impl MouseEncoder {
    pub fn new(alt_is_meta: bool) -> Self {
        Self {
            alt_is_meta,
            ..Self::default()
        }
    }

    /// Tracking off, X10 coordinates
    pub fn reset(&mut self) {
        self.report = MouseReport::Disabled;
        self.coordinates = MouseCoordinates::X10;
        self.last_drag = None;
    }

    pub fn report(&self) -> MouseReport {
        self.report
    }

    pub fn set_report(&mut self, report: MouseReport) {
        self.report = report;
    }

    pub fn coordinates(&self) -> MouseCoordinates {
        self.coordinates
    }

    pub fn set_coordinates(&mut self, coordinates: MouseCoordinates) {
        self.coordinates = coordinates;
    }

    /// Encode an event for the active mode. `None` when the mode does not
    /// report this kind of event, or when a drag would repeat the
    /// previous report for the same cell.
    pub fn encode(&mut self, event: &MouseEvent) -> Option<String> {
        match self.report {
            MouseReport::Disabled => return None,
            MouseReport::Drag => {}
            _ if event.kind == MouseEventKind::Move => return None,
            _ => {}
        }

        let modifiers = self.modifier_bits(&event.modifiers);
        let sgr = self.coordinates == MouseCoordinates::Sgr;

        match event.kind {
            MouseEventKind::Wheel => {
                let mut b = 64 + u32::from(event.delta_y >= 0);
                b |= modifiers;
                if !sgr {
                    b += 32;
                }
                Some(self.format(b, event, 'M'))
            }

            MouseEventKind::Down => {
                let mut b = u32::from(event.button.min(2));
                if !sgr {
                    b += 32;
                }
                b |= modifiers;
                Some(self.format(b, event, 'M'))
            }

            MouseEventKind::Up => {
                if self.report == MouseReport::Press {
                    return None;
                }
                if sgr {
                    Some(self.format(u32::from(event.button), event, 'm'))
                } else {
                    // X10 cannot say which button was released
                    Some(self.format(0x23, event, 'M'))
                }
            }

            MouseEventKind::Move => {
                if event.buttons == 0 {
                    return None;
                }
                let mut b = if sgr { 0 } else { 32 };
                // Only the first held button is reported, xterm's order
                b += if event.buttons & BUTTON_LEFT != 0 {
                    0
                } else if event.buttons & BUTTON_MIDDLE != 0 {
                    1
                } else if event.buttons & BUTTON_RIGHT != 0 {
                    2
                } else {
                    3
                };
                b += 32;
                b |= modifiers;

                let response = self.format(b, event, 'M');
                if self.last_drag.as_deref() == Some(response.as_str()) {
                    return None;
                }
                self.last_drag = Some(response.clone());
                Some(response)
            }

            MouseEventKind::Click | MouseEventKind::DoubleClick => None,
        }
    }

    fn modifier_bits(&self, modifiers: &MouseModifiers) -> u32 {
        if self.report == MouseReport::Press {
            return 0;
        }
        let mut bits = 0;
        if modifiers.shift {
            bits |= 4;
        }
        if modifiers.meta || (self.alt_is_meta && modifiers.alt) {
            bits |= 8;
        }
        if modifiers.ctrl {
            bits |= 16;
        }
        bits
    }

    fn format(&self, b: u32, event: &MouseEvent, final_char: char) -> String {
        match self.coordinates {
            MouseCoordinates::Sgr => {
                format!("\x1b[<{};{};{}{}", b, event.column, event.row, final_char)
            }
            MouseCoordinates::X10 | MouseCoordinates::Utf8 => {
                let limit = if self.coordinates == MouseCoordinates::Utf8 {
                    2047
                } else {
                    127
                };
                let mut out = String::from("\x1b[M");
                out.push(encode_coord(b, limit));
                out.push(encode_coord(event.column.saturating_add(32), limit));
                out.push(encode_coord(event.row.saturating_add(32), limit));
                out
            }
        }
    }
}

fn encode_coord(value: u32, limit: u32) -> char {
    char::from_u32(value.clamp(32, limit)).unwrap_or(' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder(report: MouseReport, coordinates: MouseCoordinates) -> MouseEncoder {
        let mut encoder = MouseEncoder::new(false);
        encoder.set_report(report);
        encoder.set_coordinates(coordinates);
        encoder
    }

    #[test]
    fn test_disabled_reports_nothing() {
        let mut enc = MouseEncoder::new(false);
        let down = MouseEvent::new(MouseEventKind::Down, 1, 1);
        assert_eq!(enc.encode(&down), None);
    }

    #[test]
    fn test_press_mode_ignores_modifiers_and_release() {
        let mut enc = encoder(MouseReport::Press, MouseCoordinates::X10);
        let shift = MouseModifiers {
            shift: true,
            ..Default::default()
        };
        let down = MouseEvent::new(MouseEventKind::Down, 1, 1).with_modifiers(shift);
        assert_eq!(enc.encode(&down).as_deref(), Some("\x1b[M !!"));

        let up = MouseEvent::new(MouseEventKind::Up, 1, 1);
        assert_eq!(enc.encode(&up), None);
    }

    #[test]
    fn test_x10_coordinates_clamp() {
        let mut enc = encoder(MouseReport::Click, MouseCoordinates::X10);
        let down = MouseEvent::new(MouseEventKind::Down, 200, 95);
        assert_eq!(enc.encode(&down).as_deref(), Some("\x1b[M \x7f\x7f"));
    }

    #[test]
    fn test_utf8_coordinates() {
        let mut enc = encoder(MouseReport::Click, MouseCoordinates::Utf8);
        let down = MouseEvent::new(MouseEventKind::Down, 3000, 200);
        assert_eq!(
            enc.encode(&down).as_deref(),
            Some("\x1b[M \u{e8}\u{7ff}")
        );
    }

    #[test]
    fn test_sgr_click_and_release() {
        let mut enc = encoder(MouseReport::Click, MouseCoordinates::Sgr);
        let ctrl = MouseModifiers {
            ctrl: true,
            ..Default::default()
        };
        let down = MouseEvent::new(MouseEventKind::Down, 5, 300)
            .with_button(2)
            .with_modifiers(ctrl);
        assert_eq!(enc.encode(&down).as_deref(), Some("\x1b[<18;300;5M"));

        let up = MouseEvent::new(MouseEventKind::Up, 5, 300).with_button(2);
        assert_eq!(enc.encode(&up).as_deref(), Some("\x1b[<2;300;5m"));
    }

    #[test]
    fn test_x10_release_is_anonymous() {
        let mut enc = encoder(MouseReport::Click, MouseCoordinates::X10);
        let up = MouseEvent::new(MouseEventKind::Up, 1, 2).with_button(1);
        assert_eq!(enc.encode(&up).as_deref(), Some("\x1b[M#\"!"));
    }

    #[test]
    fn test_wheel_direction() {
        let mut enc = encoder(MouseReport::Click, MouseCoordinates::Sgr);
        let up = MouseEvent::new(MouseEventKind::Wheel, 1, 1).with_delta_y(-3);
        let down = MouseEvent::new(MouseEventKind::Wheel, 1, 1).with_delta_y(3);
        assert_eq!(enc.encode(&up).as_deref(), Some("\x1b[<64;1;1M"));
        assert_eq!(enc.encode(&down).as_deref(), Some("\x1b[<65;1;1M"));

        enc.set_coordinates(MouseCoordinates::X10);
        assert_eq!(enc.encode(&up).as_deref(), Some("\x1b[M`!!"));
    }

    #[test]
    fn test_alt_counts_as_meta_when_configured() {
        let alt = MouseModifiers {
            alt: true,
            ..Default::default()
        };
        let down = MouseEvent::new(MouseEventKind::Down, 1, 1).with_modifiers(alt);

        let mut plain = encoder(MouseReport::Click, MouseCoordinates::Sgr);
        assert_eq!(plain.encode(&down).as_deref(), Some("\x1b[<0;1;1M"));

        let mut meta = MouseEncoder::new(true);
        meta.set_report(MouseReport::Click);
        meta.set_coordinates(MouseCoordinates::Sgr);
        assert_eq!(meta.encode(&down).as_deref(), Some("\x1b[<8;1;1M"));
    }

    #[test]
    fn test_motion_only_in_drag_mode() {
        let moved = MouseEvent::new(MouseEventKind::Move, 2, 2).with_buttons(BUTTON_LEFT);

        let mut click = encoder(MouseReport::Click, MouseCoordinates::Sgr);
        assert_eq!(click.encode(&moved), None);

        let mut drag = encoder(MouseReport::Drag, MouseCoordinates::Sgr);
        assert_eq!(drag.encode(&moved).as_deref(), Some("\x1b[<32;2;2M"));

        let hover = MouseEvent::new(MouseEventKind::Move, 2, 3);
        assert_eq!(drag.encode(&hover), None);
    }

    #[test]
    fn test_drag_button_priority() {
        let mut drag = encoder(MouseReport::Drag, MouseCoordinates::Sgr);
        let right_middle = MouseEvent::new(MouseEventKind::Move, 1, 1)
            .with_buttons(BUTTON_RIGHT | BUTTON_MIDDLE);
        assert_eq!(drag.encode(&right_middle).as_deref(), Some("\x1b[<33;1;1M"));

        let right = MouseEvent::new(MouseEventKind::Move, 1, 2).with_buttons(BUTTON_RIGHT);
        assert_eq!(drag.encode(&right).as_deref(), Some("\x1b[<34;2;1M"));

        let other = MouseEvent::new(MouseEventKind::Move, 1, 3).with_buttons(0x8);
        assert_eq!(drag.encode(&other).as_deref(), Some("\x1b[<35;3;1M"));
    }

    #[test]
    fn test_drag_same_cell_reported_once() {
        let mut drag = encoder(MouseReport::Drag, MouseCoordinates::X10);
        let moved = MouseEvent::new(MouseEventKind::Move, 4, 4).with_buttons(BUTTON_LEFT);

        assert!(drag.encode(&moved).is_some());
        assert_eq!(drag.encode(&moved), None);

        let next = MouseEvent::new(MouseEventKind::Move, 4, 5).with_buttons(BUTTON_LEFT);
        assert!(drag.encode(&next).is_some());
    }

    #[test]
    fn test_clicks_are_not_reported() {
        let mut enc = encoder(MouseReport::Drag, MouseCoordinates::Sgr);
        let click = MouseEvent::new(MouseEventKind::Click, 1, 1);
        let dbl = MouseEvent::new(MouseEventKind::DoubleClick, 1, 1);
        assert_eq!(enc.encode(&click), None);
        assert_eq!(enc.encode(&dbl), None);
    }

    #[test]
    fn test_reset() {
        let mut enc = encoder(MouseReport::Drag, MouseCoordinates::Sgr);
        enc.reset();
        assert_eq!(enc.report(), MouseReport::Disabled);
        assert_eq!(enc.coordinates(), MouseCoordinates::X10);
    }
}
