//! Operating System Commands
//!
//! The body after `OSC <code> ;` arrives as one string. Multi-valued
//! commands split it on `;` themselves.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use tracing::{debug, warn};

use super::{InlineImage, Notification, Terminal, TerminalEvent};
use crate::core::{CursorShape, Rgb};
use crate::error::Result;
use crate::parser::{parse_int, OscOp};

/// Standard alphabet, padding optional
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Palette entries addressable by OSC 4/104
const PALETTE_SIZE: u32 = 256;

/// Decode a base64 payload the way OSC 52 and OSC 1337 carry it:
/// whitespace is skipped and padding is optional.
pub fn decode_base64(payload: &str) -> Result<Vec<u8>> {
    let compact: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    Ok(PAYLOAD_ENGINE.decode(compact)?)
}

/// Parse an iTerm2 `File=<key=value;...>:<base64 data>` transfer.
///
/// Returns `Ok(None)` for other 1337 commands. Unknown keys and an
/// undecodable `name` are ignored; undecodable image data is an error.
pub fn parse_inline_image(args: &str) -> Result<Option<InlineImage>> {
    let Some((options, data)) = args
        .strip_prefix("File=")
        .and_then(|body| body.split_once(':'))
    else {
        return Ok(None);
    };

    let mut image = InlineImage {
        data: decode_base64(data)?,
        ..InlineImage::default()
    };

    for option in options.split(';') {
        let Some((key, value)) = option.split_once('=').filter(|(key, _)| !key.is_empty())
        else {
            continue;
        };
        match key {
            "name" => match decode_base64(value) {
                Ok(name) => image.name = String::from_utf8_lossy(&name).into_owned(),
                Err(e) => debug!("Ignoring image name: {}", e),
            },
            "size" => {
                let digits = value.bytes().take_while(u8::is_ascii_digit).count();
                image.size = value[..digits].parse().unwrap_or(0);
            }
            "width" => image.width = value.to_string(),
            "height" => image.height = value.to_string(),
            "preserveAspectRatio" => image.preserve_aspect_ratio = value != "0",
            "inline" => image.inline = value != "0",
            "align" => image.align = value.to_string(),
            "type" => image.image_type = value.to_string(),
            _ => {}
        }
    }

    Ok(Some(image))
}

impl Terminal {
    pub(super) fn dispatch_osc(&mut self, code: &str, rest: &str) {
        // "00" and friends are not "0"
        let handler = if code.len() > 1 && code.starts_with('0') {
            None
        } else {
            parse_int(code).and_then(|n| self.tables.osc.get(&n).copied())
        };
        let Some(handler) = handler else {
            return self.unknown("OSC", code);
        };
        match handler.op() {
            Some(op) => self.osc_op(op, rest),
            None => debug!("Ignored OSC code: {}", code),
        }
    }

    fn osc_op(&mut self, op: OscOp, rest: &str) {
        match op {
            OscOp::SetTitle => {
                self.title = rest.to_string();
                self.emit(TerminalEvent::SetTitle(rest.to_string()));
            }
            OscOp::Palette => self.set_palette_colors(rest),
            OscOp::Hyperlink => self.set_hyperlink(rest),
            OscOp::Notify => self.emit(TerminalEvent::Notification(Notification {
                title: None,
                body: Some(rest.to_string()),
            })),
            OscOp::ForegroundColor => self.set_dynamic_colors(OscOp::ForegroundColor, rest),
            OscOp::BackgroundColor => self.set_dynamic_colors(OscOp::BackgroundColor, rest),
            OscOp::CursorColor => self.set_dynamic_colors(OscOp::CursorColor, rest),
            OscOp::CursorShape => self.set_cursor_shape_osc(rest),
            OscOp::Clipboard => self.write_clipboard(rest),
            OscOp::ResetPalette => self.reset_palette_colors(rest),
            OscOp::ResetForeground => {
                self.foreground_color = None;
                self.emit(TerminalEvent::SetForegroundColor(None));
            }
            OscOp::ResetBackground => {
                self.background_color = None;
                self.emit(TerminalEvent::SetBackgroundColor(None));
            }
            OscOp::ResetCursorColor => {
                self.cursor_color = None;
                self.emit(TerminalEvent::SetCursorColor(None));
            }
            OscOp::InlineImage => match parse_inline_image(rest) {
                Ok(Some(image)) => self.emit(TerminalEvent::DisplayImage(image)),
                Ok(None) => self.unimplemented(&format!("iTerm2 1337 {:?}", rest)),
                Err(e) => debug!("Dropping inline image: {}", e),
            },
            OscOp::Urxvt => self.urxvt(rest),
        }
    }

    /// OSC 4: `index;color` pairs, where a color of `?` asks for the
    /// current value
    fn set_palette_colors(&mut self, rest: &str) {
        let args: Vec<&str> = rest.split(';').collect();
        let mut replies = Vec::new();

        for pair in args.chunks_exact(2) {
            let Some(index) = parse_int(pair[0]).filter(|&i| i < PALETTE_SIZE) else {
                continue;
            };
            let index = index as u8;

            if pair[1] == "?" {
                replies.push(format!("{};{}", index, self.palette.get(index).to_x11()));
                continue;
            }

            match Rgb::parse_x11(pair[1]) {
                Ok(color) => {
                    self.palette.set(index, color);
                    self.emit(TerminalEvent::SetPaletteColor { index, color });
                }
                Err(e) => debug!("OSC 4: {}", e),
            }
        }

        if !replies.is_empty() {
            self.respond(format!("\x1b]4;{}\x07", replies.join(";")));
        }
    }

    /// OSC 104: reset the whole palette, or the listed entries
    fn reset_palette_colors(&mut self, rest: &str) {
        if rest.is_empty() {
            self.palette.reset();
            self.emit(TerminalEvent::ResetPalette);
            return;
        }

        for arg in rest.split(';') {
            match parse_int(arg).filter(|&i| i < PALETTE_SIZE) {
                Some(index) => {
                    self.palette.reset_color(index as u8);
                    self.emit(TerminalEvent::ResetPaletteColor(index as u8));
                }
                None => debug!("OSC 104: bad index {:?}", arg),
            }
        }
    }

    /// OSC 8: `params;uri`. An empty uri ends the link.
    fn set_hyperlink(&mut self, rest: &str) {
        let args: Vec<&str> = rest.split(';').collect();
        let link = match args.as_slice() {
            [params, uri] if !uri.is_empty() => {
                let id = params
                    .split(':')
                    .filter_map(|param| param.split_once('='))
                    .filter(|(key, _)| *key == "id")
                    .map(|(_, value)| value.to_string())
                    .last()
                    .unwrap_or_default();
                Some((uri.to_string(), id))
            }
            _ => None,
        };

        let attrs = &mut self.screen_mut().text_attributes;
        match link {
            Some((uri, id)) => {
                attrs.uri = Some(uri);
                attrs.uri_id = Some(id);
            }
            None => {
                attrs.uri = None;
                attrs.uri_id = None;
            }
        }
    }

    /// OSC 10/11/12. Extra values carry on to the next code, so
    /// `OSC 10;fg;bg` also sets the background.
    fn set_dynamic_colors(&mut self, first: OscOp, rest: &str) {
        let mut op = first;
        let mut values = rest.split(';');
        loop {
            let Some(value) = values.next() else {
                return;
            };
            match Rgb::parse_x11(value) {
                Ok(color) => self.set_dynamic_color(op, color),
                Err(e) => debug!("{:?}: {}", op, e),
            }
            op = match op {
                OscOp::ForegroundColor => OscOp::BackgroundColor,
                OscOp::BackgroundColor => OscOp::CursorColor,
                _ => return,
            };
        }
    }

    fn set_dynamic_color(&mut self, op: OscOp, color: Rgb) {
        let event = match op {
            OscOp::ForegroundColor => {
                self.foreground_color = Some(color);
                TerminalEvent::SetForegroundColor(Some(color))
            }
            OscOp::BackgroundColor => {
                self.background_color = Some(color);
                TerminalEvent::SetBackgroundColor(Some(color))
            }
            _ => {
                self.cursor_color = Some(color);
                TerminalEvent::SetCursorColor(Some(color))
            }
        };
        self.emit(event);
    }

    /// OSC 50: `CursorShape=0|1|2`; anything else means block
    fn set_cursor_shape_osc(&mut self, rest: &str) {
        const KEY: &str = "cursorshape=";
        let lower = rest.to_ascii_lowercase();
        let value = lower
            .find(KEY)
            .and_then(|at| rest[at + KEY.len()..].chars().next());
        let Some(value) = value else {
            warn!("Could not parse OSC 50 args: {:?}", rest);
            return;
        };

        let shape = match value {
            '1' => CursorShape::Beam,
            '2' => CursorShape::Underline,
            _ => CursorShape::Block,
        };
        self.modes.cursor_shape = shape;
        self.emit(TerminalEvent::CursorShape(shape));
    }

    /// OSC 52: `selection;base64`. Reads (`?`) are never honored.
    fn write_clipboard(&mut self, rest: &str) {
        if !self.config.enable_clipboard_write {
            debug!("Clipboard write disabled");
            return;
        }

        let Some((selection, data)) = rest.split_once(';') else {
            return;
        };
        if !selection.chars().all(|c| "cps01234567".contains(c)) {
            debug!("OSC 52: bad selection {:?}", selection);
            return;
        }

        match decode_base64(data) {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes).into_owned();
                if !text.is_empty() {
                    self.emit(TerminalEvent::ClipboardWrite(text));
                }
            }
            Err(e) => debug!("OSC 52: {}", e),
        }
    }

    /// OSC 777: rxvt-unicode extensions; only `notify;title;body`
    fn urxvt(&mut self, rest: &str) {
        let module = rest.split(';').next().unwrap_or_default();
        if module != "notify" {
            warn!("Unknown urxvt module: {:?}", rest);
            return;
        }

        let (title, body) = match rest.split_once(';') {
            Some((_, tail)) => match tail.split_once(';') {
                Some((title, body)) => (Some(title), Some(body)),
                None => (Some(tail), None),
            },
            None => (None, None),
        };
        self.emit(TerminalEvent::Notification(Notification {
            title: title.map(str::to_string),
            body: body.map(str::to_string),
        }));
    }
}
