//! Colors and the 256-entry palette
//!
//! Includes the X11 color syntax used by OSC 4/10/11/12 for both
//! parsing and query replies.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A concrete 24-bit color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    const fn hex(v: u32) -> Self {
        Self::new((v >> 16) as u8, (v >> 8) as u8, v as u8)
    }

    /// X11 `rgb:rrrr/gggg/bbbb` form, each channel scaled to 16 bits
    pub fn to_x11(self) -> String {
        let scale = |v: u8| u32::from(v) * 257;
        format!(
            "rgb:{:04x}/{:04x}/{:04x}",
            scale(self.r),
            scale(self.g),
            scale(self.b)
        )
    }

    /// Parse an X11 color specification.
    ///
    /// Accepts `rgb:R/G/B` with 1-4 hex digits per channel, `#` followed by
    /// 3, 6, 9 or 12 hex digits, and common X11 color names.
    pub fn parse_x11(spec: &str) -> Result<Rgb> {
        let spec = spec.trim();
        let invalid = || Error::InvalidColor(spec.to_string());

        if let Some(body) = spec.strip_prefix("rgb:") {
            let parts: Vec<&str> = body.split('/').collect();
            if parts.len() != 3 {
                return Err(invalid());
            }
            let mut channels = [0u8; 3];
            for (slot, part) in channels.iter_mut().zip(&parts) {
                *slot = scale_hex(part).ok_or_else(invalid)?;
            }
            return Ok(Rgb::new(channels[0], channels[1], channels[2]));
        }

        if let Some(body) = spec.strip_prefix('#') {
            let len = body.len();
            if len == 0 || len % 3 != 0 || len > 12 {
                return Err(invalid());
            }
            let n = len / 3;
            let mut channels = [0u8; 3];
            for (i, slot) in channels.iter_mut().enumerate() {
                let part = body.get(i * n..(i + 1) * n).ok_or_else(invalid)?;
                *slot = scale_hex(part).ok_or_else(invalid)?;
            }
            return Ok(Rgb::new(channels[0], channels[1], channels[2]));
        }

        named_color(spec).ok_or_else(invalid)
    }
}

/// Scale a 1-4 digit hex channel to 8 bits
fn scale_hex(part: &str) -> Option<u8> {
    if part.is_empty() || part.len() > 4 || !part.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let v = u32::from_str_radix(part, 16).ok()?;
    let scaled = match part.len() {
        1 => v << 4,
        2 => v,
        n => v >> (4 * (n - 2)),
    };
    u8::try_from(scaled).ok()
}

fn named_color(name: &str) -> Option<Rgb> {
    let key: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    let rgb = match key.as_str() {
        "black" => 0x000000,
        "white" => 0xffffff,
        "red" => 0xff0000,
        "green" => 0x00ff00,
        "blue" => 0x0000ff,
        "yellow" => 0xffff00,
        "cyan" => 0x00ffff,
        "magenta" => 0xff00ff,
        "gray" | "grey" => 0xbebebe,
        "darkgray" | "darkgrey" => 0xa9a9a9,
        "lightgray" | "lightgrey" => 0xd3d3d3,
        "darkred" => 0x8b0000,
        "darkgreen" => 0x006400,
        "darkblue" => 0x00008b,
        "darkcyan" => 0x008b8b,
        "darkmagenta" => 0x8b008b,
        "orange" => 0xffa500,
        "purple" => 0xa020f0,
        "pink" => 0xffc0cb,
        "brown" => 0xa52a2a,
        "navy" | "navyblue" => 0x000080,
        "maroon" => 0xb03060,
        "gold" => 0xffd700,
        "silver" => 0xc0c0c0,
        _ => return None,
    };
    Some(Rgb::hex(rgb))
}

/// Where a run's foreground, background or underline color comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ColorSource {
    #[default]
    Default,
    Indexed {
        index: u8,
    },
    Rgb {
        r: u8,
        g: u8,
        b: u8,
    },
    /// Fully transparent (ISO 8613-6 color space 1)
    Transparent,
}

impl ColorSource {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        ColorSource::Rgb { r, g, b }
    }

    pub fn is_default(self) -> bool {
        self == ColorSource::Default
    }
}

const STOCK_ANSI: [u32; 16] = [
    0x000000, 0xcc0000, 0x4e9a06, 0xc4a000, 0x3465a4, 0x75507b, 0x06989a, 0xd3d7cf, 0x555753,
    0xef2929, 0x00ba13, 0xfce94f, 0x729fcf, 0xf200cb, 0x00b5bd, 0xeeeeec,
];

const CUBE_STEPS: [u8; 6] = [0x00, 0x5f, 0x87, 0xaf, 0xd7, 0xff];

/// Stock color for a palette index
pub fn stock_color(index: u8) -> Rgb {
    match index {
        0..=15 => Rgb::hex(STOCK_ANSI[usize::from(index)]),
        16..=231 => {
            let n = index - 16;
            Rgb::new(
                CUBE_STEPS[usize::from(n / 36)],
                CUBE_STEPS[usize::from((n / 6) % 6)],
                CUBE_STEPS[usize::from(n % 6)],
            )
        }
        232..=255 => {
            let gray = 8 + (index - 232) * 10;
            Rgb::new(gray, gray, gray)
        }
    }
}

/// The 256-color palette with per-entry overrides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb; 256],
}

impl Default for Palette {
    fn default() -> Self {
        let mut colors = [Rgb::default(); 256];
        for (i, slot) in colors.iter_mut().enumerate() {
            *slot = stock_color(i as u8);
        }
        Self { colors }
    }
}

impl Palette {
    pub fn get(&self, index: u8) -> Rgb {
        self.colors[usize::from(index)]
    }

    pub fn set(&mut self, index: u8, color: Rgb) {
        self.colors[usize::from(index)] = color;
    }

    /// Restore one entry to its stock value
    pub fn reset_color(&mut self, index: u8) {
        self.colors[usize::from(index)] = stock_color(index);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_palette() {
        assert_eq!(stock_color(1), Rgb::new(0xcc, 0, 0));
        assert_eq!(stock_color(16), Rgb::new(0, 0, 0));
        assert_eq!(stock_color(231), Rgb::new(0xff, 0xff, 0xff));
        assert_eq!(stock_color(196), Rgb::new(0xff, 0, 0));
        assert_eq!(stock_color(232), Rgb::new(8, 8, 8));
        assert_eq!(stock_color(255), Rgb::new(238, 238, 238));
    }

    #[test]
    fn test_parse_x11_rgb() {
        assert_eq!(Rgb::parse_x11("rgb:ff/00/80").unwrap(), Rgb::new(255, 0, 128));
        assert_eq!(Rgb::parse_x11("rgb:f/0/8").unwrap(), Rgb::new(0xf0, 0, 0x80));
        assert_eq!(Rgb::parse_x11("rgb:ffff/0000/8080").unwrap(), Rgb::new(255, 0, 128));
        assert!(Rgb::parse_x11("rgb:ff/00").is_err());
        assert!(Rgb::parse_x11("rgb:fffff/0/0").is_err());
    }

    #[test]
    fn test_parse_x11_hash() {
        assert_eq!(Rgb::parse_x11("#f08").unwrap(), Rgb::new(0xf0, 0, 0x80));
        assert_eq!(Rgb::parse_x11("#123456").unwrap(), Rgb::new(0x12, 0x34, 0x56));
        assert_eq!(Rgb::parse_x11("#123456789").unwrap(), Rgb::new(0x12, 0x45, 0x78));
        assert!(Rgb::parse_x11("#12345").is_err());
    }

    #[test]
    fn test_parse_x11_names() {
        assert_eq!(Rgb::parse_x11("Red").unwrap(), Rgb::new(255, 0, 0));
        assert_eq!(Rgb::parse_x11("navy blue").unwrap(), Rgb::new(0, 0, 0x80));
        assert!(matches!(Rgb::parse_x11("?"), Err(Error::InvalidColor(_))));
    }

    #[test]
    fn test_to_x11() {
        assert_eq!(Rgb::new(0xcc, 0, 0xff).to_x11(), "rgb:cccc/0000/ffff");
    }

    #[test]
    fn test_palette_override_and_reset() {
        let mut palette = Palette::default();
        palette.set(3, Rgb::new(1, 2, 3));
        assert_eq!(palette.get(3), Rgb::new(1, 2, 3));

        palette.reset_color(3);
        assert_eq!(palette.get(3), stock_color(3));

        palette.set(200, Rgb::new(1, 1, 1));
        palette.reset();
        assert_eq!(palette, Palette::default());
    }
}
