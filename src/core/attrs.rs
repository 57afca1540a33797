//! Text attributes
//!
//! [`TextAttributes`] is both the screen's current style (mutated by SGR and
//! friends) and the snapshot stored on every text run. [`ResolvedStyle`] is
//! what a renderer draws once the palette and the inverse/invisible rules
//! have been applied.

use serde::{Deserialize, Serialize};

use super::color::{ColorSource, Palette, Rgb};

/// Underline decoration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UnderlineStyle {
    #[default]
    None,
    Solid,
    Double,
    Wavy,
    Dotted,
    Dashed,
}

impl UnderlineStyle {
    /// Style selected by the `4:n` sub-parameter
    pub fn from_subparam(n: u32) -> Option<Self> {
        match n {
            0 => Some(UnderlineStyle::None),
            1 => Some(UnderlineStyle::Solid),
            2 => Some(UnderlineStyle::Double),
            3 => Some(UnderlineStyle::Wavy),
            4 => Some(UnderlineStyle::Dotted),
            5 => Some(UnderlineStyle::Dashed),
            _ => None,
        }
    }
}

/// Style and color sources for a span of text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextAttributes {
    pub bold: bool,
    pub faint: bool,
    pub italic: bool,
    pub underline: UnderlineStyle,
    pub blink: bool,
    pub inverse: bool,
    pub invisible: bool,
    pub strikethrough: bool,
    pub foreground: ColorSource,
    pub background: ColorSource,
    pub underline_color: ColorSource,
    /// The run holds a single two-column character
    pub wide: bool,
    /// The run holds only ASCII
    pub ascii: bool,
    /// Tile data set by `CSI 0 ; <n> z`
    pub tile: Option<String>,
    /// OSC 8 hyperlink target
    pub uri: Option<String>,
    /// OSC 8 hyperlink id
    pub uri_id: Option<String>,
}

impl Default for TextAttributes {
    fn default() -> Self {
        Self {
            bold: false,
            faint: false,
            italic: false,
            underline: UnderlineStyle::None,
            blink: false,
            inverse: false,
            invisible: false,
            strikethrough: false,
            foreground: ColorSource::Default,
            background: ColorSource::Default,
            underline_color: ColorSource::Default,
            wide: false,
            ascii: true,
            tile: None,
            uri: None,
            uri_id: None,
        }
    }
}

impl TextAttributes {
    /// Back to the default style. Hyperlinks survive an SGR reset.
    pub fn reset(&mut self) {
        let uri = self.uri.take();
        let uri_id = self.uri_id.take();
        *self = Self {
            uri,
            uri_id,
            ..Self::default()
        };
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Whether text in these attributes can share a run with `other`.
    /// Wide characters and tiles always get a run of their own.
    pub fn matches(&self, other: &TextAttributes) -> bool {
        !self.wide
            && !other.wide
            && self.tile.is_none()
            && other.tile.is_none()
            && self == other
    }

    /// Padding spaces may be folded into text of this style without a
    /// visible difference
    pub(crate) fn pads_invisibly(&self) -> bool {
        self.underline == UnderlineStyle::None
            && !self.strikethrough
            && self.background.is_default()
            && !self.wide
            && self.ascii
            && self.tile.is_none()
    }

    /// Attributes used for blank fills: same colors, never wide or tiled
    pub(crate) fn blank(&self) -> TextAttributes {
        TextAttributes {
            wide: false,
            ascii: true,
            tile: None,
            ..self.clone()
        }
    }

    /// Compute the concrete style to draw
    pub fn resolve(&self, palette: &Palette, bold_as_bright: bool) -> ResolvedStyle {
        let mut fg_source = self.foreground;
        if bold_as_bright && self.bold {
            if let ColorSource::Indexed { index } = fg_source {
                if index < 8 {
                    fg_source = ColorSource::Indexed { index: index + 8 };
                }
            }
        }

        let lookup = |source: ColorSource, fallback: ResolvedColor| match source {
            ColorSource::Default => fallback,
            ColorSource::Indexed { index } => ResolvedColor::Rgb(palette.get(index)),
            ColorSource::Rgb { r, g, b } => ResolvedColor::Rgb(Rgb::new(r, g, b)),
            ColorSource::Transparent => ResolvedColor::Transparent,
        };

        let (mut foreground, background) = if self.inverse {
            (
                lookup(self.background, ResolvedColor::DefaultBackground),
                lookup(fg_source, ResolvedColor::DefaultForeground),
            )
        } else {
            (
                lookup(fg_source, ResolvedColor::DefaultForeground),
                lookup(self.background, ResolvedColor::DefaultBackground),
            )
        };

        if self.invisible {
            foreground = background;
        }

        let underline_color = match self.underline_color {
            ColorSource::Default => foreground,
            other => lookup(other, foreground),
        };

        ResolvedStyle {
            foreground,
            background,
            underline_color,
            bold: self.bold,
            faint: self.faint,
            italic: self.italic,
            underline: self.underline,
            blink: self.blink,
            strikethrough: self.strikethrough,
        }
    }
}

/// A color after palette lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedColor {
    DefaultForeground,
    DefaultBackground,
    Rgb(Rgb),
    Transparent,
}

/// Final rendered style of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedStyle {
    pub foreground: ResolvedColor,
    pub background: ResolvedColor,
    pub underline_color: ResolvedColor,
    pub bold: bool,
    pub faint: bool,
    pub italic: bool,
    pub underline: UnderlineStyle,
    pub blink: bool,
    pub strikethrough: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::color::stock_color;

    #[test]
    fn test_default_attributes() {
        let attrs = TextAttributes::default();
        assert!(attrs.is_default());
        assert!(attrs.ascii);

        let mut bold = attrs.clone();
        bold.bold = true;
        assert!(!bold.is_default());
    }

    #[test]
    fn test_reset_keeps_hyperlink() {
        let mut attrs = TextAttributes {
            bold: true,
            uri: Some("http://example.com".into()),
            ..TextAttributes::default()
        };
        attrs.reset();
        assert!(!attrs.bold);
        assert_eq!(attrs.uri.as_deref(), Some("http://example.com"));
    }

    #[test]
    fn test_matches() {
        let a = TextAttributes::default();
        let mut b = TextAttributes::default();
        assert!(a.matches(&b));

        b.wide = true;
        assert!(!a.matches(&b));
        assert!(!b.matches(&b.clone()));

        let tiled = TextAttributes {
            tile: Some("1".into()),
            ..TextAttributes::default()
        };
        assert!(!tiled.matches(&tiled.clone()));
    }

    #[test]
    fn test_resolve_plain() {
        let palette = Palette::default();
        let style = TextAttributes::default().resolve(&palette, true);
        assert_eq!(style.foreground, ResolvedColor::DefaultForeground);
        assert_eq!(style.background, ResolvedColor::DefaultBackground);
        assert_eq!(style.underline_color, ResolvedColor::DefaultForeground);
    }

    #[test]
    fn test_resolve_bold_as_bright() {
        let palette = Palette::default();
        let attrs = TextAttributes {
            bold: true,
            foreground: ColorSource::Indexed { index: 1 },
            ..TextAttributes::default()
        };
        assert_eq!(
            attrs.resolve(&palette, true).foreground,
            ResolvedColor::Rgb(stock_color(9))
        );
        assert_eq!(
            attrs.resolve(&palette, false).foreground,
            ResolvedColor::Rgb(stock_color(1))
        );
    }

    #[test]
    fn test_resolve_inverse() {
        let palette = Palette::default();
        let attrs = TextAttributes {
            inverse: true,
            foreground: ColorSource::rgb(1, 2, 3),
            ..TextAttributes::default()
        };
        let style = attrs.resolve(&palette, true);
        assert_eq!(style.foreground, ResolvedColor::DefaultBackground);
        assert_eq!(style.background, ResolvedColor::Rgb(Rgb::new(1, 2, 3)));

        let plain_inverse = TextAttributes {
            inverse: true,
            ..TextAttributes::default()
        };
        let style = plain_inverse.resolve(&palette, true);
        assert_eq!(style.foreground, ResolvedColor::DefaultBackground);
        assert_eq!(style.background, ResolvedColor::DefaultForeground);
    }

    #[test]
    fn test_resolve_invisible() {
        let palette = Palette::default();
        let attrs = TextAttributes {
            invisible: true,
            foreground: ColorSource::Indexed { index: 2 },
            background: ColorSource::Indexed { index: 4 },
            ..TextAttributes::default()
        };
        let style = attrs.resolve(&palette, false);
        assert_eq!(style.foreground, ResolvedColor::Rgb(stock_color(4)));
        assert_eq!(style.background, ResolvedColor::Rgb(stock_color(4)));
    }

    #[test]
    fn test_underline_subparams() {
        assert_eq!(UnderlineStyle::from_subparam(3), Some(UnderlineStyle::Wavy));
        assert_eq!(UnderlineStyle::from_subparam(9), None);
    }
}
