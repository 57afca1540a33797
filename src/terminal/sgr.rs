//! Select Graphic Rendition
//!
//! `CSI ... m` updates the current text attributes. Extended colors
//! (38/48/58) are accepted in two spellings:
//! - `38:2:<id>:R:G:B`, all sub-parameters of one argument
//! - `38;2;R;G;B`, plain arguments
//!
//! xterm's mixed `38;2:R:G:B` spelling sets no color.
//!
//! Malformed extended colors consume nothing beyond their own argument,
//! so the arguments after them are still interpreted.

use tracing::debug;

use super::Terminal;
use crate::core::{ColorSource, TextAttributes, UnderlineStyle};
use crate::parser::{parse_int, ParseState};

/// Which color an extended color sequence sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorTarget {
    Foreground,
    Background,
    Underline,
}

impl Terminal {
    pub(super) fn apply_sgr(&mut self, parse: &ParseState) {
        let attrs = &mut self.screen_mut().text_attributes;
        if parse.args.is_empty() {
            attrs.reset();
            return;
        }

        let mut i = 0;
        while i < parse.args.len() {
            // Sub-parameters are cut off by the integer parse
            let arg = parse.iarg(i, 0);
            match arg {
                0 => attrs.reset(),
                1 => attrs.bold = true,
                2 => attrs.faint = true,
                3 => attrs.italic = true,
                4 => attrs.underline = underline_style(parse, i).unwrap_or(attrs.underline),
                5 => attrs.blink = true,
                7 => attrs.inverse = true,
                8 => attrs.invisible = true,
                9 => attrs.strikethrough = true,
                21 => attrs.underline = UnderlineStyle::Double,
                22 => {
                    attrs.bold = false;
                    attrs.faint = false;
                }
                23 => attrs.italic = false,
                24 => attrs.underline = UnderlineStyle::None,
                25 => attrs.blink = false,
                27 => attrs.inverse = false,
                28 => attrs.invisible = false,
                29 => attrs.strikethrough = false,
                30..=37 => attrs.foreground = indexed(arg - 30),
                39 => attrs.foreground = ColorSource::Default,
                40..=47 => attrs.background = indexed(arg - 40),
                49 => attrs.background = ColorSource::Default,
                59 => attrs.underline_color = ColorSource::Default,
                90..=97 => attrs.foreground = indexed(arg - 90 + 8),
                100..=107 => attrs.background = indexed(arg - 100 + 8),
                38 | 48 | 58 => {
                    let target = match arg {
                        38 => ColorTarget::Foreground,
                        48 => ColorTarget::Background,
                        _ => ColorTarget::Underline,
                    };
                    let (color, skip) = parse_extended_color(parse, i);
                    if let Some(color) = color {
                        set_color(attrs, target, color);
                    }
                    i += skip;
                }
                other => debug!("Ignored SGR {}", other),
            }
            i += 1;
        }
    }
}

fn indexed(index: u32) -> ColorSource {
    ColorSource::Indexed { index: index as u8 }
}

fn set_color(attrs: &mut TextAttributes, target: ColorTarget, color: ColorSource) {
    match target {
        ColorTarget::Foreground => attrs.foreground = color,
        ColorTarget::Background => attrs.background = color,
        ColorTarget::Underline => attrs.underline_color = color,
    }
}

/// `4` alone is a solid underline; `4:n` picks a style. Unknown styles
/// leave the underline as it was.
fn underline_style(parse: &ParseState, index: usize) -> Option<UnderlineStyle> {
    if !parse.arg_has_subargs(index) {
        return Some(UnderlineStyle::Solid);
    }
    let style = parse.arg(index).split(':').nth(1).unwrap_or("");
    UnderlineStyle::from_subparam(parse_int(style).unwrap_or(0))
}

/// Decode the color following a 38/48/58 argument at `index`.
///
/// Returns the color, if one was valid, and how many of the following
/// top-level arguments it used.
fn parse_extended_color(parse: &ParseState, index: usize) -> (Option<ColorSource>, usize) {
    let (fields, plain): (Vec<&str>, bool) = if parse.arg_has_subargs(index) {
        (parse.arg(index).split(':').skip(1).collect(), false)
    } else if parse.arg_has_subargs(index + 1) {
        // xterm's mixed `38;2:R:G:B` spelling is rejected; the next
        // argument is then read as an ordinary SGR code
        debug!("Ignored mixed extended color {:?}", parse.arg(index + 1));
        return (None, 0);
    } else {
        let rest = parse.args.get(index + 1..).unwrap_or_default();
        (rest.iter().map(String::as_str).collect(), true)
    };
    let used = |plain_count: usize| if plain { plain_count } else { 0 };

    let space = fields.first().and_then(|field| parse_int(field));
    match space {
        // Transparent, only as sub-parameters
        Some(1) if !plain => (Some(ColorSource::Transparent), used(0)),
        Some(2) => {
            // The standard form carries a color space id before the
            // components; a bare `2:R:G:B` does not
            let start = match (plain, fields.len()) {
                (true, _) | (false, 4) => 1,
                _ => 2,
            };
            if fields.len() < start + 3 {
                return (None, 0);
            }
            let component = |n: usize| parse_int(fields[start + n]).unwrap_or(0).min(255) as u8;
            (
                Some(ColorSource::rgb(component(0), component(1), component(2))),
                used(4),
            )
        }
        // CMY and CMYK are recognized and dropped
        Some(3) if !plain && fields.len() >= 4 => (None, used(0)),
        Some(4) if !plain && fields.len() >= 5 => (None, used(0)),
        Some(5) => {
            if fields.len() < 2 {
                return (None, 0);
            }
            let color = parse_int(fields[1])
                .filter(|&index| index < 256)
                .map(indexed);
            (color, used(2))
        }
        _ => (None, 0),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::VtConfig;
    use crate::core::{ColorSource, TextAttributes, UnderlineStyle};
    use crate::terminal::Terminal;

    fn sgr(sequence: &str) -> TextAttributes {
        let mut term = Terminal::new(VtConfig::with_size(15, 6));
        term.interpret(sequence);
        term.text_attributes().clone()
    }

    #[test]
    fn test_style_bits() {
        let attrs = sgr("\x1b[1;2;3;5;7;8;9m");
        assert!(attrs.bold && attrs.faint && attrs.italic);
        assert!(attrs.blink && attrs.inverse && attrs.invisible && attrs.strikethrough);

        let attrs = sgr("\x1b[1;2;3;5;7;8;9m\x1b[22;23;25;27;28;29m");
        assert!(attrs.is_default());
    }

    #[test]
    fn test_reset_forms() {
        assert!(sgr("\x1b[1;31m\x1b[m").is_default());
        assert!(sgr("\x1b[1;31m\x1b[0m").is_default());
        assert!(sgr("\x1b[1;31;0m").is_default());
    }

    #[test]
    fn test_bold_underline_rgb_and_reset() {
        let attrs = sgr("\x1b[1;4;38;2;10;20;30m");
        assert!(attrs.bold);
        assert_eq!(attrs.underline, UnderlineStyle::Solid);
        assert_eq!(attrs.foreground, ColorSource::rgb(10, 20, 30));

        assert!(sgr("\x1b[1;4;38;2;10;20;30m\x1b[0m").is_default());
    }

    #[test]
    fn test_underline_styles() {
        assert_eq!(sgr("\x1b[4:3m").underline, UnderlineStyle::Wavy);
        assert_eq!(sgr("\x1b[4:5m").underline, UnderlineStyle::Dashed);
        assert_eq!(sgr("\x1b[4m\x1b[4:0m").underline, UnderlineStyle::None);
        assert_eq!(sgr("\x1b[4:2m\x1b[4:9m").underline, UnderlineStyle::Double);
        assert_eq!(sgr("\x1b[21m").underline, UnderlineStyle::Double);
        assert_eq!(sgr("\x1b[4m\x1b[24m").underline, UnderlineStyle::None);
    }

    #[test]
    fn test_basic_colors() {
        let attrs = sgr("\x1b[31;42m");
        assert_eq!(attrs.foreground, ColorSource::Indexed { index: 1 });
        assert_eq!(attrs.background, ColorSource::Indexed { index: 2 });

        let attrs = sgr("\x1b[97;100m");
        assert_eq!(attrs.foreground, ColorSource::Indexed { index: 15 });
        assert_eq!(attrs.background, ColorSource::Indexed { index: 8 });

        let attrs = sgr("\x1b[31;42m\x1b[39;49m");
        assert!(attrs.is_default());
    }

    #[test]
    fn test_256_color_forms() {
        assert_eq!(sgr("\x1b[38;5;196m").foreground, ColorSource::Indexed { index: 196 });
        assert_eq!(sgr("\x1b[48:5:17m").background, ColorSource::Indexed { index: 17 });
        assert_eq!(sgr("\x1b[38;5;256m").foreground, ColorSource::Default);
    }

    #[test]
    fn test_rgb_color_forms() {
        let expected = ColorSource::rgb(1, 2, 3);
        assert_eq!(sgr("\x1b[38:2::1:2:3m").foreground, expected);
        assert_eq!(sgr("\x1b[38:2:0:1:2:3m").foreground, expected);
        assert_eq!(sgr("\x1b[38:2:1:2:3m").foreground, expected);
        assert_eq!(sgr("\x1b[48;2;1;2;3m").background, expected);
        assert_eq!(sgr("\x1b[58:2::1:2:3m").underline_color, expected);
        assert_eq!(sgr("\x1b[38;2;300;2;3m").foreground, ColorSource::rgb(255, 2, 3));
    }

    #[test]
    fn test_mixed_subargs_form_is_rejected() {
        assert_eq!(sgr("\x1b[38;2:10:20:30m").foreground, ColorSource::Default);
        assert_eq!(sgr("\x1b[38;5:1m").foreground, ColorSource::Default);
        assert_eq!(sgr("\x1b[48;2:10:20:30m").background, ColorSource::Default);
        assert_eq!(sgr("\x1b[48;5:1m").background, ColorSource::Default);

        // The sub-parameter argument is read as its own SGR code
        let attrs = sgr("\x1b[38;2:1:2:3;1m");
        assert_eq!(attrs.foreground, ColorSource::Default);
        assert!(attrs.faint);
        assert!(attrs.bold);
        assert!(sgr("\x1b[38;5:1m").blink);
    }

    #[test]
    fn test_legacy_form_skips_its_arguments() {
        let attrs = sgr("\x1b[38;5;1;4m");
        assert_eq!(attrs.foreground, ColorSource::Indexed { index: 1 });
        assert_eq!(attrs.underline, UnderlineStyle::Solid);
        assert!(!attrs.blink);

        let attrs = sgr("\x1b[38;2;7;8;9;1m");
        assert_eq!(attrs.foreground, ColorSource::rgb(7, 8, 9));
        assert!(attrs.bold);
        assert!(!attrs.invisible);
    }

    #[test]
    fn test_malformed_extended_color_consumes_nothing() {
        let attrs = sgr("\x1b[38;2;1;1m");
        assert_eq!(attrs.foreground, ColorSource::Default);
        assert!(attrs.bold && attrs.faint);

        let attrs = sgr("\x1b[38;5m");
        assert!(attrs.is_default());

        let attrs = sgr("\x1b[38;9;1m");
        assert!(attrs.bold);
    }

    #[test]
    fn test_transparent_and_cmy() {
        assert_eq!(sgr("\x1b[48:1m").background, ColorSource::Transparent);
        assert_eq!(sgr("\x1b[38;1m").foreground, ColorSource::Default);
        assert!(sgr("\x1b[38;1m").bold);

        let attrs = sgr("\x1b[38:3:0:1:2:3;1m");
        assert_eq!(attrs.foreground, ColorSource::Default);
        assert!(attrs.bold);
    }

    #[test]
    fn test_reset_keeps_hyperlink() {
        let attrs = sgr("\x1b]8;;http://example.com\x07\x1b[1m\x1b[0m");
        assert_eq!(attrs.uri.as_deref(), Some("http://example.com"));
        assert!(!attrs.bold);
    }

    #[test]
    fn test_attributes_reach_runs() {
        let mut term = Terminal::new(VtConfig::with_size(15, 6));
        term.interpret("a\x1b[1mb\x1b[0mc");
        let runs = &term.screen().rows()[0].runs;
        assert_eq!(runs.len(), 3);
        assert!(runs[1].attrs.bold);
        assert_eq!(runs[1].text(), "b");
    }
}
