//! Character display widths
//!
//! Column widths follow the East-Asian-width data shipped by
//! `unicode-width`; the terminal rules on top of it (controls are zero
//! width, combining marks stay with their base character, ambiguous
//! characters are optionally wide) live here.

use unicode_width::UnicodeWidthChar;

/// Width classification with the ambiguous-width policy baked in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WidthTable {
    /// Treat East-Asian ambiguous characters as two columns
    pub ambiguous_wide: bool,
}

/// A slice of printable text that is either narrow or a single wide character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    /// Display width in columns
    pub width: usize,
    /// One two-column character plus any trailing zero-width marks
    pub wide: bool,
    /// Only ASCII characters
    pub ascii: bool,
}

impl WidthTable {
    pub fn new(ambiguous_wide: bool) -> Self {
        Self { ambiguous_wide }
    }

    /// Display width of a single character: 0, 1 or 2
    pub fn char_width(&self, c: char) -> usize {
        if c < ' ' || ('\u{7f}'..'\u{a0}').contains(&c) {
            return 0;
        }
        let width = if self.ambiguous_wide {
            c.width_cjk()
        } else {
            c.width()
        };
        width.unwrap_or(0)
    }

    /// Whether a character is zero width and attaches to its predecessor
    pub fn is_combining(&self, c: char) -> bool {
        c >= ' ' && self.char_width(c) == 0
    }

    /// Display width of a string
    pub fn str_width(&self, s: &str) -> usize {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    /// Width of UTF-16 text; surrogate pairs count as one character and
    /// lone surrogates as zero
    pub fn utf16_width(&self, units: &[u16]) -> usize {
        char::decode_utf16(units.iter().copied())
            .map(|c| c.map(|c| self.char_width(c)).unwrap_or(0))
            .sum()
    }

    /// Column-addressed substring.
    ///
    /// Skips characters until `start` columns have been passed, then takes
    /// characters while the accumulated width stays within `width` (or to
    /// the end when `width` is `None`). Zero-width characters stay with the
    /// character before them, except at the very start of the string.
    pub fn substr<'a>(&self, s: &'a str, start: usize, width: Option<usize>) -> &'a str {
        let mut begin = 0;
        if start > 0 {
            let mut acc = 0;
            begin = s.len();
            for (i, c) in s.char_indices() {
                acc += self.char_width(c);
                if acc > start {
                    begin = i;
                    break;
                }
            }
        }

        let rest = &s[begin..];
        let Some(width) = width else {
            return rest;
        };

        let mut acc = 0;
        let mut end = rest.len();
        for (i, c) in rest.char_indices() {
            acc += self.char_width(c);
            if acc > width {
                end = i;
                break;
            }
        }
        &rest[..end]
    }

    /// Substring between two column positions
    pub fn substring<'a>(&self, s: &'a str, start: usize, end: usize) -> &'a str {
        self.substr(s, start, Some(end.saturating_sub(start)))
    }

    /// Split text into narrow runs and individual wide characters
    pub fn segments<'a>(&self, s: &'a str) -> Vec<Segment<'a>> {
        let mut out = Vec::new();
        let mut base = 0;
        let mut width = 0;
        let mut ascii = true;
        let mut chars = s.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            let w = self.char_width(c);
            if w < 2 {
                width += w;
                ascii &= c.is_ascii();
                continue;
            }

            if i > base {
                out.push(Segment {
                    text: &s[base..i],
                    width,
                    wide: false,
                    ascii,
                });
            }

            let mut end = i + c.len_utf8();
            while let Some(&(j, next)) = chars.peek() {
                if !self.is_combining(next) {
                    break;
                }
                end = j + next.len_utf8();
                chars.next();
            }
            out.push(Segment {
                text: &s[i..end],
                width: 2,
                wide: true,
                ascii: false,
            });

            base = end;
            width = 0;
            ascii = true;
        }

        if base < s.len() {
            out.push(Segment {
                text: &s[base..],
                width,
                wide: false,
                ascii,
            });
        }
        out
    }
}
