//! Character sets and coding system
//!
//! Four designation slots (G0-G3) hold 94-character translation tables;
//! GL and GR select the slot used for the low and high halves. While the
//! coding system is UTF-8 the translation step is skipped entirely.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// A 94-character translation table
#[derive(Debug, PartialEq, Eq)]
pub struct CharacterMap {
    pub name: &'static str,
    /// Final characters that designate this map in `ESC ( X` and friends
    pub designators: &'static [char],
    glyphs: &'static [(char, char)],
}

impl CharacterMap {
    /// Translate one character; characters outside the table pass through
    pub fn map_char(&self, c: char) -> char {
        self.glyphs
            .iter()
            .find(|(from, _)| *from == c)
            .map_or(c, |(_, to)| *to)
    }

    pub fn is_identity(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn translate<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.is_identity() || !text.chars().any(|c| self.glyphs.iter().any(|g| g.0 == c)) {
            return Cow::Borrowed(text);
        }
        Cow::Owned(text.chars().map(|c| self.map_char(c)).collect())
    }
}

pub static US_ASCII: CharacterMap = CharacterMap {
    name: "United States",
    designators: &['B'],
    glyphs: &[],
};

pub static DEC_GRAPHICS: CharacterMap = CharacterMap {
    name: "Graphic",
    designators: &['0'],
    glyphs: &[
        ('`', '◆'),
        ('a', '▒'),
        ('b', '␉'),
        ('c', '␌'),
        ('d', '␍'),
        ('e', '␊'),
        ('f', '°'),
        ('g', '±'),
        ('h', '␤'),
        ('i', '␋'),
        ('j', '┘'),
        ('k', '┐'),
        ('l', '┌'),
        ('m', '└'),
        ('n', '┼'),
        ('o', '⎺'),
        ('p', '⎻'),
        ('q', '─'),
        ('r', '⎼'),
        ('s', '⎽'),
        ('t', '├'),
        ('u', '┤'),
        ('v', '┴'),
        ('w', '┬'),
        ('x', '│'),
        ('y', '≤'),
        ('z', '≥'),
        ('{', 'π'),
        ('|', '≠'),
        ('}', '£'),
        ('~', '·'),
    ],
};

static UNITED_KINGDOM: CharacterMap = CharacterMap {
    name: "British",
    designators: &['A'],
    glyphs: &[('#', '£')],
};

static DUTCH: CharacterMap = CharacterMap {
    name: "Dutch",
    designators: &['4'],
    glyphs: &[
        ('#', '£'),
        ('@', '¾'),
        ('[', 'ĳ'),
        ('\\', '½'),
        (']', '|'),
        ('{', '¨'),
        ('|', 'f'),
        ('}', '¼'),
        ('~', '´'),
    ],
};

static FINNISH: CharacterMap = CharacterMap {
    name: "Finnish",
    designators: &['C', '5'],
    glyphs: &[
        ('[', 'Ä'),
        ('\\', 'Ö'),
        (']', 'Å'),
        ('^', 'Ü'),
        ('`', 'é'),
        ('{', 'ä'),
        ('|', 'ö'),
        ('}', 'å'),
        ('~', 'ü'),
    ],
};

static FRENCH: CharacterMap = CharacterMap {
    name: "French",
    designators: &['R', 'f'],
    glyphs: &[
        ('#', '£'),
        ('@', 'à'),
        ('[', '°'),
        ('\\', 'ç'),
        (']', '§'),
        ('{', 'é'),
        ('|', 'ù'),
        ('}', 'è'),
        ('~', '¨'),
    ],
};

static FRENCH_CANADIAN: CharacterMap = CharacterMap {
    name: "French Canadian",
    designators: &['Q', '9'],
    glyphs: &[
        ('@', 'à'),
        ('[', 'â'),
        ('\\', 'ç'),
        (']', 'ê'),
        ('^', 'î'),
        ('`', 'ô'),
        ('{', 'é'),
        ('|', 'ù'),
        ('}', 'è'),
        ('~', 'û'),
    ],
};

static GERMAN: CharacterMap = CharacterMap {
    name: "German",
    designators: &['K'],
    glyphs: &[
        ('@', '§'),
        ('[', 'Ä'),
        ('\\', 'Ö'),
        (']', 'Ü'),
        ('{', 'ä'),
        ('|', 'ö'),
        ('}', 'ü'),
        ('~', 'ß'),
    ],
};

static ITALIAN: CharacterMap = CharacterMap {
    name: "Italian",
    designators: &['Y'],
    glyphs: &[
        ('#', '£'),
        ('@', '§'),
        ('[', '°'),
        ('\\', 'ç'),
        (']', 'é'),
        ('`', 'ù'),
        ('{', 'à'),
        ('|', 'ò'),
        ('}', 'è'),
        ('~', 'ì'),
    ],
};

static NORWEGIAN_DANISH: CharacterMap = CharacterMap {
    name: "Norwegian/Danish",
    designators: &['E', '6'],
    glyphs: &[
        ('@', 'Ä'),
        ('[', 'Æ'),
        ('\\', 'Ø'),
        (']', 'Å'),
        ('^', 'Ü'),
        ('`', 'ä'),
        ('{', 'æ'),
        ('|', 'ø'),
        ('}', 'å'),
        ('~', 'ü'),
    ],
};

static SPANISH: CharacterMap = CharacterMap {
    name: "Spanish",
    designators: &['Z'],
    glyphs: &[
        ('#', '£'),
        ('@', '§'),
        ('[', '¡'),
        ('\\', 'Ñ'),
        (']', '¿'),
        ('{', '°'),
        ('|', 'ñ'),
        ('}', 'ç'),
    ],
};

static SWEDISH: CharacterMap = CharacterMap {
    name: "Swedish",
    designators: &['H', '7'],
    glyphs: &[
        ('@', 'É'),
        ('[', 'Ä'),
        ('\\', 'Ö'),
        (']', 'Å'),
        ('^', 'Ü'),
        ('`', 'é'),
        ('{', 'ä'),
        ('|', 'ö'),
        ('}', 'å'),
        ('~', 'ü'),
    ],
};

static SWISS: CharacterMap = CharacterMap {
    name: "Swiss",
    designators: &['='],
    glyphs: &[
        ('#', 'ù'),
        ('@', 'à'),
        ('[', 'é'),
        ('\\', 'ç'),
        (']', 'ê'),
        ('^', 'î'),
        ('_', 'è'),
        ('`', 'ô'),
        ('{', 'ä'),
        ('|', 'ö'),
        ('}', 'ü'),
        ('~', 'û'),
    ],
};

static MAPS: &[&CharacterMap] = &[
    &US_ASCII,
    &DEC_GRAPHICS,
    &UNITED_KINGDOM,
    &DUTCH,
    &FINNISH,
    &FRENCH,
    &FRENCH_CANADIAN,
    &GERMAN,
    &ITALIAN,
    &NORWEGIAN_DANISH,
    &SPANISH,
    &SWEDISH,
    &SWISS,
];

/// Look up a map by its designation character
pub fn character_map(designator: char) -> Option<&'static CharacterMap> {
    MAPS.iter()
        .copied()
        .find(|map| map.designators.contains(&designator))
}

/// One of the four designation slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Slot {
    #[default]
    G0,
    G1,
    G2,
    G3,
}

impl Slot {
    fn index(self) -> usize {
        match self {
            Slot::G0 => 0,
            Slot::G1 => 1,
            Slot::G2 => 2,
            Slot::G3 => 3,
        }
    }

    /// Slot designated by an SCS intermediate (`(`, `)`, `*`, `+`, `-`, `.`, `/`)
    pub fn from_intermediate(c: char) -> Option<Slot> {
        match c {
            '(' => Some(Slot::G0),
            ')' | '-' => Some(Slot::G1),
            '*' | '.' => Some(Slot::G2),
            '+' | '/' => Some(Slot::G3),
            _ => None,
        }
    }
}

/// Coding system selected by DOCS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CodingSystem {
    #[default]
    Iso2022,
    Utf8,
    /// UTF-8 with no way back
    Utf8Locked,
}

impl CodingSystem {
    pub fn is_utf8(self) -> bool {
        !matches!(self, CodingSystem::Iso2022)
    }
}

/// Designations plus the GL/GR selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharsetState {
    designations: [&'static CharacterMap; 4],
    pub gl: Slot,
    pub gr: Slot,
}

impl Default for CharsetState {
    fn default() -> Self {
        Self {
            designations: [&US_ASCII; 4],
            gl: Slot::G0,
            gr: Slot::G0,
        }
    }
}

impl CharsetState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn designate(&mut self, slot: Slot, map: &'static CharacterMap) {
        self.designations[slot.index()] = map;
    }

    pub fn designation(&self, slot: Slot) -> &'static CharacterMap {
        self.designations[slot.index()]
    }

    /// The map currently invoked into GL
    pub fn gl_map(&self) -> &'static CharacterMap {
        self.designation(self.gl)
    }

    pub fn gr_map(&self) -> &'static CharacterMap {
        self.designation(self.gr)
    }
}
