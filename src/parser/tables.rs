//! Dispatch tables
//!
//! Each table maps a code to a [`Handler`]: either the ignore sentinel for
//! sequences that are recognized but deliberately unimplemented, or an
//! operation from the table's closed set. The tables are built once per
//! terminal and never mutated.

use std::collections::HashMap;

/// What to do with a recognized code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler<Op> {
    /// Known, deliberately not acted on
    Ignore,
    /// Run the operation; sequences with `:` sub-parameters are dropped
    Op(Op),
    /// Run the operation, sub-parameters included
    OpWithSubargs(Op),
}

impl<Op> Handler<Op> {
    pub fn supports_subargs(&self) -> bool {
        matches!(self, Handler::OpWithSubargs(_))
    }

    /// The operation to run, `None` for the ignore sentinel
    pub fn op(self) -> Option<Op> {
        match self {
            Handler::Ignore => None,
            Handler::Op(op) | Handler::OpWithSubargs(op) => Some(op),
        }
    }
}

/// Single-character controls (C0 and C1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cc1Op {
    Bell,
    Backspace,
    Tab,
    /// LF, VT and FF
    FormFeed,
    CarriageReturn,
    ShiftOut,
    ShiftIn,
    /// CAN and SUB
    Cancel,
    Escape,
    Index,
    NextLine,
    TabSet,
    ReverseIndex,
    Dcs,
    DecId,
    Csi,
    Osc,
    Pm,
    Apc,
}

/// Two and three character escape sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscOp {
    /// `ESC space X`
    SkipNext,
    /// `ESC # X`
    Hash,
    /// `ESC % X`
    Docs,
    /// `ESC ( X` and the other SCS intermediates
    Designate(char),
    SaveCursor,
    RestoreCursor,
    KeypadApplication,
    KeypadNumeric,
    FullReset,
    LockingShift2,
    LockingShift3,
    LockingShift1Right,
    LockingShift2Right,
    LockingShift3Right,
    /// 7-bit form of a C1 control
    C1(Cc1Op),
}

/// Control sequences, keyed by modifiers plus final byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsiOp {
    InsertBlanks,
    CursorUp,
    CursorDown,
    CursorForward,
    CursorBackward,
    CursorNextLine,
    CursorPrecedingLine,
    CursorColumn,
    CursorPosition,
    ForwardTab,
    EraseDisplay,
    EraseLine,
    InsertLines,
    DeleteLines,
    DeleteChars,
    ScrollUp,
    ScrollDown,
    EraseChars,
    BackwardTab,
    CursorColumnRelative,
    PrimaryAttributes,
    SecondaryAttributes,
    CursorRow,
    TabClear,
    SetAnsiMode,
    ResetAnsiMode,
    SetDecMode,
    ResetDecMode,
    Sgr,
    DeviceStatus,
    DecDeviceStatus,
    SoftReset,
    CursorStyle,
    ScrollRegion,
    SaveCursor,
    RestoreCursor,
    TileData,
}

/// Operating system commands, keyed by number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscOp {
    SetTitle,
    Palette,
    Hyperlink,
    Notify,
    ForegroundColor,
    BackgroundColor,
    CursorColor,
    CursorShape,
    Clipboard,
    ResetPalette,
    ResetForeground,
    ResetBackground,
    ResetCursorColor,
    InlineImage,
    Urxvt,
}

/// Modifier characters plus the final byte of a control sequence
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CsiCode {
    pub modifiers: String,
    pub final_byte: char,
}

impl CsiCode {
    pub fn new(leading: &str, trailing: &str, final_byte: char) -> Self {
        Self {
            modifiers: format!("{leading}{trailing}"),
            final_byte,
        }
    }

    /// Parse the textual form, e.g. `"?h"`
    fn from_key(key: &str) -> Self {
        let mut chars = key.chars();
        let final_byte = chars.next_back().unwrap_or('\0');
        Self {
            modifiers: chars.as_str().to_string(),
            final_byte,
        }
    }
}

impl std::fmt::Display for CsiCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.modifiers, self.final_byte)
    }
}

/// Every table the interpreter dispatches through
#[derive(Debug, Clone)]
pub struct DispatchTables {
    pub cc1: HashMap<char, Handler<Cc1Op>>,
    pub esc: HashMap<char, Handler<EscOp>>,
    pub csi: HashMap<CsiCode, Handler<CsiOp>>,
    pub osc: HashMap<u32, Handler<OscOp>>,
}

impl Default for DispatchTables {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchTables {
    pub fn new() -> Self {
        Self {
            cc1: cc1_table(),
            esc: esc_table(),
            csi: csi_table(),
            osc: osc_table(),
        }
    }

    /// The characters that interrupt plain text. C1 codes are excluded in
    /// UTF-8 mode, where they are ordinary (if odd) characters.
    pub fn control_set(&self, utf8: bool) -> ControlSet {
        let mut set = ControlSet::default();
        for &c in self.cc1.keys() {
            if utf8 && c >= '\u{80}' {
                continue;
            }
            set.insert(c);
        }
        set
    }
}

/// Membership test for control characters below U+00A0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlSet {
    bits: [bool; 0xa0],
}

impl Default for ControlSet {
    fn default() -> Self {
        Self { bits: [false; 0xa0] }
    }
}

impl ControlSet {
    fn insert(&mut self, c: char) {
        if let Some(slot) = self.bits.get_mut(c as usize) {
            *slot = true;
        }
    }

    pub fn contains(&self, c: char) -> bool {
        self.bits.get(c as usize).copied().unwrap_or(false)
    }
}

fn cc1_table() -> HashMap<char, Handler<Cc1Op>> {
    use Cc1Op::*;
    use Handler::{Ignore, Op};

    HashMap::from([
        ('\x00', Ignore),
        ('\x05', Ignore),
        ('\x07', Op(Bell)),
        ('\x08', Op(Backspace)),
        ('\x09', Op(Tab)),
        ('\x0a', Op(FormFeed)),
        ('\x0b', Op(FormFeed)),
        ('\x0c', Op(FormFeed)),
        ('\x0d', Op(CarriageReturn)),
        ('\x0e', Op(ShiftOut)),
        ('\x0f', Op(ShiftIn)),
        ('\x11', Ignore),
        ('\x13', Ignore),
        ('\x18', Op(Cancel)),
        ('\x1a', Op(Cancel)),
        ('\x1b', Op(Escape)),
        ('\x7f', Ignore),
        ('\u{84}', Op(Index)),
        ('\u{85}', Op(NextLine)),
        ('\u{88}', Op(TabSet)),
        ('\u{8d}', Op(ReverseIndex)),
        ('\u{8e}', Ignore),
        ('\u{8f}', Ignore),
        ('\u{90}', Op(Dcs)),
        ('\u{96}', Ignore),
        ('\u{97}', Ignore),
        ('\u{98}', Ignore),
        ('\u{9a}', Op(DecId)),
        ('\u{9b}', Op(Csi)),
        ('\u{9c}', Ignore),
        ('\u{9d}', Op(Osc)),
        ('\u{9e}', Op(Pm)),
        ('\u{9f}', Op(Apc)),
    ])
}

fn esc_table() -> HashMap<char, Handler<EscOp>> {
    use EscOp::*;
    use Handler::{Ignore, Op};

    let mut table = HashMap::from([
        (' ', Op(SkipNext)),
        ('#', Op(Hash)),
        ('%', Op(Docs)),
        ('6', Ignore),
        ('7', Op(SaveCursor)),
        ('8', Op(RestoreCursor)),
        ('9', Ignore),
        ('=', Op(KeypadApplication)),
        ('>', Op(KeypadNumeric)),
        ('F', Ignore),
        ('c', Op(FullReset)),
        ('l', Ignore),
        ('m', Ignore),
        ('n', Op(LockingShift2)),
        ('o', Op(LockingShift3)),
        ('|', Op(LockingShift3Right)),
        ('}', Op(LockingShift2Right)),
        ('~', Op(LockingShift1Right)),
        ('N', Ignore),
        ('O', Ignore),
        ('V', Ignore),
        ('W', Ignore),
        ('X', Ignore),
        ('\\', Ignore),
    ]);

    for c in ['(', ')', '*', '+', '-', '.', '/'] {
        table.insert(c, Op(Designate(c)));
    }

    for (c, op) in [
        ('D', Cc1Op::Index),
        ('E', Cc1Op::NextLine),
        ('H', Cc1Op::TabSet),
        ('M', Cc1Op::ReverseIndex),
        ('P', Cc1Op::Dcs),
        ('Z', Cc1Op::DecId),
        ('[', Cc1Op::Csi),
        (']', Cc1Op::Osc),
        ('^', Cc1Op::Pm),
        ('_', Cc1Op::Apc),
    ] {
        table.insert(c, Op(C1(op)));
    }
    table
}

fn csi_table() -> HashMap<CsiCode, Handler<CsiOp>> {
    use CsiOp::*;
    use Handler::{Ignore, Op, OpWithSubargs};

    let ops = [
        ("@", Op(InsertBlanks)),
        ("A", Op(CursorUp)),
        ("B", Op(CursorDown)),
        ("C", Op(CursorForward)),
        ("D", Op(CursorBackward)),
        ("E", Op(CursorNextLine)),
        ("F", Op(CursorPrecedingLine)),
        ("G", Op(CursorColumn)),
        ("H", Op(CursorPosition)),
        ("I", Op(ForwardTab)),
        ("J", Op(EraseDisplay)),
        ("?J", Op(EraseDisplay)),
        ("K", Op(EraseLine)),
        ("?K", Op(EraseLine)),
        ("L", Op(InsertLines)),
        ("M", Op(DeleteLines)),
        ("P", Op(DeleteChars)),
        ("S", Op(ScrollUp)),
        ("T", Op(ScrollDown)),
        (">T", Ignore),
        ("X", Op(EraseChars)),
        ("Z", Op(BackwardTab)),
        ("`", Op(CursorColumn)),
        ("a", Op(CursorColumnRelative)),
        ("b", Ignore),
        ("c", Op(PrimaryAttributes)),
        (">c", Op(SecondaryAttributes)),
        ("d", Op(CursorRow)),
        ("f", Op(CursorPosition)),
        ("g", Op(TabClear)),
        ("h", Op(SetAnsiMode)),
        ("?h", Op(SetDecMode)),
        ("i", Ignore),
        ("?i", Ignore),
        ("l", Op(ResetAnsiMode)),
        ("?l", Op(ResetDecMode)),
        ("m", OpWithSubargs(Sgr)),
        (">m", Ignore),
        ("n", Op(DeviceStatus)),
        (">n", Ignore),
        ("?n", Op(DecDeviceStatus)),
        (">p", Ignore),
        ("!p", Op(SoftReset)),
        ("$p", Ignore),
        ("?$p", Ignore),
        ("\"p", Ignore),
        ("q", Ignore),
        (" q", Op(CursorStyle)),
        ("\"q", Ignore),
        ("r", Op(ScrollRegion)),
        ("?r", Ignore),
        ("$r", Ignore),
        ("s", Op(SaveCursor)),
        ("?s", Ignore),
        ("t", Ignore),
        ("$t", Ignore),
        (">t", Ignore),
        (" t", Ignore),
        ("u", Op(RestoreCursor)),
        (" u", Ignore),
        ("$v", Ignore),
        ("'w", Ignore),
        ("x", Ignore),
        ("*x", Ignore),
        ("$x", Ignore),
        ("z", Op(TileData)),
        ("'z", Ignore),
        ("$z", Ignore),
        ("'{", Ignore),
        ("'|", Ignore),
        ("'}", Ignore),
        ("'~", Ignore),
    ];

    ops.into_iter()
        .map(|(key, handler)| (CsiCode::from_key(key), handler))
        .collect()
}

fn osc_table() -> HashMap<u32, Handler<OscOp>> {
    use Handler::Op;
    use OscOp::*;

    HashMap::from([
        (0, Op(SetTitle)),
        (2, Op(SetTitle)),
        (4, Op(Palette)),
        (8, Op(Hyperlink)),
        (9, Op(Notify)),
        (10, Op(ForegroundColor)),
        (11, Op(BackgroundColor)),
        (12, Op(CursorColor)),
        (50, Op(CursorShape)),
        (52, Op(Clipboard)),
        (104, Op(ResetPalette)),
        (110, Op(ResetForeground)),
        (111, Op(ResetBackground)),
        (112, Op(ResetCursorColor)),
        (777, Op(Urxvt)),
        (1337, Op(InlineImage)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csi_code_from_key() {
        let code = CsiCode::from_key("?$p");
        assert_eq!(code.modifiers, "?$");
        assert_eq!(code.final_byte, 'p');
        assert_eq!(code, CsiCode::new("?", "$", 'p'));
        assert_eq!(code.to_string(), "?$p");
    }

    #[test]
    fn test_only_sgr_supports_subargs() {
        let tables = DispatchTables::new();
        let with_subargs: Vec<_> = tables
            .csi
            .iter()
            .filter(|(_, h)| h.supports_subargs())
            .map(|(code, _)| code.to_string())
            .collect();
        assert_eq!(with_subargs, vec!["m".to_string()]);
    }

    #[test]
    fn test_control_set_by_coding_system() {
        let tables = DispatchTables::new();
        let iso = tables.control_set(false);
        let utf8 = tables.control_set(true);

        assert!(iso.contains('\x1b'));
        assert!(iso.contains('\u{9b}'));
        assert!(!iso.contains('\x01'));
        assert!(!iso.contains('A'));

        assert!(utf8.contains('\x1b'));
        assert!(!utf8.contains('\u{9b}'));
        assert!(!utf8.contains('\u{4e2d}'));
    }

    #[test]
    fn test_c1_aliases_in_esc_table() {
        let tables = DispatchTables::new();
        assert_eq!(tables.esc.get(&'['), Some(&Handler::Op(EscOp::C1(Cc1Op::Csi))));
        assert_eq!(tables.esc.get(&'N'), Some(&Handler::Ignore));
        assert!(tables.esc.get(&'!').is_none());
    }
}
