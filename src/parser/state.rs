//! Persistent parse state
//!
//! One `ParseState` lives as long as the terminal so a sequence can span
//! several input chunks. It holds the chunk being scanned, the position in
//! it, the parse function to run next and the accumulated arguments.

use std::collections::BTreeSet;
use std::time::Duration;

/// Which string sequence is being collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringKind {
    Dcs,
    Pm,
    Apc,
}

/// The parse function to run on the next character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseFn {
    /// Plain text until the next control character
    #[default]
    Ground,
    /// After ESC
    Escape,
    /// After `ESC space`; the next character is swallowed
    EscapeSpace,
    /// After `ESC #`
    EscapeHash,
    /// After `ESC %`
    Docs,
    /// After an SCS intermediate such as `ESC (`
    Designate(char),
    /// Inside a control sequence
    Csi,
    /// Inside an operating system command
    Osc,
    /// Inside DCS, PM or APC
    String(StringKind),
}

/// Input buffer, position and argument accumulator
#[derive(Debug, Clone, Default)]
pub struct ParseState {
    buf: Vec<char>,
    pos: usize,
    generation: u64,
    pub func: ParseFn,
    pub args: Vec<String>,
    subargs: BTreeSet<usize>,
    /// When the current string sequence started
    pub string_started: Option<Duration>,
}

impl ParseState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset everything and start scanning `buf` from Ground
    pub fn reset(&mut self, buf: &str) {
        self.reset_parse_function();
        self.reset_buf(buf);
        self.reset_arguments();
    }

    pub fn reset_parse_function(&mut self) {
        self.func = ParseFn::Ground;
    }

    pub fn reset_buf(&mut self, buf: &str) {
        self.buf = buf.chars().collect();
        self.pos = 0;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Replace the unread input, keeping the parse function and arguments
    pub fn replace_remaining(&mut self, buf: Vec<char>) {
        self.buf = buf;
        self.pos = 0;
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn reset_arguments(&mut self) {
        self.args.clear();
        self.subargs.clear();
        self.string_started = None;
    }

    /// Identifies the current buffer; changes whenever the buffer is replaced
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_complete(&self) -> bool {
        self.pos >= self.buf.len()
    }

    pub fn peek_char(&self) -> Option<char> {
        self.buf.get(self.pos).copied()
    }

    pub fn consume_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += 1;
        Some(c)
    }

    pub fn advance(&mut self, count: usize) {
        self.pos = (self.pos + count).min(self.buf.len());
    }

    pub fn remaining(&self) -> &[char] {
        &self.buf[self.pos.min(self.buf.len())..]
    }

    /// Append a character to the last argument, creating one if needed
    pub fn push_to_last_arg(&mut self, c: char) {
        match self.args.last_mut() {
            Some(last) => last.push(c),
            None => self.args.push(c.to_string()),
        }
    }

    pub fn arg(&self, index: usize) -> &str {
        self.args.get(index).map_or("", String::as_str)
    }

    /// Integer argument; empty, missing, unparsable or zero yield `default`
    pub fn iarg(&self, index: usize, default: u32) -> u32 {
        match parse_int(self.arg(index)) {
            Some(0) | None => default,
            Some(v) => v,
        }
    }

    /// Record that argument `index` carries `:` sub-parameters
    pub fn mark_subargs(&mut self, index: usize) {
        self.subargs.insert(index);
    }

    pub fn arg_has_subargs(&self, index: usize) -> bool {
        self.subargs.contains(&index)
    }

    pub fn has_subargs(&self) -> bool {
        !self.subargs.is_empty()
    }

    pub fn clear_subargs(&mut self) {
        self.subargs.clear();
    }
}

/// Leading decimal digits of `s`, saturating. `None` when there are none.
pub fn parse_int(s: &str) -> Option<u32> {
    let s = s.trim_start();
    let digits = s.bytes().take_while(u8::is_ascii_digit);
    let mut value: Option<u32> = None;
    for d in digits {
        let acc = value.unwrap_or(0);
        value = Some(acc.saturating_mul(10).saturating_add(u32::from(d - b'0')));
    }
    value
}
