//! Terminal Interpreter
//!
//! Ties together the parse state, the dispatch tables and the screens.
//! [`Terminal::interpret`] runs the parse loop: each step calls the
//! current parse function, which consumes input and either prints text,
//! accumulates sequence arguments or dispatches a completed sequence.
//! Sequences may span calls; the parse state persists between them.
//!
//! The handlers themselves live in the submodules:
//! - `dispatch`: single-character controls and escape sequences
//! - `csi`: control sequences and mode switching
//! - `sgr`: graphic rendition
//! - `osc`: operating system commands
//! - `host`: the grid operations the handlers drive

mod csi;
mod dispatch;
mod event;
mod host;
mod osc;
mod sgr;

use std::collections::{BTreeSet, VecDeque};
use std::time::Duration;

use tracing::{debug, error, trace, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::VtConfig;
use crate::core::{
    character_map, CharsetState, CodingSystem, Cursor, Modes, Palette, ResolvedStyle, Rgb, Row,
    Screen, Slot, Snapshot, TextAttributes, WidthTable,
};
use crate::input::{MouseEncoder, MouseEvent};
use crate::parser::{ControlSet, CsiCode, DispatchTables, ParseFn, ParseState, StringKind, Utf8Decoder};

pub use event::{InlineImage, Notification, TerminalEvent};
pub use osc::{decode_base64, parse_inline_image};

/// Rows shifted off the primary screen are kept up to this many
const MAX_SCROLLED_OFF: usize = 10_000;

/// Outcome of scanning for a string terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringScan {
    /// Terminator found; the body is in `args[0]`
    Terminated,
    /// Chunk consumed, still waiting for the terminator
    Pending,
    /// Sequence abandoned; its text is being re-read as plain input
    Aborted,
}

/// A VT interpreter driving a primary and an alternate screen
#[derive(Debug)]
pub struct Terminal {
    config: VtConfig,
    clock: Box<dyn Clock>,
    tables: DispatchTables,
    control_set: ControlSet,
    parse: ParseState,
    decoder: Utf8Decoder,
    leading_modifier: String,
    trailing_modifier: String,
    coding: CodingSystem,
    charsets: CharsetState,
    width_table: WidthTable,
    primary: Screen,
    alternate: Screen,
    alternate_active: bool,
    modes: Modes,
    palette: Palette,
    /// Scroll region bounds; `None` means the screen edge
    scroll_top: Option<usize>,
    scroll_bottom: Option<usize>,
    tab_stops: BTreeSet<usize>,
    default_tab_stops: bool,
    mouse: MouseEncoder,
    title: String,
    foreground_color: Option<Rgb>,
    background_color: Option<Rgb>,
    cursor_color: Option<Rgb>,
    events: Vec<TerminalEvent>,
    responses: Vec<String>,
    scrolled_off: VecDeque<Row>,
}

impl Terminal {
    /// Create a terminal reading time from the system clock
    pub fn new(config: VtConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock::new()))
    }

    /// Create a terminal with an explicit time source
    pub fn with_clock(config: VtConfig, clock: Box<dyn Clock>) -> Self {
        if let Err(e) = config.validate() {
            warn!("{}; using a 1x1 minimum", e);
        }
        let columns = config.columns.max(1);
        let rows = config.rows.max(1);
        let width_table = WidthTable::new(config.ambiguous_wide);
        let tables = DispatchTables::new();
        let coding = if config.utf8_default {
            CodingSystem::Utf8
        } else {
            CodingSystem::Iso2022
        };

        let mut terminal = Self {
            control_set: tables.control_set(coding.is_utf8()),
            tables,
            clock,
            parse: ParseState::new(),
            decoder: Utf8Decoder::new(),
            leading_modifier: String::new(),
            trailing_modifier: String::new(),
            coding,
            charsets: CharsetState::default(),
            width_table,
            primary: new_screen(columns, rows, width_table),
            alternate: new_screen(columns, rows, width_table),
            alternate_active: false,
            modes: Modes::with_column_width_changes(config.allow_column_width_changes),
            palette: Palette::default(),
            scroll_top: None,
            scroll_bottom: None,
            tab_stops: BTreeSet::new(),
            default_tab_stops: true,
            mouse: MouseEncoder::new(config.alt_is_meta),
            title: String::new(),
            foreground_color: None,
            background_color: None,
            cursor_color: None,
            events: Vec::new(),
            responses: Vec::new(),
            scrolled_off: VecDeque::new(),
            config,
        };
        terminal.set_default_tab_stops();
        terminal
    }

    pub fn config(&self) -> &VtConfig {
        &self.config
    }

    /// The active screen
    pub fn screen(&self) -> &Screen {
        if self.alternate_active {
            &self.alternate
        } else {
            &self.primary
        }
    }

    pub(crate) fn screen_mut(&mut self) -> &mut Screen {
        if self.alternate_active {
            &mut self.alternate
        } else {
            &mut self.primary
        }
    }

    pub fn primary_screen(&self) -> &Screen {
        &self.primary
    }

    pub fn alternate_screen(&self) -> &Screen {
        &self.alternate
    }

    pub fn is_alternate_screen(&self) -> bool {
        self.alternate_active
    }

    pub fn column_count(&self) -> usize {
        self.screen().column_count()
    }

    pub fn row_count(&self) -> usize {
        self.screen().row_count()
    }

    pub fn cursor(&self) -> Cursor {
        self.screen().cursor()
    }

    pub fn modes(&self) -> &Modes {
        &self.modes
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn text_attributes(&self) -> &TextAttributes {
        &self.screen().text_attributes
    }

    /// Concrete colors for `attrs` under the current palette
    pub fn resolve_style(&self, attrs: &TextAttributes) -> ResolvedStyle {
        attrs.resolve(&self.palette, self.config.bold_as_bright)
    }

    pub fn charsets(&self) -> &CharsetState {
        &self.charsets
    }

    pub fn coding_system(&self) -> CodingSystem {
        self.coding
    }

    /// Scroll region as inclusive (top, bottom) rows, when one is set
    pub fn scroll_region(&self) -> Option<(usize, usize)> {
        if self.scroll_top.is_none() && self.scroll_bottom.is_none() {
            return None;
        }
        Some((self.vt_scroll_top(), self.vt_scroll_bottom()))
    }

    pub fn tab_stops(&self) -> Vec<usize> {
        self.tab_stops.iter().copied().collect()
    }

    pub fn mouse(&self) -> &MouseEncoder {
        &self.mouse
    }

    /// Colors set by OSC 10/11/12; `None` is the embedder's default
    pub fn foreground_color(&self) -> Option<Rgb> {
        self.foreground_color
    }

    pub fn background_color(&self) -> Option<Rgb> {
        self.background_color
    }

    pub fn cursor_color(&self) -> Option<Rgb> {
        self.cursor_color
    }

    /// Text of every visible row
    pub fn rows_text(&self) -> Vec<String> {
        self.screen().rows().iter().map(Row::text).collect()
    }

    /// Text of the wrapped line starting at `row`
    pub fn line_text(&self, row: usize) -> String {
        self.screen().line_text(row)
    }

    /// Drain queued events
    pub fn take_events(&mut self) -> Vec<TerminalEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drain queued replies for the remote end (device reports, palette
    /// queries)
    pub fn take_responses(&mut self) -> Vec<String> {
        std::mem::take(&mut self.responses)
    }

    /// Drain rows that scrolled off the top of the primary screen
    pub fn take_scrolled_off(&mut self) -> Vec<Row> {
        self.scrolled_off.drain(..).collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::from_screen(self.screen());
        snapshot.scroll_region = self.scroll_region();
        snapshot.modes = self.modes.clone();
        snapshot.title = self.title.clone();
        snapshot.alternate_screen = self.alternate_active;
        snapshot
    }

    /// Encode a mouse event for the active tracking mode. The caller
    /// sends the result to the remote end.
    pub fn encode_mouse(&mut self, event: &MouseEvent) -> Option<String> {
        self.mouse.encode(event)
    }

    /// Return to the freshly constructed state, keeping the grid size.
    /// Any partial sequence is discarded.
    pub fn reset(&mut self) {
        self.full_reset();
        self.parse.reset("");
        self.decoder.reset();
        self.leading_modifier.clear();
        self.trailing_modifier.clear();
        self.set_coding_system(if self.config.utf8_default {
            CodingSystem::Utf8
        } else {
            CodingSystem::Iso2022
        });
        self.title.clear();
        self.foreground_color = None;
        self.background_color = None;
        self.cursor_color = None;
        self.scrolled_off.clear();
        self.events.clear();
        self.responses.clear();
    }

    /// Feed raw bytes. UTF-8 sequences split across calls are held until
    /// complete; invalid bytes become U+FFFD.
    pub fn interpret_bytes(&mut self, bytes: &[u8]) {
        let text = self.decoder.decode(bytes);
        if !text.is_empty() {
            self.interpret(&text);
        }
    }

    /// Interpret a chunk of input
    pub fn interpret(&mut self, text: &str) {
        let mut parse = std::mem::take(&mut self.parse);
        parse.reset_buf(text);

        while !parse.is_complete() {
            let func = parse.func;
            let position = parse.position();
            let generation = parse.generation();

            self.step(&mut parse);

            if parse.func == func
                && parse.position() == position
                && parse.generation() == generation
            {
                error!("Parser did not alter the state in {:?} at {}", func, position);
                parse.advance(1);
            }
        }

        self.parse = parse;
    }

    fn step(&mut self, parse: &mut ParseState) {
        match parse.func {
            ParseFn::Ground => self.parse_ground(parse),
            ParseFn::Escape => self.parse_escape(parse),
            ParseFn::EscapeSpace => {
                let c = parse.consume_char();
                self.unimplemented(&format!("ESC 0x20 {:?}", c));
                parse.reset_parse_function();
            }
            ParseFn::EscapeHash => {
                if parse.consume_char() == Some('8') {
                    self.set_cursor_position(0, 0);
                    self.fill('E');
                }
                parse.reset_parse_function();
            }
            ParseFn::Docs => self.parse_docs(parse),
            ParseFn::Designate(code) => self.parse_designate(code, parse),
            ParseFn::Csi => self.parse_csi(parse),
            ParseFn::Osc => self.parse_osc(parse),
            ParseFn::String(kind) => self.parse_string(kind, parse),
        }
    }

    /// Print plain text up to the next control, then dispatch the control
    fn parse_ground(&mut self, parse: &mut ParseState) {
        let (text, control) = {
            let remaining = parse.remaining();
            match remaining.iter().position(|&c| self.control_set.contains(c)) {
                Some(i) => (remaining[..i].iter().collect::<String>(), Some((i, remaining[i]))),
                None => (remaining.iter().collect::<String>(), None),
            }
        };

        if !text.is_empty() {
            self.print_translated(&text);
        }

        match control {
            Some((index, c)) => {
                self.dispatch_cc1(c, parse);
                parse.advance(index + 1);
            }
            None => parse.reset(""),
        }
    }

    fn print_translated(&mut self, text: &str) {
        if self.coding.is_utf8() {
            self.print(text);
            return;
        }

        let gl = self.charsets.gl_map();
        let gr = self.charsets.gr_map();
        let mut translated = gl.translate(text);
        if !gr.is_identity() {
            translated = translated
                .chars()
                .map(|c| match c {
                    '\u{a1}'..='\u{fe}' => {
                        let low = char::from_u32(c as u32 - 0x80).unwrap_or(c);
                        let mapped = gr.map_char(low);
                        if mapped == low {
                            c
                        } else {
                            mapped
                        }
                    }
                    _ => c,
                })
                .collect::<String>()
                .into();
        }
        self.print(&translated);
    }

    fn parse_escape(&mut self, parse: &mut ParseState) {
        let Some(c) = parse.consume_char() else {
            return;
        };
        // A second ESC starts over
        if c == '\x1b' {
            return;
        }

        self.dispatch_esc(c, parse);

        if parse.func == ParseFn::Escape {
            parse.reset_parse_function();
        }
    }

    /// `ESC % X`: select the coding system
    fn parse_docs(&mut self, parse: &mut ParseState) {
        let c = parse.consume_char();

        if self.coding == CodingSystem::Utf8Locked {
            if c == Some('/') {
                parse.consume_char();
            }
            parse.reset_parse_function();
            return;
        }

        match c {
            Some('@') => self.set_coding_system(CodingSystem::Iso2022),
            Some('G') => self.set_coding_system(CodingSystem::Utf8),
            Some('/') => match parse.consume_char() {
                Some('G' | 'H' | 'I') => self.set_coding_system(CodingSystem::Utf8Locked),
                other => self.unimplemented(&format!("ESC % / {:?}", other)),
            },
            other => self.unimplemented(&format!("ESC % {:?}", other)),
        }

        parse.reset_parse_function();
    }

    pub(crate) fn set_coding_system(&mut self, coding: CodingSystem) {
        self.coding = coding;
        self.control_set = self.tables.control_set(coding.is_utf8());
    }

    /// `ESC ( X` and friends: designate a character map
    fn parse_designate(&mut self, code: char, parse: &mut ParseState) {
        let Some(c) = parse.consume_char() else {
            return;
        };
        if c == '\x1b' {
            parse.func = ParseFn::Escape;
            return;
        }

        match (Slot::from_intermediate(code), character_map(c)) {
            (Some(slot), Some(map)) => self.charsets.designate(slot, map),
            _ => self.unimplemented(&format!("character set {:?} for {:?}", c, code)),
        }

        parse.reset_parse_function();
    }

    pub(crate) fn enter_csi(&mut self, parse: &mut ParseState) {
        parse.reset_arguments();
        self.leading_modifier.clear();
        self.trailing_modifier.clear();
        parse.func = ParseFn::Csi;
    }

    fn parse_csi(&mut self, parse: &mut ParseState) {
        let Some(c) = parse.peek_char() else {
            return;
        };

        match c {
            '@'..='~' => {
                let code = CsiCode::new(&self.leading_modifier, &self.trailing_modifier, c);
                self.dispatch_csi(&code, parse);
                finish_sequence(parse);
            }
            ';' => {
                if !self.trailing_modifier.is_empty() {
                    finish_sequence(parse);
                } else {
                    // An omitted first parameter is still a parameter
                    if parse.args.is_empty() {
                        parse.args.push(String::new());
                    }
                    parse.args.push(String::new());
                }
            }
            '0'..='9' | ':' => {
                if !self.trailing_modifier.is_empty() {
                    finish_sequence(parse);
                } else {
                    parse.push_to_last_arg(c);
                    if c == ':' {
                        let index = parse.args.len() - 1;
                        parse.mark_subargs(index);
                    }
                }
            }
            ' '..='?' => {
                if parse.args.is_empty() {
                    self.leading_modifier.push(c);
                } else {
                    self.trailing_modifier.push(c);
                }
            }
            c if self.control_set.contains(c) => self.dispatch_cc1(c, parse),
            _ => {
                debug!("Unexpected {:?} in control sequence", c);
                finish_sequence(parse);
            }
        }

        parse.advance(1);
    }

    fn parse_osc(&mut self, parse: &mut ParseState) {
        if self.scan_string(parse, true) != StringScan::Terminated {
            return;
        }

        let body = parse.arg(0).to_string();
        parse.reset_arguments();

        let digits = body.bytes().take_while(u8::is_ascii_digit).count();
        let (code, rest) = body.split_at(digits);
        let rest = rest.strip_prefix(';').unwrap_or(rest);
        if code.is_empty() || rest.contains(['\n', '\r']) {
            warn!("Invalid OSC: {:?}", body);
            return;
        }

        self.dispatch_osc(code, rest);
    }

    /// DCS, PM and APC are collected and dropped
    fn parse_string(&mut self, kind: StringKind, parse: &mut ParseState) {
        if self.scan_string(parse, false) == StringScan::Terminated {
            debug!("Ignored {:?} string: {:?}", kind, parse.arg(0));
            parse.reset_arguments();
        }
    }

    /// Accumulate string-sequence text in `args[0]` until `ESC \` (or BEL
    /// when `bel_terminates`).
    ///
    /// A trailing ESC is held back in case the next chunk starts with `\`.
    /// An ESC anywhere else, or running past the time limit, abandons the
    /// sequence and re-reads its text from Ground.
    fn scan_string(&mut self, parse: &mut ParseState, bel_terminates: bool) -> StringScan {
        let now = self.clock.now();
        if parse.args.is_empty() {
            parse.args.push(String::new());
            parse.string_started = Some(now);
        } else if parse.args[0].ends_with('\x1b') {
            parse.args[0].pop();
            let mut buf = Vec::with_capacity(parse.remaining().len() + 1);
            buf.push('\x1b');
            buf.extend_from_slice(parse.remaining());
            parse.replace_remaining(buf);
        }

        let (text, terminator, escape_at, len) = {
            let remaining = parse.remaining();
            let found = remaining
                .iter()
                .position(|&c| c == '\x1b' || (bel_terminates && c == '\x07'));
            let terminator = match found {
                Some(i) if remaining[i] == '\x07' => Some((i, 1)),
                Some(i) if remaining.get(i + 1) == Some(&'\\') => Some((i, 2)),
                _ => None,
            };
            let end = terminator.map_or(remaining.len(), |(i, _)| i);
            (
                remaining[..end].iter().collect::<String>(),
                terminator,
                found,
                remaining.len(),
            )
        };

        parse.args[0].push_str(&text);

        if let Some((index, terminator_len)) = terminator {
            parse.reset_parse_function();
            parse.advance(index + terminator_len);
            return StringScan::Terminated;
        }

        let started = parse.string_started.unwrap_or(now);
        let elapsed = now.saturating_sub(started);
        let reason = if elapsed > Duration::from_millis(self.config.osc_time_limit_ms) {
            Some(format!("timeout expired after {:?}", elapsed))
        } else {
            escape_at
                .filter(|&i| i + 1 != len)
                .map(|i| format!("embedded escape at {}", i))
        };

        if let Some(reason) = reason {
            debug!("Aborting string sequence: {}", reason);
            let text = std::mem::take(&mut parse.args[0]);
            parse.reset(&text);
            return StringScan::Aborted;
        }

        parse.advance(len);
        StringScan::Pending
    }

    /// Log a code with no handler
    fn unknown(&self, table: &str, code: &str) {
        if self.config.warn_unimplemented {
            warn!("Unknown {} code: {:?}", table, code);
        } else {
            trace!("Unknown {} code: {:?}", table, code);
        }
    }

    /// Log a recognized variant that is not acted on
    fn unimplemented(&self, what: &str) {
        if self.config.warn_unimplemented {
            warn!("Unimplemented: {}", what);
        } else {
            trace!("Unimplemented: {}", what);
        }
    }

    pub(crate) fn emit(&mut self, event: TerminalEvent) {
        self.events.push(event);
    }

    pub(crate) fn respond(&mut self, response: impl Into<String>) {
        self.responses.push(response.into());
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new(VtConfig::default())
    }
}

fn new_screen(columns: usize, rows: usize, width_table: WidthTable) -> Screen {
    let mut screen = Screen::new(columns, width_table);
    screen.push_rows((0..rows).map(|_| Row::new()).collect());
    screen.set_cursor_position(0, 0);
    screen
}

/// End of a control sequence, dispatched or not
fn finish_sequence(parse: &mut ParseState) {
    parse.reset_arguments();
    parse.clear_subargs();
    parse.reset_parse_function();
}
