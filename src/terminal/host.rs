//! Grid operations
//!
//! The cursor, erase, scrolling and mode-switching primitives the
//! sequence handlers are built from. They work on the active screen and
//! translate VT semantics (origin mode, scroll regions, pending wrap)
//! into [`Screen`] edits.

use std::borrow::Cow;
use std::collections::VecDeque;

use tracing::debug;

use super::{Terminal, TerminalEvent, MAX_SCROLLED_OFF};
use crate::core::{Cursor, Modes, Row, SavedState, Screen, TextAttributes, WidthTable};
use crate::input::MouseReport;

/// Distance between default tab stops
const TAB_WIDTH: usize = 8;

impl Terminal {
    // Printing

    /// Put text on the screen at the cursor, wrapping per the wraparound
    /// mode
    pub(super) fn print(&mut self, text: &str) {
        let wt = self.width_table;
        if text.is_empty() {
            return;
        }
        // Width of `rest`, reduced as pieces are printed
        let mut width = wt.str_width(text);
        if width == 0 {
            self.screen_mut().attach_zero_width(text);
            return;
        }

        let mut rest = text;
        while !rest.is_empty() {
            if self.modes.wraparound && self.cursor().overflow {
                self.screen_mut().commit_line_overflow();
                self.new_line();
            }

            let columns = self.column_count();
            let available = columns.saturating_sub(self.cursor().column);

            let head: Cow<'_, str> = if width <= available {
                width = 0;
                std::mem::take(&mut rest).into()
            } else if self.modes.wraparound {
                let head = wt.substr(rest, 0, Some(available));
                if head.is_empty() {
                    // A wide character facing a single free column
                    if columns >= 2 {
                        self.screen_mut().set_cursor_overflow(true);
                    } else {
                        let (dropped, tail) = split_first_cluster(&wt, rest);
                        width -= wt.str_width(dropped);
                        rest = tail;
                    }
                    continue;
                }
                width -= wt.str_width(head);
                rest = &rest[head.len()..];
                head.into()
            } else {
                // Everything lands in the columns left, and the last one
                // keeps getting overwritten
                let (front, last) = split_last_cluster(&wt, rest);
                let last_width = wt.str_width(last);
                width = 0;
                rest = "";
                if last_width > available {
                    continue;
                }
                let front = wt.substr(front, 0, Some(available - last_width));
                format!("{front}{last}").into()
            };

            let insert = self.modes.insert;
            let screen = self.screen_mut();
            for segment in wt.segments(&head) {
                screen.text_attributes.wide = segment.wide;
                screen.text_attributes.ascii = segment.ascii;
                if insert {
                    screen.insert_string(segment.text, segment.width);
                } else {
                    screen.overwrite_string(segment.text, segment.width);
                }
                screen.text_attributes.wide = false;
                screen.text_attributes.ascii = true;
            }
            screen.maybe_clip_current_row();
        }
    }

    /// Fill every row with `c`. The cursor does not move.
    pub(super) fn fill(&mut self, c: char) {
        let cursor = self.cursor();
        let columns = self.column_count();
        let line: String = std::iter::repeat(c).take(columns).collect();
        let width = self.width_table.str_width(&line);
        for row in 0..self.row_count() {
            self.set_absolute_cursor_position(row, 0);
            self.screen_mut().overwrite_string(&line, width);
        }
        self.restore_cursor(cursor);
    }

    // Line feeds

    /// Move to the start of the next line, scrolling when the cursor is
    /// at the bottom of the scroll region or the screen
    pub(super) fn new_line(&mut self) {
        let row = self.cursor().row;
        if self.has_scroll_region() && row == self.vt_scroll_bottom() {
            self.vt_scroll_up(1);
            self.set_absolute_cursor_position(row, 0);
        } else if row + 1 >= self.row_count() {
            self.scroll_screen_up();
            self.set_absolute_cursor_position(row, 0);
        } else {
            self.set_absolute_cursor_position(row + 1, 0);
        }
    }

    /// New line keeping the column
    pub(super) fn line_feed(&mut self) {
        let column = self.cursor().column;
        self.new_line();
        self.set_cursor_column(column);
    }

    /// LF, VT and FF honor auto carriage return
    pub(super) fn form_feed(&mut self) {
        if self.modes.auto_carriage_return {
            self.new_line();
        } else {
            self.line_feed();
        }
    }

    pub(super) fn reverse_line_feed(&mut self) {
        let row = self.cursor().row;
        if row == self.vt_scroll_top() {
            self.insert_lines(1);
        } else {
            self.set_absolute_cursor_row(row.saturating_sub(1));
        }
    }

    /// Shift the top row out of the screen and append a blank one. Only
    /// the primary screen keeps what scrolled off.
    fn scroll_screen_up(&mut self) {
        let alternate = self.alternate_active;
        let Some(row) = self.screen_mut().shift_row() else {
            return;
        };
        self.screen_mut().push_row(Row::new());
        if !alternate {
            keep_scrolled_off(&mut self.scrolled_off, row);
        }
    }

    // Cursor placement

    /// Move the cursor, relative to the scroll region in origin mode
    pub(super) fn set_cursor_position(&mut self, row: usize, column: usize) {
        if self.modes.origin {
            let top = self.vt_scroll_top();
            let bottom = self.vt_scroll_bottom();
            let row = row.saturating_add(top).clamp(top, bottom);
            self.set_absolute_cursor_position(row, column);
        } else {
            self.set_absolute_cursor_position(row, column);
        }
    }

    /// Move the cursor in screen coordinates, clamping to the grid
    pub(super) fn set_absolute_cursor_position(&mut self, row: usize, column: usize) {
        let last_row = self.row_count().saturating_sub(1);
        let last_column = self.column_count().saturating_sub(1);
        if row > last_row || column > last_column {
            debug!("Clamping cursor position ({}, {})", row, column);
        }
        self.screen_mut()
            .set_cursor_position(row.min(last_row), column.min(last_column));
    }

    pub(super) fn set_cursor_column(&mut self, column: usize) {
        let row = self.cursor().row;
        self.set_absolute_cursor_position(row, column);
    }

    pub(super) fn set_absolute_cursor_row(&mut self, row: usize) {
        let column = self.cursor().column;
        self.set_absolute_cursor_position(row, column);
    }

    pub(super) fn cursor_up(&mut self, count: usize) {
        self.move_cursor_row(-(count.max(1) as i64));
    }

    pub(super) fn cursor_down(&mut self, count: usize) {
        self.move_cursor_row(count.max(1) as i64);
    }

    /// Vertical motion stops at the screen edge, or at the scroll region
    /// in origin mode
    fn move_cursor_row(&mut self, delta: i64) {
        let (min, max) = if self.modes.origin {
            (self.vt_scroll_top(), self.vt_scroll_bottom())
        } else {
            (0, self.row_count().saturating_sub(1))
        };
        let row = (self.cursor().row as i64).saturating_add(delta);
        let row = row.clamp(min as i64, max as i64) as usize;
        self.set_absolute_cursor_row(row);
    }

    pub(super) fn cursor_right(&mut self, count: usize) {
        let column = self.cursor().column.saturating_add(count.max(1));
        self.set_cursor_column(column.min(self.column_count().saturating_sub(1)));
    }

    /// Move left. With reverse wraparound the cursor continues at the end
    /// of the previous row, and from the top row to the bottom one.
    pub(super) fn cursor_left(&mut self, count: usize) {
        let mut count = count.max(1);
        let cursor = self.cursor();

        if !self.modes.reverse_wraparound {
            self.set_cursor_column(cursor.column.saturating_sub(count));
            return;
        }

        if cursor.overflow {
            self.clear_cursor_overflow();
            count -= 1;
            if count == 0 {
                return;
            }
        }

        let width = self.column_count() as i64;
        let height = self.row_count() as i64;
        let position = cursor.row as i64 * width + cursor.column as i64 - count as i64;
        let position = position.rem_euclid(width * height);
        self.set_absolute_cursor_position((position / width) as usize, (position % width) as usize);
    }

    pub(super) fn clear_cursor_overflow(&mut self) {
        self.screen_mut().set_cursor_overflow(false);
    }

    /// Put the cursor back where it was saved, clamped to the current
    /// grid. A column that no longer fits leaves it in overflow.
    pub(super) fn restore_cursor(&mut self, cursor: Cursor) {
        let row = cursor.row.min(self.row_count().saturating_sub(1));
        let column = cursor.column.min(self.column_count().saturating_sub(1));
        let screen = self.screen_mut();
        screen.set_cursor_position(row, column);
        screen.set_cursor_overflow(
            cursor.column > column || (cursor.column == column && cursor.overflow),
        );
    }

    // Scroll region

    pub(super) fn vt_scroll_top(&self) -> usize {
        self.scroll_top.unwrap_or(0)
    }

    pub(super) fn vt_scroll_bottom(&self) -> usize {
        self.scroll_bottom
            .unwrap_or_else(|| self.row_count().saturating_sub(1))
    }

    fn has_scroll_region(&self) -> bool {
        self.scroll_top.is_some() || self.scroll_bottom.is_some()
    }

    /// Set the region from 0-based inclusive bounds. A region covering
    /// the whole screen is no region.
    pub(super) fn set_scroll_region(&mut self, top: usize, bottom: usize) {
        if top == 0 && bottom + 1 >= self.row_count() {
            self.scroll_top = None;
            self.scroll_bottom = None;
        } else {
            self.scroll_top = Some(top);
            self.scroll_bottom = Some(bottom);
        }
    }

    pub(super) fn clear_scroll_region(&mut self) {
        self.scroll_top = None;
        self.scroll_bottom = None;
    }

    /// Scroll the region contents up, bringing blank rows in at the bottom
    pub(super) fn vt_scroll_up(&mut self, count: usize) {
        let cursor = self.cursor();
        let top = self.vt_scroll_top();
        self.set_absolute_cursor_row(top);
        self.delete_lines(count);
        self.restore_cursor(cursor);
    }

    pub(super) fn vt_scroll_down(&mut self, count: usize) {
        let cursor = self.cursor();
        let top = self.vt_scroll_top();
        self.set_absolute_cursor_position(top, 0);
        self.insert_lines(count);
        self.restore_cursor(cursor);
    }

    // Lines

    /// Insert blank lines at the cursor row, pushing the rows below toward
    /// the region bottom. The cursor ends at column 0.
    pub(super) fn insert_lines(&mut self, count: usize) {
        let row = self.cursor().row;
        let top = self.vt_scroll_top();
        let bottom = self.vt_scroll_bottom();
        if row < top || row > bottom {
            return;
        }

        let span = bottom - row + 1;
        let count = count.max(1).min(span);
        let move_count = span - count;
        if move_count > 0 {
            self.move_rows(row, move_count, row + count);
        }
        for i in (0..count).rev() {
            self.set_absolute_cursor_position(row + i, 0);
            self.screen_mut().clear_cursor_row();
        }
    }

    /// Delete lines at the cursor row, pulling the rows below up and
    /// bringing blank rows in at the region bottom
    pub(super) fn delete_lines(&mut self, count: usize) {
        let cursor = self.cursor();
        let top = cursor.row;
        let bottom = self.vt_scroll_bottom();
        if top < self.vt_scroll_top() || top > bottom {
            return;
        }

        let max = bottom - top + 1;
        let count = count.max(1).min(max);
        let move_start = bottom - count + 1;
        if count != max {
            self.move_rows(top, count, move_start);
        }
        for i in 0..count {
            self.set_absolute_cursor_position(move_start + i, 0);
            self.screen_mut().clear_cursor_row();
        }
        self.restore_cursor(cursor);
        self.clear_cursor_overflow();
    }

    fn move_rows(&mut self, from: usize, count: usize, to: usize) {
        let screen = self.screen_mut();
        let rows = screen.remove_rows(from, count);
        screen.insert_rows(to, rows);
    }

    // Characters

    /// Insert blanks at the cursor, shifting the rest of the row right
    pub(super) fn insert_space(&mut self, count: usize) {
        let cursor = self.cursor();
        let count = count.clamp(1, self.column_count().max(1));
        let screen = self.screen_mut();
        screen.insert_string(&" ".repeat(count), count);
        screen.maybe_clip_current_row();
        self.restore_cursor(cursor);
        self.clear_cursor_overflow();
    }

    /// Delete characters at the cursor. Styled blanks refill the right
    /// margin when attributes are set.
    pub(super) fn delete_chars(&mut self, count: usize) {
        let deleted = self.screen_mut().delete_chars(count.max(1));
        if deleted > 0 && !self.text_attributes().is_default() {
            let cursor = self.cursor();
            let columns = self.column_count();
            self.set_cursor_column(columns - deleted);
            self.screen_mut().insert_string(&" ".repeat(deleted), deleted);
            self.restore_cursor(cursor);
        }
        self.clear_cursor_overflow();
    }

    // Erasing

    /// Erase `count` columns from the cursor, or to the end of the row.
    /// Ignored while a wrap is pending.
    pub(super) fn erase_to_right(&mut self, count: Option<usize>) {
        let cursor = self.cursor();
        if cursor.overflow {
            return;
        }
        let max = self.column_count().saturating_sub(cursor.column);
        let count = count.map_or(max, |count| count.min(max));

        if self.text_attributes().background.is_default() {
            let row_width = self.screen().row(cursor.row).map_or(0, Row::width);
            if row_width <= cursor.column + count {
                self.screen_mut().delete_chars(count);
                self.clear_cursor_overflow();
                return;
            }
        }

        self.screen_mut().overwrite_string(&" ".repeat(count), count);
        self.restore_cursor(cursor);
        self.clear_cursor_overflow();
    }

    /// Erase from the start of the row through the cursor
    pub(super) fn erase_to_left(&mut self) {
        let cursor = self.cursor();
        self.set_cursor_column(0);
        let count = cursor.column + 1;
        self.screen_mut().overwrite_string(&" ".repeat(count), count);
        self.restore_cursor(cursor);
    }

    pub(super) fn erase_line(&mut self) {
        let cursor = self.cursor();
        self.screen_mut().clear_cursor_row();
        self.restore_cursor(cursor);
        self.clear_cursor_overflow();
    }

    pub(super) fn erase_above(&mut self) {
        let cursor = self.cursor();
        self.erase_to_left();
        for row in 0..cursor.row {
            self.set_absolute_cursor_position(row, 0);
            self.screen_mut().clear_cursor_row();
        }
        self.restore_cursor(cursor);
        self.clear_cursor_overflow();
    }

    pub(super) fn erase_below(&mut self) {
        let cursor = self.cursor();
        self.erase_to_right(None);
        for row in cursor.row + 1..self.row_count() {
            self.set_absolute_cursor_position(row, 0);
            self.screen_mut().clear_cursor_row();
        }
        self.restore_cursor(cursor);
        self.clear_cursor_overflow();
    }

    /// Clear the whole screen without moving the cursor
    pub(super) fn clear(&mut self) {
        let cursor = self.cursor();
        clear_screen(self.screen_mut());
        self.restore_cursor(cursor);
    }

    /// Clear the whole screen and home the cursor
    pub(super) fn clear_home(&mut self) {
        clear_screen(self.screen_mut());
    }

    // Tab stops

    pub(super) fn set_tab_stop(&mut self, column: usize) {
        if column < self.column_count() {
            self.tab_stops.insert(column);
        }
    }

    pub(super) fn clear_tab_stop_at_cursor(&mut self) {
        let column = self.cursor().column;
        self.tab_stops.remove(&column);
    }

    pub(super) fn clear_all_tab_stops(&mut self) {
        self.tab_stops.clear();
        self.default_tab_stops = false;
    }

    /// Stops every eight columns across the screen
    pub(super) fn set_default_tab_stops(&mut self) {
        self.add_default_tab_stops(0);
        self.default_tab_stops = true;
    }

    /// Default stops from `start` (rounded up to a stop) to the right edge
    fn add_default_tab_stops(&mut self, start: usize) {
        let first = start.div_ceil(TAB_WIDTH).max(1) * TAB_WIDTH;
        let columns = self.column_count();
        self.tab_stops
            .extend((first..columns).step_by(TAB_WIDTH));
    }

    /// Move to the next tab stop, or the last column. A pending wrap
    /// survives a tab that finds no stop.
    pub(super) fn forward_tab_stop(&mut self) {
        let cursor = self.cursor();
        let next = self.tab_stops.range(cursor.column + 1..).next().copied();
        match next {
            Some(column) => self.set_cursor_column(column),
            None => {
                let last = self.column_count().saturating_sub(1);
                self.set_cursor_column(last);
                self.screen_mut().set_cursor_overflow(cursor.overflow);
            }
        }
    }

    pub(super) fn backward_tab_stop(&mut self) {
        let column = self.cursor().column;
        let previous = self.tab_stops.range(..column).next_back().copied();
        self.set_cursor_column(previous.unwrap_or(0));
    }

    // Saved state

    /// DECSC: cursor, attributes and character sets of the active screen
    pub(super) fn save_cursor_and_state(&mut self) {
        let charsets = self.charsets;
        let screen = self.screen_mut();
        let state = SavedState {
            cursor: screen.cursor(),
            attrs: screen.text_attributes.clone(),
            charsets,
        };
        screen.save_state(state);
    }

    /// DECRC. With nothing saved the defaults are restored.
    pub(super) fn restore_cursor_and_state(&mut self) {
        let state = self.screen().saved_state().cloned().unwrap_or_default();
        self.restore_cursor(state.cursor);
        self.screen_mut().text_attributes = state.attrs;
        self.charsets = state.charsets;
    }

    // Screens

    /// Switch between the primary and alternate screen, carrying the
    /// cursor position over
    pub(super) fn set_alternate_mode(&mut self, alternate: bool) {
        if alternate == self.alternate_active {
            return;
        }
        let cursor = self.cursor();
        self.alternate_active = alternate;
        self.restore_cursor(cursor);
        self.emit(TerminalEvent::AlternateScreen(alternate));
    }

    /// Resize both screens. Rows removed from the top of the primary
    /// screen are kept with the scrolled-off rows.
    pub fn resize(&mut self, columns: usize, rows: usize) {
        let columns = columns.max(1);
        let rows = rows.max(1);
        let old_columns = self.column_count();
        let old_rows = self.row_count();
        if columns == old_columns && rows == old_rows {
            return;
        }

        resize_screen(&mut self.primary, columns, rows, Some(&mut self.scrolled_off));
        resize_screen(&mut self.alternate, columns, rows, None);

        if columns != old_columns {
            self.tab_stops.retain(|&stop| stop < columns);
            if self.default_tab_stops && columns > old_columns {
                self.add_default_tab_stops(old_columns);
            }
        }
        if rows != old_rows {
            self.clear_scroll_region();
        }
    }

    /// DECSTR
    pub(super) fn soft_reset(&mut self) {
        self.modes.reset_options();
        self.primary.text_attributes.reset();
        self.alternate.text_attributes.reset();
        self.palette.reset();
        self.clear_scroll_region();
        self.emit(TerminalEvent::CursorVisible(true));
    }

    /// RIS: everything but the grid size and the coding system goes back
    /// to its initial value
    pub(super) fn full_reset(&mut self) {
        let mouse_was_active = self.mouse.report() != MouseReport::Disabled;
        self.charsets.reset();
        self.mouse.reset();

        self.tab_stops.clear();
        self.set_default_tab_stops();
        self.palette.reset();

        let charsets = self.charsets;
        for screen in [&mut self.primary, &mut self.alternate] {
            screen.text_attributes = TextAttributes::default();
            clear_screen(screen);
            screen.save_state(SavedState {
                cursor: Cursor::default(),
                attrs: TextAttributes::default(),
                charsets,
            });
        }

        let old = std::mem::replace(
            &mut self.modes,
            Modes::with_column_width_changes(self.config.allow_column_width_changes),
        );
        if !old.cursor_visible {
            self.emit(TerminalEvent::CursorVisible(true));
        }
        if old.reverse_video {
            self.emit(TerminalEvent::ReverseVideo(false));
        }
        if mouse_was_active {
            self.emit(TerminalEvent::MouseModeChanged(MouseReport::Disabled));
        }
        self.clear_scroll_region();

        if self.alternate_active {
            self.alternate_active = false;
            self.emit(TerminalEvent::AlternateScreen(false));
        }
    }
}

/// Clear every row from the bottom up and home the cursor
pub(super) fn clear_screen(screen: &mut Screen) {
    let rows = screen.row_count();
    if rows == 0 {
        return;
    }
    for row in (0..rows).rev() {
        screen.set_cursor_position(row, 0);
        screen.clear_cursor_row();
    }
}

fn keep_scrolled_off(scrolled_off: &mut VecDeque<Row>, row: Row) {
    scrolled_off.push_back(row);
    while scrolled_off.len() > MAX_SCROLLED_OFF {
        scrolled_off.pop_front();
    }
}

/// Apply a new grid size to one screen.
///
/// Shrinking drops empty rows from the bottom first (never the cursor
/// row), then shifts rows off the top.
fn resize_screen(
    screen: &mut Screen,
    columns: usize,
    rows: usize,
    mut scrolled_off: Option<&mut VecDeque<Row>>,
) {
    let mut cursor = screen.cursor();

    if columns != screen.column_count() {
        screen.set_column_count(columns);
        for row in 0..screen.row_count() {
            screen.set_cursor_position(row, 0);
            screen.maybe_clip_current_row();
        }
    }

    let current = screen.row_count();
    if rows > current {
        screen.push_rows((current..rows).map(|_| Row::new()).collect());
    } else if rows < current {
        let mut excess = current - rows;
        while excess > 0 {
            let last = screen.row_count() - 1;
            if last == cursor.row || screen.row(last).is_some_and(|row| row.width() > 0) {
                break;
            }
            screen.pop_row();
            excess -= 1;
        }
        for row in screen.shift_rows(excess) {
            if let Some(kept) = scrolled_off.as_deref_mut() {
                keep_scrolled_off(kept, row);
            }
        }
        cursor.row = cursor.row.saturating_sub(excess);
    }

    let row = cursor.row.min(rows - 1);
    let column = cursor.column.min(columns - 1);
    screen.set_cursor_position(row, column);
    screen.set_cursor_overflow(cursor.column > column || (cursor.column == column && cursor.overflow));
}

/// Split off the first character with its trailing zero-width marks
fn split_first_cluster<'a>(wt: &WidthTable, s: &'a str) -> (&'a str, &'a str) {
    let mut chars = s.char_indices();
    chars.next();
    for (i, c) in chars {
        if !wt.is_combining(c) {
            return s.split_at(i);
        }
    }
    (s, "")
}

/// Split off the last visible character with its trailing zero-width marks
fn split_last_cluster<'a>(wt: &WidthTable, s: &'a str) -> (&'a str, &'a str) {
    match s.char_indices().rev().find(|&(_, c)| wt.char_width(c) > 0) {
        Some((i, _)) => s.split_at(i),
        None => ("", s),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::VtConfig;
    use crate::core::Cursor;
    use crate::terminal::{Terminal, TerminalEvent};

    fn terminal() -> Terminal {
        Terminal::new(VtConfig::with_size(15, 6))
    }

    #[test]
    fn test_wrap_commits_line_overflow() {
        let mut term = terminal();
        term.interpret("0123456789abcdefgh");
        assert_eq!(term.rows_text()[0], "0123456789abcde");
        assert_eq!(term.rows_text()[1], "fgh");
        assert!(term.screen().rows()[0].line_overflow);
        assert_eq!(term.line_text(0), "0123456789abcdefgh");
    }

    #[test]
    fn test_exact_fit_leaves_pending_wrap() {
        let mut term = terminal();
        term.interpret("0123456789abcde");
        let cursor = term.cursor();
        assert_eq!((cursor.row, cursor.column), (0, 14));
        assert!(cursor.overflow);
        assert_eq!(term.rows_text()[1], "");
    }

    #[test]
    fn test_wide_char_wraps_instead_of_splitting() {
        let mut term = terminal();
        term.interpret("01234567890123中");
        assert_eq!(term.rows_text()[0], "01234567890123");
        assert_eq!(term.rows_text()[1], "中");
        assert_eq!(term.cursor(), Cursor::new(1, 2));
    }

    #[test]
    fn test_long_mixed_width_write_wraps_each_row() {
        let mut term = Terminal::new(VtConfig::with_size(10, 3));
        term.interpret("ab中ab中ab中ab中");
        assert_eq!(term.rows_text()[0], "ab中ab中ab");
        assert_eq!(term.rows_text()[1], "中ab中");
        assert_eq!(term.cursor(), Cursor::new(1, 6));

        let mut term = Terminal::new(VtConfig::with_size(10, 3));
        term.interpret("abcdefghi中x");
        assert_eq!(term.rows_text()[0], "abcdefghi");
        assert_eq!(term.rows_text()[1], "中x");

        let mut term = Terminal::new(VtConfig::with_size(10, 3));
        term.interpret(&"x".repeat(10_000));
        assert_eq!(term.rows_text(), vec!["x".repeat(10); 3]);
        assert_eq!(term.take_scrolled_off().len(), 997);
    }

    #[test]
    fn test_no_wraparound_overwrites_last_column() {
        let mut term = terminal();
        term.interpret("\x1b[?7l0123456789abcdefgh");
        assert_eq!(term.rows_text()[0], "0123456789abcdh");
        assert_eq!(term.rows_text()[1], "");
    }

    #[test]
    fn test_combining_mark_attaches_left() {
        let mut term = terminal();
        term.interpret("abc\x08\x08\u{302}");
        assert_eq!(term.rows_text()[0], "a\u{302}bc");
        assert_eq!(term.cursor().column, 1);
    }

    #[test]
    fn test_scroll_off_top_is_kept() {
        let mut term = terminal();
        for i in 0..8 {
            term.interpret(&format!("line {i}\r\n"));
        }
        let kept: Vec<String> = term.take_scrolled_off().iter().map(|r| r.text()).collect();
        assert_eq!(kept, vec!["line 0", "line 1", "line 2"]);
        assert_eq!(term.rows_text()[0], "line 3");
        assert!(term.take_scrolled_off().is_empty());
    }

    #[test]
    fn test_alternate_screen_discards_scrolled_rows() {
        let mut term = terminal();
        term.interpret("\x1b[?47h");
        for i in 0..8 {
            term.interpret(&format!("{i}\r\n"));
        }
        assert!(term.take_scrolled_off().is_empty());
    }

    #[test]
    fn test_new_line_scrolls_region() {
        let mut term = terminal();
        term.interpret("a\r\nb\r\nc\r\nd\r\ne\r\nf");
        term.interpret("\x1b[2;4r\x1b[4;1H\n");
        assert_eq!(term.rows_text(), vec!["a", "c", "d", "", "e", "f"]);
        assert_eq!(term.cursor(), Cursor::new(3, 0));
        assert!(term.take_scrolled_off().is_empty());
    }

    #[test]
    fn test_origin_mode_positions_inside_region() {
        let mut term = terminal();
        term.interpret("\x1b[3;5r\x1b[?6h");
        assert_eq!(term.cursor(), Cursor::new(2, 0));
        term.interpret("\x1b[2;3H");
        assert_eq!(term.cursor(), Cursor::new(3, 2));
        term.interpret("\x1b[9;1H");
        assert_eq!(term.cursor(), Cursor::new(4, 0));
        term.interpret("\x1b[9A");
        assert_eq!(term.cursor().row, 2);
    }

    #[test]
    fn test_cursor_motion_clamps() {
        let mut term = terminal();
        term.interpret("\x1b[99;99H");
        assert_eq!(term.cursor(), Cursor::new(5, 14));
        term.interpret("\x1b[99D\x1b[99A");
        assert_eq!(term.cursor(), Cursor::new(0, 0));
    }

    #[test]
    fn test_reverse_wraparound_backspace() {
        let mut term = terminal();
        term.interpret("\x1b[?45h\x1b[3;1H\x08");
        assert_eq!(term.cursor(), Cursor::new(1, 14));
        term.interpret("\x1b[H\x08");
        assert_eq!(term.cursor(), Cursor::new(5, 14));
    }

    #[test]
    fn test_default_tab_stops() {
        let term = terminal();
        assert_eq!(term.tab_stops(), vec![8]);

        let wide = Terminal::new(VtConfig::with_size(30, 2));
        assert_eq!(wide.tab_stops(), vec![8, 16, 24]);
    }

    #[test]
    fn test_tab_to_last_column_keeps_overflow() {
        let mut term = terminal();
        term.interpret("0123456789abcde\t");
        assert!(term.cursor().overflow);
        term.interpret("\r\t\t");
        assert_eq!(term.cursor(), Cursor::new(0, 14));
    }

    #[test]
    fn test_backward_tab() {
        let mut term = terminal();
        term.interpret("\x1b[13G\x1b[Z");
        assert_eq!(term.cursor().column, 8);
        term.interpret("\x1b[Z");
        assert_eq!(term.cursor().column, 0);
    }

    #[test]
    fn test_clear_tab_stops() {
        let mut term = terminal();
        term.interpret("\x1b[4G\x1bH");
        assert_eq!(term.tab_stops(), vec![3, 8]);
        term.interpret("\x1b[0g");
        assert_eq!(term.tab_stops(), vec![8]);
        term.interpret("\x1b[3g");
        assert!(term.tab_stops().is_empty());
        term.interpret("\r\tx");
        assert_eq!(term.rows_text()[0], "              x");
    }

    #[test]
    fn test_resize_grows_and_shrinks() {
        let mut term = terminal();
        term.interpret("a\r\nb\r\nc\r\nd");
        term.resize(20, 8);
        assert_eq!((term.column_count(), term.row_count()), (20, 8));
        assert_eq!(term.tab_stops(), vec![8, 16]);

        term.resize(20, 3);
        assert_eq!(term.rows_text(), vec!["b", "c", "d"]);
        assert_eq!(term.cursor(), Cursor::new(2, 1));
        let kept: Vec<String> = term.take_scrolled_off().iter().map(|r| r.text()).collect();
        assert_eq!(kept, vec!["a"]);
    }

    #[test]
    fn test_resize_narrower_clips_rows() {
        let mut term = terminal();
        term.interpret("0123456789\r\nabc");
        term.resize(5, 6);
        assert_eq!(term.rows_text()[0], "01234");
        assert_eq!(term.cursor(), Cursor::new(1, 3));
        assert_eq!(term.tab_stops(), Vec::<usize>::new());
        for row in term.screen().rows() {
            assert!(row.width() <= 5);
        }
    }

    #[test]
    fn test_resize_resets_scroll_region() {
        let mut term = terminal();
        term.interpret("\x1b[2;4r");
        term.resize(15, 10);
        assert_eq!(term.scroll_region(), None);
    }

    #[test]
    fn test_alternate_screen_keeps_cursor() {
        let mut term = terminal();
        term.interpret("primary\x1b[3;4H\x1b[?47h");
        assert!(term.is_alternate_screen());
        assert_eq!(term.cursor(), Cursor::new(2, 3));
        assert_eq!(term.rows_text()[0], "");
        term.interpret("alt\x1b[?47l");
        assert_eq!(term.rows_text()[0], "primary");
        assert_eq!(term.alternate_screen().row_text(2).as_deref(), Some("   alt"));
        assert_eq!(
            term.take_events(),
            vec![
                TerminalEvent::AlternateScreen(true),
                TerminalEvent::AlternateScreen(false)
            ]
        );
    }

    #[test]
    fn test_restore_without_save_uses_defaults() {
        let mut term = terminal();
        term.interpret("\x1b[3;3H\x1b[1m\x1b8");
        assert_eq!(term.cursor(), Cursor::new(0, 0));
        assert!(term.text_attributes().is_default());
    }

    #[test]
    fn test_restore_clamps_after_resize() {
        let mut term = terminal();
        term.interpret("\x1b[6;15H\x1b7");
        term.resize(10, 4);
        term.interpret("\x1b8");
        let cursor = term.cursor();
        assert_eq!((cursor.row, cursor.column), (3, 9));
        assert!(cursor.overflow);
    }

    #[test]
    fn test_soft_reset() {
        let mut term = terminal();
        term.interpret("\x1b[4h\x1b[?6h\x1b[?25l\x1b[2;3r\x1b[1m\x1b]4;1;#010203\x07");
        term.take_events();
        term.interpret("\x1b[!p");

        assert!(!term.modes().insert);
        assert!(!term.modes().origin);
        assert!(term.modes().cursor_visible);
        assert_eq!(term.scroll_region(), None);
        assert!(!term.text_attributes().bold);
        assert_eq!(term.palette().get(1), crate::core::stock_color(1));
        assert_eq!(term.take_events(), vec![TerminalEvent::CursorVisible(true)]);
    }

    #[test]
    fn test_fill_keeps_cursor() {
        let mut term = terminal();
        term.interpret("\x1b[2;2H");
        term.fill('x');
        assert!(term.rows_text().iter().all(|row| row == "xxxxxxxxxxxxxxx"));
        assert_eq!(term.cursor(), Cursor::new(1, 1));
    }
}
