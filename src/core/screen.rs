//! Screen buffer
//!
//! An ordered list of [`Row`]s plus a cursor. Besides the logical
//! position (row, column, overflow) the screen tracks which run the
//! cursor is in and the column offset inside that run, so text can be
//! spliced without rescanning the row. The offset may point past the end
//! of the last run when the cursor sits beyond the row's content.
//!
//! Row operations are plain sequence edits. They leave the run position
//! stale, and it is recomputed from (row, column) before the next text
//! edit.

use tracing::{error, warn};

use super::attrs::TextAttributes;
use super::cursor::{Cursor, SavedState};
use super::row::{Row, TextRun};
use super::width::WidthTable;

/// Position of a column inside a row's runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPosition {
    pub row: usize,
    pub run: usize,
    pub offset: usize,
}

/// A grid of styled rows with a cursor
#[derive(Debug, Clone)]
pub struct Screen {
    rows: Vec<Row>,
    column_count: usize,
    /// Style applied to text inserted from now on
    pub text_attributes: TextAttributes,
    cursor: Cursor,
    cursor_run: usize,
    cursor_offset: usize,
    cursor_located: bool,
    saved_state: Option<SavedState>,
    width_table: WidthTable,
}

impl Screen {
    /// Create an empty screen. Rows are added by the owner.
    pub fn new(column_count: usize, width_table: WidthTable) -> Self {
        Self {
            rows: Vec::new(),
            column_count,
            text_attributes: TextAttributes::default(),
            cursor: Cursor::default(),
            cursor_run: 0,
            cursor_offset: 0,
            cursor_located: false,
            saved_state: None,
            width_table,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn width_table(&self) -> WidthTable {
        self.width_table
    }

    /// Change the column count, pulling the cursor in if needed
    pub fn set_column_count(&mut self, count: usize) {
        self.column_count = count;
        self.cursor_located = false;
        if self.cursor.column >= count && !self.rows.is_empty() {
            self.set_cursor_position(self.cursor.row, count.saturating_sub(1));
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Run index and intra-run offset of the cursor
    pub fn cursor_run_position(&mut self) -> RunPosition {
        self.locate_cursor();
        RunPosition {
            row: self.cursor.row,
            run: self.cursor_run,
            offset: self.cursor_offset,
        }
    }

    pub fn set_cursor_overflow(&mut self, overflow: bool) {
        self.cursor.overflow = overflow;
    }

    pub fn saved_state(&self) -> Option<&SavedState> {
        self.saved_state.as_ref()
    }

    pub fn save_state(&mut self, state: SavedState) {
        self.saved_state = Some(state);
    }

    // Row operations

    /// Remove and return the first row
    pub fn shift_row(&mut self) -> Option<Row> {
        self.shift_rows(1).pop()
    }

    pub fn shift_rows(&mut self, count: usize) -> Vec<Row> {
        self.cursor_located = false;
        let count = count.min(self.rows.len());
        self.rows.drain(..count).collect()
    }

    /// Prepend a row
    pub fn unshift_row(&mut self, row: Row) {
        self.unshift_rows(vec![row]);
    }

    pub fn unshift_rows(&mut self, rows: Vec<Row>) {
        self.cursor_located = false;
        self.rows.splice(0..0, rows);
    }

    /// Remove and return the last row
    pub fn pop_row(&mut self) -> Option<Row> {
        self.pop_rows(1).pop()
    }

    pub fn pop_rows(&mut self, count: usize) -> Vec<Row> {
        self.cursor_located = false;
        let start = self.rows.len().saturating_sub(count);
        self.rows.drain(start..).collect()
    }

    /// Append a row
    pub fn push_row(&mut self, row: Row) {
        self.push_rows(vec![row]);
    }

    pub fn push_rows(&mut self, rows: Vec<Row>) {
        self.cursor_located = false;
        self.rows.extend(rows);
    }

    /// Insert a row before `index` (appending when `index` is past the end)
    pub fn insert_row(&mut self, index: usize, row: Row) {
        self.insert_rows(index, vec![row]);
    }

    pub fn insert_rows(&mut self, index: usize, rows: Vec<Row>) {
        self.cursor_located = false;
        let index = index.min(self.rows.len());
        self.rows.splice(index..index, rows);
    }

    pub fn remove_row(&mut self, index: usize) -> Option<Row> {
        self.remove_rows(index, 1).pop()
    }

    pub fn remove_rows(&mut self, index: usize, count: usize) -> Vec<Row> {
        self.cursor_located = false;
        let start = index.min(self.rows.len());
        let end = index.saturating_add(count).min(self.rows.len());
        self.rows.drain(start..end).collect()
    }

    // Cursor placement

    /// Move the cursor, clamping out-of-range coordinates. Clears overflow.
    pub fn set_cursor_position(&mut self, row: usize, column: usize) {
        if self.rows.is_empty() {
            warn!("Attempt to set cursor position on empty screen");
            return;
        }

        let mut row = row;
        if row >= self.rows.len() {
            error!("Row out of bounds: {}", row);
            row = self.rows.len() - 1;
        }
        let mut column = column;
        if column >= self.column_count {
            error!("Column out of bounds: {}", column);
            column = self.column_count.saturating_sub(1);
        }

        self.cursor = Cursor::new(row, column);
        self.place_cursor();
    }

    /// Find the run under (cursor.row, cursor.column)
    fn place_cursor(&mut self) {
        let wt = self.width_table;
        let row = &mut self.rows[self.cursor.row];
        if row.runs.is_empty() {
            row.runs.push(TextRun::plain("", &wt));
        }

        let mut offset = self.cursor.column;
        let last = row.runs.len() - 1;
        let mut index = 0;
        for (i, run) in row.runs.iter().enumerate() {
            index = i;
            if i == last || run.width() > offset {
                break;
            }
            offset -= run.width();
        }

        self.cursor_run = index;
        self.cursor_offset = offset;
        self.cursor_located = true;
    }

    /// Recompute the run position after row edits without touching overflow
    fn locate_cursor(&mut self) {
        assert!(
            !self.rows.is_empty(),
            "screen has no rows; the owner must create rows before editing text"
        );
        let stale = !self.cursor_located
            || self.cursor.row >= self.rows.len()
            || self.cursor_run >= self.rows[self.cursor.row].runs.len();
        if !stale {
            return;
        }

        let overflow = self.cursor.overflow;
        self.cursor.row = self.cursor.row.min(self.rows.len() - 1);
        self.cursor.column = self
            .cursor
            .column
            .min(self.column_count.saturating_sub(1));
        self.place_cursor();
        self.cursor.overflow = overflow;
    }

    /// Mark the cursor row as continuing on the next row
    pub fn commit_line_overflow(&mut self) {
        if let Some(row) = self.rows.get_mut(self.cursor.row) {
            row.line_overflow = true;
        }
    }

    /// Empty the cursor row and home the cursor within it.
    ///
    /// With non-default attributes the row is filled with styled spaces so
    /// the background color reaches the right margin.
    pub fn clear_cursor_row(&mut self) {
        self.locate_cursor();
        let wt = self.width_table;
        let text = if self.text_attributes.is_default() {
            String::new()
        } else {
            " ".repeat(self.column_count)
        };
        let mut attrs = self.text_attributes.blank();
        attrs.inverse = false;

        let row = &mut self.rows[self.cursor.row];
        row.clear();
        row.runs.push(TextRun::new(text, attrs, &wt));

        self.cursor.column = 0;
        self.cursor.overflow = false;
        self.cursor_run = 0;
        self.cursor_offset = 0;
        self.cursor_located = true;
    }

    // Text editing

    /// Split run `index` at column `offset`. Returns the index where text
    /// belonging between the halves should be inserted.
    fn split_run(&mut self, index: usize, offset: usize) -> usize {
        let wt = self.width_table;
        let row = &mut self.rows[self.cursor.row];
        let run = &mut row.runs[index];
        let before = wt.substr(run.text(), 0, Some(offset)).to_string();
        let after = wt.substr(run.text(), offset, None).to_string();
        let attrs = run.attrs.clone();
        run.set_text(before, &wt);

        if !after.is_empty() {
            row.runs.insert(index + 1, TextRun::new(after, attrs, &wt));
        }
        if row.runs[index].is_empty() {
            row.runs.remove(index);
            return index;
        }
        index + 1
    }

    /// Insert text at the cursor, shifting existing content right.
    ///
    /// `width` is the display width of `text`; the cursor advances by it.
    /// The row may end up wider than the column count; callers follow up
    /// with [`Screen::maybe_clip_current_row`].
    pub fn insert_string(&mut self, text: &str, width: usize) {
        self.locate_cursor();
        let wt = self.width_table;
        let row_index = self.cursor.row;
        self.rows[row_index].line_overflow = false;
        self.cursor.column += width;

        let mut text = text.to_string();
        let mut run_index = self.cursor_run;
        let mut offset = self.cursor_offset;
        let run_width = self.rows[row_index].runs[run_index].width();

        // Cursor beyond the content: pad with spaces first
        let reverse_offset = if offset > run_width {
            let pad = " ".repeat(offset - run_width);
            let row = &mut self.rows[row_index];
            if self.text_attributes.pads_invisibly() {
                text.insert_str(0, &pad);
            } else if row.runs[run_index].attrs.pads_invisibly() {
                row.runs[run_index].push_str(&pad, &wt);
            } else {
                offset = pad.len();
                row.runs.insert(run_index + 1, TextRun::plain(pad, &wt));
                run_index += 1;
                self.cursor_run = run_index;
                self.cursor_offset = offset;
            }
            0
        } else {
            run_width - offset
        };

        let attrs = self.text_attributes.clone();
        let row = &mut self.rows[row_index];

        if attrs.matches(&row.runs[run_index].attrs) {
            let run = &mut row.runs[run_index];
            if reverse_offset == 0 {
                run.push_str(&text, &wt);
            } else if offset == 0 {
                run.insert_str(0, &text, &wt);
            } else {
                let spliced = format!(
                    "{}{}{}",
                    wt.substr(run.text(), 0, Some(offset)),
                    text,
                    wt.substr(run.text(), offset, None)
                );
                run.set_text(spliced, &wt);
            }
            self.cursor_run = run_index;
            self.cursor_offset = offset + width;
            return;
        }

        if offset == 0 {
            // Start of a run: extend the previous run or slot in before
            if run_index > 0 && attrs.matches(&row.runs[run_index - 1].attrs) {
                let prev = &mut row.runs[run_index - 1];
                prev.push_str(&text, &wt);
                self.cursor_run = run_index - 1;
                self.cursor_offset = prev.width();
            } else {
                row.runs.insert(run_index, TextRun::new(text, attrs, &wt));
                self.cursor_run = run_index;
                self.cursor_offset = width;
            }
            return;
        }

        if reverse_offset == 0 {
            // End of a run: extend the next run or slot in after
            let next = run_index + 1;
            if next < row.runs.len() && attrs.matches(&row.runs[next].attrs) {
                let added = wt.str_width(&text);
                row.runs[next].insert_str(0, &text, &wt);
                self.cursor_run = next;
                self.cursor_offset = added;
            } else {
                let run = TextRun::new(text, attrs, &wt);
                self.cursor_offset = run.width();
                row.runs.insert(next, run);
                self.cursor_run = next;
            }
            return;
        }

        let at = self.split_run(run_index, offset);
        self.rows[row_index]
            .runs
            .insert(at, TextRun::new(text, attrs, &wt));
        self.cursor_run = at;
        self.cursor_offset = width;
    }

    /// Attach zero-width text (combining marks) to the character left of
    /// the cursor, or under it when the cursor is in overflow. The text
    /// joins that character's run whatever the current attributes are.
    pub fn attach_zero_width(&mut self, text: &str) {
        self.locate_cursor();
        let end = if self.cursor.overflow {
            self.cursor.column + 1
        } else {
            self.cursor.column
        };
        if end == 0 {
            self.insert_string(text, 0);
            return;
        }

        let wt = self.width_table;
        let row = &mut self.rows[self.cursor.row];
        let mut start = 0;
        for run in row.runs.iter_mut() {
            let width = run.width();
            if width > 0 && end <= start + width {
                let offset = end - start;
                let mut seen = 0;
                let mut at = run.text().len();
                for (i, c) in run.text().char_indices() {
                    let w = wt.char_width(c);
                    if seen >= offset && w > 0 {
                        at = i;
                        break;
                    }
                    seen += w;
                }
                run.insert_str(at, text, &wt);
                return;
            }
            start += width;
        }
        // Nothing under or before the cursor
    }

    /// Write text at the cursor, replacing what is there
    pub fn overwrite_string(&mut self, text: &str, width: usize) {
        let max = self.column_count.saturating_sub(self.cursor.column);
        if max == 0 {
            return;
        }
        self.locate_cursor();

        let wt = self.width_table;
        let run = &self.rows[self.cursor.row].runs[self.cursor_run];
        if self.text_attributes.matches(&run.attrs)
            && wt.substr(run.text(), self.cursor_offset, None) == text
        {
            self.cursor_offset += width;
            self.cursor.column += width;
            return;
        }

        self.delete_chars(width.min(max));
        self.insert_string(text, width);
    }

    /// Delete `count` columns at the cursor, pulling later content left.
    ///
    /// Hitting either half of a wide character removes the whole
    /// character and leaves a single space in its place. Returns the
    /// number of columns requested after clamping to the row.
    pub fn delete_chars(&mut self, count: usize) -> usize {
        self.locate_cursor();
        let wt = self.width_table;
        let mut count = count.min(self.column_count.saturating_sub(self.cursor.column));
        if count == 0 {
            return 0;
        }
        let requested = count;

        let mut space_attrs = self.text_attributes.blank();
        space_attrs.wide = false;
        let row = &mut self.rows[self.cursor.row];
        let mut index = self.cursor_run;
        let mut offset = self.cursor_offset;

        while index < row.runs.len() && count > 0 {
            let mut next = index + 1;
            let start_len = row.runs[index].width();
            let remaining = {
                let text = row.runs[index].text();
                format!(
                    "{}{}",
                    wt.substr(text, 0, Some(offset)),
                    wt.substr(text, offset + count, None)
                )
            };
            row.runs[index].set_text(remaining, &wt);
            let mut end_len = row.runs[index].width();

            let wide = row.runs[index].attrs.wide;
            if wide
                && offset < start_len
                && ((end_len > 0 && start_len == end_len) || (end_len == 0 && offset == 1))
            {
                // Only half of a wide character was hit
                let space = TextRun::new(" ", space_attrs.clone(), &wt);
                row.runs[index].set_text("", &wt);
                end_len = 0;
                count -= 1;
                if offset > 0 {
                    row.runs.insert(index, space);
                    if self.cursor_run >= index {
                        self.cursor_run += 1;
                    }
                    index += 1;
                    next = index + 1;
                } else {
                    row.runs.insert(index + 1, space);
                    next = index + 2;
                }
            } else {
                count = count.saturating_sub(start_len - end_len.min(start_len));
            }

            if end_len == 0 && index != self.cursor_run {
                row.runs.remove(index);
                next -= 1;
                if self.cursor_run > index {
                    self.cursor_run -= 1;
                }
            }
            index = next;
            offset = 0;
        }

        // Never leave the cursor in an empty styled run
        let cursor_run = self.cursor_run;
        let run = &row.runs[cursor_run];
        if run.is_empty() && !run.is_plain() {
            if cursor_run > 0 {
                row.runs.remove(cursor_run);
                self.cursor_run = cursor_run - 1;
                self.cursor_offset = row.runs[cursor_run - 1].width();
            } else if cursor_run + 1 < row.runs.len() {
                row.runs.remove(cursor_run);
                self.cursor_offset = 0;
            } else {
                row.runs[cursor_run] = TextRun::plain("", &wt);
                self.cursor_offset = 0;
            }
        }

        requested
    }

    /// Enforce the column count on the cursor row.
    ///
    /// If the content fits but the cursor went past the last column, the
    /// cursor is parked on the last column in overflow. Otherwise content
    /// past the last column is dropped.
    pub fn maybe_clip_current_row(&mut self) {
        if self.rows.is_empty() || self.column_count == 0 {
            return;
        }
        let last_column = self.column_count - 1;
        let width = self.rows[self.cursor.row].width();

        if width <= self.column_count {
            if self.cursor.column >= self.column_count {
                self.set_cursor_position(self.cursor.row, last_column);
                self.cursor.overflow = true;
            }
            return;
        }

        let column = self.cursor.column;
        self.set_cursor_position(self.cursor.row, last_column);

        let wt = self.width_table;
        let row = &mut self.rows[self.cursor.row];
        let run = &mut row.runs[self.cursor_run];
        if self.cursor_offset + 1 < run.width() {
            let kept = wt.substr(run.text(), 0, Some(self.cursor_offset + 1)).to_string();
            run.set_text(kept, &wt);
        }
        row.runs.truncate(self.cursor_run + 1);

        if column < self.column_count {
            self.set_cursor_position(self.cursor.row, column);
        } else {
            self.cursor.overflow = true;
        }
    }

    // Text queries

    /// Text of a single row
    pub fn row_text(&self, index: usize) -> Option<String> {
        self.rows.get(index).map(Row::text)
    }

    /// First row of the wrapped line containing `row`
    pub fn line_start_row(&self, row: usize) -> usize {
        let mut row = row.min(self.rows.len().saturating_sub(1));
        while row > 0 && self.rows[row - 1].line_overflow {
            row -= 1;
        }
        row
    }

    /// Text of `row` followed by every row it overflows into
    pub fn line_text(&self, row: usize) -> String {
        let mut text = String::new();
        for current in self.rows.iter().skip(row) {
            text.push_str(&current.text());
            if !current.line_overflow {
                break;
            }
        }
        text
    }

    /// Column of (`row`, `run`, `offset`) measured from the start of the
    /// wrapped line beginning at `start_row`. `None` if `row` is not part
    /// of that line or the run does not exist.
    pub fn position_with_overflow(
        &self,
        start_row: usize,
        row: usize,
        run: usize,
        offset: usize,
    ) -> Option<usize> {
        if row < start_row || row >= self.rows.len() {
            return None;
        }
        let mut position = 0;
        for current in &self.rows[start_row..row] {
            if !current.line_overflow {
                return None;
            }
            position += current.width();
        }
        let target = &self.rows[row];
        if run >= target.runs.len() && !(run == 0 && target.runs.is_empty()) {
            return None;
        }
        Some(position + target.run_start(run) + offset)
    }

    /// Inverse of [`Screen::position_with_overflow`]
    pub fn run_and_offset_with_overflow(
        &self,
        start_row: usize,
        position: usize,
    ) -> Option<RunPosition> {
        let mut row = start_row;
        let mut position = position;
        loop {
            let current = self.rows.get(row)?;
            let width = current.width();
            if position <= width {
                break;
            }
            if !current.line_overflow || row + 1 >= self.rows.len() {
                return None;
            }
            position -= width;
            row += 1;
        }

        for (index, run) in self.rows[row].runs.iter().enumerate() {
            if position <= run.width() {
                return Some(RunPosition {
                    row,
                    run: index,
                    offset: position,
                });
            }
            position -= run.width();
        }
        None
    }
}
