//! Screen buffer tests
//!
//! Exercise the run-based row model through the public `Screen` API and
//! through the interpreter.

use mochi_vt::core::{ColorSource, Cursor, Row, RunPosition, Screen, Snapshot, WidthTable};
use mochi_vt::{Terminal, VtConfig};

fn screen(columns: usize, rows: usize) -> Screen {
    let mut screen = Screen::new(columns, WidthTable::default());
    screen.push_rows((0..rows).map(|_| Row::new()).collect());
    screen.set_cursor_position(0, 0);
    screen
}

fn terminal() -> Terminal {
    Terminal::new(VtConfig::with_size(15, 6))
}

#[test]
fn test_styled_overwrite_splits_runs() {
    let mut s = screen(10, 1);
    s.insert_string("hello", 5);

    s.text_attributes.bold = true;
    s.set_cursor_position(0, 1);
    s.overwrite_string("EL", 2);

    let row = &s.rows()[0];
    assert_eq!(row.text(), "hELlo");
    let texts: Vec<&str> = row.runs.iter().map(|run| run.text()).collect();
    assert_eq!(texts, vec!["h", "EL", "lo"]);
    assert!(row.runs[1].attrs.bold);
    assert!(!row.runs[2].attrs.bold);
    assert_eq!(s.cursor(), Cursor::new(0, 3));
}

#[test]
fn test_wide_characters_get_their_own_runs() {
    let mut term = terminal();
    term.interpret("a中b");

    let row = &term.screen().rows()[0];
    assert_eq!(row.width(), 4);
    let texts: Vec<&str> = row.runs.iter().map(|run| run.text()).collect();
    assert_eq!(texts, vec!["a", "中", "b"]);
    assert!(row.runs[1].attrs.wide);
    assert!(!row.runs[1].attrs.ascii);
    assert!(!row.runs[2].attrs.wide);
}

#[test]
fn test_delete_half_of_wide_character() {
    let mut term = terminal();
    term.interpret("中文\x1b[1;2H\x1b[P");
    assert_eq!(term.rows_text()[0], " 文");
    assert_eq!(term.screen().rows()[0].width(), 3);
}

#[test]
fn test_erase_line_keeps_background() {
    let mut term = terminal();
    term.interpret("text\x1b[44m\x1b[2K");

    let row = &term.screen().rows()[0];
    assert_eq!(row.text(), " ".repeat(15));
    assert_eq!(row.runs[0].attrs.background, ColorSource::Indexed { index: 4 });
    assert!(!row.runs[0].attrs.inverse);
}

#[test]
fn test_insert_mode_clips_at_right_margin() {
    let mut term = terminal();
    term.interpret("abcdefghijklmno\x1b[1G\x1b[4hXY");
    assert_eq!(term.rows_text()[0], "XYabcdefghijklm");
    assert_eq!(term.screen().rows()[0].width(), 15);
}

#[test]
fn test_wrapped_line_bookkeeping() {
    let mut term = terminal();
    term.interpret(&"X".repeat(20));
    let screen = term.screen();

    assert!(screen.rows()[0].line_overflow);
    assert!(!screen.rows()[1].line_overflow);
    assert_eq!(screen.line_start_row(1), 0);
    assert_eq!(screen.line_text(0), "X".repeat(20));

    assert_eq!(screen.position_with_overflow(0, 1, 0, 2), Some(17));
    assert_eq!(
        screen.run_and_offset_with_overflow(0, 17),
        Some(RunPosition {
            row: 1,
            run: 0,
            offset: 2
        })
    );
    assert_eq!(screen.position_with_overflow(1, 0, 0, 0), None);
}

#[test]
fn test_hard_newline_breaks_line() {
    let mut term = terminal();
    term.interpret("first\r\nsecond");
    assert!(!term.screen().rows()[0].line_overflow);
    assert_eq!(term.line_text(0), "first");
}

#[test]
fn test_row_ops_then_edit_relocates_cursor() {
    let mut s = screen(10, 3);
    for (row, text) in ["a", "b", "c"].iter().enumerate() {
        s.set_cursor_position(row, 0);
        s.insert_string(text, 1);
    }

    let shifted = s.shift_row();
    assert_eq!(shifted.map(|row| row.text()), Some("a".to_string()));
    s.push_row(Row::new());
    assert_eq!(s.row_count(), 3);

    s.insert_string("x", 1);
    let texts: Vec<String> = s.rows().iter().map(Row::text).collect();
    assert_eq!(texts, vec!["b", "c", " x"]);
}

#[test]
fn test_snapshot_round_trips_through_json() {
    let mut term = terminal();
    term.interpret("\x1b]2;title\x07\x1b[1;38;2;1;2;3mbold\x1b[0m plain\r\n\x1b[2;5r");

    let snapshot = term.snapshot();
    assert_eq!(snapshot.title, "title");
    assert_eq!(snapshot.scroll_region, Some((1, 4)));
    assert_eq!(snapshot.grid[0].runs.len(), 2);

    let json = snapshot.to_json().unwrap();
    assert_eq!(Snapshot::from_json(&json).unwrap(), snapshot);
}

#[test]
fn test_snapshot_text() {
    let mut term = terminal();
    term.interpret("one\r\n\r\nthree   ");
    assert_eq!(term.snapshot().to_text(), "one\n\nthree");
}
