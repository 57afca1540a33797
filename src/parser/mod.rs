//! Control-sequence parsing primitives
//!
//! The parse state that persists across input chunks, the dispatch tables
//! the interpreter consults, and the byte-level UTF-8 decoder.

mod state;
mod tables;
mod utf8;

pub use state::{parse_int, ParseFn, ParseState, StringKind};
pub use tables::{
    Cc1Op, ControlSet, CsiCode, CsiOp, DispatchTables, EscOp, Handler, OscOp,
};
pub use utf8::Utf8Decoder;
