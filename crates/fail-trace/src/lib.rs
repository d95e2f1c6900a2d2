//! Reader and writer for FAIL* execution traces.
//!
//! A trace records the instructions and memory accesses of an instrumented
//! simulator run. The file is an optional gzip container around a sequence
//! of frames:
//!
//! | Size | Field                                   |
//! |------|-----------------------------------------|
//! | 4    | Payload length `L`, big-endian          |
//! | L    | Protobuf-encoded event (see [`proto`])  |
//!
//! Event times are delta encoded. The decoder returns the raw delta and the
//! consumer keeps the running total in a [`TimeAccumulator`].
//!
//! # Usage
//!
//! ```no_run
//! use fail_trace::{format_event, open_trace, TimeAccumulator};
//!
//! let mut clock = TimeAccumulator::new();
//! for event in open_trace("trace.tc.gz")? {
//!     let event = event?;
//!     let t = clock.advance(&event);
//!     println!("{}", format_event(&event, Some(t)));
//! }
//! # Ok::<(), fail_trace::ParseError>(())
//! ```

pub mod decompress;
pub mod format;
mod parser;
pub mod proto;
pub mod reader;
pub mod stats;
mod stream;
pub mod types;
pub mod writer;

pub use format::{format_event, EventLine};
pub use parser::{decode, encode};
pub use stats::TraceStats;
pub use stream::{open_trace, TimeAccumulator, TraceStream};
pub use types::{
    AccessDirection, DecodeError, EventKind, Extension, MemoryAccess, ParseError, Register,
    TraceEvent,
};
pub use writer::TraceWriter;
