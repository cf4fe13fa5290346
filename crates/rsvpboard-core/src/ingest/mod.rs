//! Turning tabular guest data into canonical records.
//!
//! - `columns`: header-tolerant cell lookup
//! - `parser`: one raw row to one `GuestRecord`
//! - `reader`: CSV decoding and row extraction

pub mod columns;
pub mod parser;
pub mod reader;

pub use columns::{resolve, resolve_index, RawRow};
pub use parser::parse_guest;
pub use reader::{decode_bytes, parse_guest_bytes, parse_guest_csv, read_rows};
