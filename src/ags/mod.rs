//! AGS4 file parsing.
//!
//! Extracts named GROUP blocks from an AGS4 document into [`Table`]s.
//!
//! [`Table`]: crate::models::Table

pub mod parser;

pub use parser::{load_tables, parse_group, AgsTables};
