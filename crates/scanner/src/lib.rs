//! Lookahead-aware tokenizer, name registry and restartable symbol stream.
//!
//! This crate is the scanner subsystem: it turns script text into a
//! [`ScannedScript`] holding a chunked [`Symbol`] stream, a
//! [`NameRegistry`], and the side lists (line breaks, comments, errors)
//! the rest of the pipeline needs without re-lexing.

mod error;
mod keywords;
mod location;
mod name;
mod scanner;
mod token;

pub use error::ScanError;
pub use keywords::Keyword;
pub use location::{Location, RelativePosition};
pub use name::{Name, NameId, NameRegistry, NameTags};
pub use scanner::{scan, LocationInfo, ScannedScript, SENTINEL_LEN};
pub use token::{Comparison, Operator, Symbol, SymbolKind};
