//! Cursor-driven completion over an already scanned, parsed and analyzed
//! script: where the cursor sits, what it's legal to type there, and a
//! ranked, deduplicated list of suggestions.

mod candidate;
mod complete;
mod cursor;
mod grammar;
mod heap;
mod index;
mod namepath;
mod score;

pub use candidate::{Candidate, CandidateObject};
pub use complete::{complete_at_cursor, CompletionRequest};
pub use cursor::{build_cursor, CursorContext, ScriptCursor};
pub use score::Strategy;
