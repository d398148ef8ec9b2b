use thiserror::Error;

use sqlsight_scanner::Location;

/// A recoverable parse error. The parser resynchronizes at the next
/// statement-separating `;` (or end of file) so that a single malformed
/// statement doesn't prevent the rest of the script from being parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub location: Location,
}

impl ParseError {
    pub fn new(message: impl Into<String>, location: Location) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}
