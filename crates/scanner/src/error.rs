use thiserror::Error;

use crate::location::Location;

/// A recoverable lexical error. The scanner appends these to
/// [`crate::ScannedScript::errors`] and keeps scanning to end-of-file, so
/// downstream stages can still produce a partial result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanError {
    pub message: String,
    pub location: Location,
}

impl ScanError {
    pub fn new(message: impl Into<String>, location: Location) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}
