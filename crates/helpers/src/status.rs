/// A `Copy`, exhaustively-matchable result code returned by pipeline and
/// catalog operations in place of panicking or an error trait object.
/// Pipeline-guard and catalog-integrity failures are plain status values;
/// diagnostics the user should see are `ScanError`/`ParseError` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    Ok,
    ParserInputNotScanned,
    AnalyzerInputNotParsed,
    CursorInputNotAnalyzed,
    CompletionInputNotCursored,
    ExternalIdCollision,
    CatalogIdOutOfSync,
    CatalogScriptNotAnalyzed,
    CatalogMismatch,
    CatalogDescriptorTablesNull,
    CatalogDescriptorTableNameEmpty,
    CatalogDescriptorTableNameCollision,
    CompletionMissesCursor,
    CompletionMissesScannerToken,
}

impl Status {
    pub const fn is_ok(self) -> bool {
        matches!(self, Status::Ok)
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::Ok
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_ok() {
        assert_eq!(Status::default(), Status::Ok);
        assert!(Status::Ok.is_ok());
        assert!(!Status::CatalogIdOutOfSync.is_ok());
    }
}
