use std::time::Instant;

use sqlsight_analyzer::{analyze, script_contribution, AnalyzedScript};
use sqlsight_ast::{parse, Ast, ParseError};
use sqlsight_catalog::{Catalog, EntryId, ScriptContribution};
use sqlsight_completion::{build_cursor, complete_at_cursor, CompletionRequest, ScriptCursor};
use sqlsight_helpers::Status;
use sqlsight_scanner::{scan, ScanError, ScannedScript};

use crate::config::EngineConfig;
use crate::packed::PackedBytes;
use crate::stats::ScriptStatistics;

/// A handle to one editable SQL text plus its derived scan/parse/analysis
/// artifacts. Stages run in order — scan, parse, analyze, cursor, complete
/// — and each guards against being called before its predecessor with the
/// matching `*_INPUT_NOT_*` status rather than panicking.
pub struct Script {
    external_id: EntryId,
    config: EngineConfig,
    text: String,
    scanned: Option<ScannedScript>,
    ast: Option<Ast>,
    parse_errors: Vec<ParseError>,
    analyzed: Option<AnalyzedScript>,
    analyzed_catalog_version: Option<u64>,
    cursor: Option<ScriptCursor>,
    stats: ScriptStatistics,
}

impl Script {
    pub fn new(external_id: EntryId, text: impl Into<String>, config: EngineConfig) -> Self {
        Self {
            external_id,
            config,
            text: text.into(),
            scanned: None,
            ast: None,
            parse_errors: Vec::new(),
            analyzed: None,
            analyzed_catalog_version: None,
            cursor: None,
            stats: ScriptStatistics::default(),
        }
    }

    pub fn external_id(&self) -> EntryId {
        self.external_id
    }

    pub fn to_string(&self) -> String {
        self.text.clone()
    }

    /// Invalidates every derived stage: an edited script must be rescanned
    /// before it can be parsed, analyzed, or completed against again.
    fn invalidate(&mut self) {
        self.scanned = None;
        self.ast = None;
        self.parse_errors.clear();
        self.analyzed = None;
        self.analyzed_catalog_version = None;
        self.cursor = None;
    }

    pub fn insert_text_at(&mut self, offset: usize, text: &str) {
        self.text.insert_str(offset, text);
        self.invalidate();
    }

    pub fn insert_char_at(&mut self, offset: usize, ch: char) {
        self.text.insert(offset, ch);
        self.invalidate();
    }

    pub fn erase_range(&mut self, offset: usize, count: usize) {
        let end = (offset + count).min(self.text.len());
        self.text.replace_range(offset..end, "");
        self.invalidate();
    }

    pub fn scan(&mut self) -> Status {
        log::trace!("scan start for entry {:?}", self.external_id);
        let start = Instant::now();
        let scanned = scan(&self.text);
        self.stats.scan.wall_time_micros = start.elapsed().as_micros() as u64;
        self.stats.scan.symbol_count = scanned.symbol_count() as u32;
        self.scanned = Some(scanned);
        self.ast = None;
        self.parse_errors.clear();
        self.analyzed = None;
        self.analyzed_catalog_version = None;
        self.cursor = None;
        log::trace!("scan done for entry {:?}", self.external_id);
        Status::Ok
    }

    pub fn parse(&mut self) -> Status {
        let Some(scanned) = &self.scanned else {
            return Status::ParserInputNotScanned;
        };
        log::trace!("parse start for entry {:?}", self.external_id);
        let start = Instant::now();
        let (ast, errors) = parse(scanned);
        self.stats.parse.wall_time_micros = start.elapsed().as_micros() as u64;
        self.stats.parse.node_count = ast.node_count() as u32;
        self.parse_errors = errors;
        self.ast = Some(ast);
        self.analyzed = None;
        self.analyzed_catalog_version = None;
        self.cursor = None;
        log::trace!("parse done for entry {:?}", self.external_id);
        Status::Ok
    }

    pub fn parse_errors(&self) -> &[ParseError] {
        &self.parse_errors
    }

    pub fn scan_errors(&self) -> &[ScanError] {
        self.scanned.as_ref().map(|s| s.errors.as_slice()).unwrap_or(&[])
    }

    pub fn analyze(&mut self, catalog: &mut Catalog) -> Status {
        let Some(ast) = self.ast.as_ref() else {
            return Status::AnalyzerInputNotParsed;
        };
        let Some(scanned) = self.scanned.as_mut() else {
            return Status::AnalyzerInputNotParsed;
        };
        log::trace!("analyze start for entry {:?}", self.external_id);
        let start = Instant::now();
        let defaults = self.config.name_defaults();
        let analyzed = analyze(scanned, ast, catalog, self.external_id, &defaults);
        self.stats.analyze.wall_time_micros = start.elapsed().as_micros() as u64;
        self.stats.analyze.table_count = analyzed.tables.len() as u32;
        self.analyzed = Some(analyzed);
        self.analyzed_catalog_version = Some(catalog.version());
        self.cursor = None;
        log::trace!("analyze done for entry {:?}", self.external_id);
        Status::Ok
    }

    /// Builds what `Catalog::load_script` expects from this script's
    /// current analysis, or `None` if it hasn't been analyzed yet.
    pub fn contribution(&self, rank: u32) -> Option<ScriptContribution> {
        let scanned = self.scanned.as_ref()?;
        let analyzed = self.analyzed.as_ref()?;
        Some(script_contribution(scanned, analyzed, self.external_id, rank))
    }

    pub fn move_cursor(&mut self, offset: u32) -> Status {
        let (Some(scanned), Some(ast), Some(analyzed)) = (&self.scanned, &self.ast, &self.analyzed) else {
            return Status::CursorInputNotAnalyzed;
        };
        match build_cursor(scanned, ast, analyzed, offset) {
            Ok(cursor) => {
                self.cursor = Some(cursor);
                Status::Ok
            }
            Err(status) => {
                self.cursor = None;
                status
            }
        }
    }

    pub fn complete_at_cursor(&self, catalog: &Catalog, limit: Option<usize>) -> PackedBytes {
        let (Some(scanned), Some(ast), Some(analyzed), Some(cursor)) =
            (&self.scanned, &self.ast, &self.analyzed, &self.cursor)
        else {
            return PackedBytes::status(Status::CompletionInputNotCursored);
        };
        let defaults = self.config.name_defaults();
        let request = CompletionRequest {
            scanned,
            ast,
            analyzed,
            catalog,
            defaults: &defaults,
            current_entry: Some(self.external_id),
            offset: cursor.offset,
            limit: limit.unwrap_or(self.config.completion_limit),
        };
        match complete_at_cursor(&request) {
            Ok(candidates) => PackedBytes::ok(&candidates),
            Err(status) => PackedBytes::status(status),
        }
    }

    pub fn get_statistics(&self) -> PackedBytes {
        PackedBytes::ok(&self.stats)
    }

    pub fn analyzed_catalog_version(&self) -> Option<u64> {
        self.analyzed_catalog_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u32) -> EntryId {
        EntryId::new(id)
    }

    #[test]
    fn pipeline_guards_reject_out_of_order_calls() {
        let mut script = Script::new(entry(1), "select 1", EngineConfig::default());
        assert_eq!(script.parse(), Status::ParserInputNotScanned);
        let mut catalog = Catalog::new();
        assert_eq!(script.analyze(&mut catalog), Status::AnalyzerInputNotParsed);
        assert_eq!(script.move_cursor(0), Status::CursorInputNotAnalyzed);
    }

    #[test]
    fn full_pipeline_completes_after_create_table() {
        let mut script = Script::new(entry(1), "create table foo(a int);", EngineConfig::default());
        let mut catalog = Catalog::new();
        assert_eq!(script.scan(), Status::Ok);
        assert_eq!(script.parse(), Status::Ok);
        assert_eq!(script.analyze(&mut catalog), Status::Ok);
        let contribution = script.contribution(0).unwrap();
        assert_eq!(catalog.load_script(contribution), Ok(()));
        let offset = script.to_string().len() as u32 - 1;
        assert_eq!(script.move_cursor(offset), Status::Ok);
        let packed = script.complete_at_cursor(&catalog, None);
        assert!(packed.status.is_ok());
    }

    #[test]
    fn editing_the_text_invalidates_derived_stages() {
        let mut script = Script::new(entry(1), "select 1", EngineConfig::default());
        assert_eq!(script.scan(), Status::Ok);
        assert_eq!(script.parse(), Status::Ok);
        script.insert_char_at(0, ' ');
        let mut catalog = Catalog::new();
        assert_eq!(script.analyze(&mut catalog), Status::AnalyzerInputNotParsed);
    }
}
