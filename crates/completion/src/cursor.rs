use sqlsight_analyzer::{AnalyzedScript, ColumnRefId, ScopeId, TableRefId};
use sqlsight_ast::{Ast, NodeId, StatementRange};
use sqlsight_helpers::Status;
use sqlsight_scanner::{Location, RelativePosition, ScannedScript, Symbol, SymbolKind};

/// What kind of reference, if any, the cursor sits inside.
///
/// Set when the innermost enclosing scope holds a table/column reference
/// whose AST node lies on the path from the cursor to the scope root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorContext {
    None,
    TableRef(TableRefId),
    ColumnRef(ColumnRefId),
}

/// Everything the completion engine needs to know about where the cursor
/// sits in a parsed, analyzed script.
#[derive(Debug, Clone)]
pub struct ScriptCursor {
    pub offset: u32,
    pub symbol_index: Option<usize>,
    pub relative_position: RelativePosition,
    pub at_eof: bool,
    pub statement: StatementRange,
    /// The innermost AST node whose location contains the cursor.
    pub node: NodeId,
    /// Root-to-`node` path (root first, `node` last).
    pub path_to_root: Vec<NodeId>,
    /// Enclosing name scopes, deepest first.
    pub scope_stack: Vec<ScopeId>,
    pub context: CursorContext,
}

impl ScriptCursor {
    pub fn current_symbol<'a>(&self, scanned: &'a ScannedScript) -> Option<&'a Symbol> {
        self.symbol_index.and_then(|i| scanned.symbol(i))
    }

    pub fn previous_symbol<'a>(&self, scanned: &'a ScannedScript) -> Option<&'a Symbol> {
        self.symbol_index
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| scanned.symbol(i))
    }

    /// Whether the current or previous symbol is a dot, the trigger for
    /// name-path completion instead of general completion.
    pub fn is_dot_context(&self, scanned: &ScannedScript) -> bool {
        self.current_symbol(scanned).is_some_and(|s| s.kind.is_dot())
            || self.previous_symbol(scanned).is_some_and(|s| s.kind.is_dot())
    }

    /// The in-progress text of the token the cursor sits inside, truncated
    /// at the cursor offset (so typing in the middle of an identifier
    /// completes against the prefix typed so far, not the whole token).
    /// Empty when the current symbol isn't identifier-like.
    pub fn in_progress_text(&self, scanned: &ScannedScript) -> String {
        let Some(symbol) = self.current_symbol(scanned) else {
            return String::new();
        };
        if !symbol.kind.is_identifier_like() {
            return String::new();
        }
        let start = symbol.location.offset;
        let len = self.offset.saturating_sub(start).min(symbol.location.length);
        scanned.read_text_at(Location::new(start, len)).to_owned()
    }
}

/// Builds a [`ScriptCursor`] for `offset` against an already-analyzed
/// script. Fails only when the scanner has no symbol at all (an empty
/// script) or the AST has no statements to descend into.
pub fn build_cursor(
    scanned: &ScannedScript,
    ast: &Ast,
    analyzed: &AnalyzedScript,
    offset: u32,
) -> Result<ScriptCursor, Status> {
    let info = scanned.find_symbol(offset);
    let symbol_index = info.symbol_index;
    let (statement, node) = ast.node_at_offset(offset).ok_or(Status::CursorInputNotAnalyzed)?;

    let path_to_root = ast.path_to_root(node);
    let scope_stack = scope_chain(&path_to_root, analyzed);
    let context = resolve_context(&path_to_root, &scope_stack, analyzed);

    Ok(ScriptCursor {
        offset,
        symbol_index,
        relative_position: info.relative_position,
        at_eof: info.at_eof,
        statement,
        node,
        path_to_root,
        scope_stack,
        context,
    })
}

/// Finds the innermost scope whose root node lies on `path_to_root` (the
/// entry closest to `node`), then walks its parent chain outward.
fn scope_chain(path_to_root: &[NodeId], analyzed: &AnalyzedScript) -> Vec<ScopeId> {
    let innermost = path_to_root
        .iter()
        .rev()
        .find_map(|&node| analyzed.scopes.iter().find(|s| s.root == node).map(|s| s.id));

    let mut stack = Vec::new();
    let mut current = innermost;
    while let Some(id) = current {
        stack.push(id);
        current = analyzed.scopes[id.index()].parent;
    }
    stack
}

fn resolve_context(path_to_root: &[NodeId], scope_stack: &[ScopeId], analyzed: &AnalyzedScript) -> CursorContext {
    let Some(&innermost) = scope_stack.first() else {
        return CursorContext::None;
    };
    let scope = &analyzed.scopes[innermost.index()];

    for &tref_id in &scope.table_refs {
        if path_to_root.contains(&analyzed.table_refs[tref_id.index()].node) {
            return CursorContext::TableRef(tref_id);
        }
    }
    for &cref_id in &scope.column_refs {
        if path_to_root.contains(&analyzed.column_refs[cref_id.index()].node) {
            return CursorContext::ColumnRef(cref_id);
        }
    }
    CursorContext::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlsight_analyzer::{analyze, NameDefaults};
    use sqlsight_ast::parse;
    use sqlsight_catalog::{Catalog, EntryId};
    use sqlsight_scanner::scan;

    fn analyze_sql(sql: &str) -> (ScannedScript, Ast, AnalyzedScript) {
        let mut scanned = scan(sql);
        let (ast, errors) = parse(&scanned);
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        let mut catalog = Catalog::new();
        let analyzed = analyze(&mut scanned, &ast, &mut catalog, EntryId::new(0), &NameDefaults::default());
        (scanned, ast, analyzed)
    }

    #[test]
    fn cursor_inside_table_ref_tags_context() {
        let sql = "select a from orders";
        let (scanned, ast, analyzed) = analyze_sql(sql);
        let offset = sql.find("orders").unwrap() as u32 + 2;
        let cursor = build_cursor(&scanned, &ast, &analyzed, offset).unwrap();
        assert!(matches!(cursor.context, CursorContext::TableRef(_)));
    }

    #[test]
    fn cursor_inside_column_ref_tags_context() {
        let sql = "select amount from orders";
        let (scanned, ast, analyzed) = analyze_sql(sql);
        let offset = sql.find("amount").unwrap() as u32 + 2;
        let cursor = build_cursor(&scanned, &ast, &analyzed, offset).unwrap();
        assert!(matches!(cursor.context, CursorContext::ColumnRef(_)));
    }

    #[test]
    fn cursor_after_keyword_has_no_context() {
        let sql = "select a from orders";
        let (scanned, ast, analyzed) = analyze_sql(sql);
        let offset = 0;
        let cursor = build_cursor(&scanned, &ast, &analyzed, offset).unwrap();
        assert_eq!(cursor.context, CursorContext::None);
    }

    #[test]
    fn dot_context_detected_around_qualified_name() {
        let sql = "select o.amount from orders o";
        let (scanned, ast, analyzed) = analyze_sql(sql);
        let dot_offset = sql.find('.').unwrap() as u32;
        let cursor = build_cursor(&scanned, &ast, &analyzed, dot_offset + 1).unwrap();
        assert!(cursor.is_dot_context(&scanned));
    }

    #[test]
    fn in_progress_text_is_truncated_at_cursor() {
        let sql = "select amount from orders";
        let (scanned, ast, analyzed) = analyze_sql(sql);
        let start = sql.find("amount").unwrap() as u32;
        let cursor = build_cursor(&scanned, &ast, &analyzed, start + 3).unwrap();
        assert_eq!(cursor.in_progress_text(&scanned), "amo");
    }
}
