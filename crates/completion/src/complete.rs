//! Orchestrates the completion flow: short-circuit on punctuation, then
//! dot-path completion, or else grammar keywords plus catalog/script name
//! search, deduplicated and ranked into a bounded top-*k*.

use smol_str::SmolStr;
use sqlsight_analyzer::{AnalyzedScript, NameDefaults};
use sqlsight_ast::Ast;
use sqlsight_catalog::{Catalog, EntryId};
use sqlsight_helpers::{IndexMap, Status};
use sqlsight_scanner::{NameTags, ScannedScript};

use crate::candidate::{Candidate, CandidateObject};
use crate::cursor::{build_cursor, CursorContext, ScriptCursor};
use crate::grammar;
use crate::heap::TopK;
use crate::index::NameIndex;
use crate::namepath;
use crate::score::{self, Strategy};

/// Everything [`complete_at_cursor`] needs: the already-scanned, parsed,
/// analyzed script, the catalog it was analyzed against, the name
/// defaults used during that analysis, and the cursor's byte offset.
pub struct CompletionRequest<'a> {
    pub scanned: &'a ScannedScript,
    pub ast: &'a Ast,
    pub analyzed: &'a AnalyzedScript,
    pub catalog: &'a Catalog,
    pub defaults: &'a NameDefaults,
    /// The script's own entry in `catalog`, if loaded, excluded from
    /// table-name suggestions so a half-written `CREATE TABLE` doesn't
    /// suggest completing itself.
    pub current_entry: Option<EntryId>,
    pub offset: u32,
    pub limit: usize,
}

/// Up to `request.limit` ranked completion candidates at `request.offset`.
pub fn complete_at_cursor(request: &CompletionRequest) -> Result<Vec<Candidate>, Status> {
    log::debug!("completing at offset {}", request.offset);
    let cursor = build_cursor(request.scanned, request.ast, request.analyzed, request.offset)?;

    if cursor
        .current_symbol(request.scanned)
        .is_some_and(|s| s.kind.is_structural_punctuator())
    {
        return Ok(Vec::new());
    }

    let mut raw = Vec::new();

    if cursor.is_dot_context(request.scanned) {
        raw.extend(namepath::candidates(
            request.scanned,
            request.ast,
            request.analyzed,
            request.catalog,
            request.defaults,
            request.current_entry,
            &cursor,
        ));
    } else {
        let strategy = Strategy::from_context(cursor.context);
        let needle = cursor.in_progress_text(request.scanned);

        let name_index = NameIndex::build(request.scanned, request.catalog);
        raw.extend(keyword_candidates(&cursor, request.ast, &needle));
        raw.extend(name_index.search(strategy, &needle));
        raw.extend(scope_column_promotion(request, &cursor, &needle));
    }

    let merged = merge_by_text(raw);
    let merged = exclude_self_occurrence(merged, &cursor, request.scanned);

    let mut top_k = TopK::new(request.limit.max(1));
    for candidate in merged {
        top_k.push(candidate);
    }
    Ok(top_k.into_sorted_vec())
}

fn keyword_candidates(cursor: &ScriptCursor, ast: &Ast, needle: &str) -> Vec<Candidate> {
    let mut out = Vec::new();
    for keyword in grammar::expected_keywords(cursor, ast) {
        let text = grammar::keyword_text(keyword);
        let Some(bonus) = score::match_bonus(&text, needle) else {
            continue;
        };
        let total =
            score::base_score(Strategy::Default, NameTags::KEYWORD) + score::keyword_prevalence(keyword) + bonus;
        out.push(Candidate::new(text, NameTags::KEYWORD, total).with_object(CandidateObject::Keyword(keyword)));
    }
    out
}

/// Promotes tables that would resolve a currently-unresolved column
/// reference in the cursor's own statement, then promotes those tables'
/// peer columns too — a table only earns the boost if one of its columns
/// would actually clear up an unresolved reference, not merely because
/// it's in scope.
fn scope_column_promotion(request: &CompletionRequest, cursor: &ScriptCursor, needle: &str) -> Vec<Candidate> {
    let CursorContext::ColumnRef(_) = cursor.context else {
        return Vec::new();
    };
    let Some(&scope_id) = cursor.scope_stack.first() else {
        return Vec::new();
    };
    let scope = &request.analyzed.scopes[scope_id.index()];

    let Some(statement_id) = request.ast.statements.iter().position(|s| s.root == cursor.statement.root) else {
        return Vec::new();
    };
    let statement_id = statement_id as u32;

    let unresolved_names: Vec<&str> = scope
        .column_refs
        .iter()
        .map(|&cref_id| &request.analyzed.column_refs[cref_id.index()])
        .filter(|cref| cref.statement_id == statement_id && cref.resolved.is_none())
        .map(|cref| request.scanned.names.get(cref.name.column).text())
        .collect();
    if unresolved_names.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::new();
    for &tref_id in &scope.table_refs {
        let tref = &request.analyzed.table_refs[tref_id.index()];
        let Some(resolved) = tref.resolved else { continue };
        let Some(table) = request.catalog.resolve_table_by_id(resolved.catalog_table_id) else {
            continue;
        };
        let would_resolve = table
            .columns
            .iter()
            .any(|c| unresolved_names.iter().any(|&name| name == c.as_str()));
        if !would_resolve {
            continue;
        }

        if let Some(alias) = tref.alias {
            let alias_text = request.scanned.names.get(alias).text();
            if let Some(bonus) = score::match_bonus(alias_text, needle) {
                let total = score::base_score(Strategy::ColumnRef, NameTags::TABLE_ALIAS) + bonus;
                out.push(Candidate::new(alias_text, NameTags::TABLE_ALIAS, total));
            }
        }
        for (index, column) in table.columns.iter().enumerate() {
            if let Some(bonus) = score::match_bonus(column.as_str(), needle) {
                let total = score::base_score(Strategy::ColumnRef, NameTags::COLUMN_NAME) + bonus;
                out.push(
                    Candidate::new(column.as_str(), NameTags::COLUMN_NAME, total)
                        .with_object(CandidateObject::Column(table.id, index as u32)),
                );
            }
        }
    }
    out
}

/// Candidates sharing the same text are the same suggestion seen through
/// different lenses (a keyword that's also a column name, a table found
/// via both the script and the catalog); merge rather than show twice.
fn merge_by_text(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut by_text: IndexMap<SmolStr, Candidate> = IndexMap::default();
    for candidate in candidates {
        match by_text.get_mut(&candidate.text) {
            Some(existing) => existing.merge(candidate),
            None => {
                by_text.insert(candidate.text.clone(), candidate);
            }
        }
    }
    by_text.into_values().collect()
}

/// Drops the candidate that's just the identifier the cursor is already
/// sitting inside, fully typed — completing a finished token to itself
/// isn't a suggestion.
fn exclude_self_occurrence(candidates: Vec<Candidate>, cursor: &ScriptCursor, scanned: &ScannedScript) -> Vec<Candidate> {
    let Some(symbol) = cursor.current_symbol(scanned) else {
        return candidates;
    };
    if !symbol.kind.is_identifier_like() {
        return candidates;
    }
    let current_text = scanned.read_text_at(symbol.location);
    candidates.into_iter().filter(|c| c.text.as_str() != current_text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlsight_analyzer::{analyze, NameDefaults};
    use sqlsight_ast::parse;
    use sqlsight_catalog::ScriptContribution;
    use sqlsight_scanner::scan;

    fn declare(catalog: &mut Catalog, sql: &str, external_id: u32, rank: u32) {
        let mut scanned = scan(sql);
        let (ast, errors) = parse(&scanned);
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        let analyzed = analyze(&mut scanned, &ast, catalog, EntryId::new(external_id), &NameDefaults::default());
        let contribution = sqlsight_analyzer::script_contribution(&scanned, &analyzed, EntryId::new(external_id), rank);
        catalog.load_script(contribution).unwrap();
    }

    #[test]
    fn promotes_only_the_table_whose_columns_would_resolve_the_unresolved_column() {
        let mut catalog = Catalog::new();
        declare(&mut catalog, "create table orders (id int, total int)", 0, 0);
        declare(&mut catalog, "create table customers (id int, name text)", 1, 1);

        let sql = "select total from orders o, customers c";
        let mut scanned = scan(sql);
        let (ast, errors) = parse(&scanned);
        assert!(errors.is_empty());
        let defaults = NameDefaults::default();
        let analyzed = analyze(&mut scanned, &ast, &mut catalog, EntryId::new(2), &defaults);

        let offset = sql.find("total").unwrap() as u32;
        let cursor = build_cursor(&scanned, &ast, &analyzed, offset).unwrap();
        assert!(matches!(cursor.context, CursorContext::ColumnRef(_)));

        let request = CompletionRequest {
            scanned: &scanned,
            ast: &ast,
            analyzed: &analyzed,
            catalog: &catalog,
            defaults: &defaults,
            current_entry: Some(EntryId::new(2)),
            offset,
            limit: 50,
        };
        let candidates = scope_column_promotion(&request, &cursor, "");
        let names: Vec<&str> = candidates.iter().map(|c| c.text.as_str()).collect();

        assert!(names.contains(&"o"), "expected orders' alias to be promoted: {names:?}");
        assert!(names.contains(&"id"));
        assert!(names.contains(&"total"));
        assert!(!names.contains(&"c"), "customers has no column named total and should not be promoted");
        assert!(!names.contains(&"name"));
    }

    #[test]
    fn no_promotion_when_every_column_reference_already_resolved() {
        let mut catalog = Catalog::new();
        declare(&mut catalog, "create table orders (id int, total int)", 0, 0);

        let sql = "select o.total from orders o";
        let mut scanned = scan(sql);
        let (ast, errors) = parse(&scanned);
        assert!(errors.is_empty());
        let defaults = NameDefaults::default();
        let analyzed = analyze(&mut scanned, &ast, &mut catalog, EntryId::new(1), &defaults);

        let offset = sql.find("total").unwrap() as u32;
        let cursor = build_cursor(&scanned, &ast, &analyzed, offset).unwrap();

        let request = CompletionRequest {
            scanned: &scanned,
            ast: &ast,
            analyzed: &analyzed,
            catalog: &catalog,
            defaults: &defaults,
            current_entry: Some(EntryId::new(1)),
            offset,
            limit: 50,
        };
        let candidates = scope_column_promotion(&request, &cursor, "");
        assert!(candidates.is_empty());
    }
}
