//! Dot-triggered name-path completion: `db.<cursor>`, `schema.<cursor>`,
//! `table_or_alias.<cursor>`.

use sqlsight_analyzer::NameDefaults;
use sqlsight_ast::{Ast, Attribute, NodeId, NodeType};
use sqlsight_catalog::{Catalog, EntryId};
use sqlsight_scanner::{NameTags, ScannedScript};

use crate::candidate::{Candidate, CandidateObject};
use crate::cursor::{CursorContext, ScriptCursor};
use crate::score::{self, Strategy};

/// A name path's already-typed components (sealed: end at or before the
/// cursor) and the prefix still being typed (from the matched symbol, via
/// [`ScriptCursor::in_progress_text`]).
struct NamePath {
    sealed: Vec<String>,
    in_progress: String,
}

fn name_path_at(ast: &Ast, scanned: &ScannedScript, cursor: &ScriptCursor, node: NodeId) -> NamePath {
    let mut sealed = Vec::new();
    for &child in ast.children(node) {
        let child_node = ast.node(child);
        if child_node.node_type != NodeType::NamePathComponent {
            continue;
        }
        if child_node.location.end() > cursor.offset {
            continue;
        }
        let Attribute::Name(name_id) = child_node.attribute else {
            continue;
        };
        sealed.push(scanned.names.get(name_id).text().to_string());
    }
    NamePath {
        sealed,
        in_progress: cursor.in_progress_text(scanned),
    }
}

/// Name-path candidates for the cursor, or an empty vec when the cursor
/// isn't inside a table/column reference, or isn't at a dot at all.
pub fn candidates(
    scanned: &ScannedScript,
    ast: &Ast,
    analyzed: &sqlsight_analyzer::AnalyzedScript,
    catalog: &Catalog,
    defaults: &NameDefaults,
    current_entry: Option<EntryId>,
    cursor: &ScriptCursor,
) -> Vec<Candidate> {
    if !cursor.is_dot_context(scanned) {
        return Vec::new();
    }

    match cursor.context {
        CursorContext::TableRef(tref_id) => {
            let tref = &analyzed.table_refs[tref_id.index()];
            let path = name_path_at(ast, scanned, cursor, tref.node);
            table_ref_candidates(catalog, defaults, current_entry, &path)
        }
        CursorContext::ColumnRef(cref_id) => {
            let cref = &analyzed.column_refs[cref_id.index()];
            let path = name_path_at(ast, scanned, cursor, cref.node);
            column_ref_candidates(scanned, catalog, analyzed, cursor, &path)
        }
        CursorContext::None => Vec::new(),
    }
}

fn table_ref_candidates(
    catalog: &Catalog,
    defaults: &NameDefaults,
    current_entry: Option<EntryId>,
    path: &NamePath,
) -> Vec<Candidate> {
    let mut out = Vec::new();
    match path.sealed.as_slice() {
        [] => {}
        [a] => {
            if let Some(db_id) = catalog.database_id_by_name(a) {
                for (_, schema_name) in catalog.schemas_in_database(db_id) {
                    push_scored(&mut out, Strategy::TableRef, NameTags::SCHEMA_NAME, schema_name, &path.in_progress, CandidateObject::Schema);
                }
            }
            if let Some(default_db) = catalog.database_id_by_name(defaults.database.as_str()) {
                if let Some(schema_id) = catalog.schema_id_by_name(default_db, a) {
                    for table in catalog.tables_in_schema(default_db, schema_id, current_entry) {
                        push_scored(
                            &mut out,
                            Strategy::TableRef,
                            NameTags::TABLE_NAME,
                            table.table.as_str(),
                            &path.in_progress,
                            CandidateObject::Table(table.id),
                        );
                    }
                }
            }
        }
        [a, b] => {
            if let Some(db_id) = catalog.database_id_by_name(a) {
                if let Some(schema_id) = catalog.schema_id_by_name(db_id, b) {
                    for table in catalog.tables_in_schema(db_id, schema_id, current_entry) {
                        push_scored(
                            &mut out,
                            Strategy::TableRef,
                            NameTags::TABLE_NAME,
                            table.table.as_str(),
                            &path.in_progress,
                            CandidateObject::Table(table.id),
                        );
                    }
                }
            }
        }
        _ => {}
    }
    out
}

fn column_ref_candidates(
    scanned: &ScannedScript,
    catalog: &Catalog,
    analyzed: &sqlsight_analyzer::AnalyzedScript,
    cursor: &ScriptCursor,
    path: &NamePath,
) -> Vec<Candidate> {
    let [qualifier] = path.sealed.as_slice() else {
        return Vec::new();
    };

    let Some(&scope_id) = cursor.scope_stack.first() else {
        return Vec::new();
    };
    let scope = &analyzed.scopes[scope_id.index()];

    let mut out = Vec::new();
    for &tref_id in &scope.table_refs {
        let tref = &analyzed.table_refs[tref_id.index()];
        let qualifier_name = scanned.names.get(tref.effective_qualifier()).text();
        if qualifier_name != qualifier.as_str() {
            continue;
        }
        let Some(resolved) = tref.resolved else { continue };
        let Some(table) = catalog.resolve_table_by_id(resolved.catalog_table_id) else {
            continue;
        };
        for (index, column) in table.columns.iter().enumerate() {
            push_scored(
                &mut out,
                Strategy::ColumnRef,
                NameTags::COLUMN_NAME,
                column.as_str(),
                &path.in_progress,
                CandidateObject::Column(table.id, index as u32),
            );
        }
    }
    out
}

fn push_scored(
    out: &mut Vec<Candidate>,
    strategy: Strategy,
    tag: NameTags,
    text: &str,
    needle: &str,
    object: CandidateObject,
) {
    let Some(bonus) = score::match_bonus(text, needle) else {
        return;
    };
    let total = score::base_score(strategy, tag) + bonus;
    out.push(Candidate::new(text, tag, total).with_object(object));
}
