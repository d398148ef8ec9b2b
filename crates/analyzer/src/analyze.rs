use sqlsight_ast::{Ast, Attribute, NodeId, NodeType};
use sqlsight_catalog::{Catalog, CatalogTableId, EntryId};
use sqlsight_helpers::IndexMap;
use sqlsight_scanner::{Location, NameId, NameTags, ScannedScript};

use crate::config::NameDefaults;
use crate::qualified::{QualifiedColumnName, QualifiedTableName};
use crate::query_graph::QueryGraphEdge;
use crate::reference::{ColumnRefId, ColumnReference, ResolvedColumn, ResolvedTable, TableRefId, TableReference};
use crate::scope::{NameScope, ScopeId};
use crate::table::{TableColumn, TableDeclaration};

/// Per-node overlay state threaded bottom-up during the post-order walk.
/// Spliced into the parent, then dropped once consumed.
#[derive(Debug, Clone, Default)]
struct NodeState {
    child_scopes: Vec<ScopeId>,
    pending_columns: Vec<TableColumn>,
    table_refs: Vec<TableRefId>,
    column_refs: Vec<ColumnRefId>,
}

impl NodeState {
    fn extend(&mut self, other: NodeState) {
        self.child_scopes.extend(other.child_scopes);
        self.pending_columns.extend(other.pending_columns);
        self.table_refs.extend(other.table_refs);
        self.column_refs.extend(other.column_refs);
    }
}

/// The analyzed form of a parsed script: declarations, references, the
/// query graph, and the scope forest.
#[derive(Debug, Clone, Default)]
pub struct AnalyzedScript {
    pub tables: Vec<TableDeclaration>,
    pub table_refs: Vec<TableReference>,
    pub column_refs: Vec<ColumnReference>,
    pub edges: Vec<QueryGraphEdge>,
    pub scopes: Vec<NameScope>,
    pub root_scopes: Vec<ScopeId>,
    /// Last-inserted-wins within the script, per the duplicate-declaration
    /// tie-break.
    pub tables_by_name: IndexMap<(NameId, NameId, NameId), usize>,
}

impl AnalyzedScript {
    fn next_table_ref_id(&self) -> TableRefId {
        TableRefId::new(self.table_refs.len() as u32)
    }

    fn next_column_ref_id(&self) -> ColumnRefId {
        ColumnRefId::new(self.column_refs.len() as u32)
    }

    fn next_scope_id(&self) -> ScopeId {
        ScopeId::new(self.scopes.len() as u32)
    }
}

/// Runs name resolution over `ast`: builds table declarations
/// and references, the query graph, and the scope forest, allocating
/// catalog ids for every `CREATE TABLE` along the way, then resolves
/// table and column references in a second, root-to-leaf traversal.
///
/// `external_id` is this script's catalog entry id, used both to stamp
/// freshly allocated `CatalogTableId`s and to exclude self-matches during
/// cross-script table resolution.
pub fn analyze(
    scanned: &mut ScannedScript,
    ast: &Ast,
    catalog: &mut Catalog,
    external_id: EntryId,
    defaults: &NameDefaults,
) -> AnalyzedScript {
    scanned.names.reset_resolved_tags();
    let mut analyzed = AnalyzedScript::default();
    let mut states: Vec<Option<NodeState>> = vec![None; ast.node_count()];

    for node_id in ast.iter_ids() {
        let node = ast.node(node_id);
        let children = ast.children(node_id).to_vec();

        let child_states: Vec<NodeState> = children
            .iter()
            .map(|&child| states[child.index()].take().unwrap_or_default())
            .collect();

        if node.node_type == NodeType::ComparisonExpression {
            if let Attribute::Comparison(cmp) = node.attribute {
                let left = child_states[0].column_refs.clone();
                let right = child_states[1].column_refs.clone();
                if !left.is_empty() && !right.is_empty() {
                    analyzed.edges.push(QueryGraphEdge {
                        comparison: cmp,
                        left,
                        right,
                    });
                }
            }
        }

        let mut state = NodeState::default();
        for child_state in child_states {
            state.extend(child_state);
        }

        match node.node_type {
            NodeType::ColumnDef => {
                let name = leaf_name(ast, children[0]);
                scanned.names.tag(name, NameTags::COLUMN_NAME);
                state.pending_columns.push(TableColumn {
                    name,
                    node: Some(children[0]),
                });
            }
            NodeType::ColumnRef => {
                let components = name_path_components(ast, &children);
                let name = build_qualified_column_name(&components);
                let id = analyzed.next_column_ref_id();
                analyzed.column_refs.push(ColumnReference {
                    id,
                    name,
                    node: node_id,
                    statement_id: 0,
                    scope_root: NodeId::new(0),
                    resolved: None,
                });
                state.column_refs.push(id);
            }
            NodeType::TableRef => {
                let (name, alias) = build_qualified_table_name(scanned, &children, ast, node_id, defaults);
                let table_name = name.table;
                scanned.names.tag(table_name, NameTags::TABLE_NAME);
                if let Some(alias_id) = alias {
                    scanned.names.tag(alias_id, NameTags::TABLE_ALIAS);
                }
                let id = analyzed.next_table_ref_id();
                analyzed.table_refs.push(TableReference {
                    id,
                    name,
                    alias,
                    node: node_id,
                    statement_id: 0,
                    scope_root: NodeId::new(0),
                    resolved: None,
                });
                state.table_refs.push(id);
            }
            _ => {}
        }

        if node.node_type == NodeType::CreateTableStatement || node.node_type == NodeType::CreateTableAsStatement {
            // The declared table's own name was built as an ordinary
            // TableRef above; pull it back out and turn it into a
            // declaration instead of leaving it as a query reference. The
            // stray `TableReference` entry is left in place (never
            // resolved, never swept into a scope) rather than removed, so
            // no other reference's id shifts.
            let decl_ref_id = state.table_refs.remove(0);
            let decl_ref = analyzed.table_refs[decl_ref_id.index()].clone();

            let database_id = catalog.allocate_database_id(scanned.names.get(decl_ref.name.database).text());
            let schema_id = catalog.allocate_schema_id(
                database_id,
                scanned.names.get(decl_ref.name.schema).text(),
            );

            let mut columns = std::mem::take(&mut state.pending_columns);
            columns.sort_by(|a, b| scanned.names.get(a.name).text().cmp(scanned.names.get(b.name).text()));

            let catalog_table_id = CatalogTableId {
                entry_id: external_id,
                local_index: analyzed.tables.len() as u32,
            };
            analyzed.tables.push(TableDeclaration {
                catalog_table_id,
                database_id,
                schema_id,
                name: decl_ref.name,
                columns,
                node: decl_ref.node,
                statement_id: 0,
                scope_root: node_id,
            });
            let key = (decl_ref.name.database, decl_ref.name.schema, decl_ref.name.table);
            analyzed.tables_by_name.insert(key, analyzed.tables.len() - 1);
        }

        if node.node_type.is_scope_introducing() {
            let scope_id = analyzed.next_scope_id();
            let children_scopes = std::mem::take(&mut state.child_scopes);
            for &child in &children_scopes {
                analyzed.scopes[child.index()].parent = Some(scope_id);
            }
            analyzed.root_scopes.retain(|r| !children_scopes.contains(r));

            let table_refs = std::mem::take(&mut state.table_refs);
            let column_refs = std::mem::take(&mut state.column_refs);
            for &tref in &table_refs {
                analyzed.table_refs[tref.index()].scope_root = node_id;
            }
            for &cref in &column_refs {
                analyzed.column_refs[cref.index()].scope_root = node_id;
            }

            let mut scope = NameScope::new(scope_id, node_id);
            scope.children = children_scopes;
            scope.table_refs = table_refs;
            scope.column_refs = column_refs;
            analyzed.scopes.push(scope);
            analyzed.root_scopes.push(scope_id);
            state.child_scopes.push(scope_id);
        }

        states[node_id.index()] = Some(state);
    }

    assign_statement_ids(ast, &mut analyzed);

    let roots = analyzed.root_scopes.clone();
    for root in roots {
        resolve_scope(root, &mut analyzed, scanned, catalog, external_id);
    }

    analyzed
}

fn leaf_name(ast: &Ast, id: NodeId) -> NameId {
    match ast.node(id).attribute {
        Attribute::Name(name) => name,
        other => unreachable!("expected a Name attribute, found {other:?}"),
    }
}

fn name_path_components(ast: &Ast, children: &[NodeId]) -> Vec<NameId> {
    children
        .iter()
        .filter(|&&id| ast.node(id).node_type == NodeType::NamePathComponent)
        .map(|&id| leaf_name(ast, id))
        .collect()
}

fn alias_component(ast: &Ast, children: &[NodeId]) -> Option<NameId> {
    children
        .iter()
        .find(|&&id| ast.node(id).node_type == NodeType::Alias)
        .map(|&id| leaf_name(ast, id))
}

/// A column ref's name path is 1 component (bare column) or 2
/// (`alias.column`). A path longer than 2 (possible only because the
/// grammar shares `parse_name_path` with table refs) keeps its last two
/// components as alias/column, dropping any leading ones.
fn build_qualified_column_name(components: &[NameId]) -> QualifiedColumnName {
    match components.len() {
        1 => QualifiedColumnName {
            table_alias: None,
            column: components[0],
        },
        _ => QualifiedColumnName {
            table_alias: Some(components[components.len() - 2]),
            column: components[components.len() - 1],
        },
    }
}

fn build_qualified_table_name(
    scanned: &mut ScannedScript,
    children: &[NodeId],
    ast: &Ast,
    node_id: NodeId,
    defaults: &NameDefaults,
) -> (QualifiedTableName, Option<NameId>) {
    let components = name_path_components(ast, children);
    let alias = alias_component(ast, children);
    let location = ast.node(node_id).location;

    let (database, schema, table) = match components.len() {
        1 => (None, None, components[0]),
        2 => (None, Some(components[0]), components[1]),
        _ => (Some(components[0]), Some(components[1]), components[2]),
    };

    let database = database.unwrap_or_else(|| {
        register_default(scanned, &defaults.database, location, NameTags::DATABASE_NAME)
    });
    let schema = schema.unwrap_or_else(|| {
        register_default(scanned, &defaults.schema, location, NameTags::SCHEMA_NAME)
    });

    (
        QualifiedTableName {
            database,
            schema,
            table,
            node: node_id,
        },
        alias,
    )
}

fn register_default(scanned: &mut ScannedScript, text: &str, location: Location, tag: NameTags) -> NameId {
    scanned.names.register(text, Location::at(location.offset), tag)
}

/// Stamps each table/column reference's `statement_id` by walking the
/// (node-id-sorted) reference list and the (location-sorted) statement
/// list in tandem.
fn assign_statement_ids(ast: &Ast, analyzed: &mut AnalyzedScript) {
    let mut stmt_idx = 0usize;
    for tref in &mut analyzed.table_refs {
        while stmt_idx < ast.statements.len() && !ast.statements[stmt_idx].contains_node(tref.node) {
            stmt_idx += 1;
        }
        tref.statement_id = stmt_idx as u32;
    }
    stmt_idx = 0;
    for cref in &mut analyzed.column_refs {
        while stmt_idx < ast.statements.len() && !ast.statements[stmt_idx].contains_node(cref.node) {
            stmt_idx += 1;
        }
        cref.statement_id = stmt_idx as u32;
    }
    stmt_idx = 0;
    for table in &mut analyzed.tables {
        while stmt_idx < ast.statements.len() && !ast.statements[stmt_idx].contains_node(table.node) {
            stmt_idx += 1;
        }
        table.statement_id = stmt_idx as u32;
    }
}

fn resolve_scope(
    scope_id: ScopeId,
    analyzed: &mut AnalyzedScript,
    scanned: &mut ScannedScript,
    catalog: &Catalog,
    external_id: EntryId,
) {
    let table_ref_ids = analyzed.scopes[scope_id.index()].table_refs.clone();
    for tref_id in table_ref_ids {
        let name = analyzed.table_refs[tref_id.index()].name;

        let local = analyzed
            .tables_by_name
            .get(&(name.database, name.schema, name.table))
            .copied();

        let database = scanned.names.get(name.database).text();
        let schema = scanned.names.get(name.schema).text();
        let table = scanned.names.get(name.table).text();

        let (resolved, decl_columns): (Option<ResolvedTable>, Vec<(NameId, u32)>) = if let Some(idx) = local {
            let decl = &analyzed.tables[idx];
            let resolved = ResolvedTable {
                database_id: decl.database_id,
                schema_id: decl.schema_id,
                catalog_table_id: decl.catalog_table_id,
            };
            let columns = decl.columns.iter().enumerate().map(|(i, c)| (c.name, i as u32)).collect();
            (Some(resolved), columns)
        } else if let Some(found) = catalog.resolve_table_by_name(database, schema, table, Some(external_id)) {
            let resolved = ResolvedTable {
                database_id: found.database_id,
                schema_id: found.schema_id,
                catalog_table_id: found.id,
            };
            // Column names came from the catalog, possibly never seen in
            // this script's own registry; register them so they can be
            // looked up by id like any other name.
            let columns = found
                .columns
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    let id = scanned
                        .names
                        .lookup_text(c.as_str())
                        .unwrap_or_else(|| scanned.names.register(c.as_str(), Location::default(), NameTags::COLUMN_NAME));
                    (id, i as u32)
                })
                .collect();
            (Some(resolved), columns)
        } else {
            (None, Vec::new())
        };

        let Some(resolved) = resolved else { continue };
        analyzed.table_refs[tref_id.index()].resolved = Some(resolved);

        let tref = &analyzed.table_refs[tref_id.index()];
        let table_alias = tref.alias;

        let scope = &mut analyzed.scopes[scope_id.index()];
        for (col_name, col_idx) in decl_columns {
            scope.alias_columns.insert(
                QualifiedColumnName { table_alias, column: col_name },
                (tref_id, col_idx),
            );
        }
        scope.table_declarations.insert(tref_id, resolved.catalog_table_id);
    }

    let column_ref_ids = analyzed.scopes[scope_id.index()].column_refs.clone();
    for cref_id in column_ref_ids {
        let name = analyzed.column_refs[cref_id.index()].name;
        let mut current = Some(scope_id);
        let mut found = None;
        while let Some(sid) = current {
            let scope = &analyzed.scopes[sid.index()];
            if let Some(&binding) = scope.alias_columns.get(&name) {
                found = Some(binding);
                break;
            }
            current = scope.parent;
        }
        if let Some((tref_id, col_idx)) = found {
            if let Some(resolved_table) = analyzed.table_refs[tref_id.index()].resolved {
                analyzed.column_refs[cref_id.index()].resolved = Some(ResolvedColumn {
                    database_id: resolved_table.database_id,
                    schema_id: resolved_table.schema_id,
                    catalog_table_id: resolved_table.catalog_table_id,
                    column_index: col_idx,
                });
            }
        }
    }

    let children = analyzed.scopes[scope_id.index()].children.clone();
    for child in children {
        resolve_scope(child, analyzed, scanned, catalog, external_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlsight_ast::parse;
    use sqlsight_catalog::Catalog;
    use sqlsight_scanner::scan;

    fn run(sql: &str) -> (ScannedScript, Ast, AnalyzedScript, Catalog) {
        let mut scanned = scan(sql);
        let (ast, errors) = parse(&scanned);
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        let mut catalog = Catalog::new();
        let analyzed = analyze(&mut scanned, &ast, &mut catalog, EntryId::new(0), &NameDefaults::default());
        (scanned, ast, analyzed, catalog)
    }

    /// Runs `sql` through analysis and loads its declarations into `catalog`
    /// under `external_id`, as the engine would between scripts.
    fn declare(catalog: &mut Catalog, sql: &str, external_id: u32, rank: u32) {
        let mut scanned = scan(sql);
        let (ast, errors) = parse(&scanned);
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        let analyzed = analyze(&mut scanned, &ast, catalog, EntryId::new(external_id), &NameDefaults::default());
        let contribution = crate::contribution::script_contribution(&scanned, &analyzed, EntryId::new(external_id), rank);
        catalog.load_script(contribution).unwrap();
    }

    #[test]
    fn create_table_then_select_resolves_bare_column() {
        let mut catalog = Catalog::new();
        declare(&mut catalog, "create table orders (id int, amount int)", 0, 0);

        let mut scanned = scan("select amount from orders");
        let (ast, errors) = parse(&scanned);
        assert!(errors.is_empty());
        let analyzed = analyze(&mut scanned, &ast, &mut catalog, EntryId::new(1), &NameDefaults::default());

        assert_eq!(analyzed.table_refs.len(), 1);
        assert!(analyzed.table_refs[0].resolved.is_some());
        assert_eq!(analyzed.column_refs.len(), 1);
        let resolved = analyzed.column_refs[0].resolved.expect("amount should resolve");
        assert_eq!(resolved.column_index, 0);
    }

    #[test]
    fn join_with_alias_resolves_qualified_column() {
        let mut catalog = Catalog::new();
        declare(&mut catalog, "create table orders (id int, customer_id int)", 0, 0);
        declare(&mut catalog, "create table customers (id int, name text)", 1, 1);

        let mut query = scan("select o.customer_id from orders o join customers c on o.customer_id = c.id");
        let (qast, errors) = parse(&query);
        assert!(errors.is_empty());
        let analyzed = analyze(&mut query, &qast, &mut catalog, EntryId::new(2), &NameDefaults::default());

        assert_eq!(analyzed.table_refs.len(), 2);
        assert!(analyzed.table_refs.iter().all(|t| t.resolved.is_some()));
        assert_eq!(analyzed.column_refs.len(), 3);
        assert!(analyzed.column_refs.iter().all(|c| c.resolved.is_some()));
        assert_eq!(analyzed.edges.len(), 1);
        assert_eq!(analyzed.edges[0].left_cardinality(), 1);
        assert_eq!(analyzed.edges[0].right_cardinality(), 1);
    }

    #[test]
    fn qualifying_with_the_bare_table_name_does_not_resolve_without_an_alias() {
        let mut catalog = Catalog::new();
        declare(&mut catalog, "create table orders (id int, amount int)", 0, 0);

        let mut query = scan("select orders.amount from orders");
        let (qast, errors) = parse(&query);
        assert!(errors.is_empty());
        let analyzed = analyze(&mut query, &qast, &mut catalog, EntryId::new(1), &NameDefaults::default());

        assert_eq!(analyzed.column_refs.len(), 1);
        assert!(analyzed.column_refs[0].resolved.is_none());
    }

    #[test]
    fn bare_column_does_not_resolve_against_an_aliased_table() {
        let mut catalog = Catalog::new();
        declare(&mut catalog, "create table orders (id int, amount int)", 0, 0);

        let mut query = scan("select amount from orders o");
        let (qast, errors) = parse(&query);
        assert!(errors.is_empty());
        let analyzed = analyze(&mut query, &qast, &mut catalog, EntryId::new(1), &NameDefaults::default());

        assert_eq!(analyzed.column_refs.len(), 1);
        assert!(analyzed.column_refs[0].resolved.is_none());
    }

    #[test]
    fn unresolved_column_reference_stays_none() {
        let (_, _, analyzed, _) = run("select missing from t");
        assert_eq!(analyzed.table_refs.len(), 1);
        assert!(analyzed.table_refs[0].resolved.is_none());
        assert_eq!(analyzed.column_refs.len(), 1);
        assert!(analyzed.column_refs[0].resolved.is_none());
    }

    #[test]
    fn create_table_as_select_nests_scopes() {
        let (_, _, analyzed, _) = run("create table derived as select a from t");
        assert_eq!(analyzed.tables.len(), 1);
        // outer declaration scope plus the nested select's own scope
        assert_eq!(analyzed.scopes.len(), 2);
        assert_eq!(analyzed.root_scopes.len(), 1);
        let inner = analyzed.scopes.iter().find(|s| s.id != analyzed.root_scopes[0]).unwrap();
        assert_eq!(inner.parent, Some(analyzed.root_scopes[0]));
    }

    #[test]
    fn comparison_without_columns_on_both_sides_is_not_an_edge() {
        let (_, _, analyzed, _) = run("select a from t where a = 1");
        assert!(analyzed.edges.is_empty());
    }

    #[test]
    fn duplicate_declarations_are_last_inserted_wins() {
        let (_, _, analyzed, _) = run("create table t (a int); create table t (a int, b int)");
        assert_eq!(analyzed.tables.len(), 2);
        let key = analyzed.tables[1].name.table;
        let idx = *analyzed
            .tables_by_name
            .get(&(analyzed.tables[1].name.database, analyzed.tables[1].name.schema, key))
            .unwrap();
        assert_eq!(idx, 1);
    }
}
