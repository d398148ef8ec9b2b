use sqlsight_ast::NodeId;
use sqlsight_catalog::CatalogTableId;
use sqlsight_helpers::{Id, IndexMap};

use crate::qualified::QualifiedColumnName;
use crate::reference::{ColumnRefId, TableRefId};

pub struct ScopeMarker;
pub type ScopeId = Id<ScopeMarker>;

/// An AST sub-tree rooted at a scope-introducing node (select, create-table,
/// create-as). Scopes form a forest; see `AnalyzedScript::root_scopes`.
#[derive(Debug, Clone)]
pub struct NameScope {
    pub id: ScopeId,
    pub root: NodeId,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    pub table_refs: Vec<TableRefId>,
    pub column_refs: Vec<ColumnRefId>,
    /// `(alias-or-empty, column) -> (owning table ref, column index)`,
    /// populated for every resolved table reference during resolution:
    /// aliased tables register their columns under `Some(alias)` only,
    /// unaliased tables under `None` only. A bare, unqualified reference
    /// therefore only ever resolves against an unaliased table (last-
    /// registered wins on ambiguity, matching this scope's other
    /// last-wins tie-breaks); an aliased table is reachable only via its
    /// alias.
    pub alias_columns: IndexMap<QualifiedColumnName, (TableRefId, u32)>,
    pub table_declarations: IndexMap<TableRefId, CatalogTableId>,
}

impl NameScope {
    pub fn new(id: ScopeId, root: NodeId) -> Self {
        Self {
            id,
            root,
            parent: None,
            children: Vec::new(),
            table_refs: Vec::new(),
            column_refs: Vec::new(),
            alias_columns: IndexMap::default(),
            table_declarations: IndexMap::default(),
        }
    }
}
