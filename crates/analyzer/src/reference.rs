use sqlsight_ast::NodeId;
use sqlsight_catalog::{CatalogTableId, DatabaseId, SchemaId};
use sqlsight_helpers::Id;
use sqlsight_scanner::NameId;

use crate::qualified::{QualifiedColumnName, QualifiedTableName};

pub struct TableRefMarker;
pub type TableRefId = Id<TableRefMarker>;

pub struct ColumnRefMarker;
pub type ColumnRefId = Id<ColumnRefMarker>;

#[derive(Debug, Clone, Copy)]
pub struct ResolvedTable {
    pub database_id: DatabaseId,
    pub schema_id: SchemaId,
    pub catalog_table_id: CatalogTableId,
}

/// A `FROM`/`JOIN` table reference, resolved or not.
#[derive(Debug, Clone)]
pub struct TableReference {
    pub id: TableRefId,
    pub name: QualifiedTableName,
    pub alias: Option<NameId>,
    pub node: NodeId,
    pub statement_id: u32,
    pub scope_root: NodeId,
    pub resolved: Option<ResolvedTable>,
}

impl TableReference {
    /// The qualifier a column reference must use to reach this table:
    /// its alias if it has one, otherwise its own table name.
    pub fn effective_qualifier(&self) -> NameId {
        self.alias.unwrap_or(self.name.table)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResolvedColumn {
    pub database_id: DatabaseId,
    pub schema_id: SchemaId,
    pub catalog_table_id: CatalogTableId,
    pub column_index: u32,
}

/// A column reference inside an expression, resolved or not.
#[derive(Debug, Clone)]
pub struct ColumnReference {
    pub id: ColumnRefId,
    pub name: QualifiedColumnName,
    pub node: NodeId,
    pub statement_id: u32,
    pub scope_root: NodeId,
    pub resolved: Option<ResolvedColumn>,
}
