use sqlsight_ast::NodeId;
use sqlsight_catalog::{CatalogTableId, DatabaseId, SchemaId};
use sqlsight_scanner::NameId;

use crate::qualified::QualifiedTableName;

/// A declared column, indexed positionally once its owning declaration's
/// columns are sorted.
#[derive(Debug, Clone, Copy)]
pub struct TableColumn {
    pub name: NameId,
    pub node: Option<NodeId>,
}

/// A `CREATE TABLE` declaration, fully stamped with catalog ids.
#[derive(Debug, Clone)]
pub struct TableDeclaration {
    pub catalog_table_id: CatalogTableId,
    pub database_id: DatabaseId,
    pub schema_id: SchemaId,
    pub name: QualifiedTableName,
    /// Sorted lexicographically by name; position is the column index.
    pub columns: Vec<TableColumn>,
    pub node: NodeId,
    pub statement_id: u32,
    pub scope_root: NodeId,
}

impl TableDeclaration {
    pub fn column_index(&self, column: NameId) -> Option<u32> {
        self.columns
            .iter()
            .position(|c| c.name == column)
            .map(|idx| idx as u32)
    }
}
