use sqlsight_ast::NodeId;
use sqlsight_scanner::NameId;

/// `(database, schema, table)`, with database/schema always filled from
/// defaults by the time a `QualifiedTableName` exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualifiedTableName {
    pub database: NameId,
    pub schema: NameId,
    pub table: NameId,
    pub node: NodeId,
}

/// `(alias-or-empty, column)`. `table_alias` holds the alias text for a
/// dotted column reference (`alias.column`) and is `None` for a bare
/// column reference — a table's own name is never a valid qualifier for
/// one of its columns unless that table also has a matching alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QualifiedColumnName {
    pub table_alias: Option<NameId>,
    pub column: NameId,
}
