use smol_str::SmolStr;
use sqlsight_catalog::{CatalogTable, DatabaseId, EntryId, SchemaId, ScriptContribution};
use sqlsight_scanner::ScannedScript;

use crate::analyze::AnalyzedScript;

/// Builds what a script hands to `Catalog::load_script`: the databases and
/// schemas its declarations reference, plus the declared tables themselves,
/// translated from analyzer ids to the catalog's own `SmolStr` names.
pub fn script_contribution(
    scanned: &ScannedScript,
    analyzed: &AnalyzedScript,
    external_id: EntryId,
    rank: u32,
) -> ScriptContribution {
    let mut databases: Vec<(DatabaseId, SmolStr)> = Vec::new();
    let mut schemas: Vec<(DatabaseId, SchemaId, SmolStr, SmolStr)> = Vec::new();
    let mut tables = Vec::with_capacity(analyzed.tables.len());

    for decl in &analyzed.tables {
        let database_name = SmolStr::new(scanned.names.get(decl.name.database).text());
        let schema_name = SmolStr::new(scanned.names.get(decl.name.schema).text());
        let table_name = SmolStr::new(scanned.names.get(decl.name.table).text());

        if !databases.iter().any(|(id, _)| *id == decl.database_id) {
            databases.push((decl.database_id, database_name.clone()));
        }
        if !schemas
            .iter()
            .any(|(db, sc, _, _)| *db == decl.database_id && *sc == decl.schema_id)
        {
            schemas.push((decl.database_id, decl.schema_id, database_name.clone(), schema_name.clone()));
        }

        let columns = decl
            .columns
            .iter()
            .map(|c| SmolStr::new(scanned.names.get(c.name).text()))
            .collect();

        tables.push(CatalogTable {
            id: decl.catalog_table_id,
            database_id: decl.database_id,
            schema_id: decl.schema_id,
            database: database_name,
            schema: schema_name,
            table: table_name,
            columns,
        });
    }

    ScriptContribution {
        external_id,
        rank,
        databases,
        schemas,
        tables,
    }
}
