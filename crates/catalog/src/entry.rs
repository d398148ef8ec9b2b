use smol_str::SmolStr;
use sqlsight_helpers::IndexMap;

use crate::ids::{CatalogTableId, DatabaseId, EntryId, SchemaId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntryKind {
    Script,
    DescriptorPool,
}

/// A table declared by a catalog entry, after id allocation.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CatalogTable {
    pub id: CatalogTableId,
    pub database_id: DatabaseId,
    pub schema_id: SchemaId,
    pub database: SmolStr,
    pub schema: SmolStr,
    pub table: SmolStr,
    /// Sorted lexicographically by name.
    pub columns: Vec<SmolStr>,
}

impl CatalogTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.as_str() == name)
    }
}

/// One script's (or descriptor pool's) contribution to the catalog:
/// everything it owns, keyed by its caller-assigned external id.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub external_id: EntryId,
    pub rank: u32,
    pub kind: EntryKind,
    pub tables: Vec<CatalogTable>,
    /// Last-inserted-wins within the entry, per the name-resolution tie-break.
    pub(crate) tables_by_name: IndexMap<(SmolStr, SmolStr, SmolStr), usize>,
}

impl CatalogEntry {
    pub fn new(external_id: EntryId, rank: u32, kind: EntryKind) -> Self {
        Self {
            external_id,
            rank,
            kind,
            tables: Vec::new(),
            tables_by_name: IndexMap::default(),
        }
    }

    pub fn resolve_local(&self, database: &str, schema: &str, table: &str) -> Option<&CatalogTable> {
        let key = (SmolStr::new(database), SmolStr::new(schema), SmolStr::new(table));
        self.tables_by_name.get(&key).map(|&idx| &self.tables[idx])
    }

    pub fn table(&self, id: CatalogTableId) -> Option<&CatalogTable> {
        if id.entry_id != self.external_id {
            return None;
        }
        self.tables.get(id.local_index as usize)
    }

    /// Replaces this entry's tables, rebuilding the by-name index
    /// (last-inserted-wins).
    pub(crate) fn set_tables(&mut self, tables: Vec<CatalogTable>) {
        self.tables_by_name.clear();
        for (idx, table) in tables.iter().enumerate() {
            self.tables_by_name.insert(
                (table.database.clone(), table.schema.clone(), table.table.clone()),
                idx,
            );
        }
        self.tables = tables;
    }
}
