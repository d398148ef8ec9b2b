use smol_str::SmolStr;

use crate::entry::CatalogTable;
use crate::ids::{DatabaseId, EntryId, SchemaId};

/// What an analyzed script (or a loaded descriptor pool) contributes to the
/// catalog: the databases/schemas it references (for id reconciliation) and
/// the tables it declares.
#[derive(Debug, Clone)]
pub struct ScriptContribution {
    pub external_id: EntryId,
    pub rank: u32,
    pub databases: Vec<(DatabaseId, SmolStr)>,
    pub schemas: Vec<(DatabaseId, SchemaId, SmolStr, SmolStr)>,
    pub tables: Vec<CatalogTable>,
}

/// A flat schema descriptor supplied by an embedder, loaded the same way a
/// script's declarations are.
#[derive(Debug, Clone)]
pub struct DescriptorPool {
    pub external_id: EntryId,
    pub rank: u32,
    pub database: SmolStr,
    pub schema: SmolStr,
    pub tables: Vec<DescriptorTable>,
}

#[derive(Debug, Clone)]
pub struct DescriptorTable {
    pub name: SmolStr,
    pub columns: Vec<SmolStr>,
}
