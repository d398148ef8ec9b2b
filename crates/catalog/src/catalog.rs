use smol_str::SmolStr;
use sqlsight_helpers::{IndexMap, IndexSet, Status};

use crate::contribution::{DescriptorPool, ScriptContribution};
use crate::entry::{CatalogEntry, CatalogTable, EntryKind};
use crate::flatten::{FlatCatalog, FlatColumn, FlatDatabase, FlatSchema, FlatTable};
use crate::ids::{CatalogTableId, DatabaseId, EntryId, SchemaId, DATABASE_ID_START, SCHEMA_ID_START};

/// The cross-script namespace of database/schema/table declarations. Owns
/// stable id allocation and ranked cross-entry table lookup.
#[derive(Debug, Clone)]
pub struct Catalog {
    next_database_id: u32,
    next_schema_id: u32,

    databases: IndexMap<SmolStr, DatabaseId>,
    database_by_id: IndexMap<DatabaseId, SmolStr>,
    database_refcount: IndexMap<DatabaseId, u32>,

    schemas: IndexMap<(DatabaseId, SmolStr), SchemaId>,
    schema_by_id: IndexMap<SchemaId, (DatabaseId, SmolStr)>,
    schema_refcount: IndexMap<SchemaId, u32>,

    entries: IndexMap<EntryId, CatalogEntry>,
    entry_databases: IndexMap<EntryId, Vec<DatabaseId>>,
    entry_schemas: IndexMap<EntryId, Vec<(DatabaseId, SchemaId)>>,
    /// `(database, schema) -> [(rank, entry_id), ...]`, kept sorted.
    schema_index: IndexMap<(DatabaseId, SchemaId), Vec<(u32, EntryId)>>,

    version: u64,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            next_database_id: DATABASE_ID_START,
            next_schema_id: SCHEMA_ID_START,
            databases: IndexMap::default(),
            database_by_id: IndexMap::default(),
            database_refcount: IndexMap::default(),
            schemas: IndexMap::default(),
            schema_by_id: IndexMap::default(),
            schema_refcount: IndexMap::default(),
            entries: IndexMap::default(),
            entry_databases: IndexMap::default(),
            entry_schemas: IndexMap::default(),
            schema_index: IndexMap::default(),
            version: 0,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    fn bump_version(&mut self) {
        self.version += 1;
    }

    pub fn allocate_database_id(&mut self, name: &str) -> DatabaseId {
        if let Some(&id) = self.databases.get(name) {
            return id;
        }
        let id = DatabaseId::new(self.next_database_id);
        self.next_database_id += 1;
        self.databases.insert(SmolStr::new(name), id);
        self.database_by_id.insert(id, SmolStr::new(name));
        id
    }

    pub fn allocate_schema_id(&mut self, database_id: DatabaseId, schema: &str) -> SchemaId {
        let key = (database_id, SmolStr::new(schema));
        if let Some(&id) = self.schemas.get(&key) {
            return id;
        }
        let id = SchemaId::new(self.next_schema_id);
        self.next_schema_id += 1;
        self.schemas.insert(key, id);
        self.schema_by_id.insert(id, (database_id, SmolStr::new(schema)));
        id
    }

    pub fn database_id_by_name(&self, name: &str) -> Option<DatabaseId> {
        self.databases.get(name).copied()
    }

    pub fn schema_id_by_name(&self, database_id: DatabaseId, name: &str) -> Option<SchemaId> {
        self.schemas.get(&(database_id, SmolStr::new(name))).copied()
    }

    pub fn database_name(&self, id: DatabaseId) -> Option<&str> {
        self.database_by_id.get(&id).map(SmolStr::as_str)
    }

    pub fn schema_name(&self, id: SchemaId) -> Option<&str> {
        self.schema_by_id.get(&id).map(|(_, name)| name.as_str())
    }

    /// Every schema declared under `database_id`.
    pub fn schemas_in_database(&self, database_id: DatabaseId) -> Vec<(SchemaId, &str)> {
        self.schema_by_id
            .iter()
            .filter(|(_, (db, _))| *db == database_id)
            .map(|(&id, (_, name))| (id, name.as_str()))
            .collect()
    }

    /// Every table declared in `(database_id, schema_id)` across all
    /// entries, deduplicated by table name (first occurrence in rank order
    /// wins, matching `flatten`'s dedup rule), optionally skipping one
    /// entry (the "don't suggest the script's own half-written declaration"
    /// case completion asks for).
    pub fn tables_in_schema(
        &self,
        database_id: DatabaseId,
        schema_id: SchemaId,
        ignore_entry: Option<EntryId>,
    ) -> Vec<&CatalogTable> {
        let Some(rows) = self.schema_index.get(&(database_id, schema_id)) else {
            return Vec::new();
        };
        let mut seen: IndexSet<&str> = IndexSet::default();
        let mut tables = Vec::new();
        for (_, entry_id) in rows {
            if Some(*entry_id) == ignore_entry {
                continue;
            }
            let Some(entry) = self.entries.get(entry_id) else { continue };
            for table in &entry.tables {
                if table.database_id == database_id
                    && table.schema_id == schema_id
                    && seen.insert(table.table.as_str())
                {
                    tables.push(table);
                }
            }
        }
        tables
    }

    fn validate_ids(&self, contribution: &ScriptContribution) -> Result<(), Status> {
        for (db_id, name) in &contribution.databases {
            if let Some(&existing) = self.databases.get(name.as_str()) {
                if existing != *db_id {
                    return Err(Status::CatalogIdOutOfSync);
                }
            }
        }
        for (db_id, schema_id, _db_name, schema_name) in &contribution.schemas {
            if let Some(&existing) = self.schemas.get(&(*db_id, schema_name.clone())) {
                if existing != *schema_id {
                    return Err(Status::CatalogIdOutOfSync);
                }
            }
        }
        Ok(())
    }

    fn release_database(&mut self, id: DatabaseId) {
        let count = self.database_refcount.entry(id).or_insert(0);
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.database_refcount.shift_remove(&id);
            if let Some(name) = self.database_by_id.shift_remove(&id) {
                self.databases.shift_remove(&name);
            }
        }
    }

    fn release_schema(&mut self, id: SchemaId) {
        let count = self.schema_refcount.entry(id).or_insert(0);
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.schema_refcount.shift_remove(&id);
            if let Some(key) = self.schema_by_id.shift_remove(&id) {
                self.schemas.shift_remove(&key);
            }
        }
    }

    fn load_entry(&mut self, contribution: ScriptContribution, kind: EntryKind) -> Result<(), Status> {
        if let Some(existing) = self.entries.get(&contribution.external_id) {
            if existing.kind != kind {
                return Err(Status::ExternalIdCollision);
            }
        }
        self.validate_ids(&contribution)?;

        for (db_id, name) in &contribution.databases {
            self.databases.entry(name.clone()).or_insert(*db_id);
            self.database_by_id.entry(*db_id).or_insert_with(|| name.clone());
        }
        for (db_id, schema_id, _db_name, schema_name) in &contribution.schemas {
            self.schemas.entry((*db_id, schema_name.clone())).or_insert(*schema_id);
            self.schema_by_id
                .entry(*schema_id)
                .or_insert_with(|| (*db_id, schema_name.clone()));
        }

        let previous_databases = self
            .entry_databases
            .shift_remove(&contribution.external_id)
            .unwrap_or_default();
        let previous_schemas = self
            .entry_schemas
            .shift_remove(&contribution.external_id)
            .unwrap_or_default();

        let new_databases: Vec<DatabaseId> = contribution.databases.iter().map(|(id, _)| *id).collect();
        let new_schemas: Vec<(DatabaseId, SchemaId)> =
            contribution.schemas.iter().map(|(d, s, _, _)| (*d, *s)).collect();

        for db in &previous_databases {
            if !new_databases.contains(db) {
                self.release_database(*db);
            }
        }
        for db in &new_databases {
            if !previous_databases.contains(db) {
                *self.database_refcount.entry(*db).or_insert(0) += 1;
            }
        }
        for schema in &previous_schemas {
            if !new_schemas.contains(schema) {
                self.release_schema(schema.1);
            }
        }
        for schema in &new_schemas {
            if !previous_schemas.contains(schema) {
                *self.schema_refcount.entry(schema.1).or_insert(0) += 1;
            }
        }
        self.entry_databases.insert(contribution.external_id, new_databases);
        self.entry_schemas.insert(contribution.external_id, new_schemas);

        for rows in self.schema_index.values_mut() {
            rows.retain(|(_, id)| *id != contribution.external_id);
        }
        let mut table_schema_keys: IndexSet<(DatabaseId, SchemaId)> = IndexSet::default();
        for table in &contribution.tables {
            table_schema_keys.insert((table.database_id, table.schema_id));
        }
        for key in table_schema_keys {
            let rows = self.schema_index.entry(key).or_default();
            rows.push((contribution.rank, contribution.external_id));
            rows.sort_by_key(|(rank, id)| (*rank, id.get()));
        }

        let entry = self
            .entries
            .entry(contribution.external_id)
            .or_insert_with(|| CatalogEntry::new(contribution.external_id, contribution.rank, kind));
        entry.rank = contribution.rank;
        entry.set_tables(contribution.tables);

        self.bump_version();
        Ok(())
    }

    /// Loads (or re-loads, diffing against the previous version) a script's
    /// declarations. Loading and updating are the same operation here,
    /// distinguished only by whether an entry with this external id
    /// already existed.
    pub fn load_script(&mut self, contribution: ScriptContribution) -> Result<(), Status> {
        self.load_entry(contribution, EntryKind::Script)
    }

    pub fn load_descriptor_pool(&mut self, descriptor: DescriptorPool) -> Result<EntryId, Status> {
        if descriptor.tables.is_empty() {
            return Err(Status::CatalogDescriptorTablesNull);
        }
        let mut seen = IndexSet::default();
        for table in &descriptor.tables {
            if table.name.is_empty() {
                return Err(Status::CatalogDescriptorTableNameEmpty);
            }
            if !seen.insert(table.name.clone()) {
                return Err(Status::CatalogDescriptorTableNameCollision);
            }
        }

        let database_id = self.allocate_database_id(&descriptor.database);
        let schema_id = self.allocate_schema_id(database_id, &descriptor.schema);
        let tables: Vec<CatalogTable> = descriptor
            .tables
            .iter()
            .enumerate()
            .map(|(local_index, table)| {
                let mut columns = table.columns.clone();
                columns.sort();
                CatalogTable {
                    id: CatalogTableId {
                        entry_id: descriptor.external_id,
                        local_index: local_index as u32,
                    },
                    database_id,
                    schema_id,
                    database: descriptor.database.clone(),
                    schema: descriptor.schema.clone(),
                    table: table.name.clone(),
                    columns,
                }
            })
            .collect();

        let external_id = descriptor.external_id;
        let contribution = ScriptContribution {
            external_id,
            rank: descriptor.rank,
            databases: vec![(database_id, descriptor.database.clone())],
            schemas: vec![(
                database_id,
                schema_id,
                descriptor.database.clone(),
                descriptor.schema.clone(),
            )],
            tables,
        };
        self.load_entry(contribution, EntryKind::DescriptorPool)?;
        Ok(external_id)
    }

    pub fn drop_script(&mut self, external_id: EntryId) {
        if self.entries.shift_remove(&external_id).is_none() {
            return;
        }
        let databases = self.entry_databases.shift_remove(&external_id).unwrap_or_default();
        let schemas = self.entry_schemas.shift_remove(&external_id).unwrap_or_default();
        for db in databases {
            self.release_database(db);
        }
        for schema in schemas {
            self.release_schema(schema.1);
        }
        for rows in self.schema_index.values_mut() {
            rows.retain(|(_, id)| *id != external_id);
        }
        self.bump_version();
    }

    pub fn resolve_table_by_name(
        &self,
        database: &str,
        schema: &str,
        table: &str,
        ignore_entry: Option<EntryId>,
    ) -> Option<&CatalogTable> {
        let db_id = *self.databases.get(database)?;
        let schema_id = *self.schemas.get(&(db_id, SmolStr::new(schema)))?;
        let rows = self.schema_index.get(&(db_id, schema_id))?;
        for (_, entry_id) in rows {
            if Some(*entry_id) == ignore_entry {
                continue;
            }
            if let Some(entry) = self.entries.get(entry_id) {
                if let Some(found) = entry.resolve_local(database, schema, table) {
                    return Some(found);
                }
            }
        }
        None
    }

    pub fn resolve_table_by_id(&self, id: CatalogTableId) -> Option<&CatalogTable> {
        self.entries.get(&id.entry_id)?.table(id)
    }

    pub fn entry(&self, id: EntryId) -> Option<&CatalogEntry> {
        self.entries.get(&id)
    }

    /// Every loaded entry (script or descriptor pool), ordered by rank then
    /// external id so callers that merge results across entries get a
    /// deterministic, reproducible order without re-sorting themselves.
    pub fn entries_by_rank(&self) -> Vec<&CatalogEntry> {
        let mut entries: Vec<&CatalogEntry> = self.entries.values().collect();
        entries.sort_by_key(|e| (e.rank, e.external_id));
        entries
    }

    pub fn flatten(&self) -> FlatCatalog {
        let mut names: Vec<SmolStr> = Vec::new();
        let mut name_index: IndexMap<SmolStr, u32> = IndexMap::default();

        let mut flat_databases = Vec::new();
        let mut flat_schemas = Vec::new();
        let mut flat_tables = Vec::new();
        let mut flat_columns = Vec::new();

        let mut databases_sorted: Vec<(SmolStr, DatabaseId)> =
            self.databases.iter().map(|(n, &id)| (n.clone(), id)).collect();
        databases_sorted.sort_by_key(|(_, id)| id.get());

        for (db_name, db_id) in databases_sorted {
            let db_name_idx = intern(&db_name, &mut names, &mut name_index);
            let database_idx = flat_databases.len() as u32;
            flat_databases.push(FlatDatabase { name_index: db_name_idx });

            let mut schemas_sorted: Vec<(SmolStr, SchemaId)> = self
                .schemas
                .iter()
                .filter(|((d, _), _)| *d == db_id)
                .map(|((_, n), &id)| (n.clone(), id))
                .collect();
            schemas_sorted.sort_by_key(|(_, id)| id.get());

            for (schema_name, schema_id) in schemas_sorted {
                let schema_name_idx = intern(&schema_name, &mut names, &mut name_index);
                let schema_idx = flat_schemas.len() as u32;
                flat_schemas.push(FlatSchema {
                    name_index: schema_name_idx,
                    flat_parent_idx: database_idx,
                });

                let mut seen_tables: IndexSet<SmolStr> = IndexSet::default();
                let mut tables_in_schema: Vec<(SmolStr, &CatalogTable)> = Vec::new();
                if let Some(rows) = self.schema_index.get(&(db_id, schema_id)) {
                    for (_, entry_id) in rows {
                        let Some(entry) = self.entries.get(entry_id) else { continue };
                        for table in &entry.tables {
                            if table.database_id != db_id || table.schema_id != schema_id {
                                continue;
                            }
                            if !seen_tables.insert(table.table.clone()) {
                                continue;
                            }
                            tables_in_schema.push((table.table.clone(), table));
                        }
                    }
                }
                tables_in_schema.sort_by(|(a, _), (b, _)| a.cmp(b));

                for (table_name, table) in tables_in_schema {
                    let table_name_idx = intern(&table_name, &mut names, &mut name_index);
                    let table_idx = flat_tables.len() as u32;
                    flat_tables.push(FlatTable {
                        name_index: table_name_idx,
                        flat_parent_idx: schema_idx,
                    });
                    for column in &table.columns {
                        let column_name_idx = intern(column, &mut names, &mut name_index);
                        flat_columns.push(FlatColumn {
                            name_index: column_name_idx,
                            flat_parent_idx: table_idx,
                        });
                    }
                }
            }
        }

        FlatCatalog {
            names,
            databases: flat_databases,
            schemas: flat_schemas,
            tables: flat_tables,
            columns: flat_columns,
        }
    }
}

fn intern(text: &SmolStr, names: &mut Vec<SmolStr>, index: &mut IndexMap<SmolStr, u32>) -> u32 {
    if let Some(&i) = index.get(text) {
        return i;
    }
    let i = names.len() as u32;
    names.push(text.clone());
    index.insert(text.clone(), i);
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contribution::DescriptorTable;

    fn table(db: DatabaseId, schema: SchemaId, name: &str, columns: &[&str]) -> CatalogTable {
        CatalogTable {
            id: CatalogTableId {
                entry_id: EntryId::new(0),
                local_index: 0,
            },
            database_id: db,
            schema_id: schema,
            database: SmolStr::new("d"),
            schema: SmolStr::new("s"),
            table: SmolStr::new(name),
            columns: columns.iter().map(|c| SmolStr::new(*c)).collect(),
        }
    }

    #[test]
    fn allocates_stable_monotonic_ids() {
        let mut cat = Catalog::new();
        let a = cat.allocate_database_id("d1");
        let b = cat.allocate_database_id("d2");
        let a_again = cat.allocate_database_id("d1");
        assert_eq!(a, a_again);
        assert!(b.get() > a.get());
        assert!(a.get() >= DATABASE_ID_START);
    }

    #[test]
    fn load_script_then_resolve_across_entries() {
        let mut cat = Catalog::new();
        let db = cat.allocate_database_id("d");
        let schema = cat.allocate_schema_id(db, "s");

        cat.load_script(ScriptContribution {
            external_id: EntryId::new(1),
            rank: 0,
            databases: vec![(db, SmolStr::new("d"))],
            schemas: vec![(db, schema, SmolStr::new("d"), SmolStr::new("s"))],
            tables: vec![table(db, schema, "t1", &["a", "b"])],
        })
        .unwrap();

        let found = cat.resolve_table_by_name("d", "s", "t1", None).unwrap();
        assert_eq!(found.columns.len(), 2);
        assert!(cat.resolve_table_by_name("d", "s", "t1", Some(EntryId::new(1))).is_none());
    }

    #[test]
    fn id_mismatch_is_rejected_without_side_effects() {
        let mut cat = Catalog::new();
        let db = cat.allocate_database_id("d");
        let schema = cat.allocate_schema_id(db, "s");
        let bogus_db = DatabaseId::new(db.get() + 1000);

        let result = cat.load_script(ScriptContribution {
            external_id: EntryId::new(1),
            rank: 0,
            databases: vec![(bogus_db, SmolStr::new("d"))],
            schemas: vec![(db, schema, SmolStr::new("d"), SmolStr::new("s"))],
            tables: vec![],
        });
        assert_eq!(result, Err(Status::CatalogIdOutOfSync));
        assert_eq!(cat.version(), 0);
    }

    #[test]
    fn drop_script_releases_unreferenced_declarations() {
        let mut cat = Catalog::new();
        let db = cat.allocate_database_id("d");
        let schema = cat.allocate_schema_id(db, "s");
        cat.load_script(ScriptContribution {
            external_id: EntryId::new(1),
            rank: 0,
            databases: vec![(db, SmolStr::new("d"))],
            schemas: vec![(db, schema, SmolStr::new("d"), SmolStr::new("s"))],
            tables: vec![table(db, schema, "t1", &["a"])],
        })
        .unwrap();

        cat.drop_script(EntryId::new(1));
        assert!(cat.resolve_table_by_name("d", "s", "t1", None).is_none());
        // re-allocating gets a fresh id; the old one is never reused.
        let new_db = cat.allocate_database_id("d");
        assert!(new_db.get() > db.get());
    }

    #[test]
    fn flatten_dedups_first_seen_wins_in_rank_order() {
        let mut cat = Catalog::new();
        let db = cat.allocate_database_id("d");
        let schema = cat.allocate_schema_id(db, "s");
        cat.load_script(ScriptContribution {
            external_id: EntryId::new(1),
            rank: 0,
            databases: vec![(db, SmolStr::new("d"))],
            schemas: vec![(db, schema, SmolStr::new("d"), SmolStr::new("s"))],
            tables: vec![table(db, schema, "t1", &["a"])],
        })
        .unwrap();
        cat.load_script(ScriptContribution {
            external_id: EntryId::new(2),
            rank: 1,
            databases: vec![(db, SmolStr::new("d"))],
            schemas: vec![(db, schema, SmolStr::new("d"), SmolStr::new("s"))],
            tables: vec![table(db, schema, "t1", &["a", "b", "c"])],
        })
        .unwrap();

        let flat = cat.flatten();
        assert_eq!(flat.tables.len(), 1);
        let columns: Vec<_> = flat.columns.iter().filter(|c| c.flat_parent_idx == 0).collect();
        assert_eq!(columns.len(), 1);
    }

    #[test]
    fn flatten_cross_script_unification_shares_one_schema() {
        let mut cat = Catalog::new();
        let db = cat.allocate_database_id("d");
        let schema = cat.allocate_schema_id(db, "s");
        cat.load_script(ScriptContribution {
            external_id: EntryId::new(1),
            rank: 1,
            databases: vec![(db, SmolStr::new("d"))],
            schemas: vec![(db, schema, SmolStr::new("d"), SmolStr::new("s"))],
            tables: vec![table(db, schema, "foo", &["a"])],
        })
        .unwrap();
        cat.load_script(ScriptContribution {
            external_id: EntryId::new(2),
            rank: 2,
            databases: vec![(db, SmolStr::new("d"))],
            schemas: vec![(db, schema, SmolStr::new("d"), SmolStr::new("s"))],
            tables: vec![table(db, schema, "bar", &["a"])],
        })
        .unwrap();

        let flat = cat.flatten();
        assert_eq!(flat.databases.len(), 1);
        assert_eq!(flat.schemas.len(), 1);
        assert_eq!(flat.tables.len(), 2);
        assert!(flat.tables.iter().all(|t| t.flat_parent_idx == 0));

        let names: Vec<&str> = flat.tables.iter().map(|t| flat.names[t.name_index as usize].as_str()).collect();
        assert_eq!(names, vec!["bar", "foo"]);
    }

    #[test]
    fn descriptor_pool_rejects_duplicate_table_names() {
        let mut cat = Catalog::new();
        let result = cat.load_descriptor_pool(DescriptorPool {
            external_id: EntryId::new(100),
            rank: 0,
            database: SmolStr::new("d"),
            schema: SmolStr::new("s"),
            tables: vec![
                DescriptorTable { name: SmolStr::new("t"), columns: vec![] },
                DescriptorTable { name: SmolStr::new("t"), columns: vec![] },
            ],
        });
        assert_eq!(result, Err(Status::CatalogDescriptorTableNameCollision));
    }
}
