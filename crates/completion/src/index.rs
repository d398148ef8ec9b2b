//! Catalog- and script-wide name search: every name the current script has
//! registered, plus every table/column the catalog knows about, merged
//! into one sorted index and matched against an in-progress prefix.
//!
//! A single sorted `(text, tags, objects)` vector is the index — no
//! separate fuzzy/substring structure — per the decision to keep
//! completion lookup to one authoritative structure. Built fresh per
//! query: nothing this crate does needs the index to outlive the call
//! that built it.

use smol_str::SmolStr;
use sqlsight_catalog::Catalog;
use sqlsight_helpers::{ChunkedVec, IndexMap};
use sqlsight_scanner::{NameTags, ScannedScript};

use crate::candidate::{Candidate, CandidateObject};
use crate::score::{self, Strategy};

const RELEVANT_TAGS: NameTags = NameTags::TABLE_NAME
    .union(NameTags::COLUMN_NAME)
    .union(NameTags::TABLE_ALIAS)
    .union(NameTags::SCHEMA_NAME)
    .union(NameTags::DATABASE_NAME);

struct IndexEntry {
    text: SmolStr,
    lower: SmolStr,
    tags: NameTags,
    objects: Vec<CandidateObject>,
}

impl IndexEntry {
    fn to_candidate(&self, strategy: Strategy, bonus: u32) -> Candidate {
        let mut candidate = Candidate::new(self.text.as_str(), self.tags, score::base_score(strategy, self.tags) + bonus);
        candidate.objects = self.objects.clone();
        candidate
    }
}

/// The merged script-name/catalog-table/catalog-column index, sorted by
/// lower-cased text so prefix bounds can be found by binary search.
pub struct NameIndex {
    entries: ChunkedVec<IndexEntry>,
}

impl NameIndex {
    pub fn build(scanned: &ScannedScript, catalog: &Catalog) -> Self {
        let mut merged: IndexMap<SmolStr, IndexEntry> = IndexMap::default();

        for name in scanned.names.iter() {
            let tags = name.tags();
            if tags.intersects(RELEVANT_TAGS) {
                merge_in(&mut merged, name.text(), tags, None);
            }
        }
        for entry in catalog.entries_by_rank() {
            for table in &entry.tables {
                merge_in(&mut merged, table.table.as_str(), NameTags::TABLE_NAME, Some(CandidateObject::Table(table.id)));
                for (index, column) in table.columns.iter().enumerate() {
                    merge_in(
                        &mut merged,
                        column.as_str(),
                        NameTags::COLUMN_NAME,
                        Some(CandidateObject::Column(table.id, index as u32)),
                    );
                }
            }
        }

        let mut sorted: Vec<IndexEntry> = merged.into_values().collect();
        sorted.sort_by(|a, b| a.lower.cmp(&b.lower));
        let mut entries = ChunkedVec::new();
        for entry in sorted {
            entries.push(entry);
        }
        Self { entries }
    }

    /// Candidates matching `needle`: a prefix range found by binary search
    /// over the sorted index, plus a substring fallback over the rest (a
    /// lexicographic sort doesn't bound substring matches, so that part is
    /// a linear scan regardless of the storage shape).
    pub fn search(&self, strategy: Strategy, needle: &str) -> Vec<Candidate> {
        let needle_lower = needle.to_ascii_lowercase();
        let mut out = Vec::new();

        if needle_lower.is_empty() {
            for i in 0..self.entries.len() {
                out.push(self.entries[i].to_candidate(strategy, score::SUBSTRING_BONUS));
            }
            return out;
        }

        let start = self
            .entries
            .partition_point_by_chunk(|entry| entry.lower.as_str() < needle_lower.as_str());
        let mut end = start;
        while let Some(entry) = self.entries.get(end) {
            if !entry.lower.starts_with(&needle_lower) {
                break;
            }
            out.push(entry.to_candidate(strategy, score::PREFIX_BONUS));
            end += 1;
        }
        for i in 0..self.entries.len() {
            if i >= start && i < end {
                continue;
            }
            let entry = &self.entries[i];
            if entry.lower.contains(&needle_lower) {
                out.push(entry.to_candidate(strategy, score::SUBSTRING_BONUS));
            }
        }
        out
    }
}

fn merge_in(merged: &mut IndexMap<SmolStr, IndexEntry>, text: &str, tags: NameTags, object: Option<CandidateObject>) {
    match merged.get_mut(text) {
        Some(existing) => {
            existing.tags.insert(tags);
            if let Some(object) = object {
                if !existing.objects.contains(&object) {
                    existing.objects.push(object);
                }
            }
        }
        None => {
            merged.insert(
                SmolStr::new(text),
                IndexEntry {
                    text: SmolStr::new(text),
                    lower: SmolStr::new(text.to_ascii_lowercase()),
                    tags,
                    objects: object.into_iter().collect(),
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlsight_catalog::{CatalogTable, CatalogTableId, EntryId, ScriptContribution};
    use sqlsight_scanner::scan;

    fn build_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        let db = catalog.allocate_database_id("d");
        let schema = catalog.allocate_schema_id(db, "s");
        let entry_id = EntryId::new(1);
        catalog
            .load_script(ScriptContribution {
                external_id: entry_id,
                rank: 0,
                databases: vec![(db, SmolStr::new("d"))],
                schemas: vec![(db, schema, SmolStr::new("d"), SmolStr::new("s"))],
                tables: vec![CatalogTable {
                    id: CatalogTableId { entry_id, local_index: 0 },
                    database_id: db,
                    schema_id: schema,
                    database: SmolStr::new("d"),
                    schema: SmolStr::new("s"),
                    table: SmolStr::new("orders"),
                    columns: vec![SmolStr::new("id"), SmolStr::new("amount")],
                }],
            })
            .unwrap();
        catalog
    }

    #[test]
    fn prefix_search_finds_catalog_table() {
        let scanned = scan("select 1");
        let catalog = build_catalog();
        let index = NameIndex::build(&scanned, &catalog);
        let hits = index.search(Strategy::TableRef, "ord");
        assert!(hits.iter().any(|c| c.text.as_str() == "orders"));
    }

    #[test]
    fn substring_search_finds_column_not_matching_prefix() {
        let scanned = scan("select 1");
        let catalog = build_catalog();
        let index = NameIndex::build(&scanned, &catalog);
        let hits = index.search(Strategy::ColumnRef, "moun");
        assert!(hits.iter().any(|c| c.text.as_str() == "amount"));
    }

    #[test]
    fn script_names_are_included_and_deduped_with_catalog_entries() {
        let scanned = scan("select id from orders");
        let catalog = build_catalog();
        let index = NameIndex::build(&scanned, &catalog);
        let hits = index.search(Strategy::Default, "orders");
        let orders_hits: Vec<_> = hits.iter().filter(|c| c.text.as_str() == "orders").collect();
        assert_eq!(orders_hits.len(), 1);
        assert!(orders_hits[0].tags.contains(NameTags::TABLE_NAME));
    }
}
