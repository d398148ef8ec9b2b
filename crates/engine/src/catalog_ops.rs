//! Thin packed-bytes wrapper around `sqlsight_catalog::Catalog`'s own API,
//! matching the external catalog surface: status codes and wire snapshots
//! at the boundary, the catalog's native types everywhere else.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use sqlsight_catalog::{Catalog, DescriptorPool, EntryId, EntryKind, FlatCatalog, ScriptContribution};
use sqlsight_helpers::Status;

use crate::packed::PackedBytes;

pub fn load_script(catalog: &mut Catalog, contribution: ScriptContribution) -> Status {
    match catalog.load_script(contribution) {
        Ok(()) => Status::Ok,
        Err(status) => status,
    }
}

pub fn add_descriptor_pool(catalog: &mut Catalog, descriptor: DescriptorPool) -> (Status, Option<EntryId>) {
    match catalog.load_descriptor_pool(descriptor) {
        Ok(id) => (Status::Ok, Some(id)),
        Err(status) => (status, None),
    }
}

pub fn drop_script(catalog: &mut Catalog, external_id: EntryId) {
    catalog.drop_script(external_id);
}

/// A wire-shaped summary of the catalog's entries, for `describe_entries`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntrySummary {
    pub external_id: SmolStr,
    pub rank: u32,
    pub kind: EntrySummaryKind,
    pub table_count: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum EntrySummaryKind {
    Script,
    DescriptorPool,
}

impl From<EntryKind> for EntrySummaryKind {
    fn from(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Script => EntrySummaryKind::Script,
            EntryKind::DescriptorPool => EntrySummaryKind::DescriptorPool,
        }
    }
}

pub fn describe_entries(catalog: &Catalog) -> PackedBytes {
    let summaries: Vec<EntrySummary> = catalog
        .entries_by_rank()
        .into_iter()
        .map(|entry| EntrySummary {
            external_id: SmolStr::new(format!("{}", entry.external_id.get())),
            rank: entry.rank,
            kind: entry.kind.into(),
            table_count: entry.tables.len() as u32,
        })
        .collect();
    PackedBytes::ok(&summaries)
}

pub fn flatten(catalog: &Catalog) -> FlatCatalog {
    catalog.flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_entries_packs_a_summary_per_entry() {
        let catalog = Catalog::new();
        let packed = describe_entries(&catalog);
        assert!(packed.status.is_ok());
        let entries: Vec<EntrySummary> = packed.decode().unwrap();
        assert!(entries.is_empty());
    }
}
