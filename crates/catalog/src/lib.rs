//! Cross-script database/schema/table namespace: stable id allocation,
//! ranked cross-entry table resolution, and the flattened external snapshot.

mod catalog;
mod contribution;
mod entry;
mod flatten;
mod ids;

pub use catalog::Catalog;
pub use contribution::{DescriptorPool, DescriptorTable, ScriptContribution};
pub use entry::{CatalogEntry, CatalogTable, EntryKind};
pub use flatten::{FlatCatalog, FlatColumn, FlatDatabase, FlatSchema, FlatTable};
pub use ids::{CatalogTableId, DatabaseId, EntryId, SchemaId, DATABASE_ID_START, SCHEMA_ID_START};
