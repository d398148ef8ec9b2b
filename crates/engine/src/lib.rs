//! Single-script pipeline orchestration over the scanner, parser,
//! analyzer and completion crates: a `Script` handle that walks
//! scan ⇒ parse ⇒ analyze ⇒ cursor ⇒ complete in order, plus thin
//! packed-bytes wrappers around the catalog's own surface.

mod catalog_ops;
mod config;
mod packed;
mod script;
mod stats;

pub use catalog_ops::{add_descriptor_pool, describe_entries, drop_script, flatten, load_script, EntrySummary, EntrySummaryKind};
pub use config::EngineConfig;
pub use packed::PackedBytes;
pub use script::Script;
pub use stats::{ScriptStatistics, StageStats};

pub use sqlsight_catalog::Catalog;
pub use sqlsight_helpers::Status;
