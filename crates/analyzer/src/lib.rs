//! Name resolution over a parsed script: table/column declarations and
//! references, the query graph, and the scope forest they resolve against.

mod analyze;
mod config;
mod contribution;
mod qualified;
mod query_graph;
mod reference;
mod scope;
mod table;

pub use analyze::{analyze, AnalyzedScript};
pub use config::NameDefaults;
pub use contribution::script_contribution;
pub use qualified::{QualifiedColumnName, QualifiedTableName};
pub use query_graph::QueryGraphEdge;
pub use reference::{ColumnRefId, ColumnReference, ResolvedColumn, ResolvedTable, TableRefId, TableReference};
pub use scope::{NameScope, ScopeId};
pub use table::{TableColumn, TableDeclaration};
