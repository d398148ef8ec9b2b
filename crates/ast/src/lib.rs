//! Flat AST node model and the internal minimal statement parser.
//!
//! The parser understands `SELECT`/`FROM`/`JOIN`/`WHERE` and
//! `CREATE TABLE [AS SELECT]` only — just enough of the grammar to
//! discover table and column references for name resolution. Anything it
//! doesn't recognize collapses into a single opaque expression node rather
//! than failing the whole statement.

mod builder;
mod error;
mod node;
mod parser;
mod tree;

pub use builder::AstBuilder;
pub use error::ParseError;
pub use node::{Attribute, AstNode, NodeId, NodeType, StatementKind, StatementRange};
pub use parser::{parse, ExpectedSymbol};
pub use tree::Ast;
