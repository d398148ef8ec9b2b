use sqlsight_helpers::Id;
use sqlsight_scanner::{Comparison, Keyword, Location, NameId};

pub struct NodeMarker;
pub type NodeId = Id<NodeMarker>;

/// Flat node types. Scope-introducing statement roots are listed first
/// since `NodeType::is_scope_introducing` is checked frequently during
/// name resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeType {
    SelectStatement,
    CreateTableStatement,
    CreateTableAsStatement,

    SelectClause,
    SelectClauseElement,
    Star,
    FromClause,
    /// A single `FROM`/`JOIN` item: a `TableRef` child, and optionally an
    /// `ON` condition child when it was introduced via an explicit join.
    FromItem,
    WhereClause,

    AndExpression,
    OrExpression,
    ComparisonExpression,
    OpaqueExpression,
    Literal,

    TableRef,
    ColumnRef,
    NamePathComponent,
    Alias,

    ColumnDefList,
    ColumnDef,
    TypeName,
}

impl NodeType {
    pub const fn is_scope_introducing(self) -> bool {
        matches!(
            self,
            NodeType::SelectStatement
                | NodeType::CreateTableStatement
                | NodeType::CreateTableAsStatement
        )
    }

    pub const fn is_statement_root(self) -> bool {
        self.is_scope_introducing()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatementKind {
    Select,
    CreateTable,
    CreateTableAs,
}

/// Node-specific scalar payload, stored alongside a node rather than
/// forcing every node kind to grow the shared record with fields only it
/// needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Attribute {
    #[default]
    None,
    Name(NameId),
    Comparison(Comparison),
    /// Base type keyword of a `TypeName` node (`INT`, `VARCHAR`, ...).
    Keyword(Keyword),
}

/// A flat AST record: node type, parent link, a `[begin, begin+count)`
/// slice into the AST's shared child-id buffer, an optional scalar
/// attribute, and the node's source location.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AstNode {
    pub node_type: NodeType,
    pub parent: Option<NodeId>,
    pub children_begin: u32,
    pub children_count: u32,
    pub attribute: Attribute,
    pub location: Location,
}

/// A `[nodes_begin, nodes_begin + node_count)` range of node indices
/// covering one statement, ordered by root location.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatementRange {
    pub kind: StatementKind,
    pub root: NodeId,
    pub nodes_begin: u32,
    pub node_count: u32,
}

impl StatementRange {
    pub fn contains_node(&self, node: NodeId) -> bool {
        let idx = node.as_u32();
        idx >= self.nodes_begin && idx < self.nodes_begin + self.node_count
    }
}
