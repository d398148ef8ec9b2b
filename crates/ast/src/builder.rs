use sqlsight_scanner::Location;

use crate::node::{Attribute, AstNode, NodeId, NodeType};
use crate::tree::Ast;

/// Incrementally builds an [`Ast`], keeping every node's children as a
/// contiguous run in the shared `child_ids` buffer.
#[derive(Debug, Default)]
pub struct AstBuilder {
    ast: Ast,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_leaf(&mut self, node_type: NodeType, location: Location, attribute: Attribute) -> NodeId {
        let id = NodeId::new(self.ast.nodes.len() as u32);
        self.ast.nodes.push(AstNode {
            node_type,
            parent: None,
            children_begin: 0,
            children_count: 0,
            attribute,
            location,
        });
        id
    }

    /// Pushes a parent node whose children have already been built.
    /// `location` should span all of `children` (callers typically derive
    /// it from the first and last child's locations plus surrounding
    /// keywords).
    pub fn push_parent(
        &mut self,
        node_type: NodeType,
        location: Location,
        attribute: Attribute,
        children: &[NodeId],
    ) -> NodeId {
        let children_begin = self.ast.child_ids.len() as u32;
        self.ast.child_ids.extend_from_slice(children);
        let id = NodeId::new(self.ast.nodes.len() as u32);
        for &child in children {
            self.ast.nodes[child.index()].parent = Some(id);
        }
        self.ast.nodes.push(AstNode {
            node_type,
            parent: None,
            children_begin,
            children_count: children.len() as u32,
            attribute,
            location,
        });
        id
    }

    pub fn node(&self, id: NodeId) -> &AstNode {
        self.ast.node(id)
    }

    pub fn finish_statement(
        &mut self,
        kind: crate::node::StatementKind,
        root: NodeId,
        nodes_begin: u32,
    ) {
        let node_count = self.ast.nodes.len() as u32 - nodes_begin;
        self.ast.statements.push(crate::node::StatementRange {
            kind,
            root,
            nodes_begin,
            node_count,
        });
    }

    pub fn next_node_index(&self) -> u32 {
        self.ast.nodes.len() as u32
    }

    pub fn next_child_index(&self) -> u32 {
        self.ast.child_ids.len() as u32
    }

    /// Discards every node and child-id slot appended since
    /// `(node_index, child_index)`, used to unwind a statement whose parse
    /// failed partway through so it leaves no orphaned nodes behind.
    pub fn truncate_to(&mut self, node_index: u32, child_index: u32) {
        self.ast.nodes.truncate(node_index as usize);
        self.ast.child_ids.truncate(child_index as usize);
    }

    pub fn build(self) -> Ast {
        self.ast
    }
}
