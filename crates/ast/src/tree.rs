use sqlsight_scanner::Location;

use crate::node::{AstNode, NodeId, StatementRange};

/// A parsed script's flat AST: a node table, a shared child-id buffer
/// nodes slice into, and the statement ranges that partition the nodes.
#[derive(Debug, Clone, Default)]
pub struct Ast {
    pub(crate) nodes: Vec<AstNode>,
    pub(crate) child_ids: Vec<NodeId>,
    pub statements: Vec<StatementRange>,
}

impl Ast {
    pub fn node(&self, id: NodeId) -> &AstNode {
        &self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        let node = self.node(id);
        let begin = node.children_begin as usize;
        let end = begin + node.children_count as usize;
        &self.child_ids[begin..end]
    }

    pub fn iter_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId::new)
    }

    /// Root-to-node path, nearest ancestor last removed (root first, `id`
    /// last).
    pub fn path_to_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    /// Finds the statement whose root location contains `offset`, then
    /// descends towards the innermost node whose location contains it,
    /// always preferring a child ending strictly after the offset over one
    /// ending exactly at it.
    pub fn node_at_offset(&self, offset: u32) -> Option<(StatementRange, NodeId)> {
        let statement = self
            .statements
            .iter()
            .find(|s| self.node(s.root).location.contains(offset))
            .or_else(|| {
                // Offset sits exactly at the end of the last statement
                // (e.g. the very end of the script); fall back to the
                // last statement whose root starts at or before it.
                self.statements
                    .iter()
                    .rev()
                    .find(|s| self.node(s.root).location.offset <= offset)
            })?;

        let mut current = statement.root;
        loop {
            let candidates: Vec<NodeId> = self
                .children(current)
                .iter()
                .copied()
                .filter(|&child| self.node(child).location.contains_exactly(exact_point(offset)))
                .collect();

            let next = candidates.into_iter().max_by_key(|&child| {
                let loc = self.node(child).location;
                // Prefer a child ending strictly after the offset.
                let ends_strictly_after = loc.end() > offset;
                (ends_strictly_after, std::cmp::Reverse(loc.offset))
            });

            match next {
                Some(child) => current = child,
                None => break,
            }
        }
        Some((*statement, current))
    }
}

fn exact_point(offset: u32) -> Location {
    Location::new(offset, 0)
}
