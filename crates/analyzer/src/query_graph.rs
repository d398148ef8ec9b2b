use sqlsight_scanner::Comparison;

use crate::reference::ColumnRefId;

/// A comparison whose two operands each contain at least one column
/// reference. `left`/`right` enumerate every column reference found
/// under the respective operand; their lengths are the edge's
/// cardinalities.
#[derive(Debug, Clone)]
pub struct QueryGraphEdge {
    pub comparison: Comparison,
    pub left: Vec<ColumnRefId>,
    pub right: Vec<ColumnRefId>,
}

impl QueryGraphEdge {
    pub fn left_cardinality(&self) -> usize {
        self.left.len()
    }

    pub fn right_cardinality(&self) -> usize {
        self.right.len()
    }
}
