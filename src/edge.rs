use crate::geometry::{intersect_line_with_boundary, Point};
use crate::node::{Node, NodeHandle};

/// Stable index of an edge inside the scene that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeHandle(pub(crate) usize);

impl EdgeHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Dependency between two nodes. The work flows FROM `from` TO `to`.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: NodeHandle,
    pub to: NodeHandle,

    /// Status tag used for the stroke color
    pub status: String,

    /// Cached endpoints on the node borders, model space
    pub start: Point,
    pub end: Point,
}

impl Edge {
    /// Create an edge with endpoints clipped to both nodes
    pub fn new(
        from: NodeHandle,
        to: NodeHandle,
        status: impl Into<String>,
        from_node: &Node,
        to_node: &Node,
    ) -> Self {
        let mut edge = Self {
            from,
            to,
            status: status.into(),
            start: from_node.position,
            end: to_node.position,
        };
        edge.reroute(from_node, to_node);
        edge
    }

    /// Check if this edge touches a given node
    pub fn involves(&self, node: NodeHandle) -> bool {
        self.from == node || self.to == node
    }

    /// Recompute both endpoints from the current node positions.
    ///
    /// Nodes sharing a center keep the centers as endpoints.
    pub fn reroute(&mut self, from_node: &Node, to_node: &Node) {
        let a = from_node.position;
        let b = to_node.position;
        if a == b {
            self.start = a;
            self.end = b;
            return;
        }
        self.start = intersect_line_with_boundary(b, a, from_node.clip_half_extent());
        self.end = intersect_line_with_boundary(a, b, to_node.clip_half_extent());
    }
}
