use crate::config::NodeMetrics;
use crate::edge::EdgeHandle;
use crate::geometry::{Point, Rect, Size, Vector};

/// Stable index of a node inside the scene that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub(crate) usize);

impl NodeHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A named job in the diagram
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Unique identifier supplied by the payload
    pub id: String,

    /// Text drawn inside the node
    pub label: String,

    /// Center position in model space
    pub position: Point,

    /// Status tag ("succeeded", "failed", "running", ...)
    pub status: String,

    /// Disabled nodes are skipped by the next execution
    pub enabled: bool,

    pub selected: bool,

    /// Footprint drawn on the canvas, fixed at creation
    pub size: Size,

    /// Extra margin around the footprint that edges stop at
    pub border: f64,

    pub(crate) out_edges: Vec<EdgeHandle>,
    pub(crate) in_edges: Vec<EdgeHandle>,
}

impl Node {
    /// Create a node whose footprint is sized from its label
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        position: Point,
        status: impl Into<String>,
        metrics: &NodeMetrics,
    ) -> Self {
        let label = label.into();
        let text_width = label.chars().count() as f64 * metrics.char_width;
        Self {
            id: id.into(),
            label,
            position,
            status: status.into(),
            enabled: true,
            selected: false,
            size: Size::new(text_width + metrics.horizontal_padding, metrics.node_height),
            border: metrics.border,
            out_edges: Vec::new(),
            in_edges: Vec::new(),
        }
    }

    /// Footprint rectangle in model space
    pub fn bounds(&self) -> Rect {
        Rect::centered(self.position, self.size)
    }

    /// Half extents of the box edge endpoints are clipped to
    pub fn clip_half_extent(&self) -> Vector {
        self.size.grown(self.border).half()
    }

    pub fn translate(&mut self, delta: Vector) {
        self.position = self.position + delta;
    }

    pub fn out_edges(&self) -> &[EdgeHandle] {
        &self.out_edges
    }

    pub fn in_edges(&self) -> &[EdgeHandle] {
        &self.in_edges
    }

    /// Out and in edges, outgoing first
    pub fn adjacent_edges(&self) -> impl Iterator<Item = EdgeHandle> + '_ {
        self.out_edges.iter().chain(self.in_edges.iter()).copied()
    }
}
