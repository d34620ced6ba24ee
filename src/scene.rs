use crate::config::NodeMetrics;
use crate::edge::{Edge, EdgeHandle};
use crate::error::SceneError;
use crate::event::{EventType, SceneEvent};
use crate::geometry::{BoundingBox, Point, Vector};
use crate::node::{Node, NodeHandle};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::{self, Write};
use tracing::{debug, trace, warn};

/// Separator of the disabled-node list handed to the execution backend
pub const DISABLED_DELIMITER: char = ',';

/// All nodes and edges of one diagram.
///
/// Nodes live in an arena indexed by [`NodeHandle`]; edges refer to their
/// endpoints by handle only, and each node keeps the handles of its edges so
/// a move re-clips just the edges it touches.
#[derive(Debug, Clone)]
pub struct Scene {
    /// Nodes in registration order
    nodes: Vec<Node>,

    /// Node id to arena slot
    index: HashMap<String, NodeHandle>,

    edges: Vec<Edge>,

    /// At most one member
    selection: Vec<NodeHandle>,

    /// Load-time extents, never re-tightened after moves
    bounds: BoundingBox,

    metrics: NodeMetrics,

    /// Event log for the surrounding application
    events: Vec<SceneEvent>,
}

impl Scene {
    /// Create an empty scene
    pub fn new(metrics: NodeMetrics) -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
            selection: Vec::new(),
            bounds: BoundingBox::EMPTY,
            metrics,
            events: Vec::new(),
        }
    }

    // ========== Nodes ==========

    /// Register a node and grow the bounding box around its footprint
    pub fn add_node(
        &mut self,
        id: &str,
        label: &str,
        x: f64,
        y: f64,
        status: &str,
    ) -> Result<NodeHandle, SceneError> {
        if self.index.contains_key(id) {
            return Err(SceneError::DuplicateId(id.to_string()));
        }

        let node = Node::new(id, label, Point::new(x, y), status, &self.metrics);
        let half = node.size.half();
        self.bounds.accumulate(node.position, half.x, half.y);

        let handle = NodeHandle(self.nodes.len());
        self.nodes.push(node);
        self.index.insert(id.to_string(), handle);
        trace!(id, x, y, status, "node added");

        self.log_event(EventType::NodeAdded {
            id: id.to_string(),
            status: status.to_string(),
        });

        Ok(handle)
    }

    pub fn handle(&self, id: &str) -> Option<NodeHandle> {
        self.index.get(id).copied()
    }

    /// `None` for a handle that did not come from this scene
    pub fn node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle.0)
    }

    pub fn node_by_id(&self, id: &str) -> Option<&Node> {
        self.handle(id).and_then(|h| self.node(h))
    }

    /// Nodes in registration order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn require(&self, id: &str) -> Result<NodeHandle, SceneError> {
        self.handle(id)
            .ok_or_else(|| SceneError::NotFound(id.to_string()))
    }

    // ========== Edges ==========

    /// Connect two registered nodes with a boundary-clipped edge
    pub fn add_edge(&mut self, from: &str, to: &str, status: &str) -> Result<EdgeHandle, SceneError> {
        let unknown = |missing: &str| SceneError::UnknownNode {
            from: from.to_string(),
            to: to.to_string(),
            missing: missing.to_string(),
        };
        let from_handle = self.handle(from).ok_or_else(|| unknown(from))?;
        let to_handle = self.handle(to).ok_or_else(|| unknown(to))?;

        let edge = Edge::new(
            from_handle,
            to_handle,
            status,
            &self.nodes[from_handle.0],
            &self.nodes[to_handle.0],
        );
        let handle = EdgeHandle(self.edges.len());
        self.edges.push(edge);
        self.nodes[from_handle.0].out_edges.push(handle);
        self.nodes[to_handle.0].in_edges.push(handle);
        trace!(from, to, status, "edge added");

        self.log_event(EventType::EdgeAdded {
            from: from.to_string(),
            to: to.to_string(),
        });

        Ok(handle)
    }

    pub fn edge(&self, handle: EdgeHandle) -> Option<&Edge> {
        self.edges.get(handle.0)
    }

    /// Edges in creation order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Find the edge between two node ids
    pub fn find_edge(&self, from: &str, to: &str) -> Option<&Edge> {
        let from = self.handle(from)?;
        let to = self.handle(to)?;
        self.nodes[from.0]
            .out_edges
            .iter()
            .map(|h| &self.edges[h.0])
            .find(|e| e.to == to)
    }

    // ========== Moving ==========

    /// Move a node by a model-space delta and re-clip its edges.
    ///
    /// The caller divides screen deltas by the zoom scale.
    pub fn move_node(&mut self, id: &str, dx: f64, dy: f64) -> Result<(), SceneError> {
        let handle = self.require(id)?;
        self.move_handle(handle, Vector::new(dx, dy));
        Ok(())
    }

    /// Move every selected node by a model-space delta
    pub fn move_selected(&mut self, dx: f64, dy: f64) {
        let delta = Vector::new(dx, dy);
        for handle in self.selection.clone() {
            self.move_handle(handle, delta);
        }
    }

    fn move_handle(&mut self, handle: NodeHandle, delta: Vector) {
        self.nodes[handle.0].translate(delta);

        let adjacent: Vec<EdgeHandle> = self.nodes[handle.0].adjacent_edges().collect();
        for edge_handle in adjacent {
            let edge = &mut self.edges[edge_handle.0];
            let (from, to) = (edge.from, edge.to);
            edge.reroute(&self.nodes[from.0], &self.nodes[to.0]);
        }
    }

    // ========== Selection ==========

    /// Make `id` the only selected node.
    ///
    /// Unknown ids leave the selection untouched and report `NotFound`.
    pub fn set_selected(&mut self, id: &str) -> Result<(), SceneError> {
        let handle = self.require(id)?;

        let old_id = self.selection.first().map(|h| self.nodes[h.0].id.clone());
        for h in std::mem::take(&mut self.selection) {
            self.nodes[h.0].selected = false;
        }
        self.nodes[handle.0].selected = true;
        self.selection.push(handle);
        debug!(id, "node selected");

        self.log_event(EventType::SelectionChanged {
            old_id,
            new_id: Some(id.to_string()),
        });
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        let old_id = self.selection.first().map(|h| self.nodes[h.0].id.clone());
        for h in std::mem::take(&mut self.selection) {
            self.nodes[h.0].selected = false;
        }
        self.log_event(EventType::SelectionChanged {
            old_id,
            new_id: None,
        });
    }

    pub fn selection(&self) -> &[NodeHandle] {
        &self.selection
    }

    pub fn selected_nodes(&self) -> Vec<&Node> {
        self.selection.iter().map(|h| &self.nodes[h.0]).collect()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.node_by_id(id).is_some_and(|n| n.selected)
    }

    // ========== Enable / disable ==========

    /// Set the enabled flag of every listed node; unknown ids are skipped
    pub fn set_enabled<S: AsRef<str>>(&mut self, ids: &[S], enabled: bool) {
        let handles: Vec<NodeHandle> = ids
            .iter()
            .filter_map(|id| {
                let id = id.as_ref();
                let handle = self.handle(id);
                if handle.is_none() {
                    warn!(id, "cannot change enabled state of unknown node");
                }
                handle
            })
            .collect();
        self.set_enabled_handles(&handles, enabled);
    }

    /// Enable or disable the current selection
    pub fn set_selection_enabled(&mut self, enabled: bool) {
        let handles = self.selection.clone();
        self.set_enabled_handles(&handles, enabled);
    }

    pub fn enable_all(&mut self) {
        let handles: Vec<NodeHandle> = (0..self.nodes.len()).map(NodeHandle).collect();
        self.set_enabled_handles(&handles, true);
    }

    /// Disable every node upstream of the selection, excluding the selection itself
    pub fn disable_all_ancestors(&mut self) {
        let ancestors = self.ancestors(&self.selection);
        self.set_enabled_handles(&ancestors, false);
    }

    /// Transitive predecessors of `start` in breadth-first order.
    ///
    /// Handles from another scene are skipped.
    pub fn ancestors(&self, start: &[NodeHandle]) -> Vec<NodeHandle> {
        let mut seen: HashSet<NodeHandle> = start.iter().copied().collect();
        let mut queue: VecDeque<NodeHandle> = start.iter().copied().collect();
        let mut found = Vec::new();

        while let Some(current) = queue.pop_front() {
            let Some(node) = self.node(current) else {
                continue;
            };
            for edge_handle in &node.in_edges {
                let parent = self.edges[edge_handle.0].from;
                if seen.insert(parent) {
                    found.push(parent);
                    queue.push_back(parent);
                }
            }
        }
        found
    }

    fn set_enabled_handles(&mut self, handles: &[NodeHandle], enabled: bool) {
        let mut changed = Vec::new();
        for h in handles {
            let node = &mut self.nodes[h.0];
            if node.enabled != enabled {
                node.enabled = enabled;
                changed.push(node.id.clone());
            }
        }
        if changed.is_empty() {
            return;
        }
        debug!(count = changed.len(), enabled, "enabled state changed");
        self.log_event(EventType::EnabledChanged {
            ids: changed,
            enabled,
        });
    }

    /// Retag every selected node with a new status
    pub fn set_selected_status(&mut self, status: &str) {
        if self.selection.is_empty() {
            return;
        }
        let mut ids = Vec::with_capacity(self.selection.len());
        for h in &self.selection {
            let node = &mut self.nodes[h.0];
            node.status = status.to_string();
            ids.push(node.id.clone());
        }
        self.log_event(EventType::StatusChanged {
            ids,
            status: status.to_string(),
        });
    }

    // ========== Output contracts ==========

    /// Disabled node ids in registration order, each followed by a comma:
    /// `id1,id2,`
    pub fn serialize_disabled(&self) -> String {
        let mut out = String::new();
        for node in self.nodes.iter().filter(|n| !n.enabled) {
            out.push_str(&node.id);
            out.push(DISABLED_DELIMITER);
        }
        out
    }

    /// Ids of disabled nodes in registration order
    pub fn disabled_ids(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| !n.enabled)
            .map(|n| n.id.as_str())
            .collect()
    }

    /// Node state dump: `id:status:x,y;` per node, one decimal place
    pub fn node_values(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            // Writing to a String cannot fail
            let _ = write!(
                out,
                "{}:{}:{},{};",
                node.id,
                node.status,
                Tenths(node.position.x),
                Tenths(node.position.y)
            );
        }
        out
    }

    // ========== Queries ==========

    /// Topmost node whose footprint contains the model-space point
    pub fn node_at(&self, point: Point) -> Option<&Node> {
        self.nodes.iter().rev().find(|n| n.bounds().contains(point))
    }

    /// Extents accumulated while nodes were added
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    // ========== Event Logging ==========

    fn log_event(&mut self, event: EventType) {
        self.events.push(SceneEvent::new(event));
    }

    pub fn events(&self) -> &[SceneEvent] {
        &self.events
    }

    /// Take all logged events, leaving the log empty
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Coordinate printed with one decimal: exact halves round away from zero
/// and negative zero prints as `0.0`
struct Tenths(f64);

impl fmt::Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut value = self.0;

        // Only odd multiples of 0.25 sit exactly halfway between two tenths
        let quarters = value * 4.0;
        if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
            value = (value * 10.0).round() / 10.0;
        }
        if value == 0.0 {
            value = 0.0;
        }
        write!(f, "{:.1}", value)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(NodeMetrics::default())
    }
}
