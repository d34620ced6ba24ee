use crate::geometry::{Point, Rect, Size, Transform};
use crate::scene::Scene;
use crate::style::{Color, ColorPolicy};
use std::cell::RefCell;
use std::rc::Rc;

/// One node as it should appear on screen
#[derive(Debug, Clone, PartialEq)]
pub struct NodeShape {
    pub id: String,
    pub label: String,

    /// Footprint in screen space
    pub rect: Rect,

    pub fill: Color,
    pub stroke: Color,
    pub label_color: Color,
    pub opacity: f32,
    pub selected: bool,
}

/// One straight edge segment in screen space, already clipped to node borders
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLine {
    pub from: String,
    pub to: String,
    pub start: Point,
    pub end: Point,
    pub color: Color,
}

/// Screen-space projection of the scene under the current viewport
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderFrame {
    pub transform: Transform,
    pub nodes: Vec<NodeShape>,
    pub edges: Vec<EdgeLine>,

    /// Zoom slider handle as a fraction of its track
    pub slider: f64,

    pub edit_mode: bool,
}

impl RenderFrame {
    /// Project every node and edge through `transform`
    pub fn build(scene: &Scene, transform: Transform, style: &ColorPolicy) -> Self {
        let nodes = scene
            .nodes()
            .iter()
            .map(|node| {
                let model = node.bounds();
                let rect = Rect {
                    min: transform.apply(model.min),
                    size: Size::new(
                        model.size.width * transform.scale,
                        model.size.height * transform.scale,
                    ),
                };
                let dimmed = !node.enabled || node.status == "disabled";
                NodeShape {
                    id: node.id.clone(),
                    label: node.label.clone(),
                    rect,
                    fill: style.node_color(&node.status),
                    stroke: if node.selected {
                        style.selected_stroke
                    } else {
                        style.unselected_stroke
                    },
                    label_color: style.label_color,
                    opacity: if dimmed { style.disabled_opacity } else { 1.0 },
                    selected: node.selected,
                }
            })
            .collect();

        let edges = scene
            .edges()
            .iter()
            .filter_map(|edge| {
                let from = scene.node(edge.from)?;
                let to = scene.node(edge.to)?;
                Some(EdgeLine {
                    from: from.id.clone(),
                    to: to.id.clone(),
                    start: transform.apply(edge.start),
                    end: transform.apply(edge.end),
                    color: style.edge_color(&edge.status),
                })
            })
            .collect();

        Self {
            transform,
            nodes,
            edges,
            slider: 1.0,
            edit_mode: false,
        }
    }

    pub fn node(&self, id: &str) -> Option<&NodeShape> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Drawing surface the engine pushes frames to.
///
/// At most one engine writes to a surface; the engine calls `detached` before
/// it lets go of one.
pub trait RenderSurface {
    fn present(&mut self, frame: &RenderFrame);

    fn detached(&mut self) {}
}

/// Surface that keeps the most recent frame for whoever holds a clone
#[derive(Debug, Clone, Default)]
pub struct FrameSlot {
    frame: Rc<RefCell<Option<RenderFrame>>>,
    attached: Rc<RefCell<bool>>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest presented frame
    pub fn latest(&self) -> Option<RenderFrame> {
        self.frame.borrow().clone()
    }

    /// Take the latest frame, leaving the slot empty
    pub fn take(&self) -> Option<RenderFrame> {
        self.frame.borrow_mut().take()
    }

    /// Whether an engine currently writes to this slot
    pub fn is_attached(&self) -> bool {
        *self.attached.borrow()
    }
}

impl RenderSurface for FrameSlot {
    fn present(&mut self, frame: &RenderFrame) {
        *self.attached.borrow_mut() = true;
        *self.frame.borrow_mut() = Some(frame.clone());
    }

    fn detached(&mut self) {
        *self.attached.borrow_mut() = false;
        *self.frame.borrow_mut() = None;
    }
}
