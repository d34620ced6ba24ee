use crate::geometry::{Point, Vector};
use crate::scene::Scene;
use tracing::trace;

/// Where a pointer gesture currently stands
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PointerState {
    #[default]
    Idle,

    /// Button pressed, no movement yet
    PointerDown {
        intent: DragIntent,
        /// Node under the cursor at press time
        target: Option<String>,
    },

    Panning,

    DraggingNode,

    /// Dragging the zoom slider handle
    SliderDragging { origin_y: f64 },
}

/// What a drag turns into once the pointer moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragIntent {
    Pan,
    MoveSelection,
}

/// Effect of a pointer event, applied by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum PointerAction {
    /// Screen-space pan delta
    Pan(Vector),

    /// Screen-space drag delta for every selected node
    DragSelection(Vector),

    /// Slider handle offset from where the gesture started
    SliderMoved(f64),

    SliderReleased,

    /// Press and release on a node without movement
    Select(String),

    /// Wheel notches at a screen point
    Zoom { steps: i32, focus: Point },
}

/// Pointer state machine: `Idle -> PointerDown -> {Panning | DraggingNode}`,
/// or back to `Idle` with a selection when released without moving, plus
/// slider drags. Hover is tracked from enter/leave notifications and read
/// when the button goes down.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    state: PointerState,
    edit_mode: bool,
    hovered: Option<String>,
    last: Point,
    pointer_inside: bool,
}

impl Interaction {
    pub fn new(edit_mode: bool) -> Self {
        Self {
            edit_mode,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &PointerState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == PointerState::Idle
    }

    // ========== Edit mode ==========

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn set_edit_mode(&mut self, enabled: bool) {
        self.edit_mode = enabled;
    }

    pub fn toggle_edit_mode(&mut self) -> bool {
        self.edit_mode = !self.edit_mode;
        self.edit_mode
    }

    // ========== Hover ==========

    pub fn node_entered(&mut self, id: &str) {
        self.hovered = Some(id.to_string());
    }

    /// Forget the hovered node if it is the one being left
    pub fn node_left(&mut self, id: &str) {
        if self.hovered.as_deref() == Some(id) {
            self.hovered = None;
        }
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn set_pointer_inside(&mut self, inside: bool) {
        self.pointer_inside = inside;
    }

    pub fn pointer_inside(&self) -> bool {
        self.pointer_inside
    }

    // ========== Pointer ==========

    /// Button pressed on the canvas.
    ///
    /// Dragging nodes needs edit mode and a hovered node that is selected;
    /// everything else drags the view.
    pub fn pointer_down(&mut self, pos: Point, scene: &Scene) {
        let drag_selection = self.edit_mode
            && self
                .hovered
                .as_deref()
                .is_some_and(|id| scene.is_selected(id));
        let intent = if drag_selection {
            DragIntent::MoveSelection
        } else {
            DragIntent::Pan
        };

        trace!(?intent, hovered = ?self.hovered, "pointer down");
        self.state = PointerState::PointerDown {
            intent,
            target: self.hovered.clone(),
        };
        self.last = pos;
    }

    /// Button pressed on the zoom slider handle
    pub fn slider_down(&mut self, pos: Point) {
        self.state = PointerState::SliderDragging { origin_y: pos.y };
        self.last = pos;
    }

    pub fn pointer_move(&mut self, pos: Point) -> Option<PointerAction> {
        let delta = pos - self.last;

        let action = match &self.state {
            PointerState::Idle => None,
            PointerState::PointerDown { intent, .. } => {
                if delta.is_zero() {
                    return None;
                }
                match *intent {
                    DragIntent::Pan => {
                        self.state = PointerState::Panning;
                        Some(PointerAction::Pan(delta))
                    }
                    DragIntent::MoveSelection => {
                        self.state = PointerState::DraggingNode;
                        Some(PointerAction::DragSelection(delta))
                    }
                }
            }
            PointerState::Panning => Some(PointerAction::Pan(delta)),
            PointerState::DraggingNode => Some(PointerAction::DragSelection(delta)),
            PointerState::SliderDragging { origin_y } => {
                Some(PointerAction::SliderMoved(pos.y - *origin_y))
            }
        };

        self.last = pos;
        action
    }

    /// Button released: always back to `Idle`
    pub fn pointer_up(&mut self) -> Option<PointerAction> {
        match std::mem::take(&mut self.state) {
            PointerState::PointerDown {
                target: Some(id), ..
            } => {
                trace!(id = id.as_str(), "click selects node");
                Some(PointerAction::Select(id))
            }
            PointerState::SliderDragging { .. } => Some(PointerAction::SliderReleased),
            _ => None,
        }
    }

    /// Mouse wheel; ignored while the pointer is outside the canvas
    pub fn wheel(&self, steps: i32, focus: Point) -> Option<PointerAction> {
        if !self.pointer_inside || steps == 0 {
            return None;
        }
        Some(PointerAction::Zoom { steps, focus })
    }
}
