// Flow Canvas - Interactive Diagram Engine

pub mod config;
pub mod edge;
pub mod engine;
pub mod error;
pub mod event;
pub mod geometry;
pub mod interaction;
pub mod node;
pub mod payload;
pub mod render;
pub mod scene;
pub mod slider;
pub mod style;
pub mod ui;
pub mod viewport;

// Re-export main types for convenience
pub use config::{EngineConfig, NodeMetrics, SliderConfig, ZoomPolicy};
pub use edge::{Edge, EdgeHandle};
pub use engine::DiagramEngine;
pub use error::SceneError;
pub use event::{EventType, SceneEvent};
pub use geometry::{BoundingBox, Point, Rect, Size, Transform, Vector};
pub use interaction::{DragIntent, Interaction, PointerAction, PointerState};
pub use node::{Node, NodeHandle};
pub use payload::{EdgePayload, GraphPayload, NodePayload};
pub use render::{EdgeLine, FrameSlot, NodeShape, RenderFrame, RenderSurface};
pub use scene::{Scene, DISABLED_DELIMITER};
pub use slider::ZoomSlider;
pub use style::{Color, ColorPolicy};
pub use ui::FlowViewerApp;
pub use viewport::Viewport;
