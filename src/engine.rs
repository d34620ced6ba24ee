use crate::config::EngineConfig;
use crate::error::SceneError;
use crate::event::SceneEvent;
use crate::geometry::{Point, Size};
use crate::interaction::{Interaction, PointerAction};
use crate::payload::GraphPayload;
use crate::render::{RenderFrame, RenderSurface};
use crate::scene::Scene;
use crate::slider::ZoomSlider;
use crate::viewport::Viewport;
use std::fmt;
use tracing::{debug, info, warn};

/// One diagram: scene, viewport, slider and pointer state, plus the surface
/// it draws on.
///
/// Lifecycle is `new -> attach(surface) -> ... -> detach()`. Every operation
/// runs to completion inside the input event that triggered it and pushes a
/// fresh frame to the attached surface.
pub struct DiagramEngine {
    config: EngineConfig,
    scene: Scene,
    viewport: Viewport,
    slider: ZoomSlider,
    interaction: Interaction,

    /// Size of the drawing area, used for slider zoom and centering
    viewport_size: Size,

    surface: Option<Box<dyn RenderSurface>>,
}

impl DiagramEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            scene: Scene::new(config.metrics),
            viewport: Viewport::new(config.zoom),
            slider: ZoomSlider::new(config.slider),
            interaction: Interaction::new(config.edit_mode),
            viewport_size: Size::default(),
            surface: None,
            config,
        }
    }

    /// Create an engine and load a payload into it
    pub fn with_payload(config: EngineConfig, payload: &GraphPayload) -> Result<Self, SceneError> {
        let mut engine = Self::new(config);
        engine.load(payload)?;
        Ok(engine)
    }

    // ========== Accessors ==========

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn slider(&self) -> &ZoomSlider {
        &self.slider
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn viewport_size(&self) -> Size {
        self.viewport_size
    }

    // ========== Loading ==========

    /// Replace the scene with the payload's graph.
    ///
    /// Nodes whose status is terminal start disabled. On error the previous
    /// scene stays in place.
    pub fn load(&mut self, payload: &GraphPayload) -> Result<(), SceneError> {
        let mut scene = Scene::new(self.config.metrics);

        for node in &payload.nodes {
            scene.add_node(&node.id, node.label(), node.x, node.y, &node.status)?;
        }
        for edge in &payload.edges {
            scene.add_edge(&edge.from, &edge.to, &edge.status)?;
        }

        let terminal: Vec<String> = scene
            .nodes()
            .iter()
            .filter(|n| self.config.is_terminal(&n.status))
            .map(|n| n.id.clone())
            .collect();
        scene.set_enabled(&terminal, false);

        info!(
            nodes = scene.node_count(),
            edges = scene.edge_count(),
            disabled = terminal.len(),
            "graph loaded"
        );

        self.scene = scene;
        self.interaction = Interaction::new(self.interaction.edit_mode());
        self.present();
        Ok(())
    }

    // ========== Surface lifecycle ==========

    /// Start drawing on `surface`, detaching the current one first
    pub fn attach(&mut self, surface: Box<dyn RenderSurface>) {
        self.detach();
        self.surface = Some(surface);
        debug!("surface attached");
        self.present();
    }

    /// Stop drawing and hand the surface back
    pub fn detach(&mut self) -> Option<Box<dyn RenderSurface>> {
        let mut surface = self.surface.take()?;
        surface.detached();
        debug!("surface detached");
        Some(surface)
    }

    pub fn is_attached(&self) -> bool {
        self.surface.is_some()
    }

    // ========== Viewport ==========

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport_size = Size::new(width, height);
    }

    /// Fit the load-time extents into a `width` x `height` area
    pub fn reset_to_fit(&mut self, width: f64, height: f64) {
        self.resize(width, height);
        if self
            .viewport
            .reset_to_fit(&self.scene.bounds(), width, height)
        {
            self.sync_slider();
        }
        self.present();
    }

    /// Select a node and pan so it sits in the middle of the view
    pub fn select_and_center(&mut self, id: &str) -> bool {
        if !self.select(id) {
            return false;
        }
        if let Some(node) = self.scene.node_by_id(id) {
            self.viewport.center_on(node.position, self.viewport_size);
        }
        self.present();
        true
    }

    fn sync_slider(&mut self) {
        self.slider.sync_to_zoom(self.viewport.zoom_percent());
        self.slider.release();
    }

    // ========== Pointer input ==========

    /// Hover notification from the surface; unknown ids are ignored
    pub fn node_entered(&mut self, id: &str) {
        if self.scene.handle(id).is_none() {
            warn!(id, "hover on unknown node ignored");
            return;
        }
        self.interaction.node_entered(id);
    }

    pub fn node_left(&mut self, id: &str) {
        self.interaction.node_left(id);
    }

    /// Derive enter/leave notifications from a screen position
    pub fn hover_at(&mut self, screen: Point) {
        let hit = self.node_at(screen).map(str::to_string);
        match (self.interaction.hovered().map(str::to_string), hit) {
            (Some(old), Some(new)) if old == new => {}
            (old, new) => {
                if let Some(old) = old {
                    self.interaction.node_left(&old);
                }
                if let Some(new) = new {
                    self.interaction.node_entered(&new);
                }
            }
        }
    }

    pub fn pointer_entered_surface(&mut self) {
        self.interaction.set_pointer_inside(true);
    }

    pub fn pointer_left_surface(&mut self) {
        self.interaction.set_pointer_inside(false);
    }

    pub fn pointer_down(&mut self, screen: Point) {
        self.interaction.pointer_down(screen, &self.scene);
    }

    pub fn pointer_move(&mut self, screen: Point) {
        if let Some(action) = self.interaction.pointer_move(screen) {
            self.apply(action);
        }
    }

    /// Button released; always honored, whatever the gesture was
    pub fn pointer_up(&mut self) {
        if let Some(action) = self.interaction.pointer_up() {
            self.apply(action);
        }
    }

    /// Wheel notches at a screen point; positive zooms in
    pub fn wheel(&mut self, steps: i32, focus: Point) {
        if let Some(action) = self.interaction.wheel(steps, focus) {
            self.apply(action);
        }
    }

    fn apply(&mut self, action: PointerAction) {
        match action {
            PointerAction::Pan(delta) => self.viewport.pan(delta.x, delta.y),
            PointerAction::DragSelection(delta) => {
                let scale = self.viewport.scale();
                self.scene.move_selected(delta.x / scale, delta.y / scale);
            }
            PointerAction::SliderMoved(offset) => {
                let percent = self.slider.drag_by(offset);
                self.viewport.zoom_to_percent(percent, self.viewport_size);
            }
            PointerAction::SliderReleased => self.slider.release(),
            PointerAction::Select(id) => {
                self.select(&id);
            }
            PointerAction::Zoom { steps, focus } => {
                let factor = self.viewport.wheel_factor(steps);
                if self.viewport.zoom_at(factor, focus) {
                    self.sync_slider();
                }
            }
        }
        self.present();
    }

    // ========== Zoom slider ==========

    /// Button pressed on the slider handle
    pub fn slider_grab(&mut self, screen: Point) {
        self.slider.grab();
        self.interaction.slider_down(screen);
    }

    /// Click on the slider track: jump the handle there
    pub fn slider_click(&mut self, position: f64) {
        let percent = self.slider.set_position(position);
        self.slider.release();
        self.viewport.zoom_to_percent(percent, self.viewport_size);
        self.present();
    }

    /// Zoom buttons next to the slider, one click step each
    pub fn click_zoom(&mut self, zoom_in: bool) {
        let percent = self.slider.step(if zoom_in { -1.0 } else { 1.0 });
        self.slider.release();
        self.viewport.zoom_to_percent(percent, self.viewport_size);
        self.present();
    }

    // ========== Edit mode ==========

    pub fn edit_mode(&self) -> bool {
        self.interaction.edit_mode()
    }

    pub fn set_edit_mode(&mut self, enabled: bool) {
        self.interaction.set_edit_mode(enabled);
        self.present();
    }

    pub fn toggle_edit_mode(&mut self) -> bool {
        let enabled = self.interaction.toggle_edit_mode();
        debug!(enabled, "edit mode toggled");
        self.present();
        enabled
    }

    // ========== Selection and context actions ==========

    /// Select a node; unknown ids are logged and ignored
    pub fn select(&mut self, id: &str) -> bool {
        match self.scene.set_selected(id) {
            Ok(()) => {
                self.present();
                true
            }
            Err(err) => {
                warn!(%err, "selection ignored");
                false
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.scene.clear_selection();
        self.present();
    }

    pub fn set_enabled<S: AsRef<str>>(&mut self, ids: &[S], enabled: bool) {
        self.scene.set_enabled(ids, enabled);
        self.present();
    }

    pub fn enable_selected(&mut self) {
        self.scene.set_selection_enabled(true);
        self.present();
    }

    pub fn disable_selected(&mut self) {
        self.scene.set_selection_enabled(false);
        self.present();
    }

    pub fn disable_ancestors(&mut self) {
        self.scene.disable_all_ancestors();
        self.present();
    }

    pub fn enable_all(&mut self) {
        self.scene.enable_all();
        self.present();
    }

    pub fn set_selected_status(&mut self, status: &str) {
        self.scene.set_selected_status(status);
        self.present();
    }

    // ========== Outputs ==========

    /// Id of the selected node, if any
    pub fn selected_id(&self) -> Option<&str> {
        self.scene
            .selected_nodes()
            .first()
            .map(|n| n.id.as_str())
    }

    /// Disabled ids for a partial re-run, `id1,id2,`
    pub fn serialize_disabled(&self) -> String {
        self.scene.serialize_disabled()
    }

    /// Positions dump, `id:status:x,y;`
    pub fn node_values(&self) -> String {
        self.scene.node_values()
    }

    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        self.scene.drain_events()
    }

    /// Topmost node under a screen point
    pub fn node_at(&self, screen: Point) -> Option<&str> {
        let model = self.viewport.screen_to_model(screen);
        self.scene.node_at(model).map(|n| n.id.as_str())
    }

    // ========== Rendering ==========

    /// Current projection of the scene
    pub fn render(&self) -> RenderFrame {
        let mut frame =
            RenderFrame::build(&self.scene, self.viewport.transform(), &self.config.style);
        frame.slider = self.slider.normalized();
        frame.edit_mode = self.interaction.edit_mode();
        frame
    }

    fn present(&mut self) {
        if self.surface.is_none() {
            return;
        }
        let frame = self.render();
        if let Some(surface) = self.surface.as_mut() {
            surface.present(&frame);
        }
    }
}

impl Default for DiagramEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl fmt::Debug for DiagramEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagramEngine")
            .field("nodes", &self.scene.node_count())
            .field("edges", &self.scene.edge_count())
            .field("transform", &self.viewport.transform())
            .field("state", self.interaction.state())
            .field("attached", &self.is_attached())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vector;
    use crate::interaction::PointerState;
    use crate::payload::{EdgePayload, NodePayload};
    use crate::render::FrameSlot;
    use assert_matches::assert_matches;

    fn payload() -> GraphPayload {
        GraphPayload {
            nodes: vec![
                NodePayload::new("a", 0.0, 0.0, "succeeded"),
                NodePayload::new("b", 100.0, 0.0, "failed"),
                NodePayload::new("c", 200.0, 100.0, "ready"),
            ],
            edges: vec![
                EdgePayload::new("a", "b", "succeeded"),
                EdgePayload::new("b", "c", "failed"),
            ],
        }
    }

    fn engine() -> DiagramEngine {
        let mut engine = DiagramEngine::with_payload(EngineConfig::default(), &payload()).unwrap();
        engine.reset_to_fit(800.0, 600.0);
        engine
    }

    #[test]
    fn test_load_disables_terminal_statuses() {
        let engine = engine();
        assert_eq!(engine.serialize_disabled(), "a,");
        assert_eq!(engine.scene().edge_count(), 2);
    }

    #[test]
    fn test_edit_mode_starts_from_config() {
        assert!(engine().interaction().edit_mode());

        let config = EngineConfig {
            edit_mode: false,
            ..EngineConfig::default()
        };
        let mut engine = DiagramEngine::with_payload(config, &payload()).unwrap();
        assert!(!engine.interaction().edit_mode());

        // Reloading keeps whatever mode the user switched to
        engine.toggle_edit_mode();
        engine.load(&payload()).unwrap();
        assert!(engine.interaction().edit_mode());
    }

    #[test]
    fn test_failed_load_keeps_previous_scene() {
        let mut engine = engine();
        let mut bad = payload();
        bad.edges.push(EdgePayload::new("c", "zzz", "ready"));

        assert_matches!(engine.load(&bad), Err(SceneError::UnknownNode { .. }));
        assert_eq!(engine.scene().node_count(), 3);
        assert_eq!(engine.scene().edge_count(), 2);
    }

    #[test]
    fn test_attach_replaces_previous_surface() {
        let mut engine = engine();
        let first = FrameSlot::new();
        let second = FrameSlot::new();

        engine.attach(Box::new(first.clone()));
        assert!(first.is_attached());
        assert!(first.latest().is_some());

        engine.attach(Box::new(second.clone()));
        assert!(!first.is_attached());
        assert!(first.latest().is_none());
        assert!(second.is_attached());

        assert!(engine.detach().is_some());
        assert!(!second.is_attached());
        assert!(engine.detach().is_none());
    }

    #[test]
    fn test_frames_follow_changes() {
        let mut engine = engine();
        let slot = FrameSlot::new();
        engine.attach(Box::new(slot.clone()));

        engine.pointer_entered_surface();
        engine.wheel(3, Point::new(400.0, 300.0));
        let frame = slot.latest().unwrap();
        assert_eq!(frame.transform, engine.viewport().transform());
        assert!((frame.slider - engine.slider().normalized()).abs() < 1e-12);
    }

    #[test]
    fn test_click_on_node_selects() {
        let mut engine = engine();
        let center = engine.viewport().model_to_screen(Point::new(100.0, 0.0));

        engine.hover_at(center);
        assert_eq!(engine.interaction().hovered(), Some("b"));
        engine.pointer_down(center);
        engine.pointer_up();

        assert_eq!(engine.selected_id(), Some("b"));
        assert!(engine.interaction().is_idle());
    }

    #[test]
    fn test_drag_divides_by_scale() {
        let mut engine = engine();
        engine.set_edit_mode(true);
        engine.select("c");
        let scale = engine.viewport().scale();
        let start = engine.viewport().model_to_screen(Point::new(200.0, 100.0));

        engine.hover_at(start);
        engine.pointer_down(start);
        engine.pointer_move(start + Vector::new(10.0 * scale, -5.0 * scale));
        assert_eq!(engine.interaction().state(), &PointerState::DraggingNode);
        engine.pointer_up();

        let moved = engine.scene().node_by_id("c").unwrap().position;
        assert!((moved.x - 210.0).abs() < 1e-9);
        assert!((moved.y - 95.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_ids_are_noops() {
        let mut engine = engine();
        engine.select("a");
        assert!(!engine.select("missing"));
        assert!(!engine.select_and_center("missing"));
        engine.node_entered("missing");

        assert_eq!(engine.selected_id(), Some("a"));
        assert_eq!(engine.interaction().hovered(), None);
    }

    #[test]
    fn test_select_and_center() {
        let mut engine = engine();
        assert!(engine.select_and_center("c"));

        let screen = engine.viewport().model_to_screen(Point::new(200.0, 100.0));
        assert!((screen.x - 400.0).abs() < 1e-9);
        assert!((screen.y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_slider_drag_zooms_around_center() {
        let mut engine = engine();
        let center = engine.viewport().screen_to_model(Point::new(400.0, 300.0));

        engine.slider_grab(Point::new(20.0, 150.0));
        engine.pointer_move(Point::new(20.0, 100.0));
        engine.pointer_up();
        assert!(!engine.slider().is_grabbed());

        let percent = engine.slider().percent();
        let policy = engine.config().zoom;
        let expected = policy.min_zoom + (policy.max_zoom - policy.min_zoom) * percent * percent;
        assert!((engine.viewport().scale() - expected).abs() < 1e-9);

        let after = engine.viewport().model_to_screen(center);
        assert!((after.x - 400.0).abs() < 1e-6);
        assert!((after.y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_click_zoom_steps_slider() {
        let mut engine = engine();
        let before = engine.slider().position();
        let scale = engine.viewport().scale();

        engine.click_zoom(true);
        assert!((engine.slider().position() - (before - 10.0)).abs() < 1e-9);
        assert!(engine.viewport().scale() > scale);

        engine.slider_click(200.0);
        assert!((engine.viewport().scale() - engine.config().zoom.min_zoom).abs() < 1e-6);
    }

    #[test]
    fn test_context_actions() {
        let mut engine = engine();
        engine.select("c");
        engine.disable_ancestors();
        assert_eq!(engine.serialize_disabled(), "a,b,");

        engine.disable_selected();
        assert_eq!(engine.serialize_disabled(), "a,b,c,");

        engine.enable_all();
        assert_eq!(engine.serialize_disabled(), "");

        engine.set_selected_status("running");
        assert!(engine.node_values().contains("c:running:200.0,100.0;"));
    }
}
