use crate::{
    Color, DiagramEngine, EngineConfig, EventType, FrameSlot, GraphPayload, Point, RenderFrame,
};
use anyhow::{Context, Result};
use egui::{epaint::PathShape, pos2, vec2, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke};
use std::collections::VecDeque;

/// Distance of the zoom slider track from the canvas corner
const SLIDER_OFFSET: egui::Vec2 = vec2(24.0, 48.0);
const SLIDER_WIDTH: f32 = 8.0;
const HANDLE_SIZE: egui::Vec2 = vec2(22.0, 10.0);
const MAX_EVENT_LINES: usize = 50;

/// Flow viewer window driving a [`DiagramEngine`]
pub struct FlowViewerApp {
    engine: DiagramEngine,

    /// Surface the engine presents to; painted every frame
    slot: FrameSlot,

    /// Whether the initial fit has happened
    fitted: bool,

    /// Canvas size in the previous frame
    canvas_size: egui::Vec2,

    pointer_inside: bool,

    /// Status text for "set status" on the selection
    status_input: String,

    /// Most recent scene events, newest last
    event_lines: VecDeque<String>,

    /// Status message (for user feedback)
    status_message: Option<String>,
}

impl FlowViewerApp {
    pub fn new(mut engine: DiagramEngine) -> Self {
        let slot = FrameSlot::new();
        engine.attach(Box::new(slot.clone()));
        Self {
            engine,
            slot,
            fitted: false,
            canvas_size: egui::Vec2::ZERO,
            pointer_inside: false,
            status_input: String::new(),
            event_lines: VecDeque::new(),
            status_message: None,
        }
    }

    /// Build the viewer from a payload and configuration
    pub fn from_payload(config: EngineConfig, payload: &GraphPayload) -> Result<Self> {
        let engine = DiagramEngine::with_payload(config, payload)
            .context("Failed to load graph into the viewer")?;
        Ok(Self::new(engine))
    }

    fn copy_disabled(&mut self) {
        let disabled = self.engine.serialize_disabled();
        match copy_to_clipboard(&disabled) {
            Ok(()) => self.status_message = Some(format!("Copied: {}", disabled)),
            Err(e) => self.status_message = Some(format!("Clipboard error: {}", e)),
        }
    }

    fn collect_events(&mut self) {
        for event in self.engine.drain_events() {
            let line = match event.event {
                EventType::NodeAdded { id, status } => format!("added {} ({})", id, status),
                EventType::EdgeAdded { from, to } => format!("edge {} -> {}", from, to),
                EventType::SelectionChanged { new_id, .. } => match new_id {
                    Some(id) => format!("selected {}", id),
                    None => "selection cleared".to_string(),
                },
                EventType::EnabledChanged { ids, enabled } => format!(
                    "{} {}",
                    if enabled { "enabled" } else { "disabled" },
                    ids.join(", ")
                ),
                EventType::StatusChanged { ids, status } => {
                    format!("{} -> {}", ids.join(", "), status)
                }
            };
            let line = format!("{} {}", event.timestamp.format("%H:%M:%S"), line);
            self.event_lines.push_back(line);
            if self.event_lines.len() > MAX_EVENT_LINES {
                self.event_lines.pop_front();
            }
        }
    }

    /// Render the entire UI
    fn render_ui(&mut self, ctx: &egui::Context) {
        if !ctx.wants_keyboard_input() && ctx.input(|i| i.key_pressed(egui::Key::E)) {
            self.engine.toggle_edit_mode();
        }

        egui::SidePanel::right("actions").show(ctx, |ui| {
            self.render_actions_panel(ui);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("zoom {:.2}", self.engine.viewport().scale()));
                ui.separator();
                ui.label(if self.engine.edit_mode() {
                    "edit mode"
                } else {
                    "view mode"
                });
                if let Some(msg) = &self.status_message {
                    ui.separator();
                    ui.label(msg);
                }
            });
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::from_gray(40)))
            .show(ctx, |ui| {
                self.render_canvas(ui);
            });

        self.collect_events();
    }

    fn render_actions_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Flow");

        let mut edit_mode = self.engine.edit_mode();
        if ui.checkbox(&mut edit_mode, "Edit mode (E)").changed() {
            self.engine.set_edit_mode(edit_mode);
        }

        ui.horizontal(|ui| {
            if ui.button("Reset view").clicked() {
                self.engine
                    .reset_to_fit(self.canvas_size.x as f64, self.canvas_size.y as f64);
            }
            if ui.button("+").clicked() {
                self.engine.click_zoom(true);
            }
            if ui.button("-").clicked() {
                self.engine.click_zoom(false);
            }
        });

        ui.separator();
        ui.label(format!(
            "Selected: {}",
            self.engine.selected_id().unwrap_or("none")
        ));

        let has_selection = self.engine.selected_id().is_some();
        ui.add_enabled_ui(has_selection, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Enable").clicked() {
                    self.engine.enable_selected();
                }
                if ui.button("Disable").clicked() {
                    self.engine.disable_selected();
                }
            });
            if ui.button("Disable all ancestors").clicked() {
                self.engine.disable_ancestors();
            }
            ui.horizontal(|ui| {
                ui.text_edit_singleline(&mut self.status_input);
                if ui.button("Set status").clicked() && !self.status_input.is_empty() {
                    self.engine.set_selected_status(&self.status_input);
                }
            });
            if ui.button("Center on selection").clicked() {
                if let Some(id) = self.engine.selected_id().map(str::to_string) {
                    self.engine.select_and_center(&id);
                }
            }
        });
        if ui.button("Enable all").clicked() {
            self.engine.enable_all();
        }

        ui.separator();
        ui.label("Disabled:");
        ui.monospace(self.engine.serialize_disabled());
        if ui.button("📋 Copy disabled set").clicked() {
            self.copy_disabled();
        }

        ui.separator();
        ui.label("Events:");
        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .max_height(240.0)
            .show(ui, |ui| {
                for line in &self.event_lines {
                    ui.small(line);
                }
            });
    }

    /// Forward pointer input to the engine and paint the latest frame
    fn render_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let canvas_rect = response.rect;
        let size = canvas_rect.size();

        if !self.fitted && size.x > 0.0 && size.y > 0.0 {
            self.engine.reset_to_fit(size.x as f64, size.y as f64);
            self.fitted = true;
        } else if size != self.canvas_size {
            self.engine.resize(size.x as f64, size.y as f64);
        }
        self.canvas_size = size;

        let hovered = response.hovered();
        if hovered != self.pointer_inside {
            if hovered {
                self.engine.pointer_entered_surface();
            } else {
                self.engine.pointer_left_surface();
            }
            self.pointer_inside = hovered;
        }

        let (pressed, released, pointer, scroll) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.latest_pos(),
                i.raw_scroll_delta.y,
            )
        });
        let local = pointer.map(|p| to_local(p, canvas_rect));

        if let Some(pos) = local {
            if hovered && self.engine.interaction().is_idle() {
                self.engine.hover_at(pos);
            }
        }

        if pressed && hovered {
            if let (Some(p), Some(pos)) = (pointer, local) {
                let track = self.slider_track(canvas_rect);
                if self.slider_handle(canvas_rect).contains(p) {
                    self.engine.slider_grab(pos);
                } else if track.expand2(vec2(6.0, 0.0)).contains(p) {
                    self.engine.slider_click((p.y - track.top()) as f64);
                } else {
                    self.engine.pointer_down(pos);
                }
            }
        }

        if !self.engine.interaction().is_idle() {
            if let Some(pos) = local {
                self.engine.pointer_move(pos);
            }
        }

        if released {
            self.engine.pointer_up();
        }

        if scroll != 0.0 {
            if let Some(pos) = local {
                let steps = if scroll > 0.0 { 1 } else { -1 };
                self.engine.wheel(steps, pos);
            }
        }

        if let Some(frame) = self.slot.latest() {
            self.draw_frame(&painter, canvas_rect, &frame);
            self.draw_slider(&painter, canvas_rect, &frame);
        }
    }

    fn draw_frame(&self, painter: &egui::Painter, canvas_rect: Rect, frame: &RenderFrame) {
        let painter = painter.with_clip_rect(canvas_rect);
        let scale = frame.transform.scale as f32;

        for edge in &frame.edges {
            let start = to_screen(edge.start, canvas_rect);
            let end = to_screen(edge.end, canvas_rect);
            draw_arrow(&painter, start, end, to_color32(edge.color, 1.0), scale);
        }

        for node in &frame.nodes {
            let min = to_screen(node.rect.min, canvas_rect);
            let rect = Rect::from_min_size(
                min,
                vec2(node.rect.size.width as f32, node.rect.size.height as f32),
            );
            let stroke_width = (if node.selected { 3.0 } else { 1.5 }) * scale.max(0.5);
            painter.rect(
                rect,
                4.0 * scale,
                to_color32(node.fill, node.opacity),
                Stroke::new(stroke_width, to_color32(node.stroke, node.opacity)),
            );
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                &node.label,
                FontId::monospace(10.0 * scale),
                to_color32(node.label_color, node.opacity),
            );
        }
    }

    fn draw_slider(&self, painter: &egui::Painter, canvas_rect: Rect, frame: &RenderFrame) {
        let track = self.slider_track(canvas_rect);
        painter.rect_filled(track, 3.0, Color32::from_gray(90));

        let handle = Rect::from_center_size(
            pos2(track.center().x, track.top() + frame.slider as f32 * track.height()),
            HANDLE_SIZE,
        );
        painter.rect(handle, 2.0, Color32::from_gray(200), Stroke::new(1.0, Color32::BLACK));

        if frame.edit_mode {
            painter.text(
                canvas_rect.right_top() + vec2(-12.0, 12.0),
                Align2::RIGHT_TOP,
                "EDIT",
                FontId::proportional(14.0),
                Color32::from_rgb(255, 200, 0),
            );
        }
    }

    fn slider_track(&self, canvas_rect: Rect) -> Rect {
        let length = self.engine.slider().config().track_length as f32;
        Rect::from_min_size(canvas_rect.min + SLIDER_OFFSET, vec2(SLIDER_WIDTH, length))
    }

    fn slider_handle(&self, canvas_rect: Rect) -> Rect {
        let track = self.slider_track(canvas_rect);
        let y = track.top() + self.engine.slider().normalized() as f32 * track.height();
        Rect::from_center_size(pos2(track.center().x, y), HANDLE_SIZE)
    }
}

impl eframe::App for FlowViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.render_ui(ctx);
    }
}

impl Drop for FlowViewerApp {
    fn drop(&mut self) {
        self.engine.detach();
    }
}

/// Draw an edge with an arrowhead at its target end
fn draw_arrow(painter: &egui::Painter, start: Pos2, end: Pos2, color: Color32, scale: f32) {
    let stroke = Stroke::new(1.5 * scale.max(0.5), color);
    painter.line_segment([start, end], stroke);

    let delta = end - start;
    if delta.length() < f32::EPSILON {
        return;
    }
    let dir = delta.normalized();
    let perpendicular = vec2(-dir.y, dir.x);
    let arrow_size = 8.0 * scale.max(0.5);

    let point1 = end - dir * arrow_size + perpendicular * arrow_size * 0.5;
    let point2 = end - dir * arrow_size - perpendicular * arrow_size * 0.5;
    painter.add(PathShape::convex_polygon(
        vec![end, point1, point2],
        color,
        Stroke::NONE,
    ));
}

fn to_local(pos: Pos2, canvas_rect: Rect) -> Point {
    Point::new(
        (pos.x - canvas_rect.min.x) as f64,
        (pos.y - canvas_rect.min.y) as f64,
    )
}

fn to_screen(p: Point, canvas_rect: Rect) -> Pos2 {
    pos2(
        canvas_rect.min.x + p.x as f32,
        canvas_rect.min.y + p.y as f32,
    )
}

fn to_color32(color: Color, opacity: f32) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a).gamma_multiply(opacity)
}

/// Copy text to clipboard
fn copy_to_clipboard(text: &str) -> std::result::Result<(), String> {
    use arboard::Clipboard;
    let mut clipboard = Clipboard::new().map_err(|e| format!("{}", e))?;
    clipboard.set_text(text).map_err(|e| format!("{}", e))?;
    Ok(())
}
