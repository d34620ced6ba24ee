use crate::config::ZoomPolicy;
use crate::geometry::{apply_zoom, BoundingBox, Point, Size, Transform, Vector};
use tracing::{debug, trace};

/// Pan offset and zoom scale of the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    transform: Transform,
    policy: ZoomPolicy,
}

impl Viewport {
    pub fn new(policy: ZoomPolicy) -> Self {
        Self {
            transform: Transform::IDENTITY,
            policy,
        }
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn scale(&self) -> f64 {
        self.transform.scale
    }

    pub fn translate(&self) -> Vector {
        self.transform.translate
    }

    pub fn policy(&self) -> &ZoomPolicy {
        &self.policy
    }

    /// Convert model coordinates to screen coordinates
    pub fn model_to_screen(&self, p: Point) -> Point {
        self.transform.apply(p)
    }

    /// Convert screen coordinates to model coordinates
    pub fn screen_to_model(&self, p: Point) -> Point {
        self.transform.invert(p)
    }

    /// Frame the graph once: scale to `fit_ratio` of the viewport height
    /// (clamped to the reset bounds), center horizontally, and put the
    /// graph top at `top_margin`.
    ///
    /// Returns `false` and leaves the transform alone for an empty graph.
    pub fn reset_to_fit(&mut self, bounds: &BoundingBox, width: f64, height: f64) -> bool {
        if bounds.is_empty() {
            return false;
        }
        let graph_width = bounds.width();
        let graph_height = bounds.height();

        let scale = if graph_height > 0.0 {
            (height / graph_height) * self.policy.fit_ratio
        } else {
            self.policy.max_scale_on_reset
        };
        let scale = scale.clamp(self.policy.min_scale_on_reset, self.policy.max_scale_on_reset);

        let translate = Vector::new(
            (width - graph_width * scale) / 2.0 - bounds.min_x * scale,
            self.policy.top_margin - bounds.min_y * scale,
        );
        self.transform = Transform::new(translate, scale);
        debug!(transform = %self.transform, "viewport reset to fit");
        true
    }

    /// Shift the view by a screen-space delta
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.transform = self
            .transform
            .then(&Transform::translation(Vector::new(dx, dy)));
        trace!(transform = %self.transform, "pan");
    }

    /// Multiply the scale by `factor` keeping the screen point `focus` fixed.
    ///
    /// Refused when already past `max_zoom` and zooming in, or below
    /// `min_zoom` and zooming out. Returns whether the zoom was applied.
    pub fn zoom_at(&mut self, factor: f64, focus: Point) -> bool {
        let scale = self.transform.scale;
        if (scale > self.policy.max_zoom && factor > 1.0)
            || (scale < self.policy.min_zoom && factor < 1.0)
        {
            trace!(scale, factor, "zoom refused at bound");
            return false;
        }
        self.transform = apply_zoom(factor, focus, &self.transform);
        trace!(transform = %self.transform, "zoom");
        true
    }

    /// Jump to an absolute scale around `focus`, ignoring zoom bounds
    pub fn set_scale_at(&mut self, scale: f64, focus: Point) {
        let factor = scale / self.transform.scale;
        self.transform = apply_zoom(factor, focus, &self.transform);
    }

    /// Slider zoom: `percent` in `[0, 1]` maps to
    /// `min_zoom + (max_zoom - min_zoom) * percent²`, centered on the viewport.
    pub fn zoom_to_percent(&mut self, percent: f64, viewport: Size) {
        let span = self.policy.max_zoom - self.policy.min_zoom;
        let scale = self.policy.min_zoom + span * percent.powi(2);
        let center = Point::new(viewport.width / 2.0, viewport.height / 2.0);
        self.set_scale_at(scale, center);
        trace!(percent, scale, "slider zoom");
    }

    /// Position of the current scale inside `[min_zoom, max_zoom]`, `0..=1`
    pub fn zoom_percent(&self) -> f64 {
        let span = self.policy.max_zoom - self.policy.min_zoom;
        ((self.transform.scale - self.policy.min_zoom) / span).clamp(0.0, 1.0)
    }

    /// Compound wheel factor for a number of notches; positive zooms in
    pub fn wheel_factor(&self, steps: i32) -> f64 {
        if steps >= 0 {
            self.policy.wheel_in_factor.powi(steps)
        } else {
            self.policy.wheel_out_factor.powi(-steps)
        }
    }

    /// Pan so that a model point lands on the viewport center
    pub fn center_on(&mut self, model: Point, viewport: Size) {
        let scale = self.transform.scale;
        self.transform.translate = Vector::new(
            viewport.width / 2.0 - scale * model.x,
            viewport.height / 2.0 - scale * model.y,
        );
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(ZoomPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn single_node_bounds(x: f64, y: f64) -> BoundingBox {
        let mut bounds = BoundingBox::EMPTY;
        bounds.accumulate(Point::new(x, y), 23.0, 15.0);
        bounds
    }

    #[test]
    fn test_pan_is_additive_and_scale_independent() {
        let mut viewport = Viewport::default();
        viewport.zoom_at(2.0, Point::new(0.0, 0.0));
        viewport.pan(10.0, -4.0);
        viewport.pan(5.0, 1.0);

        assert_eq!(viewport.translate(), Vector::new(15.0, -3.0));
        assert_eq!(viewport.scale(), 2.0);
    }

    #[test]
    fn test_reset_single_node_centers_horizontally() {
        let mut viewport = Viewport::default();
        let bounds = single_node_bounds(340.0, 75.0);

        assert!(viewport.reset_to_fit(&bounds, 800.0, 600.0));

        let policy = *viewport.policy();
        assert!(viewport.scale() >= policy.min_scale_on_reset);
        assert!(viewport.scale() <= policy.max_scale_on_reset);

        let screen = viewport.model_to_screen(Point::new(340.0, 75.0));
        assert!((screen.x - 400.0).abs() < EPS);

        // Graph top sits at the margin
        let top = viewport.model_to_screen(Point::new(340.0, bounds.min_y));
        assert!((top.y - policy.top_margin).abs() < EPS);
    }

    #[test]
    fn test_reset_clamps_scale() {
        let mut viewport = Viewport::default();

        // Very tall graph: fit scale would be tiny
        let mut tall = BoundingBox::EMPTY;
        tall.accumulate(Point::new(0.0, 0.0), 10.0, 10.0);
        tall.accumulate(Point::new(0.0, 10_000.0), 10.0, 10.0);
        viewport.reset_to_fit(&tall, 800.0, 600.0);
        assert_eq!(viewport.scale(), 0.6);

        // Fits unclamped: 600 / 400 * 0.8 = 1.2
        let mut medium = BoundingBox::EMPTY;
        medium.accumulate(Point::new(0.0, 0.0), 10.0, 0.0);
        medium.accumulate(Point::new(0.0, 400.0), 10.0, 0.0);
        viewport.reset_to_fit(&medium, 800.0, 600.0);
        assert!((viewport.scale() - 1.2).abs() < EPS);
    }

    #[test]
    fn test_reset_empty_graph_is_noop() {
        let mut viewport = Viewport::default();
        viewport.pan(3.0, 3.0);
        assert!(!viewport.reset_to_fit(&BoundingBox::EMPTY, 800.0, 600.0));
        assert_eq!(viewport.translate(), Vector::new(3.0, 3.0));
    }

    #[test]
    fn test_reset_ignores_zoom_bounds() {
        let policy = ZoomPolicy {
            max_zoom: 1.0,
            ..ZoomPolicy::default()
        };
        let mut viewport = Viewport::new(policy);
        viewport.reset_to_fit(&single_node_bounds(0.0, 0.0), 800.0, 600.0);
        assert_eq!(viewport.scale(), 2.0);
    }

    #[test]
    fn test_zoom_rejected_past_bounds() {
        let mut viewport = Viewport::default();
        let focus = Point::new(100.0, 100.0);

        // Climb past max_zoom; the step that crosses the bound is still applied
        while viewport.scale() <= 10.0 {
            assert!(viewport.zoom_at(1.5, focus));
        }
        let at_max = viewport.scale();
        assert!(!viewport.zoom_at(1.5, focus));
        assert_eq!(viewport.scale(), at_max);

        // Zooming back out is still allowed
        assert!(viewport.zoom_at(0.5, focus));

        let mut viewport = Viewport::default();
        while viewport.scale() >= 0.2 {
            assert!(viewport.zoom_at(0.5, focus));
        }
        assert!(!viewport.zoom_at(0.9, focus));
        assert!(viewport.zoom_at(1.1, focus));
    }

    #[test]
    fn test_zoom_to_percent_uses_squared_easing() {
        let mut viewport = Viewport::default();
        let size = Size::new(800.0, 600.0);

        viewport.zoom_to_percent(0.5, size);
        assert!((viewport.scale() - (0.2 + 9.8 * 0.25)).abs() < EPS);
        assert!((viewport.zoom_percent() - 0.25).abs() < EPS);

        // Recentered on the viewport center, not a cursor
        let before = viewport.screen_to_model(Point::new(400.0, 300.0));
        viewport.zoom_to_percent(0.9, size);
        let after = viewport.model_to_screen(before);
        assert!((after.x - 400.0).abs() < 1e-6);
        assert!((after.y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_wheel_factor() {
        let viewport = Viewport::default();
        assert!((viewport.wheel_factor(2) - 1.05 * 1.05).abs() < EPS);
        assert!((viewport.wheel_factor(-3) - 0.95f64.powi(3)).abs() < EPS);
        assert_eq!(viewport.wheel_factor(0), 1.0);
    }

    #[test]
    fn test_center_on() {
        let mut viewport = Viewport::default();
        viewport.zoom_at(3.0, Point::new(12.0, 40.0));
        viewport.center_on(Point::new(50.0, -20.0), Size::new(640.0, 480.0));

        let screen = viewport.model_to_screen(Point::new(50.0, -20.0));
        assert!((screen.x - 320.0).abs() < EPS);
        assert!((screen.y - 240.0).abs() < EPS);
    }

    #[test]
    fn test_pan_zoom_pan_composition() {
        let mut viewport = Viewport::default();
        let model = Point::new(37.0, -12.0);
        let focus = Point::new(250.0, 180.0);

        let s0 = viewport.model_to_screen(model);
        let s1 = Point::new(s0.x + 15.0, s0.y - 7.0);
        let s2 = Point::new(focus.x + 1.7 * (s1.x - focus.x), focus.y + 1.7 * (s1.y - focus.y));
        let s3 = Point::new(s2.x - 40.0, s2.y + 22.0);

        viewport.pan(15.0, -7.0);
        viewport.zoom_at(1.7, focus);
        viewport.pan(-40.0, 22.0);

        let actual = viewport.model_to_screen(model);
        assert!((actual.x - s3.x).abs() < 1e-9);
        assert!((actual.y - s3.y).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn zoom_compounds_and_keeps_focus_fixed(
            factors in prop::collection::vec(0.9f64..1.1, 1..12),
            fx in 0.0f64..1000.0,
            fy in 0.0f64..800.0,
        ) {
            let mut viewport = Viewport::default();
            viewport.pan(17.0, -9.0);
            let focus = Point::new(fx, fy);
            let initial = viewport.scale();
            let mut product = 1.0;

            for f in factors {
                let anchored = viewport.screen_to_model(focus);
                prop_assert!(viewport.zoom_at(f, focus));
                product *= f;

                let projected = viewport.model_to_screen(anchored);
                prop_assert!((projected.x - fx).abs() < 1e-6);
                prop_assert!((projected.y - fy).abs() < 1e-6);
            }

            prop_assert!((viewport.scale() - initial * product).abs() < 1e-9);
        }
    }
}
