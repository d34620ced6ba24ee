use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// A position, either in model space or in screen space
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: Point) -> f64 {
        (*self - other).length()
    }
}

/// A displacement between two points
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl Add<Vector> for Point {
    type Output = Point;

    fn add(self, v: Vector) -> Point {
        Point::new(self.x + v.x, self.y + v.y)
    }
}

impl Sub for Point {
    type Output = Vector;

    fn sub(self, other: Point) -> Vector {
        Vector::new(self.x - other.x, self.y - other.y)
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, other: Vector) -> Vector {
        Vector::new(self.x + other.x, self.y + other.y)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;

    fn mul(self, factor: f64) -> Vector {
        Vector::new(self.x * factor, self.y * factor)
    }
}

/// Width and height of a box
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Half-width and half-height
    pub fn half(&self) -> Vector {
        Vector::new(self.width / 2.0, self.height / 2.0)
    }

    /// Grow both dimensions by `amount`
    pub fn grown(&self, amount: f64) -> Size {
        Size::new(self.width + amount, self.height + amount)
    }
}

/// Axis-aligned rectangle given by its top-left corner and size
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub min: Point,
    pub size: Size,
}

impl Rect {
    pub fn centered(center: Point, size: Size) -> Self {
        let half = size.half();
        Self {
            min: Point::new(center.x - half.x, center.y - half.y),
            size,
        }
    }

    pub fn max(&self) -> Point {
        Point::new(self.min.x + self.size.width, self.min.y + self.size.height)
    }

    pub fn center(&self) -> Point {
        self.min + self.size.half()
    }

    /// Check if this rectangle contains a point (edges inclusive)
    pub fn contains(&self, p: Point) -> bool {
        let max = self.max();
        p.x >= self.min.x && p.x <= max.x && p.y >= self.min.y && p.y <= max.y
    }
}

/// Translate-then-scale transform: `screen = translate + scale * model`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Transform {
    pub translate: Vector,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translate: Vector::ZERO,
        scale: 1.0,
    };

    /// Compose a translation and a scale into a single transform
    pub fn new(translate: Vector, scale: f64) -> Self {
        Self { translate, scale }
    }

    /// Pure translation
    pub fn translation(delta: Vector) -> Self {
        Self::new(delta, 1.0)
    }

    /// Scale by `factor` around the fixed point `focus`
    pub fn scaling_about(factor: f64, focus: Point) -> Self {
        Self::new(
            Vector::new(focus.x - factor * focus.x, focus.y - factor * focus.y),
            factor,
        )
    }

    /// Map a model-space point to screen space
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.translate.x + self.scale * p.x,
            self.translate.y + self.scale * p.y,
        )
    }

    /// Map a screen-space point back to model space
    pub fn invert(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.translate.x) / self.scale,
            (p.y - self.translate.y) / self.scale,
        )
    }

    /// The transform that applies `self` first and `next` afterwards
    pub fn then(&self, next: &Transform) -> Transform {
        Transform::new(
            Vector::new(
                next.translate.x + next.scale * self.translate.x,
                next.translate.y + next.scale * self.translate.y,
            ),
            next.scale * self.scale,
        )
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "translate({},{}) scale({})",
            self.translate.x, self.translate.y, self.scale
        )
    }
}

/// Zoom `prior` by `factor` while keeping the screen point `focus` fixed.
///
/// `translate' = factor * translate + focus - factor * focus`
pub fn apply_zoom(factor: f64, focus: Point, prior: &Transform) -> Transform {
    prior.then(&Transform::scaling_about(factor, focus))
}

/// Where the segment from `outer` toward `inner` crosses the boundary of the
/// box centered on `inner` with the given half extents.
///
/// `outer` and `inner` must not coincide; no tolerance is applied to the
/// slope comparisons.
pub fn intersect_line_with_boundary(outer: Point, inner: Point, half: Vector) -> Point {
    let dx = outer.x - inner.x;
    let dy = outer.y - inner.y;

    if dy == 0.0 {
        let x = if dx > 0.0 {
            inner.x + half.x
        } else {
            inner.x - half.x
        };
        return Point::new(x, inner.y);
    }
    if dx == 0.0 {
        let y = if dy > 0.0 {
            inner.y + half.y
        } else {
            inner.y - half.y
        };
        return Point::new(inner.x, y);
    }

    let box_slope = half.y / half.x;
    let m = dy / dx;
    let inverse_m = dx / dy;
    // Mirror the right-hand solution when the outer point lies to the left
    let sign = if dx > 0.0 { 1.0 } else { -1.0 };

    if m > box_slope {
        // bottom side on the right, top side on the left
        Point::new(
            inner.x + sign * inverse_m * half.y,
            inner.y + sign * half.y,
        )
    } else if m < -box_slope {
        Point::new(
            inner.x - sign * inverse_m * half.y,
            inner.y - sign * half.y,
        )
    } else {
        Point::new(inner.x + sign * half.x, inner.y + sign * m * half.x)
    }
}

/// Extents of every node footprint added so far
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl BoundingBox {
    pub const EMPTY: BoundingBox = BoundingBox {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
    };

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Expand to include a footprint centered on `point`
    pub fn accumulate(&mut self, point: Point, half_x: f64, half_y: f64) {
        self.min_x = self.min_x.min(point.x - half_x);
        self.max_x = self.max_x.max(point.x + half_x);
        self.min_y = self.min_y.min(point.y - half_y);
        self.max_y = self.max_y.max(point.y + half_y);
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    #[test]
    fn test_intersect_axis_aligned() {
        let inner = Point::new(0.0, 0.0);
        let half = Vector::new(20.0, 10.0);

        assert_eq!(
            intersect_line_with_boundary(Point::new(100.0, 0.0), inner, half),
            Point::new(20.0, 0.0)
        );
        assert_eq!(
            intersect_line_with_boundary(Point::new(-100.0, 0.0), inner, half),
            Point::new(-20.0, 0.0)
        );
        assert_eq!(
            intersect_line_with_boundary(Point::new(0.0, 50.0), inner, half),
            Point::new(0.0, 10.0)
        );
        assert_eq!(
            intersect_line_with_boundary(Point::new(0.0, -50.0), inner, half),
            Point::new(0.0, -10.0)
        );
    }

    #[test]
    fn test_intersect_picks_side_by_slope() {
        let inner = Point::new(10.0, 10.0);
        let half = Vector::new(20.0, 10.0);

        // Shallow line from the right lands on the right side
        let p = intersect_line_with_boundary(Point::new(110.0, 20.0), inner, half);
        assert!(close(p, Point::new(30.0, 12.0)));

        // Steep line from below-right lands on the bottom side
        let p = intersect_line_with_boundary(Point::new(20.0, 110.0), inner, half);
        assert!(close(p, Point::new(11.0, 20.0)));

        // Steep line from above-left lands on the top side
        let p = intersect_line_with_boundary(Point::new(0.0, -90.0), inner, half);
        assert!(close(p, Point::new(9.0, 0.0)));

        // Shallow line from the left lands on the left side
        let p = intersect_line_with_boundary(Point::new(-90.0, 0.0), inner, half);
        assert!(close(p, Point::new(-10.0, 8.0)));
    }

    #[test]
    fn test_transform_display() {
        let t = Transform::new(Vector::new(10.0, -5.5), 2.0);
        assert_eq!(t.to_string(), "translate(10,-5.5) scale(2)");
    }

    #[test]
    fn test_transform_invert() {
        let t = Transform::new(Vector::new(40.0, 12.0), 0.5);
        let model = Point::new(7.0, -3.0);
        assert!(close(t.invert(t.apply(model)), model));
    }

    #[test]
    fn test_apply_zoom_formula() {
        let prior = Transform::new(Vector::new(10.0, 20.0), 1.5);
        let focus = Point::new(100.0, 50.0);
        let zoomed = apply_zoom(2.0, focus, &prior);

        assert!((zoomed.scale - 3.0).abs() < EPS);
        assert!((zoomed.translate.x - (2.0 * 10.0 + 100.0 - 2.0 * 100.0)).abs() < EPS);
        assert!((zoomed.translate.y - (2.0 * 20.0 + 50.0 - 2.0 * 50.0)).abs() < EPS);
    }

    #[test]
    fn test_bounding_box_accumulate() {
        let mut bounds = BoundingBox::EMPTY;
        assert!(bounds.is_empty());

        bounds.accumulate(Point::new(0.0, 0.0), 10.0, 5.0);
        bounds.accumulate(Point::new(100.0, 40.0), 20.0, 5.0);

        assert!(!bounds.is_empty());
        assert_eq!(bounds.min_x, -10.0);
        assert_eq!(bounds.max_x, 120.0);
        assert_eq!(bounds.min_y, -5.0);
        assert_eq!(bounds.max_y, 45.0);
        assert_eq!(bounds.width(), 130.0);
        assert_eq!(bounds.height(), 50.0);
    }

    proptest! {
        #[test]
        fn intersection_lies_on_box_boundary(
            ox in -500.0f64..500.0,
            oy in -500.0f64..500.0,
            ix in -500.0f64..500.0,
            iy in -500.0f64..500.0,
            hw in 1.0f64..80.0,
            hh in 1.0f64..40.0,
        ) {
            let outer = Point::new(ox, oy);
            let inner = Point::new(ix, iy);
            prop_assume!(outer != inner);

            let p = intersect_line_with_boundary(outer, inner, Vector::new(hw, hh));
            let ex = (p.x - ix).abs();
            let ey = (p.y - iy).abs();
            let tol = 1e-6;

            let on_vertical_side = (ex - hw).abs() < tol && ey <= hh + tol;
            let on_horizontal_side = (ey - hh).abs() < tol && ex <= hw + tol;
            prop_assert!(on_vertical_side || on_horizontal_side);

            // Same direction as the segment toward the outer point
            let dot = (p.x - ix) * (ox - ix) + (p.y - iy) * (oy - iy);
            prop_assert!(dot > 0.0);
        }

        #[test]
        fn composed_steps_match_sequential_application(
            px in -200.0f64..200.0,
            py in -200.0f64..200.0,
            dx in -50.0f64..50.0,
            dy in -50.0f64..50.0,
            factor in 0.25f64..4.0,
            fx in 0.0f64..800.0,
            fy in 0.0f64..600.0,
        ) {
            let model = Point::new(px, py);
            let start = Transform::new(Vector::new(3.0, 4.0), 1.2);
            let pan = Transform::translation(Vector::new(dx, dy));
            let zoom = Transform::scaling_about(factor, Point::new(fx, fy));

            let composed = start.then(&pan).then(&zoom).then(&pan);
            let sequential = pan.apply(zoom.apply(pan.apply(start.apply(model))));

            prop_assert!((composed.apply(model).x - sequential.x).abs() < 1e-6);
            prop_assert!((composed.apply(model).y - sequential.y).abs() < 1e-6);
        }
    }
}
