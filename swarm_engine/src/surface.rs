//! Immediate-mode 2D drawing surface.
//!
//! The engine only ever draws flat primitives: full-surface fades, filled
//! circles and rectangles, stroked lines, polylines and quadratic curves,
//! and short text runs. Every call carries its own colour and opacity; there
//! is no retained state between calls.

/// Canvas dimensions in pixels. Never negative or non-finite.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CanvasSize {
    pub width:  f32,
    pub height: f32,
}

impl CanvasSize {
    pub fn new(width: f32, height: f32) -> Self {
        let clean = |v: f32| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        CanvasSize { width: clean(width), height: clean(height) }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Quadratic Bézier flattening resolution.
pub const CURVE_SEGMENTS: usize = 16;

#[allow(clippy::too_many_arguments)]
pub trait Surface {
    fn size(&self) -> CanvasSize;

    /// Cover the whole surface with `color` at opacity `alpha`.
    fn fill(&mut self, color: u32, alpha: f32);

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: u32, alpha: f32);

    fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: u32, alpha: f32);

    /// Round-capped line segment.
    fn stroke_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, width: f32, color: u32, alpha: f32);

    /// Text with its top-left corner at `(x, y)`, glyphs `px` tall.
    fn fill_text(&mut self, text: &str, x: f32, y: f32, px: f32, color: u32, alpha: f32);

    fn text_width(&self, text: &str, px: f32) -> f32;

    fn stroke_polyline(&mut self, points: &[(f32, f32)], closed: bool, width: f32, color: u32, alpha: f32) {
        for pair in points.windows(2) {
            let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
            self.stroke_line(x0, y0, x1, y1, width, color, alpha);
        }
        if closed && points.len() > 2 {
            let (x0, y0) = points[points.len() - 1];
            let (x1, y1) = points[0];
            self.stroke_line(x0, y0, x1, y1, width, color, alpha);
        }
    }

    fn stroke_quadratic(
        &mut self,
        from: (f32, f32),
        ctrl: (f32, f32),
        to: (f32, f32),
        width: f32,
        color: u32,
        alpha: f32,
    ) {
        let pts: Vec<(f32, f32)> = (0..=CURVE_SEGMENTS)
            .map(|i| quadratic_point(from, ctrl, to, i as f32 / CURVE_SEGMENTS as f32))
            .collect();
        self.stroke_polyline(&pts, false, width, color, alpha);
    }

    /// Horizontally centred text.
    fn fill_text_centered(&mut self, text: &str, cx: f32, y: f32, px: f32, color: u32, alpha: f32) {
        let w = self.text_width(text, px);
        self.fill_text(text, cx - w * 0.5, y, px, color, alpha);
    }
}

pub fn quadratic_point(p0: (f32, f32), c: (f32, f32), p1: (f32, f32), t: f32) -> (f32, f32) {
    let u = 1.0 - t;
    (
        u * u * p0.0 + 2.0 * u * t * c.0 + t * t * p1.0,
        u * u * p0.1 + 2.0 * u * t * c.1 + t * t * p1.1,
    )
}

// ════════════════════════════════════════════════════════════════════════════
// RecordingSurface: captures draw calls instead of rasterising
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    Fill   { color: u32, alpha: f32 },
    Rect   { x: f32, y: f32, w: f32, h: f32, color: u32, alpha: f32 },
    Circle { x: f32, y: f32, r: f32, color: u32, alpha: f32 },
    Line   { from: (f32, f32), to: (f32, f32), width: f32, color: u32, alpha: f32 },
    Text   { text: String, x: f32, y: f32, px: f32, color: u32, alpha: f32 },
}

/// In-memory [`Surface`] that logs every primitive; used by tests and
/// anything that wants to inspect a frame without pixels.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    size:      CanvasSize,
    pub calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new(size: CanvasSize) -> Self {
        RecordingSurface { size, calls: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn circles(&self) -> impl Iterator<Item = &DrawCall> {
        self.calls.iter().filter(|c| matches!(c, DrawCall::Circle { .. }))
    }

    pub fn lines(&self) -> impl Iterator<Item = &DrawCall> {
        self.calls.iter().filter(|c| matches!(c, DrawCall::Line { .. }))
    }

    pub fn texts(&self) -> impl Iterator<Item = &DrawCall> {
        self.calls.iter().filter(|c| matches!(c, DrawCall::Text { .. }))
    }
}

#[allow(clippy::too_many_arguments)]
impl Surface for RecordingSurface {
    fn size(&self) -> CanvasSize {
        self.size
    }

    fn fill(&mut self, color: u32, alpha: f32) {
        self.calls.push(DrawCall::Fill { color, alpha });
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: u32, alpha: f32) {
        self.calls.push(DrawCall::Rect { x, y, w, h, color, alpha });
    }

    fn fill_circle(&mut self, x: f32, y: f32, r: f32, color: u32, alpha: f32) {
        self.calls.push(DrawCall::Circle { x, y, r, color, alpha });
    }

    fn stroke_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, width: f32, color: u32, alpha: f32) {
        self.calls.push(DrawCall::Line { from: (x0, y0), to: (x1, y1), width, color, alpha });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, px: f32, color: u32, alpha: f32) {
        self.calls.push(DrawCall::Text { text: text.to_string(), x, y, px, color, alpha });
    }

    fn text_width(&self, text: &str, px: f32) -> f32 {
        text.chars().count() as f32 * px * 0.6
    }
}
