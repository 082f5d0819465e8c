//! Software rasteriser: an ARGB pixel buffer that implements [`Surface`].
//!
//! Everything is drawn by per-pixel coverage tests against the bounding box
//! of the primitive; there is no anti-aliasing. Text uses a 3×5 bitmap font
//! scaled up in whole-pixel steps.

use swarm_engine::color::blend;
use swarm_engine::{CanvasSize, Surface};

/// Glyph cell is 3 columns plus one column of spacing.
const GLYPH_ADVANCE: usize = 4;
const GLYPH_ROWS:    usize = 5;

pub struct Framebuffer {
    width:  usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize, background: u32) -> Self {
        Framebuffer { width, height, pixels: vec![background; width * height] }
    }

    pub fn width(&self) -> usize  { self.width }
    pub fn height(&self) -> usize { self.height }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// Reallocate; the old contents are lost.
    pub fn resize(&mut self, width: usize, height: usize, background: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, background);
    }

    pub fn clear(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    /// Become a copy of `src`, dimensions included.
    pub fn copy_from(&mut self, src: &Framebuffer) {
        self.width = src.width;
        self.height = src.height;
        self.pixels.clear();
        self.pixels.extend_from_slice(&src.pixels);
    }

    /// Nearest-neighbour scale `src` into the rectangle at `(x, y)`.
    pub fn blit(&mut self, src: &Framebuffer, x: usize, y: usize, w: usize, h: usize) {
        if src.width == 0 || src.height == 0 {
            return;
        }
        for dy in 0..h {
            let ty = y + dy;
            if ty >= self.height {
                break;
            }
            let sy = dy * src.height / h.max(1);
            for dx in 0..w {
                let tx = x + dx;
                if tx >= self.width {
                    break;
                }
                let sx = dx * src.width / w.max(1);
                self.pixels[ty * self.width + tx] = src.pixels[sy * src.width + sx];
            }
        }
    }

    /// One-pixel rectangle outline.
    pub fn stroke_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 {
            return;
        }
        for i in x..x + w {
            self.blend_pixel(i as i64, y as i64, color, 1.0);
            self.blend_pixel(i as i64, (y + h - 1) as i64, color, 1.0);
        }
        for j in y..y + h {
            self.blend_pixel(x as i64, j as i64, color, 1.0);
            self.blend_pixel((x + w - 1) as i64, j as i64, color, 1.0);
        }
    }

    fn blend_pixel(&mut self, x: i64, y: i64, color: u32, alpha: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let i = y as usize * self.width + x as usize;
        self.pixels[i] = if alpha >= 1.0 { color | 0xFF00_0000 } else { blend(self.pixels[i], color, alpha) };
    }

    /// Clamp a float span to pixel indices; `None` when fully off-canvas.
    fn span(lo: f32, hi: f32, limit: usize) -> Option<(i64, i64)> {
        if !(lo.is_finite() && hi.is_finite()) || limit == 0 {
            return None;
        }
        let a = lo.floor().max(0.0) as i64;
        let b = hi.ceil().min(limit as f32 - 1.0) as i64;
        (a <= b).then_some((a, b))
    }
}

#[allow(clippy::too_many_arguments)]
impl Surface for Framebuffer {
    fn size(&self) -> CanvasSize {
        CanvasSize::new(self.width as f32, self.height as f32)
    }

    fn fill(&mut self, color: u32, alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        if alpha >= 1.0 {
            self.pixels.fill(color | 0xFF00_0000);
        } else {
            for px in self.pixels.iter_mut() {
                *px = blend(*px, color, alpha);
            }
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: u32, alpha: f32) {
        if alpha <= 0.0 || w <= 0.0 || h <= 0.0 {
            return;
        }
        let (Some((x0, x1)), Some((y0, y1))) =
            (Self::span(x, x + w - 1.0, self.width), Self::span(y, y + h - 1.0, self.height))
        else {
            return;
        };
        for py in y0..=y1 {
            for px in x0..=x1 {
                self.blend_pixel(px, py, color, alpha);
            }
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: u32, alpha: f32) {
        if alpha <= 0.0 || !(r > 0.0) {
            return;
        }
        // Sub-pixel dots still light the pixel they fall in.
        let r = r.max(0.5);
        let (Some((x0, x1)), Some((y0, y1))) =
            (Self::span(cx - r, cx + r, self.width), Self::span(cy - r, cy + r, self.height))
        else {
            return;
        };
        let r2 = r * r;
        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.blend_pixel(px, py, color, alpha);
                }
            }
        }
    }

    fn stroke_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, width: f32, color: u32, alpha: f32) {
        if alpha <= 0.0 || !(width > 0.0) {
            return;
        }
        let half = (width * 0.5).max(0.5);
        let (Some((bx0, bx1)), Some((by0, by1))) = (
            Self::span(x0.min(x1) - half, x0.max(x1) + half, self.width),
            Self::span(y0.min(y1) - half, y0.max(y1) + half, self.height),
        ) else {
            return;
        };
        let (dx, dy) = (x1 - x0, y1 - y0);
        let len2 = dx * dx + dy * dy;
        let half2 = half * half;
        for py in by0..=by1 {
            for px in bx0..=bx1 {
                let (qx, qy) = (px as f32 + 0.5, py as f32 + 0.5);
                let t = if len2 > 0.0 { (((qx - x0) * dx + (qy - y0) * dy) / len2).clamp(0.0, 1.0) } else { 0.0 };
                let (ex, ey) = (qx - (x0 + t * dx), qy - (y0 + t * dy));
                if ex * ex + ey * ey <= half2 {
                    self.blend_pixel(px, py, color, alpha);
                }
            }
        }
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, px: f32, color: u32, alpha: f32) {
        if alpha <= 0.0 || !x.is_finite() || !y.is_finite() {
            return;
        }
        let scale = glyph_scale(px) as i64;
        let mut cx = x.round() as i64;
        let top = y.round() as i64;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3i64 {
                    if bits & (1 << (2 - col)) == 0 {
                        continue;
                    }
                    for sy in 0..scale {
                        for sx in 0..scale {
                            self.blend_pixel(cx + col * scale + sx, top + row as i64 * scale + sy, color, alpha);
                        }
                    }
                }
            }
            cx += GLYPH_ADVANCE as i64 * scale;
            if cx >= self.width as i64 {
                break;
            }
        }
    }

    fn text_width(&self, text: &str, px: f32) -> f32 {
        (text.chars().count() * GLYPH_ADVANCE * glyph_scale(px)) as f32
    }
}

/// Whole-pixel magnification so a 5-row glyph is roughly `px` tall.
pub fn glyph_scale(px: f32) -> usize {
    if px.is_finite() { ((px / GLYPH_ROWS as f32).round() as usize).max(1) } else { 1 }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        '<' => [0b001, 0b010, 0b100, 0b010, 0b001],
        '>' => [0b100, 0b010, 0b001, 0b010, 0b100],
        '|' => [0b010, 0b010, 0b010, 0b010, 0b010],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        c if c.is_ascii() => [0b000, 0b000, 0b010, 0b000, 0b000],
        c => pseudo_glyph(c),
    }
}

/// Stable noise pattern for characters outside the font (the katakana rain).
fn pseudo_glyph(c: char) -> [u8; 5] {
    let mut h = (c as u32).wrapping_mul(0x9E37_79B9);
    let mut rows = [0u8; 5];
    for row in rows.iter_mut() {
        h ^= h >> 13;
        h = h.wrapping_mul(0x85EB_CA6B);
        *row = ((h >> 7) & 0b111) as u8;
    }
    if rows.iter().all(|&r| r == 0) {
        rows[2] = 0b010;
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarm_engine::color::{BLACK, WHITE};

    const RED: u32 = 0xFFFF0000;

    #[test]
    fn circle_covers_centre_not_corner() {
        let mut fb = Framebuffer::new(40, 40, BLACK);
        fb.fill_circle(20.0, 20.0, 5.0, RED, 1.0);
        assert_eq!(fb.pixel(20, 20), Some(RED));
        assert_eq!(fb.pixel(24, 20), Some(RED));
        assert_eq!(fb.pixel(26, 26), Some(BLACK));
        assert_eq!(fb.pixel(0, 0), Some(BLACK));
    }

    #[test]
    fn off_canvas_primitives_are_clipped() {
        let mut fb = Framebuffer::new(10, 10, BLACK);
        fb.fill_circle(-50.0, -50.0, 5.0, RED, 1.0);
        fb.fill_rect(20.0, 20.0, 5.0, 5.0, RED, 1.0);
        fb.stroke_line(f32::NAN, 0.0, 5.0, 5.0, 2.0, RED, 1.0);
        fb.fill_text("hello", 100.0, 100.0, 10.0, RED, 1.0);
        assert!(fb.pixels().iter().all(|&p| p == BLACK));
    }

    #[test]
    fn partial_fill_blends_toward_colour() {
        let mut fb = Framebuffer::new(4, 4, BLACK);
        fb.fill(WHITE, 0.5);
        let (r, g, b) = swarm_engine::color::channels(fb.pixels()[0]);
        assert!((127..=128).contains(&r) && r == g && g == b);
        fb.fill(RED, 1.0);
        assert!(fb.pixels().iter().all(|&p| p == RED));
    }

    #[test]
    fn line_hits_midpoint_and_respects_width() {
        let mut fb = Framebuffer::new(50, 50, BLACK);
        fb.stroke_line(5.0, 25.0, 45.0, 25.0, 3.0, RED, 1.0);
        assert_eq!(fb.pixel(25, 25), Some(RED));
        assert_eq!(fb.pixel(25, 24), Some(RED));
        assert_eq!(fb.pixel(25, 30), Some(BLACK));
    }

    #[test]
    fn text_width_scales_with_size() {
        let fb = Framebuffer::new(1, 1, BLACK);
        assert_eq!(fb.text_width("ab", 5.0), 8.0);
        assert_eq!(fb.text_width("ab", 10.0), 16.0);
        assert_eq!(fb.text_width("", 20.0), 0.0);
    }

    #[test]
    fn text_draws_glyph_pixels() {
        let mut fb = Framebuffer::new(20, 10, BLACK);
        fb.fill_text("1", 0.0, 0.0, 5.0, WHITE, 1.0);
        // '1' = 010 / 110 / 010 / 010 / 111
        assert_eq!(fb.pixel(1, 0), Some(WHITE));
        assert_eq!(fb.pixel(0, 0), Some(BLACK));
        assert_eq!(fb.pixel(0, 4), Some(WHITE));
    }

    #[test]
    fn katakana_gets_a_visible_glyph() {
        let g = char_glyph('ア');
        assert!(g.iter().any(|&r| r != 0));
        assert_eq!(g, char_glyph('ア'));
    }

    #[test]
    fn blit_scales_source() {
        let mut src = Framebuffer::new(2, 2, BLACK);
        src.fill_rect(1.0, 0.0, 1.0, 1.0, RED, 1.0);
        let mut dst = Framebuffer::new(8, 8, WHITE);
        dst.blit(&src, 0, 0, 4, 4);
        assert_eq!(dst.pixel(3, 0), Some(RED));
        assert_eq!(dst.pixel(0, 0), Some(BLACK));
        assert_eq!(dst.pixel(5, 5), Some(WHITE));
    }

    #[test]
    fn resize_reallocates() {
        let mut fb = Framebuffer::new(4, 4, BLACK);
        fb.resize(6, 3, RED);
        assert_eq!(fb.pixels().len(), 18);
        assert_eq!(fb.pixel(5, 2), Some(RED));
        assert_eq!(fb.pixel(6, 0), None);
    }
}
