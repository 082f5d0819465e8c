use swarm_landmarks::Landmark;

use super::{Mode, ModeKind, RenderOptions};
use crate::color::{rgb, WHITE};
use crate::context::SimContext;
use crate::mask::{ColorPolicy, FaceMask};
use crate::particle::Particle;
use crate::surface::Surface;
use crate::theme::MATRIX_THEME;

/// Katakana plus a handful of digits and symbols.
pub const GLYPHS: &str = "アイウエオカキクケコサシスセソタチツテトナニヌネノハヒフヘホマミムメモヤユヨラリルレロワヲン0123456789:・.\"=*+-<>¦|_";

#[derive(Clone, Debug, PartialEq)]
pub struct Glyph {
    pub ch:         char,
    /// 1.0 at the head, fading toward the tail.
    pub brightness: f32,
}

/// One falling column of glyphs. `y` is the head position; the tail
/// extends upward from it.
#[derive(Clone, Debug, PartialEq)]
pub struct Stream {
    pub column: usize,
    pub x:      f32,
    pub y:      f32,
    pub speed:  f32,
    pub glyphs: Vec<Glyph>,
}

/// Digital rain. The particles stay hidden; the mode draws its own glyph
/// streams and always shows the mask.
#[derive(Clone, Debug)]
pub struct MatrixMode {
    pub column_width: f32,
    pub char_height:  f32,
    pub min_speed:    f32,
    pub max_speed:    f32,
    pub trail_length: usize,
    /// Per-glyph chance of changing each frame.
    pub change_rate:  f32,
    streams:          Vec<Stream>,
    glyphs:           Vec<char>,
    mask:             FaceMask,
}

impl MatrixMode {
    pub fn new() -> Self {
        MatrixMode {
            column_width: 20.0,
            char_height: 22.0,
            min_speed: 0.3,
            max_speed: 1.2,
            trail_length: 25,
            change_rate: 0.02,
            streams: Vec::new(),
            glyphs: GLYPHS.chars().collect(),
            mask: FaceMask::new(ColorPolicy::Fixed(0xFF00FF00)),
        }
    }

    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    fn random_glyph(&self, ctx: &mut SimContext) -> char {
        let i = ctx.pick(self.glyphs.len());
        self.glyphs.get(i).copied().unwrap_or('0')
    }

    fn create_stream(&self, column: usize, ctx: &mut SimContext, staggered: bool) -> Stream {
        let len = 10 + ctx.pick(self.trail_length);
        let glyphs = (0..len)
            .map(|i| Glyph { ch: self.random_glyph(ctx), brightness: 1.0 - i as f32 / len as f32 })
            .collect::<Vec<_>>();
        let y = if staggered {
            -ctx.random() * ctx.size.height * 2.0
        } else {
            -self.char_height * len as f32
        };
        Stream {
            column,
            x: column as f32 * self.column_width + self.column_width / 2.0,
            y,
            speed: ctx.range(self.min_speed, self.max_speed - self.min_speed),
            glyphs,
        }
    }

    fn build_streams(&mut self, ctx: &mut SimContext) {
        let columns = (ctx.size.width / self.column_width).ceil() as usize;
        self.streams = (0..columns).map(|c| self.create_stream(c, ctx, true)).collect();
    }
}

impl Default for MatrixMode {
    fn default() -> Self {
        Self::new()
    }
}

impl Mode for MatrixMode {
    fn kind(&self) -> ModeKind {
        ModeKind::Matrix
    }

    fn on_activate(&mut self, ctx: &mut SimContext) {
        self.streams.clear();
        self.mask.blink.reset(ctx.now_ms);
    }

    fn on_resize(&mut self, _ctx: &mut SimContext) {
        self.streams.clear();
    }

    fn on_before_update(&mut self, _particles: &mut [Particle], _landmarks: &[Landmark], ctx: &mut SimContext) {
        if self.streams.is_empty() {
            self.build_streams(ctx);
        }
        for i in 0..self.streams.len() {
            self.streams[i].y += self.streams[i].speed * 8.0;
            for g in 0..self.streams[i].glyphs.len() {
                if ctx.random() < self.change_rate {
                    let ch = self.random_glyph(ctx);
                    self.streams[i].glyphs[g].ch = ch;
                }
            }
            let stream = &self.streams[i];
            let tail = stream.y - stream.glyphs.len() as f32 * self.char_height;
            if tail > ctx.size.height {
                self.streams[i] = self.create_stream(stream.column, ctx, false);
            }
        }
    }

    fn update_particle(&mut self, _p: &mut Particle, _landmarks: &[Landmark], _ctx: &mut SimContext) {}

    fn handle_edges(&mut self, _p: &mut Particle, _ctx: &mut SimContext) {}

    fn trail_alpha(&self) -> f32 { 0.08 }
    fn preset_theme(&self) -> Option<usize> { Some(MATRIX_THEME) }
    fn particle_alpha(&self, _p: &Particle) -> f32 { 0.0 }

    fn on_after_render(
        &mut self,
        surface: &mut dyn Surface,
        landmarks: &[Landmark],
        ctx: &mut SimContext,
        _options: RenderOptions,
    ) {
        let px = self.char_height - 2.0;
        let height = ctx.size.height;
        let mut buf = [0u8; 4];
        for stream in &self.streams {
            for (i, glyph) in stream.glyphs.iter().enumerate() {
                let y = stream.y - i as f32 * self.char_height;
                if y < -self.char_height || y > height + self.char_height {
                    continue;
                }
                let color = if i == 0 {
                    WHITE
                } else {
                    rgb(0, (100.0 + glyph.brightness * 155.0) as u8, 0)
                };
                let text = glyph.ch.encode_utf8(&mut buf);
                surface.fill_text_centered(text, stream.x, y, px, color, glyph.brightness.max(0.1));
            }
        }
        // drawn regardless of the mask toggle
        self.mask.draw(surface, landmarks, ctx);
    }
}
