use std::collections::VecDeque;
use std::f32::consts::PI;

use swarm_landmarks::Landmark;

use super::{wrap_all, Mode, ModeKind, RenderOptions};
use crate::color::WHITE;
use crate::context::SimContext;
use crate::mask::{ColorPolicy, FaceMask};
use crate::particle::Particle;
use crate::surface::Surface;
use crate::theme::GALAXY_THEME;

const TRAIL_POINTS: usize = 20;

/// A meteor streaking across the starfield.
#[derive(Clone, Debug, PartialEq)]
pub struct ShootingStar {
    pub x:     f32,
    pub y:     f32,
    pub vx:    f32,
    pub vy:    f32,
    /// 1.0 at spawn, dead at 0.
    pub life:  f32,
    pub trail: VecDeque<(f32, f32)>,
}

/// Milky-Way starfield. Stars drift and twinkle; anything tracked makes the
/// stars under it flash.
#[derive(Clone, Debug)]
pub struct GalacticMode {
    pub twinkle_speed:        f64,
    pub drift_speed:          f32,
    pub hand_twinkle_radius:  f32,
    pub star_interval_ms:     f64,
    /// Band tilt in radians and thickness as a fraction of the height.
    pub band_angle:           f32,
    pub band_width:           f32,
    stars:                    Vec<ShootingStar>,
    last_star_ms:             f64,
    now_ms:                   f64,
    mask:                     FaceMask,
}

impl GalacticMode {
    pub fn new() -> Self {
        GalacticMode {
            twinkle_speed: 0.005,
            drift_speed: 0.1,
            hand_twinkle_radius: 100.0,
            star_interval_ms: 3000.0,
            band_angle: -0.3,
            band_width: 0.35,
            stars: Vec::new(),
            last_star_ms: 0.0,
            now_ms: 0.0,
            mask: FaceMask::new(ColorPolicy::Fixed(0xFF9933FF)),
        }
    }

    pub fn shooting_stars(&self) -> &[ShootingStar] {
        &self.stars
    }

    fn spawn_star(&mut self, ctx: &mut SimContext) {
        let x = ctx.size.width * ctx.range(0.3, 0.7);
        let y = ctx.random() * ctx.size.height * 0.3;
        let angle = PI * ctx.range(0.6, 0.4);
        let speed = ctx.range(15.0, 10.0);
        self.stars.push(ShootingStar {
            x,
            y,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            life: 1.0,
            trail: VecDeque::with_capacity(TRAIL_POINTS + 1),
        });
    }
}

impl Default for GalacticMode {
    fn default() -> Self {
        Self::new()
    }
}

/// Standard normal sample via Box-Muller.
fn gaussian(ctx: &mut SimContext) -> f32 {
    let u1 = ctx.random().max(f32::MIN_POSITIVE);
    let u2 = ctx.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

impl Mode for GalacticMode {
    fn kind(&self) -> ModeKind {
        ModeKind::Galactic
    }

    fn on_activate(&mut self, ctx: &mut SimContext) {
        self.stars.clear();
        self.last_star_ms = ctx.now_ms;
        self.now_ms = ctx.now_ms;
        self.mask.blink.reset(ctx.now_ms);
    }

    fn init_particle(&mut self, p: &mut Particle, ctx: &mut SimContext) {
        let (w, h) = (ctx.size.width, ctx.size.height);
        let roll = ctx.random();
        if roll < 0.6 {
            // main band
            let g = gaussian(ctx);
            p.x = ctx.random() * w;
            p.y = h * 0.5 + g * h * self.band_width * 0.3;
            if w > 0.0 {
                p.y += (p.x / w - 0.5) * h * self.band_angle;
            }
            p.alpha = ctx.range(0.5, 0.5);
            p.size = ctx.range(1.0, 2.0);
        } else if roll < 0.85 {
            // scattered
            p.x = ctx.random() * w;
            p.y = ctx.random() * h;
            p.alpha = ctx.range(0.2, 0.4);
            p.size = ctx.range(0.5, 1.5);
        } else {
            // core, biased toward the centre
            let a = ctx.angle();
            let d = ctx.random() * w * 0.15 * ctx.random();
            p.x = w * 0.5 + a.cos() * d;
            p.y = h * 0.5 + a.sin() * d * 0.6;
            p.alpha = ctx.range(0.6, 0.4);
            p.size = ctx.range(1.0, 2.5);
        }
        p.y = p.y.clamp(0.0, h);
        let depth = ctx.range(0.2, 0.8);
        let star = p.scratch.star();
        star.depth = depth;
        star.twinkle = 0.5;
        star.hand_twinkle = 0.0;
    }

    fn on_before_update(&mut self, _particles: &mut [Particle], _landmarks: &[Landmark], ctx: &mut SimContext) {
        self.now_ms = ctx.now_ms;
        let interval = self.star_interval_ms + ctx.random() as f64 * 2000.0;
        if ctx.now_ms - self.last_star_ms > interval {
            self.last_star_ms = ctx.now_ms;
            self.spawn_star(ctx);
        }

        let (w, h) = (ctx.size.width, ctx.size.height);
        self.stars.retain_mut(|s| {
            s.trail.push_back((s.x, s.y));
            if s.trail.len() > TRAIL_POINTS {
                s.trail.pop_front();
            }
            s.x += s.vx;
            s.y += s.vy;
            s.life -= 0.02;
            s.life > 0.0 && s.x >= -50.0 && s.x <= w + 50.0 && s.y >= -50.0 && s.y <= h + 50.0
        });
    }

    fn update_particle(&mut self, p: &mut Particle, landmarks: &[Landmark], ctx: &mut SimContext) {
        let r = self.hand_twinkle_radius;
        let hand_twinkle = landmarks
            .iter()
            .map(|lm| lm.distance_sq_to(p.x, p.y).sqrt())
            .filter(|&d| d < r)
            .map(|d| 1.0 - d / r)
            .fold(0.0_f32, f32::max);

        let t = ctx.now_ms * 0.0001;
        let phase = p.phase as f64;
        p.vx += (t + phase).sin() as f32 * self.drift_speed * 0.05;
        p.vy += (t * 0.7 + phase).cos() as f32 * self.drift_speed * 0.03;
        p.vx *= 0.95;
        p.vy *= 0.95;

        let twinkle = 0.5 + 0.5 * (ctx.now_ms * self.twinkle_speed + phase * 10.0).sin() as f32;
        let star = p.scratch.star();
        star.hand_twinkle = hand_twinkle;
        star.twinkle = twinkle;
    }

    fn handle_edges(&mut self, p: &mut Particle, ctx: &mut SimContext) {
        wrap_all(p, ctx.size);
    }

    fn friction(&self) -> f32 { 0.98 }
    fn max_speed(&self) -> f32 { 3.0 }
    fn trail_alpha(&self) -> f32 { 0.05 }
    fn preset_theme(&self) -> Option<usize> { Some(GALAXY_THEME) }

    fn particle_alpha(&self, p: &Particle) -> f32 {
        let Some(star) = p.scratch.as_star() else {
            return p.alpha;
        };
        let mut alpha = p.alpha * (0.4 + star.twinkle * 0.6);
        if star.hand_twinkle > 0.0 {
            let sparkle = 0.5 + 0.5 * (self.now_ms * 0.02 + p.phase as f64 * 5.0).sin() as f32;
            alpha = (alpha + star.hand_twinkle * sparkle).min(1.0);
        }
        alpha
    }

    fn on_after_render(
        &mut self,
        surface: &mut dyn Surface,
        landmarks: &[Landmark],
        ctx: &mut SimContext,
        options: RenderOptions,
    ) {
        for star in &self.stars {
            if star.trail.len() > 1 {
                let mut path: Vec<(f32, f32)> = star.trail.iter().copied().collect();
                path.push((star.x, star.y));
                surface.stroke_polyline(&path, false, 2.0, WHITE, star.life * 0.5);
            }
            surface.fill_circle(star.x, star.y, 3.0, WHITE, star.life);
        }
        if options.mask_visible {
            self.mask.draw(surface, landmarks, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{CanvasSize, RecordingSurface};

    fn ctx() -> SimContext {
        SimContext::seeded(21, CanvasSize::new(800.0, 600.0))
    }

    #[test]
    fn stars_stay_on_canvas_vertically() {
        let mut c = ctx();
        let mut m = GalacticMode::new();
        for _ in 0..500 {
            let mut p = Particle::default();
            m.init_particle(&mut p, &mut c);
            assert!((0.0..=600.0).contains(&p.y));
            let depth = p.scratch.as_star().map(|s| s.depth).unwrap_or_default();
            assert!((0.2..=1.0).contains(&depth));
            assert!(p.alpha >= 0.2 && p.alpha <= 1.0);
        }
    }

    #[test]
    fn nearby_landmark_brightens() {
        let mut c = ctx();
        let mut m = GalacticMode::new();
        let mut p = Particle { x: 100.0, y: 100.0, alpha: 0.3, ..Particle::default() };
        m.update_particle(&mut p, &[], &mut c);
        let calm = m.particle_alpha(&p);
        assert!(calm <= 0.3 + 1e-6);

        m.update_particle(&mut p, &[Landmark::face(100.0, 100.0, 0)], &mut c);
        assert_eq!(p.scratch.as_star().map(|s| s.hand_twinkle), Some(1.0));
        assert!(m.particle_alpha(&p) >= calm);
        assert!(m.particle_alpha(&p) <= 1.0);
    }

    #[test]
    fn shooting_star_spawns_moves_and_dies() {
        let mut c = ctx();
        let mut m = GalacticMode::new();
        m.on_activate(&mut c);
        m.on_before_update(&mut [], &[], &mut c);
        assert!(m.shooting_stars().is_empty());

        c.advance(5001.0);
        m.on_before_update(&mut [], &[], &mut c);
        assert_eq!(m.shooting_stars().len(), 1);
        let s = &m.shooting_stars()[0];
        assert!(s.vy > 0.0 && s.vx < 0.0);
        assert_eq!(s.trail.len(), 1);

        for _ in 0..60 {
            m.on_before_update(&mut [], &[], &mut c);
        }
        assert!(m.shooting_stars().is_empty());
    }

    #[test]
    fn trail_capped_and_rendered() {
        let mut c = ctx();
        let mut m = GalacticMode::new();
        m.stars.push(ShootingStar {
            x: 400.0,
            y: 300.0,
            vx: 0.0,
            vy: 0.0,
            life: 1.0,
            trail: VecDeque::new(),
        });
        for _ in 0..30 {
            m.on_before_update(&mut [], &[], &mut c);
        }
        assert_eq!(m.shooting_stars()[0].trail.len(), TRAIL_POINTS);

        let mut s = RecordingSurface::new(c.size);
        m.on_after_render(&mut s, &[], &mut c, RenderOptions { mask_visible: false });
        assert_eq!(s.lines().count(), TRAIL_POINTS);
        assert_eq!(s.circles().count(), 1);
    }

    #[test]
    fn activation_clears_stars() {
        let mut c = ctx();
        let mut m = GalacticMode::new();
        c.advance(10_000.0);
        m.on_before_update(&mut [], &[], &mut c);
        assert!(!m.shooting_stars().is_empty());
        m.on_activate(&mut c);
        assert!(m.shooting_stars().is_empty());
    }
}
