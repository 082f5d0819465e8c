use swarm_landmarks::Landmark;

use super::{nearest, Mode, ModeKind, RenderOptions};
use crate::context::SimContext;
use crate::mask::{ColorPolicy, FaceMask};
use crate::particle::Particle;
use crate::surface::Surface;
use crate::theme::GALAXY_THEME;

/// Particles orbit the nearest landmark: an inverse-square pull plus a
/// tangential push scaled like a circular orbit speed, `sqrt(G / r)`.
#[derive(Clone, Debug)]
pub struct GravityMode {
    pub strength:       f32,
    pub min_orbit:      f32,
    pub max_orbit:      f32,
    pub escape_chance:  f32,
    pub damping:        f32,
    pub buzz_strength:  f32,
    pub buzz_threshold: f32,
    /// Velocity kept on bouncing off an edge.
    pub restitution:    f32,
    mask:               FaceMask,
}

impl GravityMode {
    pub fn new() -> Self {
        GravityMode {
            strength: 400.0,
            min_orbit: 30.0,
            max_orbit: 600.0,
            escape_chance: 0.0002,
            damping: 0.95,
            buzz_strength: 0.8,
            buzz_threshold: 120.0,
            restitution: 0.8,
            mask: FaceMask::new(ColorPolicy::Fixed(0xFFFFD700)),
        }
    }
}

impl Default for GravityMode {
    fn default() -> Self {
        Self::new()
    }
}

impl Mode for GravityMode {
    fn kind(&self) -> ModeKind {
        ModeKind::Gravity
    }

    fn on_activate(&mut self, ctx: &mut SimContext) {
        self.mask.blink.reset(ctx.now_ms);
    }

    fn init_particle(&mut self, p: &mut Particle, ctx: &mut SimContext) {
        p.x = ctx.random() * ctx.size.width;
        p.y = ctx.random() * ctx.size.height;
        let angle = ctx.angle();
        let speed = ctx.range(1.0, 2.0);
        p.vx = angle.cos() * speed;
        p.vy = angle.sin() * speed;
        let orbit = p.scratch.orbit();
        orbit.eccentricity = ctx.range(0.1, 0.4);
        orbit.orbit_phase = ctx.angle();
    }

    fn update_particle(&mut self, p: &mut Particle, landmarks: &[Landmark], ctx: &mut SimContext) {
        let Some((lm, raw_dist)) = nearest(landmarks, p.x, p.y) else {
            p.vx *= 0.99;
            p.vy *= 0.99;
            return;
        };
        let dx = lm.x - p.x;
        let dy = lm.y - p.y;
        let dist = raw_dist.max(self.min_orbit);
        if dist > self.max_orbit {
            p.vx *= 0.995;
            p.vy *= 0.995;
            return;
        }

        // ── radial pull ──
        let g = self.strength / (dist * dist);
        p.vx += dx / dist * g;
        p.vy += dy / dist * g;

        // ── orbital push ──
        let (tx, ty) = (-dy / dist, dx / dist);
        let orbital = (self.strength / dist).sqrt() * 0.15;
        p.vx += tx * orbital * 0.1;
        p.vy += ty * orbital * 0.1;

        let orbit = *p.scratch.orbit();
        let wobble = (ctx.now_s() * 2.0 + orbit.orbit_phase as f64).sin() as f32 * orbit.eccentricity;
        p.vx += tx * wobble * 0.3;
        p.vy += ty * wobble * 0.3;

        if ctx.random() < self.escape_chance {
            p.vx += ctx.jitter() * 0.3;
            p.vy += ctx.jitter() * 0.3;
        }

        if dist < self.buzz_threshold {
            let buzz = (1.0 - dist / self.buzz_threshold) * self.buzz_strength;
            p.vx += ctx.jitter() * buzz;
            p.vy += ctx.jitter() * buzz;
        }

        p.vx *= self.damping;
        p.vy *= self.damping;
    }

    fn handle_edges(&mut self, p: &mut Particle, ctx: &mut SimContext) {
        let (w, h) = (ctx.size.width, ctx.size.height);
        if p.x < 0.0 {
            p.x = 0.0;
            p.vx *= -self.restitution;
        } else if p.x > w {
            p.x = w;
            p.vx *= -self.restitution;
        }
        if p.y < 0.0 {
            p.y = 0.0;
            p.vy *= -self.restitution;
        } else if p.y > h {
            p.y = h;
            p.vy *= -self.restitution;
        }
    }

    fn friction(&self) -> f32 { 1.0 }
    fn uses_friction(&self) -> bool { false }
    fn max_speed(&self) -> f32 { 12.0 }
    fn trail_alpha(&self) -> f32 { 0.12 }
    fn preset_theme(&self) -> Option<usize> { Some(GALAXY_THEME) }

    fn on_after_render(
        &mut self,
        surface: &mut dyn Surface,
        landmarks: &[Landmark],
        ctx: &mut SimContext,
        options: RenderOptions,
    ) {
        if options.mask_visible {
            self.mask.draw(surface, landmarks, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::CanvasSize;

    fn ctx() -> SimContext {
        SimContext::seeded(21, CanvasSize::new(800.0, 600.0))
    }

    #[test]
    fn init_sets_orbit_scratch_and_speed() {
        let mut c = ctx();
        let mut m = GravityMode::new();
        let mut p = Particle::default();
        m.init_particle(&mut p, &mut c);
        let speed = p.speed();
        assert!((1.0..=3.0).contains(&speed), "speed {speed}");
        let orbit = p.scratch.as_orbit().copied().unwrap_or_default();
        assert!((0.1..=0.5).contains(&orbit.eccentricity));
    }

    #[test]
    fn coincident_point_stays_finite() {
        let mut c = ctx();
        let mut m = GravityMode::new();
        let mut p = Particle { x: 100.0, y: 100.0, ..Particle::default() };
        m.update_particle(&mut p, &[Landmark::face(100.0, 100.0, 0)], &mut c);
        assert!(p.vx.is_finite() && p.vy.is_finite());
    }

    #[test]
    fn beyond_max_orbit_only_drifts() {
        let mut c = SimContext::seeded(21, CanvasSize::new(2000.0, 2000.0));
        let mut m = GravityMode::new();
        let mut p = Particle { x: 0.0, y: 0.0, vx: 1.0, ..Particle::default() };
        m.update_particle(&mut p, &[Landmark::face(1000.0, 0.0, 0)], &mut c);
        assert!((p.vx - 0.995).abs() < 1e-6);
        assert_eq!(p.vy, 0.0);
    }

    #[test]
    fn bounces_with_restitution() {
        let mut c = ctx();
        let mut m = GravityMode::new();
        let mut p = Particle { x: 801.0, y: 10.0, vx: 5.0, ..Particle::default() };
        m.handle_edges(&mut p, &mut c);
        assert_eq!(p.x, 800.0);
        assert!((p.vx + 4.0).abs() < 1e-6);
    }
}
