use swarm_landmarks::Landmark;

use super::{closest_within, wrap_x, Mode, ModeKind, RenderOptions};
use crate::context::SimContext;
use crate::mask::{ColorPolicy, FaceMask};
use crate::particle::Particle;
use crate::surface::Surface;
use crate::theme::RAINBOW_THEME;

/// Periodic confetti bursts that flutter down, with the tracked body cut
/// out of the swarm as a silhouette.
///
/// Bursts only reuse particles that have already fallen off-screen, so a
/// burst can never starve the rest of the pool. A small fraction of
/// particles never joins a burst and drifts down like snow instead.
#[derive(Clone, Debug)]
pub struct PartyMode {
    pub gravity:           f32,
    pub flutter:           f32,
    pub terminal_velocity: f32,
    pub burst_interval_ms: f64,
    pub burst_duration_ms: f64,
    pub particles_per_burst: usize,
    pub silhouette_radius: f32,
    /// Fraction of particles that fall steadily instead of bursting.
    pub steady_fraction:   f32,
    last_burst_ms:         f64,
    mask:                  FaceMask,
}

impl PartyMode {
    pub fn new() -> Self {
        PartyMode {
            gravity: 0.15,
            flutter: 0.3,
            terminal_velocity: 4.0,
            burst_interval_ms: 800.0,
            burst_duration_ms: 300.0,
            particles_per_burst: 150,
            silhouette_radius: 40.0,
            steady_fraction: 0.1,
            last_burst_ms: f64::NEG_INFINITY,
            mask: FaceMask::new(ColorPolicy::Rainbow).with_mouth_drop(0.2),
        }
    }

    /// Relaunch up to `particles_per_burst` off-screen particles from
    /// around `(x, y)`. Returns how many were launched.
    pub fn trigger_burst(&mut self, x: f32, y: f32, particles: &mut [Particle], ctx: &mut SimContext) -> usize {
        let limit = self.particles_per_burst.min(particles.len());
        let height = ctx.size.height;
        let mut launched = 0;
        for p in particles.iter_mut() {
            if launched >= limit {
                break;
            }
            let state = *p.scratch.confetti();
            if state.steady || !(p.y > height || p.y < -100.0) {
                continue;
            }
            let a = ctx.angle();
            let d = ctx.random() * 20.0;
            p.x = x + a.cos() * d;
            p.y = y + a.sin() * d;

            let burst_angle = ctx.angle();
            let burst_speed = ctx.range(2.0, 4.0);
            let dir = (burst_angle.cos() * burst_speed, burst_angle.sin() * burst_speed - 2.0);
            p.vx = dir.0 * 2.0;
            p.vy = dir.1 * 2.0;
            p.phase = ctx.angle();

            let state = p.scratch.confetti();
            state.burst_dir = dir;
            state.burst_time = Some(ctx.now_ms);
            launched += 1;
        }
        launched
    }
}

impl Default for PartyMode {
    fn default() -> Self {
        Self::new()
    }
}

impl Mode for PartyMode {
    fn kind(&self) -> ModeKind {
        ModeKind::Party
    }

    fn on_activate(&mut self, ctx: &mut SimContext) {
        self.last_burst_ms = f64::NEG_INFINITY;
        self.mask.blink.reset(ctx.now_ms);
    }

    fn init_particle(&mut self, p: &mut Particle, ctx: &mut SimContext) {
        p.x = ctx.random() * ctx.size.width;
        p.y = ctx.random() * ctx.size.height;
        let steady = ctx.random() < self.steady_fraction;
        let state = p.scratch.confetti();
        state.steady = steady;
        state.burst_time = None;
        state.in_silhouette = false;
    }

    fn on_before_update(&mut self, particles: &mut [Particle], _landmarks: &[Landmark], ctx: &mut SimContext) {
        if ctx.now_ms - self.last_burst_ms <= self.burst_interval_ms {
            return;
        }
        self.last_burst_ms = ctx.now_ms;
        let x = ctx.random() * ctx.size.width;
        let y = ctx.random() * ctx.size.height * 0.6;
        self.trigger_burst(x, y, particles, ctx);
    }

    fn update_particle(&mut self, p: &mut Particle, landmarks: &[Landmark], ctx: &mut SimContext) {
        let in_silhouette = closest_within(landmarks, p.x, p.y, self.silhouette_radius).is_some();
        let state = p.scratch.confetti();
        state.in_silhouette = in_silhouette;
        let state = *state;

        let age = state.burst_time.map_or(f64::INFINITY, |t| ctx.now_ms - t);
        if age < self.burst_duration_ms {
            let force = ((self.burst_duration_ms - age) / self.burst_duration_ms) as f32 * 0.5;
            p.vx += state.burst_dir.0 * force;
            p.vy += state.burst_dir.1 * force;
            return;
        }

        let flutter = (ctx.now_ms * 0.003 + p.phase as f64).sin() as f32 * self.flutter * 0.1;
        if state.steady {
            p.vy += self.gravity * 0.3;
            p.vx += flutter * 0.5;
            p.vx *= 0.98;
            p.vy = p.vy.min(self.terminal_velocity * 0.4);
        } else {
            p.vy += self.gravity;
            p.vx += flutter;
            p.vx *= 0.98;
            p.vy = p.vy.min(self.terminal_velocity);
        }
    }

    fn handle_edges(&mut self, p: &mut Particle, ctx: &mut SimContext) {
        wrap_x(p, ctx.size);
        let steady = p.scratch.as_confetti().is_some_and(|s| s.steady);
        if steady {
            if p.y > ctx.size.height {
                p.y = -10.0;
                p.x = ctx.random() * ctx.size.width;
            }
        } else if p.y > ctx.size.height + 100.0 {
            // parked below the screen until a burst reuses it
            p.y = ctx.size.height + 50.0;
        }
    }

    fn friction(&self) -> f32 { 0.99 }
    fn max_speed(&self) -> f32 { 8.0 }
    fn trail_alpha(&self) -> f32 { 0.12 }
    fn preset_theme(&self) -> Option<usize> { Some(RAINBOW_THEME) }

    fn particle_alpha(&self, p: &Particle) -> f32 {
        match p.scratch.as_confetti() {
            Some(s) if s.in_silhouette => 0.0,
            _ => p.alpha,
        }
    }

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
        SimContext::seeded(13, CanvasSize::new(400.0, 300.0))
    }

    fn bursting(y: f32) -> Particle {
        let mut p = Particle { x: 10.0, y, ..Particle::default() };
        p.scratch.confetti();
        p
    }

    #[test]
    fn burst_only_reuses_offscreen_particles() {
        let mut c = ctx();
        let mut m = PartyMode::new();
        let mut ps = vec![bursting(350.0), bursting(100.0), bursting(-150.0), bursting(301.0)];
        ps[3].scratch.confetti().steady = true;

        let n = m.trigger_burst(200.0, 100.0, &mut ps, &mut c);
        assert_eq!(n, 2);
        assert!(ps[0].scratch.as_confetti().is_some_and(|s| s.burst_time.is_some()));
        assert!(ps[1].scratch.as_confetti().is_some_and(|s| s.burst_time.is_none()));
        assert!((ps[0].x - 200.0).abs() <= 20.0 && (ps[0].y - 100.0).abs() <= 20.0);
        assert_eq!(ps[3].y, 301.0);
    }

    #[test]
    fn burst_respects_per_burst_cap() {
        let mut c = ctx();
        let mut m = PartyMode { particles_per_burst: 3, ..PartyMode::new() };
        let mut ps: Vec<Particle> = (0..10).map(|_| bursting(500.0)).collect();
        assert_eq!(m.trigger_burst(0.0, 0.0, &mut ps, &mut c), 3);
    }

    #[test]
    fn burst_phase_then_fall_phase() {
        let mut c = ctx();
        let mut m = PartyMode::new();
        let mut p = bursting(500.0);
        let mut ps = [p.clone()];
        m.trigger_burst(100.0, 100.0, &mut ps, &mut c);
        p = ps[0].clone();
        let dir = p.scratch.as_confetti().map(|s| s.burst_dir).unwrap_or_default();

        let (vx0, vy0) = (p.vx, p.vy);
        m.update_particle(&mut p, &[], &mut c);
        assert!((p.vx - (vx0 + dir.0 * 0.5)).abs() < 1e-5);
        assert!((p.vy - (vy0 + dir.1 * 0.5)).abs() < 1e-5);

        c.advance(301.0);
        let vy_before = p.vy;
        m.update_particle(&mut p, &[], &mut c);
        assert!(p.vy <= 4.0);
        assert!(p.vy > vy_before.min(3.8));
    }

    #[test]
    fn silhouette_hides_particle() {
        let mut c = ctx();
        let mut m = PartyMode::new();
        let mut p = bursting(100.0);
        p.x = 100.0;
        m.update_particle(&mut p, &[Landmark::face(110.0, 100.0, 0)], &mut c);
        assert_eq!(m.particle_alpha(&p), 0.0);
        m.update_particle(&mut p, &[], &mut c);
        assert_eq!(m.particle_alpha(&p), p.alpha);
    }

    #[test]
    fn parks_below_screen() {
        let mut c = ctx();
        let mut m = PartyMode::new();
        let mut p = bursting(450.0);
        m.handle_edges(&mut p, &mut c);
        assert_eq!(p.y, 350.0);
    }

    #[test]
    fn first_frame_after_activation_bursts() {
        let mut c = ctx();
        let mut m = PartyMode::new();
        m.on_activate(&mut c);
        let mut ps: Vec<Particle> = (0..5).map(|_| bursting(400.0)).collect();
        m.on_before_update(&mut ps, &[], &mut c);
        assert!(ps.iter().all(|p| p.y < 300.0));
        // interval not yet elapsed
        for p in ps.iter_mut() {
            p.y = 400.0;
        }
        c.advance(100.0);
        m.on_before_update(&mut ps, &[], &mut c);
        assert!(ps.iter().all(|p| p.y == 400.0));
    }
}
