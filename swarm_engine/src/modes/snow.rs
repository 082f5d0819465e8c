use swarm_landmarks::Landmark;

use super::{closest_within, reset_to_top, Mode, ModeKind};
use crate::context::SimContext;
use crate::particle::Particle;

/// Slow flakes that settle on whatever is tracked. Settling is just heavy
/// damping; nothing actually stacks.
#[derive(Clone, Debug)]
pub struct SnowMode {
    pub gravity:           f32,
    pub terminal_velocity: f32,
    pub wobble_strength:   f32,
    pub collision_radius:  f32,
}

impl SnowMode {
    pub fn new() -> Self {
        SnowMode { gravity: 0.08, terminal_velocity: 2.0, wobble_strength: 0.15, collision_radius: 60.0 }
    }
}

impl Default for SnowMode {
    fn default() -> Self {
        Self::new()
    }
}

impl Mode for SnowMode {
    fn kind(&self) -> ModeKind {
        ModeKind::Snow
    }

    fn update_particle(&mut self, p: &mut Particle, landmarks: &[Landmark], ctx: &mut SimContext) {
        if closest_within(landmarks, p.x, p.y, self.collision_radius).is_some() {
            p.vx *= 0.5;
            p.vy *= 0.5;
            p.vx += ctx.jitter() * 0.02;
            p.vy += ctx.jitter() * 0.02;
            return;
        }
        p.vy += self.gravity;
        let wobble = (ctx.now_s() * 2.0 + p.phase as f64).sin() as f32;
        p.vx += wobble * self.wobble_strength * 0.1;
        p.vx *= 0.98;
        p.vy = p.vy.min(self.terminal_velocity);
    }

    fn handle_edges(&mut self, p: &mut Particle, ctx: &mut SimContext) {
        reset_to_top(p, ctx);
    }

    fn friction(&self) -> f32 { 1.0 }
    fn uses_friction(&self) -> bool { false }
    fn max_speed(&self) -> f32 { 3.0 }
    fn trail_alpha(&self) -> f32 { 0.08 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::CanvasSize;

    #[test]
    fn settles_near_landmark() {
        let mut ctx = SimContext::seeded(8, CanvasSize::new(300.0, 300.0));
        let mut m = SnowMode::new();
        let lm = [Landmark::face(100.0, 100.0, 10)];
        let mut p = Particle { x: 100.0, y: 140.0, vx: 1.0, vy: 2.0, ..Particle::default() };
        for _ in 0..20 {
            m.update_particle(&mut p, &lm, &mut ctx);
        }
        assert!(p.speed() < 0.05, "speed {}", p.speed());
    }

    #[test]
    fn falls_gently_when_clear() {
        let mut ctx = SimContext::seeded(8, CanvasSize::new(300.0, 300.0));
        let mut m = SnowMode::new();
        let mut p = Particle { x: 10.0, y: 10.0, ..Particle::default() };
        for _ in 0..100 {
            m.update_particle(&mut p, &[], &mut ctx);
        }
        assert_eq!(p.vy, 2.0);
    }
}
