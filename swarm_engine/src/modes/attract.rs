use swarm_landmarks::Landmark;

use super::{Mode, ModeKind};
use crate::context::SimContext;
use crate::particle::Particle;

/// Particles flow toward their golden-ratio targets and drift home when
/// nothing is tracked.
#[derive(Clone, Debug)]
pub struct AttractMode {
    pub attraction:     f32,
    pub return_speed:   f32,
    /// Jitter near the target so swarms shimmer instead of settling.
    pub buzz:           bool,
    pub buzz_threshold: f32,
    pub buzz_strength:  f32,
}

impl AttractMode {
    pub fn new() -> Self {
        AttractMode {
            attraction: 0.08,
            return_speed: 0.02,
            buzz: true,
            buzz_threshold: 25.0,
            buzz_strength: 0.4,
        }
    }
}

impl Default for AttractMode {
    fn default() -> Self {
        Self::new()
    }
}

impl Mode for AttractMode {
    fn kind(&self) -> ModeKind {
        ModeKind::Attract
    }

    fn update_particle(&mut self, p: &mut Particle, _landmarks: &[Landmark], ctx: &mut SimContext) {
        let Some((tx, ty)) = p.target else {
            p.vx += (p.base_x - p.x) * self.return_speed;
            p.vy += (p.base_y - p.y) * self.return_speed;
            return;
        };
        let dx = tx - p.x;
        let dy = ty - p.y;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist > 1.0 {
            let force = self.attraction * (dist * 0.1).min(10.0);
            p.vx += dx / dist * force;
            p.vy += dy / dist * force;
        }
        if self.buzz && dist < self.buzz_threshold {
            let intensity = (1.0 - dist / self.buzz_threshold) * self.buzz_strength;
            p.vx += ctx.jitter() * intensity;
            p.vy += ctx.jitter() * intensity;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::CanvasSize;

    fn ctx() -> SimContext {
        SimContext::seeded(11, CanvasSize::new(400.0, 300.0))
    }

    #[test]
    fn pulls_toward_target() {
        let mut m = AttractMode::new();
        let mut p = Particle { x: 0.0, y: 0.0, target: Some((100.0, 0.0)), ..Particle::default() };
        m.update_particle(&mut p, &[], &mut ctx());
        // force = 0.08 * min(10, 10)
        assert!((p.vx - 0.8).abs() < 1e-6);
        assert_eq!(p.vy, 0.0);
    }

    #[test]
    fn drifts_home_without_target() {
        let mut m = AttractMode::new();
        let mut p = Particle { x: 10.0, y: 10.0, base_x: 60.0, base_y: 10.0, ..Particle::default() };
        m.update_particle(&mut p, &[], &mut ctx());
        assert!((p.vx - 1.0).abs() < 1e-6);
        assert_eq!(p.vy, 0.0);
    }

    #[test]
    fn sitting_on_target_only_buzzes() {
        let mut m = AttractMode::new();
        let mut p = Particle { x: 5.0, y: 5.0, target: Some((5.0, 5.0)), ..Particle::default() };
        m.update_particle(&mut p, &[], &mut ctx());
        assert!(p.vx.is_finite() && p.vy.is_finite());
        assert!(p.vx.abs() <= 0.2 && p.vy.abs() <= 0.2);

        m.buzz = false;
        let mut q = Particle { x: 5.0, y: 5.0, target: Some((5.0, 5.0)), ..Particle::default() };
        m.update_particle(&mut q, &[], &mut ctx());
        assert_eq!((q.vx, q.vy), (0.0, 0.0));
    }
}
