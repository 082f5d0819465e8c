use swarm_landmarks::Landmark;

use super::{Mode, ModeKind, RenderOptions};
use crate::context::SimContext;
use crate::mask::{ColorPolicy, FaceMask};
use crate::particle::Particle;
use crate::surface::Surface;
use crate::theme::FIRE_THEME;

/// Free-flowing field that parts around anything tracked.
#[derive(Clone, Debug)]
pub struct RepelMode {
    pub repel_distance: f32,
    pub repel_strength: f32,
    mask:               FaceMask,
}

impl RepelMode {
    pub fn new() -> Self {
        RepelMode {
            repel_distance: 120.0,
            repel_strength: 0.15,
            mask: FaceMask::new(ColorPolicy::Fixed(0xFFFF6600)),
        }
    }
}

impl Default for RepelMode {
    fn default() -> Self {
        Self::new()
    }
}

impl Mode for RepelMode {
    fn kind(&self) -> ModeKind {
        ModeKind::Repel
    }

    fn on_activate(&mut self, ctx: &mut SimContext) {
        self.mask.blink.reset(ctx.now_ms);
    }

    fn update_particle(&mut self, p: &mut Particle, landmarks: &[Landmark], ctx: &mut SimContext) {
        let t = ctx.now_s();
        let phase = p.phase as f64;

        // ── flow field ──
        let wave_x = (t * 0.5 + phase).sin() as f32 * p.wave_amp;
        let wave_y = (t * 0.7 + phase * 1.3).cos() as f32 * p.wave_amp;
        p.vx += (p.flow_angle + wave_x).cos() * p.flow_speed * 0.1;
        p.vy += (p.flow_angle + wave_y).sin() * p.flow_speed * 0.1;
        p.flow_angle += (t * 0.2 + phase).sin() as f32 * 0.01;

        // ── push ──
        for lm in landmarks {
            let dx = p.x - lm.x;
            let dy = p.y - lm.y;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist < self.repel_distance && dist > 1.0 {
                let force = (1.0 - dist / self.repel_distance) * self.repel_strength;
                p.vx += dx / dist * force * 12.0;
                p.vy += dy / dist * force * 12.0;
            }
        }
    }

    fn friction(&self) -> f32 { 0.98 }
    fn max_speed(&self) -> f32 { 4.0 }
    fn preset_theme(&self) -> Option<usize> { Some(FIRE_THEME) }

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
