use swarm_landmarks::Landmark;

use super::{closest_within, reset_to_top, Mode, ModeKind, RenderOptions};
use crate::context::SimContext;
use crate::mask::{ColorPolicy, FaceMask};
use crate::particle::Particle;
use crate::surface::Surface;
use crate::theme::OCEAN_THEME;

/// Falling drops that slow down and drip when they hit a tracked shape.
#[derive(Clone, Debug)]
pub struct RainMode {
    pub gravity:           f32,
    pub terminal_velocity: f32,
    pub drip_speed:        f32,
    pub collision_radius:  f32,
    mask:                  FaceMask,
}

impl RainMode {
    pub fn new() -> Self {
        RainMode {
            gravity: 0.4,
            terminal_velocity: 8.0,
            drip_speed: 0.5,
            collision_radius: 20.0,
            mask: FaceMask::new(ColorPolicy::Fixed(0xFF00CCFF)),
        }
    }
}

impl Default for RainMode {
    fn default() -> Self {
        Self::new()
    }
}

impl Mode for RainMode {
    fn kind(&self) -> ModeKind {
        ModeKind::Rain
    }

    fn on_activate(&mut self, ctx: &mut SimContext) {
        self.mask.blink.reset(ctx.now_ms);
    }

    fn update_particle(&mut self, p: &mut Particle, landmarks: &[Landmark], ctx: &mut SimContext) {
        match closest_within(landmarks, p.x, p.y, self.collision_radius) {
            Some(closest) => {
                p.vx *= 0.85;
                p.vy *= 0.7;
                p.vy += self.drip_speed * (1.0 - closest / self.collision_radius);
                p.vx += ctx.jitter() * 0.1;
            }
            None => {
                p.vy += self.gravity;
                p.vx += ctx.jitter() * 0.05;
                p.vx *= 0.99;
                p.vy = p.vy.min(self.terminal_velocity);
            }
        }
    }

    fn handle_edges(&mut self, p: &mut Particle, ctx: &mut SimContext) {
        reset_to_top(p, ctx);
    }

    fn friction(&self) -> f32 { 1.0 }
    fn uses_friction(&self) -> bool { false }
    fn max_speed(&self) -> f32 { 10.0 }
    fn trail_alpha(&self) -> f32 { 0.05 }
    fn preset_theme(&self) -> Option<usize> { Some(OCEAN_THEME) }

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
