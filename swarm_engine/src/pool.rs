//! The particle pool: owns every particle, assigns landmark targets along a
//! golden-ratio spiral and drives the active mode through one frame.

use std::f64::consts::TAU;

use log::{debug, warn};
use swarm_landmarks::Landmark;

use crate::color::FADE;
use crate::context::SimContext;
use crate::modes::{Mode, ModeKind, RenderOptions};
use crate::particle::Particle;
use crate::surface::Surface;
use crate::theme::{is_valid_theme, pick_color, theme_count, THEMES};

pub const PHI:     f64 = 1.618033988749895;
pub const PHI_INV: f64 = 0.618033988749895;

/// Landmark slot for particle `i` out of `landmarks` candidates.
/// Always `< landmarks`; 0 when there are none.
pub fn golden_index(i: usize, landmarks: usize) -> usize {
    if landmarks == 0 {
        return 0;
    }
    let l = landmarks as f64;
    let slot = ((i as f64 * PHI_INV * l) % l).floor() as usize;
    slot.min(landmarks - 1)
}

/// Spiral angle in radians for particle `i`.
pub fn golden_angle(i: usize) -> f64 {
    i as f64 * PHI * TAU
}

/// Distance from the landmark for particle `i` of `particles`:
/// `sqrt(i / P) * spread`, which keeps the spiral's areal density even.
pub fn spiral_radius(i: usize, particles: usize, spread: f32) -> f32 {
    if particles == 0 {
        return 0.0;
    }
    ((i as f64 / particles as f64).sqrt() * spread as f64) as f32
}

/// Population bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Initial count is drawn from `[min_particles, max_particles]`.
    pub min_particles: usize,
    pub max_particles: usize,
    /// Hard limits for live adjustment.
    pub ceiling:       usize,
    pub floor:         usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig { min_particles: 5000, max_particles: 10_000, ceiling: 10_000, floor: 1 }
    }
}

impl PoolConfig {
    /// Exactly `n` particles at init, clamped to the default limits.
    pub fn fixed(n: usize) -> Self {
        let base = PoolConfig::default();
        let n = n.clamp(base.floor, base.ceiling);
        PoolConfig { min_particles: n, max_particles: n, ..base }
    }

    fn initial_count(&self, ctx: &mut SimContext) -> usize {
        let lo = self.min_particles.min(self.max_particles);
        let hi = self.min_particles.max(self.max_particles);
        (lo + ctx.pick(hi - lo)).clamp(self.floor, self.ceiling.max(self.floor))
    }
}

pub struct ParticlePool {
    config:       PoolConfig,
    particles:    Vec<Particle>,
    landmarks:    Vec<Landmark>,
    /// One instance per registry entry, indexed by [`ModeKind::index`].
    modes:        Vec<Box<dyn Mode>>,
    active:       usize,
    theme:        usize,
    mask_visible: bool,
}

impl ParticlePool {
    /// Empty pool; call [`init`](Self::init) to populate.
    pub fn new(config: PoolConfig, kind: ModeKind) -> Self {
        ParticlePool {
            config,
            particles: Vec::new(),
            landmarks: Vec::new(),
            modes: ModeKind::ORDER.iter().map(|k| k.create()).collect(),
            active: kind.index(),
            theme: 0,
            mask_visible: true,
        }
    }

    /// Discard any particles and create a fresh population laid out by the
    /// active mode.
    pub fn init(&mut self, ctx: &mut SimContext) {
        let count = self.config.initial_count(ctx);
        self.modes[self.active].on_activate(ctx);
        self.particles.clear();
        self.particles.reserve(count);
        for _ in 0..count {
            let p = self.create_particle(ctx);
            self.particles.push(p);
        }
        debug!("pool init: {} particles, mode {}", count, self.mode_kind());
    }

    fn create_particle(&mut self, ctx: &mut SimContext) -> Particle {
        let (w, h) = (ctx.size.width, ctx.size.height);
        let mut p = Particle {
            vx: ctx.jitter() * 2.0,
            vy: ctx.jitter() * 2.0,
            base_x: ctx.random() * w,
            base_y: ctx.random() * h,
            size: ctx.range(0.5, 2.5),
            color: pick_color(self.theme, &mut ctx.rng),
            alpha: ctx.range(0.5, 0.5),
            flow_angle: ctx.angle(),
            flow_speed: ctx.range(0.5, 1.5),
            phase: ctx.angle(),
            wave_amp: ctx.range(0.3, 0.5),
            ..Particle::default()
        };
        self.modes[self.active].init_particle(&mut p, ctx);
        p
    }

    /// Switch modes, re-laying out every particle and applying the mode's
    /// preset theme.
    pub fn set_mode(&mut self, kind: ModeKind, ctx: &mut SimContext) {
        self.set_mode_with_theme(kind, true, ctx);
    }

    pub fn set_mode_with_theme(&mut self, kind: ModeKind, apply_preset: bool, ctx: &mut SimContext) {
        self.active = kind.index();
        let mode = &mut self.modes[self.active];
        mode.on_activate(ctx);
        for p in self.particles.iter_mut() {
            p.scratch = Default::default();
            mode.init_particle(p, ctx);
            p.vx = ctx.jitter() * 2.0;
            p.vy = ctx.jitter() * 2.0;
        }
        debug!("mode -> {}", kind);
        if apply_preset {
            if let Some(theme) = self.modes[self.active].preset_theme() {
                self.set_theme(theme, ctx);
            }
        }
    }

    /// Recolour every particle from theme `index`. Out-of-range indices are
    /// ignored.
    pub fn set_theme(&mut self, index: usize, ctx: &mut SimContext) {
        if !is_valid_theme(index) {
            warn!("theme index {} out of range (0..{}), keeping {}", index, theme_count(), self.theme);
            return;
        }
        self.theme = index;
        for p in self.particles.iter_mut() {
            p.color = pick_color(index, &mut ctx.rng);
        }
        debug!("theme -> {}", THEMES[index].name);
    }

    /// Advance to the next theme, wrapping; returns the new index.
    pub fn cycle_theme(&mut self, ctx: &mut SimContext) -> usize {
        let next = (self.theme + 1) % theme_count();
        self.set_theme(next, ctx);
        next
    }

    pub fn set_landmarks(&mut self, landmarks: Vec<Landmark>) {
        self.landmarks = landmarks;
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    /// Spread particles over the current landmarks along a golden-angle
    /// spiral, or clear every target when there are none.
    pub fn assign_targets(&mut self) {
        let count = self.particles.len();
        if self.landmarks.is_empty() {
            for p in self.particles.iter_mut() {
                p.target = None;
            }
            return;
        }
        let landmarks = &self.landmarks;
        for (i, p) in self.particles.iter_mut().enumerate() {
            let lm = &landmarks[golden_index(i, landmarks.len())];
            let angle = golden_angle(i);
            let r = spiral_radius(i, count, lm.spread);
            let tx = lm.x + angle.cos() as f32 * r;
            let ty = lm.y + angle.sin() as f32 * r;
            p.target = if tx.is_finite() && ty.is_finite() { Some((tx, ty)) } else { None };
            p.target_spread = lm.spread;
        }
    }

    /// One simulation step: targets, batch hook, then per particle physics,
    /// friction, speed clamp, integration and edges.
    pub fn update(&mut self, ctx: &mut SimContext) {
        self.assign_targets();

        let mode = &mut self.modes[self.active];
        let friction = mode.friction();
        let uses_friction = mode.uses_friction();
        let max_speed = mode.max_speed();

        mode.on_before_update(&mut self.particles, &self.landmarks, ctx);

        for p in self.particles.iter_mut() {
            mode.update_particle(p, &self.landmarks, ctx);
            if uses_friction {
                p.vx *= friction;
                p.vy *= friction;
            }
            let speed = p.speed();
            if speed > max_speed {
                p.vx = p.vx / speed * max_speed;
                p.vy = p.vy / speed * max_speed;
            }
            p.x += p.vx;
            p.y += p.vy;
            mode.handle_edges(p, ctx);
        }
    }

    /// Fade the previous frame, draw every visible particle, then let the
    /// mode draw its overlays.
    pub fn render(&mut self, surface: &mut dyn Surface, ctx: &mut SimContext) {
        let mode = &mut self.modes[self.active];
        let trail = mode.trail_alpha();
        match mode.background() {
            Some(bg) => surface.fill(bg, 1.0 - trail * 0.3),
            None => surface.fill(FADE, 1.0 - trail),
        }

        for p in &self.particles {
            let alpha = mode.particle_alpha(p);
            if alpha <= 0.0 {
                continue;
            }
            surface.fill_circle(p.x, p.y, p.size, p.color, alpha);
        }

        let options = RenderOptions { mask_visible: self.mask_visible };
        mode.on_after_render(surface, &self.landmarks, ctx, options);
    }

    /// Append up to `n` particles without passing the ceiling. Returns the
    /// new count.
    pub fn add_particles(&mut self, n: usize, ctx: &mut SimContext) -> usize {
        let room = self.config.ceiling.saturating_sub(self.particles.len());
        let add = n.min(room);
        for _ in 0..add {
            let p = self.create_particle(ctx);
            self.particles.push(p);
        }
        if add > 0 {
            debug!("added {} particles, now {}", add, self.particles.len());
        }
        self.particles.len()
    }

    /// Drop up to `n` of the oldest particles, never going below the floor.
    /// Returns the new count.
    pub fn remove_particles(&mut self, n: usize) -> usize {
        let spare = self.particles.len().saturating_sub(self.config.floor);
        let remove = n.min(spare);
        if remove > 0 {
            self.particles.drain(..remove);
            debug!("removed {} particles, now {}", remove, self.particles.len());
        }
        self.particles.len()
    }

    /// Canvas changed: re-anchor every particle's home position. Current
    /// positions are left alone.
    pub fn resize(&mut self, ctx: &mut SimContext) {
        let (w, h) = (ctx.size.width, ctx.size.height);
        for p in self.particles.iter_mut() {
            p.base_x = ctx.random() * w;
            p.base_y = ctx.random() * h;
        }
        self.modes[self.active].on_resize(ctx);
        debug!("pool resized to {}x{}", w, h);
    }

    pub fn handle_click(&mut self, ctx: &mut SimContext) {
        self.modes[self.active].handle_click(ctx);
    }

    pub fn set_mask_visible(&mut self, visible: bool) {
        self.mask_visible = visible;
    }

    pub fn mask_visible(&self) -> bool {
        self.mask_visible
    }

    pub fn count(&self) -> usize {
        self.particles.len()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn mode_kind(&self) -> ModeKind {
        ModeKind::ORDER[self.active]
    }

    pub fn mode(&self) -> &dyn Mode {
        self.modes[self.active].as_ref()
    }

    pub fn theme(&self) -> usize {
        self.theme
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }
}
