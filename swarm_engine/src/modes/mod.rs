//! Behaviour modes.
//!
//! A [`Mode`] owns the per-particle physics, the edge policy, the per-frame
//! batch effects and the overlay for one visual style. The pool drives it
//! through this trait only; it never looks at the concrete type.
//!
//! | Mode | Physics | Friction / max | Edges | Theme |
//! |---|---|---|---|---|
//! | party    | burst then confetti fall, silhouette cut-out | 0.99 / 8 | wrap x, recycle via bursts | Rainbow |
//! | repel    | flow field + push away from landmarks        | 0.98 / 4 | wrap | Fire |
//! | attract  | pull to golden-ratio target, drift home      | 0.95 / 8 | wrap | - |
//! | gravity  | inverse-square + tangential orbit            | self / 12 | bounce 0.8 | Galaxy |
//! | rain     | fall, damp and drip near landmarks           | self / 10 | reset to top | Ocean |
//! | snow     | gentle fall + wobble, freeze near landmarks  | self / 3 | reset to top | - |
//! | galactic | Milky-Way layout, twinkle, shooting stars    | 0.98 / 3 | wrap | Galaxy |
//! | matrix   | particles hidden; falling glyph columns      | - | none | Matrix |
//! | sketch   | dormant ink emitted by hand motion, finger trails | self / 5 | wrap x, dormant off bottom | Mercury |

use log::warn;
use swarm_landmarks::Landmark;

use crate::context::SimContext;
use crate::particle::Particle;
use crate::surface::{CanvasSize, Surface};

pub mod attract;
pub mod galactic;
pub mod gravity;
pub mod matrix;
pub mod party;
pub mod rain;
pub mod repel;
pub mod sketch;
pub mod snow;

pub use attract::AttractMode;
pub use galactic::GalacticMode;
pub use gravity::GravityMode;
pub use matrix::MatrixMode;
pub use party::PartyMode;
pub use rain::RainMode;
pub use repel::RepelMode;
pub use sketch::SketchMode;
pub use snow::SnowMode;

/// Render-time switches passed to [`Mode::on_after_render`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    pub mask_visible: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions { mask_visible: true }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Mode trait
// ════════════════════════════════════════════════════════════════════════════

pub trait Mode {
    fn kind(&self) -> ModeKind;

    /// Called every time the mode becomes active; reset mode-local state.
    fn on_activate(&mut self, _ctx: &mut SimContext) {}

    /// Canvas changed size mid-run.
    fn on_resize(&mut self, _ctx: &mut SimContext) {}

    /// Place a new or recycled particle. Default: uniform over the canvas.
    fn init_particle(&mut self, p: &mut Particle, ctx: &mut SimContext) {
        p.x = ctx.random() * ctx.size.width;
        p.y = ctx.random() * ctx.size.height;
    }

    /// Batch effects, once per frame before any particle moves.
    fn on_before_update(&mut self, _particles: &mut [Particle], _landmarks: &[Landmark], _ctx: &mut SimContext) {}

    /// Mutate velocity only; the pool integrates.
    fn update_particle(&mut self, p: &mut Particle, landmarks: &[Landmark], ctx: &mut SimContext);

    fn handle_edges(&mut self, p: &mut Particle, ctx: &mut SimContext) {
        wrap_all(p, ctx.size);
    }

    fn friction(&self) -> f32 { 0.95 }
    fn uses_friction(&self) -> bool { true }
    fn max_speed(&self) -> f32 { 8.0 }
    fn trail_alpha(&self) -> f32 { 0.15 }

    /// Solid background for light modes; `None` fades to the dark fill.
    fn background(&self) -> Option<u32> { None }

    fn particle_alpha(&self, p: &Particle) -> f32 { p.alpha }

    /// Theme applied automatically on activation.
    fn preset_theme(&self) -> Option<usize> { None }

    fn on_after_render(
        &mut self,
        _surface: &mut dyn Surface,
        _landmarks: &[Landmark],
        _ctx: &mut SimContext,
        _options: RenderOptions,
    ) {
    }

    /// Canvas click; only interactive modes care.
    fn handle_click(&mut self, _ctx: &mut SimContext) {}
}

// ════════════════════════════════════════════════════════════════════════════
// Registry
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ModeKind {
    #[default]
    Party,
    Repel,
    Attract,
    Gravity,
    Rain,
    Snow,
    Galactic,
    Matrix,
    Sketch,
}

impl ModeKind {
    /// Cycle order.
    pub const ORDER: [ModeKind; 9] = [
        ModeKind::Party,
        ModeKind::Repel,
        ModeKind::Attract,
        ModeKind::Gravity,
        ModeKind::Rain,
        ModeKind::Snow,
        ModeKind::Galactic,
        ModeKind::Matrix,
        ModeKind::Sketch,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ModeKind::Party    => "party",
            ModeKind::Repel    => "repel",
            ModeKind::Attract  => "attract",
            ModeKind::Gravity  => "gravity",
            ModeKind::Rain     => "rain",
            ModeKind::Snow     => "snow",
            ModeKind::Galactic => "galactic",
            ModeKind::Matrix   => "matrix",
            ModeKind::Sketch   => "sketch",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ModeKind::Party    => "Party",
            ModeKind::Repel    => "Repel",
            ModeKind::Attract  => "Attract",
            ModeKind::Gravity  => "Gravity",
            ModeKind::Rain     => "Rain",
            ModeKind::Snow     => "Snow",
            ModeKind::Galactic => "Galactic",
            ModeKind::Matrix   => "Matrix",
            ModeKind::Sketch   => "Sketch",
        }
    }

    pub fn from_name(name: &str) -> Option<ModeKind> {
        let name = name.trim();
        Self::ORDER.iter().copied().find(|k| k.name().eq_ignore_ascii_case(name))
    }

    /// Unknown names fall back to the default mode with a warning.
    pub fn from_name_or_default(name: &str) -> ModeKind {
        Self::from_name(name).unwrap_or_else(|| {
            warn!("unknown mode {:?}, falling back to {}", name, ModeKind::default().name());
            ModeKind::default()
        })
    }

    /// Position in [`ORDER`](Self::ORDER).
    pub fn index(self) -> usize {
        Self::ORDER.iter().position(|&k| k == self).unwrap_or(0)
    }

    pub fn next(self) -> ModeKind {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> ModeKind {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub fn create(self) -> Box<dyn Mode> {
        match self {
            ModeKind::Party    => Box::new(PartyMode::new()),
            ModeKind::Repel    => Box::new(RepelMode::new()),
            ModeKind::Attract  => Box::new(AttractMode::new()),
            ModeKind::Gravity  => Box::new(GravityMode::new()),
            ModeKind::Rain     => Box::new(RainMode::new()),
            ModeKind::Snow     => Box::new(SnowMode::new()),
            ModeKind::Galactic => Box::new(GalacticMode::new()),
            ModeKind::Matrix   => Box::new(MatrixMode::new()),
            ModeKind::Sketch   => Box::new(SketchMode::new()),
        }
    }
}

impl std::fmt::Display for ModeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Shared helpers
// ════════════════════════════════════════════════════════════════════════════

/// Distances below this are treated as this when used as a divisor.
pub const MIN_DIST: f32 = 1e-3;

/// Wrap on all four edges.
pub fn wrap_all(p: &mut Particle, size: CanvasSize) {
    wrap_x(p, size);
    if p.y < 0.0 {
        p.y = size.height;
    } else if p.y > size.height {
        p.y = 0.0;
    }
}

pub fn wrap_x(p: &mut Particle, size: CanvasSize) {
    if p.x < 0.0 {
        p.x = size.width;
    } else if p.x > size.width {
        p.x = 0.0;
    }
}

/// Precipitation edge policy: wrap sideways, respawn above the top with no
/// velocity after leaving the bottom, and pull back anything that floats
/// too far up.
pub fn reset_to_top(p: &mut Particle, ctx: &mut SimContext) {
    wrap_x(p, ctx.size);
    if p.y > ctx.size.height {
        p.y = -10.0;
        p.x = ctx.random() * ctx.size.width;
        p.vx = 0.0;
        p.vy = 0.0;
    }
    if p.y < -50.0 {
        p.y = ctx.size.height;
    }
}

/// Nearest landmark and its distance, `None` for an empty list.
pub fn nearest(landmarks: &[Landmark], x: f32, y: f32) -> Option<(&Landmark, f32)> {
    landmarks
        .iter()
        .map(|l| (l, l.distance_sq_to(x, y)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(l, d2)| (l, d2.sqrt()))
}

/// Smallest distance to any landmark within `radius`, if one is that close.
pub fn closest_within(landmarks: &[Landmark], x: f32, y: f32, radius: f32) -> Option<f32> {
    let r2 = radius * radius;
    landmarks
        .iter()
        .map(|l| l.distance_sq_to(x, y))
        .filter(|&d2| d2 < r2)
        .min_by(f32::total_cmp)
        .map(f32::sqrt)
}
