//! The particle record and its mode-owned scratch slot.

/// One simulated point. Owned by the pool; modes get `&mut` per call.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x:             f32,
    pub y:             f32,
    pub vx:            f32,
    pub vy:            f32,
    /// Home anchor, re-randomised on resize.
    pub base_x:        f32,
    pub base_y:        f32,
    pub size:          f32,
    pub color:         u32,
    pub alpha:         f32,
    /// Golden-ratio target; `None` when no landmarks are tracked.
    pub target:        Option<(f32, f32)>,
    pub target_spread: f32,

    // ── shared motion seeds ──
    pub flow_angle:    f32,
    pub flow_speed:    f32,
    pub phase:         f32,
    pub wave_amp:      f32,

    /// Whatever the active mode needs; reset on mode change.
    pub scratch:       Scratch,
}

impl Particle {
    pub fn speed(&self) -> f32 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }
}

impl Default for Particle {
    fn default() -> Self {
        Particle {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            base_x: 0.0,
            base_y: 0.0,
            size: 1.0,
            color: 0xFFFFFFFF,
            alpha: 1.0,
            target: None,
            target_spread: 5.0,
            flow_angle: 0.0,
            flow_speed: 1.0,
            phase: 0.0,
            wave_amp: 0.5,
            scratch: Scratch::None,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Scratch: mode-specific per-particle state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ConfettiState {
    /// Clock time of the last burst that launched this particle.
    pub burst_time:    Option<f64>,
    pub burst_dir:     (f32, f32),
    pub in_silhouette: bool,
    /// Drifts like snow instead of joining bursts.
    pub steady:        bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OrbitState {
    pub eccentricity: f32,
    pub orbit_phase:  f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StarState {
    pub twinkle:      f32,
    pub hand_twinkle: f32,
    pub depth:        f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InkState {
    pub waiting: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Scratch {
    #[default]
    None,
    Confetti(ConfettiState),
    Orbit(OrbitState),
    Star(StarState),
    Ink(InkState),
}

macro_rules! scratch_accessor {
    ($name:ident, $get:ident, $variant:ident, $ty:ty) => {
        /// Mutable view of this variant, installing a default one first if
        /// the slot holds something else.
        pub fn $name(&mut self) -> &mut $ty {
            if !matches!(self, Scratch::$variant(_)) {
                *self = Scratch::$variant(<$ty>::default());
            }
            match self {
                Scratch::$variant(s) => s,
                _ => unreachable!(),
            }
        }

        pub fn $get(&self) -> Option<&$ty> {
            match self {
                Scratch::$variant(s) => Some(s),
                _ => None,
            }
        }
    };
}

impl Scratch {
    scratch_accessor!(confetti, as_confetti, Confetti, ConfettiState);
    scratch_accessor!(orbit, as_orbit, Orbit, OrbitState);
    scratch_accessor!(star, as_star, Star, StarState);
    scratch_accessor!(ink, as_ink, Ink, InkState);
}
