//! Explicit simulation context: the clock, the random source and the canvas
//! size every pool / mode call reads instead of ambient globals.
//!
//! The host owns one `SimContext`, advances `now_ms` once per frame and
//! passes it down by `&mut`. Tests build one from a fixed seed and step the
//! clock by hand.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::surface::CanvasSize;

#[derive(Clone, Debug)]
pub struct SimContext {
    pub rng:    StdRng,
    /// Milliseconds on the host's monotonic clock.
    pub now_ms: f64,
    pub size:   CanvasSize,
}

impl SimContext {
    pub fn seeded(seed: u64, size: CanvasSize) -> Self {
        SimContext { rng: StdRng::seed_from_u64(seed), now_ms: 0.0, size }
    }

    pub fn from_os_rng(size: CanvasSize) -> Self {
        SimContext { rng: StdRng::from_os_rng(), now_ms: 0.0, size }
    }

    pub fn set_time(&mut self, now_ms: f64) {
        if now_ms.is_finite() {
            self.now_ms = now_ms;
        }
    }

    pub fn advance(&mut self, dt_ms: f64) {
        if dt_ms.is_finite() && dt_ms > 0.0 {
            self.now_ms += dt_ms;
        }
    }

    /// Seconds, for animation phases.
    pub fn now_s(&self) -> f64 {
        self.now_ms * 0.001
    }

    /// Uniform in `[0, 1)`.
    pub fn random(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// Uniform in `[-0.5, 0.5)`, the usual jitter term.
    pub fn jitter(&mut self) -> f32 {
        self.rng.random::<f32>() - 0.5
    }

    /// Uniform in `[lo, lo + span)`.
    pub fn range(&mut self, lo: f32, span: f32) -> f32 {
        lo + self.rng.random::<f32>() * span
    }

    pub fn angle(&mut self) -> f32 {
        self.rng.random::<f32>() * std::f32::consts::TAU
    }

    /// Uniform index in `0..n`; 0 when `n` is 0.
    pub fn pick(&mut self, n: usize) -> usize {
        if n == 0 { 0 } else { self.rng.random_range(0..n) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let size = CanvasSize::new(10.0, 10.0);
        let mut a = SimContext::seeded(42, size);
        let mut b = SimContext::seeded(42, size);
        for _ in 0..10 {
            assert_eq!(a.random(), b.random());
        }
    }

    #[test]
    fn clock_ignores_bad_steps() {
        let mut ctx = SimContext::seeded(1, CanvasSize::default());
        ctx.advance(16.0);
        ctx.advance(-5.0);
        ctx.advance(f64::NAN);
        ctx.set_time(f64::INFINITY);
        assert_eq!(ctx.now_ms, 16.0);
        assert!((ctx.now_s() - 0.016).abs() < 1e-12);
    }

    #[test]
    fn helpers_stay_in_range() {
        let mut ctx = SimContext::seeded(9, CanvasSize::default());
        for _ in 0..1000 {
            let j = ctx.jitter();
            assert!((-0.5..0.5).contains(&j));
            let r = ctx.range(2.0, 4.0);
            assert!((2.0..=6.0).contains(&r));
            assert!(ctx.pick(7) < 7);
        }
        assert_eq!(ctx.pick(0), 0);
    }
}
