//! # swarm_engine
//!
//! A landmark-driven particle swarm. Thousands of particles chase, orbit,
//! avoid or fall around the hand and face landmarks produced by
//! [`swarm_landmarks`], in one of nine behaviour modes.
//!
//! ## Frame cycle
//!
//! ```text
//!   tracking results ──► LandmarkProcessor ──► pool.set_landmarks()
//!                                                   │
//!   pool.update(ctx):  assign_targets ─► mode.on_before_update
//!                      └─ per particle: update_particle ─► friction
//!                                      ─► clamp ─► integrate ─► edges
//!   pool.render(surface, ctx):  fade ─► circles ─► mode.on_after_render
//! ```
//!
//! Everything that would otherwise be ambient (clock, randomness, canvas
//! size) lives in a [`SimContext`] the host passes down each frame, so a
//! seeded context replays a run exactly.
//!
//! ## Quick start
//!
//! ```rust
//! use swarm_engine::{CanvasSize, ModeKind, ParticlePool, PoolConfig, RecordingSurface, SimContext};
//! use swarm_landmarks::{HandResults, LandmarkProcessor, NormalizedPoint};
//!
//! let size = CanvasSize::new(640.0, 480.0);
//! let mut ctx = SimContext::seeded(7, size);
//! let mut pool = ParticlePool::new(PoolConfig::fixed(500), ModeKind::Attract);
//! pool.init(&mut ctx);
//!
//! let mut processor = LandmarkProcessor::new();
//! processor.set_canvas_size(size.width, size.height);
//! let hands = HandResults { hands: vec![vec![NormalizedPoint::new(0.5, 0.5, 0.0); 21]] };
//! pool.set_landmarks(processor.process(Some(&hands), None));
//!
//! let mut surface = RecordingSurface::new(size);
//! pool.update(&mut ctx);
//! pool.render(&mut surface, &mut ctx);
//! assert!(pool.particles().iter().all(|p| p.target.is_some()));
//! ```

pub mod color;
pub mod context;
pub mod mask;
pub mod modes;
pub mod overlay;
pub mod particle;
pub mod pool;
pub mod surface;
pub mod theme;

pub use context::SimContext;
pub use mask::{BlinkTimer, ColorPolicy, FaceMask};
pub use modes::{Mode, ModeKind, RenderOptions};
pub use overlay::OverlayRenderer;
pub use particle::{Particle, Scratch};
pub use pool::{golden_angle, golden_index, spiral_radius, ParticlePool, PoolConfig, PHI, PHI_INV};
pub use surface::{CanvasSize, DrawCall, RecordingSurface, Surface};
pub use theme::{theme, theme_count, Theme, THEMES};
