//! # swarm_viewer
//!
//! Desktop host for the landmark particle swarm: a software-rendered `minifb`
//! window, a simulated hand/face tracker on its own thread, keyboard
//! controls, a fist-gesture dispatcher and JSON-persisted settings.
//!
//! ## Keys
//!
//! | Key | Action |
//! |---|---|
//! | `Space` / `↓` | Next mode |
//! | `↑` / `Tab` | Previous mode |
//! | `1`–`9` | Select mode in cycle order |
//! | `→` / `←` hold | Add / remove particles (×10 after 2 s, ×100 after 5 s) |
//! | `T` | Cycle theme |
//! | `A` | Cycle fist action (none, theme, mode, camera) |
//! | `M` | Toggle face/hand glow mask |
//! | `V` | Toggle camera preview |
//! | `D` | Toggle HUD |
//! | `P` | Pause |
//! | `O` / `F` / `I` | Simulated hand: open / fist / pointing |
//! | `H` | Simulated hands: one, two, none |
//! | `G` | Simulated face on/off |
//! | click | Forwarded to the active mode |
//! | `Q` / `Esc` | Quit |
//!
//! The simulated hand follows the mouse pointer.

pub mod app;
pub mod error;
pub mod framebuffer;
pub mod gesture;
pub mod input;
pub mod settings;
pub mod tracking;
pub mod visualizer;

pub use app::{run, AppConfig, AppState};
pub use error::{Result, ViewerError};
pub use settings::{FistAction, Settings};
