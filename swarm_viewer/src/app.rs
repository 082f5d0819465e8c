//! Top-level application state and the window loop.
//!
//! `AppState` owns the particle pool, the simulation context, the landmark
//! processor and the persisted settings. It consumes [`Command`]s and
//! tracking frames and composes one screen image per call to
//! [`frame`](AppState::frame). Nothing in it touches the window, so tests
//! drive it directly.

use std::path::PathBuf;
use std::sync::mpsc::{self, Sender, TryRecvError};
use std::time::Instant;

use log::{debug, info, warn};
use minifb::Key;
use swarm_engine::color::BLACK;
use swarm_engine::{
    theme, CanvasSize, ModeKind, OverlayRenderer, ParticlePool, PoolConfig, SimContext, Surface,
};
use swarm_landmarks::{LandmarkProcessor, TrackingFrame};

use crate::error::Result;
use crate::framebuffer::Framebuffer;
use crate::gesture::GestureDispatcher;
use crate::input::{Command, HoldRamp, Ramp};
use crate::settings::{FistAction, Settings, DEFAULT_SETTINGS_FILE};
use crate::tracking::{spawn_tracking_source, SimControl, SimTrackingSource};
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const PREVIEW_W:  usize = 256;
pub const PREVIEW_H:  usize = 144;
const MARGIN:         usize = 16;
const HUD_PX:         f32   = 10.0;
const HUD_LINE:       f32   = 16.0;
const HUD_TEXT:       u32   = 0xFFE0E0E0;
const HUD_BG:         u32   = 0xFF101018;
const PREVIEW_BORDER: u32   = 0xFF00F5FF;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub width:         usize,
    pub height:        usize,
    /// Fixed seed for a reproducible run; `None` seeds from the OS.
    pub seed:          Option<u64>,
    pub settings_path: PathBuf,
    /// Overrides for this run; the persisted values are untouched until
    /// something changes them.
    pub mode:          Option<ModeKind>,
    pub particles:     Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            width:         1280,
            height:        720,
            seed:          None,
            settings_path: PathBuf::from(DEFAULT_SETTINGS_FILE),
            mode:          None,
            particles:     None,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    // ── simulation ───────────────────────────────────────────────────────
    pool:      ParticlePool,
    ctx:       SimContext,
    processor: LandmarkProcessor,
    overlay:   OverlayRenderer,

    // ── tracking ─────────────────────────────────────────────────────────
    latest:     TrackingFrame,
    dispatcher: GestureDispatcher,
    sim_tx:     Option<Sender<SimControl>>,

    // ── surfaces ─────────────────────────────────────────────────────────
    /// Particle canvas; keeps its contents between frames for trails.
    canvas:  Framebuffer,
    preview: Framebuffer,
    /// Canvas plus preview and HUD, rebuilt every frame.
    screen:  Framebuffer,

    // ── ui ───────────────────────────────────────────────────────────────
    settings:      Settings,
    settings_path: Option<PathBuf>,
    paused:        bool,
    grow:          HoldRamp,
    shrink:        HoldRamp,
}

impl AppState {
    /// `settings_path` of `None` keeps settings in memory only.
    pub fn new(
        cfg: &AppConfig,
        settings: Settings,
        settings_path: Option<PathBuf>,
        sim_tx: Option<Sender<SimControl>>,
    ) -> Self {
        let size = CanvasSize::new(cfg.width as f32, cfg.height as f32);
        let mut ctx = match cfg.seed {
            Some(seed) => SimContext::seeded(seed, size),
            None       => SimContext::from_os_rng(size),
        };

        let mode = cfg.mode.unwrap_or_else(|| settings.mode_kind());
        let config = cfg.particles.or(settings.particle_count).map(PoolConfig::fixed).unwrap_or_default();
        let mut pool = ParticlePool::new(config, mode);
        pool.init(&mut ctx);
        pool.set_theme(settings.theme, &mut ctx);
        pool.set_mask_visible(settings.mask_visible);

        let mut processor = LandmarkProcessor::new();
        processor.set_canvas_size(size.width, size.height);

        info!("{} particles, mode {}, theme {}", pool.count(), mode, theme(pool.theme()).name);

        AppState {
            pool,
            ctx,
            processor,
            overlay: OverlayRenderer::new(),
            latest: TrackingFrame::default(),
            dispatcher: GestureDispatcher::new(),
            sim_tx,
            canvas: Framebuffer::new(cfg.width, cfg.height, BLACK),
            preview: Framebuffer::new(PREVIEW_W, PREVIEW_H, BLACK),
            screen: Framebuffer::new(cfg.width, cfg.height, BLACK),
            settings,
            settings_path,
            paused: false,
            grow: HoldRamp::default(),
            shrink: HoldRamp::default(),
        }
    }

    // ── commands ─────────────────────────────────────────────────────────

    /// Apply one command. Returns `false` when the app should quit.
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::NextMode      => self.select_mode(self.pool.mode_kind().next()),
            Command::PrevMode      => self.select_mode(self.pool.mode_kind().prev()),
            Command::SelectMode(k) => self.select_mode(k),
            Command::CycleTheme    => self.cycle_theme(),
            Command::CycleFistAction => {
                self.settings.fist_action = match self.settings.fist_action {
                    FistAction::None   => FistAction::Theme,
                    FistAction::Theme  => FistAction::Mode,
                    FistAction::Mode   => FistAction::Camera,
                    FistAction::Camera => FistAction::None,
                };
                self.persist();
            }
            Command::ToggleMask => {
                self.settings.mask_visible = !self.settings.mask_visible;
                self.pool.set_mask_visible(self.settings.mask_visible);
                self.persist();
            }
            Command::ToggleCamera => self.toggle_camera(),
            Command::ToggleHud => {
                self.settings.display_visible = !self.settings.display_visible;
                self.persist();
            }
            Command::TogglePause => {
                self.paused = !self.paused;
                debug!("paused: {}", self.paused);
            }
            Command::Pose(pose) => self.send_sim(SimControl::Pose(pose)),
            Command::ToggleHand => self.send_sim(SimControl::ToggleHand),
            Command::ToggleFace => self.send_sim(SimControl::ToggleFace),
            Command::Quit       => return false,
        }
        true
    }

    fn select_mode(&mut self, kind: ModeKind) {
        self.pool.set_mode(kind, &mut self.ctx);
        self.settings.set_mode(kind);
        self.settings.theme = self.pool.theme();
        self.persist();
    }

    fn cycle_theme(&mut self) {
        self.settings.theme = self.pool.cycle_theme(&mut self.ctx);
        self.persist();
    }

    fn toggle_camera(&mut self) {
        self.settings.camera_visible = !self.settings.camera_visible;
        self.persist();
    }

    fn send_sim(&self, control: SimControl) {
        if let Some(tx) = &self.sim_tx {
            // A stopped tracker just means no more frames.
            let _ = tx.send(control);
        }
    }

    // ── tracking ─────────────────────────────────────────────────────────

    /// Mouse position in window pixels; the simulated hand follows it.
    pub fn pointer(&self, x: f32, y: f32) {
        let (w, h) = (self.canvas.width() as f32, self.canvas.height() as f32);
        if w > 0.0 && h > 0.0 {
            // Camera space is unmirrored; the processor flips x back.
            self.send_sim(SimControl::Pointer { x: 1.0 - x / w, y: y / h });
        }
    }

    /// Latest tracking results. They become the landmark list the next
    /// `frame` sees, and a visible fist may fire the configured action.
    pub fn ingest(&mut self, frame: TrackingFrame, now_ms: f64) {
        let landmarks = self.processor.process(frame.hands.as_ref(), frame.face.as_ref());
        self.pool.set_landmarks(landmarks);

        match self.dispatcher.dispatch(self.settings.fist_action, frame.hands.as_ref(), now_ms) {
            Some(FistAction::Theme)  => self.cycle_theme(),
            Some(FistAction::Mode)   => self.select_mode(self.pool.mode_kind().next()),
            Some(FistAction::Camera) => self.toggle_camera(),
            Some(FistAction::None) | None => {}
        }
        self.latest = frame;
    }

    pub fn click(&mut self) {
        self.pool.handle_click(&mut self.ctx);
    }

    // ── per-frame ────────────────────────────────────────────────────────

    /// Held count keys. Runs even while paused; the count is persisted when
    /// a key is released.
    pub fn hold(&mut self, grow_held: bool, shrink_held: bool, now_ms: f64) {
        let grow = self.grow.update(grow_held, now_ms);
        let shrink = self.shrink.update(shrink_held, now_ms);
        if let Ramp::Step(n) = grow {
            self.pool.add_particles(n, &mut self.ctx);
        }
        if let Ramp::Step(n) = shrink {
            self.pool.remove_particles(n);
        }
        if grow == Ramp::Released || shrink == Ramp::Released {
            self.settings.particle_count = Some(self.pool.count());
            debug!("particle count -> {}", self.pool.count());
            self.persist();
        }
    }

    /// Step and draw one frame at `now_ms`. Paused: the canvas is left as it
    /// was, but the preview and HUD still refresh.
    pub fn frame(&mut self, now_ms: f64) {
        self.ctx.set_time(now_ms);
        if !self.paused {
            self.pool.update(&mut self.ctx);
            self.pool.render(&mut self.canvas, &mut self.ctx);
        }

        self.screen.copy_from(&self.canvas);
        if self.settings.camera_visible {
            self.overlay.draw(&mut self.preview, self.latest.hands.as_ref(), self.latest.face.as_ref());
            let x = self.screen.width().saturating_sub(PREVIEW_W + MARGIN);
            let y = self.screen.height().saturating_sub(PREVIEW_H + MARGIN);
            self.screen.blit(&self.preview, x, y, PREVIEW_W, PREVIEW_H);
            self.screen.stroke_rect(x, y, PREVIEW_W, PREVIEW_H, PREVIEW_BORDER);
        }
        if self.settings.display_visible {
            self.draw_hud();
        }
    }

    fn draw_hud(&mut self) {
        let lines = self.hud_lines();
        let width = lines.iter().map(|l| self.screen.text_width(l, HUD_PX)).fold(0.0, f32::max);
        let (x, y) = (MARGIN as f32, MARGIN as f32);
        self.screen.fill_rect(x - 6.0, y - 6.0, width + 12.0, HUD_LINE * lines.len() as f32 + 6.0, HUD_BG, 0.6);
        for (i, line) in lines.iter().enumerate() {
            self.screen.fill_text(line, x, y + i as f32 * HUD_LINE, HUD_PX, HUD_TEXT, 1.0);
        }
    }

    pub fn hud_lines(&self) -> Vec<String> {
        let fist = match self.settings.fist_action {
            FistAction::None   => "none",
            FistAction::Theme  => "theme",
            FistAction::Mode   => "mode",
            FistAction::Camera => "camera",
        };
        let status = if self.paused { "Paused" } else { self.latest.status().label() };
        vec![
            format!("{}  |  {}  |  {} particles", self.pool.mode_kind().label(), theme(self.pool.theme()).name, self.pool.count()),
            format!("fist: {}", fist),
            status.to_string(),
        ]
    }

    /// Window changed size: reallocate surfaces and re-anchor the swarm.
    pub fn resize(&mut self, width: usize, height: usize) {
        if (width, height) == (self.canvas.width(), self.canvas.height()) || width == 0 || height == 0 {
            return;
        }
        self.canvas.resize(width, height, BLACK);
        self.ctx.size = CanvasSize::new(width as f32, height as f32);
        self.processor.set_canvas_size(width as f32, height as f32);
        self.pool.resize(&mut self.ctx);
    }

    /// Persist the final particle count and stop the tracker.
    pub fn shutdown(&mut self) {
        self.settings.particle_count = Some(self.pool.count());
        self.persist();
        self.send_sim(SimControl::Stop);
    }

    fn persist(&self) {
        if let Some(path) = &self.settings_path {
            if let Err(e) = self.settings.save(path) {
                warn!("could not save settings: {}", e);
            }
        }
    }

    // ── accessors ────────────────────────────────────────────────────────

    pub fn pool(&self) -> &ParticlePool   { &self.pool }
    pub fn settings(&self) -> &Settings   { &self.settings }
    pub fn screen(&self) -> &Framebuffer  { &self.screen }
    pub fn is_paused(&self) -> bool       { self.paused }
}

// ════════════════════════════════════════════════════════════════════════════
// run(): the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Open the window, start the simulated tracker and drive the frame loop
/// until the window closes or the user quits.
pub fn run(cfg: AppConfig) -> Result<()> {
    let settings = Settings::load_or_default(&cfg.settings_path);

    // ── Simulated tracker on its own thread ──────────────────────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimControl>();
    let tracker_seed = cfg.seed.unwrap_or_else(rand::random);
    let frames = spawn_tracking_source(SimTrackingSource::new(sim_rx, tracker_seed));

    let mut vis = Visualizer::new(cfg.width, cfg.height)?;
    let mut app = AppState::new(&cfg, settings, Some(cfg.settings_path.clone()), Some(sim_tx));
    let start = Instant::now();

    'main: while vis.is_open() {
        let now_ms = start.elapsed().as_secs_f64() * 1000.0;

        for command in vis.commands() {
            if !app.apply(command) {
                break 'main;
            }
        }
        if let Some((x, y)) = vis.mouse() {
            app.pointer(x, y);
        }
        if vis.take_click() {
            app.click();
        }

        // Only the newest frame matters; the tracker may run ahead.
        let mut newest = None;
        loop {
            match frames.try_recv() {
                Ok(frame) => newest = Some(frame),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        if let Some(frame) = newest {
            app.ingest(frame, now_ms);
        }

        let (w, h) = vis.size();
        app.resize(w, h);
        app.hold(vis.is_key_down(Key::Right), vis.is_key_down(Key::Left), now_ms);
        app.frame(now_ms);
        vis.present(app.screen())?;
    }

    app.shutdown();
    info!("bye");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::{synth_hand, HandPose};
    use pretty_assertions::assert_eq;
    use swarm_landmarks::HandResults;
    use tempfile::TempDir;

    fn config() -> AppConfig {
        AppConfig { width: 320, height: 240, seed: Some(11), particles: Some(300), ..AppConfig::default() }
    }

    fn make_app() -> AppState {
        AppState::new(&config(), Settings::default(), None, None)
    }

    fn fist_frame() -> TrackingFrame {
        TrackingFrame {
            hands: Some(HandResults { hands: vec![synth_hand(HandPose::Fist, 0.5, 0.5)] }),
            ..TrackingFrame::default()
        }
    }

    #[test]
    fn starts_from_settings_and_overrides() {
        let settings = Settings { mode: "rain".into(), theme: 2, ..Settings::default() };
        let app = AppState::new(&config(), settings, None, None);
        assert_eq!(app.pool().mode_kind(), ModeKind::Rain);
        assert_eq!(app.pool().theme(), 2);
        assert_eq!(app.pool().count(), 300);

        let cfg = AppConfig { mode: Some(ModeKind::Matrix), ..config() };
        let app = AppState::new(&cfg, Settings::default(), None, None);
        assert_eq!(app.pool().mode_kind(), ModeKind::Matrix);
    }

    #[test]
    fn mode_commands_cycle_and_record() {
        let mut app = make_app();
        assert!(app.apply(Command::NextMode));
        assert_eq!(app.pool().mode_kind(), ModeKind::Repel);
        assert!(app.apply(Command::PrevMode));
        assert!(app.apply(Command::PrevMode));
        assert_eq!(app.pool().mode_kind(), ModeKind::Sketch);
        assert_eq!(app.settings().mode, "sketch");
        assert!(app.apply(Command::SelectMode(ModeKind::Galactic)));
        assert_eq!(app.settings().mode_kind(), ModeKind::Galactic);
        assert_eq!(app.settings().theme, app.pool().theme());
        assert!(!app.apply(Command::Quit));
    }

    #[test]
    fn toggles_flip_settings() {
        let mut app = make_app();
        app.apply(Command::ToggleMask);
        assert!(!app.settings().mask_visible);
        assert!(!app.pool().mask_visible());
        app.apply(Command::ToggleCamera);
        assert!(app.settings().camera_visible);
        app.apply(Command::ToggleHud);
        assert!(!app.settings().display_visible);
        app.apply(Command::CycleFistAction);
        assert_eq!(app.settings().fist_action, FistAction::Theme);
    }

    #[test]
    fn pause_freezes_the_swarm() {
        let mut app = make_app();
        app.frame(16.0);
        app.apply(Command::TogglePause);
        let before: Vec<(f32, f32)> = app.pool().particles().iter().map(|p| (p.x, p.y)).collect();
        app.frame(32.0);
        app.frame(48.0);
        let after: Vec<(f32, f32)> = app.pool().particles().iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(before, after);
        assert_eq!(app.hud_lines()[2], "Paused");
    }

    #[test]
    fn fist_fires_configured_action_with_cooldown() {
        let mut app = make_app();
        app.apply(Command::CycleFistAction);
        let theme = app.pool().theme();
        app.ingest(fist_frame(), 1000.0);
        assert_eq!(app.pool().theme(), (theme + 1) % swarm_engine::theme_count());
        app.ingest(fist_frame(), 1100.0);
        assert_eq!(app.pool().theme(), (theme + 1) % swarm_engine::theme_count());
        assert!(!app.pool().landmarks().is_empty());
    }

    #[test]
    fn fist_without_action_does_nothing() {
        let mut app = make_app();
        let kind = app.pool().mode_kind();
        app.ingest(fist_frame(), 0.0);
        assert_eq!(app.pool().mode_kind(), kind);
        app.ingest(TrackingFrame::default(), 16.0);
        assert!(app.pool().landmarks().is_empty());
    }

    #[test]
    fn held_keys_ramp_and_persist_on_release() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("s.json");
        let mut app = AppState::new(&config(), Settings::default(), Some(path.clone()), None);
        app.hold(true, false, 0.0);
        app.hold(true, false, 2500.0);
        assert_eq!(app.pool().count(), 311);
        assert!(!path.exists());
        app.hold(false, false, 2600.0);
        assert_eq!(Settings::load(&path).unwrap().particle_count, Some(311));

        app.hold(false, true, 3000.0);
        assert_eq!(app.pool().count(), 310);
    }

    #[test]
    fn frame_draws_hud_and_preview() {
        let mut app = make_app();
        app.apply(Command::ToggleCamera);
        app.ingest(fist_frame(), 0.0);
        app.frame(16.0);
        let screen = app.screen();
        assert_eq!(screen.pixels().len(), 320 * 240);
        // Preview sits bottom-right; check its border's top-left corner.
        assert_eq!(screen.pixel(320 - PREVIEW_W - MARGIN, 240 - PREVIEW_H - MARGIN), Some(PREVIEW_BORDER));
        assert!(app.hud_lines()[0].starts_with("Party"));
    }

    #[test]
    fn resize_reallocates_surfaces() {
        let mut app = make_app();
        app.resize(640, 360);
        app.frame(16.0);
        assert_eq!((app.screen().width(), app.screen().height()), (640, 360));
        app.resize(0, 0);
        app.frame(32.0);
        assert_eq!(app.screen().width(), 640);
    }

    #[test]
    fn shutdown_persists_count() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("s.json");
        let mut app = AppState::new(&config(), Settings::default(), Some(path.clone()), None);
        app.shutdown();
        assert_eq!(Settings::load(&path).unwrap().particle_count, Some(300));
    }
}
