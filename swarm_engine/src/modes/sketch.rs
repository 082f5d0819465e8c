use std::collections::{BTreeMap, HashMap};

use swarm_landmarks::tables::WRIST;
use swarm_landmarks::{detect_pointing, fingers_curled, group_hands, Landmark};

use super::{Mode, ModeKind, RenderOptions};
use crate::color::{rgb, WHITE};
use crate::context::SimContext;
use crate::mask::{ColorPolicy, FaceMask};
use crate::particle::Particle;
use crate::surface::Surface;
use crate::theme::MERCURY_THEME;

const INDEX_TIP: usize = 8;
const INK: u32 = rgb(50, 50, 50);
/// Frame period used when bridging dropped frames.
const FRAME_MS: f64 = 16.0;
const SPEED_WINDOW: usize = 5;

/// One sample of a finger trail. `speed` is px/ms from the previous sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailPoint {
    pub x:       f32,
    pub y:       f32,
    pub time_ms: f64,
    pub speed:   f32,
}

/// Pen-on-paper mode. A pointing index finger draws a fading line, a
/// curled hand rubs lines out, and moving hands shed a few ink specks that
/// drift down the page.
#[derive(Clone, Debug)]
pub struct SketchMode {
    pub gravity:            f32,
    pub drag:               f32,
    pub movement_threshold: f32,
    pub emit_chance:        f32,
    /// Share of the pool allowed off the waiting line at once.
    pub max_active_ratio:   f32,
    pub fade_ms:            f64,
    pub max_gap_ms:         f64,
    pub erase_radius:       f32,
    /// Segments longer than this are treated as pen-up.
    pub max_segment:        f32,
    trails:                 BTreeMap<usize, Vec<TrailPoint>>,
    last_tip:               BTreeMap<usize, TrailPoint>,
    prev_positions:         HashMap<(usize, usize), (f32, f32)>,
    mask:                   FaceMask,
}

impl SketchMode {
    pub fn new() -> Self {
        SketchMode {
            gravity: 0.02,
            drag: 0.99,
            movement_threshold: 3.0,
            emit_chance: 0.01,
            max_active_ratio: 0.1,
            fade_ms: 10_000.0,
            max_gap_ms: 100.0,
            erase_radius: 80.0,
            max_segment: 50.0,
            trails: BTreeMap::new(),
            last_tip: BTreeMap::new(),
            prev_positions: HashMap::new(),
            mask: FaceMask::new(ColorPolicy::Fixed(0xFF333333)),
        }
    }

    pub fn trail(&self, hand_id: usize) -> Option<&[TrailPoint]> {
        self.trails.get(&hand_id).map(Vec::as_slice)
    }

    pub fn clear_trails(&mut self) {
        self.trails.clear();
        self.last_tip.clear();
    }

    fn extend_trail(&mut self, hand_id: usize, tip: &Landmark, now: f64) {
        let trail = self.trails.entry(hand_id).or_default();

        if let Some(last) = self.last_tip.get(&hand_id) {
            let gap = now - last.time_ms;
            if !trail.is_empty() && gap > 20.0 && gap <= self.max_gap_ms {
                let steps = (gap / FRAME_MS).ceil() as usize;
                for i in 1..steps {
                    let t = i as f32 / steps as f32;
                    trail.push(TrailPoint {
                        x: last.x + (tip.x - last.x) * t,
                        y: last.y + (tip.y - last.y) * t,
                        time_ms: last.time_ms + gap * t as f64,
                        speed: last.speed,
                    });
                }
            }
        }

        let speed = match trail.last() {
            Some(prev) => {
                let dt = now - prev.time_ms;
                let dist = ((tip.x - prev.x).powi(2) + (tip.y - prev.y).powi(2)).sqrt();
                if dt > 0.0 { dist / dt as f32 } else { 0.0 }
            }
            None => 0.0,
        };
        let point = TrailPoint { x: tip.x, y: tip.y, time_ms: now, speed };
        trail.push(point);
        self.last_tip.insert(hand_id, point);
    }

    fn erase_near(&mut self, x: f32, y: f32) {
        let r2 = self.erase_radius * self.erase_radius;
        for trail in self.trails.values_mut() {
            trail.retain(|p| (p.x - x).powi(2) + (p.y - y).powi(2) >= r2);
        }
    }

    fn emit_specks(&mut self, particles: &mut [Particle], landmarks: &[Landmark], ctx: &mut SimContext) {
        let max_active = (particles.len() as f32 * self.max_active_ratio) as usize;
        let mut active = particles.iter().filter(|p| !is_waiting(p)).count();

        for lm in landmarks {
            let Some(hand_id) = lm.hand_id() else { continue };
            let key = (hand_id, lm.index);
            if let Some(&(px, py)) = self.prev_positions.get(&key) {
                let moved = ((lm.x - px).powi(2) + (lm.y - py).powi(2)).sqrt();
                if moved > self.movement_threshold && active < max_active && ctx.random() < self.emit_chance {
                    if let Some(p) = particles.iter_mut().find(|p| is_waiting(p)) {
                        p.x = lm.x + ctx.jitter() * 10.0;
                        p.y = lm.y + ctx.jitter() * 10.0;
                        p.vx = ctx.jitter() * 2.0;
                        p.vy = ctx.jitter() * 2.0;
                        p.scratch.ink().waiting = false;
                        active += 1;
                    }
                }
            }
            self.prev_positions.insert(key, (lm.x, lm.y));
        }
    }
}

impl Default for SketchMode {
    fn default() -> Self {
        Self::new()
    }
}

fn is_waiting(p: &Particle) -> bool {
    p.scratch.as_ink().is_some_and(|s| s.waiting)
}

impl Mode for SketchMode {
    fn kind(&self) -> ModeKind {
        ModeKind::Sketch
    }

    fn on_activate(&mut self, ctx: &mut SimContext) {
        self.prev_positions.clear();
        self.clear_trails();
        self.mask.blink.reset(ctx.now_ms);
    }

    fn init_particle(&mut self, p: &mut Particle, ctx: &mut SimContext) {
        p.x = ctx.random() * ctx.size.width;
        p.y = ctx.size.height + 10.0;
        p.vx = 0.0;
        p.vy = 0.0;
        p.scratch.ink().waiting = true;
    }

    fn on_before_update(&mut self, particles: &mut [Particle], landmarks: &[Landmark], ctx: &mut SimContext) {
        let now = ctx.now_ms;
        let hands = group_hands(landmarks);

        for hand in &hands {
            let Some(joints) = hand.joints() else { continue };
            let tip = joints[INDEX_TIP];
            if detect_pointing(&joints) {
                self.extend_trail(hand.hand_id, &tip, now);
            } else {
                // keep the tip fresh so a resumed stroke can bridge the gap
                self.last_tip.insert(hand.hand_id, TrailPoint { x: tip.x, y: tip.y, time_ms: now, speed: 0.0 });
            }
        }

        let fade = self.fade_ms;
        for trail in self.trails.values_mut() {
            let expired = trail.iter().take_while(|p| now - p.time_ms > fade).count();
            trail.drain(..expired);
        }

        for hand in &hands {
            let Some(joints) = hand.joints() else { continue };
            if fingers_curled(&joints) {
                let wrist = joints[WRIST];
                self.erase_near(wrist.x, wrist.y);
            }
        }

        self.emit_specks(particles, landmarks, ctx);
    }

    fn update_particle(&mut self, p: &mut Particle, _landmarks: &[Landmark], _ctx: &mut SimContext) {
        if is_waiting(p) {
            return;
        }
        p.vy += self.gravity;
        p.vx *= self.drag;
        p.vy *= self.drag;
    }

    fn handle_edges(&mut self, p: &mut Particle, ctx: &mut SimContext) {
        if is_waiting(p) {
            return;
        }
        let size = ctx.size;
        if p.x < 0.0 {
            p.x = size.width;
        } else if p.x > size.width {
            p.x = 0.0;
        }
        if p.y < 0.0 {
            p.y = 0.0;
            p.vy *= -0.5;
        }
        if p.y > size.height + 5.0 {
            p.vx = 0.0;
            p.vy = 0.0;
            p.scratch.ink().waiting = true;
        }
    }

    fn friction(&self) -> f32 { 1.0 }
    fn uses_friction(&self) -> bool { false }
    fn max_speed(&self) -> f32 { 5.0 }
    fn trail_alpha(&self) -> f32 { 0.3 }
    fn background(&self) -> Option<u32> { Some(WHITE) }
    fn preset_theme(&self) -> Option<usize> { Some(MERCURY_THEME) }

    fn particle_alpha(&self, p: &Particle) -> f32 {
        if is_waiting(p) { 0.0 } else { 1.0 }
    }

    fn on_after_render(
        &mut self,
        surface: &mut dyn Surface,
        landmarks: &[Landmark],
        ctx: &mut SimContext,
        options: RenderOptions,
    ) {
        let now = ctx.now_ms;
        for trail in self.trails.values() {
            for i in 1..trail.len() {
                let (a, b) = (trail[i - 1], trail[i]);
                if ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt() > self.max_segment {
                    continue;
                }
                let alpha = (1.0 - (now - b.time_ms) / self.fade_ms).max(0.1) as f32;
                let lo = i.saturating_sub(SPEED_WINDOW);
                let hi = (i + SPEED_WINDOW).min(trail.len() - 1);
                let window = &trail[lo..=hi];
                let avg = window.iter().map(|p| p.speed).sum::<f32>() / window.len() as f32;
                let width = 1.5 + 4.5 * (-avg * 1.5).exp();
                surface.stroke_line(a.x, a.y, b.x, b.y, width, INK, alpha);
            }
        }
        if options.mask_visible {
            self.mask.draw(surface, landmarks, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{CanvasSize, DrawCall, RecordingSurface};

    fn ctx() -> SimContext {
        SimContext::seeded(17, CanvasSize::new(640.0, 480.0))
    }

    /// Hand centred on (x, y): either pointing or with every finger curled.
    fn hand(x: f32, y: f32, pointing: bool) -> Vec<Landmark> {
        (0..21)
            .map(|i| {
                let dy = match i {
                    0 => 60.0,
                    6 | 10 | 14 | 18 => -10.0,
                    8 if pointing => -40.0,
                    8 | 12 | 16 | 20 => 10.0,
                    _ => 0.0,
                };
                Landmark::hand(x, y + dy, i, 0)
            })
            .collect()
    }

    #[test]
    fn particles_start_waiting_below_canvas() {
        let mut c = ctx();
        let mut m = SketchMode::new();
        let mut p = Particle::default();
        m.init_particle(&mut p, &mut c);
        assert_eq!(p.y, 490.0);
        assert!(is_waiting(&p));
        assert_eq!(m.particle_alpha(&p), 0.0);
        let before = p.clone();
        m.update_particle(&mut p, &[], &mut c);
        m.handle_edges(&mut p, &mut c);
        assert_eq!(p, before);
    }

    #[test]
    fn pointing_draws_and_bridges_gaps() {
        let mut c = ctx();
        let mut m = SketchMode::new();
        m.on_before_update(&mut [], &hand(100.0, 200.0, true), &mut c);
        c.advance(16.0);
        m.on_before_update(&mut [], &hand(104.0, 200.0, true), &mut c);
        assert_eq!(m.trail(0).map(<[_]>::len), Some(2));
        let speed = m.trail(0).map(|t| t[1].speed).unwrap_or_default();
        assert!((speed - 0.25).abs() < 1e-4);

        // 64 ms gap: three interpolated samples plus the live one
        c.advance(64.0);
        m.on_before_update(&mut [], &hand(120.0, 200.0, true), &mut c);
        let trail = m.trail(0).unwrap_or_default();
        assert_eq!(trail.len(), 6);
        assert!((trail[3].x - 112.0).abs() < 1e-3);
    }

    #[test]
    fn open_gap_is_not_bridged() {
        let mut c = ctx();
        let mut m = SketchMode::new();
        m.on_before_update(&mut [], &hand(100.0, 200.0, true), &mut c);
        c.advance(500.0);
        m.on_before_update(&mut [], &hand(300.0, 200.0, true), &mut c);
        assert_eq!(m.trail(0).map(<[_]>::len), Some(2));
    }

    #[test]
    fn trail_fades_out_after_ten_seconds() {
        let mut c = ctx();
        let mut m = SketchMode::new();
        m.on_before_update(&mut [], &hand(100.0, 200.0, true), &mut c);
        c.advance(10_001.0);
        m.on_before_update(&mut [], &[], &mut c);
        assert_eq!(m.trail(0).map(<[_]>::len), Some(0));
    }

    #[test]
    fn curled_hand_erases_near_wrist() {
        let mut c = ctx();
        let mut m = SketchMode::new();
        for i in 0..5 {
            m.on_before_update(&mut [], &hand(100.0 + i as f32 * 5.0, 200.0, true), &mut c);
            c.advance(16.0);
        }
        assert_eq!(m.trail(0).map(<[_]>::len), Some(5));
        // wrist lands at (110, 260); the tips were drawn at y 160
        m.on_before_update(&mut [], &hand(110.0, 200.0, false), &mut c);
        assert_eq!(m.trail(0).map(<[_]>::len), Some(5));
        m.on_before_update(&mut [], &hand(110.0, 140.0, false), &mut c);
        assert_eq!(m.trail(0).map(<[_]>::len), Some(0));
    }

    #[test]
    fn render_skips_long_segments_and_thins_fast_strokes() {
        let mut c = ctx();
        let mut m = SketchMode::new();
        m.trails.insert(
            0,
            vec![
                TrailPoint { x: 0.0, y: 0.0, time_ms: 0.0, speed: 0.0 },
                TrailPoint { x: 10.0, y: 0.0, time_ms: 0.0, speed: 0.0 },
                TrailPoint { x: 200.0, y: 0.0, time_ms: 0.0, speed: 0.0 },
            ],
        );
        let mut s = RecordingSurface::new(c.size);
        m.on_after_render(&mut s, &[], &mut c, RenderOptions { mask_visible: false });
        let lines: Vec<_> = s.lines().cloned().collect();
        assert_eq!(lines.len(), 1);
        match &lines[0] {
            DrawCall::Line { width, color, alpha, .. } => {
                assert_eq!(*width, 6.0);
                assert_eq!(*color, INK);
                assert_eq!(*alpha, 1.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn emission_capped_at_active_ratio() {
        let mut c = ctx();
        let mut m = SketchMode { emit_chance: 1.0, ..SketchMode::new() };
        let mut ps: Vec<Particle> = (0..20).map(|_| Particle::default()).collect();
        for p in ps.iter_mut() {
            m.init_particle(p, &mut c);
        }
        m.on_before_update(&mut ps, &hand(100.0, 200.0, false), &mut c);
        m.on_before_update(&mut ps, &hand(150.0, 200.0, false), &mut c);
        let active = ps.iter().filter(|p| !is_waiting(p)).count();
        assert_eq!(active, 2);
    }

    #[test]
    fn bottom_exit_returns_to_waiting() {
        let mut c = ctx();
        let mut m = SketchMode::new();
        let mut p = Particle { y: 490.0, vx: 1.0, vy: 2.0, ..Particle::default() };
        p.scratch.ink().waiting = false;
        m.handle_edges(&mut p, &mut c);
        assert!(is_waiting(&p));
        assert_eq!((p.vx, p.vy), (0.0, 0.0));
    }
}
