//! Glowing face / hand mask drawn over the particle canvas.
//!
//! Reads nothing but the landmark list: eyes (with a randomised blink), a
//! mouth whose curves open with the real lip separation, the face outline
//! walked in `face_oval_order`, and the 21-joint hand skeleton.

use swarm_landmarks::tables::{HAND_CONNECTIONS, HAND_EDGES};
use swarm_landmarks::{group_hands, FaceFeature, Landmark};

use crate::color::rainbow_at;
use crate::context::SimContext;
use crate::surface::Surface;

/// How the mask picks its colour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColorPolicy {
    Fixed(u32),
    /// Seven-colour cycle driven by the clock; each element adds its own
    /// offset so bones and joints shimmer out of step.
    Rainbow,
}

impl ColorPolicy {
    pub fn color(&self, now_s: f64, offset: f64) -> u32 {
        match *self {
            ColorPolicy::Fixed(c) => c,
            ColorPolicy::Rainbow => rainbow_at(now_s, offset),
        }
    }
}

/// Random blink schedule: closed for `duration_ms`, next blink 2.5–5.5 s later.
#[derive(Clone, Debug, PartialEq)]
pub struct BlinkTimer {
    pub duration_ms: f64,
    last_blink_ms:   f64,
    next_blink_ms:   f64,
}

impl Default for BlinkTimer {
    fn default() -> Self {
        BlinkTimer { duration_ms: 150.0, last_blink_ms: f64::NEG_INFINITY, next_blink_ms: 2000.0 }
    }
}

impl BlinkTimer {
    pub fn reset(&mut self, now_ms: f64) {
        self.last_blink_ms = f64::NEG_INFINITY;
        self.next_blink_ms = now_ms + 2000.0;
    }

    /// Advance the schedule to `ctx.now_ms` and report whether the eyes are shut.
    pub fn is_blinking(&mut self, ctx: &mut SimContext) -> bool {
        let now = ctx.now_ms;
        if now > self.next_blink_ms {
            self.last_blink_ms = now;
            self.next_blink_ms = now + 2500.0 + ctx.random() as f64 * 3000.0;
        }
        now - self.last_blink_ms < self.duration_ms
    }

    pub fn next_blink_ms(&self) -> f64 {
        self.next_blink_ms
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FaceMask {
    pub policy:         ColorPolicy,
    pub opacity:        f32,
    pub line_width:     f32,
    /// Extra width of the soft halo drawn under every stroke and dot.
    pub glow:           f32,
    /// Eye radius as a fraction of inter-eye distance.
    pub eye_ratio:      f32,
    /// How far the lower-lip control point drops per pixel of mouth opening.
    pub mouth_drop:     f32,
    pub blink:          BlinkTimer,
}

const STROKE_WIDTH: f32 = 4.0;
const OVAL_ALPHA:   f32 = 0.3;
const HAND_ALPHA:   f32 = 0.35;
const HALO_ALPHA:   f32 = 0.15;
const MIN_EYE_R:    f32 = 2.0;

impl FaceMask {
    pub fn new(policy: ColorPolicy) -> Self {
        FaceMask {
            policy,
            opacity: 0.4,
            line_width: 3.0,
            glow: 6.0,
            eye_ratio: 0.12,
            mouth_drop: 0.5,
            blink: BlinkTimer::default(),
        }
    }

    pub fn with_mouth_drop(mut self, drop: f32) -> Self {
        self.mouth_drop = drop;
        self
    }

    pub fn draw(&mut self, surface: &mut dyn Surface, landmarks: &[Landmark], ctx: &mut SimContext) {
        if landmarks.is_empty() {
            return;
        }
        let t = ctx.now_s();
        self.draw_face(surface, landmarks, ctx, t);
        self.draw_outline(surface, landmarks, t);
        self.draw_hands(surface, landmarks, t);
    }

    fn draw_face(&mut self, s: &mut dyn Surface, lms: &[Landmark], ctx: &mut SimContext, t: f64) {
        let find = |f: FaceFeature| lms.iter().find(|l| l.feature == Some(f));
        let (Some(le), Some(re)) = (find(FaceFeature::LeftEye), find(FaceFeature::RightEye)) else {
            return;
        };
        let color = self.policy.color(t, 0.0);
        let dist = ((re.x - le.x).powi(2) + (re.y - le.y).powi(2)).sqrt();
        let r = (dist * self.eye_ratio).max(MIN_EYE_R);

        if self.blink.is_blinking(ctx) {
            for eye in [le, re] {
                self.glow_line(s, (eye.x - r, eye.y), (eye.x + r, eye.y), STROKE_WIDTH, color, self.opacity);
            }
        } else {
            for eye in [le, re] {
                self.glow_dot(s, eye.x, eye.y, r, color, self.opacity);
            }
        }

        let (Some(ul), Some(ll), Some(lm), Some(rm)) = (
            find(FaceFeature::UpperLip),
            find(FaceFeature::LowerLip),
            find(FaceFeature::LeftMouth),
            find(FaceFeature::RightMouth),
        ) else {
            return;
        };
        let open = (ll.y - ul.y).abs();
        let mid_x = (lm.x + rm.x) * 0.5;
        let from = (lm.x, lm.y);
        let to = (rm.x, rm.y);
        s.stroke_quadratic(from, (mid_x, ul.y - open * 0.3), to, STROKE_WIDTH, color, self.opacity);
        s.stroke_quadratic(from, (mid_x, ll.y + open * self.mouth_drop), to, STROKE_WIDTH, color, self.opacity);
    }

    fn draw_outline(&self, s: &mut dyn Surface, lms: &[Landmark], t: f64) {
        let mut oval: Vec<(usize, (f32, f32))> = lms
            .iter()
            .filter(|l| l.is_face() && l.is_edge)
            .filter_map(|l| l.face_oval_order.map(|o| (o, (l.x, l.y))))
            .collect();
        if oval.len() <= 5 {
            return;
        }
        oval.sort_by_key(|&(o, _)| o);
        let pts: Vec<(f32, f32)> = oval.into_iter().map(|(_, p)| p).collect();
        let color = self.policy.color(t, 1.0);
        if self.glow > 0.0 {
            s.stroke_polyline(&pts, true, self.line_width + self.glow, color, OVAL_ALPHA * HALO_ALPHA);
        }
        s.stroke_polyline(&pts, true, self.line_width, color, OVAL_ALPHA);
    }

    fn draw_hands(&self, s: &mut dyn Surface, lms: &[Landmark], t: f64) {
        for hand in group_hands(lms) {
            for &(a, b) in HAND_CONNECTIONS.iter() {
                if let (Some(p), Some(q)) = (hand.get(a), hand.get(b)) {
                    let color = self.policy.color(t, a as f64 * 0.3);
                    self.glow_line(s, (p.x, p.y), (q.x, q.y), self.line_width, color, HAND_ALPHA);
                }
            }
            for idx in 0..swarm_landmarks::tables::HAND_POINTS {
                let Some(j) = hand.get(idx) else { continue };
                let color = self.policy.color(t, idx as f64 * 0.5);
                let r = if HAND_EDGES.contains(&idx) { 6.0 } else { 4.0 };
                self.glow_dot(s, j.x, j.y, r, color, HAND_ALPHA);
            }
        }
    }

    fn glow_line(&self, s: &mut dyn Surface, a: (f32, f32), b: (f32, f32), w: f32, color: u32, alpha: f32) {
        if self.glow > 0.0 {
            s.stroke_line(a.0, a.1, b.0, b.1, w + self.glow, color, alpha * HALO_ALPHA);
        }
        s.stroke_line(a.0, a.1, b.0, b.1, w, color, alpha);
    }

    fn glow_dot(&self, s: &mut dyn Surface, x: f32, y: f32, r: f32, color: u32, alpha: f32) {
        if self.glow > 0.0 {
            s.fill_circle(x, y, r + self.glow * 0.5, color, alpha * HALO_ALPHA);
        }
        s.fill_circle(x, y, r, color, alpha);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{CanvasSize, DrawCall, RecordingSurface};
    use swarm_landmarks::tables::FACE_OVAL;

    fn ctx() -> SimContext {
        SimContext::seeded(5, CanvasSize::new(640.0, 480.0))
    }

    fn feature(x: f32, y: f32, index: usize, f: FaceFeature) -> Landmark {
        let mut l = Landmark::face(x, y, index);
        l.feature = Some(f);
        l
    }

    fn face() -> Vec<Landmark> {
        vec![
            feature(100.0, 100.0, 159, FaceFeature::LeftEye),
            feature(200.0, 100.0, 386, FaceFeature::RightEye),
            feature(150.0, 160.0, 13, FaceFeature::UpperLip),
            feature(150.0, 170.0, 14, FaceFeature::LowerLip),
            feature(120.0, 165.0, 61, FaceFeature::LeftMouth),
            feature(180.0, 165.0, 291, FaceFeature::RightMouth),
        ]
    }

    fn no_glow(policy: ColorPolicy) -> FaceMask {
        FaceMask { glow: 0.0, ..FaceMask::new(policy) }
    }

    #[test]
    fn empty_landmarks_draw_nothing() {
        let mut s = RecordingSurface::new(CanvasSize::new(10.0, 10.0));
        FaceMask::new(ColorPolicy::Rainbow).draw(&mut s, &[], &mut ctx());
        assert!(s.calls.is_empty());
    }

    #[test]
    fn eye_radius_scales_with_eye_distance() {
        let mut s = RecordingSurface::new(CanvasSize::new(640.0, 480.0));
        let mut mask = no_glow(ColorPolicy::Fixed(0xFF00FF00));
        mask.draw(&mut s, &face(), &mut ctx());
        let radii: Vec<f32> = s
            .circles()
            .filter_map(|c| match c { DrawCall::Circle { r, .. } => Some(*r), _ => None })
            .collect();
        assert_eq!(radii.len(), 2);
        assert!((radii[0] - 12.0).abs() < 1e-4);
        // two mouth curves
        assert_eq!(s.lines().count(), 2 * crate::surface::CURVE_SEGMENTS);
    }

    #[test]
    fn blink_draws_lines_instead_of_dots() {
        let mut s = RecordingSurface::new(CanvasSize::new(640.0, 480.0));
        let mut c = ctx();
        c.set_time(2001.0);
        let mut mask = no_glow(ColorPolicy::Fixed(0xFF00FF00));
        mask.draw(&mut s, &face(), &mut c);
        assert_eq!(s.circles().count(), 0);
        assert!(mask.blink.next_blink_ms() >= 2001.0 + 2500.0);

        c.set_time(2001.0 + 200.0);
        s.clear();
        mask.draw(&mut s, &face(), &mut c);
        assert_eq!(s.circles().count(), 2);
    }

    #[test]
    fn outline_needs_more_than_five_points() {
        let mut s = RecordingSurface::new(CanvasSize::new(640.0, 480.0));
        let oval: Vec<Landmark> = FACE_OVAL[..36]
            .iter()
            .enumerate()
            .map(|(rank, &i)| {
                let mut l = Landmark::face(rank as f32, 0.0, i);
                l.is_edge = true;
                l.face_oval_order = Some(rank);
                l
            })
            .collect();
        no_glow(ColorPolicy::Rainbow).draw(&mut s, &oval[..5], &mut ctx());
        assert_eq!(s.lines().count(), 0);
        no_glow(ColorPolicy::Rainbow).draw(&mut s, &oval, &mut ctx());
        assert_eq!(s.lines().count(), 36);
    }

    #[test]
    fn hand_skeleton_bones_and_joints() {
        let mut s = RecordingSurface::new(CanvasSize::new(640.0, 480.0));
        let hand: Vec<Landmark> = (0..21).map(|i| Landmark::hand(i as f32 * 10.0, 50.0, i, 0)).collect();
        no_glow(ColorPolicy::Fixed(0xFFFFD700)).draw(&mut s, &hand, &mut ctx());
        assert_eq!(s.lines().count(), HAND_CONNECTIONS.len());
        let big = s
            .circles()
            .filter(|c| matches!(c, DrawCall::Circle { r, .. } if *r == 6.0))
            .count();
        assert_eq!(big, 6);
        assert_eq!(s.circles().count(), 21);
    }

    #[test]
    fn rainbow_policy_offsets() {
        assert_eq!(ColorPolicy::Rainbow.color(0.0, 0.0), crate::color::RAINBOW[0]);
        assert_eq!(ColorPolicy::Rainbow.color(0.0, 2.0), crate::color::RAINBOW[2]);
        assert_eq!(ColorPolicy::Fixed(7).color(123.0, 9.0), 7);
    }
}
