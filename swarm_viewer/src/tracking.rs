//! Tracking sources: anything that delivers [`TrackingFrame`]s over a channel.
//!
//! The engine never initiates tracking; it consumes whatever frame arrived
//! last. Sources run on their own thread at their own cadence, so frames may
//! lag or lead the render loop.
//!
//! [`SimTrackingSource`] stands in for a camera tracker: it synthesises a
//! posed hand that follows the mouse and an optional face mesh, with a little
//! tremor so the swarm never sits perfectly still.

use std::f32::consts::TAU;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use swarm_landmarks::tables::{
    FACE_OVAL, HAND_POINTS, LEFT_EYE, LEFT_MOUTH_CORNER, LIPS, LOWER_LIP_CENTER, NOSE_BRIDGE,
    RIGHT_EYE, RIGHT_MOUTH_CORNER, UPPER_LIP_CENTER,
};
use swarm_landmarks::{FaceResults, HandResults, NormalizedPoint, TrackingFrame};

// ════════════════════════════════════════════════════════════════════════════
// TrackingSource trait: unified interface for real and simulated trackers
// ════════════════════════════════════════════════════════════════════════════

pub trait TrackingSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<TrackingFrame>);
}

/// Spawn a tracking source on its own thread and return the receiving end.
pub fn spawn_tracking_source<S: TrackingSource>(source: S) -> Receiver<TrackingFrame> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// Simulated tracker
// ════════════════════════════════════════════════════════════════════════════

pub const FACE_MESH_POINTS: usize = 468;

/// Roughly the cadence of a webcam hand tracker.
pub const SIM_INTERVAL: Duration = Duration::from_millis(33);

const TREMOR: f32 = 0.002;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HandPose {
    #[default]
    Open,
    Fist,
    Pointing,
}

/// Control messages from the window to the simulator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimControl {
    /// Hand centre in camera coordinates, `[0, 1]²`, unmirrored.
    Pointer { x: f32, y: f32 },
    Pose(HandPose),
    /// Cycle one hand → two hands → none.
    ToggleHand,
    ToggleFace,
    Stop,
}

pub struct SimTrackingSource {
    pub rx:       Receiver<SimControl>,
    pub interval: Duration,
    pub seed:     u64,
}

impl SimTrackingSource {
    pub fn new(rx: Receiver<SimControl>, seed: u64) -> Self {
        SimTrackingSource { rx, interval: SIM_INTERVAL, seed }
    }
}

/// What the simulator is currently showing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimScene {
    pub pointer: (f32, f32),
    pub pose:    HandPose,
    pub hands:   usize,
    pub face:    bool,
}

impl Default for SimScene {
    fn default() -> Self {
        SimScene { pointer: (0.5, 0.5), pose: HandPose::Open, hands: 1, face: false }
    }
}

impl SimScene {
    /// Returns `false` on [`SimControl::Stop`].
    pub fn apply(&mut self, control: SimControl) -> bool {
        match control {
            SimControl::Pointer { x, y } => {
                if x.is_finite() && y.is_finite() {
                    self.pointer = (x.clamp(0.15, 0.85), y.clamp(0.15, 0.85));
                }
            }
            SimControl::Pose(p)    => self.pose = p,
            SimControl::ToggleHand => self.hands = (self.hands + 1) % 3,
            SimControl::ToggleFace => self.face = !self.face,
            SimControl::Stop       => return false,
        }
        true
    }

    /// Build the frame for elapsed time `t` seconds.
    pub fn frame<R: Rng + ?Sized>(&self, t: f32, rng: &mut R) -> TrackingFrame {
        let (cx, cy) = self.pointer;
        let mut hands = Vec::with_capacity(self.hands);
        if self.hands >= 1 {
            hands.push(synth_hand(self.pose, cx, cy));
        }
        if self.hands >= 2 {
            // Second hand mirrors the first across the frame centre.
            let mut other = synth_hand(self.pose, 1.0 - cx, cy);
            for p in other.iter_mut() {
                p.x = 2.0 * (1.0 - cx) - p.x;
            }
            hands.push(other);
        }
        for p in hands.iter_mut().flatten() {
            p.x += rng.random_range(-TREMOR..TREMOR);
            p.y += rng.random_range(-TREMOR..TREMOR);
        }

        let face = self.face.then(|| {
            let sway = 0.03 * (t * 0.5).sin();
            let mouth = 0.01 + 0.01 * (t * 2.0).sin();
            FaceResults { faces: vec![synth_face(0.5 + sway, 0.45, mouth)] }
        });

        TrackingFrame {
            hands: (!hands.is_empty()).then_some(HandResults { hands }),
            face,
            timestamp_ms: f64::from(t) * 1000.0,
        }
    }
}

impl TrackingSource for SimTrackingSource {
    fn run(self: Box<Self>, tx: Sender<TrackingFrame>) {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut scene = SimScene::default();
        let start = Instant::now();
        debug!("simulated tracker running every {:?}", self.interval);
        loop {
            loop {
                match self.rx.try_recv() {
                    Ok(control) => {
                        if !scene.apply(control) {
                            debug!("simulated tracker stopped");
                            return;
                        }
                    }
                    Err(TryRecvError::Empty)        => break,
                    Err(TryRecvError::Disconnected) => return,
                }
            }
            let frame = scene.frame(start.elapsed().as_secs_f32(), &mut rng);
            if tx.send(frame).is_err() {
                return;
            }
            thread::sleep(self.interval);
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Synthetic geometry
// ────────────────────────────────────────────────────────────────────────────

/// 21-point hand with its middle knuckles at `(cx, cy)`, fingers pointing up.
pub fn synth_hand(pose: HandPose, cx: f32, cy: f32) -> Vec<NormalizedPoint> {
    let p = |x: f32, y: f32| NormalizedPoint::new(x, y, 0.0);
    let mut h = vec![NormalizedPoint::default(); HAND_POINTS];

    h[0] = p(cx - 0.02, cy + 0.12);
    h[1] = p(cx - 0.05, cy + 0.08);
    h[2] = p(cx - 0.08, cy + 0.05);
    if pose == HandPose::Fist {
        // Tucked across the palm.
        h[3] = p(cx - 0.06, cy + 0.03);
        h[4] = p(cx - 0.02, cy);
    } else {
        h[3] = p(cx - 0.11, cy + 0.02);
        h[4] = p(cx - 0.14, cy - 0.01);
    }

    for finger in 0..4 {
        let x = cx - 0.045 + finger as f32 * 0.03;
        let open = match pose {
            HandPose::Open     => true,
            HandPose::Fist     => false,
            HandPose::Pointing => finger == 0,
        };
        let base = 5 + finger * 4;
        h[base] = p(x, cy);
        let (pip, dip, tip) = if open { (-0.04, -0.07, -0.10) } else { (-0.03, -0.01, 0.02) };
        h[base + 1] = p(x, cy + pip);
        h[base + 2] = p(x, cy + dip);
        h[base + 3] = p(x, cy + tip);
    }
    h
}

/// 468-point face mesh centred on `(cx, cy)`. Interior points fill the face
/// on a golden spiral; the oval, eye and lip contours sit where the mask and
/// overlay expect them. `mouth` is the lip gap.
pub fn synth_face(cx: f32, cy: f32, mouth: f32) -> Vec<NormalizedPoint> {
    let (rx, ry) = (0.12, 0.16);
    let golden = TAU * (1.0 - 1.0 / 1.618_034);
    let mut mesh: Vec<NormalizedPoint> = (0..FACE_MESH_POINTS)
        .map(|i| {
            let r = ((i as f32 + 0.5) / FACE_MESH_POINTS as f32).sqrt() * 0.9;
            let a = i as f32 * golden;
            NormalizedPoint::new(cx + r * rx * a.cos(), cy + r * ry * a.sin(), -0.05 * (1.0 - r * r))
        })
        .collect();

    let mut ring = |indices: &[usize], ox: f32, oy: f32, ax: f32, ay: f32| {
        let n = indices.len();
        for (k, &idx) in indices.iter().enumerate() {
            let a = -TAU / 4.0 + k as f32 / n as f32 * TAU;
            if let Some(pt) = mesh.get_mut(idx) {
                *pt = NormalizedPoint::new(ox + ax * a.cos(), oy + ay * a.sin(), 0.0);
            }
        }
    };
    ring(&FACE_OVAL, cx, cy, rx, ry);
    ring(&LEFT_EYE, cx - 0.045, cy - 0.04, 0.025, 0.01);
    ring(&RIGHT_EYE, cx + 0.045, cy - 0.04, 0.025, 0.01);
    ring(&LIPS, cx, cy + 0.08, 0.04, 0.015);

    let mouth = mouth.max(0.0);
    mesh[NOSE_BRIDGE] = NormalizedPoint::new(cx, cy - 0.02, -0.06);
    mesh[UPPER_LIP_CENTER] = NormalizedPoint::new(cx, cy + 0.075, 0.0);
    mesh[LOWER_LIP_CENTER] = NormalizedPoint::new(cx, cy + 0.075 + mouth, 0.0);
    mesh[LEFT_MOUTH_CORNER] = NormalizedPoint::new(cx - 0.04, cy + 0.08, 0.0);
    mesh[RIGHT_MOUTH_CORNER] = NormalizedPoint::new(cx + 0.04, cy + 0.08, 0.0);
    mesh
}
