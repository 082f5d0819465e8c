//! Tracking results → mirrored, canvas-space [`Landmark`] list.

use log::debug;

use crate::landmark::{FaceFeature, Landmark, LandmarkKind};
use crate::tables::{
    face_oval_rank, CHEEKBONES, EYE_SOCKETS, FINGERTIPS, HAND_EDGES, KNUCKLES,
    LEFT_EYE_CENTER, LEFT_MOUTH_CORNER, LIPS, LOWER_LIP_CENTER, NOSE, NOSE_BRIDGE,
    RIGHT_EYE_CENTER, RIGHT_MOUTH_CORNER, UPPER_LIP_CENTER, WRIST,
};
use crate::tracking::{FaceResults, HandResults, NormalizedPoint};

/// Per-role spreads, depth boosts and weights.
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkConfig {
    pub fingertip_spread: f32,
    pub segment_spread:   f32,
    pub palm_spread:      f32,
    /// Knuckles get this fraction of the palm spread.
    pub knuckle_factor:   f32,
    pub hand_weight:      f32,
    pub face_spread:      f32,
    pub face_weight:      f32,
    pub nose_boost:       f32,
    pub cheek_boost:      f32,
    pub eye_socket_boost: f32,
}

impl Default for LandmarkConfig {
    fn default() -> Self {
        LandmarkConfig {
            fingertip_spread: 3.0,
            segment_spread:   8.0,
            palm_spread:      15.0,
            knuckle_factor:   0.8,
            hand_weight:      1.0,
            face_spread:      1.5,
            face_weight:      1.0,
            nose_boost:       1.5,
            cheek_boost:      1.2,
            eye_socket_boost: 1.4,
        }
    }
}

impl LandmarkConfig {
    /// Scatter radius for hand joint `index`.
    pub fn hand_spread(&self, index: usize) -> f32 {
        if FINGERTIPS.contains(&index) {
            self.fingertip_spread
        } else if index == WRIST || (1..=4).contains(&index) {
            self.palm_spread
        } else if KNUCKLES.contains(&index) {
            self.palm_spread * self.knuckle_factor
        } else {
            self.segment_spread
        }
    }

    /// Depth multiplier for face mesh point `index`.
    pub fn depth_boost(&self, index: usize) -> f32 {
        if NOSE.contains(&index) {
            self.nose_boost
        } else if CHEEKBONES.contains(&index) {
            self.cheek_boost
        } else if EYE_SOCKETS.contains(&index) {
            self.eye_socket_boost
        } else {
            1.0
        }
    }
}

fn face_feature(index: usize) -> Option<FaceFeature> {
    match index {
        LEFT_EYE_CENTER    => Some(FaceFeature::LeftEye),
        RIGHT_EYE_CENTER   => Some(FaceFeature::RightEye),
        NOSE_BRIDGE        => Some(FaceFeature::NoseBridge),
        UPPER_LIP_CENTER   => Some(FaceFeature::UpperLip),
        LOWER_LIP_CENTER   => Some(FaceFeature::LowerLip),
        LEFT_MOUTH_CORNER  => Some(FaceFeature::LeftMouth),
        RIGHT_MOUTH_CORNER => Some(FaceFeature::RightMouth),
        i if LIPS.contains(&i) => Some(FaceFeature::Lips),
        _ => None,
    }
}

/// Stateless apart from the canvas size it maps into.
#[derive(Clone, Debug, Default)]
pub struct LandmarkProcessor {
    config: LandmarkConfig,
    width:  f32,
    height: f32,
}

impl LandmarkProcessor {
    pub fn new() -> Self {
        Self::with_config(LandmarkConfig::default())
    }

    pub fn with_config(config: LandmarkConfig) -> Self {
        LandmarkProcessor { config, width: 0.0, height: 0.0 }
    }

    pub fn config(&self) -> &LandmarkConfig {
        &self.config
    }

    /// Must be called before [`process`](Self::process) whenever the canvas
    /// changes. Negative or non-finite sizes are treated as zero.
    pub fn set_canvas_size(&mut self, width: f32, height: f32) {
        let (w, h) = (sanitize(width), sanitize(height));
        if (w, h) != (self.width, self.height) {
            debug!("landmark canvas {}x{}", w, h);
        }
        self.width = w;
        self.height = h;
    }

    pub fn canvas_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Fresh landmark list for this frame: hands first (in detection order),
    /// then face points. Absent results contribute nothing.
    pub fn process(&self, hands: Option<&HandResults>, face: Option<&FaceResults>) -> Vec<Landmark> {
        let mut out = Vec::new();
        if let Some(hands) = hands {
            self.process_hands(hands, &mut out);
        }
        if let Some(face) = face {
            self.process_face(face, &mut out);
        }
        out
    }

    fn mirror(&self, p: &NormalizedPoint) -> (f32, f32) {
        ((1.0 - p.x) * self.width, p.y * self.height)
    }

    fn process_hands(&self, hands: &HandResults, out: &mut Vec<Landmark>) {
        for (hand_id, points) in hands.hands.iter().enumerate() {
            for (i, p) in points.iter().enumerate() {
                if !p.is_finite() {
                    continue;
                }
                let (x, y) = self.mirror(p);
                out.push(Landmark {
                    x,
                    y,
                    z: None,
                    spread: self.config.hand_spread(i),
                    weight: self.config.hand_weight,
                    kind: LandmarkKind::Hand { hand_id },
                    index: i,
                    is_edge: HAND_EDGES.contains(&i),
                    face_oval_order: None,
                    feature: None,
                });
            }
        }
    }

    fn process_face(&self, face: &FaceResults, out: &mut Vec<Landmark>) {
        for points in &face.faces {
            for (i, p) in points.iter().enumerate() {
                if !p.is_finite() {
                    continue;
                }
                let (x, y) = self.mirror(p);
                let boost = self.config.depth_boost(i);
                let oval = face_oval_rank(i);
                out.push(Landmark {
                    x,
                    y,
                    z: Some(p.z * boost),
                    spread: self.config.face_spread,
                    weight: self.config.face_weight * boost,
                    kind: LandmarkKind::Face,
                    index: i,
                    is_edge: oval.is_some(),
                    face_oval_order: oval,
                    feature: face_feature(i),
                });
            }
        }
    }
}

fn sanitize(v: f32) -> f32 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}
