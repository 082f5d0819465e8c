//! Camera-preview overlay: raw tracking results drawn as a skeleton and face
//! contours on their own surface, mirrored like the main canvas.

use swarm_landmarks::tables::{
    FACE_OVAL, FINGERTIPS, HAND_CONNECTIONS, LEFT_EYE, LIPS, RIGHT_EYE, WRIST,
};
use swarm_landmarks::{FaceResults, HandResults, NormalizedPoint};

use crate::color::BLACK;
use crate::surface::Surface;

pub const HAND_COLORS: [u32; 2] = [0xFF00F5FF, 0xFFFF00FF];
pub const EYE_COLOR:   u32 = 0xFF00E5CC;
pub const LIP_COLOR:   u32 = 0xFFFF69B4;
pub const OVAL_COLOR:  u32 = 0xFF00F5FF;

#[derive(Clone, Debug, Default)]
pub struct OverlayRenderer;

impl OverlayRenderer {
    pub fn new() -> Self {
        OverlayRenderer
    }

    /// Clear `surface` and draw whatever hands / face are present.
    pub fn draw(&self, surface: &mut dyn Surface, hands: Option<&HandResults>, face: Option<&FaceResults>) {
        surface.fill(BLACK, 1.0);
        let size = surface.size();
        if size.is_empty() {
            return;
        }
        let project = |p: &NormalizedPoint| ((1.0 - p.x) * size.width, p.y * size.height);

        if let Some(hands) = hands {
            for (i, hand) in hands.hands.iter().enumerate() {
                let color = HAND_COLORS[i.min(HAND_COLORS.len() - 1)];
                for &(a, b) in HAND_CONNECTIONS.iter() {
                    if let (Some(p), Some(q)) = (hand.get(a), hand.get(b)) {
                        let (x0, y0) = project(p);
                        let (x1, y1) = project(q);
                        surface.stroke_line(x0, y0, x1, y1, 2.0, color, 1.0);
                    }
                }
                for (idx, p) in hand.iter().enumerate() {
                    let r = if idx == WRIST || FINGERTIPS.contains(&idx) { 6.0 } else { 3.0 };
                    let (x, y) = project(p);
                    surface.fill_circle(x, y, r, color, 1.0);
                }
            }
        }

        if let Some(face) = face {
            for mesh in &face.faces {
                let path = |indices: &[usize]| -> Vec<(f32, f32)> {
                    indices.iter().filter_map(|&i| mesh.get(i)).map(project).collect()
                };
                surface.stroke_polyline(&path(&LEFT_EYE), true, 1.0, EYE_COLOR, 1.0);
                surface.stroke_polyline(&path(&RIGHT_EYE), true, 1.0, EYE_COLOR, 1.0);
                surface.stroke_polyline(&path(&LIPS), true, 1.0, LIP_COLOR, 1.0);
                surface.stroke_polyline(&path(&FACE_OVAL), true, 1.0, OVAL_COLOR, 1.0);
            }
        }
    }
}
