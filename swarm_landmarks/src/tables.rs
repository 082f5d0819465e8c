//! Fixed anatomical index tables for the 21-point hand model and the
//! ~468-point face mesh.

// ════════════════════════════════════════════════════════════════════════════
// Hand
// ════════════════════════════════════════════════════════════════════════════

/// Points per detected hand.
pub const HAND_POINTS: usize = 21;

pub const WRIST: usize = 0;

/// Thumb, index, middle, ring, pinky tips.
pub const FINGERTIPS: [usize; 5] = [4, 8, 12, 16, 20];

/// MCP joints of the four non-thumb fingers.
pub const KNUCKLES: [usize; 4] = [5, 9, 13, 17];

/// PIP joints of the four non-thumb fingers.
pub const PIP_JOINTS: [usize; 4] = [6, 10, 14, 18];

/// Tips of the four non-thumb fingers (paired with [`KNUCKLES`] / [`PIP_JOINTS`]).
pub const FINGER_TIPS: [usize; 4] = [8, 12, 16, 20];

/// Wrist plus the five fingertips.
pub const HAND_EDGES: [usize; 6] = [0, 4, 8, 12, 16, 20];

/// Bone connectivity of the hand skeleton.
pub const HAND_CONNECTIONS: [(usize, usize); 23] = [
    (0, 1),  (1, 2),   (2, 3),   (3, 4),   // thumb
    (0, 5),  (5, 6),   (6, 7),   (7, 8),   // index
    (0, 9),  (9, 10),  (10, 11), (11, 12), // middle
    (0, 13), (13, 14), (14, 15), (15, 16), // ring
    (0, 17), (17, 18), (18, 19), (19, 20), // pinky
    (5, 9),  (9, 13),  (13, 17),           // palm
];

// ════════════════════════════════════════════════════════════════════════════
// Face mesh
// ════════════════════════════════════════════════════════════════════════════

pub const LEFT_EYE: [usize; 16] = [
    33, 7, 163, 144, 145, 153, 154, 155, 133, 173, 157, 158, 159, 160, 161, 246,
];

pub const RIGHT_EYE: [usize; 16] = [
    362, 382, 381, 380, 374, 373, 390, 249, 263, 466, 388, 387, 386, 385, 384, 398,
];

/// Outer then inner lip contour; closes on 61.
pub const LIPS: [usize; 23] = [
    61, 146, 91, 181, 84, 17, 314, 405, 321, 375, 291, 308, 324, 318, 402, 317, 14, 87, 178,
    88, 95, 78, 61,
];

/// Face outline as a contour walk starting and ending at the forehead (10).
///
/// Mesh index order is not a walk, so the position in this table is the
/// traversal rank used for `face_oval_order`.
pub const FACE_OVAL: [usize; 37] = [
    10, 338, 297, 332, 284, 251, 389, 356, 454, 323, 361, 288, 397, 365, 379, 378, 400, 377,
    152, 148, 176, 149, 150, 136, 172, 58, 132, 93, 234, 127, 162, 21, 54, 103, 67, 109, 10,
];

pub const NOSE: [usize; 10] = [1, 2, 98, 327, 4, 5, 195, 197, 6, 168];

pub const CHEEKBONES: [usize; 12] = [116, 123, 147, 187, 207, 213, 345, 352, 376, 411, 427, 433];

pub const EYE_SOCKETS: [usize; 8] = [33, 133, 362, 263, 159, 145, 386, 374];

pub const LEFT_EYE_CENTER: usize = 159;
pub const RIGHT_EYE_CENTER: usize = 386;
pub const NOSE_BRIDGE: usize = 6;
pub const UPPER_LIP_CENTER: usize = 13;
pub const LOWER_LIP_CENTER: usize = 14;
pub const LEFT_MOUTH_CORNER: usize = 61;
pub const RIGHT_MOUTH_CORNER: usize = 291;

/// Rank of `index` along [`FACE_OVAL`], first occurrence.
pub fn face_oval_rank(index: usize) -> Option<usize> {
    FACE_OVAL.iter().position(|&i| i == index)
}
