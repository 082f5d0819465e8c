//! The screen-space target record produced once per frame by the
//! [`LandmarkProcessor`](crate::LandmarkProcessor).

use crate::gesture::Joint;
use crate::tables::HAND_POINTS;

/// Where a landmark came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LandmarkKind {
    /// `hand_id` is the detection order within this frame only.
    Hand { hand_id: usize },
    Face,
}

/// Named anatomical anchors tagged on individual face points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceFeature {
    LeftEye,
    RightEye,
    NoseBridge,
    UpperLip,
    LowerLip,
    LeftMouth,
    RightMouth,
    /// Any other lip-contour point.
    Lips,
}

/// One weighted target point in canvas pixels (already mirrored).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Landmark {
    pub x:               f32,
    pub y:               f32,
    /// Boosted relative depth; face points only.
    pub z:               Option<f32>,
    /// Scatter radius for golden-ratio assignment.
    pub spread:          f32,
    pub weight:          f32,
    pub kind:            LandmarkKind,
    /// Index within the source hand / face point list.
    pub index:           usize,
    pub is_edge:         bool,
    /// Rank along the face outline walk, for oval points.
    pub face_oval_order: Option<usize>,
    pub feature:         Option<FaceFeature>,
}

impl Landmark {
    /// Bare hand landmark at `(x, y)`, mainly for fixtures.
    pub fn hand(x: f32, y: f32, index: usize, hand_id: usize) -> Self {
        Landmark {
            x,
            y,
            z: None,
            spread: 0.0,
            weight: 1.0,
            kind: LandmarkKind::Hand { hand_id },
            index,
            is_edge: false,
            face_oval_order: None,
            feature: None,
        }
    }

    /// Bare face landmark at `(x, y)`.
    pub fn face(x: f32, y: f32, index: usize) -> Self {
        Landmark {
            x,
            y,
            z: Some(0.0),
            spread: 0.0,
            weight: 1.0,
            kind: LandmarkKind::Face,
            index,
            is_edge: false,
            face_oval_order: None,
            feature: None,
        }
    }

    pub fn is_hand(&self) -> bool {
        matches!(self.kind, LandmarkKind::Hand { .. })
    }

    pub fn is_face(&self) -> bool {
        self.kind == LandmarkKind::Face
    }

    pub fn hand_id(&self) -> Option<usize> {
        match self.kind {
            LandmarkKind::Hand { hand_id } => Some(hand_id),
            LandmarkKind::Face => None,
        }
    }

    pub fn distance_sq_to(&self, x: f32, y: f32) -> f32 {
        let dx = self.x - x;
        let dy = self.y - y;
        dx * dx + dy * dy
    }
}

impl Joint for Landmark {
    fn jx(&self) -> f32 { self.x }
    fn jy(&self) -> f32 { self.y }
}

// ════════════════════════════════════════════════════════════════════════════
// Hand grouping
// ════════════════════════════════════════════════════════════════════════════

/// All landmarks of one detected hand, slotted by joint index.
#[derive(Clone, Debug, PartialEq)]
pub struct HandGroup {
    pub hand_id: usize,
    joints:      Vec<Option<Landmark>>,
}

impl HandGroup {
    fn new(hand_id: usize) -> Self {
        HandGroup { hand_id, joints: vec![None; HAND_POINTS] }
    }

    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.joints.get(index).and_then(|j| j.as_ref())
    }

    /// All 21 joints present.
    pub fn is_complete(&self) -> bool {
        self.joints.iter().all(Option::is_some)
    }

    /// Dense joint list, `None` unless complete.
    pub fn joints(&self) -> Option<Vec<Landmark>> {
        self.joints.iter().copied().collect()
    }
}

/// Split the flat landmark list into per-hand groups, ordered by `hand_id`.
pub fn group_hands(landmarks: &[Landmark]) -> Vec<HandGroup> {
    let mut groups: Vec<HandGroup> = Vec::new();
    for lm in landmarks {
        let Some(hand_id) = lm.hand_id() else { continue };
        if lm.index >= HAND_POINTS {
            continue;
        }
        let pos = match groups.iter().position(|g| g.hand_id == hand_id) {
            Some(p) => p,
            None => {
                groups.push(HandGroup::new(hand_id));
                groups.len() - 1
            }
        };
        groups[pos].joints[lm.index] = Some(*lm);
    }
    groups.sort_by_key(|g| g.hand_id);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouping_separates_hands_and_skips_face() {
        let mut lms: Vec<Landmark> = (0..21).map(|i| Landmark::hand(i as f32, 0.0, i, 1)).collect();
        lms.extend((0..21).map(|i| Landmark::hand(0.0, i as f32, i, 0)));
        lms.push(Landmark::face(5.0, 5.0, 3));

        let groups = group_hands(&lms);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].hand_id, 0);
        assert!(groups[0].is_complete());
        assert_eq!(groups[1].get(7).map(|l| l.x), Some(7.0));
    }

    #[test]
    fn partial_hand_is_incomplete() {
        let lms: Vec<Landmark> = (0..10).map(|i| Landmark::hand(0.0, 0.0, i, 0)).collect();
        let groups = group_hands(&lms);
        assert!(!groups[0].is_complete());
        assert!(groups[0].joints().is_none());
        assert!(groups[0].get(15).is_none());
    }
}
