//! Pure single-hand pose classification.
//!
//! Every function takes one hand's 21 joints in image orientation (y grows
//! downward) and returns `false` for anything shorter than a full hand.
//! Works on raw [`NormalizedPoint`]s and on processed [`Landmark`]s alike
//! through the [`Joint`] trait; mirroring flips x only, which leaves every
//! rule except the thumb test unaffected.
//!
//! [`Landmark`]: crate::Landmark

use crate::tables::{FINGER_TIPS, HAND_POINTS, KNUCKLES, PIP_JOINTS, WRIST};
use crate::tracking::NormalizedPoint;

/// Anything with a 2D position a gesture rule can read.
pub trait Joint {
    fn jx(&self) -> f32;
    fn jy(&self) -> f32;
}

impl Joint for NormalizedPoint {
    fn jx(&self) -> f32 { self.x }
    fn jy(&self) -> f32 { self.y }
}

impl<T: Joint> Joint for &T {
    fn jx(&self) -> f32 { (**self).jx() }
    fn jy(&self) -> f32 { (**self).jy() }
}

/// Discrete pose of one hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gesture {
    None,
    OpenHand,
    Pointing,
    Fist,
}

/// Thumb counts as closed when its tip has crossed the IP joint toward the
/// palm. Which side is "toward the palm" depends on whether the wrist sits
/// left or right of the middle knuckle, so the test is handedness-relative.
fn thumb_closed<J: Joint>(hand: &[J]) -> bool {
    (hand[4].jx() > hand[3].jx()) == (hand[WRIST].jx() < hand[9].jx())
}

/// ≥4 of 5 digits closed: fingertip below its MCP knuckle, plus the thumb.
pub fn detect_fist<J: Joint>(hand: &[J]) -> bool {
    if hand.len() < HAND_POINTS {
        return false;
    }
    let fingers = FINGER_TIPS
        .iter()
        .zip(KNUCKLES.iter())
        .filter(|&(&tip, &mcp)| hand[tip].jy() > hand[mcp].jy())
        .count();
    fingers + usize::from(thumb_closed(hand)) >= 4
}

/// Index extended above its PIP joint, the other three at or below theirs.
pub fn detect_pointing<J: Joint>(hand: &[J]) -> bool {
    if hand.len() < HAND_POINTS {
        return false;
    }
    let up = |tip: usize, pip: usize| hand[tip].jy() < hand[pip].jy();
    up(8, 6) && !up(12, 10) && !up(16, 14) && !up(20, 18)
}

/// All four non-thumb fingertips above their PIP joints.
pub fn detect_open_hand<J: Joint>(hand: &[J]) -> bool {
    if hand.len() < HAND_POINTS {
        return false;
    }
    FINGER_TIPS
        .iter()
        .zip(PIP_JOINTS.iter())
        .all(|(&tip, &pip)| hand[tip].jy() < hand[pip].jy())
}

/// All four non-thumb fingertips at or below their PIP joints; a looser
/// closed-hand test that ignores the thumb.
pub fn fingers_curled<J: Joint>(hand: &[J]) -> bool {
    if hand.len() < HAND_POINTS {
        return false;
    }
    FINGER_TIPS
        .iter()
        .zip(PIP_JOINTS.iter())
        .all(|(&tip, &pip)| hand[tip].jy() >= hand[pip].jy())
}

/// Single label, checked open → pointing → fist. Pointing wins over fist
/// because a pointing hand with a tucked thumb also has four closed digits.
pub fn classify<J: Joint>(hand: &[J]) -> Gesture {
    if detect_open_hand(hand) {
        Gesture::OpenHand
    } else if detect_pointing(hand) {
        Gesture::Pointing
    } else if detect_fist(hand) {
        Gesture::Fist
    } else {
        Gesture::None
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::landmark::Landmark;

    #[test]
    fn fist_fixture() {
        let h = fist();
        assert!(detect_fist(&h));
        assert!(!detect_pointing(&h));
        assert!(!detect_open_hand(&h));
        assert!(fingers_curled(&h));
        assert_eq!(classify(&h), Gesture::Fist);
    }

    #[test]
    fn pointing_fixture() {
        let h = pointing();
        assert!(detect_pointing(&h));
        assert!(!detect_fist(&h));
        assert_eq!(classify(&h), Gesture::Pointing);
    }

    #[test]
    fn pointing_with_tucked_thumb_still_classifies_as_pointing() {
        let mut h = pointing();
        h[4] = NormalizedPoint::new(0.48, 0.6, 0.0);
        assert!(detect_fist(&h));
        assert_eq!(classify(&h), Gesture::Pointing);
    }

    #[test]
    fn open_fixture() {
        let h = open();
        assert!(detect_open_hand(&h));
        assert!(!detect_fist(&h));
        assert!(!fingers_curled(&h));
        assert_eq!(classify(&h), Gesture::OpenHand);
    }

    #[test]
    fn short_hand_is_never_a_gesture() {
        let h = vec![NormalizedPoint::default(); 20];
        assert!(!detect_fist(&h));
        assert!(!detect_pointing(&h));
        assert!(!detect_open_hand(&h));
        assert!(!fingers_curled(&h));
        assert_eq!(classify(&h), Gesture::None);
    }

    #[test]
    fn works_on_landmarks() {
        let lms: Vec<Landmark> = fist()
            .iter()
            .enumerate()
            .map(|(i, p)| Landmark::hand(p.x * 100.0, p.y * 100.0, i, 0))
            .collect();
        assert!(detect_fist(&lms));
    }
}
