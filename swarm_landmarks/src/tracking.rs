//! Raw tracking results: the wire format between the external tracker and
//! the engine.
//!
//! Coordinates are normalised to `[0, 1] × [0, 1]` in camera space (not yet
//! mirrored); `z` is a relative depth and only meaningful for face points.

/// One tracked point in normalised camera coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NormalizedPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl NormalizedPoint {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        NormalizedPoint { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Zero to two detected hands, each an ordered 21-point list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandResults {
    pub hands: Vec<Vec<NormalizedPoint>>,
}

/// Zero or one detected face, each an ordered face-mesh point list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceResults {
    pub faces: Vec<Vec<NormalizedPoint>>,
}

/// Latest results delivered by the tracking boundary.
///
/// Hands and face arrive independently and either may be absent; an absent
/// result means "zero detections", never an error.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackingFrame {
    pub hands:        Option<HandResults>,
    pub face:         Option<FaceResults>,
    /// Tracker clock at capture time, milliseconds.
    pub timestamp_ms: f64,
}

impl TrackingFrame {
    pub fn has_hands(&self) -> bool {
        self.hands.as_ref().is_some_and(|h| !h.hands.is_empty())
    }

    pub fn has_face(&self) -> bool {
        self.face.as_ref().is_some_and(|f| !f.faces.is_empty())
    }

    pub fn status(&self) -> DetectionStatus {
        match (self.has_hands(), self.has_face()) {
            (true, true)   => DetectionStatus::FaceAndHands,
            (true, false)  => DetectionStatus::Hands,
            (false, true)  => DetectionStatus::Face,
            (false, false) => DetectionStatus::Nothing,
        }
    }
}

/// What the tracker currently sees, for status display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectionStatus {
    Nothing,
    Hands,
    Face,
    FaceAndHands,
}

impl DetectionStatus {
    pub fn label(self) -> &'static str {
        match self {
            DetectionStatus::Nothing      => "Show your hands",
            DetectionStatus::Hands        => "Hands detected",
            DetectionStatus::Face         => "Face detected",
            DetectionStatus::FaceAndHands => "Face + Hands detected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_results_count_as_nothing() {
        let frame = TrackingFrame {
            hands: Some(HandResults::default()),
            face:  Some(FaceResults::default()),
            timestamp_ms: 0.0,
        };
        assert_eq!(frame.status(), DetectionStatus::Nothing);
    }

    #[test]
    fn status_combines_both_sources() {
        let frame = TrackingFrame {
            hands: Some(HandResults { hands: vec![vec![NormalizedPoint::default(); 21]] }),
            face:  Some(FaceResults { faces: vec![vec![NormalizedPoint::default(); 468]] }),
            timestamp_ms: 0.0,
        };
        assert_eq!(frame.status(), DetectionStatus::FaceAndHands);
        assert_eq!(frame.status().label(), "Face + Hands detected");
    }

    #[test]
    fn nan_point_is_not_finite() {
        assert!(!NormalizedPoint::new(f32::NAN, 0.0, 0.0).is_finite());
        assert!(NormalizedPoint::new(0.1, 0.2, -0.3).is_finite());
    }
}
