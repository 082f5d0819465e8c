//! # swarm_landmarks
//!
//! Turns raw hand / face tracking output into the flat list of typed,
//! screen-space [`Landmark`] targets that the particle engine consumes, and
//! classifies single-hand poses into discrete gestures.
//!
//! The tracking model itself is external: whatever produces per-frame
//! normalised `(x, y, z)` triples fills a [`TrackingFrame`] and hands it to a
//! [`LandmarkProcessor`].
//!
//! ## Quick start
//!
//! ```rust
//! use swarm_landmarks::{HandResults, LandmarkProcessor, NormalizedPoint};
//!
//! let mut processor = LandmarkProcessor::new();
//! processor.set_canvas_size(1280.0, 720.0);
//!
//! let hand = vec![NormalizedPoint::new(0.25, 0.5, 0.0); 21];
//! let hands = HandResults { hands: vec![hand] };
//!
//! let landmarks = processor.process(Some(&hands), None);
//! assert_eq!(landmarks.len(), 21);
//! // Mirrored: x_screen = (1 - x_norm) * width
//! assert_eq!(landmarks[0].x, 960.0);
//! ```
//!
//! ## Gestures
//!
//! | Gesture | Rule |
//! |---|---|
//! | Fist | ≥4 of 5 digits closed (four fingertips below their MCP knuckle, thumb by x heuristic) |
//! | Pointing | index tip above its PIP joint, the other three tips at/below theirs |
//! | Open hand | all four non-thumb tips above their PIP joints |

pub mod gesture;
pub mod landmark;
pub mod processor;
pub mod tables;
pub mod tracking;

pub use gesture::{
    classify, detect_fist, detect_open_hand, detect_pointing, fingers_curled, Gesture, Joint,
};
pub use landmark::{group_hands, FaceFeature, HandGroup, Landmark, LandmarkKind};
pub use processor::{LandmarkConfig, LandmarkProcessor};
pub use tracking::{DetectionStatus, FaceResults, HandResults, NormalizedPoint, TrackingFrame};
