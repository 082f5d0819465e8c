//! Cooldown-gated fist dispatcher.
//!
//! A closed fist on any tracked hand fires the configured [`FistAction`];
//! holding the fist re-fires once per cooldown.

use swarm_landmarks::{detect_fist, HandResults};

use crate::settings::FistAction;

pub const DEFAULT_COOLDOWN_MS: f64 = 500.0;

#[derive(Clone, Debug)]
pub struct GestureDispatcher {
    pub cooldown_ms: f64,
    last_fire_ms:    Option<f64>,
}

impl Default for GestureDispatcher {
    fn default() -> Self {
        GestureDispatcher { cooldown_ms: DEFAULT_COOLDOWN_MS, last_fire_ms: None }
    }
}

impl GestureDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when a fist is visible and the cooldown has elapsed; arms the
    /// next cooldown.
    pub fn poll(&mut self, hands: Option<&HandResults>, now_ms: f64) -> bool {
        let fist = hands.is_some_and(|h| h.hands.iter().any(|hand| detect_fist(hand)));
        if !fist {
            return false;
        }
        if let Some(last) = self.last_fire_ms {
            if now_ms - last < self.cooldown_ms {
                return false;
            }
        }
        self.last_fire_ms = Some(now_ms);
        true
    }

    /// Like [`poll`](Self::poll) but yields the action to run. A `None`
    /// action never fires and never arms the cooldown.
    pub fn dispatch(&mut self, action: FistAction, hands: Option<&HandResults>, now_ms: f64) -> Option<FistAction> {
        if action == FistAction::None {
            return None;
        }
        self.poll(hands, now_ms).then_some(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::{synth_hand, HandPose};

    fn hands(pose: HandPose) -> HandResults {
        HandResults { hands: vec![synth_hand(HandPose::Open, 0.3, 0.5), synth_hand(pose, 0.7, 0.5)] }
    }

    #[test]
    fn fires_once_per_cooldown() {
        let mut d = GestureDispatcher::new();
        let fist = hands(HandPose::Fist);
        assert!(d.poll(Some(&fist), 1000.0));
        assert!(!d.poll(Some(&fist), 1200.0));
        assert!(!d.poll(Some(&fist), 1499.0));
        assert!(d.poll(Some(&fist), 1500.0));
    }

    #[test]
    fn open_hands_and_absent_results_never_fire() {
        let mut d = GestureDispatcher::new();
        assert!(!d.poll(None, 0.0));
        assert!(!d.poll(Some(&HandResults::default()), 0.0));
        assert!(!d.poll(Some(&hands(HandPose::Open)), 0.0));
        assert!(!d.poll(Some(&hands(HandPose::Pointing)), 0.0));
    }

    #[test]
    fn none_action_does_not_arm_cooldown() {
        let mut d = GestureDispatcher::new();
        let fist = hands(HandPose::Fist);
        assert_eq!(d.dispatch(FistAction::None, Some(&fist), 0.0), None);
        assert_eq!(d.dispatch(FistAction::Theme, Some(&fist), 10.0), Some(FistAction::Theme));
        assert_eq!(d.dispatch(FistAction::Theme, Some(&fist), 20.0), None);
    }
}
