//! Keyboard mapping and held-key acceleration.

use minifb::Key;
use swarm_engine::ModeKind;

use crate::tracking::HandPose;

/// One-shot actions bound to a key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    NextMode,
    PrevMode,
    SelectMode(ModeKind),
    CycleTheme,
    CycleFistAction,
    ToggleMask,
    ToggleCamera,
    ToggleHud,
    TogglePause,
    /// Simulated tracker controls.
    Pose(HandPose),
    ToggleHand,
    ToggleFace,
    Quit,
}

/// Keys polled for one-shot presses each frame.
pub const COMMAND_KEYS: [Key; 26] = [
    Key::Space, Key::Down, Key::Up, Key::Tab,
    Key::Key1, Key::Key2, Key::Key3, Key::Key4, Key::Key5, Key::Key6, Key::Key7, Key::Key8, Key::Key9,
    Key::T, Key::A, Key::M, Key::V, Key::D, Key::P,
    Key::O, Key::F, Key::I, Key::H, Key::G,
    Key::Q, Key::Escape,
];

pub fn command_for_key(key: Key) -> Option<Command> {
    let select = |i: usize| ModeKind::ORDER.get(i).copied().map(Command::SelectMode);
    match key {
        Key::Space | Key::Down => Some(Command::NextMode),
        Key::Up | Key::Tab     => Some(Command::PrevMode),
        Key::Key1 => select(0),
        Key::Key2 => select(1),
        Key::Key3 => select(2),
        Key::Key4 => select(3),
        Key::Key5 => select(4),
        Key::Key6 => select(5),
        Key::Key7 => select(6),
        Key::Key8 => select(7),
        Key::Key9 => select(8),
        Key::T => Some(Command::CycleTheme),
        Key::A => Some(Command::CycleFistAction),
        Key::M => Some(Command::ToggleMask),
        Key::V => Some(Command::ToggleCamera),
        Key::D => Some(Command::ToggleHud),
        Key::P => Some(Command::TogglePause),
        Key::O => Some(Command::Pose(HandPose::Open)),
        Key::F => Some(Command::Pose(HandPose::Fist)),
        Key::I => Some(Command::Pose(HandPose::Pointing)),
        Key::H => Some(Command::ToggleHand),
        Key::G => Some(Command::ToggleFace),
        Key::Q | Key::Escape => Some(Command::Quit),
        _ => None,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Held-key ramp
// ────────────────────────────────────────────────────────────────────────────

/// Particles per frame while a count key is held: 1, then 10 after 2 s,
/// then 100 after 5 s.
pub fn hold_multiplier(held_ms: f64) -> usize {
    if held_ms >= 5000.0 {
        100
    } else if held_ms >= 2000.0 {
        10
    } else {
        1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ramp {
    Idle,
    Step(usize),
    /// The key went up this frame; persist the count.
    Released,
}

#[derive(Clone, Debug, Default)]
pub struct HoldRamp {
    since_ms: Option<f64>,
}

impl HoldRamp {
    pub fn update(&mut self, held: bool, now_ms: f64) -> Ramp {
        match (held, self.since_ms) {
            (true, None) => {
                self.since_ms = Some(now_ms);
                Ramp::Step(1)
            }
            (true, Some(start)) => Ramp::Step(hold_multiplier(now_ms - start)),
            (false, Some(_)) => {
                self.since_ms = None;
                Ramp::Released
            }
            (false, None) => Ramp::Idle,
        }
    }

    pub fn is_held(&self) -> bool {
        self.since_ms.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_keys_select_in_cycle_order() {
        assert_eq!(command_for_key(Key::Key1), Some(Command::SelectMode(ModeKind::Party)));
        assert_eq!(command_for_key(Key::Key7), Some(Command::SelectMode(ModeKind::Galactic)));
        assert_eq!(command_for_key(Key::Key9), Some(Command::SelectMode(ModeKind::Sketch)));
        assert_eq!(command_for_key(Key::Key0), None);
    }

    #[test]
    fn every_polled_key_maps_to_a_command() {
        for key in COMMAND_KEYS {
            assert!(command_for_key(key).is_some(), "{:?}", key);
        }
        assert_eq!(command_for_key(Key::Right), None);
        assert_eq!(command_for_key(Key::Left), None);
    }

    #[test]
    fn ramp_accelerates_then_reports_release() {
        let mut ramp = HoldRamp::default();
        assert_eq!(ramp.update(false, 0.0), Ramp::Idle);
        assert_eq!(ramp.update(true, 100.0), Ramp::Step(1));
        assert_eq!(ramp.update(true, 2099.0), Ramp::Step(1));
        assert_eq!(ramp.update(true, 2100.0), Ramp::Step(10));
        assert_eq!(ramp.update(true, 5100.0), Ramp::Step(100));
        assert!(ramp.is_held());
        assert_eq!(ramp.update(false, 5200.0), Ramp::Released);
        assert_eq!(ramp.update(false, 5300.0), Ramp::Idle);
        assert_eq!(ramp.update(true, 6000.0), Ramp::Step(1));
    }
}
