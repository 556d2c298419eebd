use std::fmt;

use crate::Key;

/// Direction of an emitted key transition.
///
/// Discriminants follow the evdev value convention:
///   0 == 'released'
///   1 == 'pressed'
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Action {
    Release = 0,
    Press = 1,
}

impl Action {
    /// Create an Action from an event value; only 0 and 1 are transitions.
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            0 => Some(Action::Release),
            1 => Some(Action::Press),
            _ => None,
        }
    }

    /// Convert Action to its evdev value
    pub fn to_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Release => write!(f, "release"),
            Action::Press => write!(f, "press"),
        }
    }
}

/// A press or release of one host key, as produced by an interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyAction {
    pub key: Key,
    pub action: Action,
}

impl KeyAction {
    pub fn press(key: Key) -> Self {
        Self {
            key,
            action: Action::Press,
        }
    }

    pub fn release(key: Key) -> Self {
        Self {
            key,
            action: Action::Release,
        }
    }
}

impl fmt::Display for KeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_from_value() {
        assert_eq!(Action::from_value(0), Some(Action::Release));
        assert_eq!(Action::from_value(1), Some(Action::Press));
        assert_eq!(Action::from_value(2), None);
        assert_eq!(Action::from_value(-1), None);
    }

    #[test]
    fn test_action_to_i32() {
        assert_eq!(Action::Release.to_i32(), 0);
        assert_eq!(Action::Press.to_i32(), 1);
    }

    #[test]
    fn test_key_action_display() {
        assert_eq!(KeyAction::press(Key::from(44)).to_string(), "press Z");
        assert_eq!(KeyAction::release(Key::from(28)).to_string(), "release ENTER");
    }
}
