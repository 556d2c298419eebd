// fpchid Pressed Key State Management
// HashSet-based tracking of which bindings currently hold a key down

use crate::Key;
use std::collections::HashSet;
use strum_macros::Display;

/// Which kind of binding pressed a key.
///
/// A digital button and a touch region may share a key symbol; each keeps
/// its own pressed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum PressSource {
    Digital,
    Region,
}

/// Tracks `(key, source)` pairs that have been pressed and not yet released
#[derive(Debug, Clone, Default)]
pub struct PressedState {
    pressed: HashSet<(Key, PressSource)>,
}

impl PressedState {
    /// Create a new empty pressed state
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark pressed. Returns false if it already was.
    pub fn press(&mut self, key: Key, source: PressSource) -> bool {
        self.pressed.insert((key, source))
    }

    /// Mark released. Returns false if it was not pressed.
    pub fn release(&mut self, key: Key, source: PressSource) -> bool {
        self.pressed.remove(&(key, source))
    }

    /// Check if a key is currently pressed by the given source
    pub fn is_pressed(&self, key: Key, source: PressSource) -> bool {
        self.pressed.contains(&(key, source))
    }

    /// Remove and return every key pressed by `source`, in key order.
    pub fn drain_source(&mut self, source: PressSource) -> Vec<Key> {
        let mut keys: Vec<Key> = self
            .pressed
            .iter()
            .filter(|(_, s)| *s == source)
            .map(|(k, _)| *k)
            .collect();
        keys.sort();
        self.pressed.retain(|(_, s)| *s != source);
        keys
    }

    /// Check if the state is empty
    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_release() {
        let mut state = PressedState::new();
        let key = Key::from(44);

        assert!(state.press(key, PressSource::Digital));
        assert!(!state.press(key, PressSource::Digital));
        assert!(state.is_pressed(key, PressSource::Digital));
        assert!(state.release(key, PressSource::Digital));
        assert!(!state.release(key, PressSource::Digital));
        assert!(state.is_empty());
    }

    #[test]
    fn test_sources_are_independent() {
        let mut state = PressedState::new();
        let key = Key::from(44);

        state.press(key, PressSource::Digital);
        assert!(!state.is_pressed(key, PressSource::Region));
        assert!(state.press(key, PressSource::Region));
        assert!(state.is_pressed(key, PressSource::Digital));
        assert!(state.is_pressed(key, PressSource::Region));
    }

    #[test]
    fn test_drain_source() {
        let mut state = PressedState::new();
        state.press(Key::from(45), PressSource::Region);
        state.press(Key::from(44), PressSource::Region);
        state.press(Key::from(1), PressSource::Digital);

        assert_eq!(
            state.drain_source(PressSource::Region),
            vec![Key::from(44), Key::from(45)]
        );
        assert!(state.is_pressed(Key::from(1), PressSource::Digital));
        assert!(!state.is_pressed(Key::from(44), PressSource::Region));
        assert!(state.drain_source(PressSource::Region).is_empty());
    }

    #[test]
    fn test_source_display() {
        assert_eq!(PressSource::Region.to_string(), "region");
    }
}
