// fpchid Profile Interpreter
// Digital and touch-region bindings over decoded event lines

use smallvec::SmallVec;

use super::state::{PressSource, PressedState};
use super::{Actions, Interpret};
use crate::action::{Action, KeyAction};
use crate::config::{KeyBinding, Profile};
use crate::input::{decode, AbsAxis, EventKind, RawEvent};
use crate::Key;

/// Interprets decoded events against a [`Profile`].
///
/// Owns all mutable state for profile mode: which bindings hold keys down
/// and the last reported touch coordinates.
#[derive(Debug, Clone)]
pub struct ProfileInterpreter {
    profile: Profile,
    pressed: PressedState,
    last_x: Option<i64>,
    last_y: Option<i64>,
}

impl ProfileInterpreter {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            pressed: PressedState::new(),
            last_x: None,
            last_y: None,
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn pressed(&self) -> &PressedState {
        &self.pressed
    }

    /// Last tracked touch position, if both axes have been reported.
    pub fn position(&self) -> Option<(i64, i64)> {
        Some((self.last_x?, self.last_y?))
    }

    /// Apply one decoded event.
    pub fn process_event(&mut self, event: &RawEvent) -> Actions {
        let mut actions = Actions::new();

        match (event.kind, event.axis()) {
            (EventKind::Sync, _) | (_, Some(AbsAxis::TrackingId)) => return actions,
            (_, Some(AbsAxis::PositionX)) => self.last_x = Some(event.value),
            (_, Some(AbsAxis::PositionY)) => self.last_y = Some(event.value),
            _ => {}
        }

        if event.is_contact_lift() {
            self.last_x = None;
            self.last_y = None;
            for key in self.pressed.drain_source(PressSource::Region) {
                actions.push(KeyAction::release(key));
            }
        }

        let position = self.position();
        let mut evaluated: SmallVec<[Key; 4]> = SmallVec::new();
        for binding in &self.profile.bindings {
            let action = match *binding {
                KeyBinding::Digital { key, code } => {
                    digital_transition(&mut self.pressed, key, code, event)
                }
                KeyBinding::Region { key, .. } => match position {
                    Some(pos) if !evaluated.contains(&key) => {
                        evaluated.push(key);
                        let inside = region_covers(&self.profile.bindings, key, pos);
                        region_transition(&mut self.pressed, key, inside)
                    }
                    _ => None,
                },
            };
            actions.extend(action);
        }

        actions
    }
}

fn digital_transition(
    pressed: &mut PressedState,
    key: Key,
    code: u16,
    event: &RawEvent,
) -> Option<KeyAction> {
    if event.kind != EventKind::Key || event.code != code {
        return None;
    }

    match Action::from_value(event.value)? {
        Action::Press if pressed.press(key, PressSource::Digital) => Some(KeyAction::press(key)),
        Action::Release if pressed.release(key, PressSource::Digital) => {
            Some(KeyAction::release(key))
        }
        _ => None,
    }
}

/// Whether any region bound to `key` contains the position.
fn region_covers(bindings: &[KeyBinding], key: Key, (px, py): (i64, i64)) -> bool {
    bindings.iter().any(|binding| match *binding {
        KeyBinding::Region { key: k, x, y } => k == key && x.contains(px) && y.contains(py),
        KeyBinding::Digital { .. } => false,
    })
}

fn region_transition(pressed: &mut PressedState, key: Key, inside: bool) -> Option<KeyAction> {
    if inside {
        pressed
            .press(key, PressSource::Region)
            .then(|| KeyAction::press(key))
    } else {
        pressed
            .release(key, PressSource::Region)
            .then(|| KeyAction::release(key))
    }
}

impl Interpret for ProfileInterpreter {
    fn process_line(&mut self, line: &str) -> Actions {
        if let Some(device) = &self.profile.device {
            if !line.contains(device.as_str()) {
                return Actions::new();
            }
        }

        match decode(line) {
            Ok(event) => {
                let actions = self.process_event(&event);
                for action in &actions {
                    log::debug!("{}: {} <- {}", self.profile.name, action, line);
                }
                actions
            }
            Err(e) => {
                log::trace!("Skipping line {:?}: {}", line, e);
                Actions::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AxisRange;
    use crate::input::{ABS_MT_POSITION_X, ABS_MT_POSITION_Y, ABS_MT_TRACKING_ID, BTN_TOUCH};

    fn z() -> Key {
        Key::from(44)
    }

    fn x_key() -> Key {
        Key::from(45)
    }

    fn abs(code: u16, value: i64) -> RawEvent {
        RawEvent::new(EventKind::Abs, code, value)
    }

    fn key_event(code: u16, value: i64) -> RawEvent {
        RawEvent::new(EventKind::Key, code, value)
    }

    fn region(key: Key, lo: i64, hi: i64) -> KeyBinding {
        KeyBinding::Region {
            key,
            x: AxisRange::Between { lo, hi },
            y: AxisRange::Ignore,
        }
    }

    #[test]
    fn test_region_waits_for_both_axes() {
        let mut interp = ProfileInterpreter::new(Profile::new("t", vec![region(z(), 100, 200)]));

        assert!(interp.process_event(&abs(ABS_MT_POSITION_X, 150)).is_empty());
        assert_eq!(
            interp.process_event(&abs(ABS_MT_POSITION_Y, 900)).as_slice(),
            &[KeyAction::press(z())]
        );
    }

    #[test]
    fn test_region_press_once_release_once() {
        let mut interp = ProfileInterpreter::new(Profile::new("t", vec![region(z(), 100, 200)]));
        interp.process_event(&abs(ABS_MT_POSITION_Y, 10));

        assert_eq!(interp.process_event(&abs(ABS_MT_POSITION_X, 150)).len(), 1);
        assert!(interp.process_event(&abs(ABS_MT_POSITION_X, 160)).is_empty());
        assert_eq!(
            interp.process_event(&abs(ABS_MT_POSITION_X, 250)).as_slice(),
            &[KeyAction::release(z())]
        );
        assert!(interp.process_event(&abs(ABS_MT_POSITION_X, 200)).is_empty());
        assert!(interp.process_event(&abs(ABS_MT_POSITION_X, 300)).is_empty());
    }

    #[test]
    fn test_region_boundaries_are_outside() {
        let mut interp = ProfileInterpreter::new(Profile::new("t", vec![region(z(), 100, 200)]));
        interp.process_event(&abs(ABS_MT_POSITION_Y, 10));

        assert!(interp.process_event(&abs(ABS_MT_POSITION_X, 100)).is_empty());
        assert!(interp.process_event(&abs(ABS_MT_POSITION_X, 200)).is_empty());
        assert!(interp.pressed().is_empty());
    }

    #[test]
    fn test_contact_lift_releases_regions_and_clears_position() {
        let profile = Profile::new("t", vec![region(z(), 0, 500), region(x_key(), 100, 300)]);
        let mut interp = ProfileInterpreter::new(profile);
        interp.process_event(&abs(ABS_MT_POSITION_Y, 10));
        assert_eq!(interp.process_event(&abs(ABS_MT_POSITION_X, 200)).len(), 2);

        let actions = interp.process_event(&key_event(BTN_TOUCH, 0));
        assert_eq!(
            actions.as_slice(),
            &[KeyAction::release(z()), KeyAction::release(x_key())]
        );
        assert_eq!(interp.position(), None);
        assert!(interp.pressed().is_empty());

        // X alone after the lift is not enough to press again
        assert!(interp.process_event(&abs(ABS_MT_POSITION_X, 200)).is_empty());
    }

    #[test]
    fn test_contact_lift_leaves_digital_keys() {
        let profile = Profile::new(
            "t",
            vec![KeyBinding::Digital {
                key: z(),
                code: 304,
            }],
        );
        let mut interp = ProfileInterpreter::new(profile);
        interp.process_event(&key_event(304, 1));

        assert!(interp.process_event(&key_event(BTN_TOUCH, 0)).is_empty());
        assert!(interp.pressed().is_pressed(z(), PressSource::Digital));
    }

    #[test]
    fn test_digital_press_is_idempotent() {
        let profile = Profile::new(
            "t",
            vec![KeyBinding::Digital {
                key: z(),
                code: 304,
            }],
        );
        let mut interp = ProfileInterpreter::new(profile);

        assert_eq!(
            interp.process_event(&key_event(304, 1)).as_slice(),
            &[KeyAction::press(z())]
        );
        assert!(interp.process_event(&key_event(304, 1)).is_empty());
        assert_eq!(
            interp.process_event(&key_event(304, 0)).as_slice(),
            &[KeyAction::release(z())]
        );
        assert!(interp.process_event(&key_event(304, 0)).is_empty());
    }

    #[test]
    fn test_digital_ignores_other_codes_and_repeat() {
        let profile = Profile::new(
            "t",
            vec![KeyBinding::Digital {
                key: z(),
                code: 304,
            }],
        );
        let mut interp = ProfileInterpreter::new(profile);

        assert!(interp.process_event(&key_event(305, 1)).is_empty());
        assert!(interp.process_event(&abs(304, 1)).is_empty());
        assert!(interp.process_event(&key_event(304, 2)).is_empty());
    }

    #[test]
    fn test_sync_and_tracking_id_skipped() {
        let mut interp = ProfileInterpreter::new(Profile::new("t", vec![region(z(), 100, 200)]));
        interp.process_event(&abs(ABS_MT_POSITION_Y, 10));
        interp.process_event(&abs(ABS_MT_POSITION_X, 150));

        assert!(interp
            .process_event(&RawEvent::new(EventKind::Sync, 0, 0))
            .is_empty());
        assert!(interp
            .process_event(&abs(ABS_MT_TRACKING_ID, 0xffff_ffff))
            .is_empty());
        assert!(interp.pressed().is_pressed(z(), PressSource::Region));
    }

    #[test]
    fn test_overlapping_regions_both_fire() {
        let profile = Profile::new("t", vec![region(z(), 0, 300), region(x_key(), 100, 400)]);
        let mut interp = ProfileInterpreter::new(profile);
        interp.process_event(&abs(ABS_MT_POSITION_Y, 10));

        let actions = interp.process_event(&abs(ABS_MT_POSITION_X, 200));
        assert_eq!(
            actions.as_slice(),
            &[KeyAction::press(z()), KeyAction::press(x_key())]
        );
    }

    #[test]
    fn test_disjoint_regions_sharing_a_key_hold_steady() {
        let profile = Profile::new("t", vec![region(z(), 0, 100), region(z(), 200, 300)]);
        let mut interp = ProfileInterpreter::new(profile);
        interp.process_event(&abs(ABS_MT_POSITION_Y, 10));

        assert_eq!(
            interp.process_event(&abs(ABS_MT_POSITION_X, 250)).as_slice(),
            &[KeyAction::press(z())]
        );
        assert!(interp.process_event(&abs(ABS_MT_POSITION_X, 251)).is_empty());
        assert!(interp.process_event(&abs(ABS_MT_POSITION_X, 252)).is_empty());

        // Moving into the other region keeps the key down
        assert!(interp.process_event(&abs(ABS_MT_POSITION_X, 50)).is_empty());
        assert_eq!(
            interp.process_event(&abs(ABS_MT_POSITION_X, 150)).as_slice(),
            &[KeyAction::release(z())]
        );
    }

    #[test]
    fn test_sliding_between_regions() {
        let profile = Profile::new("t", vec![region(z(), 0, 540), region(x_key(), 540, 1080)]);
        let mut interp = ProfileInterpreter::new(profile);
        interp.process_event(&abs(ABS_MT_POSITION_Y, 10));
        interp.process_event(&abs(ABS_MT_POSITION_X, 100));

        let actions = interp.process_event(&abs(ABS_MT_POSITION_X, 700));
        assert_eq!(
            actions.as_slice(),
            &[KeyAction::release(z()), KeyAction::press(x_key())]
        );
    }

    #[test]
    fn test_region_and_digital_share_key() {
        let profile = Profile::new(
            "t",
            vec![
                region(z(), 0, 100),
                KeyBinding::Digital {
                    key: z(),
                    code: 304,
                },
            ],
        );
        let mut interp = ProfileInterpreter::new(profile);
        interp.process_event(&abs(ABS_MT_POSITION_Y, 10));
        interp.process_event(&abs(ABS_MT_POSITION_X, 50));

        assert_eq!(interp.process_event(&key_event(304, 1)).len(), 1);
        assert!(interp.pressed().is_pressed(z(), PressSource::Region));
        assert!(interp.pressed().is_pressed(z(), PressSource::Digital));
    }

    #[test]
    fn test_process_line_decodes_and_filters_device() {
        let profile =
            Profile::new("t", vec![region(z(), 100, 200)]).with_device("/dev/input/event2");
        let mut interp = ProfileInterpreter::new(profile);

        assert!(interp.process_line("/dev/input/event2: 0003 0036 0000000a").is_empty());
        assert!(interp.process_line("/dev/input/event3: 0003 0035 00000096").is_empty());
        assert_eq!(
            interp.process_line("/dev/input/event2: 0003 0035 00000096").as_slice(),
            &[KeyAction::press(z())]
        );
    }

    #[test]
    fn test_malformed_lines_change_nothing() {
        let mut interp = ProfileInterpreter::new(Profile::new("t", vec![region(z(), 100, 200)]));
        for line in ["", "0003 0035", "/dev/input/event2: 0003 zz 00000096", "could not get driver version"] {
            assert!(interp.process_line(line).is_empty());
        }
        assert_eq!(interp.position(), None);
    }
}
