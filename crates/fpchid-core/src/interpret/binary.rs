// fpchid Binary Interpreter
// One key driven by fingerprint sensor on/off lines

use super::{Actions, Interpret};
use crate::action::{Action, KeyAction};
use crate::input::{hex_triple, Sensor, Signature};
use crate::Key;

/// Maps sensor lines to press/release of a single key.
///
/// Every matching sensor is evaluated independently and nothing is
/// de-duplicated: repeated "on" lines produce repeated presses, which the
/// actuator is expected to tolerate.
#[derive(Debug, Clone)]
pub struct BinaryInterpreter {
    sensors: Vec<Sensor>,
    key: Key,
}

impl BinaryInterpreter {
    pub fn new(sensors: Vec<Sensor>, key: Key) -> Self {
        Self { sensors, key }
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    pub fn key(&self) -> Key {
        self.key
    }

    fn classify(&self, sensor: &Sensor, line: &str) -> Option<KeyAction> {
        match &sensor.signature {
            Signature::Exact { on, off } => {
                if line.contains(on.as_str()) {
                    Some(KeyAction::press(self.key))
                } else if line.contains(off.as_str()) {
                    Some(KeyAction::release(self.key))
                } else {
                    None
                }
            }
            Signature::Heuristic => {
                let [ty, code, value] = hex_triple(line).ok()?;
                // keep-alive frames
                if ty == 0 && code == 0 && value == 0 {
                    return None;
                }
                Action::from_value(value).map(|action| KeyAction {
                    key: self.key,
                    action,
                })
            }
        }
    }
}

impl Interpret for BinaryInterpreter {
    fn process_line(&mut self, line: &str) -> Actions {
        let mut actions = Actions::new();

        for sensor in self.sensors.iter().filter(|s| line.contains(s.path.as_str())) {
            if let Some(action) = self.classify(sensor, line) {
                log::debug!("{}: {} <- {}", sensor.name, action, line);
                actions.push(action);
            }
        }

        actions
    }
}
