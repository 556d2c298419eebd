// fpchid uinput Output Layer
// Virtual keyboard creation and key event emission

use std::collections::HashSet;

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, EventType, InputEvent};

use super::{Actuator, ActuatorError};
use crate::action::Action;
use crate::Key;

const DEVICE_NAME: &str = "fpchid (virtual) Keyboard";

/// Virtual uinput keyboard
pub struct VirtualKeyboard {
    device: VirtualDevice,
    held: HashSet<Key>,
}

impl VirtualKeyboard {
    /// Create a new virtual uinput keyboard
    pub fn new() -> Result<Self, ActuatorError> {
        // Standard keyboard keys (0-255)
        let mut keys = AttributeSet::new();
        for code in 0..256u16 {
            keys.insert(evdev::Key::new(code));
        }

        let device = VirtualDeviceBuilder::new()
            .map_err(|e: std::io::Error| ActuatorError::DeviceCreation(e.to_string()))?
            .name(DEVICE_NAME)
            .with_keys(&keys)
            .map_err(|e: std::io::Error| ActuatorError::DeviceCreation(e.to_string()))?
            .build()
            .map_err(|e: std::io::Error| ActuatorError::DeviceCreation(e.to_string()))?;

        log::info!("Created virtual keyboard {:?}", DEVICE_NAME);

        Ok(Self {
            device,
            held: HashSet::new(),
        })
    }

    fn write_key_event(&mut self, key: Key, action: Action) -> Result<(), ActuatorError> {
        let key_event = InputEvent::new(EventType::KEY, key.code(), action.to_i32());
        // SYN event is required for the kernel to process the key event
        let syn_event = InputEvent::new(EventType::SYNCHRONIZATION, 0, 0);

        self.device
            .emit(&[key_event, syn_event])
            .map_err(|e: std::io::Error| ActuatorError::WriteError(e.to_string()))?;

        match action {
            Action::Press => self.held.insert(key),
            Action::Release => self.held.remove(&key),
        };

        Ok(())
    }

    /// Release every key this device still holds down
    pub fn release_all(&mut self) -> Result<(), ActuatorError> {
        let mut held: Vec<Key> = self.held.iter().copied().collect();
        held.sort();
        for key in held {
            self.write_key_event(key, Action::Release)?;
        }
        Ok(())
    }
}

impl Actuator for VirtualKeyboard {
    fn press(&mut self, key: Key) -> Result<(), ActuatorError> {
        self.write_key_event(key, Action::Press)
    }

    fn release(&mut self, key: Key) -> Result<(), ActuatorError> {
        self.write_key_event(key, Action::Release)
    }
}

/// Keys left down when the run ends would stay stuck on the host.
impl Drop for VirtualKeyboard {
    fn drop(&mut self) {
        if let Err(e) = self.release_all() {
            log::warn!("Failed to release held keys: {}", e);
        }
    }
}
