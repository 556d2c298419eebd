// fpchid Output Layer
// Host key synthesis behind a small actuator trait

mod dry_run;

#[cfg(feature = "uinput")]
mod uinput;

use crate::action::{Action, KeyAction};
use crate::Key;

pub use dry_run::DryRunActuator;

#[cfg(feature = "uinput")]
pub use uinput::VirtualKeyboard;

/// Error types for key output
#[derive(Debug, thiserror::Error)]
pub enum ActuatorError {
    #[error("Failed to create virtual device: {0}")]
    DeviceCreation(String),

    #[error("Failed to write event: {0}")]
    WriteError(String),
}

/// Performs host key presses and releases.
///
/// Calls are expected to be fast. An error is treated as fatal by the run
/// loop.
pub trait Actuator {
    fn press(&mut self, key: Key) -> Result<(), ActuatorError>;

    fn release(&mut self, key: Key) -> Result<(), ActuatorError>;

    fn apply(&mut self, action: KeyAction) -> Result<(), ActuatorError> {
        match action.action {
            Action::Press => self.press(action.key),
            Action::Release => self.release(action.key),
        }
    }
}

impl<A: Actuator + ?Sized> Actuator for Box<A> {
    fn press(&mut self, key: Key) -> Result<(), ActuatorError> {
        (**self).press(key)
    }

    fn release(&mut self, key: Key) -> Result<(), ActuatorError> {
        (**self).release(key)
    }
}
