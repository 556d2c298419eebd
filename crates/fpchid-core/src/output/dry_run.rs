use super::{Actuator, ActuatorError};
use crate::Key;

/// Logs key actions instead of injecting them.
#[derive(Debug, Default)]
pub struct DryRunActuator {
    presses: u64,
    releases: u64,
}

impl DryRunActuator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Actuator for DryRunActuator {
    fn press(&mut self, key: Key) -> Result<(), ActuatorError> {
        self.presses += 1;
        log::info!("[dry-run] press {}", key);
        Ok(())
    }

    fn release(&mut self, key: Key) -> Result<(), ActuatorError> {
        self.releases += 1;
        log::info!("[dry-run] release {}", key);
        Ok(())
    }
}

impl Drop for DryRunActuator {
    fn drop(&mut self) {
        log::info!(
            "[dry-run] {} press(es), {} release(s)",
            self.presses,
            self.releases
        );
    }
}
