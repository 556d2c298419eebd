// fpchid Input Layer - Fingerprint Sensor Discovery
// Known-device table and name heuristics over the device inventory

use super::inventory::InventoryDevice;

/// Devices whose on/off lines are known exactly: (name, on, off).
pub const KNOWN_SENSORS: &[(&str, &str, &str)] =
    &[("uinput-fpc", "0001 0161 00000001", "0001 0161 00000000")];

/// Name fragments of common fingerprint sensor drivers.
pub const POSSIBLE_SENSOR_PATTERNS: &[&str] = &["fpc", "goodix"];

/// Name given to a sensor forced by path.
pub const FORCED_SENSOR_NAME: &str = "fingerprint";

/// How a sensor's lines are classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature {
    /// Literal substrings marking press and release.
    Exact { on: String, off: String },
    /// Decode the trailing hex value and treat 1/0 as press/release.
    Heuristic,
}

/// A binary-mode input device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sensor {
    pub name: String,
    pub path: String,
    pub signature: Signature,
}

impl Sensor {
    pub fn exact(
        name: impl Into<String>,
        path: impl Into<String>,
        on: impl Into<String>,
        off: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            signature: Signature::Exact {
                on: on.into(),
                off: off.into(),
            },
        }
    }

    pub fn heuristic(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            signature: Signature::Heuristic,
        }
    }

    /// Sensor for an operator-supplied device path; discovery is skipped.
    pub fn forced(path: impl Into<String>) -> Self {
        Self::heuristic(FORCED_SENSOR_NAME, path)
    }

    pub fn is_exact(&self) -> bool {
        matches!(self.signature, Signature::Exact { .. })
    }
}

/// Options that steer discovery.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Skip the known-sensor table and rely on name heuristics only.
    pub ignore_known: bool,
}

/// Find fingerprint sensors in a parsed inventory.
///
/// An exact match against [`KNOWN_SENSORS`] wins outright: it replaces any
/// heuristic matches found so far and ends the scan. Otherwise every device
/// whose name contains one of [`POSSIBLE_SENSOR_PATTERNS`] is returned.
pub fn discover_sensors(devices: &[InventoryDevice], options: &DiscoveryOptions) -> Vec<Sensor> {
    let mut sensors = Vec::new();

    for device in devices {
        if !options.ignore_known {
            if let Some((name, on, off)) = KNOWN_SENSORS.iter().find(|(n, _, _)| *n == device.name)
            {
                log::info!("Found exact match: {}", device.name);
                return vec![Sensor::exact(*name, device.path.clone(), *on, *off)];
            }
        }

        if POSSIBLE_SENSOR_PATTERNS
            .iter()
            .any(|pattern| device.name.contains(pattern))
        {
            log::info!("Found possible match: {}", device.name);
            sensors.push(Sensor::heuristic(device.name.clone(), device.path.clone()));
        }
    }

    sensors
}
