// fpchid Input Layer - Device Inventory
// Parses `getevent -i` output into (path, name) records

/// Device information for listing devices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryDevice {
    /// Device path, e.g. `/dev/input/event5`
    pub path: String,
    /// Declared device name
    pub name: String,
}

/// Extract `fpc_fod` from `  name:     "fpc_fod"`.
fn declared_name(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix("name:")?;
    let mut quoted = rest.split('"');
    quoted.next()?;
    quoted.next()
}

/// Parse the device inventory listing.
///
/// A record starts at an `add device N: <path>` line; the first `name: "..."`
/// line after it names the device. Records without a path or name, and
/// everything else in the listing, are skipped.
pub fn parse_inventory(text: &str) -> Vec<InventoryDevice> {
    let mut devices = Vec::new();
    let mut pending_path: Option<String> = None;

    for line in text.lines() {
        let line = line.trim_end_matches('\r');

        if line.starts_with("add device") {
            // "add device 1: /dev/input/event5" -> 4th token is the path
            pending_path = line.split_whitespace().nth(3).map(str::to_string);
            continue;
        }

        let Some(path) = pending_path.as_ref() else {
            continue;
        };

        if let Some(name) = declared_name(line) {
            devices.push(InventoryDevice {
                path: path.clone(),
                name: name.to_string(),
            });
            pending_path = None;
        }
    }

    devices
}
