// fpchid Input Layer
// Line decoding, device inventory and sensor discovery

mod event;
mod inventory;
mod sensor;

pub use event::{
    decode, hex_triple, AbsAxis, DecodeError, EventKind, RawEvent, ABS_MT_POSITION_X,
    ABS_MT_POSITION_Y, ABS_MT_TRACKING_ID, BTN_TOUCH, EV_ABS, EV_KEY, EV_SYN,
};
pub use inventory::{parse_inventory, InventoryDevice};
pub use sensor::{
    discover_sensors, DiscoveryOptions, Sensor, Signature, FORCED_SENSOR_NAME, KNOWN_SENSORS,
    POSSIBLE_SENSOR_PATTERNS,
};
