// fpchid Core Library
// Android getevent streams to host key presses

pub mod action;
pub mod config;
pub mod event;
pub mod input;
pub mod interpret;
pub mod key;
pub mod output;

pub use action::{Action, KeyAction};
pub use config::{AxisRange, KeyBinding, Profile, ProfileError};
pub use event::{AdbBridge, EventStream, RunError, RunSummary, SourceError, StopReason};
pub use input::{
    decode, discover_sensors, parse_inventory, DecodeError, DiscoveryOptions, EventKind,
    RawEvent, Sensor, Signature,
};
pub use interpret::{
    Actions, BinaryInterpreter, Interpret, Interpreter, PressSource, ProfileInterpreter,
};
pub use key::Key;
pub use output::{Actuator, ActuatorError, DryRunActuator};

#[cfg(feature = "uinput")]
pub use output::VirtualKeyboard;
