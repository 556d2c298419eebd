// fpchid Config API
// Profile files for profile (region) mode

pub mod profile;

pub use profile::{AxisRange, BindingToml, KeyBinding, Profile, ProfileError, ProfileToml, RangeToml};
