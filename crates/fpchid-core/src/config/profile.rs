// fpchid Profile Parser - TOML with Serde
// Loads key-binding profiles for touch/button driven keys

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::key::key_from_name;
use crate::Key;

/// Profile loading errors
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Unknown key: {0}")]
    UnknownKey(String),

    #[error("Invalid range for {key}: {reason}")]
    InvalidRange { key: String, reason: String },

    #[error("Profile not found: {0}")]
    NotFound(String),
}

/// Profile file root table
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileToml {
    /// Profile display name
    pub name: String,

    /// Only interpret lines from this device path
    #[serde(default)]
    pub device: Option<String>,

    /// Ordered `[[binding]]` entries
    #[serde(default, rename = "binding")]
    pub bindings: Vec<BindingToml>,
}

/// One `[[binding]]` entry, tagged by `type`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BindingToml {
    /// A digital button: `type = "key"`
    Key { key: String, code: u16 },
    /// A touch region: `type = "abs"`
    Abs {
        key: String,
        x: RangeToml,
        y: RangeToml,
    },
}

/// `[lo, hi]` or `"ignore"`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RangeToml {
    Bounds([i64; 2]),
    Keyword(String),
}

/// Accepted coordinates on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisRange {
    /// Any coordinate satisfies the axis.
    Ignore,
    /// Strictly between the bounds; the bounds themselves are outside.
    Between { lo: i64, hi: i64 },
}

impl AxisRange {
    pub fn contains(&self, value: i64) -> bool {
        match *self {
            AxisRange::Ignore => true,
            AxisRange::Between { lo, hi } => lo < value && value < hi,
        }
    }
}

/// A resolved binding from device input to a host key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyBinding {
    /// Fires on an exact key-code match; value 1 presses, 0 releases.
    Digital { key: Key, code: u16 },
    /// Held while the tracked touch position lies inside both ranges.
    Region { key: Key, x: AxisRange, y: AxisRange },
}

impl KeyBinding {
    pub fn key(&self) -> Key {
        match self {
            KeyBinding::Digital { key, .. } | KeyBinding::Region { key, .. } => *key,
        }
    }
}

/// An immutable set of bindings, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub device: Option<String>,
    pub bindings: Vec<KeyBinding>,
}

impl Profile {
    pub fn new(name: impl Into<String>, bindings: Vec<KeyBinding>) -> Self {
        Self {
            name: name.into(),
            device: None,
            bindings,
        }
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    /// Load a profile from a TOML file
    pub fn from_toml_path(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse a profile from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ProfileError> {
        let raw: ProfileToml =
            toml::from_str(content).map_err(|e| ProfileError::TomlParse(e.to_string()))?;
        Self::try_from(raw)
    }

    /// Resolve a `--profile` argument to a file.
    ///
    /// An existing path is used as is. A bare name is looked up as
    /// `<config_dir>/fpchid/profiles/<name>.toml`.
    pub fn resolve_path(arg: &str) -> Result<PathBuf, ProfileError> {
        let direct = PathBuf::from(arg);
        if direct.is_file() {
            return Ok(direct);
        }

        if let Some(candidate) = Self::default_dir().map(|dir| dir.join(format!("{}.toml", arg))) {
            if candidate.is_file() {
                return Ok(candidate);
            }
        }

        Err(ProfileError::NotFound(arg.to_string()))
    }

    /// Directory searched for named profiles
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("fpchid").join("profiles"))
    }

    pub fn has_regions(&self) -> bool {
        self.bindings
            .iter()
            .any(|b| matches!(b, KeyBinding::Region { .. }))
    }
}

impl TryFrom<ProfileToml> for Profile {
    type Error = ProfileError;

    fn try_from(raw: ProfileToml) -> Result<Self, Self::Error> {
        let bindings = raw
            .bindings
            .into_iter()
            .map(resolve_binding)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: raw.name,
            device: raw.device,
            bindings,
        })
    }
}

fn resolve_key(name: &str) -> Result<Key, ProfileError> {
    key_from_name(name).ok_or_else(|| ProfileError::UnknownKey(name.to_string()))
}

fn resolve_range(key: &str, range: RangeToml) -> Result<AxisRange, ProfileError> {
    match range {
        RangeToml::Keyword(word) if word.eq_ignore_ascii_case("ignore") => Ok(AxisRange::Ignore),
        RangeToml::Keyword(word) => Err(ProfileError::InvalidRange {
            key: key.to_string(),
            reason: format!("expected [lo, hi] or \"ignore\", got {:?}", word),
        }),
        RangeToml::Bounds([lo, hi]) if lo >= hi => Err(ProfileError::InvalidRange {
            key: key.to_string(),
            reason: format!("empty range [{}, {}]", lo, hi),
        }),
        RangeToml::Bounds([lo, hi]) => Ok(AxisRange::Between { lo, hi }),
    }
}

fn resolve_binding(raw: BindingToml) -> Result<KeyBinding, ProfileError> {
    match raw {
        BindingToml::Key { key, code } => Ok(KeyBinding::Digital {
            key: resolve_key(&key)?,
            code,
        }),
        BindingToml::Abs { key, x, y } => Ok(KeyBinding::Region {
            key: resolve_key(&key)?,
            x: resolve_range(&key, x)?,
            y: resolve_range(&key, y)?,
        }),
    }
}
