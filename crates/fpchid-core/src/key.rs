// fpchid Key Type
// Host key codes from Linux input-event-codes.h and their symbolic names

use std::fmt;
use std::str::FromStr;

/// A single host keyboard key code.
///
/// Newtype over the Linux `KEY_*` numeric value, which is what the uinput
/// output device expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Key(pub u16);

impl Key {
    /// Get the raw numeric code value
    pub fn code(self) -> u16 {
        self.0
    }

    /// Get the canonical name of this key
    pub fn name(self) -> &'static str {
        key_name(self.0)
    }
}

impl From<u16> for Key {
    fn from(code: u16) -> Self {
        Key(code)
    }
}

impl From<Key> for u16 {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        key_from_name(s).ok_or_else(|| format!("Unknown key: {}", s))
    }
}

// Canonical names come first for each code; later entries are aliases.
const KEY_TABLE: &[(&str, u16)] = &[
    ("ESC", 1),
    ("ESCAPE", 1),
    ("KEY_1", 2),
    ("1", 2),
    ("KEY_2", 3),
    ("2", 3),
    ("KEY_3", 4),
    ("3", 4),
    ("KEY_4", 5),
    ("4", 5),
    ("KEY_5", 6),
    ("5", 6),
    ("KEY_6", 7),
    ("6", 7),
    ("KEY_7", 8),
    ("7", 8),
    ("KEY_8", 9),
    ("8", 9),
    ("KEY_9", 10),
    ("9", 10),
    ("KEY_0", 11),
    ("0", 11),
    ("MINUS", 12),
    ("EQUAL", 13),
    ("BACKSPACE", 14),
    ("TAB", 15),
    ("Q", 16),
    ("W", 17),
    ("E", 18),
    ("R", 19),
    ("T", 20),
    ("Y", 21),
    ("U", 22),
    ("I", 23),
    ("O", 24),
    ("P", 25),
    ("LEFT_BRACE", 26),
    ("RIGHT_BRACE", 27),
    ("ENTER", 28),
    ("LEFT_CTRL", 29),
    ("A", 30),
    ("S", 31),
    ("D", 32),
    ("F", 33),
    ("G", 34),
    ("H", 35),
    ("J", 36),
    ("K", 37),
    ("L", 38),
    ("SEMICOLON", 39),
    ("APOSTROPHE", 40),
    ("GRAVE", 41),
    ("LEFT_SHIFT", 42),
    ("BACKSLASH", 43),
    ("Z", 44),
    ("X", 45),
    ("C", 46),
    ("V", 47),
    ("B", 48),
    ("N", 49),
    ("M", 50),
    ("COMMA", 51),
    ("DOT", 52),
    ("SLASH", 53),
    ("RIGHT_SHIFT", 54),
    ("LEFT_ALT", 56),
    ("SPACE", 57),
    ("CAPSLOCK", 58),
    ("F1", 59),
    ("F2", 60),
    ("F3", 61),
    ("F4", 62),
    ("F5", 63),
    ("F6", 64),
    ("F7", 65),
    ("F8", 66),
    ("F9", 67),
    ("F10", 68),
    ("F11", 87),
    ("F12", 88),
    ("KPENTER", 96),
    ("RIGHT_CTRL", 97),
    ("SYSRQ", 99),
    ("PRINT", 99),
    ("RIGHT_ALT", 100),
    ("HOME", 102),
    ("UP", 103),
    ("PAGE_UP", 104),
    ("LEFT", 105),
    ("RIGHT", 106),
    ("END", 107),
    ("DOWN", 108),
    ("PAGE_DOWN", 109),
    ("INSERT", 110),
    ("DELETE", 111),
    ("MUTE", 113),
    ("VOLUMEDOWN", 114),
    ("VOLUMEUP", 115),
    ("PAUSE", 119),
    ("LEFT_META", 125),
    ("RIGHT_META", 126),
    ("MENU", 139),
    ("NEXTSONG", 163),
    ("PLAYPAUSE", 164),
    ("PREVIOUSSONG", 165),
    ("STOPCD", 166),
    ("F13", 183),
    ("F14", 184),
    ("F15", 185),
    ("F16", 186),
    ("F17", 187),
    ("F18", 188),
    ("F19", 189),
    ("F20", 190),
    ("F21", 191),
    ("F22", 192),
    ("F23", 193),
    ("F24", 194),
];

/// Display name for a key code
pub fn key_name(code: u16) -> &'static str {
    KEY_TABLE
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(name, _)| *name)
        .unwrap_or("UNKNOWN")
}

/// Resolve a key symbol to a key code.
///
/// Accepts table names case-insensitively (`"z"`, `"Enter"`, `"LEFT_CTRL"`)
/// and single punctuation characters (`";"`, `" "`).
pub fn key_from_name(name: &str) -> Option<Key> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if let Some(key) = ascii_to_key(c) {
            return Some(key);
        }
    }

    let name_upper = name.trim().to_uppercase();
    KEY_TABLE
        .iter()
        .find(|(n, _)| *n == name_upper)
        .map(|(_, code)| Key::from(*code))
}

/// ASCII punctuation to key code mapping
pub fn ascii_to_key(c: char) -> Option<Key> {
    match c {
        ';' => Some(Key::from(39)),  // SEMICOLON
        '\'' => Some(Key::from(40)), // APOSTROPHE
        '=' => Some(Key::from(13)),  // EQUAL
        '-' => Some(Key::from(12)),  // MINUS
        '`' => Some(Key::from(41)),  // GRAVE
        '[' => Some(Key::from(26)),  // LEFT_BRACE
        ']' => Some(Key::from(27)),  // RIGHT_BRACE
        ',' => Some(Key::from(51)),  // COMMA
        '.' => Some(Key::from(52)),  // DOT
        '/' => Some(Key::from(53)),  // SLASH
        ' ' => Some(Key::from(57)),  // SPACE
        '\\' => Some(Key::from(43)), // BACKSLASH
        _ => None,
    }
}
