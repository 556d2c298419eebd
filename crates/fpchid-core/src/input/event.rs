// fpchid Input Layer - Raw Event Decoding
// Turns one `getevent` line into a typed event record

use strum_macros::{AsRefStr, Display};

/// EV_SYN event type code
pub const EV_SYN: u16 = 0x00;
/// EV_KEY event type code
pub const EV_KEY: u16 = 0x01;
/// EV_ABS event type code
pub const EV_ABS: u16 = 0x03;

pub const ABS_MT_POSITION_X: u16 = 0x35;
pub const ABS_MT_POSITION_Y: u16 = 0x36;
pub const ABS_MT_TRACKING_ID: u16 = 0x39;

/// BTN_TOUCH: finger down/up independent of coordinates
pub const BTN_TOUCH: u16 = 0x14a;

/// Errors from decoding a single event line.
///
/// These are always recoverable: the caller skips the line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Expected at least 3 tokens, found {0}")]
    TooFewTokens(usize),

    #[error("Invalid hex token: {0:?}")]
    InvalidHex(String),

    #[error("Unknown event type: {0:#06x}")]
    UnknownEventKind(u16),
}

/// Event types this tool understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    Sync,
    Key,
    Abs,
}

impl EventKind {
    pub fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            EV_SYN => Some(EventKind::Sync),
            EV_KEY => Some(EventKind::Key),
            EV_ABS => Some(EventKind::Abs),
            _ => None,
        }
    }
}

/// Classification of an absolute-axis code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbsAxis {
    PositionX,
    PositionY,
    TrackingId,
    Other(u16),
}

impl AbsAxis {
    pub fn from_code(code: u16) -> Self {
        match code {
            ABS_MT_POSITION_X => AbsAxis::PositionX,
            ABS_MT_POSITION_Y => AbsAxis::PositionY,
            ABS_MT_TRACKING_ID => AbsAxis::TrackingId,
            other => AbsAxis::Other(other),
        }
    }
}

/// One decoded event-device line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub kind: EventKind,
    pub code: u16,
    pub value: i64,
}

impl RawEvent {
    pub fn new(kind: EventKind, code: u16, value: i64) -> Self {
        Self { kind, code, value }
    }

    /// Axis classification, for `Abs` events only.
    pub fn axis(&self) -> Option<AbsAxis> {
        match self.kind {
            EventKind::Abs => Some(AbsAxis::from_code(self.code)),
            _ => None,
        }
    }

    /// Whether this is a finger-lift on the touch contact button.
    pub fn is_contact_lift(&self) -> bool {
        self.kind == EventKind::Key && self.code == BTN_TOUCH && self.value == 0
    }
}

/// Parse the last three whitespace-separated tokens of a line as hex.
///
/// Shared by the full decoder and the heuristic sensor path, which does
/// not care whether the type is one we know.
pub fn hex_triple(line: &str) -> Result<[i64; 3], DecodeError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err(DecodeError::TooFewTokens(tokens.len()));
    }

    let mut out = [0i64; 3];
    for (slot, token) in out.iter_mut().zip(&tokens[tokens.len() - 3..]) {
        *slot = i64::from_str_radix(token, 16)
            .map_err(|_| DecodeError::InvalidHex((*token).to_string()))?;
    }
    Ok(out)
}

/// Decode one `getevent` line, e.g. `/dev/input/event2: 0003 0035 000001a4`.
pub fn decode(line: &str) -> Result<RawEvent, DecodeError> {
    let [ty, code, value] = hex_triple(line)?;

    let ty = u16::try_from(ty).map_err(|_| DecodeError::InvalidHex(format!("{:x}", ty)))?;
    let code = u16::try_from(code).map_err(|_| DecodeError::InvalidHex(format!("{:x}", code)))?;
    let kind = EventKind::from_raw(ty).ok_or(DecodeError::UnknownEventKind(ty))?;

    Ok(RawEvent::new(kind, code, value))
}
