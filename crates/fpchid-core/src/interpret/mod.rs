// fpchid Event Stream Interpretation
// Stateful translation of event lines into key actions

mod binary;
mod profile;
mod state;

use smallvec::SmallVec;

use crate::action::KeyAction;

pub use binary::BinaryInterpreter;
pub use profile::ProfileInterpreter;
pub use state::{PressSource, PressedState};

/// Actions produced by one line; almost always zero to two.
pub type Actions = SmallVec<[KeyAction; 4]>;

/// Line-at-a-time interpreter.
///
/// Implementations never fail: lines they cannot make sense of produce no
/// actions and leave state untouched. Lines must be fed in arrival order
/// from a single thread.
pub trait Interpret {
    fn process_line(&mut self, line: &str) -> Actions;
}

/// The interpreter selected at startup.
#[derive(Debug, Clone)]
pub enum Interpreter {
    Binary(BinaryInterpreter),
    Profile(ProfileInterpreter),
}

impl Interpreter {
    pub fn mode_name(&self) -> &'static str {
        match self {
            Interpreter::Binary(_) => "binary",
            Interpreter::Profile(_) => "profile",
        }
    }
}

impl Interpret for Interpreter {
    fn process_line(&mut self, line: &str) -> Actions {
        match self {
            Interpreter::Binary(inner) => inner.process_line(line),
            Interpreter::Profile(inner) => inner.process_line(line),
        }
    }
}

impl From<BinaryInterpreter> for Interpreter {
    fn from(inner: BinaryInterpreter) -> Self {
        Interpreter::Binary(inner)
    }
}

impl From<ProfileInterpreter> for Interpreter {
    fn from(inner: ProfileInterpreter) -> Self {
        Interpreter::Profile(inner)
    }
}
