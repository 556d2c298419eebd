// fpchid Event Handling
// Remote line source and the consuming run loop

pub mod run;
pub mod source;

pub use run::{dispatch_line, run, RunError, RunResult, RunSummary, StopReason, POLL_INTERVAL};
pub use source::{AdbBridge, EventStream, SourceError, StreamPoll};
