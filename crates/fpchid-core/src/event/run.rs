// fpchid Run Loop
// Single consumer: stream line -> interpreter -> actuator

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::source::{EventStream, SourceError, StreamPoll};
use crate::interpret::Interpret;
use crate::output::{Actuator, ActuatorError};

/// How long to wait for a line before re-checking the running flag
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Result type for run loop operations
pub type RunResult<T> = Result<T, RunError>;

/// Errors that end a run
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Event source error: {0}")]
    Source(#[from] SourceError),

    #[error("Key output error: {0}")]
    Actuator(#[from] ActuatorError),
}

/// Why the run loop returned normally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The line source reached end of stream.
    StreamClosed,
    /// The running flag was cleared (signal).
    Interrupted,
}

/// Counters reported when the loop ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub lines: u64,
    pub actions: u64,
    pub stop: StopReason,
}

/// Feed one line through the interpreter and forward its actions in order.
///
/// Returns the number of actions applied.
pub fn dispatch_line<I, A>(line: &str, interpreter: &mut I, actuator: &mut A) -> RunResult<usize>
where
    I: Interpret + ?Sized,
    A: Actuator + ?Sized,
{
    let actions = interpreter.process_line(line);
    for action in &actions {
        actuator.apply(*action)?;
    }
    Ok(actions.len())
}

/// Consume `stream` until it closes, `running` is cleared, or an error occurs.
pub fn run<I, A>(
    stream: &EventStream,
    interpreter: &mut I,
    actuator: &mut A,
    running: &AtomicBool,
) -> RunResult<RunSummary>
where
    I: Interpret + ?Sized,
    A: Actuator + ?Sized,
{
    let mut lines = 0u64;
    let mut actions = 0u64;

    while running.load(Ordering::SeqCst) {
        match stream.poll(POLL_INTERVAL)? {
            StreamPoll::Line(line) => {
                lines += 1;
                actions += dispatch_line(&line, interpreter, actuator)? as u64;
            }
            StreamPoll::Timeout => {}
            StreamPoll::Closed => {
                log::info!("Event stream closed after {} line(s)", lines);
                // A terminal Ctrl-C also kills adb, so the close can race the flag.
                let stop = if running.load(Ordering::SeqCst) {
                    StopReason::StreamClosed
                } else {
                    StopReason::Interrupted
                };
                return Ok(RunSummary {
                    lines,
                    actions,
                    stop,
                });
            }
        }
    }

    Ok(RunSummary {
        lines,
        actions,
        stop: StopReason::Interrupted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::KeyAction;
    use crate::input::Sensor;
    use crate::interpret::BinaryInterpreter;
    use crate::Key;
    use std::io::{Cursor, Read};
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder(Vec<KeyAction>);

    impl Actuator for Recorder {
        fn press(&mut self, key: Key) -> Result<(), ActuatorError> {
            self.0.push(KeyAction::press(key));
            Ok(())
        }

        fn release(&mut self, key: Key) -> Result<(), ActuatorError> {
            self.0.push(KeyAction::release(key));
            Ok(())
        }
    }

    fn interpreter() -> BinaryInterpreter {
        BinaryInterpreter::new(
            vec![Sensor::heuristic("fpc_fod", "/dev/input/event5")],
            Key::from(44),
        )
    }

    #[test]
    fn test_run_until_stream_closes() {
        let input = "/dev/input/event5: 0001 0161 00000001\n/dev/input/event5: 0000 0000 00000000\n/dev/input/event5: 0001 0161 00000000\n";
        let stream = EventStream::from_reader(Cursor::new(input.as_bytes().to_vec()));
        let mut recorder = Recorder::default();
        let running = AtomicBool::new(true);

        let summary = run(&stream, &mut interpreter(), &mut recorder, &running).unwrap();

        assert_eq!(summary.stop, StopReason::StreamClosed);
        assert_eq!(summary.lines, 3);
        assert_eq!(summary.actions, 2);
        assert_eq!(
            recorder.0,
            vec![
                KeyAction::press(Key::from(44)),
                KeyAction::release(Key::from(44))
            ]
        );
    }

    #[test]
    fn test_cleared_flag_stops_immediately() {
        let stream = EventStream::from_reader(Cursor::new(Vec::new()));
        let running = AtomicBool::new(false);

        let summary = run(&stream, &mut interpreter(), &mut Recorder::default(), &running).unwrap();

        assert_eq!(summary.stop, StopReason::Interrupted);
        assert_eq!(summary.lines, 0);
    }

    /// Reader that clears the running flag right before hitting EOF
    struct InterruptedReader(Arc<AtomicBool>);

    impl Read for InterruptedReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            self.0.store(false, Ordering::SeqCst);
            Ok(0)
        }
    }

    #[test]
    fn test_close_after_signal_is_interrupt() {
        let running = Arc::new(AtomicBool::new(true));
        let stream = EventStream::from_reader(InterruptedReader(running.clone()));

        let summary = run(&stream, &mut interpreter(), &mut Recorder::default(), &running).unwrap();

        assert_eq!(summary.stop, StopReason::Interrupted);
        assert_eq!(summary.lines, 0);
    }
}
