// fpchid Device Source
// `adb shell getevent` inventory and line stream

use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// Errors from the remote device source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Event source has no stdout")]
    MissingStdout,
}

/// How to reach `getevent` on the device.
#[derive(Debug, Clone)]
pub struct AdbBridge {
    program: String,
    serial: Option<String>,
}

impl Default for AdbBridge {
    fn default() -> Self {
        Self::new("adb")
    }
}

impl AdbBridge {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            serial: None,
        }
    }

    /// Target a specific device (`adb -s <serial>`).
    pub fn with_serial(mut self, serial: Option<String>) -> Self {
        self.serial = serial;
        self
    }

    /// Build `adb [-s serial] shell <args...>`
    pub fn shell_command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        if let Some(serial) = &self.serial {
            cmd.arg("-s").arg(serial);
        }
        cmd.arg("shell").args(args);
        cmd
    }

    /// Fetch the `getevent -i` device inventory.
    pub fn inventory(&self) -> Result<String, SourceError> {
        let output = self
            .shell_command(&["getevent", "-i"])
            .stdin(Stdio::null())
            .output()
            .map_err(|source| SourceError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(SourceError::CommandFailed {
                command: format!("{} shell getevent -i", self.program),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).replace("\r\n", "\n"))
    }

    /// Start streaming raw `getevent` lines.
    pub fn stream(&self) -> Result<EventStream, SourceError> {
        log::info!("Starting {} shell getevent", self.program);
        let mut cmd = self.shell_command(&["getevent"]);
        EventStream::spawn(&mut cmd)
    }
}

/// Result of waiting for the next line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamPoll {
    Line(String),
    Timeout,
    Closed,
}

/// Ordered line stream fed by a reader thread.
///
/// Owns the producing subprocess, if any. Dropping the stream kills and
/// reaps it, so no `getevent` is left running after normal exit, early
/// return, or panic.
pub struct EventStream {
    child: Option<Child>,
    lines: Receiver<std::io::Result<String>>,
}

impl EventStream {
    /// Spawn `cmd` and stream its stdout.
    pub fn spawn(cmd: &mut Command) -> Result<Self, SourceError> {
        let program = cmd.get_program().to_string_lossy().into_owned();
        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| SourceError::Spawn { program, source })?;

        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(SourceError::MissingStdout);
        };

        let mut stream = Self::from_reader(stdout);
        stream.child = Some(child);
        Ok(stream)
    }

    /// Stream lines from any reader, without a subprocess.
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let mut reader = BufReader::new(reader);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) => break,
                    Ok(_) => {
                        let line = String::from_utf8_lossy(&buf)
                            .trim_end_matches(['\r', '\n'])
                            .to_string();
                        if tx.send(Ok(line)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(Err(e));
                        break;
                    }
                }
            }
        });

        Self {
            child: None,
            lines: rx,
        }
    }

    /// Wait up to `timeout` for the next line.
    pub fn poll(&self, timeout: Duration) -> Result<StreamPoll, SourceError> {
        match self.lines.recv_timeout(timeout) {
            Ok(Ok(line)) => Ok(StreamPoll::Line(line)),
            Ok(Err(e)) => Err(SourceError::Io(e)),
            Err(RecvTimeoutError::Timeout) => Ok(StreamPoll::Timeout),
            Err(RecvTimeoutError::Disconnected) => Ok(StreamPoll::Closed),
        }
    }

    /// Kill the producing subprocess, if still running.
    pub fn terminate(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                // InvalidInput: already exited
                if e.kind() != std::io::ErrorKind::InvalidInput {
                    log::warn!("Failed to kill event source: {}", e);
                }
            }
            match child.wait() {
                Ok(status) => log::debug!("Event source exited: {}", status),
                Err(e) => log::warn!("Failed to reap event source: {}", e),
            }
        }
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.terminate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn collect(stream: &EventStream) -> Vec<String> {
        let mut lines = Vec::new();
        loop {
            match stream.poll(Duration::from_secs(5)).unwrap() {
                StreamPoll::Line(line) => lines.push(line),
                StreamPoll::Timeout => panic!("reader thread stalled"),
                StreamPoll::Closed => return lines,
            }
        }
    }

    #[test]
    fn test_reader_lines_in_order() {
        let input = "add device 1: /dev/input/event5\r\n/dev/input/event5: 0001 0161 00000001\r\nlast";
        let stream = EventStream::from_reader(Cursor::new(input.as_bytes().to_vec()));
        assert_eq!(
            collect(&stream),
            vec![
                "add device 1: /dev/input/event5",
                "/dev/input/event5: 0001 0161 00000001",
                "last",
            ]
        );
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let stream = EventStream::from_reader(Cursor::new(vec![0xff, b'a', b'\n']));
        assert_eq!(collect(&stream), vec!["\u{fffd}a"]);
    }

    #[test]
    fn test_shell_command_with_serial() {
        let bridge = AdbBridge::new("adb").with_serial(Some("emulator-5554".to_string()));
        let cmd = bridge.shell_command(&["getevent", "-i"]);
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, vec!["-s", "emulator-5554", "shell", "getevent", "-i"]);
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let bridge = AdbBridge::new("/nonexistent/fpchid-adb");
        assert!(matches!(bridge.inventory(), Err(SourceError::Spawn { .. })));
        assert!(matches!(bridge.stream(), Err(SourceError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_drop_kills_child() {
        let mut cmd = Command::new("sleep");
        cmd.arg("30");
        let stream = EventStream::spawn(&mut cmd).unwrap();
        let started = std::time::Instant::now();
        drop(stream);
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
