//! Process exit status and invocation results

use std::fmt;

/// Process exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus {
    /// Exit code if the process exited normally
    pub code: Option<i32>,
    /// Signal that terminated the process (Unix only)
    #[cfg(unix)]
    pub signal: Option<i32>,
}

impl ExitStatus {
    /// Returns true if the process exited successfully (code 0)
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Returns true if the process was terminated by a signal
    pub fn terminated_by_signal(&self) -> bool {
        #[cfg(unix)]
        {
            self.signal.is_some()
        }
        #[cfg(not(unix))]
        {
            false
        }
    }

    /// Single integer return code: the exit code, or the negated signal
    /// number when the process was killed by a signal.
    pub fn returncode(&self) -> i32 {
        #[cfg(unix)]
        if let Some(signal) = self.signal {
            return -signal;
        }
        self.code.unwrap_or(-1)
    }
}

impl From<std::process::ExitStatus> for ExitStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            Self {
                code: status.code(),
                signal: status.signal(),
            }
        }
        #[cfg(not(unix))]
        {
            Self {
                code: status.code(),
            }
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[cfg(unix)]
        if let Some(signal) = self.signal {
            return write!(f, "signal {signal}");
        }
        match self.code {
            Some(code) => write!(f, "exit code {code}"),
            None => write!(f, "unknown exit status"),
        }
    }
}

/// Result of a successful invocation
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// How the process exited
    pub status: ExitStatus,
    /// Decoded stdout, present only when output was captured
    pub stdout: Option<String>,
    /// Decoded stderr, present only when output was captured
    pub stderr: Option<String>,
}

/// Decode process output as UTF-8 text with universal newlines.
///
/// Invalid sequences are replaced, `\r\n` and lone `\r` become `\n`.
pub fn decode_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    if !text.contains('\r') {
        return text.into_owned();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}
