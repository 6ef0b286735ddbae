//! Media engine process execution.

use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use clipforge_common::error::{ClipforgeError, ClipforgeResult};

use crate::command::Invocation;

/// Exit status and diagnostics of a finished engine process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stderr: String,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs engine invocations.
///
/// `invoke` blocks for the whole run of the external process, so callers on
/// an async runtime must call it from a blocking-capable thread.
pub trait ProcessInvoker: Send + Sync {
    /// Run the invocation to completion. A non-zero exit is returned as data;
    /// only failing to start the process at all is an error
    /// ([`ClipforgeError::Dispatch`]).
    fn invoke(&self, invocation: &Invocation) -> ClipforgeResult<ProcessOutcome>;

    /// Quick environment check. Never errors; any failure means `false`.
    fn check_available(&self) -> bool;

    /// Invoker name, for logs.
    fn name(&self) -> &str;
}

/// Invoker backed by a locally installed `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct FfmpegInvoker {
    binary: PathBuf,
}

impl FfmpegInvoker {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Default for FfmpegInvoker {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl ProcessInvoker for FfmpegInvoker {
    fn invoke(&self, invocation: &Invocation) -> ClipforgeResult<ProcessOutcome> {
        let program = invocation.program.display().to_string();
        tracing::debug!(program = %program, args = ?invocation.args, "Running engine");

        let started = std::time::Instant::now();
        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ClipforgeError::dispatch(&program, e.to_string()))?;

        tracing::debug!(
            pid = child.id(),
            args_len = invocation.args.len(),
            "Engine process started"
        );

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ClipforgeError::dispatch(&program, "stderr was not captured"))?;

        // Drain stderr concurrently so the engine never blocks on a full pipe.
        let stderr_task = std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut bytes = Vec::new();
            match reader.read_to_end(&mut bytes) {
                Ok(_) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(err) => format!("<failed to read engine stderr: {err}>"),
            }
        });

        let status = child
            .wait()
            .map_err(|e| ClipforgeError::dispatch(&program, format!("wait failed: {e}")))?;

        let stderr = stderr_task
            .join()
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        let outcome = ProcessOutcome {
            exit_code: status.code(),
            stderr,
        };
        tracing::debug!(
            exit_code = ?outcome.exit_code,
            elapsed_secs = started.elapsed().as_secs_f64(),
            stderr_len = outcome.stderr.len(),
            "Engine process finished"
        );
        Ok(outcome)
    }

    fn check_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Keep at most the last `max_bytes` bytes of engine output, on a char
/// boundary. The end of the log is where the engine reports the error.
pub fn diagnostic_tail(stderr: &str, max_bytes: usize) -> String {
    let trimmed = stderr.trim_end();
    if trimmed.len() <= max_bytes {
        return trimmed.to_string();
    }
    let mut cut = trimmed.len() - max_bytes;
    while !trimmed.is_char_boundary(cut) {
        cut += 1;
    }
    format!("...{}", &trimmed[cut..])
}
