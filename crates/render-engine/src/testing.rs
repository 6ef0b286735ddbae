//! Test doubles for the engine boundary.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use clipforge_common::error::{ClipforgeError, ClipforgeResult};

use crate::command::Invocation;
use crate::invoker::{ProcessInvoker, ProcessOutcome};

/// What a scripted call does.
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// Write a small file at the invocation's output path and exit 0.
    Succeed,
    /// Exit with this code and stderr, writing nothing.
    Exit { code: i32, stderr: String },
    /// Fail to start, as a missing binary would.
    Dispatch(String),
    /// Exit 0 without writing the output.
    SucceedWithoutOutput,
}

/// A [`ProcessInvoker`] that never starts a process.
///
/// Calls are numbered from 0 across the invoker's lifetime. Every call
/// succeeds unless scripted otherwise with [`ScriptedInvoker::on_call`].
#[derive(Debug)]
pub struct ScriptedInvoker {
    script: HashMap<usize, ScriptedOutcome>,
    calls: Mutex<Vec<Invocation>>,
    available: bool,
    delay: Option<Duration>,
}

impl Default for ScriptedInvoker {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedInvoker {
    pub fn new() -> Self {
        Self {
            script: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            available: true,
            delay: None,
        }
    }

    pub fn on_call(mut self, call: usize, outcome: ScriptedOutcome) -> Self {
        self.script.insert(call, outcome);
        self
    }

    /// Shorthand for a non-zero exit on `call`.
    pub fn fail_call(self, call: usize, code: i32, stderr: &str) -> Self {
        self.on_call(
            call,
            ScriptedOutcome::Exit {
                code,
                stderr: stderr.to_string(),
            },
        )
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Block each call for `delay`, to keep jobs observable mid-flight.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.lock_calls().clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock_calls().len()
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<Invocation>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ProcessInvoker for ScriptedInvoker {
    fn invoke(&self, invocation: &Invocation) -> ClipforgeResult<ProcessOutcome> {
        let call = {
            let mut calls = self.lock_calls();
            calls.push(invocation.clone());
            calls.len() - 1
        };

        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        match self.script.get(&call).cloned().unwrap_or(ScriptedOutcome::Succeed) {
            ScriptedOutcome::Succeed => {
                if let Some(output) = invocation.output() {
                    std::fs::write(output, format!("scripted output of call {call}"))?;
                }
                Ok(ProcessOutcome {
                    exit_code: Some(0),
                    stderr: String::new(),
                })
            }
            ScriptedOutcome::SucceedWithoutOutput => Ok(ProcessOutcome {
                exit_code: Some(0),
                stderr: String::new(),
            }),
            ScriptedOutcome::Exit { code, stderr } => Ok(ProcessOutcome {
                exit_code: Some(code),
                stderr,
            }),
            ScriptedOutcome::Dispatch(message) => Err(ClipforgeError::dispatch(
                invocation.program.display().to_string(),
                message,
            )),
        }
    }

    fn check_available(&self) -> bool {
        self.available
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
