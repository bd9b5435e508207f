//! Best-effort notification of the serving runtime after a switch.
//!
//! Failures are reported back to the registry, which logs them and carries
//! on; the pointer write is never rolled back.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Failed to start notifier {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Notifier {command} exited with {status}")]
    Exit { command: String, status: String },

    #[error("Notifier {command} killed after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("Failed to wait for notifier {command}: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serving runtime rejected switch: {0}")]
    Rejected(String),
}

/// Tells the serving runtime to adopt a model.
pub trait Notifier: Send + Sync {
    fn notify_switch(&self, model_name: &str) -> Result<(), NotifyError>;
}

/// Records the switch in the log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_switch(&self, model_name: &str) -> Result<(), NotifyError> {
        info!(model = %model_name, "Notifying serving runtime to switch model");
        Ok(())
    }
}

/// Default bound on a notify command's run time.
pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(30);

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Runs an executable with the model name as its only argument.
///
/// A non-zero exit status counts as a failed notification, as does running
/// past the timeout, after which the child is killed.
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    program: PathBuf,
    timeout: Duration,
}

impl CommandNotifier {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into(), timeout: DEFAULT_NOTIFY_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Notifier for CommandNotifier {
    fn notify_switch(&self, model_name: &str) -> Result<(), NotifyError> {
        let command = self.program.display().to_string();
        let mut child = Command::new(&self.program)
            .arg(model_name)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|source| NotifyError::Spawn { command: command.clone(), source })?;

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    if let Err(e) = child.kill() {
                        warn!(notifier = %command, error = %e, "Failed to kill notifier");
                    }
                    let _ = child.wait();
                    return Err(NotifyError::Timeout { command, timeout: self.timeout });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => return Err(NotifyError::Wait { command, source }),
            }
        };

        if !status.success() {
            return Err(NotifyError::Exit { command, status: status.to_string() });
        }
        info!(model = %model_name, notifier = %command, "Serving runtime notified");
        Ok(())
    }
}
