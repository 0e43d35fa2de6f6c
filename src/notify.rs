//! Side effect fired after a ticket is issued: pushes `profile:pin` to the
//! media-center client. Failures here never undo issuance.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::Config;
use crate::utils::timefmt;

const EXEC_LOG_FILE: &str = "exec.log";
const SCRIPT_NAME: &str = "execute-on-kodi_set-passwd-per-profile.sh";

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Notify: external action failed: {0}")]
    ExternalActionFailed(String),

    #[error("Notify: script timed out after {0:?}")]
    Timeout(Duration),

    #[error("Notify: I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn ticket_issued(&self, profile_name: &str, pin: &str) -> Result<(), NotifyError>;
}

/// Argument handed to the device script.
pub fn script_argument(profile_name: &str, pin: &str) -> String {
    format!("{profile_name}:{pin}")
}

/// Appends one line per issued ticket to `<dir>/exec.log`.
pub struct ExecLogNotifier {
    dir: PathBuf,
}

impl ExecLogNotifier {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.join(EXEC_LOG_FILE)
    }

    async fn append(&self, line: &str) -> Result<(), NotifyError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path())
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for ExecLogNotifier {
    async fn ticket_issued(&self, profile_name: &str, pin: &str) -> Result<(), NotifyError> {
        let line = format!(
            "[{}] {} {}\n",
            timefmt::format(&Utc::now()),
            SCRIPT_NAME,
            script_argument(profile_name, pin)
        );
        self.append(&line).await
    }
}

/// Runs the device script with `profile:pin`, after recording the call in
/// the exec log.
pub struct ScriptNotifier {
    script: PathBuf,
    timeout: Duration,
    log: ExecLogNotifier,
}

impl ScriptNotifier {
    pub fn new(script: impl Into<PathBuf>, timeout: Duration, log: ExecLogNotifier) -> Self {
        Self {
            script: script.into(),
            timeout,
            log,
        }
    }
}

#[async_trait]
impl Notifier for ScriptNotifier {
    async fn ticket_issued(&self, profile_name: &str, pin: &str) -> Result<(), NotifyError> {
        if let Err(e) = self.log.ticket_issued(profile_name, pin).await {
            tracing::warn!(error = %e, "Failed to write exec log");
        }

        let child = Command::new(&self.script)
            .arg(script_argument(profile_name, pin))
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Ok(result) => result.map_err(|e| {
                NotifyError::ExternalActionFailed(format!(
                    "could not run {}: {e}",
                    self.script.display()
                ))
            })?,
            Err(_) => return Err(NotifyError::Timeout(self.timeout)),
        };

        if output.status.success() {
            tracing::debug!(script = %self.script.display(), "Notify script finished");
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(NotifyError::ExternalActionFailed(format!(
                "{} exited with {}: {}",
                self.script.display(),
                output.status,
                stderr.trim()
            )))
        }
    }
}

/// Log-only unless a script is configured.
pub fn from_config(config: &Config) -> Box<dyn Notifier> {
    let log = ExecLogNotifier::new(&config.notify_log_dir);
    match &config.notify_script {
        Some(script) => {
            tracing::info!(script = %script.display(), "Ticket notifier runs device script");
            Box::new(ScriptNotifier::new(
                script,
                Duration::from_secs(config.notify_timeout_secs),
                log,
            ))
        }
        None => {
            tracing::info!(log = %log.log_path().display(), "Ticket notifier writes exec log only");
            Box::new(log)
        }
    }
}
