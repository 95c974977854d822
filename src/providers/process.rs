use crate::core::action::RestartAction;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, error, info};

/// Per-stream cap on output kept for the final log line.
pub const MAX_CAPTURE_BYTES: usize = 1024 * 1024;

/// What came out of one run of the restart command.
#[derive(Debug, PartialEq)]
pub enum RestartOutcome {
    Succeeded { stdout: String },
    /// The command exited cleanly but wrote to stderr
    Stderr(String),
}

/// Runs a command line through the platform shell, like `npm start`.
pub struct ShellCommandAction {
    command: String,
}

impl ShellCommandAction {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
        }
    }

    fn shell_command(&self) -> Command {
        let (shell, flag) = if cfg!(windows) {
            ("cmd", "/C")
        } else {
            ("sh", "-c")
        };
        let mut cmd = Command::new(shell);
        cmd.arg(flag).arg(&self.command);
        cmd
    }

    /// Waits for the command to exit. Output is logged line by line as it
    /// arrives; at most [`MAX_CAPTURE_BYTES`] per stream is kept.
    pub async fn run(&self) -> Result<RestartOutcome> {
        let mut child = self
            .shell_command()
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn `{}`", self.command))?;

        let stdout = child.stdout.take().context("Child stdout was not piped")?;
        let stderr = child.stderr.take().context("Child stderr was not piped")?;

        let (status, stdout, stderr) = tokio::try_join!(
            child.wait(),
            drain_lines(stdout, "stdout"),
            drain_lines(stderr, "stderr"),
        )
        .with_context(|| format!("Failed to run `{}`", self.command))?;

        if !status.success() {
            bail!("`{}` exited with {}: {}", self.command, status, stderr.trim());
        }
        if !stderr.is_empty() {
            return Ok(RestartOutcome::Stderr(stderr));
        }
        Ok(RestartOutcome::Succeeded { stdout })
    }
}

async fn drain_lines<R>(reader: R, stream: &'static str) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut captured = String::new();

    while let Some(line) = lines.next_line().await? {
        debug!(stream, %line, "Restart command output");
        if captured.len() + line.len() + 1 <= MAX_CAPTURE_BYTES {
            captured.push_str(&line);
            captured.push('\n');
        }
    }
    Ok(captured)
}

#[async_trait]
impl RestartAction for ShellCommandAction {
    async fn restart(&self) {
        info!(command = %self.command, "Running restart command after fetching the quote");

        match self.run().await {
            Ok(RestartOutcome::Succeeded { stdout }) => {
                info!(command = %self.command, %stdout, "Restart command finished")
            }
            Ok(RestartOutcome::Stderr(stderr)) => {
                error!(command = %self.command, %stderr, "Restart command reported errors")
            }
            Err(e) => error!(error = %e, "Failed to run restart command"),
        }
    }
}
