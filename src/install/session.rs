//! Handle to one running installer child.
//!
//! A session owns the child process, its stdin (interactive mode only) and
//! the streamer task draining its output. It ends only when the child has
//! exited *and* the streamer has finished, so no output of package `i`
//! can land after package `i + 1` has started.

use std::process::Stdio;
use std::time::Duration;

use log::{debug, info, warn};
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::task::JoinHandle;

use crate::core::state::SharedState;
use crate::install::InstallError;
use crate::install::stream::spawn_streamer;

/// How long a child gets to exit after SIGTERM before it is killed.
pub const TERMINATE_GRACE: Duration = Duration::from_secs(3);

/// Writes one response line to the child and flushes it right away.
///
/// The line terminator is appended here; `line` itself must not carry one.
pub async fn deliver_response<W>(stdin: &mut W, line: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut bytes = Vec::with_capacity(line.len() + 1);
    bytes.extend_from_slice(line.as_bytes());
    bytes.push(b'\n');
    stdin.write_all(&bytes).await?;
    stdin.flush().await
}

#[derive(Debug)]
pub struct ProcessSession {
    command: Vec<String>,
    child: Child,
    stdin: Option<ChildStdin>,
    streamer: Option<JoinHandle<()>>,
    exit_code: Option<i32>,
}

impl ProcessSession {
    /// Starts `command` with stdout/stderr piped into the streamer.
    ///
    /// With `interactive`, stdin is a pipe kept for [`respond`](Self::respond);
    /// otherwise the child gets no stdin at all.
    pub fn launch(
        command: Vec<String>,
        interactive: bool,
        state: SharedState,
    ) -> Result<Self, InstallError> {
        let (program, args) = command.split_first().ok_or_else(|| InstallError::ProcessLaunch {
            program: String::new(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command line"),
        })?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(if interactive { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| InstallError::ProcessLaunch {
            program: program.clone(),
            source,
        })?;
        info!("Launched {:?} (pid {:?})", command, child.id());

        let stdin = child.stdin.take();
        let streamer = match (child.stdout.take(), child.stderr.take()) {
            (Some(stdout), Some(stderr)) => Some(spawn_streamer(stdout, stderr, state)),
            _ => None,
        };

        Ok(Self {
            command,
            child,
            stdin,
            streamer,
            exit_code: None,
        })
    }

    /// Non-blocking exit check. Returns the exit code once the child is gone.
    pub fn try_exit(&mut self) -> Result<Option<i32>, InstallError> {
        if self.exit_code.is_none()
            && let Some(status) = self.child.try_wait()?
        {
            let code = status.code().unwrap_or(-1);
            debug!("{:?} exited with {}", self.command, code);
            self.exit_code = Some(code);
        }
        Ok(self.exit_code)
    }

    /// `try_exit` for callers that only need a yes/no; errors count as exited.
    pub fn has_exited(&mut self) -> bool {
        self.try_exit().map_or(true, |code| code.is_some())
    }

    /// Sends `line` plus a newline to the child's stdin.
    pub async fn respond(&mut self, line: &str) -> Result<(), InstallError> {
        let stdin = self.stdin.as_mut().ok_or_else(|| {
            InstallError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "child has no stdin",
            ))
        })?;
        deliver_response(stdin, line).await?;
        debug!("Sent {:?} to {:?}", line, self.command);
        Ok(())
    }

    /// Waits for the child to exit, then gives the streamer up to `drain`
    /// to finish before cancelling it.
    pub async fn finish(mut self, drain: Duration) -> Result<i32, InstallError> {
        // Closing stdin lets a child blocked on a read see EOF.
        drop(self.stdin.take());
        let code = match self.exit_code {
            Some(code) => code,
            None => self.child.wait().await?.code().unwrap_or(-1),
        };
        self.exit_code = Some(code);
        self.join_streamer(drain).await;
        Ok(code)
    }

    /// Stops the child (if still running) and tears down the streamer.
    ///
    /// The child gets SIGTERM first so that wrappers such as `sudo` can pass
    /// it on to the real installer. Only a child still running after
    /// `grace` is killed outright.
    pub async fn terminate(mut self, grace: Duration) {
        drop(self.stdin.take());
        if !self.has_exited() {
            info!("Terminating {:?}", self.command);
            self.stop_child(grace).await;
        }
        self.join_streamer(Duration::ZERO).await;
    }

    async fn stop_child(&mut self, grace: Duration) {
        if let Some(pid) = self.child.id() {
            match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                Ok(()) => match tokio::time::timeout(grace, self.child.wait()).await {
                    Ok(Ok(status)) => {
                        self.exit_code = Some(status.code().unwrap_or(-1));
                        return;
                    }
                    Ok(Err(e)) => warn!("Failed to wait for {:?}: {}", self.command, e),
                    Err(_) => warn!("{:?} ignored SIGTERM for {:?}", self.command, grace),
                },
                Err(e) => warn!("Failed to signal {:?}: {}", self.command, e),
            }
        }
        if let Err(e) = self.child.kill().await {
            warn!("Failed to kill {:?}: {}", self.command, e);
        }
    }

    async fn join_streamer(&mut self, drain: Duration) {
        let Some(mut handle) = self.streamer.take() else {
            return;
        };
        if tokio::time::timeout(drain, &mut handle).await.is_err() {
            // Something (a grandchild) still holds the pipe open.
            warn!(
                "Output of {:?} still open after {:?}, abandoning it",
                self.command, drain
            );
            handle.abort();
            let _ = handle.await;
        }
    }
}
