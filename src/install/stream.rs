//! # Output Streamer
//!
//! Drains a child's stdout and stderr into the output panel.
//!
//! Both pipes are read by one task with `select!`, so the two streams
//! interleave in arrival order the way a merged `2>&1` would. Each stream
//! has its own [`LineAssembler`] so that a partial line on one pipe is never
//! glued to text from the other.
//!
//! ## Line splitting
//!
//! Lines end at `\n` or `\r`. Pacman redraws its progress bars with bare
//! carriage returns, and each redraw becomes its own line. Trailing
//! whitespace is trimmed and blank lines are dropped.
//!
//! ## Partial lines
//!
//! Confirmation prompts are printed without a trailing newline. When a
//! stream has buffered text and then goes quiet for [`PARTIAL_LINE_FLUSH`],
//! the buffered text is emitted as a line so the prompt detector can see it.

use std::time::Duration;

use log::debug;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;

use crate::core::action::Action;
use crate::core::state::{LogLevel, SharedState};
use crate::install::InstallError;

/// Quiet period after which an unterminated line is flushed.
pub const PARTIAL_LINE_FLUSH: Duration = Duration::from_millis(150);

const READ_CHUNK: usize = 4096;

/// Splits a byte stream into display lines.
#[derive(Debug, Default)]
pub struct LineAssembler {
    pending: Vec<u8>,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_partial(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Feeds raw bytes and returns every line they completed.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in bytes {
            if byte == b'\n' || byte == b'\r' {
                let raw = std::mem::take(&mut self.pending);
                if let Some(line) = clean_line(&raw) {
                    lines.push(line);
                }
            } else {
                self.pending.push(byte);
            }
        }
        lines
    }

    /// Takes whatever unterminated text is buffered.
    pub fn flush(&mut self) -> Option<String> {
        let raw = std::mem::take(&mut self.pending);
        clean_line(&raw)
    }
}

fn clean_line(raw: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(raw);
    let trimmed = text.trim_end();
    if trimmed.trim_start().is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Spawns the streamer for one session on its own task.
pub fn spawn_streamer<O, E>(stdout: O, stderr: E, state: SharedState) -> JoinHandle<()>
where
    O: AsyncRead + Unpin + Send + 'static,
    E: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = stream_output(stdout, stderr, &state).await {
            state.log(LogLevel::Error, format!("Error reading output: {e}"));
        }
    })
}

/// Reads both streams until each reports end-of-data.
///
/// Returns the first read error; lines assembled before the error have
/// already been pushed.
pub async fn stream_output<O, E>(
    mut stdout: O,
    mut stderr: E,
    state: &SharedState,
) -> Result<(), InstallError>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let mut out_buf = [0u8; READ_CHUNK];
    let mut err_buf = [0u8; READ_CHUNK];
    let mut out_lines = LineAssembler::new();
    let mut err_lines = LineAssembler::new();
    let mut out_done = false;
    let mut err_done = false;
    let mut pushed = 0usize;

    while !(out_done && err_done) {
        let has_partial = out_lines.has_partial() || err_lines.has_partial();

        tokio::select! {
            read = stdout.read(&mut out_buf), if !out_done => {
                let n = read.map_err(InstallError::StreamRead)?;
                if n == 0 {
                    out_done = true;
                    pushed += emit(state, out_lines.flush());
                } else {
                    pushed += emit(state, out_lines.push(&out_buf[..n]));
                }
            }
            read = stderr.read(&mut err_buf), if !err_done => {
                let n = read.map_err(InstallError::StreamRead)?;
                if n == 0 {
                    err_done = true;
                    pushed += emit(state, err_lines.flush());
                } else {
                    pushed += emit(state, err_lines.push(&err_buf[..n]));
                }
            }
            () = tokio::time::sleep(PARTIAL_LINE_FLUSH), if has_partial => {
                pushed += emit(state, out_lines.flush());
                pushed += emit(state, err_lines.flush());
            }
        }
    }

    debug!("Output streams closed after {} lines", pushed);
    Ok(())
}

fn emit(state: &SharedState, lines: impl IntoIterator<Item = String>) -> usize {
    let mut count = 0;
    for line in lines {
        state.dispatch(Action::OutputLine(line));
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tokio_test::io::Builder;

    fn output_of(state: &SharedState) -> Vec<String> {
        state.read(|s| s.output_lines.iter().cloned().collect())
    }

    #[test]
    fn test_assembler_splits_on_newline_and_carriage_return() {
        let mut lines = LineAssembler::new();
        let out = lines.push(b"one\ntwo\r\nthree\rfour");
        assert_eq!(out, vec!["one", "two", "three"]);
        assert!(lines.has_partial());
        assert_eq!(lines.flush(), Some("four".to_string()));
        assert!(!lines.has_partial());
    }

    #[test]
    fn test_assembler_drops_blank_lines_and_trims_trailing_space() {
        let mut lines = LineAssembler::new();
        let out = lines.push(b"\n   \n  keep me  \t\n\n");
        assert_eq!(out, vec!["  keep me"]);
    }

    #[test]
    fn test_assembler_joins_chunks() {
        let mut lines = LineAssembler::new();
        assert!(lines.push(b"resolv").is_empty());
        assert_eq!(lines.push(b"ing dependencies...\n"), vec!["resolving dependencies..."]);
    }

    #[test]
    fn test_assembler_decodes_invalid_utf8_lossily() {
        let mut lines = LineAssembler::new();
        let out = lines.push(b"bad \xff byte\n");
        assert_eq!(out, vec!["bad \u{fffd} byte"]);
    }

    #[tokio::test]
    async fn test_streams_both_pipes_into_output() {
        let state = SharedState::new(10, 100);
        let stdout = Builder::new()
            .read(b"resolving dependencies...\n")
            .read(b"\n")
            .read(b"(1/1) installing git\n")
            .build();
        let stderr = Builder::new().read(b"warning: git is up to date\n").build();

        stream_output(stdout, stderr, &state).await.unwrap();

        let lines = output_of(&state);
        assert_eq!(lines.len(), 3);
        assert!(lines.contains(&"resolving dependencies...".to_string()));
        assert!(lines.contains(&"warning: git is up to date".to_string()));
        let resolving = lines.iter().position(|l| l.starts_with("resolving")).unwrap();
        let installing = lines.iter().position(|l| l.starts_with("(1/1)")).unwrap();
        assert!(resolving < installing);
    }

    #[tokio::test]
    async fn test_unterminated_prompt_is_flushed_while_pipe_stays_open() {
        let state = SharedState::new(10, 100);
        let stdout = Builder::new()
            .read(b":: Proceed with installation? [Y/n] ")
            .wait(PARTIAL_LINE_FLUSH * 3)
            .build();

        let task = stream_output(stdout, tokio::io::empty(), &state);
        tokio::pin!(task);
        let early = tokio::time::timeout(PARTIAL_LINE_FLUSH * 2, &mut task).await;
        assert!(early.is_err(), "stream should still be open");
        assert_eq!(output_of(&state), vec![":: Proceed with installation? [Y/n]"]);

        task.await.unwrap();
        assert_eq!(output_of(&state).len(), 1);
    }

    #[tokio::test]
    async fn test_read_error_stops_streaming() {
        let state = SharedState::new(10, 100);
        let stdout = Builder::new()
            .read(b"first line\n")
            .read_error(io::Error::other("pipe broke"))
            .build();

        let err = stream_output(stdout, tokio::io::empty(), &state)
            .await
            .unwrap_err();
        assert!(matches!(err, InstallError::StreamRead(_)));
        assert_eq!(output_of(&state), vec!["first line"]);
    }

    #[tokio::test]
    async fn test_spawned_streamer_logs_read_error() {
        let state = SharedState::new(10, 100);
        let stdout = Builder::new().read_error(io::Error::other("pipe broke")).build();

        spawn_streamer(stdout, tokio::io::empty(), state.clone())
            .await
            .unwrap();

        let logs: Vec<_> = state.read(|s| s.log_entries.iter().cloned().collect());
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].level, LogLevel::Error);
        assert!(logs[0].message.contains("pipe broke"));
    }

    #[tokio::test]
    async fn test_final_partial_line_flushed_at_eof() {
        let state = SharedState::new(10, 100);
        let stdout = Builder::new().read(b"no newline at end").build();
        stream_output(stdout, tokio::io::empty(), &state).await.unwrap();
        assert_eq!(output_of(&state), vec!["no newline at end"]);
    }
}
