//! # Display State
//!
//! The single mutable model behind the screen. The orchestrator and the
//! output streamer write it; the render loop and the prompt detector read it.
//!
//! ```text
//! DisplayState
//! ├── current_package: String       // package being installed ("" = none)
//! ├── status: String                // status line text
//! ├── progress_current/total: usize // batch progress, current <= total
//! ├── phase: PackagePhase           // per-package state machine
//! ├── log_entries: Ring<LogEntry>   // installer log (bounded)
//! ├── output_lines: Ring<String>    // child output (bounded)
//! ├── input_prompt: String          // shown while awaiting input
//! ├── input_buffer: String          // keystrokes typed so far
//! └── awaiting_input: bool          // a confirmation is being collected
//! ```
//!
//! All access goes through [`SharedState`], one mutex around the whole
//! struct. Each [`Action`] is applied under a single lock acquisition, so a
//! reader never sees half of a multi-field update.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local};

use crate::core::action::{Action, update};
use crate::core::ring::Ring;

pub const DEFAULT_LOG_CAPACITY: usize = 500;
pub const DEFAULT_OUTPUT_CAPACITY: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Error,
    Warning,
}

impl LogLevel {
    pub fn label(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Success => "SUCCESS",
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARNING",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One installer log line. Never edited after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            message: message.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.timestamp.format("%H:%M:%S"),
            self.level,
            self.message
        )
    }
}

/// Per-package lifecycle.
///
/// ```text
/// Pending → Running → (AwaitingConfirmation ⇄ Running)* → Succeeded | Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackagePhase {
    #[default]
    Pending,
    Running,
    AwaitingConfirmation,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone)]
pub struct DisplayState {
    pub current_package: String,
    pub status: String,
    pub progress_current: usize,
    pub progress_total: usize,
    pub phase: PackagePhase,
    pub log_entries: Ring<LogEntry>,
    pub output_lines: Ring<String>,
    pub input_prompt: String,
    pub input_buffer: String,
    pub awaiting_input: bool,
}

impl DisplayState {
    pub fn new(log_capacity: usize, output_capacity: usize) -> Self {
        Self {
            current_package: String::new(),
            status: String::from("Ready"),
            progress_current: 0,
            progress_total: 0,
            phase: PackagePhase::Pending,
            log_entries: Ring::new(log_capacity),
            output_lines: Ring::new(output_capacity),
            input_prompt: String::new(),
            input_buffer: String::new(),
            awaiting_input: false,
        }
    }

    /// Copies out what one frame needs: every scalar plus the visible tails.
    pub fn snapshot(&self, visible_logs: usize, visible_output: usize) -> Snapshot {
        Snapshot {
            current_package: self.current_package.clone(),
            status: self.status.clone(),
            progress_current: self.progress_current,
            progress_total: self.progress_total,
            phase: self.phase,
            logs: self.log_entries.tail(visible_logs).cloned().collect(),
            output: self.output_lines.tail(visible_output).cloned().collect(),
            input_prompt: self.input_prompt.clone(),
            input_buffer: self.input_buffer.clone(),
            awaiting_input: self.awaiting_input,
        }
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY, DEFAULT_OUTPUT_CAPACITY)
    }
}

/// A consistent copy of [`DisplayState`] taken under one lock.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub current_package: String,
    pub status: String,
    pub progress_current: usize,
    pub progress_total: usize,
    pub phase: PackagePhase,
    pub logs: Vec<LogEntry>,
    pub output: Vec<String>,
    pub input_prompt: String,
    pub input_buffer: String,
    pub awaiting_input: bool,
}

/// Cloneable handle to the one `DisplayState` of a run.
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    inner: Arc<Mutex<DisplayState>>,
}

impl SharedState {
    pub fn new(log_capacity: usize, output_capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(DisplayState::new(log_capacity, output_capacity))),
        }
    }

    // A writer that panicked mid-update leaves the state usable, so poisoning
    // is ignored rather than propagated into the render loop.
    fn lock(&self) -> MutexGuard<'_, DisplayState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies one action atomically.
    pub fn dispatch(&self, action: Action) {
        update(&mut self.lock(), action);
    }

    /// Runs `f` against the state while holding the lock.
    pub fn read<R>(&self, f: impl FnOnce(&DisplayState) -> R) -> R {
        f(&self.lock())
    }

    pub fn snapshot(&self, visible_logs: usize, visible_output: usize) -> Snapshot {
        self.read(|s| s.snapshot(visible_logs, visible_output))
    }

    /// Appends a log entry and mirrors it to the log file.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry::new(level, message);
        match level {
            LogLevel::Info | LogLevel::Success => log::info!("{}: {}", level, entry.message),
            LogLevel::Warning => log::warn!("{}", entry.message),
            LogLevel::Error => log::error!("{}", entry.message),
        }
        self.dispatch(Action::Log(entry));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_display_state_defaults() {
        let state = DisplayState::default();
        assert_eq!(state.status, "Ready");
        assert_eq!(state.phase, PackagePhase::Pending);
        assert!(state.current_package.is_empty());
        assert!(!state.awaiting_input);
        assert_eq!(state.log_entries.capacity(), DEFAULT_LOG_CAPACITY);
        assert_eq!(state.output_lines.capacity(), DEFAULT_OUTPUT_CAPACITY);
    }

    #[test]
    fn test_log_entry_display_format() {
        let entry = LogEntry {
            timestamp: Local.with_ymd_and_hms(2024, 5, 1, 9, 7, 3).unwrap(),
            level: LogLevel::Success,
            message: "installed git".to_string(),
        };
        assert_eq!(entry.to_string(), "[09:07:03] SUCCESS: installed git");
    }

    #[test]
    fn test_snapshot_takes_visible_tails() {
        let mut state = DisplayState::new(100, 100);
        for i in 0..30 {
            state.output_lines.push(format!("line {i}"));
            state.log_entries.push(LogEntry::new(LogLevel::Info, format!("log {i}")));
        }
        let snap = state.snapshot(15, 25);
        assert_eq!(snap.logs.len(), 15);
        assert_eq!(snap.logs[0].message, "log 15");
        assert_eq!(snap.output.len(), 25);
        assert_eq!(snap.output.last().map(String::as_str), Some("line 29"));
    }

    #[test]
    fn test_shared_state_log_appends_entry() {
        let shared = SharedState::new(10, 10);
        shared.log(LogLevel::Warning, "careful");
        let (len, level) = shared.read(|s| {
            let last = s.log_entries.iter().last().map(|e| e.level);
            (s.log_entries.len(), last)
        });
        assert_eq!(len, 1);
        assert_eq!(level, Some(LogLevel::Warning));
    }

    #[test]
    fn test_shared_state_survives_poisoned_lock() {
        let shared = SharedState::new(10, 10);
        let clone = shared.clone();
        let _ = std::thread::spawn(move || {
            let _: () = clone.read(|_| panic!("writer died"));
        })
        .join();
        shared.log(LogLevel::Info, "still alive");
        assert_eq!(shared.read(|s| s.log_entries.len()), 1);
    }
}
