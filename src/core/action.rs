//! # Actions
//!
//! Every change to the display becomes an `Action`. The streamer pushes
//! `OutputLine`, the orchestrator pushes `PackageStarted`, `Progress` and
//! friends, the raw input capture pushes `InputStarted`/`InputChanged`.
//!
//! `update()` applies one action to the state. No I/O here; the
//! [`SharedState`](crate::core::state::SharedState) handle holds the lock
//! around each call so every action lands atomically.
//!
//! ```text
//! State + Action  →  update()  →  New State
//! ```

use crate::core::state::{DisplayState, LogEntry, PackagePhase};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Log(LogEntry),
    OutputLine(String),
    /// A batch of `total` packages begins; progress resets to 0.
    BatchStarted { total: usize },
    PackageStarted(String),
    PackageFinished { package: String, succeeded: bool },
    Phase(PackagePhase),
    Progress { current: usize },
    /// Clears the current package and sets a closing status line.
    Idle(String),
    InputStarted(String),
    InputChanged(String),
    InputFinished,
}

pub fn update(state: &mut DisplayState, action: Action) {
    match action {
        Action::Log(entry) => state.log_entries.push(entry),
        Action::OutputLine(line) => state.output_lines.push(line),
        Action::BatchStarted { total } => {
            state.progress_total = total;
            state.progress_current = 0;
        }
        Action::PackageStarted(package) => {
            state.status = format!("Installing {package}...");
            state.current_package = package;
            state.phase = PackagePhase::Running;
        }
        Action::PackageFinished { package, succeeded } => {
            if succeeded {
                state.status = format!("✓ {package} installed");
                state.phase = PackagePhase::Succeeded;
            } else {
                state.status = format!("✗ {package} failed");
                state.phase = PackagePhase::Failed;
            }
        }
        Action::Phase(phase) => state.phase = phase,
        Action::Progress { current } => {
            state.progress_current = current.min(state.progress_total);
        }
        Action::Idle(status) => {
            state.current_package.clear();
            state.status = status;
        }
        Action::InputStarted(prompt) => {
            state.input_prompt = prompt;
            state.input_buffer.clear();
            state.awaiting_input = true;
        }
        Action::InputChanged(buffer) => state.input_buffer = buffer,
        Action::InputFinished => {
            state.awaiting_input = false;
            state.input_prompt.clear();
            state.input_buffer.clear();
        }
    }
}
