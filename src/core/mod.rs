//! # Core Installer Model
//!
//! Everything here is independent of processes and terminals.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • DisplayState         │
//!                    │  • Action + update()    │
//!                    │  • prompt detection     │
//!                    │  • line editing         │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │
//!                ┌───────────────┴───────────────┐
//!                ▼                               ▼
//!         ┌────────────┐                  ┌────────────┐
//!         │  install   │                  │    TUI     │
//!         │ (children, │                  │ (ratatui,  │
//!         │  streams)  │                  │ crossterm) │
//!         └────────────┘                  └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: `DisplayState` and the `SharedState` handle around it
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`ring`]: Bounded FIFO backing the log and output panels
//! - [`prompt`]: Confirmation-prompt detector
//! - [`line`]: Keystroke-to-line state machine
//! - [`config`]: TOML config and override resolution (the one module that reads files)

pub mod action;
pub mod config;
pub mod line;
pub mod prompt;
pub mod ring;
pub mod state;
