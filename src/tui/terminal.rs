//! Terminal lifecycle: raw mode, alternate screen, cursor.
//!
//! Every exit path has to give the user a usable shell back. The guard
//! restores on drop, and the panic hook covers the paths that never reach
//! a drop.

use std::io::{self, Stdout};
use std::panic;

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::{error, info};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

pub trait TerminalMode {
    fn enter(&mut self) -> io::Result<()>;
    fn leave(&mut self) -> io::Result<()>;
}

/// The real terminal. `raw` is off in non-interactive runs so that the
/// terminal keeps its own Ctrl+C handling.
#[derive(Debug, Clone, Copy)]
pub struct CrosstermMode {
    pub raw: bool,
}

impl TerminalMode for CrosstermMode {
    fn enter(&mut self) -> io::Result<()> {
        if self.raw {
            enable_raw_mode()?;
        }
        execute!(io::stdout(), EnterAlternateScreen, Hide)
    }

    fn leave(&mut self) -> io::Result<()> {
        restore_terminal()
    }
}

/// Plain stdout with no terminal setup, for runs that are piped or logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainMode;

impl TerminalMode for PlainMode {
    fn enter(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn leave(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Undoes everything [`CrosstermMode::enter`] may have done. Safe to call
/// when nothing was set up.
fn restore_terminal() -> io::Result<()> {
    let screen = execute!(io::stdout(), LeaveAlternateScreen, Show);
    let raw = disable_raw_mode();
    screen.and(raw)
}

/// Holds the terminal in TUI mode until restored or dropped.
pub struct TerminalGuard<M: TerminalMode> {
    mode: M,
    active: bool,
}

impl<M: TerminalMode> TerminalGuard<M> {
    pub fn acquire(mut mode: M) -> io::Result<Self> {
        if let Err(e) = mode.enter() {
            // Half-entered is worse than not entered at all.
            let _ = mode.leave();
            return Err(e);
        }
        info!("Terminal entered TUI mode");
        Ok(Self { mode, active: true })
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Restores the terminal. Only the first call does anything.
    pub fn restore(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        self.mode.leave()?;
        info!("Terminal restored");
        Ok(())
    }
}

impl<M: TerminalMode> Drop for TerminalGuard<M> {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            error!("Failed to restore terminal: {}", e);
        }
    }
}

pub fn new_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    Terminal::new(CrosstermBackend::new(io::stdout()))
}

/// Installs a panic hook that restores the terminal before the panic
/// message is printed.
pub fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}
