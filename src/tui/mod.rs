//! # TUI Adapter
//!
//! The terminal side of the installer: puts the terminal into TUI mode,
//! paints the shared display state on a tick, and feeds raw keystrokes to
//! the orchestrator as prompt answers.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Tasks
//!
//! ```text
//! main task      Installer::run ──► ProcessSession ──► streamer task
//!                     │ (RawInput polls keys between steps)
//! render task    render_loop / headless_loop  (reads SharedState only)
//! signal task    ctrl_c ──► Shutdown
//! ```
//!
//! ## Exit Order
//!
//! On every path out of [`run_with`], the child is terminated first (inside
//! the orchestrator), then the render task is stopped and joined, and the
//! terminal is restored last. A panic skips the render join but still
//! restores the terminal once the installer has been dropped.

mod component;
pub mod components;
pub mod event;
pub mod input;
pub mod render;
pub mod terminal;
pub mod ui;

use std::io::{self, IsTerminal};
use std::time::Duration;

use log::{info, warn};
use tokio::task::JoinHandle;

use crate::core::config::ResolvedConfig;
use crate::core::state::{LogLevel, SharedState};
use crate::install::{
    Confirmer, InstallError, InstallPlan, InstallSettings, Installer, RunSummary, Shutdown,
};
use crate::tui::event::{CrosstermKeys, KeySource};
use crate::tui::input::RawInput;
use crate::tui::render::{ViewSettings, spawn_headless_loop, spawn_render_loop};
use crate::tui::terminal::{
    CrosstermMode, PlainMode, TerminalGuard, TerminalMode, install_panic_hook, new_terminal,
};

/// How long the render task gets to paint its last frame.
const RENDER_JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Runs the whole installation with the live display.
///
/// Falls back to plain log lines when stdout is not a terminal, and to
/// non-interactive mode when there is no terminal to read keys from.
pub async fn run(config: &ResolvedConfig, plan: &InstallPlan) -> Result<RunSummary, InstallError> {
    let tty = io::stdout().is_terminal();
    let interactive = config.interactive && tty && io::stdin().is_terminal();
    if config.interactive && !interactive {
        warn!("No terminal for keyboard input, running non-interactive");
    }
    let keys: Option<Box<dyn KeySource>> = interactive.then(|| Box::new(CrosstermKeys) as Box<dyn KeySource>);

    if tty {
        install_panic_hook();
        let view = ViewSettings::from_config(config);
        run_with(config, plan, CrosstermMode { raw: interactive }, keys, |state, stop| {
            Ok(spawn_render_loop(new_terminal()?, state, view, stop))
        })
        .await
    } else {
        info!("stdout is not a terminal, using plain output");
        let tick = config.tick;
        run_with(config, plan, PlainMode, keys, |state, stop| {
            Ok(spawn_headless_loop(state, tick, stop))
        })
        .await
    }
}

/// Runs the installation against a given terminal mode, key source and
/// renderer. Interactive when `keys` is given.
///
/// `start_renderer` is called after the terminal has entered `mode` and
/// must return a task that exits once its stop flag is triggered.
pub async fn run_with<M, R>(
    config: &ResolvedConfig,
    plan: &InstallPlan,
    mode: M,
    keys: Option<Box<dyn KeySource>>,
    start_renderer: R,
) -> Result<RunSummary, InstallError>
where
    M: TerminalMode,
    R: FnOnce(SharedState, Shutdown) -> io::Result<JoinHandle<()>>,
{
    let state = SharedState::new(config.log_capacity, config.output_capacity);
    let shutdown = Shutdown::new();
    let render_stop = Shutdown::new();

    let mut guard = TerminalGuard::acquire(mode)?;
    let renderer = start_renderer(state.clone(), render_stop.clone())?;
    let signal_watcher = spawn_signal_watcher(shutdown.clone());

    let input: Option<Box<dyn Confirmer>> = keys.map(|keys| {
        Box::new(RawInput::new(
            keys,
            state.clone(),
            shutdown.clone(),
            config.poll_interval,
        )) as Box<dyn Confirmer>
    });

    let mut installer = Installer::new(
        state.clone(),
        InstallSettings::from_config(config),
        input,
        shutdown,
    );

    let result = installer.run(plan).await;
    match &result {
        Ok(_) if config.hold_on_exit => {
            // Interrupting the review screen is just another way to close it.
            match installer.hold_for_review().await {
                Ok(()) | Err(InstallError::UserAbort) => {}
                Err(e) => warn!("Review screen failed: {}", e),
            }
        }
        Err(InstallError::UserAbort) => {
            state.log(LogLevel::Warning, "Installation interrupted by user");
        }
        _ => {}
    }
    drop(installer);

    render_stop.trigger();
    join_renderer(renderer).await;
    signal_watcher.abort();

    if let Err(e) = guard.restore() {
        warn!("Failed to restore terminal: {}", e);
    }

    result
}

/// In cooked mode Ctrl+C arrives as SIGINT rather than as a keystroke.
fn spawn_signal_watcher(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt signal received");
            shutdown.trigger();
        }
    })
}

async fn join_renderer(mut renderer: JoinHandle<()>) {
    match tokio::time::timeout(RENDER_JOIN_TIMEOUT, &mut renderer).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Render task ended abnormally: {}", e),
        Err(_) => {
            warn!("Render task did not stop in time");
            renderer.abort();
        }
    }
}
