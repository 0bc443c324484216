//! # Render Loop
//!
//! Paints the display state on a fixed tick, independent of what the
//! installer is doing. The loop only ever reads the state: each tick takes
//! one [`Snapshot`] under the lock and draws from that copy, so a frame
//! never mixes fields from two different updates.
//!
//! A failed frame is logged and skipped. The next tick simply tries again.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use log::{debug, warn};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::core::config::ResolvedConfig;
use crate::core::state::{SharedState, Snapshot};
use crate::install::Shutdown;
use crate::tui::ui::draw_ui;

const MIN_TICK: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSettings {
    pub tick: Duration,
    pub visible_logs: usize,
    pub visible_output: usize,
}

impl ViewSettings {
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            tick: config.tick,
            visible_logs: config.visible_logs,
            visible_output: config.visible_output,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub frames: u64,
    pub failures: u64,
}

/// Draws a frame every `view.tick` until `stop` fires, then draws one last
/// frame so the final state is what stays on screen.
pub async fn render_loop<F>(
    state: SharedState,
    view: ViewSettings,
    stop: Shutdown,
    mut draw: F,
) -> RenderStats
where
    F: FnMut(&Snapshot) -> io::Result<()>,
{
    let mut stats = RenderStats::default();
    let mut ticker = tokio::time::interval(view.tick.max(MIN_TICK));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = stop.triggered() => break,
        }
        draw_frame(&state, &view, &mut draw, &mut stats);
    }

    draw_frame(&state, &view, &mut draw, &mut stats);
    debug!(
        "Render loop stopped after {} frames ({} failed)",
        stats.frames, stats.failures
    );
    stats
}

fn draw_frame<F>(state: &SharedState, view: &ViewSettings, draw: &mut F, stats: &mut RenderStats)
where
    F: FnMut(&Snapshot) -> io::Result<()>,
{
    let snapshot = state.snapshot(view.visible_logs, view.visible_output);
    match draw(&snapshot) {
        Ok(()) => stats.frames += 1,
        Err(e) => {
            stats.failures += 1;
            warn!("Render error: {}", e);
        }
    }
}

/// Moves `terminal` into a background task running [`render_loop`].
pub fn spawn_render_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    state: SharedState,
    view: ViewSettings,
    stop: Shutdown,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        render_loop(state, view, stop, |snapshot| {
            terminal.draw(|frame| draw_ui(frame, snapshot)).map(|_| ())
        })
        .await;
    })
}

// ============================================================================
// HEADLESS
// ============================================================================

/// Plain-text stand-in for the render loop when stdout is not a terminal.
/// Prints each new log entry once, as a line.
pub async fn headless_loop<W: Write>(
    state: SharedState,
    tick: Duration,
    stop: Shutdown,
    mut out: W,
) -> io::Result<()> {
    let mut seen = 0;
    let mut ticker = tokio::time::interval(tick.max(MIN_TICK));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let stopping = tokio::select! {
            _ = ticker.tick() => false,
            _ = stop.triggered() => true,
        };

        let (lines, total): (Vec<String>, u64) = state.read(|s| {
            (
                s.log_entries.since(seen).map(ToString::to_string).collect(),
                s.log_entries.total_pushed(),
            )
        });
        seen = total;
        for line in lines {
            writeln!(out, "{line}")?;
        }
        out.flush()?;

        if stopping {
            return Ok(());
        }
    }
}

pub fn spawn_headless_loop(state: SharedState, tick: Duration, stop: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = headless_loop(state, tick, stop, io::stdout()).await {
            warn!("Headless output failed: {}", e);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::LogLevel;

    fn view() -> ViewSettings {
        ViewSettings {
            tick: Duration::from_millis(5),
            visible_logs: 15,
            visible_output: 25,
        }
    }

    #[tokio::test]
    async fn test_stop_draws_final_frame() {
        let state = SharedState::default();
        let stop = Shutdown::new();
        stop.trigger();

        let mut statuses = Vec::new();
        let stats = render_loop(state, view(), stop, |snap| {
            statuses.push(snap.status.clone());
            Ok(())
        })
        .await;

        assert!(stats.frames >= 1);
        assert_eq!(statuses.last().map(String::as_str), Some("Ready"));
    }

    #[tokio::test]
    async fn test_draw_errors_are_counted_not_fatal() {
        let state = SharedState::default();
        let stop = Shutdown::new();
        let stopper = stop.clone();

        let mut calls = 0;
        let stats = render_loop(state, view(), stop, |_| {
            calls += 1;
            if calls == 3 {
                stopper.trigger();
            }
            if calls % 2 == 1 {
                Err(io::Error::other("terminal went away"))
            } else {
                Ok(())
            }
        })
        .await;

        assert!(stats.failures >= 2);
        assert!(stats.frames >= 1);
    }

    #[tokio::test]
    async fn test_frames_see_latest_state() {
        let state = SharedState::default();
        let stop = Shutdown::new();
        let stopper = stop.clone();
        let writer = state.clone();

        let mut seen = Vec::new();
        render_loop(state, view(), stop, |snap| {
            seen.push(snap.logs.len());
            if seen.len() == 1 {
                writer.log(LogLevel::Info, "first");
            } else {
                stopper.trigger();
            }
            Ok(())
        })
        .await;

        assert_eq!(seen.first(), Some(&0));
        assert_eq!(seen.last(), Some(&1));
    }

    #[tokio::test]
    async fn test_headless_prints_each_entry_once() {
        let state = SharedState::default();
        state.log(LogLevel::Info, "Auto-installer started");
        state.log(LogLevel::Success, "✓ Successfully installed git");

        let stop = Shutdown::new();
        stop.trigger();

        let mut out = Vec::new();
        headless_loop(state, Duration::from_millis(5), stop, &mut out)
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("INFO: Auto-installer started"));
        assert!(lines[1].ends_with("SUCCESS: ✓ Successfully installed git"));
    }
}
