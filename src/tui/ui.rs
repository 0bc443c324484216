use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::core::state::Snapshot;
use crate::tui::component::Component;
use crate::tui::components::{Header, InputPanel, LogPanel, OutputPanel, StatusPanel};

/// Screen layout:
///
/// ```text
/// ┌──────────────── header ────────────────┐
/// ├── status ──┬──────────── output ───────┤
/// ├── logs ────┤                           │
/// ├──────────────── input ─────────────────┤
/// ```
pub fn draw_ui(frame: &mut Frame, snapshot: &Snapshot) {
    use Constraint::{Fill, Length, Min};

    let [header_area, body_area, input_area] =
        Layout::vertical([Length(3), Min(0), Length(3)]).areas(frame.area());
    let [left_area, output_area] = Layout::horizontal([Fill(1), Fill(2)]).areas(body_area);
    let [status_area, log_area] = Layout::vertical([Length(5), Min(0)]).areas(left_area);

    Header.render(frame, header_area);

    StatusPanel {
        current_package: &snapshot.current_package,
        status: &snapshot.status,
        progress_current: snapshot.progress_current,
        progress_total: snapshot.progress_total,
        phase: snapshot.phase,
    }
    .render(frame, status_area);

    LogPanel {
        entries: &snapshot.logs,
    }
    .render(frame, log_area);

    OutputPanel {
        lines: &snapshot.output,
    }
    .render(frame, output_area);

    InputPanel {
        prompt: &snapshot.input_prompt,
        buffer: &snapshot.input_buffer,
        awaiting: snapshot.awaiting_input,
    }
    .render(frame, input_area);
}
