//! # Status Panel
//!
//! Current package, status text and the batch progress bar.
//!
//! The bar is only drawn once a batch has started (`total > 0`); before
//! that there is nothing meaningful to measure.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use crate::core::state::PackagePhase;
use crate::tui::component::Component;

pub const PROGRESS_WIDTH: usize = 20;

/// Block progress bar, `width` cells wide. Filled cells round down, so the
/// bar is only full when `current == total`.
pub fn progress_bar(current: usize, total: usize, width: usize) -> String {
    let filled = if total == 0 {
        0
    } else {
        (current.min(total) * width) / total
    };
    let mut bar = String::with_capacity(width * 3);
    bar.extend(std::iter::repeat_n('█', filled));
    bar.extend(std::iter::repeat_n('░', width - filled));
    bar
}

pub struct StatusPanel<'a> {
    pub current_package: &'a str,
    pub status: &'a str,
    pub progress_current: usize,
    pub progress_total: usize,
    pub phase: PackagePhase,
}

impl StatusPanel<'_> {
    fn status_style(&self) -> Style {
        match self.phase {
            PackagePhase::Succeeded => Style::default().fg(Color::Green),
            PackagePhase::Failed => Style::default().fg(Color::Red),
            PackagePhase::AwaitingConfirmation => Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            PackagePhase::Running | PackagePhase::Pending => Style::default().fg(Color::Yellow),
        }
    }
}

impl Component for StatusPanel<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let label = Style::default().add_modifier(Modifier::BOLD);
        let current = if self.current_package.is_empty() {
            "None"
        } else {
            self.current_package
        };

        let mut lines = vec![
            Line::from(vec![
                Span::styled("Current: ", label),
                Span::styled(current, Style::default().fg(Color::Cyan)),
            ]),
            Line::from(vec![
                Span::styled("Status: ", label),
                Span::styled(self.status, self.status_style()),
            ]),
        ];

        if self.progress_total > 0 {
            lines.push(Line::from(vec![
                Span::styled("Progress: ", label),
                Span::styled(
                    format!(
                        "[{}]",
                        progress_bar(self.progress_current, self.progress_total, PROGRESS_WIDTH)
                    ),
                    Style::default().fg(Color::Green),
                ),
                Span::raw(format!(" {}/{}", self.progress_current, self.progress_total)),
            ]));
        }

        let panel = Paragraph::new(lines).block(
            Block::bordered()
                .title("Installation Status")
                .border_style(Style::default().fg(Color::Blue)),
        );
        frame.render_widget(panel, area);
    }
}
