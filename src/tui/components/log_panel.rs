use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use crate::core::state::{LogEntry, LogLevel};
use crate::tui::component::Component;

fn level_color(level: LogLevel) -> Color {
    match level {
        LogLevel::Info => Color::Blue,
        LogLevel::Success => Color::Green,
        LogLevel::Error => Color::Red,
        LogLevel::Warning => Color::Yellow,
    }
}

/// Number of trailing items that fit inside a bordered block of `area`.
pub fn fitting_rows(area: Rect) -> usize {
    usize::from(area.height.saturating_sub(2))
}

/// Installer log, newest at the bottom.
pub struct LogPanel<'a> {
    pub entries: &'a [LogEntry],
}

impl Component for LogPanel<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let skip = self.entries.len().saturating_sub(fitting_rows(area));
        let lines: Vec<Line> = self.entries[skip..]
            .iter()
            .map(|entry| {
                Line::from(vec![
                    Span::styled(
                        format!("[{}]", entry.timestamp.format("%H:%M:%S")),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(" "),
                    Span::styled(
                        format!("{}:", entry.level),
                        Style::default().fg(level_color(entry.level)),
                    ),
                    Span::raw(" "),
                    Span::raw(entry.message.as_str()),
                ])
            })
            .collect();

        let panel = Paragraph::new(lines).block(
            Block::bordered()
                .title("Installation Log")
                .border_style(Style::default().fg(Color::Green)),
        );
        frame.render_widget(panel, area);
    }
}
