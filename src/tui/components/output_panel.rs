use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph};

use crate::tui::component::Component;
use crate::tui::components::log_panel::fitting_rows;

/// Raw output of the running installer, shown as-is.
pub struct OutputPanel<'a> {
    pub lines: &'a [String],
}

impl Component for OutputPanel<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let skip = self.lines.len().saturating_sub(fitting_rows(area));
        let lines: Vec<Line> = self.lines[skip..]
            .iter()
            .map(|line| Line::raw(line.as_str()))
            .collect();

        let panel = Paragraph::new(lines)
            .style(Style::default().fg(Color::White))
            .block(
                Block::bordered()
                    .title("Pacman/Yay Output")
                    .border_style(Style::default().fg(Color::Yellow)),
            );
        frame.render_widget(panel, area);
    }
}
