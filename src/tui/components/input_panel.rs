use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use crate::tui::component::Component;

pub const IDLE_MESSAGE: &str = "No input required";
pub const CURSOR: &str = "█";

/// Bottom line: the pending prompt with what has been typed so far.
pub struct InputPanel<'a> {
    pub prompt: &'a str,
    pub buffer: &'a str,
    pub awaiting: bool,
}

impl Component for InputPanel<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let (line, border) = if self.awaiting {
            let line = Line::from(vec![
                Span::styled(
                    self.prompt,
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
                Span::raw(self.buffer),
                Span::styled(CURSOR, Style::default().add_modifier(Modifier::SLOW_BLINK)),
            ]);
            (line, Color::Yellow)
        } else {
            let line = Line::styled(IDLE_MESSAGE, Style::default().fg(Color::DarkGray));
            (line, Color::DarkGray)
        };

        let panel = Paragraph::new(line).block(
            Block::bordered()
                .title("Input")
                .border_style(Style::default().fg(border)),
        );
        frame.render_widget(panel, area);
    }
}
