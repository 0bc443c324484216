use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Paragraph};

use crate::tui::component::Component;

pub const TITLE: &str = "🔧 Arch Linux Auto-Installer";

/// Static title banner across the top of the screen.
#[derive(Debug, Default)]
pub struct Header;

impl Component for Header {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let title = Paragraph::new(TITLE)
            .style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center)
            .block(Block::bordered().border_style(Style::default().fg(Color::Cyan)));
        frame.render_widget(title, area);
    }
}
