use ratatui::Frame;
use ratatui::layout::Rect;

/// A region of the installer screen.
///
/// Components receive everything they show as props (struct fields) built
/// from one [`Snapshot`](crate::core::state::Snapshot), and render into the
/// `Rect` they are given. None of them can reach the shared state.
///
/// `render` takes `&mut self` so a component may cache layout work between
/// the measuring and drawing halves of a frame.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}
