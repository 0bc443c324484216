//! # TUI Components
//!
//! One component per screen region. All of them are stateless: the props
//! are borrowed straight out of a `Snapshot`, and the layout lives in
//! `ui.rs`.
//!
//! ```text
//! components/
//! ├── header.rs        (title banner)
//! ├── status_panel.rs  (current package, status, progress bar)
//! ├── log_panel.rs     (installer log, colored by level)
//! ├── output_panel.rs  (child process output)
//! └── input_panel.rs   (prompt + typed buffer)
//! ```

pub mod header;
pub mod input_panel;
pub mod log_panel;
pub mod output_panel;
pub mod status_panel;

pub use header::Header;
pub use input_panel::InputPanel;
pub use log_panel::LogPanel;
pub use output_panel::OutputPanel;
pub use status_panel::{StatusPanel, progress_bar};
