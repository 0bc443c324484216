//! # Installer Processes
//!
//! Everything that touches child processes: building command lines,
//! launching and supervising sessions, draining their output, and the
//! orchestration loop that strings packages together.
//!
//! ```text
//! Installer::run
//!   └─ install_batch (primary, then AUR)
//!        └─ install_package
//!             ├─ ProcessSession::launch ──► spawn_streamer ──► SharedState
//!             ├─ supervise (prompt detection ⇄ Confirmer)
//!             └─ finish (exit code + streamer drained)
//! ```

pub mod command;
mod error;
pub mod orchestrator;
pub mod session;
pub mod shutdown;
pub mod stream;

pub use command::{InstallCommand, Tool};
pub use error::InstallError;
pub use orchestrator::{
    BatchSummary, Confirmer, DEFAULT_RESPONSE, InstallPlan, InstallResult, InstallSettings,
    Installer, RunSummary,
};
pub use session::ProcessSession;
pub use shutdown::Shutdown;
