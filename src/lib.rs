//! Arch Linux package auto-installer: library exports for the binary and
//! integration tests.

pub mod core;
pub mod install;
pub mod tui;
