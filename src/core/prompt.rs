//! # Prompt Detection
//!
//! Decides whether the child installer is sitting on a yes/no question by
//! looking for known substrings in its most recent output lines.
//!
//! The table is English-only and case-sensitive. Prompts in other locales
//! or from other tool versions are missed; the orchestrator then just waits
//! for the child to exit or for the user to interrupt.

/// How many trailing output lines are inspected.
pub const PROMPT_WINDOW: usize = 5;

/// Substrings that mark a pending confirmation.
pub const PROMPT_PATTERNS: &[&str] = &["Proceed with installation", "Continue?", "[Y/n]", "[y/N]"];

/// Returns the most recent line within the last [`PROMPT_WINDOW`] lines
/// that contains a prompt pattern.
pub fn find_prompt<S: AsRef<str>>(lines: &[S]) -> Option<&str> {
    let start = lines.len().saturating_sub(PROMPT_WINDOW);
    lines[start..]
        .iter()
        .rev()
        .map(AsRef::as_ref)
        .find(|line| PROMPT_PATTERNS.iter().any(|pattern| line.contains(pattern)))
}

pub fn awaits_confirmation<S: AsRef<str>>(lines: &[S]) -> bool {
    find_prompt(lines).is_some()
}
