//! Installer command lines.
//!
//! An invocation is `[tool..., install_flag, (confirm_flag)?, package]`,
//! e.g. `sudo pacman -S --noconfirm git`. The confirm flag is only added in
//! non-interactive mode, where nobody is around to answer prompts.

use std::fmt;

use crate::core::config::ResolvedConfig;

/// Which package manager a batch goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// The distribution package manager (pacman).
    Primary,
    /// The AUR helper (yay).
    Alternate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallCommand {
    pub primary: Vec<String>,
    pub alternate: Vec<String>,
    pub install_flag: String,
    pub confirm_flag: String,
}

impl InstallCommand {
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            primary: config.primary_tool.clone(),
            alternate: config.alternate_tool.clone(),
            install_flag: config.install_flag.clone(),
            confirm_flag: config.confirm_flag.clone(),
        }
    }

    fn tool(&self, tool: Tool) -> &[String] {
        match tool {
            Tool::Primary => &self.primary,
            Tool::Alternate => &self.alternate,
        }
    }

    /// Short name for log lines: the last word of the tool prefix
    /// (`sudo pacman` → `pacman`).
    pub fn tool_name(&self, tool: Tool) -> &str {
        self.tool(tool).last().map_or("installer", String::as_str)
    }

    pub fn build(&self, tool: Tool, package: &str, interactive: bool) -> Vec<String> {
        let mut argv = self.tool(tool).to_vec();
        if !self.install_flag.is_empty() {
            argv.push(self.install_flag.clone());
        }
        if !interactive && !self.confirm_flag.is_empty() {
            argv.push(self.confirm_flag.clone());
        }
        argv.push(package.to_string());
        argv
    }
}

impl Default for InstallCommand {
    fn default() -> Self {
        Self {
            primary: vec!["sudo".to_string(), "pacman".to_string()],
            alternate: vec!["yay".to_string()],
            install_flag: "-S".to_string(),
            confirm_flag: "--noconfirm".to_string(),
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tool::Primary => f.write_str("primary"),
            Tool::Alternate => f.write_str("alternate"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_interactive() {
        let cmd = InstallCommand::default();
        assert_eq!(
            cmd.build(Tool::Primary, "git", true),
            vec!["sudo", "pacman", "-S", "git"]
        );
    }

    #[test]
    fn test_primary_non_interactive_adds_confirm_flag() {
        let cmd = InstallCommand::default();
        assert_eq!(
            cmd.build(Tool::Primary, "git", false),
            vec!["sudo", "pacman", "-S", "--noconfirm", "git"]
        );
    }

    #[test]
    fn test_alternate_helper() {
        let cmd = InstallCommand::default();
        assert_eq!(
            cmd.build(Tool::Alternate, "visual-studio-code-bin", true),
            vec!["yay", "-S", "visual-studio-code-bin"]
        );
        assert_eq!(
            cmd.build(Tool::Alternate, "spotify", false),
            vec!["yay", "-S", "--noconfirm", "spotify"]
        );
    }

    #[test]
    fn test_empty_flags_are_skipped() {
        let cmd = InstallCommand {
            primary: vec!["sh".into(), "-c".into(), "exit 0".into()],
            alternate: vec!["true".into()],
            install_flag: String::new(),
            confirm_flag: String::new(),
        };
        assert_eq!(
            cmd.build(Tool::Primary, "pkg", false),
            vec!["sh", "-c", "exit 0", "pkg"]
        );
    }

    #[test]
    fn test_tool_name() {
        let cmd = InstallCommand::default();
        assert_eq!(cmd.tool_name(Tool::Primary), "pacman");
        assert_eq!(cmd.tool_name(Tool::Alternate), "yay");
    }
}
