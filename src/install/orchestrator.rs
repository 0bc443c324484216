//! # Installation Orchestrator
//!
//! Installs packages strictly one at a time, in list order. Each package
//! gets its own [`ProcessSession`]; the next package starts only after that
//! session and its streamer are both finished.
//!
//! In interactive mode the orchestrator polls the prompt detector while the
//! child runs. When a prompt shows up it asks the [`Confirmer`] for a line
//! and writes it to the child's stdin. An empty line is answered with
//! [`DEFAULT_RESPONSE`].
//!
//! Package failures never stop a batch. Only [`InstallError::UserAbort`]
//! propagates out of [`Installer::run`].

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use tokio::time::Instant;

use crate::core::action::Action;
use crate::core::config::ResolvedConfig;
use crate::core::prompt::find_prompt;
use crate::core::state::{LogLevel, PackagePhase, SharedState};
use crate::install::command::{InstallCommand, Tool};
use crate::install::session::{ProcessSession, TERMINATE_GRACE};
use crate::install::shutdown::Shutdown;
use crate::install::InstallError;

/// Sent when the user confirms with an empty line. Fail-open: an ambiguous
/// answer accepts the installer's default question.
pub const DEFAULT_RESPONSE: &str = "Y";

pub const REVIEW_PROMPT: &str = "Press Enter to exit...";

/// Source of user answers to confirmation prompts.
#[async_trait]
pub trait Confirmer: Send {
    /// Collects one line of input for `prompt`.
    ///
    /// Returns an empty string if `stop` reports true before a line is
    /// complete. Returns `UserAbort` if the user interrupts.
    async fn wait_for_input(
        &mut self,
        prompt: &str,
        stop: &mut (dyn FnMut() -> bool + Send),
    ) -> Result<String, InstallError>;

    /// Non-blocking check for an interrupt keystroke. Other keys are dropped.
    fn check_interrupt(&mut self) -> Result<(), InstallError>;
}

#[derive(Debug, Clone)]
pub struct InstallSettings {
    pub command: InstallCommand,
    pub poll_interval: Duration,
    pub startup_delay: Duration,
    pub package_delay: Duration,
    pub drain_timeout: Duration,
}

impl InstallSettings {
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            command: InstallCommand::from_config(config),
            poll_interval: config.poll_interval,
            startup_delay: config.startup_delay,
            package_delay: config.package_delay,
            drain_timeout: config.drain_timeout,
        }
    }
}

impl Default for InstallSettings {
    fn default() -> Self {
        Self {
            command: InstallCommand::default(),
            poll_interval: Duration::from_millis(50),
            startup_delay: Duration::from_secs(2),
            package_delay: Duration::from_secs(1),
            drain_timeout: Duration::from_secs(2),
        }
    }
}

/// What to install: the primary list goes through the package manager, the
/// AUR list always through the alternate helper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallPlan {
    pub primary: Vec<String>,
    pub aur: Vec<String>,
}

impl InstallPlan {
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.aur.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallResult {
    pub package: String,
    pub succeeded: bool,
    /// Child exit code; -1 when the child never started or died by signal.
    pub exit_code: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub tool: Tool,
    pub results: Vec<InstallResult>,
}

impl BatchSummary {
    pub fn successful(&self) -> usize {
        self.results.iter().filter(|r| r.succeeded).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.successful()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub batches: Vec<BatchSummary>,
}

impl RunSummary {
    pub fn successful(&self) -> usize {
        self.batches.iter().map(BatchSummary::successful).sum()
    }

    pub fn failed(&self) -> usize {
        self.batches.iter().map(BatchSummary::failed).sum()
    }

    pub fn failed_packages(&self) -> impl Iterator<Item = &InstallResult> {
        self.batches
            .iter()
            .flat_map(|b| b.results.iter())
            .filter(|r| !r.succeeded)
    }
}

pub struct Installer {
    state: SharedState,
    settings: InstallSettings,
    /// `Some` in interactive mode.
    input: Option<Box<dyn Confirmer>>,
    shutdown: Shutdown,
}

impl Installer {
    pub fn new(
        state: SharedState,
        settings: InstallSettings,
        input: Option<Box<dyn Confirmer>>,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            state,
            settings,
            input,
            shutdown,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.input.is_some()
    }

    /// Runs the primary batch, then the AUR batch.
    pub async fn run(&mut self, plan: &InstallPlan) -> Result<RunSummary, InstallError> {
        self.state.log(LogLevel::Info, "Auto-installer started");
        self.pause(self.settings.startup_delay).await?;

        let mut summary = RunSummary::default();

        if !plan.primary.is_empty() {
            self.state.log(
                LogLevel::Info,
                format!(
                    "Installing {} packages with {}",
                    plan.primary.len(),
                    self.settings.command.tool_name(Tool::Primary)
                ),
            );
            summary
                .batches
                .push(self.install_batch(&plan.primary, Tool::Primary).await?);
        }

        if !plan.aur.is_empty() {
            self.state.log(
                LogLevel::Info,
                format!(
                    "Installing {} AUR packages with {}",
                    plan.aur.len(),
                    self.settings.command.tool_name(Tool::Alternate)
                ),
            );
            summary
                .batches
                .push(self.install_batch(&plan.aur, Tool::Alternate).await?);
        }

        self.state
            .dispatch(Action::Idle("All installations complete!".to_string()));
        self.state.log(LogLevel::Info, "Installer finished successfully");
        Ok(summary)
    }

    pub async fn install_batch(
        &mut self,
        packages: &[String],
        tool: Tool,
    ) -> Result<BatchSummary, InstallError> {
        let total = packages.len();
        self.state.dispatch(Action::BatchStarted { total });
        debug!("Starting {} batch of {} packages", tool, total);

        let mut batch = BatchSummary {
            tool,
            results: Vec::with_capacity(total),
        };

        for (i, package) in packages.iter().enumerate() {
            self.state.dispatch(Action::Progress { current: i });
            let result = self.install_package(package, tool).await?;
            batch.results.push(result);
            self.state.dispatch(Action::Progress { current: i + 1 });

            if i + 1 < total {
                self.pause(self.settings.package_delay).await?;
            }
        }

        let successful = batch.successful();
        self.state.dispatch(Action::Idle(format!(
            "Complete: {} successful, {} failed",
            successful,
            batch.failed()
        )));
        self.state.log(
            LogLevel::Info,
            format!("Installation complete: {successful}/{total} packages installed"),
        );
        Ok(batch)
    }

    /// Installs one package. Every failure except `UserAbort` is folded
    /// into the returned result.
    pub async fn install_package(
        &mut self,
        package: &str,
        tool: Tool,
    ) -> Result<InstallResult, InstallError> {
        if self.shutdown.is_triggered() {
            return Err(InstallError::UserAbort);
        }

        self.state.dispatch(Action::PackageStarted(package.to_string()));
        self.state
            .log(LogLevel::Info, format!("Starting installation of {package}"));

        let interactive = self.is_interactive();
        let argv = self.settings.command.build(tool, package, interactive);

        // Taken before launch: the streamer may push lines before `supervise` runs.
        let output_mark = self.state.read(|s| s.output_lines.total_pushed());

        let outcome = match ProcessSession::launch(argv, interactive, self.state.clone()) {
            Ok(mut session) => {
                if let Err(e) = self.supervise(&mut session, output_mark).await {
                    session.terminate(TERMINATE_GRACE).await;
                    return Err(e);
                }
                match session.finish(self.settings.drain_timeout).await {
                    Ok(0) => Ok(()),
                    Ok(exit_code) => Err(InstallError::InstallFailure {
                        package: package.to_string(),
                        exit_code,
                    }),
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        };

        Ok(self.record(package, outcome))
    }

    /// Polls the running child until it exits. In interactive mode this is
    /// where prompts are detected and answered.
    ///
    /// `output_mark` is the output sequence number from before the launch.
    async fn supervise(
        &mut self,
        session: &mut ProcessSession,
        output_mark: u64,
    ) -> Result<(), InstallError> {
        // Only output that arrived after the last answer can raise a new prompt.
        let mut answered_at = output_mark;

        loop {
            if self.shutdown.is_triggered() {
                return Err(InstallError::UserAbort);
            }
            if session.has_exited() {
                return Ok(());
            }

            if let Some(input) = self.input.as_mut() {
                input.check_interrupt()?;

                let prompt = self.state.read(|s| {
                    let recent: Vec<&str> =
                        s.output_lines.since(answered_at).map(String::as_str).collect();
                    find_prompt(&recent).map(str::to_string)
                });

                if let Some(prompt) = prompt {
                    self.state
                        .dispatch(Action::Phase(PackagePhase::AwaitingConfirmation));
                    info!("Prompt detected: {}", prompt);

                    let line = input
                        .wait_for_input(&prompt, &mut || session.has_exited())
                        .await?;
                    answered_at = self.state.read(|s| s.output_lines.total_pushed());

                    if !session.has_exited() {
                        let response = if line.trim().is_empty() {
                            DEFAULT_RESPONSE.to_string()
                        } else {
                            line
                        };
                        match session.respond(&response).await {
                            Ok(()) => self
                                .state
                                .log(LogLevel::Info, format!("Answered prompt with \"{response}\"")),
                            Err(e) => self
                                .state
                                .log(LogLevel::Warning, format!("Could not answer prompt: {e}")),
                        }
                    }
                    self.state.dispatch(Action::Phase(PackagePhase::Running));
                }
            }

            tokio::time::sleep(self.settings.poll_interval).await;
        }
    }

    fn record(&self, package: &str, outcome: Result<(), InstallError>) -> InstallResult {
        let (succeeded, exit_code) = match outcome {
            Ok(()) => {
                self.state.log(
                    LogLevel::Success,
                    format!("✓ Successfully installed {package}"),
                );
                (true, 0)
            }
            Err(InstallError::InstallFailure { exit_code, .. }) => {
                self.state.log(
                    LogLevel::Error,
                    format!("✗ Failed to install {package} (exit code: {exit_code})"),
                );
                (false, exit_code)
            }
            Err(e) => {
                self.state.log(
                    LogLevel::Error,
                    format!("✗ Exception installing {package}: {e}"),
                );
                (false, -1)
            }
        };

        self.state.dispatch(Action::PackageFinished {
            package: package.to_string(),
            succeeded,
        });

        InstallResult {
            package: package.to_string(),
            succeeded,
            exit_code,
        }
    }

    /// Keeps the final screen up until the user presses Enter.
    /// A no-op outside interactive mode.
    pub async fn hold_for_review(&mut self) -> Result<(), InstallError> {
        let Some(input) = self.input.as_mut() else {
            return Ok(());
        };
        input.wait_for_input(REVIEW_PROMPT, &mut || false).await?;
        Ok(())
    }

    /// Sleeps for `duration` while staying responsive to interrupts.
    async fn pause(&mut self, duration: Duration) -> Result<(), InstallError> {
        let deadline = Instant::now() + duration;
        loop {
            if self.shutdown.is_triggered() {
                return Err(InstallError::UserAbort);
            }
            if let Some(input) = self.input.as_mut() {
                input.check_interrupt()?;
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            tokio::time::sleep((deadline - now).min(self.settings.poll_interval)).await;
        }
    }
}
