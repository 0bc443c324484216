//! Raw keyboard capture for confirmation prompts.
//!
//! The terminal stays in raw mode for the whole run, so characters arrive
//! one by one and are echoed into the input panel through the shared state
//! instead of by the terminal itself.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};

use crate::core::action::Action;
use crate::core::line::{Keystroke, LineEditor};
use crate::core::state::SharedState;
use crate::install::{Confirmer, InstallError, Shutdown};
use crate::tui::event::{KeySource, is_interrupt};

pub struct RawInput {
    keys: Box<dyn KeySource>,
    editor: LineEditor,
    state: SharedState,
    shutdown: Shutdown,
    poll_interval: Duration,
}

impl RawInput {
    pub fn new(
        keys: Box<dyn KeySource>,
        state: SharedState,
        shutdown: Shutdown,
        poll_interval: Duration,
    ) -> Self {
        Self {
            keys,
            editor: LineEditor::new(),
            state,
            shutdown,
            poll_interval,
        }
    }

    fn next_char(&mut self) -> Option<char> {
        match self.keys.poll_char() {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to read key: {}", e);
                None
            }
        }
    }

    async fn collect_line(
        &mut self,
        stop: &mut (dyn FnMut() -> bool + Send),
    ) -> Result<String, InstallError> {
        loop {
            if self.shutdown.is_triggered() {
                return Err(InstallError::UserAbort);
            }

            while let Some(c) = self.next_char() {
                match self.editor.feed(c) {
                    Keystroke::Pending => self
                        .state
                        .dispatch(Action::InputChanged(self.editor.buffer().to_string())),
                    Keystroke::Line(line) => return Ok(line),
                    Keystroke::Interrupt => {
                        self.shutdown.trigger();
                        return Err(InstallError::UserAbort);
                    }
                }
            }

            if stop() {
                debug!("Input abandoned, prompt no longer pending");
                return Ok(String::new());
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl Confirmer for RawInput {
    async fn wait_for_input(
        &mut self,
        prompt: &str,
        stop: &mut (dyn FnMut() -> bool + Send),
    ) -> Result<String, InstallError> {
        self.editor.clear();
        self.state.dispatch(Action::InputStarted(prompt.to_string()));
        let result = self.collect_line(stop).await;
        self.state.dispatch(Action::InputFinished);
        result
    }

    fn check_interrupt(&mut self) -> Result<(), InstallError> {
        while let Some(c) = self.next_char() {
            if is_interrupt(c) {
                self.shutdown.trigger();
                return Err(InstallError::UserAbort);
            }
        }
        Ok(())
    }
}
