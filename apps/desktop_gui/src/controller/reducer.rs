//! Reducer-like transitions of the vectorize workflow, kept free of widget code.

use std::path::PathBuf;

use client_core::{Attempt, RequestDraft};
use shared::domain::{Mode, ModePolicy, OutputFormat};

use crate::controller::events::{Notice, UiError, UiErrorContext};

/// Workflow state owned by the UI thread. The backend worker never touches it;
/// results arrive as events and are applied here.
#[derive(Debug, Clone, Default)]
pub struct WorkflowState {
    pub draft: RequestDraft,
    pub current_output: Option<PathBuf>,
    in_flight: bool,
}

/// What the UI has to do after an attempt was applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub notice: Notice,
    /// New result to show in the output preview, if any.
    pub show_output: Option<PathBuf>,
}

impl WorkflowState {
    pub fn new(draft: RequestDraft) -> Self {
        let mut state = Self {
            draft,
            current_output: None,
            in_flight: false,
        };
        state.set_mode(state.draft.mode);
        state
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Switches mode and applies its format policy.
    pub fn set_mode(&mut self, mode: Mode) -> ModePolicy {
        self.draft.mode = mode;
        let policy = mode.policy();
        if let Some(format) = policy.forced_format {
            self.draft.output_format = format;
        }
        policy
    }

    pub fn set_output_format(&mut self, format: OutputFormat) {
        if format == OutputFormat::Svg && !self.draft.mode.policy().svg_allowed {
            return;
        }
        self.draft.output_format = format;
    }

    /// Marks a request as running and hands out the values to send.
    /// Overlapping requests are rejected.
    pub fn begin(&mut self) -> Result<RequestDraft, &'static str> {
        if self.in_flight {
            return Err("A vectorization is already running; wait for it to finish.");
        }
        self.in_flight = true;
        Ok(self.draft.clone())
    }

    /// Releases the in-flight flag when the request never reached the worker.
    pub fn abort(&mut self) {
        self.in_flight = false;
        self.set_mode(self.draft.mode.after_attempt());
    }

    pub fn finish(&mut self, attempt: Attempt) -> Completion {
        self.in_flight = false;
        self.set_mode(attempt.next_mode);
        let local_failure = attempt.stopped_before_dispatch();

        match attempt.result {
            Ok(stored) => {
                self.current_output = Some(stored.path.clone());
                let mut message = format!(
                    "Vectorization succeeded.\nSaved to {}\nPalette colors sent to the API: {}",
                    stored.path.display(),
                    stored.palette_colors
                );
                if let Some(warning) = attempt.palette_warning {
                    message.push_str(&format!("\nPalette file ignored: {warning}"));
                }
                Completion {
                    notice: Notice::info("Success", message),
                    show_output: Some(stored.path),
                }
            }
            Err(err) => {
                let mut notice =
                    Notice::error(&UiError::from_vectorize(UiErrorContext::Vectorize, &err));
                if local_failure {
                    notice.message.push_str("\nNothing was sent to the API.");
                }
                Completion {
                    notice,
                    show_output: None,
                }
            }
        }
    }
}

/// Close-request handling: the first close asks, only a confirmed one exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExitGuard {
    asking: bool,
    confirmed: bool,
}

impl ExitGuard {
    /// Returns true when the window close must be cancelled.
    pub fn close_requested(&mut self) -> bool {
        if self.confirmed {
            return false;
        }
        self.asking = true;
        true
    }

    pub fn asking(&self) -> bool {
        self.asking
    }

    pub fn confirm(&mut self) {
        self.asking = false;
        self.confirmed = true;
    }

    pub fn keep_running(&mut self) {
        self.asking = false;
    }
}
