//! UI-agnostic query form.
//!
//! The form owns the text being edited, the selected mode, an optional
//! attachment path and the state of the last submission. Submission is
//! split in two so a UI can run the request on a background task:
//! [`QueryForm::begin_submit`] validates and moves to `Pending`, and
//! [`QueryForm::complete`] records the outcome. [`QueryForm::submit`] runs
//! both around a single backend call.

use std::path::{Path, PathBuf};

use crate::client::QueryBackend;
use crate::error::{QueryError, FALLBACK_MESSAGE};
use crate::mode::QueryMode;
use crate::query::{Answer, Attachment, Query};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// What the renderer needs to draw the result area.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub status: RequestState,
    pub answer: Option<String>,
    pub error_message: Option<String>,
    pub error_code: Option<&'static str>,
}

#[derive(Debug, Clone, Default)]
pub struct QueryForm {
    pub input: String,
    pub cursor: usize, // char index into input
    pub mode: QueryMode,
    pub attachment_path: Option<PathBuf>,
    state: FormState,
}

impl QueryForm {
    pub fn new(mode: QueryMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn status(&self) -> RequestState {
        self.state.status
    }

    pub fn is_pending(&self) -> bool {
        self.state.status == RequestState::Pending
    }

    /// Submit is allowed when not in flight and the text is not blank.
    pub fn can_submit(&self) -> bool {
        !self.is_pending() && !self.input.trim().is_empty()
    }

    /// Validate and move to `Pending`. Returns `None` (and changes nothing)
    /// when the text is blank or a request is already in flight.
    pub fn begin_submit(&mut self) -> Option<Query> {
        if self.is_pending() {
            tracing::debug!("submit ignored: request already pending");
            return None;
        }
        let query = match Query::new(self.input.clone(), self.mode) {
            Ok(query) => query,
            Err(e) => {
                tracing::debug!("submit refused: {}", e);
                return None;
            }
        };

        self.state = FormState {
            status: RequestState::Pending,
            ..FormState::default()
        };
        Some(query)
    }

    /// Record the outcome of the in-flight request. Ignored unless pending.
    pub fn complete(&mut self, outcome: Result<Answer, QueryError>) {
        if !self.is_pending() {
            return;
        }
        match outcome {
            Ok(answer) => {
                tracing::info!(chars = answer.text.chars().count(), "answer received");
                self.state = FormState {
                    status: RequestState::Succeeded,
                    answer: Some(answer.text),
                    error_message: None,
                    error_code: None,
                };
            }
            Err(e) => {
                tracing::warn!(code = e.code(), "query failed: {}", e);
                self.state = FormState {
                    status: RequestState::Failed,
                    answer: None,
                    error_message: Some(e.user_message().to_string()),
                    error_code: Some(e.code()),
                };
            }
        }
    }

    /// Run a whole submission against `backend` and return the final state.
    pub async fn submit<B: QueryBackend + ?Sized>(&mut self, backend: &B) -> RequestState {
        let Some(query) = self.begin_submit() else {
            return self.status();
        };
        let outcome = match load_attachment(query, self.attachment_path.as_deref()).await {
            Ok(query) => backend.query(&query).await,
            Err(e) => Err(e),
        };
        self.complete(outcome);
        self.status()
    }

    /// Text displayed in the result area: the answer verbatim, or the
    /// fallback message.
    pub fn display_text(&self) -> Option<&str> {
        match self.state.status {
            RequestState::Succeeded => self.state.answer.as_deref(),
            RequestState::Failed => Some(
                self.state
                    .error_message
                    .as_deref()
                    .unwrap_or(FALLBACK_MESSAGE),
            ),
            RequestState::Idle | RequestState::Pending => None,
        }
    }
}

/// Read the file at `path` (if any) into `query`. A read failure becomes a
/// validation error for this submission.
pub async fn load_attachment(query: Query, path: Option<&Path>) -> Result<Query, QueryError> {
    match path {
        Some(path) => Ok(query.with_attachment(Attachment::from_path(path).await?)),
        None => Ok(query),
    }
}
