use std::path::Path;

use crate::error::QueryError;
use crate::mode::QueryMode;

/// A file sent alongside the query as a multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, QueryError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            QueryError::Validation(format!("cannot read attachment {}: {}", path.display(), e))
        })?;
        let filename = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("file")
            .to_string();
        Ok(Self { filename, bytes })
    }
}

/// One submission. Built fresh per request and dropped once it resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    mode: QueryMode,
    attachment: Option<Attachment>,
}

impl Query {
    /// Rejects text that is empty after trimming. The text itself is sent
    /// as typed.
    pub fn new(text: impl Into<String>, mode: QueryMode) -> Result<Self, QueryError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QueryError::Validation("query is blank".to_string()));
        }
        Ok(Self {
            text,
            mode,
            attachment: None,
        })
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn mode(&self) -> QueryMode {
        self.mode
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    pub(crate) fn into_parts(self) -> (String, QueryMode, Option<Attachment>) {
        (self.text, self.mode, self.attachment)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
}

impl Answer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
