use thiserror::Error;

/// The only text a failed submission ever shows to the user.
pub const FALLBACK_MESSAGE: &str = "An error occurred while processing your request.";

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("request to query service failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("query service returned {status}: {message}")]
    Server {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("malformed response body: {0}")]
    MalformedBody(String),

    /// The task carrying the request ended without producing a response.
    #[error("request aborted: {0}")]
    Aborted(String),
}

impl QueryError {
    /// Short, stable identifier for the failure class.
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::Validation(_) => "validation",
            QueryError::Network(_) => "network",
            QueryError::Server { .. } => "server",
            QueryError::MalformedBody(_) => "malformed",
            QueryError::Aborted(_) => "aborted",
        }
    }

    pub fn user_message(&self) -> &'static str {
        FALLBACK_MESSAGE
    }
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            QueryError::MalformedBody(err.to_string())
        } else {
            QueryError::Network(err)
        }
    }
}
