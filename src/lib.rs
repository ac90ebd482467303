pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod logging;
pub mod mode;
pub mod query;

// Re-export main types for convenience
pub use client::{QueryBackend, RagClient};
pub use config::Config;
pub use error::{QueryError, FALLBACK_MESSAGE};
pub use form::{FormState, QueryForm, RequestState};
pub use mode::QueryMode;
pub use query::{Answer, Attachment, Query};
