use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::mode::QueryMode;
use crate::query::{Answer, Query};

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    mode: QueryMode,
}

#[derive(Serialize)]
struct InsertRequest<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct InsertFileRequest<'a> {
    file_path: &'a str,
}

/// Envelope used by every write/query endpoint of the service.
#[derive(Deserialize)]
struct ServiceResponse {
    #[serde(default, alias = "answer")]
    data: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct HealthResponse {
    status: String,
}

/// Anything that can turn a [`Query`] into an [`Answer`].
#[async_trait]
pub trait QueryBackend: Send + Sync {
    async fn query(&self, query: &Query) -> Result<Answer, QueryError>;
}

#[derive(Clone)]
pub struct RagClient {
    client: Client,
    base_url: String,
    attachments: bool,
}

impl RagClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            attachments: false,
        }
    }

    /// Allow queries to carry a file. Such queries go out as multipart
    /// instead of JSON.
    pub fn with_attachments(mut self, enabled: bool) -> Self {
        self.attachments = enabled;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn ask(&self, query: &Query) -> Result<Answer, QueryError> {
        let url = format!("{}/query", self.base_url);

        let request = match query.attachment() {
            None => self.client.post(&url).json(&QueryRequest {
                query: query.text(),
                mode: query.mode(),
            }),
            Some(_) if !self.attachments => {
                return Err(QueryError::Validation(
                    "attachments are disabled for this endpoint".to_string(),
                ));
            }
            Some(_) => {
                let (text, mode, attachment) = query.clone().into_parts();
                let mut form = multipart::Form::new()
                    .text("query", text)
                    .text("mode", mode.as_str());
                if let Some(attachment) = attachment {
                    tracing::debug!(
                        filename = %attachment.filename,
                        size = attachment.bytes.len(),
                        "attaching file"
                    );
                    let part = multipart::Part::bytes(attachment.bytes).file_name(attachment.filename);
                    form = form.part("file", part);
                }
                self.client.post(&url).multipart(form)
            }
        };

        tracing::debug!(%url, mode = %query.mode(), "sending query");
        let response = request.send().await?;
        let body: ServiceResponse = read_json(response).await?;

        let text = body
            .data
            .ok_or_else(|| QueryError::MalformedBody("response has no answer field".to_string()))?;
        Ok(Answer { text })
    }

    /// Index raw text on the server. Returns the server's confirmation.
    pub async fn insert_text(&self, text: &str) -> Result<String, QueryError> {
        if text.trim().is_empty() {
            return Err(QueryError::Validation("nothing to insert".to_string()));
        }
        let url = format!("{}/insert", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&InsertRequest { text })
            .send()
            .await?;
        let body: ServiceResponse = read_json(response).await?;
        Ok(body.message.unwrap_or_else(|| "inserted".to_string()))
    }

    /// Ask the server to index a file. The path is resolved on the server
    /// host, not locally.
    pub async fn insert_file(&self, file_path: &str) -> Result<String, QueryError> {
        if file_path.trim().is_empty() {
            return Err(QueryError::Validation("file path is blank".to_string()));
        }
        let url = format!("{}/insert_file", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&InsertFileRequest { file_path })
            .send()
            .await?;
        let body: ServiceResponse = read_json(response).await?;
        Ok(body.message.unwrap_or_else(|| "inserted".to_string()))
    }

    pub async fn health(&self) -> Result<String, QueryError> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        let health: HealthResponse = read_json(response).await?;
        Ok(health.status)
    }
}

#[async_trait]
impl QueryBackend for RagClient {
    async fn query(&self, query: &Query) -> Result<Answer, QueryError> {
        self.ask(query).await
    }
}

/// Non-2xx becomes `Server` with the body as message; an unparseable body
/// becomes `MalformedBody`.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, QueryError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(QueryError::Server { status, message });
    }

    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| QueryError::MalformedBody(e.to_string()))
}
