//! HTTP client for the hosted activity index.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::RetrievalError;

use super::{QueryEngine, QueryResponse, ScoredChunk};

/// Client for a managed vector index with a query/retrieve API.
///
/// Constructed once at startup and shared by reference for the lifetime of
/// the process.
pub struct CloudIndexClient {
    http: reqwest::Client,
    base_url: String,
    index_name: String,
    project_name: String,
    organization_id: String,
    api_key: SecretString,
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    index: &'a str,
    project: &'a str,
    organization_id: &'a str,
    query: &'a str,
    similarity_top_k: usize,
}

#[derive(Deserialize)]
struct QueryReply {
    response: String,
}

#[derive(Deserialize)]
struct RetrieveReply {
    nodes: Vec<RetrievedNode>,
}

#[derive(Deserialize)]
struct RetrievedNode {
    score: f32,
    text: String,
}

impl CloudIndexClient {
    pub fn new(settings: &Settings) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            index_name: settings.index_name.clone(),
            project_name: settings.project_name.clone(),
            organization_id: settings.organization_id.clone(),
            api_key: settings.api_key.clone(),
        }
    }

    fn request_body<'a>(&'a self, query: &'a str, top_k: usize) -> QueryRequest<'a> {
        QueryRequest {
            index: &self.index_name,
            project: &self.project_name,
            organization_id: &self.organization_id,
            query,
            similarity_top_k: top_k,
        }
    }

    async fn post(
        &self,
        path: &str,
        body: &QueryRequest<'_>,
    ) -> Result<reqwest::Response, RetrievalError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(self.api_key.expose_secret())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        Err(match status.as_u16() {
            401 | 403 => RetrievalError::AuthFailed,
            429 => RetrievalError::RateLimited {
                retry_after: response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .map(std::time::Duration::from_secs),
            },
            _ => RetrievalError::RequestFailed {
                reason: format!(
                    "{} returned {}: {}",
                    path,
                    status,
                    response.text().await.unwrap_or_default()
                ),
            },
        })
    }
}

#[async_trait]
impl QueryEngine for CloudIndexClient {
    async fn query(&self, text: &str, top_k: usize) -> Result<QueryResponse, RetrievalError> {
        tracing::info!(index = %self.index_name, top_k, "Submitting query to hosted index");
        let reply: QueryReply = self
            .post("/api/v1/query", &self.request_body(text, top_k))
            .await?
            .json()
            .await
            .map_err(|e| RetrievalError::InvalidResponse {
                reason: format!("Failed to decode query response: {e}"),
            })?;
        Ok(QueryResponse {
            text: reply.response,
        })
    }

    async fn retrieve(
        &self,
        text: &str,
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, RetrievalError> {
        tracing::info!(index = %self.index_name, top_k, "Retrieving raw chunks from hosted index");
        let reply: RetrieveReply = self
            .post("/api/v1/retrieve", &self.request_body(text, top_k))
            .await?
            .json()
            .await
            .map_err(|e| RetrievalError::InvalidResponse {
                reason: format!("Failed to decode retrieve response: {e}"),
            })?;
        Ok(reply
            .nodes
            .into_iter()
            .map(|n| ScoredChunk {
                score: n.score,
                text: n.text,
            })
            .collect())
    }
}
