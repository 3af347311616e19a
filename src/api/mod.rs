use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;

pub mod http;
pub mod types;

use crate::api::http::HttpGateway;
pub use crate::api::types::{
    ChatRequest, ChatResponse, Choice, HealthStatus, ProviderStatus, ServiceStatus, Usage,
};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        };
        f.write_str(name)
    }
}

/// A chat message as it travels over the wire: role and content only.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Message {
    pub role: MessageRole,
    #[serde(default, deserialize_with = "types::null_as_default")]
    pub content: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport or decoding failure (connection refused, timeout, bad JSON).
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    /// The gateway answered with a non-success status.
    #[error("gateway returned status {status}")]
    Status { status: u16, detail: Option<String> },
    /// A well-formed completion without a usable choice.
    #[error("Received empty response from LLM")]
    EmptyResponse,
}

impl ApiError {
    /// The most specific human-readable diagnostic available for this error.
    ///
    /// Prefers the text the gateway put in the error body, falling back to the
    /// error's own description.
    pub fn diagnostic(&self) -> String {
        match self {
            ApiError::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            other => other.to_string(),
        }
    }
}

/// The remote LLM gateway as seen by the chat session.
#[async_trait]
pub trait GatewayApi: Send + Sync {
    async fn health(&self) -> Result<HealthStatus, ApiError>;
    async fn providers(&self) -> Result<Vec<String>, ApiError>;
    async fn provider_status(&self, provider: &str) -> Result<ProviderStatus, ApiError>;
    async fn chat_completion(
        &self,
        request: &ChatRequest,
        provider: Option<&str>,
    ) -> Result<ChatResponse, ApiError>;
}

pub fn create_gateway(config: &AppConfig) -> Result<Arc<dyn GatewayApi>, ApiError> {
    let gateway = HttpGateway::new(&config.api_base_url, config.request_timeout())?;
    Ok(Arc::new(gateway))
}
