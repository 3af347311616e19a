use crate::api::types::ErrorBody;
use crate::api::{ApiError, ChatRequest, ChatResponse, GatewayApi, HealthStatus, ProviderStatus};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Client for the gateway's REST API over HTTP.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }

    fn providers_url(&self) -> String {
        format!("{}/providers", self.base_url)
    }

    fn provider_status_url(&self, provider: &str) -> String {
        format!(
            "{}/providers/{}/status",
            self.base_url,
            urlencoding::encode(provider)
        )
    }

    fn chat_completions_url(&self, provider: Option<&str>) -> String {
        let mut url = format!("{}/chat/completions", self.base_url);
        if let Some(provider) = provider {
            url.push_str("?provider=");
            url.push_str(&urlencoding::encode(provider));
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, ApiError> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }
}

/// Turns a non-success response into [`ApiError::Status`], keeping whatever
/// diagnostic text the body carries.
async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        detail: extract_error_detail(&body),
    })
}

/// Picks the most specific message out of an error body: a structured
/// `message` field, else the body itself when it is plain text.
pub(crate) fn extract_error_detail(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(_)) => serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty()),
        Ok(serde_json::Value::String(text)) if !text.trim().is_empty() => Some(text),
        Ok(_) => None,
        Err(_) => Some(body.to_string()),
    }
}

#[async_trait]
impl GatewayApi for HttpGateway {
    async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get_json(self.health_url()).await
    }

    async fn providers(&self) -> Result<Vec<String>, ApiError> {
        self.get_json(self.providers_url()).await
    }

    async fn provider_status(&self, provider: &str) -> Result<ProviderStatus, ApiError> {
        self.get_json(self.provider_status_url(provider)).await
    }

    async fn chat_completion(
        &self,
        request: &ChatRequest,
        provider: Option<&str>,
    ) -> Result<ChatResponse, ApiError> {
        let url = self.chat_completions_url(provider);
        tracing::info!(
            "POST {} ({} messages, provider: {})",
            url,
            request.messages.len(),
            provider.unwrap_or("default")
        );
        let response = self.client.post(url).json(request).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }
}
