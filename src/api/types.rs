//! Wire types of the gateway's REST API.

use crate::api::Message;
use serde::{Deserialize, Deserializer, Serialize};

/// The gateway serializes absent collections and strings as `null` rather
/// than omitting them.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceStatus {
    Up,
    Down,
    #[serde(other)]
    Unknown,
}

/// Aggregate gateway health as returned by `GET /health`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: ServiceStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub available_providers: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub providers: Vec<String>,
}

impl HealthStatus {
    /// Shown before the first health check completes.
    pub fn unknown() -> Self {
        Self {
            status: ServiceStatus::Unknown,
            available_providers: 0,
            providers: Vec::new(),
        }
    }

    /// Substituted when the health check itself fails.
    pub fn down() -> Self {
        Self {
            status: ServiceStatus::Down,
            available_providers: 0,
            providers: Vec::new(),
        }
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self::unknown()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProviderStatus {
    #[serde(default)]
    pub provider: Option<String>,
    pub available: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: Option<u32>,
    #[serde(default)]
    pub completion_tokens: Option<u32>,
    #[serde(default)]
    pub total_tokens: Option<u32>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Choice {
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// Error body produced by the gateway's exception handler.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MessageRole;
    use serde_json::json;

    #[test]
    fn test_health_status_parses_gateway_shape() {
        let health: HealthStatus = serde_json::from_value(json!({
            "status": "UP",
            "availableProviders": 2,
            "providers": ["openai", "azure"]
        }))
        .unwrap();
        assert_eq!(health.status, ServiceStatus::Up);
        assert_eq!(health.available_providers, 2);
        assert_eq!(health.providers, vec!["openai", "azure"]);
    }

    #[test]
    fn test_unrecognised_status_is_unknown() {
        let health: HealthStatus =
            serde_json::from_value(json!({ "status": "DEGRADED" })).unwrap();
        assert_eq!(health.status, ServiceStatus::Unknown);
        assert!(health.providers.is_empty());
    }

    #[test]
    fn test_request_omits_unset_provider_and_model() {
        let request = ChatRequest {
            messages: vec![Message {
                role: MessageRole::User,
                content: "hello".to_string(),
            }],
            provider: None,
            model: None,
            max_tokens: 500,
            temperature: 0.7,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "messages": [{ "role": "user", "content": "hello" }],
                "max_tokens": 500,
                "temperature": 0.7
            })
        );
    }

    #[test]
    fn test_request_includes_selected_provider_and_model() {
        let request = ChatRequest {
            messages: Vec::new(),
            provider: Some("openai".to_string()),
            model: Some("gpt-4o".to_string()),
            max_tokens: 100,
            temperature: 1.0,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["provider"], "openai");
        assert_eq!(value["model"], "gpt-4o");
    }

    #[test]
    fn test_chat_response_parses_full_completion() {
        let response: ChatResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1700000000,
            "model": "gpt-4o",
            "provider": "openai",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": "hi" },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4 },
            "system_fingerprint": "fp"
        }))
        .unwrap();
        assert_eq!(response.choices.len(), 1);
        assert_eq!(response.choices[0].finish_reason.as_deref(), Some("stop"));
        assert_eq!(response.usage.unwrap().total_tokens, Some(4));
    }

    #[test]
    fn test_chat_response_without_choices() {
        let response: ChatResponse = serde_json::from_value(json!({ "model": "m" })).unwrap();
        assert!(response.choices.is_empty());
    }

    #[test]
    fn test_chat_response_with_null_fields() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"id":null,"object":null,"created":null,"model":null,"provider":null,
                "choices":null,"usage":null,"system_fingerprint":null}"#,
        )
        .unwrap();
        assert!(response.choices.is_empty());
        assert!(response.usage.is_none());
    }

    #[test]
    fn test_choice_with_null_content() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": null },
                "finish_reason": null
            }]
        }))
        .unwrap();
        let message = response.choices[0].message.as_ref().unwrap();
        assert_eq!(message.content, "");
    }

    #[test]
    fn test_health_status_with_null_providers() {
        let health: HealthStatus = serde_json::from_value(json!({
            "status": "DOWN",
            "availableProviders": null,
            "providers": null
        }))
        .unwrap();
        assert_eq!(health, HealthStatus::down());
    }
}
