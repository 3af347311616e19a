//! Conversation and UI state of a chat session.
//!
//! Every method here is synchronous: the controller performs the remote calls
//! and hands each outcome to the matching `apply_*`/`finish_*` method, so the
//! state is only ever mutated between awaits.

use crate::api::{
    ApiError, ChatRequest, ChatResponse, HealthStatus, Message, MessageRole, ProviderStatus, Usage,
};
use crate::constants::{
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, MAX_TEMPERATURE, MAX_TOKENS_LIMIT, MIN_TEMPERATURE,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

const HEALTH_ERROR: &str = "Failed to check service health";
const PROVIDERS_ERROR: &str = "Failed to load providers";
const SEND_ERROR: &str = "Failed to get response from LLM";

/// Stable identity of a message within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MessageId(u64);

/// Details the gateway reports alongside an assistant reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageMetadata {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub usage: Option<Usage>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
}

/// Completion parameters chosen by the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    model: Option<String>,
    max_tokens: u32,
    temperature: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl Settings {
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Sets the model; blank input means "let the provider decide".
    pub fn set_model(&mut self, model: &str) {
        let model = model.trim();
        self.model = (!model.is_empty()).then(|| model.to_string());
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn set_max_tokens(&mut self, max_tokens: u32) {
        self.max_tokens = max_tokens.clamp(1, MAX_TOKENS_LIMIT);
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = if temperature.is_nan() {
            DEFAULT_TEMPERATURE
        } else {
            temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE)
        };
    }
}

/// A send that has been accepted and is waiting for the gateway.
#[derive(Debug, Clone)]
pub struct PendingSend {
    pub message_id: MessageId,
    /// Input exactly as typed, restored if the send fails.
    pub original_input: String,
    pub request: ChatRequest,
    pub provider: Option<String>,
}

#[derive(Debug)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    next_id: u64,
    input: String,
    is_loading: bool,
    error: Option<String>,
    selected_provider: Option<String>,
    available_providers: Vec<String>,
    provider_statuses: BTreeMap<String, bool>,
    health: HealthStatus,
    settings: Settings,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl ChatSession {
    pub fn new(settings: Settings) -> Self {
        Self {
            messages: Vec::new(),
            next_id: 1,
            input: String::new(),
            is_loading: false,
            error: None,
            selected_provider: None,
            available_providers: Vec::new(),
            provider_statuses: BTreeMap::new(),
            health: HealthStatus::unknown(),
            settings,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected_provider(&self) -> Option<&str> {
        self.selected_provider.as_deref()
    }

    /// Switches the provider used for the next send. `None` routes to the
    /// gateway's default provider.
    pub fn select_provider(&mut self, provider: Option<String>) {
        self.selected_provider = provider.filter(|p| !p.is_empty());
        self.clear_error();
    }

    pub fn available_providers(&self) -> &[String] {
        &self.available_providers
    }

    pub fn provider_statuses(&self) -> &BTreeMap<String, bool> {
        &self.provider_statuses
    }

    pub fn health(&self) -> &HealthStatus {
        &self.health
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Appends a message stamped with the current time. No validation.
    pub fn add_message(&mut self, role: MessageRole, content: impl Into<String>) -> &mut ChatMessage {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id,
            role,
            content: content.into(),
            timestamp: Utc::now(),
            metadata: None,
        });
        let last = self.messages.len() - 1;
        &mut self.messages[last]
    }

    /// The history in the shape the completions endpoint expects.
    pub fn messages_for_api(&self) -> Vec<Message> {
        self.messages
            .iter()
            .map(|m| Message {
                role: m.role,
                content: m.content.clone(),
            })
            .collect()
    }

    pub fn apply_health(&mut self, result: Result<HealthStatus, ApiError>) {
        match result {
            Ok(health) => {
                tracing::debug!(
                    "Gateway health {:?} with {} providers",
                    health.status,
                    health.available_providers
                );
                self.health = health;
                self.clear_error();
            }
            Err(e) => {
                self.handle_error(HEALTH_ERROR, Some(&e));
                self.health = HealthStatus::down();
            }
        }
    }

    /// Stores the provider list and returns the providers whose status
    /// should now be checked.
    pub fn apply_providers(&mut self, result: Result<Vec<String>, ApiError>) -> Vec<String> {
        match result {
            Ok(providers) => {
                tracing::debug!("Loaded {} providers", providers.len());
                self.available_providers = providers;
                self.drop_stale_selection();
                self.clear_error();
                self.available_providers.clone()
            }
            Err(e) => {
                self.handle_error(PROVIDERS_ERROR, Some(&e));
                self.available_providers.clear();
                self.drop_stale_selection();
                Vec::new()
            }
        }
    }

    /// Falls back to the default provider when the selected one is no
    /// longer offered.
    fn drop_stale_selection(&mut self) {
        if let Some(selected) = &self.selected_provider {
            if !self.available_providers.contains(selected) {
                tracing::info!("Provider {} no longer available, using default", selected);
                self.selected_provider = None;
            }
        }
    }

    /// Records the outcome of one provider's status check. A failed check
    /// marks that provider unavailable and is not surfaced as an error.
    pub fn record_provider_status(
        &mut self,
        provider: &str,
        result: Result<ProviderStatus, ApiError>,
    ) {
        let available = match result {
            Ok(status) => status.available,
            Err(e) => {
                tracing::warn!("Status check for provider {} failed: {}", provider, e);
                false
            }
        };
        self.provider_statuses.insert(provider.to_string(), available);
    }

    /// Accepts the current input for sending.
    ///
    /// Returns `None` without touching state when the input is blank or a
    /// send is already in flight.
    pub fn begin_send(&mut self) -> Option<PendingSend> {
        if self.is_loading || self.input.trim().is_empty() {
            return None;
        }

        let original_input = std::mem::take(&mut self.input);
        let message_id = self.add_message(MessageRole::User, original_input.trim()).id;
        let provider = self.selected_provider.clone();
        let request = ChatRequest {
            messages: self.messages_for_api(),
            provider: provider.clone(),
            model: self.settings.model.clone(),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        self.is_loading = true;
        self.clear_error();

        Some(PendingSend {
            message_id,
            original_input,
            request,
            provider,
        })
    }

    /// Applies the gateway's answer to a send started with [`begin_send`].
    ///
    /// [`begin_send`]: ChatSession::begin_send
    pub fn finish_send(&mut self, pending: PendingSend, result: Result<ChatResponse, ApiError>) {
        match result {
            Ok(response) => {
                self.handle_chat_response(response);
            }
            Err(e) => {
                self.handle_error(SEND_ERROR, Some(&e));
                if self.messages.last().map(|m| m.id) == Some(pending.message_id) {
                    self.messages.pop();
                }
                self.input = pending.original_input;
            }
        }
        self.is_loading = false;
    }

    /// Appends the first choice of a completion as an assistant message.
    pub fn handle_chat_response(&mut self, response: ChatResponse) -> Option<MessageId> {
        let ChatResponse {
            model,
            provider,
            choices,
            usage,
            ..
        } = response;

        let Some((reply, finish_reason)) = choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.map(|m| (m, choice.finish_reason)))
        else {
            self.handle_error(&ApiError::EmptyResponse.to_string(), None);
            return None;
        };

        let message = self.add_message(MessageRole::Assistant, reply.content);
        message.metadata = Some(MessageMetadata {
            provider,
            model,
            usage,
            finish_reason,
        });
        Some(message.id)
    }

    /// Discards the whole conversation. Confirmation is the caller's job.
    pub fn clear_chat(&mut self) {
        tracing::info!("Clearing {} messages", self.messages.len());
        self.messages.clear();
        self.clear_error();
    }

    pub fn add_system_message(&mut self, text: &str) -> Option<MessageId> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(self.add_message(MessageRole::System, text).id)
    }

    /// Records `label` combined with the most specific diagnostic available.
    pub fn handle_error(&mut self, label: &str, error: Option<&ApiError>) {
        let message = match error {
            Some(e) => format!("{}: {}", label, e.diagnostic()),
            None => label.to_string(),
        };
        tracing::error!("{}", message);
        self.error = Some(message);
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}
