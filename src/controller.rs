//! Async orchestration between the session state, the gateway and the view.
//!
//! The controller owns no state of its own. Each operation reads what it
//! needs from the session, releases the borrow, awaits the gateway or the
//! user, then applies the outcome in one short mutable borrow.

use crate::api::GatewayApi;
use crate::export::{export_file_name, ChatExport};
use crate::session::ChatSession;
use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

const CLEAR_CHAT_QUESTION: &str = "Are you sure you want to clear the chat?";
const SYSTEM_MESSAGE_PROMPT: &str = "Enter system message:";

/// The rendering surface the controller drives.
#[async_trait(?Send)]
pub trait ChatView {
    /// Redraws everything derived from the session.
    fn render(&self, session: &ChatSession);
    /// Brings the newest transcript entry into view.
    fn scroll_to_bottom(&self);
    /// Asks a yes/no question; `false` when the user declines.
    async fn confirm(&self, question: &str) -> bool;
    /// Asks for free text; `None` when the user cancels.
    async fn prompt(&self, label: &str) -> Option<String>;
    /// Offers `contents` as a file download. Returns `false` if the user
    /// cancelled the save.
    async fn save_file(&self, suggested_name: &str, contents: &str) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct ChatController {
    session: Rc<RefCell<ChatSession>>,
    api: Arc<dyn GatewayApi>,
    view: Rc<dyn ChatView>,
}

impl ChatController {
    pub fn new(
        session: Rc<RefCell<ChatSession>>,
        api: Arc<dyn GatewayApi>,
        view: Rc<dyn ChatView>,
    ) -> Self {
        Self { session, api, view }
    }

    pub fn session(&self) -> &Rc<RefCell<ChatSession>> {
        &self.session
    }

    pub fn refresh(&self) {
        let session = self.session.borrow();
        self.view.render(&session);
    }

    /// Runs a synchronous state change and redraws.
    pub fn update(&self, f: impl FnOnce(&mut ChatSession)) {
        f(&mut self.session.borrow_mut());
        self.refresh();
    }

    /// Health check and provider discovery, concurrently.
    pub async fn initialize(&self) {
        tracing::info!("Initializing chat session");
        futures::join!(self.check_health(), self.load_providers());
    }

    pub async fn check_health(&self) {
        let result = self.api.health().await;
        self.update(|s| s.apply_health(result));
    }

    pub async fn load_providers(&self) {
        let result = self.api.providers().await;
        let to_check = self.session.borrow_mut().apply_providers(result);
        self.refresh();
        if !to_check.is_empty() {
            self.check_statuses_of(&to_check).await;
        }
    }

    pub async fn check_provider_statuses(&self) {
        let providers = self.session.borrow().available_providers().to_vec();
        self.check_statuses_of(&providers).await;
    }

    async fn check_statuses_of(&self, providers: &[String]) {
        let checks = providers.iter().map(|provider| async move {
            let result = self.api.provider_status(provider).await;
            self.update(|s| s.record_provider_status(provider, result));
        });
        join_all(checks).await;
    }

    /// Sends the current input. Ignored while another send is in flight.
    pub async fn send_message(&self) {
        let pending = self.session.borrow_mut().begin_send();
        let Some(pending) = pending else {
            return;
        };
        self.refresh();

        let result = self
            .api
            .chat_completion(&pending.request, pending.provider.as_deref())
            .await;

        self.update(|s| s.finish_send(pending, result));
        self.view.scroll_to_bottom();
    }

    pub async fn clear_chat(&self) {
        if self.view.confirm(CLEAR_CHAT_QUESTION).await {
            self.update(|s| s.clear_chat());
        }
    }

    pub async fn add_system_message(&self) {
        let Some(text) = self.view.prompt(SYSTEM_MESSAGE_PROMPT).await else {
            return;
        };
        let added = self.session.borrow_mut().add_system_message(&text);
        if added.is_some() {
            self.refresh();
            self.view.scroll_to_bottom();
        }
    }

    pub async fn export_chat(&self) {
        let now = Utc::now();
        let document = {
            let session = self.session.borrow();
            let json = ChatExport::from_session(&session, now).to_pretty_json();
            json
        };

        let outcome = match document {
            Ok(json) => self.view.save_file(&export_file_name(now), &json).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(true) => {}
            Ok(false) => tracing::debug!("Export cancelled"),
            Err(e) => {
                tracing::error!("Export failed: {:#}", e);
                let message = format!("Failed to export chat: {:#}", e);
                self.update(|s| s.handle_error(&message, None));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        ApiError, ChatRequest, ChatResponse, Choice, HealthStatus, Message, MessageRole,
        ProviderStatus, ServiceStatus,
    };
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct FakeGateway {
        health: Mutex<Option<Result<HealthStatus, ApiError>>>,
        providers: Mutex<Option<Result<Vec<String>, ApiError>>>,
        /// provider -> (delay, availability); `None` and missing providers
        /// fail, the former after the delay.
        statuses: HashMap<String, (u64, Option<bool>)>,
        completions: Mutex<VecDeque<Result<ChatResponse, ApiError>>>,
        requests: Mutex<Vec<(ChatRequest, Option<String>)>>,
    }

    fn down() -> ApiError {
        ApiError::Status {
            status: 503,
            detail: None,
        }
    }

    #[async_trait]
    impl GatewayApi for FakeGateway {
        async fn health(&self) -> Result<HealthStatus, ApiError> {
            self.health.lock().unwrap().take().unwrap_or_else(|| Err(down()))
        }

        async fn providers(&self) -> Result<Vec<String>, ApiError> {
            self.providers.lock().unwrap().take().unwrap_or_else(|| Err(down()))
        }

        async fn provider_status(&self, provider: &str) -> Result<ProviderStatus, ApiError> {
            let Some(&(delay_ms, available)) = self.statuses.get(provider) else {
                return Err(down());
            };
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            match available {
                Some(available) => Ok(ProviderStatus {
                    provider: Some(provider.to_string()),
                    available,
                }),
                None => Err(down()),
            }
        }

        async fn chat_completion(
            &self,
            request: &ChatRequest,
            provider: Option<&str>,
        ) -> Result<ChatResponse, ApiError> {
            self.requests
                .lock()
                .unwrap()
                .push((request.clone(), provider.map(str::to_string)));
            self.completions
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(down()))
        }
    }

    #[derive(Default)]
    struct FakeView {
        renders: RefCell<usize>,
        scrolls: RefCell<usize>,
        confirm_answer: bool,
        prompt_answer: Option<String>,
        saved: RefCell<Vec<(String, String)>>,
    }

    #[async_trait(?Send)]
    impl ChatView for FakeView {
        fn render(&self, _session: &ChatSession) {
            *self.renders.borrow_mut() += 1;
        }

        fn scroll_to_bottom(&self) {
            *self.scrolls.borrow_mut() += 1;
        }

        async fn confirm(&self, _question: &str) -> bool {
            self.confirm_answer
        }

        async fn prompt(&self, _label: &str) -> Option<String> {
            self.prompt_answer.clone()
        }

        async fn save_file(&self, suggested_name: &str, contents: &str) -> anyhow::Result<bool> {
            self.saved
                .borrow_mut()
                .push((suggested_name.to_string(), contents.to_string()));
            Ok(true)
        }
    }

    fn reply(content: &str) -> ChatResponse {
        ChatResponse {
            model: Some("gpt-4o".to_string()),
            provider: Some("openai".to_string()),
            choices: vec![Choice {
                index: Some(0),
                message: Some(Message {
                    role: MessageRole::Assistant,
                    content: content.to_string(),
                }),
                finish_reason: Some("stop".to_string()),
            }],
            ..ChatResponse::default()
        }
    }

    fn controller(gateway: FakeGateway, view: FakeView) -> (ChatController, Rc<FakeView>, Arc<FakeGateway>) {
        let gateway = Arc::new(gateway);
        let view = Rc::new(view);
        let controller = ChatController::new(
            Rc::new(RefCell::new(ChatSession::default())),
            gateway.clone(),
            view.clone(),
        );
        (controller, view, gateway)
    }

    #[tokio::test]
    async fn test_initialize_loads_health_providers_and_statuses() {
        let gateway = FakeGateway {
            health: Mutex::new(Some(Ok(HealthStatus {
                status: ServiceStatus::Up,
                available_providers: 2,
                providers: vec!["a".to_string(), "b".to_string()],
            }))),
            providers: Mutex::new(Some(Ok(vec!["a".to_string(), "b".to_string()]))),
            statuses: HashMap::from([
                ("a".to_string(), (0, Some(true))),
                ("b".to_string(), (0, Some(false))),
            ]),
            ..FakeGateway::default()
        };
        let (controller, view, _) = controller(gateway, FakeView::default());

        controller.initialize().await;

        let session = controller.session().borrow();
        assert_eq!(session.health().status, ServiceStatus::Up);
        assert_eq!(session.available_providers(), ["a", "b"]);
        assert_eq!(session.provider_statuses().get("a"), Some(&true));
        assert_eq!(session.provider_statuses().get("b"), Some(&false));
        assert!(session.error().is_none());
        assert!(*view.renders.borrow() >= 4);
    }

    #[tokio::test]
    async fn test_initialize_with_gateway_down() {
        let (controller, _, _) = controller(FakeGateway::default(), FakeView::default());
        controller.initialize().await;

        let session = controller.session().borrow();
        assert_eq!(session.health(), &HealthStatus::down());
        assert!(session.available_providers().is_empty());
        assert!(session.provider_statuses().is_empty());
        assert!(session.error().is_some());
    }

    #[tokio::test]
    async fn test_provider_statuses_independent_of_completion_order() {
        // "a" answers late and available, "b" fails immediately.
        let gateway = FakeGateway {
            statuses: HashMap::from([("a".to_string(), (20, Some(true)))]),
            ..FakeGateway::default()
        };
        let (controller, _, _) = controller(gateway, FakeView::default());
        controller.update(|s| {
            s.apply_providers(Ok(vec!["a".to_string(), "b".to_string()]));
        });

        controller.check_provider_statuses().await;

        let session = controller.session().borrow();
        assert_eq!(session.provider_statuses().len(), 2);
        assert_eq!(session.provider_statuses().get("a"), Some(&true));
        assert_eq!(session.provider_statuses().get("b"), Some(&false));
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn test_provider_statuses_late_failure_after_early_success() {
        // "a" answers immediately, "b" fails after a delay.
        let gateway = FakeGateway {
            statuses: HashMap::from([
                ("a".to_string(), (0, Some(true))),
                ("b".to_string(), (20, None)),
            ]),
            ..FakeGateway::default()
        };
        let (controller, _, _) = controller(gateway, FakeView::default());
        controller.update(|s| {
            s.apply_providers(Ok(vec!["a".to_string(), "b".to_string()]));
        });

        controller.check_provider_statuses().await;

        let session = controller.session().borrow();
        assert_eq!(session.provider_statuses().len(), 2);
        assert_eq!(session.provider_statuses().get("a"), Some(&true));
        assert_eq!(session.provider_statuses().get("b"), Some(&false));
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn test_send_message_success() {
        let gateway = FakeGateway {
            completions: Mutex::new(VecDeque::from([Ok(reply("hi"))])),
            ..FakeGateway::default()
        };
        let (controller, view, gateway) = controller(gateway, FakeView::default());
        controller.update(|s| {
            s.select_provider(Some("openai".to_string()));
            s.set_input("hello");
        });

        controller.send_message().await;

        {
            let session = controller.session().borrow();
            assert!(!session.is_loading());
            assert_eq!(session.messages().len(), 2);
            assert_eq!(session.messages()[1].content, "hi");
            assert_eq!(session.input(), "");
        }
        let requests = gateway.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0.messages.len(), 1);
        assert_eq!(requests[0].1.as_deref(), Some("openai"));
        assert_eq!(*view.scrolls.borrow(), 1);
    }

    #[tokio::test]
    async fn test_send_message_failure_restores_input() {
        let (controller, view, _) = controller(FakeGateway::default(), FakeView::default());
        controller.update(|s| s.set_input("hello\n"));

        controller.send_message().await;

        let session = controller.session().borrow();
        assert!(!session.is_loading());
        assert!(session.messages().is_empty());
        assert_eq!(session.input(), "hello\n");
        assert_eq!(
            session.error(),
            Some("Failed to get response from LLM: gateway returned status 503")
        );
        assert_eq!(*view.scrolls.borrow(), 1);
    }

    #[tokio::test]
    async fn test_send_message_blank_input_is_noop() {
        let (controller, view, gateway) = controller(FakeGateway::default(), FakeView::default());
        controller.update(|s| s.set_input("  "));
        controller.send_message().await;

        assert!(gateway.requests.lock().unwrap().is_empty());
        assert_eq!(*view.scrolls.borrow(), 0);
    }

    #[tokio::test]
    async fn test_clear_chat_respects_confirmation() {
        let (declined, _, _) = controller(FakeGateway::default(), FakeView::default());
        declined.update(|s| {
            s.add_message(MessageRole::User, "keep me");
        });
        declined.clear_chat().await;
        assert_eq!(declined.session().borrow().messages().len(), 1);

        let view = FakeView {
            confirm_answer: true,
            ..FakeView::default()
        };
        let (confirmed, _, _) = controller(FakeGateway::default(), view);
        confirmed.update(|s| {
            s.add_message(MessageRole::User, "drop me");
            s.handle_error("old error", None);
        });
        confirmed.clear_chat().await;
        let session = confirmed.session().borrow();
        assert!(session.messages().is_empty());
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn test_add_system_message_from_prompt() {
        let view = FakeView {
            prompt_answer: Some("  You are terse. ".to_string()),
            ..FakeView::default()
        };
        let (controller, _, _) = controller(FakeGateway::default(), view);
        controller.add_system_message().await;

        let session = controller.session().borrow();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].role, MessageRole::System);
        assert_eq!(session.messages()[0].content, "You are terse.");
    }

    #[tokio::test]
    async fn test_add_system_message_cancelled() {
        let (controller, _, _) = controller(FakeGateway::default(), FakeView::default());
        controller.add_system_message().await;
        assert!(controller.session().borrow().messages().is_empty());
    }

    #[tokio::test]
    async fn test_export_chat_offers_named_json() {
        let (controller, view, _) = controller(FakeGateway::default(), FakeView::default());
        controller.export_chat().await;

        let saved = view.saved.borrow();
        assert_eq!(saved.len(), 1);
        let (name, contents) = &saved[0];
        assert!(name.starts_with("llm-chat-"));
        assert!(name.ends_with(".json"));
        assert!(!name.contains(':'));
        let value: serde_json::Value = serde_json::from_str(contents).unwrap();
        assert_eq!(value["provider"], "default");
        assert!(value["messages"].as_array().unwrap().is_empty());
    }
}
