use crate::api::ServiceStatus;
use crate::controller::ChatView;
use crate::format::{render_transcript, ContentTrust};
use crate::session::ChatSession;
use crate::ui::layout::ChatLayout;
use crate::ui::{dialogs, transcript, DEFAULT_PROVIDER_ITEM};
use adw::prelude::*;
use adw::WindowTitle;
use async_trait::async_trait;
use gtk4::{Button, DropDown, Label, Spinner, StringList, TextBuffer};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use webkit6::prelude::*;
use webkit6::WebView;

/// GTK implementation of [`ChatView`].
pub struct GtkChatView {
    window: gtk4::Window,
    title: WindowTitle,
    banner: adw::Banner,
    web_view: WebView,
    provider_dropdown: DropDown,
    provider_model: StringList,
    input_buffer: TextBuffer,
    spinner: Spinner,
    send_btn: Button,
    status_label: Label,
    trust: ContentTrust,
    /// Set while `render` pushes state into widgets, so their change
    /// handlers do not write it back.
    syncing: Cell<bool>,
    shown_transcript: RefCell<String>,
    shown_providers: RefCell<Vec<String>>,
}

impl GtkChatView {
    pub fn new(window: gtk4::Window, title: WindowTitle, layout: &ChatLayout, trust: ContentTrust) -> Self {
        Self {
            window,
            title,
            banner: layout.banner.clone(),
            web_view: layout.web_view.clone(),
            provider_dropdown: layout.provider_dropdown.clone(),
            provider_model: layout.provider_model.clone(),
            input_buffer: layout.input_buffer.clone(),
            spinner: layout.spinner.clone(),
            send_btn: layout.send_btn.clone(),
            status_label: layout.status_label.clone(),
            trust,
            syncing: Cell::new(false),
            shown_transcript: RefCell::new(String::new()),
            shown_providers: RefCell::new(Vec::new()),
        }
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.get()
    }

    fn render_health(&self, session: &ChatSession) {
        let health = session.health();
        let status = match health.status {
            ServiceStatus::Up => "UP",
            ServiceStatus::Down => "DOWN",
            ServiceStatus::Unknown => "UNKNOWN",
        };
        self.title.set_subtitle(&format!(
            "Gateway: {} · {} provider(s) available",
            status, health.available_providers
        ));
    }

    fn render_error(&self, session: &ChatSession) {
        match session.error() {
            Some(error) => {
                self.banner.set_title(error);
                self.banner.set_revealed(true);
            }
            None => self.banner.set_revealed(false),
        }
    }

    fn render_messages(&self, session: &ChatSession) {
        let html = render_transcript(session.messages(), self.trust, true);
        if *self.shown_transcript.borrow() != html {
            self.web_view.load_html(&html, None::<&str>);
            *self.shown_transcript.borrow_mut() = html;
        }
    }

    fn render_providers(&self, session: &ChatSession) {
        let providers = session.available_providers();
        if self.shown_providers.borrow().as_slice() != providers {
            let mut items: Vec<&str> = vec![DEFAULT_PROVIDER_ITEM];
            items.extend(providers.iter().map(String::as_str));
            self.provider_model
                .splice(0, self.provider_model.n_items(), &items);
            *self.shown_providers.borrow_mut() = providers.to_vec();
        }

        let selected = session
            .selected_provider()
            .and_then(|p| providers.iter().position(|known| known == p))
            .map(|index| index as u32 + 1)
            .unwrap_or(0);
        if self.provider_dropdown.selected() != selected {
            self.provider_dropdown.set_selected(selected);
        }

        self.status_label
            .set_text(&provider_status_text(session.provider_statuses()));
    }

    fn render_composer(&self, session: &ChatSession) {
        let (start, end) = self.input_buffer.bounds();
        if self.input_buffer.text(&start, &end, false).as_str() != session.input() {
            self.input_buffer.set_text(session.input());
        }

        let loading = session.is_loading();
        self.send_btn.set_sensitive(!loading);
        if loading {
            self.spinner.start();
        } else {
            self.spinner.stop();
        }
    }
}

/// `openai: available · azure: unavailable`
pub fn provider_status_text(statuses: &BTreeMap<String, bool>) -> String {
    if statuses.is_empty() {
        return "Providers: none reported".to_string();
    }
    statuses
        .iter()
        .map(|(provider, available)| {
            let state = if *available { "available" } else { "unavailable" };
            format!("{}: {}", provider, state)
        })
        .collect::<Vec<_>>()
        .join(" · ")
}

#[async_trait(?Send)]
impl ChatView for GtkChatView {
    fn render(&self, session: &ChatSession) {
        self.syncing.set(true);
        self.render_health(session);
        self.render_error(session);
        self.render_messages(session);
        self.render_providers(session);
        self.render_composer(session);
        self.syncing.set(false);
    }

    fn scroll_to_bottom(&self) {
        transcript::scroll_to_end(&self.web_view);
    }

    async fn confirm(&self, question: &str) -> bool {
        dialogs::confirm(&self.window, question, "Clear").await
    }

    async fn prompt(&self, label: &str) -> Option<String> {
        dialogs::prompt(&self.window, label).await
    }

    async fn save_file(&self, suggested_name: &str, contents: &str) -> anyhow::Result<bool> {
        dialogs::save_file(&self.window, suggested_name, contents).await
    }
}
