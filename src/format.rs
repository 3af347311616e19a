//! HTML formatting of message content and of the transcript document shown
//! in the WebKit view.

use crate::api::MessageRole;
use crate::session::ChatMessage;
use horrorshow::helper::doctype;
use horrorshow::{html, Raw};
use html_escape::encode_text;
use std::fmt;

/// How much message content is trusted when turned into HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentTrust {
    /// Content is escaped; only line breaks become markup.
    #[default]
    Escape,
    /// Content is inserted as raw HTML.
    TrustedHtml,
}

impl ContentTrust {
    pub fn from_config(trust_message_html: bool) -> Self {
        if trust_message_html {
            ContentTrust::TrustedHtml
        } else {
            ContentTrust::Escape
        }
    }
}

/// HTML that may be inserted into the document verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeHtml(String);

impl SafeHtml {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SafeHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Converts line breaks into `<br>` and marks the result safe to render.
pub fn format_message(content: &str, trust: ContentTrust) -> SafeHtml {
    let normalized = content.replace("\r\n", "\n");
    let body = match trust {
        ContentTrust::Escape => encode_text(&normalized).into_owned(),
        ContentTrust::TrustedHtml => normalized,
    };
    SafeHtml(body.replace('\n', "<br>"))
}

fn role_label(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "You",
        MessageRole::Assistant => "Assistant",
        MessageRole::System => "System",
    }
}

fn metadata_line(message: &ChatMessage) -> Option<String> {
    let meta = message.metadata.as_ref()?;
    let mut parts = Vec::new();
    if let Some(provider) = &meta.provider {
        parts.push(provider.clone());
    }
    if let Some(model) = &meta.model {
        parts.push(model.clone());
    }
    if let Some(total) = meta.usage.and_then(|u| u.total_tokens) {
        parts.push(format!("{} tokens", total));
    }
    if let Some(reason) = &meta.finish_reason {
        parts.push(format!("finish: {}", reason));
    }
    (!parts.is_empty()).then(|| parts.join(" · "))
}

/// Renders the whole conversation as a standalone HTML document.
///
/// With `scroll_to_end` the document jumps to the newest entry once loaded.
pub fn render_transcript(messages: &[ChatMessage], trust: ContentTrust, scroll_to_end: bool) -> String {
    let mut body = String::new();
    for message in messages {
        let time = message.timestamp.format("%H:%M:%S").to_string();
        let content = format_message(&message.content, trust);
        let meta = metadata_line(message).unwrap_or_default();
        let class = format!("message {}", message.role);
        body.push_str(&format!(
            "{}",
            html! {
                div(class=&*class) {
                    div(class="header") {
                        span(class="role") { : role_label(message.role) }
                        span(class="time") { : &*time }
                    }
                    div(class="content") { : Raw(content.as_str()) }
                    @ if !meta.is_empty() {
                        div(class="meta") { : &*meta }
                    }
                }
            }
        ));
    }

    let script = if scroll_to_end {
        "window.onload = function() { window.scrollTo(0, document.body.scrollHeight); };"
    } else {
        ""
    };

    format!(
        "{}",
        html! {
            : doctype::HTML;
            html {
                head {
                    meta(charset="utf-8");
                    meta(http-equiv="Content-Security-Policy",
                         content="default-src 'none'; script-src 'unsafe-inline'; style-src 'unsafe-inline'; img-src data:;");
                    style {
                        : Raw("
                            body { font-family: sans-serif; margin: 0; padding: 16px; background: #fafafa; }
                            .message { max-width: 80%; margin: 8px 0; padding: 10px 14px; border-radius: 10px; }
                            .message.user { margin-left: auto; background: #dbeafe; }
                            .message.assistant { background: #ffffff; box-shadow: 0 1px 3px rgba(0,0,0,0.1); }
                            .message.system { margin: 8px auto; background: #fef3c7; font-style: italic; }
                            .header { display: flex; justify-content: space-between; font-size: 0.8em; color: #666; }
                            .content { margin-top: 4px; line-height: 1.4; word-wrap: break-word; }
                            .meta { margin-top: 6px; font-size: 0.75em; color: #888; }
                            .empty { text-align: center; color: #999; margin-top: 40px; }
                            @media (prefers-color-scheme: dark) {
                                body { background: #1e1e1e; color: #ddd; }
                                .message.user { background: #1e3a5f; }
                                .message.assistant { background: #2a2a2a; }
                                .message.system { background: #3d3413; }
                            }
                        ")
                    }
                    script { : Raw(script) }
                }
                body {
                    @ if messages.is_empty() {
                        div(class="empty") { : "Start a conversation by typing a message below." }
                    } else {
                        : Raw(&body);
                    }
                }
            }
        }
    )
}
