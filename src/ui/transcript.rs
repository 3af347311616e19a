use gtk4::gio;
use gtk4::ScrolledWindow;
use webkit6::prelude::*;
use webkit6::WebView;

const SCROLL_TO_END_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// Creates the WebKit view that shows the rendered conversation.
pub fn create_transcript_view() -> (WebView, ScrolledWindow) {
    let web_view = WebView::new();
    if let Some(settings) = webkit6::prelude::WebViewExt::settings(&web_view) {
        settings.set_enable_developer_extras(false);
        settings.set_enable_javascript(true);
    }
    let transcript_scroll = ScrolledWindow::builder()
        .child(&web_view)
        .hexpand(true)
        .vexpand(true)
        .build();
    (web_view, transcript_scroll)
}

pub fn scroll_to_end(web_view: &WebView) {
    web_view.evaluate_javascript(
        SCROLL_TO_END_SCRIPT,
        None,
        None,
        None::<&gio::Cancellable>,
        |result| {
            if let Err(e) = result {
                tracing::debug!("Transcript scroll failed: {}", e);
            }
        },
    );
}
