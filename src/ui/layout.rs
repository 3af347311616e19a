use crate::ui::transcript;
use gtk4::prelude::{BoxExt, WidgetExt};
use gtk4::{
    Box, Button, DropDown, Label, Orientation, PolicyType, ScrolledWindow, Spinner, StringList,
    TextBuffer, TextView, WrapMode,
};
use webkit6::WebView;

/// Widgets of the main window below the header bar.
pub struct ChatLayout {
    pub root: Box,
    pub banner: adw::Banner,
    pub web_view: WebView,
    pub provider_dropdown: DropDown,
    pub provider_model: StringList,
    pub input_view: TextView,
    pub input_buffer: TextBuffer,
    pub spinner: Spinner,
    pub send_btn: Button,
    pub status_label: Label,
}

/// Builds the error banner, transcript, composer row and status bar.
pub fn create_main_layout() -> ChatLayout {
    let root = Box::new(Orientation::Vertical, 0);

    let banner = adw::Banner::builder()
        .button_label("Dismiss")
        .revealed(false)
        .build();
    root.append(&banner);

    let (web_view, transcript_scroll) = transcript::create_transcript_view();
    root.append(&transcript_scroll);

    // Composer
    let composer = Box::new(Orientation::Horizontal, 6);
    composer.set_margin_start(12);
    composer.set_margin_end(12);
    composer.set_margin_top(6);
    composer.set_margin_bottom(6);

    let provider_model = StringList::new(&[super::DEFAULT_PROVIDER_ITEM]);
    let provider_dropdown = DropDown::builder()
        .model(&provider_model)
        .valign(gtk4::Align::End)
        .tooltip_text("Provider")
        .build();

    let input_buffer = TextBuffer::new(None);
    let input_view = TextView::builder()
        .buffer(&input_buffer)
        .wrap_mode(WrapMode::WordChar)
        .accepts_tab(false)
        .top_margin(6)
        .bottom_margin(6)
        .left_margin(6)
        .right_margin(6)
        .build();
    input_view.add_css_class("card");
    let input_scroll = ScrolledWindow::builder()
        .child(&input_view)
        .hexpand(true)
        .hscrollbar_policy(PolicyType::Never)
        .min_content_height(48)
        .max_content_height(160)
        .propagate_natural_height(true)
        .build();

    let spinner = Spinner::new();
    spinner.set_valign(gtk4::Align::Center);

    let send_btn = Button::builder()
        .label("Send")
        .tooltip_text("Send (Ctrl+Enter)")
        .valign(gtk4::Align::End)
        .build();
    send_btn.add_css_class("suggested-action");

    composer.append(&provider_dropdown);
    composer.append(&input_scroll);
    composer.append(&spinner);
    composer.append(&send_btn);
    root.append(&composer);

    // Status bar
    let status_bar = Box::new(Orientation::Horizontal, 12);
    status_bar.set_margin_start(12);
    status_bar.set_margin_end(12);
    status_bar.set_margin_top(4);
    status_bar.set_margin_bottom(4);
    status_bar.add_css_class("dim-label");

    let status_label = Label::new(Some("Providers: checking..."));
    status_label.set_xalign(0.0);
    status_label.set_hexpand(true);
    status_bar.append(&status_label);
    root.append(&status_bar);

    ChatLayout {
        root,
        banner,
        web_view,
        provider_dropdown,
        provider_model,
        input_view,
        input_buffer,
        spinner,
        send_btn,
        status_label,
    }
}
