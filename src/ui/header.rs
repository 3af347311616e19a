use crate::constants::APP_NAME;
use adw::{HeaderBar, WindowTitle};
use gtk4::prelude::{BoxExt, WidgetExt};
use gtk4::{Box, Button, Orientation};

/// Creates the header bar: health indicator in the title, conversation
/// actions on the left, settings on the right.
pub fn create_header_bar() -> (
    HeaderBar,
    WindowTitle,
    Button, // Refresh status
    Button, // Add system message
    Button, // Clear chat
    Button, // Export chat
    Button, // Settings
) {
    let header_bar = HeaderBar::new();
    let view_title = WindowTitle::new(APP_NAME, "Gateway: checking...");
    header_bar.set_title_widget(Some(&view_title));

    let left_box = Box::new(Orientation::Horizontal, 0);
    left_box.add_css_class("linked");

    let system_btn = Button::builder()
        .icon_name("list-add-symbolic")
        .tooltip_text("Add System Message")
        .build();
    let clear_btn = Button::builder()
        .icon_name("user-trash-symbolic")
        .tooltip_text("Clear Chat")
        .build();
    let export_btn = Button::builder()
        .icon_name("document-save-symbolic")
        .tooltip_text("Export Chat")
        .build();

    left_box.append(&system_btn);
    left_box.append(&clear_btn);
    left_box.append(&export_btn);
    header_bar.pack_start(&left_box);

    let settings_btn = Button::builder()
        .icon_name("emblem-system-symbolic")
        .tooltip_text("Settings")
        .build();
    let refresh_btn = Button::builder()
        .icon_name("view-refresh-symbolic")
        .tooltip_text("Refresh Gateway Status")
        .build();

    header_bar.pack_end(&settings_btn);
    header_bar.pack_end(&refresh_btn);

    (
        header_bar,
        view_title,
        refresh_btn,
        system_btn,
        clear_btn,
        export_btn,
        settings_btn,
    )
}
