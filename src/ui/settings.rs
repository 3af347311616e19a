use crate::config::AppConfig;
use crate::constants::{MAX_TEMPERATURE, MAX_TOKENS_LIMIT, MIN_TEMPERATURE};
use crate::controller::ChatController;
use adw::prelude::*;
use adw::{EntryRow, PreferencesGroup, PreferencesPage, PreferencesWindow, SpinRow, SwitchRow};
use gtk4::glib;
use std::cell::RefCell;
use std::rc::Rc;

/// Shows the completion settings. Changes apply to the session when the
/// window closes; "Remember as defaults" also writes them to the config file.
pub fn show_settings(
    parent: &gtk4::Window,
    controller: ChatController,
    config: Rc<RefCell<AppConfig>>,
) {
    let window = PreferencesWindow::builder()
        .transient_for(parent)
        .modal(true)
        .title("Settings")
        .default_width(480)
        .build();

    let page = PreferencesPage::new();
    page.set_title("Completion");
    page.set_icon_name(Some("preferences-system-symbolic"));
    window.add(&page);

    let group = PreferencesGroup::new();
    group.set_title("Request Parameters");
    group.set_description(Some("Sent with every chat completion request"));
    page.add(&group);

    let settings = controller.session().borrow().settings().clone();

    let model_row = EntryRow::builder()
        .title("Model (empty for provider default)")
        .build();
    model_row.set_text(settings.model().unwrap_or(""));
    group.add(&model_row);

    let max_tokens_row = SpinRow::with_range(1.0, MAX_TOKENS_LIMIT as f64, 50.0);
    max_tokens_row.set_title("Max Tokens");
    max_tokens_row.set_value(settings.max_tokens() as f64);
    group.add(&max_tokens_row);

    let temperature_row = SpinRow::with_range(MIN_TEMPERATURE, MAX_TEMPERATURE, 0.1);
    temperature_row.set_title("Temperature");
    temperature_row.set_digits(1);
    temperature_row.set_value(settings.temperature());
    group.add(&temperature_row);

    let defaults_group = PreferencesGroup::new();
    page.add(&defaults_group);
    let remember_row = SwitchRow::builder()
        .title("Remember as defaults")
        .subtitle("Use these values for new sessions")
        .active(false)
        .build();
    defaults_group.add(&remember_row);

    window.connect_close_request(glib::clone!(
        #[strong]
        controller,
        #[strong]
        config,
        #[strong]
        model_row,
        #[strong]
        max_tokens_row,
        #[strong]
        temperature_row,
        #[strong]
        remember_row,
        move |_| {
            let model = model_row.text().to_string();
            let max_tokens = max_tokens_row.value().round() as u32;
            let temperature = temperature_row.value();

            controller.update(|s| {
                let settings = s.settings_mut();
                settings.set_model(&model);
                settings.set_max_tokens(max_tokens);
                settings.set_temperature(temperature);
            });

            if remember_row.is_active() {
                let settings = controller.session().borrow().settings().clone();
                let mut config = config.borrow_mut();
                config.default_model = settings.model().map(str::to_string);
                config.default_max_tokens = settings.max_tokens();
                config.default_temperature = settings.temperature();
                if let Err(e) = config.save() {
                    tracing::error!("Failed to save config: {:#}", e);
                }
            }

            glib::Propagation::Proceed
        }
    ));

    window.present();
}
