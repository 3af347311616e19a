use crate::api;
use crate::config::AppConfig;
use crate::constants::{APP_NAME, DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH};
use crate::controller::ChatController;
use crate::format::ContentTrust;
use crate::session::ChatSession;
use crate::ui::view::GtkChatView;
use crate::ui::{header, layout, settings};
use adw::prelude::*;
use adw::{Application, ApplicationWindow};
use gtk4::{gdk, glib, Orientation};
use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

/// The TextView's own key handler consumes Return in the bubble phase, so the
/// send shortcut has to see the event first.
const SEND_SHORTCUT_PHASE: gtk4::PropagationPhase = gtk4::PropagationPhase::Capture;

/// Ctrl+Enter sends; plain Enter stays a newline.
pub fn is_send_shortcut(keyval: gdk::Key, state: gdk::ModifierType) -> bool {
    state.contains(gdk::ModifierType::CONTROL_MASK)
        && (keyval == gdk::Key::Return || keyval == gdk::Key::KP_Enter)
}

fn spawn<F: Future<Output = ()> + 'static>(future: F) {
    glib::MainContext::default().spawn_local(future);
}

pub fn build_ui(app: &Application, config: AppConfig) {
    let window = ApplicationWindow::builder()
        .application(app)
        .default_width(DEFAULT_WINDOW_WIDTH)
        .default_height(DEFAULT_WINDOW_HEIGHT)
        .title(APP_NAME)
        .build();

    let content_box = gtk4::Box::new(Orientation::Vertical, 0);
    window.set_content(Some(&content_box));

    let (header_bar, view_title, refresh_btn, system_btn, clear_btn, export_btn, settings_btn) =
        header::create_header_bar();
    content_box.append(&header_bar);

    let chat_layout = layout::create_main_layout();
    content_box.append(&chat_layout.root);

    let gateway = match api::create_gateway(&config) {
        Ok(gateway) => gateway,
        Err(e) => {
            tracing::error!("Could not create gateway client: {}", e);
            chat_layout
                .banner
                .set_title(&format!("Could not create gateway client: {}", e));
            chat_layout.banner.set_revealed(true);
            window.present();
            return;
        }
    };
    tracing::info!("Using gateway at {}", config.api_base_url);

    let session = Rc::new(RefCell::new(ChatSession::new(config.initial_settings())));
    let view = Rc::new(GtkChatView::new(
        window.clone().upcast(),
        view_title,
        &chat_layout,
        ContentTrust::from_config(config.trust_message_html),
    ));
    let controller = ChatController::new(session, gateway, view.clone());
    let config = Rc::new(RefCell::new(config));

    // Input text mirrors into the session as it is typed.
    chat_layout.input_buffer.connect_changed(glib::clone!(
        #[strong]
        controller,
        #[strong]
        view,
        move |buf| {
            if view.is_syncing() {
                return;
            }
            let (start, end) = buf.bounds();
            let text = buf.text(&start, &end, false).to_string();
            match controller.session().try_borrow_mut() {
                Ok(mut session) => session.set_input(text),
                Err(_) => tracing::warn!("Session busy, input change not recorded"),
            }
        }
    ));

    chat_layout.send_btn.connect_clicked(glib::clone!(
        #[strong]
        controller,
        move |_| {
            let controller = controller.clone();
            spawn(async move { controller.send_message().await });
        }
    ));

    let key_controller = gtk4::EventControllerKey::new();
    key_controller.set_propagation_phase(SEND_SHORTCUT_PHASE);
    key_controller.connect_key_pressed(glib::clone!(
        #[strong]
        controller,
        move |_, keyval, _keycode, state| {
            if !is_send_shortcut(keyval, state) {
                return glib::Propagation::Proceed;
            }
            let controller = controller.clone();
            spawn(async move { controller.send_message().await });
            glib::Propagation::Stop
        }
    ));
    chat_layout.input_view.add_controller(key_controller);

    chat_layout.provider_dropdown.connect_selected_notify(glib::clone!(
        #[strong]
        controller,
        #[strong]
        view,
        move |dropdown| {
            if view.is_syncing() {
                return;
            }
            let index = dropdown.selected() as usize;
            let provider = if index == 0 {
                None
            } else {
                controller
                    .session()
                    .borrow()
                    .available_providers()
                    .get(index - 1)
                    .cloned()
            };
            tracing::debug!("Provider changed to {:?}", provider);
            controller.update(|s| s.select_provider(provider));
        }
    ));

    chat_layout.banner.connect_button_clicked(glib::clone!(
        #[strong]
        controller,
        move |_| {
            controller.update(|s| s.clear_error());
        }
    ));

    refresh_btn.connect_clicked(glib::clone!(
        #[strong]
        controller,
        move |_| {
            let controller = controller.clone();
            spawn(async move { controller.initialize().await });
        }
    ));

    system_btn.connect_clicked(glib::clone!(
        #[strong]
        controller,
        move |_| {
            let controller = controller.clone();
            spawn(async move { controller.add_system_message().await });
        }
    ));

    clear_btn.connect_clicked(glib::clone!(
        #[strong]
        controller,
        move |_| {
            let controller = controller.clone();
            spawn(async move { controller.clear_chat().await });
        }
    ));

    export_btn.connect_clicked(glib::clone!(
        #[strong]
        controller,
        move |_| {
            let controller = controller.clone();
            spawn(async move { controller.export_chat().await });
        }
    ));

    settings_btn.connect_clicked(glib::clone!(
        #[weak]
        window,
        #[strong]
        controller,
        #[strong]
        config,
        move |_| {
            settings::show_settings(window.upcast_ref(), controller.clone(), config.clone());
        }
    ));

    controller.refresh();
    spawn(async move { controller.initialize().await });

    window.present();
}
