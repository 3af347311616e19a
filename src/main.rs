use adw::prelude::*;
use adw::Application;
use gtk4::glib;
use llm_chat::config::AppConfig;
use llm_chat::constants::APP_ID;
use llm_chat::ui::window::build_ui;

#[tokio::main]
async fn main() -> glib::ExitCode {
    tracing_subscriber::fmt::init();

    let config = AppConfig::load();
    tracing::info!("Loaded config from {:?}", AppConfig::config_file());

    let app = Application::builder().application_id(APP_ID).build();

    app.connect_activate(move |app| build_ui(app, config.clone()));

    app.run()
}
