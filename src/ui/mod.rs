//! UI module containing all user interface components and signal handlers.

pub mod dialogs;
pub mod header;
pub mod layout;
pub mod settings;
pub mod transcript;
pub mod view;
pub mod window;

/// First entry of the provider drop-down; routes to the gateway default.
pub const DEFAULT_PROVIDER_ITEM: &str = "Default provider";
