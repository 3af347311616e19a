//! Application-wide constants for llm-chat.
//!
//! Centralizes defaults and limits so the session, the HTTP client and the UI
//! agree on them.

// ============================================================================
// Application Identity
// ============================================================================

/// GTK Application ID following reverse-DNS convention.
pub const APP_ID: &str = "com.github.llm-chat";

/// Application name displayed in window title.
pub const APP_NAME: &str = "LLM Chat";

/// Directory name used under the user's config directory.
pub const CONFIG_DIR_NAME: &str = "llm-chat";

/// Configuration file name inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.toml";

// ============================================================================
// Window Configuration
// ============================================================================

/// Default window width in pixels.
pub const DEFAULT_WINDOW_WIDTH: i32 = 960;

/// Default window height in pixels.
pub const DEFAULT_WINDOW_HEIGHT: i32 = 720;

// ============================================================================
// Gateway Client
// ============================================================================

/// Base URL of the LLM gateway API.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api/v1/llm";

/// HTTP request timeout for gateway calls, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

// ============================================================================
// Completion Settings
// ============================================================================

/// Default `max_tokens` sent with each completion request.
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Upper bound accepted for `max_tokens`.
pub const MAX_TOKENS_LIMIT: u32 = 32_768;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Lowest temperature accepted by the gateway's providers.
pub const MIN_TEMPERATURE: f64 = 0.0;

/// Highest temperature accepted by the gateway's providers.
pub const MAX_TEMPERATURE: f64 = 2.0;

/// Provider label used when no explicit provider is selected.
pub const DEFAULT_PROVIDER_LABEL: &str = "default";

// ============================================================================
// Export
// ============================================================================

/// Prefix of exported transcript file names.
pub const EXPORT_FILE_PREFIX: &str = "llm-chat-";

/// Extension of exported transcript file names.
pub const EXPORT_FILE_EXTENSION: &str = "json";
