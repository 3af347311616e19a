//! A desktop chat client for an OpenAI-compatible LLM gateway.
//!
//! The session, controller, API client, formatting and export modules carry
//! no GTK types and are tested on their own; `ui` wires them to widgets.

pub mod api;
pub mod config;
pub mod constants;
pub mod controller;
pub mod export;
pub mod format;
pub mod session;
pub mod ui;
