use crate::constants::{DEFAULT_PROVIDER_LABEL, EXPORT_FILE_EXTENSION, EXPORT_FILE_PREFIX};
use crate::session::{ChatMessage, ChatSession, Settings};
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Snapshot of a conversation written by "Export".
#[derive(Debug, Serialize)]
pub struct ChatExport<'a> {
    pub timestamp: String,
    pub provider: &'a str,
    pub settings: &'a Settings,
    pub messages: &'a [ChatMessage],
}

impl<'a> ChatExport<'a> {
    pub fn from_session(session: &'a ChatSession, now: DateTime<Utc>) -> Self {
        Self {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            provider: session.selected_provider().unwrap_or(DEFAULT_PROVIDER_LABEL),
            settings: session.settings(),
            messages: session.messages(),
        }
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize chat export")
    }
}

/// `llm-chat-2024-05-01T12-30-45.json`: ISO-8601 to the second, with colons
/// replaced so the name is valid on every filesystem.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    let stamp = now.format("%Y-%m-%dT%H:%M:%S").to_string().replace(':', "-");
    format!("{}{}.{}", EXPORT_FILE_PREFIX, stamp, EXPORT_FILE_EXTENSION)
}

/// Appends the `.json` extension when the chosen path lacks it.
///
/// The save dialog only confirmed overwriting the path it returned, so an
/// existing file under the extended name keeps the path as chosen.
pub fn with_export_extension(path: &Path) -> PathBuf {
    if path
        .extension()
        .is_some_and(|ext| ext == EXPORT_FILE_EXTENSION)
    {
        return path.to_path_buf();
    }
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(EXPORT_FILE_EXTENSION);
    let extended = path.with_file_name(name);
    if extended.exists() {
        path.to_path_buf()
    } else {
        extended
    }
}

/// Writes the export through a temporary file in the target directory and an
/// atomic rename. The temporary file is removed if any step fails.
pub fn write_export(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {:?}", dir))?;
    file.write_all(contents.as_bytes())
        .with_context(|| "Failed to write export to temporary file")?;
    file.as_file()
        .sync_all()
        .with_context(|| "Failed to sync temporary file")?;

    file.persist(path)
        .with_context(|| format!("Failed to move temporary file to {:?}", path))?;

    tracing::info!("Exported chat to {:?}", path);
    Ok(())
}
