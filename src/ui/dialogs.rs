use crate::export::{with_export_extension, write_export};
use adw::prelude::*;
use anyhow::{anyhow, Context};
use gtk4::gio::prelude::FileExt;

const RESPONSE_CANCEL: &str = "cancel";
const RESPONSE_ACCEPT: &str = "accept";

/// Yes/no question with a destructive accept button.
pub async fn confirm(parent: &gtk4::Window, question: &str, accept_label: &str) -> bool {
    let dialog = adw::AlertDialog::new(Some(question), None);
    dialog.add_responses(&[(RESPONSE_CANCEL, "Cancel"), (RESPONSE_ACCEPT, accept_label)]);
    dialog.set_response_appearance(RESPONSE_ACCEPT, adw::ResponseAppearance::Destructive);
    dialog.set_default_response(Some(RESPONSE_CANCEL));
    dialog.set_close_response(RESPONSE_CANCEL);

    dialog.choose_future(Some(parent)).await == RESPONSE_ACCEPT
}

/// Single-line text prompt. `None` if the user cancels.
pub async fn prompt(parent: &gtk4::Window, label: &str) -> Option<String> {
    let dialog = adw::AlertDialog::new(Some(label), None);
    let entry = gtk4::Entry::builder()
        .hexpand(true)
        .activates_default(true)
        .build();
    dialog.set_extra_child(Some(&entry));
    dialog.add_responses(&[(RESPONSE_CANCEL, "Cancel"), (RESPONSE_ACCEPT, "Add")]);
    dialog.set_response_appearance(RESPONSE_ACCEPT, adw::ResponseAppearance::Suggested);
    dialog.set_default_response(Some(RESPONSE_ACCEPT));
    dialog.set_close_response(RESPONSE_CANCEL);

    if dialog.choose_future(Some(parent)).await == RESPONSE_ACCEPT {
        Some(entry.text().to_string())
    } else {
        None
    }
}

/// Asks where to save `contents` and writes it there.
pub async fn save_file(
    parent: &gtk4::Window,
    suggested_name: &str,
    contents: &str,
) -> anyhow::Result<bool> {
    let file_dialog = gtk4::FileDialog::builder()
        .title("Export Chat")
        .accept_label("Export")
        .initial_name(suggested_name)
        .modal(true)
        .build();

    let file = match file_dialog.save_future(Some(parent)).await {
        Ok(file) => file,
        Err(e) if e.matches(gtk4::DialogError::Dismissed) => return Ok(false),
        Err(e) => return Err(anyhow!("File dialog failed: {}", e)),
    };
    let path = file
        .path()
        .context("Selected location is not a local file")?;
    write_export(&with_export_extension(&path), contents)?;
    Ok(true)
}
