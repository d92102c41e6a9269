// ABOUTME: Invocable actions exposed to the editor host
// ABOUTME: Upload, delete, download over the selection, plus clipboard paste upload

use tracing::error;

use crate::config::Settings;
use crate::host::{Editor, Notifier, Vault};
use crate::i18n::LangPack;
use crate::uploader::{BatchReport, ImageUploader};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Upload,
    Delete,
    Download,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Upload, Action::Delete, Action::Download];

    /// Stable command id
    pub fn id(&self) -> &'static str {
        match self {
            Action::Upload => "upload-image",
            Action::Delete => "delete-image",
            Action::Download => "download-image",
        }
    }

    pub fn title(&self, lang: &LangPack) -> &'static str {
        match self {
            Action::Upload => lang.commands.upload_image,
            Action::Delete => lang.commands.delete_image,
            Action::Download => lang.commands.download_image,
        }
    }

    /// Whether the host should register this command
    pub fn is_enabled(&self, settings: &Settings) -> bool {
        match self {
            Action::Upload => settings.show_upload_button,
            Action::Delete => settings.show_delete_button,
            Action::Download => settings.show_download_button,
        }
    }

    pub fn enabled(settings: &Settings) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|a| a.is_enabled(settings))
            .collect()
    }

    fn failure_text(&self, lang: &LangPack) -> &'static str {
        match self {
            Action::Upload => lang.general.upload_failed,
            Action::Delete => lang.general.delete_failed,
            Action::Download => lang.general.download_failed,
        }
    }
}

/// Run `action` over the editor's selection and deliver its notices.
///
/// `settings` is snapshotted for this one batch. A batch that fails as a whole
/// produces a single failure notice and no partial counts.
pub async fn execute(
    action: Action,
    settings: &Settings,
    lang: &LangPack,
    editor: &mut dyn Editor,
    vault: &dyn Vault,
    notifier: &dyn Notifier,
) -> Option<BatchReport> {
    if editor.selection().is_empty() {
        notifier.notify(lang.general.no_selection);
        return None;
    }

    let uploader = ImageUploader::new(settings.clone(), lang.clone());
    let result = match action {
        Action::Upload => uploader.upload_selection(editor, vault).await,
        Action::Delete => uploader.delete_selection(editor).await,
        Action::Download => uploader.download_selection(editor, vault).await,
    };

    match result {
        Ok(report) => {
            for notice in &report.notices {
                notifier.notify(&notice.message);
            }
            Some(report)
        }
        Err(e) => {
            error!(action = action.id(), error = ?e, "batch aborted");
            let message = match action {
                Action::Download => format!("{}: {:#}", action.failure_text(lang), e),
                _ => action.failure_text(lang).to_string(),
            };
            notifier.notify(&message);
            None
        }
    }
}

/// One item of clipboard data offered by the host on paste
#[derive(Debug, Clone)]
pub struct ClipboardItem {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Upload the first pasted image when clipboard upload is on.
///
/// Returns `true` when the paste was taken over, so the host should not
/// insert the clipboard content itself.
pub async fn handle_paste(
    settings: &Settings,
    lang: &LangPack,
    editor: &mut dyn Editor,
    items: Vec<ClipboardItem>,
    notifier: &dyn Notifier,
) -> bool {
    if !settings.upload_clipboard {
        return false;
    }

    let Some(item) = items
        .into_iter()
        .find(|item| item.mime_type.starts_with("image/"))
    else {
        return false;
    };

    let uploader = ImageUploader::new(settings.clone(), lang.clone());
    if let Err(e) = uploader
        .upload_clipboard(editor, item.bytes, &item.mime_type)
        .await
    {
        error!(error = %e, "clipboard upload failed");
        notifier.notify(&format!("{}: {}", lang.general.upload_failed, e));
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::EN;

    #[test]
    fn test_default_settings_enable_upload_only() {
        let settings = Settings::default();
        assert_eq!(Action::enabled(&settings), vec![Action::Upload]);
    }

    #[test]
    fn test_ids_and_titles() {
        assert_eq!(Action::Download.id(), "download-image");
        assert_eq!(Action::Delete.title(&EN), "Delete from image host");
    }
}
