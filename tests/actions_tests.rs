// ABOUTME: Tests for the host-facing actions and paste handling
// ABOUTME: Uses a recording notifier to check what the user would see

use lsky_uploader::actions::{execute, handle_paste, Action, ClipboardItem};
use lsky_uploader::config::Settings;
use lsky_uploader::editor::DocumentEditor;
use lsky_uploader::host::{Cursor, Editor, Notifier};
use lsky_uploader::i18n::{EN, ZH};
use lsky_uploader::vault::FsVault;
use std::cell::RefCell;
use tempfile::TempDir;

#[derive(Default)]
struct RecordingNotifier {
    messages: RefCell<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

impl RecordingNotifier {
    fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

fn png_item() -> ClipboardItem {
    ClipboardItem {
        mime_type: "image/png".to_string(),
        bytes: b"PNG".to_vec(),
    }
}

#[tokio::test]
async fn test_empty_selection_notifies() {
    let vault_dir = TempDir::new().unwrap();
    let vault = FsVault::new(vault_dir.path());
    let notifier = RecordingNotifier::default();
    let mut editor = DocumentEditor::new("");

    let report = execute(
        Action::Upload,
        &Settings::default(),
        &EN,
        &mut editor,
        &vault,
        &notifier,
    )
    .await;

    assert!(report.is_none());
    assert_eq!(notifier.messages(), vec!["Please select a valid image URL first"]);
}

#[tokio::test]
async fn test_execute_delivers_notices_in_order() {
    let vault_dir = TempDir::new().unwrap();
    let vault = FsVault::new(vault_dir.path());
    let notifier = RecordingNotifier::default();
    let mut editor = DocumentEditor::new("![[missing.png]]");

    let report = execute(
        Action::Upload,
        &Settings::default(),
        &ZH,
        &mut editor,
        &vault,
        &notifier,
    )
    .await
    .expect("batch should run");

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(notifier.messages(), vec!["存在错误: \n找不到文件: missing.png"]);
}

#[tokio::test]
async fn test_paste_ignored_when_disabled() {
    let notifier = RecordingNotifier::default();
    let mut editor = DocumentEditor::new("text");

    let handled = handle_paste(&Settings::default(), &EN, &mut editor, vec![png_item()], &notifier).await;

    assert!(!handled);
    assert_eq!(editor.text(), "text");
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn test_paste_ignores_non_image_items() {
    let settings = Settings {
        upload_clipboard: true,
        ..Settings::default()
    };
    let notifier = RecordingNotifier::default();
    let mut editor = DocumentEditor::new("text");
    let item = ClipboardItem {
        mime_type: "text/plain".to_string(),
        bytes: b"hello".to_vec(),
    };

    assert!(!handle_paste(&settings, &EN, &mut editor, vec![item], &notifier).await);
}

#[tokio::test]
async fn test_paste_uploads_first_image() {
    let mut server = mockito::Server::new_async().await;
    let upload = server
        .mock("POST", "/api/v1/upload")
        .with_status(200)
        .with_body(r#"{"data":{"links":{"url":"https://img.host/p.png"}}}"#)
        .expect(1)
        .create_async()
        .await;

    let settings = Settings {
        api_base_url: server.url(),
        token: "tok".to_string(),
        upload_clipboard: true,
        ..Settings::default()
    };
    let notifier = RecordingNotifier::default();
    let mut editor = DocumentEditor::new("");
    editor.set_cursor(Cursor { line: 0, ch: 0 });

    let items = vec![
        ClipboardItem {
            mime_type: "text/html".to_string(),
            bytes: b"<img>".to_vec(),
        },
        png_item(),
    ];
    let handled = handle_paste(&settings, &EN, &mut editor, items, &notifier).await;

    assert!(handled);
    assert_eq!(editor.text(), "![image.png|700](https://img.host/p.png)\n\n");
    assert_eq!(editor.cursor(), Cursor { line: 2, ch: 0 });
    assert!(notifier.messages().is_empty());
    upload.assert_async().await;
}

#[tokio::test]
async fn test_paste_failure_is_notified() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/v1/upload")
        .with_status(500)
        .create_async()
        .await;

    let settings = Settings {
        api_base_url: server.url(),
        upload_clipboard: true,
        ..Settings::default()
    };
    let notifier = RecordingNotifier::default();
    let mut editor = DocumentEditor::new("keep");

    assert!(handle_paste(&settings, &EN, &mut editor, vec![png_item()], &notifier).await);
    assert_eq!(editor.text(), "keep");

    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("Image upload failed: "));
}
