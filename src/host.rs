// ABOUTME: Host seams the uploader runs against
// ABOUTME: Editor surface, file vault, and notice delivery traits

use anyhow::Result;
use async_trait::async_trait;

use crate::naming::strip_extension;

/// Zero-based line and character position in the document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub line: usize,
    pub ch: usize,
}

/// The host's text editing surface. The host owns the document buffer.
pub trait Editor {
    fn selection(&self) -> String;

    fn replace_selection(&mut self, text: &str);

    fn cursor(&self) -> Cursor;

    fn set_cursor(&mut self, cursor: Cursor);

    /// Insert `text` at `at`
    fn replace_range(&mut self, text: &str, at: Cursor);
}

/// A file known to the vault, addressed by its vault-relative path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultFile {
    pub path: String,
    pub name: String,
    pub basename: String,
    pub extension: String,
}

impl VaultFile {
    pub fn from_path(path: &str) -> Self {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        let (basename, extension) = match name.rfind('.') {
            Some(idx) if idx > 0 => (name[..idx].to_string(), name[idx + 1..].to_string()),
            _ => (name.clone(), String::new()),
        };

        Self {
            path: path.to_string(),
            name,
            basename,
            extension,
        }
    }
}

/// The host's file vault
#[async_trait]
pub trait Vault: Send + Sync {
    fn files(&self) -> Result<Vec<VaultFile>>;

    fn find_by_path(&self, path: &str) -> Result<Option<VaultFile>> {
        Ok(self.files()?.into_iter().find(|f| f.path == path))
    }

    /// Match `![[name]]` by file name, or by basename against the name minus its extension
    fn find_attachment(&self, name: &str) -> Result<Option<VaultFile>> {
        let stem = strip_extension(name);
        Ok(self
            .files()?
            .into_iter()
            .find(|f| f.name == name || f.basename == stem))
    }

    async fn read_binary(&self, file: &VaultFile) -> Result<Vec<u8>>;

    async fn write_binary(&self, path: &str, bytes: &[u8]) -> Result<()>;

    async fn create_folder(&self, path: &str) -> Result<()>;

    async fn trash(&self, file: &VaultFile) -> Result<()>;

    async fn exists(&self, path: &str) -> Result<bool>;
}

/// Delivers user-facing notices
pub trait Notifier {
    fn notify(&self, message: &str);
}

/// Prints notices to stdout
#[derive(Debug, Default)]
pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn notify(&self, message: &str) {
        println!("{}", message);
    }
}
