// ABOUTME: Directory-backed vault implementation
// ABOUTME: Lists, reads, writes, and trashes files under a vault root

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

use crate::host::{Vault, VaultFile};

/// Folder inside the vault that trashed files are moved to
pub const TRASH_DIR: &str = ".trash";

/// Normalize a vault path: forward slashes, no empty, `.` or `..` segments
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
        .replace('\u{00A0}', " ")
        .split('/')
        .filter(|segment| !matches!(*segment, "" | "." | ".."))
        .collect::<Vec<_>>()
        .join("/")
}

/// Percent-encode each segment so the path is safe inside a markdown link
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let normalized = normalize_path(path);
        if normalized.is_empty() {
            self.root.clone()
        } else {
            self.root.join(normalized)
        }
    }

    fn relative(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false)
}

#[async_trait]
impl Vault for FsVault {
    fn files(&self) -> Result<Vec<VaultFile>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e))
        {
            let entry = entry.context("Failed to walk vault directory")?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(rel) = self.relative(entry.path()) {
                files.push(VaultFile::from_path(&rel));
            }
        }

        Ok(files)
    }

    async fn read_binary(&self, file: &VaultFile) -> Result<Vec<u8>> {
        fs::read(self.resolve(&file.path))
            .await
            .with_context(|| format!("Failed to read {}", file.path))
    }

    async fn write_binary(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let target = self.resolve(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create parent folder for {}", path))?;
        }
        fs::write(&target, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path))
    }

    async fn create_folder(&self, path: &str) -> Result<()> {
        fs::create_dir_all(self.resolve(path))
            .await
            .with_context(|| format!("Failed to create folder {}", path))
    }

    async fn trash(&self, file: &VaultFile) -> Result<()> {
        let trash_dir = self.root.join(TRASH_DIR);
        fs::create_dir_all(&trash_dir)
            .await
            .context("Failed to create trash folder")?;

        let mut target = trash_dir.join(&file.name);
        let mut n = 1;
        while fs::try_exists(&target).await.unwrap_or(false) {
            let name = if file.extension.is_empty() {
                format!("{} {}", file.basename, n)
            } else {
                format!("{} {}.{}", file.basename, n, file.extension)
            };
            target = trash_dir.join(name);
            n += 1;
        }

        fs::rename(self.resolve(&file.path), &target)
            .await
            .with_context(|| format!("Failed to move {} to trash", file.path))
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        fs::try_exists(self.resolve(path))
            .await
            .with_context(|| format!("Failed to check {}", path))
    }
}
