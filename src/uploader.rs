// ABOUTME: Batch reconciler for upload, delete, and download over a selection
// ABOUTME: Walks references in order, applies limit and blacklist policy, rewrites text, tallies outcomes

use anyhow::Result;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::actions::Action;
use crate::client::LskyClient;
use crate::config::Settings;
use crate::error::{ErrorKind, SearchPhase, TransferError};
use crate::host::{Cursor, Editor, Vault, VaultFile};
use crate::i18n::{tf, LangPack};
use crate::naming::{
    download_file_name, extension_from_content_type, formatted_image_name, image_markdown,
    is_image_extension, mime_from_extension, resolve_extension, Clock, SystemClock,
    DEFAULT_EXTENSION,
};
use crate::reference::{
    extract_image_urls, extract_references, is_blacklisted, ImageReference, ReferenceKind,
};
use crate::summary::{summarize, Notice, NoticeKind};
use crate::vault::{encode_path, normalize_path};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    Uploaded,
    Deleted,
    Downloaded,
    SkippedBlacklist,
    SkippedLimit,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub reference: ImageReference,
    pub status: TransferStatus,
    /// Hosted URL or vault path produced by a successful transfer
    pub new_location: Option<String>,
    pub error_detail: Option<String>,
}

impl TransferOutcome {
    fn done(reference: ImageReference, status: TransferStatus, location: Option<String>) -> Self {
        Self {
            reference,
            status,
            new_location: location,
            error_detail: None,
        }
    }

    fn skipped(reference: ImageReference, status: TransferStatus) -> Self {
        Self {
            reference,
            status,
            new_location: None,
            error_detail: None,
        }
    }

    fn failed(reference: ImageReference, detail: String) -> Self {
        Self {
            reference,
            status: TransferStatus::Failed,
            new_location: None,
            error_detail: Some(detail),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchTally {
    pub success: usize,
    pub blacklisted: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

impl BatchTally {
    pub fn record(&mut self, outcome: &TransferOutcome) {
        match outcome.status {
            TransferStatus::Uploaded | TransferStatus::Deleted | TransferStatus::Downloaded => {
                self.success += 1
            }
            TransferStatus::SkippedBlacklist => self.blacklisted += 1,
            TransferStatus::SkippedLimit => self.skipped += 1,
            TransferStatus::Failed => {
                if let Some(detail) = &outcome.error_detail {
                    self.errors.push(detail.clone());
                }
            }
        }
    }
}

/// Everything a finished batch produced
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub action: Action,
    pub outcomes: Vec<TransferOutcome>,
    pub notices: Vec<Notice>,
}

impl BatchReport {
    fn aborted(action: Action, message: &str) -> Self {
        Self {
            action,
            outcomes: Vec::new(),
            notices: vec![Notice::new(NoticeKind::Aborted, message)],
        }
    }

    pub fn count(&self, status: TransferStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}

/// Working state of one batch: the text being rewritten, outcomes, and tally
struct Batch {
    working: String,
    outcomes: Vec<TransferOutcome>,
    tally: BatchTally,
}

impl Batch {
    fn new(text: &str) -> Self {
        Self {
            working: text.to_string(),
            outcomes: Vec::new(),
            tally: BatchTally::default(),
        }
    }

    /// Literal replacement of the first occurrence, so earlier rewrites never shift later matches
    fn rewrite(&mut self, from: &str, to: &str) {
        self.working = self.working.replacen(from, to, 1);
    }

    fn push(&mut self, outcome: TransferOutcome) {
        match outcome.status {
            TransferStatus::Failed => {
                warn!(reference = %outcome.reference.raw, detail = ?outcome.error_detail, "transfer failed")
            }
            status => debug!(reference = %outcome.reference.raw, ?status, "reference handled"),
        }
        self.tally.record(&outcome);
        self.outcomes.push(outcome);
    }
}

/// Runs one batch operation against a settings snapshot
pub struct ImageUploader {
    settings: Settings,
    client: LskyClient,
    lang: LangPack,
    clock: Arc<dyn Clock>,
}

impl ImageUploader {
    pub fn new(settings: Settings, lang: LangPack) -> Self {
        let settings = settings.normalized();
        let client = LskyClient::new(&settings.api_base_url, &settings.token);
        Self {
            settings,
            client,
            lang,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn limit_reached(&self, attempted: usize) -> bool {
        self.settings.limit_count > 0 && attempted >= self.settings.limit_count
    }

    fn finish(&self, action: Action, editor: &mut dyn Editor, original: &str, batch: Batch) -> BatchReport {
        if batch.working != original {
            editor.replace_selection(&batch.working);
        }

        info!(
            action = action.id(),
            success = batch.tally.success,
            blacklisted = batch.tally.blacklisted,
            skipped = batch.tally.skipped,
            errors = batch.tally.errors.len(),
            "batch finished"
        );

        BatchReport {
            action,
            outcomes: batch.outcomes,
            notices: summarize(batch.tally, action, self.settings.limit_count, &self.lang),
        }
    }

    /// Upload every link or embed image in the selection and point the text at the hosted copies
    pub async fn upload_selection(&self, editor: &mut dyn Editor, vault: &dyn Vault) -> Result<BatchReport> {
        let selected = editor.selection();
        let blacklist = self.settings.blacklist();
        let mut batch = Batch::new(&selected);
        let mut attempted = 0;

        for reference in extract_references(&selected) {
            if self.limit_reached(attempted) {
                batch.push(TransferOutcome::skipped(reference, TransferStatus::SkippedLimit));
                continue;
            }
            attempted += 1;

            let outcome = self.upload_reference(reference, vault, &blacklist, &mut batch).await;
            batch.push(outcome);
        }

        Ok(self.finish(Action::Upload, editor, &selected, batch))
    }

    async fn upload_reference(
        &self,
        reference: ImageReference,
        vault: &dyn Vault,
        blacklist: &HashSet<String>,
        batch: &mut Batch,
    ) -> TransferOutcome {
        if reference.kind == ReferenceKind::RemoteUrl {
            if is_blacklisted(&reference.payload, blacklist) {
                return TransferOutcome::skipped(reference, TransferStatus::SkippedBlacklist);
            }

            return match self.upload_remote(&reference.payload).await {
                Ok((url, ext)) => {
                    self.rewrite_upload(batch, &reference, &url, &ext);
                    TransferOutcome::done(reference, TransferStatus::Uploaded, Some(url))
                }
                Err(e) => {
                    let detail = format!(
                        "{}: {} - {}",
                        self.lang.general.upload_failed,
                        self.describe(&e),
                        reference.payload
                    );
                    TransferOutcome::failed(reference, detail)
                }
            };
        }

        let found = match reference.kind {
            ReferenceKind::Attachment => vault.find_attachment(&reference.payload),
            _ => vault.find_by_path(&reference.payload),
        };
        let file = match found {
            Ok(Some(file)) => file,
            Ok(None) => {
                let detail = self.describe(&TransferError::FileNotFound(reference.payload.clone()));
                return TransferOutcome::failed(reference, detail);
            }
            Err(e) => {
                let detail = self.describe(&TransferError::vault(e));
                return TransferOutcome::failed(reference, detail);
            }
        };

        match self.upload_vault_file(vault, &file).await {
            Ok((url, ext)) => {
                self.rewrite_upload(batch, &reference, &url, &ext);

                if self.settings.delete_local_after_upload {
                    if let Err(e) = vault.trash(&file).await {
                        warn!(path = %file.path, error = %e, "could not trash uploaded file");
                        batch
                            .tally
                            .errors
                            .push(format!("{}: {}", self.lang.errors.trash_failed, file.path));
                    }
                }

                TransferOutcome::done(reference, TransferStatus::Uploaded, Some(url))
            }
            Err(e) => {
                let detail = match e.kind() {
                    ErrorKind::Validation => self.describe(&e),
                    _ => format!("{}: {}", self.lang.general.upload_failed, self.describe(&e)),
                };
                TransferOutcome::failed(reference, detail)
            }
        }
    }

    fn rewrite_upload(&self, batch: &mut Batch, reference: &ImageReference, url: &str, ext: &str) {
        let markdown = image_markdown(url, ext, self.settings.image_width);
        batch.rewrite(&reference.raw, &markdown);
    }

    async fn upload_remote(&self, url: &str) -> Result<(String, String), TransferError> {
        let fetched = self.client.fetch(url).await?;
        let ext = resolve_extension(url, fetched.content_type.as_deref());
        let mime = fetched
            .content_type
            .clone()
            .unwrap_or_else(|| mime_from_extension(&ext).to_string());

        self.upload_bytes(fetched.bytes, &ext, &mime).await
    }

    async fn upload_vault_file(
        &self,
        vault: &dyn Vault,
        file: &VaultFile,
    ) -> Result<(String, String), TransferError> {
        let ext = file.extension.to_lowercase();
        if !is_image_extension(&ext) {
            return Err(TransferError::NotAnImage(file.path.clone()));
        }

        let bytes = vault.read_binary(file).await.map_err(TransferError::vault)?;
        self.upload_bytes(bytes, &ext, mime_from_extension(&ext)).await
    }

    /// Upload under a timestamp name, returning the hosted URL and extension used
    async fn upload_bytes(
        &self,
        bytes: Vec<u8>,
        ext: &str,
        mime: &str,
    ) -> Result<(String, String), TransferError> {
        let filename = format!("{}.{}", formatted_image_name(self.clock.now()), ext);
        debug!(%filename, mime, size = bytes.len(), "uploading image");

        let url = self
            .client
            .upload(bytes, &filename, mime, self.settings.strategy_id)
            .await?;
        Ok((url, ext.to_string()))
    }

    /// Upload pasted image bytes and insert the markdown at the cursor
    pub async fn upload_clipboard(
        &self,
        editor: &mut dyn Editor,
        bytes: Vec<u8>,
        mime: &str,
    ) -> Result<String, TransferError> {
        let ext = extension_from_content_type(Some(mime)).unwrap_or(DEFAULT_EXTENSION);
        let (url, ext) = self.upload_bytes(bytes, ext, mime).await?;
        let markdown = image_markdown(&url, &ext, self.settings.image_width);

        let at = editor.cursor();
        editor.replace_range(&format!("{}\n\n", markdown), at);
        editor.set_cursor(Cursor {
            line: at.line + 2,
            ch: 0,
        });

        Ok(url)
    }

    /// Delete every hosted image whose URL appears in the selection and remove the URLs
    pub async fn delete_selection(&self, editor: &mut dyn Editor) -> Result<BatchReport> {
        let selected = editor.selection();
        let references: Vec<_> = extract_image_urls(&selected).collect();
        if references.is_empty() {
            return Ok(BatchReport::aborted(Action::Delete, self.lang.general.no_images_found));
        }

        let mut batch = Batch::new(&selected);
        for (attempted, reference) in references.into_iter().enumerate() {
            if self.limit_reached(attempted) {
                batch.push(TransferOutcome::skipped(reference, TransferStatus::SkippedLimit));
                continue;
            }

            let outcome = match self.client.delete_image(&reference.payload).await {
                Ok(()) => {
                    batch.rewrite(&reference.payload, "");
                    TransferOutcome::done(reference, TransferStatus::Deleted, None)
                }
                Err(e) => {
                    let detail = self.describe_delete_failure(&reference.payload, &e);
                    TransferOutcome::failed(reference, detail)
                }
            };
            batch.push(outcome);
        }

        Ok(self.finish(Action::Delete, editor, &selected, batch))
    }

    fn describe_delete_failure(&self, url: &str, err: &TransferError) -> String {
        match err {
            TransferError::ImageNotFound { failures, .. } if failures.is_empty() => {
                format!("{}: {}", self.lang.errors.image_not_found, url)
            }
            TransferError::ImageNotFound { failures, .. } => {
                let attempts: Vec<String> = failures
                    .iter()
                    .map(|f| {
                        let phase = match f.phase {
                            SearchPhase::Primary => self.lang.errors.search_primary,
                            SearchPhase::Fallback => self.lang.errors.search_fallback,
                        };
                        tf(
                            self.lang.errors.search_failed,
                            &[("phase", phase.to_string()), ("detail", self.describe(&f.error))],
                        )
                    })
                    .collect();
                format!("{}: {} ({})", self.lang.errors.image_not_found, url, attempts.join("; "))
            }
            other => self.describe(other),
        }
    }

    /// Download every remote image URL in the selection into the download folder
    pub async fn download_selection(&self, editor: &mut dyn Editor, vault: &dyn Vault) -> Result<BatchReport> {
        if self.settings.download_path.is_empty() {
            return Ok(BatchReport::aborted(
                Action::Download,
                self.lang.errors.download_path_not_set,
            ));
        }

        let selected = editor.selection();
        let references: Vec<_> = extract_image_urls(&selected).collect();
        if references.is_empty() {
            return Ok(BatchReport::aborted(Action::Download, self.lang.general.no_images_found));
        }

        let mut batch = Batch::new(&selected);
        let folder = normalize_path(&self.settings.download_path);
        if let Err(e) = self.ensure_folder(vault, &folder).await {
            warn!(%folder, error = %e, "could not create download folder");
            batch
                .tally
                .errors
                .push(format!("{}: {:#}", self.lang.errors.create_folder_failed, e));
        }

        for (attempted, reference) in references.into_iter().enumerate() {
            if self.limit_reached(attempted) {
                batch.push(TransferOutcome::skipped(reference, TransferStatus::SkippedLimit));
                continue;
            }

            let outcome = match self.download_one(vault, &folder, &reference.payload).await {
                Ok(path) => {
                    batch.rewrite(&reference.payload, &encode_path(&path));
                    TransferOutcome::done(reference, TransferStatus::Downloaded, Some(path))
                }
                Err(e) => {
                    let detail = match e {
                        TransferError::Fetch { status } => format!(
                            "{}: {} - {}",
                            self.lang.errors.get_image_failed, status, reference.payload
                        ),
                        _ => format!("{}: {}", self.lang.errors.image_download_failed, reference.payload),
                    };
                    TransferOutcome::failed(reference, detail)
                }
            };
            batch.push(outcome);
        }

        Ok(self.finish(Action::Download, editor, &selected, batch))
    }

    async fn ensure_folder(&self, vault: &dyn Vault, folder: &str) -> Result<()> {
        if !vault.exists(folder).await? {
            vault.create_folder(folder).await?;
        }
        Ok(())
    }

    async fn download_one(&self, vault: &dyn Vault, folder: &str, url: &str) -> Result<String, TransferError> {
        let fetched = self.client.fetch(url).await?;
        let ext = resolve_extension(url, fetched.content_type.as_deref());

        // Same basename in the same millisecond: step the stamp until the name is free
        let mut millis = self.clock.now().timestamp_millis();
        let path = loop {
            let name = download_file_name(url, millis, &ext);
            let path = normalize_path(&format!("{}/{}", folder, name));
            if !vault.exists(&path).await.map_err(TransferError::vault)? {
                break path;
            }
            millis += 1;
        };

        vault
            .write_binary(&path, &fetched.bytes)
            .await
            .map_err(TransferError::vault)?;
        Ok(path)
    }

    /// Localized one-line description of a transfer failure
    fn describe(&self, err: &TransferError) -> String {
        let lang = &self.lang;
        match err {
            TransferError::FileNotFound(path) => format!("{}: {}", lang.general.file_not_found, path),
            TransferError::NotAnImage(path) => format!("{}: {}", lang.general.not_image_format, path),
            TransferError::InvalidImageUrl(url) => format!("{}: {}", lang.errors.invalid_image_url, url),
            TransferError::Api { status } => format!("HTTP {}", status),
            TransferError::DeleteRejected { status } => {
                format!("{}: {}", lang.errors.image_delete_failed, status)
            }
            TransferError::Fetch { status } => format!("{}: {}", lang.errors.get_image_failed, status),
            TransferError::Network(e) => format!("{}: {}", lang.general.network_error, e),
            TransferError::Vault(msg) => format!("{}: {}", lang.general.network_error, msg),
            TransferError::Malformed(_) => lang.general.api_response_error.to_string(),
            TransferError::ImageNotFound { name, .. } => {
                format!("{}: {}", lang.errors.image_not_found, name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(raw: &str) -> ImageReference {
        ImageReference {
            raw: raw.to_string(),
            span: 0..raw.len(),
            syntax: crate::reference::ReferenceSyntax::BareUrl,
            kind: ReferenceKind::RemoteUrl,
            payload: raw.to_string(),
        }
    }

    #[test]
    fn test_tally_records_each_status() {
        let mut tally = BatchTally::default();
        tally.record(&TransferOutcome::done(reference("a"), TransferStatus::Uploaded, None));
        tally.record(&TransferOutcome::skipped(reference("b"), TransferStatus::SkippedBlacklist));
        tally.record(&TransferOutcome::skipped(reference("c"), TransferStatus::SkippedLimit));
        tally.record(&TransferOutcome::failed(reference("d"), "bad".into()));

        assert_eq!(tally.success, 1);
        assert_eq!(tally.blacklisted, 1);
        assert_eq!(tally.skipped, 1);
        assert_eq!(tally.errors, vec!["bad".to_string()]);
    }

    #[test]
    fn test_rewrite_replaces_first_literal_occurrence() {
        let mut batch = Batch::new("x.png and x.png");
        batch.rewrite("x.png", "long-replacement.png");
        assert_eq!(batch.working, "long-replacement.png and x.png");
        batch.rewrite("x.png", "y.png");
        assert_eq!(batch.working, "long-replacement.png and y.png");
    }

    #[test]
    fn test_delete_failure_lists_search_errors() {
        let uploader = ImageUploader::new(Settings::default(), crate::i18n::EN);
        let err = TransferError::ImageNotFound {
            name: "a-1.png".into(),
            failures: vec![crate::error::SearchFailure {
                phase: SearchPhase::Fallback,
                error: TransferError::Api { status: 500 },
            }],
        };

        let detail = uploader.describe_delete_failure("https://h/a-1.png", &err);
        assert_eq!(
            detail,
            "Corresponding image not found: https://h/a-1.png (Broad search failed: HTTP 500)"
        );
    }
}
