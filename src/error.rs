// ABOUTME: Error taxonomy for per-image transfers
// ABOUTME: Separates validation, network, and malformed-response failures

use thiserror::Error;

/// Coarse class of a transfer failure, used when rendering notices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Network,
    ApiResponseMalformed,
}

/// Which keyword search of the two-phase delete produced a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Primary,
    Fallback,
}

#[derive(Debug, Error)]
#[error("{phase:?} search: {error}")]
pub struct SearchFailure {
    pub phase: SearchPhase,
    pub error: TransferError,
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("not an image file: {0}")]
    NotAnImage(String),

    #[error("invalid image url: {0}")]
    InvalidImageUrl(String),

    #[error("image host returned HTTP {status}")]
    Api { status: u16 },

    #[error("image host refused delete: HTTP {status}")]
    DeleteRejected { status: u16 },

    #[error("fetch failed: HTTP {status}")]
    Fetch { status: u16 },

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("vault I/O failed: {0}")]
    Vault(String),

    #[error("unexpected API response: {0}")]
    Malformed(String),

    #[error("no image named {name} on the host")]
    ImageNotFound {
        name: String,
        failures: Vec<SearchFailure>,
    },
}

impl TransferError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransferError::FileNotFound(_)
            | TransferError::NotAnImage(_)
            | TransferError::InvalidImageUrl(_)
            | TransferError::ImageNotFound { .. } => ErrorKind::Validation,
            TransferError::Api { .. }
            | TransferError::DeleteRejected { .. }
            | TransferError::Fetch { .. }
            | TransferError::Network(_)
            | TransferError::Vault(_) => ErrorKind::Network,
            TransferError::Malformed(_) => ErrorKind::ApiResponseMalformed,
        }
    }

    pub(crate) fn vault(err: anyhow::Error) -> Self {
        TransferError::Vault(format!("{:#}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(TransferError::NotAnImage("a.txt".into()).kind(), ErrorKind::Validation);
        assert_eq!(TransferError::Api { status: 500 }.kind(), ErrorKind::Network);
        assert_eq!(
            TransferError::Malformed("missing url".into()).kind(),
            ErrorKind::ApiResponseMalformed
        );
    }

    #[test]
    fn test_vault_error_keeps_context_chain() {
        let err = anyhow::anyhow!("permission denied").context("Failed to read notes/a.png");
        let msg = TransferError::vault(err).to_string();
        assert!(msg.contains("Failed to read notes/a.png"));
        assert!(msg.contains("permission denied"));
    }
}
