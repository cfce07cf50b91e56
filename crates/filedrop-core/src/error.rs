//! Error taxonomy shared by every transfer path

use thiserror::Error;

/// Failures surfaced by the upload and download pipelines.
///
/// The registry itself never fails; every variant here originates in a
/// pipeline or in the byte storage collaborator.
#[derive(Error, Debug)]
pub enum TransferError {
    /// Malformed or incomplete protocol usage (e.g. missing file info frame)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Identifier is absent from the registry
    #[error("File not found: {0}")]
    NotFound(String),

    /// Underlying byte storage failed to read or write
    #[error("Storage failure: {0}")]
    StorageFailure(#[from] std::io::Error),

    /// Stream ended abnormally mid-transfer
    #[error("Transfer aborted: {0}")]
    TransferAborted(String),
}

pub type Result<T> = std::result::Result<T, TransferError>;

impl TransferError {
    /// Short machine-readable name, used in logs and JSON error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            TransferError::InvalidRequest(_) => "invalid_request",
            TransferError::NotFound(_) => "not_found",
            TransferError::StorageFailure(_) => "storage_failure",
            TransferError::TransferAborted(_) => "transfer_aborted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_become_storage_failures() {
        let err: TransferError = std::io::Error::other("disk full").into();
        assert_eq!(err.kind(), "storage_failure");
        assert!(err.to_string().contains("disk full"));
    }
}
