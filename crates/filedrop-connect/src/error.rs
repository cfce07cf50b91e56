//! Error types for the filedrop-connect crate

use thiserror::Error;
use tonic::Code;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("gRPC transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("gRPC status error: {0}")]
    Status(tonic::Status),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Server storage failure: {0}")]
    StorageFailure(String),

    #[error("Transfer aborted: {0}")]
    TransferAborted(String),

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Statuses produced by the server's error mapping come back as the matching
/// client variant. Anything else is kept as a raw status.
impl From<tonic::Status> for ClientError {
    fn from(status: tonic::Status) -> Self {
        let message = status.message().to_string();
        match status.code() {
            Code::NotFound => ClientError::NotFound(message),
            Code::InvalidArgument => ClientError::InvalidRequest(message),
            Code::Internal => ClientError::StorageFailure(message),
            Code::Aborted => ClientError::TransferAborted(message),
            _ => ClientError::Status(status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_conversion() {
        assert!(matches!(
            ClientError::from(tonic::Status::not_found("File not found")),
            ClientError::NotFound(msg) if msg == "File not found"
        ));
        assert!(matches!(
            ClientError::from(tonic::Status::invalid_argument("no file info provided")),
            ClientError::InvalidRequest(_)
        ));
        assert!(matches!(
            ClientError::from(tonic::Status::internal("disk")),
            ClientError::StorageFailure(_)
        ));
        assert!(matches!(
            ClientError::from(tonic::Status::aborted("cut")),
            ClientError::TransferAborted(_)
        ));
        assert!(matches!(
            ClientError::from(tonic::Status::unavailable("down")),
            ClientError::Status(status) if status.code() == Code::Unavailable
        ));
    }
}
