//! Mapping of transfer errors onto transport error representations

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use filedrop_core::TransferError;
use thiserror::Error;
use tonic::Status;

/// Convert a pipeline failure into a gRPC status
pub fn to_status(err: TransferError) -> Status {
    match &err {
        TransferError::InvalidRequest(msg) => Status::invalid_argument(msg.clone()),
        TransferError::NotFound(_) => Status::not_found("File not found"),
        TransferError::StorageFailure(_) => Status::internal(err.to_string()),
        TransferError::TransferAborted(msg) => Status::aborted(msg.clone()),
    }
}

/// Convert a gRPC stream failure into the pipeline's abort error
pub fn aborted_from(status: Status) -> TransferError {
    TransferError::TransferAborted(format!("{:?}: {}", status.code(), status.message()))
}

/// Errors returned by the HTTP handlers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Transfer(#[from] TransferError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Transfer(TransferError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            ApiError::Transfer(TransferError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Transfer(TransferError::StorageFailure(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Transfer(TransferError::TransferAborted(_)) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            ApiError::Transfer(TransferError::NotFound(_)) => "File not found".to_string(),
            other => other.to_string(),
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (TransferError::InvalidRequest("x".into()), Code::InvalidArgument),
            (TransferError::NotFound("x".into()), Code::NotFound),
            (
                TransferError::StorageFailure(std::io::Error::other("x")),
                Code::Internal,
            ),
            (TransferError::TransferAborted("x".into()), Code::Aborted),
        ];
        for (err, code) in cases {
            assert_eq!(to_status(err).code(), code);
        }
    }

    #[test]
    fn test_http_mapping() {
        assert_eq!(
            ApiError::from(TransferError::NotFound("x".into()))
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(TransferError::StorageFailure(std::io::Error::other("x")))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::BadRequest("No file uploaded".into())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
    }
}
