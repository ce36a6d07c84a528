use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidArgument,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Failure kinds of the catalog and the response resolver.
///
/// Only `InvalidArgument` is meant to reach a caller. `DataSourceUnavailable`
/// and `RemoteResolutionFailed` are absorbed by degrading to the next tier,
/// and `AllTiersExhausted` guards the static tiers at start-up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("primary data source unavailable: {0}")]
    DataSourceUnavailable(String),
    #[error("remote resolution failed: {0}")]
    RemoteResolutionFailed(String),
    #[error("all tiers exhausted: {0}")]
    AllTiersExhausted(String),
}

impl ServiceError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::DataSourceUnavailable(_)
            | Self::RemoteResolutionFailed(_)
            | Self::AllTiersExhausted(_) => ErrorCode::Internal,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        let message = match &value {
            ServiceError::InvalidArgument(message) => message.clone(),
            other => other.to_string(),
        };
        Self {
            code: value.code(),
            message,
        }
    }
}
