//! Error types for the VPSie provider.

use thiserror::Error;

use crate::client::ApiError;

/// Errors that can occur while serving provider requests.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested resource was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A validation error occurred.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The provider is missing credentials or has not been configured.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource or data source type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// A state or configuration document could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A gRPC transport error occurred.
    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// A platform API call failed.
    ///
    /// `summary` is the short, user-facing description of the operation
    /// (e.g. "Error creating backup"); the API error is the detail.
    #[error("{summary}: {source}")]
    Api {
        /// Short description of the failed operation.
        summary: String,
        /// The underlying API failure.
        #[source]
        source: ApiError,
    },

    /// Waiting for an asynchronous operation timed out.
    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),

    /// Operation not supported by the resource type.
    #[error("Unimplemented: {0}")]
    Unimplemented(String),

    /// Invalid request from the host.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    /// Wrap an API failure with a short summary of the attempted operation.
    pub fn api(summary: impl Into<String>, source: ApiError) -> Self {
        Self::Api {
            summary: summary.into(),
            source,
        }
    }

    /// Get the error message as a string.
    pub fn message(&self) -> String {
        match self {
            Self::NotFound(msg)
            | Self::Validation(msg)
            | Self::Configuration(msg)
            | Self::UnknownResource(msg)
            | Self::DeadlineExceeded(msg)
            | Self::Unimplemented(msg)
            | Self::InvalidRequest(msg) => msg.clone(),
            Self::Serialization(err) => err.to_string(),
            Self::Transport(err) => err.to_string(),
            Self::Api { source, .. } => source.to_string(),
        }
    }

    /// Short summary used for diagnostics.
    pub fn summary(&self) -> String {
        match self {
            Self::Api { summary, .. } => summary.clone(),
            other => other.to_string(),
        }
    }

    /// Detail used for diagnostics, if the error carries one separately
    /// from its summary.
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Api { source, .. } => Some(source.to_string()),
            _ => None,
        }
    }

    /// Whether the failure means the remote object does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Api { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

impl From<ProviderError> for tonic::Status {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound(msg) => tonic::Status::not_found(msg),
            ProviderError::Validation(msg) => tonic::Status::invalid_argument(msg),
            ProviderError::Configuration(msg) => tonic::Status::failed_precondition(msg),
            ProviderError::UnknownResource(msg) => tonic::Status::not_found(msg),
            ProviderError::Serialization(err) => {
                tonic::Status::invalid_argument(format!("Serialization error: {}", err))
            },
            ProviderError::Transport(err) => {
                tonic::Status::unavailable(format!("Transport error: {}", err))
            },
            ProviderError::Api { summary, source } => {
                let msg = format!("{}: {}", summary, source);
                match source {
                    ApiError::NotFound(_) => tonic::Status::not_found(msg),
                    ApiError::Unauthorized(_) => tonic::Status::permission_denied(msg),
                    ApiError::Http(_) => tonic::Status::unavailable(msg),
                    _ => tonic::Status::internal(msg),
                }
            },
            ProviderError::DeadlineExceeded(msg) => tonic::Status::deadline_exceeded(msg),
            ProviderError::Unimplemented(msg) => tonic::Status::unimplemented(msg),
            ProviderError::InvalidRequest(msg) => tonic::Status::invalid_argument(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProviderError::NotFound("backup-123".to_string());
        assert_eq!(format!("{}", err), "Resource not found: backup-123");

        let err = ProviderError::UnknownResource("vpsie_nothing".to_string());
        assert_eq!(format!("{}", err), "Unknown resource type: vpsie_nothing");

        let err = ProviderError::api(
            "Error creating backup",
            ApiError::Api("quota exceeded".to_string()),
        );
        assert_eq!(
            format!("{}", err),
            "Error creating backup: API error: quota exceeded"
        );
    }

    #[test]
    fn test_api_error_summary_and_detail() {
        let err = ProviderError::api(
            "Error reading vpc",
            ApiError::NotFound("vpc 42 not found".to_string()),
        );
        assert_eq!(err.summary(), "Error reading vpc");
        assert_eq!(
            err.detail().as_deref(),
            Some("Not found: vpc 42 not found")
        );
        assert!(err.is_not_found());

        let err = ProviderError::Configuration("missing token".to_string());
        assert_eq!(err.summary(), "Configuration error: missing token");
        assert!(err.detail().is_none());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_error_to_status() {
        let status: tonic::Status = ProviderError::NotFound("test".to_string()).into();
        assert_eq!(status.code(), tonic::Code::NotFound);

        let status: tonic::Status = ProviderError::Validation("test".to_string()).into();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);

        let status: tonic::Status = ProviderError::Configuration("test".to_string()).into();
        assert_eq!(status.code(), tonic::Code::FailedPrecondition);

        let status: tonic::Status = ProviderError::DeadlineExceeded("test".to_string()).into();
        assert_eq!(status.code(), tonic::Code::DeadlineExceeded);

        let status: tonic::Status =
            ProviderError::api("Error", ApiError::NotFound("x".to_string())).into();
        assert_eq!(status.code(), tonic::Code::NotFound);

        let status: tonic::Status =
            ProviderError::api("Error", ApiError::Unauthorized("bad token".to_string())).into();
        assert_eq!(status.code(), tonic::Code::PermissionDenied);

        let status: tonic::Status =
            ProviderError::api("Error", ApiError::Api("boom".to_string())).into();
        assert_eq!(status.code(), tonic::Code::Internal);
    }

    #[test]
    fn test_message_method() {
        let err = ProviderError::NotFound("resource-123".to_string());
        assert_eq!(err.message(), "resource-123");

        let err = ProviderError::api("Error deleting vpc", ApiError::Api("locked".to_string()));
        assert_eq!(err.message(), "API error: locked");
    }
}
