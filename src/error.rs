//! Error types for the WeData provider.

use thiserror::Error;

use crate::config::retry::RETRYABLE_CODES;

/// Error code reported for transport failures.
pub const NETWORK_ERROR_CODE: &str = "ClientError.NetworkError";

/// Error code reported when the API answers with a non-2xx status.
pub const HTTP_STATUS_ERROR_CODE: &str = "ClientError.HttpStatusCodeError";

/// Errors raised by the provider, its client and its resources.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested resource was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A validation error occurred.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An internal error occurred.
    #[error("SDK error: {0}")]
    Sdk(String),

    /// A configuration error occurred.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The WeData API returned an error envelope.
    #[error("[TencentCloudSDKError] Code={code}, Message={message}, RequestId={request_id}")]
    Api {
        /// Error code, e.g. `ResourceNotFound.Workflow`.
        code: String,
        /// Human-readable message from the API.
        message: String,
        /// Request id echoed by the API.
        request_id: String,
    },

    /// The request never got an answer (connect, TLS, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A composite resource id could not be split into its parts.
    #[error("{0}")]
    BrokenId(String),

    /// An update tried to change an argument that cannot be changed in place.
    #[error("argument `{0}` cannot be changed")]
    ImmutableArgument(String),

    /// Operation failed due to current state (precondition not met).
    #[error("Failed precondition: {0}")]
    FailedPrecondition(String),

    /// Operation not implemented.
    #[error("Unimplemented: {0}")]
    Unimplemented(String),
}

impl ProviderError {
    /// Get the error message as a string.
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(msg) => msg,
            Self::Validation(msg) => msg,
            Self::Sdk(msg) => msg,
            Self::Configuration(msg) => msg,
            Self::UnknownResource(msg) => msg,
            Self::Serialization(_err) => "serialization error (see Debug output)",
            Self::Api { message, .. } => message,
            Self::Network(_err) => "network error (see Debug output)",
            Self::BrokenId(msg) => msg,
            Self::ImmutableArgument(name) => name,
            Self::FailedPrecondition(msg) => msg,
            Self::Unimplemented(msg) => msg,
        }
    }

    /// Build an API error with an empty request id.
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            code: code.into(),
            message: message.into(),
            request_id: String::new(),
        }
    }

    /// Build the error for an id that does not have the expected shape.
    pub fn broken_id(id: &str) -> Self {
        Self::BrokenId(format!("id is broken,{}", id))
    }

    /// API error code, if the error came from the wire.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            Self::Network(_) => Some(NETWORK_ERROR_CODE),
            _ => None,
        }
    }

    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        self.is_retryable_with(&[])
    }

    /// Like [`is_retryable`](Self::is_retryable), with extra codes.
    pub fn is_retryable_with(&self, extra_codes: &[&str]) -> bool {
        match self.code() {
            Some(code) => RETRYABLE_CODES
                .iter()
                .chain(extra_codes.iter())
                .any(|candidate| code_matches(code, candidate)),
            None => false,
        }
    }

    /// Whether the API reported the object as missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Api { code, .. } => code.starts_with("ResourceNotFound"),
            _ => false,
        }
    }
}

/// `FailedOperation.Foo` matches `FailedOperation`; exact codes match themselves.
fn code_matches(code: &str, candidate: &str) -> bool {
    if code == candidate {
        return true;
    }
    match code.split_once('.') {
        Some((head, _)) => head == candidate,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProviderError::NotFound("resource-123".to_string());
        assert_eq!(format!("{}", err), "Resource not found: resource-123");

        let err = ProviderError::Validation("invalid input".to_string());
        assert_eq!(format!("{}", err), "Validation error: invalid input");

        let err = ProviderError::UnknownResource("custom_resource".to_string());
        assert_eq!(format!("{}", err), "Unknown resource type: custom_resource");
    }

    #[test]
    fn test_api_error_display() {
        let err = ProviderError::Api {
            code: "InvalidParameter".to_string(),
            message: "ProjectId is empty".to_string(),
            request_id: "req-1".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "[TencentCloudSDKError] Code=InvalidParameter, Message=ProjectId is empty, RequestId=req-1"
        );
        assert_eq!(err.message(), "ProjectId is empty");
        assert_eq!(err.code(), Some("InvalidParameter"));
    }

    #[test]
    fn test_id_errors_display() {
        assert_eq!(
            ProviderError::broken_id("1234").to_string(),
            "id is broken,1234"
        );
        assert_eq!(
            ProviderError::ImmutableArgument("workflow_type".to_string()).to_string(),
            "argument `workflow_type` cannot be changed"
        );
    }

    #[test]
    fn test_retryable_codes() {
        assert!(ProviderError::api("InternalError", "boom").is_retryable());
        assert!(ProviderError::api("FailedOperation.Busy", "later").is_retryable());
        assert!(ProviderError::api("RequestLimitExceeded", "slow down").is_retryable());
        assert!(ProviderError::api(HTTP_STATUS_ERROR_CODE, "502").is_retryable());

        assert!(!ProviderError::api("InvalidParameter", "bad").is_retryable());
        assert!(!ProviderError::api("ResourceNotFound", "gone").is_retryable());
        assert!(!ProviderError::Validation("bad".into()).is_retryable());
    }

    #[test]
    fn test_sub_code_does_not_match_sibling_prefix() {
        // `ResourceInUseX` is not a dotted child of `ResourceInUse`.
        assert!(!ProviderError::api("ResourceInUseX", "x").is_retryable());
        assert!(ProviderError::api("ResourceInUse.Task", "x").is_retryable());
    }

    #[test]
    fn test_extra_retryable_codes() {
        let err = ProviderError::api("UnsupportedOperation", "locked");
        assert!(!err.is_retryable());
        assert!(err.is_retryable_with(&["UnsupportedOperation"]));
    }

    #[test]
    fn test_not_found_detection() {
        assert!(ProviderError::api("ResourceNotFound", "x").is_not_found());
        assert!(ProviderError::api("ResourceNotFound.Workflow", "x").is_not_found());
        assert!(ProviderError::NotFound("x".into()).is_not_found());
        assert!(!ProviderError::api("InternalError", "x").is_not_found());
    }

    #[test]
    fn test_message_method() {
        let err = ProviderError::NotFound("resource-123".to_string());
        assert_eq!(err.message(), "resource-123");

        let err = ProviderError::Configuration("invalid config".to_string());
        assert_eq!(err.message(), "invalid config");

        let err = ProviderError::FailedPrecondition("task is running".to_string());
        assert_eq!(err.message(), "task is running");
    }

    #[test]
    fn test_auth_and_quota_codes_stay_api_errors() {
        for code in ["AuthFailure.SignatureFailure", "LimitExceeded", "RequestLimitExceeded"] {
            let err = ProviderError::api(code, "denied");
            assert!(matches!(err, ProviderError::Api { .. }), "{}", code);
            assert_eq!(err.code(), Some(code));
            assert_eq!(err.message(), "denied");
        }
    }
}
