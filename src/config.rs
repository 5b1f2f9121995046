//! Provider configuration.
//!
//! Constants for the WeData API, environment variable names, retry and
//! paging defaults, plus [`ProviderConfig`], the parsed provider block.

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};

/// Configuration constants for the WeData API
pub mod api {
    /// Service name used in the host and the credential scope
    pub const SERVICE: &str = "wedata";

    /// API version sent in `X-TC-Version`
    pub const VERSION: &str = "2025-08-06";

    /// Default root domain, prefixed with the service name
    pub const ROOT_DOMAIN: &str = "tencentcloudapi.com";

    /// Default protocol
    pub const PROTOCOL: &str = "https";

    /// Response language
    pub const LANGUAGE: &str = "en-US";

    /// Signature algorithm
    pub const ALGORITHM: &str = "TC3-HMAC-SHA256";

    /// Content type of every request body
    pub const CONTENT_TYPE: &str = "application/json; charset=utf-8";

    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECS: u64 = 300;
}

/// Environment variable names
pub mod env {
    /// Access key id
    pub const SECRET_ID: &str = "TENCENTCLOUD_SECRET_ID";

    /// Access key secret
    pub const SECRET_KEY: &str = "TENCENTCLOUD_SECRET_KEY";

    /// Temporary session token
    pub const SECURITY_TOKEN: &str = "TENCENTCLOUD_SECURITY_TOKEN";

    /// Region
    pub const REGION: &str = "TENCENTCLOUD_REGION";

    /// Root domain override
    pub const DOMAIN: &str = "TENCENTCLOUD_DOMAIN";

    /// Protocol override (`https` or `http`)
    pub const PROTOCOL: &str = "TENCENTCLOUD_PROTOCOL";

    /// Request timeout override in seconds
    pub const REQUEST_TIMEOUT: &str = "TENCENTCLOUD_WEDATA_REQUEST_TIMEOUT";
}

/// Retry policy for API calls
pub mod retry {
    use std::time::Duration;

    /// Budget for read calls
    pub const READ_TIMEOUT: Duration = Duration::from_secs(3 * 60);

    /// Budget for create, update and delete calls
    pub const WRITE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

    /// First sleep between attempts
    pub const INITIAL_BACKOFF: Duration = Duration::from_millis(500);

    /// Upper bound for a single sleep
    pub const MAX_BACKOFF: Duration = Duration::from_secs(10);

    /// Error codes worth another attempt. Dotted sub-codes match their parent.
    pub const RETRYABLE_CODES: &[&str] = &[
        "ClientError.NetworkError",
        "ClientError.HttpStatusCodeError",
        "FailedOperation",
        "InternalError",
        "TradeUnknownError",
        "RequestLimitExceeded",
        "ResourceInUse",
        "ResourceInsufficient",
        "ResourceUnavailable",
        "ResourceBusy",
    ];
}

/// Composite resource id separators
pub mod ids {
    /// Separates the top-level id components
    pub const FIELD_SEPARATOR: &str = "#";

    /// Separates the parts of one lineage identity
    pub const COMMA_SEPARATOR: &str = ",";
}

/// Page sizes for list calls
pub mod pagination {
    /// Projects, data sources and project roles
    pub const SMALL_PAGE_SIZE: u64 = 50;

    /// Workflows, tasks, folders and lineage
    pub const LARGE_PAGE_SIZE: u64 = 100;
}

/// Client-side request throttling
pub mod ratelimit {
    /// Requests per second allowed for a single action
    pub const DEFAULT_PER_SECOND: u32 = 20;
}

/// Provider block as written by the user.
///
/// Unset fields fall back to the `TENCENTCLOUD_*` environment variables,
/// see [`ProviderConfig::with_env_defaults`].
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Access key id.
    pub secret_id: Option<String>,
    /// Access key secret.
    pub secret_key: Option<String>,
    /// Session token for temporary credentials.
    pub security_token: Option<String>,
    /// Region the requests are sent for.
    pub region: Option<String>,
    /// `https` (default) or `http`.
    pub protocol: Option<String>,
    /// Root domain, `tencentcloudapi.com` by default.
    pub domain: Option<String>,
    /// Seconds.
    pub request_timeout: Option<u64>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "***"))
            .field("security_token", &self.security_token.as_ref().map(|_| "***"))
            .field("region", &self.region)
            .field("protocol", &self.protocol)
            .field("domain", &self.domain)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ProviderConfig {
    /// Parse the provider block. `null` yields an empty config.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ProviderError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Fill unset fields from the process environment.
    pub fn with_env_defaults(self) -> Result<Self, ProviderError> {
        self.with_env_lookup(|key| std::env::var(key).ok())
    }

    /// Fill unset fields using `lookup` as the environment.
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Result<Self, ProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if self.secret_id.is_none() {
            self.secret_id = get(env::SECRET_ID);
        }
        if self.secret_key.is_none() {
            self.secret_key = get(env::SECRET_KEY);
        }
        if self.security_token.is_none() {
            self.security_token = get(env::SECURITY_TOKEN);
        }
        if self.region.is_none() {
            self.region = get(env::REGION);
        }
        if self.protocol.is_none() {
            self.protocol = get(env::PROTOCOL);
        }
        if self.domain.is_none() {
            self.domain = get(env::DOMAIN);
        }
        if self.request_timeout.is_none() {
            if let Some(raw) = get(env::REQUEST_TIMEOUT) {
                let secs = raw.trim().parse::<u64>().map_err(|_| {
                    ProviderError::Configuration(format!(
                        "{} must be a whole number of seconds, got {:?}",
                        env::REQUEST_TIMEOUT,
                        raw
                    ))
                })?;
                self.request_timeout = Some(secs);
            }
        }
        Ok(self)
    }

    /// Check that credentials and region are present.
    pub fn validate(&self) -> Result<(), ProviderError> {
        let missing = |field: &str, var: &str| {
            ProviderError::Configuration(format!(
                "`{}` is required, set it in the provider block or via {}",
                field, var
            ))
        };
        if is_blank(&self.secret_id) {
            return Err(missing("secret_id", env::SECRET_ID));
        }
        if is_blank(&self.secret_key) {
            return Err(missing("secret_key", env::SECRET_KEY));
        }
        if is_blank(&self.region) {
            return Err(missing("region", env::REGION));
        }
        match self.protocol.as_deref() {
            None | Some("https") | Some("http") => {},
            Some(other) => {
                return Err(ProviderError::Configuration(format!(
                    "protocol must be `https` or `http`, got `{}`",
                    other
                )))
            },
        }
        if self.request_timeout == Some(0) {
            return Err(ProviderError::Configuration(
                "request_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Host the requests are signed for, e.g. `wedata.tencentcloudapi.com`.
    pub fn host(&self) -> String {
        format!(
            "{}.{}",
            api::SERVICE,
            self.domain.as_deref().unwrap_or(api::ROOT_DOMAIN)
        )
    }

    /// Full endpoint URL.
    pub fn endpoint(&self) -> String {
        format!(
            "{}://{}",
            self.protocol.as_deref().unwrap_or(api::PROTOCOL),
            self.host()
        )
    }

    /// Request timeout in seconds.
    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout.unwrap_or(api::REQUEST_TIMEOUT_SECS)
    }

    /// Schema of the provider block.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_attribute(
                "secret_id",
                Attribute::optional_string()
                    .with_description("Access key id. Falls back to TENCENTCLOUD_SECRET_ID."),
            )
            .with_attribute(
                "secret_key",
                Attribute::optional_string()
                    .sensitive()
                    .with_description("Access key secret. Falls back to TENCENTCLOUD_SECRET_KEY."),
            )
            .with_attribute(
                "security_token",
                Attribute::optional_string()
                    .sensitive()
                    .with_description("Session token for temporary credentials."),
            )
            .with_attribute(
                "region",
                Attribute::optional_string()
                    .with_description("Region, e.g. ap-guangzhou. Falls back to TENCENTCLOUD_REGION."),
            )
            .with_attribute(
                "protocol",
                Attribute::optional_string()
                    .with_allowed_values(&["https", "http"])
                    .with_description("Endpoint protocol."),
            )
            .with_attribute(
                "domain",
                Attribute::optional_string().with_description("Root domain of the API endpoint."),
            )
            .with_attribute(
                "request_timeout",
                Attribute::optional_int64().with_description("Per-request timeout in seconds."),
            )
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or_default().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_retryable_codes_are_top_level_or_client_errors() {
        for code in retry::RETRYABLE_CODES {
            assert!(!code.is_empty());
            assert!(!code.contains(' '));
        }
        assert!(retry::INITIAL_BACKOFF < retry::MAX_BACKOFF);
        assert!(retry::READ_TIMEOUT < retry::WRITE_TIMEOUT);
    }

    #[test]
    fn test_from_value_null_is_default() {
        let config = ProviderConfig::from_value(serde_json::Value::Null).unwrap();
        assert_eq!(config, ProviderConfig::default());
    }

    #[test]
    fn test_block_values_win_over_env() {
        let config = ProviderConfig::from_value(json!({
            "secret_id": "AKIDblock",
            "region": "ap-guangzhou"
        }))
        .unwrap()
        .with_env_lookup(lookup(&[
            (env::SECRET_ID, "AKIDenv"),
            (env::SECRET_KEY, "keyenv"),
            (env::REGION, "ap-shanghai"),
        ]))
        .unwrap();

        assert_eq!(config.secret_id.as_deref(), Some("AKIDblock"));
        assert_eq!(config.secret_key.as_deref(), Some("keyenv"));
        assert_eq!(config.region.as_deref(), Some("ap-guangzhou"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_timeout_env_is_configuration_error() {
        let err = ProviderConfig::default()
            .with_env_lookup(lookup(&[(env::REQUEST_TIMEOUT, "soon")]))
            .unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));

        let config = ProviderConfig::default()
            .with_env_lookup(lookup(&[(env::REQUEST_TIMEOUT, "60")]))
            .unwrap();
        assert_eq!(config.request_timeout_secs(), 60);
    }

    #[test]
    fn test_validate_reports_missing_fields() {
        let err = ProviderConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("secret_id"));

        let config = ProviderConfig {
            secret_id: Some("id".into()),
            secret_key: Some("key".into()),
            region: Some("ap-guangzhou".into()),
            protocol: Some("ftp".into()),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("protocol"));
    }

    #[test]
    fn test_endpoint_defaults() {
        let config = ProviderConfig::default();
        assert_eq!(config.host(), "wedata.tencentcloudapi.com");
        assert_eq!(config.endpoint(), "https://wedata.tencentcloudapi.com");
        assert_eq!(config.request_timeout_secs(), api::REQUEST_TIMEOUT_SECS);

        let config = ProviderConfig {
            protocol: Some("http".into()),
            domain: Some("internal.example".into()),
            ..Default::default()
        };
        assert_eq!(config.endpoint(), "http://wedata.internal.example");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = ProviderConfig {
            secret_key: Some("super-secret".into()),
            security_token: Some("token".into()),
            ..Default::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("\"token\""));
    }
}
