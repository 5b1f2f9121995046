//! Signed HTTP client for the WeData API.
//!
//! All actions share one shape: `POST /` with a JSON body, the action name
//! in `X-TC-Action` and a TC3-HMAC-SHA256 `Authorization` header. Replies
//! are wrapped in `{"Response": {...}}` and carry an `Error` object on
//! failure.

pub mod credential;
pub mod ratelimit;
pub mod retry;
pub mod signer;

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

pub use credential::Credential;
pub use ratelimit::RateLimiter;
pub use retry::{read_retry_error, retry, retry_error, retry_error_with, RetryError};

use crate::config::{api, ProviderConfig};
use crate::error::{ProviderError, HTTP_STATUS_ERROR_CODE};

/// WeData API client
pub struct WeDataClient {
    http: Client,
    credential: Credential,
    region: String,
    host: String,
    endpoint: String,
    limiter: RateLimiter,
}

impl std::fmt::Debug for WeDataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeDataClient")
            .field("credential", &self.credential)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "Code", default)]
    code: String,
    #[serde(rename = "Message", default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResponseHeader {
    #[serde(rename = "RequestId", default)]
    request_id: String,
    #[serde(rename = "Error")]
    error: Option<ApiErrorBody>,
}

impl WeDataClient {
    /// Create a client with pooled connections and the given request timeout.
    pub fn new(
        credential: Credential,
        region: impl Into<String>,
        host: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let http = Client::builder()
            .pool_max_idle_per_host(20)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            http,
            credential,
            region: region.into(),
            host: host.into(),
            endpoint: endpoint.into(),
            limiter: RateLimiter::default(),
        }
    }

    /// Build a client from a validated provider configuration.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        config.validate()?;
        let credential = Credential::from_config(config)?;
        let region = config.region.clone().unwrap_or_default();
        Ok(Self::new(
            credential,
            region,
            config.host(),
            config.endpoint(),
            Duration::from_secs(config.request_timeout_secs()),
        ))
    }

    /// Create a client pointed at `base_url` (mock servers, private endpoints).
    ///
    /// The signed host is taken from the URL.
    pub fn with_endpoint(
        credential: Credential,
        region: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let endpoint = base_url.into().trim_end_matches('/').to_string();
        let host = reqwest::Url::parse(&endpoint)
            .ok()
            .and_then(|url| {
                url.host_str().map(|h| match url.port() {
                    Some(port) => format!("{}:{}", h, port),
                    None => h.to_string(),
                })
            })
            .unwrap_or_else(|| endpoint.clone());

        let http = Client::builder().build().unwrap_or_else(|_| Client::new());
        Self {
            http,
            credential,
            region: region.into(),
            host,
            endpoint,
            limiter: RateLimiter::new(0),
        }
    }

    /// Region sent in `X-TC-Region`.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Endpoint the requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Call `action` with `request` as the body and decode the `Response` object.
    pub async fn request<Req, Resp>(&self, action: &str, request: &Req) -> Result<Resp, ProviderError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        self.limiter.check(action).await;

        let payload = serde_json::to_vec(request)?;
        let timestamp = chrono::Utc::now().timestamp();
        let signed = signer::sign(&self.credential, api::SERVICE, &self.host, &payload, timestamp)?;

        trace!(action, body = %String::from_utf8_lossy(&payload), "Sending request");

        let mut builder = self
            .http
            .post(format!("{}/", self.endpoint))
            .header("Authorization", signed.authorization)
            .header("Content-Type", api::CONTENT_TYPE)
            .header("Host", &self.host)
            .header("X-TC-Action", action)
            .header("X-TC-Version", api::VERSION)
            .header("X-TC-Timestamp", timestamp.to_string())
            .header("X-TC-Region", &self.region)
            .header("X-TC-Language", api::LANGUAGE);
        if let Some(token) = self.credential.token() {
            builder = builder.header("X-TC-Token", token);
        }

        let response = builder.body(payload).send().await.map_err(|e| {
            error!(action, error = %e, "Request failed");
            ProviderError::from(e)
        })?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            let err = ProviderError::api(
                HTTP_STATUS_ERROR_CODE,
                format!(
                    "HTTP {} calling {}: {}",
                    status.as_u16(),
                    action,
                    String::from_utf8_lossy(&body)
                ),
            );
            error!(action, status = status.as_u16(), "Unexpected HTTP status");
            return Err(err);
        }

        decode_response(action, &body)
    }
}

fn decode_response<Resp: DeserializeOwned>(action: &str, body: &[u8]) -> Result<Resp, ProviderError> {
    let mut envelope: serde_json::Value = serde_json::from_slice(body)?;
    let inner = envelope
        .get_mut("Response")
        .map(serde_json::Value::take)
        .ok_or_else(|| ProviderError::Sdk(format!("{} reply has no Response object", action)))?;

    let header: ResponseHeader = serde_json::from_value(inner.clone())?;
    if let Some(api_error) = header.error {
        error!(
            action,
            code = %api_error.code,
            request_id = %header.request_id,
            message = %api_error.message,
            "API returned an error"
        );
        return Err(ProviderError::Api {
            code: api_error.code,
            message: api_error.message,
            request_id: header.request_id,
        });
    }

    debug!(action, request_id = %header.request_id, "API call succeeded");
    Ok(serde_json::from_value(inner)?)
}
