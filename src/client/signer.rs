//! TC3-HMAC-SHA256 request signing.
//!
//! Every call is a `POST /` with a JSON body. Only `content-type` and
//! `host` are signed, which keeps the canonical request fixed apart from
//! the host and the payload hash.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::digest::Output;
use sha2::{Digest, Sha256};

use super::credential::Credential;
use crate::config::api;
use crate::error::ProviderError;

type HmacSha256 = Hmac<Sha256>;

const SIGNED_HEADERS: &str = "content-type;host";
const TERMINATOR: &str = "tc3_request";

/// Output of [`sign`]: the header value plus the pieces it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Value for the `Authorization` header.
    pub authorization: String,
    /// `YYYY-MM-DD/service/tc3_request`
    pub credential_scope: String,
    /// Hex-encoded HMAC.
    pub signature: String,
}

/// Sign a request body for `host` at `timestamp` (unix seconds).
pub fn sign(
    credential: &Credential,
    service: &str,
    host: &str,
    payload: &[u8],
    timestamp: i64,
) -> Result<Signature, ProviderError> {
    let date = DateTime::<Utc>::from_timestamp(timestamp, 0)
        .ok_or_else(|| ProviderError::Sdk(format!("invalid request timestamp {}", timestamp)))?
        .format("%Y-%m-%d")
        .to_string();

    let canonical_request = format!(
        "POST\n/\n\ncontent-type:{}\nhost:{}\n\n{}\n{}",
        api::CONTENT_TYPE,
        host,
        SIGNED_HEADERS,
        sha256_hex(payload)
    );

    let credential_scope = format!("{}/{}/{}", date, service, TERMINATOR);
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        api::ALGORITHM,
        timestamp,
        credential_scope,
        sha256_hex(canonical_request.as_bytes())
    );

    let secret_date = hmac_sha256(
        format!("TC3{}", credential.secret_key()).as_bytes(),
        date.as_bytes(),
    )?;
    let secret_service = hmac_sha256(&secret_date, service.as_bytes())?;
    let secret_signing = hmac_sha256(&secret_service, TERMINATOR.as_bytes())?;
    let signature = format!("{:x}", hmac_sha256(&secret_signing, string_to_sign.as_bytes())?);

    let authorization = format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        api::ALGORITHM,
        credential.secret_id(),
        credential_scope,
        SIGNED_HEADERS,
        signature
    );

    Ok(Signature {
        authorization,
        credential_scope,
        signature,
    })
}

fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<Output<Sha256>, ProviderError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| ProviderError::Sdk(format!("failed to initialise HMAC: {}", e)))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes())
}
