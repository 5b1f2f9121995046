//! Access key pair used to sign requests.

use crate::config::ProviderConfig;
use crate::error::ProviderError;

/// Secret id, secret key and an optional session token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    secret_id: String,
    secret_key: String,
    token: Option<String>,
}

impl Credential {
    /// Create a credential from a permanent key pair.
    pub fn new(secret_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            secret_id: secret_id.into(),
            secret_key: secret_key.into(),
            token: None,
        }
    }

    /// Attach a session token (temporary credentials).
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = if token.is_empty() { None } else { Some(token) };
        self
    }

    /// Build from a validated provider configuration.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let secret_id = config
            .secret_id
            .clone()
            .ok_or_else(|| ProviderError::Configuration("secret_id is not set".to_string()))?;
        let secret_key = config
            .secret_key
            .clone()
            .ok_or_else(|| ProviderError::Configuration("secret_key is not set".to_string()))?;

        let credential = Self::new(secret_id, secret_key);
        Ok(match &config.security_token {
            Some(token) => credential.with_token(token.clone()),
            None => credential,
        })
    }

    /// Access key id.
    pub fn secret_id(&self) -> &str {
        &self.secret_id
    }

    pub(crate) fn secret_key(&self) -> &str {
        &self.secret_key
    }

    /// Session token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"***")
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_key_and_token() {
        let credential = Credential::new("AKIDexample", "very-secret").with_token("session");
        let rendered = format!("{:?}", credential);
        assert!(rendered.contains("AKIDexample"));
        assert!(!rendered.contains("very-secret"));
        assert!(!rendered.contains("session"));
    }

    #[test]
    fn test_empty_token_is_ignored() {
        let credential = Credential::new("id", "key").with_token("");
        assert_eq!(credential.token(), None);
    }

    #[test]
    fn test_from_config() {
        let config = ProviderConfig {
            secret_id: Some("id".into()),
            secret_key: Some("key".into()),
            security_token: Some("tok".into()),
            ..Default::default()
        };
        let credential = Credential::from_config(&config).unwrap();
        assert_eq!(credential.secret_id(), "id");
        assert_eq!(credential.secret_key(), "key");
        assert_eq!(credential.token(), Some("tok"));

        let err = Credential::from_config(&ProviderConfig::default()).unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }
}
