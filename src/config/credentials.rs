//! Credential resolution from the environment.
//!
//! API keys are never stored in the config file; the config names the
//! environment variable and the key is resolved on demand at request time.

use super::types::ProviderConfig;

/// Wrapper for sensitive strings that prevents accidental logging.
///
/// The inner value is never exposed via Debug or Display traits.
/// Use `expose()` to access the actual value when needed for API calls.
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    /// Create a new secret string.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Expose the inner value.
    ///
    /// Use sparingly and only when actually sending to the provider.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretString(••••••••)")
    }
}

impl std::fmt::Display for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "••••••••")
    }
}

/// Status of credential resolution for the provider.
#[derive(Debug, Clone)]
pub enum CredentialStatus {
    /// API key resolved successfully.
    Configured(SecretString),
    /// API key is missing or empty.
    Unconfigured {
        /// Reason for missing configuration.
        reason: String,
    },
}

impl ProviderConfig {
    /// Resolve the API key from the configured environment variable.
    ///
    /// Called on demand and NOT cached, so a process restart is never needed
    /// after exporting a key into the environment of a new shell.
    pub fn resolve_credential(&self) -> CredentialStatus {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => {
                CredentialStatus::Configured(SecretString::new(key))
            }
            Ok(_) => CredentialStatus::Unconfigured {
                reason: format!("environment variable {} is empty", self.api_key_env),
            },
            Err(_) => CredentialStatus::Unconfigured {
                reason: format!("environment variable {} is not set", self.api_key_env),
            },
        }
    }

    /// Check whether a usable API key is present.
    pub fn is_configured(&self) -> bool {
        matches!(self.resolve_credential(), CredentialStatus::Configured(_))
    }
}
