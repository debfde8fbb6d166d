//! Layered TOML configuration.
//!
//! `~/.config/promptcanvas/config.toml`, every field defaulted, credentials
//! resolved from the environment at request time.

mod credentials;
mod loader;
mod types;

pub use credentials::{CredentialStatus, SecretString};
pub use loader::ConfigError;
pub use types::{Config, ProviderConfig, ServerConfig};
