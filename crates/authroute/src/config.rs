//! Dispatch core configuration.
//!
//! # Example (TOML)
//!
//! ```toml
//! token_type = "Bearer"
//! unknown_authorizer = "deny"
//!
//! [bearer]
//! input_name = "access_token"
//! header_name = "Authorization"
//! scheme = "Bearer"
//! ```

use serde::{Deserialize, Serialize};

/// Errors raised while loading configuration or constructing the dispatch core.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A hook that has no safe default was not supplied.
    #[error("Missing required hook: {0}")]
    MissingHook(&'static str),

    /// A configuration value is out of range or malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The configuration sources could not be read or deserialized.
    #[error("Load error: {0}")]
    Load(String),
}

impl ConfigError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Root configuration of an [`AuthRoute`](crate::AuthRoute).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthRouteConfig {
    /// Token type placed in token responses when the generator omits one,
    /// and passed to the access-token check.
    pub token_type: String,

    /// What `authorize` does when asked for an authorizer that was never
    /// registered.
    pub unknown_authorizer: UnknownAuthorizerPolicy,

    /// Settings of the default bearer token extractor.
    pub bearer: BearerConfig,
}

impl Default for AuthRouteConfig {
    fn default() -> Self {
        Self {
            token_type: "Bearer".to_string(),
            unknown_authorizer: UnknownAuthorizerPolicy::default(),
            bearer: BearerConfig::default(),
        }
    }
}

impl AuthRouteConfig {
    /// Validates value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_token_word("token_type", &self.token_type)?;
        validate_token_word("bearer.scheme", &self.bearer.scheme)?;
        if self.bearer.input_name.is_empty() {
            return Err(ConfigError::validation("bearer.input_name must not be empty"));
        }
        if self.bearer.header_name.is_empty() {
            return Err(ConfigError::validation(
                "bearer.header_name must not be empty",
            ));
        }
        Ok(())
    }
}

fn validate_token_word(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::validation(format!("{field} must not be empty")));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ConfigError::validation(format!(
            "{field} must not contain whitespace"
        )));
    }
    Ok(())
}

/// Behaviour of `authorize` for an unregistered authorizer name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownAuthorizerPolicy {
    /// Log a warning and let the request through.
    #[default]
    Allow,
    /// Reject the request with `access_denied`.
    Deny,
}

/// Default bearer token extractor settings (RFC 6750).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BearerConfig {
    /// Request input checked before the header.
    pub input_name: String,

    /// Header carrying `<scheme> <token>`.
    pub header_name: String,

    /// Scheme matched case-insensitively.
    pub scheme: String,
}

impl Default for BearerConfig {
    fn default() -> Self {
        Self {
            input_name: "access_token".to_string(),
            header_name: "Authorization".to_string(),
            scheme: "Bearer".to_string(),
        }
    }
}

pub mod loader {
    use super::{AuthRouteConfig, ConfigError};
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    /// Default configuration file looked up when no path is given.
    pub const DEFAULT_CONFIG_FILE: &str = "authroute.toml";

    /// Loads configuration from an optional TOML file and the environment.
    ///
    /// Environment variables override file values, e.g.
    /// `AUTHROUTE__TOKEN_TYPE=MAC` or `AUTHROUTE__BEARER__INPUT_NAME=token`.
    pub fn load_config(path: Option<&str>) -> Result<AuthRouteConfig, ConfigError> {
        let mut builder = Config::builder();
        let path = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));
        if path.exists() {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(
            Environment::with_prefix("AUTHROUTE")
                .try_parsing(true)
                .separator("__"),
        );
        let merged: AuthRouteConfig = builder
            .build()
            .map_err(|e| ConfigError::Load(format!("config build error: {e}")))?
            .try_deserialize()
            .map_err(|e| ConfigError::Load(format!("config deserialize error: {e}")))?;
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AuthRouteConfig::default();
        assert_eq!(config.token_type, "Bearer");
        assert_eq!(config.unknown_authorizer, UnknownAuthorizerPolicy::Allow);
        assert_eq!(config.bearer.input_name, "access_token");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_blank_token_type() {
        let config = AuthRouteConfig {
            token_type: String::new(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let config = AuthRouteConfig {
            token_type: "Bear er".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AuthRouteConfig =
            serde_json::from_str(r#"{"unknown_authorizer":"deny"}"#).unwrap();
        assert_eq!(config.unknown_authorizer, UnknownAuthorizerPolicy::Deny);
        assert_eq!(config.token_type, "Bearer");
        assert_eq!(config.bearer.header_name, "Authorization");
    }
}
