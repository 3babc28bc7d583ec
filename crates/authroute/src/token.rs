//! Token generation results and the normalized token response.
//!
//! The generate-token hook returns a [`TokenResult`]; the dispatch core turns
//! it into a [`TokenResponse`] by filling in the configured token type when
//! the hook left it out. Optional fields that the hook did not set are
//! omitted from the serialized response rather than emitted as `null`.

use serde::{Deserialize, Serialize};

/// Grant type names defined by RFC 6749.
pub mod grant_type {
    /// Authorization code grant (RFC 6749 §4.1).
    pub const AUTHORIZATION_CODE: &str = "authorization_code";
    /// Resource owner password credentials grant (RFC 6749 §4.3).
    pub const PASSWORD: &str = "password";
    /// Client credentials grant (RFC 6749 §4.4).
    pub const CLIENT_CREDENTIALS: &str = "client_credentials";
    /// Refresh token grant (RFC 6749 §6), handled by the dispatch core itself.
    pub const REFRESH_TOKEN: &str = "refresh_token";
}

/// Output of the generate-token hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResult {
    /// The issued access token.
    pub access_token: String,

    /// Token type; the configured default is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// Access token lifetime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,

    /// Refresh token, if one was issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Granted scopes (space-separated).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl TokenResult {
    /// Creates a result carrying only an access token.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: None,
            expires_in: None,
            refresh_token: None,
            scope: None,
        }
    }

    /// Sets the token type.
    #[must_use]
    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = Some(token_type.into());
        self
    }

    /// Sets the lifetime in seconds.
    #[must_use]
    pub fn with_expires_in(mut self, seconds: u64) -> Self {
        self.expires_in = Some(seconds);
        self
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }

    /// Sets the granted scope.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

/// Normalized token endpoint response (RFC 6749 §5.1).
///
/// ```json
/// {
///   "access_token": "2YotnFZFEjr1zCsicMWpAA",
///   "token_type": "Bearer",
///   "expires_in": 3600,
///   "refresh_token": "tGzv3JOkF0XG5Qx2TlKWIA"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The issued access token.
    pub access_token: String,

    /// Token type, always present.
    pub token_type: String,

    /// Access token lifetime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,

    /// Refresh token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Granted scopes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl TokenResponse {
    /// Normalizes a generator result, defaulting the token type.
    #[must_use]
    pub fn from_result(result: TokenResult, default_token_type: &str) -> Self {
        Self {
            access_token: result.access_token,
            token_type: result
                .token_type
                .unwrap_or_else(|| default_token_type.to_string()),
            expires_in: result.expires_in,
            refresh_token: result.refresh_token,
            scope: result.scope,
        }
    }
}
