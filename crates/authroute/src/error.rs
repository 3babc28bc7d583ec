//! OAuth 2.0 error taxonomy.
//!
//! Every failure the dispatch core or a hook reports is either an
//! [`OAuthError`] (one of the closed set of [`ErrorKind`]s from RFC 6749 and
//! RFC 6750) or an unexpected hook failure carried unchanged in
//! [`AuthError::Hook`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Boxed error type used for unexpected hook failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// OAuth 2.0 error codes understood by the dispatch core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request is missing a required parameter or is otherwise malformed.
    InvalidRequest,

    /// Client authentication failed.
    InvalidClient,

    /// The grant or refresh token is invalid, expired or revoked.
    InvalidGrant,

    /// The client is not authorized to use this grant type.
    UnauthorizedClient,

    /// The grant type is missing or not supported.
    UnsupportedGrantType,

    /// The requested scope is invalid or exceeds what was granted.
    InvalidScope,

    /// The resource owner or an authorizer denied the request.
    AccessDenied,

    /// The access token is missing, malformed, expired or revoked.
    InvalidToken,
}

impl ErrorKind {
    /// All error kinds, in declaration order.
    pub const ALL: [ErrorKind; 8] = [
        Self::InvalidRequest,
        Self::InvalidClient,
        Self::InvalidGrant,
        Self::UnauthorizedClient,
        Self::UnsupportedGrantType,
        Self::InvalidScope,
        Self::AccessDenied,
        Self::InvalidToken,
    ];

    /// Returns the wire representation of the error code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidClient => "invalid_client",
            Self::InvalidGrant => "invalid_grant",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::InvalidScope => "invalid_scope",
            Self::AccessDenied => "access_denied",
            Self::InvalidToken => "invalid_token",
        }
    }

    /// Returns the HTTP status used when no override is given.
    #[must_use]
    pub fn default_status(&self) -> u16 {
        match self {
            Self::AccessDenied | Self::InvalidToken => 401,
            Self::InvalidRequest
            | Self::InvalidClient
            | Self::InvalidGrant
            | Self::UnauthorizedClient
            | Self::UnsupportedGrantType
            | Self::InvalidScope => 400,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown error code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown OAuth error code: {0}")]
pub struct UnknownErrorKind(pub String);

impl FromStr for ErrorKind {
    type Err = UnknownErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownErrorKind(s.to_string()))
    }
}

/// An OAuth 2.0 error with its HTTP status.
///
/// The status defaults to [`ErrorKind::default_status`]; the dispatch core
/// overrides it in one place, a request that carries no bearer token, which
/// is reported as `invalid_request` with status 401.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("OAuth error {kind} (status {status})")]
pub struct OAuthError {
    kind: ErrorKind,
    status: u16,
    description: Option<String>,
}

impl OAuthError {
    /// Creates an error with the kind's default status.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            status: kind.default_status(),
            description: None,
        }
    }

    /// Creates an error with an explicit HTTP status.
    #[must_use]
    pub fn with_status(kind: ErrorKind, status: u16) -> Self {
        Self {
            kind,
            status,
            description: None,
        }
    }

    /// Attaches a human-readable description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Creates an `invalid_request` error.
    #[must_use]
    pub fn invalid_request() -> Self {
        Self::new(ErrorKind::InvalidRequest)
    }

    /// Creates an `invalid_client` error.
    #[must_use]
    pub fn invalid_client() -> Self {
        Self::new(ErrorKind::InvalidClient)
    }

    /// Creates an `invalid_grant` error.
    #[must_use]
    pub fn invalid_grant() -> Self {
        Self::new(ErrorKind::InvalidGrant)
    }

    /// Creates an `unauthorized_client` error.
    #[must_use]
    pub fn unauthorized_client() -> Self {
        Self::new(ErrorKind::UnauthorizedClient)
    }

    /// Creates an `unsupported_grant_type` error.
    #[must_use]
    pub fn unsupported_grant_type() -> Self {
        Self::new(ErrorKind::UnsupportedGrantType)
    }

    /// Creates an `invalid_scope` error.
    #[must_use]
    pub fn invalid_scope() -> Self {
        Self::new(ErrorKind::InvalidScope)
    }

    /// Creates an `access_denied` error.
    #[must_use]
    pub fn access_denied() -> Self {
        Self::new(ErrorKind::AccessDenied)
    }

    /// Creates an `invalid_token` error.
    #[must_use]
    pub fn invalid_token() -> Self {
        Self::new(ErrorKind::InvalidToken)
    }

    /// Returns the error kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the HTTP status.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Builds the response body (`{"error": "<kind>"}`).
    #[must_use]
    pub fn to_body(&self) -> OAuthErrorBody {
        OAuthErrorBody {
            error: self.kind,
            error_description: self.description.clone(),
        }
    }
}

impl From<ErrorKind> for OAuthError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl Serialize for OAuthError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_body().serialize(serializer)
    }
}

/// Serializable error body.
///
/// ```json
/// { "error": "invalid_grant" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthErrorBody {
    /// OAuth 2.0 error code.
    pub error: ErrorKind,

    /// Human-readable description, omitted when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

/// Errors returned by the dispatch core and by hooks.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// A recognized OAuth 2.0 failure.
    #[error(transparent)]
    OAuth(#[from] OAuthError),

    /// A hook failed with an error outside the OAuth taxonomy.
    ///
    /// The original error is kept as-is so the transport can log it.
    #[error("Hook failed: {0}")]
    Hook(#[source] BoxError),
}

impl AuthError {
    /// Wraps an unexpected hook failure.
    #[must_use]
    pub fn hook(error: impl Into<BoxError>) -> Self {
        Self::Hook(error.into())
    }

    /// Returns the OAuth error, if this is one.
    #[must_use]
    pub fn as_oauth(&self) -> Option<&OAuthError> {
        match self {
            Self::OAuth(err) => Some(err),
            Self::Hook(_) => None,
        }
    }

    /// Returns the OAuth error kind, if this is an OAuth error.
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        self.as_oauth().map(OAuthError::kind)
    }

    /// Returns the HTTP status. Hook failures map to 500.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::OAuth(err) => err.status(),
            Self::Hook(_) => 500,
        }
    }

    /// Returns the OAuth 2.0 error code for this error.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        match self {
            Self::OAuth(err) => err.kind().as_str(),
            Self::Hook(_) => "server_error",
        }
    }

    /// Returns `true` if this error is attributable to the client (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status())
    }

    /// Returns `true` if this is an unexpected hook failure.
    #[must_use]
    pub fn is_hook_error(&self) -> bool {
        matches!(self, Self::Hook(_))
    }
}

impl From<ErrorKind> for AuthError {
    fn from(kind: ErrorKind) -> Self {
        Self::OAuth(OAuthError::new(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_statuses() {
        assert_eq!(ErrorKind::InvalidRequest.default_status(), 400);
        assert_eq!(ErrorKind::InvalidClient.default_status(), 400);
        assert_eq!(ErrorKind::InvalidGrant.default_status(), 400);
        assert_eq!(ErrorKind::UnauthorizedClient.default_status(), 400);
        assert_eq!(ErrorKind::UnsupportedGrantType.default_status(), 400);
        assert_eq!(ErrorKind::InvalidScope.default_status(), 400);
        assert_eq!(ErrorKind::AccessDenied.default_status(), 401);
        assert_eq!(ErrorKind::InvalidToken.default_status(), 401);
    }

    #[test]
    fn test_error_code_parse() {
        for kind in ErrorKind::ALL {
            assert_eq!(kind.as_str().parse::<ErrorKind>(), Ok(kind));
        }
        assert!("server_error".parse::<ErrorKind>().is_err());
    }

    #[test]
    fn test_status_override() {
        let err = OAuthError::with_status(ErrorKind::InvalidRequest, 401);
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert_eq!(err.status(), 401);

        let err = OAuthError::invalid_request();
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn test_body_serialization() {
        let json = serde_json::to_value(OAuthError::invalid_grant()).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "invalid_grant" }));

        let json =
            serde_json::to_value(OAuthError::invalid_token().describe("Token expired")).unwrap();
        assert_eq!(json["error"], "invalid_token");
        assert_eq!(json["error_description"], "Token expired");
    }

    #[test]
    fn test_body_deserialization() {
        let body: OAuthErrorBody =
            serde_json::from_str(r#"{"error":"unsupported_grant_type"}"#).unwrap();
        assert_eq!(body.error, ErrorKind::UnsupportedGrantType);
        assert!(body.error_description.is_none());
    }

    #[test]
    fn test_auth_error_passthrough() {
        let err: AuthError = OAuthError::invalid_client().into();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidClient));
        assert_eq!(err.oauth_error_code(), "invalid_client");
        assert!(err.is_client_error());

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "db down");
        let err = AuthError::hook(io);
        assert!(err.is_hook_error());
        assert_eq!(err.kind(), None);
        assert_eq!(err.status(), 500);
        assert_eq!(err.oauth_error_code(), "server_error");
        assert_eq!(err.to_string(), "Hook failed: db down");
    }
}
