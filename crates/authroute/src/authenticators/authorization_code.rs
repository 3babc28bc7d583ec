//! Authorization code grant (RFC 6749 §4.1).

use serde::{Deserialize, Serialize};

use super::{FieldPairAuthenticator, GrantFields};
use crate::token::grant_type;

/// Fields of an authorization code token request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationCode {
    /// The authorization code received from the authorization endpoint.
    pub code: String,

    /// The redirect URI used in the authorization request.
    pub redirect_uri: String,
}

impl GrantFields for AuthorizationCode {
    const GRANT_TYPE: &'static str = grant_type::AUTHORIZATION_CODE;
    const DEFAULT_FIELDS: [&'static str; 2] = ["code", "redirect_uri"];

    fn from_fields(code: String, redirect_uri: String) -> Self {
        Self { code, redirect_uri }
    }
}

/// Authenticator for the `authorization_code` grant.
pub type AuthorizationCodeAuthenticator<R, C> = FieldPairAuthenticator<R, AuthorizationCode, C>;

impl<R, C> FieldPairAuthenticator<R, AuthorizationCode, C> {
    /// Reads the code from `field` instead of `code`.
    #[must_use]
    pub fn with_code_field(mut self, field: impl Into<String>) -> Self {
        self.fields[0] = field.into();
        self
    }

    /// Reads the redirect URI from `field` instead of `redirect_uri`.
    #[must_use]
    pub fn with_redirect_uri_field(mut self, field: impl Into<String>) -> Self {
        self.fields[1] = field.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authenticators::GrantAuthenticator;
    use crate::error::{AuthError, ErrorKind, OAuthError};
    use crate::test_support::{Subject, TestRequest, test_route};

    const VALID_CODE: &str = "VALID_CODE";

    fn authenticator() -> AuthorizationCodeAuthenticator<TestRequest, Subject> {
        AuthorizationCodeAuthenticator::from_fn(|_request, grant: AuthorizationCode| async move {
            if grant.code == VALID_CODE {
                Ok(Subject::new(format!("code@{}", grant.redirect_uri)))
            } else {
                Err(AuthError::from(OAuthError::invalid_grant()))
            }
        })
    }

    #[tokio::test]
    async fn test_valid_code() {
        let route = test_route();
        let request = TestRequest::new()
            .input("code", VALID_CODE)
            .input("redirect_uri", "myapp.com/callback");

        let subject = authenticator()
            .authenticate(&request, &route)
            .await
            .unwrap();
        assert_eq!(subject.name, "code@myapp.com/callback");
    }

    #[tokio::test]
    async fn test_missing_redirect_uri() {
        let route = test_route();
        let request = TestRequest::new().input("code", VALID_CODE);

        let err = authenticator()
            .authenticate(&request, &route)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidGrant));
    }

    #[tokio::test]
    async fn test_verifier_rejection_passes_through() {
        let route = test_route();
        let request = TestRequest::new()
            .input("code", "EXPIRED")
            .input("redirect_uri", "myapp.com/callback");

        let err = authenticator()
            .authenticate(&request, &route)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidGrant));
    }

    #[tokio::test]
    async fn test_custom_field_names() {
        let route = test_route();
        let request = TestRequest::new()
            .input("auth_code", VALID_CODE)
            .input("callback", "other.app/cb");

        let subject = authenticator()
            .with_code_field("auth_code")
            .with_redirect_uri_field("callback")
            .authenticate(&request, &route)
            .await
            .unwrap();
        assert_eq!(subject.name, "code@other.app/cb");
    }

    #[test]
    fn test_defaults() {
        let authenticator = authenticator();
        assert_eq!(authenticator.fields(), ["code", "redirect_uri"]);
        assert_eq!(authenticator.grant_type(), "authorization_code");
        assert!(!authenticator.passes_request_context());
    }
}
