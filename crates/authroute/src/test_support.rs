//! Request type and mock hooks shared by the unit tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::AuthResult;
use crate::error::{AuthError, OAuthError};
use crate::hooks::{CheckAccessToken, CheckRefreshToken, GenerateToken, GrantContext, RequestReaders};
use crate::server::{AuthRoute, AuthRouteBuilder};
use crate::token::{TokenResult, grant_type};

/// Minimal request: case-insensitive headers plus flat inputs.
#[derive(Debug, Clone, Default)]
pub struct TestRequest {
    headers: HashMap<String, String>,
    inputs: HashMap<String, String>,
}

impl TestRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn input(mut self, name: &str, value: impl Into<String>) -> Self {
        self.inputs.insert(name.to_string(), value.into());
        self
    }

    pub fn get_header(&self, name: &str) -> Option<String> {
        self.headers.get(&name.to_ascii_lowercase()).cloned()
    }

    pub fn get_input(&self, name: &str) -> Option<String> {
        self.inputs.get(name).cloned()
    }
}

pub fn test_readers() -> RequestReaders<TestRequest> {
    RequestReaders::new(
        Arc::new(|r: &TestRequest, n: &str| r.get_header(n)),
        Arc::new(|r: &TestRequest, n: &str| r.get_input(n)),
    )
}

/// Credential value threaded from authenticators into the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub name: String,
}

impl Subject {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Issues `token:<name>` / `refreshtoken:<name>`.
///
/// Client credentials get a `Basic` token without a refresh token; any
/// other unlisted grant gets nothing.
pub struct MockTokenGenerator;

#[async_trait]
impl GenerateToken<TestRequest, Subject> for MockTokenGenerator {
    async fn generate_token(
        &self,
        credentials: Subject,
        grant: GrantContext<'_, TestRequest, Subject>,
    ) -> AuthResult<Option<TokenResult>> {
        let access_token = format!("token:{}", credentials.name);
        let result = match grant.grant_type {
            grant_type::PASSWORD | grant_type::REFRESH_TOKEN => Some(
                TokenResult::new(access_token)
                    .with_expires_in(3 * 24 * 3600)
                    .with_refresh_token(format!("refreshtoken:{}", credentials.name)),
            ),
            grant_type::CLIENT_CREDENTIALS => {
                Some(TokenResult::new(access_token).with_token_type("Basic"))
            }
            _ => None,
        };
        Ok(result)
    }
}

/// Accepts any `token:<something>`, denies the rest.
pub struct MockAccessCheck;

#[async_trait]
impl CheckAccessToken<TestRequest> for MockAccessCheck {
    async fn check_access_token(
        &self,
        _request: &TestRequest,
        token: &str,
        _token_type: &str,
    ) -> AuthResult<()> {
        match token.strip_prefix("token:") {
            Some(rest) if !rest.is_empty() => Ok(()),
            _ => Err(OAuthError::access_denied().into()),
        }
    }
}

/// Accepts any `refreshtoken:<something>` as `refreshed_admin`.
pub struct MockRefreshCheck;

#[async_trait]
impl CheckRefreshToken<TestRequest, Subject> for MockRefreshCheck {
    async fn check_refresh_token(&self, _request: &TestRequest, token: &str) -> AuthResult<Subject> {
        match token.strip_prefix("refreshtoken:") {
            Some(rest) if !rest.is_empty() => Ok(Subject::new("refreshed_admin")),
            _ => Err(OAuthError::invalid_grant().into()),
        }
    }
}

/// Refresh check whose backing store is down.
pub struct FailingRefreshCheck;

#[async_trait]
impl CheckRefreshToken<TestRequest, Subject> for FailingRefreshCheck {
    async fn check_refresh_token(&self, _request: &TestRequest, _token: &str) -> AuthResult<Subject> {
        Err(AuthError::hook(std::io::Error::other("token store unavailable")))
    }
}

/// Builder with readers, generator and access check installed.
pub fn test_builder() -> AuthRouteBuilder<TestRequest, Subject> {
    AuthRoute::builder()
        .with_header_reader(|r: &TestRequest, n: &str| r.get_header(n))
        .with_input_reader(|r: &TestRequest, n: &str| r.get_input(n))
        .with_generate_token(MockTokenGenerator)
        .with_check_access_token(MockAccessCheck)
}

/// A built route with no authenticators.
pub fn test_route() -> AuthRoute<TestRequest, Subject> {
    test_builder().build().expect("test route builds")
}
