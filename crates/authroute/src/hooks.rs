//! Hook contracts supplied by the embedding application.
//!
//! The dispatch core never touches storage, cryptography or the transport.
//! Everything it needs from the outside world goes through the traits in
//! this module:
//!
//! | hook | trait | required |
//! |---|---|---|
//! | header lookup | [`HeaderReader`] | yes |
//! | body/query lookup | [`InputReader`] | yes |
//! | token generation | [`GenerateToken`] | yes |
//! | access token check | [`CheckAccessToken`] | yes |
//! | refresh token check | [`CheckRefreshToken`] | only for the `refresh_token` grant |
//! | client verification | [`VerifyClient`] | no, defaults to [`AcceptAnyClient`] |
//! | named authorization checks | [`Authorizer`] | no |
//!
//! Hooks report OAuth failures as [`OAuthError`](crate::OAuthError) values
//! converted into [`AuthError`](crate::AuthError); any other failure should
//! be wrapped with [`AuthError::hook`](crate::AuthError::hook) and is passed
//! to the caller untouched.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::AuthResult;
use crate::server::AuthRoute;
use crate::token::TokenResult;

// =============================================================================
// Request accessors
// =============================================================================

/// Looks up a request header by name.
///
/// Implemented for any `Fn(&R, &str) -> Option<String>`.
pub trait HeaderReader<R>: Send + Sync {
    /// Returns the header value, if present.
    fn header(&self, request: &R, name: &str) -> Option<String>;
}

impl<R, F> HeaderReader<R> for F
where
    F: Fn(&R, &str) -> Option<String> + Send + Sync,
{
    fn header(&self, request: &R, name: &str) -> Option<String> {
        self(request, name)
    }
}

/// Looks up a request input (body or query parameter) by name.
///
/// Whether the body or the query string is consulted is up to the
/// transport, typically depending on the HTTP method.
pub trait InputReader<R>: Send + Sync {
    /// Returns the input value, if present.
    fn input(&self, request: &R, name: &str) -> Option<String>;
}

impl<R, F> InputReader<R> for F
where
    F: Fn(&R, &str) -> Option<String> + Send + Sync,
{
    fn input(&self, request: &R, name: &str) -> Option<String> {
        self(request, name)
    }
}

/// The pair of request accessors, shared with authenticators and extractors.
pub struct RequestReaders<R> {
    header: Arc<dyn HeaderReader<R>>,
    input: Arc<dyn InputReader<R>>,
}

impl<R> RequestReaders<R> {
    pub(crate) fn new(header: Arc<dyn HeaderReader<R>>, input: Arc<dyn InputReader<R>>) -> Self {
        Self { header, input }
    }

    /// Reads a header.
    pub fn header(&self, request: &R, name: &str) -> Option<String> {
        self.header.header(request, name)
    }

    /// Reads an input parameter.
    pub fn input(&self, request: &R, name: &str) -> Option<String> {
        self.input.input(request, name)
    }

    pub(crate) fn set_header(&mut self, header: Arc<dyn HeaderReader<R>>) {
        self.header = header;
    }

    pub(crate) fn set_input(&mut self, input: Arc<dyn InputReader<R>>) {
        self.input = input;
    }
}

impl<R> Clone for RequestReaders<R> {
    fn clone(&self) -> Self {
        Self {
            header: Arc::clone(&self.header),
            input: Arc::clone(&self.input),
        }
    }
}

// =============================================================================
// Token endpoint hooks
// =============================================================================

/// Grant information passed to [`GenerateToken`].
pub struct GrantContext<'a, R, C> {
    /// The grant type of the request (`password`, `refresh_token`, ...).
    pub grant_type: &'a str,

    /// The dispatch core handling the request.
    pub server: &'a AuthRoute<R, C>,
}

/// Verifies the calling client before any grant-specific work.
///
/// Runs for every grant type, including `refresh_token`. On failure the
/// implementation returns `invalid_client` and is responsible for any
/// transport-level challenge it wants to send.
#[async_trait]
pub trait VerifyClient<R>: Send + Sync {
    async fn verify_client(&self, request: &R, grant_type: &str) -> AuthResult<()>;
}

/// Default client verification: every client is accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAnyClient;

#[async_trait]
impl<R: Sync> VerifyClient<R> for AcceptAnyClient {
    async fn verify_client(&self, _request: &R, _grant_type: &str) -> AuthResult<()> {
        Ok(())
    }
}

/// Issues tokens for verified credentials.
#[async_trait]
pub trait GenerateToken<R, C>: Send + Sync {
    /// Generates tokens for `credentials`.
    ///
    /// Returning `Ok(None)` means no token could be produced for this grant
    /// and is reported to the client as `invalid_grant`.
    async fn generate_token(
        &self,
        credentials: C,
        grant: GrantContext<'_, R, C>,
    ) -> AuthResult<Option<TokenResult>>;
}

/// Resolves a refresh token into the credentials it was issued for.
///
/// Fails with `invalid_grant` when the token is unknown, expired or revoked.
#[async_trait]
pub trait CheckRefreshToken<R, C>: Send + Sync {
    async fn check_refresh_token(&self, request: &R, token: &str) -> AuthResult<C>;
}

// =============================================================================
// Resource access hooks
// =============================================================================

/// Validates an access token presented to a protected resource.
///
/// Fails with `invalid_token` or `access_denied`.
#[async_trait]
pub trait CheckAccessToken<R>: Send + Sync {
    async fn check_access_token(&self, request: &R, token: &str, token_type: &str)
    -> AuthResult<()>;
}

/// Locates the access token in a request.
///
/// [`BearerTokenExtractor`](crate::extractor::BearerTokenExtractor) is used
/// unless the application installs its own.
#[async_trait]
pub trait TokenExtractor<R>: Send + Sync {
    /// Returns `Ok(None)` when the request carries no token.
    async fn extract_token(
        &self,
        request: &R,
        readers: &RequestReaders<R>,
    ) -> AuthResult<Option<String>>;
}

/// A named fine-grained access check run after the access token is valid.
///
/// Access is granted only when the check returns `Ok(true)`. Implemented for
/// closures `Fn(&R, &[Value]) -> impl Future<Output = AuthResult<bool>>`
/// whose future does not borrow the arguments.
#[async_trait]
pub trait Authorizer<R>: Send + Sync {
    async fn authorize(&self, request: &R, args: &[Value]) -> AuthResult<bool>;
}

#[async_trait]
impl<R, F, Fut> Authorizer<R> for F
where
    R: Sync,
    F: Fn(&R, &[Value]) -> Fut + Send + Sync,
    Fut: Future<Output = AuthResult<bool>> + Send + 'static,
{
    async fn authorize(&self, request: &R, args: &[Value]) -> AuthResult<bool> {
        self(request, args).await
    }
}
