//! Grant authenticators.
//!
//! A grant authenticator turns the fields of a token request into a
//! credential result for one grant type. The built-in authenticators are
//! thin field-extraction adapters: they read two request inputs, fail with
//! `invalid_grant` when either is missing, and hand both to an injected
//! [`CredentialVerifier`] that holds the actual business logic.
//!
//! | grant type | authenticator | fields |
//! |---|---|---|
//! | `authorization_code` | [`AuthorizationCodeAuthenticator`] | `code`, `redirect_uri` |
//! | `client_credentials` | [`ClientCredentialsAuthenticator`] | `client_id`, `client_secret` |
//! | `password` | [`PasswordAuthenticator`] | `username`, `password` |
//!
//! Custom grants implement [`GrantAuthenticator`] directly.
//!
//! # Example
//!
//! ```ignore
//! use authroute::authenticators::{PasswordAuthenticator, PasswordCredentials};
//!
//! let password = PasswordAuthenticator::from_fn(|_request, creds: PasswordCredentials| async move {
//!     if creds.username == "admin" && creds.password == "1234" {
//!         Ok(User::admin())
//!     } else {
//!         Err(AuthError::from(OAuthError::invalid_grant()))
//!     }
//! });
//! route.add_authenticator("password", password);
//! ```

mod authorization_code;
mod client_credentials;
mod password;

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use crate::AuthResult;
use crate::error::OAuthError;
use crate::server::AuthRoute;

pub use authorization_code::{AuthorizationCode, AuthorizationCodeAuthenticator};
pub use client_credentials::{ClientCredentials, ClientCredentialsAuthenticator};
pub use password::{PasswordAuthenticator, PasswordCredentials};

/// Authenticates the grant-specific part of a token request.
#[async_trait]
pub trait GrantAuthenticator<R, C>: Send + Sync {
    /// Verifies the request and returns the resulting credentials.
    async fn authenticate(&self, request: &R, server: &AuthRoute<R, C>) -> AuthResult<C>;
}

/// Business logic behind a built-in authenticator.
///
/// `request` is `Some` only when the authenticator was configured with
/// `pass_request_context(true)`. Implemented for closures
/// `Fn(Option<&R>, A) -> impl Future<Output = AuthResult<C>>` whose future
/// does not borrow the request.
#[async_trait]
pub trait CredentialVerifier<R, A, C>: Send + Sync {
    async fn verify(&self, request: Option<&R>, credentials: A) -> AuthResult<C>;
}

#[async_trait]
impl<R, A, C, F, Fut> CredentialVerifier<R, A, C> for F
where
    R: Sync,
    A: Send + 'static,
    F: Fn(Option<&R>, A) -> Fut + Send + Sync,
    Fut: Future<Output = AuthResult<C>> + Send + 'static,
{
    async fn verify(&self, request: Option<&R>, credentials: A) -> AuthResult<C> {
        self(request, credentials).await
    }
}

/// The pair of request fields a built-in grant reads.
pub trait GrantFields: Send + Sized + 'static {
    /// Grant type the authenticator is normally registered under.
    const GRANT_TYPE: &'static str;

    /// Default input names of the two fields.
    const DEFAULT_FIELDS: [&'static str; 2];

    /// Builds the credentials from the two field values, in order.
    fn from_fields(first: String, second: String) -> Self;
}

/// Authenticator reading two request fields and delegating to a verifier.
///
/// Use the per-grant aliases such as [`PasswordAuthenticator`].
pub struct FieldPairAuthenticator<R, A, C> {
    fields: [String; 2],
    pass_request_context: bool,
    verifier: Arc<dyn CredentialVerifier<R, A, C>>,
    _credentials: PhantomData<fn() -> A>,
}

impl<R, A, C> FieldPairAuthenticator<R, A, C>
where
    A: GrantFields,
{
    /// Creates an authenticator with the default field names.
    pub fn new(verifier: impl CredentialVerifier<R, A, C> + 'static) -> Self {
        Self {
            fields: A::DEFAULT_FIELDS.map(ToString::to_string),
            pass_request_context: false,
            verifier: Arc::new(verifier),
            _credentials: PhantomData,
        }
    }

    /// Creates an authenticator from an async closure.
    pub fn from_fn<F, Fut>(verify: F) -> Self
    where
        R: Sync + 'static,
        C: 'static,
        F: Fn(Option<&R>, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AuthResult<C>> + Send + 'static,
    {
        Self::new(verify)
    }

    /// Overrides both input names.
    #[must_use]
    pub fn with_fields(mut self, first: impl Into<String>, second: impl Into<String>) -> Self {
        self.fields = [first.into(), second.into()];
        self
    }

    /// Controls whether the verifier receives the request.
    #[must_use]
    pub fn pass_request_context(mut self, pass: bool) -> Self {
        self.pass_request_context = pass;
        self
    }

    /// Input names read from the request, in order.
    #[must_use]
    pub fn fields(&self) -> [&str; 2] {
        [self.fields[0].as_str(), self.fields[1].as_str()]
    }

    /// Returns `true` if the verifier receives the request.
    #[must_use]
    pub fn passes_request_context(&self) -> bool {
        self.pass_request_context
    }

    /// Grant type this authenticator implements.
    #[must_use]
    pub fn grant_type(&self) -> &'static str {
        A::GRANT_TYPE
    }
}

#[async_trait]
impl<R, A, C> GrantAuthenticator<R, C> for FieldPairAuthenticator<R, A, C>
where
    R: Send + Sync + 'static,
    A: GrantFields,
    C: Send + 'static,
{
    async fn authenticate(&self, request: &R, server: &AuthRoute<R, C>) -> AuthResult<C> {
        let [first_field, second_field] = &self.fields;
        let first = required_input(server, request, first_field)?;
        let second = required_input(server, request, second_field)?;

        let credentials = A::from_fields(first, second);
        let request = self.pass_request_context.then_some(request);
        self.verifier.verify(request, credentials).await
    }
}

fn required_input<R, C>(server: &AuthRoute<R, C>, request: &R, field: &str) -> AuthResult<String> {
    server
        .request_input(request, field)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            OAuthError::invalid_grant()
                .describe(format!("Missing required parameter: {field}"))
                .into()
        })
}
