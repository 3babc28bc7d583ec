//! # authroute
//!
//! OAuth 2.0 grant dispatch and bearer-token authorization core.
//!
//! This crate provides:
//! - Token endpoint sequencing for the RFC 6749 grant types
//! - Bearer token extraction per RFC 6750
//! - Named authorizers for fine-grained access checks
//! - The OAuth 2.0 error taxonomy with HTTP statuses
//!
//! ## Overview
//!
//! [`AuthRoute`] stores no tokens, clients or users and generates nothing
//! cryptographic. The embedding application supplies that through hooks
//! and grant authenticators; the core only decides which of them run, in
//! what order, and what a failure means on the wire. The request type is a
//! type parameter and is read through the header and input hooks, so the
//! core is independent of any HTTP framework.
//!
//! ```ignore
//! let route = AuthRoute::builder()
//!     .with_header_reader(|req: &Request, name: &str| header(req, name))
//!     .with_input_reader(|req: &Request, name: &str| input(req, name))
//!     .with_generate_token(store.clone())
//!     .with_check_access_token(store.clone())
//!     .with_authenticator("password", PasswordAuthenticator::from_fn(verify_user))
//!     .build()?;
//!
//! let tokens = route.authenticate(&req).await?;
//! route.authorize(&req, Some("is_admin"), &[]).await?;
//! ```
//!
//! ## Modules
//!
//! - [`server`] - The dispatch core and its builder
//! - [`authenticators`] - Built-in grant authenticators
//! - [`hooks`] - Contracts implemented by the embedding application
//! - [`extractor`] - Default bearer token extractor
//! - [`registry`] - Authenticator and authorizer registries
//! - [`token`] - Token results and responses
//! - [`error`] - OAuth 2.0 error taxonomy
//! - [`config`] - Configuration and loading

pub mod authenticators;
pub mod config;
pub mod error;
pub mod extractor;
pub mod hooks;
pub mod registry;
pub mod server;
pub mod token;

#[cfg(test)]
mod test_support;

pub use authenticators::{
    AuthorizationCode, AuthorizationCodeAuthenticator, ClientCredentials,
    ClientCredentialsAuthenticator, CredentialVerifier, GrantAuthenticator,
    PasswordAuthenticator, PasswordCredentials,
};
pub use config::{AuthRouteConfig, BearerConfig, ConfigError, UnknownAuthorizerPolicy};
pub use error::{AuthError, BoxError, ErrorKind, OAuthError, OAuthErrorBody};
pub use extractor::BearerTokenExtractor;
pub use hooks::{
    AcceptAnyClient, Authorizer, CheckAccessToken, CheckRefreshToken, GenerateToken,
    GrantContext, HeaderReader, InputReader, RequestReaders, TokenExtractor, VerifyClient,
};
pub use server::{AuthRoute, AuthRouteBuilder};
pub use token::{TokenResponse, TokenResult};

/// Type alias for dispatch results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use authroute::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::authenticators::{
        AuthorizationCode, AuthorizationCodeAuthenticator, ClientCredentials,
        ClientCredentialsAuthenticator, GrantAuthenticator, PasswordAuthenticator,
        PasswordCredentials,
    };
    pub use crate::config::{AuthRouteConfig, ConfigError};
    pub use crate::error::{AuthError, ErrorKind, OAuthError};
    pub use crate::hooks::{
        Authorizer, CheckAccessToken, CheckRefreshToken, GenerateToken, GrantContext,
        TokenExtractor, VerifyClient,
    };
    pub use crate::server::AuthRoute;
    pub use crate::token::{TokenResponse, TokenResult, grant_type};
}
