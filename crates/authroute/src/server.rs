//! The dispatch core.
//!
//! [`AuthRoute`] sequences the token endpoint (`authenticate`) and the
//! protected-resource check (`authorize`):
//!
//! ```text
//! authenticate: grant_type -> verify client -> credentials -> generate token -> response
//!                 |                 |              |                |
//!                 +- unsupported    +- hook error  +- invalid_grant +- invalid_grant (no token)
//!
//! authorize:    extract token -> check access token -> named authorizer
//!                 |                  |                     |
//!                 +- 401             +- hook error         +- access_denied
//! ```
//!
//! Every step after the first is a hook call; errors raised by hooks are
//! returned unchanged.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::AuthResult;
use crate::authenticators::GrantAuthenticator;
use crate::config::{AuthRouteConfig, ConfigError, UnknownAuthorizerPolicy};
use crate::error::{AuthError, ErrorKind, OAuthError};
use crate::extractor::BearerTokenExtractor;
use crate::hooks::{
    AcceptAnyClient, Authorizer, CheckAccessToken, CheckRefreshToken, GenerateToken,
    GrantContext, HeaderReader, InputReader, RequestReaders, TokenExtractor, VerifyClient,
};
use crate::registry::{AuthenticatorRegistry, AuthorizerRegistry};
use crate::token::{TokenResponse, grant_type};

const GRANT_TYPE_INPUT: &str = "grant_type";
const REFRESH_TOKEN_INPUT: &str = "refresh_token";

/// OAuth 2.0 grant dispatch and bearer-token authorization.
///
/// `R` is the transport's request type and `C` the credential value produced
/// by authenticators and consumed by the token generator. Build one with
/// [`AuthRoute::builder`] and share it behind an `Arc`.
pub struct AuthRoute<R, C> {
    config: AuthRouteConfig,
    readers: RequestReaders<R>,
    token_extractor: Arc<dyn TokenExtractor<R>>,
    authenticators: AuthenticatorRegistry<R, C>,
    authorizers: AuthorizerRegistry<R>,
    generate_token: Arc<dyn GenerateToken<R, C>>,
    check_access_token: Arc<dyn CheckAccessToken<R>>,
    check_refresh_token: Option<Arc<dyn CheckRefreshToken<R, C>>>,
    verify_client: Arc<dyn VerifyClient<R>>,
}

impl<R, C> AuthRoute<R, C> {
    /// Starts building a dispatch core.
    #[must_use]
    pub fn builder() -> AuthRouteBuilder<R, C> {
        AuthRouteBuilder::new()
    }

    /// Token type used in responses and passed to the access-token check.
    pub fn token_type(&self) -> &str {
        &self.config.token_type
    }

    /// Validated configuration the route was built with.
    pub fn config(&self) -> &AuthRouteConfig {
        &self.config
    }

    /// Reads a request header through the configured accessor.
    pub fn request_header(&self, request: &R, name: &str) -> Option<String> {
        self.readers.header(request, name)
    }

    /// Reads a request input through the configured accessor.
    pub fn request_input(&self, request: &R, name: &str) -> Option<String> {
        self.readers.input(request, name)
    }

    /// Grant authenticators keyed by grant type.
    pub fn authenticators(&self) -> &AuthenticatorRegistry<R, C> {
        &self.authenticators
    }

    /// Named authorizers consulted by `authorize`.
    pub fn authorizers(&self) -> &AuthorizerRegistry<R> {
        &self.authorizers
    }

    /// Returns `true` if the `refresh_token` grant is enabled.
    pub fn supports_refresh(&self) -> bool {
        self.check_refresh_token.is_some()
    }

    /// Registers the authenticator for `grant_type`, replacing any earlier one.
    ///
    /// `refresh_token` is handled by the refresh-token hook and never reaches
    /// a registered authenticator.
    pub fn add_authenticator(
        &mut self,
        grant_type: impl Into<String>,
        authenticator: impl GrantAuthenticator<R, C> + 'static,
    ) {
        register_authenticator(&mut self.authenticators, grant_type.into(), Arc::new(authenticator));
    }

    /// Registers a named authorizer, replacing any earlier one.
    pub fn add_authorizer(&mut self, name: impl Into<String>, authorizer: impl Authorizer<R> + 'static) {
        self.authorizers.register(name, Arc::new(authorizer));
    }

    pub fn set_header_reader(&mut self, reader: impl HeaderReader<R> + 'static) {
        self.readers.set_header(Arc::new(reader));
    }

    pub fn set_input_reader(&mut self, reader: impl InputReader<R> + 'static) {
        self.readers.set_input(Arc::new(reader));
    }

    pub fn set_token_extractor(&mut self, extractor: impl TokenExtractor<R> + 'static) {
        self.token_extractor = Arc::new(extractor);
    }

    pub fn set_generate_token(&mut self, hook: impl GenerateToken<R, C> + 'static) {
        self.generate_token = Arc::new(hook);
    }

    pub fn set_check_access_token(&mut self, hook: impl CheckAccessToken<R> + 'static) {
        self.check_access_token = Arc::new(hook);
    }

    /// Enables the `refresh_token` grant.
    pub fn set_check_refresh_token(&mut self, hook: impl CheckRefreshToken<R, C> + 'static) {
        self.check_refresh_token = Some(Arc::new(hook));
    }

    pub fn set_verify_client(&mut self, hook: impl VerifyClient<R> + 'static) {
        self.verify_client = Arc::new(hook);
    }

    /// Value of the `WWW-Authenticate` header for a failed request.
    ///
    /// Only 401 failures carry a challenge. A request without a token gets
    /// the bare token type (`Bearer`); other failures also name the error
    /// code (`Bearer error="invalid_token"`).
    pub fn challenge(&self, error: &AuthError) -> Option<String> {
        let oauth = error.as_oauth().filter(|err| err.status() == 401)?;
        if oauth.kind() == ErrorKind::InvalidRequest {
            Some(self.token_type().to_string())
        } else {
            Some(format!("{} error=\"{}\"", self.token_type(), oauth.kind()))
        }
    }
}

impl<R, C> AuthRoute<R, C>
where
    R: Send + Sync + 'static,
    C: Send + 'static,
{
    /// Handles a token request.
    ///
    /// # Errors
    ///
    /// - `unsupported_grant_type` if `grant_type` is missing, unregistered,
    ///   or `refresh_token` without a refresh-token hook
    /// - `invalid_grant` if the generator produced no token
    /// - any error raised by a hook or authenticator, unchanged
    pub async fn authenticate(&self, request: &R) -> AuthResult<TokenResponse> {
        let result = self.dispatch_grant(request).await;
        if let Err(err) = &result {
            debug!(error = err.oauth_error_code(), "Token request rejected");
        }
        result
    }

    async fn dispatch_grant(&self, request: &R) -> AuthResult<TokenResponse> {
        let grant = self
            .request_input(request, GRANT_TYPE_INPUT)
            .filter(|g| !g.is_empty())
            .ok_or_else(|| OAuthError::unsupported_grant_type().describe("Missing grant_type"))?;

        self.verify_client.verify_client(request, &grant).await?;

        let credentials = if grant == grant_type::REFRESH_TOKEN {
            self.refresh_credentials(request).await?
        } else {
            let authenticator = self.authenticators.get(&grant).ok_or_else(|| {
                OAuthError::unsupported_grant_type()
                    .describe(format!("Unsupported grant type: {grant}"))
            })?;
            debug!(grant_type = %grant, "Dispatching grant");
            authenticator.authenticate(request, self).await?
        };

        let context = GrantContext {
            grant_type: &grant,
            server: self,
        };
        let result = self
            .generate_token
            .generate_token(credentials, context)
            .await?
            .ok_or_else(|| OAuthError::invalid_grant().describe("No token issued for this grant"))?;

        debug!(grant_type = %grant, "Token issued");
        Ok(TokenResponse::from_result(result, self.token_type()))
    }

    async fn refresh_credentials(&self, request: &R) -> AuthResult<C> {
        let Some(check) = &self.check_refresh_token else {
            return Err(OAuthError::unsupported_grant_type()
                .describe("Refresh tokens are not supported")
                .into());
        };
        let token = self
            .request_input(request, REFRESH_TOKEN_INPUT)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                OAuthError::invalid_grant().describe("Missing required parameter: refresh_token")
            })?;
        debug!(grant_type = grant_type::REFRESH_TOKEN, "Checking refresh token");
        check.check_refresh_token(request, &token).await
    }

    /// Checks that a request may access a protected resource.
    ///
    /// Without `check` only the access token is validated. With a check
    /// name the registered authorizer must also return `true`.
    ///
    /// # Errors
    ///
    /// - `invalid_request` (401) if the request carries no token
    /// - `access_denied` (401) if the authorizer does not return `true`, or
    ///   the name is unknown and the policy is `deny`
    /// - any error raised by the extractor or a hook, unchanged
    pub async fn authorize(&self, request: &R, check: Option<&str>, args: &[Value]) -> AuthResult<()> {
        let result = self.check_authorization(request, check, args).await;
        if let Err(err) = &result {
            debug!(error = err.oauth_error_code(), check = ?check, "Authorization rejected");
        }
        result
    }

    async fn check_authorization(
        &self,
        request: &R,
        check: Option<&str>,
        args: &[Value],
    ) -> AuthResult<()> {
        let token = self
            .token_extractor
            .extract_token(request, &self.readers)
            .await?
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                OAuthError::with_status(ErrorKind::InvalidRequest, 401)
                    .describe("Missing access token")
            })?;

        self.check_access_token
            .check_access_token(request, &token, self.token_type())
            .await?;

        let Some(name) = check.filter(|n| !n.is_empty()) else {
            return Ok(());
        };

        let Some(authorizer) = self.authorizers.get(name) else {
            return match self.config.unknown_authorizer {
                UnknownAuthorizerPolicy::Allow => {
                    warn!(authorizer = name, "Authorize called with an unregistered authorizer");
                    Ok(())
                }
                UnknownAuthorizerPolicy::Deny => {
                    warn!(authorizer = name, "Denying request for unregistered authorizer");
                    Err(OAuthError::access_denied().into())
                }
            };
        };

        debug!(authorizer = name, "Running authorizer");
        if authorizer.authorize(request, args).await? {
            Ok(())
        } else {
            Err(OAuthError::with_status(ErrorKind::AccessDenied, 401).into())
        }
    }
}

fn register_authenticator<R, C>(
    registry: &mut AuthenticatorRegistry<R, C>,
    name: String,
    authenticator: Arc<dyn GrantAuthenticator<R, C>>,
) {
    if name == grant_type::REFRESH_TOKEN {
        warn!("Authenticator registered for refresh_token will never run; use the refresh-token hook");
    }
    debug!(grant_type = %name, "Registering authenticator");
    registry.register(name, authenticator);
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`AuthRoute`].
///
/// `build` fails with [`ConfigError::MissingHook`] unless the header reader,
/// input reader, token generator and access-token check were supplied.
pub struct AuthRouteBuilder<R, C> {
    config: AuthRouteConfig,
    header_reader: Option<Arc<dyn HeaderReader<R>>>,
    input_reader: Option<Arc<dyn InputReader<R>>>,
    token_extractor: Option<Arc<dyn TokenExtractor<R>>>,
    authenticators: AuthenticatorRegistry<R, C>,
    authorizers: AuthorizerRegistry<R>,
    generate_token: Option<Arc<dyn GenerateToken<R, C>>>,
    check_access_token: Option<Arc<dyn CheckAccessToken<R>>>,
    check_refresh_token: Option<Arc<dyn CheckRefreshToken<R, C>>>,
    verify_client: Option<Arc<dyn VerifyClient<R>>>,
}

impl<R, C> AuthRouteBuilder<R, C> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: AuthRouteConfig::default(),
            header_reader: None,
            input_reader: None,
            token_extractor: None,
            authenticators: AuthenticatorRegistry::new(),
            authorizers: AuthorizerRegistry::new(),
            generate_token: None,
            check_access_token: None,
            check_refresh_token: None,
            verify_client: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: AuthRouteConfig) -> Self {
        self.config = config;
        self
    }

    /// Shorthand for overriding only the token type.
    #[must_use]
    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.config.token_type = token_type.into();
        self
    }

    #[must_use]
    pub fn with_header_reader(mut self, reader: impl HeaderReader<R> + 'static) -> Self {
        self.header_reader = Some(Arc::new(reader));
        self
    }

    #[must_use]
    pub fn with_input_reader(mut self, reader: impl InputReader<R> + 'static) -> Self {
        self.input_reader = Some(Arc::new(reader));
        self
    }

    /// Replaces the default bearer token extractor.
    #[must_use]
    pub fn with_token_extractor(mut self, extractor: impl TokenExtractor<R> + 'static) -> Self {
        self.token_extractor = Some(Arc::new(extractor));
        self
    }

    #[must_use]
    pub fn with_generate_token(mut self, hook: impl GenerateToken<R, C> + 'static) -> Self {
        self.generate_token = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn with_check_access_token(mut self, hook: impl CheckAccessToken<R> + 'static) -> Self {
        self.check_access_token = Some(Arc::new(hook));
        self
    }

    /// Enables the `refresh_token` grant.
    #[must_use]
    pub fn with_check_refresh_token(mut self, hook: impl CheckRefreshToken<R, C> + 'static) -> Self {
        self.check_refresh_token = Some(Arc::new(hook));
        self
    }

    /// Replaces the default client verification, which accepts every client.
    #[must_use]
    pub fn with_verify_client(mut self, hook: impl VerifyClient<R> + 'static) -> Self {
        self.verify_client = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn with_authenticator(
        mut self,
        grant_type: impl Into<String>,
        authenticator: impl GrantAuthenticator<R, C> + 'static,
    ) -> Self {
        register_authenticator(&mut self.authenticators, grant_type.into(), Arc::new(authenticator));
        self
    }

    #[must_use]
    pub fn with_authorizer(mut self, name: impl Into<String>, authorizer: impl Authorizer<R> + 'static) -> Self {
        self.authorizers.register(name, Arc::new(authorizer));
        self
    }
}

impl<R, C> AuthRouteBuilder<R, C>
where
    R: Sync + 'static,
{
    /// Validates the configuration and the required hooks.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingHook`] for the first missing required
    /// hook, or [`ConfigError::Validation`] for an invalid configuration.
    pub fn build(self) -> Result<AuthRoute<R, C>, ConfigError> {
        self.config.validate()?;

        let header = self
            .header_reader
            .ok_or(ConfigError::MissingHook("header_reader"))?;
        let input = self
            .input_reader
            .ok_or(ConfigError::MissingHook("input_reader"))?;
        let generate_token = self
            .generate_token
            .ok_or(ConfigError::MissingHook("generate_token"))?;
        let check_access_token = self
            .check_access_token
            .ok_or(ConfigError::MissingHook("check_access_token"))?;

        let token_extractor = self.token_extractor.unwrap_or_else(|| {
            Arc::new(BearerTokenExtractor::new(self.config.bearer.clone()))
        });
        let verify_client = self
            .verify_client
            .unwrap_or_else(|| Arc::new(AcceptAnyClient));

        Ok(AuthRoute {
            config: self.config,
            readers: RequestReaders::new(header, input),
            token_extractor,
            authenticators: self.authenticators,
            authorizers: self.authorizers,
            generate_token,
            check_access_token,
            check_refresh_token: self.check_refresh_token,
            verify_client,
        })
    }
}

impl<R, C> Default for AuthRouteBuilder<R, C> {
    fn default() -> Self {
        Self::new()
    }
}
