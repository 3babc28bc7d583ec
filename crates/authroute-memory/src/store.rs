//! Token store backed by concurrent maps.
//!
//! # Security
//!
//! - Tokens are 256-bit random values encoded as base64url
//! - Only SHA-256 hashes of tokens are kept, never the tokens themselves
//! - Expired entries are rejected on lookup and removed by `purge_expired`

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use authroute::token::grant_type;
use authroute::{
    AuthResult, CheckAccessToken, CheckRefreshToken, GenerateToken, GrantContext, OAuthError,
    TokenResult,
};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

/// Token lifetimes and issuance rules.
///
/// # Example (TOML)
///
/// ```toml
/// access_token_lifetime = "1h"
/// refresh_token_lifetime = "90days"
/// issue_refresh_tokens = true
/// refresh_token_rotation = true
///
/// [token_types]
/// client_credentials = "Basic"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenStoreConfig {
    /// Access token lifetime.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Refresh token lifetime.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,

    /// Issue refresh tokens. Never issued for `client_credentials`.
    pub issue_refresh_tokens: bool,

    /// Consume a refresh token on use and issue a new one with the new
    /// access token. When disabled the refresh token stays valid until it
    /// expires and the refresh grant returns no new refresh token.
    pub refresh_token_rotation: bool,

    /// Token type per grant type. Grants not listed use the route's
    /// configured token type.
    pub token_types: BTreeMap<String, String>,
}

impl Default for TokenStoreConfig {
    fn default() -> Self {
        Self {
            access_token_lifetime: Duration::from_secs(3600), // 1 hour
            refresh_token_lifetime: Duration::from_secs(90 * 24 * 3600), // 90 days
            issue_refresh_tokens: true,
            refresh_token_rotation: true,
            token_types: BTreeMap::new(),
        }
    }
}

struct StoredToken<C> {
    credentials: C,
    expires_at: OffsetDateTime,
}

impl<C> StoredToken<C> {
    fn is_expired(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}

struct StoreInner<C> {
    config: TokenStoreConfig,
    access_tokens: DashMap<String, StoredToken<C>>,
    refresh_tokens: DashMap<String, StoredToken<C>>,
}

/// Number of live entries, expired ones included until purged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub access_tokens: usize,
    pub refresh_tokens: usize,
}

/// In-memory token store.
///
/// Cloning is cheap and clones share the same maps, so one store can be
/// installed as all three token hooks.
pub struct MemoryTokenStore<C> {
    inner: Arc<StoreInner<C>>,
}

impl<C> Clone for MemoryTokenStore<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Clone> MemoryTokenStore<C> {
    pub fn new(config: TokenStoreConfig) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                config,
                access_tokens: DashMap::new(),
                refresh_tokens: DashMap::new(),
            }),
        }
    }

    pub fn config(&self) -> &TokenStoreConfig {
        &self.inner.config
    }

    /// Issues an access token, and a refresh token where the rules allow,
    /// for `credentials`.
    pub fn issue(&self, credentials: C, grant: &str) -> TokenResult {
        let config = &self.inner.config;
        let now = OffsetDateTime::now_utc();

        let access_token = generate_token();
        let mut result = TokenResult::new(access_token.clone())
            .with_expires_in(config.access_token_lifetime.as_secs());
        if let Some(token_type) = config.token_types.get(grant) {
            result = result.with_token_type(token_type.clone());
        }

        if self.issues_refresh_token(grant) {
            let refresh_token = generate_token();
            self.inner.refresh_tokens.insert(
                hash_token(&refresh_token),
                StoredToken {
                    credentials: credentials.clone(),
                    expires_at: expiry(now, config.refresh_token_lifetime),
                },
            );
            result = result.with_refresh_token(refresh_token);
        }

        self.inner.access_tokens.insert(
            hash_token(&access_token),
            StoredToken {
                credentials,
                expires_at: expiry(now, config.access_token_lifetime),
            },
        );

        debug!(
            grant_type = grant,
            refresh = result.refresh_token.is_some(),
            "Issued token"
        );
        result
    }

    fn issues_refresh_token(&self, grant: &str) -> bool {
        let config = &self.inner.config;
        if !config.issue_refresh_tokens || grant == grant_type::CLIENT_CREDENTIALS {
            return false;
        }
        grant != grant_type::REFRESH_TOKEN || config.refresh_token_rotation
    }

    /// Credentials behind a valid access token.
    pub fn access_credentials(&self, token: &str) -> Option<C> {
        lookup(&self.inner.access_tokens, token)
    }

    /// Credentials behind a valid refresh token, without consuming it.
    pub fn refresh_credentials(&self, token: &str) -> Option<C> {
        lookup(&self.inner.refresh_tokens, token)
    }

    fn redeem_refresh_token(&self, token: &str) -> Option<C> {
        if !self.inner.config.refresh_token_rotation {
            return self.refresh_credentials(token);
        }
        let (_, stored) = self.inner.refresh_tokens.remove(&hash_token(token))?;
        if stored.is_expired(OffsetDateTime::now_utc()) {
            return None;
        }
        Some(stored.credentials)
    }

    /// Revokes an access or refresh token. Returns `true` if it was known.
    pub fn revoke(&self, token: &str) -> bool {
        let hash = hash_token(token);
        let access = self.inner.access_tokens.remove(&hash).is_some();
        let refresh = self.inner.refresh_tokens.remove(&hash).is_some();
        access || refresh
    }

    /// Removes expired entries and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = OffsetDateTime::now_utc();
        let mut removed = 0;
        for map in [&self.inner.access_tokens, &self.inner.refresh_tokens] {
            map.retain(|_, stored| {
                if stored.is_expired(now) {
                    removed += 1;
                    false
                } else {
                    true
                }
            });
        }
        if removed > 0 {
            debug!(removed, "Purged expired tokens");
        }
        removed
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            access_tokens: self.inner.access_tokens.len(),
            refresh_tokens: self.inner.refresh_tokens.len(),
        }
    }
}

fn lookup<C: Clone>(map: &DashMap<String, StoredToken<C>>, token: &str) -> Option<C> {
    let hash = hash_token(token);
    let entry = map.get(&hash)?;
    if entry.is_expired(OffsetDateTime::now_utc()) {
        drop(entry);
        map.remove(&hash);
        return None;
    }
    Some(entry.credentials.clone())
}

fn expiry(now: OffsetDateTime, lifetime: Duration) -> OffsetDateTime {
    let lifetime = time::Duration::try_from(lifetime).unwrap_or(time::Duration::MAX);
    now.saturating_add(lifetime)
}

/// Hashes a token value with SHA-256 (hex encoded).
#[must_use]
pub fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generates a 256-bit random token encoded as base64url (43 characters).
#[must_use]
pub fn generate_token() -> String {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    let mut bytes = [0u8; 32];
    rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[async_trait]
impl<R, C> GenerateToken<R, C> for MemoryTokenStore<C>
where
    R: Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    async fn generate_token(
        &self,
        credentials: C,
        grant: GrantContext<'_, R, C>,
    ) -> AuthResult<Option<TokenResult>> {
        Ok(Some(self.issue(credentials, grant.grant_type)))
    }
}

#[async_trait]
impl<R, C> CheckAccessToken<R> for MemoryTokenStore<C>
where
    R: Sync,
    C: Clone + Send + Sync + 'static,
{
    async fn check_access_token(&self, _request: &R, token: &str, _token_type: &str) -> AuthResult<()> {
        match self.access_credentials(token) {
            Some(_) => Ok(()),
            None => Err(OAuthError::invalid_token()
                .describe("Access token is unknown, expired or revoked")
                .into()),
        }
    }
}

#[async_trait]
impl<R, C> CheckRefreshToken<R, C> for MemoryTokenStore<C>
where
    R: Sync,
    C: Clone + Send + Sync + 'static,
{
    async fn check_refresh_token(&self, _request: &R, token: &str) -> AuthResult<C> {
        self.redeem_refresh_token(token).ok_or_else(|| {
            OAuthError::invalid_grant()
                .describe("Refresh token is unknown, expired or revoked")
                .into()
        })
    }
}
