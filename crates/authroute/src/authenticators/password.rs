//! Resource owner password credentials grant (RFC 6749 §4.3).

use serde::{Deserialize, Serialize};

use super::{FieldPairAuthenticator, GrantFields};
use crate::token::grant_type;

/// Fields of a password token request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordCredentials {
    /// The resource owner username.
    pub username: String,

    /// The resource owner password.
    pub password: String,
}

impl std::fmt::Debug for PasswordCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordCredentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

impl GrantFields for PasswordCredentials {
    const GRANT_TYPE: &'static str = grant_type::PASSWORD;
    const DEFAULT_FIELDS: [&'static str; 2] = ["username", "password"];

    fn from_fields(username: String, password: String) -> Self {
        Self { username, password }
    }
}

/// Authenticator for the `password` grant.
pub type PasswordAuthenticator<R, C> = FieldPairAuthenticator<R, PasswordCredentials, C>;

impl<R, C> FieldPairAuthenticator<R, PasswordCredentials, C> {
    /// Reads the username from `field` instead of `username`.
    #[must_use]
    pub fn with_username_field(mut self, field: impl Into<String>) -> Self {
        self.fields[0] = field.into();
        self
    }

    /// Reads the password from `field` instead of `password`.
    #[must_use]
    pub fn with_password_field(mut self, field: impl Into<String>) -> Self {
        self.fields[1] = field.into();
        self
    }
}
