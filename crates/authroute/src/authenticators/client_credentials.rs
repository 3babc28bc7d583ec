//! Client credentials grant (RFC 6749 §4.4).
//!
//! This variant reads `client_id` and `client_secret` from the request
//! inputs. Clients authenticating with HTTP Basic or signed assertions are
//! better served by a custom [`GrantAuthenticator`](super::GrantAuthenticator)
//! or by the client-verification hook.

use serde::{Deserialize, Serialize};

use super::{FieldPairAuthenticator, GrantFields};
use crate::token::grant_type;

/// Fields of a client credentials token request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCredentials {
    /// The client identifier.
    pub client_id: String,

    /// The client secret.
    pub client_secret: String,
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .finish()
    }
}

impl GrantFields for ClientCredentials {
    const GRANT_TYPE: &'static str = grant_type::CLIENT_CREDENTIALS;
    const DEFAULT_FIELDS: [&'static str; 2] = ["client_id", "client_secret"];

    fn from_fields(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
        }
    }
}

/// Authenticator for the `client_credentials` grant.
pub type ClientCredentialsAuthenticator<R, C> = FieldPairAuthenticator<R, ClientCredentials, C>;

impl<R, C> FieldPairAuthenticator<R, ClientCredentials, C> {
    /// Reads the client id from `field` instead of `client_id`.
    #[must_use]
    pub fn with_client_id_field(mut self, field: impl Into<String>) -> Self {
        self.fields[0] = field.into();
        self
    }

    /// Reads the client secret from `field` instead of `client_secret`.
    #[must_use]
    pub fn with_client_secret_field(mut self, field: impl Into<String>) -> Self {
        self.fields[1] = field.into();
        self
    }
}
