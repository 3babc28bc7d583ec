//! Name-keyed registries of grant authenticators and authorizers.
//!
//! Both registries are plain maps owned by the dispatch core. Registration
//! takes `&mut self`, so entries cannot change while the core is shared
//! between requests. There is no deregistration; registering a name twice
//! replaces the earlier entry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::authenticators::GrantAuthenticator;
use crate::hooks::Authorizer;

/// Grant type name to authenticator.
pub struct AuthenticatorRegistry<R, C> {
    authenticators: HashMap<String, Arc<dyn GrantAuthenticator<R, C>>>,
}

impl<R, C> AuthenticatorRegistry<R, C> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            authenticators: HashMap::new(),
        }
    }

    /// Registers `authenticator` for `grant_type`, returning the entry it replaced.
    pub fn register(
        &mut self,
        grant_type: impl Into<String>,
        authenticator: Arc<dyn GrantAuthenticator<R, C>>,
    ) -> Option<Arc<dyn GrantAuthenticator<R, C>>> {
        self.authenticators.insert(grant_type.into(), authenticator)
    }

    /// Checks whether `grant_type` has an authenticator.
    pub fn has(&self, grant_type: &str) -> bool {
        self.authenticators.contains_key(grant_type)
    }

    /// Looks up the authenticator for `grant_type`.
    pub fn get(&self, grant_type: &str) -> Option<&Arc<dyn GrantAuthenticator<R, C>>> {
        self.authenticators.get(grant_type)
    }

    /// Registered grant types, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.authenticators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.authenticators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authenticators.is_empty()
    }
}

impl<R, C> Default for AuthenticatorRegistry<R, C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Check name to authorizer.
pub struct AuthorizerRegistry<R> {
    authorizers: HashMap<String, Arc<dyn Authorizer<R>>>,
}

impl<R> AuthorizerRegistry<R> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            authorizers: HashMap::new(),
        }
    }

    /// Registers `authorizer` under `name`, returning the entry it replaced.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        authorizer: Arc<dyn Authorizer<R>>,
    ) -> Option<Arc<dyn Authorizer<R>>> {
        self.authorizers.insert(name.into(), authorizer)
    }

    /// Checks whether `name` has an authorizer.
    pub fn has(&self, name: &str) -> bool {
        self.authorizers.contains_key(name)
    }

    /// Looks up the authorizer registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Authorizer<R>>> {
        self.authorizers.get(name)
    }

    /// Registered check names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.authorizers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.authorizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authorizers.is_empty()
    }
}

impl<R> Default for AuthorizerRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}
