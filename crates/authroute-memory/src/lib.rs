//! # authroute-memory
//!
//! In-memory implementation of the authroute token hooks.
//!
//! [`MemoryTokenStore`] issues random opaque tokens, remembers the
//! credentials they were issued for, and implements
//! [`GenerateToken`](authroute::GenerateToken),
//! [`CheckAccessToken`](authroute::CheckAccessToken) and
//! [`CheckRefreshToken`](authroute::CheckRefreshToken). It suits tests,
//! examples and single-instance deployments; tokens do not survive a
//! restart.
//!
//! ```ignore
//! let store = MemoryTokenStore::<User>::new(TokenStoreConfig::default());
//! let route = AuthRoute::builder()
//!     .with_generate_token(store.clone())
//!     .with_check_access_token(store.clone())
//!     .with_check_refresh_token(store.clone())
//!     // readers, authenticators...
//!     .build()?;
//! ```

mod store;

pub use store::{MemoryTokenStore, StoreStats, TokenStoreConfig, generate_token, hash_token};
