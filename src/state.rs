use std::sync::Arc;

use crate::auth::TokenKeys;
use crate::config::Config;
use crate::store::Store;

/// Shared application context, registered once with `web::Data`.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenKeys,
    /// bcrypt work factor for new passwords.
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, tokens: TokenKeys, bcrypt_cost: u32) -> Self {
        Self {
            store,
            tokens,
            bcrypt_cost,
        }
    }

    pub fn from_config(store: Arc<dyn Store>, config: &Config) -> Self {
        Self::new(store, TokenKeys::new(&config.jwt_secret), config.bcrypt_cost)
    }
}
