use crate::domain_model::{Token, TokenRecord};
use chrono::Utc;

/// How a token looks from the store at the moment of asking. `Missing` and
/// `Expired` map to different outcomes at the edge, so the distinction is
/// kept all the way down here.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TokenValidity {
    Active,
    Expired,
    Missing,
}

#[async_trait::async_trait]
pub trait TokenStore: Send + Sync {
    /// Persist a freshly issued record. The token is assumed unused; minting
    /// collisions are not the store's problem.
    async fn create(&self, record: &TokenRecord) -> Result<(), TokenStoreError>;

    async fn get(&self, token: &Token) -> Result<Option<TokenRecord>, TokenStoreError>;

    /// Flip `verified` to true, returning whether the record existed.
    /// Read-modify-write without locking; concurrent flips agree on the
    /// final value, so the race is harmless.
    async fn set_verified(&self, token: &Token) -> Result<bool, TokenStoreError>;

    /// Derived view over `get`; expiry is re-evaluated against the clock on
    /// every call, never cached.
    async fn validity(&self, token: &Token) -> Result<TokenValidity, TokenStoreError> {
        match self.get(token).await? {
            None => Ok(TokenValidity::Missing),
            Some(record) if record.is_expired_at(Utc::now()) => Ok(TokenValidity::Expired),
            Some(_) => Ok(TokenValidity::Active),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
    #[error("store error: {0}")]
    Store(String),
}
