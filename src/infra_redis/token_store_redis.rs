use crate::domain_model::{Token, TokenRecord};
use crate::domain_port::{TokenStore, TokenStoreError};
use chrono::Duration;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

/// Keys stay readable one day past logical expiry so an expired link
/// still answers as expired rather than unknown.
const REAP_MARGIN_DAYS: i64 = 1;

pub struct RedisTokenStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisTokenStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisTokenStore {
            conn,
            prefix: prefix.into(),
        }
    }

    fn key(&self, token: &Token) -> String {
        format!("{}:{}", self.prefix, token)
    }

    fn reap_at(record: &TokenRecord) -> i64 {
        (record.expires_at + Duration::days(REAP_MARGIN_DAYS)).timestamp()
    }
}

#[async_trait::async_trait]
impl TokenStore for RedisTokenStore {
    async fn create(&self, record: &TokenRecord) -> Result<(), TokenStoreError> {
        let key = self.key(&record.token);
        let payload =
            serde_json::to_string(record).map_err(|e| TokenStoreError::Store(e.to_string()))?;
        let mut conn = self.conn.clone();

        let _: () = conn
            .set(&key, payload)
            .await
            .map_err(|e| TokenStoreError::Store(e.to_string()))?;
        let _: () = conn
            .expire_at(&key, Self::reap_at(record))
            .await
            .map_err(|e| TokenStoreError::Store(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, token: &Token) -> Result<Option<TokenRecord>, TokenStoreError> {
        let key = self.key(token);
        let mut conn = self.conn.clone();

        let raw: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| TokenStoreError::Store(e.to_string()))?;
        match raw {
            Some(raw) => {
                let record = serde_json::from_str(&raw)
                    .map_err(|e| TokenStoreError::Store(e.to_string()))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn set_verified(&self, token: &Token) -> Result<bool, TokenStoreError> {
        let key = self.key(token);
        let mut conn = self.conn.clone();

        let raw: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| TokenStoreError::Store(e.to_string()))?;
        let Some(raw) = raw else {
            return Ok(false);
        };
        let mut record: TokenRecord =
            serde_json::from_str(&raw).map_err(|e| TokenStoreError::Store(e.to_string()))?;
        record.verified = true;

        let payload =
            serde_json::to_string(&record).map_err(|e| TokenStoreError::Store(e.to_string()))?;
        let _: () = conn
            .set(&key, payload)
            .await
            .map_err(|e| TokenStoreError::Store(e.to_string()))?;
        let _: () = conn
            .expire_at(&key, Self::reap_at(&record))
            .await
            .map_err(|e| TokenStoreError::Store(e.to_string()))?;
        Ok(true)
    }
}
