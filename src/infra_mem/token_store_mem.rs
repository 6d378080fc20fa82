use crate::domain_model::{Token, TokenRecord};
use crate::domain_port::{TokenStore, TokenStoreError};
use dashmap::DashMap;

/// In-process store for the `memory` backend and for unit tests. Records
/// live as long as the process; expiry still applies through `expires_at`,
/// nothing is ever evicted.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    records: DashMap<String, TokenRecord>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl TokenStore for MemoryTokenStore {
    async fn create(&self, record: &TokenRecord) -> Result<(), TokenStoreError> {
        self.records
            .insert(record.token.as_str().to_owned(), record.clone());
        Ok(())
    }

    async fn get(&self, token: &Token) -> Result<Option<TokenRecord>, TokenStoreError> {
        Ok(self
            .records
            .get(token.as_str())
            .map(|entry| entry.value().clone()))
    }

    async fn set_verified(&self, token: &Token) -> Result<bool, TokenStoreError> {
        match self.records.get_mut(token.as_str()) {
            Some(mut entry) => {
                entry.value_mut().verified = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_model::{ReportDraft, ReportKind};
    use crate::domain_port::TokenValidity;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_create_then_get_round_trips() {
        let store = MemoryTokenStore::new();
        let record = TokenRecord::issue(ReportDraft {
            kind: Some(ReportKind::Custom),
            report_title: Some("Quarterly".to_owned()),
            ..Default::default()
        });
        store.create(&record).await.unwrap();

        let loaded = store.get(&record.token).await.unwrap().unwrap();
        assert_eq!(loaded.token, record.token);
        assert_eq!(loaded.report_title.as_deref(), Some("Quarterly"));
        assert!(!loaded.verified);
    }

    #[tokio::test]
    async fn test_get_unknown_token_is_none() {
        let store = MemoryTokenStore::new();
        assert!(store.get(&Token::mint()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_verified_flips_and_sticks() {
        let store = MemoryTokenStore::new();
        let record = TokenRecord::issue(ReportDraft::default());
        store.create(&record).await.unwrap();

        assert!(store.set_verified(&record.token).await.unwrap());
        assert!(store.get(&record.token).await.unwrap().unwrap().verified);

        // flipping again is a no-op, not an error
        assert!(store.set_verified(&record.token).await.unwrap());
        assert!(store.get(&record.token).await.unwrap().unwrap().verified);

        assert!(!store.set_verified(&Token::mint()).await.unwrap());
    }

    #[tokio::test]
    async fn test_validity_distinguishes_missing_expired_active() {
        let store = MemoryTokenStore::new();
        assert_eq!(
            store.validity(&Token::mint()).await.unwrap(),
            TokenValidity::Missing
        );

        let live = TokenRecord::issue(ReportDraft::default());
        store.create(&live).await.unwrap();
        assert_eq!(
            store.validity(&live.token).await.unwrap(),
            TokenValidity::Active
        );

        let mut dead = TokenRecord::issue(ReportDraft::default());
        dead.expires_at = Utc::now() - Duration::seconds(1);
        store.create(&dead).await.unwrap();
        assert_eq!(
            store.validity(&dead.token).await.unwrap(),
            TokenValidity::Expired
        );
    }
}
