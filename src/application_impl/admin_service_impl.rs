use crate::application_port::{
    AdminError, AdminService, IssueResult, ProofDirective, SessionProofCodec,
};
use crate::domain_model::{ProofScope, ReportDraft, TokenRecord};
use crate::domain_port::TokenStore;
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use std::sync::Arc;
use tracing::info;

/// Operator entry points. Login compares against a PHC-format Argon2
/// hash so the configuration never carries the password itself.
pub struct RealAdminService {
    store: Arc<dyn TokenStore>,
    proof_codec: Arc<dyn SessionProofCodec>,
    password_hash: Option<String>,
}

impl RealAdminService {
    pub fn new(
        store: Arc<dyn TokenStore>,
        proof_codec: Arc<dyn SessionProofCodec>,
        password_hash: Option<String>,
    ) -> Self {
        Self {
            store,
            proof_codec,
            password_hash,
        }
    }
}

#[async_trait::async_trait]
impl AdminService for RealAdminService {
    async fn login(&self, password: &str) -> Result<ProofDirective, AdminError> {
        let Some(hash) = self.password_hash.as_deref() else {
            return Err(AdminError::Misconfigured);
        };
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AdminError::Internal(format!("invalid PHC hash: {}", e)))?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(_) => {}
            Err(argon2::password_hash::Error::Password) => return Err(AdminError::Unauthorized),
            Err(e) => return Err(AdminError::Internal(format!("verify error: {}", e))),
        }

        self.proof_codec
            .issue(&ProofScope::Admin)
            .await
            .map_err(|e| AdminError::Internal(e.to_string()))
    }

    async fn issue_token(&self, draft: ReportDraft) -> Result<IssueResult, AdminError> {
        let record = TokenRecord::issue(draft);
        self.store.create(&record).await?;
        info!(
            kind = ?record.report_kind,
            expires_at = %record.expires_at,
            "issued a report access token"
        );
        Ok(IssueResult {
            verify_url: format!("/verify/{}", record.token),
            token: record.token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::{HmacProofCodec, ProofConfig};
    use crate::infra_mem::MemoryTokenStore;
    use argon2::PasswordHasher;
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;
    use chrono::{Duration, Utc};

    fn hash(password: &str) -> String {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string()
    }

    fn harness(password_hash: Option<String>) -> (RealAdminService, Arc<MemoryTokenStore>) {
        let store = Arc::new(MemoryTokenStore::new());
        let codec = Arc::new(HmacProofCodec::new(ProofConfig {
            signing_key: b"test-signing-key".to_vec(),
            secure_cookies: false,
        }));
        let service = RealAdminService::new(store.clone(), codec, password_hash);
        (service, store)
    }

    #[tokio::test]
    async fn test_login_issues_the_admin_proof() {
        let (service, _store) = harness(Some(hash("hunter2")));

        let directive = service.login("hunter2").await.unwrap();
        assert_eq!(directive.cookie_name, "admin_auth");
        assert!(directive.header_value.starts_with("admin_auth="));
    }

    #[tokio::test]
    async fn test_login_rejects_a_wrong_password() {
        let (service, _store) = harness(Some(hash("hunter2")));

        let err = service.login("hunter3").await.unwrap_err();
        assert!(matches!(err, AdminError::Unauthorized));
    }

    #[tokio::test]
    async fn test_login_without_a_configured_hash() {
        let (service, _store) = harness(None);

        let err = service.login("anything").await.unwrap_err();
        assert!(matches!(err, AdminError::Misconfigured));
    }

    #[tokio::test]
    async fn test_login_with_a_garbage_hash() {
        let (service, _store) = harness(Some("not-a-phc-hash".to_owned()));

        let err = service.login("anything").await.unwrap_err();
        assert!(matches!(err, AdminError::Internal(_)));
    }

    #[tokio::test]
    async fn test_issue_token_stores_the_record() {
        let (service, store) = harness(None);

        let issued = service
            .issue_token(ReportDraft {
                report_title: Some("Quarterly hearing".to_owned()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(issued.verify_url, format!("/verify/{}", issued.token));

        let stored = store.get(&issued.token).await.unwrap().unwrap();
        assert_eq!(stored.report_title.as_deref(), Some("Quarterly hearing"));
        assert!(!stored.verified);
        assert!(stored.expires_at > Utc::now() + Duration::days(6));
    }
}
