use crate::application_port::ProofDirective;
use crate::domain_model::{ReportDraft, Token};
use crate::domain_port::TokenStoreError;

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("password does not match")]
    Unauthorized,
    #[error("admin password is not configured")]
    Misconfigured,
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<TokenStoreError> for AdminError {
    fn from(err: TokenStoreError) -> Self {
        match err {
            TokenStoreError::Store(e) => AdminError::Store(e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IssueResult {
    pub token: Token,
    /// Relative path the operator hands to the customer.
    pub verify_url: String,
}

/// Operator-side surface: session login and token issuance.
#[async_trait::async_trait]
pub trait AdminService: Send + Sync {
    async fn login(&self, password: &str) -> Result<ProofDirective, AdminError>;

    async fn issue_token(&self, draft: ReportDraft) -> Result<IssueResult, AdminError>;
}
