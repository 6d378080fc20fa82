use crate::domain_model::{CanonicalPhone, Token};
use chrono::{DateTime, Utc};

/// What the operator gets told after a verification completes.
#[derive(Debug, Clone)]
pub struct VerificationNotice {
    pub phone: CanonicalPhone,
    pub identity_hint: Option<String>,
    pub token: Token,
    pub verified_at: DateTime<Utc>,
}

/// Best-effort sink. Callers spawn this off the request path and only log
/// failures; a lost notification never fails a verification.
#[async_trait::async_trait]
pub trait VerificationNotifier: Send + Sync {
    async fn notify(&self, notice: &VerificationNotice) -> Result<(), NotifyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport: {0}")]
    Transport(String),
    #[error("mail gateway answered {status}")]
    Gateway { status: u16 },
}
