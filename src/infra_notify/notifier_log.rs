use crate::domain_port::{NotifyError, VerificationNotice, VerificationNotifier};
use tracing::info;

/// Stand-in sink wired when no mail gateway is configured. The log line is
/// the notification.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl VerificationNotifier for LogNotifier {
    async fn notify(&self, notice: &VerificationNotice) -> Result<(), NotifyError> {
        info!(
            phone = %notice.phone,
            identity_hint = notice.identity_hint.as_deref().unwrap_or("not provided"),
            token = %notice.token,
            verified_at = %notice.verified_at.to_rfc3339(),
            "verification completed (mail gateway not configured)"
        );
        Ok(())
    }
}
