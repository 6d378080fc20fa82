use crate::domain_model::CanonicalPhone;

/// One-time-code delivery and checking, owned entirely by the provider.
/// No challenge state is held on this side; the phone number is the handle.
#[async_trait::async_trait]
pub trait CodeSender: Send + Sync {
    async fn start_challenge(&self, phone: &CanonicalPhone) -> Result<(), CodeSenderError>;

    /// `Ok(false)` covers wrong, expired and never-issued codes alike; `Err`
    /// is reserved for transport, auth and configuration failures.
    async fn check_challenge(
        &self,
        phone: &CanonicalPhone,
        code: &str,
    ) -> Result<bool, CodeSenderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CodeSenderError {
    /// Provider answered with an error of its own. The native code is for
    /// server-side logs and user-safe message mapping, never shown raw.
    #[error("provider error {code:?}: {message}")]
    Provider { code: Option<u32>, message: String },
    #[error("provider unreachable: {0}")]
    Transport(String),
    #[error("sender misconfigured: {0}")]
    Config(String),
}
