use crate::application_port::ProofDirective;
use crate::domain_model::{CanonicalPhone, ReportKind, Token};
use crate::domain_port::TokenStoreError;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// Input refused before any I/O. The message is user-safe.
    #[error("{0}")]
    Validation(String),
    #[error("unknown token")]
    NotFound,
    #[error("this link has expired")]
    Expired,
    #[error("verification code does not match")]
    WrongCode,
    /// Provider failure with the user-safe message already mapped; the
    /// native error is logged where it happened.
    #[error("{0}")]
    Provider(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<TokenStoreError> for AccessError {
    fn from(err: TokenStoreError) -> Self {
        match err {
            TokenStoreError::Store(e) => AccessError::Store(e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StartInput {
    /// Raw user input; normalization happens inside the service.
    pub phone: String,
}

#[derive(Debug, Clone)]
pub struct StartResult {
    /// Canonical form, echoed so the client re-submits exactly this number.
    pub phone: CanonicalPhone,
}

#[derive(Debug, Clone)]
pub struct CheckInput {
    pub phone: String,
    pub code: String,
    /// Rides into the operator notification; never authorizes anything.
    pub identity_hint: Option<String>,
}

#[derive(Debug)]
pub struct CheckResult {
    pub proof: ProofDirective,
}

/// What a token holder sees when opening the report.
#[derive(Debug)]
pub enum ReportView {
    /// Proof, stored flag and expiry all held up.
    Ok(ReportContent),
    /// Token is live but phone possession is not (or no longer) proven.
    NeedsVerification { identity_hint: Option<String> },
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportContent {
    pub kind: ReportKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// The verification lifecycle as the HTTP edge consumes it. Every method
/// re-derives the flow position from the store and the proof; nothing is
/// held between calls.
#[async_trait::async_trait]
pub trait AccessService: Send + Sync {
    /// Token entry plus the render-time gate: content only when the scoped
    /// proof, the stored flag and the expiry all agree.
    async fn report_view(
        &self,
        token: &Token,
        cookie_header: Option<&str>,
    ) -> Result<ReportView, AccessError>;

    /// Normalize, validate, ask the provider to send a code. No local state
    /// is created; the canonical phone in the result is the challenge handle.
    async fn start_verification(&self, input: StartInput) -> Result<StartResult, AccessError>;

    /// The token-scoped code check: shape, fresh token gate, provider, then
    /// mark + proof + notify. Expiry mid-flow wins over a correct code.
    async fn check_code(&self, token: &Token, input: CheckInput)
    -> Result<CheckResult, AccessError>;

    /// The shared-path variant: same phone and code handling, no token and
    /// no notification, proof issued under the global scope.
    async fn check_code_global(&self, input: CheckInput) -> Result<CheckResult, AccessError>;
}
