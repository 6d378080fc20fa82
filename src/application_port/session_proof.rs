use crate::domain_model::ProofScope;

#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    #[error("proof codec misconfigured: {0}")]
    Config(String),
}

/// A ready-to-send `Set-Cookie` line. The name is kept separate for logs
/// and tests; `header_value` is the complete header payload.
#[derive(Debug, Clone)]
pub struct ProofDirective {
    pub cookie_name: String,
    pub header_value: String,
}

/// Issues and reads session proofs. A proof is a capability cookie: its
/// presence with a genuine value is the whole claim, there is no payload.
#[async_trait::async_trait]
pub trait SessionProofCodec: Send + Sync {
    async fn issue(&self, scope: &ProofScope) -> Result<ProofDirective, ProofError>;

    /// Whether the request's `Cookie` header carries a genuine proof for
    /// `scope`. Absent, forged and cross-scope values all read as false.
    async fn verify(&self, cookie_header: Option<&str>, scope: &ProofScope) -> bool;
}
