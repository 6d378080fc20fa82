use crate::application_port::{ProofDirective, ProofError, SessionProofCodec};
use crate::domain_model::{PROOF_TTL_SECS, ProofScope};
use hmac::{Hmac, KeyInit, Mac};
use sha2::Sha256;

#[derive(Debug, Clone)]
pub struct ProofConfig {
    pub signing_key: Vec<u8>,
    /// Adds `Secure` to issued cookies; on in release settings.
    pub secure_cookies: bool,
}

/// Cookie-backed proof: value is `hex(HMAC-SHA256(key, scope_key))`. The
/// value proves the server minted it for exactly this scope and says
/// nothing else.
pub struct HmacProofCodec {
    cfg: ProofConfig,
}

impl HmacProofCodec {
    pub fn new(cfg: ProofConfig) -> Self {
        Self { cfg }
    }

    fn mac_hex(&self, scope: &ProofScope) -> Result<String, ProofError> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.cfg.signing_key)
            .map_err(|e| ProofError::Config(e.to_string()))?;
        mac.update(scope.scope_key().as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Constant-time comparison via the MAC itself.
    fn mac_matches(&self, scope: &ProofScope, presented: &str) -> bool {
        let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&self.cfg.signing_key) else {
            return false;
        };
        mac.update(scope.scope_key().as_bytes());
        let Ok(raw) = hex::decode(presented) else {
            return false;
        };
        mac.verify_slice(&raw).is_ok()
    }
}

fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then_some(v)
    })
}

#[async_trait::async_trait]
impl SessionProofCodec for HmacProofCodec {
    async fn issue(&self, scope: &ProofScope) -> Result<ProofDirective, ProofError> {
        let cookie_name = scope.cookie_name();
        let value = self.mac_hex(scope)?;
        let mut header_value = format!(
            "{cookie_name}={value}; HttpOnly; SameSite=Lax; Path=/api; Max-Age={PROOF_TTL_SECS}"
        );
        if self.cfg.secure_cookies {
            header_value.push_str("; Secure");
        }
        Ok(ProofDirective {
            cookie_name,
            header_value,
        })
    }

    async fn verify(&self, cookie_header: Option<&str>, scope: &ProofScope) -> bool {
        let Some(header) = cookie_header else {
            return false;
        };
        match cookie_value(header, &scope.cookie_name()) {
            Some(presented) => self.mac_matches(scope, presented),
            None => false,
        }
    }
}
