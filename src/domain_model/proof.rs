use crate::domain_model::Token;

/// Session proofs live 24 hours, independent of token expiry.
pub const PROOF_TTL_SECS: i64 = 86_400;

/// What a session proof vouches for. One mechanism, three scopes; the scope
/// key feeds the MAC, so a proof minted for one scope never reads as another.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum ProofScope {
    /// Phone possession proven for this one token.
    Report(Token),
    /// Phone possession proven for the shared report path.
    Global,
    /// Operator session.
    Admin,
}

impl ProofScope {
    /// Cookie the proof travels in. The token is part of the name so one
    /// browser can hold proofs for several reports side by side.
    pub fn cookie_name(&self) -> String {
        match self {
            ProofScope::Report(token) => format!("report_auth_{token}"),
            ProofScope::Global => "report_auth".to_owned(),
            ProofScope::Admin => "admin_auth".to_owned(),
        }
    }

    /// MAC input, distinct per scope.
    pub fn scope_key(&self) -> String {
        match self {
            ProofScope::Report(token) => format!("report:{token}"),
            ProofScope::Global => "report:*".to_owned(),
            ProofScope::Admin => "admin".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_name_embeds_the_token() {
        let token = Token::mint();
        let scoped = ProofScope::Report(token.clone());
        assert_eq!(scoped.cookie_name(), format!("report_auth_{token}"));
        assert_eq!(ProofScope::Global.cookie_name(), "report_auth");
        assert_eq!(ProofScope::Admin.cookie_name(), "admin_auth");
    }

    #[test]
    fn test_scope_keys_never_collide() {
        let a = ProofScope::Report(Token::mint());
        let b = ProofScope::Report(Token::mint());
        let keys = [
            a.scope_key(),
            b.scope_key(),
            ProofScope::Global.scope_key(),
            ProofScope::Admin.scope_key(),
        ];
        for (i, k) in keys.iter().enumerate() {
            for other in &keys[i + 1..] {
                assert_ne!(k, other);
            }
        }
    }
}
