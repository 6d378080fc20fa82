use chrono::{DateTime, Duration, Utc};
use nanoid::nanoid;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Access tokens live exactly seven days from issuance.
pub const TOKEN_TTL_DAYS: i64 = 7;

const TOKEN_LEN: usize = 32;
const HEX_ALPHABET: [char; 16] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f',
];

/// Opaque capability handle. Lookups decide whether a token means anything;
/// the type itself never rejects a shape, so malformed input behaves exactly
/// like an unknown token.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// 32 lowercase hex chars, 128 bits of entropy.
    pub fn mint() -> Self {
        Self(nanoid!(TOKEN_LEN, &HEX_ALPHABET))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::str::FromStr for Token {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Fixed,
    Custom,
}

/// Operator-supplied content bound to a token at issuance.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportDraft {
    pub kind: Option<ReportKind>,
    pub report_title: Option<String>,
    pub report_body: Option<String>,
    pub report_url: Option<String>,
    pub customer_identity_hint: Option<String>,
}

/// The stored document, one per token. Field names match the persisted
/// JSON so the record is self-describing in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub token: Token,
    pub report_kind: ReportKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_url: Option<String>,
    /// Pre-fills the client form; never consulted for authorization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_identity_hint: Option<String>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TokenRecord {
    pub fn issue(draft: ReportDraft) -> Self {
        let now = Utc::now();
        Self {
            token: Token::mint(),
            report_kind: draft.kind.unwrap_or(ReportKind::Fixed),
            report_title: draft.report_title,
            report_body: draft.report_body,
            report_url: draft.report_url,
            customer_identity_hint: draft
                .customer_identity_hint
                .map(|h| h.trim().to_owned())
                .filter(|h| !h.is_empty()),
            verified: false,
            created_at: now,
            expires_at: now + Duration::days(TOKEN_TTL_DAYS),
        }
    }

    /// Expiry is strict: a record is still live at the exact expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
