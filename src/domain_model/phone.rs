use std::fmt;

pub const DEFAULT_COUNTRY_CODE: &str = "81";

/// Phone number in `+<country><subscriber>` form, shape-checked.
/// Obtained only through [`PhoneNormalizer::canonicalize`].
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct CanonicalPhone(String);

impl CanonicalPhone {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `+` followed by 10 to 15 digits, first digit non-zero.
    pub fn is_valid(candidate: &str) -> bool {
        let Some(rest) = candidate.strip_prefix('+') else {
            return false;
        };
        if !(10..=15).contains(&rest.len()) {
            return false;
        }
        let mut digits = rest.chars();
        match digits.next() {
            Some(c) if c.is_ascii_digit() && c != '0' => {}
            _ => return false,
        }
        digits.all(|c| c.is_ascii_digit())
    }

    /// Display form for operators: `+<cc><subscriber>` reads back as
    /// `0<subscriber>` when the country code matches, otherwise unchanged.
    pub fn to_domestic(&self, country_code: &str) -> String {
        match self
            .0
            .strip_prefix('+')
            .and_then(|rest| rest.strip_prefix(country_code))
        {
            Some(subscriber) => format!("0{subscriber}"),
            None => self.0.clone(),
        }
    }
}

impl fmt::Display for CanonicalPhone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rewrites free-form user input into international form before validation.
#[derive(Debug, Clone)]
pub struct PhoneNormalizer {
    country_code: String,
}

impl PhoneNormalizer {
    pub fn new(country_code: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into(),
        }
    }

    /// Never fails: garbage input becomes an invalid candidate that
    /// [`CanonicalPhone::is_valid`] rejects, not a panic.
    pub fn normalize(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.starts_with('+') {
            return trimmed.to_owned();
        }
        let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
        if let Some(subscriber) = digits.strip_prefix('0') {
            // domestic notation: drop the trunk zero, prefix the country code
            return format!("+{}{subscriber}", self.country_code);
        }
        // digits already carrying the country code, and anything else,
        // just get the `+`
        format!("+{digits}")
    }

    pub fn canonicalize(&self, raw: &str) -> Option<CanonicalPhone> {
        let candidate = self.normalize(raw);
        CanonicalPhone::is_valid(&candidate).then(|| CanonicalPhone(candidate))
    }
}

impl Default for PhoneNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTRY_CODE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domestic_input_gets_country_code() {
        let n = PhoneNormalizer::default();
        assert_eq!(n.normalize("09012345678"), "+819012345678");
        assert_eq!(n.normalize("090-1234-5678"), "+819012345678");
        assert_eq!(n.normalize("090 (1234) 5678"), "+819012345678");
    }

    #[test]
    fn test_plus_prefixed_input_passes_through() {
        let n = PhoneNormalizer::default();
        assert_eq!(n.normalize("+14155552671"), "+14155552671");
        assert_eq!(n.normalize("  +819012345678 "), "+819012345678");
    }

    #[test]
    fn test_bare_digits_get_plus() {
        let n = PhoneNormalizer::default();
        assert_eq!(n.normalize("819012345678"), "+819012345678");
        assert_eq!(n.normalize("14155552671"), "+14155552671");
    }

    #[test]
    fn test_other_country_code_is_honored() {
        let n = PhoneNormalizer::new("44");
        assert_eq!(n.normalize("07911123456"), "+447911123456");
    }

    #[test]
    fn test_garbage_normalizes_without_panic_and_fails_validation() {
        let n = PhoneNormalizer::default();
        assert_eq!(n.normalize("abc"), "+");
        assert!(n.canonicalize("abc").is_none());
        assert!(n.canonicalize("").is_none());
        assert!(n.canonicalize("000").is_none());
    }

    #[test]
    fn test_validity_bounds() {
        assert!(CanonicalPhone::is_valid("+1234567890"), "10 digits is the floor");
        assert!(CanonicalPhone::is_valid("+123456789012345"), "15 digits is the ceiling");
        assert!(!CanonicalPhone::is_valid("+123456789"));
        assert!(!CanonicalPhone::is_valid("+1234567890123456"));
        assert!(!CanonicalPhone::is_valid("+0123456789"), "leading zero after + is invalid");
        assert!(!CanonicalPhone::is_valid("1234567890"), "missing +");
        assert!(!CanonicalPhone::is_valid("+12345abc90"));
        assert!(!CanonicalPhone::is_valid("+"));
    }

    #[test]
    fn test_domestic_display() {
        let n = PhoneNormalizer::default();
        let jp = n.canonicalize("090-1234-5678").unwrap();
        assert_eq!(jp.to_domestic("81"), "09012345678");
        let us = n.canonicalize("+14155552671").unwrap();
        assert_eq!(us.to_domestic("81"), "+14155552671");
    }
}
