use crate::domain_port::{NotifyError, VerificationNotice, VerificationNotifier};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Message-send endpoint of the mail gateway.
    pub endpoint: String,
    /// Basic-auth secret; the user part is fixed to `api`.
    pub api_key: String,
    pub from: String,
    pub recipients: Vec<String>,
    /// For showing the phone in domestic form in the message body.
    pub country_code: String,
}

/// Mails the operator after a completed verification via an HTTP mail
/// gateway (form POST, basic auth). Best-effort like every notifier;
/// callers spawn and log.
pub struct MailNotifier {
    cfg: MailConfig,
    client: reqwest::Client,
}

impl MailNotifier {
    pub fn try_new(cfg: MailConfig) -> Result<Self, NotifyError> {
        if cfg.endpoint.is_empty() || cfg.from.is_empty() || cfg.recipients.is_empty() {
            return Err(NotifyError::Transport(
                "mail gateway is not fully configured".to_owned(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        Ok(Self { cfg, client })
    }
}

fn compose(notice: &VerificationNotice, country_code: &str) -> (String, String) {
    let subject = "[SMS verification] a customer completed verification".to_owned();
    let body = format!(
        "SMS verification completed.\n\
         \n\
         phone:       {}\n\
         identity:    {}\n\
         token:       {}\n\
         verified at: {}\n\
         \n\
         This message was sent automatically.",
        notice.phone.to_domestic(country_code),
        notice.identity_hint.as_deref().unwrap_or("not provided"),
        notice.token,
        notice.verified_at.to_rfc3339(),
    );
    (subject, body)
}

#[async_trait::async_trait]
impl VerificationNotifier for MailNotifier {
    async fn notify(&self, notice: &VerificationNotice) -> Result<(), NotifyError> {
        let (subject, body) = compose(notice, &self.cfg.country_code);
        let to = self.cfg.recipients.join(",");
        let response = self
            .client
            .post(&self.cfg.endpoint)
            .basic_auth("api", Some(&self.cfg.api_key))
            .form(&[
                ("from", self.cfg.from.as_str()),
                ("to", to.as_str()),
                ("subject", subject.as_str()),
                ("text", body.as_str()),
            ])
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Gateway {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_model::{PhoneNormalizer, Token};
    use chrono::Utc;

    fn notice(hint: Option<&str>) -> VerificationNotice {
        VerificationNotice {
            phone: PhoneNormalizer::default()
                .canonicalize("090-1234-5678")
                .unwrap(),
            identity_hint: hint.map(str::to_owned),
            token: Token::mint(),
            verified_at: Utc::now(),
        }
    }

    #[test]
    fn test_body_shows_domestic_phone_hint_and_token() {
        let notice = notice(Some("taro@example.com"));
        let (subject, body) = compose(&notice, "81");
        assert!(subject.contains("SMS verification"));
        assert!(body.contains("09012345678"));
        assert!(!body.contains("+81"));
        assert!(body.contains("taro@example.com"));
        assert!(body.contains(notice.token.as_str()));
        assert!(body.contains(&notice.verified_at.to_rfc3339()));
    }

    #[test]
    fn test_missing_hint_reads_as_not_provided() {
        let (_, body) = compose(&notice(None), "81");
        assert!(body.contains("identity:    not provided"));
    }

    #[test]
    fn test_incomplete_gateway_config_is_refused() {
        let result = MailNotifier::try_new(MailConfig {
            endpoint: String::new(),
            api_key: "key".to_owned(),
            from: "noreply@example.com".to_owned(),
            recipients: vec!["ops@example.com".to_owned()],
            country_code: "81".to_owned(),
        });
        assert!(result.is_err());
    }
}
