use crate::domain_model::CanonicalPhone;
use crate::domain_port::{CodeSender, CodeSenderError};
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

const VERIFY_BASE: &str = "https://verify.twilio.com/v2";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub verify_service_sid: String,
}

/// Twilio Verify adapter. The challenge lives entirely on Twilio's side;
/// we only forward the phone number and, later, the candidate code.
pub struct TwilioCodeSender {
    cfg: TwilioConfig,
    client: reqwest::Client,
}

impl TwilioCodeSender {
    pub fn try_new(cfg: TwilioConfig) -> Result<Self, CodeSenderError> {
        if cfg.account_sid.is_empty()
            || cfg.auth_token.is_empty()
            || cfg.verify_service_sid.is_empty()
        {
            return Err(CodeSenderError::Config(
                "twilio credentials are not set".to_owned(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CodeSenderError::Config(e.to_string()))?;
        Ok(Self { cfg, client })
    }

    fn url(&self, resource: &str) -> String {
        format!(
            "{VERIFY_BASE}/Services/{}/{resource}",
            self.cfg.verify_service_sid
        )
    }
}

#[derive(Debug, Deserialize)]
struct VerificationBody {
    status: String,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    code: Option<u32>,
    message: Option<String>,
}

/// User-safe strings for the provider codes seen in practice; everything
/// else stays generic. Raw provider messages go to the log, never to users.
fn send_failure_message(code: Option<u32>) -> String {
    match code {
        Some(20003) => "SMS provider credentials are not configured correctly".to_owned(),
        Some(60200) => "this phone number cannot receive a verification code".to_owned(),
        Some(60203) => "maximum send attempts reached, wait a while and try again".to_owned(),
        Some(60212) => "too many requests for this number, wait a while and try again".to_owned(),
        Some(code) => format!("failed to send the verification code (provider code {code})"),
        None => "failed to send the verification code".to_owned(),
    }
}

fn provider_error(http_status: u16, body: &str) -> CodeSenderError {
    let parsed: Option<ProviderErrorBody> = serde_json::from_str(body).ok();
    let code = parsed.as_ref().and_then(|b| b.code);
    let native = parsed
        .and_then(|b| b.message)
        .unwrap_or_else(|| body.to_owned());
    warn!(http_status, provider_code = ?code, message = %native, "twilio rejected the request");
    CodeSenderError::Provider {
        code,
        message: send_failure_message(code),
    }
}

#[async_trait::async_trait]
impl CodeSender for TwilioCodeSender {
    async fn start_challenge(&self, phone: &CanonicalPhone) -> Result<(), CodeSenderError> {
        let response = self
            .client
            .post(self.url("Verifications"))
            .basic_auth(&self.cfg.account_sid, Some(&self.cfg.auth_token))
            .form(&[("To", phone.as_str()), ("Channel", "sms")])
            .send()
            .await
            .map_err(|e| CodeSenderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(provider_error(status.as_u16(), &body));
        }

        let body: VerificationBody = response
            .json()
            .await
            .map_err(|e| CodeSenderError::Transport(e.to_string()))?;
        if body.status == "failed" {
            return Err(CodeSenderError::Provider {
                code: None,
                message: send_failure_message(None),
            });
        }
        Ok(())
    }

    async fn check_challenge(
        &self,
        phone: &CanonicalPhone,
        code: &str,
    ) -> Result<bool, CodeSenderError> {
        let response = self
            .client
            .post(self.url("VerificationCheck"))
            .basic_auth(&self.cfg.account_sid, Some(&self.cfg.auth_token))
            .form(&[("To", phone.as_str()), ("Code", code)])
            .send()
            .await
            .map_err(|e| CodeSenderError::Transport(e.to_string()))?;

        // Twilio answers 404 once a challenge is consumed or expired;
        // for callers that is simply "not approved"
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(provider_error(status.as_u16(), &body));
        }

        let body: VerificationBody = response
            .json()
            .await
            .map_err(|e| CodeSenderError::Transport(e.to_string()))?;
        Ok(body.status == "approved")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_provider_codes_map_to_safe_messages() {
        assert!(send_failure_message(Some(20003)).contains("credentials"));
        assert!(send_failure_message(Some(60200)).contains("phone number"));
        assert!(send_failure_message(Some(60203)).contains("maximum send attempts"));
        assert!(send_failure_message(Some(60212)).contains("too many requests"));
        assert_eq!(
            send_failure_message(Some(99999)),
            "failed to send the verification code (provider code 99999)"
        );
        assert_eq!(
            send_failure_message(None),
            "failed to send the verification code"
        );
    }

    #[test]
    fn test_error_body_parsing_feeds_the_mapping() {
        let err = provider_error(
            429,
            r#"{"code": 60203, "message": "Max send attempts reached.", "status": 429}"#,
        );
        match err {
            CodeSenderError::Provider { code, message } => {
                assert_eq!(code, Some(60203));
                assert!(message.contains("maximum send attempts"));
                assert!(!message.contains("Max send attempts reached."));
            }
            other => panic!("expected provider error, got {other:?}"),
        }

        // non-JSON bodies still produce the generic message
        let err = provider_error(500, "upstream exploded");
        match err {
            CodeSenderError::Provider { code: None, message } => {
                assert_eq!(message, "failed to send the verification code");
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[test]
    fn test_urls_embed_the_verify_service() {
        let sender = TwilioCodeSender::try_new(TwilioConfig {
            account_sid: "AC0000".to_owned(),
            auth_token: "secret".to_owned(),
            verify_service_sid: "VA1234".to_owned(),
        })
        .unwrap();
        assert_eq!(
            sender.url("Verifications"),
            "https://verify.twilio.com/v2/Services/VA1234/Verifications"
        );
        assert_eq!(
            sender.url("VerificationCheck"),
            "https://verify.twilio.com/v2/Services/VA1234/VerificationCheck"
        );
    }

    #[test]
    fn test_blank_credentials_are_refused_up_front() {
        let result = TwilioCodeSender::try_new(TwilioConfig {
            account_sid: String::new(),
            auth_token: "secret".to_owned(),
            verify_service_sid: "VA1234".to_owned(),
        });
        assert!(matches!(result, Err(CodeSenderError::Config(_))));
    }
}
