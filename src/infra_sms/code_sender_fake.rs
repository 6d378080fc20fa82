use crate::domain_model::CanonicalPhone;
use crate::domain_port::{CodeSender, CodeSenderError};
use tracing::info;

/// The one code the fake accepts.
pub const FAKE_ACCEPTED_CODE: &str = "123456";
/// Submitting this code simulates a provider-side failure.
pub const FAKE_ERROR_CODE: &str = "000000";

/// Dev backend: no SMS leaves the machine. The accepted code is fixed and
/// logged on start so a local flow can be driven end to end.
#[derive(Debug)]
pub struct FakeCodeSender;

impl FakeCodeSender {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FakeCodeSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CodeSender for FakeCodeSender {
    async fn start_challenge(&self, phone: &CanonicalPhone) -> Result<(), CodeSenderError> {
        info!(phone = %phone, code = FAKE_ACCEPTED_CODE, "fake challenge started");
        Ok(())
    }

    async fn check_challenge(
        &self,
        _phone: &CanonicalPhone,
        code: &str,
    ) -> Result<bool, CodeSenderError> {
        match code {
            FAKE_ERROR_CODE => Err(CodeSenderError::Provider {
                code: None,
                message: "simulated provider failure".to_owned(),
            }),
            _ => Ok(code == FAKE_ACCEPTED_CODE),
        }
    }
}
