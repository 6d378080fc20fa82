use crate::application_port::{
    AccessError, AccessService, CheckInput, CheckResult, ReportContent, ReportView,
    SessionProofCodec, StartInput, StartResult,
};
use crate::domain_model::{
    DenialReason, Effect, FlowEvent, FlowState, PhoneNormalizer, ProofScope, Rejection, Token,
    TokenGate, advance, code_shape_ok,
};
use crate::domain_port::{
    CodeSender, CodeSenderError, TokenStore, VerificationNotice, VerificationNotifier,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::warn;

const MSG_INVALID_PHONE: &str = "enter a valid phone number";
const MSG_MALFORMED_CODE: &str = "enter the 6-digit verification code";
const MSG_SEND_FAILED: &str = "failed to send the verification code";
const MSG_CHECK_FAILED: &str = "verification could not be completed";

/// Drives the verification flow against real collaborators. Each call
/// rebuilds its position from the store and the proof, consults
/// [`advance`] and carries out the effects it is handed.
pub struct RealAccessService {
    store: Arc<dyn TokenStore>,
    sender: Arc<dyn CodeSender>,
    notifier: Arc<dyn VerificationNotifier>,
    proof_codec: Arc<dyn SessionProofCodec>,
    normalizer: PhoneNormalizer,
}

impl RealAccessService {
    pub fn new(
        store: Arc<dyn TokenStore>,
        sender: Arc<dyn CodeSender>,
        notifier: Arc<dyn VerificationNotifier>,
        proof_codec: Arc<dyn SessionProofCodec>,
        normalizer: PhoneNormalizer,
    ) -> Self {
        Self {
            store,
            sender,
            notifier,
            proof_codec,
            normalizer,
        }
    }

    fn rejection_error(rejection: Rejection) -> AccessError {
        match rejection {
            Rejection::InvalidPhone => AccessError::Validation(MSG_INVALID_PHONE.to_owned()),
            Rejection::MalformedCode => AccessError::Validation(MSG_MALFORMED_CODE.to_owned()),
            Rejection::WrongCode => AccessError::WrongCode,
        }
    }

    fn denial_error(reason: DenialReason) -> AccessError {
        match reason {
            DenialReason::NotFound => AccessError::NotFound,
            DenialReason::Expired => AccessError::Expired,
        }
    }

    fn provider_failure(err: CodeSenderError, fallback: &str) -> AccessError {
        warn!(error = %err, "code provider failure");
        match err {
            CodeSenderError::Provider { message, .. } => AccessError::Provider(message),
            CodeSenderError::Transport(_) | CodeSenderError::Config(_) => {
                AccessError::Provider(fallback.to_owned())
            }
        }
    }

    /// Detached on purpose: the verification result never waits for, or
    /// fails because of, the operator notification.
    fn spawn_notice(&self, notice: VerificationNotice) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(err) = notifier.notify(&notice).await {
                warn!(error = %err, "verification notice was lost");
            }
        });
    }
}

#[async_trait::async_trait]
impl AccessService for RealAccessService {
    async fn report_view(
        &self,
        token: &Token,
        cookie_header: Option<&str>,
    ) -> Result<ReportView, AccessError> {
        let record = self.store.get(token).await?;
        let gate = TokenGate::resolve(record.as_ref(), Utc::now());
        let proven = self
            .proof_codec
            .verify(cookie_header, &ProofScope::Report(token.clone()))
            .await;

        let transition = advance(FlowState::Entry, FlowEvent::Entered { gate, proven });
        match (transition.next, record) {
            (FlowState::Denied(reason), _) => Err(Self::denial_error(reason)),
            (FlowState::Verified, Some(record)) => Ok(ReportView::Ok(ReportContent {
                kind: record.report_kind,
                title: record.report_title,
                body: record.report_body,
                url: record.report_url,
                expires_at: record.expires_at,
            })),
            (_, Some(record)) => Ok(ReportView::NeedsVerification {
                identity_hint: record.customer_identity_hint,
            }),
            // the gate came from this same record, so Active implies Some
            (_, None) => Err(AccessError::Internal("record vanished mid-request".to_owned())),
        }
    }

    async fn start_verification(&self, input: StartInput) -> Result<StartResult, AccessError> {
        let candidate = self.normalizer.canonicalize(&input.phone);
        let transition = advance(FlowState::AwaitingPhone, FlowEvent::PhoneSubmitted(candidate));
        if let Some(rejection) = transition.rejection {
            return Err(Self::rejection_error(rejection));
        }
        let Some(Effect::StartChallenge(phone)) = transition.effects.into_iter().next() else {
            return Err(AccessError::Internal(
                "phone accepted without a challenge".to_owned(),
            ));
        };

        self.sender
            .start_challenge(&phone)
            .await
            .map_err(|e| Self::provider_failure(e, MSG_SEND_FAILED))?;
        Ok(StartResult { phone })
    }

    async fn check_code(
        &self,
        token: &Token,
        input: CheckInput,
    ) -> Result<CheckResult, AccessError> {
        let CheckInput {
            phone,
            code,
            identity_hint,
        } = input;

        let record = self.store.get(token).await?;
        let gate = TokenGate::resolve(record.as_ref(), Utc::now());
        let candidate = self.normalizer.canonicalize(&phone);

        let transition = advance(
            FlowState::AwaitingCode,
            FlowEvent::CodeSubmitted {
                gate,
                phone: candidate,
                code: code.clone(),
            },
        );
        if let Some(rejection) = transition.rejection {
            return Err(Self::rejection_error(rejection));
        }
        if let FlowState::Denied(reason) = transition.next {
            return Err(Self::denial_error(reason));
        }
        let Some(Effect::CheckChallenge(phone)) = transition.effects.into_iter().next() else {
            return Err(AccessError::Internal(
                "code accepted without a provider check".to_owned(),
            ));
        };

        let approved = self
            .sender
            .check_challenge(&phone, &code)
            .await
            .map_err(|e| Self::provider_failure(e, MSG_CHECK_FAILED))?;

        let verdict = advance(
            FlowState::AwaitingCode,
            FlowEvent::CodeChecked {
                approved,
                phone: phone.clone(),
            },
        );
        if let Some(rejection) = verdict.rejection {
            return Err(Self::rejection_error(rejection));
        }

        let mut proof = None;
        for effect in verdict.effects {
            match effect {
                Effect::MarkVerified => {
                    if !self.store.set_verified(token).await? {
                        warn!(token = %token, "token disappeared while marking verified");
                    }
                }
                Effect::IssueProof => {
                    let directive = self
                        .proof_codec
                        .issue(&ProofScope::Report(token.clone()))
                        .await
                        .map_err(|e| AccessError::Internal(e.to_string()))?;
                    proof = Some(directive);
                }
                Effect::Notify(phone) => {
                    // the submitted hint wins over the stored one
                    let identity_hint = identity_hint
                        .as_deref()
                        .map(str::trim)
                        .filter(|h| !h.is_empty())
                        .map(str::to_owned)
                        .or_else(|| {
                            record
                                .as_ref()
                                .and_then(|r| r.customer_identity_hint.clone())
                        });
                    self.spawn_notice(VerificationNotice {
                        phone,
                        identity_hint,
                        token: token.clone(),
                        verified_at: Utc::now(),
                    });
                }
                _ => {}
            }
        }

        let proof =
            proof.ok_or_else(|| AccessError::Internal("verified without a proof".to_owned()))?;
        Ok(CheckResult { proof })
    }

    async fn check_code_global(&self, input: CheckInput) -> Result<CheckResult, AccessError> {
        let CheckInput { phone, code, .. } = input;
        if !code_shape_ok(&code) {
            return Err(AccessError::Validation(MSG_MALFORMED_CODE.to_owned()));
        }
        let Some(phone) = self.normalizer.canonicalize(&phone) else {
            return Err(AccessError::Validation(MSG_INVALID_PHONE.to_owned()));
        };

        let approved = self
            .sender
            .check_challenge(&phone, &code)
            .await
            .map_err(|e| Self::provider_failure(e, MSG_CHECK_FAILED))?;
        if !approved {
            return Err(AccessError::WrongCode);
        }

        let proof = self
            .proof_codec
            .issue(&ProofScope::Global)
            .await
            .map_err(|e| AccessError::Internal(e.to_string()))?;
        Ok(CheckResult { proof })
    }
}
