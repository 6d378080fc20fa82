use crate::domain_model::{CanonicalPhone, TokenRecord};
use chrono::{DateTime, Utc};

/// Verification flow for one token, as a pure transition function. All I/O
/// lives in the caller: store lookups and provider verdicts arrive as event
/// payloads, outbound work leaves as [`Effect`]s. Nothing here is persisted;
/// every request re-derives its position from the record and the proof.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FlowState {
    /// Request arrived, token not yet resolved.
    Entry,
    AwaitingPhone,
    AwaitingCode,
    Verified,
    /// Terminal. The reason decides unknown-vs-expired at the edge.
    Denied(DenialReason),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DenialReason {
    NotFound,
    Expired,
}

/// Token resolution at a given instant, computed from the stored record.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TokenGate {
    Missing,
    Expired,
    Active { verified: bool },
}

impl TokenGate {
    pub fn resolve(record: Option<&TokenRecord>, now: DateTime<Utc>) -> Self {
        match record {
            None => TokenGate::Missing,
            Some(r) if r.is_expired_at(now) => TokenGate::Expired,
            Some(r) => TokenGate::Active {
                verified: r.verified,
            },
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FlowEvent {
    /// Token entry. `proven` means a valid scoped proof came with the request.
    Entered { gate: TokenGate, proven: bool },
    /// Normalized phone submission; `None` when validation refused the input.
    PhoneSubmitted(Option<CanonicalPhone>),
    /// The start-challenge effect could not be carried out.
    ChallengeFailed,
    /// Code submission, together with a fresh token resolution. The gate is
    /// re-read here so that expiry mid-flow wins no matter what the provider
    /// would answer.
    CodeSubmitted {
        gate: TokenGate,
        phone: Option<CanonicalPhone>,
        code: String,
    },
    /// Provider verdict for a code that passed the shape and gate checks.
    CodeChecked {
        approved: bool,
        phone: CanonicalPhone,
    },
}

/// Outbound work the caller must perform, in order.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Effect {
    StartChallenge(CanonicalPhone),
    CheckChallenge(CanonicalPhone),
    MarkVerified,
    IssueProof,
    Notify(CanonicalPhone),
}

/// Why an event was refused while the state stayed put.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Rejection {
    InvalidPhone,
    MalformedCode,
    WrongCode,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Transition {
    pub next: FlowState,
    pub effects: Vec<Effect>,
    pub rejection: Option<Rejection>,
}

impl Transition {
    fn to(next: FlowState) -> Self {
        Self {
            next,
            effects: Vec::new(),
            rejection: None,
        }
    }

    fn denied(reason: DenialReason) -> Self {
        Self::to(FlowState::Denied(reason))
    }

    fn refused(next: FlowState, rejection: Rejection) -> Self {
        Self {
            next,
            effects: Vec::new(),
            rejection: Some(rejection),
        }
    }

    fn with_effects(next: FlowState, effects: Vec<Effect>) -> Self {
        Self {
            next,
            effects,
            rejection: None,
        }
    }
}

/// Exactly six ASCII digits.
pub fn code_shape_ok(code: &str) -> bool {
    code.len() == 6 && code.chars().all(|c| c.is_ascii_digit())
}

pub fn advance(state: FlowState, event: FlowEvent) -> Transition {
    match (state, event) {
        (FlowState::Entry, FlowEvent::Entered { gate, proven }) => match gate {
            TokenGate::Missing => Transition::denied(DenialReason::NotFound),
            TokenGate::Expired => Transition::denied(DenialReason::Expired),
            // content needs the stored flag AND the proof; either alone
            // restarts the flow
            TokenGate::Active { verified } if verified && proven => {
                Transition::to(FlowState::Verified)
            }
            TokenGate::Active { .. } => Transition::to(FlowState::AwaitingPhone),
        },
        (FlowState::AwaitingPhone, FlowEvent::PhoneSubmitted(None)) => {
            Transition::refused(FlowState::AwaitingPhone, Rejection::InvalidPhone)
        }
        (FlowState::AwaitingPhone, FlowEvent::PhoneSubmitted(Some(phone))) => {
            Transition::with_effects(
                FlowState::AwaitingCode,
                vec![Effect::StartChallenge(phone)],
            )
        }
        (FlowState::AwaitingCode, FlowEvent::ChallengeFailed) => {
            Transition::to(FlowState::AwaitingPhone)
        }
        (FlowState::AwaitingCode, FlowEvent::CodeSubmitted { gate, phone, code }) => {
            if !code_shape_ok(&code) {
                // refused before the gate and before any provider traffic
                return Transition::refused(FlowState::AwaitingCode, Rejection::MalformedCode);
            }
            let Some(phone) = phone else {
                return Transition::refused(FlowState::AwaitingCode, Rejection::InvalidPhone);
            };
            match gate {
                TokenGate::Missing => Transition::denied(DenialReason::NotFound),
                // the token died mid-flow; an approved code must not revive it
                TokenGate::Expired => Transition::denied(DenialReason::Expired),
                TokenGate::Active { .. } => Transition::with_effects(
                    FlowState::AwaitingCode,
                    vec![Effect::CheckChallenge(phone)],
                ),
            }
        }
        (
            FlowState::AwaitingCode,
            FlowEvent::CodeChecked {
                approved: false, ..
            },
        ) => Transition::refused(FlowState::AwaitingCode, Rejection::WrongCode),
        (FlowState::AwaitingCode, FlowEvent::CodeChecked { approved: true, phone }) => {
            Transition::with_effects(
                FlowState::Verified,
                vec![
                    Effect::MarkVerified,
                    Effect::IssueProof,
                    Effect::Notify(phone),
                ],
            )
        }
        // terminal states absorb everything; out-of-place events are no-ops
        (state, _) => Transition::to(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_model::{PhoneNormalizer, ReportDraft};

    fn phone() -> CanonicalPhone {
        PhoneNormalizer::default()
            .canonicalize("09012345678")
            .unwrap()
    }

    fn active_gate(verified: bool) -> TokenGate {
        TokenGate::Active { verified }
    }

    #[test]
    fn test_gate_resolution() {
        let now = Utc::now();
        assert_eq!(TokenGate::resolve(None, now), TokenGate::Missing);

        let record = TokenRecord::issue(ReportDraft::default());
        assert_eq!(
            TokenGate::resolve(Some(&record), now),
            TokenGate::Active { verified: false }
        );
        assert_eq!(
            TokenGate::resolve(Some(&record), record.expires_at + chrono::Duration::seconds(1)),
            TokenGate::Expired
        );
    }

    #[test]
    fn test_entry_with_dead_token_is_terminal() {
        for (gate, reason) in [
            (TokenGate::Missing, DenialReason::NotFound),
            (TokenGate::Expired, DenialReason::Expired),
        ] {
            let t = advance(FlowState::Entry, FlowEvent::Entered { gate, proven: true });
            assert_eq!(t.next, FlowState::Denied(reason));
            assert!(t.effects.is_empty());

            // once denied, nothing moves the machine again
            let stuck = advance(t.next, FlowEvent::PhoneSubmitted(Some(phone())));
            assert_eq!(stuck.next, FlowState::Denied(reason));
            assert!(stuck.effects.is_empty());
        }
    }

    #[test]
    fn test_entry_needs_flag_and_proof_together() {
        let verified_and_proven = advance(
            FlowState::Entry,
            FlowEvent::Entered { gate: active_gate(true), proven: true },
        );
        assert_eq!(verified_and_proven.next, FlowState::Verified);
        assert!(verified_and_proven.effects.is_empty());

        for (gate, proven) in [
            (active_gate(true), false),
            (active_gate(false), true),
            (active_gate(false), false),
        ] {
            let t = advance(FlowState::Entry, FlowEvent::Entered { gate, proven });
            assert_eq!(t.next, FlowState::AwaitingPhone);
        }
    }

    #[test]
    fn test_invalid_phone_stays_put_without_effects() {
        let t = advance(FlowState::AwaitingPhone, FlowEvent::PhoneSubmitted(None));
        assert_eq!(t.next, FlowState::AwaitingPhone);
        assert!(t.effects.is_empty());
        assert_eq!(t.rejection, Some(Rejection::InvalidPhone));
    }

    #[test]
    fn test_accepted_phone_starts_challenge_with_normalized_number() {
        let t = advance(
            FlowState::AwaitingPhone,
            FlowEvent::PhoneSubmitted(Some(phone())),
        );
        assert_eq!(t.next, FlowState::AwaitingCode);
        assert_eq!(t.effects, vec![Effect::StartChallenge(phone())]);
    }

    #[test]
    fn test_failed_challenge_falls_back_to_phone_entry() {
        let t = advance(FlowState::AwaitingCode, FlowEvent::ChallengeFailed);
        assert_eq!(t.next, FlowState::AwaitingPhone);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_malformed_code_never_reaches_gate_or_provider() {
        for bad in ["12345", "1234567", "12345a", "", "１２３４５６"] {
            // even an expired gate is not consulted for a malformed code
            let t = advance(
                FlowState::AwaitingCode,
                FlowEvent::CodeSubmitted {
                    gate: TokenGate::Expired,
                    phone: Some(phone()),
                    code: bad.to_owned(),
                },
            );
            assert_eq!(t.next, FlowState::AwaitingCode, "code {bad:?}");
            assert_eq!(t.rejection, Some(Rejection::MalformedCode));
            assert!(t.effects.is_empty());
        }
    }

    #[test]
    fn test_expiry_mid_flow_beats_a_correct_code() {
        let t = advance(
            FlowState::AwaitingCode,
            FlowEvent::CodeSubmitted {
                gate: TokenGate::Expired,
                phone: Some(phone()),
                code: "123456".to_owned(),
            },
        );
        assert_eq!(t.next, FlowState::Denied(DenialReason::Expired));
        assert!(
            t.effects.is_empty(),
            "provider must not be consulted for an expired token"
        );
    }

    #[test]
    fn test_well_formed_code_on_live_token_asks_the_provider() {
        let t = advance(
            FlowState::AwaitingCode,
            FlowEvent::CodeSubmitted {
                gate: active_gate(false),
                phone: Some(phone()),
                code: "123456".to_owned(),
            },
        );
        assert_eq!(t.next, FlowState::AwaitingCode);
        assert_eq!(t.effects, vec![Effect::CheckChallenge(phone())]);
        assert_eq!(t.rejection, None);
    }

    #[test]
    fn test_wrong_code_keeps_waiting_without_effects() {
        let t = advance(
            FlowState::AwaitingCode,
            FlowEvent::CodeChecked {
                approved: false,
                phone: phone(),
            },
        );
        assert_eq!(t.next, FlowState::AwaitingCode);
        assert_eq!(t.rejection, Some(Rejection::WrongCode));
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_approval_marks_issues_and_notifies_in_order() {
        let t = advance(
            FlowState::AwaitingCode,
            FlowEvent::CodeChecked {
                approved: true,
                phone: phone(),
            },
        );
        assert_eq!(t.next, FlowState::Verified);
        assert_eq!(
            t.effects,
            vec![
                Effect::MarkVerified,
                Effect::IssueProof,
                Effect::Notify(phone()),
            ]
        );
    }

    #[test]
    fn test_out_of_place_events_are_no_ops() {
        let t = advance(FlowState::Verified, FlowEvent::PhoneSubmitted(Some(phone())));
        assert_eq!(t.next, FlowState::Verified);
        assert!(t.effects.is_empty());

        let t = advance(FlowState::Entry, FlowEvent::ChallengeFailed);
        assert_eq!(t.next, FlowState::Entry);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_code_shape() {
        assert!(code_shape_ok("000000"));
        assert!(code_shape_ok("123456"));
        assert!(!code_shape_ok("12 456"));
        assert!(!code_shape_ok("12345"));
        assert!(!code_shape_ok("abcdef"));
    }
}
