/// Example demonstrating how to call the public service interfaces.
///
/// Runs entirely in-process: memory store, fake SMS backend (the code
/// is always `123456`) and the log notifier. No network access needed.
use sekisho::application_impl::*;
use sekisho::application_port::*;
use sekisho::domain_model::*;
use sekisho::infra_mem::*;
use sekisho::infra_notify::*;
use sekisho::infra_sms::*;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::new("verify_demo=debug,sekisho=debug");
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    let store = Arc::new(MemoryTokenStore::new());
    let proof_codec: Arc<dyn SessionProofCodec> = Arc::new(HmacProofCodec::new(ProofConfig {
        signing_key: b"demo-signing-key".to_vec(),
        secure_cookies: false,
    }));

    let access_service = RealAccessService::new(
        store.clone(),
        Arc::new(FakeCodeSender::new()),
        Arc::new(LogNotifier::new()),
        proof_codec.clone(),
        PhoneNormalizer::default(),
    );
    let admin_service = RealAdminService::new(store.clone(), proof_codec.clone(), None);

    // the operator mints a link
    let issued = admin_service
        .issue_token(ReportDraft {
            kind: Some(ReportKind::Fixed),
            report_title: Some("Demo hearing report".to_string()),
            report_body: Some("All findings in order.".to_string()),
            customer_identity_hint: Some("demo@example.com".to_string()),
            ..Default::default()
        })
        .await?;
    println!("verify url: {}", issued.verify_url);

    // the customer opens it without a proof cookie
    let view = access_service.report_view(&issued.token, None).await?;
    println!("first visit: {:?}", view);

    // phone + fake code round trip
    let started = access_service
        .start_verification(StartInput {
            phone: "090-1234-5678".to_string(),
        })
        .await?;
    println!("challenge sent to {}", started.phone);

    let result = access_service
        .check_code(
            &issued.token,
            CheckInput {
                phone: started.phone.to_string(),
                code: FAKE_ACCEPTED_CODE.to_string(),
                identity_hint: None,
            },
        )
        .await?;
    println!("set-cookie: {}", result.proof.header_value);

    // the same request again, now carrying the proof
    let cookie = result
        .proof
        .header_value
        .split(';')
        .next()
        .unwrap_or_default()
        .to_string();
    let view = access_service
        .report_view(&issued.token, Some(&cookie))
        .await?;
    println!("after verification: {:?}", view);

    // let the detached notice task log before the runtime drops
    tokio::time::sleep(Duration::from_millis(50)).await;

    Ok(())
}
