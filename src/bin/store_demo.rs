/// Example exercising the Redis-backed token store against a live server.
///
/// ⚠️ Required for execution:
/// A reachable Redis on `redis://127.0.0.1:6379` (no auth). Records are
/// written under the `report_demo` namespace so a concurrently running
/// server's `report` keys are left alone.
///
/// This is intended only for manual testing against real infrastructure.
use chrono::{Duration, Utc};
use sekisho::domain_model::{ReportDraft, ReportKind, Token, TokenRecord};
use sekisho::domain_port::TokenStore;
use sekisho::infra_redis::RedisTokenStore;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::new("store_demo=debug");

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    // region prepare connection

    const REDIS_DSN: &str = "redis://127.0.0.1:6379";
    let redis_client = redis::Client::open(REDIS_DSN)?;
    let mut redis_manager = redis_client.get_connection_manager().await?;

    let pong: String = redis::cmd("PING").query_async(&mut redis_manager).await?;
    println!("PING -> {}", pong);

    // endregion

    let store = RedisTokenStore::new(redis_manager.clone(), "report_demo".to_string());

    // use cases

    let record = TokenRecord::issue(ReportDraft {
        kind: Some(ReportKind::Custom),
        report_title: Some("Store demo report".to_string()),
        report_body: Some("Written by store_demo.".to_string()),
        customer_identity_hint: Some("demo@example.com".to_string()),
        ..Default::default()
    });
    store.create(&record).await?;
    println!("created {} (expires {})", record.token, record.expires_at);

    let loaded = store.get(&record.token).await?;
    tracing::debug!("loaded: {:?}", loaded);

    let validity = store.validity(&record.token).await?;
    println!("validity before verification -> {:?}", validity);

    let flipped = store.set_verified(&record.token).await?;
    println!("set_verified -> {}", flipped);

    let loaded = store.get(&record.token).await?;
    println!(
        "verified flag after update -> {:?}",
        loaded.map(|r| r.verified)
    );

    // a token nobody ever issued
    let ghost = Token::mint();
    let validity = store.validity(&ghost).await?;
    println!("validity of unknown token -> {:?}", validity);
    let flipped = store.set_verified(&ghost).await?;
    println!("set_verified on unknown token -> {}", flipped);

    // an issued record whose expiry has already passed
    let mut stale = TokenRecord::issue(ReportDraft::default());
    stale.expires_at = Utc::now() - Duration::hours(1);
    store.create(&stale).await?;
    let validity = store.validity(&stale.token).await?;
    println!("validity of expired token -> {:?}", validity);

    Ok(())
}
