use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_model::PhoneNormalizer;
use crate::domain_port::*;
use crate::infra_mem::*;
use crate::infra_notify::*;
use crate::infra_redis::*;
use crate::infra_sms::*;
use crate::logger::*;
use crate::settings::Settings;
use std::sync::Arc;

pub struct Server {
    pub access_service: Arc<dyn AccessService>,
    pub admin_service: Arc<dyn AdminService>,
    pub proof_codec: Arc<dyn SessionProofCodec>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let token_store: Arc<dyn TokenStore> = match settings.store.backend.as_str() {
            "memory" => Arc::new(MemoryTokenStore::new()),
            "redis" => {
                let url = settings.store.url.as_deref().ok_or_else(|| {
                    anyhow::anyhow!("store.url is required for the redis backend")
                })?;
                let redis_client = redis::Client::open(url)?;
                let redis_manager = redis_client.get_connection_manager().await?;
                Arc::new(RedisTokenStore::new(
                    redis_manager,
                    settings.store.namespace.clone(),
                ))
            }
            other => return Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        };

        let code_sender: Arc<dyn CodeSender> = match settings.sms.backend.as_str() {
            "fake" => Arc::new(FakeCodeSender::new()),
            "twilio" => {
                let config = TwilioConfig {
                    account_sid: require_env("TWILIO_ACCOUNT_SID")?,
                    auth_token: require_env("TWILIO_AUTH_TOKEN")?,
                    verify_service_sid: require_env("TWILIO_VERIFY_SERVICE_SID")?,
                };
                Arc::new(TwilioCodeSender::try_new(config)?)
            }
            other => return Err(anyhow::anyhow!("Unknown sms backend: {}", other)),
        };

        let notifier: Arc<dyn VerificationNotifier> = match settings.notify.backend.as_str() {
            "log" => Arc::new(LogNotifier::new()),
            "mail" => {
                let endpoint = settings.notify.endpoint.clone().ok_or_else(|| {
                    anyhow::anyhow!("notify.endpoint is required for the mail backend")
                })?;
                let from = settings.notify.from.clone().ok_or_else(|| {
                    anyhow::anyhow!("notify.from is required for the mail backend")
                })?;
                let config = MailConfig {
                    endpoint,
                    api_key: require_env("SEKISHO_MAIL_API_KEY")?,
                    from,
                    recipients: settings.notify.recipients.clone(),
                    country_code: settings.verify.country_code.clone(),
                };
                Arc::new(MailNotifier::try_new(config)?)
            }
            other => return Err(anyhow::anyhow!("Unknown notify backend: {}", other)),
        };

        let key = std::env::var("SEKISHO_PROOF_KEY")
            .unwrap_or_else(|_| "my-dev-secret-key".to_string())
            .into_bytes();
        let proof_codec: Arc<dyn SessionProofCodec> = Arc::new(HmacProofCodec::new(ProofConfig {
            signing_key: key,
            secure_cookies: settings.http.secure_cookies,
        }));

        let admin_password_hash = std::env::var("SEKISHO_ADMIN_PASSWORD_HASH").ok();
        if admin_password_hash.is_none() {
            warn!("SEKISHO_ADMIN_PASSWORD_HASH is not set; admin login will be refused");
        }

        let normalizer = PhoneNormalizer::new(settings.verify.country_code.clone());

        let access_service: Arc<dyn AccessService> = Arc::new(RealAccessService::new(
            token_store.clone(),
            code_sender,
            notifier,
            proof_codec.clone(),
            normalizer,
        ));

        let admin_service: Arc<dyn AdminService> = Arc::new(RealAdminService::new(
            token_store,
            proof_codec.clone(),
            admin_password_hash,
        ));

        info!("server started");

        Ok(Self {
            access_service,
            admin_service,
            proof_codec,
        })
    }
}

fn require_env(name: &str) -> anyhow::Result<String> {
    std::env::var(name).map_err(|_| anyhow::anyhow!("{} is not set", name))
}
