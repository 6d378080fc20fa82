use anyhow::{Result, anyhow};
use config::{Config, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub http: Http,
    pub log: Log,
    pub notify: Notify,
    pub sms: Sms,
    pub store: Store,
    pub verify: Verify,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
    // TLS is optional; behind a terminating proxy the plain listener is used
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
    pub secure_cookies: bool,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Deserialize)]
pub struct Notify {
    pub backend: String, // "log" or "mail"
    pub endpoint: Option<String>,
    pub from: Option<String>,
    #[serde(default)]
    pub recipients: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Sms {
    pub backend: String, // "fake" or "twilio"
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "memory" or "redis"
    pub url: Option<String>,
    pub namespace: String,
}

#[derive(Debug, Deserialize)]
pub struct Verify {
    pub country_code: String,
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}
