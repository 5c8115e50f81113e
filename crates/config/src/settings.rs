use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub render: RenderSettings,
    pub sms: SmsSettings,
    pub pricing: PricingSettings,
    pub referral: ReferralSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub name: String,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    /// Lifetime of the single-order tokens handed to the render harness.
    pub render_token_ttl_secs: u64,
    pub issuer: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderSettings {
    /// Base URL of this API as seen by the render harness, e.g. `http://localhost:3000/api`.
    pub api_base: String,
    pub fetch_timeout_secs: u64,
    pub render_timeout_secs: u64,
    pub output_dir: String,
    pub max_photo_dimension: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SmsSettings {
    /// No URL means development mode: codes are logged instead of sent.
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub sender_id: String,
    pub otp_ttl_secs: u64,
    pub otp_max_attempts: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PricingSettings {
    pub base_price_paise: u64,
    pub per_member_price_paise: u64,
    /// GST rate in basis points (1800 = 18%).
    pub gst_rate_bps: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReferralSettings {
    /// Ambassador reward as basis points of the order total.
    pub reward_rate_bps: u32,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("GROUPFRAME"),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 3000)?
            .set_default("app.cors_origins", Vec::<String>::new())?
            .set_default("database.url", "mongodb://localhost:27017")?
            .set_default("database.name", "groupframe")?
            .set_default("jwt.secret", "change-me-in-production")?
            .set_default("jwt.access_token_ttl_secs", 3600)?
            .set_default("jwt.refresh_token_ttl_secs", 604800)?
            .set_default("jwt.render_token_ttl_secs", 900)?
            .set_default("jwt.issuer", "groupframe")?
            .set_default("render.api_base", "http://localhost:3000/api")?
            .set_default("render.fetch_timeout_secs", 30)?
            .set_default("render.render_timeout_secs", 45)?
            .set_default("render.output_dir", "/tmp/groupframe-renders")?
            .set_default("render.max_photo_dimension", 1600)?
            .set_default("sms.api_url", None::<String>)?
            .set_default("sms.api_key", None::<String>)?
            .set_default("sms.sender_id", "GRPFRM")?
            .set_default("sms.otp_ttl_secs", 300)?
            .set_default("sms.otp_max_attempts", 5)?
            .set_default("pricing.base_price_paise", 49900)?
            .set_default("pricing.per_member_price_paise", 2500)?
            .set_default("pricing.gst_rate_bps", 1800)?
            .set_default("referral.reward_rate_bps", 1000)?
            .build()?;

        config.try_deserialize()
    }
}
