use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtpConfig {
    pub length: usize,
    pub expiry_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_tls: bool,
    pub from_address: String,
    pub from_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    /// Base URL that public object URLs are built from.
    pub public_url: String,
}

/// Admin account created at startup when it does not exist yet.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub otp: OtpConfig,
    pub mail: MailConfig,
    pub media: MediaConfig,
    pub admin_seed: Option<AdminSeed>,
}

fn var(key: &str) -> anyhow::Result<String> {
    std::env::var(key).with_context(|| format!("missing env var {}", key))
}

fn var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = var("DATABASE_URL")?;

        let jwt = JwtConfig {
            secret: var("JWT_SECRET")?,
            issuer: var_or("JWT_ISSUER", "coachsite"),
            audience: var_or("JWT_AUDIENCE", "coachsite-users"),
            ttl_minutes: parsed_or("JWT_TTL_MINUTES", 60 * 24 * 7),
        };

        let otp = OtpConfig {
            length: parsed_or("OTP_LENGTH", 6usize).clamp(4, 10),
            expiry_minutes: parsed_or("OTP_EXPIRY_MINUTES", 10),
        };

        let mail = MailConfig {
            smtp_host: var("SMTP_HOST")?,
            smtp_port: parsed_or("SMTP_PORT", 587),
            smtp_username: std::env::var("SMTP_USERNAME").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
            smtp_tls: parsed_or("SMTP_TLS", true),
            from_address: var("MAIL_FROM")?,
            from_name: std::env::var("MAIL_FROM_NAME").ok(),
        };

        let endpoint = var("S3_ENDPOINT")?;
        let bucket = var("S3_BUCKET")?;
        let public_url = std::env::var("MEDIA_PUBLIC_URL")
            .unwrap_or_else(|_| format!("{}/{}", endpoint.trim_end_matches('/'), bucket));
        let media = MediaConfig {
            access_key: var("S3_ACCESS_KEY")?,
            secret_key: var("S3_SECRET_KEY")?,
            region: var_or("S3_REGION", "us-east-1"),
            endpoint,
            bucket,
            public_url,
        };

        let admin_seed = match (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(AdminSeed { email, password }),
            _ => None,
        };

        Ok(Self {
            database_url,
            jwt,
            otp,
            mail,
            media,
            admin_seed,
        })
    }
}
