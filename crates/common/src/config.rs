use anyhow::{Result, anyhow};
use std::env;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpTls {
    /// Plain connection upgraded with STARTTLS (usually port 587).
    StartTls,
    /// Implicit TLS from the first byte (usually port 465).
    Tls,
    /// No encryption, for local relays and test sinks.
    None,
}

impl SmtpTls {
    fn parse(key: &str, raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "starttls" => Ok(Self::StartTls),
            "tls" => Ok(Self::Tls),
            "none" => Ok(Self::None),
            other => Err(anyhow!("{} must be starttls, tls or none, got {}", key, other)),
        }
    }
}

#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub tls: SmtpTls,
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("from", &self.from)
            .field("tls", &self.tls)
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub listen_addr: String,
    pub auth_token: String,
    pub smtp: SmtpConfig,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &"<redacted>")
            .field("db_max_connections", &self.db_max_connections)
            .field("listen_addr", &self.listen_addr)
            .field("auth_token", &"<redacted>")
            .field("smtp", &self.smtp)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        // Load .env early so process env reads pick it up.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = required(&lookup, "DATABASE_URL")?;
        let db_max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 10u32)?;
        let listen_addr = lookup("LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:8000".to_string());
        let auth_token = required(&lookup, "AUTH_TOKEN")?;

        let username = non_empty(&lookup, "SMTP_USERNAME");
        let password = non_empty(&lookup, "SMTP_PASSWORD");
        if username.is_some() != password.is_some() {
            return Err(anyhow!(
                "SMTP_USERNAME and SMTP_PASSWORD must be set together"
            ));
        }
        let tls = match non_empty(&lookup, "SMTP_TLS") {
            Some(raw) => SmtpTls::parse("SMTP_TLS", &raw)?,
            None => SmtpTls::StartTls,
        };
        let smtp = SmtpConfig {
            host: required(&lookup, "SMTP_HOST")?,
            port: parse_or(&lookup, "SMTP_PORT", 587u16)?,
            username,
            password,
            from: required(&lookup, "SMTP_FROM")?,
            tls,
        };

        Ok(Self {
            database_url,
            db_max_connections,
            listen_addr,
            auth_token,
            smtp,
        })
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key).ok_or_else(|| anyhow!("{} is required", key))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match non_empty(lookup, key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| anyhow!("{} invalid value {}", key, raw)),
        None => Ok(default),
    }
}
