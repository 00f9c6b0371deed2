use std::net::IpAddr;

use ipnet::IpNet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub log_level: String,
    pub max_body_size: usize,
    pub trusted_proxies: Vec<IpNet>,
    pub cookie_secure: bool,
    pub cors_origins: Vec<String>,
    pub form_rate_limit: u32,
    pub form_rate_window_secs: u64,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. `from_env` wraps this with
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;
        if jwt_secret.len() < 32 {
            return Err(ConfigError::Invalid {
                key: "JWT_SECRET",
                reason: "must be at least 32 bytes".to_string(),
            });
        }

        let host: IpAddr = parse("IMAGEN_HOST", &or("IMAGEN_HOST", "0.0.0.0"))?;
        let port: u16 = parse("IMAGEN_PORT", &or("IMAGEN_PORT", "3000"))?;
        let base_url = or("IMAGEN_BASE_URL", &format!("http://{host}:{port}"))
            .trim_end_matches('/')
            .to_string();
        let log_level = or("IMAGEN_LOG_LEVEL", "info");
        let max_body_size: usize =
            parse("IMAGEN_MAX_BODY_SIZE", &or("IMAGEN_MAX_BODY_SIZE", "1048576"))?;

        let trusted_proxies = or("IMAGEN_TRUSTED_PROXIES", "")
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| parse::<IpNet>("IMAGEN_TRUSTED_PROXIES", s.trim()))
            .collect::<Result<Vec<_>, _>>()?;

        let cookie_secure = match or("IMAGEN_COOKIE_SECURE", "true").as_str() {
            "false" | "0" | "no" => false,
            _ => true,
        };

        let cors_origins = or("IMAGEN_CORS_ORIGINS", "")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let form_rate_limit: u32 = parse("IMAGEN_FORM_RATE_LIMIT", &or("IMAGEN_FORM_RATE_LIMIT", "5"))?;
        let form_rate_window_secs: u64 = parse(
            "IMAGEN_FORM_RATE_WINDOW_SECS",
            &or("IMAGEN_FORM_RATE_WINDOW_SECS", "600"),
        )?;

        let smtp = match (
            lookup("IMAGEN_SMTP_HOST"),
            lookup("IMAGEN_SMTP_PORT"),
            lookup("IMAGEN_SMTP_USER"),
            lookup("IMAGEN_SMTP_PASS"),
            lookup("IMAGEN_SMTP_FROM"),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: parse("IMAGEN_SMTP_PORT", &port)?,
                user,
                pass,
                from,
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            base_url,
            log_level,
            max_body_size,
            trusted_proxies,
            cookie_secure,
            cors_origins,
            form_rate_limit,
            form_rate_window_secs,
            smtp,
        })
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}
