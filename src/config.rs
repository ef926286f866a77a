use crate::services::sms::TwilioCredentials;
use anyhow::{anyhow, Context, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub service_key: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub push_ttl_secs: u32,
    pub push_timeout: Duration,
    pub reveal_sweep_cron: String,
    pub reminder_sweep_cron: String,
    pub twilio: Option<TwilioCredentials>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or_else(|| anyhow!("DATABASE_URL missing"))?;
        let service_key = get("SERVICE_KEY").ok_or_else(|| anyhow!("SERVICE_KEY missing"))?;

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| {
            let port = get("PORT").unwrap_or_else(|| "3000".to_string());
            format!("0.0.0.0:{}", port)
        });

        fn parse_or<T: std::str::FromStr>(raw: Option<String>, key: &str, default: T) -> Result<T>
        where
            T::Err: std::error::Error + Send + Sync + 'static,
        {
            match raw {
                Some(value) => value.trim().parse().with_context(|| format!("{} is invalid", key)),
                None => Ok(default),
            }
        }

        let db_max_connections = parse_or(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 10)?;
        let push_ttl_secs = parse_or(get("PUSH_TTL_SECS"), "PUSH_TTL_SECS", 86_400)?;
        let push_timeout_secs: u64 = parse_or(get("PUSH_TIMEOUT_SECS"), "PUSH_TIMEOUT_SECS", 10)?;

        let twilio = match (
            get("TWILIO_ACCOUNT_SID"),
            get("TWILIO_AUTH_TOKEN"),
            get("TWILIO_PHONE_NUMBER"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from_number)) => Some(TwilioCredentials {
                account_sid,
                auth_token,
                from_number,
            }),
            (None, None, None) => None,
            _ => {
                tracing::warn!("Twilio settings are incomplete, SMS relay disabled");
                None
            }
        };

        Ok(Self {
            database_url,
            service_key,
            bind_addr,
            db_max_connections,
            push_ttl_secs,
            push_timeout: Duration::from_secs(push_timeout_secs),
            reveal_sweep_cron: get("REVEAL_SWEEP_CRON").unwrap_or_else(|| "0 */5 * * * *".to_string()),
            reminder_sweep_cron: get("REMINDER_SWEEP_CRON").unwrap_or_else(|| "0 0 18 * * *".to_string()),
            twilio,
        })
    }
}
