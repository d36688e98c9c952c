use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};
use chrono::NaiveTime;

use crate::notify::RecurringSchedule;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub api_prefix: String,
    pub log_dir: String,

    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,

    // Rate limiting
    pub rate_submit_per_min: u32,
    pub rate_read_per_min: u32,

    pub attendance_cutoff: NaiveTime,

    pub notify_schedule: RecurringSchedule,
    pub scheduler_tick: Duration,

    pub email: EmailConfig,
}

#[derive(Clone)]
pub struct EmailConfig {
    pub api_url: String,
    /// Absent means every send fails; the service still runs.
    pub api_key: Option<String>,
    pub sender_name: String,
    pub sender_email: String,
    pub send_timeout: Duration,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("sender_email", &self.sender_email)
            .field("send_timeout", &self.send_timeout)
            .finish()
    }
}

fn parse_time(key: &str, raw: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .with_context(|| format!("{key} must be HH:MM, got {raw:?}"))
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |key: &str| lookup(key).with_context(|| format!("{key} must be set"));
        let or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        fn parsed<T: FromStr>(key: &str, raw: String) -> anyhow::Result<T>
        where
            T::Err: std::error::Error + Send + Sync + 'static,
        {
            raw.trim()
                .parse()
                .with_context(|| format!("{key} has an invalid value {raw:?}"))
        }

        let tick_secs: u64 = parsed("SCHEDULER_TICK_SECS", or("SCHEDULER_TICK_SECS", "15"))?;
        if !(1..=30).contains(&tick_secs) {
            bail!("SCHEDULER_TICK_SECS must be between 1 and 30, got {tick_secs}");
        }

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            api_prefix: or("API_PREFIX", "/api"),
            log_dir: or("LOG_DIR", "logs"),

            db_max_connections: parsed("DB_MAX_CONNECTIONS", or("DB_MAX_CONNECTIONS", "10"))?,
            db_acquire_timeout: Duration::from_secs(parsed(
                "DB_ACQUIRE_TIMEOUT_SECS",
                or("DB_ACQUIRE_TIMEOUT_SECS", "5"),
            )?),

            rate_submit_per_min: parsed("RATE_SUBMIT_PER_MIN", or("RATE_SUBMIT_PER_MIN", "60"))?,
            rate_read_per_min: parsed("RATE_READ_PER_MIN", or("RATE_READ_PER_MIN", "1000"))?,

            attendance_cutoff: parse_time("ATTENDANCE_CUTOFF", &or("ATTENDANCE_CUTOFF", "21:30"))?,

            notify_schedule: RecurringSchedule::parse(
                &or("NOTIFY_AT", "09:30"),
                &or("NOTIFY_WEEKDAYS", "mon,tue,wed,thu,fri"),
            )
            .context("NOTIFY_AT / NOTIFY_WEEKDAYS")?,
            scheduler_tick: Duration::from_secs(tick_secs),

            email: EmailConfig {
                api_url: or("BREVO_API_URL", "https://api.brevo.com/v3/smtp/email"),
                api_key: lookup("BREVO_API_KEY").filter(|k| !k.trim().is_empty()),
                sender_name: or("NOTIFY_SENDER_NAME", "Lunch Manager"),
                sender_email: or("NOTIFY_SENDER_EMAIL", "lunch-manager@localhost"),
                send_timeout: Duration::from_secs(parsed(
                    "EMAIL_SEND_TIMEOUT_SECS",
                    or("EMAIL_SEND_TIMEOUT_SECS", "10"),
                )?),
            },
        })
    }
}
