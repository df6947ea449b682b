use std::str::FromStr;

use anyhow::{anyhow, Context};

use crate::{availability::DEFAULT_WINDOW_DAYS, booking::state::CancelPolicy};

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub booking_window_days: u32,
    pub session_inactivity: time::Duration,
    pub meeting_link_base: String,
    pub cancel_policy: CancelPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: "sqlite://mentorbook.db?mode=rwc".to_owned(),
            bind_addr: "0.0.0.0:8080".to_owned(),
            booking_window_days: DEFAULT_WINDOW_DAYS,
            session_inactivity: time::Duration::minutes(60),
            meeting_link_base: "https://meet.google.com".to_owned(),
            cancel_policy: CancelPolicy::Either,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Config> {
        Config::from_lookup(|key| dotenv::var(key).ok())
    }

    /// Builds a config from whatever `lookup` returns for each setting,
    /// falling back to the defaults for unset ones.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Config> {
        let defaults = Config::default();
        Ok(Config {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            booking_window_days: parsed(&lookup, "BOOKING_WINDOW_DAYS")?.unwrap_or(defaults.booking_window_days),
            session_inactivity: parsed::<i64>(&lookup, "SESSION_INACTIVITY_MINUTES")?
                .map(time::Duration::minutes)
                .unwrap_or(defaults.session_inactivity),
            meeting_link_base: lookup("MEETING_LINK_BASE")
                .map(|base| base.trim_end_matches('/').to_owned())
                .unwrap_or(defaults.meeting_link_base),
            cancel_policy: match lookup("CANCEL_POLICY").as_deref() {
                None | Some("either") => CancelPolicy::Either,
                Some("mentor") => CancelPolicy::Mentor,
                Some(other) => return Err(anyhow!("CANCEL_POLICY must be \"either\" or \"mentor\", got {other:?}")),
            },
        })
    }
}

fn parsed<T>(lookup: impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|value| value.parse::<T>().with_context(|| format!("{key}={value:?}")))
        .transpose()
}
