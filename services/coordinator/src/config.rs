use std::net::SocketAddr;

use anyhow::{Context, Result};

use crate::alerts::DEFAULT_BUFFER;
use crate::store::{TaskSettings, TransitionPolicy};

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub log_level: String,
    /// Seeds demo camps and volunteers at startup.
    pub dev_mode: bool,
    pub alert_buffer: usize,
    pub tasks: TaskSettings,
}

fn flag(value: Option<String>, default: bool) -> bool {
    match value {
        Some(v) => v == "1" || v.eq_ignore_ascii_case("true"),
        None => default,
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let listen_addr = var("RELIEF_LISTEN_ADDR")
            .unwrap_or_else(|| "127.0.0.1:5000".to_string())
            .parse()
            .context("RELIEF_LISTEN_ADDR is not a socket address")?;

        let log_level = var("RELIEF_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let dev_mode = flag(var("RELIEF_DEV"), false);

        let alert_buffer = match var("RELIEF_ALERT_BUFFER") {
            Some(v) => v
                .parse()
                .context("RELIEF_ALERT_BUFFER must be a positive integer")?,
            None => DEFAULT_BUFFER,
        };

        let policy = if flag(var("RELIEF_STRICT_TRANSITIONS"), false) {
            TransitionPolicy::Strict
        } else {
            TransitionPolicy::Permissive
        };
        let reject_double_booking = flag(var("RELIEF_REJECT_DOUBLE_BOOKING"), true);

        Ok(Self {
            listen_addr,
            log_level,
            dev_mode,
            alert_buffer,
            tasks: TaskSettings {
                policy,
                reject_double_booking,
            },
        })
    }
}
