// Runtime configuration: backend credentials, bind address and fixture data

pub mod fixtures;

use anyhow::{bail, Context, Result};
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

const DEFAULT_BIND: &str = "0.0.0.0:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the auth directory / data API backend
#[derive(Debug, Clone)]
pub struct Settings {
    pub backend_url: Url,
    pub service_key: String,
    pub bind_addr: SocketAddr,
    pub request_timeout: Duration,
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup, so tests don't touch the real environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("SUPABASE_URL").context("SUPABASE_URL must be set")?;
        let backend_url = Url::parse(raw_url.trim())
            .with_context(|| format!("SUPABASE_URL is not a valid URL: {}", raw_url))?;
        if !matches!(backend_url.scheme(), "http" | "https") {
            bail!("SUPABASE_URL must use http or https, got {}", backend_url.scheme());
        }

        let service_key = lookup("SUPABASE_SERVICE_ROLE_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .context("SUPABASE_SERVICE_ROLE_KEY must be set")?;

        let bind_addr = lookup("SEEDER_BIND")
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
            .parse::<SocketAddr>()
            .context("SEEDER_BIND must be a socket address like 0.0.0.0:8000")?;

        let timeout_secs = match lookup("SEEDER_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("SEEDER_TIMEOUT_SECS must be a whole number of seconds")?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            backend_url,
            service_key,
            bind_addr,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
