use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};

pub const DEFAULT_SNAPSHOT_INTERVAL_MS: u64 = 2000;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub snapshot_interval: Duration,
    pub rooms: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_path = lookup("ROOMBOARD_DB_PATH").unwrap_or_else(|| "store.db".into());
        let host = lookup("ROOMBOARD_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = lookup("ROOMBOARD_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("ROOMBOARD_PORT must be a port number")?;

        let interval_ms: u64 = match lookup("ROOMBOARD_SNAPSHOT_INTERVAL_MS") {
            Some(v) => v
                .parse()
                .context("ROOMBOARD_SNAPSHOT_INTERVAL_MS must be a number of milliseconds")?,
            None => DEFAULT_SNAPSHOT_INTERVAL_MS,
        };
        if interval_ms == 0 {
            bail!("ROOMBOARD_SNAPSHOT_INTERVAL_MS must be greater than zero");
        }

        let rooms = lookup("ROOMBOARD_ROOMS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            db_path: db_path.into(),
            host,
            port,
            snapshot_interval: Duration::from_millis(interval_ms),
            rooms,
        })
    }

    /// Resolve `host:port` to a bind address. The host may be an IP or a name.
    pub async fn resolve_addr(&self) -> Result<SocketAddr> {
        tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .with_context(|| format!("cannot resolve ROOMBOARD_HOST {}", self.host))?
            .next()
            .with_context(|| format!("ROOMBOARD_HOST {} resolved to no address", self.host))
    }
}
