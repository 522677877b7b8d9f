use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use murmur_store::StoreConfig;

/// Server settings, read from `MURMUR_*` environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub store: StoreConfig,
    /// Background presence sweep period; `None` leaves sweeping to heartbeats.
    pub presence_sweep: Option<Duration>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup, so parsing can be tested without touching
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("MURMUR_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse(&lookup, "MURMUR_PORT", 3000)?;
        let upload_dir: PathBuf = lookup("MURMUR_UPLOAD_DIR")
            .unwrap_or_else(|| "./uploads".into())
            .into();
        let max_upload_bytes: usize = parse(&lookup, "MURMUR_MAX_UPLOAD_BYTES", 50 * 1024 * 1024)?;

        let max_messages: usize = parse(&lookup, "MURMUR_MAX_MESSAGES", 100)?;
        if max_messages == 0 {
            bail!("MURMUR_MAX_MESSAGES must be at least 1");
        }
        let ttl_secs: u64 = parse(&lookup, "MURMUR_PRESENCE_TTL_SECS", 300)?;
        let online_secs: u64 = parse(&lookup, "MURMUR_ONLINE_WINDOW_SECS", 30)?;
        if online_secs > ttl_secs {
            bail!("MURMUR_ONLINE_WINDOW_SECS ({online_secs}) exceeds MURMUR_PRESENCE_TTL_SECS ({ttl_secs})");
        }
        let sweep_secs: u64 = parse(&lookup, "MURMUR_PRESENCE_SWEEP_SECS", 60)?;

        Ok(Self {
            host,
            port,
            upload_dir,
            max_upload_bytes,
            store: StoreConfig {
                max_messages_per_channel: max_messages,
                presence_ttl: Duration::from_secs(ttl_secs),
                online_window: Duration::from_secs(online_secs),
            },
            presence_sweep: (sweep_secs > 0).then(|| Duration::from_secs(sweep_secs)),
        })
    }
}

fn parse<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {key}: {raw:?}")),
        None => Ok(default),
    }
}
