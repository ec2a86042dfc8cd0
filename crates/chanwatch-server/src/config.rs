use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

use chanwatch_gateway::notifier::DEFAULT_CAPACITY;

/// Process configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub static_dir: PathBuf,
    pub irc_enabled: bool,
    pub irc_server: String,
    pub irc_nick: String,
    /// Joined on RPL_WELCOME.
    pub irc_channels: Vec<String>,
    /// Name recorded on messages sent through the API.
    pub sender_name: String,
    pub notify_capacity: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let host = var("CHANWATCH_HOST", "0.0.0.0");
        let port: u16 = var("CHANWATCH_PORT", "6520")
            .parse()
            .context("CHANWATCH_PORT is not a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", host, port))?;

        let irc_enabled = match var("CHANWATCH_IRC_ENABLED", "true").to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            other => anyhow::bail!("CHANWATCH_IRC_ENABLED has unexpected value {:?}", other),
        };

        let irc_nick = var("CHANWATCH_IRC_NICK", "dooferbot");
        let irc_channels = var("CHANWATCH_IRC_CHANNELS", "#dooferbot,#juju-dev")
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();

        let notify_capacity: usize = var("CHANWATCH_NOTIFY_CAPACITY", &DEFAULT_CAPACITY.to_string())
            .parse()
            .context("CHANWATCH_NOTIFY_CAPACITY is not a number")?;
        if notify_capacity == 0 {
            anyhow::bail!("CHANWATCH_NOTIFY_CAPACITY must be at least 1");
        }

        Ok(Self {
            addr,
            db_path: var("CHANWATCH_DB_PATH", "chanwatch.db").into(),
            static_dir: var("CHANWATCH_STATIC_DIR", "./static").into(),
            irc_enabled,
            irc_server: var("CHANWATCH_IRC_SERVER", "chat.freenode.org:6667"),
            sender_name: get("CHANWATCH_SENDER_NAME").unwrap_or_else(|| irc_nick.clone()),
            irc_nick,
            irc_channels,
            notify_capacity,
        })
    }
}
