use anyhow::Context;
use clap::{Parser, Subcommand};
use herald_client::{ClientConfig, OfflineSendPolicy};
use herald_core::Topic;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "herald", version, about = "Tail and manage Herald notifications")]
pub struct Cli {
    /// TOML config file; flags below override its values.
    #[arg(short, long, env = "HERALD_CONFIG")]
    pub config: Option<PathBuf>,

    /// WebSocket endpoint.
    #[arg(long, env = "HERALD_URL")]
    pub url: Option<String>,

    /// Base URL of the notifications REST API.
    #[arg(long, env = "HERALD_API")]
    pub api: Option<String>,

    /// Session token sent as a bearer credential.
    #[arg(long, env = "HERALD_TOKEN", hide_env_values = true)]
    pub token: String,

    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Queue sends made while offline instead of rejecting them.
    #[arg(long)]
    pub queue_offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Stream live notifications until interrupted.
    Tail {
        /// Extra topics to subscribe to after each connect.
        #[arg(long = "topic")]
        topics: Vec<Topic>,
        /// Print one JSON record per line.
        #[arg(long)]
        json: bool,
    },
    /// List stored notifications for a user.
    History {
        #[arg(long)]
        user: u64,
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        size: u32,
    },
    /// Mark a notification as read.
    Read { id: u64 },
    /// Create a notification for a user.
    Send {
        #[arg(long)]
        user: u64,
        #[arg(long)]
        category: Option<String>,
        content: String,
    },
}

impl Cli {
    /// File config (or defaults) with command-line overrides applied.
    pub fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load(path)?,
            None => ClientConfig::default(),
        };
        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if let Some(api) = &self.api {
            config.rest_base_url = Some(api.clone());
        }
        if let Some(max) = self.max_attempts {
            config.max_reconnect_attempts = max;
        }
        if self.queue_offline {
            config.offline_send = OfflineSendPolicy::Queue;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn api_base(&self, config: &ClientConfig) -> anyhow::Result<String> {
        config
            .rest_base_url
            .clone()
            .context("no REST endpoint configured; pass --api or set rest_base_url")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "herald",
            "--token",
            "t",
            "--url",
            "wss://admin.example.com/ws",
            "--max-attempts",
            "5",
            "--queue-offline",
            "tail",
            "--topic",
            "/topic/admin",
        ])
        .unwrap();
        let config = cli.client_config().unwrap();
        assert_eq!(config.url, "wss://admin.example.com/ws");
        assert_eq!(config.max_reconnect_attempts, 5);
        assert_eq!(config.offline_send, OfflineSendPolicy::Queue);
        assert!(cli.api_base(&config).is_err());
        match cli.command {
            Command::Tail { topics, json } => {
                assert_eq!(topics, vec!["/topic/admin".parse::<Topic>().unwrap()]);
                assert!(!json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn bad_topic_is_rejected() {
        let parsed = Cli::try_parse_from(["herald", "--token", "t", "tail", "--topic", "admin"]);
        assert!(parsed.is_err());
    }
}
