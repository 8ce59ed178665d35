//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};
use clap::Parser;

/// CLI argument parsing structure
#[derive(Debug, Clone, Parser)]
#[command(name = "session-timer")]
#[command(about = "Background session timer with persisted history and a status badge")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// JSON file holding the total time and session history
    #[arg(short, long, default_value = "session-timer.json")]
    pub store: PathBuf,

    /// Badge refresh period in milliseconds while the timer runs
    #[arg(long, default_value = "1000")]
    pub badge_interval_ms: u64,

    /// Popup display polling period in milliseconds
    #[arg(long, default_value = "200")]
    pub poll_interval_ms: u64,

    /// Keep-alive tick period in seconds
    #[arg(long, default_value = "60")]
    pub keep_alive_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn badge_interval(&self) -> Duration {
        Duration::from_millis(self.badge_interval_ms.max(1))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn keep_alive_interval(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs.max(1))
    }
}
