//! Process configuration from flags, environment and `.env`.

use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use whispernotes_core::{default_log_level, LoggingConfig};

pub const DEFAULT_PORT: u16 = 5000;
const LOG_DIR_NAME: &str = "whispernotes-logs";

/// WhisperNotes REST API server.
#[derive(Debug, Clone, Parser)]
#[command(name = "whispernotes-server", version, about)]
pub struct ServerConfig {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Interface to bind
    #[arg(long, env = "WHISPERNOTES_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// SQLite database file
    #[arg(long, env = "WHISPERNOTES_DB_PATH", default_value = "whispernotes.sqlite3")]
    pub db_path: PathBuf,

    /// Directory for rotated log files [default: <tmp>/whispernotes-logs]
    #[arg(long, env = "WHISPERNOTES_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error [default: debug in debug builds, info otherwise]
    #[arg(long, env = "WHISPERNOTES_LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Absolute log directory. Relative values resolve against the
    /// working directory.
    pub fn log_dir(&self) -> PathBuf {
        match &self.log_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => std::env::current_dir()
                .map(|cwd| cwd.join(dir))
                .unwrap_or_else(|_| std::env::temp_dir().join(dir)),
            None => std::env::temp_dir().join(LOG_DIR_NAME),
        }
    }

    pub fn log_level(&self) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| default_log_level().to_string())
    }

    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig::new(self.log_level(), self.log_dir()).echo_stderr(true)
    }
}
