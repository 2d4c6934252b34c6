use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_BIND_PORT: u16 = 8021;
pub const DEFAULT_STAGING_ROOT: &str = "/tmp";
pub const DEFAULT_RUN_TIMEOUT_SECS: u64 = 5 * 60;
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 5 * 60;

#[derive(Parser)]
#[command(name = "grader-runner", version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the configuration file; defaults apply when omitted
    #[arg(long = "config", short = 'c')]
    pub config_path: Option<String>,
}

impl CliArgs {
    /// Load the configuration from the specified file
    pub fn to_config(&self) -> anyhow::Result<Config> {
        let Some(path) = &self.config_path else {
            return Ok(Config::default());
        };
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
}

#[derive(Deserialize, Debug, Default)]
pub struct ServerConfig {
    pub bind_address: Option<String>,
    pub bind_port: Option<u16>,
}

impl ServerConfig {
    /// Effective socket address after applying defaults.
    pub fn bind(&self) -> (String, u16) {
        (
            self.bind_address
                .clone()
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            self.bind_port.unwrap_or(DEFAULT_BIND_PORT),
        )
    }
}

/// Runner tunables; unset fields fall back to the documented defaults.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct RunnerConfig {
    /// Base directory for per-run staging directories (default `/tmp`)
    pub staging_root: Option<PathBuf>,
    /// Bound on sandbox execution, in seconds (default 300)
    pub run_timeout_secs: Option<u64>,
    /// Bound on each submission file download, in seconds (default 300)
    pub download_timeout_secs: Option<u64>,
}

impl RunnerConfig {
    pub fn staging_root(&self) -> PathBuf {
        self.staging_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STAGING_ROOT))
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs.unwrap_or(DEFAULT_RUN_TIMEOUT_SECS))
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(
            self.download_timeout_secs
                .unwrap_or(DEFAULT_DOWNLOAD_TIMEOUT_SECS),
        )
    }
}
