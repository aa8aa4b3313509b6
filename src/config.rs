use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub docker: DockerConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub logs: LogsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DockerConfig {
    /// Engine socket path (e.g. ~/.colima/default/docker.sock). Unset: DOCKER_HOST or the default socket.
    pub socket: Option<String>,
    /// Transport timeout of the engine client; long pulls need a generous value.
    #[serde(default = "default_docker_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            socket: None,
            timeout_secs: default_docker_timeout_secs(),
        }
    }
}

fn default_docker_timeout_secs() -> u64 {
    600
}

/// Refresh timers of the views. Image and volume lists fetch once on mount unless an interval is set.
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_containers_interval_ms")]
    pub containers_interval_ms: u64,
    #[serde(default = "default_logs_interval_ms")]
    pub logs_interval_ms: u64,
    #[serde(default = "default_stats_interval_ms")]
    pub stats_interval_ms: u64,
    #[serde(default)]
    pub images_interval_ms: Option<u64>,
    #[serde(default)]
    pub volumes_interval_ms: Option<u64>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            containers_interval_ms: default_containers_interval_ms(),
            logs_interval_ms: default_logs_interval_ms(),
            stats_interval_ms: default_stats_interval_ms(),
            images_interval_ms: None,
            volumes_interval_ms: None,
        }
    }
}

fn default_containers_interval_ms() -> u64 {
    5000
}

fn default_logs_interval_ms() -> u64 {
    3000
}

fn default_stats_interval_ms() -> u64 {
    2000
}

impl PollingConfig {
    pub fn containers(&self) -> Duration {
        Duration::from_millis(self.containers_interval_ms)
    }

    pub fn logs(&self) -> Duration {
        Duration::from_millis(self.logs_interval_ms)
    }

    pub fn stats(&self) -> Duration {
        Duration::from_millis(self.stats_interval_ms)
    }

    pub fn images(&self) -> Option<Duration> {
        self.images_interval_ms.map(Duration::from_millis)
    }

    pub fn volumes(&self) -> Option<Duration> {
        self.volumes_interval_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogsConfig {
    /// Lines requested per logs fetch.
    #[serde(default = "default_logs_tail")]
    pub tail: u32,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            tail: default_logs_tail(),
        }
    }
}

fn default_logs_tail() -> u32 {
    500
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &str) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.server.host.is_empty(),
            "server.host must be non-empty"
        );
        anyhow::ensure!(
            self.docker.socket.as_deref().is_none_or(|s| !s.is_empty()),
            "docker.socket must be non-empty when set"
        );
        anyhow::ensure!(
            self.docker.timeout_secs > 0,
            "docker.timeout_secs must be > 0, got {}",
            self.docker.timeout_secs
        );
        anyhow::ensure!(
            self.polling.containers_interval_ms > 0,
            "polling.containers_interval_ms must be > 0, got {}",
            self.polling.containers_interval_ms
        );
        anyhow::ensure!(
            self.polling.logs_interval_ms > 0,
            "polling.logs_interval_ms must be > 0, got {}",
            self.polling.logs_interval_ms
        );
        anyhow::ensure!(
            self.polling.stats_interval_ms > 0,
            "polling.stats_interval_ms must be > 0, got {}",
            self.polling.stats_interval_ms
        );
        anyhow::ensure!(
            self.polling.images_interval_ms != Some(0),
            "polling.images_interval_ms must be > 0 when set"
        );
        anyhow::ensure!(
            self.polling.volumes_interval_ms != Some(0),
            "polling.volumes_interval_ms must be > 0 when set"
        );
        anyhow::ensure!(
            self.logs.tail > 0,
            "logs.tail must be > 0, got {}",
            self.logs.tail
        );
        Ok(())
    }
}
