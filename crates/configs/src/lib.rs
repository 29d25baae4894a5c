use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { catalog_path: default_catalog_path() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self { base_url: default_base_url(), timeout_secs: default_timeout() }
    }
}

fn default_host() -> String { "127.0.0.100".into() }
fn default_port() -> u16 { 8000 }
fn default_catalog_path() -> String { "data_storage/movies.json".into() }
fn default_base_url() -> String { "http://127.0.0.1:8090/popular".into() }
fn default_timeout() -> u64 { 10 }

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

fn is_missing_file(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

/// Build a config purely from environment variables, falling back to defaults.
pub fn from_env() -> AppConfig {
    let mut cfg = AppConfig::default();
    if let Ok(host) = std::env::var("SERVER_HOST") {
        cfg.server.host = host;
    }
    if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
        cfg.server.port = port;
    }
    if let Ok(path) = std::env::var("CATALOG_PATH") {
        cfg.storage.catalog_path = path;
    }
    if let Ok(url) = std::env::var("UPSTREAM_BASE_URL") {
        cfg.upstream.base_url = url;
    }
    if let Some(t) = std::env::var("UPSTREAM_TIMEOUT_SECS").ok().and_then(|t| t.parse::<u64>().ok()) {
        cfg.upstream.timeout_secs = t;
    }
    cfg
}

impl AppConfig {
    /// Load `CONFIG_PATH` (or `config.toml`); without a file use the environment.
    pub fn load_and_validate() -> Result<Self> {
        Self::load_and_validate_from(&config_path())
    }

    /// Load `path`, falling back to the environment only if the file is missing.
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load_and_validate_from(path: &str) -> Result<Self> {
        let mut cfg = match load_from_file(path) {
            Ok(cfg) => cfg,
            Err(e) if is_missing_file(&e) => from_env(),
            Err(e) => return Err(e.context(format!("invalid config file {path}"))),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        self.upstream.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        Ok(())
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        if self.catalog_path.trim().is_empty() {
            return Err(anyhow!("storage.catalog_path is empty"));
        }
        Ok(())
    }
}

impl UpstreamConfig {
    fn validate(&self) -> Result<()> {
        let lower = self.base_url.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("upstream.base_url must start with http:// or https://"));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("upstream.timeout_secs must be a positive number of seconds"));
        }
        Ok(())
    }
}
