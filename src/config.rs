use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub scraper: ScraperConfig,

    pub server: ServerConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/casefetch.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub base_url: String,

    /// Path of the case-status form, relative to `base_url`.
    pub case_search_path: String,

    /// Path of the party-name search page, relative to `base_url`.
    pub party_search_path: String,

    pub user_agent: String,

    /// Request timeout in seconds (default: 30)
    pub request_timeout_seconds: u64,

    /// Extra attempts after the first one for transient failures.
    pub max_retries: u32,

    /// Base delay between attempts; doubled on each retry.
    pub retry_backoff_ms: u64,

    /// Serve a labelled mock record when the court site blocks a case-number lookup.
    pub use_mock_fallback: bool,

    /// Enables an injected challenge solver. Nothing is solved without one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captcha_api_key: Option<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://delhihighcourt.nic.in".to_string(),
            case_search_path: "/app/get-case-type-status".to_string(),
            party_search_path: "/app/case-status-party-wise".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0 Safari/537.36"
                .to_string(),
            request_timeout_seconds: 30,
            max_retries: 2,
            retry_backoff_ms: 500,
            use_mock_fallback: true,
            captcha_api_key: None,
        }
    }
}

impl ScraperConfig {
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    #[must_use]
    pub const fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            cors_allowed_origins: vec![
                "http://localhost:5000".to_string(),
                "http://127.0.0.1:5000".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("casefetch").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".casefetch").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    /// Reads `.env` (if any) and applies process environment overrides.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        dotenvy::dotenv().ok();
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup.
    ///
    /// Empty values are ignored. A value that does not parse as the field's type is an error.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("DATABASE_URL") {
            self.general.database_path = url;
        }
        if let Some(level) = get("LOG_LEVEL") {
            self.general.log_level = level.to_lowercase();
        }
        if let Some(port) = get("PORT") {
            self.server.port = parse_var("PORT", &port)?;
        }
        if let Some(timeout) = get("REQUEST_TIMEOUT") {
            self.scraper.request_timeout_seconds = parse_var("REQUEST_TIMEOUT", &timeout)?;
        }
        if let Some(retries) = get("MAX_RETRIES") {
            self.scraper.max_retries = parse_var("MAX_RETRIES", &retries)?;
        }
        if let Some(agent) = get("USER_AGENT") {
            self.scraper.user_agent = agent;
        }
        if let Some(base) = get("BASE_URL") {
            self.scraper.base_url = base;
        }
        if let Some(key) = get("CAPTCHA_API_KEY") {
            self.scraper.captcha_api_key = Some(key);
        }
        if let Some(flag) = get("USE_MOCK_FALLBACK") {
            self.scraper.use_mock_fallback = parse_bool("USE_MOCK_FALLBACK", &flag)?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.scraper.request_timeout_seconds == 0 {
            anyhow::bail!("Request timeout must be a positive number of seconds");
        }

        let base = url::Url::parse(&self.scraper.base_url)
            .with_context(|| format!("Invalid scraper base URL: {}", self.scraper.base_url))?;
        if !matches!(base.scheme(), "http" | "https") {
            anyhow::bail!("Scraper base URL must use http or https");
        }

        if self.general.database_path.is_empty() {
            anyhow::bail!("Database path cannot be empty");
        }

        Ok(())
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid value for {key}: {value:?}"))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("Invalid value for {key}: {value:?}"),
    }
}
