//! Configuration management with TOML, environment variables, and CLI overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
///
/// Built once at startup and passed by reference to the collector, the
/// page fetcher and the exporter. Nothing mutates it afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Product identifiers to collect
    #[serde(default = "default_products")]
    pub products: Vec<String>,

    /// Scheme and host of the review API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Reviews requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Sort order passed to the API
    #[serde(default = "default_sort_by")]
    pub sort_by: String,

    /// Upper bound on reviews collected per product; sets the hard page cap
    #[serde(default = "default_max_reviews_per_product")]
    pub max_reviews_per_product: u32,

    /// Ask the API for its total page count before paginating
    #[serde(default = "default_true")]
    pub probe_max_page: bool,

    /// Delay between page requests in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Random jitter added to delay (0 to this value)
    #[serde(default)]
    pub delay_jitter_ms: u64,

    /// Extra attempts for a failed page before it is treated as empty
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff unit; attempt `n` waits `n` times this long
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Number of products collected at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Directory the workbook is written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Route requests through the configured proxy
    #[serde(default = "default_true")]
    pub proxy_enabled: bool,

    /// Forward proxy endpoint and credentials
    #[serde(default)]
    pub proxy: ProxyConfig,
}

/// Forward proxy endpoint and credentials.
///
/// Every field falls back to a placeholder, so a missing configuration never
/// stops the program; the proxy will just refuse the requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_proxy_host")]
    pub host: String,
    #[serde(default = "default_proxy_port")]
    pub port: u16,
    #[serde(default = "default_proxy_username")]
    pub username: String,
    #[serde(default = "default_proxy_password")]
    pub password: String,
}

fn default_products() -> Vec<String> {
    vec!["5720576807".to_string()]
}

fn default_base_url() -> String {
    "https://www.coupang.com".to_string()
}

fn default_page_size() -> u32 {
    10
}

fn default_sort_by() -> String {
    "ORDER_SCORE_ASC".to_string()
}

fn default_max_reviews_per_product() -> u32 {
    1500
}

fn default_true() -> bool {
    true
}

fn default_delay_ms() -> u64 {
    5000
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_base_delay_ms() -> u64 {
    2000
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_concurrency() -> usize {
    1
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_proxy_host() -> String {
    "pr.oxylabs.io".to_string()
}

fn default_proxy_port() -> u16 {
    7777
}

fn default_proxy_username() -> String {
    "your_username".to_string()
}

fn default_proxy_password() -> String {
    "your_password".to_string()
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: default_proxy_host(),
            port: default_proxy_port(),
            username: default_proxy_username(),
            password: default_proxy_password(),
        }
    }
}

impl ProxyConfig {
    /// Returns the proxy URL with percent-encoded credentials.
    pub fn url(&self) -> String {
        format!(
            "http://{}:{}@{}:{}",
            urlencoding::encode(&self.username),
            urlencoding::encode(&self.password),
            self.host,
            self.port
        )
    }

    /// Returns the endpoint without credentials, for logging.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            products: default_products(),
            base_url: default_base_url(),
            page_size: default_page_size(),
            sort_by: default_sort_by(),
            max_reviews_per_product: default_max_reviews_per_product(),
            probe_max_page: true,
            delay_ms: default_delay_ms(),
            delay_jitter_ms: 0,
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            timeout_secs: default_timeout_secs(),
            concurrency: default_concurrency(),
            output_dir: default_output_dir(),
            proxy_enabled: true,
            proxy: ProxyConfig::default(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("coupang-reviews.toml");
        if local_config.exists() {
            debug!("Found coupang-reviews.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("coupang-reviews").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides. Unparsable values are ignored.
    pub fn with_env(mut self) -> Self {
        if let Ok(host) = std::env::var("OXYLABS_PROXY_HOST") {
            self.proxy.host = host;
        }

        if let Ok(port) = std::env::var("OXYLABS_PROXY_PORT") {
            if let Ok(p) = port.parse() {
                self.proxy.port = p;
            }
        }

        if let Ok(username) = std::env::var("OXYLABS_USERNAME") {
            self.proxy.username = username;
        }

        if let Ok(password) = std::env::var("OXYLABS_PASSWORD") {
            self.proxy.password = password;
        }

        if let Ok(delay) = std::env::var("COUPANG_DELAY_MS") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        if let Ok(dir) = std::env::var("COUPANG_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }

        self
    }

    /// Hard page cap derived from the per-product review budget.
    pub fn max_pages(&self) -> u32 {
        if self.page_size == 0 {
            return 0;
        }
        self.max_reviews_per_product.div_ceil(self.page_size)
    }

    /// Returns the proxy settings when proxying is enabled.
    pub fn active_proxy(&self) -> Option<&ProxyConfig> {
        self.proxy_enabled.then_some(&self.proxy)
    }
}
