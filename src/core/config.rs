//! Application configuration management
//!
//! Configuration is read from an optional TOML file and then overridden by
//! environment variables, so container platforms that only inject `PORT`
//! work without a config file. All values are validated at startup.

use crate::core::constants::upstream;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default server port
const DEFAULT_PORT: u16 = 5000;

/// Default upstream API timeout in seconds
const DEFAULT_REQUEST_TIMEOUT: u64 = 10;

/// Default timeout for proxied structure downloads in seconds
const DEFAULT_DOWNLOAD_TIMEOUT: u64 = 30;

/// Default number of memoized upstream lookups
const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Default lifetime of a memoized lookup in seconds
const DEFAULT_CACHE_TTL: u64 = 3600;

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Some(Environment::Development),
            "production" | "prod" => Some(Environment::Production),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub environment: Environment,
    pub debug: bool,
    pub base_path: String,
    pub static_dir: PathBuf,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            log_level: "info".to_string(),
            environment: Environment::Production,
            debug: false,
            base_path: String::new(),
            static_dir: PathBuf::from("static"),
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub alphafold_api_url: String,
    pub alphafold_files_url: String,
    pub uniprot_api_url: String,
    pub rcsb_data_url: String,
    pub rcsb_files_url: String,
    pub request_timeout: u64,
    pub download_timeout: u64,
    /// Check that a model file exists (HEAD) before returning it from a search
    pub verify_models: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            alphafold_api_url: upstream::ALPHAFOLD_API.to_string(),
            alphafold_files_url: upstream::ALPHAFOLD_FILES.to_string(),
            uniprot_api_url: upstream::UNIPROT_API.to_string(),
            rcsb_data_url: upstream::RCSB_DATA.to_string(),
            rcsb_files_url: upstream::RCSB_FILES.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            verify_models: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub allowed_hosts: Vec<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: upstream::DEFAULT_PROXY_HOSTS
                .iter()
                .map(|h| h.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
            ttl_secs: DEFAULT_CACHE_TTL,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub proxy: ProxyConfig,
    pub cache: CacheConfig,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Logging level
    pub log_level: String,

    pub environment: Environment,

    /// Debug mode forces debug logging
    pub debug: bool,

    /// Path prefix every route is mounted under (empty for the root)
    pub base_path: String,

    /// Directory served under `/static`
    pub static_dir: PathBuf,

    pub cors_allowed_origins: Vec<String>,

    pub alphafold_api_url: String,
    pub alphafold_files_url: String,
    pub uniprot_api_url: String,
    pub rcsb_data_url: String,
    pub rcsb_files_url: String,

    /// Upstream API timeout in seconds
    pub request_timeout: u64,

    /// Proxied download timeout in seconds
    pub download_timeout: u64,

    pub verify_models: bool,

    /// Hosts `/proxy` may fetch from
    pub proxy_allowed_hosts: Vec<String>,

    pub cache_capacity: usize,
    pub cache_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::from(TomlConfig::default())
    }
}

impl From<TomlConfig> for Config {
    fn from(config: TomlConfig) -> Self {
        Config {
            host: config.server.host,
            port: config.server.port,
            log_level: config.server.log_level,
            environment: config.server.environment,
            debug: config.server.debug,
            base_path: config.server.base_path,
            static_dir: config.server.static_dir,
            cors_allowed_origins: config.server.cors_allowed_origins,
            alphafold_api_url: config.upstream.alphafold_api_url,
            alphafold_files_url: config.upstream.alphafold_files_url,
            uniprot_api_url: config.upstream.uniprot_api_url,
            rcsb_data_url: config.upstream.rcsb_data_url,
            rcsb_files_url: config.upstream.rcsb_files_url,
            request_timeout: config.upstream.request_timeout,
            download_timeout: config.upstream.download_timeout,
            verify_models: config.upstream.verify_models,
            proxy_allowed_hosts: config.proxy.allowed_hosts,
            cache_capacity: config.cache.capacity,
            cache_ttl_secs: config.cache.ttl_secs,
        }
    }
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig =
            toml::from_str(content).context("Failed to parse TOML configuration")?;
        Ok(Self::from(config))
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from the config file and the process environment
    ///
    /// Reads `CONFIG_PATH` (default `config.toml`). A missing default file
    /// falls back to built-in defaults; a missing explicit `CONFIG_PATH` is an
    /// error.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("CONFIG_PATH") {
            Ok(path) => Self::from_file(path)?,
            Err(_) if Path::new("config.toml").exists() => Self::from_file("config.toml")?,
            Err(_) => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables
    ///
    /// `FLASK_ENV` and `FLASK_DEBUG` are honored as aliases of `APP_ENV` and
    /// `APP_DEBUG` so existing deployment manifests keep working.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }

        if let Some(port) = lookup("PORT") {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value: {port}"))?;
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = level;
        }

        if let Some(env) = lookup("APP_ENV").or_else(|| lookup("FLASK_ENV")) {
            self.environment = Environment::from_str(&env)
                .with_context(|| format!("Invalid environment: {env}"))?;
        }

        if let Some(debug) = lookup("APP_DEBUG").or_else(|| lookup("FLASK_DEBUG")) {
            self.debug = matches!(debug.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }

        if let Some(base_path) = lookup("BASE_PATH") {
            self.base_path = base_path;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            bail!("Server port must be non-zero");
        }

        if !self.base_path.is_empty()
            && (!self.base_path.starts_with('/') || self.base_path.ends_with('/'))
        {
            bail!(
                "base_path must start with '/' and must not end with '/': {}",
                self.base_path
            );
        }

        for (name, value) in [
            ("alphafold_api_url", &self.alphafold_api_url),
            ("alphafold_files_url", &self.alphafold_files_url),
            ("uniprot_api_url", &self.uniprot_api_url),
            ("rcsb_data_url", &self.rcsb_data_url),
            ("rcsb_files_url", &self.rcsb_files_url),
        ] {
            url::Url::parse(value).with_context(|| format!("Invalid {name}: {value}"))?;
        }

        if self.cache_capacity == 0 {
            bail!("cache capacity must be greater than zero");
        }

        if self.request_timeout == 0 || self.download_timeout == 0 {
            bail!("upstream timeouts must be greater than zero");
        }

        Ok(())
    }

    /// Log level after applying debug mode
    ///
    /// The development environment implies debug mode.
    pub fn effective_log_level(&self) -> &str {
        if self.debug || self.environment == Environment::Development {
            "debug"
        } else {
            &self.log_level
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_config() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080
            log_level = "warn"
            environment = "development"
            base_path = "/viewer"

            [upstream]
            uniprot_api_url = "http://localhost:9001"
            request_timeout = 5
            verify_models = false

            [proxy]
            allowed_hosts = ["alphafold.ebi.ac.uk"]

            [cache]
            capacity = 16
            ttl_secs = 60
        "#
        )
        .unwrap();
        file.flush().unwrap();
        file
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_load_config() {
        let file = create_test_config();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.base_path, "/viewer");
        assert_eq!(config.uniprot_api_url, "http://localhost:9001");
        assert_eq!(config.alphafold_api_url, upstream::ALPHAFOLD_API);
        assert!(!config.verify_models);
        assert_eq!(config.proxy_allowed_hosts, vec!["alphafold.ebi.ac.uk"]);
        assert_eq!(config.cache_capacity, 16);
        config.validate().unwrap();
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.cache_capacity, 256);
        assert_eq!(config.request_timeout, 10);
        assert_eq!(config.download_timeout, 30);
        assert!(config.verify_models);
        assert!(config.proxy_allowed_hosts.contains(&"files.rcsb.org".to_string()));
        config.validate().unwrap();
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env_overrides(lookup(&[
                ("PORT", "9090"),
                ("FLASK_ENV", "development"),
                ("FLASK_DEBUG", "1"),
            ]))
            .unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.environment, Environment::Development);
        assert!(config.debug);
        assert_eq!(config.effective_log_level(), "debug");
    }

    #[test]
    fn test_app_env_takes_precedence_over_flask_env() {
        let mut config = Config::default();
        config
            .apply_env_overrides(lookup(&[("APP_ENV", "production"), ("FLASK_ENV", "development")]))
            .unwrap();
        assert_eq!(config.environment, Environment::Production);
    }

    #[test]
    fn test_development_environment_logs_at_debug() {
        let mut config = Config::default();
        config.log_level = "warn".to_string();
        assert_eq!(config.effective_log_level(), "warn");

        config
            .apply_env_overrides(lookup(&[("APP_ENV", "development")]))
            .unwrap();
        assert!(!config.debug);
        assert_eq!(config.effective_log_level(), "debug");
    }

    #[test]
    fn test_invalid_port_rejected() {
        let mut config = Config::default();
        assert!(config.apply_env_overrides(lookup(&[("PORT", "http")])).is_err());
    }

    #[test]
    fn test_validate_base_path() {
        let mut config = Config::default();
        config.base_path = "viewer".to_string();
        assert!(config.validate().is_err());

        config.base_path = "/viewer/".to_string();
        assert!(config.validate().is_err());

        config.base_path = "/viewer".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = Config::default();
        config.rcsb_data_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }
}
