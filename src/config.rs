use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub identity: IdentityConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// `sqlite:` or `postgres://` connection string
    pub database_url: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/medfolio.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    /// Public apex domain. Practices are served from `<slug>.<root_domain>`.
    pub root_domain: String,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on the form session cookie.
    /// Set to false for local development without HTTPS.
    pub secure_cookies: bool,

    pub session_inactivity_minutes: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 6789,
            root_domain: "localhost".to_string(),
            cors_allowed_origins: vec![
                "http://localhost:6789".to_string(),
                "http://127.0.0.1:6789".to_string(),
            ],
            secure_cookies: true,
            session_inactivity_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Base URL of the provider's backend API
    pub api_url: String,

    /// Backend API secret. Usually supplied through `CLERK_SECRET_KEY`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub secret_key: String,

    /// PEM encoded RSA public key used to verify session tokens.
    /// Usually supplied through `CLERK_JWT_KEY`.
    pub jwt_public_key: String,

    /// Accepted `azp` claims. Empty accepts any origin.
    pub authorized_parties: Vec<String>,

    pub session_cookie: String,

    /// Where anonymous visitors are sent to sign in
    pub sign_in_url: String,

    pub request_timeout_seconds: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.clerk.com/v1".to_string(),
            secret_key: String::new(),
            jwt_public_key: String::new(),
            authorized_parties: vec![],
            session_cookie: "__session".to_string(),
            sign_in_url: "https://accounts.clerk.dev/sign-in".to_string(),
            request_timeout_seconds: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            identity: IdentityConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // A missing .env is the normal case outside development.
        let _ = dotenvy::dotenv();

        let paths = Self::config_paths();

        let mut config = None;
        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Some(Self::load_from_path(path)?);
                break;
            }
        }

        let mut config = config.unwrap_or_else(|| {
            info!("No config file found, using defaults");
            Self::default()
        });
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Secrets are expected in the environment rather than the config file.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            self.general.database_url = url;
        }
        if let Some(secret) = lookup("CLERK_SECRET_KEY").filter(|v| !v.is_empty()) {
            self.identity.secret_key = secret;
        }
        if let Some(key) = lookup("CLERK_JWT_KEY").filter(|v| !v.is_empty()) {
            self.identity.jwt_public_key = key;
        }
        if let Some(domain) = lookup("ROOT_DOMAIN").filter(|v| !v.is_empty()) {
            self.server.root_domain = domain;
        }
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
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("medfolio").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".medfolio").join("config.toml"));
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

    pub fn validate(&self) -> Result<()> {
        if self.general.database_url.trim().is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.server.port == 0 {
            anyhow::bail!("Server port must be > 0");
        }

        if self.server.root_domain.trim().is_empty() {
            anyhow::bail!("Root domain cannot be empty");
        }

        if self.identity.api_url.trim().is_empty() {
            anyhow::bail!("Identity provider API URL cannot be empty");
        }

        if self.server.session_inactivity_minutes <= 0 {
            anyhow::bail!("Session inactivity timeout must be > 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 6789);
        assert_eq!(config.identity.session_cookie, "__session");
        assert_eq!(config.server.root_domain, "localhost");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[identity]"));
        assert!(!toml_str.contains("secret_key"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [server]
            root_domain = "medfolio.app"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.server.root_domain, "medfolio.app");

        assert_eq!(config.identity.api_url, "https://api.clerk.com/v1");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| match key {
            "CLERK_SECRET_KEY" => Some("sk_test_123".to_string()),
            "DATABASE_URL" => Some(String::new()),
            _ => None,
        });

        assert_eq!(config.identity.secret_key, "sk_test_123");
        assert_eq!(config.general.database_url, "sqlite:data/medfolio.db");
    }

    #[test]
    fn test_validate_rejects_empty_root_domain() {
        let mut config = Config::default();
        config.server.root_domain = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
