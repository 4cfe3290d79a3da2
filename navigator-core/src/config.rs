use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{NavigatorError, NavigatorResult};
use crate::models::{Language, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NavigatorConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// `wss://` endpoint of the chat gateway.
    #[serde(default)]
    pub websocket_url: String,

    /// Base URL of the admin REST API, e.g. `https://abc.execute-api.us-east-1.amazonaws.com/prod/`.
    #[serde(default)]
    pub admin_base_url: String,

    #[serde(default)]
    pub feedback_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default)]
    pub user_pool_id: String,

    #[serde(default)]
    pub user_pool_client_id: String,

    /// Overrides the regional identity-provider endpoint.
    #[serde(default)]
    pub identity_endpoint: Option<String>,

    /// Where tokens, guest flag and role are kept between runs.
    #[serde(default)]
    pub session_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub default_role: UserRole,

    #[serde(default)]
    pub language: Language,

    /// Longest wait for the next frame before the exchange fails.
    #[serde(default = "default_response_timeout")]
    pub response_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json_format: bool,
}

fn default_request_timeout() -> u64 {
    30
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_response_timeout() -> u64 {
    120
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            websocket_url: String::new(),
            admin_base_url: String::new(),
            feedback_url: String::new(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            user_pool_id: String::new(),
            user_pool_client_id: String::new(),
            identity_endpoint: None,
            session_file: None,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_role: UserRole::default(),
            language: Language::default(),
            response_timeout_secs: default_response_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl NavigatorConfig {
    pub fn load() -> NavigatorResult<Self> {
        Self::load_from_paths(get_config_paths())
    }

    pub fn load_from_paths(paths: Vec<PathBuf>) -> NavigatorResult<Self> {
        load_dotenv_files();

        let mut builder = ConfigBuilder::builder();

        for path in paths {
            if path.exists() {
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("NAVIGATOR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut navigator_config: NavigatorConfig = builder.build()?.try_deserialize()?;

        if let Ok(url) = std::env::var("NAVIGATOR_WEBSOCKET_URL") {
            navigator_config.api.websocket_url = url;
        }

        if let Ok(url) = std::env::var("NAVIGATOR_ADMIN_API_URL") {
            navigator_config.api.admin_base_url = url;
        }

        if let Ok(url) = std::env::var("NAVIGATOR_FEEDBACK_URL") {
            navigator_config.api.feedback_url = url;
        }

        if let Ok(level) = std::env::var("NAVIGATOR_LOG_LEVEL") {
            navigator_config.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            navigator_config.logging.level = level;
        }

        navigator_config.validate()?;

        Ok(navigator_config)
    }

    pub fn validate(&self) -> NavigatorResult<()> {
        let ws = &self.api.websocket_url;
        if !ws.is_empty() && !ws.starts_with("ws://") && !ws.starts_with("wss://") {
            return Err(NavigatorError::InvalidConfigValue {
                key: "api.websocket_url".to_string(),
                message: "Must start with ws:// or wss://".to_string(),
            });
        }

        for (key, url) in [
            ("api.admin_base_url", &self.api.admin_base_url),
            ("api.feedback_url", &self.api.feedback_url),
        ] {
            if !url.is_empty() && !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(NavigatorError::InvalidConfigValue {
                    key: key.to_string(),
                    message: "Must start with http:// or https://".to_string(),
                });
            }
        }

        if self.api.request_timeout_secs == 0 {
            return Err(NavigatorError::InvalidConfigValue {
                key: "api.request_timeout_secs".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.chat.response_timeout_secs == 0 {
            return Err(NavigatorError::InvalidConfigValue {
                key: "chat.response_timeout_secs".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        let level_lower = self.logging.level.to_lowercase();
        if !valid_levels.contains(&level_lower.as_str()) && !level_lower.contains('=') {
            return Err(NavigatorError::InvalidConfigValue {
                key: "logging.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Must be one of: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        Ok(())
    }

    pub fn websocket_url(&self) -> NavigatorResult<&str> {
        non_empty(&self.api.websocket_url, "api.websocket_url")
    }

    /// Admin API base, always ending in `/` so resource paths can be appended.
    pub fn admin_base_url(&self) -> NavigatorResult<String> {
        let base = non_empty(&self.api.admin_base_url, "api.admin_base_url")?;
        if base.ends_with('/') {
            Ok(base.to_string())
        } else {
            Ok(format!("{}/", base))
        }
    }

    pub fn feedback_url(&self) -> NavigatorResult<&str> {
        non_empty(&self.api.feedback_url, "api.feedback_url")
    }

    pub fn identity_endpoint(&self) -> String {
        self.auth
            .identity_endpoint
            .clone()
            .unwrap_or_else(|| format!("https://cognito-idp.{}.amazonaws.com/", self.auth.region))
    }

    pub fn session_file(&self) -> Option<PathBuf> {
        self.auth
            .session_file
            .clone()
            .or_else(|| get_config_dir().map(|d| d.join("session.json")))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.chat.response_timeout_secs)
    }

    pub fn log_level(&self) -> &str {
        &self.logging.level
    }
}

fn non_empty<'a>(value: &'a str, key: &str) -> NavigatorResult<&'a str> {
    if value.trim().is_empty() {
        Err(NavigatorError::MissingEndpoint(key.to_string()))
    } else {
        Ok(value)
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("config").join("default.toml"));
        paths.push(cwd.join("config").join("local.toml"));
        paths.push(cwd.join("navigator.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("navigator").join("config.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".navigator").join("config.toml"));
    }

    paths
}

fn load_dotenv_files() {
    let env_paths = get_dotenv_paths();

    for path in env_paths {
        if path.exists() {
            let _ = dotenvy::from_path(&path);
        }
    }
}

fn get_dotenv_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".env"));
        paths.push(cwd.join(".env.local"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".navigator").join(".env"));
    }

    paths
}

pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("navigator"))
}

pub fn ensure_config_dir() -> Result<PathBuf, std::io::Error> {
    let config_dir = get_config_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine config directory",
        )
    })?;

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}
