use crate::utils::errors::{ArchivingError, Result};
use opentok_client::{ArchiveOptions, OpenTokConfig, OutputMode};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub opentok: OpenTokSettings,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone)]
pub struct OpenTokSettings {
    pub api_key: String,
    pub api_secret: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

// 启动日志会打印配置，避免泄露密钥
impl std::fmt::Debug for OpenTokSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenTokSettings")
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .field("api_url", &self.api_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ArchiveConfig {
    pub name: String,
    pub has_audio: bool,
    pub has_video: bool,
    pub output_mode: OutputMode,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// "json" 或 "pretty"
    pub format: String,
}

fn default_api_url() -> String {
    opentok_client::DEFAULT_API_URL.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            name: "Rust Archiving Sample App".to_string(),
            has_audio: true,
            has_video: true,
            output_mode: OutputMode::Composed,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 4567,
            },
            opentok: OpenTokSettings {
                api_key: std::env::var("API_KEY").unwrap_or_default(),
                api_secret: std::env::var("API_SECRET").unwrap_or_default(),
                api_url: default_api_url(),
                request_timeout_secs: default_request_timeout(),
            },
            archive: ArchiveConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ArchiveConfig {
    pub fn to_options(&self) -> ArchiveOptions {
        ArchiveOptions {
            name: Some(self.name.clone()),
            has_audio: self.has_audio,
            has_video: self.has_video,
            output_mode: self.output_mode,
            resolution: None,
        }
    }
}

impl OpenTokSettings {
    pub fn to_client_config(&self) -> OpenTokConfig {
        OpenTokConfig::new(self.api_key.clone(), self.api_secret.clone())
            .with_api_url(self.api_url.clone())
            .with_timeout(self.request_timeout_secs)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        // 首先尝试从 TOML 配置文件加载
        let config_path = std::env::var("CONFIG_PATH")
            .unwrap_or_else(|_| "/etc/archiving-server/config.toml".to_string());

        let mut config = if std::path::Path::new(&config_path).exists() {
            let config_str = std::fs::read_to_string(&config_path).map_err(|e| {
                ArchivingError::Configuration(format!(
                    "Failed to read config file {}: {}",
                    config_path, e
                ))
            })?;
            Self::from_toml(&config_str)?
        } else {
            // 如果配置文件不存在，使用默认配置
            AppConfig::default()
        };

        // 环境变量覆盖配置文件设置
        if let Ok(key) = std::env::var("API_KEY") {
            config.opentok.api_key = key;
        }
        if let Ok(secret) = std::env::var("API_SECRET") {
            config.opentok.api_secret = secret;
        }
        if let Ok(url) = std::env::var("OPENTOK_API_URL") {
            config.opentok.api_url = url;
        }
        if let Ok(host) = std::env::var("SERVER_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("SERVER_PORT") {
            config.server.port = port
                .parse()
                .map_err(|e| ArchivingError::Configuration(format!("Invalid port: {}", e)))?;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            config.logging.format = format;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        toml::from_str::<AppConfig>(config_str).map_err(|e| {
            ArchivingError::Configuration(format!("Failed to parse config file: {}", e))
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.opentok.api_key.is_empty() || self.opentok.api_secret.is_empty() {
            return Err(ArchivingError::Configuration(
                "API_KEY and API_SECRET must be set".to_string(),
            ));
        }
        Ok(())
    }
}
