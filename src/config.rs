use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64, // seconds
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64, // seconds, 0 = no deadline
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_query_timeout() -> u64 {
    10
}

impl DatabaseConfig {
    pub fn query_timeout(&self) -> Option<Duration> {
        (self.query_timeout_secs > 0).then(|| Duration::from_secs(self.query_timeout_secs))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// 由 `DB_*` 变量拼接 postgres URL，缺少主机、用户或库名时返回 `None`
    pub fn url_from_parts(lookup: &impl Fn(&str) -> Option<String>) -> Option<String> {
        let host = lookup("DB_HOST")?;
        let user = lookup("DB_USER")?;
        let name = lookup("DB_NAME")?;
        let port = lookup("DB_PORT").unwrap_or_else(|| "5432".to_string());
        let password = lookup("DB_PASSWORD").unwrap_or_default();
        let sslmode = lookup("DB_SSLMODE").unwrap_or_else(|| "disable".to_string());

        let credentials = if password.is_empty() {
            user
        } else {
            format!("{user}:{password}")
        };
        Some(format!(
            "postgres://{credentials}@{host}:{port}/{name}?sslmode={sslmode}"
        ))
    }
}

impl Config {
    /// 加载 `CONFIG_PATH`（默认 `config.toml`）并应用环境变量覆盖
    pub fn from_toml() -> AppResult<Self> {
        use std::io::ErrorKind;

        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());

        // 没有配置文件时完全依赖环境变量
        let contents = match std::fs::read_to_string(&config_path) {
            Ok(s) => Some(s),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                return Err(AppError::ConfigError(format!(
                    "cannot read config file {config_path}: {e}"
                )));
            }
        };

        Self::from_sources(contents.as_deref(), |name| env::var(name).ok())
    }

    /// 由可选的TOML文本与变量查找解析配置，变量优先于文件
    pub fn from_sources(
        contents: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> AppResult<Self> {
        fn parse_or<T: std::str::FromStr>(v: Option<String>, default: T) -> T {
            v.and_then(|s| s.parse::<T>().ok()).unwrap_or(default)
        }

        let mut config: Config = match contents {
            Some(text) => toml::from_str(text)
                .map_err(|e| AppError::ConfigError(format!("invalid config file: {e}")))?,
            None => {
                let url = lookup("DATABASE_URL")
                    .or_else(|| DatabaseConfig::url_from_parts(&lookup))
                    .ok_or_else(|| {
                        AppError::ConfigError(
                            "DATABASE_URL (or DB_HOST/DB_USER/DB_NAME) is not set and no config file was found"
                                .to_string(),
                        )
                    })?;

                Config {
                    server: ServerConfig {
                        host: "0.0.0.0".to_string(),
                        port: 8080,
                    },
                    database: DatabaseConfig {
                        url,
                        max_connections: default_max_connections(),
                        connect_timeout_secs: default_connect_timeout(),
                        query_timeout_secs: default_query_timeout(),
                    },
                    logging: LoggingConfig::default(),
                }
            }
        };

        if let Some(v) = lookup("SERVER_HOST") {
            config.server.host = v;
        }
        // APP_PORT 为旧名称，同时设置时以 SERVER_PORT 为准
        config.server.port = parse_or(lookup("APP_PORT"), config.server.port);
        config.server.port = parse_or(lookup("SERVER_PORT"), config.server.port);

        if let Some(v) = lookup("DATABASE_URL") {
            config.database.url = v;
        } else if contents.is_some()
            && let Some(url) = DatabaseConfig::url_from_parts(&lookup)
        {
            config.database.url = url;
        }
        config.database.max_connections =
            parse_or(lookup("DB_MAX_CONNECTIONS"), config.database.max_connections);
        config.database.connect_timeout_secs = parse_or(
            lookup("DB_CONNECT_TIMEOUT_SECS"),
            config.database.connect_timeout_secs,
        );
        config.database.query_timeout_secs = parse_or(
            lookup("DB_QUERY_TIMEOUT_SECS"),
            config.database.query_timeout_secs,
        );

        if let Some(v) = lookup("LOG_LEVEL") {
            config.logging.level = v;
        }

        Ok(config)
    }
}
