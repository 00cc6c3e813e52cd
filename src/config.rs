//! Application configuration module / 应用配置模块
//!
//! Loaded once at startup from config.json, then environment overrides.
//! Creates default config file on first run / 首次运行时创建默认配置文件
//!
//! The resulting `AppConfig` is read-only and handed to constructors
//! explicitly; there is no global instance.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Plain identifier accepted for index and column names / 合法的索引名与列名
static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex"));

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write config file {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration / 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// Full-text index connection / 全文索引连接配置
    #[serde(default)]
    pub index: IndexConfig,
    /// Tokenizer configuration / 分词器配置
    #[serde(default)]
    pub tokenizer: TokenizerConfig,
}

/// Server configuration / 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address / 服务器监听地址
    pub host: String,
    /// Server port / 服务器端口
    pub port: u16,
}

/// How the executor talks to the index / 索引访问协议
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// MySQL wire protocol (SphinxQL) / MySQL 协议
    Mysql,
    /// HTTP JSON API / HTTP JSON 接口
    Http,
}

/// Full-text index configuration / 全文索引配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub transport: Transport,
    /// Index endpoint host / 索引服务地址
    pub host: String,
    /// Index endpoint port / 索引服务端口
    pub port: u16,
    /// Optional credentials / 可选认证信息
    pub user: Option<String>,
    pub password: Option<String>,
    /// Index name / 索引名
    pub index: String,
    /// Column holding the structured content payload / 存放 JSON 内容的列
    pub content_column: String,
    /// Max rows per query (default 10) / 每次查询最大行数
    pub limit: usize,
    /// Upper bound for per-request limits / 单次请求 limit 上限
    pub max_limit: usize,
    /// Request-level timeout in seconds / 请求超时（秒）
    pub timeout_secs: u64,
}

/// Segmentation mode / 分词模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizeMode {
    /// jieba accurate mode / 精确模式
    #[default]
    Accurate,
    /// jieba search-engine mode / 搜索引擎模式
    Search,
}

/// Tokenizer configuration / 分词器配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    pub mode: TokenizeMode,
    /// Replaces the built-in dictionary (e.g. dict.txt.big) / 替换内置词典
    pub dict_path: Option<String>,
    /// Extra entries loaded on top / 追加的用户词典
    pub user_dict_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            transport: Transport::Mysql,
            host: "manticore".to_string(),
            port: 9306,
            user: None,
            password: None,
            index: "documents_idx".to_string(),
            content_column: "content".to_string(),
            limit: 10,
            max_limit: 100,
            timeout_secs: 5,
        }
    }
}

impl IndexConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Clamp a caller-supplied limit / 限制调用方传入的 limit
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(n) => n.clamp(1, self.max_limit.max(1)),
            None => self.limit,
        }
    }
}

impl AppConfig {
    /// Get the server bind address / 获取服务器绑定地址
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Apply environment overrides / 应用环境变量覆盖
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("MANTICORE_HOST") {
            self.index.host = v;
        }
        if let Some(v) = lookup("MANTICORE_PORT") {
            self.index.port = parse_env("MANTICORE_PORT", v)?;
        }
        if let Some(v) = lookup("MANTICORE_USER") {
            self.index.user = Some(v).filter(|s| !s.is_empty());
        }
        if let Some(v) = lookup("MANTICORE_PASSWORD") {
            self.index.password = Some(v).filter(|s| !s.is_empty());
        }
        if let Some(v) = lookup("MANTICORE_INDEX") {
            self.index.index = v;
        }
        if let Some(v) = lookup("SEARCH_LIMIT") {
            self.index.limit = parse_env("SEARCH_LIMIT", v)?;
        }
        if let Some(v) = lookup("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("SERVER_PORT") {
            self.server.port = parse_env("SERVER_PORT", v)?;
        }
        if let Some(v) = lookup("JIEBA_DICT") {
            self.tokenizer.dict_path = Some(v).filter(|s| !s.is_empty());
        }
        Ok(())
    }

    /// Reject values that would be unsafe or useless at runtime / 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !IDENTIFIER.is_match(&self.index.index) {
            return Err(ConfigError::Invalid(format!(
                "index name {:?} is not a plain identifier",
                self.index.index
            )));
        }
        if !IDENTIFIER.is_match(&self.index.content_column) {
            return Err(ConfigError::Invalid(format!(
                "content column {:?} is not a plain identifier",
                self.index.content_column
            )));
        }
        if self.index.limit == 0 {
            return Err(ConfigError::Invalid("index.limit must be at least 1".into()));
        }
        if self.index.max_limit < self.index.limit {
            return Err(ConfigError::Invalid(
                "index.max_limit must not be below index.limit".into(),
            ));
        }
        if self.index.timeout_secs == 0 {
            return Err(ConfigError::Invalid("index.timeout_secs must be at least 1".into()));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { key, value })
}

/// Get the config file path / 获取配置文件路径
pub fn get_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration from file, or create default if not exists / 加载配置文件，不存在则创建默认配置
pub fn load_config(config_path: &Path) -> Result<AppConfig, ConfigError> {
    if config_path.exists() {
        let content = std::fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;

        let config: AppConfig = serde_json::from_str(&content)?;

        tracing::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    } else {
        let config = AppConfig::default();
        save_config(config_path, &config)?;
        tracing::info!("Created default configuration at {:?}", config_path);
        Ok(config)
    }
}

/// Save configuration to file / 保存配置到文件
pub fn save_config(config_path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    let content = serde_json::to_string_pretty(config)?;

    std::fs::write(config_path, content).map_err(|source| ConfigError::Write {
        path: config_path.to_path_buf(),
        source,
    })
}

/// Full startup sequence: file, env, validation / 启动时加载完整配置
pub fn load_from_env(config_path: &Path) -> Result<AppConfig, ConfigError> {
    let mut config = load_config(config_path)?;
    config.apply_env(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}
