//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// LLM 供应商配置
    #[serde(default)]
    pub llm: LlmConfig,

    /// 图像供应商配置
    #[serde(default)]
    pub image: ImageConfig,

    /// 叙述语音供应商配置
    #[serde(default)]
    pub narration: NarrationConfig,

    /// 限流与重试配置
    #[serde(default)]
    pub limits: LimitsConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5088
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// LLM 供应商配置
///
/// api_key 来自 `LLM_API_KEY` 环境变量，不从配置文件读取
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// 服务基础 URL（含 /v1 前缀）
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// 模型名
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    #[serde(skip)]
    pub api_key: String,
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            timeout_secs: default_llm_timeout(),
            api_key: String::new(),
        }
    }
}

/// 图像供应商配置
///
/// api_key 来自 `IMAGE_API_KEY` 环境变量
#[derive(Debug, Clone, Deserialize)]
pub struct ImageConfig {
    /// 服务基础 URL（含 /v1 前缀）
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// 模型名
    #[serde(default = "default_image_model")]
    pub model: String,

    /// 输出分辨率
    #[serde(default = "default_image_size")]
    pub size: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_image_timeout")]
    pub timeout_secs: u64,

    #[serde(skip)]
    pub api_key: String,
}

fn default_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_image_size() -> String {
    "1024x1024".to_string()
}

fn default_image_timeout() -> u64 {
    180
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_image_model(),
            size: default_image_size(),
            timeout_secs: default_image_timeout(),
            api_key: String::new(),
        }
    }
}

/// 叙述语音供应商配置
///
/// api_key / secret_key / config_id 来自 `NARRATION_API_KEY`、
/// `NARRATION_SECRET_KEY`、`NARRATION_CONFIG_ID` 环境变量
#[derive(Debug, Clone, Deserialize)]
pub struct NarrationConfig {
    /// WebSocket 端点
    #[serde(default = "default_narration_endpoint")]
    pub endpoint: String,

    /// 协议版本号
    #[serde(default = "default_narration_version")]
    pub version: String,

    #[serde(skip)]
    pub api_key: String,

    #[serde(skip)]
    pub secret_key: String,

    #[serde(skip)]
    pub config_id: String,
}

fn default_narration_endpoint() -> String {
    "wss://narration.example.com/session".to_string()
}

fn default_narration_version() -> String {
    "1.0".to_string()
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_narration_endpoint(),
            version: default_narration_version(),
            api_key: String::new(),
            secret_key: String::new(),
            config_id: String::new(),
        }
    }
}

/// 限流与重试配置
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// 滑动窗口容量（每供应商）
    #[serde(default = "default_rate_capacity")]
    pub rate_capacity: usize,

    /// 滑动窗口长度（秒）
    #[serde(default = "default_rate_window")]
    pub rate_window_secs: u64,

    /// 提示词精炼步数 (1..=2)
    #[serde(default = "default_refinement_steps")]
    pub refinement_steps: u32,
}

fn default_rate_capacity() -> usize {
    6
}

fn default_rate_window() -> u64 {
    60
}

fn default_refinement_steps() -> u32 {
    2
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            rate_capacity: default_rate_capacity(),
            rate_window_secs: default_rate_window(),
            refinement_steps: default_refinement_steps(),
        }
    }
}

/// 数据库配置（生成历史 / 提示词指标）
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/fabula.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// 获取数据库 URL
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 媒体文件根目录（WAV 写入 {media_dir}/audio）
    #[serde(default = "default_media_dir")]
    pub media_dir: PathBuf,

    /// 书籍 sled 数据库目录
    #[serde(default = "default_books_dir")]
    pub books_dir: PathBuf,
}

fn default_media_dir() -> PathBuf {
    PathBuf::from("data/media")
}

fn default_books_dir() -> PathBuf {
    PathBuf::from("data/books")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            media_dir: default_media_dir(),
            books_dir: default_books_dir(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
