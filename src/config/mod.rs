//! Configuration Module
//!
//! 提供应用配置管理功能，支持多层级配置来源：
//! - 供应商密钥环境变量（LLM_API_KEY 等，最高优先级）
//! - 环境变量（FABULA_ 前缀）
//! - 配置文件（TOML 格式）
//! - 默认值（最低优先级）

mod loader;
mod types;

pub use loader::{load_config, print_config, ConfigError};
pub use types::{
    AppConfig, DatabaseConfig, ImageConfig, LimitsConfig, LlmConfig, LogConfig, NarrationConfig,
    ServerConfig, StorageConfig,
};
