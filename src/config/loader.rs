//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 供应商密钥环境变量（LLM_API_KEY 等）
//! 2. 环境变量（前缀 `FABULA_`）
//! 3. 配置文件（config.toml）
//! 4. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 供应商密钥环境变量（`LLM_API_KEY`、`IMAGE_API_KEY`、
///    `NARRATION_API_KEY`、`NARRATION_SECRET_KEY`、`NARRATION_CONFIG_ID`）
/// 2. 环境变量（前缀 `FABULA_`，层级分隔符 `__`）
/// 3. 配置文件（config.toml 或 config.local.toml）
/// 4. 默认值
///
/// # 环境变量示例
/// - `FABULA_SERVER__HOST=127.0.0.1`
/// - `FABULA_SERVER__PORT=8080`
/// - `FABULA_LLM__BASE_URL=http://localhost:11434/v1`
/// - `FABULA_DATABASE__PATH=/data/fabula.db`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5088)?
        .set_default("llm.base_url", "https://api.openai.com/v1")?
        .set_default("llm.model", "gpt-4o-mini")?
        .set_default("llm.timeout_secs", 120)?
        .set_default("image.base_url", "https://api.openai.com/v1")?
        .set_default("image.model", "dall-e-3")?
        .set_default("image.size", "1024x1024")?
        .set_default("image.timeout_secs", 180)?
        .set_default("narration.endpoint", "wss://narration.example.com/session")?
        .set_default("narration.version", "1.0")?
        .set_default("limits.rate_capacity", 6)?
        .set_default("limits.rate_window_secs", 60)?
        .set_default("limits.refinement_steps", 2)?
        .set_default("database.path", "data/fabula.db")?
        .set_default("database.max_connections", 5)?
        .set_default("storage.media_dir", "data/media")?
        .set_default("storage.books_dir", "data/books")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        // 搜索默认配置文件
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量
    // 前缀: FABULA_，层级分隔符: __ (双下划线)
    // 例如: FABULA_LLM__BASE_URL=http://localhost:11434/v1
    builder = builder.add_source(
        Environment::with_prefix("FABULA")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 4. 构建配置
    let config = builder.build()?;

    // 5. 反序列化为 AppConfig
    let mut app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::ParseError(format!("Failed to deserialize config: {}", e)))?;

    // 6. 供应商密钥只从专用环境变量读取
    app_config.llm.api_key = env_or_empty("LLM_API_KEY");
    app_config.image.api_key = env_or_empty("IMAGE_API_KEY");
    app_config.narration.api_key = env_or_empty("NARRATION_API_KEY");
    app_config.narration.secret_key = env_or_empty("NARRATION_SECRET_KEY");
    app_config.narration.config_id = env_or_empty("NARRATION_CONFIG_ID");

    // 7. 验证配置
    validate_config(&app_config)?;

    Ok(app_config)
}

fn env_or_empty(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.llm.base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "LLM base URL cannot be empty".to_string(),
        ));
    }

    if config.narration.endpoint.is_empty() {
        return Err(ConfigError::ValidationError(
            "Narration endpoint cannot be empty".to_string(),
        ));
    }

    if config.limits.rate_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "Rate limiter capacity cannot be 0".to_string(),
        ));
    }

    if config.database.path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Database path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("LLM: {} ({})", config.llm.base_url, config.llm.model);
    tracing::info!("Image: {} ({})", config.image.base_url, config.image.model);
    tracing::info!("Narration endpoint: {}", config.narration.endpoint);
    tracing::info!(
        "Rate limit: {} calls / {}s per provider",
        config.limits.rate_capacity,
        config.limits.rate_window_secs
    );
    tracing::info!("Database: {}", config.database.path);
    tracing::info!("Media Directory: {:?}", config.storage.media_dir);
    tracing::info!("Books Directory: {:?}", config.storage.books_dir);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5088);
        assert_eq!(config.limits.refinement_steps, 2);
    }

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_capacity() {
        let mut config = AppConfig::default();
        config.limits.rate_capacity = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_db_path() {
        let mut config = AppConfig::default();
        config.database.path = String::new();
        assert!(validate_config(&config).is_err());
    }
}
