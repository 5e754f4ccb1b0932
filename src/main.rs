//! Fabula - 插图有声故事生成系统
//!
//! 提示词或上传文档 → 段落 → 每段一图一音，
//! 批量生成以逐行 JSON 流式推送进度

use std::sync::Arc;
use std::time::Duration;

use fabula::application::services::{
    ActiveBatches, AudioService, BatchCoordinator, BookIngestService, ImageService, PromptRefiner,
    StoryService,
};
use fabula::config::{load_config, print_config};
use fabula::domain::ChunkConfig;
use fabula::infrastructure::adapters::extract::TextExtractor;
use fabula::infrastructure::adapters::image::{HttpImageClient, HttpImageClientConfig};
use fabula::infrastructure::adapters::llm::{HttpChatClient, HttpChatClientConfig};
use fabula::infrastructure::adapters::narration::{WsNarrationClient, WsNarrationClientConfig};
use fabula::infrastructure::adapters::storage::FileMediaStorage;
use fabula::infrastructure::http::{AppState, HttpServer, ServerConfig};
use fabula::infrastructure::persistence::sled_store::SledBookStore;
use fabula::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteGenerationHistory, SqlitePromptMetrics,
};
use fabula::resilience::{RetryPolicy, SlidingWindowLimiter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},fabula={},tower_http=debug",
        config.log.level, config.log.level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("Fabula - 插图有声故事生成系统");
    print_config(&config);

    // 确保数据目录存在
    tokio::fs::create_dir_all(&config.storage.media_dir).await?;
    tokio::fs::create_dir_all(&config.storage.books_dir).await?;
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig {
        database_url: config.database.database_url(),
        max_connections: config.database.max_connections,
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    // 持久化适配器
    let store = Arc::new(SledBookStore::open(&config.storage.books_dir)?);
    let history = Arc::new(SqliteGenerationHistory::new(pool.clone()));
    let metrics = Arc::new(SqlitePromptMetrics::new(pool));

    // 供应商客户端
    let chat = Arc::new(HttpChatClient::new(
        HttpChatClientConfig::new(config.llm.api_key.clone())
            .with_base_url(config.llm.base_url.clone())
            .with_model(config.llm.model.clone())
            .with_timeout(config.llm.timeout_secs),
    )?);
    let image_model = Arc::new(HttpImageClient::new(HttpImageClientConfig {
        base_url: config.image.base_url.clone(),
        api_key: config.image.api_key.clone(),
        model: config.image.model.clone(),
        size: config.image.size.clone(),
        timeout_secs: config.image.timeout_secs,
    })?);
    let mut narration_config = WsNarrationClientConfig::new(
        config.narration.endpoint.clone(),
        config.narration.api_key.clone(),
        config.narration.config_id.clone(),
    );
    narration_config.version = config.narration.version.clone();
    let narration = Arc::new(WsNarrationClient::new(narration_config));
    let media_storage = Arc::new(FileMediaStorage::new(&config.storage.media_dir)?);

    // 每个供应商独立的限流窗口
    let window = Duration::from_secs(config.limits.rate_window_secs);
    let image_limiter = Arc::new(SlidingWindowLimiter::new(config.limits.rate_capacity, window));
    let audio_limiter = Arc::new(SlidingWindowLimiter::new(config.limits.rate_capacity, window));

    // 用例服务
    let story = Arc::new(StoryService::new(chat.clone()));
    let refiner = Arc::new(PromptRefiner::new(
        chat,
        metrics,
        config.limits.refinement_steps,
    ));
    let images = Arc::new(ImageService::new(
        image_model,
        history.clone(),
        image_limiter,
        RetryPolicy::default(),
    ));
    let audio = Arc::new(AudioService::new(
        narration,
        media_storage,
        history.clone(),
        audio_limiter,
        RetryPolicy::default(),
    ));
    let active = Arc::new(ActiveBatches::new());
    let coordinator = Arc::new(BatchCoordinator::new(
        store.clone(),
        refiner.clone(),
        images.clone(),
        audio.clone(),
        active.clone(),
    ));

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let state = AppState {
        store,
        history,
        extractor: Arc::new(TextExtractor::new()),
        ingest: Arc::new(BookIngestService::new(ChunkConfig::default())),
        story,
        refiner,
        images,
        audio,
        coordinator,
        active,
        audio_dir: config.storage.media_dir.join("audio"),
    };

    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
