//! Fabula - 插图有声故事生成系统
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Book Context: 故事书聚合（段落列表与媒体槽位）
//! - Text: 清洗、分句、分块、旁白切片、标记过滤
//!
//! 应用层 (application/):
//! - Ports: 端口定义（BookStore, ChatModel, ImageModel, Narration,
//!   MediaStorage, GenerationHistory, PromptMetrics）
//! - Services: 生成流水线（故事、提示词精炼、插图、旁白、批量协调）
//!
//! 韧性层 (resilience/):
//! - 滑动窗口限流器、重试策略
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + 流式批量生成 + 静态媒体
//! - Persistence: Sled 书籍存储 + SQLite 历史/指标
//! - Adapters: 文档抽取、LLM / 图像 HTTP 客户端、叙述 WebSocket 客户端、媒体落盘

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod resilience;

pub use config::{load_config, AppConfig};
