//! LLM 适配器

pub mod chat_client;

pub use chat_client::{HttpChatClient, HttpChatClientConfig};
