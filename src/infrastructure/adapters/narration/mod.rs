//! 叙述语音适配器

pub mod ws_client;

pub use ws_client::{WsNarrationClient, WsNarrationClientConfig};
