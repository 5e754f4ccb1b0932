//! 基础设施层
//!
//! 端口的具体实现：外部服务适配器、持久化、HTTP 入口

pub mod adapters;
pub mod http;
pub mod persistence;
