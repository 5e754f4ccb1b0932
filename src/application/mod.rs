//! 应用层
//!
//! 端口定义与用例服务，不依赖任何具体基础设施

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
