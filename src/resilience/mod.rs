//! 外部调用韧性
//!
//! 媒体供应商调用共用的限流与重试原语。

mod rate_limiter;
mod retry;

pub use rate_limiter::SlidingWindowLimiter;
pub use retry::{Retried, RetryError, RetryPolicy};
