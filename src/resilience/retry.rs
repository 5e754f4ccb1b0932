//! 指数退避重试
//!
//! 固定最多 3 次尝试，初始延迟 1s、逐次翻倍。调用方可从结果里
//! 拿到实际重试次数，批量进度事件会把它回传给前端。

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

/// 重试成功的结果与实际重试次数
#[derive(Debug)]
pub struct Retried<T> {
    pub value: T,
    /// 成功前经历的失败次数（首次即成功为 0）
    pub retries: u32,
}

/// 重试耗尽
#[derive(Debug, Error)]
#[error("重试 {retries} 次后仍失败: {source}")]
pub struct RetryError<E: std::error::Error> {
    pub retries: u32,
    #[source]
    pub source: E,
}

/// 重试策略
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// 执行 `op` 直到成功或尝试耗尽
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<Retried<T>, RetryError<E>>
    where
        E: std::error::Error,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut delay = self.initial_delay;
        let mut last_error: Option<E> = None;

        for attempt in 1..=max_attempts {
            match op().await {
                Ok(value) => {
                    return Ok(Retried {
                        value,
                        retries: attempt - 1,
                    })
                }
                Err(e) => {
                    warn!(%label, attempt, max_attempts, error = %e, "调用失败");
                    last_error = Some(e);
                }
            }
            if attempt < max_attempts {
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }

        // max_attempts >= 1，循环至少执行一次
        match last_error {
            Some(source) => Err(RetryError {
                retries: max_attempts,
                source,
            }),
            None => unreachable!(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use tokio::time::Instant;

    use super::*;

    #[derive(Debug, Error)]
    #[error("boom")]
    struct Boom;

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_success_has_zero_retries() {
        let policy = RetryPolicy::default();
        let out = policy
            .run("test", || async { Ok::<_, Boom>(7) })
            .await
            .unwrap();
        assert_eq!(out.value, 7);
        assert_eq!(out.retries, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_failures() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);
        let out = policy
            .run("test", || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(Boom)
                } else {
                    Ok(42)
                }
            })
            .await
            .unwrap();
        assert_eq!(out.value, 42);
        assert_eq!(out.retries, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_with_doubling_delays() {
        let policy = RetryPolicy::default();
        let start = Instant::now();

        let err = policy
            .run("test", || async { Err::<(), _>(Boom) })
            .await
            .unwrap_err();

        assert_eq!(err.retries, 3);
        // 1s + 2s 的退避间隔
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }
}
