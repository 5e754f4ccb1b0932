//! 插图生成
//!
//! 风格前缀 → 限流 → 供应商调用 → data URL 包装，
//! 失败交给重试策略；终局结果写一行生成历史。

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::application::ports::{
    GenerationAttempt, GenerationHistoryPort, ImageModelError, ImageModelPort, MediaType,
};
use crate::domain::{BookId, ImageStyle};
use crate::resilience::{Retried, RetryError, RetryPolicy, SlidingWindowLimiter};

use super::MediaError;

/// 链式生成的步间停顿
const CHAIN_STEP_PAUSE: Duration = Duration::from_secs(2);

/// 一次成功的插图生成
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    /// data:image/png;base64 形式的 URL
    pub url: String,
    /// 实际发给供应商的带风格提示词
    pub prompt: String,
    /// 成功前经历的失败次数
    pub retries: u32,
}

/// 插图生成服务
pub struct ImageService {
    model: Arc<dyn ImageModelPort>,
    history: Arc<dyn GenerationHistoryPort>,
    limiter: Arc<SlidingWindowLimiter>,
    retry: RetryPolicy,
}

impl ImageService {
    pub fn new(
        model: Arc<dyn ImageModelPort>,
        history: Arc<dyn GenerationHistoryPort>,
        limiter: Arc<SlidingWindowLimiter>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            model,
            history,
            limiter,
            retry,
        }
    }

    /// 为段落生成一张插图
    pub async fn generate(
        &self,
        book_id: BookId,
        paragraph_index: u32,
        prompt: &str,
        style: ImageStyle,
    ) -> Result<GeneratedImage, MediaError> {
        let styled = style.apply(prompt);

        let outcome = self
            .retry
            .run("image", || {
                let styled = &styled;
                async move {
                    self.limiter.acquire().await;
                    let encoded = self.model.generate(styled).await?;
                    self.limiter.commit().await;
                    Ok::<_, ImageModelError>(encoded)
                }
            })
            .await;

        match outcome {
            Ok(Retried { value, retries }) => {
                let url = format!("data:image/png;base64,{value}");
                self.record(GenerationAttempt::succeeded(
                    book_id,
                    paragraph_index,
                    MediaType::Image,
                    Some(styled.clone()),
                    Some(url.clone()),
                    retries,
                ))
                .await;
                info!(book_id = %book_id, paragraph_index, retries, "插图生成成功");
                Ok(GeneratedImage {
                    url,
                    prompt: styled,
                    retries,
                })
            }
            Err(RetryError { retries, source }) => {
                self.record(GenerationAttempt::failed(
                    book_id,
                    paragraph_index,
                    MediaType::Image,
                    Some(styled),
                    retries,
                    source.to_string(),
                ))
                .await;
                Err(MediaError::Upstream {
                    retries,
                    message: source.to_string(),
                })
            }
        }
    }

    /// 依序执行提示词链，步间停顿 2s，返回最后一次成功的结果
    pub async fn generate_chain(
        &self,
        book_id: BookId,
        paragraph_index: u32,
        prompts: &[String],
        style: ImageStyle,
    ) -> Result<GeneratedImage, MediaError> {
        let mut last: Option<GeneratedImage> = None;

        for (step, prompt) in prompts.iter().enumerate() {
            if step > 0 {
                tokio::time::sleep(CHAIN_STEP_PAUSE).await;
            }
            match self.generate(book_id, paragraph_index, prompt, style).await {
                Ok(image) => last = Some(image),
                Err(e) => warn!(book_id = %book_id, step, error = %e, "链式生成步骤失败"),
            }
        }

        last.ok_or_else(|| MediaError::Upstream {
            retries: self.retry.max_attempts,
            message: "every prompt in the chain failed".to_string(),
        })
    }

    /// 历史是旁路账本，写入失败不反转生成结果
    async fn record(&self, attempt: GenerationAttempt) {
        if let Err(e) = self.history.append(attempt).await {
            warn!(error = %e, "写入生成历史失败");
        }
    }
}
