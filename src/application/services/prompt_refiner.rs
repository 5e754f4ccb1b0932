//! 图像提示词精炼
//!
//! 一步或两步链式精炼，最后一步产出的提示词胜出；
//! 上游失败时回退到段落原文。每次调用必须落一行指标。

use std::sync::Arc;
use std::time::Instant;

use tracing::warn;

use crate::application::ports::{
    ChatModelPort, ChatRequest, LlmError, PromptMetric, PromptMetricsPort,
};

const REFINE_SYSTEM: &str = "You write prompts for an image generation model. \
     Given a story excerpt, answer with one concise visual prompt describing \
     a single illustratable scene. Output the prompt only.";

const CONCRETIZE_SYSTEM: &str = "You rewrite image prompts to be more concrete \
     and visual: name the subject, setting, lighting and composition. \
     Output the rewritten prompt only.";

/// 提示词精炼服务
pub struct PromptRefiner {
    chat: Arc<dyn ChatModelPort>,
    metrics: Arc<dyn PromptMetricsPort>,
    /// 精炼步数（1 或 2）
    refinement_steps: u32,
}

impl PromptRefiner {
    pub fn new(
        chat: Arc<dyn ChatModelPort>,
        metrics: Arc<dyn PromptMetricsPort>,
        refinement_steps: u32,
    ) -> Self {
        Self {
            chat,
            metrics,
            refinement_steps: refinement_steps.clamp(1, 2),
        }
    }

    /// 为段落生成图像提示词，永不失败
    pub async fn refine(&self, story_context: &str, paragraph: &str) -> String {
        let started = Instant::now();

        let (prompt, prompt_type, steps, error) =
            match self.run_chain(story_context, paragraph).await {
                Ok((prompt, steps)) => (prompt, "refine", steps, None),
                Err(e) => {
                    warn!(error = %e, "提示词精炼失败，回退到段落原文");
                    (paragraph.trim().to_string(), "fallback", 0, Some(e.to_string()))
                }
            };

        let metric = PromptMetric {
            prompt_type: prompt_type.to_string(),
            generation_time_ms: started.elapsed().as_millis() as u64,
            num_refinement_steps: steps,
            success: error.is_none(),
            prompt_length: prompt.chars().count() as u32,
            error,
            created_at: chrono::Utc::now(),
        };
        if let Err(e) = self.metrics.record(metric).await {
            warn!(error = %e, "写入提示词指标失败");
        }

        prompt
    }

    async fn run_chain(
        &self,
        story_context: &str,
        paragraph: &str,
    ) -> Result<(String, u32), LlmError> {
        let first = self
            .chat
            .complete(ChatRequest {
                system: REFINE_SYSTEM.to_string(),
                user: format!("Story context:\n{story_context}\n\nParagraph:\n{paragraph}"),
                max_tokens: Some(256),
                temperature: Some(0.7),
            })
            .await?;
        let first = non_empty(first)?;

        if self.refinement_steps < 2 {
            return Ok((first, 1));
        }

        // 第二步失败不致命，保留第一步结果
        match self
            .chat
            .complete(ChatRequest {
                system: CONCRETIZE_SYSTEM.to_string(),
                user: first.clone(),
                max_tokens: Some(256),
                temperature: Some(0.5),
            })
            .await
            .map(non_empty)
        {
            Ok(Ok(second)) => Ok((second, 2)),
            Ok(Err(e)) | Err(e) => {
                warn!(error = %e, "二次精炼失败，沿用第一步提示词");
                Ok((first, 1))
            }
        }
    }
}

fn non_empty(text: String) -> Result<String, LlmError> {
    let trimmed = text.trim().to_string();
    if trimmed.is_empty() {
        return Err(LlmError::InvalidResponse("empty prompt".to_string()));
    }
    Ok(trimmed)
}
