//! 故事正文生成
//!
//! 一次 LLM 调用产出全部段落，空行分段，逐段过滤编号标记

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::error::ApplicationError;
use crate::application::ports::{ChatModelPort, ChatRequest};
use crate::domain::strip_story_markers;

/// 故事生成请求
#[derive(Debug, Clone)]
pub struct StoryRequest {
    pub prompt: String,
    pub genre: Option<String>,
    pub mood: Option<String>,
    pub target_audience: Option<String>,
    /// 期望段落数（输出不超过该值）
    pub paragraphs: usize,
}

/// 故事正文生成服务
pub struct StoryService {
    chat: Arc<dyn ChatModelPort>,
}

impl StoryService {
    pub fn new(chat: Arc<dyn ChatModelPort>) -> Self {
        Self { chat }
    }

    /// 生成故事段落
    pub async fn generate(&self, request: &StoryRequest) -> Result<Vec<String>, ApplicationError> {
        let wanted = request.paragraphs.max(1);
        let raw = self
            .chat
            .complete(ChatRequest {
                system: build_system_prompt(request, wanted),
                user: request.prompt.clone(),
                max_tokens: Some(2048),
                temperature: Some(0.9),
            })
            .await?;

        let text = raw.replace("\r\n", "\n");
        let mut paragraphs = Vec::new();
        for block in text.split("\n\n") {
            let block = block.trim();
            if block.is_empty() {
                continue;
            }
            match strip_story_markers(block) {
                Some(p) => paragraphs.push(p),
                None => warn!("丢弃无法清洗的段落: {:.40}", block),
            }
            if paragraphs.len() == wanted {
                break;
            }
        }

        if paragraphs.is_empty() {
            return Err(ApplicationError::ExternalServiceError(
                "story model returned no usable paragraphs".to_string(),
            ));
        }

        info!(count = paragraphs.len(), wanted, "故事段落生成完成");
        Ok(paragraphs)
    }
}

fn build_system_prompt(request: &StoryRequest, paragraphs: usize) -> String {
    let mut system = format!(
        "You are a fiction writer. Write a short story as exactly {paragraphs} \
         paragraphs separated by blank lines. Output only the story text, \
         with no numbering, labels or headings."
    );
    if let Some(genre) = &request.genre {
        system.push_str(&format!(" Genre: {genre}."));
    }
    if let Some(mood) = &request.mood {
        system.push_str(&format!(" Mood: {mood}."));
    }
    if let Some(audience) = &request.target_audience {
        system.push_str(&format!(" Target audience: {audience}."));
    }
    system
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::application::ports::LlmError;

    struct FakeChat {
        reply: Result<String, fn() -> LlmError>,
    }

    #[async_trait]
    impl ChatModelPort for FakeChat {
        async fn complete(&self, _request: ChatRequest) -> Result<String, LlmError> {
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    fn service(reply: &str) -> StoryService {
        StoryService::new(Arc::new(FakeChat {
            reply: Ok(reply.to_string()),
        }))
    }

    fn request(paragraphs: usize) -> StoryRequest {
        StoryRequest {
            prompt: "a fox in winter".to_string(),
            genre: Some("fable".to_string()),
            mood: None,
            target_audience: None,
            paragraphs,
        }
    }

    #[tokio::test]
    async fn test_splits_on_blank_lines_and_strips_markers() {
        let svc = service("Segment 1: The fox woke.\n\n[2] It crossed the river.");
        let out = svc.generate(&request(4)).await.unwrap();
        assert_eq!(out, vec!["The fox woke.", "It crossed the river."]);
    }

    #[tokio::test]
    async fn test_truncates_to_requested_count() {
        let svc = service("One para.\n\nTwo para.\n\nThree para.");
        let out = svc.generate(&request(2)).await.unwrap();
        assert_eq!(out.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_output_is_upstream_error() {
        let svc = service("   \n\n  ");
        let err = svc.generate(&request(3)).await.unwrap_err();
        assert!(matches!(err, ApplicationError::ExternalServiceError(_)));
    }

    #[tokio::test]
    async fn test_api_error_propagates() {
        let svc = StoryService::new(Arc::new(FakeChat {
            reply: Err(|| LlmError::Upstream("quota".to_string())),
        }));
        let err = svc.generate(&request(3)).await.unwrap_err();
        assert!(matches!(err, ApplicationError::ExternalServiceError(_)));
    }
}
