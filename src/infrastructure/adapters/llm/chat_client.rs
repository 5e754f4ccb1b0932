//! HTTP Chat Client - 调用 OpenAI 兼容的 chat completions 接口
//!
//! 实现 ChatModelPort trait
//!
//! 外部 API:
//! POST {base_url}/chat/completions
//! Request: {"model": "...", "messages": [...], ...}  (JSON)
//! Response: {"choices": [{"message": {"content": "..."}}]}

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{ChatModelPort, ChatRequest, LlmError};

#[derive(Debug, Serialize)]
struct ChatHttpMessage {
    role: &'static str,
    content: String,
}

/// chat completions 请求体 (JSON)
#[derive(Debug, Serialize)]
struct ChatHttpRequest {
    model: String,
    messages: Vec<ChatHttpMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatHttpResponse {
    choices: Vec<ChatHttpChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatHttpChoice {
    message: ChatHttpResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatHttpResponseMessage {
    content: String,
}

/// HTTP Chat 客户端配置
#[derive(Debug, Clone)]
pub struct HttpChatClientConfig {
    /// 服务基础 URL（含 /v1 前缀）
    pub base_url: String,
    /// Bearer 密钥
    pub api_key: String,
    /// 模型名
    pub model: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpChatClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 120,
        }
    }
}

impl HttpChatClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP Chat 客户端
pub struct HttpChatClient {
    client: Client,
    config: HttpChatClientConfig,
}

impl HttpChatClient {
    /// 创建新的 HTTP Chat 客户端
    pub fn new(config: HttpChatClientConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }
}

#[async_trait]
impl ChatModelPort for HttpChatClient {
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError> {
        let http_request = ChatHttpRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatHttpMessage {
                    role: "system",
                    content: request.system,
                },
                ChatHttpMessage {
                    role: "user",
                    content: request.user,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        tracing::debug!(
            url = %self.completions_url(),
            model = %http_request.model,
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&http_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else if e.is_connect() {
                    LlmError::NetworkError(format!("Cannot connect to LLM service: {}", e))
                } else {
                    LlmError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Upstream(format!("HTTP {}: {}", status, error_text)));
        }

        let body: ChatHttpResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("empty choices".to_string()))?;

        tracing::debug!(content_len = content.len(), "Chat completion received");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = HttpChatClientConfig::new("sk-test")
            .with_base_url("http://localhost:11434/v1")
            .with_model("llama3")
            .with_timeout(30);
        assert_eq!(config.base_url, "http://localhost:11434/v1");
        assert_eq!(config.model, "llama3");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_request_omits_unset_sampling_fields() {
        let request = ChatHttpRequest {
            model: "m".to_string(),
            messages: vec![ChatHttpMessage {
                role: "user",
                content: "hi".to_string(),
            }],
            max_tokens: None,
            temperature: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("max_tokens"));
        assert!(!json.contains("temperature"));
    }

    #[test]
    fn test_parses_first_choice() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"Once upon a time."}}]}"#;
        let body: ChatHttpResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.choices[0].message.content, "Once upon a time.");
    }
}
