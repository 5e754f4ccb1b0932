//! HTTP Image Client - 调用 OpenAI 兼容的图像生成接口
//!
//! 实现 ImageModelPort trait
//!
//! 外部 API:
//! POST {base_url}/images/generations
//! Request: {"model": "...", "prompt": "...", "response_format": "b64_json"}
//! Response: {"data": [{"b64_json": "..."}]}

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{ImageModelError, ImageModelPort};

/// 图像生成请求体 (JSON)
#[derive(Debug, Serialize)]
struct ImageHttpRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
    response_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct ImageHttpResponse {
    data: Vec<ImageHttpItem>,
}

#[derive(Debug, Deserialize)]
struct ImageHttpItem {
    b64_json: String,
}

/// HTTP Image 客户端配置
#[derive(Debug, Clone)]
pub struct HttpImageClientConfig {
    /// 服务基础 URL（含 /v1 前缀）
    pub base_url: String,
    /// Bearer 密钥
    pub api_key: String,
    /// 模型名
    pub model: String,
    /// 输出分辨率
    pub size: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpImageClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "dall-e-3".to_string(),
            size: "1024x1024".to_string(),
            timeout_secs: 180,
        }
    }
}

impl HttpImageClientConfig {
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
}

/// HTTP Image 客户端
pub struct HttpImageClient {
    client: Client,
    config: HttpImageClientConfig,
}

impl HttpImageClient {
    /// 创建新的 HTTP Image 客户端
    pub fn new(config: HttpImageClientConfig) -> Result<Self, ImageModelError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ImageModelError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn generations_url(&self) -> String {
        format!("{}/images/generations", self.config.base_url)
    }
}

#[async_trait]
impl ImageModelPort for HttpImageClient {
    async fn generate(&self, prompt: &str) -> Result<String, ImageModelError> {
        let http_request = ImageHttpRequest {
            model: &self.config.model,
            prompt,
            n: 1,
            size: &self.config.size,
            response_format: "b64_json",
        };

        tracing::debug!(
            url = %self.generations_url(),
            prompt_len = prompt.len(),
            "Sending image generation request"
        );

        let response = self
            .client
            .post(self.generations_url())
            .bearer_auth(&self.config.api_key)
            .json(&http_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ImageModelError::Timeout
                } else if e.is_connect() {
                    ImageModelError::NetworkError(format!(
                        "Cannot connect to image service: {}",
                        e
                    ))
                } else {
                    ImageModelError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ImageModelError::Upstream(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body: ImageHttpResponse = response
            .json()
            .await
            .map_err(|e| ImageModelError::InvalidResponse(e.to_string()))?;

        let image = body
            .data
            .into_iter()
            .next()
            .map(|item| item.b64_json)
            .ok_or_else(|| ImageModelError::InvalidResponse("empty data".to_string()))?;

        tracing::debug!(base64_len = image.len(), "Image generation completed");
        Ok(image)
    }
}
