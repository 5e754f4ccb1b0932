//! WS Narration Client - 每次朗读开一条完整的 WebSocket 会话
//!
//! 实现 NarrationPort trait
//!
//! 会话协议:
//! 1. 连接 URL 以 query 携带 api_key / config_id / version
//! 2. 等服务端 `metadata` 消息
//! 3. 发送 `{"type":"user_input","text":...,"mode":"narrate"}`
//! 4. 累积 `audio_output` 帧（base64 PCM）直到 `assistant_end`
//! 5. `error` 消息 → ServiceError；未知类型忽略
//!
//! 整条会话受 30 秒期限约束，任何出口都关闭套接字。

use async_trait::async_trait;
use base64::Engine;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::application::ports::{NarrationError, NarrationPort};

/// 整条会话的期限
const SESSION_DEADLINE: Duration = Duration::from_secs(30);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// 发往服务端的朗读请求
#[derive(Debug, Serialize)]
struct UserInputFrame<'a> {
    r#type: &'static str,
    text: &'a str,
    mode: &'static str,
}

/// 服务端下行消息，按 type 字段区分
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerFrame {
    Metadata,
    AudioOutput {
        data: String,
    },
    AssistantEnd,
    Error {
        #[serde(default)]
        message: Option<String>,
    },
    #[serde(other)]
    Other,
}

/// WS Narration 客户端配置
#[derive(Debug, Clone)]
pub struct WsNarrationClientConfig {
    /// 服务端点，如 wss://host/path
    pub endpoint: String,
    pub api_key: String,
    pub config_id: String,
    /// 协议版本号
    pub version: String,
}

impl WsNarrationClientConfig {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        config_id: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            config_id: config_id.into(),
            version: "1.0".to_string(),
        }
    }
}

/// WS Narration 客户端
pub struct WsNarrationClient {
    config: WsNarrationClientConfig,
}

impl WsNarrationClient {
    pub fn new(config: WsNarrationClientConfig) -> Self {
        Self { config }
    }

    fn session_url(&self) -> String {
        // 无路径的端点补根路径，否则拼 query 产出非法 URI
        let endpoint = self.config.endpoint.as_str();
        let separator = match endpoint.find("://") {
            Some(pos) if !endpoint[pos + 3..].contains('/') => "/",
            _ => "",
        };
        format!(
            "{}{}?api_key={}&config_id={}&version={}",
            endpoint, separator, self.config.api_key, self.config.config_id, self.config.version
        )
    }
}

#[async_trait]
impl NarrationPort for WsNarrationClient {
    async fn narrate(&self, text: &str) -> Result<Vec<u8>, NarrationError> {
        // 连接握手也算在会话期限内；期限触发时 drop 连接即拆除 TCP
        let result = match tokio::time::timeout(SESSION_DEADLINE, async {
            let (mut stream, _) = connect_async(self.session_url())
                .await
                .map_err(|e| NarrationError::ConnectFailed(e.to_string()))?;

            tracing::debug!(text_len = text.len(), "Narration session opened");

            let outcome = session(&mut stream, text).await;

            // 成功与否都不复用连接
            let _ = stream.close(None).await;
            outcome
        })
        .await
        {
            Ok(result) => result,
            Err(_) => Err(NarrationError::Timeout),
        };

        if let Ok(pcm) = &result {
            tracing::debug!(pcm_len = pcm.len(), "Narration session completed");
        }
        result
    }
}

/// 单条会话：握手、送文本、收音频帧
async fn session(stream: &mut WsStream, text: &str) -> Result<Vec<u8>, NarrationError> {
    await_metadata(stream).await?;

    let frame = UserInputFrame {
        r#type: "user_input",
        text,
        mode: "narrate",
    };
    let payload = serde_json::to_string(&frame)
        .map_err(|e| NarrationError::ProtocolError(e.to_string()))?;
    stream
        .send(Message::text(payload))
        .await
        .map_err(|e| NarrationError::ProtocolError(e.to_string()))?;

    let mut pcm = Vec::new();
    loop {
        match next_frame(stream).await? {
            ServerFrame::AudioOutput { data } => {
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(data.as_bytes())
                    .map_err(|e| NarrationError::DecodeError(e.to_string()))?;
                pcm.extend_from_slice(&bytes);
            }
            ServerFrame::AssistantEnd => return Ok(pcm),
            ServerFrame::Error { message } => {
                return Err(NarrationError::ServiceError(
                    message.unwrap_or_else(|| "unspecified server error".to_string()),
                ));
            }
            ServerFrame::Metadata | ServerFrame::Other => {}
        }
    }
}

/// 等待会话首条 metadata 消息
async fn await_metadata(stream: &mut WsStream) -> Result<(), NarrationError> {
    loop {
        match next_frame(stream).await? {
            ServerFrame::Metadata => return Ok(()),
            ServerFrame::Error { message } => {
                return Err(NarrationError::ServiceError(
                    message.unwrap_or_else(|| "unspecified server error".to_string()),
                ));
            }
            _ => {}
        }
    }
}

/// 读取下一条文本帧并解析；连接中断视为协议错误
async fn next_frame(stream: &mut WsStream) -> Result<ServerFrame, NarrationError> {
    loop {
        let message = stream
            .next()
            .await
            .ok_or_else(|| NarrationError::ProtocolError("connection closed".to_string()))?
            .map_err(|e| NarrationError::ProtocolError(e.to_string()))?;

        match message {
            Message::Text(text) => {
                return serde_json::from_str(text.as_str())
                    .map_err(|e| NarrationError::ProtocolError(e.to_string()));
            }
            Message::Close(_) => {
                return Err(NarrationError::ProtocolError(
                    "server closed session".to_string(),
                ));
            }
            // ping/pong 由底层处理，二进制帧不在协议内
            _ => {}
        }
    }
}
