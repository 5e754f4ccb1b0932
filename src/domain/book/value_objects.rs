//! Book Context - Value Objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 书籍唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookId(Uuid);

impl BookId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 书籍来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookSource {
    /// 由用户提示词生成
    Prompt,
    /// 由上传文档切分
    Upload,
}

/// 书籍元数据
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMetadata {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
}

/// 插图风格
///
/// 未知风格一律回退到 Realistic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStyle {
    #[default]
    Realistic,
    Artistic,
    Fantasy,
}

impl ImageStyle {
    /// 解析风格名，未知值回退到 realistic
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "artistic" => Self::Artistic,
            "fantasy" => Self::Fantasy,
            _ => Self::Realistic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Realistic => "realistic",
            Self::Artistic => "artistic",
            Self::Fantasy => "fantasy",
        }
    }

    /// 风格修饰词，置于提示词之前
    pub fn modifier(&self) -> &'static str {
        match self {
            Self::Realistic => {
                "Photorealistic, natural lighting, fine detail, shot on a full-frame camera"
            }
            Self::Artistic => {
                "Expressive painterly illustration, visible brushstrokes, bold color palette"
            }
            Self::Fantasy => "Magical ethereal fantasy art, luminous atmosphere, dreamlike detail",
        }
    }

    /// 将风格修饰词拼接到提示词前
    pub fn apply(&self, prompt: &str) -> String {
        format!("{}. {}", self.modifier(), prompt)
    }
}
