//! Book Context - Entities

use serde::{Deserialize, Serialize};

/// 段落 - 生成流水线的最小工作单位
///
/// 不变量:
/// - text 在书籍生命周期内不可变
/// - image_url / audio_url 只经由成功的生成覆盖写入
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    /// 段落正文（创建后不可变）
    text: String,
    /// 最近一次成功生成所用的图片提示词
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
    /// 插图 data URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// 旁白音频 URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    /// 生成时使用的插图风格
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    /// 章节编号（上传文档时解析）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_number: Option<u32>,
    /// 章节标题
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_title: Option<String>,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Result<Self, &'static str> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err("段落正文不能为空");
        }
        Ok(Self {
            text,
            image_prompt: None,
            image_url: None,
            audio_url: None,
            style: None,
            chapter_number: None,
            chapter_title: None,
        })
    }

    pub fn with_chapter(mut self, number: u32, title: Option<String>) -> Self {
        self.chapter_number = Some(number);
        self.chapter_title = title;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// 两个媒体槽位均为空时段落处于 pending 状态
    pub fn is_pending(&self) -> bool {
        self.image_url.is_none() && self.audio_url.is_none()
    }

    /// 应用媒体补丁
    ///
    /// 只覆盖补丁中为 Some 的槽位，正文不受影响
    pub fn apply(&mut self, patch: &MediaPatch) {
        if let Some(prompt) = &patch.image_prompt {
            self.image_prompt = Some(prompt.clone());
        }
        if let Some(url) = &patch.image_url {
            self.image_url = Some(url.clone());
        }
        if let Some(url) = &patch.audio_url {
            self.audio_url = Some(url.clone());
        }
        if let Some(style) = &patch.style {
            self.style = Some(style.clone());
        }
    }
}

/// 媒体槽位补丁
///
/// Some 表示覆盖写入，None 表示保持原值；正文不在补丁范围内
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaPatch {
    pub image_prompt: Option<String>,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
    pub style: Option<String>,
}

impl MediaPatch {
    pub fn image(url: impl Into<String>, prompt: impl Into<String>, style: &str) -> Self {
        Self {
            image_prompt: Some(prompt.into()),
            image_url: Some(url.into()),
            audio_url: None,
            style: Some(style.to_string()),
        }
    }

    pub fn audio(url: impl Into<String>) -> Self {
        Self {
            image_prompt: None,
            image_url: None,
            audio_url: Some(url.into()),
            style: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_text() {
        assert!(Paragraph::new("  ").is_err());
        assert!(Paragraph::new("Once upon a time.").is_ok());
    }

    #[test]
    fn test_pending_until_media_arrives() {
        let mut p = Paragraph::new("Once upon a time.").unwrap();
        assert!(p.is_pending());

        p.apply(&MediaPatch::image("data:image/png;base64,AAAA", "a castle", "realistic"));
        assert!(!p.is_pending());
        assert_eq!(p.image_prompt.as_deref(), Some("a castle"));
    }

    #[test]
    fn test_apply_leaves_text_and_unset_slots_untouched() {
        let mut p = Paragraph::new("Once upon a time.").unwrap();
        p.apply(&MediaPatch::audio("/static/audio/generated_audio_1.wav"));

        assert_eq!(p.text(), "Once upon a time.");
        assert!(p.image_url.is_none());
        assert_eq!(
            p.audio_url.as_deref(),
            Some("/static/audio/generated_audio_1.wav")
        );
    }

    #[test]
    fn test_apply_overwrites_on_regeneration() {
        let mut p = Paragraph::new("Once upon a time.").unwrap();
        p.apply(&MediaPatch::audio("/static/audio/a.wav"));
        p.apply(&MediaPatch::audio("/static/audio/b.wav"));
        assert_eq!(p.audio_url.as_deref(), Some("/static/audio/b.wav"));
    }
}
