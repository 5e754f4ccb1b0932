//! File Media Storage - WAV 落盘到静态目录
//!
//! 实现 MediaStoragePort trait
//!
//! 文件写到 {media_root}/audio/generated_audio_{unix_ts}.wav，
//! 返回静态路由可命中的 /static/audio/... 路径。同秒多次写入
//! 用进程内单调计数器加后缀去重。

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::application::ports::{MediaStoragePort, StorageError};

/// 文件系统媒体存储
pub struct FileMediaStorage {
    audio_dir: PathBuf,
    counter: AtomicU64,
}

impl FileMediaStorage {
    /// 创建存储并确保音频目录存在
    pub fn new(media_root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let audio_dir = media_root.as_ref().join("audio");
        std::fs::create_dir_all(&audio_dir).map_err(|e| StorageError::IoError(e.to_string()))?;
        Ok(Self {
            audio_dir,
            counter: AtomicU64::new(0),
        })
    }

    /// 选一个未被占用的文件名
    fn next_file_name(&self) -> String {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let plain = format!("generated_audio_{timestamp}.wav");
        if !self.audio_dir.join(&plain).exists() {
            return plain;
        }
        loop {
            let sequence = self.counter.fetch_add(1, Ordering::Relaxed);
            let candidate = format!("generated_audio_{timestamp}_{sequence}.wav");
            if !self.audio_dir.join(&candidate).exists() {
                return candidate;
            }
        }
    }
}

#[async_trait]
impl MediaStoragePort for FileMediaStorage {
    async fn save_audio(&self, bytes: &[u8]) -> Result<String, StorageError> {
        let file_name = self.next_file_name();
        let path = self.audio_dir.join(&file_name);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "Audio file saved");
        Ok(format!("/static/audio/{file_name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_audio_writes_file_and_returns_static_url() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileMediaStorage::new(dir.path()).unwrap();

        let url = storage.save_audio(&[1, 2, 3]).await.unwrap();
        assert!(url.starts_with("/static/audio/generated_audio_"));
        assert!(url.ends_with(".wav"));

        let file_name = url.rsplit('/').next().unwrap();
        let on_disk = std::fs::read(dir.path().join("audio").join(file_name)).unwrap();
        assert_eq!(on_disk, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_same_second_saves_get_distinct_names() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileMediaStorage::new(dir.path()).unwrap();

        let first = storage.save_audio(&[0u8; 4]).await.unwrap();
        let second = storage.save_audio(&[0u8; 4]).await.unwrap();
        let third = storage.save_audio(&[0u8; 4]).await.unwrap();

        assert_ne!(first, second);
        assert_ne!(second, third);
        assert_eq!(std::fs::read_dir(dir.path().join("audio")).unwrap().count(), 3);
    }
}
