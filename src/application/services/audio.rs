//! 旁白音频生成
//!
//! 段落文本切为 ≤100 字符的片段，每片走一条独立的叙述会话，
//! 按序拼接 PCM 后装入 WAV 容器（单声道 / 16-bit / 24 kHz）落盘。
//! 任一片段重试耗尽则整段失败并丢弃已收集的字节。

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::ports::{
    GenerationAttempt, GenerationHistoryPort, MediaStoragePort, MediaType, NarrationError,
    NarrationPort,
};
use crate::domain::{narration_chunks, BookId, MAX_NARRATION_CHARS};
use crate::resilience::{Retried, RetryError, RetryPolicy, SlidingWindowLimiter};

use super::MediaError;

/// 叙述服务约定的 PCM 采样率
const SAMPLE_RATE: u32 = 24_000;
const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;

/// 旁白生成服务
pub struct AudioService {
    narration: Arc<dyn NarrationPort>,
    storage: Arc<dyn MediaStoragePort>,
    history: Arc<dyn GenerationHistoryPort>,
    limiter: Arc<SlidingWindowLimiter>,
    retry: RetryPolicy,
}

impl AudioService {
    pub fn new(
        narration: Arc<dyn NarrationPort>,
        storage: Arc<dyn MediaStoragePort>,
        history: Arc<dyn GenerationHistoryPort>,
        limiter: Arc<SlidingWindowLimiter>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            narration,
            storage,
            history,
            limiter,
            retry,
        }
    }

    /// 为段落生成旁白音频
    ///
    /// 供应商可能对整段返回空音频，此时不落盘、不给 URL，
    /// 但依然算成功并写一行空 URL 的历史
    pub async fn generate(
        &self,
        book_id: BookId,
        paragraph_index: u32,
        text: &str,
    ) -> Result<Option<String>, MediaError> {
        let chunks = narration_chunks(text, MAX_NARRATION_CHARS);
        let mut pcm: Vec<u8> = Vec::new();
        let mut total_retries = 0u32;

        for (chunk_index, chunk) in chunks.iter().enumerate() {
            let outcome = self
                .retry
                .run("narration", || {
                    let chunk = chunk.as_str();
                    async move {
                        self.limiter.acquire().await;
                        let bytes = self.narration.narrate(chunk).await?;
                        self.limiter.commit().await;
                        Ok::<_, NarrationError>(bytes)
                    }
                })
                .await;

            match outcome {
                Ok(Retried { value, retries }) => {
                    total_retries += retries;
                    pcm.extend_from_slice(&value);
                }
                Err(RetryError { retries, source }) => {
                    // 已收集的字节一并丢弃
                    total_retries += retries;
                    self.record(GenerationAttempt::failed(
                        book_id,
                        paragraph_index,
                        MediaType::Audio,
                        None,
                        total_retries,
                        format!("chunk {chunk_index}: {source}"),
                    ))
                    .await;
                    return Err(MediaError::Upstream {
                        retries: total_retries,
                        message: source.to_string(),
                    });
                }
            }
        }

        if pcm.is_empty() {
            info!(book_id = %book_id, paragraph_index, "叙述服务返回空音频");
            self.record(GenerationAttempt::succeeded(
                book_id,
                paragraph_index,
                MediaType::Audio,
                None,
                None,
                total_retries,
            ))
            .await;
            return Ok(None);
        }

        if pcm.len() % 2 != 0 {
            let message = format!("odd PCM byte count: {}", pcm.len());
            self.record(GenerationAttempt::failed(
                book_id,
                paragraph_index,
                MediaType::Audio,
                None,
                total_retries,
                message.clone(),
            ))
            .await;
            return Err(MediaError::MalformedAudio(message));
        }

        let wav = encode_wav(&pcm);
        let url = match self.storage.save_audio(&wav).await {
            Ok(url) => url,
            Err(e) => {
                self.record(GenerationAttempt::failed(
                    book_id,
                    paragraph_index,
                    MediaType::Audio,
                    None,
                    total_retries,
                    e.to_string(),
                ))
                .await;
                return Err(MediaError::Storage(e.to_string()));
            }
        };

        self.record(GenerationAttempt::succeeded(
            book_id,
            paragraph_index,
            MediaType::Audio,
            None,
            Some(url.clone()),
            total_retries,
        ))
        .await;
        info!(book_id = %book_id, paragraph_index, url = %url, "旁白生成成功");
        Ok(Some(url))
    }

    async fn record(&self, attempt: GenerationAttempt) {
        if let Err(e) = self.history.append(attempt).await {
            warn!(error = %e, "写入生成历史失败");
        }
    }
}

/// 将裸 PCM 装入 WAV 容器
///
/// 信任供应商契约（单声道 / 16-bit / 24 kHz），不做转码
pub(crate) fn encode_wav(pcm: &[u8]) -> Vec<u8> {
    let byte_rate = SAMPLE_RATE * CHANNELS as u32 * (BITS_PER_SAMPLE / 8) as u32;
    let block_align = CHANNELS * (BITS_PER_SAMPLE / 8);
    let file_size = 36 + pcm.len();

    let mut wav = Vec::with_capacity(44 + pcm.len());

    // RIFF header
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(file_size as u32).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt chunk
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    wav.extend_from_slice(&CHANNELS.to_le_bytes());
    wav.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data chunk
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&(pcm.len() as u32).to_le_bytes());
    wav.extend_from_slice(pcm);

    wav
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::application::ports::{HistoryError, StorageError};

    struct FakeNarration {
        failures: AtomicU32,
        reply: Vec<u8>,
    }

    #[async_trait]
    impl NarrationPort for FakeNarration {
        async fn narrate(&self, _text: &str) -> Result<Vec<u8>, NarrationError> {
            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                return Err(NarrationError::Timeout);
            }
            Ok(self.reply.clone())
        }
    }

    #[derive(Default)]
    struct FakeStorage {
        saved: Mutex<Vec<Vec<u8>>>,
    }

    #[async_trait]
    impl MediaStoragePort for FakeStorage {
        async fn save_audio(&self, bytes: &[u8]) -> Result<String, StorageError> {
            self.saved.lock().unwrap().push(bytes.to_vec());
            Ok("/static/audio/generated_audio_1700000000.wav".to_string())
        }
    }

    #[derive(Default)]
    struct RecordingHistory {
        rows: Mutex<Vec<GenerationAttempt>>,
    }

    #[async_trait]
    impl GenerationHistoryPort for RecordingHistory {
        async fn append(&self, attempt: GenerationAttempt) -> Result<(), HistoryError> {
            self.rows.lock().unwrap().push(attempt);
            Ok(())
        }

        async fn list(&self, _book_id: BookId) -> Result<Vec<GenerationAttempt>, HistoryError> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn list_for_paragraph(
            &self,
            _book_id: BookId,
            _paragraph_index: u32,
        ) -> Result<Vec<GenerationAttempt>, HistoryError> {
            Ok(self.rows.lock().unwrap().clone())
        }
    }

    fn service(
        failures: u32,
        reply: Vec<u8>,
    ) -> (AudioService, Arc<FakeStorage>, Arc<RecordingHistory>) {
        let storage = Arc::new(FakeStorage::default());
        let history = Arc::new(RecordingHistory::default());
        let service = AudioService::new(
            Arc::new(FakeNarration {
                failures: AtomicU32::new(failures),
                reply,
            }),
            storage.clone(),
            history.clone(),
            Arc::new(SlidingWindowLimiter::new(6, Duration::from_secs(60))),
            RetryPolicy::default(),
        );
        (service, storage, history)
    }

    #[tokio::test(start_paused = true)]
    async fn test_packages_pcm_into_wav_and_returns_url() {
        let (service, storage, history) = service(0, vec![0u8; 4800]);

        let url = service
            .generate(BookId::new(), 0, "The fox woke at dawn.")
            .await
            .unwrap();

        assert_eq!(
            url.as_deref(),
            Some("/static/audio/generated_audio_1700000000.wav")
        );

        let saved = storage.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(&saved[0][0..4], b"RIFF");
        assert_eq!(&saved[0][8..12], b"WAVE");
        assert_eq!(saved[0].len(), 44 + 4800);

        let rows = history.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].success);
        assert_eq!(rows[0].media_type, MediaType::Audio);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_pcm_succeeds_without_url_or_file() {
        let (service, storage, history) = service(0, Vec::new());

        let url = service
            .generate(BookId::new(), 0, "The fox woke at dawn.")
            .await
            .unwrap();

        assert!(url.is_none());
        assert!(storage.saved.lock().unwrap().is_empty());

        let rows = history.rows.lock().unwrap();
        assert!(rows[0].success);
        assert!(rows[0].url.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_chunk_exhaustion_discards_bytes_and_fails() {
        // 多片段文本：第一片成功后第二片全部失败
        let long_text = format!(
            "{} {}",
            "The fox ran through the forest without stopping once today.",
            "It crossed the frozen river before the light faded entirely."
        );
        let (service, storage, history) = service(3, vec![0u8; 100]);

        // 三次失败消耗在第一片上，第一片仍以 retries=3 耗尽
        let err = service.generate(BookId::new(), 0, &long_text).await;

        assert!(matches!(err, Err(MediaError::Upstream { retries: 3, .. })));
        assert!(storage.saved.lock().unwrap().is_empty());

        let rows = history.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].success);
        assert_eq!(rows[0].retries, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_odd_pcm_length_is_malformed() {
        let (service, storage, _history) = service(0, vec![0u8; 101]);

        let err = service
            .generate(BookId::new(), 0, "The fox woke at dawn.")
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::MalformedAudio(_)));
        assert!(storage.saved.lock().unwrap().is_empty());
    }

    #[test]
    fn test_wav_header_layout() {
        let wav = encode_wav(&[1, 2, 3, 4]);
        assert_eq!(wav.len(), 48);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes(wav[4..8].try_into().unwrap()), 40);
        assert_eq!(&wav[12..16], b"fmt ");
        // 单声道
        assert_eq!(u16::from_le_bytes(wav[22..24].try_into().unwrap()), 1);
        // 24 kHz
        assert_eq!(u32::from_le_bytes(wav[24..28].try_into().unwrap()), 24_000);
        // 16-bit
        assert_eq!(u16::from_le_bytes(wav[34..36].try_into().unwrap()), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32::from_le_bytes(wav[40..44].try_into().unwrap()), 4);
        assert_eq!(&wav[44..], &[1, 2, 3, 4]);
    }
}
