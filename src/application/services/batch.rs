//! 批量生成协调器
//!
//! 单写者模型：同一本书同时只允许一个批次运行（DashMap 注册表，
//! 持有凭据的批次结束时自动释放）。段落严格升序处理，每段先图后音，
//! 单项媒体失败不终止批次。进度事件经 mpsc 通道外发，发送失败
//! 视为客户端断开，立即停止后续供应商调用。

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::application::ports::BookStorePort;
use crate::domain::{Book, BookId, ImageStyle, MediaPatch, Paragraph};

use super::{AudioService, ImageService, PromptRefiner};

/// 提示词精炼时提供的故事上下文上限
const CONTEXT_MAX_CHARS: usize = 600;

/// 批量生成请求
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub book_id: BookId,
    pub start_index: usize,
    pub count: usize,
    pub style: Option<String>,
}

/// 批量生成进度事件，逐行 JSON 输出
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProgressEvent {
    GeneratingImage { index: usize, message: String },
    GeneratingAudio { index: usize, message: String },
    ParagraphComplete { index: usize, data: Paragraph },
    BatchComplete { message: String },
    Error { message: String },
}

/// 活跃批次注册表
///
/// 每本书同时最多一个批次
#[derive(Default)]
pub struct ActiveBatches {
    running: DashMap<BookId, ()>,
}

impl ActiveBatches {
    pub fn new() -> Self {
        Self::default()
    }

    /// 认领书籍，已有批次运行时返回 None
    pub fn try_claim(self: &Arc<Self>, book_id: BookId) -> Option<BatchClaim> {
        use dashmap::mapref::entry::Entry;
        match self.running.entry(book_id) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(());
                Some(BatchClaim {
                    registry: Arc::clone(self),
                    book_id,
                })
            }
        }
    }

    pub fn is_running(&self, book_id: BookId) -> bool {
        self.running.contains_key(&book_id)
    }
}

/// 批次占用凭据，释放时自动清除注册表条目
pub struct BatchClaim {
    registry: Arc<ActiveBatches>,
    book_id: BookId,
}

impl Drop for BatchClaim {
    fn drop(&mut self) {
        self.registry.running.remove(&self.book_id);
    }
}

/// 批量生成协调器
pub struct BatchCoordinator {
    store: Arc<dyn BookStorePort>,
    refiner: Arc<PromptRefiner>,
    images: Arc<ImageService>,
    audio: Arc<AudioService>,
    active: Arc<ActiveBatches>,
}

impl BatchCoordinator {
    pub fn new(
        store: Arc<dyn BookStorePort>,
        refiner: Arc<PromptRefiner>,
        images: Arc<ImageService>,
        audio: Arc<AudioService>,
        active: Arc<ActiveBatches>,
    ) -> Self {
        Self {
            store,
            refiner,
            images,
            audio,
            active,
        }
    }

    /// 执行批次，进度写入 `tx`
    ///
    /// 所有错误都转化为事件；函数本身不返回错误
    pub async fn run(&self, request: BatchRequest, tx: mpsc::Sender<ProgressEvent>) {
        let book_id = request.book_id;

        let Some(_claim) = self.active.try_claim(book_id) else {
            warn!(book_id = %book_id, "批次冲突，本书已有批次在运行");
            let _ = tx
                .send(ProgressEvent::Error {
                    message: format!("a batch is already running for book {book_id}"),
                })
                .await;
            return;
        };

        let book = match self.store.get(book_id).await {
            Ok(Some(book)) => book,
            Ok(None) => {
                let _ = tx
                    .send(ProgressEvent::Error {
                        message: format!("book not found: {book_id}"),
                    })
                    .await;
                return;
            }
            Err(e) => {
                let _ = tx
                    .send(ProgressEvent::Error {
                        message: e.to_string(),
                    })
                    .await;
                return;
            }
        };

        if let Err(e) = book.check_range(request.start_index, request.count) {
            let _ = tx
                .send(ProgressEvent::Error {
                    message: e.to_string(),
                })
                .await;
            return;
        }

        let style = ImageStyle::parse(request.style.as_deref().unwrap_or_default());
        let context = story_context(&book);
        info!(
            book_id = %book_id,
            start = request.start_index,
            count = request.count,
            style = style.as_str(),
            "批量生成开始"
        );

        for index in request.start_index..request.start_index + request.count {
            // check_range 已验证索引
            let Some(text) = book.get_paragraph(index).map(|p| p.text().to_string()) else {
                break;
            };

            if !emit(
                &tx,
                ProgressEvent::GeneratingImage {
                    index,
                    message: format!("Generating image for paragraph {index}"),
                },
            )
            .await
            {
                return;
            }

            let prompt = self.refiner.refine(&context, &text).await;
            match self.images.generate(book_id, index as u32, &prompt, style).await {
                Ok(image) => {
                    self.patch(
                        book_id,
                        index,
                        MediaPatch::image(image.url, image.prompt, style.as_str()),
                    )
                    .await;
                }
                Err(e) => warn!(book_id = %book_id, index, error = %e, "插图生成失败，槽位留空"),
            }

            if !emit(
                &tx,
                ProgressEvent::GeneratingAudio {
                    index,
                    message: format!("Generating audio for paragraph {index}"),
                },
            )
            .await
            {
                return;
            }

            match self.audio.generate(book_id, index as u32, &text).await {
                Ok(Some(url)) => self.patch(book_id, index, MediaPatch::audio(url)).await,
                Ok(None) => {}
                Err(e) => warn!(book_id = %book_id, index, error = %e, "旁白生成失败，槽位留空"),
            }

            // 事件携带写回后的段落状态；刚刚引用过的记录读不回来属于内部不变量被破坏
            let snapshot = match self.store.get(book_id).await {
                Ok(Some(current)) => current.get_paragraph(index).cloned(),
                Ok(None) => None,
                Err(e) => {
                    error!(book_id = %book_id, index, error = %e, "读取段落快照失败，批次终止");
                    let _ = tx
                        .send(ProgressEvent::Error {
                            message: format!("failed to read back book {book_id}: {e}"),
                        })
                        .await;
                    return;
                }
            };
            let Some(data) = snapshot else {
                error!(book_id = %book_id, index, "书籍记录在批次运行中消失，批次终止");
                let _ = tx
                    .send(ProgressEvent::Error {
                        message: format!("book {book_id} disappeared during batch"),
                    })
                    .await;
                return;
            };
            if !emit(&tx, ProgressEvent::ParagraphComplete { index, data }).await {
                return;
            }
        }

        info!(book_id = %book_id, "批量生成完成");
        let _ = tx
            .send(ProgressEvent::BatchComplete {
                message: format!(
                    "processed paragraphs {}..{}",
                    request.start_index,
                    request.start_index + request.count
                ),
            })
            .await;
    }

    async fn patch(&self, book_id: BookId, index: usize, patch: MediaPatch) {
        if let Err(e) = self.store.update_paragraph(book_id, index, &patch).await {
            warn!(book_id = %book_id, index, error = %e, "写回书籍存储失败");
        }
    }
}

/// 精炼上下文：标题 + 正文开头
pub fn story_context(book: &Book) -> String {
    let mut context = book.metadata().title.clone();
    if let Some(genre) = &book.metadata().genre {
        context.push_str(&format!(" ({genre})"));
    }
    context.push('\n');
    for paragraph in book.paragraphs() {
        if context.chars().count() >= CONTEXT_MAX_CHARS {
            break;
        }
        context.push_str(paragraph.text());
        context.push(' ');
    }
    context.chars().take(CONTEXT_MAX_CHARS).collect()
}

/// 发送事件，客户端断开时返回 false
async fn emit(tx: &mpsc::Sender<ProgressEvent>, event: ProgressEvent) -> bool {
    if tx.send(event).await.is_err() {
        warn!("进度通道已关闭，提前终止批次");
        return false;
    }
    true
}
