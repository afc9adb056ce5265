//! 转换会话
//!
//! 状态机：`Idle -> Validating -> Converting -> {Complete, Failed}`。
//! 每次选择新文件都会递增运行代次，旧代次的进度与结果一律丢弃。

use pdfpix_ocr::OcrEngine;
use pdfpix_render::{encode, RasterEngine, RenderError, RenderOptions};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use thiserror::Error;

use crate::document::{PageImage, SourceDocument, SourceFile};
use crate::extract::{ExtractError, ExtractedText, TextExtractor};
use crate::validate::{validate, ValidationError};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConvertError {
    #[error("converter could not be initialized: {0}")]
    EngineUnavailable(String),
    #[error("invalid PDF: {0}")]
    InvalidDocument(String),
    #[error("failed to render page {page_number}: {reason}")]
    Render { page_number: u32, reason: String },
    #[error("failed to encode page image: {0}")]
    Encode(String),
}

impl From<RenderError> for ConvertError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::EngineUnavailable(reason) => Self::EngineUnavailable(reason),
            RenderError::InvalidDocument(reason) => Self::InvalidDocument(reason),
            RenderError::PageOutOfRange {
                page_index,
                page_count,
            } => Self::Render {
                page_number: page_index + 1,
                reason: format!("document has {} pages", page_count),
            },
            RenderError::Render { page_index, reason } => Self::Render {
                page_number: page_index + 1,
                reason,
            },
            RenderError::Encode(reason) => Self::Encode(reason),
        }
    }
}

/// 会话失败原因
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Conversion(#[from] ConvertError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConversionState {
    Idle,
    Validating,
    Converting { progress: f64 },
    Complete { images: Arc<[PageImage]> },
    Failed { error: SessionError },
}

impl ConversionState {
    /// 当前可展示的页面；未完成时为空
    pub fn images(&self) -> &[PageImage] {
        match self {
            ConversionState::Complete { images } => images,
            _ => &[],
        }
    }
}

/// 单页识别记录
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageTextEntry {
    /// 最近一次成功识别的文字
    pub latest: Option<ExtractedText>,
    /// 最近一次识别失败的原因，成功后清除
    pub last_error: Option<ExtractError>,
}

/// 一次转换的凭据，持有已校验的文档
#[derive(Debug)]
pub struct RunTicket {
    generation: u64,
    document: SourceDocument,
}

impl RunTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn document(&self) -> &SourceDocument {
        &self.document
    }
}

struct SessionInner {
    state: ConversionState,
    progress: f64,
    document_name: Option<String>,
    texts: BTreeMap<u32, PageTextEntry>,
}

pub struct ConversionSession {
    generation: AtomicU64,
    inner: Mutex<SessionInner>,
}

impl Default for ConversionSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionSession {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            inner: Mutex::new(SessionInner {
                state: ConversionState::Idle,
                progress: 0.0,
                document_name: None,
                texts: BTreeMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 仅当代次仍是当前代次时写入，返回是否写入
    fn publish(&self, generation: u64, apply: impl FnOnce(&mut SessionInner)) -> bool {
        let mut inner = self.lock();
        if self.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        apply(&mut inner);
        true
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> ConversionState {
        self.lock().state.clone()
    }

    /// 当前转换进度 (0-100)
    pub fn progress(&self) -> f64 {
        self.lock().progress
    }

    pub fn images(&self) -> Arc<[PageImage]> {
        match &self.lock().state {
            ConversionState::Complete { images } => Arc::clone(images),
            _ => Arc::from(Vec::new()),
        }
    }

    pub fn document_name(&self) -> Option<String> {
        self.lock().document_name.clone()
    }

    /// 选择新文件
    ///
    /// 取代任何进行中的转换，清空上一轮的页面与识别结果，然后校验文件。
    pub fn select(&self, file: SourceFile) -> Result<RunTicket, ValidationError> {
        let generation = {
            let mut inner = self.lock();
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            inner.state = ConversionState::Validating;
            inner.progress = 0.0;
            inner.document_name = None;
            inner.texts.clear();
            generation
        };

        log::info!(
            "[Convert] 第 {} 轮: {} ({} 字节, {})",
            generation,
            file.file_name,
            file.size(),
            file.mime_type
        );

        match validate(file) {
            Ok(document) => {
                self.publish(generation, |inner| {
                    inner.document_name = Some(document.name.clone());
                    inner.state = ConversionState::Converting { progress: 0.0 };
                });
                Ok(RunTicket {
                    generation,
                    document,
                })
            }
            Err(err) => {
                log::info!("[Convert] 文件校验失败: {}", err);
                self.publish(generation, |inner| {
                    inner.state = ConversionState::Failed {
                        error: err.clone().into(),
                    };
                });
                Err(err)
            }
        }
    }

    /// 执行转换
    ///
    /// 逐页渲染，全部成功才进入 `Complete`；任一页失败则整轮失败，不保留部分结果。
    /// 返回执行结束时会话的状态（若本轮已被取代，则是新一轮的状态）。
    pub fn run<E, L>(
        &self,
        ticket: RunTicket,
        load_engine: L,
        options: &RenderOptions,
        mut on_progress: impl FnMut(f64),
    ) -> ConversionState
    where
        E: RasterEngine + ?Sized,
        L: FnOnce() -> Result<Arc<E>, RenderError>,
    {
        let RunTicket {
            generation,
            document,
        } = ticket;
        let start = Instant::now();

        let mut report = |progress: f64| {
            let published = self.publish(generation, |inner| {
                inner.progress = progress;
                inner.state = ConversionState::Converting { progress };
            });
            if published {
                on_progress(progress);
            }
        };

        let outcome = load_engine()
            .map_err(ConvertError::from)
            .and_then(|engine| convert_document(&document, engine.as_ref(), options, &mut report));

        let next = match outcome {
            Ok(images) => {
                log::info!(
                    "[Convert] {} 转换完成，共 {} 页，耗时: {} ms",
                    document.name,
                    images.len(),
                    start.elapsed().as_millis()
                );
                ConversionState::Complete {
                    images: images.into(),
                }
            }
            Err(err) => {
                log::warn!("[Convert] {} 转换失败: {}", document.name, err);
                ConversionState::Failed { error: err.into() }
            }
        };

        if !self.publish(generation, |inner| inner.state = next) {
            log::info!("[Convert] 第 {} 轮已被新文件取代，丢弃结果", generation);
        }

        self.state()
    }

    /// 识别单页文字
    ///
    /// 失败只记录在该页，不影响其他页面和转换状态。
    pub fn extract_text<E: OcrEngine>(
        &self,
        page_number: u32,
        extractor: &mut TextExtractor<E>,
        on_progress: impl FnMut(u8),
    ) -> Result<ExtractedText, ExtractError> {
        let (generation, images) = {
            let inner = self.lock();
            let images = match &inner.state {
                ConversionState::Complete { images } => Some(Arc::clone(images)),
                _ => None,
            };
            (self.generation.load(Ordering::SeqCst), images)
        };

        let image = images
            .as_deref()
            .and_then(|images| images.iter().find(|i| i.page_number == page_number))
            .ok_or(ExtractError::PageNotFound { page_number })?;

        let result = extractor.extract(image, on_progress);

        let published = self.publish(generation, |inner| {
            let entry = inner.texts.entry(page_number).or_default();
            match &result {
                Ok(text) => {
                    entry.latest = Some(text.clone());
                    entry.last_error = None;
                }
                Err(err) => entry.last_error = Some(err.clone()),
            }
        });
        if !published {
            log::info!("[OCR] 第 {} 页识别结果属于已取代的文件，丢弃", page_number);
        }

        result
    }

    pub fn page_text(&self, page_number: u32) -> Option<PageTextEntry> {
        self.lock().texts.get(&page_number).cloned()
    }

    pub fn page_texts(&self) -> BTreeMap<u32, PageTextEntry> {
        self.lock().texts.clone()
    }
}

fn convert_document<E: RasterEngine + ?Sized>(
    document: &SourceDocument,
    engine: &E,
    options: &RenderOptions,
    on_progress: &mut dyn FnMut(f64),
) -> Result<Vec<PageImage>, ConvertError> {
    let handle = engine.open(&document.bytes)?;
    let total = handle.page_count();

    log::info!(
        "[Convert] {}: {} 页，倍率 {}，格式 {}",
        document.name,
        total,
        options.scale,
        options.format
    );

    let mut images = Vec::with_capacity(total as usize);

    // 同一文档句柄不支持并发渲染，按页码顺序逐页处理
    for page_number in 1..=total {
        let raster = handle
            .render_page(page_number - 1, options.scale)
            .map_err(|e| match ConvertError::from(e) {
                ConvertError::Render { reason, .. } => ConvertError::Render {
                    page_number,
                    reason,
                },
                other => other,
            })?;

        let payload = encode(&raster, options.format)?;
        images.push(PageImage::new(
            &document.name,
            page_number,
            payload,
            options.format,
        ));

        on_progress(f64::from(page_number) / f64::from(total) * 100.0);
    }

    Ok(images)
}
