//! 页面文字提取
//!
//! 每次调用都重新识别，不做缓存。

use pdfpix_ocr::{OcrEngine, RecognizePhase, RecognizeStatus, DEFAULT_LANG};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::PageImage;

/// 固定的识别语言：简体中文 + 英文
pub const LANGUAGE_HINT: &str = DEFAULT_LANG;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExtractError {
    #[error("page {page_number} is not available")]
    PageNotFound { page_number: u32 },
    #[error("page {page_number} image could not be decoded: {reason}")]
    Decode { page_number: u32, reason: String },
    #[error("text recognition failed on page {page_number}: {reason}")]
    Recognition { page_number: u32, reason: String },
}

/// 单页识别结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedText {
    pub page_number: u32,
    pub text: String,
    pub char_count: usize,
}

impl ExtractedText {
    pub fn new(page_number: u32, text: &str) -> Self {
        let text = text.trim().to_string();
        Self {
            page_number,
            char_count: text.chars().count(),
            text,
        }
    }
}

type TextObserver = Box<dyn FnMut(u32, &str) + Send>;

/// 文字提取适配器
pub struct TextExtractor<E: OcrEngine> {
    engine: E,
    observer: Option<TextObserver>,
}

impl<E: OcrEngine> TextExtractor<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            observer: None,
        }
    }

    /// 注册识别成功后的回调，参数为页码与文字
    pub fn with_observer(mut self, observer: impl FnMut(u32, &str) + Send + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// 识别一页图片
    ///
    /// `on_progress` 只在“识别文字”阶段收到 0-100 的整数进度。
    pub fn extract(
        &mut self,
        image: &PageImage,
        mut on_progress: impl FnMut(u8),
    ) -> Result<ExtractedText, ExtractError> {
        let page_number = image.page_number;

        let decoded = image::load_from_memory(&image.payload).map_err(|e| {
            log::warn!("[OCR] 第 {} 页图片解码失败: {}", page_number, e);
            ExtractError::Decode {
                page_number,
                reason: e.to_string(),
            }
        })?;

        let mut on_status = |status: RecognizeStatus| {
            if status.phase == RecognizePhase::RecognizingText {
                on_progress(progress_percent(status.progress));
            }
        };

        let recognition = self
            .engine
            .recognize_image(&decoded, LANGUAGE_HINT, &mut on_status)
            .map_err(|e| {
                log::warn!("[OCR] 第 {} 页识别失败: {}", page_number, e);
                ExtractError::Recognition {
                    page_number,
                    reason: e.to_string(),
                }
            })?;

        let extracted = ExtractedText::new(page_number, &recognition.text);
        log::info!(
            "[OCR] 第 {} 页识别完成，{} 个字符",
            page_number,
            extracted.char_count
        );

        if let Some(observer) = self.observer.as_mut() {
            observer(page_number, &extracted.text);
        }

        Ok(extracted)
    }
}

fn progress_percent(fraction: f32) -> u8 {
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{page_image, FakeOcr};
    use pdfpix_render::OutputFormat;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_progress_only_from_recognizing_phase() {
        let mut extractor = TextExtractor::new(FakeOcr::new());
        let mut seen = Vec::new();
        extractor.extract(&page_image(1), |p| seen.push(p)).unwrap();
        assert_eq!(seen, vec![0, 46, 100]);
    }

    #[test]
    fn test_text_is_trimmed_and_counted_by_char() {
        let mut extractor = TextExtractor::new(FakeOcr::new().with_text("  你好 PDF\n"));
        let text = extractor.extract(&page_image(2), |_| {}).unwrap();
        assert_eq!(text.page_number, 2);
        assert_eq!(text.text, "你好 PDF");
        assert_eq!(text.char_count, 6);
    }

    #[test]
    fn test_observer_receives_text_on_success_only() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let mut extractor = TextExtractor::new(FakeOcr::new().failing_on(2))
            .with_observer(move |page, text| sink.lock().unwrap().push((page, text.to_string())));

        extractor.extract(&page_image(1), |_| {}).unwrap();
        assert!(extractor.extract(&page_image(2), |_| {}).is_err());

        let received = received.lock().unwrap();
        assert_eq!(*received, vec![(1, "text for page 1".to_string())]);
    }

    #[test]
    fn test_undecodable_image() {
        let mut extractor = TextExtractor::new(FakeOcr::new());
        let image = PageImage::new("doc", 3, b"garbage".to_vec(), OutputFormat::Png);
        let err = extractor.extract(&image, |_| {}).unwrap_err();
        assert!(matches!(err, ExtractError::Decode { page_number: 3, .. }));
        assert_eq!(extractor.engine().calls(), 0);
    }

    #[test]
    fn test_progress_percent_clamps() {
        assert_eq!(progress_percent(-0.5), 0);
        assert_eq!(progress_percent(0.456), 46);
        assert_eq!(progress_percent(1.7), 100);
    }
}
