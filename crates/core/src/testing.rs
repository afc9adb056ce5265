//! 测试用的假引擎

use image::{DynamicImage, Rgba, RgbaImage};
use pdfpix_ocr::{OcrEngine, OcrError, RecognizePhase, RecognizeStatus, Recognition, Word};
use pdfpix_render::{encode, OutputFormat, RasterDocument, RasterEngine, RenderError};
use std::path::Path;

use crate::document::{PageImage, SourceFile};
use crate::validate::PDF_MIME_TYPE;

/// 生成一个声明了页数的假 PDF
pub fn pdf_file(name: &str, pages: u32) -> SourceFile {
    SourceFile::new(name, PDF_MIME_TYPE, format!("%PDF-fake:{}", pages).into_bytes())
}

/// 页码编码在像素颜色里的页面图片
pub fn page_image(page_number: u32) -> PageImage {
    let payload = encode(&render(page_number - 1), OutputFormat::Png).unwrap();
    PageImage::new("doc", page_number, payload, OutputFormat::Png)
}

fn render(page_index: u32) -> DynamicImage {
    let shade = (page_index % 256) as u8;
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 6, Rgba([shade, 0, 0, 255])))
}

type RenderHook = Box<dyn Fn(u32) + Send + Sync>;

pub struct FakeRaster {
    fail_on: Option<u32>,
    hook: Option<RenderHook>,
}

impl FakeRaster {
    pub fn new() -> Self {
        Self {
            fail_on: None,
            hook: None,
        }
    }

    /// 渲染指定页（从 0 开始）时失败
    pub fn failing_on(mut self, page_index: u32) -> Self {
        self.fail_on = Some(page_index);
        self
    }

    /// 每页渲染前调用
    pub fn on_render(mut self, hook: impl Fn(u32) + Send + Sync + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }
}

impl RasterEngine for FakeRaster {
    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn RasterDocument + 'a>, RenderError> {
        let header = std::str::from_utf8(bytes).unwrap_or_default();
        let pages = header
            .strip_prefix("%PDF-fake:")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| RenderError::InvalidDocument("missing header".to_string()))?;
        Ok(Box::new(FakeDocument {
            engine: self,
            pages,
        }))
    }
}

struct FakeDocument<'a> {
    engine: &'a FakeRaster,
    pages: u32,
}

impl RasterDocument for FakeDocument<'_> {
    fn page_count(&self) -> u32 {
        self.pages
    }

    fn render_page(&self, page_index: u32, _scale: f32) -> Result<DynamicImage, RenderError> {
        if let Some(hook) = &self.engine.hook {
            hook(page_index);
        }
        if self.engine.fail_on == Some(page_index) {
            return Err(RenderError::Render {
                page_index,
                reason: "corrupt content stream".to_string(),
            });
        }
        Ok(render(page_index))
    }
}

pub struct FakeOcr {
    fail_on: Option<u32>,
    text: Option<String>,
    calls: usize,
}

impl FakeOcr {
    pub fn new() -> Self {
        Self {
            fail_on: None,
            text: None,
            calls: 0,
        }
    }

    pub fn failing_on(mut self, page_number: u32) -> Self {
        self.fail_on = Some(page_number);
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl OcrEngine for FakeOcr {
    fn recognize_file(
        &mut self,
        _image_path: &Path,
        _lang: &str,
        _on_status: &mut dyn FnMut(RecognizeStatus),
    ) -> Result<Recognition, OcrError> {
        Err(OcrError::Execution("file input not supported".to_string()))
    }

    fn recognize_image(
        &mut self,
        img: &DynamicImage,
        lang: &str,
        on_status: &mut dyn FnMut(RecognizeStatus),
    ) -> Result<Recognition, OcrError> {
        assert_eq!(lang, "chi_sim+eng");
        self.calls += 1;

        // 页码从像素颜色还原
        let page_number = u32::from(img.to_rgba8().get_pixel(0, 0)[0]) + 1;

        on_status(RecognizeStatus::new(RecognizePhase::LoadingLanguage, 0.3));
        on_status(RecognizeStatus::new(RecognizePhase::RecognizingText, 0.0));
        on_status(RecognizeStatus::new(RecognizePhase::RecognizingText, 0.456));

        if self.fail_on == Some(page_number) {
            return Err(OcrError::Execution("engine crashed".to_string()));
        }

        on_status(RecognizeStatus::new(RecognizePhase::RecognizingText, 1.0));

        let text = self
            .text
            .clone()
            .unwrap_or_else(|| format!("text for page {}", page_number));
        Ok(Recognition {
            words: vec![Word {
                text: text.clone(),
                confidence: 0.9,
                line_key: (1, 1, 1),
            }],
            text,
            mean_confidence: Some(0.9),
        })
    }
}
