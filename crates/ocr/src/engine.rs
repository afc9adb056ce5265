//! OCR 引擎 trait 定义

use image::{DynamicImage, ImageFormat};
use std::path::Path;

use crate::error::OcrError;
use crate::types::{Recognition, RecognizeStatus};

/// OCR 引擎统一 trait
pub trait OcrEngine: Send {
    /// 识别图片文件
    ///
    /// `on_status` 在识别过程中被调用，报告当前阶段与该阶段的完成度（0-1）。
    fn recognize_file(
        &mut self,
        image_path: &Path,
        lang: &str,
        on_status: &mut dyn FnMut(RecognizeStatus),
    ) -> Result<Recognition, OcrError>;

    /// 识别内存中的图片
    fn recognize_image(
        &mut self,
        img: &DynamicImage,
        lang: &str,
        on_status: &mut dyn FnMut(RecognizeStatus),
    ) -> Result<Recognition, OcrError> {
        let temp = tempfile::Builder::new()
            .prefix("pdfpix_ocr_")
            .suffix(".png")
            .tempfile()?;

        img.save_with_format(temp.path(), ImageFormat::Png)
            .map_err(|e| OcrError::ImageProcess(format!("保存临时图片失败: {}", e)))?;

        // temp 在离开作用域时自动删除
        self.recognize_file(temp.path(), lang, on_status)
    }
}
