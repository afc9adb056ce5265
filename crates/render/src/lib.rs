//! PDF rasterization for preview, download and OCR.
//!
//! 页面渲染交给 pdfium，这里只负责绑定引擎、按固定倍率渲染和编码输出。

mod encode;
mod engine;
mod error;
mod pdfium;

pub use encode::{encode, OutputFormat, JPEG_QUALITY};
pub use engine::{RasterDocument, RasterEngine};
pub use error::RenderError;
pub use pdfium::{load_engine, PdfiumRasterizer, PDFIUM_DIR_ENV};

use serde::{Deserialize, Serialize};

/// 默认渲染倍率（相对 72 DPI），兼顾清晰度与内存占用
pub const DEFAULT_SCALE: f32 = 2.0;

/// 渲染选项
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    pub scale: f32,
    pub format: OutputFormat,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            format: OutputFormat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_default() {
        let options = RenderOptions::default();
        assert_eq!(options.scale, 2.0);
        assert_eq!(options.format, OutputFormat::Png);
    }

    #[test]
    fn test_render_options_partial_json() {
        let options: RenderOptions = serde_json::from_str(r#"{"format":"jpeg"}"#).unwrap();
        assert_eq!(options.scale, DEFAULT_SCALE);
        assert_eq!(options.format, OutputFormat::Jpeg);
    }
}
