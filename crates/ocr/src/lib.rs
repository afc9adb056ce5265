//! Tesseract OCR 集成
//!
//! 通过 Tesseract 命令行识别页面图片中的文字，默认使用简体中文 + 英文模型。

mod engine;
mod error;
mod tesseract;
mod types;

pub use engine::OcrEngine;
pub use error::OcrError;
pub use tesseract::{detect_status, get_tesseract_version, list_languages, TesseractEngine};
pub use types::*;

/// 默认识别语言（简体中文 + 英文）
pub const DEFAULT_LANG: &str = "chi_sim+eng";
