//! OCR 共享类型定义

use serde::{Deserialize, Serialize};

/// 识别阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognizePhase {
    /// 启动引擎
    Initializing,
    /// 加载语言模型
    LoadingLanguage,
    /// 识别文字
    RecognizingText,
}

impl std::fmt::Display for RecognizePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecognizePhase::Initializing => write!(f, "initializing"),
            RecognizePhase::LoadingLanguage => write!(f, "loading language"),
            RecognizePhase::RecognizingText => write!(f, "recognizing text"),
        }
    }
}

/// 识别进度事件
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecognizeStatus {
    pub phase: RecognizePhase,
    /// 当前阶段完成度 (0-1)
    pub progress: f32,
}

impl RecognizeStatus {
    pub fn new(phase: RecognizePhase, progress: f32) -> Self {
        Self { phase, progress }
    }
}

/// 单词级识别结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub text: String,
    /// 置信度 (0-1)
    pub confidence: f32,
    /// (block, paragraph, line)，用于按行重建文本
    pub line_key: (u32, u32, u32),
}

/// 整张图片的识别结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recognition {
    pub text: String,
    pub words: Vec<Word>,
    pub mean_confidence: Option<f32>,
}

impl Recognition {
    /// 由单词列表重建文本
    pub fn from_words(words: Vec<Word>) -> Self {
        let mut text = String::new();
        let mut current_line = None;

        for word in &words {
            match current_line {
                Some(line) if line == word.line_key => {
                    if needs_gap(&text, &word.text) {
                        text.push(' ');
                    }
                }
                Some(_) => text.push('\n'),
                None => {}
            }
            text.push_str(&word.text);
            current_line = Some(word.line_key);
        }

        let mean_confidence = if words.is_empty() {
            None
        } else {
            Some(words.iter().map(|w| w.confidence).sum::<f32>() / words.len() as f32)
        };

        Self {
            text,
            words,
            mean_confidence,
        }
    }
}

/// 两个单词之间是否需要空格：相邻字符都不是 ASCII 时（中文）直接拼接
fn needs_gap(left: &str, right: &str) -> bool {
    let left_char = left.chars().next_back();
    let right_char = right.chars().next();
    match (left_char, right_char) {
        (Some(l), Some(r)) => l.is_ascii() || r.is_ascii(),
        _ => false,
    }
}

/// Tesseract 配置
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TesseractConfig {
    /// Tesseract 可执行文件路径
    pub binary_path: Option<String>,
    /// tessdata 目录路径
    pub tessdata_path: Option<String>,
    /// 页面分割模式 (0-13)
    pub psm: Option<u8>,
    /// OCR 引擎模式 (0-3)
    pub oem: Option<u8>,
}

impl TesseractConfig {
    pub fn binary_or_default(&self) -> &str {
        self.binary_path.as_deref().unwrap_or("tesseract")
    }

    pub fn psm_or_default(&self) -> u8 {
        self.psm.unwrap_or(6)
    }

    pub fn oem_or_default(&self) -> u8 {
        self.oem.unwrap_or(1)
    }
}

/// Tesseract 安装状态
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TesseractStatus {
    pub installed: bool,
    pub version: Option<String>,
    pub binary_path: String,
    pub available_langs: Vec<String>,
    pub error: Option<String>,
}

impl TesseractStatus {
    /// 是否具备指定语言（如 "chi_sim+eng" 中的每一项）
    pub fn supports(&self, lang: &str) -> bool {
        lang.split('+')
            .all(|l| self.available_langs.iter().any(|a| a == l))
    }
}
