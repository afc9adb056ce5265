//! 界面语言与文案

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Zh => "zh",
        }
    }

    /// 解析语言代码，接受 `zh`、`zh-CN`、`zh_CN.UTF-8` 这类形式
    pub fn from_code(code: &str) -> Option<Locale> {
        let primary = code
            .split(|c: char| c == '-' || c == '_' || c == '.')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Locale::En),
            "zh" => Some(Locale::Zh),
            _ => None,
        }
    }

    /// 从 `LC_ALL` / `LANG` 推断
    pub fn from_env() -> Option<Locale> {
        ["LC_ALL", "LANG"]
            .iter()
            .filter_map(|key| std::env::var(key).ok())
            .find_map(|value| Self::from_code(&value))
    }

    pub fn messages(self) -> Messages {
        Messages { locale: self }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| format!("unsupported locale: {} (expected en or zh)", s))
    }
}

/// 按语言返回面向用户的文案
#[derive(Debug, Clone, Copy)]
pub struct Messages {
    locale: Locale,
}

impl Messages {
    fn pick(&self, en: &'static str, zh: &'static str) -> &'static str {
        match self.locale {
            Locale::En => en,
            Locale::Zh => zh,
        }
    }

    pub fn not_pdf(&self) -> &'static str {
        self.pick("Please select a valid PDF file.", "请选择有效的 PDF 文件。")
    }

    pub fn too_large(&self) -> &'static str {
        self.pick("File size must be less than 50MB.", "文件大小必须小于 50MB。")
    }

    pub fn convert_failed(&self) -> &'static str {
        self.pick(
            "Failed to convert PDF. Please ensure the file is a valid PDF.",
            "PDF 转换失败，请确认文件是有效的 PDF。",
        )
    }

    pub fn converting(&self, progress: f64) -> String {
        match self.locale {
            Locale::En => format!("Converting your PDF to images... {:.0}%", progress),
            Locale::Zh => format!("正在将 PDF 转换为图片... {:.0}%", progress),
        }
    }

    pub fn complete(&self, pages: usize) -> String {
        match self.locale {
            Locale::En => format!("Conversion Complete: {} page(s)", pages),
            Locale::Zh => format!("转换完成：共 {} 页", pages),
        }
    }

    pub fn page_entry(&self, page_number: u32, filename: &str, bytes: usize) -> String {
        match self.locale {
            Locale::En => format!("  Page {:>3}  {}  ({} bytes)", page_number, filename, bytes),
            Locale::Zh => format!("  第 {:>3} 页  {}  （{} 字节）", page_number, filename, bytes),
        }
    }

    pub fn saved_files(&self, count: usize, dir: &str) -> String {
        match self.locale {
            Locale::En => format!("Saved {} image(s) to {}", count, dir),
            Locale::Zh => format!("已保存 {} 张图片到 {}", count, dir),
        }
    }

    pub fn saved_archive(&self, count: usize, path: &str) -> String {
        match self.locale {
            Locale::En => format!("Saved {} image(s) into archive {}", count, path),
            Locale::Zh => format!("已将 {} 张图片打包到 {}", count, path),
        }
    }

    pub fn ocr_extracting(&self, page_number: u32, percent: u8) -> String {
        match self.locale {
            Locale::En => format!("Extracting text from page {}... {}%", page_number, percent),
            Locale::Zh => format!("正在识别第 {} 页文字... {}%", page_number, percent),
        }
    }

    pub fn ocr_heading(&self, page_number: u32) -> String {
        match self.locale {
            Locale::En => format!("Extracted text (page {})", page_number),
            Locale::Zh => format!("第 {} 页识别文字", page_number),
        }
    }

    pub fn character_count(&self, count: usize) -> String {
        match self.locale {
            Locale::En => format!("{} characters", count),
            Locale::Zh => format!("{} 个字符", count),
        }
    }

    pub fn ocr_failed(&self, page_number: u32) -> String {
        match self.locale {
            Locale::En => format!("Text extraction failed on page {}. Please try again.", page_number),
            Locale::Zh => format!("第 {} 页文字识别失败，请重试。", page_number),
        }
    }

    pub fn page_missing(&self, page_number: u32) -> String {
        match self.locale {
            Locale::En => format!("Page {} does not exist in this document.", page_number),
            Locale::Zh => format!("文档中不存在第 {} 页。", page_number),
        }
    }

    pub fn ocr_summary(&self, extracted: usize, failed: usize) -> String {
        match self.locale {
            Locale::En => format!("Text extracted from {} page(s), {} failed.", extracted, failed),
            Locale::Zh => format!("已识别 {} 页文字，{} 页失败。", extracted, failed),
        }
    }

    pub fn ocr_unavailable(&self) -> &'static str {
        self.pick(
            "Text extraction is unavailable: Tesseract could not be started.",
            "文字识别不可用：无法启动 Tesseract。",
        )
    }

    pub fn prefix_current(&self, prefix: Option<&str>) -> String {
        match (self.locale, prefix) {
            (Locale::En, Some(p)) => format!("Download path prefix: {}", p),
            (Locale::En, None) => "Download path prefix: (none)".to_string(),
            (Locale::Zh, Some(p)) => format!("下载路径前缀：{}", p),
            (Locale::Zh, None) => "下载路径前缀：（未设置）".to_string(),
        }
    }

    pub fn settings_saved(&self) -> &'static str {
        self.pick("Settings saved.", "设置已保存。")
    }

    pub fn prefix_cleared(&self) -> &'static str {
        self.pick("Download path prefix cleared.", "已清除下载路径前缀。")
    }

    pub fn locale_current(&self, locale: Locale) -> String {
        match self.locale {
            Locale::En => format!("Language: {}", locale),
            Locale::Zh => format!("语言：{}", locale),
        }
    }

    pub fn config_location(&self, dir: &str) -> String {
        match self.locale {
            Locale::En => format!("Config directory: {}", dir),
            Locale::Zh => format!("配置目录：{}", dir),
        }
    }

    pub fn renderer_status(&self, loaded: bool, detail: Option<&str>) -> String {
        match (self.locale, loaded) {
            (Locale::En, true) => "PDF renderer: pdfium available".to_string(),
            (Locale::Zh, true) => "PDF 渲染器：pdfium 可用".to_string(),
            (Locale::En, false) => format!("PDF renderer: unavailable ({})", detail.unwrap_or("-")),
            (Locale::Zh, false) => format!("PDF 渲染器：不可用（{}）", detail.unwrap_or("-")),
        }
    }

    pub fn tesseract_status(&self, version: Option<&str>, path: &str) -> String {
        match (self.locale, version) {
            (Locale::En, Some(v)) => format!("Tesseract: {} ({})", v, path),
            (Locale::Zh, Some(v)) => format!("Tesseract：{}（{}）", v, path),
            (Locale::En, None) => format!("Tesseract: not installed ({})", path),
            (Locale::Zh, None) => format!("Tesseract：未安装（{}）", path),
        }
    }

    pub fn tesseract_languages(&self, langs: &[String], hint_supported: bool) -> String {
        let list = if langs.is_empty() {
            "-".to_string()
        } else {
            langs.join(", ")
        };
        match (self.locale, hint_supported) {
            (Locale::En, true) => format!("Languages: {}", list),
            (Locale::Zh, true) => format!("语言包：{}", list),
            (Locale::En, false) => format!("Languages: {} (chi_sim+eng missing)", list),
            (Locale::Zh, false) => format!("语言包：{}（缺少 chi_sim+eng）", list),
        }
    }
}
