//! 文档与页面图片

use pdfpix_render::OutputFormat;
use std::io::{Cursor, Read};
use std::path::Path;

/// 用户选择的文件（尚未校验）
///
/// 大小来自文件元数据，内容在校验通过后才读取。
pub struct SourceFile {
    pub file_name: String,
    pub mime_type: String,
    size: u64,
    content: Box<dyn Read + Send>,
}

impl SourceFile {
    /// 内容已在内存中的文件
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        let size = bytes.len() as u64;
        Self::from_reader(file_name, mime_type, size, Cursor::new(bytes))
    }

    /// 按需读取的文件，`size` 为元数据中的大小
    pub fn from_reader(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        size: u64,
        content: impl Read + Send + 'static,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            size,
            content: Box::new(content),
        }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// 读取内容，最多读到声明的大小
    pub(crate) fn into_bytes(self) -> std::io::Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.size as usize);
        self.content.take(self.size).read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

impl std::fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.size)
            .finish()
    }
}

/// 通过校验、等待转换的文档
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    /// 去掉扩展名的文件名
    pub name: String,
    pub bytes: Vec<u8>,
    pub size: u64,
}

/// 去掉扩展名后的显示名称
pub fn document_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string())
}

/// `{name}_page_{n}.{ext}`
pub fn page_filename(document_name: &str, page_number: u32, format: OutputFormat) -> String {
    format!("{}_page_{}.{}", document_name, page_number, format.extension())
}

/// 单页转换结果，生成后不可变
#[derive(Clone, PartialEq)]
pub struct PageImage {
    /// 页码，从 1 开始
    pub page_number: u32,
    /// 编码后的图片数据
    pub payload: Vec<u8>,
    pub format: OutputFormat,
    pub filename: String,
}

impl PageImage {
    pub fn new(document_name: &str, page_number: u32, payload: Vec<u8>, format: OutputFormat) -> Self {
        Self {
            page_number,
            filename: page_filename(document_name, page_number, format),
            payload,
            format,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

impl std::fmt::Debug for PageImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageImage")
            .field("page_number", &self.page_number)
            .field("filename", &self.filename)
            .field("format", &self.format)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}
