//! 渲染错误类型

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("无法初始化 PDF 渲染引擎: {0}")]
    EngineUnavailable(String),

    #[error("无效的 PDF 文档: {0}")]
    InvalidDocument(String),

    #[error("页面索引 {page_index} 超出范围 (共 {page_count} 页)")]
    PageOutOfRange { page_index: u32, page_count: u32 },

    #[error("渲染页面 {page_index} 失败: {reason}")]
    Render { page_index: u32, reason: String },

    #[error("图片编码失败: {0}")]
    Encode(String),
}
