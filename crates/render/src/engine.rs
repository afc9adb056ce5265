//! 光栅化引擎 trait 定义

use image::DynamicImage;

use crate::error::RenderError;

/// 已打开的文档
///
/// 页面索引从 0 开始；同一文档的页面只能按顺序逐页渲染，
/// 实现不需要支持并发渲染。
pub trait RasterDocument {
    /// 文档页数
    fn page_count(&self) -> u32;

    /// 以给定倍率渲染单页
    fn render_page(&self, page_index: u32, scale: f32) -> Result<DynamicImage, RenderError>;
}

/// PDF 光栅化引擎统一 trait
pub trait RasterEngine: Send + Sync {
    /// 从原始字节打开文档
    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn RasterDocument + 'a>, RenderError>;
}
