//! pdfium 渲染引擎
//!
//! pdfium 动态库在进程内只绑定一次，之后所有转换共享同一个实例。

use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::engine::{RasterDocument, RasterEngine};
use crate::error::RenderError;

/// 指定 pdfium 动态库所在目录的环境变量
pub const PDFIUM_DIR_ENV: &str = "PDFPIX_PDFIUM_DIR";

/// 已加载的引擎实例（绑定失败时保持为空，允许下次重试）
static ENGINE: Mutex<Option<Arc<PdfiumRasterizer>>> = Mutex::new(None);

/// 基于 pdfium 的光栅化引擎
pub struct PdfiumRasterizer {
    pdfium: Pdfium,
}

/// 获取 pdfium 引擎
///
/// 已加载时直接返回现有实例，不会重新绑定动态库。
pub fn load_engine() -> Result<Arc<PdfiumRasterizer>, RenderError> {
    let mut guard = ENGINE
        .lock()
        .map_err(|e| RenderError::EngineUnavailable(e.to_string()))?;

    if let Some(engine) = guard.as_ref() {
        return Ok(Arc::clone(engine));
    }

    let pdfium = bind_pdfium()?;
    let engine = Arc::new(PdfiumRasterizer { pdfium });
    *guard = Some(Arc::clone(&engine));

    log::info!("[Render] pdfium 引擎初始化成功");
    Ok(engine)
}

/// 获取 pdfium 库的搜索路径
fn get_pdfium_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. 环境变量指定的目录
    if let Some(dir) = std::env::var_os(PDFIUM_DIR_ENV) {
        paths.push(PathBuf::from(dir));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            // 2. 可执行文件同级的 libs 目录
            paths.push(exe_dir.join("libs"));

            // 3. 可执行文件同级目录
            paths.push(exe_dir.to_path_buf());

            // macOS: app bundle 内的 Resources 目录
            #[cfg(target_os = "macos")]
            {
                if let Some(contents_dir) = exe_dir.parent() {
                    paths.push(contents_dir.join("Resources").join("libs"));
                }
            }
        }
    }

    // 4. 本地开发
    paths.push(PathBuf::from("libs"));

    // 5. 当前目录
    paths.push(PathBuf::from("./"));

    paths
}

/// 尝试绑定 pdfium 库
fn bind_pdfium() -> Result<Pdfium, RenderError> {
    for path in get_pdfium_search_paths() {
        let lib_path = Pdfium::pdfium_platform_library_name_at_path(&path);
        log::debug!("[Render] 尝试加载 pdfium: {:?}", lib_path);

        if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
            log::info!("[Render] 成功从 {:?} 加载 pdfium", path);
            return Ok(Pdfium::new(bindings));
        }
    }

    log::debug!("[Render] 尝试加载系统 pdfium 库");
    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| {
            RenderError::EngineUnavailable(format!(
                "Pdfium 库不可用: {}。请将 pdfium 动态库放到 libs/ 目录或设置 {}",
                e, PDFIUM_DIR_ENV
            ))
        })
}

impl RasterEngine for PdfiumRasterizer {
    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn RasterDocument + 'a>, RenderError> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| RenderError::InvalidDocument(e.to_string()))?;

        Ok(Box::new(PdfiumDocument { document }))
    }
}

struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl RasterDocument for PdfiumDocument<'_> {
    fn page_count(&self) -> u32 {
        self.document.pages().len() as u32
    }

    fn render_page(&self, page_index: u32, scale: f32) -> Result<DynamicImage, RenderError> {
        let page_count = self.page_count();
        if page_index >= page_count {
            return Err(RenderError::PageOutOfRange {
                page_index,
                page_count,
            });
        }

        let page = self
            .document
            .pages()
            .get(page_index as u16)
            .map_err(|e| RenderError::Render {
                page_index,
                reason: e.to_string(),
            })?;

        // PDF 默认 72 DPI，倍率 1 对应页面点数
        let page_width = page.width().value;
        let page_height = page.height().value;
        let target_width = (page_width * scale) as i32;
        let target_height = (page_height * scale) as i32;

        log::debug!(
            "[Render] 页面 {}: {}x{} pt -> {}x{} px (倍率: {})",
            page_index,
            page_width,
            page_height,
            target_width,
            target_height,
            scale
        );

        let render_config = PdfRenderConfig::new()
            .set_target_width(target_width)
            .set_target_height(target_height);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| RenderError::Render {
                page_index,
                reason: e.to_string(),
            })?;

        Ok(bitmap.as_image())
    }
}
