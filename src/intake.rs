//! 文件读取
//!
//! 终端没有浏览器提供的文件类型，这里按扩展名推断。

use pdfpix_core::{SourceFile, PDF_MIME_TYPE};
use std::fs::File;
use std::io;
use std::path::Path;

pub fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "pdf" => PDF_MIME_TYPE,
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "txt" => "text/plain",
        "md" => "text/markdown",
        _ => "application/octet-stream",
    }
}

/// 打开文件；大小取自元数据，内容等校验通过后才读取
pub fn read_source(path: &Path) -> io::Result<SourceFile> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    let file_name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    log::info!("[Intake] 打开 {}，{} 字节", path.display(), size);
    Ok(SourceFile::from_reader(file_name, mime_type_for(path), size, file))
}
