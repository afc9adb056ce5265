//! 图片交付：逐个写文件或打包为 zip

use pdfpix_core::PageImage;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// 前缀拆成安全的相对路径段，丢弃空段、`.` 和 `..`
fn prefix_segments(prefix: Option<&str>) -> Vec<&str> {
    prefix
        .unwrap_or_default()
        .split(['/', '\\'])
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .collect()
}

/// 下载文件名：`{prefix}/{filename}`，无前缀时就是文件名本身
pub fn download_name(prefix: Option<&str>, filename: &str) -> String {
    let mut segments = prefix_segments(prefix);
    segments.push(filename);
    segments.join("/")
}

/// 按页码挑选图片
///
/// 页码为空时返回全部页面；结果保持页面顺序，重复页码只出现一次。
/// 第二项是找不到的页码。
pub fn select_pages(images: &[PageImage], pages: &[u32]) -> (Vec<PageImage>, Vec<u32>) {
    if pages.is_empty() {
        return (images.to_vec(), Vec::new());
    }

    let selected = images
        .iter()
        .filter(|image| pages.contains(&image.page_number))
        .cloned()
        .collect();

    let mut missing: Vec<u32> = pages
        .iter()
        .copied()
        .filter(|n| !images.iter().any(|image| image.page_number == *n))
        .collect();
    missing.sort_unstable();
    missing.dedup();

    (selected, missing)
}

fn target_dir(dir: &Path, prefix: Option<&str>) -> PathBuf {
    let mut target = dir.to_path_buf();
    for segment in prefix_segments(prefix) {
        target.push(segment);
    }
    target
}

/// 单张图片写到 `dir/<prefix>/<filename>`
pub fn deliver_image(image: &PageImage, dir: &Path, prefix: Option<&str>) -> Result<PathBuf, DeliveryError> {
    let target = target_dir(dir, prefix);
    fs::create_dir_all(&target)?;

    let path = target.join(&image.filename);
    fs::write(&path, &image.payload)?;
    log::debug!("[Download] 已写入 {}", path.display());
    Ok(path)
}

/// 把每张图片写到 `dir/<prefix>/<filename>`，返回写出的路径
pub fn deliver_files(
    images: &[PageImage],
    dir: &Path,
    prefix: Option<&str>,
) -> Result<Vec<PathBuf>, DeliveryError> {
    let written = images
        .iter()
        .map(|image| deliver_image(image, dir, prefix))
        .collect::<Result<Vec<_>, _>>()?;

    log::info!(
        "[Download] 共写入 {} 个文件到 {}",
        written.len(),
        target_dir(dir, prefix).display()
    );
    Ok(written)
}

/// 把所有图片打包为一个 zip，条目名为 `download_name`
pub fn deliver_archive(
    images: &[PageImage],
    path: &Path,
    prefix: Option<&str>,
) -> Result<(), DeliveryError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    // PNG/JPEG 已经压缩过，直接存储
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut writer = ZipWriter::new(File::create(path)?);
    for image in images {
        writer.start_file(download_name(prefix, &image.filename), options)?;
        writer.write_all(&image.payload)?;
    }
    writer.finish()?;

    log::info!("[Download] 已打包 {} 张图片到 {}", images.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfpix_render::OutputFormat;
    use std::io::Read;

    fn images() -> Vec<PageImage> {
        (1..=3)
            .map(|n| PageImage::new("scan", n, vec![n as u8; 8], OutputFormat::Png))
            .collect()
    }

    #[test]
    fn test_download_name() {
        assert_eq!(download_name(None, "a_page_1.png"), "a_page_1.png");
        assert_eq!(download_name(Some(""), "a_page_1.png"), "a_page_1.png");
        assert_eq!(download_name(Some("exports"), "a_page_1.png"), "exports/a_page_1.png");
        assert_eq!(
            download_name(Some("/exports//2024/"), "a_page_1.png"),
            "exports/2024/a_page_1.png"
        );
        assert_eq!(download_name(Some("../x/./y"), "f.png"), "x/y/f.png");
    }

    #[test]
    fn test_deliver_files_every_image() {
        let dir = tempfile::tempdir().unwrap();
        let written = deliver_files(&images(), dir.path(), Some("out")).unwrap();

        assert_eq!(written.len(), 3);
        for (i, path) in written.iter().enumerate() {
            let n = i as u32 + 1;
            assert_eq!(*path, dir.path().join("out").join(format!("scan_page_{}.png", n)));
            assert_eq!(fs::read(path).unwrap(), vec![n as u8; 8]);
        }
    }

    #[test]
    fn test_deliver_single_page() {
        let dir = tempfile::tempdir().unwrap();
        let (selected, missing) = select_pages(&images(), &[2]);
        assert!(missing.is_empty());

        let written = deliver_files(&selected, dir.path(), None).unwrap();
        assert_eq!(written, vec![dir.path().join("scan_page_2.png")]);
        assert_eq!(fs::read(&written[0]).unwrap(), vec![2u8; 8]);
        assert!(!dir.path().join("scan_page_1.png").exists());
        assert!(!dir.path().join("scan_page_3.png").exists());
    }

    #[test]
    fn test_deliver_image_under_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let image = &images()[0];
        let path = deliver_image(image, dir.path(), Some("a/b")).unwrap();
        assert_eq!(path, dir.path().join("a").join("b").join("scan_page_1.png"));
        assert_eq!(fs::read(path).unwrap(), image.payload);
    }

    #[test]
    fn test_select_pages() {
        let all = images();

        let (selected, missing) = select_pages(&all, &[]);
        assert_eq!(selected, all);
        assert!(missing.is_empty());

        let (selected, missing) = select_pages(&all, &[3, 1, 3, 7, 7, 5]);
        let numbers: Vec<u32> = selected.iter().map(|i| i.page_number).collect();
        assert_eq!(numbers, vec![1, 3]);
        assert_eq!(missing, vec![5, 7]);
    }

    #[test]
    fn test_selected_page_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.zip");
        let (selected, _) = select_pages(&images(), &[3]);
        deliver_archive(&selected, &path, None).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(archive.len(), 1);
        assert!(archive.by_name("scan_page_3.png").is_ok());
    }

    #[test]
    fn test_deliver_archive_contains_all_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.zip");
        deliver_archive(&images(), &path, Some("exports")).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(archive.len(), 3);
        for n in 1..=3u32 {
            let mut entry = archive
                .by_name(&format!("exports/scan_page_{}.png", n))
                .unwrap();
            assert_eq!(entry.compression(), CompressionMethod::Stored);
            let mut data = Vec::new();
            entry.read_to_end(&mut data).unwrap();
            assert_eq!(data, vec![n as u8; 8]);
        }
    }

    #[test]
    fn test_deliver_archive_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.zip");
        deliver_archive(&[], &path, None).unwrap();
        let archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
