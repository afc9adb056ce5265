//! Tesseract OCR 引擎实现（CLI 包装）

use std::path::Path;
use std::process::Command;
use std::time::Instant;

use crate::engine::OcrEngine;
use crate::error::OcrError;
use crate::types::{
    RecognizePhase, RecognizeStatus, Recognition, TesseractConfig, TesseractStatus, Word,
};

/// Tesseract OCR 引擎
pub struct TesseractEngine {
    config: TesseractConfig,
    version: String,
}

impl TesseractEngine {
    /// 创建 Tesseract 引擎
    pub fn new(config: TesseractConfig) -> Result<Self, OcrError> {
        // 验证 binary 是否可用
        let version = get_tesseract_version(config.binary_or_default())?;

        log::info!("[Tesseract] 初始化成功，版本: {}", version);

        Ok(Self { config, version })
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize_file(
        &mut self,
        image_path: &Path,
        lang: &str,
        on_status: &mut dyn FnMut(RecognizeStatus),
    ) -> Result<Recognition, OcrError> {
        let start = Instant::now();
        on_status(RecognizeStatus::new(RecognizePhase::Initializing, 0.0));

        let mut cmd = Command::new(self.config.binary_or_default());
        cmd.arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(lang)
            .arg("--psm")
            .arg(self.config.psm_or_default().to_string())
            .arg("--oem")
            .arg(self.config.oem_or_default().to_string())
            .arg("tsv");

        if let Some(tessdata_path) = &self.config.tessdata_path {
            cmd.env("TESSDATA_PREFIX", tessdata_path);
        }

        log::info!(
            "[Tesseract] 执行: {} {} -l {} --psm {} --oem {} tsv",
            self.config.binary_or_default(),
            image_path.display(),
            lang,
            self.config.psm_or_default(),
            self.config.oem_or_default()
        );

        on_status(RecognizeStatus::new(RecognizePhase::LoadingLanguage, 0.0));
        on_status(RecognizeStatus::new(RecognizePhase::RecognizingText, 0.0));

        let output = cmd
            .output()
            .map_err(|e| OcrError::EngineUnavailable(format!("执行 tesseract 失败: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Execution(format!(
                "Tesseract 执行失败: {}",
                stderr.trim()
            )));
        }

        let tsv_output = String::from_utf8_lossy(&output.stdout);
        let words = parse_tesseract_tsv(&tsv_output);
        on_status(RecognizeStatus::new(RecognizePhase::RecognizingText, 1.0));

        log::info!(
            "[Tesseract] 识别完成，耗时: {} ms，单词数: {}",
            start.elapsed().as_millis(),
            words.len()
        );

        Ok(Recognition::from_words(words))
    }
}

/// 解析 Tesseract TSV 输出
///
/// TSV 格式：
/// level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
///
/// 只保留单词级别 (level=5) 的结果
fn parse_tesseract_tsv(tsv: &str) -> Vec<Word> {
    let mut words = Vec::new();

    // 跳过表头
    for line in tsv.lines().skip(1) {
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() < 12 {
            continue;
        }

        let level: i32 = cols[0].parse().unwrap_or(-1);
        let block: u32 = cols[2].parse().unwrap_or(0);
        let paragraph: u32 = cols[3].parse().unwrap_or(0);
        let line_num: u32 = cols[4].parse().unwrap_or(0);
        let conf: f32 = cols[10].parse().unwrap_or(-1.0);
        let text = cols[11].trim();

        // 跳过非单词行、空文本和无效置信度
        if level != 5 || text.is_empty() || conf < 0.0 {
            continue;
        }

        words.push(Word {
            text: text.to_string(),
            confidence: conf / 100.0, // Tesseract 置信度是 0-100
            line_key: (block, paragraph, line_num),
        });
    }

    words
}

/// 获取 Tesseract 版本
pub fn get_tesseract_version(binary_path: &str) -> Result<String, OcrError> {
    let output = Command::new(binary_path)
        .arg("--version")
        .output()
        .map_err(|e| OcrError::EngineUnavailable(format!("无法执行 tesseract: {}", e)))?;

    if !output.status.success() {
        return Err(OcrError::EngineUnavailable(
            "tesseract --version 执行失败".to_string(),
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let combined = format!("{}{}", stdout, stderr);

    Ok(parse_version(&combined).unwrap_or_else(|| "unknown".to_string()))
}

/// 解析版本号，格式通常是 "tesseract 5.3.0" 或 "tesseract v5.3.0"
fn parse_version(output: &str) -> Option<String> {
    output
        .lines()
        .filter(|line| line.contains("tesseract"))
        .find_map(|line| {
            line.split_whitespace()
                .nth(1)
                .map(|v| v.trim_start_matches('v').to_string())
        })
}

/// 获取 Tesseract 可用语言列表
pub fn list_languages(
    binary_path: &str,
    tessdata_path: Option<&str>,
) -> Result<Vec<String>, OcrError> {
    let mut cmd = Command::new(binary_path);
    cmd.arg("--list-langs");

    if let Some(path) = tessdata_path {
        cmd.env("TESSDATA_PREFIX", path);
    }

    let output = cmd
        .output()
        .map_err(|e| OcrError::EngineUnavailable(format!("执行失败: {}", e)))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    Ok(parse_lang_list(&format!("{}{}", stdout, stderr)))
}

fn parse_lang_list(output: &str) -> Vec<String> {
    let mut langs = Vec::new();
    let mut found_list = false;

    for line in output.lines() {
        let line = line.trim();
        if line.contains("List of available languages") {
            found_list = true;
            continue;
        }
        if found_list && !line.is_empty() && !line.contains(':') {
            langs.push(line.to_string());
        }
    }

    langs
}

/// 检测 Tesseract 安装状态
pub fn detect_status(config: &TesseractConfig) -> TesseractStatus {
    let binary_path = config.binary_or_default();

    match get_tesseract_version(binary_path) {
        Ok(version) => {
            let available_langs = list_languages(binary_path, config.tessdata_path.as_deref())
                .unwrap_or_default();
            TesseractStatus {
                installed: true,
                version: Some(version),
                binary_path: binary_path.to_string(),
                available_langs,
                error: None,
            }
        }
        Err(e) => TesseractStatus {
            installed: false,
            version: None,
            binary_path: binary_path.to_string(),
            available_langs: Vec::new(),
            error: Some(e.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tsv_word_level() {
        let tsv = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t1000\t1000\t-1\t
5\t1\t1\t1\t1\t1\t100\t200\t50\t20\t95.5\tHello
5\t1\t1\t1\t1\t2\t160\t200\t60\t20\t92.3\tWorld
4\t1\t1\t1\t2\t0\t100\t250\t100\t20\t-1\t
5\t1\t1\t1\t2\t1\t100\t250\t100\t20\t88.0\tTest
5\t1\t1\t1\t2\t2\t210\t250\t10\t20\t91.0\t 
";
        let words = parse_tesseract_tsv(tsv);
        assert_eq!(words.len(), 3);
        assert_eq!(words[0].text, "Hello");
        assert_eq!(words[2].line_key, (1, 1, 2));
        assert!((words[0].confidence - 0.955).abs() < 0.001);

        let rec = Recognition::from_words(words);
        assert_eq!(rec.text, "Hello World\nTest");
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(
            parse_version("tesseract 5.3.0\n leptonica-1.82.0\n"),
            Some("5.3.0".to_string())
        );
        assert_eq!(
            parse_version("tesseract v4.1.1\n"),
            Some("4.1.1".to_string())
        );
        assert_eq!(parse_version("something else"), None);
    }

    #[test]
    fn test_parse_lang_list() {
        let output = "List of available languages in \"/usr/share/tessdata/\" (3):\nchi_sim\neng\nosd\n";
        assert_eq!(parse_lang_list(output), vec!["chi_sim", "eng", "osd"]);
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let config = TesseractConfig {
            binary_path: Some("/nonexistent/pdfpix-tesseract".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            TesseractEngine::new(config.clone()),
            Err(OcrError::EngineUnavailable(_))
        ));

        let status = detect_status(&config);
        assert!(!status.installed);
        assert!(status.error.is_some());
    }
}
