use pdfpix_ocr::TesseractConfig;
use pdfpix_render::OutputFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::locale::Locale;

pub const CONFIG_DIR_ENV: &str = "PDFPIX_CONFIG_DIR";

/// 下载路径偏好的存储键
pub const DOWNLOAD_PATH_KEY: &str = "pdfConverter_downloadPath";

const CONFIG_FILE: &str = "config.json";
const PREFERENCES_FILE: &str = "preferences.json";

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// 界面语言
    pub locale: Option<Locale>,
    /// 输出图片格式
    pub output_format: Option<OutputFormat>,
    /// Tesseract 配置
    pub tesseract: Option<TesseractConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config dir unavailable")]
    NoConfigDir,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// 配置目录：显式指定优先，否则为系统配置目录下的 `pdfpix`
pub fn config_dir(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(base.join("pdfpix"))
}

pub fn load_config(dir: &Path) -> Result<AppConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn save_config(dir: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    write_json(&dir.join(CONFIG_FILE), config)?;
    log::info!("[Config] 配置已保存");
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let raw = serde_json::to_string_pretty(value)?;
    fs::write(path, raw)?;
    Ok(())
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Preferences {
    #[serde(rename = "pdfConverter_downloadPath", default, skip_serializing_if = "Option::is_none")]
    download_path: Option<String>,
}

/// 下载路径前缀的持久化存储
///
/// 只有一个键，保存时整体覆盖。
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(PREFERENCES_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取前缀；文件不存在或值为空时返回 `None`
    pub fn load(&self) -> Result<Option<String>, ConfigError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        let prefs: Preferences = serde_json::from_str(&raw)?;
        Ok(prefs.download_path.filter(|value| !value.trim().is_empty()))
    }

    pub fn save(&self, value: &str) -> Result<(), ConfigError> {
        let prefs = Preferences {
            download_path: Some(value.to_string()),
        };
        write_json(&self.path, &prefs)?;
        log::info!("[Config] {} 已更新", DOWNLOAD_PATH_KEY);
        Ok(())
    }
}
