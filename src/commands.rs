//! 子命令实现

use anyhow::{Context as _, Result};
use pdfpix_core::{ConversionSession, ConversionState, PageImage, TextExtractor};
use pdfpix_ocr::{detect_status, TesseractConfig, TesseractEngine};
use pdfpix_render::{load_engine, OutputFormat, RenderOptions, DEFAULT_SCALE};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::cli::SettingsAction;
use crate::config::{self, AppConfig, PreferenceStore};
use crate::download;
use crate::intake;
use crate::locale::{Locale, Messages};
use crate::view;

/// 命令运行所需的环境
pub struct Context {
    pub config_dir: PathBuf,
    pub config: AppConfig,
    pub locale: Locale,
}

impl Context {
    pub fn messages(&self) -> Messages {
        self.locale.messages()
    }

    fn preferences(&self) -> PreferenceStore {
        PreferenceStore::new(&self.config_dir)
    }

    fn tesseract_config(&self) -> TesseractConfig {
        self.config.tesseract.clone().unwrap_or_default()
    }
}

pub struct ConvertArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub archive: bool,
    pub format: Option<OutputFormat>,
    /// 只保存这些页；为空时保存全部
    pub pages: Vec<u32>,
    pub ocr: bool,
}

/// 读取、校验并转换；失败时输出提示并返回 `None`
fn convert_input(
    ctx: &Context,
    input: &Path,
    format: OutputFormat,
) -> Result<Option<(ConversionSession, Vec<PageImage>)>> {
    let messages = ctx.messages();
    let source = intake::read_source(input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    let session = ConversionSession::new();
    let ticket = match session.select(source) {
        Ok(ticket) => ticket,
        Err(_) => {
            for line in view::render_state(&messages, &session.state()) {
                eprintln!("{}", line);
            }
            return Ok(None);
        }
    };

    let options = RenderOptions {
        scale: DEFAULT_SCALE,
        format,
    };
    let mut stderr = std::io::stderr();
    let state = session.run(ticket, load_engine, &options, |progress| {
        let _ = write!(stderr, "\r{}", messages.converting(progress));
        let _ = stderr.flush();
    });
    eprintln!();

    match state {
        ConversionState::Complete { .. } => {
            let images = state.images().to_vec();
            Ok(Some((session, images)))
        }
        other => {
            for line in view::render_state(&messages, &other) {
                eprintln!("{}", line);
            }
            Ok(None)
        }
    }
}

pub fn convert(ctx: &Context, args: ConvertArgs) -> Result<ExitCode> {
    let messages = ctx.messages();
    let format = args
        .format
        .or(ctx.config.output_format)
        .unwrap_or_default();

    let Some((session, images)) = convert_input(ctx, &args.input, format)? else {
        return Ok(ExitCode::FAILURE);
    };

    for line in view::gallery(&messages, &images) {
        println!("{}", line);
    }

    let (images, missing) = download::select_pages(&images, &args.pages);
    for page_number in &missing {
        eprintln!("{}", messages.page_missing(*page_number));
    }
    if images.is_empty() && !args.pages.is_empty() {
        return Ok(ExitCode::FAILURE);
    }

    let prefix = ctx
        .preferences()
        .load()
        .context("failed to read preferences")?;

    if args.archive {
        let name = session.document_name().unwrap_or_else(|| "document".to_string());
        let path = args.output.join(format!("{}.zip", name));
        download::deliver_archive(&images, &path, prefix.as_deref())
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("{}", messages.saved_archive(images.len(), &path.display().to_string()));
    } else {
        let written = download::deliver_files(&images, &args.output, prefix.as_deref())
            .with_context(|| format!("failed to write into {}", args.output.display()))?;
        let target = written
            .first()
            .and_then(|p| p.parent())
            .unwrap_or(args.output.as_path())
            .display()
            .to_string();
        println!("{}", messages.saved_files(written.len(), &target));
    }

    if args.ocr {
        let pages: Vec<u32> = images.iter().map(|i| i.page_number).collect();
        extract_pages(ctx, &session, &pages);
    }

    Ok(ExitCode::SUCCESS)
}

pub fn ocr(ctx: &Context, input: &Path, pages: &[u32]) -> Result<ExitCode> {
    let format = ctx.config.output_format.unwrap_or_default();
    let Some((session, images)) = convert_input(ctx, input, format)? else {
        return Ok(ExitCode::FAILURE);
    };

    let pages: Vec<u32> = if pages.is_empty() {
        images.iter().map(|i| i.page_number).collect()
    } else {
        pages.to_vec()
    };
    extract_pages(ctx, &session, &pages);

    Ok(ExitCode::SUCCESS)
}

/// 逐页识别；单页失败只影响该页
fn extract_pages(ctx: &Context, session: &ConversionSession, pages: &[u32]) {
    let messages = ctx.messages();

    let engine = match TesseractEngine::new(ctx.tesseract_config()) {
        Ok(engine) => engine,
        Err(e) => {
            log::warn!("[OCR] Tesseract 初始化失败: {}", e);
            eprintln!("{}", messages.ocr_unavailable());
            return;
        }
    };
    log::info!("[OCR] 使用 Tesseract {}", engine.version());

    let mut extractor = TextExtractor::new(engine);
    let mut stderr = std::io::stderr();

    for &page_number in pages {
        let result = session.extract_text(page_number, &mut extractor, |percent| {
            let _ = write!(stderr, "\r{}", messages.ocr_extracting(page_number, percent));
            let _ = stderr.flush();
        });
        eprint!("\r");

        match result {
            Ok(text) => {
                println!();
                for line in view::extracted_text(&messages, &text) {
                    println!("{}", line);
                }
            }
            Err(e) => eprintln!("{}", view::extraction_error(&messages, &e)),
        }
    }

    println!();
    println!("{}", view::ocr_summary(&messages, &session.page_texts()));
}

pub fn settings(ctx: &Context, action: SettingsAction) -> Result<ExitCode> {
    let messages = ctx.messages();
    let store = ctx.preferences();

    match action {
        SettingsAction::Show => {
            let prefix = store.load().context("failed to read preferences")?;
            println!("{}", messages.prefix_current(prefix.as_deref()));
            println!("{}", messages.locale_current(ctx.locale));
            println!("{}", messages.config_location(&ctx.config_dir.display().to_string()));
        }
        SettingsAction::SetPrefix { value } => {
            store.save(&value).context("failed to save preferences")?;
            println!("{}", messages.settings_saved());
            let prefix = store.load().context("failed to read preferences")?;
            println!("{}", messages.prefix_current(prefix.as_deref()));
        }
        SettingsAction::ClearPrefix => {
            store.save("").context("failed to save preferences")?;
            println!("{}", messages.prefix_cleared());
        }
        SettingsAction::SetLocale { locale } => {
            let mut updated = ctx.config.clone();
            updated.locale = Some(locale);
            config::save_config(&ctx.config_dir, &updated).context("failed to save config")?;
            let messages = locale.messages();
            println!("{}", messages.settings_saved());
            println!("{}", messages.locale_current(locale));
        }
    }

    Ok(ExitCode::SUCCESS)
}

pub fn engines(ctx: &Context) -> Result<ExitCode> {
    let messages = ctx.messages();

    match load_engine() {
        Ok(_) => println!("{}", messages.renderer_status(true, None)),
        Err(e) => {
            log::warn!("[Render] {}", e);
            println!("{}", messages.renderer_status(false, Some(&e.to_string())));
        }
    }

    let status = detect_status(&ctx.tesseract_config());
    println!(
        "{}",
        messages.tesseract_status(status.version.as_deref(), &status.binary_path)
    );
    if status.installed {
        println!(
            "{}",
            messages.tesseract_languages(&status.available_langs, status.supports(pdfpix_core::LANGUAGE_HINT))
        );
    }
    if let Some(error) = &status.error {
        log::warn!("[Tesseract] {}", error);
    }

    Ok(ExitCode::SUCCESS)
}
