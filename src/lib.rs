//! pdfpix: PDF 转图片与页面文字识别

pub mod cli;
pub mod commands;
pub mod config;
pub mod download;
pub mod intake;
pub mod locale;
pub mod view;

use anyhow::{Context as _, Result};
use clap::Parser;
use std::process::ExitCode;

use cli::{Cli, Commands};
use commands::{ConvertArgs, Context};
use locale::Locale;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "error" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_dir = config::config_dir(cli.config_dir.as_deref())?;
    let app_config = config::load_config(&config_dir)
        .with_context(|| format!("failed to load {}", config_dir.display()))?;

    // 命令行 > 配置文件 > 环境变量 > 英文
    let locale = cli
        .locale
        .or(app_config.locale)
        .or_else(Locale::from_env)
        .unwrap_or_default();
    log::info!("[Config] 配置目录 {}，语言 {}", config_dir.display(), locale);

    let ctx = Context {
        config_dir,
        config: app_config,
        locale,
    };

    match cli.command {
        Commands::Convert {
            input,
            output,
            archive,
            format,
            pages,
            ocr,
        } => commands::convert(
            &ctx,
            ConvertArgs {
                input,
                output,
                archive,
                format: format.map(Into::into),
                pages,
                ocr,
            },
        ),
        Commands::Ocr { input, pages } => commands::ocr(&ctx, &input, &pages),
        Commands::Settings { action } => commands::settings(&ctx, action),
        Commands::Engines => commands::engines(&ctx),
    }
}
