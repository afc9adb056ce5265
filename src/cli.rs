use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use pdfpix_render::OutputFormat;

use crate::config::CONFIG_DIR_ENV;
use crate::locale::Locale;

/// Convert PDF pages to images and extract page text.
#[derive(Debug, Parser)]
#[command(name = "pdfpix", about, version)]
pub struct Cli {
    /// Interface language (en or zh)
    #[arg(long, global = true)]
    pub locale: Option<Locale>,

    /// Directory holding config.json and preferences.json
    #[arg(long, global = true, env = CONFIG_DIR_ENV, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Log progress details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert the pages of a PDF into images
    Convert {
        /// Path to the PDF file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output: PathBuf,

        /// Bundle all pages into one zip archive
        #[arg(long)]
        archive: bool,

        /// Image format (defaults to the configured format, then png)
        #[arg(long, value_enum)]
        format: Option<ImageFormatArg>,

        /// Page number to save (repeatable). Default: all pages
        #[arg(long = "page", value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
        pages: Vec<u32>,

        /// Extract text from the saved pages after converting
        #[arg(long)]
        ocr: bool,
    },

    /// Convert a PDF and print the text of selected pages
    Ocr {
        /// Path to the PDF file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Page number to extract (repeatable). Default: all pages
        #[arg(long = "page", value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
        pages: Vec<u32>,
    },

    /// Show or change saved settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Report PDF renderer and Tesseract availability
    Engines,
}

#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    /// Print current settings
    Show,
    /// Save the download path prefix
    SetPrefix {
        #[arg(value_name = "VALUE")]
        value: String,
    },
    /// Clear the download path prefix
    ClearPrefix,
    /// Save the interface language
    SetLocale {
        #[arg(value_name = "LOCALE")]
        locale: Locale,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ImageFormatArg {
    Png,
    #[value(alias = "jpg")]
    Jpeg,
}

impl From<ImageFormatArg> for OutputFormat {
    fn from(arg: ImageFormatArg) -> Self {
        match arg {
            ImageFormatArg::Png => OutputFormat::Png,
            ImageFormatArg::Jpeg => OutputFormat::Jpeg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_convert_args() {
        let cli = Cli::try_parse_from([
            "pdfpix", "convert", "a.pdf", "-o", "out", "--archive", "--format", "jpg", "--locale", "zh",
        ])
        .unwrap();
        assert_eq!(cli.locale, Some(Locale::Zh));
        match cli.command {
            Commands::Convert {
                input,
                output,
                archive,
                format,
                pages,
                ocr,
            } => {
                assert_eq!(input, PathBuf::from("a.pdf"));
                assert_eq!(output, PathBuf::from("out"));
                assert!(archive);
                assert!(matches!(format, Some(ImageFormatArg::Jpeg)));
                assert!(pages.is_empty());
                assert!(!ocr);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_ocr_pages_repeatable_and_one_based() {
        let cli = Cli::try_parse_from(["pdfpix", "ocr", "a.pdf", "--page", "2", "--page", "5"]).unwrap();
        assert!(matches!(cli.command, Commands::Ocr { ref pages, .. } if pages == &vec![2, 5]));

        assert!(Cli::try_parse_from(["pdfpix", "ocr", "a.pdf", "--page", "0"]).is_err());
    }

    #[test]
    fn test_convert_single_page() {
        let cli = Cli::try_parse_from(["pdfpix", "convert", "a.pdf", "--page", "3"]).unwrap();
        assert!(matches!(cli.command, Commands::Convert { ref pages, .. } if pages == &vec![3]));

        assert!(Cli::try_parse_from(["pdfpix", "convert", "a.pdf", "--page", "0"]).is_err());
    }

    #[test]
    fn test_rejects_unknown_locale() {
        assert!(Cli::try_parse_from(["pdfpix", "--locale", "fr", "engines"]).is_err());
    }
}
