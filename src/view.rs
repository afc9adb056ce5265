//! 把会话状态和识别结果渲染为终端文本

use pdfpix_core::{
    ConversionState, ExtractError, ExtractedText, PageImage, PageTextEntry, SessionError,
    ValidationError,
};
use std::collections::BTreeMap;

use crate::locale::Messages;

/// 失败状态只给用户一条信息，细节写日志
pub fn error_message(messages: &Messages, error: &SessionError) -> &'static str {
    match error {
        SessionError::Validation(ValidationError::NotPdf { .. }) => messages.not_pdf(),
        SessionError::Validation(ValidationError::TooLarge { .. }) => messages.too_large(),
        SessionError::Validation(ValidationError::Unreadable { .. }) | SessionError::Conversion(_) => {
            messages.convert_failed()
        }
    }
}

pub fn gallery(messages: &Messages, images: &[PageImage]) -> Vec<String> {
    let mut lines = Vec::with_capacity(images.len() + 1);
    lines.push(messages.complete(images.len()));
    lines.extend(
        images
            .iter()
            .map(|image| messages.page_entry(image.page_number, &image.filename, image.payload.len())),
    );
    lines
}

/// 状态对应的输出行；`Idle` / `Validating` 没有输出
pub fn render_state(messages: &Messages, state: &ConversionState) -> Vec<String> {
    match state {
        ConversionState::Idle | ConversionState::Validating => Vec::new(),
        ConversionState::Converting { progress } => vec![messages.converting(*progress)],
        ConversionState::Complete { images } => gallery(messages, images),
        ConversionState::Failed { error } => vec![error_message(messages, error).to_string()],
    }
}

pub fn extracted_text(messages: &Messages, text: &ExtractedText) -> Vec<String> {
    let mut lines = vec![messages.ocr_heading(text.page_number)];
    lines.extend(text.text.lines().map(str::to_string));
    lines.push(messages.character_count(text.char_count));
    lines
}

pub fn extraction_error(messages: &Messages, error: &ExtractError) -> String {
    match error {
        ExtractError::PageNotFound { page_number } => messages.page_missing(*page_number),
        ExtractError::Decode { page_number, .. } | ExtractError::Recognition { page_number, .. } => {
            messages.ocr_failed(*page_number)
        }
    }
}

/// 按每页最近一次结果统计；重试失败的页面算失败
pub fn ocr_summary(messages: &Messages, texts: &BTreeMap<u32, PageTextEntry>) -> String {
    let failed = texts.values().filter(|entry| entry.last_error.is_some()).count();
    let extracted = texts
        .values()
        .filter(|entry| entry.last_error.is_none() && entry.latest.is_some())
        .count();
    messages.ocr_summary(extracted, failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Locale;
    use pdfpix_core::ConvertError;
    use pdfpix_render::OutputFormat;
    use std::sync::Arc;

    #[test]
    fn test_error_messages_by_kind() {
        let en = Locale::En.messages();
        let not_pdf = SessionError::Validation(ValidationError::NotPdf {
            mime_type: "text/plain".to_string(),
        });
        let render = SessionError::Conversion(ConvertError::Render {
            page_number: 2,
            reason: "broken".to_string(),
        });
        let engine = SessionError::Conversion(ConvertError::EngineUnavailable("x".to_string()));

        assert_eq!(error_message(&en, &not_pdf), "Please select a valid PDF file.");
        assert_eq!(error_message(&en, &render), en.convert_failed());
        assert_eq!(error_message(&en, &engine), en.convert_failed());
    }

    #[test]
    fn test_render_states() {
        let zh = Locale::Zh.messages();
        assert!(render_state(&zh, &ConversionState::Idle).is_empty());
        assert_eq!(
            render_state(&zh, &ConversionState::Converting { progress: 50.0 }),
            vec![zh.converting(50.0)]
        );

        let images: Arc<[PageImage]> = vec![
            PageImage::new("doc", 1, vec![0; 10], OutputFormat::Png),
            PageImage::new("doc", 2, vec![0; 20], OutputFormat::Png),
        ]
        .into();
        let lines = render_state(&zh, &ConversionState::Complete { images });
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], zh.complete(2));
        assert!(lines[2].contains("doc_page_2.png"));
    }

    #[test]
    fn test_extracted_text_lines() {
        let en = Locale::En.messages();
        let text = ExtractedText::new(3, "line one\nline two");
        let lines = extracted_text(&en, &text);
        assert_eq!(
            lines,
            vec![
                "Extracted text (page 3)".to_string(),
                "line one".to_string(),
                "line two".to_string(),
                "17 characters".to_string(),
            ]
        );
    }

    #[test]
    fn test_ocr_summary_counts_latest_outcome() {
        let en = Locale::En.messages();
        let mut texts = BTreeMap::new();
        texts.insert(
            1,
            PageTextEntry {
                latest: Some(ExtractedText::new(1, "ok")),
                last_error: None,
            },
        );
        texts.insert(
            2,
            PageTextEntry {
                latest: Some(ExtractedText::new(2, "old")),
                last_error: Some(ExtractError::Recognition {
                    page_number: 2,
                    reason: "crash".to_string(),
                }),
            },
        );
        assert_eq!(ocr_summary(&en, &texts), en.ocr_summary(1, 1));
        assert_eq!(ocr_summary(&en, &BTreeMap::new()), en.ocr_summary(0, 0));
    }

    #[test]
    fn test_extraction_error_lines() {
        let en = Locale::En.messages();
        assert_eq!(
            extraction_error(&en, &ExtractError::PageNotFound { page_number: 9 }),
            en.page_missing(9)
        );
        assert_eq!(
            extraction_error(
                &en,
                &ExtractError::Recognition {
                    page_number: 2,
                    reason: "crash".to_string()
                }
            ),
            en.ocr_failed(2)
        );
    }
}
