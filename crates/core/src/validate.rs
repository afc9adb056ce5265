//! 文件校验：类型与大小

use thiserror::Error;

use crate::document::{document_name, SourceDocument, SourceFile};

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// 文件大小上限 50 MiB
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("not a PDF file (type: {mime_type})")]
    NotPdf { mime_type: String },
    #[error("file too large ({size} bytes, limit {limit})")]
    TooLarge { size: u64, limit: u64 },
    #[error("file could not be read: {reason}")]
    Unreadable { reason: String },
}

/// 校验用户选择的文件，先检查类型再检查大小
///
/// 两项检查都只看元数据，通过后才读取文件内容。
pub fn validate(file: SourceFile) -> Result<SourceDocument, ValidationError> {
    if file.mime_type != PDF_MIME_TYPE {
        return Err(ValidationError::NotPdf {
            mime_type: file.mime_type.clone(),
        });
    }

    let size = file.size();
    if size > MAX_FILE_SIZE {
        return Err(ValidationError::TooLarge {
            size,
            limit: MAX_FILE_SIZE,
        });
    }

    let name = document_name(&file.file_name);
    let bytes = file.into_bytes().map_err(|e| ValidationError::Unreadable {
        reason: e.to_string(),
    })?;

    Ok(SourceDocument {
        name,
        size: bytes.len() as u64,
        bytes,
    })
}
