//! Core orchestration for PDF-to-image conversion and text extraction.

pub mod document;
pub mod extract;
pub mod session;
pub mod validate;

pub use document::{document_name, page_filename, PageImage, SourceDocument, SourceFile};
pub use extract::{ExtractError, ExtractedText, TextExtractor, LANGUAGE_HINT};
pub use session::{
    ConversionSession, ConversionState, ConvertError, PageTextEntry, RunTicket, SessionError,
};
pub use validate::{validate, ValidationError, MAX_FILE_SIZE, PDF_MIME_TYPE};

#[cfg(test)]
mod testing;
