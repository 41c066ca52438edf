//! Conversion of PDF bytes into per-page JSON records
//!
//! Parsing is delegated to `oxidize-pdf`. The reader accepts any
//! `Read + Seek` source, so uploaded bytes are parsed straight from memory.

use std::io::Cursor;
use std::path::Path;

use oxidize_pdf::parser::{PdfDocument, PdfReader};
use tracing::{debug, warn};

use crate::error::{ConvertError, Result};
use crate::model::{ConversionOutcome, DocumentResult, PageRecord};

/// Options controlling text extraction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Extract at most this many pages, starting from the first
    pub max_pages: Option<usize>,
}

impl ConvertOptions {
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }
}

/// Extract every page of an in-memory PDF
pub fn extract_document(bytes: &[u8], filename: &str) -> Result<DocumentResult> {
    extract_document_with_options(bytes, filename, &ConvertOptions::default())
}

/// Extract pages of an in-memory PDF using custom options
pub fn extract_document_with_options(
    bytes: &[u8],
    filename: &str,
    options: &ConvertOptions,
) -> Result<DocumentResult> {
    if options.max_pages == Some(0) {
        return Err(ConvertError::InvalidPageLimit);
    }

    let reader = PdfReader::new(Cursor::new(bytes))?;
    let document = PdfDocument::new(reader);

    let page_count = document.page_count()?;
    let limit = match options.max_pages {
        Some(max) => page_count.min(u32::try_from(max).unwrap_or(u32::MAX)),
        None => page_count,
    };
    debug!("{filename}: {page_count} pages, extracting {limit}");

    let mut pages = Vec::with_capacity(limit as usize);
    for index in 0..limit {
        let extracted = document.extract_text_from_page(index)?;
        pages.push(PageRecord::new(index as usize + 1, extracted.text));
    }

    Ok(DocumentResult::new(filename, pages))
}

/// Convert an uploaded file, capturing any failure as data
///
/// Never returns an error: a corrupt or unreadable PDF yields an outcome with
/// `success == false` and the parser's message.
pub fn convert_bytes(bytes: &[u8], filename: &str) -> ConversionOutcome {
    let result = extract_document(bytes, filename);
    if let Err(e) = &result {
        warn!("Failed to convert {filename}: {e}");
    }
    ConversionOutcome::from_result(filename, result)
}

/// Read and convert a PDF from disk, labeling it with the file's basename
pub fn convert_file(path: impl AsRef<Path>) -> Result<DocumentResult> {
    convert_file_with_options(path, &ConvertOptions::default())
}

pub fn convert_file_with_options(
    path: impl AsRef<Path>,
    options: &ConvertOptions,
) -> Result<DocumentResult> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    extract_document_with_options(&bytes, &filename, options)
}
