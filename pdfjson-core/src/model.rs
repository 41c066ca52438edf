//! JSON document model produced by conversion
//!
//! Every value here is serialized as-is into HTTP responses and output files,
//! so field names are part of the public format.

use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

/// Text extracted from a single page, with derived counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// 1-based position of the page in the document
    pub page_number: usize,
    /// Extracted text, empty when the page has no text layer
    pub content: String,
    /// Number of whitespace-delimited tokens in `content`
    pub word_count: usize,
    /// Number of characters (Unicode scalar values) in `content`
    pub character_count: usize,
}

impl PageRecord {
    /// Build a record, deriving both counts from `content`
    pub fn new(page_number: usize, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            page_number,
            word_count: count_words(&content),
            character_count: count_characters(&content),
            content,
        }
    }
}

/// Number of whitespace-delimited tokens
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Number of characters, counted as Unicode scalar values rather than bytes
pub fn count_characters(text: &str) -> usize {
    text.chars().count()
}

/// All pages extracted from one PDF
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentResult {
    pub filename: String,
    pub total_pages: usize,
    pub pages: Vec<PageRecord>,
}

impl DocumentResult {
    pub fn new(filename: impl Into<String>, pages: Vec<PageRecord>) -> Self {
        Self {
            filename: filename.into(),
            total_pages: pages.len(),
            pages,
        }
    }

    /// Sum of word counts across all pages
    pub fn total_words(&self) -> usize {
        self.pages.iter().map(|p| p.word_count).sum()
    }

    /// Sum of character counts across all pages
    pub fn total_characters(&self) -> usize {
        self.pages.iter().map(|p| p.character_count).sum()
    }
}

/// Per-file entry of a batch conversion response
///
/// Serializes as `{filename, success: true, data}` on success and
/// `{filename, success: false, error}` on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionOutcome {
    pub filename: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DocumentResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConversionOutcome {
    pub fn success(data: DocumentResult) -> Self {
        Self {
            filename: data.filename.clone(),
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(filename: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Fold a conversion result into an outcome labeled with `filename`
    pub fn from_result(
        filename: impl Into<String>,
        result: Result<DocumentResult, ConvertError>,
    ) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(e) => Self::failure(filename, e.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}
