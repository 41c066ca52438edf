//! # pdfjson
//!
//! Extracts the text of each page of a PDF into a JSON document and bundles
//! converted documents into ZIP archives.
//!
//! ## Features
//!
//! - **Per-page extraction**: text, word count and character count for every page
//! - **Failure as data**: batch conversion reports broken files instead of aborting
//! - **Packaging**: one pretty-printed `.json` member per document, deflate-compressed
//!
//! PDF parsing itself is done by [`oxidize_pdf`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfjson::{convert_bytes, create_zip_package, PackageEntry};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("report.pdf")?;
//! let outcome = convert_bytes(&bytes, "report.pdf");
//!
//! if let Some(data) = outcome.data {
//!     println!("{} pages", data.total_pages);
//!     let archive = create_zip_package(&[PackageEntry::new(
//!         "report.pdf",
//!         serde_json::to_value(&data)?,
//!     )])?;
//!     std::fs::write("report.zip", archive)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod convert;
pub mod error;
pub mod model;
pub mod package;

pub use convert::{
    convert_bytes, convert_file, convert_file_with_options, extract_document,
    extract_document_with_options, ConvertOptions,
};
pub use error::{ConvertError, Result};
pub use model::{count_characters, count_words, ConversionOutcome, DocumentResult, PageRecord};
pub use package::{
    archive_member_name, create_zip_package, encode_base64, BatchDownloadRequest, PackageEntry,
    DOWNLOAD_ALL_ACTION,
};

/// Current version of pdfjson
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
