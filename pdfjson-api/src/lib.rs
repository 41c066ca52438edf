//! # pdfjson-api
//!
//! HTTP front end for pdfjson: upload PDFs, get per-page JSON back, and
//! download converted results as a ZIP archive.
//!

mod api;
pub mod config;


pub use api::{
    app, convert, not_found, preflight, AppError, BatchDownloadResponse, ErrorResponse,
    UPLOAD_FIELD,
};
pub use config::ServerConfig;
