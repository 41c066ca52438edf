use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Parse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Page limit must be at least 1")]
    InvalidPageLimit,
}

impl From<oxidize_pdf::parser::ParseError> for ConvertError {
    fn from(err: oxidize_pdf::parser::ParseError) -> Self {
        ConvertError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
