use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, DefaultBodyLimit, FromRequest, Multipart, Request},
    handler::HandlerWithoutStateExt,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
        },
        StatusCode,
    },
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use pdfjson::{
    convert_bytes, create_zip_package, encode_base64, BatchDownloadRequest, ConversionOutcome,
    ConvertError,
};
use serde::{Deserialize, Serialize};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;

/// Multipart field carrying uploaded PDFs
pub const UPLOAD_FIELD: &str = "files[]";

/// Response for a batch download request
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchDownloadResponse {
    pub success: bool,
    /// Standard base64 of the ZIP archive
    pub zip_base64: String,
}

/// Standard error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message describing what went wrong
    pub error: String,
}

/// Request-level failures
///
/// Per-file conversion errors never show up here; they are reported inside
/// the `200` response body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Unknown route, unsupported method, or a body `/convert` cannot handle
    #[error("Not Found")]
    NotFound,
    /// Request body exceeded the configured upload limit
    #[error("Payload Too Large")]
    PayloadTooLarge,
    /// Building the download archive failed
    #[error("Failed to build archive: {0}")]
    Package(#[from] ConvertError),
}

impl AppError {
    fn from_multipart(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            debug!("Rejecting malformed multipart body: {err}");
            AppError::NotFound
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            AppError::NotFound => not_found_response(),
            AppError::PayloadTooLarge => {
                (StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large").into_response()
            }
            AppError::Package(_) => {
                let error_response = ErrorResponse { error: message };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [(ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
                    Json(error_response),
                )
                    .into_response()
            }
        }
    }
}

/// Build the application router with all routes configured
///
/// `/convert` handles uploads and batch downloads; every other path is served
/// from `config.public_root`, with `/` resolving to its `index.html`.
pub fn app(config: &ServerConfig) -> Router {
    let static_files = ServeDir::new(&config.public_root)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(not_found.into_service());

    Router::new()
        .route(
            "/convert",
            post(convert).options(preflight).fallback(not_found),
        )
        .fallback_service(static_files)
        .layer(DefaultBodyLimit::max(config.upload_limit))
        .layer(TraceLayer::new_for_http())
}

/// Plain `404 Not Found` for anything the server does not handle
pub async fn not_found() -> Response {
    not_found_response()
}

fn not_found_response() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

/// CORS preflight for `/convert`
pub async fn preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
            (ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
}

/// `POST /convert`, dispatched on the request's media type
pub async fn convert(request: Request) -> Result<Response, AppError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(media_type)
        .unwrap_or_default();

    match content_type.as_str() {
        "multipart/form-data" => {
            let multipart = Multipart::from_request(request, &()).await.map_err(|e| {
                debug!("Rejecting multipart request: {e}");
                AppError::NotFound
            })?;
            convert_uploads(multipart).await
        }
        "application/json" => {
            let body = Bytes::from_request(request, &()).await.map_err(|e| {
                if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    AppError::PayloadTooLarge
                } else {
                    AppError::NotFound
                }
            })?;
            let payload: BatchDownloadRequest = serde_json::from_slice(&body).map_err(|e| {
                debug!("Rejecting JSON request: {e}");
                AppError::NotFound
            })?;
            download_all(payload)
        }
        other => {
            debug!("Unsupported content type on /convert: {other:?}");
            Err(AppError::NotFound)
        }
    }
}

/// Media type of a `Content-Type` value, lowercased and without parameters
pub(crate) fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether a multipart field name carries uploaded PDFs
pub(crate) fn is_upload_field(name: Option<&str>) -> bool {
    matches!(name, Some(UPLOAD_FIELD) | Some("files"))
}

/// Convert every uploaded file, keeping failures local to their own entry
async fn convert_uploads(mut multipart: Multipart) -> Result<Response, AppError> {
    let mut results = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(AppError::from_multipart)?
    {
        if !is_upload_field(field.name()) {
            continue;
        }
        let Some(filename) = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
        else {
            continue;
        };

        let data = field.bytes().await.map_err(AppError::from_multipart)?;
        debug!("Received {filename}: {} bytes", data.len());
        results.push(convert_upload(filename, data).await);
    }

    let succeeded = results.iter().filter(|r| r.success).count();
    info!(
        "Converted {} uploaded files ({} succeeded)",
        results.len(),
        succeeded
    );

    Ok(json_response(results))
}

/// Run one conversion on the blocking pool
///
/// A panic inside the PDF parser is reported as a failure for this file only.
async fn convert_upload(filename: String, data: Bytes) -> ConversionOutcome {
    let label = filename.clone();
    match tokio::task::spawn_blocking(move || convert_bytes(&data, &filename)).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("Conversion of {label} aborted: {e}");
            ConversionOutcome::failure(label, format!("Conversion aborted: {e}"))
        }
    }
}

fn download_all(payload: BatchDownloadRequest) -> Result<Response, AppError> {
    if !payload.is_download_all() {
        debug!("Unknown /convert action: {:?}", payload.action);
        return Err(AppError::NotFound);
    }

    let entries = payload.entries();
    let archive = create_zip_package(&entries)?;
    info!(
        "Packaged {} entries into a {} byte archive",
        entries.len(),
        archive.len()
    );

    Ok(json_response(BatchDownloadResponse {
        success: true,
        zip_base64: encode_base64(&archive),
    }))
}

fn json_response<T: Serialize>(body: T) -> Response {
    ([(ACCESS_CONTROL_ALLOW_ORIGIN, "*")], Json(body)).into_response()
}
