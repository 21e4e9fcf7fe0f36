use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::config::AppState;
use crate::interceptors::AppError;

fn cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
}

/// Stream a stored product image with permissive CORS and a long-lived cache
/// policy. Image keys never change once written, so the cached copy can live
/// for a year.
pub async fn show_image(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, AppError> {
    let bytes = state
        .storage
        .bucket
        .get(&path)
        .await
        .map_err(|_| AppError::NotFound("Image not found".to_string()))?;

    let mime = mime_guess::from_path(&path).first_or_octet_stream();

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(mime.as_ref())
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=31536000, immutable"),
    );
    cors_headers(&mut headers);

    Ok((StatusCode::OK, headers, bytes).into_response())
}

/// CORS preflight for the image endpoint.
pub async fn image_preflight() -> Response {
    let mut headers = HeaderMap::new();
    cors_headers(&mut headers);
    (StatusCode::NO_CONTENT, headers).into_response()
}
