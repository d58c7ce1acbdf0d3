//! Route handlers.
//!
//! Each transform handler reads the form, validates its own parameters, and
//! hands the upload to [`process_upload`]. Parameter errors win over a
//! missing image because validation runs first. Parameters are looked up in
//! the query string before the form body.

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::QueryRejection,
        Query, State,
    },
    http::{header, Method, Uri},
    response::{IntoResponse, Response},
};
use std::time::{Duration, Instant};

use crate::http::error::{ApiError, ApiResult};
use crate::http::form::UploadForm;
use crate::http::server::AppState;
use crate::imaging::{self, Angle, Operation};

pub const DEFAULT_ANGLE: i64 = 180;
pub const DEFAULT_WIDTH: u32 = 300;
pub const DEFAULT_HEIGHT: u32 = 300;

pub const ANGLE_ERROR: &str = "angle value must be 90, 180 or 270";

/// Liveness probe.
pub async fn ping() -> &'static str {
    "pong"
}

/// `POST /rotate` with optional `angle` (90, 180 or 270, default 180).
pub async fn rotate(
    query: Result<Query<QueryPairs>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Response> {
    let form = read_form(query, multipart).await;
    let angle = parse_angle(form.value("angle"))?;

    process_upload(form, Operation::Rotate(angle)).await
}

/// `POST /resize` with optional `width` and `height` (default 300 each).
pub async fn resize(
    State(state): State<AppState>,
    query: Result<Query<QueryPairs>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Response> {
    let form = read_form(query, multipart).await;
    let max = state.limits.max_dimension;
    let width = parse_dimension(form.value("width"), DEFAULT_WIDTH, "width", max)?;
    let height = parse_dimension(form.value("height"), DEFAULT_HEIGHT, "height", max)?;

    process_upload(form, Operation::Resize { width, height }).await
}

/// `POST /grayscale`.
pub async fn grayscale(multipart: Result<Multipart, MultipartRejection>) -> ApiResult<Response> {
    let form = UploadForm::read(multipart).await;

    process_upload(form, Operation::Grayscale).await
}

/// JSON 405 for a known path hit with the wrong method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// JSON 404 for anything not routed.
pub async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::NotFound {
        method,
        path: uri.path().to_string(),
    }
}

/// Query string parameters in arrival order.
type QueryPairs = Vec<(String, String)>;

/// Read the multipart body and attach the query string.
///
/// A query string that fails to parse contributes nothing.
async fn read_form(
    query: Result<Query<QueryPairs>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> UploadForm {
    let pairs = match query {
        Ok(Query(pairs)) => pairs,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Ignoring malformed query string");
            Vec::new()
        }
    };

    UploadForm::read(multipart).await.with_query(pairs)
}

fn parse_angle(raw: Option<&str>) -> ApiResult<Angle> {
    let invalid = || ApiError::Validation(ANGLE_ERROR.to_string());

    let degrees = match raw {
        Some(raw) => raw.parse::<i64>().map_err(|_| invalid())?,
        None => DEFAULT_ANGLE,
    };

    Angle::try_from(degrees).map_err(|_| invalid())
}

/// Must be an integer in `1..=max`.
fn parse_dimension(raw: Option<&str>, default: u32, field: &str, max: u32) -> ApiResult<u32> {
    let invalid = || ApiError::Validation(format!("invalid {field} value"));

    let value = match raw {
        Some(raw) => raw.parse::<i64>().map_err(|_| invalid())?,
        None => i64::from(default),
    };

    match u32::try_from(value) {
        Ok(value) if value > 0 && value <= max => Ok(value),
        _ => Err(invalid()),
    }
}

/// Extract the upload, run `operation` on a blocking thread, and reply with
/// the encoded bytes.
pub(crate) async fn process_upload(form: UploadForm, operation: Operation) -> ApiResult<Response> {
    let buffer = form.into_image()?;
    let input_bytes = buffer.len();
    let started = Instant::now();

    let processed = tokio::task::spawn_blocking(move || imaging::process(&buffer, &operation))
        .await
        .map_err(|e| ApiError::Internal(format!("transform task failed: {e}")))??;

    tracing::info!(
        operation = %operation,
        input_bytes,
        output_bytes = processed.bytes.len(),
        elapsed_ms = elapsed_ms(started.elapsed()),
        "Image processed"
    );

    let content_type = processed.content_type();
    Ok(([(header::CONTENT_TYPE, content_type)], processed.bytes).into_response())
}

fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::error::{PROCESSING_ERROR, UNKNOWN_ERROR};
    use crate::http::form::ExtractError;
    use axum::{body::Bytes, http::StatusCode};
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Bytes {
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        Bytes::from(buf)
    }

    #[test]
    fn test_parse_angle_default() {
        assert_eq!(parse_angle(None).unwrap(), Angle::Deg180);
    }

    #[test]
    fn test_parse_angle_accepts_quarter_turns() {
        assert_eq!(parse_angle(Some("90")).unwrap(), Angle::Deg90);
        assert_eq!(parse_angle(Some("+270")).unwrap(), Angle::Deg270);
    }

    #[test]
    fn test_parse_angle_rejects_everything_else() {
        for raw in ["0", "45", "-90", "360", "ninety", "90.0", " 90", "99999999999999999999"] {
            let err = parse_angle(Some(raw)).unwrap_err();
            assert_eq!(err.public_message(), ANGLE_ERROR, "input {raw:?}");
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_parse_dimension() {
        assert_eq!(parse_dimension(None, 300, "width", 8192).unwrap(), 300);
        assert_eq!(parse_dimension(Some("150"), 300, "width", 8192).unwrap(), 150);
        assert_eq!(parse_dimension(Some("8192"), 300, "width", 8192).unwrap(), 8192);
    }

    #[test]
    fn test_parse_dimension_names_the_field() {
        for raw in ["abc", "1.5", "0", "-1", "8193"] {
            let err = parse_dimension(Some(raw), 300, "height", 8192).unwrap_err();
            assert_eq!(err.public_message(), "invalid height value", "input {raw:?}");
        }
    }

    #[test]
    fn test_default_dimension_respects_max() {
        let err = parse_dimension(None, 300, "width", 100).unwrap_err();
        assert_eq!(err.public_message(), "invalid width value");
    }

    #[test]
    fn test_elapsed_ms_saturates() {
        assert_eq!(elapsed_ms(Duration::from_millis(1500)), 1500);
        assert_eq!(elapsed_ms(Duration::MAX), u64::MAX);
    }

    #[tokio::test]
    async fn test_process_upload_success() {
        let form = UploadForm::from_parts(&[], Ok(png_bytes(20, 10)));
        let response = process_upload(form, Operation::Rotate(Angle::Deg90))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let decoded = image::load_from_memory(&body).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (10, 20));
    }

    #[tokio::test]
    async fn test_process_upload_missing_image() {
        let form = UploadForm::from_parts(&[], Err(ExtractError::Missing));
        let err = process_upload(form, Operation::Grayscale).await.unwrap_err();

        assert!(matches!(err, ApiError::Extraction(_)));
        assert_eq!(err.public_message(), UNKNOWN_ERROR);
    }

    #[tokio::test]
    async fn test_process_upload_undecodable() {
        let form = UploadForm::from_parts(&[], Ok(Bytes::from_static(b"plain text")));
        let err = process_upload(form, Operation::Grayscale).await.unwrap_err();

        assert!(matches!(err, ApiError::Processing(_)));
        assert_eq!(err.public_message(), PROCESSING_ERROR);
    }
}
