//! Multipart form extraction.
//!
//! The whole form is read up front so that text fields can be validated
//! before the image is touched. Reading never fails outright: a broken or
//! missing upload is recorded and surfaces only when the image is requested.
//!
//! Parameters may also arrive in the query string; a non-empty query value
//! takes precedence over the form field of the same name.

use axum::{
    body::Bytes,
    extract::multipart::{Multipart, MultipartError, MultipartRejection},
};
use std::collections::HashMap;
use thiserror::Error;

/// Name of the file field carrying the image.
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no 'image' file in form data")]
    Missing,
    #[error("request is not multipart form data: {0}")]
    Rejected(#[from] MultipartRejection),
    #[error("failed to read form data: {0}")]
    Read(#[from] MultipartError),
}

/// Text fields and the uploaded image of one request.
#[derive(Debug)]
pub struct UploadForm {
    query: HashMap<String, String>,
    fields: HashMap<String, String>,
    image: Result<Bytes, ExtractError>,
}

impl UploadForm {
    /// Drain the multipart stream.
    ///
    /// Only the first file part named [`IMAGE_FIELD`] is kept; for text
    /// fields the first occurrence wins.
    pub async fn read(multipart: Result<Multipart, MultipartRejection>) -> Self {
        let mut multipart = match multipart {
            Ok(multipart) => multipart,
            Err(rejection) => {
                return Self {
                    query: HashMap::new(),
                    fields: HashMap::new(),
                    image: Err(rejection.into()),
                }
            }
        };

        let mut fields = HashMap::new();
        let mut image = None;
        let mut failure = None;

        loop {
            let field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            };

            let name = field.name().unwrap_or_default().to_string();
            let is_file = field.file_name().is_some();

            if is_file {
                if name != IMAGE_FIELD || image.is_some() {
                    continue;
                }
                match field.bytes().await {
                    Ok(bytes) => image = Some(bytes),
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            } else {
                match field.text().await {
                    Ok(text) => {
                        fields.entry(name).or_insert(text);
                    }
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }
        }

        let image = match (image, failure) {
            (Some(bytes), _) => Ok(bytes),
            (None, Some(e)) => Err(ExtractError::Read(e)),
            (None, None) => Err(ExtractError::Missing),
        };

        Self {
            query: HashMap::new(),
            fields,
            image,
        }
    }

    /// Attach query string parameters. The first occurrence of a name wins.
    pub fn with_query(mut self, pairs: Vec<(String, String)>) -> Self {
        for (name, value) in pairs {
            self.query.entry(name).or_insert(value);
        }
        self
    }

    /// A parameter's value, from the query string first and then the form.
    /// Empty values count as absent.
    pub fn value(&self, name: &str) -> Option<&str> {
        non_empty(&self.query, name).or_else(|| non_empty(&self.fields, name))
    }

    /// Take the uploaded image bytes.
    pub fn into_image(self) -> Result<Bytes, ExtractError> {
        self.image
    }
}

fn non_empty<'a>(map: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    map.get(name).map(String::as_str).filter(|v| !v.is_empty())
}

#[cfg(test)]
impl UploadForm {
    pub(crate) fn from_parts(
        fields: &[(&str, &str)],
        image: Result<Bytes, ExtractError>,
    ) -> Self {
        Self {
            query: HashMap::new(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        extract::FromRequest,
        http::{header, Request},
    };

    const BOUNDARY: &str = "XBOUNDARYX";

    fn multipart_request(parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, filename, data) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match filename {
                Some(filename) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(data.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn read(request: Request<Body>) -> UploadForm {
        let multipart = Multipart::from_request(request, &()).await;
        UploadForm::read(multipart).await
    }

    #[tokio::test]
    async fn test_reads_fields_and_image() {
        let form = read(multipart_request(&[
            ("angle", None, "90"),
            ("image", Some("cat.jpg"), "fake-jpeg-bytes"),
        ]))
        .await;

        assert_eq!(form.value("angle"), Some("90"));
        assert_eq!(form.into_image().unwrap(), Bytes::from_static(b"fake-jpeg-bytes"));
    }

    #[tokio::test]
    async fn test_missing_image() {
        let form = read(multipart_request(&[("width", None, "10")])).await;

        assert_eq!(form.value("width"), Some("10"));
        assert!(matches!(form.into_image(), Err(ExtractError::Missing)));
    }

    #[tokio::test]
    async fn test_text_image_field_is_not_a_file() {
        let form = read(multipart_request(&[("image", None, "not a file")])).await;
        assert!(matches!(form.into_image(), Err(ExtractError::Missing)));
    }

    #[tokio::test]
    async fn test_first_values_win() {
        let form = read(multipart_request(&[
            ("angle", None, "270"),
            ("angle", None, "90"),
            ("image", Some("a.png"), "first"),
            ("image", Some("b.png"), "second"),
        ]))
        .await;

        assert_eq!(form.value("angle"), Some("270"));
        assert_eq!(form.into_image().unwrap(), Bytes::from_static(b"first"));
    }

    #[tokio::test]
    async fn test_empty_value_is_absent() {
        let form = read(multipart_request(&[("angle", None, "")])).await;
        assert_eq!(form.value("angle"), None);
    }

    #[tokio::test]
    async fn test_query_value_wins_over_form() {
        let form = read(multipart_request(&[("angle", None, "270"), ("width", None, "40")]))
            .await
            .with_query(vec![
                ("angle".to_string(), "90".to_string()),
                ("angle".to_string(), "180".to_string()),
                ("width".to_string(), String::new()),
            ]);

        assert_eq!(form.value("angle"), Some("90"));
        // Empty query values fall through to the form.
        assert_eq!(form.value("width"), Some("40"));
        assert_eq!(form.value("height"), None);
    }

    #[tokio::test]
    async fn test_non_multipart_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();

        let form = read(request).await;
        assert_eq!(form.value("angle"), None);
        assert!(matches!(form.into_image(), Err(ExtractError::Rejected(_))));
    }
}
