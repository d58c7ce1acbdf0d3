//! OpenAPI document and Swagger UI.

use axum::{
    extract::State,
    response::{Html, IntoResponse},
    Json,
};
use serde_json::{json, Value};

use crate::http::error::{PROCESSING_ERROR, UNKNOWN_ERROR};
use crate::http::handlers::{ANGLE_ERROR, DEFAULT_ANGLE, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::http::server::AppState;

/// OpenAPI specification generator for the image endpoints.
pub struct OpenApiGenerator {
    title: String,
    version: String,
}

impl OpenApiGenerator {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Generate an OpenAPI 3.1 specification.
    pub fn generate_spec(&self) -> Value {
        json!({
            "openapi": "3.1.0",
            "info": {
                "title": self.title,
                "version": self.version,
                "description": "Rotate, resize and grayscale uploaded images. \
                                The response body is the transformed image in its original format."
            },
            "paths": self.generate_paths(),
            "components": {
                "schemas": {
                    "ErrorResponse": {
                        "type": "object",
                        "required": ["error"],
                        "properties": {
                            "error": { "type": "string" }
                        }
                    }
                }
            },
            "tags": [
                { "name": "Images", "description": "Single-step image transforms" },
                { "name": "Health", "description": "Liveness probe" }
            ]
        })
    }

    fn generate_paths(&self) -> Value {
        json!({
            "/ping": {
                "get": {
                    "tags": ["Health"],
                    "summary": "Liveness probe",
                    "responses": {
                        "200": {
                            "description": "Service is up",
                            "content": { "text/plain": { "example": "pong" } }
                        }
                    }
                }
            },
            "/rotate": {
                "post": self.transform_operation(
                    "Rotate an image clockwise",
                    json!({
                        "angle": {
                            "type": "integer",
                            "enum": [90, 180, 270],
                            "default": DEFAULT_ANGLE
                        }
                    }),
                    Some(ANGLE_ERROR),
                )
            },
            "/resize": {
                "post": self.transform_operation(
                    "Resize an image to exact dimensions",
                    json!({
                        "width": { "type": "integer", "minimum": 1, "default": DEFAULT_WIDTH },
                        "height": { "type": "integer", "minimum": 1, "default": DEFAULT_HEIGHT }
                    }),
                    Some("invalid width value"),
                )
            },
            "/grayscale": {
                "post": self.transform_operation(
                    "Convert an image to grayscale",
                    json!({}),
                    None,
                )
            }
        })
    }

    fn transform_operation(
        &self,
        summary: &str,
        extra_fields: Value,
        bad_request_example: Option<&str>,
    ) -> Value {
        let mut properties = json!({
            "image": { "type": "string", "format": "binary" }
        });
        if let (Some(props), Some(extra)) = (properties.as_object_mut(), extra_fields.as_object()) {
            for (name, schema) in extra {
                props.insert(name.clone(), schema.clone());
            }
        }

        let mut responses = json!({
            "200": {
                "description": "Transformed image",
                "content": { "image/*": { "schema": { "type": "string", "format": "binary" } } }
            },
            "500": error_response(
                &format!("Missing upload, or '{PROCESSING_ERROR}' when the transform fails"),
                UNKNOWN_ERROR,
            )
        });
        if let Some(example) = bad_request_example {
            responses["400"] = error_response("Invalid form parameter", example);
        }

        json!({
            "tags": ["Images"],
            "summary": summary,
            "requestBody": {
                "required": true,
                "content": {
                    "multipart/form-data": {
                        "schema": {
                            "type": "object",
                            "required": ["image"],
                            "properties": properties
                        }
                    }
                }
            },
            "responses": responses
        })
    }
}

fn error_response(description: &str, example: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" },
                "example": { "error": example }
            }
        }
    })
}

/// Handler for serving the OpenAPI specification.
pub async fn openapi_spec_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(OpenApiGenerator::new(state.docs.title.clone()).generate_spec())
}

/// Handler for serving Swagger UI.
pub async fn swagger_ui_handler(State(state): State<AppState>) -> impl IntoResponse {
    Html(SWAGGER_UI.replace("{{title}}", &state.docs.title))
}

const SWAGGER_UI: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{title}}</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5.9.0/swagger-ui.css" />
    <style>
        body { margin: 0; background: #fafafa; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5.9.0/swagger-ui-bundle.js"></script>
    <script>
        window.onload = function() {
            SwaggerUIBundle({
                url: '/openapi.json',
                dom_id: '#swagger-ui',
                deepLinking: true,
                tryItOutEnabled: true
            });
        };
    </script>
</body>
</html>
"#;
