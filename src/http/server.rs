//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up middleware (request ID, access log, metrics, panic recovery, body limit)
//! - Serve API docs when enabled
//! - Bind server to listener and shut down gracefully

use axum::{
    extract::DefaultBodyLimit,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::any::Any;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{DocsConfig, LimitsConfig, ServiceConfig};
use crate::http::error::ApiError;
use crate::http::request::{request_span, MakeRequestUuid};
use crate::http::{docs, handlers};
use crate::lifecycle::{signals, ShutdownSignal};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub limits: LimitsConfig,
    pub docs: DocsConfig,
}

impl AppState {
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            limits: config.limits.clone(),
            docs: config.docs.clone(),
        }
    }
}

/// HTTP server for the image API.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig) -> Self {
        let router = build_router(&config);
        Self { router, config }
    }

    /// A clone of the fully layered router, for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Run the server until an OS signal or `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            docs = self.config.docs.enabled,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = signals::terminate() => {}
                    _ = shutdown.recv() => {
                        tracing::info!("Shutdown triggered");
                    }
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(config: &ServiceConfig) -> Router {
    let state = AppState::from_config(config);

    let mut router = Router::new()
        .route("/ping", get(handlers::ping))
        .route("/rotate", post(handlers::rotate))
        .route("/resize", post(handlers::resize))
        .route("/grayscale", post(handlers::grayscale));

    if config.docs.enabled {
        router = router
            .route("/docs", get(docs::swagger_ui_handler))
            .route("/openapi.json", get(docs::openapi_spec_handler));
    }

    // Outermost first: the request id exists before the access log span opens,
    // and panics are turned into responses before metrics see them.
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(axum::middleware::from_fn(metrics::track_metrics))
        .layer(CatchPanicLayer::custom(handle_panic));

    router
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.limits.max_body_size))
        .layer(middleware)
}

/// Convert a handler panic into the generic 500 body.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    ApiError::Internal(format!("handler panicked: {detail}")).into_response()
}
