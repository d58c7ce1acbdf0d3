//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, access log span)
//!     → handlers.rs (parameter validation)
//!     → form.rs (multipart extraction)
//!     → imaging (decode, transform, encode on a blocking thread)
//!     → error.rs (failures mapped to JSON bodies)
//!     → Send to client
//! ```

pub mod docs;
pub mod error;
pub mod form;
pub mod handlers;
pub mod request;
pub mod server;

pub use error::{ApiError, ApiResult};
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{build_router, AppState, HttpServer};
