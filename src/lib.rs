//! Image Manipulation API.
//!
//! A small HTTP service that rotates, resizes, or grayscales an uploaded
//! image and returns the result in the same format.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ── multipart POST ──▶ http::server (middleware stack)
//!                                      │
//!                                      ▼
//!                                 http::handlers ── validate angle/width/height
//!                                      │
//!                                      ▼
//!                                 http::form ── extract `image` bytes
//!                                      │
//!                                      ▼
//!                                 imaging ── decode → transform → encode
//!                                      │        (blocking thread)
//!     Client ◀── image/<fmt> bytes ────┘
//!
//!     Cross-cutting: config, observability (tracing + metrics), lifecycle
//! ```

pub mod config;
pub mod http;
pub mod imaging;
pub mod lifecycle;
pub mod observability;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
