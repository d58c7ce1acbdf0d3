//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults or TOML file (--config)
//!     → loader.rs (parse & deserialize)
//!     → .env / process environment (PORT, HOST)
//!     → CLI flags (--port)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the server starts
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{DocsConfig, LimitsConfig, ListenerConfig, ObservabilityConfig, ServiceConfig};
pub use validation::ValidationError;
