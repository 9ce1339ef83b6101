//! # Conductor Config
//!
//! TOML configuration for the workflow engine, the model gateway and the
//! approval gate.

mod detect;
mod error;
mod loader;
mod schema;
mod validator;

pub use detect::{DetectedProvider, detect_providers, merge_detected};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
