//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → MainConfig (validated, immutable)
//!     → handed to ShutdownCoordinator at construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_config_from_str, ConfigError};
pub use schema::{LogFormat, LoggingConfig, MainConfig, SignalConfig};
pub use validation::{validate_config, ValidationError};
