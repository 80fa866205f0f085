//! Configuration
//!
//! Board-agnostic configuration types, the embedded TOML subset parser and
//! validation against the compile-time ring geometry.

pub mod toml;
pub mod types;
pub mod validate;

pub use self::toml::{parse_config, ParseError, ParseErrorKind};
pub use types::*;
pub use validate::{ConfigError, ConfigWarning, Warnings, MAX_WARNINGS};
