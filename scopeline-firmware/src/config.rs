//! Boot-time configuration
//!
//! `scope.toml` is compiled into the image (and checked by `build.rs`).
//! Anything that still fails to parse or validate here falls back to the
//! built-in defaults.

use defmt::*;
use scopeline_core::config::{parse_config, ScopeConfig};

use crate::acquisition::{SEGMENTS, SEGMENT_LEN};

/// Embedded configuration; edit scope.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../scope.toml");

pub fn load() -> ScopeConfig {
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration");
            config
        }
        Err(e) => {
            error!("scope.toml line {}: {}", e.line, e.kind);
            error!("Using default configuration");
            return ScopeConfig::default();
        }
    };

    match config.validate::<SEGMENT_LEN, SEGMENTS>() {
        Ok(warnings) => {
            for warning in &warnings {
                warn!("Config: {}", warning);
            }
            config
        }
        Err(e) => {
            error!("Invalid configuration: {}", e);
            error!("Using default configuration");
            ScopeConfig::default()
        }
    }
}
