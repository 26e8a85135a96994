//! Bridge config loader (strict parsing).

pub mod schema;

use std::fs;

use liverelay_core::error::{RelayError, Result};

pub use schema::{AvatarSection, BridgeConfig, DispatchSection, IngestSection, RelaySection};

pub fn load_from_file(path: &str) -> Result<BridgeConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| RelayError::BadConfig(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<BridgeConfig> {
    let cfg: BridgeConfig = serde_yaml::from_str(s)
        .map_err(|e| RelayError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
