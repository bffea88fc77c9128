use std::fs;
use std::path::Path;

use log::debug;

use crate::error::{Context, Result};

use super::{validator, Config};

/// Read a JSON config file, falling back to built-in defaults when it does not exist.
pub fn load_config(path: &Path) -> Result<Config> {
    let config = if path.exists() {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read config JSON at {}", path.display()))?;
        let config: Config = serde_json::from_str(&json)
            .with_context(|| format!("failed to parse config JSON at {}", path.display()))?;
        debug!("loaded configuration from {}", path.display());
        config
    } else {
        debug!(
            "no configuration at {}, using built-in defaults",
            path.display()
        );
        Config::builtin()
    };

    validator::validate_config(&config)?;
    Ok(config)
}
