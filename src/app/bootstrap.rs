use std::path::{Path, PathBuf};

use crate::app::controller::AppController;
use crate::config::{load_config, validate_config};
use crate::error::Result;

/// Load configuration, apply the store override and build the controller.
pub fn controller(config_path: &Path, store_override: Option<PathBuf>) -> Result<AppController> {
    let mut config = load_config(config_path)?;
    if let Some(path) = store_override {
        config.store_path = path;
        validate_config(&config)?;
    }
    AppController::new(config)
}
