//! Command implementations.

mod info;
mod run;
mod validate;

pub use info::run_info;
pub use run::run_pipeline;
pub use validate::run_validate;

use anyhow::{Context, Result};
use contracts::RangerBlueprint;
use std::path::Path;
use tracing::info;

/// Load the blueprint from `path`, or fall back to the built-in defaults
pub(crate) fn load_blueprint(path: Option<&Path>) -> Result<RangerBlueprint> {
    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            config_loader::ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        None => {
            info!("No configuration file given, using built-in defaults");
            Ok(config_loader::ConfigLoader::defaults())
        }
    }
}
