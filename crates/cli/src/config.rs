//! Console configuration loading

use anyhow::Result;
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};
use storefront_core::{StorefrontConfig, ValidateConfig};

const CONFIG_FILE_NAME: &str = "config.toml";

/// `$STOREFRONT_DATA_DIR` is handled by clap; this is the platform fallback
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("storefront")
}

/// Layer defaults, the config file, `STOREFRONT_*` variables and the
/// command-line URL override, then validate the result
pub fn load_config(
    path: Option<&Path>,
    data_dir: &Path,
    api_url: Option<String>,
) -> Result<StorefrontConfig> {
    let mut builder =
        Config::builder().add_source(Config::try_from(&StorefrontConfig::default())?);

    builder = match path {
        Some(path) => builder.add_source(File::from(path)),
        None => builder.add_source(File::from(data_dir.join(CONFIG_FILE_NAME)).required(false)),
    };

    builder = builder.add_source(Environment::with_prefix("STOREFRONT").try_parsing(true));

    if let Some(url) = api_url {
        builder = builder.set_override("api_base_url", url)?;
    }

    let config: StorefrontConfig = builder.build()?.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
