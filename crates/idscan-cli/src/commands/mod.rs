//! Subcommands and the pieces they share.

pub mod batch;
pub mod config;
pub mod output;
pub mod process;

use std::path::{Path, PathBuf};

use tracing::debug;

use idscan_core::{
    Extractor, HttpVisionModel, IdscanConfig, JpegImagePreparer, PureOcrService,
};

/// Extractor wired to the local OCR engine and the HTTP model client.
pub type DefaultExtractor = Extractor<PureOcrService, JpegImagePreparer, HttpVisionModel>;

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("idscan")
        .join("config.json")
}

/// Load the config named on the command line, else the default file, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<IdscanConfig> {
    if let Some(path) = config_path {
        return Ok(IdscanConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config from {}", default_path.display());
        Ok(IdscanConfig::from_file(&default_path)?)
    } else {
        Ok(IdscanConfig::default())
    }
}

/// Construct the service clients. Fails before any document is touched.
pub fn build_extractor(config: &IdscanConfig) -> anyhow::Result<DefaultExtractor> {
    let ocr = PureOcrService::from_config(&config.ocr)
        .map_err(|e| anyhow::anyhow!("Failed to load OCR models: {}", e))?;

    let model = HttpVisionModel::from_config(&config.model)
        .map_err(|e| anyhow::anyhow!("Failed to set up model client: {}", e))?;

    let preparer = JpegImagePreparer::from_config(&config.image);

    Ok(Extractor::new(ocr, preparer, model).with_config(config))
}
