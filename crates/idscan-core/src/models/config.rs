//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the idscan pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdscanConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Image preparation configuration.
    pub image: ImageConfig,

    /// Language model configuration.
    pub model: ModelConfig,

    /// Field validation configuration.
    pub extraction: ExtractionConfig,

    /// Batch processing configuration.
    pub batch: BatchConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Keep `[UNK]` tokens in recognized text instead of blanking them.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            keep_unk: false,
        }
    }
}

impl OcrConfig {
    /// Get full path to an OCR model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.model_dir.join(model_name)
    }
}

/// Image preparation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Ceiling for the base64 payload, in bytes of encoded text.
    pub max_encoded_bytes: usize,

    /// First JPEG quality tried when re-encoding.
    pub initial_quality: u8,

    /// Quality decrement between attempts.
    pub quality_step: u8,

    /// Lowest quality allowed before giving up.
    pub min_quality: u8,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_encoded_bytes: 5 * 1024 * 1024,
            initial_quality: 95,
            quality_step: 5,
            min_quality: 20,
        }
    }
}

/// Wire format spoken by the model endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelApi {
    /// Messages API with base64 image blocks.
    Anthropic,
    /// Chat completions API with data-URI images.
    Openai,
}

/// Language model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Wire format of the endpoint.
    pub api: ModelApi,

    /// Base URL of the endpoint (without the API path).
    pub base_url: String,

    /// Model identifier sent with each request.
    pub model: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Value of the `anthropic-version` header.
    pub anthropic_version: String,

    /// Output token ceiling.
    pub max_tokens: u32,

    /// Sampling temperature.
    pub temperature: f32,

    /// Nucleus sampling mass.
    pub top_p: f32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api: ModelApi::Anthropic,
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-3-5-sonnet-20241022".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            anthropic_version: "2023-06-01".to_string(),
            max_tokens: 1000,
            temperature: 0.0,
            top_p: 1.0,
            timeout_secs: 120,
        }
    }
}

/// Field validation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Also verify the two CPF check digits, not only the digit count.
    pub verify_cpf_check_digits: bool,
}

/// Batch processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// File extensions treated as document images (lowercase, no dot).
    pub extensions: Vec<String>,

    /// Documents processed concurrently. Output order is unaffected.
    pub jobs: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            extensions: ["png", "jpg", "jpeg", "gif", "bmp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            jobs: 1,
        }
    }
}

impl BatchConfig {
    /// Check whether a path has one of the configured extensions.
    pub fn accepts(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .is_some_and(|e| self.extensions.iter().any(|x| *x == e))
    }
}

impl IdscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
