//! Error types for the idscan-core library.

use thiserror::Error;

/// Main error type for the idscan library.
#[derive(Error, Debug)]
pub enum IdscanError {
    /// OCR service error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Image could not be prepared for the language model.
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Language model invocation error.
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// Image decoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a failed extraction, used for batch summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// OCR or model call failed.
    UpstreamService,
    /// Image could not be encoded within the transport limit.
    Encoding,
    /// The document itself could not be read or decoded.
    Input,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::UpstreamService => "upstream_service",
            FailureKind::Encoding => "encoding",
            FailureKind::Input => "input",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IdscanError {
    /// Classify the error for reporting.
    pub fn kind(&self) -> FailureKind {
        match self {
            IdscanError::Ocr(_) | IdscanError::Model(_) => FailureKind::UpstreamService,
            IdscanError::Encoding(_) => FailureKind::Encoding,
            IdscanError::Image(_) | IdscanError::Io(_) => FailureKind::Input,
        }
    }
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The OCR service rejected or failed on the image.
    #[error("text detection failed: {0}")]
    Detection(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors related to preparing an image for the model transport.
#[derive(Error, Debug)]
pub enum EncodingError {
    /// The image could not be decoded or re-encoded.
    #[error("image codec error: {0}")]
    Codec(#[from] image::ImageError),

    /// Re-encoding stopped at the quality floor without fitting the limit.
    #[error("image does not fit in {limit} bytes even at quality {quality}")]
    ExceedsLimit { limit: usize, quality: u8 },
}

/// Errors related to the language model service.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Client construction failed (missing key, bad endpoint).
    #[error("model client setup failed: {0}")]
    Setup(String),

    /// The request could not be sent or the response could not be read.
    #[error("request failed: {0}")]
    Request(String),

    /// The service returned a non-success status.
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The answer contained none of the labeled lines.
    #[error("answer contains no labeled fields")]
    UnstructuredAnswer,
}

/// Result type for the idscan library.
pub type Result<T> = std::result::Result<T, IdscanError>;
