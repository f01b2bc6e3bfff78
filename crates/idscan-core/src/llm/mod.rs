//! Vision language model seam.

#[cfg(feature = "native")]
mod http;

#[cfg(feature = "native")]
pub use http::HttpVisionModel;

use async_trait::async_trait;

use crate::error::ModelError;
use crate::extraction::prompt::GenerationParams;
use crate::imaging::PreparedImage;

/// One image plus one instruction, answered with free text.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub image: PreparedImage,
    pub prompt: String,
    pub params: GenerationParams,
}

/// A model that answers an image-and-prompt request.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Send the request and return the text of the answer.
    async fn complete(&self, request: &ModelRequest) -> Result<String, ModelError>;
}
