//! Image preparation for the model transport.

mod compress;

pub use compress::{flatten_on_white, JpegImagePreparer};

use serde::{Deserialize, Serialize};

use crate::error::EncodingError;

/// A base64 image ready to attach to a model request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedImage {
    /// MIME type of the encoded bytes.
    pub media_type: String,
    /// Base64 payload (standard alphabet, padded).
    pub data: String,
}

impl PreparedImage {
    /// `data:` URI form used by chat-completions style APIs.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// Anything that turns raw image bytes into a size-bounded payload.
pub trait ImagePreparer {
    fn prepare(&self, image: &[u8]) -> Result<PreparedImage, EncodingError>;
}
