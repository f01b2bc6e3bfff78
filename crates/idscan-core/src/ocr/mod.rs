//! OCR service seam.

#[cfg(feature = "native")]
mod pure_engine;

#[cfg(feature = "native")]
pub use pure_engine::PureOcrService;

use crate::error::OcrError;

/// Anything that turns raw image bytes into text lines.
pub trait OcrService {
    /// Recognize line-level text, in the order the engine reports it.
    fn recognize_lines(&self, image: &[u8]) -> Result<Vec<String>, OcrError>;
}

/// Join recognized lines into the OCR text handed to the prompt.
///
/// Order is preserved as returned; lines are not re-sorted.
pub fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(|l| l.as_ref())
        .collect::<Vec<_>>()
        .join("\n")
}
