//! Core library for identity-document field extraction.
//!
//! This crate provides:
//! - Field validation for CPF numbers and dates of birth
//! - Prompt building and parsing of the vision model's labeled answer
//! - The per-document extraction pipeline (OCR, image preparation, model call)
//! - A batch driver that emits exactly one record per document

pub mod batch;
pub mod error;
pub mod extraction;
pub mod imaging;
pub mod llm;
pub mod models;
pub mod ocr;

pub use batch::{BatchDriver, BatchSummary, DocumentSource, FileListSource};
pub use error::{FailureKind, IdscanError, Result};
pub use extraction::{ExtractionOutcome, Extractor, FieldValidator, GenerationParams};
pub use imaging::{ImagePreparer, JpegImagePreparer, PreparedImage};
pub use llm::{ModelRequest, VisionModel};
pub use models::config::IdscanConfig;
pub use models::record::{ExtractionRecord, Field, RawModelFields, UNKNOWN};
pub use ocr::OcrService;

#[cfg(feature = "native")]
pub use llm::HttpVisionModel;
#[cfg(feature = "native")]
pub use ocr::PureOcrService;
