//! Data models and configuration.

pub mod config;
pub mod record;

pub use config::IdscanConfig;
pub use record::{ExtractionRecord, Field, FieldIssue, FieldIssueKind, RawModelFields, UNKNOWN};
