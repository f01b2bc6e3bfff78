//! Extraction record and the intermediate field mapping.

use serde::{Deserialize, Serialize};

/// Sentinel for a field that could not be determined.
pub const UNKNOWN: &str = "Unknown";

/// The final, validated record for one document.
///
/// Every field holds either a canonical value or [`UNKNOWN`]. Serialization
/// keeps the key order `fileFullName`, `textLanguage`, `Name`, `CPF`, `DOB`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    /// Identifier of the source document (usually its path).
    #[serde(rename = "fileFullName")]
    pub file_full_name: String,

    /// Primary language of the document text.
    #[serde(rename = "textLanguage")]
    pub text_language: String,

    /// Full name of the document holder.
    #[serde(rename = "Name")]
    pub name: String,

    /// CPF as 11 digits.
    #[serde(rename = "CPF")]
    pub cpf: String,

    /// Date of birth as `YYYY-MM-DD`.
    #[serde(rename = "DOB")]
    pub dob: String,
}

impl ExtractionRecord {
    /// Record with every field unknown except the document identifier.
    pub fn unknown(file_full_name: impl Into<String>) -> Self {
        Self {
            file_full_name: file_full_name.into(),
            text_language: UNKNOWN.to_string(),
            name: UNKNOWN.to_string(),
            cpf: UNKNOWN.to_string(),
            dob: UNKNOWN.to_string(),
        }
    }

    /// True when no field besides the identifier was determined.
    pub fn is_all_unknown(&self) -> bool {
        [&self.text_language, &self.name, &self.cpf, &self.dob]
            .iter()
            .all(|v| v.as_str() == UNKNOWN)
    }

    /// Value of a model field.
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Cpf => &self.cpf,
            Field::Dob => &self.dob,
            Field::TextLanguage => &self.text_language,
        }
    }
}

/// One of the four fields the model is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Name,
    Cpf,
    Dob,
    TextLanguage,
}

impl Field {
    /// All fields in answer-label priority order.
    pub const ALL: [Field; 4] = [Field::Name, Field::Cpf, Field::Dob, Field::TextLanguage];

    /// Line label in the model answer, including the colon.
    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Name:",
            Field::Cpf => "CPF:",
            Field::Dob => "DOB:",
            Field::TextLanguage => "Text Language:",
        }
    }

    /// Key used in the serialized record.
    pub fn record_key(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Cpf => "CPF",
            Field::Dob => "DOB",
            Field::TextLanguage => "textLanguage",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.record_key())
    }
}

/// Unvalidated field values taken from the model answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawModelFields {
    pub name: String,
    pub cpf: String,
    pub dob: String,
    pub text_language: String,
}

impl Default for RawModelFields {
    fn default() -> Self {
        Self {
            name: UNKNOWN.to_string(),
            cpf: UNKNOWN.to_string(),
            dob: UNKNOWN.to_string(),
            text_language: UNKNOWN.to_string(),
        }
    }
}

impl RawModelFields {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Cpf => &self.cpf,
            Field::Dob => &self.dob,
            Field::TextLanguage => &self.text_language,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Cpf => &mut self.cpf,
            Field::Dob => &mut self.dob,
            Field::TextLanguage => &mut self.text_language,
        };
        *slot = value.into();
    }
}

/// A field-local problem that degraded one value to [`UNKNOWN`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: Field,
    pub kind: FieldIssueKind,
}

/// Why a field ended up unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldIssueKind {
    /// The answer had no line for this field, or the model said `Unknown`.
    Missing,
    /// A value was present but failed format validation.
    Rejected { raw: String },
}

impl std::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            FieldIssueKind::Missing => write!(f, "{}: missing", self.field),
            FieldIssueKind::Rejected { raw } => write!(f, "{}: rejected {:?}", self.field, raw),
        }
    }
}
