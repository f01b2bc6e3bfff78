//! Field validation and normalization rules.
//!
//! Every rule is total: an invalid value becomes `"Unknown"`, never an error.

pub mod cpf;
pub mod dates;
pub mod patterns;

pub use cpf::{format_cpf, validate_cpf, verify_cpf_check_digits, CpfValidator};
pub use dates::{parse_iso_date, validate_dob, DateValidator, DATE_FORMAT};

use crate::models::record::{
    ExtractionRecord, Field, FieldIssue, FieldIssueKind, RawModelFields, UNKNOWN,
};

/// A normalization rule for one field.
pub trait FieldRule {
    /// Canonical form of `raw`, or `None` when it fails validation.
    fn normalize(&self, raw: &str) -> Option<String>;
}

/// Free-text rule for Name and Text Language: trimmed pass-through.
pub struct TextRule;

impl FieldRule for TextRule {
    fn normalize(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

/// Trim a free-text value, mapping blank to `"Unknown"`.
pub fn validate_text(raw: &str) -> String {
    TextRule.normalize(raw).unwrap_or_else(|| UNKNOWN.to_string())
}

/// Applies the per-field rules to raw model output.
pub struct FieldValidator {
    cpf: CpfValidator,
    dob: DateValidator,
}

impl FieldValidator {
    pub fn new() -> Self {
        Self {
            cpf: CpfValidator::new(),
            dob: DateValidator::new(),
        }
    }

    /// Set CPF check-digit verification.
    pub fn with_cpf_checksum(mut self, checksum: bool) -> Self {
        self.cpf = CpfValidator::new().with_checksum(checksum);
        self
    }

    fn rule(&self, field: Field) -> &dyn FieldRule {
        match field {
            Field::Name | Field::TextLanguage => &TextRule,
            Field::Cpf => &self.cpf,
            Field::Dob => &self.dob,
        }
    }

    /// Validate every field and assemble the record.
    ///
    /// Returns the record plus one issue per field that ended up unknown.
    pub fn validate(
        &self,
        file_full_name: &str,
        raw: &RawModelFields,
    ) -> (ExtractionRecord, Vec<FieldIssue>) {
        let mut record = ExtractionRecord::unknown(file_full_name);
        let mut issues = Vec::new();

        for field in Field::ALL {
            let value = raw.get(field).trim();

            if value.is_empty() || value == UNKNOWN {
                issues.push(FieldIssue { field, kind: FieldIssueKind::Missing });
                continue;
            }

            match self.rule(field).normalize(value) {
                Some(canonical) => match field {
                    Field::Name => record.name = canonical,
                    Field::Cpf => record.cpf = canonical,
                    Field::Dob => record.dob = canonical,
                    Field::TextLanguage => record.text_language = canonical,
                },
                None => issues.push(FieldIssue {
                    field,
                    kind: FieldIssueKind::Rejected { raw: value.to_string() },
                }),
            }
        }

        (record, issues)
    }
}

impl Default for FieldValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(name: &str, cpf: &str, dob: &str, lang: &str) -> RawModelFields {
        RawModelFields {
            name: name.to_string(),
            cpf: cpf.to_string(),
            dob: dob.to_string(),
            text_language: lang.to_string(),
        }
    }

    #[test]
    fn test_validate_text() {
        assert_eq!(validate_text("  Jane Doe "), "Jane Doe");
        assert_eq!(validate_text("   "), "Unknown");
    }

    #[test]
    fn test_validate_all_fields() {
        let validator = FieldValidator::new();
        let (record, issues) = validator.validate(
            "docs/rg.jpg",
            &raw("Jane Doe", "111.222.333-44", "1990-05-14", "Portuguese"),
        );

        assert_eq!(
            record,
            ExtractionRecord {
                file_full_name: "docs/rg.jpg".to_string(),
                text_language: "Portuguese".to_string(),
                name: "Jane Doe".to_string(),
                cpf: "11122233344".to_string(),
                dob: "1990-05-14".to_string(),
            }
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_validate_reports_issues() {
        let validator = FieldValidator::new();
        let (record, issues) = validator.validate(
            "docs/cnh.png",
            &raw("Jane Doe", "123", "14/05/1990", "Unknown"),
        );

        assert_eq!(record.name, "Jane Doe");
        assert_eq!(record.cpf, "Unknown");
        assert_eq!(record.dob, "Unknown");
        assert_eq!(record.text_language, "Unknown");
        assert_eq!(
            issues,
            vec![
                FieldIssue { field: Field::Cpf, kind: FieldIssueKind::Rejected { raw: "123".to_string() } },
                FieldIssue {
                    field: Field::Dob,
                    kind: FieldIssueKind::Rejected { raw: "14/05/1990".to_string() },
                },
                FieldIssue { field: Field::TextLanguage, kind: FieldIssueKind::Missing },
            ]
        );
    }

    #[test]
    fn test_validate_with_checksum() {
        let validator = FieldValidator::new().with_cpf_checksum(true);
        let (record, _) = validator.validate(
            "a.jpg",
            &raw("A", "111.222.333-44", "1990-05-14", "Portuguese"),
        );
        assert_eq!(record.cpf, "Unknown");

        let (record, _) = validator.validate(
            "b.jpg",
            &raw("B", "529.982.247-25", "1990-05-14", "Portuguese"),
        );
        assert_eq!(record.cpf, "52998224725");
    }
}
