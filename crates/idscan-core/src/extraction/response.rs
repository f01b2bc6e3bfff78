//! Parser for the model's labeled four-line answer.

use crate::models::record::{Field, RawModelFields, UNKNOWN};

/// Outcome of parsing one model answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    /// Field values as written by the model, unvalidated.
    pub fields: RawModelFields,
    /// Number of lines that matched a label.
    pub matched_lines: usize,
    /// Fields whose label appeared more than once (last one kept).
    pub duplicates: Vec<Field>,
}

impl ParsedResponse {
    /// True when at least one labeled line was found.
    pub fn is_structured(&self) -> bool {
        self.matched_lines > 0
    }
}

/// Parse a model answer into raw fields.
///
/// Labels are tried in the order `Name:`, `CPF:`, `DOB:`, `Text Language:`
/// against each line, case-sensitive, ignoring leading whitespace. The value
/// is what follows the first `": "`, trimmed. A repeated label overwrites the
/// earlier value. Fields never seen stay `"Unknown"`.
pub fn parse_response(text: &str) -> ParsedResponse {
    let mut fields = RawModelFields::default();
    let mut seen: Vec<Field> = Vec::new();
    let mut duplicates = Vec::new();
    let mut matched_lines = 0;

    for line in text.lines() {
        let line = line.trim_start();

        let Some(field) = Field::ALL.into_iter().find(|f| line.starts_with(f.label())) else {
            continue;
        };

        matched_lines += 1;
        if seen.contains(&field) {
            if !duplicates.contains(&field) {
                duplicates.push(field);
            }
        } else {
            seen.push(field);
        }

        fields.set(field, line_value(line, field));
    }

    ParsedResponse {
        fields,
        matched_lines,
        duplicates,
    }
}

fn line_value(line: &str, field: Field) -> String {
    let value = match line.split_once(": ") {
        Some((_, rest)) => rest,
        // "Name:Jane" has no separator; take what follows the label
        None => &line[field.label().len()..],
    };

    let value = value.trim();
    if value.is_empty() {
        UNKNOWN.to_string()
    } else {
        value.to_string()
    }
}
