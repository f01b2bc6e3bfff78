//! CPF (Brazilian individual taxpayer number) validation.

use super::patterns::NON_DIGIT;
use super::FieldRule;
use crate::models::record::UNKNOWN;

/// CPF field validator.
pub struct CpfValidator {
    checksum: bool,
}

impl CpfValidator {
    /// Create a validator that checks the digit count only.
    pub fn new() -> Self {
        Self { checksum: false }
    }

    /// Set whether to also verify the two check digits.
    pub fn with_checksum(mut self, checksum: bool) -> Self {
        self.checksum = checksum;
        self
    }
}

impl Default for CpfValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldRule for CpfValidator {
    fn normalize(&self, raw: &str) -> Option<String> {
        let digits = NON_DIGIT.replace_all(raw, "");

        if digits.len() != 11 {
            return None;
        }

        if self.checksum && !verify_cpf_check_digits(&digits) {
            return None;
        }

        Some(digits.into_owned())
    }
}

/// Normalize a CPF to 11 digits, or `"Unknown"`.
///
/// Shape only: separators are dropped and the digit count must be 11.
pub fn validate_cpf(raw: &str) -> String {
    CpfValidator::new()
        .normalize(raw)
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Verify the CPF check digits.
///
/// First digit: weights 10..2 over the first 9 digits. Second digit:
/// weights 11..2 over the first 10. Each is `(sum * 10) % 11`, with 10
/// mapped to 0. Numbers made of one repeated digit pass the arithmetic
/// but are not issued, so they are rejected.
pub fn verify_cpf_check_digits(cpf: &str) -> bool {
    let digits: Vec<u32> = cpf
        .chars()
        .filter(|c| c.is_ascii_digit())
        .filter_map(|c| c.to_digit(10))
        .collect();

    if digits.len() != 11 {
        return false;
    }

    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    let check = |len: usize| -> u32 {
        let sum: u32 = digits
            .iter()
            .take(len)
            .zip((2..=len as u32 + 1).rev())
            .map(|(d, w)| d * w)
            .sum();
        match (sum * 10) % 11 {
            10 => 0,
            r => r,
        }
    };

    check(9) == digits[9] && check(10) == digits[10]
}

/// Format a CPF with separators (XXX.XXX.XXX-XX).
pub fn format_cpf(cpf: &str) -> String {
    let digits: String = cpf.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() != 11 {
        return cpf.to_string();
    }

    format!(
        "{}.{}.{}-{}",
        &digits[0..3],
        &digits[3..6],
        &digits[6..9],
        &digits[9..11]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_cpf_shape() {
        assert_eq!(validate_cpf("123.456.789-09"), "12345678909");
        assert_eq!(validate_cpf("12345678909"), "12345678909");
        assert_eq!(validate_cpf(" 123 456 789 09 "), "12345678909");
        assert_eq!(validate_cpf("abc"), "Unknown");
        assert_eq!(validate_cpf("123"), "Unknown");
        assert_eq!(validate_cpf("123.456.789-090"), "Unknown"); // Too long
        assert_eq!(validate_cpf("Unknown"), "Unknown");
        assert_eq!(validate_cpf(""), "Unknown");
    }

    #[test]
    fn test_validate_cpf_output_is_digits_or_unknown() {
        let inputs = [
            "111.222.333-44",
            "CPF 529.982.247-25 (titular)",
            "1a2b3c4d5e6f7g8h9i0j1",
            "١٢٣٤٥٦٧٨٩٠١", // Non-ASCII digits are stripped
            "99999999999999",
            "-",
        ];

        for input in inputs {
            let out = validate_cpf(input);
            assert!(
                out == "Unknown" || (out.len() == 11 && out.chars().all(|c| c.is_ascii_digit())),
                "unexpected output {out:?} for {input:?}"
            );
        }
    }

    #[test]
    fn test_check_digits() {
        assert!(verify_cpf_check_digits("529.982.247-25"));
        assert!(verify_cpf_check_digits("52998224725"));
        assert!(!verify_cpf_check_digits("529.982.247-24")); // Wrong second digit
        assert!(!verify_cpf_check_digits("529.982.247-15")); // Wrong first digit
        assert!(!verify_cpf_check_digits("111.111.111-11")); // Repeated digit
        assert!(!verify_cpf_check_digits("5299822472")); // Too short
    }

    #[test]
    fn test_validator_with_checksum() {
        let strict = CpfValidator::new().with_checksum(true);
        assert_eq!(strict.normalize("529.982.247-25"), Some("52998224725".to_string()));
        assert_eq!(strict.normalize("123.456.789-00"), None);

        let lenient = CpfValidator::new();
        assert_eq!(lenient.normalize("123.456.789-00"), Some("12345678900".to_string()));
    }

    #[test]
    fn test_format_cpf() {
        assert_eq!(format_cpf("52998224725"), "529.982.247-25");
        assert_eq!(format_cpf("529.982.247-25"), "529.982.247-25");
        assert_eq!(format_cpf("Unknown"), "Unknown");
    }
}
