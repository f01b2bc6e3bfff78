//! Instruction prompt for the vision model.
//!
//! The four-line answer format requested here is what
//! [`parse_response`](super::response::parse_response) reads. Changing one
//! without the other breaks extraction, so the format carries a version.

use serde::{Deserialize, Serialize};

use crate::models::config::ModelConfig;

/// Version of the answer format contract.
pub const PROMPT_VERSION: u32 = 1;

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Output token ceiling.
    pub max_tokens: u32,
    /// Sampling temperature (0 for deterministic output).
    pub temperature: f32,
    /// Nucleus sampling mass (1 disables truncation).
    pub top_p: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 1000,
            temperature: 0.0,
            top_p: 1.0,
        }
    }
}

impl From<&ModelConfig> for GenerationParams {
    fn from(config: &ModelConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
        }
    }
}

/// Build the instruction prompt around the OCR text.
pub fn build_prompt(ocr_text: &str) -> String {
    format!(
        r#"
<ocr_results>
{ocr_text}
</ocr_results>
Analyze this image and corresponding OCR results, carefully and provide the following information:

1. Name: Extract the full name of the person from the document.
2. CPF: Extract the CPF number (Brazilian tax identification number) if present.
3. DOB: Extract the date of birth in the format YYYY-MM-DD.
4. Text Language: Identify the primary language of the text in the image.

Format your response as follows:

Name: [Full Name]
CPF: [CPF Number]
DOB: [YYYY-MM-DD]
Text Language: [Language]

If you can't find or determine any of these fields, use 'Unknown'. Please note the picture can be tilted.
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::response::parse_response;
    use crate::models::record::Field;

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(build_prompt("RG 12.345.678-9"), build_prompt("RG 12.345.678-9"));
    }

    #[test]
    fn test_prompt_embeds_ocr_text() {
        let prompt = build_prompt("REPUBLICA FEDERATIVA DO BRASIL\nNOME\nJANE DOE");
        assert!(prompt.contains("<ocr_results>\nREPUBLICA FEDERATIVA DO BRASIL\nNOME\nJANE DOE\n</ocr_results>"));
    }

    #[test]
    fn test_prompt_states_contract() {
        let prompt = build_prompt("");
        for field in Field::ALL {
            assert!(prompt.contains(field.label()), "missing label {}", field.label());
        }
        assert!(prompt.contains("YYYY-MM-DD"));
        assert!(prompt.contains("'Unknown'"));
        assert!(prompt.contains("tilted"));
    }

    #[test]
    fn test_prompt_template_parses_as_answer() {
        // The answer template inside the prompt must itself satisfy the parser
        let parsed = parse_response(&build_prompt(""));
        assert_eq!(parsed.fields.name, "[Full Name]");
        assert_eq!(parsed.fields.text_language, "[Language]");
    }

    #[test]
    fn test_generation_params_defaults() {
        let params = GenerationParams::default();
        assert_eq!(params.max_tokens, 1000);
        assert_eq!(params.temperature, 0.0);
        assert_eq!(params.top_p, 1.0);
    }
}
