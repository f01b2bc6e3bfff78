//! Identity field extraction: OCR, prompt, model answer, validation.

pub mod prompt;
pub mod response;
pub mod rules;

pub use prompt::{build_prompt, GenerationParams, PROMPT_VERSION};
pub use response::{parse_response, ParsedResponse};
pub use rules::FieldValidator;

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{IdscanError, ModelError, Result};
use crate::imaging::ImagePreparer;
use crate::llm::{ModelRequest, VisionModel};
use crate::models::config::IdscanConfig;
use crate::models::record::{ExtractionRecord, FieldIssue};
use crate::ocr::{join_lines, OcrService};

/// Result of extracting one document.
///
/// Both variants carry a record, so a caller always gets exactly one record
/// per document.
#[derive(Debug)]
pub enum ExtractionOutcome {
    /// The pipeline ran to completion. Some fields may still be unknown.
    Extracted {
        record: ExtractionRecord,
        issues: Vec<FieldIssue>,
    },
    /// The pipeline aborted; every field except the identifier is unknown.
    Failed {
        record: ExtractionRecord,
        error: IdscanError,
    },
}

impl ExtractionOutcome {
    /// Fallback outcome for a document that could not be processed.
    pub fn failed(file_full_name: &str, error: IdscanError) -> Self {
        ExtractionOutcome::Failed {
            record: ExtractionRecord::unknown(file_full_name),
            error,
        }
    }

    pub fn record(&self) -> &ExtractionRecord {
        match self {
            ExtractionOutcome::Extracted { record, .. } | ExtractionOutcome::Failed { record, .. } => {
                record
            }
        }
    }

    pub fn into_record(self) -> ExtractionRecord {
        match self {
            ExtractionOutcome::Extracted { record, .. } | ExtractionOutcome::Failed { record, .. } => {
                record
            }
        }
    }

    pub fn error(&self) -> Option<&IdscanError> {
        match self {
            ExtractionOutcome::Failed { error, .. } => Some(error),
            ExtractionOutcome::Extracted { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ExtractionOutcome::Failed { .. })
    }
}

/// Runs the extraction pipeline for single documents.
pub struct Extractor<O, P, M> {
    ocr: O,
    preparer: P,
    model: M,
    validator: FieldValidator,
    params: GenerationParams,
}

impl<O, P, M> Extractor<O, P, M>
where
    O: OcrService,
    P: ImagePreparer,
    M: VisionModel,
{
    /// Create an extractor with default validation and generation settings.
    pub fn new(ocr: O, preparer: P, model: M) -> Self {
        Self {
            ocr,
            preparer,
            model,
            validator: FieldValidator::new(),
            params: GenerationParams::default(),
        }
    }

    /// Apply validation and generation settings from configuration.
    pub fn with_config(mut self, config: &IdscanConfig) -> Self {
        self.validator =
            FieldValidator::new().with_cpf_checksum(config.extraction.verify_cpf_check_digits);
        self.params = GenerationParams::from(&config.model);
        self
    }

    /// Set the field validator.
    pub fn with_validator(mut self, validator: FieldValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Set generation parameters.
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Extract the identity fields of one document image.
    ///
    /// Never fails: any OCR, encoding or model error yields
    /// [`ExtractionOutcome::Failed`] with an all-unknown record.
    pub async fn extract(&self, file_full_name: &str, image: &[u8]) -> ExtractionOutcome {
        let start = Instant::now();

        match self.run(file_full_name, image).await {
            Ok((record, issues)) => {
                for issue in &issues {
                    debug!("{}: {}", file_full_name, issue);
                }
                info!(
                    "Extracted {} in {}ms ({} unknown fields)",
                    file_full_name,
                    start.elapsed().as_millis(),
                    issues.len()
                );
                ExtractionOutcome::Extracted { record, issues }
            }
            Err(error) => {
                warn!("Extraction failed for {}: {}", file_full_name, error);
                ExtractionOutcome::failed(file_full_name, error)
            }
        }
    }

    async fn run(
        &self,
        file_full_name: &str,
        image: &[u8],
    ) -> Result<(ExtractionRecord, Vec<FieldIssue>)> {
        let lines = self.ocr.recognize_lines(image)?;
        debug!("{}: OCR returned {} lines", file_full_name, lines.len());
        let ocr_text = join_lines(&lines);

        let prepared = self.preparer.prepare(image)?;
        debug!(
            "{}: prepared {} ({} base64 bytes)",
            file_full_name,
            prepared.media_type,
            prepared.data.len()
        );

        let request = ModelRequest {
            image: prepared,
            prompt: build_prompt(&ocr_text),
            params: self.params,
        };
        debug!(
            "{}: sending prompt v{} (max_tokens {})",
            file_full_name, PROMPT_VERSION, request.params.max_tokens
        );

        let answer = self.model.complete(&request).await?;
        debug!("{}: model answer:\n{}", file_full_name, answer);

        let parsed = parse_response(&answer);
        if !parsed.is_structured() {
            return Err(ModelError::UnstructuredAnswer.into());
        }
        for field in &parsed.duplicates {
            warn!(
                "{}: answer repeats the {} line, keeping the last one",
                file_full_name, field
            );
        }

        Ok(self.validator.validate(file_full_name, &parsed.fields))
    }
}
